//! Ingest command handlers: fetch from `bird`, score, persist, print.

use postpulse_core::{AnalysisRun, AppConfig, PostStore, RunParameters, Sentiment, SentimentSummary};
use postpulse_db::PgStore;
use postpulse_sentiment::{
    ingest, normalize_handle, run_posts, shared_scorer, BirdSource, MemoryStore, PostSource,
    SentimentConfig,
};

/// Posts shown per sentiment after an ingest.
const PREVIEW_PER_SENTIMENT: usize = 3;
const PREVIEW_TEXT_CHARS: usize = 80;

/// The database-backed store, migrated, or an empty in-memory store for dry
/// runs.
pub(crate) async fn open_store(
    config: &AppConfig,
    dry_run: bool,
) -> anyhow::Result<Box<dyn PostStore>> {
    if dry_run {
        tracing::info!("dry-run: using in-memory store");
        return Ok(Box::new(MemoryStore::new()));
    }
    let pool = crate::connect(config).await?;
    postpulse_db::run_migrations(&pool).await?;
    Ok(Box::new(PgStore::new(pool)))
}

/// Search for `query` and ingest the results under subject `query`.
///
/// # Errors
///
/// Returns an error if the count is out of range, `bird` fails, scoring
/// fails, or the store is unavailable.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    sentiment: &SentimentConfig,
    query: &str,
    count: Option<u32>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let count = count.unwrap_or(config.default_post_count);
    let parameters = RunParameters::search(count, config.max_post_count)?;

    let source = BirdSource::from_config(sentiment)?;
    let posts = source.search(query, count).await?;
    if posts.is_empty() {
        println!("no posts found for '{query}'");
    }

    let scorer = shared_scorer(sentiment)?;
    let store = open_store(config, dry_run).await?;
    let run = ingest(store.as_ref(), &scorer, query, &parameters, posts).await?;
    print_run(store.as_ref(), &run, dry_run).await
}

/// Fetch `username`'s recent posts and their replies and ingest them under
/// the bare handle.
///
/// # Errors
///
/// Returns an error if the handle or count is invalid, `bird` fails, scoring
/// fails, or the store is unavailable.
pub(crate) async fn run_user(
    config: &AppConfig,
    sentiment: &SentimentConfig,
    username: &str,
    max_posts: Option<u32>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let handle = normalize_handle(username)?;
    let max_posts = max_posts.unwrap_or(config.default_post_count);
    let parameters =
        RunParameters::author(max_posts, sentiment.replies_per_post, config.max_post_count)?;

    let source = BirdSource::from_config(sentiment)?;
    let posts = source.fetch_for_author(handle, max_posts).await?;
    if posts.is_empty() {
        println!("no posts found for @{handle}");
    }

    let scorer = shared_scorer(sentiment)?;
    let store = open_store(config, dry_run).await?;
    let run = ingest(store.as_ref(), &scorer, handle, &parameters, posts).await?;
    print_run(store.as_ref(), &run, dry_run).await
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_TEXT_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_TEXT_CHARS - 1).collect();
    format!("{cut}…")
}

fn summary_line(summary: &SentimentSummary) -> String {
    Sentiment::KNOWN
        .iter()
        .map(|&sentiment| format!("{sentiment} {:.0}%", summary.ratio(sentiment) * 100.0))
        .collect::<Vec<_>>()
        .join("  ")
}

async fn print_run(store: &dyn PostStore, run: &AnalysisRun, dry_run: bool) -> anyhow::Result<()> {
    let mode = if dry_run { " (dry-run, nothing persisted)" } else { "" };
    println!("run {} for '{}'{mode}", run.public_id, run.subject);

    let Some(summary) = run.summary else {
        println!("  run was not summarized");
        return Ok(());
    };
    let post_count = run.post_count.unwrap_or(0);
    println!("  new posts scored: {post_count}");
    if post_count == 0 {
        println!("  nothing new since the last run");
        return Ok(());
    }
    println!("  {}", summary_line(&summary));

    let posts = run_posts(store, run.id).await?;
    for sentiment in Sentiment::KNOWN {
        let mut matching: Vec<_> = posts
            .iter()
            .filter(|p| p.sentiment == sentiment)
            .collect();
        if matching.is_empty() {
            continue;
        }
        matching.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        println!();
        println!("  {sentiment}:");
        for post in matching.into_iter().take(PREVIEW_PER_SENTIMENT) {
            println!(
                "    {:>5.2}  @{:<16}{}",
                post.confidence,
                post.author,
                preview(&post.text)
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_flattens_whitespace() {
        assert_eq!(preview("hello\n\n  world"), "hello world");
    }

    #[test]
    fn preview_truncates_long_text() {
        let long = "x".repeat(200);
        let shown = preview(&long);
        assert_eq!(shown.chars().count(), PREVIEW_TEXT_CHARS);
        assert!(shown.ends_with('…'));
    }

    #[test]
    fn summary_line_lists_known_labels_in_order() {
        let summary = SentimentSummary {
            positive: 0.12,
            neutral: 0.88,
            negative: 0.0,
        };
        assert_eq!(summary_line(&summary), "positive 12%  neutral 88%  negative 0%");
    }
}
