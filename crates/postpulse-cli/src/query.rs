//! Read-only report handlers.

use chrono::Utc;
use postpulse_core::{AnalysisRun, Granularity, PostStore, RunParameters, StoredPost};
use postpulse_sentiment::{period_distribution, subject_report, Ledger};

fn percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}

fn describe_parameters(parameters: &RunParameters) -> String {
    match parameters {
        RunParameters::Search { count } => format!("search n={count}"),
        RunParameters::Author {
            max_posts,
            replies_per_post,
        } => format!("author n={max_posts} replies={replies_per_post}"),
    }
}

fn run_row(run: &AnalysisRun) -> String {
    let created = run.created_at.format("%Y-%m-%d %H:%M").to_string();
    let (posts, summary) = match (run.post_count, run.summary) {
        (Some(count), Some(s)) => (
            count.to_string(),
            format!(
                "{}/{}/{}",
                percent(s.positive),
                percent(s.neutral),
                percent(s.negative)
            ),
        ),
        _ => ("-".to_string(), "unsummarized".to_string()),
    };
    format!(
        "{:<38}{:<18}{:<28}{:<8}{}",
        run.public_id,
        created,
        describe_parameters(&run.parameters),
        posts,
        summary
    )
}

fn markdown_escape(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

fn print_top(title: &str, posts: &[StoredPost]) {
    println!("## {title}");
    println!();
    if posts.is_empty() {
        println!("_none_");
        println!();
        return;
    }
    println!("| Confidence | Author | Posted | Text |");
    println!("|------------|--------|--------|------|");
    for post in posts {
        println!(
            "| {:.2} | @{} | {} | {} |",
            post.confidence,
            post.author,
            post.created_at,
            markdown_escape(&post.text)
        );
    }
    println!();
}

/// Print a markdown report across every run for `subject`.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub(crate) async fn run_report(
    store: &dyn PostStore,
    subject: &str,
    top: u32,
) -> anyhow::Result<()> {
    let Some(report) = subject_report(store, subject, top).await? else {
        println!("no analysis runs found for '{subject}'; run `analyze` or `user` first");
        return Ok(());
    };

    let now = Utc::now().format("%Y-%m-%d %H:%M UTC");
    let drawn_from = if report.top_kind.is_some() {
        "replies"
    } else {
        "posts"
    };

    println!("# Sentiment Report: {}", report.subject);
    println!();
    println!("**Generated**: {now}");
    println!("**Runs**: {}", report.runs.len());
    println!("**Posts**: {}", report.total_posts);
    println!();
    println!("| Positive | Neutral | Negative |");
    println!("|----------|---------|----------|");
    println!(
        "| {} | {} | {} |",
        percent(report.summary.positive),
        percent(report.summary.neutral),
        percent(report.summary.negative)
    );
    println!();
    println!("---");
    println!();

    print_top(&format!("Top positive {drawn_from}"), &report.top_positive);
    print_top(&format!("Top neutral {drawn_from}"), &report.top_neutral);
    print_top(&format!("Top negative {drawn_from}"), &report.top_negative);

    Ok(())
}

/// Print per-period sentiment shares for `subject`.
///
/// # Errors
///
/// Returns an error if the store query fails or a stored timestamp is
/// malformed.
pub(crate) async fn run_distribution(
    store: &dyn PostStore,
    subject: &str,
    granularity: Granularity,
) -> anyhow::Result<()> {
    let buckets = period_distribution(store, subject, granularity).await?;
    if buckets.is_empty() {
        println!("no scored posts found for '{subject}'");
        return Ok(());
    }

    println!(
        "{:<12}{:<8}{:<10}{:<10}NEGATIVE",
        "PERIOD", "POSTS", "POSITIVE", "NEUTRAL"
    );
    for bucket in &buckets {
        println!(
            "{:<12}{:<8}{:<10.3}{:<10.3}{:.3}",
            bucket.period,
            bucket.total,
            bucket.positive_ratio,
            bucket.neutral_ratio,
            bucket.negative_ratio
        );
    }
    Ok(())
}

/// List runs for `subject`, newest first.
///
/// # Errors
///
/// Returns an error if the store query fails.
pub(crate) async fn run_runs(store: &dyn PostStore, subject: &str) -> anyhow::Result<()> {
    let runs = Ledger::new(store).history(subject).await?;
    if runs.is_empty() {
        println!("no analysis runs found for '{subject}'");
        return Ok(());
    }

    println!(
        "{:<38}{:<18}{:<28}{:<8}POS/NEU/NEG",
        "RUN", "CREATED", "PARAMETERS", "POSTS"
    );
    for run in &runs {
        println!("{}", run_row(run));
    }
    Ok(())
}
