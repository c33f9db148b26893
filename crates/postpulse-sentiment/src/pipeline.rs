//! Ingest orchestration: dedup, score, persist, summarize.

use std::collections::HashSet;

use postpulse_core::{AnalysisRun, NewPost, PostStore, RawPost, RunParameters, StoreError};

use crate::aggregate::summarize_labels;
use crate::error::SentimentError;
use crate::ledger::Ledger;
use crate::scorer::ScorerAdapter;

/// Drops repeated `external_id`s, keeping the first occurrence.
fn dedup_batch(posts: Vec<RawPost>) -> Vec<RawPost> {
    let mut seen: HashSet<String> = HashSet::with_capacity(posts.len());
    posts
        .into_iter()
        .filter(|p| seen.insert(p.external_id.clone()))
        .collect()
}

/// Ingest one batch of raw posts for `subject`.
///
/// 1. Open a new analysis run.
/// 2. Drop posts repeated within the batch or already stored.
/// 3. Score the remaining texts in one scorer call (skipped when none remain).
/// 4. Insert each scored post; a post stored concurrently by another ingest
///    keeps its original row.
/// 5. Summarize this run's scored posts and close the run.
///
/// Already-known posts are never re-scored or rewritten.
///
/// # Errors
///
/// Returns [`SentimentError::ScoringFailure`] if scoring fails, in which case
/// nothing is inserted and the run stays unsummarized.
/// Returns [`SentimentError::StoreUnavailable`] if the store cannot be
/// reached at any step.
pub async fn ingest(
    store: &dyn PostStore,
    scorer: &ScorerAdapter,
    subject: &str,
    parameters: &RunParameters,
    raw_posts: Vec<RawPost>,
) -> Result<AnalysisRun, SentimentError> {
    let ledger = Ledger::new(store);
    let run = ledger.open(subject, parameters).await?;

    let received = raw_posts.len();
    let candidates = dedup_batch(raw_posts);
    let ids: Vec<String> = candidates.iter().map(|p| p.external_id.clone()).collect();
    let known = store.existing_ids(&ids).await?;
    let fresh: Vec<RawPost> = candidates
        .into_iter()
        .filter(|p| !known.contains(&p.external_id))
        .collect();

    tracing::debug!(
        run_id = run.id,
        subject,
        received,
        already_stored = known.len(),
        new = fresh.len(),
        "deduplicated batch"
    );

    let scores = if fresh.is_empty() {
        Vec::new()
    } else {
        let texts: Vec<&str> = fresh.iter().map(|p| p.text.as_str()).collect();
        match scorer.score(&texts).await {
            Ok(scores) => scores,
            Err(e) => {
                tracing::warn!(run_id = run.id, error = %e, "scoring failed; run left unsummarized");
                return Err(e);
            }
        }
    };

    let mut labels = Vec::with_capacity(fresh.len());
    for (raw, scored) in fresh.into_iter().zip(scores) {
        let post = NewPost::scored(raw, run.id, scored.sentiment, scored.confidence)?;
        let external_id = post.external_id.clone();
        match store.insert_if_absent(post).await {
            Ok(stored) if stored.analysis_run_id != run.id => {
                tracing::debug!(
                    run_id = run.id,
                    external_id = %external_id,
                    owner = stored.analysis_run_id,
                    "post stored concurrently by another run"
                );
            }
            Ok(_) => {}
            Err(StoreError::Conflict { external_id }) => {
                tracing::warn!(run_id = run.id, external_id = %external_id, "insert conflict");
            }
            Err(e) => return Err(e.into()),
        }
        labels.push(scored.sentiment);
    }

    let summary = summarize_labels(labels.iter().copied());
    let post_count = u32::try_from(labels.len()).unwrap_or(u32::MAX);
    ledger.close(&run, &summary, post_count).await
}

#[cfg(test)]
mod tests {
    use postpulse_core::PostKind;

    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence() {
        let posts = vec![
            RawPost::new("1", PostKind::Original, "a", "first", "2024-01-01"),
            RawPost::new("2", PostKind::Original, "b", "second", "2024-01-01"),
            RawPost::new("1", PostKind::Reply, "c", "again", "2024-01-02"),
        ];
        let kept = dedup_batch(posts);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].text, "first");
        assert_eq!(kept[1].external_id, "2");
    }
}
