//! Read-side queries over stored posts and runs.

use postpulse_core::{
    AnalysisRun, Granularity, PeriodBucket, PostFilter, PostKind, PostOrder, PostStore,
    RunParameters, Sentiment, SentimentSummary, StoredPost,
};

use crate::aggregate::{bucket, summarize};
use crate::error::SentimentError;

/// Number of top posts per label in a [`SubjectReport`] unless overridden.
pub const DEFAULT_TOP_N: u32 = 7;

/// Everything known about one subject.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectReport {
    pub subject: String,
    /// Newest first.
    pub runs: Vec<AnalysisRun>,
    /// Over every post of every run.
    pub summary: SentimentSummary,
    pub total_posts: usize,
    /// The post kind the top lists were drawn from. `None` means all kinds.
    pub top_kind: Option<PostKind>,
    pub top_positive: Vec<StoredPost>,
    pub top_neutral: Vec<StoredPost>,
    pub top_negative: Vec<StoredPost>,
}

/// The `limit` highest-confidence posts for `subject` with `sentiment`.
///
/// # Errors
///
/// Returns [`SentimentError::StoreUnavailable`] if the store cannot be
/// reached.
pub async fn top_posts(
    store: &dyn PostStore,
    subject: &str,
    sentiment: Sentiment,
    kind: Option<PostKind>,
    limit: u32,
) -> Result<Vec<StoredPost>, SentimentError> {
    let filter = PostFilter::for_subject(subject)
        .sentiment(sentiment)
        .kind(kind)
        .order_by(PostOrder::ConfidenceDesc)
        .limit(limit);
    Ok(store.query_posts(&filter).await?)
}

/// Posts scored under one run, in insertion order.
///
/// # Errors
///
/// Returns [`SentimentError::StoreUnavailable`] if the store cannot be
/// reached.
pub async fn run_posts(store: &dyn PostStore, run_id: i64) -> Result<Vec<StoredPost>, SentimentError> {
    Ok(store.query_posts(&PostFilter::for_run(run_id)).await?)
}

/// Label shares over every stored post of `subject`, across all its runs.
///
/// # Errors
///
/// Returns [`SentimentError::StoreUnavailable`] if the store cannot be
/// reached.
pub async fn subject_summary(
    store: &dyn PostStore,
    subject: &str,
) -> Result<SentimentSummary, SentimentError> {
    let posts = store.query_posts(&PostFilter::for_subject(subject)).await?;
    Ok(summarize(&posts))
}

/// Per-period label shares for `subject`.
///
/// # Errors
///
/// Returns [`SentimentError::MalformedTimestamp`] if a stored post's
/// timestamp cannot be parsed, or [`SentimentError::StoreUnavailable`] if the
/// store cannot be reached.
pub async fn period_distribution(
    store: &dyn PostStore,
    subject: &str,
    granularity: Granularity,
) -> Result<Vec<PeriodBucket>, SentimentError> {
    let posts = store.query_posts(&PostFilter::for_subject(subject)).await?;
    bucket(&posts, granularity)
}

/// Builds a [`SubjectReport`], or `None` if `subject` has never been analyzed.
///
/// Top lists are drawn from replies when the latest run fetched an author's
/// timeline, and from all posts otherwise.
///
/// # Errors
///
/// Returns [`SentimentError::StoreUnavailable`] if the store cannot be
/// reached.
pub async fn subject_report(
    store: &dyn PostStore,
    subject: &str,
    top_n: u32,
) -> Result<Option<SubjectReport>, SentimentError> {
    let runs = store.query_runs(subject).await?;
    let Some(latest) = runs.first() else {
        return Ok(None);
    };

    let top_kind = match latest.parameters {
        RunParameters::Author { .. } => Some(PostKind::Reply),
        RunParameters::Search { .. } => None,
    };

    let posts = store.query_posts(&PostFilter::for_subject(subject)).await?;
    let summary = summarize(&posts);

    let top_positive = top_posts(store, subject, Sentiment::Positive, top_kind, top_n).await?;
    let top_neutral = top_posts(store, subject, Sentiment::Neutral, top_kind, top_n).await?;
    let top_negative = top_posts(store, subject, Sentiment::Negative, top_kind, top_n).await?;

    Ok(Some(SubjectReport {
        subject: subject.to_string(),
        runs,
        summary,
        total_posts: posts.len(),
        top_kind,
        top_positive,
        top_neutral,
        top_negative,
    }))
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
