//! The narrow persistence interface the ingest core and reports depend on.

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::{AnalysisRun, NewPost, PostKind, RunParameters, Sentiment, SentimentSummary, StoredPost};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or rejected the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// An insert collided on `external_id` and the winning row could not be
    /// read back.
    #[error("conflicting insert for post {external_id}")]
    Conflict { external_id: String },

    #[error("analysis run {0} not found")]
    RunNotFound(i64),

    /// A summary was written to a run that already has one.
    #[error("analysis run {run_id} is already summarized")]
    InvalidRunTransition { run_id: i64 },

    /// A stored row could not be mapped back onto the domain types.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Ordering applied by [`PostStore::query_posts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostOrder {
    /// Insertion order.
    #[default]
    Stored,
    /// Highest sentiment confidence first, ties broken by insertion order.
    ConfidenceDesc,
}

/// Filter for [`PostStore::query_posts`]. Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    pub run_id: Option<i64>,
    /// Matches posts owned by any run whose subject equals this value.
    pub subject: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub kind: Option<PostKind>,
    pub limit: Option<u32>,
    pub order_by: PostOrder,
}

impl PostFilter {
    #[must_use]
    pub fn for_run(run_id: i64) -> Self {
        Self {
            run_id: Some(run_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn for_subject(subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn sentiment(mut self, sentiment: Sentiment) -> Self {
        self.sentiment = Some(sentiment);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: Option<PostKind>) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn order_by(mut self, order: PostOrder) -> Self {
        self.order_by = order;
        self
    }

    /// Whether `post`, owned by a run with subject `run_subject`, passes the
    /// filter's equality constraints. Ordering and limit are not applied.
    #[must_use]
    pub fn matches(&self, post: &StoredPost, run_subject: Option<&str>) -> bool {
        self.run_id.is_none_or(|id| post.analysis_run_id == id)
            && self
                .subject
                .as_deref()
                .is_none_or(|s| run_subject == Some(s))
            && self.sentiment.is_none_or(|s| post.sentiment == s)
            && self.kind.is_none_or(|k| post.kind == k)
    }
}

/// Row-oriented store for posts and analysis runs.
///
/// `insert_if_absent` is the only concurrency control point of an ingest and
/// must be atomic in the implementation.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert `post`, or return the already stored row with the same
    /// `external_id` unchanged.
    async fn insert_if_absent(&self, post: NewPost) -> Result<StoredPost, StoreError>;

    async fn exists(&self, external_id: &str) -> Result<bool, StoreError>;

    /// The subset of `external_ids` already stored.
    async fn existing_ids(&self, external_ids: &[String]) -> Result<HashSet<String>, StoreError> {
        let mut found = HashSet::new();
        for id in external_ids {
            if self.exists(id).await? {
                found.insert(id.clone());
            }
        }
        Ok(found)
    }

    async fn create_run(
        &self,
        subject: &str,
        parameters: &RunParameters,
    ) -> Result<AnalysisRun, StoreError>;

    /// Record the summary of a run. Fails with
    /// [`StoreError::InvalidRunTransition`] if the run already has one.
    async fn set_run_summary(
        &self,
        run_id: i64,
        summary: &SentimentSummary,
        post_count: u32,
    ) -> Result<AnalysisRun, StoreError>;

    async fn query_posts(&self, filter: &PostFilter) -> Result<Vec<StoredPost>, StoreError>;

    /// All runs for `subject`, newest first.
    async fn query_runs(&self, subject: &str) -> Result<Vec<AnalysisRun>, StoreError>;
}
