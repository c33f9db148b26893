//! Analysis run records and their two-state lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CoreError, SentimentSummary};

/// The request that produced an analysis run. Stored alongside the run as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunParameters {
    /// Free-text search over recent posts.
    Search { count: u32 },
    /// One author's timeline plus replies to each of their posts.
    Author { max_posts: u32, replies_per_post: u32 },
}

impl RunParameters {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPostCount`] unless `1 <= count <= max`.
    pub fn search(count: u32, max: u32) -> Result<Self, CoreError> {
        check_count(count, max)?;
        Ok(Self::Search { count })
    }

    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPostCount`] unless `1 <= max_posts <= max`.
    pub fn author(max_posts: u32, replies_per_post: u32, max: u32) -> Result<Self, CoreError> {
        check_count(max_posts, max)?;
        Ok(Self::Author {
            max_posts,
            replies_per_post,
        })
    }

    /// Number of top-level posts requested from the source.
    #[must_use]
    pub fn requested(&self) -> u32 {
        match self {
            RunParameters::Search { count } => *count,
            RunParameters::Author { max_posts, .. } => *max_posts,
        }
    }
}

fn check_count(requested: u32, max: u32) -> Result<(), CoreError> {
    if requested == 0 || requested > max {
        return Err(CoreError::InvalidPostCount { requested, max });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Subject and parameters recorded; no summary yet.
    Created,
    /// Summary and post count recorded. Terminal.
    Summarized,
}

/// One ingest of posts for a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    /// Store-assigned, monotonic.
    pub id: i64,
    pub public_id: Uuid,
    /// Username or free-text query the run is scoped to.
    pub subject: String,
    pub parameters: RunParameters,
    pub created_at: DateTime<Utc>,
    /// Summary of the posts this run newly stored. `None` until summarized.
    pub summary: Option<SentimentSummary>,
    /// Number of posts scored by this run. `None` until summarized.
    pub post_count: Option<u32>,
}

impl AnalysisRun {
    #[must_use]
    pub fn state(&self) -> RunState {
        if self.summary.is_some() {
            RunState::Summarized
        } else {
            RunState::Created
        }
    }
}
