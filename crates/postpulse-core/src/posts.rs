//! Post records at each stage: fetched, ready to insert, and stored.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CoreError, Sentiment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Original,
    Reply,
}

impl PostKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PostKind::Original => "original",
            PostKind::Reply => "reply",
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            // "post" is the platform's own name for an original post.
            "original" | "post" => Ok(PostKind::Original),
            "reply" => Ok(PostKind::Reply),
            _ => Err(CoreError::InvalidPostKind(s.to_string())),
        }
    }
}

/// A post as delivered by a post source, before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    /// Platform-assigned identifier; the dedup key.
    pub external_id: String,
    pub kind: PostKind,
    pub author: String,
    pub text: String,
    /// Creation timestamp exactly as the platform reported it.
    pub created_at: String,
    pub likes: i64,
    pub replies: i64,
    pub retweets: i64,
}

impl RawPost {
    #[must_use]
    pub fn new(
        external_id: impl Into<String>,
        kind: PostKind,
        author: impl Into<String>,
        text: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            kind,
            author: author.into(),
            text: text.into(),
            created_at: created_at.into(),
            likes: 0,
            replies: 0,
            retweets: 0,
        }
    }
}

/// A scored post ready for `insert_if_absent`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub external_id: String,
    pub analysis_run_id: i64,
    pub kind: PostKind,
    pub author: String,
    pub text: String,
    pub created_at: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub likes: i64,
    pub replies: i64,
    pub retweets: i64,
}

impl NewPost {
    /// Attach a sentiment result to a raw post under the given run.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfidence`] if `confidence` is not a
    /// finite value in `[0.0, 1.0]`.
    pub fn scored(
        raw: RawPost,
        analysis_run_id: i64,
        sentiment: Sentiment,
        confidence: f64,
    ) -> Result<Self, CoreError> {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            return Err(CoreError::InvalidConfidence(confidence));
        }
        Ok(Self {
            external_id: raw.external_id,
            analysis_run_id,
            kind: raw.kind,
            author: raw.author,
            text: raw.text,
            created_at: raw.created_at,
            sentiment,
            confidence,
            likes: raw.likes,
            replies: raw.replies,
            retweets: raw.retweets,
        })
    }
}

/// A post row as persisted. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPost {
    pub id: i64,
    pub external_id: String,
    /// The run that first stored this post.
    pub analysis_run_id: i64,
    pub kind: PostKind,
    pub author: String,
    pub text: String,
    pub created_at: String,
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub likes: i64,
    pub replies: i64,
    pub retweets: i64,
    pub stored_at: DateTime<Utc>,
}
