//! Where raw posts come from.

mod bird;

use async_trait::async_trait;
use postpulse_core::RawPost;
use thiserror::Error;

pub use bird::{normalize_handle, BirdSource};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("TWITTER_AUTH_TOKEN and TWITTER_CT0 must both be set")]
    MissingCredentials,

    #[error("invalid handle: {0:?}")]
    InvalidHandle(String),

    #[error("could not run `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("could not decode `{command}` output: {reason}")]
    Decode { command: String, reason: String },
}

/// A provider of raw social posts.
///
/// An empty result means the provider had nothing; failures are always
/// reported as errors.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Up to `count` posts matching `query`, all of kind `original`.
    async fn search(&self, query: &str, count: u32) -> Result<Vec<RawPost>, SourceError>;

    /// Up to `max_count` recent posts by `username` plus the replies to each.
    async fn fetch_for_author(
        &self,
        username: &str,
        max_count: u32,
    ) -> Result<Vec<RawPost>, SourceError>;
}
