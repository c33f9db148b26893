use postpulse_core::{CoreError, StoreError};
use thiserror::Error;

use crate::sources::SourceError;

#[derive(Debug, Error)]
pub enum SentimentError {
    /// The scorer failed, or returned a result count that does not match the
    /// number of texts sent.
    #[error("scoring failed: {0}")]
    ScoringFailure(String),

    /// The scorer could not be constructed from configuration.
    #[error("scorer configuration error: {0}")]
    ScorerConfig(String),

    #[error("malformed timestamp: {0:?}")]
    MalformedTimestamp(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Any store failure other than unavailability.
    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<StoreError> for SentimentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(reason) => Self::StoreUnavailable(reason),
            other => Self::Store(other),
        }
    }
}
