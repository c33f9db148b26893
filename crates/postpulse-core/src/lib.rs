//! Shared domain types, configuration and the persistence seam for postpulse.

mod app_config;
mod config;
pub mod posts;
pub mod runs;
pub mod sentiment;
pub mod store;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use posts::{NewPost, PostKind, RawPost, StoredPost};
pub use runs::{AnalysisRun, RunParameters, RunState};
pub use sentiment::{Granularity, PeriodBucket, Sentiment, SentimentSummary};
pub use store::{PostFilter, PostOrder, PostStore, StoreError};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid sentiment label: {0}")]
    InvalidSentiment(String),
    #[error("invalid post kind: {0}")]
    InvalidPostKind(String),
    #[error("invalid granularity: {0} (expected `monthly` or `weekly`)")]
    InvalidGranularity(String),
    #[error("post count {requested} out of range (1..={max})")]
    InvalidPostCount { requested: u32, max: u32 },
    #[error("confidence {0} outside [0.0, 1.0]")]
    InvalidConfidence(f64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
