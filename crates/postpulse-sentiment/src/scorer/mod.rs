//! The scoring seam: a pluggable classifier plus the adapter that turns its
//! raw labels into [`Sentiment`] values.

mod http;
mod lexicon;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use postpulse_core::Sentiment;
use serde::Deserialize;

use crate::error::SentimentError;
use crate::types::SentimentConfig;

pub use http::HttpScorer;
pub use lexicon::{lexicon_score, LexiconScorer};

/// One classifier output: a raw label and its confidence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawScore {
    pub label: String,
    pub score: f64,
}

impl RawScore {
    #[must_use]
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// A batch text classifier.
///
/// Implementations must return exactly one [`RawScore`] per input text, in
/// input order.
#[async_trait]
pub trait SentimentScorer: Send + Sync {
    async fn score(&self, texts: &[&str]) -> Result<Vec<RawScore>, SentimentError>;
}

/// Maps a classifier label onto [`Sentiment`].
///
/// Matching is case-insensitive. Anything unrecognized becomes
/// [`Sentiment::Unknown`].
#[must_use]
pub fn normalize_label(label: &str) -> Sentiment {
    match label.trim().to_ascii_lowercase().as_str() {
        "label_0" | "negative" | "neg" => Sentiment::Negative,
        "label_1" | "neutral" | "neu" => Sentiment::Neutral,
        "label_2" | "positive" | "pos" => Sentiment::Positive,
        _ => Sentiment::Unknown,
    }
}

/// A normalized classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredText {
    pub sentiment: Sentiment,
    /// Always within `[0.0, 1.0]`.
    pub confidence: f64,
}

/// Wraps a [`SentimentScorer`] and enforces its output contract.
#[derive(Clone)]
pub struct ScorerAdapter {
    inner: Arc<dyn SentimentScorer>,
}

impl ScorerAdapter {
    #[must_use]
    pub fn new(inner: Arc<dyn SentimentScorer>) -> Self {
        Self { inner }
    }

    /// Scores `texts`, returning one normalized result per text.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::ScoringFailure`] if the scorer fails, returns
    /// the wrong number of results, or reports a NaN confidence.
    pub async fn score(&self, texts: &[&str]) -> Result<Vec<ScoredText>, SentimentError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let raw = self.inner.score(texts).await?;
        if raw.len() != texts.len() {
            return Err(SentimentError::ScoringFailure(format!(
                "scorer returned {} results for {} texts",
                raw.len(),
                texts.len()
            )));
        }

        raw.into_iter()
            .map(|r| {
                if r.score.is_nan() {
                    return Err(SentimentError::ScoringFailure(format!(
                        "scorer returned NaN confidence for label {:?}",
                        r.label
                    )));
                }
                Ok(ScoredText {
                    sentiment: normalize_label(&r.label),
                    confidence: r.score.clamp(0.0, 1.0),
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for ScorerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScorerAdapter").finish_non_exhaustive()
    }
}

type SharedSlot = OnceCell<Result<Arc<dyn SentimentScorer>, String>>;

static SHARED_SCORER: SharedSlot = OnceCell::new();

/// Builds a scorer from configuration: the HTTP classifier when a URL is set,
/// otherwise the lexicon.
///
/// # Errors
///
/// Returns [`SentimentError::ScorerConfig`] if the HTTP client cannot be built.
pub fn build_scorer(config: &SentimentConfig) -> Result<Arc<dyn SentimentScorer>, SentimentError> {
    match config.scorer_url.as_deref() {
        Some(url) => {
            tracing::info!(url, batch_size = config.scorer_batch_size, "using HTTP scorer");
            let scorer = HttpScorer::new(
                url,
                Duration::from_secs(config.scorer_timeout_secs),
                config.scorer_batch_size,
            )?;
            Ok(Arc::new(scorer))
        }
        None => {
            tracing::info!("no scorer URL configured; using lexicon scorer");
            Ok(Arc::new(LexiconScorer))
        }
    }
}

/// Returns the process-wide scorer, building it on first use.
///
/// Concurrent first callers block until one construction finishes; all of
/// them receive the same instance. A failed construction is fatal for the
/// process: it is never retried, and every later call returns the same error.
///
/// # Errors
///
/// Returns [`SentimentError::ScorerConfig`] if construction failed.
pub fn shared_scorer(config: &SentimentConfig) -> Result<ScorerAdapter, SentimentError> {
    shared_from(&SHARED_SCORER, || build_scorer(config))
}

fn shared_from(
    slot: &SharedSlot,
    build: impl FnOnce() -> Result<Arc<dyn SentimentScorer>, SentimentError>,
) -> Result<ScorerAdapter, SentimentError> {
    let built = slot.get_or_init(|| {
        build().map_err(|err| match err {
            SentimentError::ScorerConfig(message) => message,
            other => other.to_string(),
        })
    });
    match built {
        Ok(inner) => Ok(ScorerAdapter::new(Arc::clone(inner))),
        Err(message) => Err(SentimentError::ScorerConfig(message.clone())),
    }
}
