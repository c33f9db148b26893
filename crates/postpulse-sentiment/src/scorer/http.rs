//! HTTP client for a text-classification service.
//!
//! Sends `POST {base}/predict` with `{"inputs": [...]}` and expects one entry
//! per input. An entry is either a single `{label, score}` object or a list of
//! them, in which case the highest-scoring label wins.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{RawScore, SentimentScorer};
use crate::error::SentimentError;

/// Classification service client.
pub struct HttpScorer {
    client: reqwest::Client,
    url: String,
    batch_size: usize,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: &'a [&'a str],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Prediction {
    Ranked(Vec<RawScore>),
    Top(RawScore),
}

impl Prediction {
    fn best(self) -> Option<RawScore> {
        match self {
            Self::Top(score) => Some(score),
            Self::Ranked(scores) => scores
                .into_iter()
                .max_by(|a, b| a.score.total_cmp(&b.score)),
        }
    }
}

impl HttpScorer {
    /// Create a new `HttpScorer` for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::ScorerConfig`] if the HTTP client cannot be
    /// built or `batch_size` is zero.
    pub fn new(base_url: &str, timeout: Duration, batch_size: usize) -> Result<Self, SentimentError> {
        if batch_size == 0 {
            return Err(SentimentError::ScorerConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SentimentError::ScorerConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: format!("{}/predict", base_url.trim_end_matches('/')),
            batch_size,
        })
    }

    async fn predict(&self, chunk: &[&str]) -> Result<Vec<RawScore>, SentimentError> {
        let response = self
            .client
            .post(&self.url)
            .json(&PredictRequest { inputs: chunk })
            .send()
            .await
            .map_err(|e| SentimentError::ScoringFailure(format!("scorer request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SentimentError::ScoringFailure(format!(
                "scorer returned status {}",
                response.status()
            )));
        }

        let predictions: Vec<Prediction> = response.json().await.map_err(|e| {
            SentimentError::ScoringFailure(format!("scorer response parse error: {e}"))
        })?;

        if predictions.len() != chunk.len() {
            return Err(SentimentError::ScoringFailure(format!(
                "scorer returned {} predictions for {} inputs",
                predictions.len(),
                chunk.len()
            )));
        }

        predictions
            .into_iter()
            .map(|p| {
                p.best().ok_or_else(|| {
                    SentimentError::ScoringFailure("scorer returned an empty label list".to_string())
                })
            })
            .collect()
    }
}

#[async_trait]
impl SentimentScorer for HttpScorer {
    async fn score(&self, texts: &[&str]) -> Result<Vec<RawScore>, SentimentError> {
        let mut all = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            tracing::debug!(url = %self.url, inputs = chunk.len(), "scoring batch");
            all.extend(self.predict(chunk).await?);
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_prediction_picks_highest_score() {
        let json = r#"[
            [{"label": "LABEL_0", "score": 0.1}, {"label": "LABEL_2", "score": 0.7}, {"label": "LABEL_1", "score": 0.2}],
            {"label": "LABEL_1", "score": 0.55}
        ]"#;
        let predictions: Vec<Prediction> = serde_json::from_str(json).unwrap();
        let best: Vec<RawScore> = predictions.into_iter().filter_map(Prediction::best).collect();
        assert_eq!(best[0], RawScore::new("LABEL_2", 0.7));
        assert_eq!(best[1], RawScore::new("LABEL_1", 0.55));
    }

    #[test]
    fn empty_ranked_prediction_has_no_best() {
        let predictions: Vec<Prediction> = serde_json::from_str("[[]]").unwrap();
        assert!(predictions.into_iter().next().and_then(Prediction::best).is_none());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let scorer = HttpScorer::new("http://scorer:8080/", Duration::from_secs(1), 8).unwrap();
        assert_eq!(scorer.url, "http://scorer:8080/predict");
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let result = HttpScorer::new("http://scorer", Duration::from_secs(1), 0);
        assert!(matches!(result, Err(SentimentError::ScorerConfig(_))));
    }
}
