//! Sentiment labels and the aggregate shapes derived from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Normalized sentiment label.
///
/// `Unknown` is a sentinel for scorer labels outside the known vocabulary. It
/// is persisted like any other label but never counted by aggregations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Unknown,
}

impl Sentiment {
    /// The three labels that participate in aggregation, in report order.
    pub const KNOWN: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
            Sentiment::Unknown => "unknown",
        }
    }

    #[must_use]
    pub fn is_known(self) -> bool {
        !matches!(self, Sentiment::Unknown)
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" => Ok(Sentiment::Negative),
            "unknown" => Ok(Sentiment::Unknown),
            other => Err(CoreError::InvalidSentiment(other.to_string())),
        }
    }
}

/// Share of positive, neutral and negative posts in a post set.
///
/// Ratios are rounded to two decimals. An empty post set yields all zeros.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl SentimentSummary {
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Sum of the three ratios; `1.0 ± 0.01` for any non-empty post set.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.positive + self.neutral + self.negative
    }

    #[must_use]
    pub fn ratio(&self, sentiment: Sentiment) -> f64 {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
            Sentiment::Unknown => 0.0,
        }
    }
}

/// Bucketing resolution for period aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Monthly,
    Weekly,
}

impl Granularity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Monthly => "monthly",
            Granularity::Weekly => "weekly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monthly" => Ok(Granularity::Monthly),
            "weekly" => Ok(Granularity::Weekly),
            _ => Err(CoreError::InvalidGranularity(s.to_string())),
        }
    }
}

/// Sentiment distribution for one time period. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodBucket {
    /// `YYYY-MM` for monthly buckets, `YYYY-W<UU>` for weekly ones.
    pub period: String,
    pub total: u32,
    pub positive_ratio: f64,
    pub neutral_ratio: f64,
    pub negative_ratio: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentiment_round_trips_through_str() {
        for s in [
            Sentiment::Positive,
            Sentiment::Neutral,
            Sentiment::Negative,
            Sentiment::Unknown,
        ] {
            assert_eq!(s.as_str().parse::<Sentiment>().unwrap(), s);
        }
    }

    #[test]
    fn sentiment_rejects_unrecognized_label() {
        let err = "LABEL_2".parse::<Sentiment>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidSentiment(ref l) if l == "LABEL_2"));
    }

    #[test]
    fn unknown_is_not_known() {
        assert!(!Sentiment::Unknown.is_known());
        assert!(Sentiment::KNOWN.iter().all(|s| s.is_known()));
    }

    #[test]
    fn granularity_parses_case_insensitively() {
        assert_eq!("Weekly".parse::<Granularity>().unwrap(), Granularity::Weekly);
        assert_eq!("monthly".parse::<Granularity>().unwrap(), Granularity::Monthly);
        assert!("daily".parse::<Granularity>().is_err());
    }

    #[test]
    fn sentiment_serializes_lowercase() {
        let json = serde_json::to_string(&Sentiment::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
    }

    #[test]
    fn zero_summary_totals_zero() {
        assert_eq!(SentimentSummary::zero().total(), 0.0);
    }
}
