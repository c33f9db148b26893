//! Word-weight lexicon scorer for short social posts.
//!
//! Used when no classification service is configured. Emits the same
//! `LABEL_n` labels as the three-class model so both go through the same
//! normalization.

use async_trait::async_trait;

use super::{RawScore, SentimentScorer};
use crate::error::SentimentError;

/// Scores at or beyond this magnitude are classified as polar.
const POLARITY_THRESHOLD: f32 = 0.1;

/// Word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("great", 0.4),
    ("good", 0.3),
    ("excellent", 0.5),
    ("amazing", 0.5),
    ("awesome", 0.5),
    ("love", 0.5),
    ("loved", 0.5),
    ("loving", 0.5),
    ("best", 0.5),
    ("thanks", 0.3),
    ("thank", 0.3),
    ("recommend", 0.4),
    ("happy", 0.4),
    ("congrats", 0.4),
    ("congratulations", 0.4),
    ("nice", 0.3),
    ("fantastic", 0.5),
    ("helpful", 0.4),
    ("win", 0.4),
    ("fixed", 0.3),
    // Negative signals
    ("bad", -0.4),
    ("terrible", -0.6),
    ("awful", -0.6),
    ("worst", -0.6),
    ("hate", -0.6),
    ("hated", -0.6),
    ("broken", -0.5),
    ("bug", -0.3),
    ("crash", -0.5),
    ("scam", -0.7),
    ("failed", -0.4),
    ("failure", -0.4),
    ("problem", -0.3),
    ("disappointed", -0.5),
    ("disappointing", -0.5),
    ("annoying", -0.4),
    ("useless", -0.5),
    ("angry", -0.5),
    ("ugh", -0.3),
    ("sad", -0.4),
];

/// Score a text string using the lexicon.
///
/// Splits text into lowercase words, sums matching weights, and clamps
/// the result to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let mut score = 0.0_f32;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if let Some(&(_, weight)) = LEXICON.iter().find(|(lex_word, _)| *lex_word == w) {
            score += weight;
        }
    }
    score.clamp(-1.0, 1.0)
}

fn classify(text: &str) -> RawScore {
    let score = lexicon_score(text);
    let label = if score >= POLARITY_THRESHOLD {
        "LABEL_2"
    } else if score <= -POLARITY_THRESHOLD {
        "LABEL_0"
    } else {
        "LABEL_1"
    };
    RawScore::new(label, 0.5 + f64::from(score.abs()) / 2.0)
}

/// [`SentimentScorer`] backed by [`lexicon_score`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

#[async_trait]
impl SentimentScorer for LexiconScorer {
    async fn score(&self, texts: &[&str]) -> Result<Vec<RawScore>, SentimentError> {
        Ok(texts.iter().map(|t| classify(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(lexicon_score(""), 0.0);
    }

    #[test]
    fn unknown_text_returns_zero() {
        assert_eq!(lexicon_score("the quick brown fox"), 0.0);
    }

    #[test]
    fn mixed_text_returns_intermediate() {
        // great (+0.4) + broken (-0.5)
        let score = lexicon_score("great release but the build is broken");
        assert!(score < 0.0 && score > -1.0, "got {score}");
    }

    #[test]
    fn score_clamps_to_bounds() {
        assert_eq!(lexicon_score("great excellent best love amazing awesome"), 1.0);
        assert_eq!(lexicon_score("terrible awful worst hate scam broken"), -1.0);
    }

    #[test]
    fn punctuation_stripped_from_words() {
        assert!(lexicon_score("love it!!!") > 0.0);
        assert!(lexicon_score("#scam") < 0.0);
    }

    #[test]
    fn classify_emits_model_labels() {
        assert_eq!(classify("this is great").label, "LABEL_2");
        assert_eq!(classify("this is terrible").label, "LABEL_0");
        assert_eq!(classify("shipping on tuesday").label, "LABEL_1");
    }

    #[test]
    fn neutral_text_has_half_confidence() {
        let raw = classify("shipping on tuesday");
        assert!((raw.score - 0.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn scorer_returns_one_result_per_text() {
        let scored = LexiconScorer
            .score(&["love it", "", "worst update ever"])
            .await
            .unwrap();
        assert_eq!(scored.len(), 3);
        assert!(scored.iter().all(|r| (0.0..=1.0).contains(&r.score)));
    }
}
