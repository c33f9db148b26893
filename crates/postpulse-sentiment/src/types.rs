use postpulse_core::AppConfig;

const DEFAULT_SCORER_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SCORER_BATCH_SIZE: usize = 64;
const DEFAULT_REPLIES_PER_POST: u32 = 30;
const DEFAULT_REPLY_FETCH_DELAY_MS: u64 = 500;

/// Settings for the scorer and the `bird` post source.
#[derive(Clone)]
pub struct SentimentConfig {
    /// Base URL of the classification service. `None` selects the built-in
    /// lexicon scorer.
    pub scorer_url: Option<String>,
    pub scorer_timeout_secs: u64,
    /// Maximum number of texts per classification request.
    pub scorer_batch_size: usize,
    pub replies_per_post: u32,
    /// Pause between consecutive `bird replies` calls.
    pub reply_fetch_delay_ms: u64,
    pub twitter_auth_token: Option<String>,
    pub twitter_ct0: Option<String>,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            scorer_url: None,
            scorer_timeout_secs: DEFAULT_SCORER_TIMEOUT_SECS,
            scorer_batch_size: DEFAULT_SCORER_BATCH_SIZE,
            replies_per_post: DEFAULT_REPLIES_PER_POST,
            reply_fetch_delay_ms: DEFAULT_REPLY_FETCH_DELAY_MS,
            twitter_auth_token: None,
            twitter_ct0: None,
        }
    }
}

impl SentimentConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            scorer_url: config.scorer_url.clone(),
            scorer_timeout_secs: config.scorer_timeout_secs,
            scorer_batch_size: config.scorer_batch_size,
            replies_per_post: config.replies_per_post,
            reply_fetch_delay_ms: config.reply_fetch_delay_ms,
            twitter_auth_token: config.twitter_auth_token.clone(),
            twitter_ct0: config.twitter_ct0.clone(),
        }
    }

    /// Both halves of the `bird` session, if configured.
    #[must_use]
    pub fn twitter_credentials(&self) -> Option<(&str, &str)> {
        match (&self.twitter_auth_token, &self.twitter_ct0) {
            (Some(auth), Some(ct0)) => Some((auth.as_str(), ct0.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for SentimentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("SentimentConfig")
            .field("scorer_url", &self.scorer_url)
            .field("scorer_timeout_secs", &self.scorer_timeout_secs)
            .field("scorer_batch_size", &self.scorer_batch_size)
            .field("replies_per_post", &self.replies_per_post)
            .field("reply_fetch_delay_ms", &self.reply_fetch_delay_ms)
            .field("twitter_auth_token", &redact(&self.twitter_auth_token))
            .field("twitter_ct0", &redact(&self.twitter_ct0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_require_both_halves() {
        let mut config = SentimentConfig {
            twitter_auth_token: Some("auth".to_string()),
            ..SentimentConfig::default()
        };
        assert!(config.twitter_credentials().is_none());

        config.twitter_ct0 = Some("ct0".to_string());
        assert_eq!(config.twitter_credentials(), Some(("auth", "ct0")));
    }

    #[test]
    fn debug_redacts_credentials() {
        let config = SentimentConfig {
            twitter_auth_token: Some("s3cret-token".to_string()),
            twitter_ct0: Some("s3cret-ct0".to_string()),
            ..SentimentConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret"), "{rendered}");
        assert!(rendered.contains("[redacted]"));
    }
}
