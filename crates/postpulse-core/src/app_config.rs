#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Base URL of a text-classification inference server. `None` selects
    /// the in-process lexicon scorer.
    pub scorer_url: Option<String>,
    pub scorer_timeout_secs: u64,
    pub scorer_batch_size: usize,
    pub default_post_count: u32,
    pub max_post_count: u32,
    pub replies_per_post: u32,
    pub reply_fetch_delay_ms: u64,
    pub twitter_auth_token: Option<String>,
    pub twitter_ct0: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("scorer_url", &self.scorer_url)
            .field("scorer_timeout_secs", &self.scorer_timeout_secs)
            .field("scorer_batch_size", &self.scorer_batch_size)
            .field("default_post_count", &self.default_post_count)
            .field("max_post_count", &self.max_post_count)
            .field("replies_per_post", &self.replies_per_post)
            .field("reply_fetch_delay_ms", &self.reply_fetch_delay_ms)
            .field(
                "twitter_auth_token",
                &self.twitter_auth_token.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "twitter_ct0",
                &self.twitter_ct0.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}
