//! Twitter/X post source via the `bird` CLI.
//!
//! Invokes `bird <subcommand> ... --json -n N --auth-token ... --ct0 ...` as a
//! subprocess and decodes its JSON array output.

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use postpulse_core::{PostKind, RawPost};
use regex::Regex;
use serde::Deserialize;

use super::{PostSource, SourceError};
use crate::types::SentimentConfig;

const DEFAULT_PROGRAM: &str = "bird";

static HANDLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@?([A-Za-z0-9_]{1,15})$").expect("valid handle regex"));

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BirdTweet {
    id: String,
    text: String,
    created_at: Option<String>,
    #[serde(default)]
    like_count: i64,
    #[serde(default)]
    reply_count: i64,
    #[serde(default)]
    retweet_count: i64,
    author: BirdAuthor,
}

#[derive(Deserialize)]
struct BirdAuthor {
    username: String,
}

impl BirdTweet {
    fn into_raw(self, kind: PostKind) -> Option<RawPost> {
        let Some(created_at) = self.created_at else {
            tracing::warn!(id = %self.id, "bird post has no createdAt; skipping");
            return None;
        };
        Some(RawPost {
            external_id: self.id,
            kind,
            author: self.author.username,
            text: self.text,
            created_at,
            likes: self.like_count,
            replies: self.reply_count,
            retweets: self.retweet_count,
        })
    }
}

/// Validates a Twitter handle, stripping a leading `@`.
///
/// # Errors
///
/// Returns [`SourceError::InvalidHandle`] unless the handle is 1 to 15
/// letters, digits or underscores.
pub fn normalize_handle(handle: &str) -> Result<&str, SourceError> {
    HANDLE_RE
        .captures(handle.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| SourceError::InvalidHandle(handle.to_string()))
}

fn decode(command: &str, stdout: &[u8], kind: PostKind) -> Result<Vec<RawPost>, SourceError> {
    let tweets: Vec<BirdTweet> = serde_json::from_slice(stdout).map_err(|e| SourceError::Decode {
        command: command.to_string(),
        reason: e.to_string(),
    })?;
    Ok(tweets.into_iter().filter_map(|t| t.into_raw(kind)).collect())
}

/// [`PostSource`] backed by the `bird` CLI.
pub struct BirdSource {
    program: String,
    auth_token: String,
    ct0: String,
    replies_per_post: u32,
    reply_delay: Duration,
}

impl BirdSource {
    /// # Errors
    ///
    /// Returns [`SourceError::MissingCredentials`] unless both Twitter session
    /// values are configured.
    pub fn from_config(config: &SentimentConfig) -> Result<Self, SourceError> {
        let (auth_token, ct0) = config
            .twitter_credentials()
            .ok_or(SourceError::MissingCredentials)?;
        Ok(Self {
            program: DEFAULT_PROGRAM.to_string(),
            auth_token: auth_token.to_string(),
            ct0: ct0.to_string(),
            replies_per_post: config.replies_per_post,
            reply_delay: Duration::from_millis(config.reply_fetch_delay_ms),
        })
    }

    /// Use a different executable than `bird` on `PATH`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    async fn run(
        &self,
        subcommand: &str,
        target: &str,
        count: u32,
        kind: PostKind,
    ) -> Result<Vec<RawPost>, SourceError> {
        let command = format!("{} {subcommand}", self.program);
        let count = count.to_string();
        let output = tokio::process::Command::new(&self.program)
            .args([
                subcommand,
                target,
                "--json",
                "-n",
                &count,
                "--auth-token",
                &self.auth_token,
                "--ct0",
                &self.ct0,
            ])
            .output()
            .await
            .map_err(|e| SourceError::Spawn {
                command: command.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(SourceError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        decode(&command, &output.stdout, kind)
    }
}

#[async_trait]
impl PostSource for BirdSource {
    async fn search(&self, query: &str, count: u32) -> Result<Vec<RawPost>, SourceError> {
        let posts = self.run("search", query, count, PostKind::Original).await?;
        tracing::debug!(query, count = posts.len(), "bird search");
        Ok(posts)
    }

    async fn fetch_for_author(
        &self,
        username: &str,
        max_count: u32,
    ) -> Result<Vec<RawPost>, SourceError> {
        let handle = normalize_handle(username)?;
        let originals = self
            .run("user-tweets", handle, max_count, PostKind::Original)
            .await?;
        tracing::debug!(handle, count = originals.len(), "bird user-tweets");

        let mut replies = Vec::new();
        for (i, post) in originals.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.reply_delay).await;
            }
            match self
                .run("replies", &post.external_id, self.replies_per_post, PostKind::Reply)
                .await
            {
                Ok(found) => replies.extend(
                    found
                        .into_iter()
                        .filter(|r| r.external_id != post.external_id),
                ),
                Err(e) => {
                    tracing::warn!(
                        handle,
                        post_id = %post.external_id,
                        error = %e,
                        "bird replies failed; skipping"
                    );
                }
            }
        }

        let mut posts = originals;
        posts.extend(replies);
        Ok(posts)
    }
}
