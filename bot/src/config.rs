//! Bot Configuration
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use uuid::Uuid;

/// Bot configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Base URL of the Kaiku API (e.g., `https://chat.example.com`)
    pub api_url: String,

    /// Bot token, sent as `Authorization: Bot <token>`
    pub bot_token: String,

    /// The bot's own user ID
    pub bot_user_id: Uuid,

    /// Per-request timeout (default: 15s)
    pub request_timeout: Duration,

    /// User-Agent header
    pub user_agent: String,
}

impl BotConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let bot_user_id = env::var("KAIKU_BOT_USER_ID").context("KAIKU_BOT_USER_ID must be set")?;

        Ok(Self {
            api_url: env::var("KAIKU_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into())
                .trim_end_matches('/')
                .to_string(),
            bot_token: env::var("KAIKU_BOT_TOKEN").context("KAIKU_BOT_TOKEN must be set")?,
            bot_user_id: bot_user_id
                .parse()
                .with_context(|| format!("KAIKU_BOT_USER_ID is not a UUID: {bot_user_id}"))?,
            request_timeout: Duration::from_secs(
                env::var("KAIKU_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(15),
            ),
            user_agent: env::var("KAIKU_USER_AGENT")
                .unwrap_or_else(|_| concat!("vc-bot/", env!("CARGO_PKG_VERSION")).into()),
        })
    }

    /// Create a default configuration for testing.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            api_url: "http://localhost:8080".into(),
            bot_token: "test-token".into(),
            bot_user_id: Uuid::nil(),
            request_timeout: Duration::from_secs(5),
            user_agent: "vc-bot/test".into(),
        }
    }
}
