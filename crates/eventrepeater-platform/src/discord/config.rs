//! Discord REST client configuration.

use std::fmt;
use std::time::Duration;

use crate::error::{PlatformError, PlatformResult};

/// Default REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Configuration for [`DiscordClient`](super::DiscordClient).
#[derive(Clone)]
pub struct DiscordConfig {
    /// Application (client) id; scopes commands and interaction webhooks.
    pub application_id: String,
    /// Bot token sent as `Authorization: Bot <token>`.
    pub bot_token: String,
    /// REST API base URL, without trailing slash.
    pub api_base: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl DiscordConfig {
    /// Creates a configuration against the public API.
    pub fn new(application_id: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            bot_token: bot_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Builder: set the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks that every field is usable.
    pub fn validate(&self) -> PlatformResult<()> {
        if self.application_id.trim().is_empty() {
            return Err(PlatformError::configuration("application_id is required"));
        }
        if !self.application_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(PlatformError::configuration(
                "application_id must be a numeric snowflake",
            ));
        }
        if self.bot_token.trim().is_empty() {
            return Err(PlatformError::configuration("bot_token is required"));
        }
        url::Url::parse(&self.api_base).map_err(|e| {
            PlatformError::configuration(format!("invalid api_base `{}`: {}", self.api_base, e))
        })?;
        Ok(())
    }
}

// The token stays out of logs.
impl fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("application_id", &self.application_id)
            .field("bot_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}
