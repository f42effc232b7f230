//! Bot configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/eventrepeater/config.toml` by default.
//!
//! Credential values (`bot_token`, `public_key`) support secret references:
//! - `pass::path/in/store` resolved via `pass show`
//! - `env::VAR_NAME` resolved from the environment
//! - plain text used as-is

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::Level;

use eventrepeater_core::{TracingConfig, TracingOutputFormat};
use eventrepeater_platform::{DEFAULT_API_BASE, DiscordConfig};
use eventrepeater_server::{DEFAULT_INTERACTION_TIMEOUT, DEFAULT_PORT, ServerConfig};

use crate::error::{ClientError, ClientResult};
use crate::secret;

// ---------------------------------------------------------------------------
// BotConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the eventrepeater bot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Discord application settings.
    pub discord: DiscordSettings,

    /// Interactions endpoint settings.
    pub server: ServerSettings,

    /// Log output settings.
    pub logging: LoggingSettings,
}

/// Discord application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordSettings {
    /// Application (client) id.
    pub application_id: Option<String>,

    /// Bot token (supports `pass::` and `env::` prefixes).
    pub bot_token: Option<String>,

    /// Hex application public key (supports `pass::` and `env::` prefixes).
    pub public_key: Option<String>,

    /// REST API base URL.
    pub api_base: String,
}

impl Default for DiscordSettings {
    fn default() -> Self {
        Self {
            application_id: None,
            bot_token: None,
            public_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Interactions endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind.
    pub listen_address: IpAddr,

    /// Port to bind.
    pub port: u16,

    /// Seconds the ping workflow waits for each click.
    pub interaction_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            interaction_timeout_secs: DEFAULT_INTERACTION_TIMEOUT.as_secs(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `pretty`, `compact` or `json`.
    pub format: String,

    /// Default level when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: "compact".to_string(),
            level: "info".to_string(),
        }
    }
}

impl BotConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eventrepeater")
    }

    /// Copy with inline secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        for value in [
            &mut config.discord.bot_token,
            &mut config.discord.public_key,
        ]
        .into_iter()
        .flatten()
        {
            if !secret::is_reference(value) {
                *value = "<redacted>".to_string();
            }
        }
        config
    }
}

impl DiscordSettings {
    /// Resolves credentials and builds the REST client configuration.
    pub fn to_discord_config(&self) -> ClientResult<DiscordConfig> {
        let application_id = self.application_id.as_deref().ok_or_else(|| {
            ClientError::Config(format!(
                "Discord application not configured. Add to {}:\n  \
                 [discord]\n  \
                 application_id = \"YOUR_APPLICATION_ID\"\n  \
                 bot_token = \"env::DISCORD_BOT_TOKEN\"\n  \
                 public_key = \"YOUR_PUBLIC_KEY\"",
                BotConfig::default_path().display()
            ))
        })?;
        let bot_token = resolve_required("bot_token", self.bot_token.as_deref())?;

        let config = DiscordConfig::new(application_id, bot_token).with_api_base(&self.api_base);
        config.validate()?;
        Ok(config)
    }

    /// Resolves the application public key.
    pub fn resolve_public_key(&self) -> ClientResult<String> {
        resolve_required("public_key", self.public_key.as_deref())
    }
}

fn resolve_required(field: &str, value: Option<&str>) -> ClientResult<String> {
    let raw = value.ok_or_else(|| {
        ClientError::Config(format!("{} is missing from [discord] section in config.toml", field))
    })?;
    secret::resolve(raw)
        .map_err(|e| ClientError::Config(format!("failed to resolve {}: {}", field, e)))
}

impl ServerSettings {
    /// Builds the runtime configuration for the given public key.
    pub fn to_server_config(&self, public_key: impl Into<String>) -> ServerConfig {
        ServerConfig::new(public_key)
            .with_listen_addr(SocketAddr::new(self.listen_address, self.port))
            .with_interaction_timeout(Duration::from_secs(self.interaction_timeout_secs))
    }

    /// Checks value ranges.
    pub fn validate(&self) -> ClientResult<()> {
        if self.interaction_timeout_secs == 0 {
            return Err(ClientError::Config(
                "interaction_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl LoggingSettings {
    /// Builds the tracing configuration; `debug` switches to terminal debugging.
    pub fn tracing_config(&self, debug: bool) -> ClientResult<TracingConfig> {
        if debug {
            return Ok(TracingConfig::cli_debug());
        }
        let format: TracingOutputFormat = self.format.parse()?;
        let level: Level = self
            .level
            .parse()
            .map_err(|_| ClientError::Config(format!("unknown log level `{}`", self.level)))?;
        Ok(TracingConfig::default().with_format(format).with_level(level))
    }
}
