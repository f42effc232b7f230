//! Configuration commands.

use std::path::Path;

use eventrepeater_server::SignatureVerifier;

use crate::config::BotConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the current configuration to stdout, inline secrets masked.
pub fn dump(config: &BotConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(&config.redacted())
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration, resolving every secret reference.
pub fn validate(config: &BotConfig) -> ClientResult<()> {
    check(config)?;
    println!("Configuration is valid.");
    Ok(())
}

fn check(config: &BotConfig) -> ClientResult<()> {
    config.discord.to_discord_config()?;
    let public_key = config.discord.resolve_public_key()?;
    SignatureVerifier::from_hex(&public_key)
        .map_err(|e| ClientError::Config(format!("invalid public_key: {}", e)))?;
    config.server.validate()?;
    config.logging.tracing_config(false)?;
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    Ok(())
}
