//! Command-line interface definition.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// eventrepeater - Repeats Discord scheduled events and pings their attendees
#[derive(Debug, Parser)]
#[command(name = "eventrepeater")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "EVENTREPEATER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the bot: interactions endpoint and gateway listener
    Serve {
        /// Address the interactions endpoint binds to
        #[arg(long, env = "EVENTREPEATER_LISTEN")]
        listen: Option<IpAddr>,

        /// Port the interactions endpoint binds to
        #[arg(long, short, env = "EVENTREPEATER_PORT")]
        port: Option<u16>,

        /// Seconds the ping workflow waits for each click
        #[arg(long)]
        interaction_timeout: Option<u64>,
    },

    /// Overwrite the global slash commands with `help` and `ping-event`
    Register,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_serve_overrides() {
        let cli = Cli::try_parse_from([
            "eventrepeater",
            "--debug",
            "serve",
            "--listen",
            "127.0.0.1",
            "--port",
            "8080",
            "--interaction-timeout",
            "30",
        ])
        .unwrap();

        assert!(cli.debug);
        match cli.command {
            Command::Serve {
                listen,
                port,
                interaction_timeout,
            } => {
                assert_eq!(listen, Some("127.0.0.1".parse().unwrap()));
                assert_eq!(port, Some(8080));
                assert_eq!(interaction_timeout, Some(30));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parses_config_actions() {
        let cli =
            Cli::try_parse_from(["eventrepeater", "-c", "/tmp/bot.toml", "config", "validate"])
                .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/bot.toml")));
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Validate
            }
        ));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["eventrepeater"]).is_err());
    }
}
