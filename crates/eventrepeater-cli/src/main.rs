//! eventrepeater entry point.

use std::process::ExitCode;

use clap::Parser;

use eventrepeater_cli::cli::{Cli, Command, ConfigAction};
use eventrepeater_cli::commands;
use eventrepeater_cli::commands::serve::ServeOverrides;
use eventrepeater_cli::config::BotConfig;
use eventrepeater_cli::error::{ClientError, ClientResult};
use eventrepeater_core::init_tracing;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let path = cli.config.clone().unwrap_or_else(BotConfig::default_path);
    let config = if let Some(ref path) = cli.config {
        BotConfig::load_from(path).map_err(ClientError::Config)?
    } else {
        BotConfig::load().map_err(ClientError::Config)?
    };

    init_tracing(config.logging.tracing_config(cli.debug)?)?;

    match cli.command {
        Command::Serve {
            listen,
            port,
            interaction_timeout,
        } => {
            let overrides = ServeOverrides {
                listen,
                port,
                interaction_timeout_secs: interaction_timeout,
            };
            commands::serve::run(&config, overrides).await
        }
        Command::Register => commands::register::run(&config).await,
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&path),
        },
    }
}
