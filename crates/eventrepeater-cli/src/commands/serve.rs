//! The `serve` command: runs the bot in the foreground.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{error, info};

use eventrepeater_platform::{DiscordClient, Platform};
use eventrepeater_server::{
    AppState, GatewayClient, GatewayConfig, InteractionDispatcher, LifecycleListener,
    PendingComponents, PingWorkflow, Replicator, ServerConfig, SignalHandler, SignatureVerifier,
};

use crate::config::BotConfig;
use crate::error::{ClientError, ClientResult};

/// Command-line overrides of the `[server]` section.
#[derive(Debug, Clone, Default)]
pub struct ServeOverrides {
    pub listen: Option<IpAddr>,
    pub port: Option<u16>,
    pub interaction_timeout_secs: Option<u64>,
}

/// Merges the file settings with command-line overrides.
pub fn server_config(
    config: &BotConfig,
    public_key: String,
    overrides: &ServeOverrides,
) -> ClientResult<ServerConfig> {
    let mut settings = config.server.clone();
    if let Some(listen) = overrides.listen {
        settings.listen_address = listen;
    }
    if let Some(port) = overrides.port {
        settings.port = port;
    }
    if let Some(secs) = overrides.interaction_timeout_secs {
        settings.interaction_timeout_secs = secs;
    }
    settings.validate()?;
    Ok(settings.to_server_config(public_key))
}

/// Runs the bot until SIGTERM or SIGINT.
///
/// Failing to open the gateway at start-up is fatal. After that the gateway
/// reconnects on its own and the interactions endpoint keeps serving.
pub async fn run(config: &BotConfig, overrides: ServeOverrides) -> ClientResult<()> {
    let discord = config.discord.to_discord_config()?;
    let public_key = config.discord.resolve_public_key()?;
    let server_config = server_config(config, public_key, &overrides)?;
    let verifier = SignatureVerifier::from_hex(&server_config.public_key)?;

    let listener = bind(server_config.listen_addr).await?;

    let platform: Arc<dyn Platform> = Arc::new(DiscordClient::new(discord.clone())?);
    let lifecycle = Arc::new(LifecycleListener::new(Arc::new(Replicator::new(
        platform.clone(),
    ))));

    let signals = SignalHandler::new();
    signals.spawn_listener();

    let gateway = GatewayClient::new(
        GatewayConfig::new(discord.bot_token.clone(), &server_config),
        platform.clone(),
        lifecycle,
    );
    let stream = gateway.connect().await.inspect_err(|e| {
        error!(error = %e, "Could not connect to the gateway");
    })?;
    let shutdown = signals.shutdown_handle();
    let gateway_task = tokio::spawn(async move { gateway.run(stream, shutdown).await });

    let workflow = Arc::new(PingWorkflow::new(
        platform,
        Arc::new(PendingComponents::new()),
        server_config.interaction_timeout,
    ));
    let state = AppState::new(Arc::new(InteractionDispatcher::new(workflow)), verifier);
    let result = eventrepeater_server::serve(listener, state, signals.shutdown())
        .await
        .map_err(ClientError::from);

    // Whatever stopped the endpoint also stops the gateway.
    signals.trigger_shutdown();
    if tokio::time::timeout(Duration::from_secs(5), gateway_task)
        .await
        .is_err()
    {
        error!("Gateway did not stop in time");
    }
    info!("eventrepeater stopped");
    result
}

async fn bind(addr: SocketAddr) -> ClientResult<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| ClientError::Config(format!("failed to bind {}: {}", addr, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> BotConfig {
        toml::from_str("[server]\nlisten_address = \"10.0.0.1\"\nport = 4000\ninteraction_timeout_secs = 90\n")
            .unwrap()
    }

    #[test]
    fn file_settings_apply_without_overrides() {
        let server =
            server_config(&config(), "key".to_string(), &ServeOverrides::default()).unwrap();

        assert_eq!(server.listen_addr, "10.0.0.1:4000".parse().unwrap());
        assert_eq!(server.interaction_timeout, Duration::from_secs(90));
        assert_eq!(server.public_key, "key");
    }

    #[test]
    fn overrides_take_precedence() {
        let overrides = ServeOverrides {
            listen: Some("127.0.0.1".parse().unwrap()),
            port: Some(8080),
            interaction_timeout_secs: Some(15),
        };
        let server = server_config(&config(), "key".to_string(), &overrides).unwrap();

        assert_eq!(server.listen_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(server.interaction_timeout, Duration::from_secs(15));
    }

    #[test]
    fn zero_timeout_override_is_rejected() {
        let overrides = ServeOverrides {
            interaction_timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(server_config(&config(), "key".to_string(), &overrides).is_err());
    }

    #[tokio::test]
    async fn serve_fails_before_connecting_without_credentials() {
        let err = run(&BotConfig::default(), ServeOverrides::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
