//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use eventrepeater_protocol::intents;

/// Default port for the interactions endpoint.
pub const DEFAULT_PORT: u16 = 3000;

/// Default bound on each wait for a component interaction.
pub const DEFAULT_INTERACTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the interactions endpoint listens on.
    pub listen_addr: SocketAddr,

    /// Hex-encoded Ed25519 application public key.
    pub public_key: String,

    /// How long the ping workflow waits for each click.
    pub interaction_timeout: Duration,

    /// Gateway intents requested on identify.
    pub intents: u64,

    /// First reconnect delay after the gateway drops.
    pub reconnect_initial_backoff: Duration,

    /// Upper bound on the reconnect delay.
    pub reconnect_max_backoff: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            public_key: String::new(),
            interaction_timeout: DEFAULT_INTERACTION_TIMEOUT,
            intents: intents::GUILDS | intents::GUILD_SCHEDULED_EVENTS,
            reconnect_initial_backoff: Duration::from_secs(1),
            reconnect_max_backoff: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Creates a configuration with the given application public key.
    pub fn new(public_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            ..Default::default()
        }
    }

    /// Builder: set the listen address.
    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    /// Builder: set the interaction timeout.
    pub fn with_interaction_timeout(mut self, timeout: Duration) -> Self {
        self.interaction_timeout = timeout;
        self
    }

    /// Builder: set the reconnect backoff bounds.
    pub fn with_reconnect_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.reconnect_initial_backoff = initial;
        self.reconnect_max_backoff = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr.port(), DEFAULT_PORT);
        assert_eq!(config.interaction_timeout, Duration::from_secs(60));
        assert_eq!(config.intents, 65537);
    }

    #[test]
    fn custom_config() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let config = ServerConfig::new("abcd")
            .with_listen_addr(addr)
            .with_interaction_timeout(Duration::from_secs(5))
            .with_reconnect_backoff(Duration::from_millis(10), Duration::from_secs(1));

        assert_eq!(config.public_key, "abcd");
        assert_eq!(config.listen_addr, addr);
        assert_eq!(config.interaction_timeout, Duration::from_secs(5));
        assert_eq!(config.reconnect_initial_backoff, Duration::from_millis(10));
        assert_eq!(config.reconnect_max_backoff, Duration::from_secs(1));
    }
}
