//! Gateway websocket client.
//!
//! Keeps one gateway session open, answers heartbeats and feeds scheduled
//! event dispatches to the [`LifecycleListener`]. Failing to connect at
//! start-up is fatal; later drops are retried with exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

use eventrepeater_platform::Platform;
use eventrepeater_protocol::{GATEWAY_VERSION, GatewayEvent, GatewayFrame, opcode};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::listener::LifecycleListener;
use crate::signals::ShutdownHandle;

/// An open gateway websocket.
pub type GatewayStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A session that stayed up this long resets the reconnect backoff.
const STABLE_SESSION: Duration = Duration::from_secs(60);

/// Why a session ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// The gateway asked for a reconnect or closed the socket.
    Reconnect,
    Shutdown,
}

/// Gateway connection settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bot_token: String,
    pub intents: u64,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl GatewayConfig {
    pub fn new(bot_token: impl Into<String>, server: &ServerConfig) -> Self {
        Self {
            bot_token: bot_token.into(),
            intents: server.intents,
            initial_backoff: server.reconnect_initial_backoff,
            max_backoff: server.reconnect_max_backoff,
        }
    }
}

/// Builds the websocket URL for a gateway base URL.
pub fn gateway_endpoint(base: &str) -> String {
    format!(
        "{}/?v={}&encoding=json",
        base.trim_end_matches('/'),
        GATEWAY_VERSION
    )
}

/// Returns the next reconnect delay.
pub fn next_backoff(current: Duration, max: Duration) -> Duration {
    std::cmp::min(current * 2, max)
}

/// Gateway client.
pub struct GatewayClient {
    config: GatewayConfig,
    platform: Arc<dyn Platform>,
    listener: Arc<LifecycleListener>,
}

impl GatewayClient {
    pub fn new(
        config: GatewayConfig,
        platform: Arc<dyn Platform>,
        listener: Arc<LifecycleListener>,
    ) -> Self {
        Self {
            config,
            platform,
            listener,
        }
    }

    /// Opens a gateway connection.
    pub async fn connect(&self) -> ServerResult<GatewayStream> {
        let base = self.platform.gateway_url().await?;
        let url = gateway_endpoint(&base);
        let (stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| ServerError::gateway(format!("websocket connect failed: {}", e)))?;
        info!(url = %url, "Gateway connected");
        Ok(stream)
    }

    /// Runs sessions until shutdown, starting from an open connection.
    pub async fn run(&self, stream: GatewayStream, shutdown: ShutdownHandle) {
        let mut stream = stream;
        let mut backoff = self.config.initial_backoff;

        loop {
            let started = Instant::now();
            match self.run_session(stream, &shutdown).await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::Reconnect) => info!("Gateway session ended"),
                Err(e) => warn!(error = %e, "Gateway session failed"),
            }
            if started.elapsed() >= STABLE_SESSION {
                backoff = self.config.initial_backoff;
            }

            stream = loop {
                warn!(backoff_secs = backoff.as_secs_f64(), "Reconnecting to gateway");
                tokio::select! {
                    _ = tokio::time::sleep(backoff) => {}
                    _ = shutdown.wait().wait() => {
                        info!("Gateway stopped");
                        return;
                    }
                }
                backoff = next_backoff(backoff, self.config.max_backoff);

                match self.connect().await {
                    Ok(stream) => break stream,
                    Err(e) => error!(error = %e, "Gateway reconnect failed"),
                }
            };
        }
        info!("Gateway stopped");
    }

    async fn run_session(
        &self,
        stream: GatewayStream,
        shutdown: &ShutdownHandle,
    ) -> ServerResult<SessionEnd> {
        let (mut tx, mut rx) = stream.split();

        let hello = match rx.next().await {
            Some(Ok(WsMessage::Text(text))) => GatewayFrame::parse(&text)?,
            Some(Ok(other)) => {
                return Err(ServerError::gateway(format!(
                    "expected hello, got {:?}",
                    other
                )));
            }
            Some(Err(e)) => return Err(ServerError::gateway(format!("read failed: {}", e))),
            None => return Ok(SessionEnd::Reconnect),
        };
        if hello.op != opcode::HELLO {
            return Err(ServerError::gateway(format!(
                "expected hello, got opcode {}",
                hello.op
            )));
        }
        let interval = Duration::from_millis(hello.heartbeat_interval()?);
        debug!(interval_ms = interval.as_millis() as u64, "Gateway hello");

        let identify = GatewayFrame::identify(&self.config.bot_token, self.config.intents);
        send(&mut tx, &identify).await?;

        let mut heartbeat = tokio::time::interval_at(Instant::now() + interval, interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut sequence: Option<u64> = None;
        let mut acknowledged = true;
        let mut stop = Box::pin(shutdown.wait().wait());

        loop {
            tokio::select! {
                _ = &mut stop => {
                    let _ = tx.send(WsMessage::Close(None)).await;
                    return Ok(SessionEnd::Shutdown);
                }
                _ = heartbeat.tick() => {
                    if !acknowledged {
                        return Err(ServerError::gateway("heartbeat not acknowledged"));
                    }
                    acknowledged = false;
                    send(&mut tx, &GatewayFrame::heartbeat(sequence)).await?;
                    trace!(?sequence, "Heartbeat sent");
                }
                message = rx.next() => {
                    let text = match message {
                        Some(Ok(WsMessage::Text(text))) => text,
                        Some(Ok(WsMessage::Ping(data))) => {
                            let _ = tx.send(WsMessage::Pong(data)).await;
                            continue;
                        }
                        Some(Ok(WsMessage::Close(frame))) => {
                            info!(?frame, "Gateway closed the connection");
                            return Ok(SessionEnd::Reconnect);
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => return Err(ServerError::gateway(format!("read failed: {}", e))),
                        None => return Ok(SessionEnd::Reconnect),
                    };

                    let frame = match GatewayFrame::parse(&text) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(error = %e, "Undecodable gateway frame");
                            continue;
                        }
                    };
                    if frame.s.is_some() {
                        sequence = frame.s;
                    }

                    match frame.op {
                        opcode::DISPATCH => self.dispatch(&frame).await,
                        opcode::HEARTBEAT => {
                            send(&mut tx, &GatewayFrame::heartbeat(sequence)).await?;
                        }
                        opcode::HEARTBEAT_ACK => acknowledged = true,
                        opcode::RECONNECT => {
                            info!("Gateway requested reconnect");
                            return Ok(SessionEnd::Reconnect);
                        }
                        opcode::INVALID_SESSION => {
                            warn!("Gateway session invalidated");
                            return Ok(SessionEnd::Reconnect);
                        }
                        other => trace!(op = other, "Ignoring gateway opcode"),
                    }
                }
            }
        }
    }

    async fn dispatch(&self, frame: &GatewayFrame) {
        match GatewayEvent::from_dispatch(frame) {
            Ok(event) => {
                // Replications run detached; the handle is only useful in tests.
                let _ = self.listener.on_gateway_event(event).await;
            }
            Err(e) => warn!(event = ?frame.t, error = %e, "Undecodable dispatch"),
        }
    }
}

async fn send<S>(tx: &mut S, frame: &GatewayFrame) -> ServerResult<()>
where
    S: Sink<WsMessage> + Unpin,
    S::Error: std::fmt::Display,
{
    let text = frame.to_text()?;
    tx.send(WsMessage::Text(text.into()))
        .await
        .map_err(|e| ServerError::gateway(format!("send failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_pins_version_and_encoding() {
        assert_eq!(
            gateway_endpoint("wss://gateway.discord.gg"),
            "wss://gateway.discord.gg/?v=10&encoding=json"
        );
        assert_eq!(
            gateway_endpoint("wss://gateway.discord.gg/"),
            "wss://gateway.discord.gg/?v=10&encoding=json"
        );
    }

    #[test]
    fn backoff_doubles_up_to_max() {
        let max = Duration::from_secs(60);
        assert_eq!(next_backoff(Duration::from_secs(1), max), Duration::from_secs(2));
        assert_eq!(next_backoff(Duration::from_secs(40), max), max);
        assert_eq!(next_backoff(max, max), max);
    }

    #[test]
    fn config_takes_server_settings() {
        let server = ServerConfig::default()
            .with_reconnect_backoff(Duration::from_millis(250), Duration::from_secs(30));
        let config = GatewayConfig::new("token", &server);

        assert_eq!(config.bot_token, "token");
        assert_eq!(config.intents, server.intents);
        assert_eq!(config.initial_backoff, Duration::from_millis(250));
        assert_eq!(config.max_backoff, Duration::from_secs(30));
    }
}
