//! Bot runtime: interactions endpoint, gateway, replication, ping workflow.
//!
//! This crate holds everything the `eventrepeater serve` process runs:
//! - the `POST /interactions` endpoint with signature verification
//! - the interaction dispatcher and the `/ping-event` workflow
//! - the gateway client feeding the lifecycle listener
//! - follow-up event replication
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use eventrepeater_platform::{DiscordClient, DiscordConfig, Platform};
//! use eventrepeater_server::{
//!     InteractionDispatcher, PendingComponents, PingWorkflow, ServerConfig,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let platform: Arc<dyn Platform> =
//!     Arc::new(DiscordClient::new(DiscordConfig::new("1234", "token"))?);
//! let config = ServerConfig::new("public-key-hex");
//! let workflow = Arc::new(PingWorkflow::new(
//!     platform,
//!     Arc::new(PendingComponents::new()),
//!     config.interaction_timeout,
//! ));
//! let _dispatcher = InteractionDispatcher::new(workflow);
//! # Ok(())
//! # }
//! ```

mod cache;
mod config;
mod dispatcher;
mod error;
mod gateway;
mod http;
mod listener;
mod replicator;
mod sessions;
mod signals;
mod verify;
mod workflow;

#[cfg(test)]
mod test_support;

pub use cache::SnapshotCache;
pub use config::{DEFAULT_INTERACTION_TIMEOUT, DEFAULT_PORT, ServerConfig};
pub use dispatcher::{GUILD_ONLY_TEXT, InteractionDispatcher};
pub use error::{ServerError, ServerResult};
pub use gateway::{GatewayClient, GatewayConfig, GatewayStream, gateway_endpoint, next_backoff};
pub use http::{AppState, router, serve};
pub use listener::{LifecycleListener, LifecycleNotification, ReplicationTask};
pub use replicator::{Replicator, build_replica};
pub use sessions::{ComponentWait, Delivery, PendingComponents};
pub use signals::{ShutdownHandle, ShutdownSignal, SignalHandler};
pub use verify::{SIGNATURE_HEADER, SignatureVerifier, TIMESTAMP_HEADER};
pub use workflow::{
    CANCEL_ID, CANCELED_TEXT, CONFIRM_ID, CONFIRMED_TEXT, FAILED_TEXT, NO_EVENTS_TEXT, PingSession,
    PingWorkflow, SELECT_EVENT_ID, SELECT_PROMPT_TEXT, TIMEOUT_TEXT, WorkflowOutcome,
    WorkflowState, confirmation_prompt, selection_prompt,
};
