//! Pending component waits.
//!
//! A workflow about to show a prompt registers a wait under the id of the
//! interaction that started it, together with the user allowed to click and
//! the components the prompt carries. Every reply to that interaction points
//! back at it, so the dispatcher can route a click before the edit that
//! rendered the prompt has even returned. Only a click from that user on one
//! of those components reaches the waiting workflow.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{Mutex, oneshot};
use tracing::{debug, info};

use eventrepeater_protocol::ComponentData;

/// What happened to a forwarded component interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the waiting workflow.
    Delivered,
    /// Nothing is waiting on that interaction.
    NoSession,
    /// Someone other than the invoking user clicked.
    WrongUser,
    /// A component the current prompt does not carry, e.g. a late click on
    /// the previous one.
    Unexpected,
}

#[derive(Debug)]
struct PendingWait {
    user_id: String,
    custom_ids: Vec<String>,
    tx: oneshot::Sender<ComponentData>,
}

/// A registered wait, resolved with [`PendingComponents::wait`].
#[derive(Debug)]
pub struct ComponentWait {
    key: String,
    rx: oneshot::Receiver<ComponentData>,
}

/// Waits keyed by originating interaction id.
#[derive(Debug, Default)]
pub struct PendingComponents {
    waits: Mutex<HashMap<String, PendingWait>>,
}

impl PendingComponents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a wait for one click by `user_id` on any of `custom_ids`.
    ///
    /// Replaces an earlier wait under the same key.
    pub async fn register(&self, key: &str, user_id: &str, custom_ids: &[&str]) -> ComponentWait {
        let (tx, rx) = oneshot::channel();
        let mut waits = self.waits.lock().await;
        waits.insert(
            key.to_string(),
            PendingWait {
                user_id: user_id.to_string(),
                custom_ids: custom_ids.iter().map(|id| id.to_string()).collect(),
                tx,
            },
        );
        debug!(
            key = %key,
            pending_count = waits.len(),
            "Registered component wait"
        );
        ComponentWait {
            key: key.to_string(),
            rx,
        }
    }

    /// Resolves a registered wait.
    ///
    /// Returns `None` when `timeout` elapses first; the wait is then dropped.
    pub async fn wait(&self, wait: ComponentWait, timeout: Duration) -> Option<ComponentData> {
        let ComponentWait { key, rx } = wait;

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(data)) => Some(data),
            Ok(Err(_)) => {
                debug!(key = %key, "Component wait dropped");
                None
            }
            Err(_) => {
                self.unregister(&key).await;
                info!(
                    key = %key,
                    timeout_secs = timeout.as_secs(),
                    "Component wait timed out"
                );
                None
            }
        }
    }

    /// Drops the wait under `key`, if any.
    pub async fn unregister(&self, key: &str) {
        if self.waits.lock().await.remove(key).is_some() {
            debug!(key = %key, "Unregistered component wait");
        }
    }

    /// Forwards a click to the workflow waiting under `key`.
    pub async fn deliver(&self, key: &str, user_id: &str, data: ComponentData) -> Delivery {
        let mut waits = self.waits.lock().await;
        let Some(wait) = waits.get(key) else {
            debug!(key = %key, "No pending wait for component");
            return Delivery::NoSession;
        };

        if wait.user_id != user_id {
            debug!(key = %key, user_id = %user_id, "Ignoring component from another user");
            return Delivery::WrongUser;
        }
        if !wait.custom_ids.contains(&data.custom_id) {
            debug!(
                key = %key,
                custom_id = %data.custom_id,
                "Ignoring component not on the current prompt"
            );
            return Delivery::Unexpected;
        }

        let Some(wait) = waits.remove(key) else {
            return Delivery::NoSession;
        };
        // The receiver is gone only if the wait timed out meanwhile.
        match wait.tx.send(data) {
            Ok(()) => Delivery::Delivered,
            Err(_) => Delivery::NoSession,
        }
    }

    /// Returns true if a workflow is waiting under `key`.
    pub async fn is_waiting(&self, key: &str) -> bool {
        self.waits.lock().await.contains_key(key)
    }

    /// Number of active waits.
    pub async fn len(&self) -> usize {
        self.waits.lock().await.len()
    }
}
