//! Scheduled event lifecycle handling.
//!
//! Only the `Active -> Completed` transition of an event whose description
//! carries a recurrence token leads to a follow-up. Each qualifying
//! notification gets its own replication task, so a redelivered notification
//! creates another follow-up.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use eventrepeater_core::{EventStatus, Recurrence, ScheduledEvent};
use eventrepeater_protocol::GatewayEvent;

use crate::cache::SnapshotCache;
use crate::error::ServerResult;
use crate::replicator::Replicator;

/// A lifecycle change of a scheduled event.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleNotification {
    Created(ScheduledEvent),
    Updated {
        before: ScheduledEvent,
        after: ScheduledEvent,
    },
    Deleted(ScheduledEvent),
}

/// Handle of a spawned replication.
pub type ReplicationTask = JoinHandle<ServerResult<ScheduledEvent>>;

/// Turns lifecycle notifications into follow-up events.
pub struct LifecycleListener {
    replicator: Arc<Replicator>,
    cache: Mutex<SnapshotCache>,
}

impl LifecycleListener {
    pub fn new(replicator: Arc<Replicator>) -> Self {
        Self {
            replicator,
            cache: Mutex::new(SnapshotCache::new()),
        }
    }

    /// Returns true for the `Active -> Completed` transition.
    pub fn is_completion(before: &ScheduledEvent, after: &ScheduledEvent) -> bool {
        before.status == EventStatus::Active && after.status == EventStatus::Completed
    }

    /// Handles one notification, spawning a replication if it qualifies.
    pub fn handle(&self, notification: LifecycleNotification) -> Option<ReplicationTask> {
        match notification {
            LifecycleNotification::Created(event) => {
                info!(event_id = %event.id, guild_id = %event.guild_id, name = %event.name, "Scheduled event created");
                None
            }
            LifecycleNotification::Deleted(event) => {
                info!(event_id = %event.id, guild_id = %event.guild_id, name = %event.name, "Scheduled event deleted");
                None
            }
            LifecycleNotification::Updated { before, after } => {
                if !Self::is_completion(&before, &after) {
                    debug!(
                        event_id = %after.id,
                        from = %before.status,
                        to = %after.status,
                        "Ignoring non-completion transition"
                    );
                    return None;
                }

                // The previous snapshot is authoritative for the token.
                let Some(recurrence) = Recurrence::resolve(before.description_text()) else {
                    debug!(event_id = %before.id, "Completed event has no recurrence token");
                    return None;
                };

                info!(
                    event_id = %before.id,
                    guild_id = %before.guild_id,
                    recurrence = %recurrence,
                    "Recurring event completed, scheduling follow-up"
                );
                let replicator = self.replicator.clone();
                Some(tokio::spawn(async move {
                    replicator.replicate(&before, recurrence).await
                }))
            }
        }
    }

    /// Applies a gateway dispatch: keeps the snapshot cache current and
    /// derives lifecycle notifications from it.
    pub async fn on_gateway_event(&self, event: GatewayEvent) -> Option<ReplicationTask> {
        let notification = {
            let mut cache = self.cache.lock().await;
            match event {
                GatewayEvent::Ready { session_id } => {
                    info!(session_id = %session_id, "Gateway session ready");
                    None
                }
                GatewayEvent::GuildCreate {
                    guild_id,
                    scheduled_events,
                } => {
                    cache.seed(&guild_id, scheduled_events);
                    None
                }
                GatewayEvent::ScheduledEventCreate(event) => {
                    cache.upsert(event.clone());
                    Some(LifecycleNotification::Created(event))
                }
                GatewayEvent::ScheduledEventUpdate(after) => {
                    let previous = if after.status.is_final() {
                        // No further update or delete arrives for a finished event.
                        cache.remove(&after.id)
                    } else {
                        cache.upsert(after.clone())
                    };
                    match previous {
                        Some(before) => Some(LifecycleNotification::Updated { before, after }),
                        None => {
                            warn!(
                                event_id = %after.id,
                                status = %after.status,
                                "No previous snapshot for updated event, skipping"
                            );
                            None
                        }
                    }
                }
                GatewayEvent::ScheduledEventDelete(event) => {
                    cache.remove(&event.id);
                    Some(LifecycleNotification::Deleted(event))
                }
                GatewayEvent::Other(name) => {
                    trace!(event = %name, "Ignoring dispatch");
                    None
                }
            }
        };

        notification.and_then(|notification| self.handle(notification))
    }

    /// Number of cached snapshots.
    pub async fn snapshot_count(&self) -> usize {
        self.cache.lock().await.len()
    }
}
