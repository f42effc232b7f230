//! Last-known scheduled event snapshots.
//!
//! Gateway update notifications only carry the new state of an event. The
//! cache keeps the previous state so the listener can see the transition.

use std::collections::HashMap;

use tracing::{debug, trace};

use eventrepeater_core::ScheduledEvent;

/// Snapshots keyed by event id.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: HashMap<String, ScheduledEvent>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every snapshot of `guild_id` with `events`.
    ///
    /// Events that already ended are not kept.
    pub fn seed(&mut self, guild_id: &str, events: Vec<ScheduledEvent>) {
        self.entries.retain(|_, event| event.guild_id != guild_id);
        for event in events.into_iter().filter(|event| !event.status.is_final()) {
            self.entries.insert(event.id.clone(), event);
        }
        debug!(guild_id = %guild_id, count = self.entries.len(), "Seeded snapshot cache");
    }

    /// Stores `event` and returns the snapshot it replaced.
    pub fn upsert(&mut self, event: ScheduledEvent) -> Option<ScheduledEvent> {
        let previous = self.entries.insert(event.id.clone(), event);
        trace!(replaced = previous.is_some(), "Upserted snapshot");
        previous
    }

    /// Removes and returns the snapshot of an event.
    pub fn remove(&mut self, event_id: &str) -> Option<ScheduledEvent> {
        let removed = self.entries.remove(event_id);
        if removed.is_some() {
            debug!(event_id = %event_id, "Removed snapshot");
        }
        removed
    }

    /// Returns the snapshot of an event.
    pub fn get(&self, event_id: &str) -> Option<&ScheduledEvent> {
        self.entries.get(event_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
