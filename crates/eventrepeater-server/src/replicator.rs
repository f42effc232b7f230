//! Follow-up event creation.
//!
//! When a recurring event completes, a copy shifted by its recurrence
//! interval is created in the same guild. Timing, name, description and
//! location come from the source snapshot; privacy and location kind are
//! fixed.

use std::sync::Arc;

use tracing::{error, info};

use eventrepeater_core::{
    EntityType, NewScheduledEvent, PrivacyLevel, Recurrence, ScheduledEvent,
};
use eventrepeater_platform::Platform;

use crate::error::{ServerError, ServerResult};

/// Builds the creation request for the follow-up of `source`.
pub fn build_replica(source: &ScheduledEvent, recurrence: Recurrence) -> NewScheduledEvent {
    let offset = recurrence.offset();
    NewScheduledEvent {
        name: source.name.clone(),
        description: source.description.clone(),
        scheduled_start_time: source.scheduled_start_time + offset,
        scheduled_end_time: source.scheduled_end_time.map(|end| end + offset),
        privacy_level: PrivacyLevel::GuildOnly,
        entity_type: EntityType::External,
        entity_metadata: source.entity_metadata.clone(),
        image: None,
        cover_image_url: source.cover_image_url(),
    }
}

/// Creates follow-up events through the platform.
pub struct Replicator {
    platform: Arc<dyn Platform>,
}

impl Replicator {
    pub fn new(platform: Arc<dyn Platform>) -> Self {
        Self { platform }
    }

    /// Creates the follow-up of `source`. Exactly one create call is made.
    pub async fn replicate(
        &self,
        source: &ScheduledEvent,
        recurrence: Recurrence,
    ) -> ServerResult<ScheduledEvent> {
        let request = build_replica(source, recurrence);

        let result = async {
            let guild = self.platform.fetch_guild(&source.guild_id).await?;
            let created = self
                .platform
                .create_scheduled_event(&guild.id, request)
                .await?;
            Ok::<_, ServerError>(created)
        }
        .await;

        match &result {
            Ok(created) => info!(
                source_id = %source.id,
                event_id = %created.id,
                guild_id = %source.guild_id,
                recurrence = %recurrence,
                start = %created.scheduled_start_time,
                "Created follow-up event"
            ),
            Err(e) => error!(
                source_id = %source.id,
                guild_id = %source.guild_id,
                recurrence = %recurrence,
                error = %e,
                "Failed to create follow-up event"
            ),
        }
        result
    }
}
