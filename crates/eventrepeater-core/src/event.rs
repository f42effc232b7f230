//! Scheduled event types.
//!
//! This module provides the snapshot types the bot receives from the platform:
//! - [`ScheduledEvent`]: a guild scheduled event as delivered by the gateway or REST API
//! - [`EventStatus`]: the lifecycle status of an event
//! - [`NewScheduledEvent`]: the body submitted when creating a follow-up event
//! - [`User`]: a platform user, used for event subscribers
//!
//! Numeric enums follow the platform's integer encoding on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base URL of the platform's content delivery network.
pub const CDN_BASE: &str = "https://cdn.discordapp.com";

/// Size requested for carried-forward cover images.
pub const COVER_IMAGE_SIZE: u32 = 4096;

/// Error returned when an integer does not map to a known enum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownValue {
    kind: &'static str,
    value: u8,
}

/// Lifecycle status of a scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum EventStatus {
    /// Created and waiting to start.
    Scheduled,
    /// Currently running.
    Active,
    /// Ended normally.
    Completed,
    /// Canceled before it started.
    Canceled,
}

impl TryFrom<u8> for EventStatus {
    type Error = UnknownValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Scheduled),
            2 => Ok(Self::Active),
            3 => Ok(Self::Completed),
            4 => Ok(Self::Canceled),
            _ => Err(UnknownValue {
                kind: "event status",
                value,
            }),
        }
    }
}

impl From<EventStatus> for u8 {
    fn from(status: EventStatus) -> Self {
        match status {
            EventStatus::Scheduled => 1,
            EventStatus::Active => 2,
            EventStatus::Completed => 3,
            EventStatus::Canceled => 4,
        }
    }
}

impl EventStatus {
    /// Returns a lowercase name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }

    /// Returns true for statuses an event never leaves.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a scheduled event takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum EntityType {
    /// A stage channel.
    StageInstance,
    /// A voice channel.
    Voice,
    /// Somewhere outside the platform, described by entity metadata.
    External,
}

impl TryFrom<u8> for EntityType {
    type Error = UnknownValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::StageInstance),
            2 => Ok(Self::Voice),
            3 => Ok(Self::External),
            _ => Err(UnknownValue {
                kind: "entity type",
                value,
            }),
        }
    }
}

impl From<EntityType> for u8 {
    fn from(kind: EntityType) -> Self {
        match kind {
            EntityType::StageInstance => 1,
            EntityType::Voice => 2,
            EntityType::External => 3,
        }
    }
}

/// Who can see a scheduled event. The platform only accepts `GuildOnly`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PrivacyLevel {
    #[default]
    GuildOnly,
}

impl TryFrom<u8> for PrivacyLevel {
    type Error = UnknownValue;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::GuildOnly),
            _ => Err(UnknownValue {
                kind: "privacy level",
                value,
            }),
        }
    }
}

impl From<PrivacyLevel> for u8 {
    fn from(_: PrivacyLevel) -> Self {
        2
    }
}

/// Location details for external events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Free-text location shown to members.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// A guild scheduled event snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    /// Event identifier.
    pub id: String,
    /// Guild the event belongs to.
    pub guild_id: String,
    /// Channel for voice/stage events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    /// Event name.
    pub name: String,
    /// Free-text description; carries the recurrence token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Scheduled start.
    pub scheduled_start_time: DateTime<Utc>,
    /// Scheduled end (required for external events).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_end_time: Option<DateTime<Utc>>,
    /// Visibility.
    #[serde(default)]
    pub privacy_level: PrivacyLevel,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Location kind.
    pub entity_type: EntityType,
    /// Location details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_metadata: Option<EntityMetadata>,
    /// Number of interested users, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_count: Option<u32>,
    /// Cover image hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ScheduledEvent {
    /// Returns the description, or an empty string when the event has none.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// Returns the fetchable URL of the event's cover image, if it has one.
    pub fn cover_image_url(&self) -> Option<String> {
        self.image
            .as_deref()
            .map(|hash| cover_image_url(&self.id, hash))
    }
}

/// Builds the CDN URL for a scheduled event cover image.
pub fn cover_image_url(event_id: &str, image_hash: &str) -> String {
    format!(
        "{}/guild-events/{}/{}.png?size={}",
        CDN_BASE, event_id, image_hash, COVER_IMAGE_SIZE
    )
}

/// Body submitted to create a scheduled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewScheduledEvent {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub scheduled_start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_end_time: Option<DateTime<Utc>>,
    pub privacy_level: PrivacyLevel,
    pub entity_type: EntityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_metadata: Option<EntityMetadata>,
    /// Cover image as a data URI. Filled in by the platform adapter from
    /// `cover_image_url` just before submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Where to fetch the cover image from.
    #[serde(skip)]
    pub cover_image_url: Option<String>,
}

/// A platform user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
}

impl User {
    /// Creates a user with just an id and a username.
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            global_name: None,
        }
    }

    /// Returns the mention markup for this user.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// A guild, as returned by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: String,
    pub name: String,
}
