//! Core types: scheduled events, recurrence tokens, broadcast composition, tracing

pub mod broadcast;
pub mod event;
pub mod recurrence;
pub mod tracing;

pub use broadcast::{compose_broadcast, mentioned_ids};
pub use event::{
    cover_image_url, EntityMetadata, EntityType, EventStatus, Guild, NewScheduledEvent,
    PrivacyLevel, ScheduledEvent, UnknownValue, User,
};
pub use recurrence::Recurrence;
pub use tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
