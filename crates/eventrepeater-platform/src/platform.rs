//! The `Platform` trait.
//!
//! Everything the bot asks of the chat platform goes through [`Platform`].
//! The process creates one implementation at start-up and hands an
//! `Arc<dyn Platform>` to every component, so tests can swap in a recording
//! double.

use std::future::Future;
use std::pin::Pin;

use eventrepeater_core::{Guild, NewScheduledEvent, ScheduledEvent, User};
use eventrepeater_protocol::{CommandDefinition, Message, MessagePayload};

use crate::error::PlatformResult;

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Remote operations consumed by the bot.
pub trait Platform: Send + Sync {
    /// Fetches a guild by id.
    fn fetch_guild<'a>(&'a self, guild_id: &'a str) -> BoxFuture<'a, PlatformResult<Guild>>;

    /// Lists every scheduled event currently known for a guild.
    fn list_scheduled_events<'a>(
        &'a self,
        guild_id: &'a str,
    ) -> BoxFuture<'a, PlatformResult<Vec<ScheduledEvent>>>;

    /// Creates a scheduled event in a guild.
    ///
    /// If `event.cover_image_url` is set and `event.image` is not, the
    /// implementation downloads the cover and submits it inline.
    fn create_scheduled_event<'a>(
        &'a self,
        guild_id: &'a str,
        event: NewScheduledEvent,
    ) -> BoxFuture<'a, PlatformResult<ScheduledEvent>>;

    /// Lists every user subscribed to a scheduled event.
    fn list_event_subscribers<'a>(
        &'a self,
        guild_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, PlatformResult<Vec<User>>>;

    /// Edits the original response of an interaction.
    fn edit_original_response<'a>(
        &'a self,
        interaction_token: &'a str,
        payload: MessagePayload,
    ) -> BoxFuture<'a, PlatformResult<Message>>;

    /// Sends a follow-up message for an interaction.
    fn create_followup<'a>(
        &'a self,
        interaction_token: &'a str,
        payload: MessagePayload,
    ) -> BoxFuture<'a, PlatformResult<Message>>;

    /// Replaces the application's global slash commands.
    fn overwrite_global_commands(
        &self,
        commands: Vec<CommandDefinition>,
    ) -> BoxFuture<'_, PlatformResult<()>>;

    /// Returns the websocket URL to open the gateway connection on.
    fn gateway_url(&self) -> BoxFuture<'_, PlatformResult<String>>;
}
