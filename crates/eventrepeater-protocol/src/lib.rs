//! Wire types for the chat platform.
//!
//! The bot talks to the platform over three channels:
//!
//! - the interactions webhook, which POSTs an [`Interaction`] and expects an
//!   [`InteractionResponse`] body back
//! - the REST API, which takes [`MessagePayload`]s and returns [`Message`]s
//! - the gateway websocket, which streams [`GatewayFrame`]s decoded into
//!   [`GatewayEvent`]s
//!
//! # Example
//!
//! ```rust
//! use eventrepeater_protocol::{Interaction, InteractionType, InteractionResponse};
//!
//! let interaction: Interaction = serde_json::from_str(
//!     r#"{"id":"1","application_id":"2","type":1,"token":"t"}"#,
//! ).unwrap();
//! assert_eq!(interaction.kind, InteractionType::Ping);
//! let _reply = InteractionResponse::pong();
//! ```

mod commands;
mod error;
mod gateway;
mod interaction;
mod response;

pub use commands::{
    bot_commands, CommandDefinition, CommandOptionDefinition, HELP_COMMAND, HELP_TEXT,
    MESSAGE_OPTION, PING_EVENT_COMMAND,
};
pub use error::{ProtocolError, ProtocolResult};
pub use gateway::{intents, opcode, GatewayEvent, GatewayFrame, GATEWAY_VERSION};
pub use interaction::{
    CommandData, CommandDataOption, ComponentData, Interaction, InteractionMessage,
    InteractionMetadata, InteractionType, Member,
};
pub use response::{
    ActionRow, AllowedMentions, Button, ButtonStyle, CallbackType, Component, ComponentType,
    InteractionResponse, Message, MessagePayload, SelectMenu, SelectOption,
};

/// REST API version used for every request.
pub const API_VERSION: u8 = 10;
