//! Inbound interaction payloads.
//!
//! The platform POSTs one [`Interaction`] per user action. The `data` field
//! changes shape with the interaction type, so it is kept as raw JSON and
//! decoded on demand through [`Interaction::command_data`] and
//! [`Interaction::component_data`].

use eventrepeater_core::User;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtocolError, ProtocolResult};

/// Kind of inbound interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum InteractionType {
    /// Liveness check sent when the endpoint is configured.
    Ping,
    /// A slash command invocation.
    ApplicationCommand,
    /// A click or selection on a component of a previous reply.
    MessageComponent,
    /// Option autocompletion.
    Autocomplete,
    /// A modal form submission.
    ModalSubmit,
    /// Anything this bot does not know about.
    Unknown(u8),
}

impl From<u8> for InteractionType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Ping,
            2 => Self::ApplicationCommand,
            3 => Self::MessageComponent,
            4 => Self::Autocomplete,
            5 => Self::ModalSubmit,
            other => Self::Unknown(other),
        }
    }
}

impl From<InteractionType> for u8 {
    fn from(kind: InteractionType) -> Self {
        match kind {
            InteractionType::Ping => 1,
            InteractionType::ApplicationCommand => 2,
            InteractionType::MessageComponent => 3,
            InteractionType::Autocomplete => 4,
            InteractionType::ModalSubmit => 5,
            InteractionType::Unknown(other) => other,
        }
    }
}

/// Guild member wrapper; only the user is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user: User,
}

/// Points a message back at the interaction that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionMetadata {
    /// Id of the originating interaction.
    pub id: String,
}

/// The message a component interaction was triggered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionMessage {
    pub id: String,
    #[serde(default)]
    pub content: String,
    /// Set on replies to an interaction, including their later edits.
    #[serde(default)]
    pub interaction_metadata: Option<InteractionMetadata>,
}

impl InteractionMessage {
    /// Id of the interaction this message replies to, if any.
    pub fn origin_interaction_id(&self) -> Option<&str> {
        self.interaction_metadata
            .as_ref()
            .map(|metadata| metadata.id.as_str())
    }
}

/// An inbound interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub application_id: String,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    /// Continuation token for editing the reply and sending follow-ups.
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Set when invoked inside a guild.
    #[serde(default)]
    pub member: Option<Member>,
    /// Set when invoked in a direct message.
    #[serde(default)]
    pub user: Option<User>,
    /// Set for component interactions.
    #[serde(default)]
    pub message: Option<InteractionMessage>,
}

impl Interaction {
    /// Returns the invoking user, whether the interaction came from a guild or a DM.
    pub fn invoking_user(&self) -> Option<&User> {
        self.member
            .as_ref()
            .map(|member| &member.user)
            .or(self.user.as_ref())
    }

    /// Decodes `data` as a slash command payload.
    pub fn command_data(&self) -> ProtocolResult<CommandData> {
        let data = self.data.clone().ok_or(ProtocolError::missing("data"))?;
        Ok(serde_json::from_value(data)?)
    }

    /// Decodes `data` as a component payload.
    pub fn component_data(&self) -> ProtocolResult<ComponentData> {
        let data = self.data.clone().ok_or(ProtocolError::missing("data"))?;
        Ok(serde_json::from_value(data)?)
    }
}

/// A slash command option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDataOption {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

/// Slash command payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandDataOption>,
}

impl CommandData {
    /// Returns a string option by name.
    pub fn string_option(&self, name: &str) -> ProtocolResult<&str> {
        self.options
            .iter()
            .find(|option| option.name == name)
            .and_then(|option| option.value.as_str())
            .ok_or_else(|| ProtocolError::InvalidOption {
                name: name.to_string(),
            })
    }
}

/// Component payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentData {
    pub custom_id: String,
    pub component_type: u8,
    /// Selected option values, for select menus.
    #[serde(default)]
    pub values: Vec<String>,
}
