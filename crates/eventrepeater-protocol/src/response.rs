//! Interaction responses, message payloads and components.

use serde::{Deserialize, Serialize};

/// How the platform should treat an interaction response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum CallbackType {
    /// Acknowledge a `Ping`.
    Pong,
    /// Reply with a message.
    ChannelMessageWithSource,
    /// Acknowledge now, reply later by editing the original response.
    DeferredChannelMessageWithSource,
    /// Acknowledge a component interaction without changing the message.
    DeferredUpdateMessage,
}

impl From<CallbackType> for u8 {
    fn from(kind: CallbackType) -> Self {
        match kind {
            CallbackType::Pong => 1,
            CallbackType::ChannelMessageWithSource => 4,
            CallbackType::DeferredChannelMessageWithSource => 5,
            CallbackType::DeferredUpdateMessage => 6,
        }
    }
}

/// Body returned synchronously from the interactions endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: CallbackType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MessagePayload>,
}

impl InteractionResponse {
    /// Acknowledges a `Ping`.
    pub fn pong() -> Self {
        Self {
            kind: CallbackType::Pong,
            data: None,
        }
    }

    /// Replies with a message.
    pub fn message(payload: MessagePayload) -> Self {
        Self {
            kind: CallbackType::ChannelMessageWithSource,
            data: Some(payload),
        }
    }

    /// Defers the reply; the original response is edited later.
    pub fn deferred_message() -> Self {
        Self {
            kind: CallbackType::DeferredChannelMessageWithSource,
            data: None,
        }
    }

    /// Acknowledges a component interaction; the message is edited later.
    pub fn deferred_update() -> Self {
        Self {
            kind: CallbackType::DeferredUpdateMessage,
            data: None,
        }
    }
}

/// Which mentions in `content` actually notify users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedMentions {
    pub parse: Vec<String>,
}

impl AllowedMentions {
    /// No mention notifies anyone.
    pub fn none() -> Self {
        Self { parse: Vec::new() }
    }

    /// User mentions notify; role and everyone mentions do not.
    pub fn users() -> Self {
        Self {
            parse: vec!["users".to_string()],
        }
    }
}

/// Message body used for replies, edits and follow-ups.
///
/// `components: Some(vec![])` clears existing controls; `None` leaves them
/// untouched on edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<ActionRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<AllowedMentions>,
}

impl MessagePayload {
    /// Longest `content` the platform accepts, in characters.
    pub const MAX_CONTENT_CHARS: usize = 2000;

    /// A plain text message that notifies nobody.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            components: None,
            allowed_mentions: Some(AllowedMentions::none()),
        }
    }

    /// Replaces the text and removes every component.
    pub fn text_without_controls(content: impl Into<String>) -> Self {
        Self {
            components: Some(Vec::new()),
            ..Self::text(content)
        }
    }

    /// Builder: set components.
    pub fn with_components(mut self, rows: Vec<ActionRow>) -> Self {
        self.components = Some(rows);
        self
    }

    /// Builder: set allowed mentions.
    pub fn with_allowed_mentions(mut self, allowed: AllowedMentions) -> Self {
        self.allowed_mentions = Some(allowed);
        self
    }

    /// Returns the text content, or an empty string.
    pub fn content_text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }

    /// Returns true if `content` is longer than the platform accepts.
    pub fn exceeds_content_limit(&self) -> bool {
        self.content_text().chars().count() > Self::MAX_CONTENT_CHARS
    }

    /// Returns true if this payload removes every component.
    pub fn clears_controls(&self) -> bool {
        matches!(&self.components, Some(rows) if rows.is_empty())
    }
}

/// A message, as returned by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub content: String,
}

/// Component type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum ComponentType {
    ActionRow,
    Button,
    StringSelect,
}

impl From<ComponentType> for u8 {
    fn from(kind: ComponentType) -> Self {
        match kind {
            ComponentType::ActionRow => 1,
            ComponentType::Button => 2,
            ComponentType::StringSelect => 3,
        }
    }
}

/// Button colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
}

impl From<ButtonStyle> for u8 {
    fn from(style: ButtonStyle) -> Self {
        match style {
            ButtonStyle::Primary => 1,
            ButtonStyle::Secondary => 2,
            ButtonStyle::Success => 3,
            ButtonStyle::Danger => 4,
        }
    }
}

/// A row of components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    kind: ComponentType,
    pub components: Vec<Component>,
}

impl ActionRow {
    /// Creates a row holding the given components.
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            kind: ComponentType::ActionRow,
            components,
        }
    }
}

/// A component inside an action row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Component {
    Button(Button),
    StringSelect(SelectMenu),
}

impl Component {
    /// Returns the component's custom id.
    pub fn custom_id(&self) -> &str {
        match self {
            Self::Button(button) => &button.custom_id,
            Self::StringSelect(menu) => &menu.custom_id,
        }
    }
}

/// A clickable button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    #[serde(rename = "type")]
    kind: ComponentType,
    pub style: ButtonStyle,
    pub label: String,
    pub custom_id: String,
}

impl Button {
    pub fn new(custom_id: impl Into<String>, label: impl Into<String>, style: ButtonStyle) -> Self {
        Self {
            kind: ComponentType::Button,
            style,
            label: label.into(),
            custom_id: custom_id.into(),
        }
    }
}

/// A single-choice string select menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectMenu {
    #[serde(rename = "type")]
    kind: ComponentType,
    pub custom_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub options: Vec<SelectOption>,
    pub min_values: u8,
    pub max_values: u8,
}

impl SelectMenu {
    /// Maximum number of options the platform accepts in one menu.
    pub const MAX_OPTIONS: usize = 25;

    pub fn new(custom_id: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self {
            kind: ComponentType::StringSelect,
            custom_id: custom_id.into(),
            placeholder: None,
            options,
            min_values: 1,
            max_values: 1,
        }
    }

    /// Builder: set placeholder text.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

/// An entry in a select menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}
