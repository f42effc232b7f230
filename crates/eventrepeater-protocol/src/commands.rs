//! Slash command definitions.

use serde::Serialize;

/// Name of the usage command.
pub const HELP_COMMAND: &str = "help";

/// Name of the broadcast command.
pub const PING_EVENT_COMMAND: &str = "ping-event";

/// Name of the broadcast command's message option.
pub const MESSAGE_OPTION: &str = "message";

/// Usage text returned by the help command.
pub const HELP_TEXT: &str = "Hi! I'm the event repeater bot. Simply add `[hourly]`, `[daily]`, \
`[weekly]`, or `[monthly]` to your events description, and I'll create a follow-up event as \
soon as the event ends. Use `/ping-event` to message everyone interested in an event.";

/// A command option as registered with the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOptionDefinition {
    /// Option type; 3 is a string.
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub description: String,
    pub required: bool,
}

/// A slash command as registered with the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDefinition {
    /// Command type; 1 is a chat-input (slash) command.
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOptionDefinition>,
}

/// Returns every command the bot handles.
pub fn bot_commands() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition {
            kind: 1,
            name: HELP_COMMAND.to_string(),
            description: "How to use the bot?".to_string(),
            options: Vec::new(),
        },
        CommandDefinition {
            kind: 1,
            name: PING_EVENT_COMMAND.to_string(),
            description: "Ping everyone that is interested in an event.".to_string(),
            options: vec![CommandOptionDefinition {
                kind: 3,
                name: MESSAGE_OPTION.to_string(),
                description: "Message to send".to_string(),
                required: true,
            }],
        },
    ]
}
