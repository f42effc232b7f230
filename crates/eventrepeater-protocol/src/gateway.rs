//! Gateway frames.
//!
//! The gateway is a websocket carrying JSON frames of the shape
//! `{ "op": u8, "d": any, "s": seq?, "t": event_name? }`. Only the subset
//! needed to follow scheduled event lifecycles is modelled here.

use eventrepeater_core::ScheduledEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtocolError, ProtocolResult};

/// Gateway API version the client speaks.
pub const GATEWAY_VERSION: u8 = 10;

/// Gateway intent bits.
pub mod intents {
    /// Guild create/update/delete, including the initial guild snapshot.
    pub const GUILDS: u64 = 1 << 0;
    /// Scheduled event create/update/delete and subscriber changes.
    pub const GUILD_SCHEDULED_EVENTS: u64 = 1 << 16;
}

/// Gateway opcodes.
pub mod opcode {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

/// A raw gateway frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayFrame {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewayFrame {
    /// Decodes a text frame.
    pub fn parse(text: &str) -> ProtocolResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encodes this frame as text.
    pub fn to_text(&self) -> ProtocolResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Heartbeat carrying the last received sequence number.
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        Self {
            op: opcode::HEARTBEAT,
            d: last_sequence.map(Value::from).unwrap_or(Value::Null),
            s: None,
            t: None,
        }
    }

    /// Identify frame opening a new session.
    pub fn identify(token: &str, intents: u64) -> Self {
        Self {
            op: opcode::IDENTIFY,
            d: serde_json::json!({
                "token": token,
                "intents": intents,
                "properties": {
                    "os": std::env::consts::OS,
                    "browser": "eventrepeater",
                    "device": "eventrepeater",
                },
            }),
            s: None,
            t: None,
        }
    }

    /// Returns the heartbeat interval from a `Hello` frame, in milliseconds.
    pub fn heartbeat_interval(&self) -> ProtocolResult<u64> {
        self.d
            .get("heartbeat_interval")
            .and_then(Value::as_u64)
            .ok_or(ProtocolError::missing("heartbeat_interval"))
    }
}

/// A decoded dispatch event the bot cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    /// Session established.
    Ready { session_id: String },
    /// Initial (or re-)delivery of a guild with its scheduled events.
    GuildCreate {
        guild_id: String,
        scheduled_events: Vec<ScheduledEvent>,
    },
    ScheduledEventCreate(ScheduledEvent),
    /// Carries only the new state; the previous state must come from a cache.
    ScheduledEventUpdate(ScheduledEvent),
    ScheduledEventDelete(ScheduledEvent),
    /// Any other dispatch, by name.
    Other(String),
}

#[derive(Deserialize)]
struct ReadyData {
    session_id: String,
}

#[derive(Deserialize)]
struct GuildCreateData {
    id: String,
    #[serde(default)]
    guild_scheduled_events: Vec<ScheduledEvent>,
}

impl GatewayEvent {
    /// Decodes a dispatch frame (`op == 0`).
    pub fn from_dispatch(frame: &GatewayFrame) -> ProtocolResult<Self> {
        if frame.op != opcode::DISPATCH {
            return Err(ProtocolError::UnsupportedOpcode(frame.op));
        }
        let name = frame.t.as_deref().ok_or(ProtocolError::missing("t"))?;
        let data = frame.d.clone();

        let event = match name {
            "READY" => {
                let ready: ReadyData = serde_json::from_value(data)?;
                Self::Ready {
                    session_id: ready.session_id,
                }
            }
            "GUILD_CREATE" => {
                let guild: GuildCreateData = serde_json::from_value(data)?;
                Self::GuildCreate {
                    guild_id: guild.id,
                    scheduled_events: guild.guild_scheduled_events,
                }
            }
            "GUILD_SCHEDULED_EVENT_CREATE" => {
                Self::ScheduledEventCreate(serde_json::from_value(data)?)
            }
            "GUILD_SCHEDULED_EVENT_UPDATE" => {
                Self::ScheduledEventUpdate(serde_json::from_value(data)?)
            }
            "GUILD_SCHEDULED_EVENT_DELETE" => {
                Self::ScheduledEventDelete(serde_json::from_value(data)?)
            }
            other => Self::Other(other.to_string()),
        };
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventrepeater_core::EventStatus;
    use serde_json::json;

    fn event_data(status: u8) -> Value {
        json!({
            "id": "1100",
            "guild_id": "42",
            "name": "Raid",
            "description": "[hourly]",
            "scheduled_start_time": "2024-05-01T18:00:00+00:00",
            "scheduled_end_time": "2024-05-01T19:00:00+00:00",
            "privacy_level": 2,
            "status": status,
            "entity_type": 3,
            "entity_metadata": { "location": "Online" }
        })
    }

    #[test]
    fn hello_interval() {
        let frame = GatewayFrame::parse(r#"{"op":10,"d":{"heartbeat_interval":41250}}"#).unwrap();
        assert_eq!(frame.op, opcode::HELLO);
        assert_eq!(frame.heartbeat_interval().unwrap(), 41250);
    }

    #[test]
    fn heartbeat_carries_sequence() {
        let text = GatewayFrame::heartbeat(Some(12)).to_text().unwrap();
        assert_eq!(text, r#"{"op":1,"d":12}"#);
        let text = GatewayFrame::heartbeat(None).to_text().unwrap();
        assert_eq!(text, r#"{"op":1,"d":null}"#);
    }

    #[test]
    fn identify_requests_intents() {
        let frame = GatewayFrame::identify("secret", intents::GUILDS | intents::GUILD_SCHEDULED_EVENTS);
        assert_eq!(frame.op, opcode::IDENTIFY);
        assert_eq!(frame.d["intents"], 65537);
        assert_eq!(frame.d["token"], "secret");
    }

    #[test]
    fn decodes_scheduled_event_update() {
        let frame = GatewayFrame {
            op: 0,
            d: event_data(3),
            s: Some(5),
            t: Some("GUILD_SCHEDULED_EVENT_UPDATE".to_string()),
        };

        match GatewayEvent::from_dispatch(&frame).unwrap() {
            GatewayEvent::ScheduledEventUpdate(event) => {
                assert_eq!(event.status, EventStatus::Completed);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn decodes_guild_create_events() {
        let frame = GatewayFrame {
            op: 0,
            d: json!({ "id": "42", "name": "Guild", "guild_scheduled_events": [event_data(1)] }),
            s: Some(2),
            t: Some("GUILD_CREATE".to_string()),
        };

        match GatewayEvent::from_dispatch(&frame).unwrap() {
            GatewayEvent::GuildCreate {
                guild_id,
                scheduled_events,
            } => {
                assert_eq!(guild_id, "42");
                assert_eq!(scheduled_events.len(), 1);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unrelated_dispatch_is_other() {
        let frame = GatewayFrame {
            op: 0,
            d: json!({}),
            s: Some(3),
            t: Some("TYPING_START".to_string()),
        };
        assert_eq!(
            GatewayEvent::from_dispatch(&frame).unwrap(),
            GatewayEvent::Other("TYPING_START".to_string())
        );
    }

    #[test]
    fn non_dispatch_rejected() {
        let frame = GatewayFrame::heartbeat(None);
        assert!(matches!(
            GatewayEvent::from_dispatch(&frame),
            Err(ProtocolError::UnsupportedOpcode(1))
        ));
    }
}
