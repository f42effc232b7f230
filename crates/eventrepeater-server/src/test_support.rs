//! In-memory recording `Platform` used by the server tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use ed25519_dalek::{Signer, SigningKey};

use eventrepeater_core::{
    EntityMetadata, EntityType, EventStatus, Guild, NewScheduledEvent, PrivacyLevel,
    ScheduledEvent, User,
};
use eventrepeater_platform::{BoxFuture, Platform, PlatformError, PlatformResult};
use eventrepeater_protocol::{CommandDefinition, ComponentData, Message, MessagePayload};

use crate::sessions::{Delivery, PendingComponents};

/// One recorded platform call.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    FetchGuild(String),
    ListScheduledEvents(String),
    CreateScheduledEvent {
        guild_id: String,
        event: NewScheduledEvent,
    },
    ListEventSubscribers {
        guild_id: String,
        event_id: String,
    },
    EditOriginalResponse {
        token: String,
        payload: MessagePayload,
    },
    CreateFollowup {
        token: String,
        payload: MessagePayload,
    },
    OverwriteGlobalCommands(Vec<CommandDefinition>),
    GatewayUrl,
}

/// A click sent by the user as soon as a prompt shows up, while the edit
/// that rendered it is still in flight.
#[derive(Debug, Clone)]
pub struct EagerClick {
    pub key: String,
    pub user_id: String,
    pub data: ComponentData,
}

impl EagerClick {
    pub fn new(key: &str, user_id: &str, data: ComponentData) -> Self {
        Self {
            key: key.to_string(),
            user_id: user_id.to_string(),
            data,
        }
    }
}

#[derive(Debug, Default)]
struct EagerClicks {
    pending: Option<Arc<PendingComponents>>,
    queue: VecDeque<EagerClick>,
    deliveries: Vec<Delivery>,
}

/// Records every call and answers from canned data.
#[derive(Debug, Default)]
pub struct MockPlatform {
    calls: Mutex<Vec<PlatformCall>>,
    events: Mutex<Vec<ScheduledEvent>>,
    subscribers: Mutex<Vec<User>>,
    fail_creates: AtomicBool,
    fail_listing: AtomicBool,
    fail_subscribers: AtomicBool,
    eager: Mutex<EagerClicks>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(self, events: Vec<ScheduledEvent>) -> Self {
        *self.events.lock().unwrap() = events;
        self
    }

    pub fn with_subscribers(self, users: Vec<User>) -> Self {
        *self.subscribers.lock().unwrap() = users;
        self
    }

    pub fn failing_creates(self) -> Self {
        self.fail_creates.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_listing(self) -> Self {
        self.fail_listing.store(true, Ordering::SeqCst);
        self
    }

    pub fn failing_subscribers(self) -> Self {
        self.fail_subscribers.store(true, Ordering::SeqCst);
        self
    }

    /// Each edit that shows components delivers the next click to `pending`
    /// before it returns.
    pub fn clicking_on_prompts(
        self,
        pending: Arc<PendingComponents>,
        clicks: Vec<EagerClick>,
    ) -> Self {
        {
            let mut eager = self.eager.lock().unwrap();
            eager.pending = Some(pending);
            eager.queue = clicks.into();
        }
        self
    }

    /// Outcomes of the clicks sent by [`MockPlatform::clicking_on_prompts`].
    pub fn eager_deliveries(&self) -> Vec<Delivery> {
        self.eager.lock().unwrap().deliveries.clone()
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created_events(&self) -> Vec<NewScheduledEvent> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::CreateScheduledEvent { event, .. } => Some(event),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<MessagePayload> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::EditOriginalResponse { payload, .. } => Some(payload),
                _ => None,
            })
            .collect()
    }

    pub fn followups(&self) -> Vec<MessagePayload> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlatformCall::CreateFollowup { payload, .. } => Some(payload),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: PlatformCall) {
        self.calls.lock().unwrap().push(call);
    }

    async fn click_eagerly(&self) {
        let next = {
            let mut eager = self.eager.lock().unwrap();
            let click = eager.queue.pop_front();
            eager.pending.clone().zip(click)
        };
        if let Some((pending, click)) = next {
            let delivery = pending.deliver(&click.key, &click.user_id, click.data).await;
            self.eager.lock().unwrap().deliveries.push(delivery);
        }
    }
}

/// Message id the mock assigns to the original response of `token`.
pub fn message_id_for(token: &str) -> String {
    format!("msg-{}", token)
}

impl Platform for MockPlatform {
    fn fetch_guild<'a>(&'a self, guild_id: &'a str) -> BoxFuture<'a, PlatformResult<Guild>> {
        self.record(PlatformCall::FetchGuild(guild_id.to_string()));
        let guild = Guild {
            id: guild_id.to_string(),
            name: "Test guild".to_string(),
        };
        Box::pin(async move { Ok(guild) })
    }

    fn list_scheduled_events<'a>(
        &'a self,
        guild_id: &'a str,
    ) -> BoxFuture<'a, PlatformResult<Vec<ScheduledEvent>>> {
        self.record(PlatformCall::ListScheduledEvents(guild_id.to_string()));
        let fail = self.fail_listing.load(Ordering::SeqCst);
        let events = self.events.lock().unwrap().clone();
        Box::pin(async move {
            if fail {
                Err(PlatformError::server("Internal Server Error")
                    .with_operation("list_scheduled_events"))
            } else {
                Ok(events)
            }
        })
    }

    fn create_scheduled_event<'a>(
        &'a self,
        guild_id: &'a str,
        event: NewScheduledEvent,
    ) -> BoxFuture<'a, PlatformResult<ScheduledEvent>> {
        self.record(PlatformCall::CreateScheduledEvent {
            guild_id: guild_id.to_string(),
            event: event.clone(),
        });
        let fail = self.fail_creates.load(Ordering::SeqCst);
        let created = ScheduledEvent {
            id: format!("created-{}", self.created_events().len()),
            guild_id: guild_id.to_string(),
            channel_id: None,
            name: event.name,
            description: event.description,
            scheduled_start_time: event.scheduled_start_time,
            scheduled_end_time: event.scheduled_end_time,
            privacy_level: event.privacy_level,
            status: EventStatus::Scheduled,
            entity_type: event.entity_type,
            entity_metadata: event.entity_metadata,
            user_count: None,
            image: None,
        };
        Box::pin(async move {
            if fail {
                Err(PlatformError::missing_permissions("Missing Permissions")
                    .with_operation("create_scheduled_event"))
            } else {
                Ok(created)
            }
        })
    }

    fn list_event_subscribers<'a>(
        &'a self,
        guild_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, PlatformResult<Vec<User>>> {
        self.record(PlatformCall::ListEventSubscribers {
            guild_id: guild_id.to_string(),
            event_id: event_id.to_string(),
        });
        let fail = self.fail_subscribers.load(Ordering::SeqCst);
        let users = self.subscribers.lock().unwrap().clone();
        Box::pin(async move {
            if fail {
                Err(PlatformError::network("connection reset")
                    .with_operation("list_event_subscribers"))
            } else {
                Ok(users)
            }
        })
    }

    fn edit_original_response<'a>(
        &'a self,
        interaction_token: &'a str,
        payload: MessagePayload,
    ) -> BoxFuture<'a, PlatformResult<Message>> {
        let message = Message {
            id: message_id_for(interaction_token),
            channel_id: "channel-1".to_string(),
            content: payload.content_text().to_string(),
        };
        let shows_controls = matches!(&payload.components, Some(rows) if !rows.is_empty());
        self.record(PlatformCall::EditOriginalResponse {
            token: interaction_token.to_string(),
            payload,
        });
        Box::pin(async move {
            if shows_controls {
                self.click_eagerly().await;
            }
            Ok(message)
        })
    }

    fn create_followup<'a>(
        &'a self,
        interaction_token: &'a str,
        payload: MessagePayload,
    ) -> BoxFuture<'a, PlatformResult<Message>> {
        let message = Message {
            id: format!("followup-{}", interaction_token),
            channel_id: "channel-1".to_string(),
            content: payload.content_text().to_string(),
        };
        let too_long = payload.exceeds_content_limit();
        self.record(PlatformCall::CreateFollowup {
            token: interaction_token.to_string(),
            payload,
        });
        Box::pin(async move {
            if too_long {
                Err(PlatformError::bad_request("Invalid Form Body")
                    .with_operation("create_followup"))
            } else {
                Ok(message)
            }
        })
    }

    fn overwrite_global_commands(
        &self,
        commands: Vec<CommandDefinition>,
    ) -> BoxFuture<'_, PlatformResult<()>> {
        self.record(PlatformCall::OverwriteGlobalCommands(commands));
        Box::pin(async { Ok(()) })
    }

    fn gateway_url(&self) -> BoxFuture<'_, PlatformResult<String>> {
        self.record(PlatformCall::GatewayUrl);
        Box::pin(async { Ok("wss://gateway.invalid".to_string()) })
    }
}

fn at(timestamp: &str) -> DateTime<Utc> {
    timestamp.parse().unwrap()
}

/// An external event in guild `42` with the given status.
pub fn scheduled_event(id: &str, name: &str, status: EventStatus) -> ScheduledEvent {
    ScheduledEvent {
        id: id.to_string(),
        guild_id: "42".to_string(),
        channel_id: None,
        name: name.to_string(),
        description: Some("Bring snacks [weekly]".to_string()),
        scheduled_start_time: at("2024-05-01T18:00:00Z"),
        scheduled_end_time: Some(at("2024-05-01T21:00:00Z")),
        privacy_level: PrivacyLevel::GuildOnly,
        status,
        entity_type: EntityType::External,
        entity_metadata: Some(EntityMetadata {
            location: Some("Cafe Central".to_string()),
        }),
        user_count: Some(3),
        image: Some("a1b2c3".to_string()),
    }
}

fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&[7u8; 32])
}

/// Hex public key matching [`sign`].
pub fn public_key_hex() -> String {
    hex::encode(signing_key().verifying_key().as_bytes())
}

/// Signs `timestamp || body` the way the platform does.
pub fn sign(timestamp: &str, body: &[u8]) -> String {
    let mut message = timestamp.as_bytes().to_vec();
    message.extend_from_slice(body);
    hex::encode(signing_key().sign(&message).to_bytes())
}
