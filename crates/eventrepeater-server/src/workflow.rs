//! The `/ping-event` workflow.
//!
//! One run per command invocation:
//!
//! ```text
//! Idle -> ListingEvents -> AwaitingSelection -> AwaitingConfirmation -> Broadcasting -> Done
//!              |                  |                     |
//!              v                  v                     v
//!          NoEvents           TimedOut          Cancelled | TimedOut
//! ```
//!
//! Any platform failure along the way ends in `Failed`.
//!
//! The command was acknowledged with a deferred reply, so every prompt is an
//! edit of the original response. Component waits are keyed by the command's
//! interaction id and registered before the edit that shows the prompt.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use eventrepeater_core::{ScheduledEvent, compose_broadcast, mentioned_ids};
use eventrepeater_platform::Platform;
use eventrepeater_protocol::{
    ActionRow, AllowedMentions, Button, ButtonStyle, Component, ComponentData, Message,
    MessagePayload, SelectMenu, SelectOption,
};

use crate::error::ServerResult;
use crate::sessions::PendingComponents;

pub const NO_EVENTS_TEXT: &str = "No events found.";
pub const SELECT_PROMPT_TEXT: &str = "Which event should I ping?";
pub const CANCELED_TEXT: &str = "Ping canceled.";
pub const CONFIRMED_TEXT: &str = "Will ping now.";
pub const TIMEOUT_TEXT: &str = "Interaction timeout.";
pub const FAILED_TEXT: &str = "Something went wrong, nobody was pinged.";

pub const SELECT_EVENT_ID: &str = "ping_event_select";
pub const CONFIRM_ID: &str = "ping_confirm";
pub const CANCEL_ID: &str = "ping_cancel";

/// Where a session is in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    ListingEvents,
    AwaitingSelection,
    AwaitingConfirmation,
    Broadcasting,
    Done,
    Cancelled,
    TimedOut,
    NoEvents,
    Failed,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ListingEvents => "listing_events",
            Self::AwaitingSelection => "awaiting_selection",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::Broadcasting => "broadcasting",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
            Self::TimedOut => "timed_out",
            Self::NoEvents => "no_events",
            Self::Failed => "failed",
        }
    }

    /// Returns true once the session has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Done | Self::Cancelled | Self::TimedOut | Self::NoEvents | Self::Failed
        )
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// The broadcast was sent, mentioning these user ids.
    Done { mentioned: Vec<String> },
    Cancelled,
    TimedOut,
    NoEvents,
}

/// State of one `/ping-event` invocation.
#[derive(Debug, Clone)]
pub struct PingSession {
    /// Id of the command interaction; replies point back at it.
    pub interaction_id: String,
    pub user_id: String,
    pub guild_id: String,
    pub interaction_token: String,
    /// Text to broadcast.
    pub message: String,
    events: Vec<ScheduledEvent>,
    selected: Option<ScheduledEvent>,
    state: WorkflowState,
}

impl PingSession {
    pub fn new(
        interaction_id: impl Into<String>,
        user_id: impl Into<String>,
        guild_id: impl Into<String>,
        interaction_token: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            interaction_id: interaction_id.into(),
            user_id: user_id.into(),
            guild_id: guild_id.into(),
            interaction_token: interaction_token.into(),
            message: message.into(),
            events: Vec::new(),
            selected: None,
            state: WorkflowState::Idle,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// The event chosen by the user, once selected.
    pub fn selected(&self) -> Option<&ScheduledEvent> {
        self.selected.as_ref()
    }

    fn transition(&mut self, next: WorkflowState) {
        debug!(
            guild_id = %self.guild_id,
            user_id = %self.user_id,
            from = %self.state,
            to = %next,
            "Ping workflow transition"
        );
        self.state = next;
    }
}

/// Builds the event selection prompt. At most [`SelectMenu::MAX_OPTIONS`]
/// events are offered.
pub fn selection_prompt(events: &[ScheduledEvent]) -> MessagePayload {
    let options = events
        .iter()
        .take(SelectMenu::MAX_OPTIONS)
        .map(|event| SelectOption::new(event.name.as_str(), event.id.as_str()))
        .collect();
    let menu = SelectMenu::new(SELECT_EVENT_ID, options).with_placeholder("Select an event");

    MessagePayload::text(SELECT_PROMPT_TEXT)
        .with_components(vec![ActionRow::new(vec![Component::StringSelect(menu)])])
}

/// Builds the confirmation prompt for `event`.
pub fn confirmation_prompt(event: &ScheduledEvent, message: &str) -> MessagePayload {
    let content = format!(
        "Ping everyone interested in **{}** with the following message?\n\n{}",
        event.name, message
    );
    let buttons = vec![
        Component::Button(Button::new(CONFIRM_ID, "Confirm", ButtonStyle::Success)),
        Component::Button(Button::new(CANCEL_ID, "Cancel", ButtonStyle::Secondary)),
    ];

    MessagePayload::text(content).with_components(vec![ActionRow::new(buttons)])
}

/// Drives ping sessions against the platform.
pub struct PingWorkflow {
    platform: Arc<dyn Platform>,
    pending: Arc<PendingComponents>,
    timeout: Duration,
}

impl PingWorkflow {
    pub fn new(
        platform: Arc<dyn Platform>,
        pending: Arc<PendingComponents>,
        timeout: Duration,
    ) -> Self {
        Self {
            platform,
            pending,
            timeout,
        }
    }

    /// The component wait table this workflow registers in.
    pub fn pending(&self) -> &Arc<PendingComponents> {
        &self.pending
    }

    /// Runs a session to completion.
    ///
    /// Platform failures end the session with an error; nothing is retried.
    /// The reply is then edited to [`FAILED_TEXT`] if the platform still
    /// accepts edits.
    pub async fn run(&self, mut session: PingSession) -> ServerResult<WorkflowOutcome> {
        let result = self.drive(&mut session).await;
        if let Err(ref e) = result {
            warn!(
                guild_id = %session.guild_id,
                state = %session.state,
                error = %e,
                "Ping workflow failed"
            );
            let failed = MessagePayload::text_without_controls(FAILED_TEXT);
            if let Err(edit_err) = self.edit(&session, failed).await {
                warn!(error = %edit_err, "Could not show the failure in the reply");
            }
            session.transition(WorkflowState::Failed);
        }
        result
    }

    async fn drive(&self, session: &mut PingSession) -> ServerResult<WorkflowOutcome> {
        session.transition(WorkflowState::ListingEvents);
        let events = self
            .platform
            .list_scheduled_events(&session.guild_id)
            .await?;

        if events.is_empty() {
            self.edit(session, MessagePayload::text_without_controls(NO_EVENTS_TEXT))
                .await?;
            session.transition(WorkflowState::NoEvents);
            return Ok(WorkflowOutcome::NoEvents);
        }
        if events.len() > SelectMenu::MAX_OPTIONS {
            warn!(
                guild_id = %session.guild_id,
                count = events.len(),
                "Too many events for one menu, offering the first {}",
                SelectMenu::MAX_OPTIONS
            );
        }
        session.events = events;

        session.transition(WorkflowState::AwaitingSelection);
        let prompt = selection_prompt(&session.events);
        let Some(selection) = self.prompt(session, prompt, &[SELECT_EVENT_ID]).await? else {
            return self.time_out(session).await;
        };

        let Some(event) = selected_event(&session.events, &selection) else {
            warn!(
                custom_id = %selection.custom_id,
                values = ?selection.values,
                "Selection does not match a listed event"
            );
            return self.cancel(session).await;
        };
        session.selected = Some(event.clone());

        session.transition(WorkflowState::AwaitingConfirmation);
        let prompt = confirmation_prompt(&event, &session.message);
        let Some(decision) = self
            .prompt(session, prompt, &[CONFIRM_ID, CANCEL_ID])
            .await?
        else {
            return self.time_out(session).await;
        };
        if decision.custom_id != CONFIRM_ID {
            return self.cancel(session).await;
        }

        self.edit(session, MessagePayload::text_without_controls(CONFIRMED_TEXT))
            .await?;
        session.transition(WorkflowState::Broadcasting);

        let subscribers = self
            .platform
            .list_event_subscribers(&event.guild_id, &event.id)
            .await?;
        let broadcast = MessagePayload::text(compose_broadcast(&session.message, &subscribers))
            .with_allowed_mentions(AllowedMentions::users());
        if broadcast.exceeds_content_limit() {
            warn!(
                event_id = %event.id,
                subscribers = subscribers.len(),
                chars = broadcast.content_text().chars().count(),
                "Broadcast is longer than one message allows"
            );
        }
        self.platform
            .create_followup(&session.interaction_token, broadcast)
            .await
            .inspect_err(|e| {
                error!(
                    event_id = %event.id,
                    subscribers = subscribers.len(),
                    error = %e,
                    "Broadcast rejected"
                );
            })?;

        let mentioned = mentioned_ids(&subscribers);
        info!(
            event_id = %event.id,
            guild_id = %event.guild_id,
            mentioned = mentioned.len(),
            "Broadcast sent"
        );
        session.transition(WorkflowState::Done);
        Ok(WorkflowOutcome::Done { mentioned })
    }

    /// Shows `payload` and waits for a click on one of `custom_ids`.
    ///
    /// The wait exists before the edit is sent: the user can click as soon as
    /// the prompt renders, before the edit call returns.
    async fn prompt(
        &self,
        session: &PingSession,
        payload: MessagePayload,
        custom_ids: &[&str],
    ) -> ServerResult<Option<ComponentData>> {
        let wait = self
            .pending
            .register(&session.interaction_id, &session.user_id, custom_ids)
            .await;
        if let Err(e) = self.edit(session, payload).await {
            self.pending.unregister(&session.interaction_id).await;
            return Err(e);
        }
        Ok(self.pending.wait(wait, self.timeout).await)
    }

    async fn edit(&self, session: &PingSession, payload: MessagePayload) -> ServerResult<Message> {
        let message = self
            .platform
            .edit_original_response(&session.interaction_token, payload)
            .await?;
        Ok(message)
    }

    async fn cancel(&self, session: &mut PingSession) -> ServerResult<WorkflowOutcome> {
        self.edit(session, MessagePayload::text_without_controls(CANCELED_TEXT))
            .await?;
        session.transition(WorkflowState::Cancelled);
        Ok(WorkflowOutcome::Cancelled)
    }

    async fn time_out(&self, session: &mut PingSession) -> ServerResult<WorkflowOutcome> {
        self.edit(session, MessagePayload::text_without_controls(TIMEOUT_TEXT))
            .await?;
        session.transition(WorkflowState::TimedOut);
        Ok(WorkflowOutcome::TimedOut)
    }
}

fn selected_event(events: &[ScheduledEvent], selection: &ComponentData) -> Option<ScheduledEvent> {
    if selection.custom_id != SELECT_EVENT_ID {
        return None;
    }
    let id = selection.values.first()?;
    events.iter().find(|event| &event.id == id).cloned()
}
