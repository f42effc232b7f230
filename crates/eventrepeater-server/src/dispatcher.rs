//! Interaction routing.
//!
//! This module decides the synchronous answer to each verified interaction
//! and starts the asynchronous work behind it.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use eventrepeater_protocol::{
    HELP_COMMAND, HELP_TEXT, Interaction, InteractionResponse, InteractionType, MESSAGE_OPTION,
    MessagePayload, PING_EVENT_COMMAND,
};

use crate::error::ServerResult;
use crate::sessions::Delivery;
use crate::workflow::{PingSession, PingWorkflow};

/// Reply for commands used outside a guild.
pub const GUILD_ONLY_TEXT: &str = "This command can only be used in a server.";

/// Routes interactions to the help reply, the ping workflow and waiting
/// sessions.
pub struct InteractionDispatcher {
    workflow: Arc<PingWorkflow>,
}

impl InteractionDispatcher {
    pub fn new(workflow: Arc<PingWorkflow>) -> Self {
        Self { workflow }
    }

    /// Handles one interaction.
    ///
    /// `Ok(None)` means the interaction is dropped without a reply.
    #[tracing::instrument(skip_all, fields(interaction_id = %interaction.id, kind = ?interaction.kind))]
    pub async fn handle(&self, interaction: Interaction) -> ServerResult<Option<InteractionResponse>> {
        match interaction.kind {
            InteractionType::Ping => {
                debug!("Answering ping");
                Ok(Some(InteractionResponse::pong()))
            }
            InteractionType::ApplicationCommand => self.handle_command(interaction),
            InteractionType::MessageComponent => self.handle_component(interaction).await,
            other => {
                debug!(kind = ?other, "Dropping unsupported interaction type");
                Ok(None)
            }
        }
    }

    fn handle_command(&self, interaction: Interaction) -> ServerResult<Option<InteractionResponse>> {
        let data = interaction.command_data()?;

        match data.name.as_str() {
            HELP_COMMAND => Ok(Some(InteractionResponse::message(MessagePayload::text(
                HELP_TEXT,
            )))),
            PING_EVENT_COMMAND => {
                let message = data.string_option(MESSAGE_OPTION)?.to_string();
                let (Some(guild_id), Some(user)) =
                    (interaction.guild_id.clone(), interaction.invoking_user())
                else {
                    return Ok(Some(InteractionResponse::message(MessagePayload::text(
                        GUILD_ONLY_TEXT,
                    ))));
                };

                let session = PingSession::new(
                    interaction.id.clone(),
                    user.id.clone(),
                    guild_id,
                    interaction.token.clone(),
                    message,
                );
                info!(
                    guild_id = %session.guild_id,
                    user_id = %session.user_id,
                    "Starting ping workflow"
                );

                let workflow = self.workflow.clone();
                tokio::spawn(async move {
                    match workflow.run(session).await {
                        Ok(outcome) => debug!(?outcome, "Ping workflow finished"),
                        Err(e) => error!(error = %e, "Ping workflow failed"),
                    }
                });
                Ok(Some(InteractionResponse::deferred_message()))
            }
            other => {
                warn!(command = %other, "Dropping unknown command");
                Ok(None)
            }
        }
    }

    async fn handle_component(
        &self,
        interaction: Interaction,
    ) -> ServerResult<Option<InteractionResponse>> {
        let data = interaction.component_data()?;
        let origin = interaction
            .message
            .as_ref()
            .and_then(|message| message.origin_interaction_id());
        let (Some(origin), Some(user)) = (origin, interaction.invoking_user()) else {
            debug!("Component interaction without originating interaction or user");
            return Ok(None);
        };

        match self.workflow.pending().deliver(origin, &user.id, data).await {
            Delivery::Delivered => Ok(Some(InteractionResponse::deferred_update())),
            Delivery::NoSession | Delivery::WrongUser | Delivery::Unexpected => Ok(None),
        }
    }
}
