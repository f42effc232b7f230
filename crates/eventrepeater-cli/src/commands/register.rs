//! Slash-command registration.

use tracing::info;

use eventrepeater_platform::{DiscordClient, Platform};
use eventrepeater_protocol::bot_commands;

use crate::config::BotConfig;
use crate::error::ClientResult;

/// Overwrites the application's global commands.
pub async fn run(config: &BotConfig) -> ClientResult<()> {
    let client = DiscordClient::new(config.discord.to_discord_config()?)?;
    let names = register(&client).await?;
    println!("Registered commands: {}", names.join(", "));
    Ok(())
}

/// Registers the bot commands and returns their names.
pub async fn register(platform: &dyn Platform) -> ClientResult<Vec<String>> {
    let commands = bot_commands();
    let names: Vec<String> = commands.iter().map(|c| c.name.clone()).collect();
    platform.overwrite_global_commands(commands).await?;
    info!(commands = ?names, "Global commands registered");
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventrepeater_platform::DiscordConfig;
    use mockito::Matcher;

    fn client_for(server: &mockito::Server) -> DiscordClient {
        DiscordClient::new(DiscordConfig::new("1234", "test-token").with_api_base(server.url()))
            .unwrap()
    }

    #[tokio::test]
    async fn registers_help_and_ping_event() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/applications/1234/commands")
            .match_header("authorization", "Bot test-token")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""name":"help""#.to_string()),
                Matcher::Regex(r#""name":"ping-event""#.to_string()),
            ]))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let names = register(&client_for(&server)).await.unwrap();

        assert_eq!(names, vec!["help", "ping-event"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_registration_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PUT", "/applications/1234/commands")
            .with_status(401)
            .with_body(r#"{"message":"401: Unauthorized","code":0}"#)
            .create_async()
            .await;

        let err = register(&client_for(&server)).await.unwrap_err();
        assert!(matches!(err, crate::error::ClientError::Platform(_)));
    }
}
