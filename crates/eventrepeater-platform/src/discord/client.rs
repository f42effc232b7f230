//! Discord REST API client.
//!
//! Implements [`Platform`] over HTTPS: request building, status mapping and
//! response parsing. No retries are attempted; callers decide what to do with
//! a failed call.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use eventrepeater_core::{Guild, NewScheduledEvent, ScheduledEvent, User};
use eventrepeater_protocol::{CommandDefinition, Message, MessagePayload};

use super::config::DiscordConfig;
use crate::error::{PlatformError, PlatformResult};
use crate::platform::{BoxFuture, Platform};

/// Page size for subscriber listing (the platform maximum).
const SUBSCRIBER_PAGE_SIZE: usize = 100;

const USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/eventrepeater/eventrepeater, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: u32,
}

/// One entry of the subscriber listing.
#[derive(Debug, Deserialize)]
struct EventSubscriber {
    user: User,
}

#[derive(Debug, Deserialize)]
struct GatewayBot {
    url: String,
}

/// Discord REST API client.
#[derive(Debug)]
pub struct DiscordClient {
    http: reqwest::Client,
    config: DiscordConfig,
}

impl DiscordClient {
    /// Creates a client from a validated configuration.
    pub fn new(config: DiscordConfig) -> PlatformResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                PlatformError::configuration(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })?;

        Ok(Self { http, config })
    }

    /// Returns the configuration this client was built with.
    pub fn config(&self) -> &DiscordConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base, path)
    }

    fn webhook_url(&self, interaction_token: &str, suffix: &str) -> String {
        self.url(&format!(
            "/webhooks/{}/{}{}",
            self.config.application_id, interaction_token, suffix
        ))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION, format!("Bot {}", self.config.bot_token))
    }

    /// Sends a request and decodes a JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> PlatformResult<T> {
        let response = self.send(operation, request).await?;
        let body = response.text().await.map_err(|e| {
            PlatformError::network(format!("failed to read response: {}", e))
                .with_operation(operation)
        })?;

        serde_json::from_str(&body).map_err(|e| {
            PlatformError::invalid_response(format!("failed to parse response: {}", e))
                .with_operation(operation)
        })
    }

    /// Sends a request and maps non-success statuses to errors.
    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> PlatformResult<Response> {
        let response = request.send().await.map_err(|e| {
            let err = if e.is_timeout() {
                PlatformError::network("request timeout")
            } else if e.is_connect() {
                PlatformError::network(format!("connection failed: {}", e))
            } else {
                PlatformError::network(format!("request failed: {}", e))
            };
            err.with_operation(operation).with_source(e)
        })?;

        let status = response.status();
        if status.is_success() {
            debug!(operation, status = status.as_u16(), "platform call succeeded");
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|api| format!("{} (code {})", api.message, api.code))
            .unwrap_or(body);

        let err = match status {
            StatusCode::UNAUTHORIZED => PlatformError::authentication(detail),
            StatusCode::FORBIDDEN => PlatformError::missing_permissions(detail),
            StatusCode::NOT_FOUND => PlatformError::not_found(detail),
            StatusCode::TOO_MANY_REQUESTS => PlatformError::rate_limited(format!(
                "rate limit exceeded{}",
                retry_after
                    .map(|s| format!(", retry after {} seconds", s))
                    .unwrap_or_default()
            )),
            s if s.is_client_error() => {
                PlatformError::bad_request(format!("API error ({}): {}", s, detail))
            }
            s => PlatformError::server(format!("API error ({}): {}", s, detail)),
        };
        warn!(operation, status = status.as_u16(), error = %err, "platform call failed");
        Err(err.with_operation(operation))
    }

    /// Downloads an image and encodes it as a data URI.
    async fn fetch_image_data_uri(&self, url: &str) -> PlatformResult<String> {
        let response = self.send("fetch_image", self.http.get(url)).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let bytes = response.bytes().await.map_err(|e| {
            PlatformError::network(format!("failed to read image: {}", e))
                .with_operation("fetch_image")
        })?;

        Ok(format!("data:{};base64,{}", content_type, BASE64.encode(&bytes)))
    }

    async fn create_event(
        &self,
        guild_id: &str,
        mut event: NewScheduledEvent,
    ) -> PlatformResult<ScheduledEvent> {
        if event.image.is_none()
            && let Some(cover_url) = event.cover_image_url.as_deref()
        {
            match self.fetch_image_data_uri(cover_url).await {
                Ok(data_uri) => event.image = Some(data_uri),
                Err(e) => {
                    warn!(error = %e, cover_url, "cover image unavailable, creating event without it");
                }
            }
        }

        let url = self.url(&format!(
            "/guilds/{}/scheduled-events",
            urlencoding::encode(guild_id)
        ));
        let request = self.authorized(self.http.post(&url)).json(&event);
        self.send_json("create_scheduled_event", request).await
    }

    async fn subscribers(&self, guild_id: &str, event_id: &str) -> PlatformResult<Vec<User>> {
        let url = self.url(&format!(
            "/guilds/{}/scheduled-events/{}/users",
            urlencoding::encode(guild_id),
            urlencoding::encode(event_id)
        ));

        let mut users = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let mut request = self
                .authorized(self.http.get(&url))
                .query(&[("limit", SUBSCRIBER_PAGE_SIZE.to_string())]);
            if let Some(ref after) = after {
                request = request.query(&[("after", after.as_str())]);
            }

            let page: Vec<EventSubscriber> =
                self.send_json("list_event_subscribers", request).await?;
            let page_len = page.len();
            after = page.last().map(|s| s.user.id.clone());
            users.extend(page.into_iter().map(|s| s.user));

            if page_len < SUBSCRIBER_PAGE_SIZE {
                break;
            }
        }

        debug!(event_id, count = users.len(), "fetched event subscribers");
        Ok(users)
    }
}

impl Platform for DiscordClient {
    fn fetch_guild<'a>(&'a self, guild_id: &'a str) -> BoxFuture<'a, PlatformResult<Guild>> {
        Box::pin(async move {
            let url = self.url(&format!("/guilds/{}", urlencoding::encode(guild_id)));
            self.send_json("fetch_guild", self.authorized(self.http.get(&url)))
                .await
        })
    }

    fn list_scheduled_events<'a>(
        &'a self,
        guild_id: &'a str,
    ) -> BoxFuture<'a, PlatformResult<Vec<ScheduledEvent>>> {
        Box::pin(async move {
            let url = self.url(&format!(
                "/guilds/{}/scheduled-events",
                urlencoding::encode(guild_id)
            ));
            let request = self
                .authorized(self.http.get(&url))
                .query(&[("with_user_count", "true")]);
            self.send_json("list_scheduled_events", request).await
        })
    }

    fn create_scheduled_event<'a>(
        &'a self,
        guild_id: &'a str,
        event: NewScheduledEvent,
    ) -> BoxFuture<'a, PlatformResult<ScheduledEvent>> {
        Box::pin(self.create_event(guild_id, event))
    }

    fn list_event_subscribers<'a>(
        &'a self,
        guild_id: &'a str,
        event_id: &'a str,
    ) -> BoxFuture<'a, PlatformResult<Vec<User>>> {
        Box::pin(self.subscribers(guild_id, event_id))
    }

    fn edit_original_response<'a>(
        &'a self,
        interaction_token: &'a str,
        payload: MessagePayload,
    ) -> BoxFuture<'a, PlatformResult<Message>> {
        Box::pin(async move {
            let url = self.webhook_url(interaction_token, "/messages/@original");
            let request = self.http.patch(&url).json(&payload);
            self.send_json("edit_original_response", request).await
        })
    }

    fn create_followup<'a>(
        &'a self,
        interaction_token: &'a str,
        payload: MessagePayload,
    ) -> BoxFuture<'a, PlatformResult<Message>> {
        Box::pin(async move {
            let url = self.webhook_url(interaction_token, "");
            let request = self.http.post(&url).query(&[("wait", "true")]).json(&payload);
            self.send_json("create_followup", request).await
        })
    }

    fn overwrite_global_commands(
        &self,
        commands: Vec<CommandDefinition>,
    ) -> BoxFuture<'_, PlatformResult<()>> {
        Box::pin(async move {
            let url = self.url(&format!(
                "/applications/{}/commands",
                self.config.application_id
            ));
            let request = self.authorized(self.http.put(&url)).json(&commands);
            self.send("overwrite_global_commands", request).await?;
            Ok(())
        })
    }

    fn gateway_url(&self) -> BoxFuture<'_, PlatformResult<String>> {
        Box::pin(async move {
            let url = self.url("/gateway/bot");
            let gateway: GatewayBot = self
                .send_json("gateway_url", self.authorized(self.http.get(&url)))
                .await?;
            Ok(gateway.url)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlatformErrorCode;
    use eventrepeater_core::{EntityMetadata, EntityType, PrivacyLevel};
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(server: &mockito::Server) -> DiscordClient {
        let config = DiscordConfig::new("1234", "test-token").with_api_base(server.url());
        DiscordClient::new(config).unwrap()
    }

    fn event_body(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "guild_id": "42",
            "name": "Game night",
            "description": "[weekly]",
            "scheduled_start_time": "2024-05-08T18:00:00+00:00",
            "scheduled_end_time": "2024-05-08T21:00:00+00:00",
            "privacy_level": 2,
            "status": 1,
            "entity_type": 3,
            "entity_metadata": { "location": "Cafe" }
        })
    }

    fn new_event(cover: Option<String>) -> NewScheduledEvent {
        NewScheduledEvent {
            name: "Game night".to_string(),
            description: Some("[weekly]".to_string()),
            scheduled_start_time: "2024-05-08T18:00:00Z".parse().unwrap(),
            scheduled_end_time: Some("2024-05-08T21:00:00Z".parse().unwrap()),
            privacy_level: PrivacyLevel::GuildOnly,
            entity_type: EntityType::External,
            entity_metadata: Some(EntityMetadata {
                location: Some("Cafe".to_string()),
            }),
            image: None,
            cover_image_url: cover,
        }
    }

    #[tokio::test]
    async fn lists_scheduled_events_with_bot_auth() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/guilds/42/scheduled-events")
            .match_query(Matcher::UrlEncoded("with_user_count".into(), "true".into()))
            .match_header("authorization", "Bot test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([event_body("1"), event_body("2")]).to_string())
            .create_async()
            .await;

        let events = client_for(&server)
            .list_scheduled_events("42")
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[1].id, "2");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn creates_event_with_inline_cover() {
        let mut server = mockito::Server::new_async().await;
        let image = server
            .mock("GET", "/cover.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body([1u8, 2, 3])
            .create_async()
            .await;
        let create = server
            .mock("POST", "/guilds/42/scheduled-events")
            .match_body(Matcher::PartialJson(json!({
                "name": "Game night",
                "entity_type": 3,
                "privacy_level": 2,
                "entity_metadata": { "location": "Cafe" },
                "image": "data:image/png;base64,AQID"
            })))
            .with_status(200)
            .with_body(event_body("900").to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let cover = format!("{}/cover.png", server.url());
        let created = client
            .create_scheduled_event("42", new_event(Some(cover)))
            .await
            .unwrap();

        assert_eq!(created.id, "900");
        image.assert_async().await;
        create.assert_async().await;
    }

    #[tokio::test]
    async fn missing_cover_does_not_block_creation() {
        let mut server = mockito::Server::new_async().await;
        let _image = server
            .mock("GET", "/gone.png")
            .with_status(404)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/guilds/42/scheduled-events")
            .with_status(200)
            .with_body(event_body("901").to_string())
            .create_async()
            .await;

        let client = client_for(&server);
        let cover = format!("{}/gone.png", server.url());
        let created = client
            .create_scheduled_event("42", new_event(Some(cover)))
            .await
            .unwrap();

        assert_eq!(created.id, "901");
        create.assert_async().await;
    }

    #[tokio::test]
    async fn maps_forbidden_to_missing_permissions() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/guilds/42/scheduled-events")
            .with_status(403)
            .with_body(r#"{"message": "Missing Permissions", "code": 50013}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .create_scheduled_event("42", new_event(None))
            .await
            .unwrap_err();

        assert_eq!(err.code(), PlatformErrorCode::MissingPermissions);
        assert_eq!(err.operation(), Some("create_scheduled_event"));
        assert!(err.message().contains("50013"));
    }

    #[tokio::test]
    async fn maps_bad_request() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/guilds/42/scheduled-events")
            .with_status(400)
            .with_body(r#"{"message": "Invalid Form Body", "code": 50035}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .create_scheduled_event("42", new_event(None))
            .await
            .unwrap_err();
        assert_eq!(err.code(), PlatformErrorCode::BadRequest);
        assert_eq!(err.operation(), Some("create_scheduled_event"));
    }

    #[tokio::test]
    async fn pages_through_subscribers() {
        let mut server = mockito::Server::new_async().await;
        let first_page: Vec<_> = (0..100)
            .map(|i| json!({ "guild_scheduled_event_id": "7", "user": { "id": format!("u{i}"), "username": "x" } }))
            .collect();
        let first = server
            .mock("GET", "/guilds/42/scheduled-events/7/users")
            .match_query(Matcher::Exact("limit=100".into()))
            .with_status(200)
            .with_body(json!(first_page).to_string())
            .create_async()
            .await;
        let second = server
            .mock("GET", "/guilds/42/scheduled-events/7/users")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "100".into()),
                Matcher::UrlEncoded("after".into(), "u99".into()),
            ]))
            .with_status(200)
            .with_body(
                json!([{ "guild_scheduled_event_id": "7", "user": { "id": "u100", "username": "y" } }])
                    .to_string(),
            )
            .create_async()
            .await;

        let users = client_for(&server)
            .list_event_subscribers("42", "7")
            .await
            .unwrap();

        assert_eq!(users.len(), 101);
        assert_eq!(users[100].id, "u100");
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn edits_original_response_through_webhook() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/webhooks/1234/tok-abc/messages/@original")
            .match_body(Matcher::PartialJson(json!({
                "content": "Interaction timeout.",
                "components": []
            })))
            .with_status(200)
            .with_body(r#"{"id": "m-1", "channel_id": "c-1", "content": "Interaction timeout."}"#)
            .create_async()
            .await;

        let message = client_for(&server)
            .edit_original_response(
                "tok-abc",
                MessagePayload::text_without_controls("Interaction timeout."),
            )
            .await
            .unwrap();

        assert_eq!(message.id, "m-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn overwrites_global_commands() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/applications/1234/commands")
            .match_header("authorization", "Bot test-token")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        client_for(&server)
            .overwrite_global_commands(eventrepeater_protocol::bot_commands())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rate_limit_reports_retry_after() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/guilds/42")
            .with_status(429)
            .with_header("Retry-After", "3")
            .create_async()
            .await;

        let err = client_for(&server).fetch_guild("42").await.unwrap_err();
        assert_eq!(err.code(), PlatformErrorCode::RateLimited);
        assert!(err.message().contains("retry after 3 seconds"));
    }
}
