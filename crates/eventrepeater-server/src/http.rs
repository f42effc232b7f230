//! The interactions webhook endpoint.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use eventrepeater_protocol::{Interaction, ProtocolError};

use crate::dispatcher::InteractionDispatcher;
use crate::error::{ServerError, ServerResult};
use crate::signals::ShutdownSignal;
use crate::verify::{SIGNATURE_HEADER, SignatureVerifier, TIMESTAMP_HEADER};

/// Shared state of the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    dispatcher: Arc<InteractionDispatcher>,
    verifier: Arc<SignatureVerifier>,
}

impl AppState {
    pub fn new(dispatcher: Arc<InteractionDispatcher>, verifier: SignatureVerifier) -> Self {
        Self {
            dispatcher,
            verifier: Arc::new(verifier),
        }
    }
}

/// Builds the router serving `POST /interactions`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/interactions", post(interactions))
        .with_state(state)
}

/// Serves the router on `listener` until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: ShutdownSignal,
) -> ServerResult<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(addr = %addr, "Interactions endpoint listening");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.wait())
        .await?;
    info!("Interactions endpoint stopped");
    Ok(())
}

/// POST /interactions - verify, decode and dispatch one interaction
async fn interactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let signature = header(&headers, SIGNATURE_HEADER)?;
    let timestamp = header(&headers, TIMESTAMP_HEADER)?;
    state.verifier.verify(signature, timestamp, &body)?;

    let interaction: Interaction =
        serde_json::from_slice(&body).map_err(ProtocolError::from)?;

    match state.dispatcher.handle(interaction).await? {
        Some(reply) => Ok(Json(reply).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> ServerResult<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ServerError::invalid_signature(format!("missing {} header", name)))
}

/// Error body.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Maps server errors to HTTP responses.
struct AppError(ServerError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServerError::InvalidSignature { .. } => StatusCode::UNAUTHORIZED,
            ServerError::Protocol(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(error = %self.0, "Interaction handling failed");
        } else {
            warn!(status = status.as_u16(), error = %self.0, "Rejected interaction request");
        }

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<ServerError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
