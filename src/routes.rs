//! HTTP route handlers.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::bot::{self, SYSTEM_ERROR};
use crate::line::{verify_signature, Event, Message, Replier, WebhookBody, SIGNATURE_HEADER};
use crate::store::SnapshotStore;
use crate::types::{ErrorResponse, HealthResponse};

/// Application state shared across handlers.
pub struct AppState {
    pub store: Arc<SnapshotStore>,
    pub replier: Arc<dyn Replier>,
    pub channel_secret: String,
}

/// Error type for API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.status.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Build the bot's router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/health", get(health))
        .route("/callback", post(callback))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness endpoint.
pub async fn hello() -> &'static str {
    "Hello, World!"
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snapshot = state.store.current();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        races: snapshot.as_ref().map_or(0, |s| s.len()),
        refreshed_at: snapshot.map(|s| s.refreshed_at),
    })
}

/// LINE webhook endpoint.
///
/// Rejects unsigned or mis-signed requests; everything after verification
/// degrades to a reply message or a log line and the platform gets `OK`.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("Missing X-Line-Signature header"))?;

    if !verify_signature(&state.channel_secret, &body, signature) {
        warn!("Rejected webhook with invalid signature");
        return Err(ApiError::bad_request("Invalid signature"));
    }

    let webhook: WebhookBody = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid webhook body: {}", e)))?;

    debug!(
        "Webhook for {} with {} events",
        webhook.destination,
        webhook.events.len()
    );

    for event in webhook.events {
        handle_event(&state, event).await;
    }

    Ok("OK")
}

async fn handle_event(state: &AppState, event: Event) {
    let Event::Message {
        reply_token: Some(reply_token),
        message: Message::Text { text },
    } = event
    else {
        debug!("Skipping non-text event");
        return;
    };

    let Some(reply) = bot::respond(&state.store, &text) else {
        debug!("No reply for menu label {:?}", text);
        return;
    };

    match state.replier.reply_text(&reply_token, &reply).await {
        Ok(()) => info!("Replied to {:?}", text),
        Err(e) => {
            error!("Failed to reply to {:?}: {}", text, e);
            if let Err(e) = state.replier.reply_text(&reply_token, SYSTEM_ERROR).await {
                error!("Failed to send error reply: {}", e);
            }
        }
    }
}
