//! HTTP routes for the stitch bridge.
//!
//! Exposes the turn pipeline as a small JSON API:
//! - `GET /health` and `GET /ready` for probes
//! - `POST /api/v1/chat` for running one conversation turn

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use stitch_common::config::Config;
use stitch_core::{Continuity, HistoryEntry};

use crate::backend::SessionBackend;
use crate::pipe::{ChatPipe, TurnError};
use crate::render::RenderSettings;

// ============================================================================
// State
// ============================================================================

/// Shared state for the bridge HTTP server.
pub struct BridgeState {
    /// Turn pipeline shared across requests.
    pub pipe: ChatPipe,
    /// Why the bridge is not ready to serve turns, when it is not.
    pub not_ready_reason: Option<String>,
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChatTurnRequest {
    #[serde(default)]
    messages: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
struct ChatTurnResponse {
    success: bool,
    data: Option<ChatTurnData>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatTurnData {
    message: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ReadyResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

// ============================================================================
// Health Routes
// ============================================================================

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        service: "stitch-bridge",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn ready(State(state): State<Arc<BridgeState>>) -> impl IntoResponse {
    if let Some(reason) = &state.not_ready_reason {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                status: "not_ready",
                reason: Some(reason.clone()),
            }),
        );
    }

    (
        StatusCode::OK,
        Json(ReadyResponse {
            status: "ready",
            reason: None,
        }),
    )
}

// ============================================================================
// Chat Route
// ============================================================================

async fn chat_turn(
    State(state): State<Arc<BridgeState>>,
    Json(request): Json<ChatTurnRequest>,
) -> impl IntoResponse {
    match state.pipe.handle_turn(&request.messages).await {
        Ok(message) => (
            StatusCode::OK,
            Json(ChatTurnResponse {
                success: true,
                data: Some(ChatTurnData { message }),
                error: None,
            }),
        ),
        Err(error) => {
            let status = match &error {
                TurnError::MissingQuestion => StatusCode::BAD_REQUEST,
                TurnError::Backend(_) => StatusCode::BAD_GATEWAY,
            };
            tracing::error!(%error, "Chat turn failed");
            (
                status,
                Json(ChatTurnResponse {
                    success: false,
                    data: None,
                    error: Some(error.to_string()),
                }),
            )
        }
    }
}

// ============================================================================
// Router
// ============================================================================

/// Build the bridge HTTP router.
pub fn build_router(state: Arc<BridgeState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/api/v1/chat", post(chat_turn))
        .with_state(state)
}

/// Create the bridge state from configuration and a backend.
pub fn create_state(config: &Config, backend: Arc<dyn SessionBackend>) -> Arc<BridgeState> {
    let render = RenderSettings {
        public_web_url: config.backend.public_web_url.clone(),
        include_references: config.references.include_references,
        chunk_limit: config.references.chunk_limit,
    };

    let pipe = ChatPipe::new(
        backend,
        Continuity::new(&config.continuity),
        render,
        config.backend.session_prefix.clone(),
    );

    Arc::new(BridgeState {
        pipe,
        not_ready_reason: readiness_gap(config),
    })
}

/// First missing piece of backend configuration, if any.
fn readiness_gap(config: &Config) -> Option<String> {
    if config.backend.base_url.trim().is_empty() {
        return Some("backend.base_url is empty".to_string());
    }
    if config
        .backend
        .api_key
        .as_deref()
        .map_or(true, |key| key.trim().is_empty())
    {
        return Some("backend.api_key is not set".to_string());
    }
    if config.backend.assistant.trim().is_empty() {
        return Some("backend.assistant is not set".to_string());
    }
    None
}
