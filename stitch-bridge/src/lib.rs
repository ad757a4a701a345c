//! Stitch Bridge - HTTP bridge between chat frontends and a RAGFlow backend.
//!
//! The bridge keeps conversations continuous without any server-side state:
//! the backend session id travels inside the reply text as an invisible
//! marker, and each incoming request carries the full message history the
//! marker can be recovered from.
//!
//! ## Architecture
//!
//! ```text
//! Frontend → POST /api/v1/chat → ChatPipe → RAGFlow sessions/completions
//!     ↑                             ↓
//!     └── reply + embedded marker ──┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod backend;
pub mod pipe;
pub mod ragflow;
pub mod render;
pub mod routes;

// Re-export commonly used types
pub use backend::{AnswerPayload, BackendError, BackendResult, Reference, SessionBackend};
pub use pipe::{ChatPipe, TurnError, TurnResult};
pub use ragflow::RagflowBackend;
pub use render::RenderSettings;
pub use routes::{build_router, create_state, BridgeState};

use std::net::SocketAddr;
use std::sync::Arc;
use stitch_common::config::Config;
use tower_http::cors::{Any, CorsLayer};

/// Build the bridge router with CORS middleware and a RAGFlow backend
/// created from configuration.
pub fn build_bridge_router(config: &Config) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let backend = Arc::new(RagflowBackend::new(
        config.backend.base_url.clone(),
        config.backend.api_key.clone(),
        config.backend.assistant.clone(),
        config.backend.timeout_secs,
    ));

    let state = create_state(config, backend);
    build_router(state).layer(cors)
}

/// Start the bridge HTTP server.
pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    let addr = SocketAddr::from((
        config.bind_address().parse::<std::net::IpAddr>()?,
        config.bridge_port(),
    ));

    let router = build_bridge_router(config);

    tracing::info!("Starting Stitch Bridge on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
