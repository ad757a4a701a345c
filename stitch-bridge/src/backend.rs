//! Backend traits for talking to a session-scoped chat service.

use async_trait::async_trait;
use serde::Deserialize;

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Backend error type.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Backend unreachable: {0}")]
    Unavailable(String),

    #[error("Backend rejected request (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Chat assistant not found: {0}")]
    AssistantNotFound(String),
}

/// One answer returned by the backend for a question.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerPayload {
    /// Raw answer text, possibly carrying citation markers.
    #[serde(default)]
    pub answer: String,
    /// Retrieval metadata attached to the answer, when present.
    #[serde(default)]
    pub reference: Option<Reference>,
}

/// Retrieval metadata for an answer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Reference {
    /// Documents the answer drew from, aggregated.
    #[serde(default)]
    pub doc_aggs: Vec<DocAgg>,
    /// Individual chunks retrieved from the knowledge base.
    #[serde(default)]
    pub chunks: Vec<RefChunk>,
}

/// A referenced document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocAgg {
    #[serde(default)]
    pub doc_id: String,
    #[serde(default)]
    pub doc_name: String,
}

/// A retrieved chunk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefChunk {
    #[serde(default)]
    pub document_name: String,
    #[serde(default)]
    pub content: String,
}

/// Session-scoped chat backend.
///
/// Implement this trait to plug a different conversational service into the
/// bridge. Sessions are owned by the backend; the bridge only keeps their ids
/// alive inside reply text.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Create a new session and return its backend-assigned id.
    async fn create_session(&self, name_hint: &str) -> BackendResult<String>;

    /// Ask a question inside an existing session.
    async fn ask(&self, session_id: &str, question: &str) -> BackendResult<AnswerPayload>;

    /// Delete a session.
    ///
    /// Callers treat deletion as best-effort cleanup; a failure here must not
    /// abort the surrounding turn.
    async fn delete_session(&self, session_id: &str) -> BackendResult<()>;
}
