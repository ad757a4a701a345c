//! Per-turn orchestration.
//!
//! `ChatPipe` glues the continuity protocol to the session backend: it
//! resolves the marker hidden in the incoming history, decides how the turn
//! maps onto a backend session, asks the question, and hands back a reply
//! with the updated marker already embedded.

use std::sync::Arc;

use stitch_core::{Continuity, HistoryEntry, SessionDecision, SessionMarker, TurnRole};
use uuid::Uuid;

use crate::backend::{BackendError, SessionBackend};
use crate::render::{self, RenderSettings};

/// Reply sent when the user issues a reset command. Carries a fresh marker
/// so the next turn does not latch onto the pre-reset session still visible
/// in the history window.
const RESET_CONFIRMATION: &str = "Session reset. Starting a fresh conversation.";

/// Result type for turn handling.
pub type TurnResult<T> = Result<T, TurnError>;

/// Turn-level error, mapped onto HTTP statuses by the routes layer.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("No user message in request")]
    MissingQuestion,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// One conversation turn, end to end.
pub struct ChatPipe {
    backend: Arc<dyn SessionBackend>,
    continuity: Continuity,
    render: RenderSettings,
    session_prefix: String,
}

impl ChatPipe {
    pub fn new(
        backend: Arc<dyn SessionBackend>,
        continuity: Continuity,
        render: RenderSettings,
        session_prefix: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            continuity,
            render,
            session_prefix: session_prefix.into(),
        }
    }

    /// Run one turn over the incoming message list and produce the outgoing
    /// reply text.
    pub async fn handle_turn(&self, messages: &[HistoryEntry]) -> TurnResult<String> {
        let question = extract_question(messages).ok_or(TurnError::MissingQuestion)?;
        let decision = self.continuity.decide(messages, &question);

        match decision {
            SessionDecision::Resume {
                session_id,
                turn_count,
            } => {
                tracing::debug!(session_id = %session_id, turn_count, "Resuming session");
                self.answer(SessionMarker::new(session_id, turn_count), &question)
                    .await
            }
            SessionDecision::StartNew => {
                let session_id = self.create_session().await?;
                self.answer(SessionMarker::new(session_id, 0), &question)
                    .await
            }
            SessionDecision::ResetThenStartNew { stale_session_id } => {
                if let Some(stale) = stale_session_id {
                    // Cleanup is best-effort; a failed delete must not
                    // break the reset.
                    if let Err(error) = self.backend.delete_session(&stale).await {
                        tracing::warn!(
                            session_id = %stale,
                            %error,
                            "Failed to delete session during reset"
                        );
                    }
                }

                let session_id = self.create_session().await?;
                let marker = SessionMarker::new(session_id, 0);
                tracing::info!(session_id = %marker.session_id, "Session reset by user command");
                Ok(self.continuity.embed(RESET_CONFIRMATION, &marker))
            }
        }
    }

    async fn answer(&self, marker: SessionMarker, question: &str) -> TurnResult<String> {
        let payload = self.backend.ask(&marker.session_id, question).await?;
        let visible =
            render::format_answer(&payload.answer, payload.reference.as_ref(), &self.render);

        tracing::info!(
            session_id = %marker.session_id,
            turn_count = marker.turn_count,
            "Turn completed"
        );
        Ok(self.continuity.embed(&visible, &marker))
    }

    async fn create_session(&self) -> TurnResult<String> {
        let hint = self.session_name_hint();
        Ok(self.backend.create_session(&hint).await?)
    }

    fn session_name_hint(&self) -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("{}-{}", self.session_prefix, &id[..8])
    }
}

/// Content of the most recent user entry, trimmed. `None` when the request
/// carries no usable question.
fn extract_question(messages: &[HistoryEntry]) -> Option<String> {
    messages
        .iter()
        .rev()
        .find(|entry| entry.role == TurnRole::User)
        .map(|entry| entry.content.trim().to_string())
        .filter(|question| !question.is_empty())
}
