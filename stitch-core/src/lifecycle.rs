//! Session lifecycle policy: resume, start fresh, or reset.

use crate::marker::SessionMarker;

/// The lifecycle verdict for one turn.
///
/// Fresh session ids are minted by the caller through the Session API; the
/// policy itself performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionDecision {
    /// Continue the resolved session with the incremented turn count.
    Resume { session_id: String, turn_count: u32 },
    /// Mint a fresh session. Covers both "no marker" and the auto-reset
    /// ceiling; an auto-reset abandons the old remote session without
    /// deleting it.
    StartNew,
    /// The user asked for a reset: best-effort-delete the stale session
    /// (when one resolved), then mint a fresh one.
    ResetThenStartNew { stale_session_id: Option<String> },
}

/// Pure decision logic over a resolved marker and the current user message.
#[derive(Debug, Clone)]
pub struct LifecyclePolicy {
    reset_commands: Vec<String>,
    auto_reset_threshold: u32,
}

impl LifecyclePolicy {
    /// Create a policy. A threshold of 0 disables auto-reset.
    pub fn new(reset_commands: Vec<String>, auto_reset_threshold: u32) -> Self {
        Self {
            reset_commands,
            auto_reset_threshold,
        }
    }

    /// Decide the session lifecycle for this turn.
    ///
    /// Precedence: explicit reset command, then marker absence, then the
    /// auto-reset ceiling, then resume. An explicit reset wins even without
    /// a resolved marker so reset commands behave identically everywhere.
    pub fn decide(
        &self,
        marker: Option<&SessionMarker>,
        user_message: &str,
    ) -> SessionDecision {
        if self.is_reset_command(user_message) {
            return SessionDecision::ResetThenStartNew {
                stale_session_id: marker.map(|m| m.session_id.clone()),
            };
        }

        let Some(marker) = marker else {
            return SessionDecision::StartNew;
        };

        if self.auto_reset_threshold > 0 && marker.turn_count >= self.auto_reset_threshold {
            return SessionDecision::StartNew;
        }

        SessionDecision::Resume {
            session_id: marker.session_id.clone(),
            turn_count: marker.turn_count.saturating_add(1),
        }
    }

    /// Case-insensitive, trimmed, exact match against the configured list.
    pub fn is_reset_command(&self, message: &str) -> bool {
        let normalized = message.trim().to_lowercase();
        self.reset_commands
            .iter()
            .any(|command| command.trim().to_lowercase() == normalized)
    }
}
