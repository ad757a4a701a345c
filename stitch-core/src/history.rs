//! Conversation history types consumed by the marker resolver.

use serde::{Deserialize, Serialize};

/// The role tag on a conversation turn.
///
/// Roles arrive as free-form strings from the chat frontend; anything not
/// recognized maps to [`TurnRole::Unknown`] and simply never matches a
/// resolver role filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    System,
    User,
    Assistant,
    Tool,
    #[serde(other)]
    Unknown,
}

impl TurnRole {
    /// Stable string form for logging.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::Unknown => "unknown",
        }
    }
}

/// One prior turn: a role tag and its plain-text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: TurnRole,
    pub content: String,
}

impl HistoryEntry {
    /// Create an entry with an explicit role.
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Convenience constructor for assistant turns.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }

    /// Convenience constructor for user turns.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }
}
