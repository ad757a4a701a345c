//! Marker resolver: scans recent history for an embedded session marker.

use crate::comment::CommentCodec;
use crate::history::{HistoryEntry, TurnRole};
use crate::invisible;
use crate::marker::SessionMarker;

/// Scans a bounded window of recent turns, newest first, trying the
/// invisible codec before the comment codec on each qualifying entry.
///
/// The invisible channel wins inside a single entry because visible-text
/// edits cannot perturb it as easily as they can a comment tag. Across
/// entries, recency wins regardless of channel.
#[derive(Debug, Clone)]
pub struct MarkerResolver {
    comment: CommentCodec,
    roles: Vec<TurnRole>,
    window_size: usize,
}

impl MarkerResolver {
    /// Create a resolver with the configured role filter and window size.
    pub fn new(comment: CommentCodec, roles: Vec<TurnRole>, window_size: usize) -> Self {
        Self {
            comment,
            roles,
            window_size,
        }
    }

    /// Return the most recent decodable marker, or `None`.
    ///
    /// Pure linear scan over the last `window_size` entries; a window of 0
    /// inspects nothing. Idempotent by construction.
    pub fn resolve(&self, history: &[HistoryEntry]) -> Option<SessionMarker> {
        let window_start = history.len().saturating_sub(self.window_size);

        for entry in history[window_start..].iter().rev() {
            if !self.roles.contains(&entry.role) {
                continue;
            }

            let found =
                invisible::decode(&entry.content).or_else(|| self.comment.decode(&entry.content));

            if let Some(marker) = found {
                tracing::debug!(
                    session_id = %marker.session_id,
                    turn_count = marker.turn_count,
                    role = entry.role.as_str(),
                    "resolved session marker from history"
                );
                return Some(marker);
            }
        }

        tracing::debug!(
            entries = history.len(),
            window = self.window_size,
            "no session marker in history"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(window_size: usize) -> MarkerResolver {
        MarkerResolver::new(
            CommentCodec::new("session", "turn"),
            vec![TurnRole::Assistant],
            window_size,
        )
    }

    fn invisible_reply(session_id: &str, turn_count: u32) -> HistoryEntry {
        let marker = SessionMarker::new(session_id, turn_count);
        HistoryEntry::assistant(format!("An answer.{}", invisible::encode(&marker)))
    }

    #[test]
    fn test_resolves_invisible_marker() {
        let history = vec![
            HistoryEntry::user("hello"),
            invisible_reply("sid-1", 3),
            HistoryEntry::user("and now?"),
        ];
        assert_eq!(
            resolver(10).resolve(&history),
            Some(SessionMarker::new("sid-1", 3))
        );
    }

    #[test]
    fn test_resolves_comment_marker() {
        let history = vec![HistoryEntry::assistant(
            "An answer.\n\n<!-- session: sid-2; turn: 8 -->",
        )];
        assert_eq!(
            resolver(10).resolve(&history),
            Some(SessionMarker::new("sid-2", 8))
        );
    }

    #[test]
    fn test_invisible_takes_priority_over_comment() {
        let invisible_part = invisible::encode(&SessionMarker::new("invisible-id", 5));
        let entry = HistoryEntry::assistant(format!(
            "Answer.{invisible_part}\n\n<!-- session: comment-id; turn: 99 -->"
        ));
        assert_eq!(
            resolver(10).resolve(&[entry]),
            Some(SessionMarker::new("invisible-id", 5))
        );
    }

    #[test]
    fn test_most_recent_entry_wins() {
        let history = vec![
            invisible_reply("older", 1),
            HistoryEntry::user("more"),
            invisible_reply("newer", 2),
        ];
        assert_eq!(
            resolver(10).resolve(&history),
            Some(SessionMarker::new("newer", 2))
        );
    }

    #[test]
    fn test_role_filter_skips_other_roles() {
        let marker = SessionMarker::new("sid-3", 1);
        let history = vec![HistoryEntry::user(invisible::encode(&marker))];
        assert_eq!(resolver(10).resolve(&history), None);
    }

    #[test]
    fn test_window_counts_entries_not_matches() {
        let history = vec![
            invisible_reply("sid-4", 2),
            HistoryEntry::user("a"),
            HistoryEntry::user("b"),
        ];
        // The marker sits three entries back; a window of two misses it.
        assert_eq!(resolver(2).resolve(&history), None);
        assert_eq!(
            resolver(3).resolve(&history),
            Some(SessionMarker::new("sid-4", 2))
        );
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(resolver(10).resolve(&[]), None);
    }

    #[test]
    fn test_zero_window_inspects_nothing() {
        let history = vec![invisible_reply("sid-5", 1)];
        assert_eq!(resolver(0).resolve(&history), None);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let history = vec![
            invisible_reply("sid-6", 4),
            HistoryEntry::user("again please"),
        ];
        let r = resolver(10);
        assert_eq!(r.resolve(&history), r.resolve(&history));
        assert_eq!(
            r.resolve(&history),
            Some(SessionMarker::new("sid-6", 4))
        );
    }
}
