//! The session marker carried across conversation turns.
//!
//! A marker is the `(session_id, turn_count)` pair that the bridge smuggles
//! into its own reply text so the next turn can recover the remote session
//! without any storage of its own.

/// Separator between session id and turn count in a serialized payload.
pub(crate) const PAYLOAD_SEPARATOR: char = '|';

/// The logical payload carried across turns.
///
/// Valid only as a pair: a turn count without a session id (or vice versa)
/// is treated as "no marker" by every decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMarker {
    /// Opaque backend-assigned identifier, non-empty, immutable once issued.
    pub session_id: String,
    /// Completed turns on this session; 0 on a freshly issued id.
    pub turn_count: u32,
}

impl SessionMarker {
    /// Create a new marker.
    pub fn new(session_id: impl Into<String>, turn_count: u32) -> Self {
        Self {
            session_id: session_id.into(),
            turn_count,
        }
    }

    /// Serialized payload form carried inside encoded frames.
    pub fn to_payload(&self) -> String {
        format!("{}{}{}", self.session_id, PAYLOAD_SEPARATOR, self.turn_count)
    }

    /// Parse a payload produced by [`to_payload`](Self::to_payload).
    ///
    /// Splits at the *last* separator so session ids that themselves contain
    /// `|` survive the round trip. An empty id or a non-numeric count yields
    /// `None`.
    pub fn from_payload(payload: &str) -> Option<Self> {
        let (session_id, count) = payload.rsplit_once(PAYLOAD_SEPARATOR)?;
        if session_id.is_empty() {
            return None;
        }
        let turn_count = count.parse::<u32>().ok()?;
        Some(Self::new(session_id, turn_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_round_trip() {
        let marker = SessionMarker::new("abc123", 7);
        let payload = marker.to_payload();
        assert_eq!(payload, "abc123|7");
        assert_eq!(SessionMarker::from_payload(&payload), Some(marker));
    }

    #[test]
    fn test_payload_round_trip_with_separator_in_id() {
        let marker = SessionMarker::new("a|b|c", 12);
        assert_eq!(
            SessionMarker::from_payload(&marker.to_payload()),
            Some(marker)
        );
    }

    #[test]
    fn test_payload_round_trip_multibyte_id() {
        let marker = SessionMarker::new("сеанс-θ-例", 0);
        assert_eq!(
            SessionMarker::from_payload(&marker.to_payload()),
            Some(marker)
        );
    }

    #[test]
    fn test_empty_id_rejected() {
        assert_eq!(SessionMarker::from_payload("|3"), None);
    }

    #[test]
    fn test_missing_separator_rejected() {
        assert_eq!(SessionMarker::from_payload("abc123"), None);
    }

    #[test]
    fn test_non_numeric_count_rejected() {
        assert_eq!(SessionMarker::from_payload("abc|ten"), None);
        assert_eq!(SessionMarker::from_payload("abc|-1"), None);
        assert_eq!(SessionMarker::from_payload("abc|"), None);
    }
}
