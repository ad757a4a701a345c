//! Comment-channel codec.
//!
//! Human-visible fallback encoding of a [`SessionMarker`] as a structured
//! inline comment. Key names come from configuration, so deployments can
//! pick labels that fit their frontend. Two accepted shapes:
//!
//! - strict: `<!-- session: abc123; turn: 4 -->`
//! - loose: `session=abc123; turn=4` (visible-debug rendering path)

use regex::Regex;

use crate::marker::SessionMarker;

/// Codec for the comment channel, parameterized by the two key names.
#[derive(Debug, Clone)]
pub struct CommentCodec {
    session_key: String,
    turn_key: String,
}

impl CommentCodec {
    /// Create a codec with the configured key names.
    pub fn new(session_key: impl Into<String>, turn_key: impl Into<String>) -> Self {
        Self {
            session_key: session_key.into(),
            turn_key: turn_key.into(),
        }
    }

    /// Render a marker in the strict bracketed form.
    pub fn encode(&self, marker: &SessionMarker) -> String {
        format!(
            "<!-- {}: {}; {}: {} -->",
            self.session_key, marker.session_id, self.turn_key, marker.turn_count
        )
    }

    /// Decode the first marker found in `text`, strict form first.
    pub fn decode(&self, text: &str) -> Option<SessionMarker> {
        self.decode_strict(text).or_else(|| self.decode_loose(text))
    }

    fn decode_strict(&self, text: &str) -> Option<SessionMarker> {
        let pattern = format!(
            r"<!--\s*{}\s*:\s*(.*?)\s*;\s*{}\s*:\s*(\d+)\s*-->",
            regex::escape(&self.session_key),
            regex::escape(&self.turn_key),
        );
        let re = Regex::new(&pattern).ok()?;
        marker_from_captures(&re.captures(text)?)
    }

    fn decode_loose(&self, text: &str) -> Option<SessionMarker> {
        let pattern = format!(
            r"{}\s*=\s*([^;\r\n]+?)\s*;\s*{}\s*=\s*(\d+)",
            regex::escape(&self.session_key),
            regex::escape(&self.turn_key),
        );
        let re = Regex::new(&pattern).ok()?;
        marker_from_captures(&re.captures(text)?)
    }
}

fn marker_from_captures(caps: &regex::Captures<'_>) -> Option<SessionMarker> {
    let session_id = caps.get(1)?.as_str();
    if session_id.is_empty() {
        return None;
    }
    let turn_count = caps.get(2)?.as_str().parse::<u32>().ok()?;
    Some(SessionMarker::new(session_id, turn_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> CommentCodec {
        CommentCodec::new("session", "turn")
    }

    #[test]
    fn test_encode_shape() {
        let rendered = codec().encode(&SessionMarker::new("abc123", 4));
        assert_eq!(rendered, "<!-- session: abc123; turn: 4 -->");
    }

    #[test]
    fn test_round_trip() {
        let marker = SessionMarker::new("abc123", 4);
        assert_eq!(codec().decode(&codec().encode(&marker)), Some(marker));
    }

    #[test]
    fn test_strict_form_with_extra_whitespace() {
        let marker = codec().decode("<!--   session:  abc-9 ;  turn: 12   -->");
        assert_eq!(marker, Some(SessionMarker::new("abc-9", 12)));
    }

    #[test]
    fn test_strict_form_inside_reply_text() {
        let text = "Here you go.\n\n<!-- session: s-77; turn: 3 -->";
        assert_eq!(codec().decode(text), Some(SessionMarker::new("s-77", 3)));
    }

    #[test]
    fn test_loose_form() {
        let text = "debug: session=abc123; turn=7 (visible)";
        assert_eq!(codec().decode(text), Some(SessionMarker::new("abc123", 7)));
    }

    #[test]
    fn test_loose_form_with_spaces() {
        let text = "session = id-42 ; turn = 2";
        assert_eq!(codec().decode(text), Some(SessionMarker::new("id-42", 2)));
    }

    #[test]
    fn test_strict_wins_over_loose() {
        let text = "session=loose-id; turn=1\n<!-- session: strict-id; turn: 9 -->";
        assert_eq!(
            codec().decode(text),
            Some(SessionMarker::new("strict-id", 9))
        );
    }

    #[test]
    fn test_custom_keys() {
        let codec = CommentCodec::new("chat-ref", "step");
        let marker = SessionMarker::new("xyz", 15);
        let rendered = codec.encode(&marker);
        assert_eq!(rendered, "<!-- chat-ref: xyz; step: 15 -->");
        assert_eq!(codec.decode(&rendered), Some(marker));
        // Default keys must not match foreign key names.
        assert_eq!(CommentCodec::new("session", "turn").decode(&rendered), None);
    }

    #[test]
    fn test_empty_session_id_rejected() {
        assert_eq!(codec().decode("<!-- session: ; turn: 4 -->"), None);
    }

    #[test]
    fn test_non_numeric_turn_rejected() {
        assert_eq!(codec().decode("<!-- session: abc; turn: ten -->"), None);
    }

    #[test]
    fn test_plain_text_decodes_to_none() {
        assert_eq!(codec().decode("no marker here"), None);
    }
}
