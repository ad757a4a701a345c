//! Marker embedder: appends encoded markers to outgoing reply text.

use serde::{Deserialize, Serialize};

use crate::comment::CommentCodec;
use crate::invisible;
use crate::marker::SessionMarker;

/// Which encoding(s) ride on outgoing replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelMode {
    /// Zero-width marker only (default; visually empty).
    #[default]
    Invisible,
    /// Visible comment tag only.
    Comment,
    /// Invisible first, then the comment tag.
    Both,
}

impl ChannelMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Invisible => "invisible",
            Self::Comment => "comment",
            Self::Both => "both",
        }
    }
}

/// Appends marker material to reply text without touching the visible body.
#[derive(Debug, Clone)]
pub struct MarkerEmbedder {
    comment: CommentCodec,
    mode: ChannelMode,
}

impl MarkerEmbedder {
    /// Create an embedder for the configured channel mode.
    pub fn new(comment: CommentCodec, mode: ChannelMode) -> Self {
        Self { comment, mode }
    }

    /// Append the encoded marker(s) to `reply`.
    ///
    /// Invisible material is appended directly; the comment form sits after
    /// a blank line. The visible rendering of `reply` is never altered.
    pub fn embed(&self, reply: &str, marker: &SessionMarker) -> String {
        let mut out = String::with_capacity(reply.len() + 64);
        out.push_str(reply);

        if matches!(self.mode, ChannelMode::Invisible | ChannelMode::Both) {
            out.push_str(&invisible::encode(marker));
        }
        if matches!(self.mode, ChannelMode::Comment | ChannelMode::Both) {
            out.push_str("\n\n");
            out.push_str(&self.comment.encode(marker));
        }

        out
    }
}
