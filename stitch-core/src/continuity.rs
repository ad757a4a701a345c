//! One-stop facade bundling the resolver, lifecycle policy, and embedder.

use crate::comment::CommentCodec;
use crate::embed::MarkerEmbedder;
use crate::history::HistoryEntry;
use crate::lifecycle::{LifecyclePolicy, SessionDecision};
use crate::marker::SessionMarker;
use crate::resolver::MarkerResolver;
use crate::settings::ContinuitySettings;

/// The continuity protocol wired up from one settings struct.
///
/// Everything here is pure and synchronous; the bridge performs the Session
/// API side effects the decisions call for.
#[derive(Debug, Clone)]
pub struct Continuity {
    resolver: MarkerResolver,
    policy: LifecyclePolicy,
    embedder: MarkerEmbedder,
}

impl Continuity {
    /// Build the protocol objects from settings.
    pub fn new(settings: &ContinuitySettings) -> Self {
        let comment = CommentCodec::new(settings.session_key.as_str(), settings.turn_key.as_str());
        Self {
            resolver: MarkerResolver::new(
                comment.clone(),
                settings.roles.clone(),
                settings.window_size,
            ),
            policy: LifecyclePolicy::new(
                settings.reset_commands.clone(),
                settings.auto_reset_threshold,
            ),
            embedder: MarkerEmbedder::new(comment, settings.channel_mode),
        }
    }

    /// Recover the most recent marker from history, if any.
    pub fn resolve(&self, history: &[HistoryEntry]) -> Option<SessionMarker> {
        self.resolver.resolve(history)
    }

    /// Resolve, then decide the session lifecycle for this turn.
    pub fn decide(&self, history: &[HistoryEntry], user_message: &str) -> SessionDecision {
        self.policy.decide(self.resolve(history).as_ref(), user_message)
    }

    /// Append the updated marker to an outgoing reply.
    pub fn embed(&self, reply: &str, marker: &SessionMarker) -> String {
        self.embedder.embed(reply, marker)
    }
}
