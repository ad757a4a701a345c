//! Configuration surface of the continuity protocol.
//!
//! Every knob is an explicit setting rather than a hidden global; the bridge
//! embeds this struct into its own config file section.

use serde::{Deserialize, Serialize};

use crate::embed::ChannelMode;
use crate::history::TurnRole;

/// Tunables for marker encoding, resolution, and lifecycle policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuitySettings {
    /// Which encoding(s) outgoing replies carry.
    #[serde(default)]
    pub channel_mode: ChannelMode,

    /// Comment-channel key for the session id.
    #[serde(default = "default_session_key")]
    pub session_key: String,

    /// Comment-channel key for the turn count.
    #[serde(default = "default_turn_key")]
    pub turn_key: String,

    /// Messages that force a session reset (case-insensitive exact match).
    #[serde(default = "default_reset_commands")]
    pub reset_commands: Vec<String>,

    /// Turn ceiling before a session is abandoned. 0 disables auto-reset.
    #[serde(default)]
    pub auto_reset_threshold: u32,

    /// How many recent history entries the resolver inspects.
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Roles that may carry an embedded marker.
    #[serde(default = "default_roles")]
    pub roles: Vec<TurnRole>,
}

impl Default for ContinuitySettings {
    fn default() -> Self {
        Self {
            channel_mode: ChannelMode::default(),
            session_key: default_session_key(),
            turn_key: default_turn_key(),
            reset_commands: default_reset_commands(),
            auto_reset_threshold: 0,
            window_size: default_window_size(),
            roles: default_roles(),
        }
    }
}

fn default_session_key() -> String {
    "session".to_string()
}

fn default_turn_key() -> String {
    "turn".to_string()
}

fn default_reset_commands() -> Vec<String> {
    vec!["/reset".to_string(), "/new".to_string()]
}

fn default_window_size() -> usize {
    10
}

fn default_roles() -> Vec<TurnRole> {
    vec![TurnRole::Assistant]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ContinuitySettings::default();
        assert_eq!(settings.channel_mode, ChannelMode::Invisible);
        assert_eq!(settings.session_key, "session");
        assert_eq!(settings.turn_key, "turn");
        assert_eq!(settings.reset_commands, vec!["/reset", "/new"]);
        assert_eq!(settings.auto_reset_threshold, 0);
        assert_eq!(settings.window_size, 10);
        assert_eq!(settings.roles, vec![TurnRole::Assistant]);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings: ContinuitySettings =
            serde_json::from_str(r#"{"channel_mode": "both", "auto_reset_threshold": 50}"#)
                .unwrap();
        assert_eq!(settings.channel_mode, ChannelMode::Both);
        assert_eq!(settings.auto_reset_threshold, 50);
        assert_eq!(settings.window_size, 10);
        assert_eq!(settings.roles, vec![TurnRole::Assistant]);
    }
}
