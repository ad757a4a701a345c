//! Stitch Core - the stateless session-continuity protocol.
//!
//! A request/response bridge with no storage of its own can still continue a
//! stateful remote session: it smuggles a `(session_id, turn_count)` marker
//! inside the visible text of its own previous replies and recovers it from
//! the conversation history it is handed on the next turn.
//!
//! ## Components
//!
//! - [`marker`] - the marker pair and its payload form
//! - [`invisible`] - zero-width Unicode codec (primary channel)
//! - [`comment`] - structured comment codec (fallback channel)
//! - [`resolver`] - bounded newest-first history scan
//! - [`lifecycle`] - resume / start-new / reset decision policy
//! - [`embed`] - appends markers to outgoing replies
//!
//! ## Data flow
//!
//! ```text
//! history ──► MarkerResolver ──► LifecyclePolicy ──► SessionDecision
//!                                                         │
//! reply text ◄── MarkerEmbedder ◄── updated marker ◄──────┘
//! ```
//!
//! Every operation is a pure function of its inputs: no I/O, no globals, no
//! locking. Concurrent conversations never interfere.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod comment;
pub mod continuity;
pub mod embed;
pub mod history;
pub mod invisible;
pub mod lifecycle;
pub mod marker;
pub mod resolver;
pub mod settings;

// Re-export commonly used types
pub use comment::CommentCodec;
pub use continuity::Continuity;
pub use embed::{ChannelMode, MarkerEmbedder};
pub use history::{HistoryEntry, TurnRole};
pub use lifecycle::{LifecyclePolicy, SessionDecision};
pub use marker::SessionMarker;
pub use resolver::MarkerResolver;
pub use settings::ContinuitySettings;
