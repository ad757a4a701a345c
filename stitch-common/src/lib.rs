//! Stitch Common - shared configuration and logging.
//!
//! All stitch services read one JSON config file (`~/.stitch/config.json`,
//! STITCH_* environment overrides) and initialize tracing the same way.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod logging;

// Re-export commonly used items
pub use config::{config_dir, config_path, Config};
pub use logging::init_logging;
