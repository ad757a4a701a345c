//! Stitch Bridge - Main entry point.

use anyhow::Result;
use stitch_bridge::start_server;
use stitch_common::config::Config;
use stitch_common::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration with environment overrides
    let config = Config::load_with_env()?;

    // Initialize logging
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Stitch Bridge v{}", env!("CARGO_PKG_VERSION"));

    // Start the HTTP server
    start_server(&config).await
}
