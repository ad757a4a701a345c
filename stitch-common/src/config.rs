//! Configuration management for stitch services.
//!
//! Configuration lives in a single JSON file at `~/.stitch/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (STITCH_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `STITCH_BIND_ADDRESS` → network.bind
//! - `STITCH_BRIDGE_PORT` → services.bridge.port
//! - `STITCH_BACKEND_URL` → backend.base_url
//! - `STITCH_BACKEND_API_KEY` (or `RAGFLOW_API_KEY`) → backend.api_key
//! - `STITCH_BACKEND_ASSISTANT` → backend.assistant
//! - `STITCH_LOG_LEVEL` → observability.log_level

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use stitch_core::ContinuitySettings;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".stitch"),
        |dirs| dirs.home_dir().join(".stitch"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Network Configuration
// ============================================================================

/// Global network configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Bind address for the bridge.
    /// Default: "127.0.0.1" (local only); set "0.0.0.0" for remote access.
    #[serde(default = "default_bind_address")]
    pub bind: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".into()
}

// ============================================================================
// Services Port Configuration
// ============================================================================

/// Service port configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServicesConfig {
    /// Bridge HTTP service
    #[serde(default)]
    pub bridge: ServicePortConfig,
}

/// Individual service port configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServicePortConfig {
    /// Port number for the service
    #[serde(default)]
    pub port: Option<u16>,
}

// ============================================================================
// Backend Configuration (remote Session API)
// ============================================================================

/// Remote conversational backend (RAGFlow-style Session API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend API, including any `/api` prefix.
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    /// API key sent as a Bearer token.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Exact chat-assistant name to resolve through the API.
    #[serde(default)]
    pub assistant: String,

    /// HTTP timeout in seconds for backend calls.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Public web URL for building document links (optional).
    #[serde(default)]
    pub public_web_url: Option<String>,

    /// Prefix for the session names minted on the backend.
    #[serde(default = "default_session_prefix")]
    pub session_prefix: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            api_key: None,
            assistant: String::new(),
            timeout_secs: default_timeout(),
            public_web_url: None,
            session_prefix: default_session_prefix(),
        }
    }
}

fn default_backend_url() -> String {
    "http://127.0.0.1:9380/api".into()
}

fn default_timeout() -> u64 {
    15
}

fn default_session_prefix() -> String {
    "stitch".into()
}

// ============================================================================
// References Configuration
// ============================================================================

/// Rendering of backend references in replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencesConfig {
    /// Append referenced documents and chunk excerpts to replies.
    #[serde(default = "default_true")]
    pub include_references: bool,

    /// Max number of reference chunks to display.
    #[serde(default = "default_chunk_limit")]
    pub chunk_limit: usize,
}

impl Default for ReferencesConfig {
    fn default() -> Self {
        Self {
            include_references: true,
            chunk_limit: default_chunk_limit(),
        }
    }
}

fn default_chunk_limit() -> usize {
    5
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Unified configuration for stitch services.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Global network configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Service ports
    #[serde(default)]
    pub services: ServicesConfig,

    /// Remote Session API backend
    #[serde(default)]
    pub backend: BackendConfig,

    /// Session-continuity protocol settings
    #[serde(default)]
    pub continuity: ContinuitySettings,

    /// Reference rendering
    #[serde(default)]
    pub references: ReferencesConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var("STITCH_BIND_ADDRESS") {
            self.network.bind = bind;
        }
        if let Ok(port) = std::env::var("STITCH_BRIDGE_PORT") {
            if let Ok(p) = port.parse() {
                self.services.bridge.port = Some(p);
            }
        }
        if let Ok(url) = std::env::var("STITCH_BACKEND_URL") {
            self.backend.base_url = url;
        }
        if let Ok(key) =
            std::env::var("STITCH_BACKEND_API_KEY").or_else(|_| std::env::var("RAGFLOW_API_KEY"))
        {
            self.backend.api_key = Some(key);
        }
        if let Ok(assistant) = std::env::var("STITCH_BACKEND_ASSISTANT") {
            self.backend.assistant = assistant;
        }
        if let Ok(level) = std::env::var("STITCH_LOG_LEVEL") {
            self.observability.log_level = level;
        }
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        let path = config_path();
        let dir = config_dir();

        if !dir.exists() {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Get the effective bind address.
    pub fn bind_address(&self) -> &str {
        &self.network.bind
    }

    /// Get the effective bridge port.
    pub fn bridge_port(&self) -> u16 {
        self.services.bridge.port.unwrap_or(4460)
    }

    /// Get the bridge endpoint URL, e.g. "http://127.0.0.1:4460".
    pub fn bridge_endpoint(&self) -> String {
        format!("http://{}:{}", self.bind_address(), self.bridge_port())
    }
}
