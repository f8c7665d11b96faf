//! Tracing setup for native tessera hosts.
//!
//! # Usage
//!
//! ```ignore
//! use tessera_common::telemetry::{self, TelemetryConfig};
//!
//! fn main() {
//!     telemetry::init(TelemetryConfig::from_env("tessera-demo"));
//!     tracing::info!("editor ready");
//! }
//! ```
//!
//! `RUST_LOG=tessera::columns=trace` narrows output to one extension.

use tracing::Level;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name for labeling
    pub service_name: String,
    /// Console log level (default: INFO, DEBUG in debug builds)
    pub console_level: Level,
}

impl TelemetryConfig {
    /// Load config from environment variables.
    ///
    /// - `RUST_LOG`: Standard env filter (optional, overrides console_level)
    pub fn from_env(service_name: impl Into<String>) -> Self {
        let console_level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };

        Self {
            service_name: service_name.into(),
            console_level,
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.console_level.as_str().to_lowercase()))
    }
}

/// Install a compact console subscriber.
///
/// Returns `false` when a global subscriber was already set.
pub fn init(config: TelemetryConfig) -> bool {
    let installed = fmt()
        .with_env_filter(config.filter())
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish()
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(service = %config.service_name, "telemetry initialized");
    }
    installed
}
