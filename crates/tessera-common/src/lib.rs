//! Host plumbing shared by tessera frontends: diagnostics, persisted
//! settings, feature-scoped logging and tracing setup.

pub mod config;
pub mod error;
pub mod logger;

#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use crate::config::{FileStore, Loader, Saver, Settings};
pub use crate::error::{ParseError, TesseraError};
pub use crate::logger::{FeatureRegistry, LogLevel, log};
