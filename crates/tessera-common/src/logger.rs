//! Feature-scoped logging.
//!
//! Extensions log under a feature id (`columns`, `numbering`, ...). The
//! registry decides which ids reach `tracing`; everything else is dropped
//! before formatting. Logging never fails and returns nothing.

use std::cell::RefCell;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Which feature ids are logged, and from what level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureRegistry {
    /// Log every feature, ignoring `enabled`.
    pub all: bool,
    pub enabled: BTreeSet<String>,
    pub min_level: LogLevel,
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self {
            all: false,
            enabled: BTreeSet::new(),
            min_level: LogLevel::Info,
        }
    }
}

impl FeatureRegistry {
    pub fn enable(&mut self, feature_id: impl Into<String>) {
        self.enabled.insert(feature_id.into());
    }

    pub fn disable(&mut self, feature_id: &str) {
        self.enabled.remove(feature_id);
    }

    pub fn is_enabled(&self, feature_id: &str, level: LogLevel) -> bool {
        level >= self.min_level && (self.all || self.enabled.contains(feature_id))
    }
}

thread_local! {
    static REGISTRY: RefCell<FeatureRegistry> = RefCell::new(FeatureRegistry::default());
}

/// Replace the registry for this thread.
pub fn configure(registry: FeatureRegistry) {
    REGISTRY.with(|r| *r.borrow_mut() = registry);
}

/// Edit the registry for this thread in place.
pub fn update(f: impl FnOnce(&mut FeatureRegistry)) {
    REGISTRY.with(|r| f(&mut r.borrow_mut()));
}

pub fn is_enabled(feature_id: &str, level: LogLevel) -> bool {
    REGISTRY.with(|r| r.borrow().is_enabled(feature_id, level))
}

/// Emit `message` for `feature_id`, with optional structured data.
pub fn log(feature_id: &str, level: LogLevel, message: &str, data: Option<&serde_json::Value>) {
    if !is_enabled(feature_id, level) {
        return;
    }
    let data = data.map(ToString::to_string);
    let data = data.as_deref();
    match level {
        LogLevel::Debug => tracing::debug!(target: "tessera::feature", feature = feature_id, data, "{message}"),
        LogLevel::Info => tracing::info!(target: "tessera::feature", feature = feature_id, data, "{message}"),
        LogLevel::Warn => tracing::warn!(target: "tessera::feature", feature = feature_id, data, "{message}"),
        LogLevel::Error => tracing::error!(target: "tessera::feature", feature = feature_id, data, "{message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_filters_by_feature_and_level() {
        let mut registry = FeatureRegistry::default();
        registry.enable("columns");
        assert!(registry.is_enabled("columns", LogLevel::Warn));
        assert!(!registry.is_enabled("columns", LogLevel::Debug));
        assert!(!registry.is_enabled("numbering", LogLevel::Error));

        registry.all = true;
        assert!(registry.is_enabled("numbering", LogLevel::Info));
        registry.disable("columns");
        registry.all = false;
        assert!(!registry.is_enabled("columns", LogLevel::Error));
    }

    #[test]
    fn test_thread_registry_and_log_never_fail() {
        configure(FeatureRegistry::default());
        assert!(!is_enabled("heading", LogLevel::Error));
        update(|r| {
            r.enable("heading");
            r.min_level = LogLevel::Debug;
        });
        assert!(is_enabled("heading", LogLevel::Debug));

        let data = serde_json::json!({ "pos": 3 });
        log("heading", LogLevel::Debug, "split", Some(&data));
        log("unknown", LogLevel::Error, "dropped", None);
    }

    #[test]
    fn test_registry_from_json() {
        let registry: FeatureRegistry =
            serde_json::from_str(r#"{ "enabled": ["guideline"], "min_level": "warn" }"#).unwrap();
        assert!(registry.is_enabled("guideline", LogLevel::Error));
        assert!(!registry.is_enabled("guideline", LogLevel::Info));
    }
}
