//! Persisted host settings.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use tessera_editor_core::EditorConfig;

use crate::error::{ParseError, TesseraError};

/// Everything a host saves between sessions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub editor: EditorConfig,
    /// Locale tag, e.g. `en` or `zh`. `None` keeps the current locale.
    pub locale: Option<String>,
}

impl Settings {
    /// Loads the settings from the provided loader.
    pub async fn load(loader: &impl Loader) -> Result<Self, TesseraError> {
        loader.load().await
    }

    /// Saves the settings using the provided saver.
    pub async fn save(&self, saver: &impl Saver) -> Result<(), TesseraError> {
        saver.save(self).await
    }

    /// Switch the process locale to the saved one, if it is known.
    pub fn apply_locale(&self) {
        let Some(tag) = self.locale.as_deref() else {
            return;
        };
        match tessera_editor_core::i18n::Locale::from_tag(tag) {
            Some(locale) => tessera_editor_core::i18n::set_locale(locale),
            None => tracing::warn!(target: "tessera::i18n", tag, "unknown locale in settings"),
        }
    }
}

/// The trait for loading settings.
pub trait Loader {
    /// Loads the settings.
    fn load(&self) -> impl Future<Output = Result<Settings, TesseraError>> + Send;
}

/// The trait for saving settings.
pub trait Saver {
    /// Saves the settings.
    fn save(&self, settings: &Settings) -> impl Future<Output = Result<(), TesseraError>> + Send;
}

/// An implementation of [`Loader`] and [`Saver`] that reads and writes a settings file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new [`FileStore`] with the given path.
    ///
    /// The format follows the file extension. Only `.json` is supported.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_format(&self) -> Result<(), TesseraError> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(()),
            other => Err(TesseraError::UnsupportedFormat(
                other.unwrap_or_default().to_owned(),
            )),
        }
    }
}

impl Loader for FileStore {
    async fn load(&self) -> Result<Settings, TesseraError> {
        self.check_format()?;
        let text = std::fs::read_to_string(&self.path)?;
        let settings = serde_json::from_str(&text)
            .map_err(|e| ParseError::new(e, self.path.display().to_string(), text))?;
        tracing::debug!(path = %self.path.display(), "settings loaded");
        Ok(settings)
    }
}

impl Saver for FileStore {
    async fn save(&self, settings: &Settings) -> Result<(), TesseraError> {
        self.check_format()?;
        std::fs::write(&self.path, serde_json::to_string_pretty(settings)?)?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tessera-{}-{name}", std::process::id()))
    }

    #[tokio::test]
    async fn test_round_trip_through_file() {
        let store = FileStore::new(temp_path("settings.json"));
        let mut settings = Settings::default();
        settings.editor.columns.max_columns = 4;
        settings.locale = Some("zh-CN".into());

        settings.save(&store).await.unwrap();
        let loaded = Settings::load(&store).await.unwrap();
        assert_eq!(loaded, settings);
        let _ = std::fs::remove_file(store.path());
    }

    #[tokio::test]
    async fn test_partial_file_keeps_defaults() {
        let path = temp_path("partial.json");
        std::fs::write(&path, r#"{ "editor": { "columns": { "max_columns": 5 } } }"#).unwrap();
        let loaded = Settings::load(&FileStore::new(&path)).await.unwrap();
        assert_eq!(loaded.editor.columns.max_columns, 5);
        assert_eq!(loaded.editor.columns.min_columns, 2);
        assert_eq!(loaded.editor.heading, Default::default());
        assert_eq!(loaded.locale, None);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_rejects_unknown_extension() {
        let store = FileStore::new(temp_path("settings.toml"));
        let err = Settings::default().save(&store).await.unwrap_err();
        assert!(matches!(err, TesseraError::UnsupportedFormat(ext) if ext == "toml"));
    }

    #[tokio::test]
    async fn test_malformed_file_reports_location() {
        let path = temp_path("broken.json");
        std::fs::write(&path, "{\n  \"editor\": 3\n}").unwrap();
        let err = Settings::load(&FileStore::new(&path)).await.unwrap_err();
        assert!(matches!(err, TesseraError::Parse(_)));
        let _ = std::fs::remove_file(&path);
    }
}
