//! JSON file implementation of the settings repository.
//!
//! Format: a single pretty-printed JSON object at `<data_root>/settings.json`.
//! Writes go through a temp file and a rename so a crash never leaves a
//! half-written credential behind.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::paths::{PathError, settings_path};
use crate::ports::{RepositoryError, SettingsRepository};
use crate::settings::Settings;

/// Settings repository backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonSettingsRepository {
    path: PathBuf,
}

impl JsonSettingsRepository {
    /// Repository at an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Repository at the default location (`VOCALIS_DATA_DIR` or the user config dir).
    pub fn at_default_location() -> Result<Self, PathError> {
        Ok(Self::new(settings_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage_err(context: &str, path: &Path, err: &io::Error) -> RepositoryError {
    RepositoryError::Storage(format!("{context} {}: {err}", path.display()))
}

#[async_trait]
impl SettingsRepository for JsonSettingsRepository {
    async fn load(&self) -> Result<Settings, RepositoryError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No settings file, using defaults");
                return Ok(Settings::with_defaults());
            }
            Err(e) => return Err(storage_err("Failed to read", &self.path, &e)),
        };

        if content.trim().is_empty() {
            return Ok(Settings::with_defaults());
        }

        serde_json::from_str(&content).map_err(|e| RepositoryError::Serialization(e.to_string()))
    }

    async fn save(&self, settings: &Settings) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_err("Failed to create", parent, &e))?;
        }

        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)
            .await
            .map_err(|e| storage_err("Failed to write", &temp_path, &e))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| storage_err("Failed to replace", &self.path, &e))?;

        tracing::debug!(path = %self.path.display(), "Settings written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Theme;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let repo = JsonSettingsRepository::new(dir.path().join("settings.json"));

        let settings = repo.load().await.unwrap();
        assert_eq!(settings, Settings::with_defaults());
    }

    #[tokio::test]
    async fn save_then_load_keeps_key_and_theme() {
        let dir = tempdir().unwrap();
        let repo = JsonSettingsRepository::new(dir.path().join("nested/settings.json"));

        let settings = Settings {
            api_key: Some("sk-live-9876".to_string()),
            theme: Some(Theme::Dark),
            ..Settings::with_defaults()
        };
        repo.save(&settings).await.unwrap();

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("sk-live-9876"));
        assert_eq!(loaded.effective_theme(), Theme::Dark);
        assert!(!dir.path().join("nested/settings.json.tmp").exists());
    }

    #[tokio::test]
    async fn clearing_key_persists_absence() {
        let dir = tempdir().unwrap();
        let repo = JsonSettingsRepository::new(dir.path().join("settings.json"));

        let mut settings = Settings {
            api_key: Some("sk-old".to_string()),
            ..Settings::with_defaults()
        };
        repo.save(&settings).await.unwrap();

        settings.api_key = None;
        repo.save(&settings).await.unwrap();

        assert!(!repo.load().await.unwrap().has_api_key());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let repo = JsonSettingsRepository::new(path);
        assert!(matches!(
            repo.load().await,
            Err(RepositoryError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn unknown_fields_are_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"theme":"dark","legacy_field":42}"#).unwrap();

        let repo = JsonSettingsRepository::new(path);
        let settings = repo.load().await.unwrap();
        assert_eq!(settings.effective_theme(), Theme::Dark);
    }
}
