//! Settings service: credential, theme and synthesis defaults.
//!
//! Every successful change is announced on the [`NotificationBus`] so the
//! presentation layer can confirm it. Failures are returned, not published;
//! the caller decides how to surface them.

use std::sync::Arc;

use crate::notifications::NotificationBus;
use crate::ports::{CoreError, SettingsRepository};
use crate::settings::{Settings, SettingsError, SettingsUpdate, Theme, validate_settings};

pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
    notifications: NotificationBus,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>, notifications: NotificationBus) -> Self {
        Self {
            repo,
            notifications,
        }
    }

    pub async fn get(&self) -> Result<Settings, CoreError> {
        self.repo.load().await.map_err(CoreError::from)
    }

    /// Merge, validate, then persist. Nothing is written if validation fails.
    async fn apply(&self, update: &SettingsUpdate) -> Result<Settings, CoreError> {
        let mut current = self.repo.load().await?;
        current.merge(update);
        validate_settings(&current)?;
        self.repo.save(&current).await?;
        tracing::debug!("Settings saved");
        Ok(current)
    }

    /// Update synthesis defaults and other plain preferences.
    pub async fn update(&self, update: SettingsUpdate) -> Result<Settings, CoreError> {
        let settings = self.apply(&update).await?;
        self.notifications.success("Settings updated.");
        Ok(settings)
    }

    /// Store the remote API key. Surrounding whitespace is dropped.
    pub async fn set_api_key(&self, key: &str) -> Result<Settings, CoreError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(SettingsError::EmptyApiKey.into());
        }

        let settings = self
            .apply(&SettingsUpdate {
                api_key: Some(Some(key.to_string())),
                ..Default::default()
            })
            .await?;
        tracing::info!("Remote API key stored");
        self.notifications
            .success("API key saved. The remote voice API will be used.");
        Ok(settings)
    }

    /// Remove the stored API key; speech falls back to the local engine.
    pub async fn clear_api_key(&self) -> Result<Settings, CoreError> {
        let had_key = self.get().await?.has_api_key();
        let settings = self
            .apply(&SettingsUpdate {
                api_key: Some(None),
                ..Default::default()
            })
            .await?;

        if had_key {
            tracing::info!("Remote API key removed");
            self.notifications
                .success("API key removed. The local speech engine will be used.");
        } else {
            self.notifications.info("No API key was stored.");
        }
        Ok(settings)
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<Theme, CoreError> {
        self.apply(&SettingsUpdate {
            theme: Some(Some(theme)),
            ..Default::default()
        })
        .await?;
        self.notifications.success(format!("Theme set to {theme}."));
        Ok(theme)
    }

    /// Switch between light and dark; returns the new theme.
    pub async fn toggle_theme(&self) -> Result<Theme, CoreError> {
        let next = self.get().await?.effective_theme().toggled();
        self.set_theme(next).await
    }

    /// Forget every stored preference, the API key included.
    pub async fn reset(&self) -> Result<(), CoreError> {
        self.repo.save(&Settings::with_defaults()).await?;
        self.notifications.success("Settings reset to defaults.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::{Notification, NotificationLevel};
    use crate::ports::RepositoryError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::broadcast;

    struct MockSettingsRepo {
        settings: Mutex<Settings>,
        saves: Mutex<usize>,
    }

    impl MockSettingsRepo {
        fn new() -> Self {
            Self {
                settings: Mutex::new(Settings::with_defaults()),
                saves: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl SettingsRepository for MockSettingsRepo {
        async fn load(&self) -> Result<Settings, RepositoryError> {
            Ok(self.settings.lock().unwrap().clone())
        }

        async fn save(&self, settings: &Settings) -> Result<(), RepositoryError> {
            *self.settings.lock().unwrap() = settings.clone();
            *self.saves.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn service() -> (
        SettingsService,
        Arc<MockSettingsRepo>,
        broadcast::Receiver<Notification>,
    ) {
        let repo = Arc::new(MockSettingsRepo::new());
        let bus = NotificationBus::new();
        let rx = bus.subscribe();
        (SettingsService::new(repo.clone(), bus), repo, rx)
    }

    #[tokio::test]
    async fn defaults_have_no_key_and_light_theme() {
        let (service, _repo, _rx) = service();

        let settings = service.get().await.unwrap();
        assert!(!settings.has_api_key());
        assert_eq!(settings.effective_theme(), Theme::Light);
    }

    #[tokio::test]
    async fn api_key_is_trimmed_stored_and_announced() {
        let (service, _repo, mut rx) = service();

        let settings = service.set_api_key("  sk-test \n").await.unwrap();
        assert_eq!(settings.api_key.as_deref(), Some("sk-test"));
        assert_eq!(service.get().await.unwrap().api_key.as_deref(), Some("sk-test"));

        let note = rx.try_recv().unwrap();
        assert_eq!(note.level, NotificationLevel::Success);
        assert!(note.message.contains("remote voice API"));
    }

    #[tokio::test]
    async fn blank_api_key_is_rejected_silently() {
        let (service, repo, mut rx) = service();

        assert!(matches!(
            service.set_api_key("   ").await,
            Err(CoreError::Settings(SettingsError::EmptyApiKey))
        ));
        assert_eq!(*repo.saves.lock().unwrap(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn clearing_key_falls_back_to_local_engine() {
        let (service, _repo, mut rx) = service();
        service.set_api_key("sk-old").await.unwrap();
        let _ = rx.try_recv();

        let settings = service.clear_api_key().await.unwrap();
        assert!(!settings.has_api_key());
        assert!(rx.try_recv().unwrap().message.contains("local speech engine"));

        service.clear_api_key().await.unwrap();
        assert_eq!(rx.try_recv().unwrap().level, NotificationLevel::Info);
    }

    #[tokio::test]
    async fn toggle_theme_flips_and_persists() {
        let (service, _repo, mut rx) = service();

        assert_eq!(service.toggle_theme().await.unwrap(), Theme::Dark);
        assert_eq!(service.get().await.unwrap().effective_theme(), Theme::Dark);
        assert_eq!(rx.try_recv().unwrap().message, "Theme set to dark.");

        assert_eq!(service.toggle_theme().await.unwrap(), Theme::Light);
    }

    #[tokio::test]
    async fn invalid_update_is_not_persisted() {
        let (service, repo, mut rx) = service();

        let update = SettingsUpdate {
            rate: Some(Some(50.0)),
            ..Default::default()
        };

        assert!(matches!(
            service.update(update).await,
            Err(CoreError::Settings(_))
        ));
        assert_eq!(*repo.saves.lock().unwrap(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn reset_drops_key_and_preferences() {
        let (service, _repo, _rx) = service();
        service.set_api_key("sk-1").await.unwrap();
        service.set_theme(Theme::Dark).await.unwrap();

        service.reset().await.unwrap();
        assert_eq!(service.get().await.unwrap(), Settings::with_defaults());
    }
}
