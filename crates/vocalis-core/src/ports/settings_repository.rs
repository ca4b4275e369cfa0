//! Settings repository trait definition.
//!
//! This port is the persisted key-value slot for the API credential and the
//! theme preference (plus default synthesis parameters). Implementations
//! handle all storage details internally.

use async_trait::async_trait;

use super::RepositoryError;
use crate::settings::Settings;

/// Repository for application settings persistence.
///
/// # Design Rules
///
/// - Works with domain `Settings` type directly
/// - Implementation handles serialization internally
/// - Read at startup, written only on an explicit save action
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load application settings.
    ///
    /// Returns default settings if none are stored.
    async fn load(&self) -> Result<Settings, RepositoryError>;

    /// Save application settings.
    async fn save(&self, settings: &Settings) -> Result<(), RepositoryError>;
}
