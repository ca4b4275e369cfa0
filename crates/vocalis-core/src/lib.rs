//! Core domain types and port definitions for vocalis.
//!
//! This crate holds everything the playback layer and the CLI agree on:
//! voices, synthesis requests, background tracks, export naming, persisted
//! settings and the notification bus. It carries no audio or network code.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod notifications;
pub mod paths;
pub mod ports;
pub mod services;
pub mod settings;
pub mod storage;

// Re-export commonly used types for convenience
pub use domain::{
    BackgroundTrack, ExportArtifact, ExportFormat, SynthesisRequest, TrackKind, Voice,
    VoiceSettings, export_file_name,
};
pub use notifications::{Notification, NotificationBus, NotificationLevel};
pub use paths::{PathError, data_root, ensure_dir, settings_path};
pub use ports::{CoreError, RepositoryError, SettingsRepository};
pub use services::SettingsService;
pub use settings::{Settings, SettingsError, SettingsUpdate, Theme, validate_settings};
pub use storage::JsonSettingsRepository;

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;
