//! Application services composed over core ports.

mod settings_service;

pub use settings_service::SettingsService;
