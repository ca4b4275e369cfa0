//! Settings domain types and validation.
//!
//! This module contains the persisted user preferences: the remote API
//! credential, the UI theme, and default synthesis parameters. These are
//! pure domain types with no infrastructure dependencies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::VoiceSettings;

/// Default remote model used for synthesis.
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

/// Default background music volume.
pub const DEFAULT_BACKGROUND_VOLUME: f32 = 0.3;

/// UI colour theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme '{other}' (expected light or dark)")),
        }
    }
}

/// Application settings structure.
///
/// All fields are optional to support partial updates and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Remote text-to-speech API key. `None` selects the local engine.
    pub api_key: Option<String>,

    /// Remote API base URL override.
    pub api_base_url: Option<String>,

    /// UI theme preference.
    pub theme: Option<Theme>,

    /// Voice preselected for `speak`/`export` when none is given.
    pub default_voice_id: Option<String>,

    /// Default speaking rate (1.0 = normal).
    pub rate: Option<f32>,

    /// Default pitch (1.0 = normal).
    pub pitch: Option<f32>,

    /// Remote voice stability.
    pub stability: Option<f32>,

    /// Remote voice similarity boost.
    pub similarity_boost: Option<f32>,

    /// Remote synthesis model identifier.
    pub model_id: Option<String>,

    /// Background music volume.
    pub background_volume: Option<f32>,

    /// Directory holding `ambient.mp3`, `classical.mp3` and `lofi.mp3`.
    pub tracks_dir: Option<String>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        let voice = VoiceSettings::default();
        Self {
            api_key: None,
            api_base_url: None,
            theme: Some(Theme::Light),
            default_voice_id: None,
            rate: Some(1.0),
            pitch: Some(1.0),
            stability: Some(voice.stability),
            similarity_boost: Some(voice.similarity_boost),
            model_id: Some(DEFAULT_MODEL_ID.to_string()),
            background_volume: Some(DEFAULT_BACKGROUND_VOLUME),
            tracks_dir: None,
        }
    }

    /// Whether a usable remote credential is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// The API key with everything but the last four characters masked.
    pub fn redacted_api_key(&self) -> Option<String> {
        self.api_key.as_deref().map(|key| {
            let visible: String = key
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("****{visible}")
        })
    }

    #[must_use]
    pub fn effective_theme(&self) -> Theme {
        self.theme.unwrap_or_default()
    }

    #[must_use]
    pub fn effective_rate(&self) -> f32 {
        self.rate.unwrap_or(1.0)
    }

    #[must_use]
    pub fn effective_pitch(&self) -> f32 {
        self.pitch.unwrap_or(1.0)
    }

    #[must_use]
    pub fn effective_model_id(&self) -> &str {
        self.model_id.as_deref().unwrap_or(DEFAULT_MODEL_ID)
    }

    #[must_use]
    pub fn effective_background_volume(&self) -> f32 {
        self.background_volume.unwrap_or(DEFAULT_BACKGROUND_VOLUME)
    }

    /// Remote voice shaping parameters with defaults filled in.
    #[must_use]
    pub fn voice_settings(&self) -> VoiceSettings {
        let defaults = VoiceSettings::default();
        VoiceSettings::new(
            self.stability.unwrap_or(defaults.stability),
            self.similarity_boost.unwrap_or(defaults.similarity_boost),
        )
    }

    /// Merge another settings into this one, only updating fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref key) = other.api_key {
            self.api_key.clone_from(key);
        }
        if let Some(ref url) = other.api_base_url {
            self.api_base_url.clone_from(url);
        }
        if let Some(theme) = other.theme {
            self.theme = theme;
        }
        if let Some(ref voice) = other.default_voice_id {
            self.default_voice_id.clone_from(voice);
        }
        if let Some(rate) = other.rate {
            self.rate = rate;
        }
        if let Some(pitch) = other.pitch {
            self.pitch = pitch;
        }
        if let Some(stability) = other.stability {
            self.stability = stability;
        }
        if let Some(similarity) = other.similarity_boost {
            self.similarity_boost = similarity;
        }
        if let Some(ref model) = other.model_id {
            self.model_id.clone_from(model);
        }
        if let Some(volume) = other.background_volume {
            self.background_volume = volume;
        }
        if let Some(ref dir) = other.tracks_dir {
            self.tracks_dir.clone_from(dir);
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = set field to None/null
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub api_key: Option<Option<String>>,
    pub api_base_url: Option<Option<String>>,
    pub theme: Option<Option<Theme>>,
    pub default_voice_id: Option<Option<String>>,
    pub rate: Option<Option<f32>>,
    pub pitch: Option<Option<f32>>,
    pub stability: Option<Option<f32>>,
    pub similarity_boost: Option<Option<f32>>,
    pub model_id: Option<Option<String>>,
    pub background_volume: Option<Option<f32>>,
    pub tracks_dir: Option<Option<String>>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Rate must be between 0.1 and 10.0, got {0}")]
    InvalidRate(f32),

    #[error("Pitch must be between 0.0 and 2.0, got {0}")]
    InvalidPitch(f32),

    #[error("{field} must be between 0.0 and 1.0, got {value}")]
    OutOfUnitRange { field: &'static str, value: f32 },

    #[error("API key cannot be empty (use `config clear-key` to remove it)")]
    EmptyApiKey,

    #[error("{0} cannot be empty")]
    EmptyValue(&'static str),
}

fn check_unit(field: &'static str, value: Option<f32>) -> Result<(), SettingsError> {
    match value {
        Some(v) if !(0.0..=1.0).contains(&v) => Err(SettingsError::OutOfUnitRange { field, value: v }),
        _ => Ok(()),
    }
}

fn check_not_blank(field: &'static str, value: Option<&str>) -> Result<(), SettingsError> {
    if value.is_some_and(|v| v.trim().is_empty()) {
        return Err(SettingsError::EmptyValue(field));
    }
    Ok(())
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(rate) = settings.rate {
        if !(0.1..=10.0).contains(&rate) {
            return Err(SettingsError::InvalidRate(rate));
        }
    }

    if let Some(pitch) = settings.pitch {
        if !(0.0..=2.0).contains(&pitch) {
            return Err(SettingsError::InvalidPitch(pitch));
        }
    }

    check_unit("Stability", settings.stability)?;
    check_unit("Similarity boost", settings.similarity_boost)?;
    check_unit("Background volume", settings.background_volume)?;

    if settings
        .api_key
        .as_ref()
        .is_some_and(|k| k.trim().is_empty())
    {
        return Err(SettingsError::EmptyApiKey);
    }

    check_not_blank("Model id", settings.model_id.as_deref())?;
    check_not_blank("API base URL", settings.api_base_url.as_deref())?;
    check_not_blank("Tracks directory", settings.tracks_dir.as_deref())?;
    check_not_blank("Default voice", settings.default_voice_id.as_deref())?;

    Ok(())
}
