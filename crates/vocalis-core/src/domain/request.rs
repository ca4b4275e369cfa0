//! Synthesis request types.

use serde::{Deserialize, Serialize};

/// Default remote voice stability.
pub const DEFAULT_STABILITY: f32 = 0.5;

/// Default remote voice similarity boost.
pub const DEFAULT_SIMILARITY_BOOST: f32 = 0.75;

/// Remote-only voice shaping parameters.
///
/// The local engine has no equivalent knobs and ignores these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Voice stability (0.0–1.0).
    pub stability: f32,

    /// Similarity boost (0.0–1.0).
    pub similarity_boost: f32,
}

impl VoiceSettings {
    /// Build settings with both values clamped to `[0, 1]`.
    #[must_use]
    pub fn new(stability: f32, similarity_boost: f32) -> Self {
        Self {
            stability: stability.clamp(0.0, 1.0),
            similarity_boost: similarity_boost.clamp(0.0, 1.0),
        }
    }
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self::new(DEFAULT_STABILITY, DEFAULT_SIMILARITY_BOOST)
    }
}

/// One play or export action's worth of input.
///
/// Constructed fresh per action and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    /// Text to speak. Must be non-empty (after trimming) to be valid.
    pub text: String,

    /// Identifier of the voice to use.
    pub voice_id: String,

    /// Speaking rate multiplier (1.0 = normal).
    pub rate: f32,

    /// Pitch multiplier (1.0 = normal). Not honoured by every backend.
    pub pitch: f32,

    /// Optional remote voice shaping parameters.
    pub voice_settings: Option<VoiceSettings>,
}

impl SynthesisRequest {
    /// Create a request with neutral rate/pitch and no voice settings.
    pub fn new(text: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_id: voice_id.into(),
            rate: 1.0,
            pitch: 1.0,
            voice_settings: None,
        }
    }

    #[must_use]
    pub const fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    #[must_use]
    pub const fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    #[must_use]
    pub const fn with_voice_settings(mut self, settings: VoiceSettings) -> Self {
        self.voice_settings = Some(settings);
        self
    }

    /// Whether the text contains anything besides whitespace.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_settings_are_clamped() {
        let settings = VoiceSettings::new(1.7, -0.2);
        assert!((settings.stability - 1.0).abs() < f32::EPSILON);
        assert!(settings.similarity_boost.abs() < f32::EPSILON);
    }

    #[test]
    fn whitespace_text_is_not_text() {
        assert!(!SynthesisRequest::new("  \n\t", "v").has_text());
        assert!(SynthesisRequest::new(" hi ", "v").has_text());
    }

    #[test]
    fn builder_sets_parameters() {
        let req = SynthesisRequest::new("Hello", "voice1")
            .with_rate(1.5)
            .with_pitch(0.8)
            .with_voice_settings(VoiceSettings::default());
        assert!((req.rate - 1.5).abs() < f32::EPSILON);
        assert!((req.pitch - 0.8).abs() < f32::EPSILON);
        assert_eq!(req.voice_settings, Some(VoiceSettings::default()));
    }
}
