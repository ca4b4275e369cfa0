//! Local speech engine port.
//!
//! A local engine speaks directly to the audio device: there is no byte
//! buffer to hand back, only a handle to pause, resume or cancel the
//! utterance. [`EspeakEngine`] drives the `espeak-ng` command-line tool.

mod espeak;

use async_trait::async_trait;

use crate::audio::{AudioHandle, CompletionSink};
use crate::error::VoiceError;

pub use espeak::{EspeakConfig, EspeakEngine};

/// A voice as reported by the local engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineVoice {
    pub name: String,

    /// BCP-47-ish language tag (`en-us`, `fr`, ...).
    pub language: String,
}

impl EngineVoice {
    pub fn new(name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
        }
    }
}

/// One thing to say.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub voice: String,

    /// Rate multiplier (1.0 = normal).
    pub rate: f32,

    /// Pitch multiplier (1.0 = normal).
    pub pitch: f32,
}

/// Backend-agnostic local speech engine.
///
/// `list_voices` may legitimately return an empty list while the engine is
/// still starting up; callers poll (see [`crate::catalog::RetryPolicy`]).
#[async_trait]
pub trait LocalSpeechEngine: Send + Sync {
    async fn list_voices(&self) -> Result<Vec<EngineVoice>, VoiceError>;

    /// Start speaking. Returns once audio has started; `completion` fires
    /// when the utterance ends on its own.
    async fn speak(
        &self,
        utterance: Utterance,
        completion: CompletionSink,
    ) -> Result<Box<dyn AudioHandle>, VoiceError>;
}
