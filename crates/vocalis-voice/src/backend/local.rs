//! Local backend: the engine speaks straight to the device.
//!
//! The engine's voice list is cached and only refreshed when a request names
//! a voice the cache does not know.
//!
//! Pitch is not forwarded on this path. The utterance always carries a
//! neutral pitch, matching what the engine is known to honour reliably.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use vocalis_core::SynthesisRequest;

use super::{BackendKind, SynthesisBackend, SynthesisOutcome};
use crate::audio::CompletionSink;
use crate::engine::{EngineVoice, LocalSpeechEngine, Utterance};
use crate::error::VoiceError;

const NEUTRAL_PITCH: f32 = 1.0;

pub struct LocalBackend {
    engine: Arc<dyn LocalSpeechEngine>,
    voices: Mutex<Vec<EngineVoice>>,
}

impl LocalBackend {
    pub fn new(engine: Arc<dyn LocalSpeechEngine>) -> Self {
        Self {
            engine,
            voices: Mutex::new(Vec::new()),
        }
    }

    fn cached(&self, name: &str) -> Option<EngineVoice> {
        self.voices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|v| v.name == name)
            .cloned()
    }

    async fn find_voice(&self, name: &str) -> Result<EngineVoice, VoiceError> {
        if let Some(voice) = self.cached(name) {
            return Ok(voice);
        }

        let voices = self.engine.list_voices().await?;
        tracing::debug!(count = voices.len(), "Refreshed local engine voices");
        let found = voices.iter().find(|v| v.name == name).cloned();
        *self.voices.lock().unwrap_or_else(PoisonError::into_inner) = voices;
        found.ok_or_else(|| VoiceError::InvalidVoice(name.to_string()))
    }
}

#[async_trait]
impl SynthesisBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        completion: CompletionSink,
    ) -> Result<SynthesisOutcome, VoiceError> {
        let voice = self.find_voice(&request.voice_id).await?;

        if (request.pitch - NEUTRAL_PITCH).abs() > f32::EPSILON {
            tracing::debug!(pitch = request.pitch, "Pitch is not applied by the local engine");
        }

        let utterance = Utterance {
            text: request.text.clone(),
            voice: voice.name,
            rate: request.rate,
            pitch: NEUTRAL_PITCH,
        };

        let handle = self.engine.speak(utterance, completion).await?;
        Ok(SynthesisOutcome::DirectPlaybackStarted(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioHandle;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullHandle;

    impl AudioHandle for NullHandle {
        fn pause(&self) {}
        fn resume(&self) {}
        fn set_volume(&self, _volume: f32) {}
        fn release(&self) {}
    }

    #[derive(Default)]
    struct RecordingEngine {
        spoken: Mutex<Vec<Utterance>>,
        listings: AtomicUsize,
    }

    #[async_trait]
    impl LocalSpeechEngine for RecordingEngine {
        async fn list_voices(&self) -> Result<Vec<EngineVoice>, VoiceError> {
            self.listings.fetch_add(1, Ordering::SeqCst);
            Ok(vec![EngineVoice::new("en-us", "en-US")])
        }

        async fn speak(
            &self,
            utterance: Utterance,
            _completion: CompletionSink,
        ) -> Result<Box<dyn AudioHandle>, VoiceError> {
            self.spoken.lock().unwrap().push(utterance);
            Ok(Box::new(NullHandle))
        }
    }

    #[tokio::test]
    async fn speaks_with_neutral_pitch() {
        let engine = Arc::new(RecordingEngine::default());
        let backend = LocalBackend::new(engine.clone());

        let request = SynthesisRequest::new("Hello", "en-us")
            .with_rate(1.4)
            .with_pitch(1.8);
        let outcome = backend
            .synthesize(&request, CompletionSink::noop())
            .await
            .unwrap();
        assert!(matches!(outcome, SynthesisOutcome::DirectPlaybackStarted(_)));

        let spoken = engine.spoken.lock().unwrap();
        assert_eq!(spoken.len(), 1);
        assert!((spoken[0].rate - 1.4).abs() < f32::EPSILON);
        assert!((spoken[0].pitch - 1.0).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn unknown_voice_is_invalid() {
        let engine = Arc::new(RecordingEngine::default());
        let backend = LocalBackend::new(engine.clone());

        let err = backend
            .synthesize(&SynthesisRequest::new("Hello", "klingon"), CompletionSink::noop())
            .await
            .unwrap_err();
        assert!(matches!(err, VoiceError::InvalidVoice(ref v) if v == "klingon"));
        assert!(engine.spoken.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn voice_list_is_fetched_once_for_known_voices() {
        let engine = Arc::new(RecordingEngine::default());
        let backend = LocalBackend::new(engine.clone());

        for text in ["One", "Two", "Three"] {
            backend
                .synthesize(&SynthesisRequest::new(text, "en-us"), CompletionSink::noop())
                .await
                .unwrap();
        }

        assert_eq!(engine.listings.load(Ordering::SeqCst), 1);
        assert_eq!(engine.spoken.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn unknown_voice_refreshes_the_cache() {
        let engine = Arc::new(RecordingEngine::default());
        let backend = LocalBackend::new(engine.clone());

        backend
            .synthesize(&SynthesisRequest::new("Hi", "en-us"), CompletionSink::noop())
            .await
            .unwrap();
        let _ = backend
            .synthesize(&SynthesisRequest::new("Hi", "fr"), CompletionSink::noop())
            .await;

        assert_eq!(engine.listings.load(Ordering::SeqCst), 2);
    }
}
