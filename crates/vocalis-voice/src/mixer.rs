//! Background music under the speech.
//!
//! At most one loop plays at a time. The mixer never talks to the session;
//! the session calls [`BackgroundMixer::stop`] when speech ends.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use vocalis_core::TrackKind;

use crate::audio::{AudioHandle, AudioOutput};
use crate::error::VoiceError;

/// Source of encoded audio for each background track.
pub trait TrackSource: Send + Sync {
    fn load(&self, kind: TrackKind) -> Result<Bytes, VoiceError>;
}

/// Tracks stored as `<dir>/<kind>.mp3`.
#[derive(Debug, Clone)]
pub struct TrackLibrary {
    dir: PathBuf,
}

impl TrackLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, kind: TrackKind) -> PathBuf {
        self.dir.join(format!("{}.mp3", kind.as_str()))
    }
}

impl TrackSource for TrackLibrary {
    fn load(&self, kind: TrackKind) -> Result<Bytes, VoiceError> {
        let path = self.path_for(kind);
        std::fs::read(&path)
            .map(Bytes::from)
            .map_err(|e| VoiceError::TrackUnavailable {
                kind,
                reason: format!("{}: {e}", path.display()),
            })
    }
}

struct MixerState {
    active: TrackKind,
    volume: f32,
    handle: Option<Box<dyn AudioHandle>>,
}

/// Plays one looping background track at a time.
///
/// Cloning is cheap; clones control the same track.
#[derive(Clone)]
pub struct BackgroundMixer {
    output: Arc<dyn AudioOutput>,
    tracks: Arc<dyn TrackSource>,
    state: Arc<Mutex<MixerState>>,
}

impl BackgroundMixer {
    pub fn new(output: Arc<dyn AudioOutput>, tracks: Arc<dyn TrackSource>, volume: f32) -> Self {
        Self {
            output,
            tracks,
            state: Arc::new(Mutex::new(MixerState {
                active: TrackKind::None,
                volume: volume.clamp(0.0, 1.0),
                handle: None,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MixerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stop whatever is playing, then loop `kind`. `TrackKind::None` only stops.
    pub fn start(&self, kind: TrackKind) -> Result<(), VoiceError> {
        let mut state = self.lock();
        if let Some(handle) = state.handle.take() {
            handle.release();
        }
        state.active = TrackKind::None;

        if kind == TrackKind::None {
            return Ok(());
        }

        let audio = self.tracks.load(kind)?;
        let handle = self.output.play_looped(audio, state.volume)?;
        state.handle = Some(handle);
        state.active = kind;
        tracing::debug!(track = %kind, volume = state.volume, "Background track started");
        Ok(())
    }

    /// Clamp to `[0, 1]` and apply to the active track.
    pub fn set_volume(&self, volume: f32) {
        let mut state = self.lock();
        state.volume = volume.clamp(0.0, 1.0);
        if let Some(handle) = &state.handle {
            handle.set_volume(state.volume);
        }
    }

    /// Halt and release the active track, if any.
    pub fn stop(&self) {
        let mut state = self.lock();
        if let Some(handle) = state.handle.take() {
            handle.release();
            tracing::debug!(track = %state.active, "Background track stopped");
        }
        state.active = TrackKind::None;
    }

    pub fn active(&self) -> TrackKind {
        self.lock().active
    }

    pub fn volume(&self) -> f32 {
        self.lock().volume
    }
}
