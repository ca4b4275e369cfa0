//! Playback session: the single owner of the current sound.
//!
//! The session serializes overlapping play/pause/stop requests against one
//! audio handle. Every teardown advances a generation counter; synthesis
//! results and completion events carrying an older generation are dropped
//! on arrival, which is how an in-flight request gets cancelled. Synthesis
//! cycles run one at a time, so a superseded cycle's sound is released before
//! the next cycle reaches the backend.
//!
//! State changes are emitted as [`SessionEvent`]s on an unbounded channel
//! for the presentation layer to consume.

mod export;
mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use bytes::Bytes;
use tokio::sync::mpsc;
use vocalis_core::{SynthesisRequest, Voice, VoiceSettings};

use crate::audio::{AudioHandle, AudioOutput, CompletionSink};
use crate::backend::{BackendKind, SynthesisBackend, SynthesisOutcome};
use crate::catalog::VoiceCatalog;
use crate::error::VoiceError;
use crate::mixer::BackgroundMixer;

pub use state::{Action, SessionState};

/// Per-action synthesis parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisParams {
    pub rate: f32,
    pub pitch: f32,
    pub voice_settings: Option<VoiceSettings>,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            voice_settings: None,
        }
    }
}

/// What a successful `play` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// A new sound started. `exportable` is false when the engine spoke
    /// directly and no bytes exist.
    Started { exportable: bool },

    /// The paused sound for the same text and voice continued.
    Resumed,

    /// A newer play or a stop arrived while synthesizing; the result was discarded.
    Superseded,
}

/// Events emitted by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StateChanged(SessionState),

    /// The current sound drained on its own.
    PlaybackFinished,
}

/// What the current cycle is playing, for resume matching.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Current {
    text: String,
    voice_id: String,
}

struct Core {
    state: SessionState,
    generation: u64,
    handle: Option<Box<dyn AudioHandle>>,
    current: Option<Current>,

    /// Completion for the current generation arrived before synthesis returned.
    finished_early: bool,
}

struct Inner {
    backend: Arc<dyn SynthesisBackend>,
    catalog: Arc<VoiceCatalog>,
    output: Arc<dyn AudioOutput>,
    mixer: BackgroundMixer,
    core: Mutex<Core>,

    /// Held from the start of synthesis until the result is attached or dropped.
    cycle: tokio::sync::Mutex<()>,
    event_tx: mpsc::UnboundedSender<SessionEvent>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `action` to the table and emit a state-change event if it moved.
    fn apply(&self, core: &mut Core, action: Action) {
        let next = core.state.next(action);
        if next != core.state {
            tracing::debug!(old = %core.state, new = %next, ?action, "Session state transition");
            core.state = next;
            self.emit(SessionEvent::StateChanged(next));
        }
    }

    fn emit(&self, event: SessionEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("Session event receiver dropped");
        }
    }

    fn release_handle(core: &mut Core) {
        if let Some(handle) = core.handle.take() {
            handle.release();
        }
    }

    /// Completion event from a sound belonging to `generation`.
    fn complete(&self, generation: u64) {
        let mut core = self.lock();
        if core.generation != generation {
            tracing::debug!(generation, current = core.generation, "Ignoring stale completion");
            return;
        }
        if core.state == SessionState::Synthesizing {
            core.finished_early = true;
            return;
        }
        if !core.state.has_audio() {
            return;
        }

        Self::release_handle(&mut core);
        core.current = None;
        self.apply(&mut core, Action::Complete);
        drop(core);

        self.mixer.stop();
        self.emit(SessionEvent::PlaybackFinished);
    }
}

/// The playback session.
///
/// Cloning is cheap; clones share the same state, so one clone can await
/// `play` while another calls `stop`.
#[derive(Clone)]
pub struct PlaybackSession {
    inner: Arc<Inner>,
}

impl PlaybackSession {
    /// Create a session in `Idle`.
    ///
    /// Returns the session and a receiver for [`SessionEvent`]s.
    #[must_use]
    pub fn new(
        backend: Arc<dyn SynthesisBackend>,
        catalog: Arc<VoiceCatalog>,
        output: Arc<dyn AudioOutput>,
        mixer: BackgroundMixer,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let inner = Inner {
            backend,
            catalog,
            output,
            mixer,
            core: Mutex::new(Core {
                state: SessionState::Idle,
                generation: 0,
                handle: None,
                current: None,
                finished_early: false,
            }),
            cycle: tokio::sync::Mutex::new(()),
            event_tx,
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            event_rx,
        )
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// Identifier of the current synthesis/playback cycle.
    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.inner.backend.kind()
    }

    /// Whether an audio handle is currently held.
    pub fn has_audio_handle(&self) -> bool {
        self.inner.lock().handle.is_some()
    }

    pub fn mixer(&self) -> &BackgroundMixer {
        &self.inner.mixer
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.inner.catalog
    }

    /// Reject empty text, an empty voice id or a voice the catalog does not know.
    fn validate(&self, text: &str, voice_id: &str) -> Result<Voice, VoiceError> {
        if text.trim().is_empty() {
            return Err(VoiceError::Validation("Please enter some text".into()));
        }
        if voice_id.trim().is_empty() {
            return Err(VoiceError::Validation("Please select a voice".into()));
        }
        self.inner
            .catalog
            .resolve(voice_id)
            .map_err(|_| VoiceError::Validation(format!("Voice '{voice_id}' is not available")))
    }

    fn completion_sink(&self, generation: u64) -> CompletionSink {
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        CompletionSink::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.complete(generation);
            }
        })
    }

    /// Speak `text` with `voice_id`.
    ///
    /// Validation failures leave the state untouched. A paused session asked
    /// to play the same text and voice resumes instead of starting over.
    pub async fn play(
        &self,
        text: &str,
        voice_id: &str,
        params: &SynthesisParams,
    ) -> Result<PlayOutcome, VoiceError> {
        let voice = self.validate(text, voice_id)?;

        let generation = {
            let mut core = self.inner.lock();

            let same = core
                .current
                .as_ref()
                .is_some_and(|c| c.text == text && c.voice_id == voice.id);
            if core.state == SessionState::Paused && same {
                if let Some(handle) = &core.handle {
                    handle.resume();
                }
                self.inner.apply(&mut core, Action::Resume);
                return Ok(PlayOutcome::Resumed);
            }

            core.generation += 1;
            core.finished_early = false;
            Inner::release_handle(&mut core);
            core.current = Some(Current {
                text: text.to_string(),
                voice_id: voice.id.clone(),
            });
            self.inner.apply(&mut core, Action::Play);
            core.generation
        };

        // One cycle reaches the backend at a time. A local engine is already
        // speaking when `synthesize` returns.
        let _cycle = self.inner.cycle.lock().await;
        if self.inner.lock().generation != generation {
            tracing::debug!(generation, "Superseded before synthesis started");
            return Ok(PlayOutcome::Superseded);
        }

        let request = build_request(text, &voice, params);
        let completion = self.completion_sink(generation);
        tracing::info!(voice_id = %voice.id, generation, backend = %self.backend_kind(), "Synthesizing");

        let result = self
            .inner
            .backend
            .synthesize(&request, completion.clone())
            .await;

        let (handle, exportable) = match result {
            Ok(SynthesisOutcome::Buffer(audio)) => {
                if self.inner.lock().generation != generation {
                    tracing::debug!(generation, "Synthesis result superseded");
                    return Ok(PlayOutcome::Superseded);
                }
                match self.open_output(audio, completion).await {
                    Ok(handle) => (handle, true),
                    Err(e) => {
                        self.fail_if_current(generation);
                        return Err(e);
                    }
                }
            }
            Ok(SynthesisOutcome::DirectPlaybackStarted(handle)) => (handle, false),
            Err(e) => {
                let mut core = self.inner.lock();
                if core.generation != generation {
                    return Ok(PlayOutcome::Superseded);
                }
                tracing::warn!(error = %e, generation, "Synthesis failed");
                self.fail(&mut core);
                return Err(e);
            }
        };

        let mut core = self.inner.lock();
        if core.generation != generation {
            drop(core);
            handle.release();
            tracing::debug!(generation, "Synthesis result superseded");
            return Ok(PlayOutcome::Superseded);
        }

        Inner::release_handle(&mut core);
        core.handle = Some(handle);
        self.inner.apply(&mut core, Action::SynthesisSucceeded);

        if core.finished_early {
            Inner::release_handle(&mut core);
            core.current = None;
            self.inner.apply(&mut core, Action::Complete);
            drop(core);
            self.inner.mixer.stop();
            self.inner.emit(SessionEvent::PlaybackFinished);
        }

        Ok(PlayOutcome::Started { exportable })
    }

    /// Hand `audio` to the output on the blocking pool; opening the device
    /// and decoding can take a while.
    async fn open_output(
        &self,
        audio: Bytes,
        completion: CompletionSink,
    ) -> Result<Box<dyn AudioHandle>, VoiceError> {
        let output = Arc::clone(&self.inner.output);
        tokio::task::spawn_blocking(move || output.play(audio, completion))
            .await
            .map_err(|e| VoiceError::OutputStream(format!("audio output task failed: {e}")))?
    }

    /// Synthesizing → Idle, unless a newer cycle or a stop already took over.
    fn fail_if_current(&self, generation: u64) {
        let mut core = self.inner.lock();
        if core.generation == generation {
            self.fail(&mut core);
        }
    }

    fn fail(&self, core: &mut Core) {
        core.current = None;
        self.inner.apply(core, Action::SynthesisFailed);
    }

    /// Playing → Paused. No-op in any other state.
    pub fn pause(&self) {
        let mut core = self.inner.lock();
        if core.state != SessionState::Playing {
            return;
        }
        if let Some(handle) = &core.handle {
            handle.pause();
        }
        self.inner.apply(&mut core, Action::Pause);
    }

    /// Paused → Playing. No-op in any other state.
    pub fn resume(&self) {
        let mut core = self.inner.lock();
        if core.state != SessionState::Paused {
            return;
        }
        if let Some(handle) = &core.handle {
            handle.resume();
        }
        self.inner.apply(&mut core, Action::Resume);
    }

    /// Any → Stopped. Releases the handle, invalidates in-flight synthesis
    /// and halts the background mixer.
    pub fn stop(&self) {
        let mut core = self.inner.lock();
        core.generation += 1;
        Inner::release_handle(&mut core);
        core.current = None;
        self.inner.apply(&mut core, Action::Stop);
        drop(core);

        self.inner.mixer.stop();
    }

    /// Stopped → Idle. No-op in any other state.
    pub fn reset(&self) {
        let mut core = self.inner.lock();
        self.inner.apply(&mut core, Action::Reset);
    }
}

fn build_request(text: &str, voice: &Voice, params: &SynthesisParams) -> SynthesisRequest {
    let request = SynthesisRequest::new(text, voice.id.clone())
        .with_rate(params.rate)
        .with_pitch(params.pitch);
    match params.voice_settings {
        Some(settings) => request.with_voice_settings(settings),
        None => request,
    }
}
