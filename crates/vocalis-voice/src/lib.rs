//! Playback session controller for vocalis.
//!
//! Binds play, pause, resume, stop and export requests to either a remote
//! text-to-speech API or a local speech engine:
//!
//! ```text
//!   VoiceCatalog ──resolve──▶ PlaybackSession ──synthesize──▶ SynthesisBackend
//!                                  │   │                        ├─ RemoteBackend (bytes)
//!                                  │   └── AudioOutput (rodio)  └─ LocalBackend (espeak-ng)
//!                                  └── BackgroundMixer
//! ```

#![deny(unused_crate_dependencies)]

pub mod audio;
pub mod backend;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod input;
pub mod mixer;
pub mod remote;
pub mod session;

// Re-export key types for convenience
pub use audio::{AudioHandle, AudioOutput, CompletionSink, RodioOutput};
pub use backend::{BackendKind, LocalBackend, RemoteBackend, SynthesisBackend, SynthesisOutcome, select_backend};
pub use catalog::{RetryPolicy, VoiceCatalog, VoiceSource};
pub use engine::{EngineVoice, EspeakConfig, EspeakEngine, LocalSpeechEngine, Utterance};
pub use error::VoiceError;
pub use input::{OcrEngine, TesseractOcr, TextLoader};
pub use mixer::{BackgroundMixer, TrackLibrary, TrackSource};
pub use remote::{DefaultRemoteClient, RemoteApiConfig, RemoteClient, RemoteVoiceApi};
pub use session::{PlayOutcome, PlaybackSession, SessionEvent, SessionState, SynthesisParams};

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;
