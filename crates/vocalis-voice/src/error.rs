//! Playback and synthesis error types.

use std::time::Duration;

use vocalis_core::TrackKind;

/// Errors that can occur while listing voices, synthesizing or playing audio.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// The request was rejected before any work started.
    #[error("{0}")]
    Validation(String),

    /// The remote API rejected the credential (HTTP 401/403).
    #[error("Remote API rejected the API key: {0}")]
    Auth(String),

    /// Transport failure or unexpected HTTP status from the remote API.
    #[error("Remote API request failed: {0}")]
    Network(String),

    /// The backend does not know the requested voice.
    #[error("Voice '{0}' is not available on this backend")]
    InvalidVoice(String),

    /// The active backend cannot perform this operation.
    #[error("{0}")]
    UnsupportedOperation(String),

    /// The local engine never reported any voices.
    #[error("No voices available after waiting {}ms", waited.as_millis())]
    NoVoicesAvailable { waited: Duration },

    /// Neither a remote client nor a local engine is configured.
    #[error("No speech backend is available")]
    BackendUnavailable,

    /// Lookup of a voice id in the catalog failed.
    #[error("Voice '{0}' not found")]
    NotFound(String),

    /// The local speech engine process failed.
    #[error("Local speech engine failed: {0}")]
    Engine(String),

    /// Text extraction from an image failed.
    #[error("Text recognition failed: {0}")]
    Ocr(String),

    /// The input file type is not handled.
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// A background track could not be loaded.
    #[error("Background track '{kind}' unavailable: {reason}")]
    TrackUnavailable { kind: TrackKind, reason: String },

    /// Failed to open the audio output device or a sink on it.
    #[error("Failed to open audio output stream: {0}")]
    OutputStream(String),

    /// The dedicated audio thread exited.
    #[error("Audio thread is no longer running")]
    AudioThreadDied,

    /// Audio bytes could not be decoded.
    #[error("Failed to decode audio: {0}")]
    Decode(String),

    /// IO error (text files, track files, engine pipes).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VoiceError {
    /// Whether retrying the same call might succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
