//! CLI-specific error types and mappings.
//!
//! Library errors are converted to [`CliError`] at the command boundary so
//! `main` can pick an exit code. The user-facing message is published as a
//! notification before the conversion.

use thiserror::Error;
use vocalis_core::{CoreError, PathError};
use vocalis_voice::VoiceError;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Core domain error.
    #[error("{0}")]
    Core(String),

    /// Argument or input validation error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error, including a rejected API key.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No backend could serve the request.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Input data could not be turned into text or audio.
    #[error("Unsupported input: {0}")]
    Data(String),

    /// Audio device failure.
    #[error("Playback error: {0}")]
    Playback(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Core(_) => 1,
            Self::Arguments(_) => 2,
            Self::Data(_) => 65,        // EX_DATAERR
            Self::Unavailable(_) => 69, // EX_UNAVAILABLE
            Self::Playback(_) => 71,    // EX_OSERR
            Self::Io(_) => 74,          // EX_IOERR
            Self::Config(_) => 78,      // EX_CONFIG
        }
    }
}

impl From<VoiceError> for CliError {
    fn from(err: VoiceError) -> Self {
        let msg = err.to_string();
        match err {
            VoiceError::Validation(_) | VoiceError::InvalidVoice(_) | VoiceError::NotFound(_) => {
                Self::Arguments(msg)
            }
            VoiceError::Auth(_) => Self::Config(msg),
            VoiceError::Network(_)
            | VoiceError::BackendUnavailable
            | VoiceError::NoVoicesAvailable { .. }
            | VoiceError::Engine(_) => Self::Unavailable(msg),
            VoiceError::Ocr(_) | VoiceError::UnsupportedFileType(_) | VoiceError::Decode(_) => {
                Self::Data(msg)
            }
            VoiceError::TrackUnavailable { .. } | VoiceError::Io(_) => Self::Io(msg),
            VoiceError::OutputStream(_) | VoiceError::AudioThreadDied => Self::Playback(msg),
            VoiceError::UnsupportedOperation(_) => Self::Core(msg),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Repository(repo_err) => Self::Io(repo_err.to_string()),
            CoreError::Settings(settings_err) => Self::Arguments(settings_err.to_string()),
            CoreError::Path(path_err) => Self::from(path_err),
        }
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::NoConfigDir => Self::Config(err.to_string()),
            PathError::EmptyPath | PathError::CreateFailed { .. } => Self::Io(err.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
