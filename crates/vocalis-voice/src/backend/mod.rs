//! Synthesis backends.
//!
//! The [`PlaybackSession`](crate::session::PlaybackSession) operates on a
//! single `Arc<dyn SynthesisBackend>` chosen once at construction, so the
//! remote and local paths can be swapped without touching session logic.
//!
//! | Backend            | Outcome                   | Exportable |
//! |--------------------|---------------------------|------------|
//! | [`RemoteBackend`]  | encoded audio buffer      | yes        |
//! | [`LocalBackend`]   | engine already speaking   | no         |

mod local;
mod remote;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use vocalis_core::SynthesisRequest;

use crate::audio::{AudioHandle, CompletionSink};
use crate::engine::LocalSpeechEngine;
use crate::error::VoiceError;
use crate::remote::RemoteVoiceApi;

pub use local::LocalBackend;
pub use remote::RemoteBackend;

/// Which synthesis path a session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Remote,
    Local,
}

impl BackendKind {
    /// Whether synthesis yields bytes that can be exported.
    pub const fn produces_buffer(self) -> bool {
        matches!(self, Self::Remote)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => f.write_str("remote"),
            Self::Local => f.write_str("local"),
        }
    }
}

/// Result of a successful synthesis.
pub enum SynthesisOutcome {
    /// Encoded audio (mp3 from the remote API) for the session to play.
    Buffer(Bytes),

    /// The engine is already speaking; this handle controls it.
    DirectPlaybackStarted(Box<dyn AudioHandle>),
}

impl fmt::Debug for SynthesisOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffer(bytes) => f.debug_tuple("Buffer").field(&bytes.len()).finish(),
            Self::DirectPlaybackStarted(_) => f.write_str("DirectPlaybackStarted"),
        }
    }
}

/// Backend-agnostic speech synthesizer.
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Synthesize `request`.
    ///
    /// Backends that play directly fire `completion` when speech ends on its
    /// own. Buffer-producing backends ignore it.
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        completion: CompletionSink,
    ) -> Result<SynthesisOutcome, VoiceError>;
}

/// Pick the backend once: remote when a credential-bearing client exists,
/// otherwise the local engine.
pub fn select_backend(
    remote: Option<Arc<dyn RemoteVoiceApi>>,
    local: Option<Arc<dyn LocalSpeechEngine>>,
) -> Result<Arc<dyn SynthesisBackend>, VoiceError> {
    match (remote, local) {
        (Some(api), _) => {
            tracing::info!("Using remote synthesis backend");
            Ok(Arc::new(RemoteBackend::new(api)))
        }
        (None, Some(engine)) => {
            tracing::info!("Using local synthesis backend");
            Ok(Arc::new(LocalBackend::new(engine)))
        }
        (None, None) => Err(VoiceError::BackendUnavailable),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EspeakConfig, EspeakEngine};
    use crate::remote::MockRemoteVoiceApi;

    #[test]
    fn credential_selects_remote() {
        let remote: Arc<dyn RemoteVoiceApi> = Arc::new(MockRemoteVoiceApi::new());
        let local: Arc<dyn LocalSpeechEngine> =
            Arc::new(EspeakEngine::new(EspeakConfig::default()));

        let backend = select_backend(Some(remote), Some(local.clone())).unwrap();
        assert_eq!(backend.kind(), BackendKind::Remote);

        let backend = select_backend(None, Some(local)).unwrap();
        assert_eq!(backend.kind(), BackendKind::Local);
    }

    #[test]
    fn nothing_configured_is_unavailable() {
        assert!(matches!(
            select_backend(None, None),
            Err(VoiceError::BackendUnavailable)
        ));
    }

    #[test]
    fn only_remote_produces_buffers() {
        assert!(BackendKind::Remote.produces_buffer());
        assert!(!BackendKind::Local.produces_buffer());
    }
}
