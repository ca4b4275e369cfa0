//! Export path: synthesize to bytes without touching playback.

use chrono::Local;
use vocalis_core::domain::DEFAULT_EXPORT_PREFIX;
use vocalis_core::{ExportArtifact, ExportFormat, export_file_name};

use super::{PlaybackSession, SynthesisParams, build_request};
use crate::audio::CompletionSink;
use crate::backend::SynthesisOutcome;
use crate::error::VoiceError;

const LOCAL_EXPORT_UNSUPPORTED: &str =
    "Export needs the remote voice API; the local engine speaks directly and produces no audio file";

impl PlaybackSession {
    /// Synthesize `text` into a downloadable artifact named `speech-<timestamp>.<ext>`.
    ///
    /// Session state and the current handle are left alone.
    pub async fn export(
        &self,
        text: &str,
        voice_id: &str,
        params: &SynthesisParams,
        format: ExportFormat,
    ) -> Result<ExportArtifact, VoiceError> {
        self.export_named(text, voice_id, params, format, DEFAULT_EXPORT_PREFIX)
            .await
    }

    /// Like [`export`](Self::export) with a custom file name prefix.
    ///
    /// `format` only picks the extension: the bytes are written exactly as
    /// the backend returned them.
    pub async fn export_named(
        &self,
        text: &str,
        voice_id: &str,
        params: &SynthesisParams,
        format: ExportFormat,
        prefix: &str,
    ) -> Result<ExportArtifact, VoiceError> {
        if !self.backend_kind().produces_buffer() {
            return Err(VoiceError::UnsupportedOperation(
                LOCAL_EXPORT_UNSUPPORTED.to_string(),
            ));
        }

        let voice = self.validate(text, voice_id)?;
        let request = build_request(text, &voice, params);

        match self
            .inner
            .backend
            .synthesize(&request, CompletionSink::noop())
            .await?
        {
            SynthesisOutcome::Buffer(audio) => {
                let artifact = ExportArtifact {
                    file_name: export_file_name(prefix, format, &Local::now()),
                    format,
                    bytes: audio.to_vec(),
                };
                tracing::info!(file = %artifact.file_name, bytes = artifact.len(), "Export ready");
                Ok(artifact)
            }
            SynthesisOutcome::DirectPlaybackStarted(handle) => {
                handle.release();
                Err(VoiceError::UnsupportedOperation(
                    LOCAL_EXPORT_UNSUPPORTED.to_string(),
                ))
            }
        }
    }
}
