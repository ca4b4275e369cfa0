//! Remote backend: the API returns encoded audio for the session to play.

use std::sync::Arc;

use async_trait::async_trait;
use vocalis_core::SynthesisRequest;

use super::{BackendKind, SynthesisBackend, SynthesisOutcome};
use crate::audio::CompletionSink;
use crate::error::VoiceError;
use crate::remote::RemoteVoiceApi;

pub struct RemoteBackend {
    api: Arc<dyn RemoteVoiceApi>,
}

impl RemoteBackend {
    pub fn new(api: Arc<dyn RemoteVoiceApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl SynthesisBackend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn synthesize(
        &self,
        request: &SynthesisRequest,
        _completion: CompletionSink,
    ) -> Result<SynthesisOutcome, VoiceError> {
        let audio = self.api.synthesize(request).await?;
        Ok(SynthesisOutcome::Buffer(audio))
    }
}
