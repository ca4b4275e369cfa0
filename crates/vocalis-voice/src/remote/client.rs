//! Remote voice API client.

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;
use vocalis_core::{SynthesisRequest, Voice};

use super::RemoteVoiceApi;
use super::config::RemoteApiConfig;
use super::http::{HttpBackend, HttpReply, ReqwestBackend};
use super::models::{SpeechRequestBody, VoicesResponse, WireVoiceSettings};
use crate::error::VoiceError;

/// The remote API only accepts speeds in this range.
const MIN_SPEED: f32 = 0.7;
const MAX_SPEED: f32 = 1.2;

const AUDIO_MPEG: &str = "audio/mpeg";

/// Default client using the reqwest HTTP backend.
pub type DefaultRemoteClient = RemoteClient<ReqwestBackend>;

/// Client for the remote voice API, generic over the HTTP backend.
pub struct RemoteClient<B: HttpBackend> {
    backend: B,
    base_url: Url,
    model_id: String,
}

impl DefaultRemoteClient {
    pub fn new(config: &RemoteApiConfig) -> Result<Self, VoiceError> {
        let backend = ReqwestBackend::new(config)?;
        Self::with_backend(config, backend)
    }
}

impl<B: HttpBackend> RemoteClient<B> {
    /// Create a client over a custom backend.
    pub fn with_backend(config: &RemoteApiConfig, backend: B) -> Result<Self, VoiceError> {
        // A trailing slash keeps `join` from replacing the last path segment.
        let mut root = config.base_url.trim_end_matches('/').to_string();
        root.push('/');
        let base_url = Url::parse(&root)
            .map_err(|e| VoiceError::Validation(format!("invalid API base URL '{root}': {e}")))?;

        Ok(Self {
            backend,
            base_url,
            model_id: config.model_id.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, VoiceError> {
        self.base_url
            .join(path)
            .map_err(|e| VoiceError::Validation(format!("invalid endpoint '{path}': {e}")))
    }

    /// `text-to-speech/<voice_id>`, with the id escaped as one path segment.
    fn speech_endpoint(&self, voice_id: &str) -> Result<Url, VoiceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                VoiceError::Validation(format!("API base URL '{}' cannot take a path", self.base_url))
            })?
            .pop_if_empty()
            .push("text-to-speech")
            .push(voice_id);
        Ok(url)
    }

    /// Map a non-2xx reply to the matching error.
    fn check(reply: HttpReply, url: &Url) -> Result<Bytes, VoiceError> {
        if reply.is_success() {
            return Ok(reply.body);
        }

        let detail = error_detail(&reply.body);
        match reply.status {
            401 | 403 => Err(VoiceError::Auth(format!("HTTP {}{detail}", reply.status))),
            status => Err(VoiceError::Network(format!(
                "HTTP {status} from {}{detail}",
                url.path()
            ))),
        }
    }
}

/// Pull a human-readable message out of an error body, if there is one.
fn error_detail(body: &[u8]) -> String {
    let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) else {
        return String::new();
    };
    let message = json
        .pointer("/detail/message")
        .or_else(|| json.get("detail"))
        .and_then(serde_json::Value::as_str);
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

#[async_trait]
impl<B: HttpBackend> RemoteVoiceApi for RemoteClient<B> {
    async fn list_voices(&self) -> Result<Vec<Voice>, VoiceError> {
        let url = self.endpoint("voices")?;
        let reply = self.backend.get(&url).await?;
        let body = Self::check(reply, &url)?;

        let parsed: VoicesResponse = serde_json::from_slice(&body)
            .map_err(|e| VoiceError::Network(format!("malformed voices response: {e}")))?;
        let voices: Vec<Voice> = parsed.voices.into_iter().map(Voice::from).collect();

        tracing::debug!(count = voices.len(), "Fetched remote voices");
        Ok(voices)
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Bytes, VoiceError> {
        let url = self.speech_endpoint(&request.voice_id)?;

        let speed = request.rate.clamp(MIN_SPEED, MAX_SPEED);
        if (speed - request.rate).abs() > f32::EPSILON {
            tracing::debug!(rate = request.rate, speed, "Rate clamped to remote speed range");
        }

        let body = SpeechRequestBody {
            text: &request.text,
            model_id: &self.model_id,
            voice_settings: WireVoiceSettings::new(
                request.voice_settings.unwrap_or_default(),
                speed,
            ),
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| VoiceError::Validation(format!("cannot encode request: {e}")))?;

        let reply = self.backend.post_json(&url, &body, AUDIO_MPEG).await?;
        let audio = Self::check(reply, &url)?;

        tracing::debug!(voice_id = %request.voice_id, bytes = audio.len(), "Remote synthesis complete");
        Ok(audio)
    }
}
