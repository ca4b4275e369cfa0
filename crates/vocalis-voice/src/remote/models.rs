//! Wire types for the remote voice API.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use vocalis_core::{Voice, VoiceSettings};

/// Response body of `GET /voices`.
#[derive(Debug, Deserialize)]
pub(crate) struct VoicesResponse {
    #[serde(default)]
    pub voices: Vec<RemoteVoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RemoteVoice {
    pub voice_id: String,
    pub name: String,
    #[serde(default)]
    pub labels: Option<HashMap<String, serde_json::Value>>,
}

impl From<RemoteVoice> for Voice {
    fn from(remote: RemoteVoice) -> Self {
        let label = |key: &str| {
            remote
                .labels
                .as_ref()
                .and_then(|labels| labels.get(key))
                .and_then(serde_json::Value::as_str)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let language = label("accent")
            .or_else(|| label("language"))
            .unwrap_or_default();
        Self::new(remote.voice_id, remote.name, language)
    }
}

/// Request body of `POST /text-to-speech/{voice_id}`.
#[derive(Debug, Serialize)]
pub(crate) struct SpeechRequestBody<'a> {
    pub text: &'a str,
    pub model_id: &'a str,
    pub voice_settings: WireVoiceSettings,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireVoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub speed: f32,
}

impl WireVoiceSettings {
    pub fn new(settings: VoiceSettings, speed: f32) -> Self {
        Self {
            stability: settings.stability,
            similarity_boost: settings.similarity_boost,
            speed,
        }
    }
}
