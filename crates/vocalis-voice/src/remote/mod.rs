//! Remote text-to-speech API client (ElevenLabs-compatible).
//!
//! [`RemoteVoiceApi`] is the port the catalog and the remote backend use.
//! [`RemoteClient`] implements it over a pluggable HTTP backend so tests can
//! substitute canned responses.

mod client;
mod config;
mod http;
mod models;

use async_trait::async_trait;
use bytes::Bytes;
use vocalis_core::{SynthesisRequest, Voice};

use crate::error::VoiceError;

pub use client::{DefaultRemoteClient, RemoteClient};
pub use config::{DEFAULT_BASE_URL, RemoteApiConfig};
pub use http::{HttpBackend, HttpReply, ReqwestBackend};

/// Operations the rest of the crate needs from the remote voice API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteVoiceApi: Send + Sync {
    /// `GET /voices`
    async fn list_voices(&self) -> Result<Vec<Voice>, VoiceError>;

    /// `POST /text-to-speech/{voice_id}`, returning the encoded audio.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Bytes, VoiceError>;
}
