//! Voice catalog: the list of selectable voices and where it came from.
//!
//! The remote API is preferred when a client is configured. Any remote
//! failure is surfaced as a warning and the catalog falls back to the local
//! engine, which is polled until it reports voices or the retry budget runs
//! out.

use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use vocalis_core::{NotificationBus, Voice};

use crate::engine::{EngineVoice, LocalSpeechEngine};
use crate::error::VoiceError;
use crate::remote::RemoteVoiceApi;

/// Exponential backoff for the local engine's voice list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,

    /// Total time to wait before giving up.
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
            max_wait: Duration::from_secs(5),
        }
    }
}

/// Where the current voice list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceSource {
    Remote,
    Local,
}

impl fmt::Display for VoiceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote => f.write_str("remote"),
            Self::Local => f.write_str("local"),
        }
    }
}

#[derive(Default)]
struct Snapshot {
    voices: Vec<Voice>,
    source: Option<VoiceSource>,
}

/// The set of voices the user can pick from.
pub struct VoiceCatalog {
    remote: Option<Arc<dyn RemoteVoiceApi>>,
    local: Option<Arc<dyn LocalSpeechEngine>>,
    notifications: NotificationBus,
    retry: RetryPolicy,
    snapshot: RwLock<Snapshot>,
}

impl VoiceCatalog {
    pub fn new(
        remote: Option<Arc<dyn RemoteVoiceApi>>,
        local: Option<Arc<dyn LocalSpeechEngine>>,
        notifications: NotificationBus,
    ) -> Self {
        Self {
            remote,
            local,
            notifications,
            retry: RetryPolicy::default(),
            snapshot: RwLock::new(Snapshot::default()),
        }
    }

    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Refresh the voice list.
    ///
    /// On failure the catalog is left empty.
    pub async fn reload(&self) -> Result<Vec<Voice>, VoiceError> {
        let result = self.fetch().await;
        let mut snapshot = self
            .snapshot
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        match result {
            Ok((voices, source)) => {
                tracing::info!(count = voices.len(), %source, "Voice catalog loaded");
                snapshot.voices.clone_from(&voices);
                snapshot.source = Some(source);
                Ok(voices)
            }
            Err(e) => {
                snapshot.voices.clear();
                snapshot.source = None;
                Err(e)
            }
        }
    }

    async fn fetch(&self) -> Result<(Vec<Voice>, VoiceSource), VoiceError> {
        match (&self.remote, &self.local) {
            (Some(remote), local) => match remote.list_voices().await {
                Ok(voices) => Ok((voices, VoiceSource::Remote)),
                Err(e) => {
                    tracing::warn!(error = %e, "Remote voice listing failed");
                    let Some(engine) = local else {
                        return Err(e);
                    };
                    self.notifications
                        .warning(format!("{e}. Falling back to local voices."));
                    let voices = self.poll_local(engine.as_ref()).await?;
                    Ok((voices, VoiceSource::Local))
                }
            },
            (None, Some(engine)) => {
                let voices = self.poll_local(engine.as_ref()).await?;
                Ok((voices, VoiceSource::Local))
            }
            (None, None) => Err(VoiceError::BackendUnavailable),
        }
    }

    /// Poll the engine until it reports voices or `max_wait` elapses.
    async fn poll_local(&self, engine: &dyn LocalSpeechEngine) -> Result<Vec<Voice>, VoiceError> {
        let started = tokio::time::Instant::now();
        let deadline = started + self.retry.max_wait;
        let mut delay = self.retry.initial_delay;

        loop {
            let voices = engine.list_voices().await?;
            if !voices.is_empty() {
                return Ok(voices.into_iter().map(local_voice).collect());
            }

            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Err(VoiceError::NoVoicesAvailable {
                    waited: now - started,
                });
            }

            tracing::debug!(delay_ms = delay.as_millis(), "Local engine has no voices yet");
            tokio::time::sleep(delay.min(deadline - now)).await;
            delay = (delay * 2).min(self.retry.max_delay);
        }
    }

    /// Look up a voice in the current list.
    pub fn resolve(&self, id: &str) -> Result<Voice, VoiceError> {
        self.snapshot
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .voices
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| VoiceError::NotFound(id.to_string()))
    }

    /// Current voice list.
    pub fn voices(&self) -> Vec<Voice> {
        self.snapshot
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .voices
            .clone()
    }

    /// Where the current list came from, if it has been loaded.
    pub fn source(&self) -> Option<VoiceSource> {
        self.snapshot
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .source
    }
}

/// Local voices are addressed by name and shown as `name (lang)`.
fn local_voice(voice: EngineVoice) -> Voice {
    let display = format!("{} ({})", voice.name, voice.language);
    Voice::new(voice.name, display, voice.language)
}
