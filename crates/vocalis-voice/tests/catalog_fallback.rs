//! Integration tests for `VoiceCatalog` loading and fallback.
//!
//! Time-dependent tests run on a paused tokio clock so the local engine's
//! backoff completes instantly.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use vocalis_core::{NotificationBus, NotificationLevel, SynthesisRequest, Voice};
use vocalis_voice::{
    AudioHandle, CompletionSink, EngineVoice, LocalSpeechEngine, RemoteVoiceApi, RetryPolicy,
    Utterance, VoiceCatalog, VoiceError, VoiceSource,
};

// ── Mocks ──────────────────────────────────────────────────────────

struct Remote {
    result: Mutex<Option<Result<Vec<Voice>, VoiceError>>>,
}

impl Remote {
    fn ok(voices: Vec<Voice>) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(Some(Ok(voices))),
        })
    }

    fn err(err: VoiceError) -> Arc<Self> {
        Arc::new(Self {
            result: Mutex::new(Some(Err(err))),
        })
    }
}

#[async_trait]
impl RemoteVoiceApi for Remote {
    async fn list_voices(&self) -> Result<Vec<Voice>, VoiceError> {
        self.result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn synthesize(&self, _request: &SynthesisRequest) -> Result<Bytes, VoiceError> {
        Ok(Bytes::new())
    }
}

/// Reports no voices until `ready_after` calls have been made.
struct SlowEngine {
    ready_after: Option<usize>,
    calls: AtomicUsize,
}

impl SlowEngine {
    fn ready_after(calls: usize) -> Arc<Self> {
        Arc::new(Self {
            ready_after: Some(calls),
            calls: AtomicUsize::new(0),
        })
    }

    fn never_ready() -> Arc<Self> {
        Arc::new(Self {
            ready_after: None,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LocalSpeechEngine for SlowEngine {
    async fn list_voices(&self) -> Result<Vec<EngineVoice>, VoiceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.ready_after {
            Some(ready) if n >= ready => Ok(vec![
                EngineVoice::new("en-us", "en-us"),
                EngineVoice::new("fr", "fr"),
            ]),
            _ => Ok(Vec::new()),
        }
    }

    async fn speak(
        &self,
        _utterance: Utterance,
        _completion: CompletionSink,
    ) -> Result<Box<dyn AudioHandle>, VoiceError> {
        Err(VoiceError::Engine("not used".into()))
    }
}

struct BrokenEngine;

#[async_trait]
impl LocalSpeechEngine for BrokenEngine {
    async fn list_voices(&self) -> Result<Vec<EngineVoice>, VoiceError> {
        Err(VoiceError::Engine("espeak-ng exited with status 1".into()))
    }

    async fn speak(
        &self,
        _utterance: Utterance,
        _completion: CompletionSink,
    ) -> Result<Box<dyn AudioHandle>, VoiceError> {
        Err(VoiceError::Engine("not used".into()))
    }
}

fn catalog(
    remote: Option<Arc<dyn RemoteVoiceApi>>,
    local: Option<Arc<dyn LocalSpeechEngine>>,
    bus: &NotificationBus,
) -> VoiceCatalog {
    VoiceCatalog::new(remote, local, bus.clone())
}

// ── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn remote_voices_are_preferred() {
    let bus = NotificationBus::new();
    let remote = Remote::ok(vec![Voice::new("21m00", "Rachel", "american")]);
    let catalog = catalog(Some(remote), Some(SlowEngine::ready_after(1)), &bus);

    let voices = catalog.reload().await.unwrap();

    assert_eq!(voices.len(), 1);
    assert_eq!(catalog.source(), Some(VoiceSource::Remote));
    assert_eq!(catalog.resolve("21m00").unwrap().display_name, "Rachel");
}

#[tokio::test]
async fn auth_failure_without_local_engine_leaves_catalog_empty() {
    let bus = NotificationBus::new();
    let remote = Remote::err(VoiceError::Auth("HTTP 401: invalid api key".into()));
    let catalog = catalog(Some(remote), None, &bus);

    let err = catalog.reload().await.unwrap_err();

    assert!(matches!(err, VoiceError::Auth(_)));
    assert!(catalog.voices().is_empty());
    assert_eq!(catalog.source(), None);
}

#[tokio::test]
async fn remote_failure_falls_back_to_local_with_warning() {
    let bus = NotificationBus::new();
    let mut notes = bus.subscribe();
    let remote = Remote::err(VoiceError::Network("connection refused".into()));
    let catalog = catalog(Some(remote), Some(SlowEngine::ready_after(1)), &bus);

    let voices = catalog.reload().await.unwrap();

    assert_eq!(catalog.source(), Some(VoiceSource::Local));
    assert_eq!(voices.len(), 2);
    assert_eq!(voices[0].id, "en-us");
    assert_eq!(voices[0].display_name, "en-us (en-us)");

    let note = notes.try_recv().unwrap();
    assert_eq!(note.level, NotificationLevel::Warning);
    assert!(note.message.contains("connection refused"));
}

#[tokio::test]
async fn no_backend_configured_is_unavailable() {
    let bus = NotificationBus::new();
    let catalog = catalog(None, None, &bus);

    assert!(matches!(
        catalog.reload().await,
        Err(VoiceError::BackendUnavailable)
    ));
}

#[tokio::test(start_paused = true)]
async fn local_engine_is_polled_until_voices_appear() {
    let bus = NotificationBus::new();
    let engine = SlowEngine::ready_after(4);
    let catalog = catalog(None, Some(engine.clone()), &bus);

    let voices = catalog.reload().await.unwrap();

    assert_eq!(voices.len(), 2);
    assert_eq!(engine.calls.load(Ordering::SeqCst), 4);
    assert_eq!(catalog.source(), Some(VoiceSource::Local));
}

#[tokio::test(start_paused = true)]
async fn empty_local_engine_gives_up_after_max_wait() {
    let bus = NotificationBus::new();
    let engine = SlowEngine::never_ready();
    let catalog = catalog(None, Some(engine.clone()), &bus);

    let started = tokio::time::Instant::now();
    let err = catalog.reload().await.unwrap_err();
    let elapsed = started.elapsed();

    let VoiceError::NoVoicesAvailable { waited } = err else {
        panic!("expected NoVoicesAvailable, got {err:?}");
    };
    assert!(waited >= Duration::from_secs(5));
    assert!(elapsed < Duration::from_secs(6));
    assert!(engine.calls.load(Ordering::SeqCst) > 1);
    assert!(catalog.voices().is_empty());
}

#[tokio::test(start_paused = true)]
async fn custom_retry_policy_shortens_the_wait() {
    let bus = NotificationBus::new();
    let catalog = catalog(None, Some(SlowEngine::never_ready()), &bus).with_retry_policy(
        RetryPolicy {
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(20),
            max_wait: Duration::from_millis(100),
        },
    );

    let started = tokio::time::Instant::now();
    assert!(matches!(
        catalog.reload().await,
        Err(VoiceError::NoVoicesAvailable { .. })
    ));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn engine_errors_are_not_retried() {
    let bus = NotificationBus::new();
    let catalog = catalog(None, Some(Arc::new(BrokenEngine)), &bus);

    assert!(matches!(catalog.reload().await, Err(VoiceError::Engine(_))));
}

#[tokio::test]
async fn failed_reload_clears_previous_voices() {
    let bus = NotificationBus::new();
    let remote = Arc::new(Remote {
        result: Mutex::new(Some(Ok(vec![Voice::new("a", "A", "")]))),
    });
    let catalog = catalog(Some(remote.clone()), None, &bus);
    catalog.reload().await.unwrap();
    assert_eq!(catalog.voices().len(), 1);

    *remote.result.lock().unwrap() = Some(Err(VoiceError::Network("HTTP 503".into())));
    assert!(catalog.reload().await.is_err());
    assert!(catalog.voices().is_empty());
}
