//! CLI bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the CLI adapter. All concrete implementations are instantiated here:
//! - Settings repository and service (via vocalis-core)
//! - Remote API client and espeak-ng engine (via vocalis-voice)
//! - rodio audio output, track library and text loader
//!
//! Command handlers receive the composed [`CliContext`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use tokio::sync::{broadcast, mpsc};
use vocalis_core::{
    JsonSettingsRepository, Notification, NotificationBus, Settings, SettingsService, settings_path,
};
use vocalis_voice::{
    AudioOutput, BackgroundMixer, DefaultRemoteClient, EspeakConfig, EspeakEngine,
    LocalSpeechEngine, PlaybackSession, RemoteApiConfig, RemoteVoiceApi, RodioOutput,
    SessionEvent, SynthesisParams, TesseractOcr, TextLoader, TrackLibrary, VoiceCatalog,
    VoiceError, VoiceSource, select_backend,
};

use crate::commands::VoiceArgs;
use crate::presentation::print_notification;

const TRACKS_DIR_NAME: &str = "tracks";

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Location of `settings.json`.
    pub settings_path: PathBuf,
    /// API key from the environment or command line; wins over the stored one.
    pub api_key: Option<String>,
    /// Base URL override from the environment or command line.
    pub api_base_url: Option<String>,
    /// Skip the remote API even when a key is configured.
    pub force_local: bool,
    pub espeak: EspeakConfig,
    pub ocr: TesseractOcr,
}

impl CliConfig {
    /// Create config with default paths.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self {
            settings_path: settings_path()?,
            api_key: None,
            api_base_url: None,
            force_local: false,
            espeak: EspeakConfig::default(),
            ocr: TesseractOcr::default(),
        })
    }

    #[must_use]
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: Option<String>) -> Self {
        self.api_base_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    #[must_use]
    pub const fn with_force_local(mut self, local: bool) -> Self {
        self.force_local = local;
        self
    }
}

/// Fully composed application context for CLI commands.
pub struct CliContext {
    /// Persisted settings.
    pub settings: SettingsService,
    /// Stored settings with environment and flag overrides applied.
    pub effective: Settings,
    pub notifications: NotificationBus,
    pub catalog: Arc<VoiceCatalog>,
    pub text_loader: TextLoader,
    remote: Option<Arc<dyn RemoteVoiceApi>>,
    local: Arc<dyn LocalSpeechEngine>,
    output: Arc<dyn AudioOutput>,
    tracks_dir: PathBuf,
    pending: Mutex<broadcast::Receiver<Notification>>,
}

impl CliContext {
    /// Load the voice catalog and create a playback session.
    ///
    /// The backend follows the catalog: if the remote listing failed and the
    /// catalog fell back to local voices, the session speaks locally too.
    pub async fn open_session(
        &self,
    ) -> Result<(PlaybackSession, mpsc::UnboundedReceiver<SessionEvent>), VoiceError> {
        self.catalog.reload().await?;

        let remote = match self.catalog.source() {
            Some(VoiceSource::Remote) => self.remote.clone(),
            _ => None,
        };
        let backend = select_backend(remote, Some(Arc::clone(&self.local)))?;

        let mixer = BackgroundMixer::new(
            Arc::clone(&self.output),
            Arc::new(TrackLibrary::new(self.tracks_dir.clone())),
            self.effective.effective_background_volume(),
        );

        Ok(PlaybackSession::new(
            backend,
            Arc::clone(&self.catalog),
            Arc::clone(&self.output),
            mixer,
        ))
    }

    /// Whether a remote API key is in effect.
    pub const fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn tracks_dir(&self) -> &Path {
        &self.tracks_dir
    }

    /// Flag values first, then stored defaults.
    pub fn synthesis_params(&self, args: &VoiceArgs) -> SynthesisParams {
        SynthesisParams {
            rate: args.rate.unwrap_or_else(|| self.effective.effective_rate()),
            pitch: args.pitch.unwrap_or_else(|| self.effective.effective_pitch()),
            voice_settings: Some(self.effective.voice_settings()),
        }
    }

    /// Print every notification published since the last flush.
    pub fn flush_notifications(&self) {
        let mut rx = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            match rx.try_recv() {
                Ok(note) => print_notification(&note),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "Notifications dropped");
                }
                Err(_) => break,
            }
        }
    }
}

/// Apply environment and command-line overrides on top of stored settings.
fn apply_overrides(mut settings: Settings, config: &CliConfig) -> Settings {
    if config.api_key.is_some() {
        settings.api_key.clone_from(&config.api_key);
    }
    if config.api_base_url.is_some() {
        settings.api_base_url.clone_from(&config.api_base_url);
    }
    if config.force_local {
        settings.api_key = None;
    }
    settings
}

fn remote_client(settings: &Settings) -> Result<Option<Arc<dyn RemoteVoiceApi>>, VoiceError> {
    let Some(key) = settings.api_key.as_deref().filter(|_| settings.has_api_key()) else {
        return Ok(None);
    };

    let mut config = RemoteApiConfig::new(key).with_model_id(settings.effective_model_id());
    if let Some(url) = &settings.api_base_url {
        config = config.with_base_url(url.clone());
    }
    tracing::debug!(?config, "Remote API configured");
    let client: Arc<dyn RemoteVoiceApi> = Arc::new(DefaultRemoteClient::new(&config)?);
    Ok(Some(client))
}

/// Bootstrap the CLI application.
///
/// This is the composition root. It:
/// 1. Loads stored settings and applies overrides
/// 2. Creates the remote client when a key is available
/// 3. Creates the local engine, catalog and audio output
///
/// Nothing here touches the audio device or the network; that happens on
/// first use.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext> {
    // 1. Settings
    let notifications = NotificationBus::new();
    let pending = notifications.subscribe();
    let repo = Arc::new(JsonSettingsRepository::new(&config.settings_path));
    let settings = SettingsService::new(repo, notifications.clone());
    let effective = apply_overrides(settings.get().await?, &config);

    // 2. Backends
    let remote = remote_client(&effective)?;
    let local: Arc<dyn LocalSpeechEngine> = Arc::new(EspeakEngine::new(config.espeak.clone()));

    // 3. Catalog, output and input
    let catalog = Arc::new(VoiceCatalog::new(
        remote.clone(),
        Some(Arc::clone(&local)),
        notifications.clone(),
    ));
    let output: Arc<dyn AudioOutput> = Arc::new(RodioOutput::lazy());
    let text_loader = TextLoader::new(Some(Arc::new(config.ocr.clone())));

    let tracks_dir = effective.tracks_dir.as_ref().map_or_else(
        || default_tracks_dir(&config.settings_path),
        PathBuf::from,
    );

    Ok(CliContext {
        settings,
        effective,
        notifications,
        catalog,
        text_loader,
        remote,
        local,
        output,
        tracks_dir,
        pending: Mutex::new(pending),
    })
}

/// Tracks live next to `settings.json` unless configured otherwise.
fn default_tracks_dir(settings_path: &Path) -> PathBuf {
    settings_path
        .parent()
        .map_or_else(|| PathBuf::from(TRACKS_DIR_NAME), |dir| dir.join(TRACKS_DIR_NAME))
}
