//! `espeak-ng` process adapter.
//!
//! Each utterance is one child process. Pause and resume are `SIGSTOP` /
//! `SIGCONT` on unix; cancel kills the child. Voice enumeration parses the
//! table printed by `espeak-ng --voices`.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::oneshot;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

use super::{EngineVoice, LocalSpeechEngine, Utterance};
use crate::audio::{AudioHandle, CompletionSink};
use crate::error::VoiceError;

const DEFAULT_PROGRAM: &str = "espeak-ng";

/// espeak-ng's own default speaking rate, in words per minute.
const DEFAULT_WPM: u32 = 175;

const MIN_WPM: f32 = 80.0;
const MAX_WPM: f32 = 450.0;

/// Configuration for the espeak-ng adapter.
#[derive(Debug, Clone)]
pub struct EspeakConfig {
    pub(crate) program: PathBuf,
    pub(crate) base_wpm: u32,
}

impl Default for EspeakConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            base_wpm: DEFAULT_WPM,
        }
    }
}

impl EspeakConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Path or name of the espeak-ng executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Words per minute at rate 1.0.
    #[must_use]
    pub const fn with_base_wpm(mut self, wpm: u32) -> Self {
        self.base_wpm = wpm;
        self
    }
}

/// Local speech engine backed by the `espeak-ng` CLI.
#[derive(Debug, Clone, Default)]
pub struct EspeakEngine {
    config: EspeakConfig,
}

impl EspeakEngine {
    pub const fn new(config: EspeakConfig) -> Self {
        Self { config }
    }

    fn spawn_error(&self, err: &std::io::Error) -> VoiceError {
        VoiceError::Engine(format!(
            "cannot run {}: {err} (is espeak-ng installed?)",
            self.config.program.display()
        ))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn words_per_minute(&self, rate: f32) -> u32 {
        (self.config.base_wpm as f32 * rate)
            .round()
            .clamp(MIN_WPM, MAX_WPM) as u32
    }
}

/// espeak-ng pitch runs 0..=99 with 50 as neutral.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn espeak_pitch(pitch: f32) -> u32 {
    (pitch * 50.0).round().clamp(0.0, 99.0) as u32
}

/// Parse the table printed by `espeak-ng --voices`.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  af              --/M      Afrikaans          gmw/af
/// ```
fn parse_voice_list(output: &str) -> Vec<EngineVoice> {
    output
        .lines()
        .filter(|line| !line.trim_start().starts_with("Pty"))
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [_pty, language, _age_gender, name, ..] => {
                    Some(EngineVoice::new(*name, *language))
                }
                _ => None,
            }
        })
        .collect()
}

#[async_trait]
impl LocalSpeechEngine for EspeakEngine {
    async fn list_voices(&self) -> Result<Vec<EngineVoice>, VoiceError> {
        let output = Command::new(&self.config.program)
            .arg("--voices")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(&e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoiceError::Engine(format!(
                "{} --voices exited with {}: {}",
                self.config.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let voices = parse_voice_list(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!(count = voices.len(), "Listed espeak-ng voices");
        Ok(voices)
    }

    async fn speak(
        &self,
        utterance: Utterance,
        completion: CompletionSink,
    ) -> Result<Box<dyn AudioHandle>, VoiceError> {
        let wpm = self.words_per_minute(utterance.rate);
        let pitch = espeak_pitch(utterance.pitch);

        let mut child = Command::new(&self.config.program)
            .arg("-v")
            .arg(&utterance.voice)
            .arg("-s")
            .arg(wpm.to_string())
            .arg("-p")
            .arg(pitch.to_string())
            .arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(&e))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(utterance.text.as_bytes()).await {
                // The child may exit before reading everything; its exit is reported below.
                tracing::debug!(error = %e, "espeak-ng stdin closed early");
            }
        }

        let pid = child.id();
        let live = Arc::new(AtomicBool::new(true));
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

        let watcher_live = Arc::clone(&live);
        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => {
                    if !watcher_live.swap(false, Ordering::SeqCst) {
                        return;
                    }
                    match status {
                        Ok(status) if status.success() => {
                            tracing::debug!("espeak-ng finished speaking");
                        }
                        Ok(status) => tracing::warn!(%status, "espeak-ng exited abnormally"),
                        Err(e) => tracing::warn!(error = %e, "Failed to wait for espeak-ng"),
                    }
                    completion.notify();
                }
                _ = cancel_rx => {
                    if let Err(e) = child.kill().await {
                        tracing::debug!(error = %e, "espeak-ng already gone");
                    }
                }
            }
        });

        tracing::debug!(voice = %utterance.voice, wpm, pitch, ?pid, "espeak-ng speaking");

        Ok(Box::new(EspeakHandle {
            pid,
            live,
            cancel: Mutex::new(Some(cancel_tx)),
        }))
    }
}

/// Handle over one running espeak-ng child.
struct EspeakHandle {
    pid: Option<u32>,
    live: Arc<AtomicBool>,
    cancel: Mutex<Option<oneshot::Sender<()>>>,
}

impl EspeakHandle {
    #[cfg(unix)]
    fn signal(&self, sig: Signal) {
        let Some(pid) = self.pid.and_then(|p| i32::try_from(p).ok()) else {
            return;
        };
        if let Err(e) = signal::kill(Pid::from_raw(pid), sig) {
            // ESRCH: the process already exited.
            if e != nix::errno::Errno::ESRCH {
                tracing::warn!(error = %e, ?sig, "Failed to signal espeak-ng");
            }
        }
    }
}

impl AudioHandle for EspeakHandle {
    fn pause(&self) {
        #[cfg(unix)]
        self.signal(Signal::SIGSTOP);
        #[cfg(not(unix))]
        tracing::warn!("Pausing the local engine is not supported on this platform");
    }

    fn resume(&self) {
        #[cfg(unix)]
        self.signal(Signal::SIGCONT);
        #[cfg(not(unix))]
        tracing::warn!("Resuming the local engine is not supported on this platform");
    }

    fn set_volume(&self, _volume: f32) {}

    fn release(&self) {
        self.live.store(false, Ordering::SeqCst);
        let sender = self
            .cancel
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take();
        if let Some(tx) = sender {
            // A stopped process must be continued before it can be reaped cleanly.
            self.resume();
            let _ = tx.send(());
        }
    }
}

impl Drop for EspeakHandle {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const SAMPLE_VOICES: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 5  en-us           --/M      English_(America)  gmw/en-US            (en 3)
 5  fr-fr           --/M      French             roa/fr               (fr 5)
";

    #[test]
    fn parses_voice_table() {
        let voices = parse_voice_list(SAMPLE_VOICES);
        assert_eq!(
            voices,
            vec![
                EngineVoice::new("Afrikaans", "af"),
                EngineVoice::new("English_(America)", "en-us"),
                EngineVoice::new("French", "fr-fr"),
            ]
        );
    }

    #[test]
    fn empty_output_has_no_voices() {
        assert!(parse_voice_list("").is_empty());
        assert!(parse_voice_list("Pty Language Age/Gender VoiceName File\n").is_empty());
    }

    #[test]
    fn rate_maps_to_clamped_wpm() {
        let engine = EspeakEngine::default();
        assert_eq!(engine.words_per_minute(1.0), 175);
        assert_eq!(engine.words_per_minute(2.0), 350);
        assert_eq!(engine.words_per_minute(0.1), 80);
        assert_eq!(engine.words_per_minute(10.0), 450);
    }

    #[test]
    fn neutral_pitch_is_fifty() {
        assert_eq!(espeak_pitch(1.0), 50);
        assert_eq!(espeak_pitch(0.0), 0);
        assert_eq!(espeak_pitch(2.0), 99);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_program_is_an_engine_error() {
        let engine = EspeakEngine::new(EspeakConfig::new().with_program("false"));
        let err = engine.list_voices().await.unwrap_err();
        assert!(matches!(err, VoiceError::Engine(_)), "got {err:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn natural_exit_fires_completion() {
        let engine = EspeakEngine::new(EspeakConfig::new().with_program("true"));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let completion = CompletionSink::new(move || {
            let _ = tx.send(());
        });

        let utterance = Utterance {
            text: "hello".into(),
            voice: "en".into(),
            rate: 1.0,
            pitch: 1.0,
        };
        let _handle = engine.speak(utterance, completion).await.unwrap();

        let fired = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(matches!(fired, Ok(Some(()))));
    }

    #[test]
    fn config_builder() {
        let config = EspeakConfig::new()
            .with_program("/opt/espeak/bin/espeak-ng")
            .with_base_wpm(160);
        assert_eq!(config.program, PathBuf::from("/opt/espeak/bin/espeak-ng"));
        assert_eq!(config.base_wpm, 160);
    }
}
