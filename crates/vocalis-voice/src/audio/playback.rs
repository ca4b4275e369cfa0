//! rodio-backed [`AudioOutput`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use rodio::Sink;

use super::thread::AudioThreadHandle;
use super::{AudioHandle, AudioOutput, CompletionSink};
use crate::error::VoiceError;

/// Plays decoded audio on the default output device.
///
/// Cloning shares the same audio thread.
#[derive(Clone, Default)]
pub struct RodioOutput {
    thread: Arc<OnceLock<AudioThreadHandle>>,
}

impl RodioOutput {
    /// Open the default output device now.
    pub fn open_default() -> Result<Self, VoiceError> {
        let output = Self::lazy();
        output.thread()?;
        Ok(output)
    }

    /// Defer opening the device until the first sound is played.
    ///
    /// Commands that never play (voice listing, export) then work on
    /// machines without an audio device.
    pub fn lazy() -> Self {
        Self::default()
    }

    fn thread(&self) -> Result<&AudioThreadHandle, VoiceError> {
        if let Some(thread) = self.thread.get() {
            return Ok(thread);
        }
        let spawned = AudioThreadHandle::spawn()?;
        // A concurrent first use may have won; the spare thread shuts down on drop.
        Ok(self.thread.get_or_init(|| spawned))
    }
}

impl AudioOutput for RodioOutput {
    fn play(
        &self,
        audio: Bytes,
        completion: CompletionSink,
    ) -> Result<Box<dyn AudioHandle>, VoiceError> {
        let len = audio.len();
        let sink = self.thread()?.open(audio, false, 1.0)?;
        let handle = SinkHandle::new(sink);
        handle.spawn_completion_watcher(completion);
        tracing::debug!(bytes = len, "Speech playback started");
        Ok(Box::new(handle))
    }

    fn play_looped(&self, audio: Bytes, volume: f32) -> Result<Box<dyn AudioHandle>, VoiceError> {
        let sink = self.thread()?.open(audio, true, volume)?;
        Ok(Box::new(SinkHandle::new(sink)))
    }
}

/// One rodio sink plus a liveness flag shared with its completion watcher.
struct SinkHandle {
    sink: Arc<Sink>,
    live: Arc<AtomicBool>,
}

impl SinkHandle {
    fn new(sink: Arc<Sink>) -> Self {
        Self {
            sink,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Spawn a thread that blocks until the sink drains or is stopped.
    ///
    /// `sleep_until_end` returns immediately once `stop()` clears the queue,
    /// so a released handle's watcher exits without notifying.
    fn spawn_completion_watcher(&self, completion: CompletionSink) {
        let sink = Arc::clone(&self.sink);
        let live = Arc::clone(&self.live);

        std::thread::spawn(move || {
            sink.sleep_until_end();

            if !live.swap(false, Ordering::SeqCst) {
                return;
            }

            tracing::debug!("Playback finished naturally");
            completion.notify();
        });
    }
}

impl AudioHandle for SinkHandle {
    fn pause(&self) {
        self.sink.pause();
    }

    fn resume(&self) {
        self.sink.play();
    }

    fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }

    fn release(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            tracing::debug!("Audio handle released");
        }
        self.sink.stop();
    }
}

impl Drop for SinkHandle {
    fn drop(&mut self) {
        self.release();
    }
}
