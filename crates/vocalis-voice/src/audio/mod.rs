//! Audio output ports and the rodio adapter behind them.
//!
//! The session and the background mixer only ever see [`AudioOutput`] and
//! [`AudioHandle`] trait objects, so tests can drive them without a sound
//! card. The production implementation is [`RodioOutput`].

mod playback;
mod thread;

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::VoiceError;

pub use playback::RodioOutput;

/// Control surface for one playing sound.
///
/// Owned exclusively by whoever started it (the session for speech, the
/// mixer for background music). `release` is idempotent and after it returns
/// the handle never fires its completion.
pub trait AudioHandle: Send + Sync {
    fn pause(&self);

    fn resume(&self);

    /// Set playback volume (0.0 = muted, 1.0 = full).
    fn set_volume(&self, volume: f32);

    /// Stop playback and free the underlying resources.
    fn release(&self);
}

/// Something that can turn encoded audio bytes into a playing sound.
pub trait AudioOutput: Send + Sync {
    /// Decode `audio` and start playing it once. `completion` fires when the
    /// sound drains naturally, never after [`AudioHandle::release`].
    fn play(
        &self,
        audio: Bytes,
        completion: CompletionSink,
    ) -> Result<Box<dyn AudioHandle>, VoiceError>;

    /// Decode `audio` and loop it until released.
    fn play_looped(&self, audio: Bytes, volume: f32) -> Result<Box<dyn AudioHandle>, VoiceError>;
}

/// Callback fired when a sound finishes on its own.
///
/// Cloneable so one cycle can hand the same sink to the backend and to the
/// audio output; the receiving side tolerates duplicate or late calls.
#[derive(Clone)]
pub struct CompletionSink {
    notify: Arc<dyn Fn() + Send + Sync>,
}

impl CompletionSink {
    pub fn new(notify: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            notify: Arc::new(notify),
        }
    }

    /// A sink that ignores completion.
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    pub fn notify(&self) {
        (self.notify)();
    }
}

impl fmt::Debug for CompletionSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSink").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn completion_sink_clones_share_the_callback() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let sink = CompletionSink::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let other = sink.clone();
        sink.notify();
        other.notify();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
