//! Dedicated audio output thread, isolating the `!Send` rodio stream from the async runtime.
//!
//! `rodio::OutputStream` is `!Send` on some platforms. Rather than using
//! `unsafe impl Send/Sync`, the stream is confined to a single OS thread and
//! every request to open a sink goes through an [`AudioCommand`]. The sinks
//! it hands back are `Send + Sync` and are controlled directly.

use std::io::Cursor;
use std::sync::{Arc, mpsc};
use std::thread;

use bytes::Bytes;
use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::VoiceError;

/// A command sent to the audio thread.
enum AudioCommand {
    /// Decode `audio` into a fresh sink and start it.
    Open {
        audio: Bytes,
        looped: bool,
        volume: f32,
        reply: mpsc::Sender<Result<Arc<Sink>, VoiceError>>,
    },

    /// Shut down the audio thread, releasing the output stream.
    Shutdown,
}

/// `Send + Sync` handle to the dedicated audio output thread.
///
/// Request/reply calls block the caller until the audio thread responds;
/// that is a local channel round trip plus the header decode.
pub struct AudioThreadHandle {
    cmd_tx: mpsc::Sender<AudioCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioThreadHandle {
    /// Spawn the audio thread, open the default output device and return the handle.
    ///
    /// Device errors are propagated back through a one-shot init channel.
    pub fn spawn() -> Result<Self, VoiceError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), VoiceError>>();

        let thread = thread::Builder::new()
            .name("vocalis-audio".into())
            .spawn(move || Self::run(&cmd_rx, &init_tx))
            .map_err(|e| VoiceError::OutputStream(format!("failed to spawn audio thread: {e}")))?;

        init_rx.recv().map_err(|_| VoiceError::AudioThreadDied)??;

        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    /// Decode `audio` into a new sink on the output device and start playing it.
    pub fn open(&self, audio: Bytes, looped: bool, volume: f32) -> Result<Arc<Sink>, VoiceError> {
        let (tx, rx) = mpsc::channel();
        self.cmd_tx
            .send(AudioCommand::Open {
                audio,
                looped,
                volume,
                reply: tx,
            })
            .map_err(|_| VoiceError::AudioThreadDied)?;
        rx.recv().map_err(|_| VoiceError::AudioThreadDied)?
    }

    /// Body of the audio thread. Owns the `OutputStream` for its entire lifetime.
    fn run(cmd_rx: &mpsc::Receiver<AudioCommand>, init_tx: &mpsc::Sender<Result<(), VoiceError>>) {
        let (_stream, stream_handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                let _ = init_tx.send(Err(VoiceError::OutputStream(e.to_string())));
                return;
            }
        };

        if init_tx.send(Ok(())).is_err() {
            return;
        }
        tracing::info!("Audio output initialized on default device");

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AudioCommand::Open {
                    audio,
                    looped,
                    volume,
                    reply,
                } => {
                    let result = Sink::try_new(&stream_handle)
                        .map_err(|e| VoiceError::OutputStream(e.to_string()))
                        .and_then(|sink| {
                            let source = Decoder::new(Cursor::new(audio))
                                .map_err(|e| VoiceError::Decode(e.to_string()))?;
                            sink.set_volume(volume.clamp(0.0, 1.0));
                            if looped {
                                sink.append(source.repeat_infinite());
                            } else {
                                sink.append(source);
                            }
                            Ok(Arc::new(sink))
                        });
                    let _ = reply.send(result);
                }

                AudioCommand::Shutdown => break,
            }
        }

        tracing::debug!("Audio thread shutting down");
    }
}

impl Drop for AudioThreadHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}
