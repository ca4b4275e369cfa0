//! Speak command handler.
//!
//! Starts playback inside a small interactive loop: `p` pauses, `r`
//! resumes, `s` (or Ctrl-C) stops, even while speech is still being
//! synthesized. The command returns when playback finishes or is stopped.

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use vocalis_core::TrackKind;
use vocalis_voice::{PlayOutcome, PlaybackSession, SessionEvent, SessionState, VoiceError};

use super::{report, resolve_text, resolve_voice};
use crate::bootstrap::CliContext;
use crate::commands::{TextInput, VoiceArgs};
use crate::presentation::state_label;

/// Arguments for the speak command.
pub struct SpeakArgs {
    pub input: TextInput,
    pub voice: VoiceArgs,
    pub music: Option<TrackKind>,
    pub music_volume: Option<f32>,
}

/// A line typed while speech is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Pause,
    Resume,
    Stop,
    Ignore,
    Unknown,
}

fn parse_control(line: &str) -> Control {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "pause" => Control::Pause,
        "r" | "resume" => Control::Resume,
        "s" | "stop" | "q" | "quit" => Control::Stop,
        "" => Control::Ignore,
        _ => Control::Unknown,
    }
}

pub async fn execute(ctx: &CliContext, args: SpeakArgs) -> Result<()> {
    let text = resolve_text(ctx, &args.input)
        .await
        .map_err(|e| report(ctx, e))?;
    let (session, events) = ctx.open_session().await.map_err(|e| report(ctx, e))?;
    ctx.flush_notifications();

    let voice_id = resolve_voice(ctx, &args.voice).map_err(|e| report(ctx, e))?;
    let params = ctx.synthesis_params(&args.voice);

    if let Some(volume) = args.music_volume {
        session.mixer().set_volume(volume);
    }
    if let Some(kind) = args.music.filter(|k| *k != TrackKind::None) {
        // Music is optional; speak without it rather than failing.
        if let Err(e) = session.mixer().start(kind) {
            ctx.notifications.warning(e.to_string());
            ctx.flush_notifications();
        }
    }

    println!(
        "Speaking with '{voice_id}' ({}). [p] pause  [r] resume  [s] stop",
        session.backend_kind()
    );

    let player = session.clone();
    let play = async move { player.play(&text, &voice_id, &params).await };
    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };
    let stdin = BufReader::new(tokio::io::stdin());

    if let Err(e) = control_loop(&session, play, events, stdin, interrupt).await {
        session.stop();
        return Err(report(ctx, e));
    }
    ctx.flush_notifications();
    Ok(())
}

/// Drive `play` while relaying keyboard input to the session. Returns when
/// playback finishes or is stopped, including while still synthesizing.
async fn control_loop<R>(
    session: &PlaybackSession,
    play: impl Future<Output = Result<PlayOutcome, VoiceError>>,
    mut events: mpsc::UnboundedReceiver<SessionEvent>,
    input: R,
    interrupt: impl Future<Output = ()>,
) -> Result<(), VoiceError>
where
    R: AsyncBufRead + Unpin,
{
    tokio::pin!(play);
    tokio::pin!(interrupt);

    let mut lines = input.lines();
    let mut stdin_open = true;
    let mut synthesizing = true;
    let mut last_state = None;

    loop {
        tokio::select! {
            biased;

            outcome = &mut play, if synthesizing => {
                synthesizing = false;
                if outcome? == PlayOutcome::Superseded {
                    break;
                }
            }

            event = events.recv() => match event {
                Some(SessionEvent::StateChanged(state)) => {
                    if last_state != Some(state) && state != SessionState::Synthesizing {
                        println!("{}", state_label(state));
                    }
                    last_state = Some(state);
                }
                Some(SessionEvent::PlaybackFinished) | None => break,
            },

            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match parse_control(&line) {
                    Control::Pause => session.pause(),
                    Control::Resume => session.resume(),
                    Control::Stop => {
                        session.stop();
                        println!("{}", state_label(SessionState::Stopped));
                        break;
                    }
                    Control::Ignore => {}
                    Control::Unknown => println!("Unknown command '{}'. Use p, r or s.", line.trim()),
                },
                Ok(None) => stdin_open = false,
                Err(e) => {
                    tracing::debug!(error = %e, "stdin closed");
                    stdin_open = false;
                }
            },

            () = &mut interrupt => {
                session.stop();
                println!();
                println!("{}", state_label(SessionState::Stopped));
                break;
            }
        }
    }
    Ok(())
}
