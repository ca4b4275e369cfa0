//! Command handlers.
//!
//! Each handler is an action boundary: library errors are published as
//! error notifications, printed, and converted to [`CliError`] for the exit
//! code.

pub mod config;
pub mod export;
pub mod read;
pub mod speak;
pub mod voices;

use std::fmt;

use vocalis_voice::VoiceError;

use crate::bootstrap::CliContext;
use crate::commands::{TextInput, VoiceArgs};
use crate::error::CliError;

/// Publish `err` as an error notification and convert it for `main`.
pub(crate) fn report<E>(ctx: &CliContext, err: E) -> anyhow::Error
where
    E: fmt::Display + Into<CliError>,
{
    ctx.notifications.error(err.to_string());
    ctx.flush_notifications();
    anyhow::Error::new(err.into())
}

/// The text argument, or the contents of `--file`.
pub(crate) async fn resolve_text(ctx: &CliContext, input: &TextInput) -> Result<String, VoiceError> {
    match (&input.text, &input.file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => ctx.text_loader.load(path).await,
        (None, None) => Err(VoiceError::Validation("Please enter some text".into())),
    }
}

/// `--voice`, else the stored default if the catalog has it, else the first voice.
pub(crate) fn resolve_voice(ctx: &CliContext, args: &VoiceArgs) -> Result<String, VoiceError> {
    if let Some(voice) = args.voice.as_deref().filter(|v| !v.trim().is_empty()) {
        return Ok(voice.to_string());
    }

    if let Some(default) = ctx.effective.default_voice_id.as_deref() {
        if ctx.catalog.resolve(default).is_ok() {
            return Ok(default.to_string());
        }
        tracing::debug!(default, "Stored default voice is not in the current catalog");
    }

    ctx.catalog
        .voices()
        .first()
        .map(|voice| voice.id.clone())
        .ok_or_else(|| VoiceError::Validation("Please select a voice".into()))
}
