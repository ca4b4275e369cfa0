//! Export command handler.

use std::path::PathBuf;

use anyhow::Result;
use vocalis_core::domain::DEFAULT_EXPORT_PREFIX;
use vocalis_core::{ExportFormat, ensure_dir};

use super::{report, resolve_text, resolve_voice};
use crate::bootstrap::CliContext;
use crate::commands::{TextInput, VoiceArgs};

/// Arguments for the export command.
pub struct ExportArgs {
    pub input: TextInput,
    pub voice: VoiceArgs,
    pub format: ExportFormat,
    pub out: PathBuf,
    pub prefix: Option<String>,
}

/// Synthesize to bytes and write `<out>/<prefix>-<timestamp>.<ext>`.
///
/// Returns the written path.
pub async fn execute(ctx: &CliContext, args: ExportArgs) -> Result<PathBuf> {
    let text = resolve_text(ctx, &args.input)
        .await
        .map_err(|e| report(ctx, e))?;
    let (session, _events) = ctx.open_session().await.map_err(|e| report(ctx, e))?;
    ctx.flush_notifications();

    let voice_id = resolve_voice(ctx, &args.voice).map_err(|e| report(ctx, e))?;
    let params = ctx.synthesis_params(&args.voice);
    let prefix = args.prefix.as_deref().unwrap_or(DEFAULT_EXPORT_PREFIX);

    let artifact = session
        .export_named(&text, &voice_id, &params, args.format, prefix)
        .await
        .map_err(|e| report(ctx, e))?;

    let dir = ensure_dir(&args.out).map_err(|e| report(ctx, e))?;
    let path = dir.join(&artifact.file_name);
    tokio::fs::write(&path, &artifact.bytes)
        .await
        .map_err(|e| report(ctx, e))?;

    tracing::info!(path = %path.display(), bytes = artifact.len(), "Export written");
    ctx.notifications.success(format!(
        "Saved {} ({} bytes)",
        path.display(),
        artifact.len()
    ));
    ctx.flush_notifications();
    Ok(path)
}
