//! Voices command handler.

use anyhow::Result;

use super::report;
use crate::bootstrap::CliContext;
use crate::presentation::{print_separator, truncate_string};

/// List the voices of the active backend, marking the stored default.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let voices = ctx.catalog.reload().await.map_err(|e| report(ctx, e))?;
    ctx.flush_notifications();

    if voices.is_empty() {
        println!("No voices available.");
        return Ok(());
    }

    let source = ctx
        .catalog
        .source()
        .map_or_else(|| "unknown".to_string(), |s| s.to_string());
    println!("{} voice(s) from the {source} backend:\n", voices.len());

    println!("  {:<24} {:<32} Language/Accent", "ID", "Name");
    print_separator(80);

    let default = ctx.effective.default_voice_id.as_deref();
    for voice in voices {
        let marker = if default == Some(voice.id.as_str()) { "*" } else { " " };
        println!(
            "{marker} {:<24} {:<32} {}",
            truncate_string(&voice.id, 24),
            truncate_string(&voice.display_name, 32),
            voice.language_or_accent
        );
    }

    Ok(())
}
