//! Read command handler.
//!
//! Prints the text that `speak --file` would use, which is handy for
//! checking OCR output before listening to it.

use std::path::Path;

use anyhow::Result;

use super::report;
use crate::bootstrap::CliContext;

pub async fn execute(ctx: &CliContext, file: &Path) -> Result<()> {
    let text = ctx
        .text_loader
        .load(file)
        .await
        .map_err(|e| report(ctx, e))?;

    if text.trim().is_empty() {
        ctx.notifications
            .warning(format!("No text found in {}", file.display()));
        ctx.flush_notifications();
        return Ok(());
    }

    println!("{text}");
    Ok(())
}
