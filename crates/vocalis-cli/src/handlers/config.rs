//! Config command handler.
//!
//! Handles the stored API key, theme and default synthesis settings.

use anyhow::Result;
use vocalis_core::{CoreError, SettingsUpdate, Theme};

use super::report;
use crate::bootstrap::CliContext;
use crate::config_commands::ConfigCommand;
use crate::presentation::print_separator;

/// Execute the config command.
pub async fn execute(ctx: &CliContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => handle_show(ctx).await,
        ConfigCommand::SetKey { key } => {
            let result = ctx.settings.set_api_key(&key).await;
            finish(ctx, result)
        }
        ConfigCommand::ClearKey => {
            let result = ctx.settings.clear_api_key().await;
            finish(ctx, result)
        }
        ConfigCommand::Theme { theme, toggle } => handle_theme(ctx, theme, toggle).await,
        ConfigCommand::Set {
            voice,
            rate,
            pitch,
            stability,
            similarity_boost,
            model,
            music_volume,
            tracks_dir,
            base_url,
        } => {
            let changes = SettingsUpdate {
                default_voice_id: voice.map(Some),
                rate: rate.map(Some),
                pitch: pitch.map(Some),
                stability: stability.map(Some),
                similarity_boost: similarity_boost.map(Some),
                model_id: model.map(Some),
                background_volume: music_volume.map(Some),
                tracks_dir: tracks_dir.map(Some),
                api_base_url: base_url.map(Some),
                ..Default::default()
            };
            if is_empty(&changes) {
                println!("Nothing to change. See `vocalis config set --help`.");
                return Ok(());
            }
            let result = ctx.settings.update(changes).await;
            finish(ctx, result)
        }
        ConfigCommand::Reset => {
            let result = ctx.settings.reset().await;
            finish(ctx, result)
        }
    }
}

/// Report a failed change, or flush the service's confirmation.
fn finish<T>(ctx: &CliContext, result: Result<T, CoreError>) -> Result<()> {
    result.map_err(|e| report(ctx, e))?;
    ctx.flush_notifications();
    Ok(())
}

async fn handle_theme(ctx: &CliContext, theme: Option<Theme>, toggle: bool) -> Result<()> {
    let current = ctx
        .settings
        .get()
        .await
        .map_err(|e| report(ctx, e))?
        .effective_theme();

    let result = match (theme, toggle) {
        (Some(theme), _) => ctx.settings.set_theme(theme).await,
        (None, true) => ctx.settings.toggle_theme().await,
        (None, false) => {
            println!("Theme: {current}");
            return Ok(());
        }
    };
    finish(ctx, result)
}

async fn handle_show(ctx: &CliContext) -> Result<()> {
    let settings = ctx.settings.get().await.map_err(|e| report(ctx, e))?;
    let voice = settings.voice_settings();

    println!("Current settings:");
    print_separator(50);
    println!(
        "  API key:            {}",
        settings
            .redacted_api_key()
            .unwrap_or_else(|| "(not set, local engine)".to_string())
    );
    if ctx.effective.api_key != settings.api_key {
        println!("                      (overridden by VOCALIS_API_KEY or --api-key)");
    }
    println!(
        "  API base URL:       {}",
        settings.api_base_url.as_deref().unwrap_or("(default)")
    );
    println!("  Model:              {}", settings.effective_model_id());
    println!(
        "  Default voice:      {}",
        settings.default_voice_id.as_deref().unwrap_or("(first available)")
    );
    println!("  Rate:               {}", settings.effective_rate());
    println!("  Pitch:              {}", settings.effective_pitch());
    println!("  Stability:          {}", voice.stability);
    println!("  Similarity boost:   {}", voice.similarity_boost);
    println!(
        "  Music volume:       {}",
        settings.effective_background_volume()
    );
    println!("  Tracks directory:   {}", ctx.tracks_dir().display());
    println!("  Theme:              {}", settings.effective_theme());
    Ok(())
}

const fn is_empty(update: &SettingsUpdate) -> bool {
    update.default_voice_id.is_none()
        && update.rate.is_none()
        && update.pitch.is_none()
        && update.stability.is_none()
        && update.similarity_boost.is_none()
        && update.model_id.is_none()
        && update.background_volume.is_none()
        && update.tracks_dir.is_none()
        && update.api_base_url.is_none()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use vocalis_core::Settings;
    use crate::bootstrap::{CliConfig, bootstrap};
    use crate::error::CliError;
    use vocalis_voice::{EspeakConfig, TesseractOcr};

    async fn context(dir: &Path) -> CliContext {
        bootstrap(CliConfig {
            settings_path: dir.join("settings.json"),
            api_key: None,
            api_base_url: None,
            force_local: false,
            espeak: EspeakConfig::default(),
            ocr: TesseractOcr::default(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn set_and_clear_key() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(tmp.path()).await;

        execute(&ctx, ConfigCommand::SetKey { key: " sk-1234 ".into() })
            .await
            .unwrap();
        let stored = ctx.settings.get().await.unwrap();
        assert_eq!(stored.api_key.as_deref(), Some("sk-1234"));

        execute(&ctx, ConfigCommand::ClearKey).await.unwrap();
        assert!(!ctx.settings.get().await.unwrap().has_api_key());
    }

    #[tokio::test]
    async fn theme_toggle_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(tmp.path()).await;

        execute(
            &ctx,
            ConfigCommand::Theme {
                theme: None,
                toggle: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(
            ctx.settings.get().await.unwrap().effective_theme(),
            Theme::Dark
        );
    }

    #[tokio::test]
    async fn invalid_rate_is_rejected_and_not_saved() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(tmp.path()).await;

        let err = execute(
            &ctx,
            ConfigCommand::Set {
                voice: None,
                rate: Some(42.0),
                pitch: None,
                stability: None,
                similarity_boost: None,
                model: None,
                music_volume: None,
                tracks_dir: None,
                base_url: None,
            },
        )
        .await
        .unwrap_err();

        let cli = err.downcast_ref::<CliError>().unwrap();
        assert_eq!(cli.exit_code(), 2);
        assert!(!tmp.path().join("settings.json").exists());
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context(tmp.path()).await;

        execute(&ctx, ConfigCommand::SetKey { key: "sk-1".into() })
            .await
            .unwrap();
        execute(&ctx, ConfigCommand::Reset).await.unwrap();

        assert_eq!(ctx.settings.get().await.unwrap(), Settings::with_defaults());
    }
}
