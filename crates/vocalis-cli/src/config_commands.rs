//! Configuration management subcommands.

use clap::Subcommand;
use vocalis_core::Theme;

/// Configuration management commands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show all stored settings (the API key is masked)
    Show,

    /// Store the remote API key
    SetKey {
        /// The API key
        key: String,
    },

    /// Remove the stored API key (the local engine is used afterwards)
    ClearKey,

    /// Show the theme, switch it, or toggle it with --toggle
    Theme {
        /// light or dark
        #[arg(value_parser = parse_theme, conflicts_with = "toggle")]
        theme: Option<Theme>,

        #[arg(long)]
        toggle: bool,
    },

    /// Update default synthesis settings
    Set {
        /// Default voice id
        #[arg(long)]
        voice: Option<String>,
        /// Default speaking rate (0.1-10.0)
        #[arg(long)]
        rate: Option<f32>,
        /// Default pitch (0.0-2.0)
        #[arg(long)]
        pitch: Option<f32>,
        /// Remote voice stability (0.0-1.0)
        #[arg(long)]
        stability: Option<f32>,
        /// Remote voice similarity boost (0.0-1.0)
        #[arg(long)]
        similarity_boost: Option<f32>,
        /// Remote model id
        #[arg(long)]
        model: Option<String>,
        /// Background music volume (0.0-1.0)
        #[arg(long)]
        music_volume: Option<f32>,
        /// Directory holding ambient.mp3, classical.mp3 and lofi.mp3
        #[arg(long)]
        tracks_dir: Option<String>,
        /// Remote API base URL
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Reset all settings to defaults (keeps nothing, including the key)
    Reset,
}

fn parse_theme(s: &str) -> Result<Theme, String> {
    s.parse()
}
