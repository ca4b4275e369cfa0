//! Main commands enum and primary subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use vocalis_core::{ExportFormat, TrackKind};

use crate::config_commands::ConfigCommand;

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List the voices available from the active backend
    Voices,

    /// Speak text aloud (interactive: p = pause, r = resume, s = stop)
    Speak {
        #[command(flatten)]
        input: TextInput,

        #[command(flatten)]
        voice: VoiceArgs,

        /// Background music under the speech
        #[arg(long, value_name = "KIND", value_parser = parse_track)]
        music: Option<TrackKind>,

        /// Background music volume (0.0 - 1.0)
        #[arg(long, value_name = "VOLUME")]
        music_volume: Option<f32>,
    },

    /// Synthesize text to an audio file (remote backend only)
    Export {
        #[command(flatten)]
        input: TextInput,

        #[command(flatten)]
        voice: VoiceArgs,

        /// Output format (mp3, wav, ogg); only the extension changes
        #[arg(long, default_value = "mp3", value_parser = parse_format)]
        format: ExportFormat,

        /// Directory to write the file into
        #[arg(long, short, default_value = ".")]
        out: PathBuf,

        /// File name prefix
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Print the text extracted from a file (text or image via OCR)
    Read {
        /// Path to a .txt/.md file or an image
        file: PathBuf,
    },

    /// View or change stored settings
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Where the text to speak comes from.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct TextInput {
    /// Text to speak
    pub text: Option<String>,

    /// Read the text from a file (text or image via OCR)
    #[arg(long, short)]
    pub file: Option<PathBuf>,
}

/// Voice selection and synthesis parameters.
#[derive(Args, Debug, Clone, Default)]
pub struct VoiceArgs {
    /// Voice id (see `vocalis voices`); defaults to the stored default voice
    #[arg(long)]
    pub voice: Option<String>,

    /// Speaking rate (1.0 = normal)
    #[arg(long)]
    pub rate: Option<f32>,

    /// Pitch (1.0 = normal; ignored by the local engine)
    #[arg(long)]
    pub pitch: Option<f32>,
}

fn parse_track(s: &str) -> Result<TrackKind, String> {
    s.parse()
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    s.parse()
}
