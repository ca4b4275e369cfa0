//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the vocalis text-to-speech player.
///
/// This is the top-level parser that handles global options and dispatches
/// to subcommands.
#[derive(Parser)]
#[command(name = "vocalis")]
#[command(about = "Speak, pause and export text with a remote or local voice")]
#[command(version)]
pub struct Cli {
    /// Remote text-to-speech API key (overrides the stored key)
    #[arg(long, env = "VOCALIS_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Remote API base URL
    #[arg(long, env = "VOCALIS_API_BASE_URL", global = true)]
    pub api_base_url: Option<String>,

    /// Ignore any API key and use the local speech engine
    #[arg(long, global = true)]
    pub local: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
