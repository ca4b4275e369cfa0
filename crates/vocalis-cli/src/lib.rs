//! Command-line front end for vocalis.
//!
//! `main` parses arguments, calls [`bootstrap`] to compose the context and
//! dispatches to a handler in [`handlers`].

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio_test as _;

// Used by the binary only
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod config_commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, TextInput, VoiceArgs};
pub use config_commands::ConfigCommand;
pub use error::CliError;
pub use parser::Cli;
