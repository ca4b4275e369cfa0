//! Path utilities for vocalis data directories.
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - No interactive/terminal I/O - adapters handle user prompts separately
//! - OS-specific logic is kept private in `platform`

mod error;
mod platform;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::PathError;
pub use platform::{DATA_DIR_ENV, data_root, ensure_dir, settings_path};
