//! Shared CLI presentation utilities.
//!
//! Keep this module format-only: no domain transforms.

pub mod notifications;
pub mod tables;

pub use notifications::{format_notification, print_notification, state_label};
pub use tables::{print_separator, truncate_string};
