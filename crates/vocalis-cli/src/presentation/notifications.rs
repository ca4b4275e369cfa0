//! Rendering of notifications and session states.

use vocalis_core::{Notification, NotificationLevel};
use vocalis_voice::SessionState;

/// One-line rendering with a level marker.
pub fn format_notification(note: &Notification) -> String {
    let marker = match note.level {
        NotificationLevel::Info => "•",
        NotificationLevel::Success => "✓",
        NotificationLevel::Warning => "!",
        NotificationLevel::Error => "✗",
    };
    format!("{marker} {}", note.message)
}

/// Warnings and errors go to stderr, everything else to stdout.
pub fn print_notification(note: &Notification) {
    match note.level {
        NotificationLevel::Warning | NotificationLevel::Error => {
            eprintln!("{}", format_notification(note));
        }
        NotificationLevel::Info | NotificationLevel::Success => {
            println!("{}", format_notification(note));
        }
    }
}

/// Status line text for a session state.
pub const fn state_label(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => "Ready",
        SessionState::Synthesizing => "Generating speech...",
        SessionState::Playing => "Playing",
        SessionState::Paused => "Paused",
        SessionState::Stopped => "Stopped",
    }
}
