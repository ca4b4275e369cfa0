//! Session states and the pure transition table.
//!
//! ```text
//!   Idle → Synthesizing → Playing ⇄ Paused
//!            │    ▲          │        │
//!   (failure)▼    └── play ──┴────────┘
//!          Idle                any ── stop ──→ Stopped ── reset ──→ Idle
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current state of the playback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// Nothing playing, nothing requested.
    Idle,

    /// Waiting for the backend to produce audio.
    Synthesizing,

    Playing,

    Paused,

    /// Playback ended (explicit stop or natural completion).
    Stopped,
}

impl SessionState {
    pub const ALL: [Self; 5] = [
        Self::Idle,
        Self::Synthesizing,
        Self::Playing,
        Self::Paused,
        Self::Stopped,
    ];

    /// Whether a sound is attached (possibly paused).
    pub const fn has_audio(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }

    /// The state after `action`. Total: every pair has an answer, and
    /// actions that do not apply leave the state unchanged.
    #[must_use]
    pub const fn next(self, action: Action) -> Self {
        match (self, action) {
            (_, Action::Play) => Self::Synthesizing,
            (Self::Synthesizing, Action::SynthesisSucceeded) => Self::Playing,
            (Self::Synthesizing, Action::SynthesisFailed) => Self::Idle,
            (Self::Playing, Action::Pause) => Self::Paused,
            (Self::Paused, Action::Resume) => Self::Playing,
            (_, Action::Stop) => Self::Stopped,
            (Self::Playing | Self::Paused, Action::Complete) => Self::Stopped,
            (Self::Stopped, Action::Reset) => Self::Idle,
            (state, _) => state,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Synthesizing => "synthesizing",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

/// Inputs to the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// A new synthesis cycle begins.
    Play,
    SynthesisSucceeded,
    SynthesisFailed,
    Pause,
    Resume,
    Stop,
    /// The current sound drained on its own.
    Complete,
    Reset,
}

impl Action {
    pub const ALL: [Self; 8] = [
        Self::Play,
        Self::SynthesisSucceeded,
        Self::SynthesisFailed,
        Self::Pause,
        Self::Resume,
        Self::Stop,
        Self::Complete,
        Self::Reset,
    ];
}
