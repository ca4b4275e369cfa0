//! Background music tracks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which background loop to play under the speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    /// No background music.
    #[default]
    None,
    Ambient,
    Classical,
    #[serde(rename = "lofi")]
    LoFi,
}

impl TrackKind {
    /// Stable lowercase label, also used as the track file stem.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ambient => "ambient",
            Self::Classical => "classical",
            Self::LoFi => "lofi",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "ambient" => Ok(Self::Ambient),
            "classical" => Ok(Self::Classical),
            "lofi" | "lo-fi" => Ok(Self::LoFi),
            other => Err(format!(
                "unknown track '{other}' (expected none, ambient, classical or lofi)"
            )),
        }
    }
}

/// A background track selection together with its volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundTrack {
    pub kind: TrackKind,

    /// Playback volume in `[0, 1]`.
    pub volume: f32,
}

impl BackgroundTrack {
    #[must_use]
    pub fn new(kind: TrackKind, volume: f32) -> Self {
        Self {
            kind,
            volume: volume.clamp(0.0, 1.0),
        }
    }
}

impl Default for BackgroundTrack {
    fn default() -> Self {
        Self::new(TrackKind::None, 0.3)
    }
}
