//! Voice descriptor.

use serde::{Deserialize, Serialize};

/// A selectable voice, as listed by the local engine or the remote API.
///
/// Voices are immutable once loaded. The `id` is opaque and only meaningful
/// to the backend that produced it (a voice name for the local engine, a
/// `voice_id` for the remote API).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    /// Backend-specific identifier used in synthesis calls.
    pub id: String,

    /// Human-readable name shown in voice pickers.
    pub display_name: String,

    /// Language tag or accent label (may be empty when unknown).
    pub language_or_accent: String,
}

impl Voice {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        language_or_accent: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            language_or_accent: language_or_accent.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_serializes_camel_case() {
        let voice = Voice::new("21m00", "Rachel", "american");
        let json = serde_json::to_value(&voice).unwrap();
        assert_eq!(json["displayName"], "Rachel");
        assert_eq!(json["languageOrAccent"], "american");
    }
}
