//! Export artifacts and naming.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Default file name prefix for exported audio.
pub const DEFAULT_EXPORT_PREFIX: &str = "speech";

/// Requested export format.
///
/// The format is a label only: no transcoding is performed. Whatever bytes
/// the backend produced are written under the requested extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Mp3,
    Wav,
    Ogg,
}

impl ExportFormat {
    /// File extension without the leading dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Ogg => "ogg",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "wav" => Ok(Self::Wav),
            "ogg" => Ok(Self::Ogg),
            other => Err(format!("unsupported export format '{other}' (expected mp3, wav or ogg)")),
        }
    }
}

/// A named, downloadable byte sequence produced by an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// `<prefix>-<timestamp>.<ext>`
    pub file_name: String,

    pub format: ExportFormat,

    /// Audio bytes exactly as returned by the backend.
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Build an export file name of the form `<prefix>-<YYYYmmdd-HHMMSS>.<ext>`.
///
/// An empty prefix falls back to [`DEFAULT_EXPORT_PREFIX`].
pub fn export_file_name<Tz>(prefix: &str, format: ExportFormat, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let prefix = match prefix.trim() {
        "" => DEFAULT_EXPORT_PREFIX,
        p => p,
    };
    format!(
        "{prefix}-{}.{}",
        at.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn file_name_follows_pattern() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            export_file_name("greeting", ExportFormat::Wav, &at),
            "greeting-20240309-140507.wav"
        );
    }

    #[test]
    fn empty_prefix_uses_default() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            export_file_name("  ", ExportFormat::Mp3, &at),
            "speech-20240101-000000.mp3"
        );
    }

    #[test]
    fn parse_formats() {
        assert_eq!(".MP3".parse::<ExportFormat>(), Ok(ExportFormat::Mp3));
        assert_eq!("ogg".parse::<ExportFormat>(), Ok(ExportFormat::Ogg));
        assert!("flac".parse::<ExportFormat>().is_err());
    }
}
