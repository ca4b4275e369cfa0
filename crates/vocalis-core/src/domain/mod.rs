//! Domain types shared by the playback layer and its adapters.
//!
//! These are plain data types with serde support. They contain no I/O and
//! no references to a particular speech engine or HTTP client.

mod export;
mod request;
mod track;
mod voice;

pub use export::{DEFAULT_EXPORT_PREFIX, ExportArtifact, ExportFormat, export_file_name};
pub use request::{SynthesisRequest, VoiceSettings};
pub use track::{BackgroundTrack, TrackKind};
pub use voice::Voice;
