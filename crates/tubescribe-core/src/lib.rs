//! Tubescribe Core Library
//!
//! Lists a YouTube channel's uploads and acquires a plain-text transcript for
//! each video.

pub mod acquire;
pub mod channel;
pub mod config;
pub mod error;
pub mod format;
pub mod transcript;
pub mod types;

// Re-export commonly used items at crate root
pub use acquire::{Acquirer, acquire};
pub use channel::{DataApiClient, MAX_PAGE_SIZE, PlaylistPage, UploadsSource, enumerate};
pub use config::{API_KEY_ENV, Config};
pub use error::{
    ChannelError, ConfigError, FailureKind, Result, TranscriptError, UpstreamError,
};
pub use format::{
    RenderedRecord, UNAVAILABLE_SENTINEL, format_records_readable, render_record, render_records,
};
pub use transcript::{CaptionClient, TranscriptSource};
pub use types::{TranscriptFragment, TranscriptOutcome, VideoId, VideoRecord};
