pub mod client;
pub mod tracks;

use async_trait::async_trait;

use crate::{error::TranscriptError, types::TranscriptFragment};

pub use client::CaptionClient;
pub use tracks::{CaptionTrack, decode_json3, select_track};

/// Per-video caption lookup.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch_transcript(&self, video_id: &str)
    -> Result<Vec<TranscriptFragment>, TranscriptError>;
}
