use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FailureKind, TranscriptError};

pub const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Returns `None` for empty or whitespace-only ids.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn watch_url(&self) -> String {
        format!("{}{}", WATCH_URL, self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One caption unit. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptFragment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TranscriptOutcome {
    Text { text: String },
    Unavailable { reason: String },
    Failed { kind: FailureKind, message: String },
}

impl TranscriptOutcome {
    pub fn from_fragments(fragments: &[TranscriptFragment]) -> Self {
        let text = fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        TranscriptOutcome::Text { text }
    }

    pub fn from_error(err: &TranscriptError) -> Self {
        match err.failure_kind() {
            None => TranscriptOutcome::Unavailable {
                reason: err.to_string(),
            },
            Some(kind) => TranscriptOutcome::Failed {
                kind,
                message: err.to_string(),
            },
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            TranscriptOutcome::Text { text } => Some(text),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, TranscriptOutcome::Text { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoRecord {
    pub video_id: VideoId,
    pub url: String,
    pub transcript: TranscriptOutcome,
}

impl VideoRecord {
    pub fn new(video_id: VideoId, transcript: TranscriptOutcome) -> Self {
        Self {
            url: video_id.watch_url(),
            video_id,
            transcript,
        }
    }
}
