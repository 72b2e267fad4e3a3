use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Failure reported by an upstream HTTP API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamError {
    pub status: Option<u16>,
    pub message: String,
}

impl UpstreamError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "upstream returned {}: {}", status, self.message),
            None => write!(f, "upstream request failed: {}", self.message),
        }
    }
}

impl std::error::Error for UpstreamError {}

impl From<reqwest::Error> for UpstreamError {
    /// The request URL is dropped from the message, it carries the API key.
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16());
        Self::new(status, err.without_url().to_string())
    }
}

impl From<serde_json::Error> for UpstreamError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(None, format!("invalid response body: {err}"))
    }
}

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Channel id must not be empty")]
    InvalidChannelId,

    #[error("max_videos must be at least 1, got {0}")]
    InvalidMaxVideos(usize),

    #[error("Could not find channel with ID: {channel_id}")]
    ChannelNotFound { channel_id: String },

    #[error("YouTube API error: {0}")]
    Upstream(#[from] UpstreamError),
}

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("No transcript found for {video_id} in any of: {}", .languages.join(", "))]
    NoTranscriptFound {
        video_id: String,
        languages: Vec<String>,
    },

    #[error("Transcripts are disabled for {video_id}")]
    TranscriptsDisabled { video_id: String },

    #[error("Video {video_id} is unavailable: {reason}")]
    VideoUnavailable { video_id: String, reason: String },

    #[error("YouTube is blocking requests for {video_id}")]
    RequestBlocked { video_id: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    Parse(String),
}

impl TranscriptError {
    /// Missing or disabled captions are an expected outcome, not a failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            TranscriptError::NoTranscriptFound { .. } | TranscriptError::TranscriptsDisabled { .. }
        )
    }

    /// `None` for the unavailable kinds.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            TranscriptError::NoTranscriptFound { .. }
            | TranscriptError::TranscriptsDisabled { .. } => None,
            TranscriptError::VideoUnavailable { .. } => Some(FailureKind::VideoUnavailable),
            TranscriptError::RequestBlocked { .. } => Some(FailureKind::RequestBlocked),
            TranscriptError::Http(_) => Some(FailureKind::Upstream),
            TranscriptError::Parse(_) => Some(FailureKind::Parse),
        }
    }
}

impl From<serde_json::Error> for TranscriptError {
    fn from(err: serde_json::Error) -> Self {
        TranscriptError::Parse(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    VideoUnavailable,
    RequestBlocked,
    Upstream,
    Parse,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },
}

pub type Result<T, E = ChannelError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_message_includes_status() {
        let err = UpstreamError::new(Some(403), "quotaExceeded");
        assert_eq!(err.to_string(), "upstream returned 403: quotaExceeded");

        let err = UpstreamError::new(None, "connection reset");
        assert_eq!(err.to_string(), "upstream request failed: connection reset");
    }

    #[test]
    fn unavailable_kinds_are_not_failures() {
        let disabled = TranscriptError::TranscriptsDisabled {
            video_id: "v1".into(),
        };
        let missing = TranscriptError::NoTranscriptFound {
            video_id: "v1".into(),
            languages: vec!["en".into(), "de".into()],
        };
        let broken = TranscriptError::Parse("bad json".into());

        assert!(disabled.is_unavailable());
        assert!(missing.is_unavailable());
        assert!(!broken.is_unavailable());
        assert_eq!(missing.failure_kind(), None);
        assert_eq!(broken.failure_kind(), Some(FailureKind::Parse));
        assert_eq!(
            missing.to_string(),
            "No transcript found for v1 in any of: en, de"
        );
    }
}
