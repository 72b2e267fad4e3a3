use serde::Serialize;

use crate::types::{TranscriptOutcome, VideoRecord};

pub const UNAVAILABLE_SENTINEL: &str =
    "No transcript found or transcripts are disabled for this video.";

/// A record flattened for display, with the transcript as a single string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedRecord {
    pub video_id: String,
    pub url: String,
    pub transcript: String,
}

pub fn transcript_display(outcome: &TranscriptOutcome) -> String {
    match outcome {
        TranscriptOutcome::Text { text } => text.clone(),
        TranscriptOutcome::Unavailable { .. } => UNAVAILABLE_SENTINEL.to_string(),
        TranscriptOutcome::Failed { message, .. } => format!("Error: {}", message),
    }
}

pub fn render_record(record: &VideoRecord) -> RenderedRecord {
    RenderedRecord {
        video_id: record.video_id.to_string(),
        url: record.url.clone(),
        transcript: transcript_display(&record.transcript),
    }
}

pub fn render_records(records: &[VideoRecord]) -> Vec<RenderedRecord> {
    records.iter().map(render_record).collect()
}

/// Format records as human-readable markdown
pub fn format_records_readable(records: &[VideoRecord]) -> String {
    let mut output = String::new();

    for record in records {
        let rendered = render_record(record);
        output.push_str(&format!("## {}\n\n", rendered.video_id));
        output.push_str(&format!("**URL:** {}\n\n", rendered.url));
        output.push_str(&rendered.transcript);
        output.push_str("\n\n---\n\n");
    }

    output
}
