use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::{
    transcript::TranscriptSource,
    types::{TranscriptOutcome, VideoId, VideoRecord},
};

/// Fetches a transcript for every video id, one record per id.
pub struct Acquirer<T> {
    source: T,
    concurrency: usize,
}

impl<T: TranscriptSource> Acquirer<T> {
    /// Sequential by default.
    pub fn new(source: T) -> Self {
        Self {
            source,
            concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn acquire(&self, video_ids: &[VideoId]) -> Vec<VideoRecord> {
        self.acquire_with_progress(video_ids, |_, _, _| {}).await
    }

    /// `on_record(completed, total, record)` fires as each record finishes,
    /// in completion order. The returned records are in input order.
    pub async fn acquire_with_progress<F>(
        &self,
        video_ids: &[VideoId],
        mut on_record: F,
    ) -> Vec<VideoRecord>
    where
        F: FnMut(usize, usize, &VideoRecord),
    {
        let total = video_ids.len();
        info!(total, concurrency = self.concurrency, "acquiring transcripts");

        let mut slots: Vec<Option<VideoRecord>> = vec![None; total];
        let mut finished = stream::iter(video_ids.iter().enumerate())
            .map(|(index, video_id)| async move { (index, self.acquire_one(video_id).await) })
            .buffer_unordered(self.concurrency);

        let mut completed = 0;
        while let Some((index, record)) = finished.next().await {
            completed += 1;
            on_record(completed, total, &record);
            slots[index] = Some(record);
        }

        slots.into_iter().flatten().collect()
    }

    async fn acquire_one(&self, video_id: &VideoId) -> VideoRecord {
        let outcome = match self.source.fetch_transcript(video_id.as_str()).await {
            Ok(fragments) => {
                debug!(%video_id, fragments = fragments.len(), "transcript fetched");
                TranscriptOutcome::from_fragments(&fragments)
            }
            Err(e) if e.is_unavailable() => {
                warn!(%video_id, error = %e, "could not retrieve transcript");
                TranscriptOutcome::from_error(&e)
            }
            Err(e) => {
                error!(%video_id, error = %e, "failed to process video");
                TranscriptOutcome::from_error(&e)
            }
        };
        VideoRecord::new(video_id.clone(), outcome)
    }
}

/// Sequential acquisition with a one-off [`Acquirer`].
pub async fn acquire<T: TranscriptSource>(source: T, video_ids: &[VideoId]) -> Vec<VideoRecord> {
    Acquirer::new(source).acquire(video_ids).await
}
