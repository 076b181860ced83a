//! Segment extraction by live playback capture
//!
//! A segment is recorded while the source plays in real time, so its length
//! follows the wall clock rather than frame timestamps. Drift of tens to
//! hundreds of milliseconds is expected; the segment keeps both the requested
//! and the captured duration.

use std::sync::Arc;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::{CaptureChunk, ExtractedSegment, MediaBlob, SourceVideo};
use crate::engine::registry::BlobRegistry;
use crate::ports::{CaptureOptions, CaptureSession, PlaybackPort};

/// Requested capture window after clamping to the source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureWindow {
    pub start: f64,
    pub duration: f64,
}

impl CaptureWindow {
    /// Clamp `start` into the source and shorten `duration` so the window
    /// ends no later than the source does. A start at or past the end is
    /// pulled back so the window still covers `duration` seconds when possible.
    pub fn clamp(source_duration: f64, start: f64, duration: f64) -> DomainResult<Self> {
        if !start.is_finite() || !duration.is_finite() || duration <= 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "Invalid capture window: start {} duration {}",
                start, duration
            )));
        }

        let mut start = start.max(0.0);
        if start >= source_duration {
            start = (source_duration - duration).max(0.0);
        }
        let duration = duration.min(source_duration - start);

        Ok(Self { start, duration })
    }
}

/// Drives one playback+capture session per segment
pub struct SegmentExtractor {
    playback: Arc<dyn PlaybackPort>,
    registry: BlobRegistry,
    options: CaptureOptions,
}

impl SegmentExtractor {
    pub fn new(playback: Arc<dyn PlaybackPort>, registry: BlobRegistry) -> Self {
        Self {
            playback,
            registry,
            options: CaptureOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CaptureOptions) -> Self {
        self.options = options;
        self
    }

    /// Record `duration` seconds of playback starting at `start`.
    ///
    /// The returned segment's blob is registered and must be released by the
    /// caller once it is no longer shown or downloadable.
    pub async fn extract(
        &self,
        source: &SourceVideo,
        index: usize,
        start: f64,
        duration: f64,
        cancel: &CancellationToken,
    ) -> DomainResult<ExtractedSegment> {
        let window = CaptureWindow::clamp(source.duration, start, duration)?;
        if cancel.is_cancelled() {
            return Err(DomainError::CancelledByUser);
        }

        debug!(
            index,
            start = window.start,
            duration = window.duration,
            "Starting capture session"
        );

        let session = self
            .playback
            .start_capture(source, window.start, &self.options)
            .await
            .map_err(|e| match e {
                DomainError::MediaDecode(_) | DomainError::CancelledByUser => e,
                other => DomainError::MediaDecode(other.to_string()),
            })?;

        let actual_start = session.actual_start().clamp(0.0, window.start);
        let (chunks, elapsed) = self.record(session, window.duration, cancel).await?;

        let captured_duration = elapsed.min(source.duration - actual_start).max(0.0);
        let blob = MediaBlob::from_chunks(chunks, source.mime_type.clone());
        if blob.is_empty() {
            warn!(index, start = window.start, "Capture produced no data");
            return Err(DomainError::EmptyCapture {
                start: window.start,
            });
        }

        let drift = captured_duration - window.duration;
        if drift.abs() > 0.5 {
            warn!(index, drift, "Capture drifted from the requested length");
        }

        let url = self.registry.register(&blob);
        info!(
            index,
            start = actual_start,
            duration = captured_duration,
            bytes = blob.len(),
            "Segment captured"
        );

        Ok(ExtractedSegment {
            index,
            blob,
            url,
            start: actual_start,
            nominal_duration: window.duration,
            captured_duration,
        })
    }

    /// Collect chunks until the wall-clock deadline, the end of playback or
    /// cancellation, whichever comes first
    async fn record(
        &self,
        mut session: Box<dyn CaptureSession>,
        duration: f64,
        cancel: &CancellationToken,
    ) -> DomainResult<(Vec<CaptureChunk>, f64)> {
        let started = Instant::now();
        let deadline = time::sleep(std::time::Duration::from_secs_f64(duration));
        tokio::pin!(deadline);

        let mut chunks = Vec::new();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    session.abort().await;
                    return Err(DomainError::CancelledByUser);
                }
                _ = &mut deadline => break,
                chunk = session.next_chunk() => match chunk {
                    Some(Ok(chunk)) => chunks.push(chunk),
                    Some(Err(e)) => {
                        session.abort().await;
                        return Err(e);
                    }
                    None => {
                        debug!("Playback ended before the deadline");
                        break;
                    }
                },
            }
        }

        let elapsed = started.elapsed().as_secs_f64();
        chunks.extend(session.stop().await?);
        Ok((chunks, elapsed))
    }
}
