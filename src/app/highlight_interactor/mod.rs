// Highlight interactor - Orchestrates the sample, extract, assemble pipeline

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::{BlobRegistry, ClipAssembler, ProgressEmitter, ProgressReporter, SegmentExtractor};
use crate::ports::*;

/// User-tunable parameters of one processing run
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightSettings {
    pub sensitivity: Sensitivity,
    pub segment_length: SegmentLength,
    pub bounds: DurationBounds,
    pub output_prefix: String,
    pub failure_policy: FailurePolicy,
    pub capture: CaptureOptions,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::default(),
            segment_length: SegmentLength::default(),
            bounds: DurationBounds::default(),
            output_prefix: "processed".to_string(),
            failure_policy: FailurePolicy::default(),
            capture: CaptureOptions::default(),
        }
    }
}

/// Everything a front end can show once a run completes
#[derive(Debug, Clone)]
pub struct HighlightReport {
    pub source: SourceVideo,
    pub moments: Vec<KeyMoment>,
    pub segments: Vec<ExtractedSegment>,
    pub clip: FinalClip,
    /// Moments whose extraction failed and was skipped
    pub skipped: Vec<usize>,
    pub processing_time: Duration,
}

impl HighlightReport {
    /// Every blob URL this report keeps alive
    pub fn blob_urls(&self) -> Vec<BlobUrl> {
        self.segments
            .iter()
            .map(|segment| segment.url.clone())
            .chain(self.clip.url.clone())
            .collect()
    }
}

/// State threaded through the stages of one run
struct PipelineContext<'a> {
    source: &'a SourceVideo,
    settings: &'a HighlightSettings,
    policy: AssemblyPolicy,
    moments: Vec<KeyMoment>,
    segments: Vec<ExtractedSegment>,
    skipped: Vec<usize>,
    progress: ProgressEmitter,
    step: usize,
    cancel: CancellationToken,
}

impl PipelineContext<'_> {
    fn advance(&mut self, message: impl Into<String>) {
        self.step += 1;
        self.progress.step(self.step, message);
    }

    fn ensure_not_cancelled(&self) -> DomainResult<()> {
        if self.cancel.is_cancelled() {
            Err(DomainError::CancelledByUser)
        } else {
            Ok(())
        }
    }
}

/// Interactor for the highlight use case
pub struct HighlightInteractor {
    probe_port: Arc<dyn ProbePort>,
    playback_port: Arc<dyn PlaybackPort>,
    registry: BlobRegistry,
}

impl HighlightInteractor {
    /// Create new highlight interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        playback_port: Arc<dyn PlaybackPort>,
        registry: BlobRegistry,
    ) -> Self {
        Self {
            probe_port,
            playback_port,
            registry,
        }
    }

    pub fn registry(&self) -> &BlobRegistry {
        &self.registry
    }

    /// Metadata probe performed before a run
    pub async fn probe(&self, input: &Path) -> DomainResult<SourceVideo> {
        info!(input = %input.display(), "Probing source");
        let source = self.probe_port.probe_source(input).await?;
        info!(
            duration = source.duration,
            mime_type = %source.mime_type,
            "Source probed"
        );
        Ok(source)
    }

    /// Sample key moments without extracting anything
    pub fn preview_moments(
        &self,
        source: &SourceVideo,
        sensitivity: Sensitivity,
    ) -> DomainResult<Vec<KeyMoment>> {
        TimestampSampler::sample(source.duration, sensitivity)
    }

    /// Run the pipeline on a probed source.
    ///
    /// On failure or cancellation every blob created by the run is released
    /// and no partial clip is returned. Progress events end when this returns.
    pub async fn run(
        &self,
        source: &SourceVideo,
        settings: &HighlightSettings,
        progress: ProgressEmitter,
        cancel: CancellationToken,
    ) -> DomainResult<HighlightReport> {
        let started = Instant::now();
        let segment_length = settings.segment_length.as_secs_f64().min(source.duration);
        let policy = AssemblyPolicy::new(settings.bounds, segment_length, source.mime_type.clone())?;

        let mut ctx = PipelineContext {
            source,
            settings,
            policy,
            moments: Vec::new(),
            segments: Vec::new(),
            skipped: Vec::new(),
            progress,
            step: 0,
            cancel,
        };

        let span = info_span!("highlight", source = %source.path.display());
        let result = self.execute(&mut ctx).instrument(span).await;

        match result {
            Ok(clip) => {
                let processing_time = started.elapsed();
                info!(
                    segments = ctx.segments.len(),
                    total_duration = clip.total_duration,
                    elapsed_ms = processing_time.as_millis() as u64,
                    "Highlight run completed"
                );
                Ok(HighlightReport {
                    source: source.clone(),
                    moments: ctx.moments,
                    segments: ctx.segments,
                    clip,
                    skipped: ctx.skipped,
                    processing_time,
                })
            }
            Err(e) => {
                let released = self
                    .registry
                    .release_all(ctx.segments.iter().map(|segment| &segment.url));
                if e.is_cancellation() {
                    info!(released, "Highlight run cancelled");
                } else {
                    error!(error = %e, released, "Highlight run failed");
                }
                Err(e)
            }
        }
    }

    async fn execute(&self, ctx: &mut PipelineContext<'_>) -> DomainResult<FinalClip> {
        ctx.ensure_not_cancelled()?;

        ctx.moments = TimestampSampler::sample(ctx.source.duration, ctx.settings.sensitivity)?;
        ctx.progress
            .set_total_steps(ProgressReporter::total_steps(ctx.moments.len()));
        info!(moments = ctx.moments.len(), "Key moments sampled");
        ctx.advance(format!("Found {} key moments", ctx.moments.len()));

        let extractor = SegmentExtractor::new(Arc::clone(&self.playback_port), self.registry.clone())
            .with_options(ctx.settings.capture.clone());

        let moments = ctx.moments.clone();
        for moment in &moments {
            ctx.ensure_not_cancelled()?;
            let (start, length) = moment.centred_window(ctx.policy.segment_length, ctx.source.duration);

            let span = info_span!("segment", index = moment.index, moment = moment.timestamp);
            let extracted = extractor
                .extract(ctx.source, moment.index, start, length, &ctx.cancel)
                .instrument(span)
                .await;

            match extracted {
                Ok(segment) => {
                    let label = segment.preview_label();
                    ctx.segments.push(segment);
                    ctx.advance(format!("Extracted segment {}", label));
                }
                Err(e) if Self::is_skippable(&e, ctx.settings.failure_policy) => {
                    warn!(index = moment.index, error = %e, "Skipping segment");
                    ctx.skipped.push(moment.index);
                    ctx.advance(format!("Skipped segment {}", moment.index + 1));
                }
                Err(e) => return Err(e),
            }
        }

        ctx.ensure_not_cancelled()?;
        let file_name = suggested_file_name(
            &ctx.settings.output_prefix,
            ctx.source,
            &ctx.source.mime_type,
        );
        let assembler = ClipAssembler::new(self.registry.clone());
        let clip = assembler.assemble(&ctx.segments, &ctx.policy, file_name)?;
        if clip.is_empty() {
            warn!("No segments were extracted, the clip is empty");
        }

        if let Err(e) = ctx.ensure_not_cancelled() {
            if let Some(url) = &clip.url {
                self.registry.release(url);
            }
            return Err(e);
        }

        ctx.advance(format!("Compiled {}", clip.file_name));
        Ok(clip)
    }

    fn is_skippable(error: &DomainError, policy: FailurePolicy) -> bool {
        policy == FailurePolicy::SkipSegment
            && matches!(
                error,
                DomainError::MediaDecode(_) | DomainError::EmptyCapture { .. }
            )
    }
}
