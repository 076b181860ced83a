//! Integration tests for segment extraction and clip assembly

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use common::{source, ScriptedPlayback, MP4};
use cortefacil::domain::errors::DomainError;
use cortefacil::domain::model::{BlobUrl, DurationBounds, ExtractedSegment, MediaBlob};
use cortefacil::domain::rules::AssemblyPolicy;
use cortefacil::engine::{BlobRegistry, ClipAssembler, SegmentExtractor};
use cortefacil::ports::CaptureOptions;

fn extractor(playback: Arc<ScriptedPlayback>, registry: &BlobRegistry) -> SegmentExtractor {
    SegmentExtractor::new(playback, registry.clone())
}

fn segment(index: usize, bytes: &[u8], mime_type: &str) -> ExtractedSegment {
    ExtractedSegment {
        index,
        blob: MediaBlob::new(bytes.to_vec(), mime_type),
        url: BlobUrl(format!("blob:test/{}", index)),
        start: index as f64 * 10.0,
        nominal_duration: 10.0,
        captured_duration: 10.0,
    }
}

fn policy(segment_length: f64) -> AssemblyPolicy {
    AssemblyPolicy::new(DurationBounds::default(), segment_length, MP4).unwrap()
}

// Segment extractor

#[tokio::test(start_paused = true)]
async fn test_extract_records_for_the_requested_length() {
    let playback = Arc::new(ScriptedPlayback::new());
    let registry = BlobRegistry::new();
    let source = source(50.0);

    let segment = extractor(playback.clone(), &registry)
        .extract(&source, 0, 20.0, 10.0, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(segment.index, 0);
    assert_eq!(segment.start, 20.0);
    assert_eq!(segment.nominal_duration, 10.0);
    assert!((segment.captured_duration - 10.0).abs() < 1e-6);
    assert_eq!(segment.mime_type(), MP4);
    assert!(!segment.blob.is_empty());
    assert!(registry.is_live(&segment.url));
    assert_eq!(playback.starts(), vec![20.0]);
}

#[tokio::test(start_paused = true)]
async fn test_extract_clamps_window_to_source_end() {
    let playback = Arc::new(ScriptedPlayback::new());
    let registry = BlobRegistry::new();
    let source = source(50.0);

    let segment = extractor(playback, &registry)
        .extract(&source, 3, 45.0, 10.0, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(segment.start, 45.0);
    assert_eq!(segment.nominal_duration, 5.0);
    assert!(segment.end() <= source.duration + 1e-9);
}

#[tokio::test(start_paused = true)]
async fn test_playback_ending_early_stops_capture() {
    let playback = Arc::new(ScriptedPlayback::new());
    let registry = BlobRegistry::new();
    let source = source(12.0);

    // Window is clamped to 8s, the double runs out after 8 timeslices
    let segment = extractor(playback, &registry)
        .extract(&source, 0, 4.0, 30.0, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(segment.nominal_duration, 8.0);
    assert!(segment.captured_duration <= 8.0 + 1e-6);
}

#[tokio::test(start_paused = true)]
async fn test_start_failure_is_media_decode() {
    let playback = Arc::new(ScriptedPlayback::new().failing_on(0));
    let registry = BlobRegistry::new();

    let result = extractor(playback, &registry)
        .extract(&source(50.0), 0, 10.0, 10.0, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(DomainError::MediaDecode(_))));
    assert_eq!(registry.live_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_empty_capture_is_reported() {
    let playback = Arc::new(ScriptedPlayback::new().empty_on(0));
    let registry = BlobRegistry::new();

    let result = extractor(playback, &registry)
        .extract(&source(50.0), 0, 10.0, 5.0, &CancellationToken::new())
        .await;

    assert_eq!(result, Err(DomainError::EmptyCapture { start: 10.0 }));
    assert_eq!(registry.registered_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_capture_aborts_session() {
    let playback = Arc::new(ScriptedPlayback::new());
    let registry = BlobRegistry::new();
    let cancel = CancellationToken::new();

    let trigger = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(3500)).await;
            cancel.cancel();
        })
    };

    let result = extractor(playback.clone(), &registry)
        .extract(&source(50.0), 0, 0.0, 10.0, &cancel)
        .await;
    trigger.await.unwrap();

    assert_eq!(result, Err(DomainError::CancelledByUser));
    assert_eq!(playback.aborted(), 1);
    assert_eq!(registry.live_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_already_cancelled_never_starts_playback() {
    let playback = Arc::new(ScriptedPlayback::new());
    let registry = BlobRegistry::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = extractor(playback.clone(), &registry)
        .extract(&source(50.0), 0, 0.0, 10.0, &cancel)
        .await;

    assert_eq!(result, Err(DomainError::CancelledByUser));
    assert_eq!(playback.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_timeslice_controls_chunking() {
    let playback = Arc::new(ScriptedPlayback::new());
    let registry = BlobRegistry::new();
    let options = CaptureOptions {
        muted: true,
        timeslice: Duration::from_millis(250),
    };

    let segment = extractor(playback, &registry)
        .with_options(options)
        .extract(&source(50.0), 0, 0.0, 2.0, &CancellationToken::new())
        .await
        .unwrap();

    // 7 chunks before the 2s deadline wins the tie, plus the stop flush
    assert_eq!(segment.blob.len(), 7 * 4 + 1);
}

// Clip assembler

#[test]
fn test_assembler_repeats_short_sequences() {
    let registry = BlobRegistry::new();
    let assembler = ClipAssembler::new(registry.clone());
    let segments = vec![segment(0, b"ab", MP4), segment(1, b"cd", MP4)];

    let clip = assembler
        .assemble(&segments, &policy(10.0), "processed_talk.mp4")
        .unwrap();

    assert_eq!(clip.sequence, vec![0, 1, 0, 1, 0, 1]);
    assert_eq!(clip.total_duration, 60.0);
    assert_eq!(clip.blob.bytes, b"abcdabcdabcd".to_vec());
    assert_eq!(clip.blob.mime_type, MP4);
    assert_eq!(clip.file_name, "processed_talk.mp4");
    assert!(registry.is_live(clip.url.as_ref().unwrap()));
}

#[test]
fn test_assembler_truncates_long_sequences() {
    let assembler = ClipAssembler::new(BlobRegistry::new());
    let segments: Vec<_> = (0..8).map(|i| segment(i, &[i as u8], MP4)).collect();

    let clip = assembler.assemble(&segments, &policy(30.0), "clip.mp4").unwrap();

    assert_eq!(clip.sequence, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(clip.total_duration, 180.0);
    assert_eq!(clip.blob.bytes, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_assembler_keeps_original_indices() {
    let assembler = ClipAssembler::new(BlobRegistry::new());
    // Segment 1 was skipped upstream
    let segments = vec![segment(0, b"a", MP4), segment(2, b"c", MP4)];

    let clip = assembler.assemble(&segments, &policy(30.0), "clip.mp4").unwrap();
    assert_eq!(clip.sequence, vec![0, 2]);
    assert_eq!(clip.total_duration, 60.0);
}

#[test]
fn test_assembler_rejects_mixed_formats() {
    let registry = BlobRegistry::new();
    let assembler = ClipAssembler::new(registry.clone());
    let segments = vec![segment(0, b"a", MP4), segment(1, b"b", "video/webm")];

    let result = assembler.assemble(&segments, &policy(30.0), "clip.mp4");

    assert_eq!(
        result,
        Err(DomainError::FormatMismatch {
            expected: MP4.to_string(),
            found: "video/webm".to_string(),
        })
    );
    assert_eq!(registry.registered_count(), 0);
}

#[test]
fn test_assembler_with_no_segments() {
    let registry = BlobRegistry::new();
    let clip = ClipAssembler::new(registry.clone())
        .assemble(&[], &policy(30.0), "clip.mp4")
        .unwrap();

    assert!(clip.is_empty());
    assert!(clip.url.is_none());
    assert_eq!(clip.total_duration, 0.0);
    assert_eq!(registry.live_count(), 0);
}
