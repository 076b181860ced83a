// Unit tests for domain models

use super::*;

fn source(path: &str, duration: f64) -> SourceVideo {
    SourceVideo::new(path, duration, "video/mp4").unwrap()
}

#[test]
fn test_time_spec_format_mmss() {
    assert_eq!(TimeSpec::from_seconds(0.0).format_mmss(), "00:00");
    assert_eq!(TimeSpec::from_seconds(65.9).format_mmss(), "01:05");
    assert_eq!(TimeSpec::from_seconds(3600.0).format_mmss(), "60:00");
    assert_eq!(format!("{}", TimeSpec::from_seconds(125.0)), "02:05");
}

#[test]
fn test_time_spec_format_hms() {
    assert_eq!(TimeSpec::from_seconds(3723.5).format_hms(), "1:02:03.500");
    assert_eq!(TimeSpec::from_seconds(123.25).format_hms(), "02:03.250");
}

#[test]
fn test_time_spec_duration_conversion() {
    let time = TimeSpec::from_duration(Duration::from_millis(1500));
    assert_eq!(time.seconds, 1.5);
    assert_eq!(TimeSpec::from_seconds(-2.0).to_duration(), Duration::ZERO);
}

#[test]
fn test_source_video_rejects_degenerate_duration() {
    assert!(matches!(
        SourceVideo::new("a.mp4", 0.0, "video/mp4"),
        Err(DomainError::InvalidInput(_))
    ));
    assert!(SourceVideo::new("a.mp4", -3.0, "video/mp4").is_err());
    assert!(SourceVideo::new("a.mp4", f64::NAN, "video/mp4").is_err());
}

#[test]
fn test_source_video_rejects_non_video_mime() {
    assert!(SourceVideo::new("a.mp3", 10.0, "audio/mpeg").is_err());
}

#[test]
fn test_source_video_base_name() {
    assert_eq!(source("/videos/match day.mp4", 10.0).base_name(), "match day");
    assert_eq!(source("clip", 10.0).base_name(), "clip");
}

#[test]
fn test_sensitivity_validation() {
    assert_eq!(Sensitivity::new(0).unwrap().value(), 0);
    assert_eq!(Sensitivity::new(100).unwrap().value(), 100);
    assert!(Sensitivity::new(101).is_err());
    assert!(Sensitivity::new(-1).is_err());
    assert_eq!(Sensitivity::clamped(250).value(), 100);
    assert_eq!(Sensitivity::clamped(-4).value(), 0);
    assert_eq!(Sensitivity::default().value(), 70);
}

#[test]
fn test_segment_length_validation() {
    assert_eq!(SegmentLength::new(5).unwrap().seconds(), 5);
    assert_eq!(SegmentLength::new(60).unwrap().seconds(), 60);
    assert!(SegmentLength::new(4).is_err());
    assert!(SegmentLength::new(61).is_err());
    assert_eq!(SegmentLength::clamped(1).seconds(), 5);
    assert_eq!(SegmentLength::clamped(90).seconds(), 60);
    assert_eq!(SegmentLength::default().seconds(), 30);
}

#[test]
fn test_duration_bounds() {
    let bounds = DurationBounds::default();
    assert!(bounds.contains(60.0));
    assert!(bounds.contains(180.0));
    assert!(!bounds.contains(59.9));
    assert!(DurationBounds::new(200.0, 100.0).is_err());
    assert!(DurationBounds::new(0.0, 100.0).is_err());
}

#[test]
fn test_centred_window_is_clamped_to_source() {
    let moment = KeyMoment {
        index: 0,
        timestamp: 25.0,
    };
    assert_eq!(moment.centred_window(10.0, 50.0), (20.0, 10.0));

    let near_end = KeyMoment {
        index: 1,
        timestamp: 48.0,
    };
    assert_eq!(near_end.centred_window(10.0, 50.0), (40.0, 10.0));

    let near_start = KeyMoment {
        index: 2,
        timestamp: 1.0,
    };
    assert_eq!(near_start.centred_window(10.0, 50.0), (0.0, 10.0));

    // Source shorter than the requested length
    assert_eq!(near_start.centred_window(10.0, 4.0), (0.0, 4.0));
}

#[test]
fn test_container_format_lookup() {
    assert_eq!(ContainerFormat::from_mime("video/mp4"), Some(ContainerFormat::Mp4));
    assert_eq!(
        ContainerFormat::from_mime("video/webm; codecs=vp9"),
        Some(ContainerFormat::WebM)
    );
    assert_eq!(ContainerFormat::from_mime("video/avi"), None);
    assert_eq!(ContainerFormat::from_extension("MKV"), Some(ContainerFormat::Matroska));
    assert!(ContainerFormat::Mp4.needs_fragmenting());
    assert!(!ContainerFormat::MpegTs.needs_fragmenting());
}

#[test]
fn test_suggested_file_name() {
    let video = source("/home/me/gameplay.final.mp4", 30.0);
    assert_eq!(
        suggested_file_name("processed", &video, "video/mp4"),
        "processed_gameplay.final.mp4"
    );

    let ts = SourceVideo::new("stream.m2ts", 30.0, "video/mp2t").unwrap();
    assert_eq!(suggested_file_name("best", &ts, "video/mp2t"), "best_stream.ts");
}

#[test]
fn test_blob_from_chunks_preserves_order() {
    let chunks = vec![
        CaptureChunk {
            offset: Duration::from_secs(1),
            data: vec![1, 2],
        },
        CaptureChunk {
            offset: Duration::from_secs(2),
            data: vec![3],
        },
    ];
    let blob = MediaBlob::from_chunks(chunks, "video/mp4");
    assert_eq!(blob.bytes, vec![1, 2, 3]);
    assert_eq!(blob.len(), 3);
    assert!(!blob.is_empty());
}

#[test]
fn test_segment_preview_label() {
    let segment = ExtractedSegment {
        index: 0,
        blob: MediaBlob::new(vec![0], "video/mp4"),
        url: BlobUrl("blob:test".to_string()),
        start: 65.0,
        nominal_duration: 30.0,
        captured_duration: 30.2,
    };
    assert_eq!(segment.preview_label(), "01:05 (00:30)");
    assert!((segment.end() - 95.2).abs() < 1e-9);
}

#[test]
fn test_mime_from_path() {
    assert_eq!(mime_from_path(Path::new("a.MOV")), Some("video/quicktime"));
    assert_eq!(mime_from_path(Path::new("a.txt")), None);
}
