// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Smallest accepted base segment length in seconds
pub const MIN_SEGMENT_LENGTH: u32 = 5;
/// Largest accepted base segment length in seconds
pub const MAX_SEGMENT_LENGTH: u32 = 60;
/// Default lower bound of the final clip duration
pub const DEFAULT_MIN_TOTAL: f64 = 60.0;
/// Default upper bound of the final clip duration
pub const DEFAULT_MAX_TOTAL: f64 = 180.0;

/// Time specification - represents time in seconds with fractional precision
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Convert to Duration, saturating negative values to zero
    pub fn to_duration(&self) -> Duration {
        Duration::from_secs_f64(self.seconds.max(0.0))
    }

    /// Convert from Duration
    pub fn from_duration(duration: Duration) -> Self {
        Self {
            seconds: duration.as_secs_f64(),
        }
    }

    /// Format as MM:SS, the way segment previews show start and duration
    pub fn format_mmss(&self) -> String {
        let total = self.seconds.max(0.0).floor() as u64;
        format!("{:02}:{:02}", total / 60, total % 60)
    }

    /// Format as HH:MM:SS.ms
    pub fn format_hms(&self) -> String {
        let seconds = self.seconds.max(0.0);
        let hours = (seconds / 3600.0) as u32;
        let minutes = ((seconds % 3600.0) / 60.0) as u32;
        let secs = (seconds % 60.0) as u32;
        let milliseconds = ((seconds % 1.0) * 1000.0) as u32;

        if hours > 0 {
            format!("{}:{:02}:{:02}.{:03}", hours, minutes, secs, milliseconds)
        } else {
            format!("{:02}:{:02}.{:03}", minutes, secs, milliseconds)
        }
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_mmss())
    }
}

/// Containers the capture path can write as a byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Mp4,
    Mov,
    Matroska,
    WebM,
    MpegTs,
}

impl ContainerFormat {
    /// Resolve a container from a mime type
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
        match essence.as_str() {
            "video/mp4" => Some(Self::Mp4),
            "video/quicktime" => Some(Self::Mov),
            "video/x-matroska" => Some(Self::Matroska),
            "video/webm" => Some(Self::WebM),
            "video/mp2t" => Some(Self::MpegTs),
            _ => None,
        }
    }

    /// Resolve a container from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp4" | "m4v" => Some(Self::Mp4),
            "mov" => Some(Self::Mov),
            "mkv" => Some(Self::Matroska),
            "webm" => Some(Self::WebM),
            "ts" | "mts" | "m2ts" => Some(Self::MpegTs),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Mov => "video/quicktime",
            Self::Matroska => "video/x-matroska",
            Self::WebM => "video/webm",
            Self::MpegTs => "video/mp2t",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mov => "mov",
            Self::Matroska => "mkv",
            Self::WebM => "webm",
            Self::MpegTs => "ts",
        }
    }

    /// Name of the libav muxer used to write this container
    pub fn muxer(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mov => "mov",
            Self::Matroska => "matroska",
            Self::WebM => "webm",
            Self::MpegTs => "mpegts",
        }
    }

    /// ISO-BMFF containers need fragmenting before they can be streamed
    pub fn needs_fragmenting(&self) -> bool {
        matches!(self, Self::Mp4 | Self::Mov)
    }
}

/// Probed source video, exclusively owned by one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct SourceVideo {
    pub path: PathBuf,
    pub duration: f64,
    pub mime_type: String,
}

impl SourceVideo {
    /// Create new source video with validation
    pub fn new(
        path: impl Into<PathBuf>,
        duration: f64,
        mime_type: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "Source duration must be positive, got {}",
                duration
            )));
        }
        let mime_type = mime_type.into();
        if !mime_type.starts_with("video/") {
            return Err(DomainError::InvalidInput(format!(
                "Source is not a video: {}",
                mime_type
            )));
        }

        Ok(Self {
            path: path.into(),
            duration,
            mime_type,
        })
    }

    /// File name without directory and extension
    pub fn base_name(&self) -> String {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or("video")
            .to_string()
    }

    pub fn container(&self) -> Option<ContainerFormat> {
        ContainerFormat::from_mime(&self.mime_type)
    }
}

/// Key moment detection sensitivity (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Sensitivity(u8);

impl Sensitivity {
    pub const MAX: u8 = 100;

    /// Strict constructor: values above 100 are rejected
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if !(0..=Self::MAX as i64).contains(&value) {
            return Err(DomainError::InvalidInput(format!(
                "Sensitivity must be between 0 and 100, got {}",
                value
            )));
        }
        Ok(Self(value as u8))
    }

    /// Lenient constructor for front ends that clamp slider values
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, Self::MAX as i64) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn as_fraction(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self(70)
    }
}

/// Base segment length in whole seconds (5-60)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SegmentLength(u32);

impl SegmentLength {
    pub fn new(seconds: i64) -> Result<Self, DomainError> {
        if !(MIN_SEGMENT_LENGTH as i64..=MAX_SEGMENT_LENGTH as i64).contains(&seconds) {
            return Err(DomainError::InvalidInput(format!(
                "Segment length must be between {} and {} seconds, got {}",
                MIN_SEGMENT_LENGTH, MAX_SEGMENT_LENGTH, seconds
            )));
        }
        Ok(Self(seconds as u32))
    }

    pub fn clamped(seconds: i64) -> Self {
        Self(seconds.clamp(MIN_SEGMENT_LENGTH as i64, MAX_SEGMENT_LENGTH as i64) as u32)
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64
    }
}

impl Default for SegmentLength {
    fn default() -> Self {
        Self(30)
    }
}

/// Acceptable total duration window of the final clip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationBounds {
    pub min_total: f64,
    pub max_total: f64,
}

impl DurationBounds {
    pub fn new(min_total: f64, max_total: f64) -> Result<Self, DomainError> {
        if !min_total.is_finite() || !max_total.is_finite() || min_total <= 0.0 {
            return Err(DomainError::InvalidInput(
                "Duration bounds must be positive".to_string(),
            ));
        }
        if min_total > max_total {
            return Err(DomainError::InvalidInput(format!(
                "Minimum total ({}s) exceeds maximum total ({}s)",
                min_total, max_total
            )));
        }
        Ok(Self {
            min_total,
            max_total,
        })
    }

    pub fn contains(&self, total: f64) -> bool {
        total >= self.min_total && total <= self.max_total
    }
}

impl Default for DurationBounds {
    fn default() -> Self {
        Self {
            min_total: DEFAULT_MIN_TOTAL,
            max_total: DEFAULT_MAX_TOTAL,
        }
    }
}

/// What the pipeline does when a single segment fails to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Any segment failure aborts the whole run
    #[default]
    Abort,
    /// Drop the failed segment and keep going
    SkipSegment,
}

/// Candidate highlight centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyMoment {
    pub index: usize,
    pub timestamp: f64,
}

impl KeyMoment {
    /// Window of `length` seconds centred on the moment, kept inside the source
    pub fn centred_window(&self, length: f64, source_duration: f64) -> (f64, f64) {
        let length = length.min(source_duration);
        let latest_start = (source_duration - length).max(0.0);
        let start = (self.timestamp - length / 2.0).clamp(0.0, latest_start);
        (start, length)
    }
}

/// Object-URL style handle for a live blob
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobUrl(pub String);

impl fmt::Display for BlobUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// In-memory media payload tagged with its mime type
#[derive(Debug, Clone, PartialEq)]
pub struct MediaBlob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl MediaBlob {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Join timed capture chunks in arrival order
    pub fn from_chunks(chunks: Vec<CaptureChunk>, mime_type: impl Into<String>) -> Self {
        let size = chunks.iter().map(|chunk| chunk.data.len()).sum();
        let mut bytes = Vec::with_capacity(size);
        for chunk in chunks {
            bytes.extend_from_slice(&chunk.data);
        }
        Self::new(bytes, mime_type)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One timed piece of recorder output
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureChunk {
    /// Wall-clock offset from the start of the capture session
    pub offset: Duration,
    pub data: Vec<u8>,
}

/// Media excerpt captured around a key moment
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSegment {
    pub index: usize,
    pub blob: MediaBlob,
    pub url: BlobUrl,
    /// Position in the source where playback actually began
    pub start: f64,
    /// Requested length after clamping to the source
    pub nominal_duration: f64,
    /// Wall-clock length of the capture, clamped to the source end
    pub captured_duration: f64,
}

impl ExtractedSegment {
    pub fn end(&self) -> f64 {
        self.start + self.captured_duration
    }

    pub fn mime_type(&self) -> &str {
        &self.blob.mime_type
    }

    /// Preview line such as `01:05 (00:30)`
    pub fn preview_label(&self) -> String {
        format!(
            "{} ({})",
            TimeSpec::from_seconds(self.start).format_mmss(),
            TimeSpec::from_seconds(self.captured_duration).format_mmss()
        )
    }
}

/// Assembled deliverable
#[derive(Debug, Clone, PartialEq)]
pub struct FinalClip {
    pub blob: MediaBlob,
    pub url: Option<BlobUrl>,
    pub file_name: String,
    pub total_duration: f64,
    /// Segment indices in concatenation order, repeats included
    pub sequence: Vec<usize>,
}

impl FinalClip {
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Build `<prefix>_<originalBaseName>.<ext>`
pub fn suggested_file_name(prefix: &str, source: &SourceVideo, mime_type: &str) -> String {
    let ext = ContainerFormat::from_mime(mime_type)
        .map(|format| format.extension().to_string())
        .or_else(|| {
            source
                .path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_lowercase())
        })
        .unwrap_or_else(|| "mp4".to_string());
    format!("{}_{}.{}", prefix, source.base_name(), ext)
}

/// Guess the mime type of a file from its extension
pub fn mime_from_path(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ContainerFormat::from_extension)
        .map(|format| format.mime_type())
}

#[cfg(test)]
mod tests;
