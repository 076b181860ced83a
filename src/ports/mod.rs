// Ports - Interface definitions (contracts)

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for source metadata probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Read duration and mime type; fails with `MediaDecode` on unusable files
    async fn probe_source(&self, file_path: &Path) -> Result<SourceVideo, DomainError>;
}

/// Options for a playback+capture session
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOptions {
    /// Playback runs without audible output
    pub muted: bool,
    /// How often the recorder hands over a chunk
    pub timeslice: Duration,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            muted: true,
            timeslice: Duration::from_millis(1000),
        }
    }
}

/// Port for real-time playback of a source with its output recorded
#[async_trait]
pub trait PlaybackPort: Send + Sync {
    /// Position playback at `start` and begin recording.
    ///
    /// Failing to start playback is a `MediaDecode` error.
    async fn start_capture(
        &self,
        source: &SourceVideo,
        start: f64,
        options: &CaptureOptions,
    ) -> Result<Box<dyn CaptureSession>, DomainError>;
}

/// A running recorder fed by live playback
#[async_trait]
pub trait CaptureSession: Send {
    /// Source position where playback actually began
    fn actual_start(&self) -> f64;

    /// Wait for the next recorded chunk. `None` once the recorder has nothing
    /// more to hand over, e.g. playback reached the end of the source.
    async fn next_chunk(&mut self) -> Option<Result<CaptureChunk, DomainError>>;

    /// Stop playback and recording, returning any chunks still buffered
    async fn stop(self: Box<Self>) -> Result<Vec<CaptureChunk>, DomainError>;

    /// Tear down without collecting output
    async fn abort(self: Box<Self>);
}

/// Hook notified whenever a blob resource is released
pub trait ReleaseHook: Send + Sync {
    fn on_release(&self, url: &BlobUrl);
}
