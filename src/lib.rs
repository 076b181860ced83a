//! CorteFácil highlight reel library
//!
//! Samples key moments across a video, records a short segment around each
//! moment by live playback, and compiles the segments into one clip whose
//! total length falls between one and three minutes.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{HighlightInteractor, HighlightReport, HighlightSession, HighlightSettings};
pub use domain::errors::{DomainError, DomainResult};
pub use domain::model::{ExtractedSegment, FinalClip, KeyMoment, SourceVideo};
pub use engine::{BlobRegistry, ProgressEvent, ProgressStream};

/// Initialize the media backend
pub fn init() -> DomainResult<()> {
    ffmpeg_next::init()
        .map_err(|e| DomainError::MediaDecode(format!("FFmpeg initialization failed: {}", e)))?;
    Ok(())
}
