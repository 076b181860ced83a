//! Core highlight engine: capture, assembly, progress and blob lifetime

pub mod assembler;
pub mod extractor;
pub mod progress;
pub mod registry;

pub use assembler::ClipAssembler;
pub use extractor::{CaptureWindow, SegmentExtractor};
pub use progress::{
    progress_channel, ProgressEmitter, ProgressEvent, ProgressPhase, ProgressReporter,
    ProgressStream,
};
pub use registry::BlobRegistry;
