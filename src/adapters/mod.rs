// Adapters - External system implementations

pub mod playback_libav;
pub mod probe_libav;
pub mod toml_config;

// Re-export adapters
pub use playback_libav::{LibavCaptureSession, LibavPlaybackAdapter};
pub use probe_libav::ProbeLibavAdapter;
pub use toml_config::HighlightConfig;
