// Probe LibAV adapter - Source metadata using libav

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ffmpeg_next::media;
use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// LibAV-based source probing adapter
pub struct ProbeLibavAdapter;

impl ProbeLibavAdapter {
    /// Create new LibAV probing adapter
    pub fn new() -> Result<Self, DomainError> {
        ffmpeg_next::init()
            .map_err(|e| DomainError::MediaDecode(format!("FFmpeg initialization failed: {}", e)))?;
        Ok(Self)
    }

    /// Map a libav demuxer name list such as `mov,mp4,m4a` to a mime type
    fn mime_from_format_name(name: &str) -> Option<&'static str> {
        name.split(',')
            .map(str::trim)
            .find_map(|candidate| match candidate {
                "mp4" => Some(ContainerFormat::Mp4),
                "mov" => Some(ContainerFormat::Mov),
                "webm" => Some(ContainerFormat::WebM),
                "matroska" => Some(ContainerFormat::Matroska),
                "mpegts" => Some(ContainerFormat::MpegTs),
                _ => None,
            })
            .map(|format| format.mime_type())
    }

    fn probe_blocking(path: &Path) -> Result<SourceVideo, DomainError> {
        let ictx = ffmpeg_next::format::input(path).map_err(|e| {
            DomainError::MediaDecode(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let stream = ictx
            .streams()
            .best(media::Type::Video)
            .ok_or_else(|| DomainError::MediaDecode("No video stream found".to_string()))?;

        let codec_id = stream.parameters().id();
        if ffmpeg_next::codec::decoder::find(codec_id).is_none() {
            return Err(DomainError::MediaDecode(format!(
                "No decoder available for codec {:?}",
                codec_id
            )));
        }

        let container_duration = ictx.duration();
        let duration = if container_duration > 0 {
            container_duration as f64 / ffmpeg_next::ffi::AV_TIME_BASE as f64
        } else {
            stream.duration() as f64 * f64::from(stream.time_base())
        };

        let mime_type = mime_from_path(path)
            .or_else(|| Self::mime_from_format_name(ictx.format().name()))
            .ok_or_else(|| {
                DomainError::MediaDecode(format!(
                    "Unsupported container: {}",
                    ictx.format().name()
                ))
            })?;

        debug!(
            format = ictx.format().name(),
            codec = ?codec_id,
            duration,
            "Probed container"
        );

        SourceVideo::new(path, duration, mime_type).map_err(|e| match e {
            DomainError::InvalidInput(msg) => DomainError::MediaDecode(msg),
            other => other,
        })
    }
}

#[async_trait]
impl ProbePort for ProbeLibavAdapter {
    async fn probe_source(&self, file_path: &Path) -> Result<SourceVideo, DomainError> {
        if !file_path.exists() {
            return Err(DomainError::MediaDecode(format!(
                "File does not exist: {}",
                file_path.display()
            )));
        }

        let path: PathBuf = file_path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::probe_blocking(&path))
            .await
            .map_err(|e| DomainError::MediaDecode(format!("Probe task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_format_name() {
        assert_eq!(
            ProbeLibavAdapter::mime_from_format_name("mov,mp4,m4a,3gp,3g2,mj2"),
            Some("video/quicktime")
        );
        assert_eq!(
            ProbeLibavAdapter::mime_from_format_name("matroska,webm"),
            Some("video/x-matroska")
        );
        assert_eq!(ProbeLibavAdapter::mime_from_format_name("mpegts"), Some("video/mp2t"));
        assert_eq!(ProbeLibavAdapter::mime_from_format_name("avi"), None);
    }
}
