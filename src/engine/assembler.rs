//! Final clip assembly

use tracing::{debug, info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::{ExtractedSegment, FinalClip, MediaBlob};
use crate::domain::rules::{AssemblyPlanner, AssemblyPolicy};
use crate::engine::registry::BlobRegistry;

/// Concatenates extracted segments into the deliverable clip
pub struct ClipAssembler {
    registry: BlobRegistry,
}

impl ClipAssembler {
    pub fn new(registry: BlobRegistry) -> Self {
        Self { registry }
    }

    /// Select, repeat or trim segments so the total fits the policy window,
    /// then join their payloads in sequence order
    pub fn assemble(
        &self,
        segments: &[ExtractedSegment],
        policy: &AssemblyPolicy,
        file_name: impl Into<String>,
    ) -> DomainResult<FinalClip> {
        if let Some(odd) = segments
            .iter()
            .find(|segment| segment.mime_type() != policy.mime_type)
        {
            return Err(DomainError::FormatMismatch {
                expected: policy.mime_type.clone(),
                found: odd.mime_type().to_string(),
            });
        }

        let file_name = file_name.into();
        if segments.is_empty() {
            warn!("No segments to assemble, producing an empty clip");
            return Ok(FinalClip {
                blob: MediaBlob::new(Vec::new(), policy.mime_type.clone()),
                url: None,
                file_name,
                total_duration: 0.0,
                sequence: Vec::new(),
            });
        }

        let sequence = AssemblyPlanner::plan(segments.len(), policy);
        let total_duration = AssemblyPlanner::planned_duration(&sequence, policy);
        debug!(
            segments = segments.len(),
            entries = sequence.len(),
            total_duration,
            "Assembly planned"
        );

        let size = sequence
            .iter()
            .map(|&position| segments[position].blob.len())
            .sum();
        let mut bytes = Vec::with_capacity(size);
        for &position in &sequence {
            bytes.extend_from_slice(&segments[position].blob.bytes);
        }

        let blob = MediaBlob::new(bytes, policy.mime_type.clone());
        let url = self.registry.register(&blob);
        info!(
            file_name = %file_name,
            total_duration,
            bytes = blob.len(),
            "Final clip assembled"
        );

        Ok(FinalClip {
            blob,
            url: Some(url),
            file_name,
            total_duration,
            sequence: sequence
                .into_iter()
                .map(|position| segments[position].index)
                .collect(),
        })
    }
}
