// Domain rules - Sampling and assembly policies

use crate::domain::errors::*;
use crate::domain::model::*;

/// Tolerance for float rounding in step arithmetic
const EPSILON: f64 = 1e-9;

/// Evenly spaced key moment sampling
pub struct TimestampSampler;

impl TimestampSampler {
    /// Number of moments for a duration and sensitivity, always at least one
    pub fn moment_count(duration: f64, sensitivity: Sensitivity) -> usize {
        (sensitivity.as_fraction() * (duration / 60.0)).floor() as usize + 1
    }

    /// Sample strictly increasing timestamps inside (0, duration)
    pub fn sample(duration: f64, sensitivity: Sensitivity) -> Result<Vec<KeyMoment>, DomainError> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "Cannot sample a timeline of {} seconds",
                duration
            )));
        }

        let count = Self::moment_count(duration, sensitivity);
        let interval = duration / (count + 1) as f64;

        let moments = (1..=count)
            .map(|i| i as f64 * interval)
            .filter(|timestamp| *timestamp < duration)
            .enumerate()
            .map(|(index, timestamp)| KeyMoment { index, timestamp })
            .collect();

        Ok(moments)
    }
}

/// Assembly parameters shared by every segment of a run
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyPolicy {
    pub bounds: DurationBounds,
    /// Nominal per-segment duration used for all threshold arithmetic
    pub segment_length: f64,
    /// Mime type every segment must carry
    pub mime_type: String,
}

impl AssemblyPolicy {
    pub fn new(
        bounds: DurationBounds,
        segment_length: f64,
        mime_type: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if !segment_length.is_finite() || segment_length <= 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "Segment length must be positive, got {}",
                segment_length
            )));
        }
        if bounds.max_total + EPSILON < segment_length {
            return Err(DomainError::InvalidInput(format!(
                "Maximum total ({}s) is shorter than one segment ({}s)",
                bounds.max_total, segment_length
            )));
        }
        // A whole number of segments must fit between min and max
        if bounds.max_total - bounds.min_total + EPSILON < segment_length {
            return Err(DomainError::InvalidInput(format!(
                "Duration window {}s-{}s is narrower than one segment ({}s)",
                bounds.min_total, bounds.max_total, segment_length
            )));
        }

        Ok(Self {
            bounds,
            segment_length,
            mime_type: mime_type.into(),
        })
    }
}

/// Chooses which segments make up the final clip, and in what order
pub struct AssemblyPlanner;

impl AssemblyPlanner {
    /// Plan segment indices for `count` segments of equal nominal length.
    ///
    /// Short sequences are cycled end-to-end until they reach the minimum,
    /// long ones keep only their leading entries.
    pub fn plan(count: usize, policy: &AssemblyPolicy) -> Vec<usize> {
        if count == 0 {
            return Vec::new();
        }

        let length = policy.segment_length;
        let total = count as f64 * length;

        let repeats = if total < policy.bounds.min_total {
            (policy.bounds.min_total / total - EPSILON).ceil().max(1.0) as usize
        } else {
            1
        };

        let mut sequence: Vec<usize> = (0..repeats).flat_map(|_| 0..count).collect();

        let repeated_total = sequence.len() as f64 * length;
        if repeated_total > policy.bounds.max_total + EPSILON {
            let keep = ((policy.bounds.max_total / length) + EPSILON).floor() as usize;
            sequence.truncate(keep.max(1));
        }

        sequence
    }

    /// Nominal duration of a planned sequence
    pub fn planned_duration(sequence: &[usize], policy: &AssemblyPolicy) -> f64 {
        sequence.len() as f64 * policy.segment_length
    }
}
