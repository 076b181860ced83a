//! Progress reporting as an explicit event stream
//!
//! The pipeline emits one event per completed step; front ends subscribe to
//! the receiving half. Percent and phase are presentational only.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Coarse phase shown next to the progress bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressPhase {
    Analyzing,
    ExtractingSegments,
    Compiling,
    Finished,
}

impl ProgressPhase {
    /// Phase for a percentage: <=30, <=60, <=90, above
    pub fn from_percent(percent: f64) -> Self {
        if percent <= 30.0 {
            ProgressPhase::Analyzing
        } else if percent <= 60.0 {
            ProgressPhase::ExtractingSegments
        } else if percent <= 90.0 {
            ProgressPhase::Compiling
        } else {
            ProgressPhase::Finished
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ProgressPhase::Analyzing => "Analyzing video...",
            ProgressPhase::ExtractingSegments => "Extracting segments...",
            ProgressPhase::Compiling => "Compiling highlights...",
            ProgressPhase::Finished => "Finishing up...",
        }
    }
}

/// One progress update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub step: usize,
    pub total_steps: usize,
    /// Progress percentage (0.0 - 100.0)
    pub percent: f64,
    pub phase: ProgressPhase,
    /// What the pipeline just finished
    pub message: String,
}

/// Maps step counts to percent and phase
pub struct ProgressReporter;

impl ProgressReporter {
    /// Steps for a run: analysis, one per moment, compilation
    pub fn total_steps(moment_count: usize) -> usize {
        2 + moment_count
    }

    pub fn on_step(current: usize, total: usize) -> (f64, ProgressPhase) {
        let percent = if total == 0 {
            0.0
        } else {
            (current as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
        };
        (percent, ProgressPhase::from_percent(percent))
    }
}

/// Sending half held by the pipeline
#[derive(Debug, Clone)]
pub struct ProgressEmitter {
    sender: mpsc::UnboundedSender<ProgressEvent>,
    total_steps: usize,
}

impl ProgressEmitter {
    pub fn set_total_steps(&mut self, total_steps: usize) {
        self.total_steps = total_steps;
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    /// Emit the event for a completed step. A closed stream is not an error.
    pub fn step(&self, current: usize, message: impl Into<String>) -> ProgressEvent {
        let (percent, phase) = ProgressReporter::on_step(current, self.total_steps);
        let event = ProgressEvent {
            step: current,
            total_steps: self.total_steps,
            percent,
            phase,
            message: message.into(),
        };
        tracing::debug!(
            step = current,
            total = self.total_steps,
            percent,
            "Progress"
        );
        let _ = self.sender.send(event.clone());
        event
    }
}

/// Receiving half: finite, ends when the run finishes, cannot be restarted
#[derive(Debug)]
pub struct ProgressStream {
    receiver: mpsc::UnboundedReceiver<ProgressEvent>,
}

impl ProgressStream {
    pub async fn next(&mut self) -> Option<ProgressEvent> {
        self.receiver.recv().await
    }

    /// Drain events already queued without waiting
    pub fn try_collect(&mut self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.receiver.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Create a connected emitter and stream
pub fn progress_channel() -> (ProgressEmitter, ProgressStream) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (
        ProgressEmitter {
            sender,
            total_steps: 0,
        },
        ProgressStream { receiver },
    )
}
