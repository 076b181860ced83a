// Highlight session - Holds the current result for a front end

use tracing::debug;

use crate::app::highlight_interactor::HighlightReport;
use crate::engine::BlobRegistry;

/// Keeps at most one result alive.
///
/// Starting a new run or dismissing the result releases every blob URL the
/// previous report held.
pub struct HighlightSession {
    registry: BlobRegistry,
    current: Option<HighlightReport>,
}

impl HighlightSession {
    pub fn new(registry: BlobRegistry) -> Self {
        Self {
            registry,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&HighlightReport> {
        self.current.as_ref()
    }

    /// Release the current result before a new run starts
    pub fn begin_run(&mut self) {
        self.dismiss();
    }

    /// Store a finished report, superseding any previous one
    pub fn complete(&mut self, report: HighlightReport) {
        self.dismiss();
        self.current = Some(report);
    }

    /// Drop the current result. Returns how many blob URLs were released.
    pub fn dismiss(&mut self) -> usize {
        match self.current.take() {
            Some(report) => {
                let released = self.registry.release_all(&report.blob_urls());
                debug!(released, "Dismissed highlight result");
                released
            }
            None => 0,
        }
    }
}

impl Drop for HighlightSession {
    fn drop(&mut self) {
        self.dismiss();
    }
}
