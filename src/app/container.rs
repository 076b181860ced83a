use std::sync::Arc;

use crate::adapters::{LibavPlaybackAdapter, ProbeLibavAdapter};
use crate::app::highlight_interactor::HighlightInteractor;
use crate::domain::errors::DomainError;
use crate::engine::BlobRegistry;
use crate::ports::{PlaybackPort, ProbePort};

pub trait AppContainer: Send + Sync {
    fn highlight_interactor(&self) -> Arc<HighlightInteractor>;
    fn registry(&self) -> BlobRegistry;
}

/// Wires the libav adapters into the highlight interactor
pub struct DefaultAppContainer {
    highlight_interactor: Arc<HighlightInteractor>,
    registry: BlobRegistry,
}

impl DefaultAppContainer {
    pub fn new() -> Result<Self, DomainError> {
        let probe_port = Arc::new(ProbeLibavAdapter::new()?);
        let playback_port = Arc::new(LibavPlaybackAdapter::new()?);
        let registry = BlobRegistry::new();

        let highlight_interactor = Arc::new(HighlightInteractor::new(
            Arc::clone(&probe_port) as Arc<dyn ProbePort>,
            Arc::clone(&playback_port) as Arc<dyn PlaybackPort>,
            registry.clone(),
        ));

        Ok(Self {
            highlight_interactor,
            registry,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn highlight_interactor(&self) -> Arc<HighlightInteractor> {
        Arc::clone(&self.highlight_interactor)
    }

    fn registry(&self) -> BlobRegistry {
        self.registry.clone()
    }
}
