// Application layer - Use case interactors

pub mod container;
pub mod highlight_interactor;
pub mod session;

// Re-export interactors
pub use container::{AppContainer, DefaultAppContainer};
pub use highlight_interactor::{HighlightInteractor, HighlightReport, HighlightSettings};
pub use session::HighlightSession;
