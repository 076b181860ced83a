// Domain errors - Error types for the highlight pipeline

use thiserror::Error;

/// Domain-specific error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Bad duration, sensitivity, segment length or bounds
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Source could not be opened or played back
    #[error("Media decode error: {0}")]
    MediaDecode(String),

    /// A capture session produced no bytes
    #[error("Capture produced no data for segment at {start:.2}s")]
    EmptyCapture { start: f64 },

    /// Segments with heterogeneous mime types reached the assembler
    #[error("Format mismatch: expected {expected}, found {found}")]
    FormatMismatch { expected: String, found: String },

    /// The run was dismissed by the user
    #[error("Processing cancelled by user")]
    CancelledByUser,

    /// Configuration file or value problem
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system failure
    #[error("I/O error: {0}")]
    Io(String),
}

impl DomainError {
    /// Cancellation is a deliberate reset, not a failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, DomainError::CancelledByUser)
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Io(err.to_string())
    }
}

/// Result type alias for pipeline operations
pub type DomainResult<T> = std::result::Result<T, DomainError>;
