//! Error types for gesture core operations.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in the gesture core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A hand frame did not carry the expected number of landmarks.
    #[error("Expected {expected} landmarks, got {actual}")]
    LandmarkCount {
        /// Required landmark count.
        expected: usize,
        /// Count that was supplied.
        actual: usize,
    },

    /// A landmark coordinate was NaN or infinite.
    #[error("Landmark {0} has a non-finite coordinate")]
    NonFiniteLandmark(usize),

    /// Configuration values are inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Element not found on the interactive surface.
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// A color string could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Configuration file could not be read.
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
