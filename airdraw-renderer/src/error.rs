//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A raster surface could not be allocated.
    #[error("Failed to allocate {width}x{height} surface")]
    Surface {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Video frame data does not match its dimensions.
    #[error("Invalid frame data: expected {expected} bytes, got {actual}")]
    InvalidFrame {
        /// Expected byte count.
        expected: usize,
        /// Actual byte count.
        actual: usize,
    },

    /// Encoding an image failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Writing an export to disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
