//! Collaborators outside the engine: the hand-pose estimator and the video source.

use airdraw_core::{CameraError, HandFrame};
use airdraw_renderer::VideoFrame;
use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a hand-pose estimator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimatorError {
    /// The estimator could not process the frame.
    #[error("Estimator failed: {0}")]
    Failed(String),

    /// The estimator produced landmarks the engine cannot use.
    #[error("Invalid landmarks: {0}")]
    InvalidLandmarks(String),

    /// The estimator has been shut down.
    #[error("Estimator closed")]
    Closed,
}

/// External hand-pose estimation service.
///
/// Returns the landmarks of at most one hand per frame.
#[async_trait]
pub trait HandEstimator: Send {
    /// Estimate landmarks for a frame. `Ok(None)` means no hand was found.
    ///
    /// # Errors
    ///
    /// Returns an error if estimation failed for this frame.
    async fn estimate(&mut self, frame: &VideoFrame) -> Result<Option<HandFrame>, EstimatorError>;

    /// Release estimator resources.
    async fn close(&mut self) {}
}

/// Supplier of video frames.
#[async_trait]
pub trait VideoSource: Send {
    /// Next frame. `Ok(None)` means the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if no video is available.
    async fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError>;
}
