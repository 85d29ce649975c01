//! Shared camera stream with reference counting and error remediation.
//!
//! Several consumers may want the camera at once. The hardware is acquired on
//! the first request and released when the last consumer lets go.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why the camera stream could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum CameraError {
    /// The user or platform refused camera access.
    #[error("camera permission was denied")]
    PermissionDenied,

    /// No supported camera is attached.
    #[error("no supported camera hardware was detected")]
    NoHardware,

    /// Another application holds the camera.
    #[error("the camera is in use by another application")]
    HardwareInUse,

    /// Camera access requires a secure context.
    #[error("camera access requires a secure context")]
    InsecureContext,

    /// Anything else.
    #[error("camera error: {0}")]
    Unknown(String),
}

/// User-facing guidance for a camera failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remediation {
    /// Short headline.
    pub title: String,
    /// One-sentence explanation.
    pub message: String,
    /// Ordered fix-it steps.
    pub steps: Vec<String>,
}

impl Remediation {
    fn new(title: &str, message: &str, steps: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            steps: steps.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl CameraError {
    /// Guidance on how to fix this error.
    #[must_use]
    pub fn remediation(&self) -> Remediation {
        match self {
            Self::PermissionDenied => Remediation::new(
                "Camera Access Blocked",
                "Air Draw needs permission to use your webcam.",
                &[
                    "Open your system privacy settings.",
                    "Allow camera access for this application.",
                    "Restart Air Draw and try again.",
                ],
            ),
            Self::NoHardware => Remediation::new(
                "No Webcam Detected",
                "No camera is connected to this device.",
                &[
                    "Ensure your webcam is physically plugged in.",
                    "Check whether a privacy shutter is closed.",
                    "On a laptop, check for a keyboard key that disables the camera.",
                ],
            ),
            Self::HardwareInUse => Remediation::new(
                "Camera is Busy",
                "Another application is currently using your webcam.",
                &[
                    "Check whether a video call or another program is using the camera.",
                    "Close that application completely.",
                    "Retry.",
                ],
            ),
            Self::InsecureContext => Remediation::new(
                "Insecure Connection",
                "Camera access requires a secure connection.",
                &[
                    "Access the application via localhost or 127.0.0.1.",
                    "Plain HTTP over a network address blocks the camera.",
                    "Switch to localhost or set up HTTPS.",
                ],
            ),
            Self::Unknown(message) => Remediation {
                title: "Unknown Camera Error".to_string(),
                message: if message.is_empty() {
                    "An unexpected error occurred while accessing the camera.".to_string()
                } else {
                    message.clone()
                },
                steps: vec!["Restart the application and try again.".to_string()],
            },
        }
    }
}

/// Source of camera streams (hardware, a file, a synthetic generator).
pub trait CameraProvider {
    /// Handle to an open stream.
    type Stream;

    /// Acquire the hardware.
    ///
    /// # Errors
    ///
    /// Returns the classified acquisition failure.
    fn open(&mut self) -> Result<Self::Stream, CameraError>;

    /// Release the hardware.
    fn close(&mut self, stream: Self::Stream);
}

/// Reference-counted owner of the shared camera stream.
pub struct CameraManager<P: CameraProvider> {
    provider: P,
    stream: Option<P::Stream>,
    active: usize,
    last_error: Option<CameraError>,
}

impl<P: CameraProvider> CameraManager<P> {
    /// Wrap a provider. Nothing is acquired until the first request.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            stream: None,
            active: 0,
            last_error: None,
        }
    }

    /// Number of consumers holding the stream.
    #[must_use]
    pub const fn active_consumers(&self) -> usize {
        self.active
    }

    /// Whether the hardware is currently acquired.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    /// The last acquisition failure, cleared by the next attempt.
    #[must_use]
    pub const fn last_error(&self) -> Option<&CameraError> {
        self.last_error.as_ref()
    }

    /// Register a consumer, acquiring the hardware on the first request.
    ///
    /// A failed acquisition resets the consumer count to zero.
    ///
    /// # Errors
    ///
    /// Returns the classified acquisition failure.
    pub fn request_stream(&mut self) -> Result<&P::Stream, CameraError> {
        self.active += 1;
        if self.active == 1 {
            self.last_error = None;
            match self.provider.open() {
                Ok(stream) => {
                    tracing::info!("Camera stream acquired");
                    self.stream = Some(stream);
                }
                Err(e) => {
                    tracing::warn!("Failed to acquire camera stream: {}", e);
                    self.active = 0;
                    self.last_error = Some(e.clone());
                    return Err(e);
                }
            }
        }
        self.stream
            .as_ref()
            .ok_or_else(|| CameraError::Unknown("camera stream missing".to_string()))
    }

    /// Unregister a consumer, releasing the hardware after the last one.
    pub fn release_stream(&mut self) {
        self.active = self.active.saturating_sub(1);
        if self.active == 0 {
            if let Some(stream) = self.stream.take() {
                self.provider.close(stream);
                tracing::info!("Camera stream released");
            }
        }
    }

    /// Access the provider.
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }
}
