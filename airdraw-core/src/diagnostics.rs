//! Throttled, read-only engine diagnostics.

use serde::{Deserialize, Serialize};

use crate::normalize::PixelPoint;

/// Default number of frames between published snapshots.
pub const DEFAULT_DIAGNOSTICS_INTERVAL: u32 = 5;

/// Lifecycle and health of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum EngineStatus {
    /// Waiting for the first frame.
    #[default]
    Initializing,
    /// Frames are being processed.
    Running,
    /// The estimator failed; the message is the last error seen.
    Crashed(String),
    /// No video stream is available.
    CameraUnavailable(String),
    /// The frame loop was stopped.
    Stopped,
}

impl std::fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::Running => write!(f, "running"),
            Self::Crashed(msg) => write!(f, "crashed: {msg}"),
            Self::CameraUnavailable(msg) => write!(f, "camera unavailable: {msg}"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// What the pipeline saw in one frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameObservation {
    /// A hand was present (or held through a short dropout).
    pub hand_detected: bool,
    /// Fingertip position in screen space.
    pub hit_point: Option<PixelPoint>,
    /// Label of whatever lies under the fingertip, panels and bare canvas
    /// included.
    pub hit_element: Option<String>,
    /// The fingertip is over an activatable control.
    pub hovering: bool,
    /// Label of the element activated this frame.
    pub activation: Option<String>,
    /// Fingers pinched after this frame.
    pub pinching: bool,
    /// Thumb/index separation.
    pub pinch_distance: f32,
}

/// Snapshot published to observers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiagnosticsSnapshot {
    /// Frame counter at publication.
    pub frame: u64,
    /// Engine status.
    pub status: EngineStatus,
    /// Hand present.
    pub hand_detected: bool,
    /// Fingertip in screen space.
    pub hit_point: Option<PixelPoint>,
    /// Element under the fingertip.
    pub hit_element: Option<String>,
    /// Fingertip is over an activatable element.
    pub hovering: bool,
    /// Most recent activation since the previous snapshot.
    pub last_activation: Option<String>,
    /// Fingers pinched.
    pub pinching: bool,
    /// Thumb/index separation.
    pub pinch_distance: f32,
    /// Distance below which a pinch starts.
    pub pinch_threshold: f32,
}

/// Aggregates per-frame observations and publishes every `interval` frames.
#[derive(Debug, Clone)]
pub struct DiagnosticsReporter {
    interval: u32,
    pinch_threshold: f32,
    frames: u64,
    status: EngineStatus,
    pending_activation: Option<String>,
    latest: Option<DiagnosticsSnapshot>,
}

impl DiagnosticsReporter {
    /// Create a reporter. An interval of zero is treated as one.
    #[must_use]
    pub fn new(interval: u32, pinch_threshold: f32) -> Self {
        Self {
            interval: interval.max(1),
            pinch_threshold,
            frames: 0,
            status: EngineStatus::default(),
            pending_activation: None,
            latest: None,
        }
    }

    /// Frames between snapshots.
    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    /// Frames recorded so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Current engine status.
    #[must_use]
    pub const fn status(&self) -> &EngineStatus {
        &self.status
    }

    /// Most recently published snapshot.
    #[must_use]
    pub const fn latest(&self) -> Option<&DiagnosticsSnapshot> {
        self.latest.as_ref()
    }

    /// Record a status change. Takes effect in the next published snapshot.
    pub fn set_status(&mut self, status: EngineStatus) {
        if self.status != status {
            tracing::debug!("Engine status: {}", status);
            self.status = status;
        }
    }

    /// Record one frame; returns a snapshot on publication frames.
    pub fn record(&mut self, observation: FrameObservation) -> Option<DiagnosticsSnapshot> {
        self.frames += 1;
        if observation.activation.is_some() {
            self.pending_activation.clone_from(&observation.activation);
        }
        if self.frames % u64::from(self.interval) != 0 {
            return None;
        }

        let snapshot = DiagnosticsSnapshot {
            frame: self.frames,
            status: self.status.clone(),
            hand_detected: observation.hand_detected,
            hit_point: observation.hit_point,
            hovering: observation.hovering,
            hit_element: observation.hit_element,
            last_activation: self.pending_activation.take(),
            pinching: observation.pinching,
            pinch_distance: observation.pinch_distance,
            pinch_threshold: self.pinch_threshold,
        };
        tracing::trace!(frame = snapshot.frame, "Diagnostics published");
        self.latest = Some(snapshot.clone());
        Some(snapshot)
    }
}

impl Default for DiagnosticsReporter {
    fn default() -> Self {
        Self::new(DEFAULT_DIAGNOSTICS_INTERVAL, 0.08)
    }
}
