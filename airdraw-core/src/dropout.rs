//! Dropout tolerance for transient loss of hand tracking.

use serde::{Deserialize, Serialize};

/// Default number of consecutive missing frames that are masked.
pub const DEFAULT_DROPOUT_TOLERANCE: u32 = 5;

/// Verdict of the debouncer for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DropoutStatus {
    /// A hand is present.
    Tracking,
    /// The hand is missing but still inside the grace window; hold all state.
    Holding {
        /// Consecutive frames without a hand.
        lost_frames: u32,
    },
    /// The hand is confirmed absent.
    Lost {
        /// Consecutive frames without a hand.
        lost_frames: u32,
        /// True only on the first frame past the tolerance.
        newly_lost: bool,
    },
}

impl DropoutStatus {
    /// Whether the caller must finalize strokes and hover on this frame.
    #[must_use]
    pub const fn requires_finalize(self) -> bool {
        matches!(
            self,
            Self::Lost {
                newly_lost: true,
                ..
            }
        )
    }
}

/// Counts consecutive frames without a detected hand.
#[derive(Debug, Clone)]
pub struct DropoutDebouncer {
    tolerance: u32,
    lost_frames: u32,
}

impl DropoutDebouncer {
    /// Create a debouncer masking up to `tolerance` missing frames.
    #[must_use]
    pub const fn new(tolerance: u32) -> Self {
        Self {
            tolerance,
            lost_frames: 0,
        }
    }

    /// Consecutive frames without a hand so far.
    #[must_use]
    pub const fn lost_frames(&self) -> u32 {
        self.lost_frames
    }

    /// The configured tolerance.
    #[must_use]
    pub const fn tolerance(&self) -> u32 {
        self.tolerance
    }

    /// Record whether the current frame contains a hand.
    pub fn observe(&mut self, detected: bool) -> DropoutStatus {
        if detected {
            if self.lost_frames > self.tolerance {
                tracing::debug!("Hand reacquired after {} frames", self.lost_frames);
            }
            self.lost_frames = 0;
            return DropoutStatus::Tracking;
        }

        self.lost_frames = self.lost_frames.saturating_add(1);
        if self.lost_frames <= self.tolerance {
            DropoutStatus::Holding {
                lost_frames: self.lost_frames,
            }
        } else {
            let newly_lost = self.lost_frames == self.tolerance + 1;
            if newly_lost {
                tracing::debug!("Hand lost for {} frames, finalizing", self.lost_frames);
            }
            DropoutStatus::Lost {
                lost_frames: self.lost_frames,
                newly_lost,
            }
        }
    }

    /// Forget any missing-frame history.
    pub fn reset(&mut self) {
        self.lost_frames = 0;
    }
}

impl Default for DropoutDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DROPOUT_TOLERANCE)
    }
}
