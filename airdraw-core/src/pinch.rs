//! Pinch gesture state machine with hysteresis.
//!
//! A pinch starts only when the thumb and index tips come closer than
//! `start_threshold`, and once started it survives until they separate beyond
//! the looser `stop_threshold`. Distances between the two thresholds therefore
//! never toggle the state, which keeps strokes from breaking when the fingers
//! jitter around the boundary.

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, ElementId};

/// Thresholds for pinch detection, in normalized frame units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchConfig {
    /// Distance below which a new pinch starts.
    pub start_threshold: f32,
    /// Distance above which an ongoing pinch ends.
    pub stop_threshold: f32,
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            start_threshold: 0.08,
            stop_threshold: 0.12,
        }
    }
}

impl PinchConfig {
    /// Check that `0 < start_threshold < stop_threshold`.
    ///
    /// # Errors
    ///
    /// Returns an error describing the violated constraint.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.start_threshold > 0.0) {
            return Err(CoreError::InvalidConfig(format!(
                "pinch start threshold must be positive, got {}",
                self.start_threshold
            )));
        }
        if !(self.stop_threshold > self.start_threshold) {
            return Err(CoreError::InvalidConfig(format!(
                "pinch stop threshold {} must exceed start threshold {}",
                self.stop_threshold, self.start_threshold
            )));
        }
        Ok(())
    }
}

/// Edge classification of one pinch update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinchTransition {
    /// Not pinching, and was not pinching.
    Idle,
    /// Pinch just started (button down).
    Down,
    /// Pinch continues (button held).
    Held,
    /// Pinch just ended (button up).
    Up,
}

impl PinchTransition {
    /// Whether the fingers are pinched after this transition.
    #[must_use]
    pub const fn is_pinching(self) -> bool {
        matches!(self, Self::Down | Self::Held)
    }
}

/// Cross-frame pinch state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PinchState {
    /// Pinched as of the latest frame.
    pub is_pinching: bool,
    /// Pinched as of the frame before.
    pub was_pinching: bool,
    /// Most recent thumb/index separation.
    pub distance: f32,
    /// Element that carried the hover highlight after the latest frame.
    pub last_hovered: Option<ElementId>,
}

impl Default for PinchState {
    fn default() -> Self {
        Self {
            is_pinching: false,
            was_pinching: false,
            distance: 1.0,
            last_hovered: None,
        }
    }
}

/// The pinch state machine. Sole writer of [`PinchState`].
#[derive(Debug, Clone)]
pub struct PinchStateMachine {
    config: PinchConfig,
    state: PinchState,
}

impl PinchStateMachine {
    /// Create a machine with the given thresholds.
    #[must_use]
    pub fn new(config: PinchConfig) -> Self {
        Self {
            config,
            state: PinchState::default(),
        }
    }

    /// The thresholds in use.
    #[must_use]
    pub const fn config(&self) -> &PinchConfig {
        &self.config
    }

    /// Read-only view of the current state.
    #[must_use]
    pub const fn state(&self) -> &PinchState {
        &self.state
    }

    /// Feed a new thumb/index distance and classify the edge.
    pub fn update(&mut self, distance: f32) -> PinchTransition {
        let was = self.state.is_pinching;
        let threshold = if was {
            self.config.stop_threshold
        } else {
            self.config.start_threshold
        };
        let is = distance < threshold;

        self.state.was_pinching = was;
        self.state.is_pinching = is;
        self.state.distance = distance;

        let transition = match (was, is) {
            (false, false) => PinchTransition::Idle,
            (false, true) => PinchTransition::Down,
            (true, true) => PinchTransition::Held,
            (true, false) => PinchTransition::Up,
        };
        if matches!(transition, PinchTransition::Down | PinchTransition::Up) {
            tracing::debug!("Pinch {:?} at distance {:.3}", transition, distance);
        }
        transition
    }

    /// Record the element currently carrying the hover highlight.
    pub fn set_last_hovered(&mut self, hovered: Option<ElementId>) {
        self.state.last_hovered = hovered;
    }

    /// Restore the initial state.
    pub fn reset(&mut self) {
        self.state = PinchState::default();
    }
}

impl Default for PinchStateMachine {
    fn default() -> Self {
        Self::new(PinchConfig::default())
    }
}
