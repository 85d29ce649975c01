//! Hit-testing, air-hover and air-tap activation.
//!
//! The dispatcher does not know how controls are laid out or drawn. It only
//! talks to an [`InteractiveSurface`]: "given a point, which activatable
//! element is on top?" plus the highlight and activation primitives.

use serde::{Deserialize, Serialize};

use crate::element::{ControlAction, ElementId};
use crate::normalize::{PixelPoint, ScreenRect};
use crate::pinch::PinchTransition;

/// Capability interface of anything that can be hit-tested and activated.
pub trait InteractiveSurface {
    /// On-screen bounds of the surface.
    fn bounds(&self) -> ScreenRect;

    /// Topmost activatable element at a screen point.
    fn hit_test(&self, x: f32, y: f32) -> Option<ElementId>;

    /// Add or remove the hover highlight of an element.
    fn set_highlight(&mut self, id: ElementId, on: bool);

    /// Trigger the element's standard action at a screen point.
    fn activate(&mut self, id: ElementId, x: f32, y: f32) -> Option<ControlAction>;

    /// Show transient pressed feedback.
    fn press_feedback(&mut self, id: ElementId);

    /// Human-readable identity for diagnostics.
    fn describe(&self, id: ElementId) -> Option<String>;
}

/// Hover change produced by one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HoverChange {
    /// Element whose highlight was removed.
    pub left: Option<ElementId>,
    /// Element whose highlight was applied.
    pub entered: Option<ElementId>,
}

impl HoverChange {
    /// Whether anything changed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.left.is_none() && self.entered.is_none()
    }
}

/// An activation fired for a hovered element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    /// The activated element.
    pub element: ElementId,
    /// Action the element resolved to, if any.
    pub action: Option<ControlAction>,
    /// Screen point of the air tap.
    pub point: PixelPoint,
}

/// Result of dispatching one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DispatchOutcome {
    /// Element under the fingertip after this frame.
    pub hovered: Option<ElementId>,
    /// Highlight transitions applied this frame.
    pub hover_change: HoverChange,
    /// Activation fired this frame.
    pub activation: Option<Activation>,
    /// The frame was consumed by an activation; no stroke mutation allowed.
    pub consumed: bool,
}

/// Stateless per-frame hover and activation logic.
#[derive(Debug, Clone, Copy, Default)]
pub struct HitDispatcher;

impl HitDispatcher {
    /// Create a dispatcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Resolve hover and, on a pinch-down edge, fire at most one activation.
    ///
    /// `point` must already be in the surface's screen space.
    pub fn dispatch<S: InteractiveSurface + ?Sized>(
        &self,
        surface: &mut S,
        point: PixelPoint,
        transition: PinchTransition,
        last_hovered: Option<ElementId>,
    ) -> DispatchOutcome {
        let hovered = surface.hit_test(point.x, point.y);
        let hover_change = Self::apply_hover(surface, last_hovered, hovered);

        let mut outcome = DispatchOutcome {
            hovered,
            hover_change,
            activation: None,
            consumed: false,
        };

        if transition == PinchTransition::Down {
            if let Some(element) = hovered {
                let action = surface.activate(element, point.x, point.y);
                surface.press_feedback(element);
                tracing::debug!(
                    "Air tap on {} -> {:?}",
                    surface.describe(element).unwrap_or_default(),
                    action
                );
                outcome.activation = Some(Activation {
                    element,
                    action,
                    point,
                });
                outcome.consumed = true;
            }
        }

        outcome
    }

    /// Remove the highlight from `last_hovered`, if any.
    pub fn clear_hover<S: InteractiveSurface + ?Sized>(
        &self,
        surface: &mut S,
        last_hovered: Option<ElementId>,
    ) -> HoverChange {
        Self::apply_hover(surface, last_hovered, None)
    }

    fn apply_hover<S: InteractiveSurface + ?Sized>(
        surface: &mut S,
        previous: Option<ElementId>,
        current: Option<ElementId>,
    ) -> HoverChange {
        if previous == current {
            return HoverChange::default();
        }
        let mut change = HoverChange::default();
        if let Some(old) = previous {
            surface.set_highlight(old, false);
            change.left = Some(old);
        }
        if let Some(new) = current {
            surface.set_highlight(new, true);
            change.entered = Some(new);
        }
        change
    }
}
