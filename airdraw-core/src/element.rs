//! Interactive elements - the controls that can be hovered and air-tapped.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tool::{Rgba, Tool};

/// Unique identifier for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happens when an element is activated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum ControlAction {
    /// Select a drawing tool.
    SelectTool(Tool),
    /// Select an ink color.
    SelectColor(Rgba),
    /// Set the stroke width.
    SetWidth(f32),
    /// Clear the drawing surface.
    Clear,
    /// Leave the application.
    Back,
    /// Host-defined action identified by name.
    Custom(String),
}

/// The kind of control an element represents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ElementKind {
    /// A push button with a fixed action.
    Button {
        /// Tooltip / accessible label.
        label: String,
        /// Action fired on activation.
        action: ControlAction,
    },

    /// A color swatch.
    Swatch {
        /// The swatch color.
        color: Rgba,
    },

    /// A vertical range slider; activation sets the value from the tap height.
    Slider {
        /// Value at the bottom edge.
        min: f32,
        /// Value at the top edge.
        max: f32,
        /// Current value.
        value: f32,
    },

    /// A non-activatable panel (sidebars, backgrounds).
    Panel {
        /// Panel name.
        name: String,
    },
}

/// Position, size and stacking of an element in screen space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Z-index for layering.
    pub z_index: i32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 48.0,
            height: 48.0,
            z_index: 0,
        }
    }
}

/// An on-screen control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Control kind.
    pub kind: ElementKind,
    /// Position and size.
    pub transform: Transform,
    /// Whether this element can be hit and activated.
    pub interactive: bool,
    /// Air-hover highlight is applied.
    pub hovered: bool,
    /// Marked as the currently selected option (active tool, active color).
    pub active: bool,
    /// Pressed feedback is visible until this instant.
    #[serde(skip)]
    pub pressed_until: Option<Instant>,
    /// Number of times the hover highlight was applied.
    pub highlight_count: u32,
    /// Number of times the element was activated.
    pub activation_count: u32,
}

impl Element {
    /// Create a new element with the given kind.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        let interactive = !matches!(kind, ElementKind::Panel { .. });
        Self {
            id: ElementId::new(),
            kind,
            transform: Transform::default(),
            interactive,
            hovered: false,
            active: false,
            pressed_until: None,
            highlight_count: 0,
            activation_count: 0,
        }
    }

    /// Convenience constructor for a button.
    #[must_use]
    pub fn button(label: impl Into<String>, action: ControlAction) -> Self {
        Self::new(ElementKind::Button {
            label: label.into(),
            action,
        })
    }

    /// Set the transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Check if a point (in screen coordinates) is within this element.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        let t = &self.transform;
        x >= t.x && x <= t.x + t.width && y >= t.y && y <= t.y + t.height
    }

    /// Whether pressed feedback is currently visible.
    #[must_use]
    pub fn is_pressed(&self, now: Instant) -> bool {
        self.pressed_until.is_some_and(|until| now < until)
    }

    /// Label used in diagnostics.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.kind {
            ElementKind::Button { label, .. } => label.clone(),
            ElementKind::Swatch { color } => format!("swatch {color}"),
            ElementKind::Slider { value, .. } => format!("slider {value:.0}"),
            ElementKind::Panel { name } => name.clone(),
        }
    }

    /// Resolve the action for an activation at screen point `(x, y)`.
    ///
    /// Sliders update their own value from the vertical tap position.
    #[must_use]
    pub fn resolve_action(&mut self, _x: f32, y: f32) -> Option<ControlAction> {
        let t = self.transform;
        match &mut self.kind {
            ElementKind::Button { action, .. } => Some(action.clone()),
            ElementKind::Swatch { color } => Some(ControlAction::SelectColor(*color)),
            ElementKind::Slider { min, max, value } => {
                let fraction = if t.height > 0.0 {
                    ((t.y + t.height - y) / t.height).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                *value = fraction.mul_add(*max - *min, *min).round();
                Some(ControlAction::SetWidth(*value))
            }
            ElementKind::Panel { .. } => None,
        }
    }
}
