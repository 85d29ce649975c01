//! Scene of on-screen controls, the default [`InteractiveSurface`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::dispatch::InteractiveSurface;
use crate::element::{ControlAction, Element, ElementId};
use crate::normalize::ScreenRect;
use crate::{CoreError, CoreResult};

/// How long pressed feedback stays visible after an air tap.
pub const PRESS_FEEDBACK: Duration = Duration::from_millis(150);

/// Reported for points on the surface that no element covers.
pub const CANVAS_LABEL: &str = "canvas";

/// A scene containing all interactive elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// All elements in the scene, indexed by ID.
    elements: HashMap<ElementId, Element>,
    /// Insertion order, used to break z-index ties (later wins).
    order: Vec<ElementId>,
    /// On-screen bounds of the surface hosting the controls.
    pub bounds: ScreenRect,
}

impl Scene {
    /// Create a new empty scene with the given on-screen bounds.
    #[must_use]
    pub fn new(bounds: ScreenRect) -> Self {
        Self {
            elements: HashMap::new(),
            order: Vec::new(),
            bounds,
        }
    }

    /// Add an element to the scene.
    pub fn add_element(&mut self, element: Element) -> ElementId {
        let id = element.id;
        self.order.push(id);
        self.elements.insert(id, element);
        id
    }

    /// Remove an element from the scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the element is not found.
    pub fn remove_element(&mut self, id: &ElementId) -> CoreResult<Element> {
        self.order.retain(|eid| eid != id);
        self.elements
            .remove(id)
            .ok_or_else(|| CoreError::ElementNotFound(id.to_string()))
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get_element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Get a mutable reference to an element by ID.
    pub fn get_element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Get all elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    /// Move the surface on screen (e.g. the hosting window was dragged).
    pub fn set_bounds(&mut self, bounds: ScreenRect) {
        self.bounds = bounds;
    }

    /// Find the topmost (highest z-index) interactive element at a point.
    #[must_use]
    pub fn element_at(&self, x: f32, y: f32) -> Option<ElementId> {
        self.topmost(x, y, true)
    }

    /// Find the topmost element at a point, panels included.
    #[must_use]
    pub fn element_under(&self, x: f32, y: f32) -> Option<ElementId> {
        self.topmost(x, y, false)
    }

    /// Label of whatever lies under a point: the topmost element, `canvas`
    /// for bare surface, or `None` outside the bounds.
    #[must_use]
    pub fn label_at(&self, x: f32, y: f32) -> Option<String> {
        match self.element_under(x, y) {
            Some(id) => self.describe(id),
            None if self.bounds.contains(x, y) => Some(CANVAS_LABEL.to_string()),
            None => None,
        }
    }

    fn topmost(&self, x: f32, y: f32, interactive_only: bool) -> Option<ElementId> {
        self.order
            .iter()
            .enumerate()
            .filter_map(|(rank, id)| self.elements.get(id).map(|e| (rank, e)))
            .filter(|(_, e)| (e.interactive || !interactive_only) && e.contains_point(x, y))
            .max_by_key(|(rank, e)| (e.transform.z_index, *rank))
            .map(|(_, e)| e.id)
    }

    /// Currently highlighted elements.
    pub fn hovered_elements(&self) -> impl Iterator<Item = &Element> {
        self.elements().filter(|e| e.hovered)
    }

    /// Drop pressed feedback whose time has passed.
    pub fn expire_feedback(&mut self, now: Instant) {
        for element in self.elements.values_mut() {
            if element.pressed_until.is_some_and(|until| now >= until) {
                element.pressed_until = None;
            }
        }
    }

    /// Get the number of elements in the scene.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Serialize the scene to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(CoreError::Serialization)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(ScreenRect::new(0.0, 0.0, 640.0, 480.0))
    }
}

impl InteractiveSurface for Scene {
    fn bounds(&self) -> ScreenRect {
        self.bounds
    }

    fn hit_test(&self, x: f32, y: f32) -> Option<ElementId> {
        self.element_at(x, y)
    }

    fn set_highlight(&mut self, id: ElementId, on: bool) {
        if let Some(element) = self.elements.get_mut(&id) {
            if on && !element.hovered {
                element.highlight_count += 1;
            }
            element.hovered = on;
        }
    }

    fn activate(&mut self, id: ElementId, x: f32, y: f32) -> Option<ControlAction> {
        let element = self.elements.get_mut(&id)?;
        element.activation_count += 1;
        element.resolve_action(x, y)
    }

    fn press_feedback(&mut self, id: ElementId) {
        if let Some(element) = self.elements.get_mut(&id) {
            element.pressed_until = Some(Instant::now() + PRESS_FEEDBACK);
        }
    }

    fn describe(&self, id: ElementId) -> Option<String> {
        self.elements.get(&id).map(Element::label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::HitDispatcher;
    use crate::element::{ElementKind, Transform};
    use crate::normalize::PixelPoint;
    use crate::pinch::PinchTransition;
    use crate::tool::Tool;

    fn button_at(label: &str, x: f32, y: f32, z_index: i32) -> Element {
        Element::button(label, ControlAction::SelectTool(Tool::Pencil)).with_transform(
            Transform {
                x,
                y,
                width: 50.0,
                height: 50.0,
                z_index,
            },
        )
    }

    #[test]
    fn test_scene_add_remove() {
        let mut scene = Scene::default();
        assert!(scene.is_empty());

        let id = scene.add_element(button_at("Pen", 0.0, 0.0, 0));
        assert_eq!(scene.element_count(), 1);
        assert!(scene.get_element(id).is_some());

        scene.remove_element(&id).expect("should remove");
        assert!(scene.is_empty());
        assert!(scene.remove_element(&id).is_err());
    }

    #[test]
    fn test_element_at_prefers_highest_z() {
        let mut scene = Scene::default();
        let low = scene.add_element(button_at("low", 0.0, 0.0, 0));
        let high = scene.add_element(button_at("high", 25.0, 25.0, 5));

        assert_eq!(scene.element_at(10.0, 10.0), Some(low));
        assert_eq!(scene.element_at(40.0, 40.0), Some(high));
        assert!(scene.element_at(200.0, 200.0).is_none());
    }

    #[test]
    fn test_element_at_skips_panels() {
        let mut scene = Scene::default();
        scene.add_element(
            Element::new(ElementKind::Panel {
                name: "sidebar".to_string(),
            })
            .with_transform(Transform {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 400.0,
                z_index: 10,
            }),
        );
        let button = scene.add_element(button_at("Pen", 10.0, 10.0, 0));
        assert_eq!(scene.element_at(20.0, 20.0), Some(button));
        assert!(scene.element_at(20.0, 300.0).is_none());
    }

    #[test]
    fn test_label_at_reports_panels_and_canvas() {
        let mut scene = Scene::default();
        let sidebar = scene.add_element(
            Element::new(ElementKind::Panel {
                name: "sidebar".to_string(),
            })
            .with_transform(Transform {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 400.0,
                z_index: 0,
            }),
        );
        scene.add_element(button_at("Pen", 10.0, 10.0, 1));

        assert_eq!(scene.element_under(20.0, 300.0), Some(sidebar));
        assert_eq!(scene.label_at(20.0, 20.0).as_deref(), Some("Pen"));
        assert_eq!(scene.label_at(20.0, 300.0).as_deref(), Some("sidebar"));
        assert_eq!(scene.label_at(300.0, 300.0).as_deref(), Some(CANVAS_LABEL));
        assert!(scene.label_at(900.0, 300.0).is_none());
    }

    #[test]
    fn test_hover_is_idempotent() {
        let mut scene = Scene::default();
        let id = scene.add_element(button_at("Pen", 0.0, 0.0, 0));
        let dispatcher = HitDispatcher::new();
        let point = PixelPoint::new(10.0, 10.0);

        let mut last = None;
        for _ in 0..5 {
            let outcome = dispatcher.dispatch(&mut scene, point, PinchTransition::Idle, last);
            last = outcome.hovered;
        }
        let element = scene.get_element(id).expect("element");
        assert!(element.hovered);
        assert_eq!(element.highlight_count, 1);
    }

    #[test]
    fn test_hover_moves_between_elements() {
        let mut scene = Scene::default();
        let a = scene.add_element(button_at("a", 0.0, 0.0, 0));
        let b = scene.add_element(button_at("b", 100.0, 0.0, 0));
        let dispatcher = HitDispatcher::new();

        let first = dispatcher.dispatch(
            &mut scene,
            PixelPoint::new(10.0, 10.0),
            PinchTransition::Idle,
            None,
        );
        let second = dispatcher.dispatch(
            &mut scene,
            PixelPoint::new(110.0, 10.0),
            PinchTransition::Idle,
            first.hovered,
        );
        assert_eq!(second.hover_change.left, Some(a));
        assert_eq!(second.hover_change.entered, Some(b));
        assert!(!scene.get_element(a).expect("a").hovered);
        assert!(scene.get_element(b).expect("b").hovered);

        let cleared = dispatcher.clear_hover(&mut scene, second.hovered);
        assert_eq!(cleared.left, Some(b));
        assert_eq!(scene.hovered_elements().count(), 0);
    }

    #[test]
    fn test_down_on_element_activates_once_and_consumes() {
        let mut scene = Scene::default();
        let id = scene.add_element(button_at("Pencil", 0.0, 0.0, 0));
        let dispatcher = HitDispatcher::new();
        let point = PixelPoint::new(10.0, 10.0);

        let down = dispatcher.dispatch(&mut scene, point, PinchTransition::Down, None);
        assert!(down.consumed);
        let activation = down.activation.expect("activation");
        assert_eq!(activation.element, id);
        assert_eq!(
            activation.action,
            Some(ControlAction::SelectTool(Tool::Pencil))
        );
        assert!(scene
            .get_element(id)
            .expect("element")
            .is_pressed(Instant::now()));

        let held = dispatcher.dispatch(&mut scene, point, PinchTransition::Held, down.hovered);
        assert!(held.activation.is_none());
        assert!(!held.consumed);
        assert_eq!(scene.get_element(id).expect("element").activation_count, 1);
    }

    #[test]
    fn test_down_on_empty_space_passes_through() {
        let mut scene = Scene::default();
        scene.add_element(button_at("Pen", 0.0, 0.0, 0));
        let outcome = HitDispatcher::new().dispatch(
            &mut scene,
            PixelPoint::new(300.0, 300.0),
            PinchTransition::Down,
            None,
        );
        assert!(!outcome.consumed);
        assert!(outcome.activation.is_none());
    }

    #[test]
    fn test_feedback_expires() {
        let mut scene = Scene::default();
        let id = scene.add_element(button_at("Pen", 0.0, 0.0, 0));
        scene.press_feedback(id);
        scene.expire_feedback(Instant::now() + PRESS_FEEDBACK + Duration::from_millis(1));
        assert!(scene.get_element(id).expect("element").pressed_until.is_none());
    }
}
