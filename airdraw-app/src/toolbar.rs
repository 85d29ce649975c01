//! Default control layout: tools on the left, colors on the right.

use airdraw_core::tool::{MAX_STROKE_WIDTH, MIN_STROKE_WIDTH};
use airdraw_core::{
    ControlAction, Element, ElementId, ElementKind, Palette, Rgba, Scene, Tool, Transform,
    DEFAULT_SWATCHES,
};

/// Width of each sidebar.
pub const SIDEBAR_WIDTH: f32 = 64.0;
/// Edge length of a toolbar button.
pub const BUTTON_SIZE: f32 = 48.0;
/// Edge length of a color swatch.
pub const SWATCH_SIZE: f32 = 36.0;
/// Height of the width slider.
pub const SLIDER_HEIGHT: f32 = 120.0;
/// Width of the width slider.
pub const SLIDER_WIDTH: f32 = 20.0;
const GAP: f32 = 8.0;

/// Element ids of the default toolbar.
#[derive(Debug, Clone)]
pub struct Toolbar {
    panels: [ElementId; 2],
    back: ElementId,
    clear: ElementId,
    tools: Vec<(Tool, ElementId)>,
    slider: ElementId,
    swatches: Vec<(Rgba, ElementId)>,
}

impl Toolbar {
    /// Add the default controls to `scene` and lay them out in its bounds.
    pub fn install(scene: &mut Scene) -> Self {
        let panel = |name: &str| {
            Element::new(ElementKind::Panel {
                name: name.to_string(),
            })
        };
        let panels = [
            scene.add_element(panel("tools")),
            scene.add_element(panel("colors")),
        ];
        let back = scene.add_element(Element::button("Back", ControlAction::Back));
        let clear = scene.add_element(Element::button("Clear", ControlAction::Clear));
        let tools = Tool::ALL
            .iter()
            .map(|&tool| {
                let id = scene.add_element(Element::button(
                    tool.label(),
                    ControlAction::SelectTool(tool),
                ));
                (tool, id)
            })
            .collect();
        let slider = scene.add_element(Element::new(ElementKind::Slider {
            min: MIN_STROKE_WIDTH,
            max: MAX_STROKE_WIDTH,
            value: Palette::default().width(),
        }));
        let swatches = DEFAULT_SWATCHES
            .iter()
            .map(|&color| {
                let swatch = Element::new(ElementKind::Swatch { color });
                (color, scene.add_element(swatch))
            })
            .collect();

        let toolbar = Self {
            panels,
            back,
            clear,
            tools,
            slider,
            swatches,
        };
        toolbar.layout(scene);
        toolbar.sync(scene, &Palette::default());
        toolbar
    }

    /// Position every control relative to the scene's current bounds.
    pub fn layout(&self, scene: &mut Scene) {
        let bounds = scene.bounds;
        let left_x = bounds.left + GAP;
        let right_panel_x = bounds.left + bounds.width - SIDEBAR_WIDTH;

        let mut place = |id: ElementId, x: f32, y: f32, width: f32, height: f32, z_index: i32| {
            if let Some(element) = scene.get_element_mut(id) {
                element.transform = Transform {
                    x,
                    y,
                    width,
                    height,
                    z_index,
                };
            }
        };

        let (top, height) = (bounds.top, bounds.height);
        place(self.panels[0], bounds.left, top, SIDEBAR_WIDTH, height, 0);
        place(self.panels[1], right_panel_x, top, SIDEBAR_WIDTH, height, 0);

        let mut y = top + GAP;
        for id in [self.back, self.clear]
            .into_iter()
            .chain(self.tools.iter().map(|(_, id)| *id))
        {
            place(id, left_x, y, BUTTON_SIZE, BUTTON_SIZE, 1);
            y += BUTTON_SIZE + GAP;
        }
        let slider_x = bounds.left + (SIDEBAR_WIDTH - SLIDER_WIDTH) / 2.0;
        place(self.slider, slider_x, y, SLIDER_WIDTH, SLIDER_HEIGHT, 1);

        let swatch_x = right_panel_x + (SIDEBAR_WIDTH - SWATCH_SIZE) / 2.0;
        let mut y = top + GAP;
        for (_, id) in &self.swatches {
            place(*id, swatch_x, y, SWATCH_SIZE, SWATCH_SIZE, 1);
            y += SWATCH_SIZE + GAP;
        }
    }

    /// Mirror the palette into the controls' active flags and slider value.
    pub fn sync(&self, scene: &mut Scene, palette: &Palette) {
        for (tool, id) in &self.tools {
            if let Some(element) = scene.get_element_mut(*id) {
                element.active = *tool == palette.tool();
            }
        }
        let erasing = palette.tool() == Tool::Eraser;
        for (color, id) in &self.swatches {
            if let Some(element) = scene.get_element_mut(*id) {
                element.active = !erasing && *color == palette.color();
            }
        }
        if let Some(element) = scene.get_element_mut(self.slider) {
            if let ElementKind::Slider { value, .. } = &mut element.kind {
                *value = palette.width();
            }
        }
    }

    /// The back button.
    #[must_use]
    pub const fn back(&self) -> ElementId {
        self.back
    }

    /// The clear button.
    #[must_use]
    pub const fn clear(&self) -> ElementId {
        self.clear
    }

    /// The button selecting `tool`.
    #[must_use]
    pub fn tool(&self, tool: Tool) -> Option<ElementId> {
        self.tools.iter().find(|(t, _)| *t == tool).map(|(_, id)| *id)
    }

    /// The width slider.
    #[must_use]
    pub const fn slider(&self) -> ElementId {
        self.slider
    }

    /// The swatch for `color`.
    #[must_use]
    pub fn swatch(&self, color: Rgba) -> Option<ElementId> {
        self.swatches
            .iter()
            .find(|(c, _)| *c == color)
            .map(|(_, id)| *id)
    }
}
