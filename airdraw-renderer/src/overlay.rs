//! Per-frame overlay: landmark markers, pinch connector and the simulated cursor.

use airdraw_core::{NormalizedHand, Palette, Rgba, SurfaceSize, Tool, INDEX_TIP, THUMB_TIP};
use serde::{Deserialize, Serialize};
use tiny_skia::{FillRule, Paint, PathBuilder, Stroke, Transform};

use crate::error::RenderResult;
use crate::surface::{to_skia, RasterSurface};

/// Marker radius in pixels.
pub const MARKER_RADIUS: f32 = 3.0;
/// Width of the thumb-to-index connector.
pub const CONNECTOR_WIDTH: f32 = 2.0;
/// Color of the fingertip markers and the connector.
pub const TIP_COLOR: Rgba = Rgba::rgb(0xff, 0x33, 0x66);
/// Color of all other markers.
pub const JOINT_COLOR: Rgba = Rgba::rgb(0x00, 0xff, 0xcc);

/// Appearance of the simulated cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "style", content = "color", rename_all = "snake_case")]
pub enum CursorStyle {
    /// Hollow ring with a translucent white border.
    #[default]
    Idle,
    /// Filled with the ink color.
    Drawing(Rgba),
    /// Filled translucent white.
    Erasing,
}

impl CursorStyle {
    /// Fill color of the cursor, if filled.
    #[must_use]
    pub const fn fill(self) -> Option<Rgba> {
        match self {
            Self::Idle => None,
            Self::Drawing(color) => Some(color),
            Self::Erasing => Some(Rgba::rgba(255, 255, 255, 128)),
        }
    }
}

/// Simulated pointer positioned over the interactive surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Cursor {
    /// Whether the cursor is shown.
    pub visible: bool,
    /// Horizontal position as a fraction of the interactive surface width.
    pub x_fraction: f32,
    /// Vertical position as a fraction of the interactive surface height.
    pub y_fraction: f32,
    /// Current look.
    pub style: CursorStyle,
}

/// Owns the overlay surface and the cursor.
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    surface: RasterSurface,
    cursor: Cursor,
}

impl OverlayRenderer {
    /// Create a renderer with an empty overlay.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be allocated.
    pub fn new(size: SurfaceSize) -> RenderResult<Self> {
        Ok(Self {
            surface: RasterSurface::new(size)?,
            cursor: Cursor::default(),
        })
    }

    /// The overlay surface.
    #[must_use]
    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    /// The simulated cursor.
    #[must_use]
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Resize the overlay. Its content is redrawn every frame anyway.
    ///
    /// # Errors
    ///
    /// Returns an error if the new surface cannot be allocated.
    pub fn resize(&mut self, size: SurfaceSize) -> RenderResult<()> {
        self.surface = RasterSurface::new(size)?;
        Ok(())
    }

    /// Clear the overlay and draw the hand, if any.
    pub fn render(&mut self, hand: Option<&NormalizedHand>, pinching: bool) {
        self.surface.clear();
        let Some(hand) = hand else {
            return;
        };

        let pixmap = self.surface.pixmap_mut();
        for (i, point) in hand.points.iter().enumerate() {
            let color = if i == THUMB_TIP || i == INDEX_TIP {
                TIP_COLOR
            } else {
                JOINT_COLOR
            };
            if let Some(circle) = PathBuilder::from_circle(point.x, point.y, MARKER_RADIUS) {
                pixmap.fill_path(
                    &circle,
                    &solid(color),
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
            }
        }

        if pinching {
            let (thumb, index) = (hand.thumb_tip(), hand.index_tip());
            let mut builder = PathBuilder::new();
            builder.move_to(thumb.x, thumb.y);
            builder.line_to(index.x, index.y);
            if let Some(line) = builder.finish() {
                let stroke = Stroke {
                    width: CONNECTOR_WIDTH,
                    ..Stroke::default()
                };
                let paint = solid(TIP_COLOR);
                pixmap.stroke_path(&line, &paint, &stroke, Transform::identity(), None);
            }
        }
    }

    /// Place and style the cursor. `fraction` is the fingertip position
    /// relative to the interactive surface.
    pub fn update_cursor(&mut self, fraction: (f32, f32), pinching: bool, palette: &Palette) {
        let style = match (pinching, palette.tool()) {
            (false, _) => CursorStyle::Idle,
            (true, Tool::Eraser) => CursorStyle::Erasing,
            (true, _) => CursorStyle::Drawing(palette.color()),
        };
        self.cursor = Cursor {
            visible: true,
            x_fraction: fraction.0,
            y_fraction: fraction.1,
            style,
        };
    }

    /// Hide the cursor (hand lost).
    pub fn hide_cursor(&mut self) {
        self.cursor.visible = false;
        self.cursor.style = CursorStyle::Idle;
    }
}

fn solid(color: Rgba) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_skia(color));
    paint.anti_alias = true;
    paint
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdraw_core::{HandFrame, Landmark, LandmarkNormalizer, LANDMARK_COUNT};

    fn normalized(points: Vec<Landmark>) -> NormalizedHand {
        let mut normalizer = LandmarkNormalizer::default();
        normalizer.observe_video(100, 100);
        normalizer
            .normalize(&HandFrame::new(points).expect("frame"))
            .expect("surface known")
    }

    fn spread_hand() -> NormalizedHand {
        let mut points = vec![Landmark::new(0.5, 0.9); LANDMARK_COUNT];
        points[THUMB_TIP] = Landmark::new(0.8, 0.2);
        points[INDEX_TIP] = Landmark::new(0.2, 0.2);
        normalized(points)
    }

    fn overlay() -> OverlayRenderer {
        OverlayRenderer::new(SurfaceSize::new(100, 100).expect("size")).expect("overlay")
    }

    #[test]
    fn test_markers_use_tip_and_joint_colors() {
        let mut o = overlay();
        o.render(Some(&spread_hand()), false);
        // Mirrored: raw x 0.2 lands at 80 px, 0.8 at 20 px.
        assert_eq!(o.surface().color_at(80, 20), Some(TIP_COLOR));
        assert_eq!(o.surface().color_at(20, 20), Some(TIP_COLOR));
        assert_eq!(o.surface().color_at(50, 90), Some(JOINT_COLOR));
    }

    #[test]
    fn test_connector_only_when_pinching() {
        let mut o = overlay();
        o.render(Some(&spread_hand()), false);
        assert_eq!(o.surface().alpha_at(50, 20), 0);

        o.render(Some(&spread_hand()), true);
        assert!(o.surface().alpha_at(50, 20) > 0);
    }

    #[test]
    fn test_render_without_hand_clears() {
        let mut o = overlay();
        o.render(Some(&spread_hand()), true);
        o.render(None, false);
        assert!(!o.surface().has_ink());
    }

    #[test]
    fn test_cursor_styles() {
        let mut o = overlay();
        let mut palette = Palette::default();

        o.update_cursor((0.25, 0.5), false, &palette);
        assert!(o.cursor().visible);
        assert_eq!(o.cursor().style, CursorStyle::Idle);
        assert!(o.cursor().style.fill().is_none());

        o.update_cursor((0.25, 0.5), true, &palette);
        assert_eq!(o.cursor().style, CursorStyle::Drawing(palette.color()));

        palette.select_tool(Tool::Eraser);
        o.update_cursor((0.25, 0.5), true, &palette);
        assert_eq!(o.cursor().style, CursorStyle::Erasing);

        o.hide_cursor();
        assert!(!o.cursor().visible);
    }
}
