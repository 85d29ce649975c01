//! Persistent ink strokes.
//!
//! The stroke renderer is the only writer of the drawing surface. Ink is
//! cumulative: it disappears only through an eraser stroke or [`StrokeRenderer::clear`].

use airdraw_core::{BlendMode, Palette, PixelPoint, Rgba, SurfaceSize, Tool};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Stroke, Transform};

use crate::error::RenderResult;
use crate::surface::{to_skia, RasterSurface};

/// Segments shorter than this (in pixels) are not drawn.
pub const MIN_SEGMENT_LENGTH: f32 = 0.5;

/// Number of concentric halo passes drawn beneath a glowing stroke.
const GLOW_PASSES: u8 = 3;

/// Alpha factor of each halo pass.
const GLOW_ALPHA: f32 = 0.15;

/// An open stroke. Tool, color and width are fixed when the stroke begins.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeSession {
    /// Tool used for the whole stroke.
    pub tool: Tool,
    /// Ink color for the whole stroke.
    pub color: Rgba,
    /// Base width for the whole stroke.
    pub width: f32,
    /// End of the path so far.
    pub last: PixelPoint,
    /// Segments drawn so far.
    pub segments: u32,
}

/// Owns the drawing surface and the open stroke, if any.
#[derive(Debug, Clone)]
pub struct StrokeRenderer {
    surface: RasterSurface,
    session: Option<StrokeSession>,
}

impl StrokeRenderer {
    /// Create a renderer with an empty drawing surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be allocated.
    pub fn new(size: SurfaceSize) -> RenderResult<Self> {
        Ok(Self {
            surface: RasterSurface::new(size)?,
            session: None,
        })
    }

    /// The drawing surface.
    #[must_use]
    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    /// The open stroke.
    #[must_use]
    pub fn session(&self) -> Option<&StrokeSession> {
        self.session.as_ref()
    }

    /// Whether a stroke is open.
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.session.is_some()
    }

    /// Open a stroke at `point`, snapshotting the palette. No ink is placed
    /// until the path is extended.
    pub fn begin(&mut self, point: PixelPoint, palette: &Palette) {
        if self.session.is_some() {
            self.close();
        }
        tracing::debug!(
            "Stroke begin: {:?} {} width {} at ({:.1}, {:.1})",
            palette.tool(),
            palette.color(),
            palette.width(),
            point.x,
            point.y
        );
        self.session = Some(StrokeSession {
            tool: palette.tool(),
            color: palette.color(),
            width: palette.width(),
            last: point,
            segments: 0,
        });
    }

    /// Extend the open stroke to `point`. Returns whether a segment was drawn.
    pub fn extend(&mut self, point: PixelPoint) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.last.distance_to(&point) < MIN_SEGMENT_LENGTH {
            return false;
        }

        let from = session.last;
        session.last = point;
        session.segments += 1;
        draw_segment(&mut self.surface, session, from, point);
        true
    }

    /// Close the open stroke, returning it.
    pub fn close(&mut self) -> Option<StrokeSession> {
        let closed = self.session.take();
        if let Some(session) = &closed {
            tracing::debug!(
                "Stroke closed: {:?} with {} segments",
                session.tool,
                session.segments
            );
        }
        closed
    }

    /// Wipe all ink. An open stroke stays open.
    pub fn clear(&mut self) {
        tracing::debug!("Drawing surface cleared");
        self.surface.clear();
    }

    /// Resize the surface, keeping existing ink.
    ///
    /// # Errors
    ///
    /// Returns an error if the new surface cannot be allocated.
    pub fn resize(&mut self, size: SurfaceSize) -> RenderResult<()> {
        self.surface.resize(size)
    }
}

fn draw_segment(
    surface: &mut RasterSurface,
    session: &StrokeSession,
    from: PixelPoint,
    to: PixelPoint,
) {
    let mut builder = PathBuilder::new();
    builder.move_to(from.x, from.y);
    builder.line_to(to.x, to.y);
    let Some(path) = builder.finish() else {
        return;
    };

    let profile = session.tool.profile();
    let width = profile.stroke_width(session.width);
    let pixmap = surface.pixmap_mut();

    if let Some(glow) = profile.glow {
        let radius = glow.radius(session.width);
        for pass in (1..=GLOW_PASSES).rev() {
            let spread = radius * f32::from(pass) / f32::from(GLOW_PASSES);
            let halo = session.color.with_opacity(GLOW_ALPHA * profile.opacity);
            pixmap.stroke_path(
                &path,
                &paint(halo, profile.blend),
                &round_stroke(spread.mul_add(2.0, width)),
                Transform::identity(),
                None,
            );
        }
    }

    let color = match profile.blend {
        BlendMode::SourceOver => session.color.with_opacity(profile.opacity),
        BlendMode::DestinationOut => Rgba::rgb(0, 0, 0).with_opacity(profile.opacity),
    };
    pixmap.stroke_path(
        &path,
        &paint(color, profile.blend),
        &round_stroke(width),
        Transform::identity(),
        None,
    );
}

/// A fresh paint for one pass, so blend and alpha never carry over.
fn paint(color: Rgba, blend: BlendMode) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_skia(color));
    paint.anti_alias = true;
    paint.blend_mode = match blend {
        BlendMode::SourceOver => tiny_skia::BlendMode::SourceOver,
        BlendMode::DestinationOut => tiny_skia::BlendMode::DestinationOut,
    };
    paint
}

fn round_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}
