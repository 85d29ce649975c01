//! Raster surfaces backing the drawing and overlay layers.

use airdraw_core::{Rgba, SurfaceSize};
use tiny_skia::{Color, Pixmap, PixmapPaint, Transform};

use crate::error::{RenderError, RenderResult};

/// An RGBA raster sized to the video resolution.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixmap: Pixmap,
}

impl RasterSurface {
    /// Allocate a transparent surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the pixmap cannot be allocated.
    pub fn new(size: SurfaceSize) -> RenderResult<Self> {
        Ok(Self {
            pixmap: allocate(size)?,
        })
    }

    /// Current dimensions.
    #[must_use]
    pub fn size(&self) -> SurfaceSize {
        SurfaceSize {
            width: self.pixmap.width(),
            height: self.pixmap.height(),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// The underlying pixmap.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Mutable access to the underlying pixmap.
    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Make every pixel transparent.
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    /// Change dimensions, keeping existing pixels anchored at the top-left.
    ///
    /// # Errors
    ///
    /// Returns an error if the new pixmap cannot be allocated.
    pub fn resize(&mut self, size: SurfaceSize) -> RenderResult<()> {
        if size == self.size() {
            return Ok(());
        }
        let mut resized = allocate(size)?;
        resized.draw_pixmap(
            0,
            0,
            self.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
        self.pixmap = resized;
        Ok(())
    }

    /// Alpha at a pixel, or zero outside the surface.
    #[must_use]
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.pixmap.pixel(x, y).map_or(0, |p| p.alpha())
    }

    /// Straight (non-premultiplied) color at a pixel.
    #[must_use]
    pub fn color_at(&self, x: u32, y: u32) -> Option<Rgba> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            Rgba::rgba(c.red(), c.green(), c.blue(), c.alpha())
        })
    }

    /// Whether any pixel is non-transparent.
    #[must_use]
    pub fn has_ink(&self) -> bool {
        self.pixmap.pixels().iter().any(|p| p.alpha() > 0)
    }

    /// Encode as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }
}

fn allocate(size: SurfaceSize) -> RenderResult<Pixmap> {
    Pixmap::new(size.width, size.height).ok_or(RenderError::Surface {
        width: size.width,
        height: size.height,
    })
}

/// Convert a palette color into a tiny-skia color.
pub(crate) fn to_skia(color: Rgba) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, color.a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(width: u32, height: u32) -> SurfaceSize {
        SurfaceSize::new(width, height).expect("non-zero size")
    }

    #[test]
    fn test_new_surface_is_transparent() {
        let surface = RasterSurface::new(size(8, 4)).expect("surface");
        assert_eq!(surface.width(), 8);
        assert_eq!(surface.height(), 4);
        assert!(!surface.has_ink());
        assert_eq!(surface.alpha_at(100, 100), 0);
    }

    #[test]
    fn test_resize_preserves_pixels() {
        let mut surface = RasterSurface::new(size(4, 4)).expect("surface");
        surface.pixmap_mut().fill(Color::from_rgba8(255, 0, 0, 255));

        surface.resize(size(8, 8)).expect("resize");
        assert_eq!(surface.size(), size(8, 8));
        assert_eq!(surface.color_at(1, 1), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(surface.alpha_at(6, 6), 0);
    }

    #[test]
    fn test_clear() {
        let mut surface = RasterSurface::new(size(4, 4)).expect("surface");
        surface.pixmap_mut().fill(Color::WHITE);
        assert!(surface.has_ink());
        surface.clear();
        assert!(!surface.has_ink());
    }

    #[test]
    fn test_encode_png_signature() {
        let surface = RasterSurface::new(size(2, 2)).expect("surface");
        let png = surface.encode_png().expect("png");
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }
}
