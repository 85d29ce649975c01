//! Drawing export to image formats.
//!
//! PNG keeps the drawing's transparency. JPEG has no alpha, so the drawing is
//! composited over a solid background first.

use std::path::Path;

use airdraw_core::Rgba;
use image::ImageEncoder;

use crate::error::{RenderError, RenderResult};
use crate::surface::RasterSurface;

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// PNG image with alpha.
    Png,
    /// JPEG image composited over the background.
    Jpeg,
}

impl ExportFormat {
    /// Guess the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()?
            .to_str()?
            .to_ascii_lowercase()
            .as_str()
        {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

/// Configuration for drawing export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Background color used where the drawing is transparent (JPEG only).
    pub background: Rgba,
    /// JPEG quality 1-100 (default: 85).
    pub jpeg_quality: u8,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            background: Rgba::rgb(0, 0, 0),
            jpeg_quality: 85,
        }
    }
}

/// Encodes raster surfaces.
pub struct SurfaceExporter {
    config: ExportConfig,
}

impl SurfaceExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// Encode a surface in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    pub fn export(&self, surface: &RasterSurface, format: ExportFormat) -> RenderResult<Vec<u8>> {
        match format {
            ExportFormat::Png => surface.encode_png(),
            ExportFormat::Jpeg => self.render_to_jpeg(surface),
        }
    }

    /// Encode a surface and write it to `path`, picking the format from the
    /// extension (PNG when unknown).
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn export_to_file(&self, surface: &RasterSurface, path: &Path) -> RenderResult<()> {
        let format = ExportFormat::from_path(path).unwrap_or(ExportFormat::Png);
        let bytes = self.export(surface, format)?;
        std::fs::write(path, bytes)?;
        tracing::info!("Exported {:?} to {}", format, path.display());
        Ok(())
    }

    /// Export the surface to JPEG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_to_jpeg(&self, surface: &RasterSurface) -> RenderResult<Vec<u8>> {
        let pixmap = surface.pixmap();
        let (width, height) = (pixmap.width(), pixmap.height());
        let bg = self.config.background;
        let background = [f32::from(bg.r), f32::from(bg.g), f32::from(bg.b)];

        // Pixels are premultiplied: out = src + bg * (1 - alpha).
        let mut rgb_data = Vec::with_capacity((width as usize) * (height as usize) * 3);
        for pixel in pixmap.data().chunks_exact(4) {
            let inv = 1.0 - f32::from(pixel[3]) / 255.0;
            for (channel, bg_channel) in pixel[..3].iter().zip(background) {
                let value = bg_channel.mul_add(inv, f32::from(*channel));
                rgb_data.push(value.round().clamp(0.0, 255.0) as u8);
            }
        }

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality);
        encoder
            .write_image(&rgb_data, width, height, image::ColorType::Rgb8.into())
            .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }
}

impl Default for SurfaceExporter {
    fn default() -> Self {
        Self::with_defaults()
    }
}
