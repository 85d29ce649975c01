//! Video frames and low-light enhancement.
//!
//! Webcams in dim rooms produce frames the estimator struggles with. Frames
//! are brightened and contrast-stretched through a per-channel lookup table
//! before estimation; the drawing itself never sees enhanced pixels.

use airdraw_core::Enhancement;

use crate::error::{RenderError, RenderResult};

/// A single RGBA video frame (4 bytes per pixel, row-major).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl VideoFrame {
    /// Create a frame from RGBA data.
    ///
    /// # Errors
    ///
    /// Returns an error if the data length doesn't match width * height * 4.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> RenderResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if data.len() != expected {
            return Err(RenderError::InvalidFrame {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame filled with one color.
    #[must_use]
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            data: rgba.repeat(pixel_count),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGBA of one pixel.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let p = self.data.get(offset..offset + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }
}

/// Applies brightness then contrast to RGB channels, leaving alpha alone.
#[derive(Debug, Clone)]
pub struct FrameEnhancer {
    enabled: bool,
    lut: [u8; 256],
}

impl FrameEnhancer {
    /// Build the lookup table for the given settings.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(settings: &Enhancement) -> Self {
        let mut lut = [0u8; 256];
        for (value, slot) in (0u8..=255).zip(lut.iter_mut()) {
            let brightened = f32::from(value) / 255.0 * settings.brightness;
            let contrasted = (brightened - 0.5).mul_add(settings.contrast, 0.5);
            *slot = (contrasted.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        Self {
            enabled: settings.enabled,
            lut,
        }
    }

    /// Whether frames are modified at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Mapped value of one channel.
    #[must_use]
    pub fn map_channel(&self, value: u8) -> u8 {
        self.lut[usize::from(value)]
    }

    /// Enhance a frame in place.
    pub fn apply(&self, frame: &mut VideoFrame) {
        if !self.enabled {
            return;
        }
        for pixel in frame.data.chunks_exact_mut(4) {
            for channel in &mut pixel[..3] {
                *channel = self.lut[usize::from(*channel)];
            }
        }
    }

    /// Enhanced copy of a frame.
    #[must_use]
    pub fn enhanced(&self, frame: &VideoFrame) -> VideoFrame {
        let mut copy = frame.clone();
        self.apply(&mut copy);
        copy
    }
}

impl Default for FrameEnhancer {
    fn default() -> Self {
        Self::new(&Enhancement::default())
    }
}
