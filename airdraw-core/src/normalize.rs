//! Landmark normalization and coordinate mapping.
//!
//! The estimator reports landmarks in normalized video coordinates of the raw
//! (un-mirrored) camera image. Everything downstream works in one of two
//! spaces:
//!
//! - **surface space**: pixels of the drawing/overlay surfaces, sized to the
//!   native video resolution and mirrored horizontally so the picture behaves
//!   like a looking glass for a front-facing camera;
//! - **screen space**: the on-screen bounds of the interactive surface, which
//!   may be scaled and offset relative to the video.

use serde::{Deserialize, Serialize};

use crate::landmark::{HandFrame, Landmark, INDEX_TIP, LANDMARK_COUNT, THUMB_TIP};

/// Pixel dimensions of the drawing and overlay surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceSize {
    /// Create a size, returning `None` when either dimension is zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }
}

/// A point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    /// X in pixels.
    pub x: f32,
    /// Y in pixels.
    pub y: f32,
}

impl PixelPoint {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Distance to another point in pixels.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// On-screen bounds of the interactive surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    /// Left edge in screen pixels.
    pub left: f32,
    /// Top edge in screen pixels.
    pub top: f32,
    /// Width in screen pixels.
    pub width: f32,
    /// Height in screen pixels.
    pub height: f32,
}

impl ScreenRect {
    /// Create a rectangle.
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Map a raw landmark into screen space, flipping x when `mirror` is set.
    #[must_use]
    pub fn map_normalized(&self, landmark: Landmark, mirror: bool) -> PixelPoint {
        let x = if mirror { 1.0 - landmark.x } else { landmark.x };
        PixelPoint::new(
            x.mul_add(self.width, self.left),
            landmark.y.mul_add(self.height, self.top),
        )
    }

    /// Fractional position of a screen point inside this rectangle.
    #[must_use]
    pub fn fraction_of(&self, point: PixelPoint) -> (f32, f32) {
        let fx = if self.width > 0.0 {
            (point.x - self.left) / self.width
        } else {
            0.0
        };
        let fy = if self.height > 0.0 {
            (point.y - self.top) / self.height
        } else {
            0.0
        };
        (fx, fy)
    }

    /// Whether the point lies inside the rectangle (edges inclusive).
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left
            && x <= self.left + self.width
            && y >= self.top
            && y <= self.top + self.height
    }
}

/// Outcome of feeding the current video dimensions to the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceUpdate {
    /// No valid dimensions are known yet; the frame must be skipped.
    Unavailable,
    /// Dimensions are the same as before.
    Unchanged(SurfaceSize),
    /// Dimensions became known or changed; both surfaces must be resized.
    Resized(SurfaceSize),
}

/// A hand mapped into surface pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedHand {
    /// Every landmark in surface space, estimator order.
    pub points: [PixelPoint; LANDMARK_COUNT],
    /// The raw landmarks this was derived from.
    pub raw: HandFrame,
}

impl NormalizedHand {
    /// Index fingertip in surface space.
    #[must_use]
    pub fn index_tip(&self) -> PixelPoint {
        self.points[INDEX_TIP]
    }

    /// Thumb tip in surface space.
    #[must_use]
    pub fn thumb_tip(&self) -> PixelPoint {
        self.points[THUMB_TIP]
    }
}

/// Converts estimator landmarks into surface pixel coordinates.
#[derive(Debug, Clone)]
pub struct LandmarkNormalizer {
    mirror: bool,
    surface: Option<SurfaceSize>,
}

impl LandmarkNormalizer {
    /// Create a normalizer. `mirror` flips the x axis.
    #[must_use]
    pub fn new(mirror: bool) -> Self {
        Self {
            mirror,
            surface: None,
        }
    }

    /// The surface size captured so far.
    #[must_use]
    pub fn surface(&self) -> Option<SurfaceSize> {
        self.surface
    }

    /// Feed the native video dimensions of the current frame.
    ///
    /// Zero dimensions never overwrite a previously captured size.
    pub fn observe_video(&mut self, width: u32, height: u32) -> SurfaceUpdate {
        match (SurfaceSize::new(width, height), self.surface) {
            (Some(size), Some(current)) if size == current => SurfaceUpdate::Unchanged(size),
            (Some(size), previous) => {
                tracing::debug!(
                    "Surface resized {:?} -> {}x{}",
                    previous,
                    size.width,
                    size.height
                );
                self.surface = Some(size);
                SurfaceUpdate::Resized(size)
            }
            (None, Some(current)) => SurfaceUpdate::Unchanged(current),
            (None, None) => SurfaceUpdate::Unavailable,
        }
    }

    /// Map a single landmark into surface space.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_surface(&self, landmark: Landmark, size: SurfaceSize) -> PixelPoint {
        let x = if self.mirror {
            1.0 - landmark.x
        } else {
            landmark.x
        };
        PixelPoint::new(x * size.width as f32, landmark.y * size.height as f32)
    }

    /// Map a single landmark into screen space with the same mirroring as
    /// the surfaces.
    #[must_use]
    pub fn to_screen(&self, landmark: Landmark, bounds: &ScreenRect) -> PixelPoint {
        bounds.map_normalized(landmark, self.mirror)
    }

    /// Map a whole hand into surface space.
    ///
    /// Returns `None` when no surface size has been captured yet.
    #[must_use]
    pub fn normalize(&self, frame: &HandFrame) -> Option<NormalizedHand> {
        let size = self.surface?;
        let points = (*frame.points()).map(|lm| self.to_surface(lm, size));
        Some(NormalizedHand {
            points,
            raw: frame.clone(),
        })
    }
}

impl Default for LandmarkNormalizer {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_tip(x: f32, y: f32) -> HandFrame {
        let mut points = vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT];
        points[INDEX_TIP] = Landmark::new(x, y);
        HandFrame::new(points).expect("valid frame")
    }

    #[test]
    fn test_no_dimensions_discards_frame() {
        let mut normalizer = LandmarkNormalizer::default();
        assert_eq!(normalizer.observe_video(0, 0), SurfaceUpdate::Unavailable);
        assert!(normalizer.normalize(&frame_with_tip(0.1, 0.1)).is_none());
    }

    #[test]
    fn test_resize_reported_once_then_on_change() {
        let mut normalizer = LandmarkNormalizer::default();
        let vga = SurfaceSize::new(640, 480).expect("size");
        let resized = SurfaceUpdate::Resized(vga);
        assert_eq!(normalizer.observe_video(640, 480), resized);
        let unchanged = SurfaceUpdate::Unchanged(vga);
        assert_eq!(normalizer.observe_video(640, 480), unchanged);
        // A transient zero-size read keeps the captured size.
        assert_eq!(normalizer.observe_video(0, 0), unchanged);

        let hd = SurfaceSize::new(1280, 720).expect("size");
        let resized = SurfaceUpdate::Resized(hd);
        assert_eq!(normalizer.observe_video(1280, 720), resized);
    }

    #[test]
    fn test_mirrors_horizontally() {
        let mut normalizer = LandmarkNormalizer::new(true);
        normalizer.observe_video(640, 480);
        let hand = normalizer
            .normalize(&frame_with_tip(0.25, 0.5))
            .expect("normalized");
        assert!((hand.index_tip().x - 480.0).abs() < 1e-3);
        assert!((hand.index_tip().y - 240.0).abs() < 1e-3);
    }

    #[test]
    fn test_unmirrored_passthrough() {
        let mut normalizer = LandmarkNormalizer::new(false);
        normalizer.observe_video(100, 100);
        let hand = normalizer
            .normalize(&frame_with_tip(0.25, 0.5))
            .expect("normalized");
        assert!((hand.index_tip().x - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_screen_mapping_uses_bounds_not_video() {
        let rect = ScreenRect::new(100.0, 50.0, 800.0, 600.0);
        let p = rect.map_normalized(Landmark::new(0.25, 0.5), true);
        assert!((p.x - 700.0).abs() < 1e-3);
        assert!((p.y - 350.0).abs() < 1e-3);
        let (fx, fy) = rect.fraction_of(p);
        assert!((fx - 0.75).abs() < 1e-5);
        assert!((fy - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_screen_and_surface_agree_on_mirroring() {
        let rect = ScreenRect::new(0.0, 0.0, 1000.0, 500.0);
        for mirror in [true, false] {
            let mut normalizer = LandmarkNormalizer::new(mirror);
            normalizer.observe_video(100, 50);
            let size = normalizer.surface().expect("size");
            let lm = Landmark::new(0.1, 0.5);

            let surface = normalizer.to_surface(lm, size);
            let screen = normalizer.to_screen(lm, &rect);
            let (fx, _) = rect.fraction_of(screen);
            assert!((fx - surface.x / 100.0).abs() < 1e-5, "mirror={mirror}");
        }
    }
}
