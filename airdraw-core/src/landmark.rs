//! Hand landmark frames as delivered by the pose estimator.

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Number of landmarks in one tracked hand.
pub const LANDMARK_COUNT: usize = 21;

/// Index of the thumb tip landmark.
pub const THUMB_TIP: usize = 4;

/// Index of the index fingertip landmark.
pub const INDEX_TIP: usize = 8;

/// One tracked point, normalized to `[0, 1]` within the video frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position (0 = left edge of the raw camera image).
    pub x: f32,
    /// Vertical position (0 = top edge).
    pub y: f32,
}

impl Landmark {
    /// Create a landmark.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another landmark in normalized units.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.hypot(dy)
    }
}

/// The landmark set of a single hand for one inference cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct HandFrame {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandFrame {
    /// Build a frame from exactly [`LANDMARK_COUNT`] landmarks.
    ///
    /// # Errors
    ///
    /// Returns an error if the count is wrong or a coordinate is not finite.
    pub fn new(points: Vec<Landmark>) -> CoreResult<Self> {
        if let Some(index) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(CoreError::NonFiniteLandmark(index));
        }
        let actual = points.len();
        let points: [Landmark; LANDMARK_COUNT] =
            points.try_into().map_err(|_| CoreError::LandmarkCount {
                expected: LANDMARK_COUNT,
                actual,
            })?;
        Ok(Self { points })
    }

    /// All landmarks in estimator order.
    #[must_use]
    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    /// The index fingertip.
    #[must_use]
    pub fn index_tip(&self) -> Landmark {
        self.points[INDEX_TIP]
    }

    /// The thumb tip.
    #[must_use]
    pub fn thumb_tip(&self) -> Landmark {
        self.points[THUMB_TIP]
    }

    /// Separation of index fingertip and thumb tip in normalized units.
    #[must_use]
    pub fn pinch_distance(&self) -> f32 {
        self.index_tip().distance_to(&self.thumb_tip())
    }
}

impl TryFrom<Vec<Landmark>> for HandFrame {
    type Error = CoreError;

    fn try_from(points: Vec<Landmark>) -> CoreResult<Self> {
        Self::new(points)
    }
}

impl From<HandFrame> for Vec<Landmark> {
    fn from(frame: HandFrame) -> Self {
        frame.points.to_vec()
    }
}
