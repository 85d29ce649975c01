//! Recorded landmark streams.
//!
//! A recording is JSON lines, one estimator result per video frame:
//!
//! ```text
//! {"hand": [[0.51, 0.48], ... 21 points]}
//! {"hand": null}
//! {"error": "model timed out"}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::collections::VecDeque;
use std::f32::consts::TAU;
use std::path::Path;

use airdraw_app::{EstimatorError, HandEstimator};
use airdraw_core::{HandFrame, Landmark, INDEX_TIP, LANDMARK_COUNT, THUMB_TIP};
use airdraw_renderer::VideoFrame;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{DesktopError, DesktopResult};

/// One recorded estimator result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordedFrame {
    /// The estimator failed on this frame.
    Error {
        /// Failure message.
        error: String,
    },
    /// Landmarks of the detected hand, or `null` for no hand.
    Hand {
        /// Normalized `[x, y]` landmark coordinates.
        hand: Option<Vec<[f32; 2]>>,
    },
}

impl RecordedFrame {
    fn from_landmarks(points: &[Landmark]) -> Self {
        Self::Hand {
            hand: Some(points.iter().map(|p| [p.x, p.y]).collect()),
        }
    }

    /// The estimator result this entry replays.
    ///
    /// # Errors
    ///
    /// Returns the recorded failure, or `InvalidLandmarks` when the recorded
    /// points do not form a valid hand.
    pub fn to_estimate(&self) -> Result<Option<HandFrame>, EstimatorError> {
        match self {
            Self::Error { error } => Err(EstimatorError::Failed(error.clone())),
            Self::Hand { hand: None } => Ok(None),
            Self::Hand { hand: Some(points) } => {
                let landmarks = points.iter().map(|&[x, y]| Landmark::new(x, y)).collect();
                HandFrame::new(landmarks)
                    .map(Some)
                    .map_err(|e| EstimatorError::InvalidLandmarks(e.to_string()))
            }
        }
    }
}

/// An ordered sequence of recorded frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recording {
    frames: Vec<RecordedFrame>,
}

impl Recording {
    /// Parse JSON-lines text.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first malformed line.
    pub fn parse(text: &str) -> DesktopResult<Self> {
        let mut frames = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let frame = serde_json::from_str(line).map_err(|e| DesktopError::Recording {
                line: index + 1,
                message: e.to_string(),
            })?;
            frames.push(frame);
        }
        Ok(Self { frames })
    }

    /// Read and parse a recording file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> DesktopResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let recording = Self::parse(&text)?;
        tracing::info!(
            "Loaded {} recorded frames from {}",
            recording.len(),
            path.as_ref().display()
        );
        Ok(recording)
    }

    /// Built-in gesture script: hover, pinch, trace a circle, release, leave.
    #[must_use]
    pub fn demo() -> Self {
        const STEPS: u16 = 36;
        let open = |x: f32, y: f32| RecordedFrame::from_landmarks(&hand_points(x, y, 0.3));
        let pinched = |x: f32, y: f32| RecordedFrame::from_landmarks(&hand_points(x, y, 0.02));

        let mut frames = vec![open(0.7, 0.5); 3];
        frames.extend((0..=STEPS).map(|step| {
            let angle = TAU * f32::from(step) / f32::from(STEPS);
            let (sin, cos) = angle.sin_cos();
            pinched(0.2f32.mul_add(cos, 0.5), 0.2f32.mul_add(sin, 0.5))
        }));
        frames.extend(vec![open(0.7, 0.5); 3]);
        frames.extend(vec![RecordedFrame::Hand { hand: None }; 6]);
        Self { frames }
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the recording has no frames.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The recorded frames in order.
    #[must_use]
    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    /// Serialize back to JSON lines.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_lines(&self) -> DesktopResult<String> {
        let mut out = String::new();
        for frame in &self.frames {
            out.push_str(&serde_json::to_string(frame)?);
            out.push('\n');
        }
        Ok(out)
    }
}

/// A hand with the index tip at `(x, y)` and the thumb `gap` to its right.
fn hand_points(x: f32, y: f32, gap: f32) -> Vec<Landmark> {
    let mut points = vec![Landmark::new(x, (y + 0.15).min(1.0)); LANDMARK_COUNT];
    points[INDEX_TIP] = Landmark::new(x, y);
    points[THUMB_TIP] = Landmark::new(x + gap, y);
    points
}

/// Estimator that replays a recording, one entry per frame.
#[derive(Debug)]
pub struct ReplayEstimator {
    pending: VecDeque<RecordedFrame>,
    replayed: usize,
}

impl ReplayEstimator {
    /// Replay `recording` from the start.
    #[must_use]
    pub fn new(recording: Recording) -> Self {
        Self {
            pending: recording.frames.into(),
            replayed: 0,
        }
    }

    /// Entries not yet replayed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

#[async_trait]
impl HandEstimator for ReplayEstimator {
    async fn estimate(&mut self, _frame: &VideoFrame) -> Result<Option<HandFrame>, EstimatorError> {
        match self.pending.pop_front() {
            Some(frame) => {
                self.replayed += 1;
                frame.to_estimate()
            }
            None => Ok(None),
        }
    }

    async fn close(&mut self) {
        tracing::debug!(
            "Replay estimator closed after {} frames ({} unused)",
            self.replayed,
            self.pending.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let text = "# header\n\n{\"hand\": null}\n{\"error\": \"timeout\"}\n";
        let recording = Recording::parse(text).expect("parse");
        assert_eq!(
            recording.frames(),
            &[
                RecordedFrame::Hand { hand: None },
                RecordedFrame::Error {
                    error: "timeout".to_string()
                }
            ]
        );
    }

    #[test]
    fn test_parse_reports_line_number() {
        let text = "{\"hand\": null}\nnot json\n";
        match Recording::parse(text) {
            Err(DesktopError::Recording { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected a recording error, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_landmark_count_is_an_estimator_error() {
        let frame = RecordedFrame::Hand {
            hand: Some(vec![[0.5, 0.5]; 3]),
        };
        assert!(matches!(
            frame.to_estimate(),
            Err(EstimatorError::InvalidLandmarks(_))
        ));
    }

    #[test]
    fn test_demo_survives_json_lines() {
        let demo = Recording::demo();
        assert!(!demo.is_empty());
        let text = demo.to_json_lines().expect("serialize");
        assert_eq!(Recording::parse(&text).expect("parse").len(), demo.len());
        assert!(demo
            .frames()
            .iter()
            .all(|f| f.to_estimate().is_ok()));
    }

    #[tokio::test]
    async fn test_replay_estimator_runs_dry() {
        let recording = Recording::parse("{\"hand\": null}\n{\"error\": \"x\"}").expect("parse");
        let mut estimator = ReplayEstimator::new(recording);
        let frame = VideoFrame::solid(4, 4, [0, 0, 0, 255]);

        assert_eq!(estimator.estimate(&frame).await, Ok(None));
        assert!(estimator.estimate(&frame).await.is_err());
        assert_eq!(estimator.remaining(), 0);
        assert_eq!(estimator.estimate(&frame).await, Ok(None));
    }
}
