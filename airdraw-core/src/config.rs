//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diagnostics::DEFAULT_DIAGNOSTICS_INTERVAL;
use crate::dropout::DEFAULT_DROPOUT_TOLERANCE;
use crate::pinch::PinchConfig;
use crate::{CoreError, CoreResult};

/// Low-light enhancement applied to frames before estimation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enhancement {
    /// Apply the enhancement at all.
    pub enabled: bool,
    /// Brightness multiplier.
    pub brightness: f32,
    /// Contrast multiplier around mid-gray.
    pub contrast: f32,
}

impl Default for Enhancement {
    fn default() -> Self {
        Self {
            enabled: true,
            brightness: 1.8,
            contrast: 1.5,
        }
    }
}

/// Tunables for the gesture pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Pinch thresholds.
    pub pinch: PinchConfig,
    /// Consecutive no-hand frames tolerated before the hand counts as lost.
    pub dropout_tolerance: u32,
    /// Frames between diagnostics snapshots.
    pub diagnostics_interval: u32,
    /// Mirror the x axis for a front-facing camera.
    pub mirror: bool,
    /// Frame enhancement before estimation.
    pub enhancement: Enhancement,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch: PinchConfig::default(),
            dropout_tolerance: DEFAULT_DROPOUT_TOLERANCE,
            diagnostics_interval: DEFAULT_DIAGNOSTICS_INTERVAL,
            mirror: true,
            enhancement: Enhancement::default(),
        }
    }
}

impl GestureConfig {
    /// Check every field for a usable value.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] naming the first bad field.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> CoreResult<()> {
        self.pinch.validate()?;
        if self.diagnostics_interval == 0 {
            return Err(CoreError::InvalidConfig(
                "diagnostics interval must be at least one frame".to_string(),
            ));
        }
        let e = &self.enhancement;
        if !(e.brightness > 0.0) || !(e.contrast > 0.0) {
            return Err(CoreError::InvalidConfig(format!(
                "enhancement factors must be positive, got brightness {} contrast {}",
                e.brightness, e.contrast
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is invalid.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading gesture config from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = GestureConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dropout_tolerance, 5);
        assert_eq!(config.diagnostics_interval, 5);
        assert!(config.mirror);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{"dropout_tolerance": 2, "pinch": {"stop_threshold": 0.2}}"#;
        let config = GestureConfig::from_json(json).expect("valid config");
        assert_eq!(config.dropout_tolerance, 2);
        assert!((config.pinch.start_threshold - 0.08).abs() < f32::EPSILON);
        assert!((config.pinch.stop_threshold - 0.2).abs() < f32::EPSILON);
        assert!((config.enhancement.brightness - 1.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let result = GestureConfig::from_json(
            r#"{"pinch": {"start_threshold": 0.2, "stop_threshold": 0.1}}"#,
        );
        assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_interval_and_bad_json() {
        assert!(GestureConfig::from_json(r#"{"diagnostics_interval": 0}"#).is_err());
        assert!(matches!(
            GestureConfig::from_json("{not json"),
            Err(CoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let json = GestureConfig {
            mirror: false,
            ..GestureConfig::default()
        }
        .to_json()
        .expect("serialize");
        file.write_all(json.as_bytes()).expect("write");

        let loaded = GestureConfig::load(file.path()).expect("load");
        assert!(!loaded.mirror);

        assert!(matches!(
            GestureConfig::load("/nonexistent/airdraw.json"),
            Err(CoreError::Io(_))
        ));
    }
}
