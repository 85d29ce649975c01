//! # Air Draw Desktop
//!
//! Headless host for the Air Draw engine.
//!
//! Replays a recorded landmark stream (or a built-in demo gesture) through
//! the frame loop against a synthetic camera, then writes the drawing, the
//! last overlay and the final diagnostics to an output directory.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p airdraw-desktop -- --recording session.jsonl --output out/
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `DesktopConfig` - Video size, frame rate, input and output paths
//! - `ReplayEstimator` - `HandEstimator` backed by a JSON-lines recording
//! - `CameraSource` - `VideoSource` backed by a synthetic camera

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod camera;
mod replay;

pub use camera::{CameraSource, SyntheticCamera, SyntheticStream};
pub use replay::{RecordedFrame, Recording, ReplayEstimator};

use std::path::{Path, PathBuf};

use airdraw_app::{EngineError, FrameLoop, FrameLoopConfig, GestureEngine, LoopError};
use airdraw_core::{CoreError, DiagnosticsSnapshot, GestureConfig};
use airdraw_renderer::{ExportFormat, RenderError, SurfaceExporter};
use clap::Parser;
use thiserror::Error;

/// Errors from a desktop run.
#[derive(Debug, Error)]
pub enum DesktopError {
    /// Invalid gesture configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),

    /// The engine could not be created.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// The frame loop failed.
    #[error("Frame loop error: {0}")]
    Loop(#[from] LoopError),

    /// Export failed.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// A recording line could not be parsed.
    #[error("Recording line {line}: {message}")]
    Recording {
        /// 1-based line number.
        line: usize,
        /// Parser message.
        message: String,
    },

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File system error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for desktop operations.
pub type DesktopResult<T> = Result<T, DesktopError>;

/// Command-line arguments for airdraw-desktop.
#[derive(Debug, Clone, Parser)]
#[command(name = "airdraw-desktop")]
#[command(about = "Replay a hand-landmark recording through the Air Draw engine")]
#[command(version)]
pub struct CliArgs {
    /// JSON-lines landmark recording. Uses a built-in demo gesture when omitted.
    #[arg(long, env = "AIRDRAW_RECORDING")]
    pub recording: Option<PathBuf>,

    /// Gesture configuration JSON file
    #[arg(long, env = "AIRDRAW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for exported images and diagnostics
    #[arg(long, short, default_value = "airdraw-out")]
    pub output: PathBuf,

    /// Video width in pixels
    #[arg(long, default_value = "640")]
    pub width: u32,

    /// Video height in pixels
    #[arg(long, default_value = "480")]
    pub height: u32,

    /// Frames per second
    #[arg(long, default_value = "30")]
    pub fps: u32,
}

/// Desktop run configuration.
#[derive(Debug, Clone)]
pub struct DesktopConfig {
    /// Video width in pixels.
    pub width: u32,
    /// Video height in pixels.
    pub height: u32,
    /// Frame loop settings.
    pub frame_loop: FrameLoopConfig,
    /// Recording to replay; the demo gesture when `None`.
    pub recording: Option<PathBuf>,
    /// Gesture configuration file; defaults when `None`.
    pub config_path: Option<PathBuf>,
    /// Output directory.
    pub output_dir: PathBuf,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            frame_loop: FrameLoopConfig::default(),
            recording: None,
            config_path: None,
            output_dir: PathBuf::from("airdraw-out"),
        }
    }
}

impl From<CliArgs> for DesktopConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            width: args.width,
            height: args.height,
            frame_loop: FrameLoopConfig {
                target_fps: args.fps,
            },
            recording: args.recording,
            config_path: args.config,
            output_dir: args.output,
        }
    }
}

impl DesktopConfig {
    /// Gesture configuration from `config_path`, or the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn gesture_config(&self) -> DesktopResult<GestureConfig> {
        match &self.config_path {
            Some(path) => {
                let config = GestureConfig::load(path)?;
                tracing::info!("Loaded gesture configuration from {}", path.display());
                Ok(config)
            }
            None => Ok(GestureConfig::default()),
        }
    }

    /// The recording to replay.
    ///
    /// # Errors
    ///
    /// Returns an error if the recording cannot be read or parsed.
    pub fn load_recording(&self) -> DesktopResult<Recording> {
        match &self.recording {
            Some(path) => Recording::load(path),
            None => {
                tracing::info!("No recording given, replaying the demo gesture");
                Ok(Recording::demo())
            }
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Frames processed by the engine.
    pub frames: u64,
    /// Whether the drawing surface holds any ink.
    pub has_ink: bool,
    /// The back control was activated during the run.
    pub exit_requested: bool,
    /// Files written.
    pub exported: Vec<PathBuf>,
    /// Last published diagnostics.
    pub diagnostics: Option<DiagnosticsSnapshot>,
}

/// Replay the configured recording and export the results.
///
/// # Errors
///
/// Returns an error if configuration, replay or export fails.
pub async fn run(config: &DesktopConfig) -> DesktopResult<RunSummary> {
    let gesture = config.gesture_config()?;
    let recording = config.load_recording()?;
    tracing::info!(
        "Replaying {} frames at {}x{} ({} fps)",
        recording.len(),
        config.width,
        config.height,
        config.frame_loop.target_fps
    );

    let engine = GestureEngine::new(gesture)?;
    let source = CameraSource::new(
        SyntheticCamera::new(config.width, config.height),
        recording.len(),
    );
    let handle = FrameLoop::new(config.frame_loop).start(
        engine,
        ReplayEstimator::new(recording),
        source,
    );
    let diagnostics = handle.subscribe();
    let exit = handle.exit_signal();

    let engine = handle.join().await?;
    let snapshot = diagnostics.borrow().clone();
    let exported = export_outputs(&engine, snapshot.as_ref(), &config.output_dir)?;

    let exit_requested = *exit.borrow();
    Ok(RunSummary {
        frames: engine.frames(),
        has_ink: engine.strokes().is_some_and(|s| s.surface().has_ink()),
        exit_requested,
        exported,
        diagnostics: snapshot,
    })
}

/// Write the drawing (PNG and JPEG), the overlay and the diagnostics.
///
/// # Errors
///
/// Returns an error if a file cannot be written.
pub fn export_outputs(
    engine: &GestureEngine,
    diagnostics: Option<&DiagnosticsSnapshot>,
    dir: &Path,
) -> DesktopResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let exporter = SurfaceExporter::with_defaults();
    let mut written = Vec::new();

    match (engine.strokes(), engine.overlay()) {
        (Some(strokes), Some(overlay)) => {
            for (name, surface, format) in [
                ("drawing.png", strokes.surface(), ExportFormat::Png),
                ("drawing.jpg", strokes.surface(), ExportFormat::Jpeg),
                ("overlay.png", overlay.surface(), ExportFormat::Png),
            ] {
                let path = dir.join(name);
                std::fs::write(&path, exporter.export(surface, format)?)?;
                written.push(path);
            }
        }
        _ => tracing::warn!("No video frames were processed; skipping image export"),
    }

    if let Some(snapshot) = diagnostics {
        let path = dir.join("diagnostics.json");
        std::fs::write(&path, serde_json::to_string_pretty(snapshot)?)?;
        written.push(path);
    }

    for path in &written {
        tracing::info!("Wrote {}", path.display());
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let args = CliArgs::parse_from(["airdraw-desktop"]);
        let config = DesktopConfig::from(args);
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.frame_loop.target_fps, 30);
        assert!(config.recording.is_none());
        assert_eq!(config.output_dir, PathBuf::from("airdraw-out"));
    }

    #[test]
    fn test_cli_overrides() {
        let args = CliArgs::parse_from([
            "airdraw-desktop",
            "--recording",
            "take1.jsonl",
            "-o",
            "/tmp/out",
            "--fps",
            "60",
        ]);
        let config = DesktopConfig::from(args);
        assert_eq!(config.recording, Some(PathBuf::from("take1.jsonl")));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.frame_loop.target_fps, 60);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let config = DesktopConfig {
            config_path: Some(PathBuf::from("/nonexistent/airdraw.json")),
            ..DesktopConfig::default()
        };
        assert!(matches!(
            config.gesture_config(),
            Err(DesktopError::Config(CoreError::Io(_)))
        ));
    }
}
