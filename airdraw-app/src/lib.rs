//! # Air Draw Application
//!
//! Wires the gesture logic of `airdraw-core` and the raster layers of
//! `airdraw-renderer` into a per-frame pipeline, plus an async loop that
//! pulls video frames and landmark estimates.
//!
//! ## Usage
//!
//! ```ignore
//! use airdraw_app::{FrameLoop, FrameLoopConfig, GestureEngine};
//! use airdraw_core::GestureConfig;
//!
//! let engine = GestureEngine::new(GestureConfig::default())?;
//! let handle = FrameLoop::new(FrameLoopConfig::default()).start(engine, estimator, camera);
//! // ...
//! let engine = handle.stop().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod engine;
pub mod estimator;
pub mod frame_loop;
pub mod toolbar;

pub use engine::{
    EngineCommand, EngineError, EngineResult, FrameReport, GestureEngine, StrokeEvent,
};
pub use estimator::{EstimatorError, HandEstimator, VideoSource};
pub use frame_loop::{
    FrameLoop, FrameLoopConfig, FrameLoopHandle, LoopError, COMMAND_CAPACITY,
};
pub use toolbar::Toolbar;
