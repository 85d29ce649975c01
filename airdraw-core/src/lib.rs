//! # Air Draw Core
//!
//! Raster-free gesture logic for drawing in the air with one hand.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                airdraw-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Landmarks       │  Gestures                │
//! │  - HandFrame     │  - Pinch hysteresis      │
//! │  - Normalizer    │  - Dropout debouncing    │
//! │  - Mirroring     │  - Hit-test dispatch     │
//! ├─────────────────────────────────────────────┤
//! │  Controls        │  Host services           │
//! │  - Scene         │  - Camera manager        │
//! │  - Palette       │  - Diagnostics           │
//! └─────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod camera;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod dropout;
pub mod element;
pub mod error;
pub mod landmark;
pub mod normalize;
pub mod pinch;
pub mod scene;
pub mod tool;

pub use camera::{CameraError, CameraManager, CameraProvider, Remediation};
pub use config::{Enhancement, GestureConfig};
pub use diagnostics::{DiagnosticsReporter, DiagnosticsSnapshot, EngineStatus, FrameObservation};
pub use dispatch::{Activation, DispatchOutcome, HitDispatcher, HoverChange, InteractiveSurface};
pub use dropout::{DropoutDebouncer, DropoutStatus};
pub use element::{ControlAction, Element, ElementId, ElementKind, Transform};
pub use error::{CoreError, CoreResult};
pub use landmark::{HandFrame, Landmark, INDEX_TIP, LANDMARK_COUNT, THUMB_TIP};
pub use normalize::{
    LandmarkNormalizer, NormalizedHand, PixelPoint, ScreenRect, SurfaceSize, SurfaceUpdate,
};
pub use pinch::{PinchConfig, PinchState, PinchStateMachine, PinchTransition};
pub use scene::{Scene, CANVAS_LABEL, PRESS_FEEDBACK};
pub use tool::{
    BlendMode, ControlCommand, GlowProfile, Palette, Rgba, Tool, ToolProfile, DEFAULT_SWATCHES,
};

/// Air Draw core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
