//! # Air Draw Renderer
//!
//! CPU raster layers built on tiny-skia.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Overlay      (cleared + redrawn per frame) │
//! ├─────────────────────────────────────────────┤
//! │  Drawing      (persistent ink)              │
//! ├─────────────────────────────────────────────┤
//! │  Video        (mirrored camera frame)       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Each layer has exactly one writer: [`StrokeRenderer`] owns the drawing,
//! [`OverlayRenderer`] owns the overlay.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod enhance;
pub mod error;
pub mod export;
pub mod overlay;
pub mod stroke;
pub mod surface;

pub use enhance::{FrameEnhancer, VideoFrame};
pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, ExportFormat, SurfaceExporter};
pub use overlay::{Cursor, CursorStyle, OverlayRenderer};
pub use stroke::{StrokeRenderer, StrokeSession};
pub use surface::RasterSurface;
