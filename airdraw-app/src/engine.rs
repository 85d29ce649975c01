//! The per-frame gesture engine.
//!
//! One [`GestureEngine`] owns every piece of cross-frame state and runs the
//! pipeline in a fixed order each frame:
//!
//! 1. surface sizing (normalizer)
//! 2. dropout debouncing
//! 3. pinch state machine
//! 4. hit-testing and activation
//! 5. stroke rendering (only when the frame was not consumed by an activation)
//! 6. overlay rendering
//! 7. diagnostics

use std::borrow::Cow;
use std::time::Instant;

use airdraw_core::{
    Activation, CameraError, ControlAction, ControlCommand, CoreError, DiagnosticsReporter,
    DiagnosticsSnapshot, DropoutDebouncer, DropoutStatus, EngineStatus, FrameObservation,
    GestureConfig, HandFrame, HitDispatcher, HoverChange, InteractiveSurface, LandmarkNormalizer,
    Palette, PinchState, PinchStateMachine, PinchTransition, Scene, ScreenRect, SurfaceSize,
    SurfaceUpdate,
};
use airdraw_renderer::{
    Cursor, FrameEnhancer, OverlayRenderer, RenderError, StrokeRenderer, VideoFrame,
};
use thiserror::Error;

use crate::estimator::EstimatorError;
use crate::toolbar::Toolbar;

/// Errors that stop a frame from being processed.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),

    /// A raster surface could not be (re)allocated.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Commands applied between frames.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    /// A palette or surface command.
    Control(ControlCommand),
    /// The interactive surface moved or was resized on screen.
    SetBounds(ScreenRect),
    /// Reset all gesture state.
    Restart,
}

/// What happened to the stroke this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeEvent {
    /// No stroke mutation.
    #[default]
    None,
    /// A stroke was opened.
    Began,
    /// The open stroke grew by one segment.
    Extended,
    /// The open stroke was closed.
    Closed,
}

/// Summary of one processed frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameReport {
    /// Frame counter.
    pub frame: u64,
    /// No valid video dimensions were known; nothing was processed.
    pub skipped: bool,
    /// A hand was present or held through a short dropout.
    pub hand_detected: bool,
    /// Verdict of the dropout debouncer.
    pub dropout: Option<DropoutStatus>,
    /// Pinch edge, when a hand was present.
    pub transition: Option<PinchTransition>,
    /// Hover highlight changes.
    pub hover_change: HoverChange,
    /// Activation fired this frame.
    pub activation: Option<Activation>,
    /// Stroke mutation.
    pub stroke: StrokeEvent,
    /// The back control was activated.
    pub exit_requested: bool,
    /// A host-defined action was activated.
    pub custom_action: Option<String>,
    /// Snapshot published this frame.
    pub diagnostics: Option<DiagnosticsSnapshot>,
    /// Estimator error seen this frame.
    pub error: Option<String>,
}

#[derive(Debug)]
struct Layers {
    strokes: StrokeRenderer,
    overlay: OverlayRenderer,
}

impl Layers {
    fn matches(&self, size: SurfaceSize) -> bool {
        self.strokes.surface().size() == size && self.overlay.surface().size() == size
    }
}

/// Single owner of all gesture and rendering state.
#[derive(Debug)]
pub struct GestureEngine {
    config: GestureConfig,
    normalizer: LandmarkNormalizer,
    pinch: PinchStateMachine,
    debouncer: DropoutDebouncer,
    dispatcher: HitDispatcher,
    scene: Scene,
    toolbar: Toolbar,
    palette: Palette,
    layers: Option<Layers>,
    enhancer: FrameEnhancer,
    diagnostics: DiagnosticsReporter,
    frames: u64,
}

impl GestureEngine {
    /// Create an engine whose interactive surface starts at 640x480.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: GestureConfig) -> EngineResult<Self> {
        Self::with_bounds(config, ScreenRect::new(0.0, 0.0, 640.0, 480.0))
    }

    /// Create an engine with the interactive surface at `bounds`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_bounds(config: GestureConfig, bounds: ScreenRect) -> EngineResult<Self> {
        config.validate()?;
        let mut scene = Scene::new(bounds);
        let toolbar = Toolbar::install(&mut scene);
        tracing::info!(
            "Gesture engine created (pinch {:.2}/{:.2}, dropout tolerance {})",
            config.pinch.start_threshold,
            config.pinch.stop_threshold,
            config.dropout_tolerance
        );
        Ok(Self {
            normalizer: LandmarkNormalizer::new(config.mirror),
            pinch: PinchStateMachine::new(config.pinch),
            debouncer: DropoutDebouncer::new(config.dropout_tolerance),
            dispatcher: HitDispatcher::new(),
            scene,
            toolbar,
            palette: Palette::default(),
            layers: None,
            enhancer: FrameEnhancer::new(&config.enhancement),
            diagnostics: DiagnosticsReporter::new(
                config.diagnostics_interval,
                config.pinch.start_threshold,
            ),
            frames: 0,
            config,
        })
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Current palette.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// The interactive controls.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Element ids of the default controls.
    #[must_use]
    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    /// Read-only pinch state.
    #[must_use]
    pub fn pinch_state(&self) -> &PinchState {
        self.pinch.state()
    }

    /// Frames processed so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Size of the drawing and overlay surfaces, once known.
    #[must_use]
    pub fn surface_size(&self) -> Option<SurfaceSize> {
        self.normalizer.surface()
    }

    /// The persistent drawing layer.
    #[must_use]
    pub fn strokes(&self) -> Option<&StrokeRenderer> {
        self.layers.as_ref().map(|l| &l.strokes)
    }

    /// The per-frame overlay layer.
    #[must_use]
    pub fn overlay(&self) -> Option<&OverlayRenderer> {
        self.layers.as_ref().map(|l| &l.overlay)
    }

    /// The simulated cursor.
    #[must_use]
    pub fn cursor(&self) -> Option<&Cursor> {
        self.overlay().map(OverlayRenderer::cursor)
    }

    /// Current engine status.
    #[must_use]
    pub fn status(&self) -> &EngineStatus {
        self.diagnostics.status()
    }

    /// Most recently published diagnostics.
    #[must_use]
    pub fn latest_diagnostics(&self) -> Option<&DiagnosticsSnapshot> {
        self.diagnostics.latest()
    }

    /// The frame handed to the estimator: low-light enhanced when enabled.
    #[must_use]
    pub fn prepare_frame<'a>(&self, frame: &'a VideoFrame) -> Cow<'a, VideoFrame> {
        if self.enhancer.is_enabled() {
            Cow::Owned(self.enhancer.enhanced(frame))
        } else {
            Cow::Borrowed(frame)
        }
    }

    /// Apply a queued command.
    pub fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Control(control) => self.apply_command(control),
            EngineCommand::SetBounds(bounds) => self.set_bounds(bounds),
            EngineCommand::Restart => self.restart(),
        }
    }

    /// Apply a palette or surface command immediately.
    pub fn apply_command(&mut self, command: ControlCommand) {
        tracing::debug!("Control command: {:?}", command);
        if !self.palette.apply(command) {
            if let Some(layers) = self.layers.as_mut() {
                layers.strokes.clear();
            }
        }
        self.toolbar.sync(&mut self.scene, &self.palette);
    }

    /// Move the interactive surface on screen and re-layout the controls.
    pub fn set_bounds(&mut self, bounds: ScreenRect) {
        self.scene.set_bounds(bounds);
        self.toolbar.layout(&mut self.scene);
    }

    /// Reset gesture state. Ink and palette are kept.
    pub fn restart(&mut self) {
        tracing::info!("Gesture engine restarted");
        if let Some(layers) = self.layers.as_mut() {
            layers.strokes.close();
            layers.overlay.hide_cursor();
        }
        self.dispatcher
            .clear_hover(&mut self.scene, self.pinch.state().last_hovered);
        self.pinch.reset();
        self.debouncer.reset();
        self.diagnostics.set_status(EngineStatus::Initializing);
    }

    /// Record that no video is available this frame.
    pub fn report_camera_error(&mut self, error: &CameraError) -> Option<DiagnosticsSnapshot> {
        tracing::warn!("Camera unavailable: {}", error);
        self.diagnostics
            .set_status(EngineStatus::CameraUnavailable(error.to_string()));
        if let Some(layers) = self.layers.as_mut() {
            layers.overlay.render(None, false);
            layers.overlay.hide_cursor();
        }
        let observation = self.idle_observation(false);
        self.diagnostics.record(observation)
    }

    /// Mark the engine as stopped and close any open stroke.
    pub fn mark_stopped(&mut self) {
        if let Some(layers) = self.layers.as_mut() {
            layers.strokes.close();
        }
        self.diagnostics.set_status(EngineStatus::Stopped);
    }

    /// Run the pipeline for one frame of `width` x `height` video.
    ///
    /// # Errors
    ///
    /// Returns an error if the surfaces cannot be resized.
    pub fn process_frame(
        &mut self,
        width: u32,
        height: u32,
        estimate: Result<Option<HandFrame>, EstimatorError>,
    ) -> EngineResult<FrameReport> {
        self.frames += 1;
        let mut report = FrameReport {
            frame: self.frames,
            ..FrameReport::default()
        };
        self.scene.expire_feedback(Instant::now());

        match self.normalizer.observe_video(width, height) {
            SurfaceUpdate::Unavailable => {
                tracing::trace!("Frame {} skipped: no video dimensions", self.frames);
                report.skipped = true;
                return Ok(report);
            }
            SurfaceUpdate::Resized(size) => self.resize_layers(size)?,
            SurfaceUpdate::Unchanged(size) => {
                if !self.layers.as_ref().is_some_and(|l| l.matches(size)) {
                    self.resize_layers(size)?;
                }
            }
        }

        let hand = match estimate {
            Ok(hand) => {
                self.diagnostics.set_status(EngineStatus::Running);
                hand
            }
            Err(e) => {
                tracing::warn!("Estimator error on frame {}: {}", self.frames, e);
                self.diagnostics
                    .set_status(EngineStatus::Crashed(e.to_string()));
                report.error = Some(e.to_string());
                let observation = self.idle_observation(false);
                report.diagnostics = self.diagnostics.record(observation);
                return Ok(report);
            }
        };

        let status = self.debouncer.observe(hand.is_some());
        report.dropout = Some(status);

        match hand {
            Some(frame) => self.track_hand(&frame, &mut report),
            None => self.handle_missing_hand(status, &mut report),
        }
        Ok(report)
    }

    fn track_hand(&mut self, frame: &HandFrame, report: &mut FrameReport) {
        let Some(normalized) = self.normalizer.normalize(frame) else {
            report.skipped = true;
            return;
        };
        report.hand_detected = true;

        let transition = self.pinch.update(frame.pinch_distance());
        report.transition = Some(transition);

        let bounds = self.scene.bounds;
        let point = self.normalizer.to_screen(frame.index_tip(), &bounds);
        let outcome = self.dispatcher.dispatch(
            &mut self.scene,
            point,
            transition,
            self.pinch.state().last_hovered,
        );
        self.pinch.set_last_hovered(outcome.hovered);
        report.hover_change = outcome.hover_change;

        let activation_label = outcome
            .activation
            .as_ref()
            .and_then(|a| self.scene.describe(a.element));
        if let Some(action) = outcome.activation.as_ref().and_then(|a| a.action.clone()) {
            self.apply_action(action, report);
        }
        report.activation = outcome.activation;

        let Some(layers) = self.layers.as_mut() else {
            return;
        };
        let tip = normalized.index_tip();
        if !outcome.consumed {
            report.stroke = match transition {
                PinchTransition::Down => {
                    layers.strokes.begin(tip, &self.palette);
                    StrokeEvent::Began
                }
                PinchTransition::Held if layers.strokes.extend(tip) => StrokeEvent::Extended,
                PinchTransition::Up if layers.strokes.close().is_some() => StrokeEvent::Closed,
                _ => StrokeEvent::None,
            };
        }

        let pinching = transition.is_pinching();
        layers.overlay.render(Some(&normalized), pinching);
        layers
            .overlay
            .update_cursor(bounds.fraction_of(point), pinching, &self.palette);

        report.diagnostics = self.diagnostics.record(FrameObservation {
            hand_detected: true,
            hit_point: Some(point),
            hit_element: self.scene.label_at(point.x, point.y),
            hovering: outcome.hovered.is_some(),
            activation: activation_label,
            pinching,
            pinch_distance: frame.pinch_distance(),
        });
    }

    fn handle_missing_hand(&mut self, status: DropoutStatus, report: &mut FrameReport) {
        if let Some(layers) = self.layers.as_mut() {
            layers.overlay.render(None, false);
            if status.requires_finalize() {
                if layers.strokes.close().is_some() {
                    report.stroke = StrokeEvent::Closed;
                }
                layers.overlay.hide_cursor();
            }
        }
        if status.requires_finalize() {
            tracing::debug!("Hand not detected");
            report.hover_change = self
                .dispatcher
                .clear_hover(&mut self.scene, self.pinch.state().last_hovered);
            self.pinch.set_last_hovered(None);
        }

        let holding = matches!(status, DropoutStatus::Holding { .. });
        report.hand_detected = holding;
        let observation = self.idle_observation(holding);
        report.diagnostics = self.diagnostics.record(observation);
    }

    fn apply_action(&mut self, action: ControlAction, report: &mut FrameReport) {
        match action {
            ControlAction::SelectTool(tool) => {
                self.apply_command(ControlCommand::SelectTool(tool));
            }
            ControlAction::SelectColor(color) => {
                self.apply_command(ControlCommand::SelectColor(color));
            }
            ControlAction::SetWidth(width) => self.apply_command(ControlCommand::SetWidth(width)),
            ControlAction::Clear => self.apply_command(ControlCommand::Clear),
            ControlAction::Back => {
                tracing::info!("Back requested");
                report.exit_requested = true;
            }
            ControlAction::Custom(name) => report.custom_action = Some(name),
        }
    }

    fn idle_observation(&self, hand_detected: bool) -> FrameObservation {
        let state = self.pinch.state();
        FrameObservation {
            hand_detected,
            hit_point: None,
            hit_element: None,
            hovering: false,
            activation: None,
            pinching: state.is_pinching,
            pinch_distance: state.distance,
        }
    }

    fn resize_layers(&mut self, size: SurfaceSize) -> EngineResult<()> {
        match self.layers.as_mut() {
            Some(layers) => {
                layers.strokes.resize(size)?;
                layers.overlay.resize(size)?;
            }
            None => {
                self.layers = Some(Layers {
                    strokes: StrokeRenderer::new(size)?,
                    overlay: OverlayRenderer::new(size)?,
                });
            }
        }
        tracing::debug!("Surfaces sized to {}x{}", size.width, size.height);
        Ok(())
    }
}
