//! End-to-end scenarios for the gesture engine (airdraw-app).
//!
//! Each test feeds scripted estimator results through `process_frame` with a
//! 640x480 video stream and a 640x480 interactive surface, so screen and
//! surface coordinates coincide.

use airdraw_app::{EngineCommand, EstimatorError, FrameReport, GestureEngine, StrokeEvent};
use airdraw_core::{
    CameraError, ControlCommand, DropoutStatus, ElementId, EngineStatus, GestureConfig, HandFrame,
    Landmark, PinchTransition, ScreenRect, Tool, CANVAS_LABEL, DEFAULT_SWATCHES, INDEX_TIP,
    LANDMARK_COUNT, THUMB_TIP,
};

const OPEN: f32 = 0.3;
const PINCHED: f32 = 0.02;

fn hand(x: f32, y: f32, gap: f32) -> HandFrame {
    let mut points = vec![Landmark::new(0.5, 0.5); LANDMARK_COUNT];
    points[INDEX_TIP] = Landmark::new(x, y);
    points[THUMB_TIP] = Landmark::new(x + gap, y);
    HandFrame::new(points).expect("21 finite landmarks")
}

fn engine() -> GestureEngine {
    GestureEngine::new(GestureConfig::default()).expect("engine")
}

fn step(engine: &mut GestureEngine, hand: Option<HandFrame>) -> FrameReport {
    engine.process_frame(640, 480, Ok(hand)).expect("frame")
}

/// Raw landmark coordinates that land on the center of an element.
fn raw_at(engine: &GestureEngine, id: ElementId) -> (f32, f32) {
    let t = engine.scene().get_element(id).expect("element").transform;
    let b = engine.scene().bounds;
    let (sx, sy) = (t.x + t.width / 2.0, t.y + t.height / 2.0);
    (1.0 - (sx - b.left) / b.width, (sy - b.top) / b.height)
}

/// Idle then pinch-down over an element. Returns the pinch-down report.
fn air_tap(engine: &mut GestureEngine, id: ElementId) -> FrameReport {
    let (x, y) = raw_at(engine, id);
    step(engine, Some(hand(x, y, OPEN)));
    let report = step(engine, Some(hand(x, y, PINCHED)));
    step(engine, Some(hand(x, y, OPEN)));
    report
}

fn ink_at(engine: &GestureEngine, x: u32, y: u32) -> u8 {
    engine.strokes().expect("layers").surface().alpha_at(x, y)
}

#[test]
fn test_pinch_draws_a_stroke_in_the_canvas_area() {
    let mut engine = engine();
    let reports: Vec<_> = [
        hand(0.5, 0.5, OPEN),
        hand(0.5, 0.5, PINCHED),
        hand(0.4, 0.5, PINCHED),
        hand(0.4, 0.5, OPEN),
    ]
    .into_iter()
    .map(|h| step(&mut engine, Some(h)))
    .collect();

    let strokes: Vec<_> = reports.iter().map(|r| r.stroke).collect();
    assert_eq!(
        strokes,
        [
            StrokeEvent::None,
            StrokeEvent::Began,
            StrokeEvent::Extended,
            StrokeEvent::Closed
        ]
    );
    assert!(reports.iter().all(|r| r.activation.is_none()));
    // Raw 0.5 -> 0.4 mirrors to x 320 -> 384.
    assert!(ink_at(&engine, 350, 240) > 0);
    assert!(!engine.strokes().expect("layers").is_drawing());
}

#[test]
fn test_activation_and_stroke_are_mutually_exclusive() {
    let mut engine = engine();
    let pencil = engine.toolbar().tool(Tool::Pencil).expect("pencil");
    let (x, y) = raw_at(&engine, pencil);

    step(&mut engine, Some(hand(x, y, OPEN)));
    let down = step(&mut engine, Some(hand(x, y, PINCHED)));
    assert_eq!(down.transition, Some(PinchTransition::Down));
    assert_eq!(down.activation.as_ref().map(|a| a.element), Some(pencil));
    assert_eq!(down.stroke, StrokeEvent::None);
    assert_eq!(engine.palette().tool(), Tool::Pencil);

    // Dragging the held pinch into the canvas must not draw.
    let held = step(&mut engine, Some(hand(0.5, 0.5, PINCHED)));
    assert_eq!(held.transition, Some(PinchTransition::Held));
    assert_eq!(held.stroke, StrokeEvent::None);
    let up = step(&mut engine, Some(hand(0.5, 0.5, OPEN)));
    assert_eq!(up.stroke, StrokeEvent::None);
    assert!(!engine.strokes().expect("layers").surface().has_ink());
}

#[test]
fn test_held_pinch_activates_once() {
    let mut engine = engine();
    let clear = engine.toolbar().clear();
    let (x, y) = raw_at(&engine, clear);

    step(&mut engine, Some(hand(x, y, OPEN)));
    let fired = (0..5)
        .map(|_| step(&mut engine, Some(hand(x, y, PINCHED))))
        .filter(|r| r.activation.is_some())
        .count();
    assert_eq!(fired, 1);
    let element = engine.scene().get_element(clear).expect("clear");
    assert_eq!(element.activation_count, 1);
}

#[test]
fn test_hover_highlight_is_idempotent() {
    let mut engine = engine();
    let back = engine.toolbar().back();
    let (x, y) = raw_at(&engine, back);

    let reports: Vec<_> = (0..4)
        .map(|_| step(&mut engine, Some(hand(x, y, OPEN))))
        .collect();
    assert_eq!(reports[0].hover_change.entered, Some(back));
    assert!(reports[1..].iter().all(|r| r.hover_change.is_empty()));

    let element = engine.scene().get_element(back).expect("back");
    assert!(element.hovered);
    assert_eq!(element.highlight_count, 1);
    assert_eq!(engine.pinch_state().last_hovered, Some(back));

    // Moving into the canvas removes the highlight.
    let away = step(&mut engine, Some(hand(0.5, 0.5, OPEN)));
    assert_eq!(away.hover_change.left, Some(back));
    assert!(!engine.scene().get_element(back).expect("back").hovered);
}

#[test]
fn test_dropout_finalizes_on_first_frame_past_tolerance() {
    let mut engine = engine();
    let back = engine.toolbar().back();
    let (bx, by) = raw_at(&engine, back);
    step(&mut engine, Some(hand(bx, by, OPEN)));
    step(&mut engine, Some(hand(0.5, 0.5, PINCHED)));
    step(&mut engine, Some(hand(0.45, 0.5, PINCHED)));
    assert!(engine.strokes().expect("layers").is_drawing());

    for lost in 1..=5 {
        let report = step(&mut engine, None);
        let holding = DropoutStatus::Holding { lost_frames: lost };
        assert_eq!(report.dropout, Some(holding));
        assert!(report.hand_detected);
        assert_eq!(report.stroke, StrokeEvent::None);
        assert!(engine.strokes().expect("layers").is_drawing());
    }

    let sixth = step(&mut engine, None);
    assert!(sixth.dropout.is_some_and(DropoutStatus::requires_finalize));
    assert_eq!(sixth.stroke, StrokeEvent::Closed);
    assert!(!sixth.hand_detected);
    assert!(!engine.strokes().expect("layers").is_drawing());
    assert!(engine.pinch_state().last_hovered.is_none());
    assert!(!engine.cursor().expect("cursor").visible);

    let seventh = step(&mut engine, None);
    assert_eq!(seventh.stroke, StrokeEvent::None);
    assert!(seventh.hover_change.is_empty());

    // Re-entering while still pinched continues the old pinch without a new
    // pinch-down, so nothing is drawn.
    let back_in = step(&mut engine, Some(hand(0.5, 0.5, PINCHED)));
    assert_eq!(back_in.transition, Some(PinchTransition::Held));
    assert_eq!(back_in.stroke, StrokeEvent::None);
}

#[test]
fn test_short_dropout_continues_the_stroke() {
    let mut engine = engine();
    step(&mut engine, Some(hand(0.5, 0.5, OPEN)));
    step(&mut engine, Some(hand(0.5, 0.5, PINCHED)));
    for _ in 0..3 {
        step(&mut engine, None);
    }
    let resumed = step(&mut engine, Some(hand(0.4, 0.5, PINCHED)));
    assert_eq!(resumed.transition, Some(PinchTransition::Held));
    assert_eq!(resumed.stroke, StrokeEvent::Extended);
}

#[test]
fn test_eraser_removes_ink_but_not_overlay() {
    let mut engine = engine();
    let line = |engine: &mut GestureEngine| {
        step(engine, Some(hand(0.5, 0.5, OPEN)));
        step(engine, Some(hand(0.5, 0.5, PINCHED)));
        step(engine, Some(hand(0.4, 0.5, PINCHED)));
        step(engine, Some(hand(0.4, 0.5, OPEN)));
    };
    line(&mut engine);
    assert!(ink_at(&engine, 350, 240) > 0);

    engine.apply_command(ControlCommand::SelectTool(Tool::Eraser));
    line(&mut engine);
    assert_eq!(ink_at(&engine, 350, 240), 0);
    assert!(engine.overlay().expect("overlay").surface().has_ink());
}

#[test]
fn test_swatch_while_erasing_returns_to_pen() {
    let mut engine = engine();
    engine.apply_command(ControlCommand::SelectTool(Tool::Eraser));
    let swatch = engine.toolbar().swatch(DEFAULT_SWATCHES[1]).expect("swatch");

    let report = air_tap(&mut engine, swatch);
    assert!(report.activation.is_some());
    assert_eq!(engine.palette().tool(), Tool::Pen);
    assert_eq!(engine.palette().color(), DEFAULT_SWATCHES[1]);
    assert!(engine.scene().get_element(swatch).expect("swatch").active);
    let pen = engine.toolbar().tool(Tool::Pen).expect("pen");
    assert!(engine.scene().get_element(pen).expect("pen").active);
}

#[test]
fn test_slider_tap_sets_width() {
    let mut engine = engine();
    let slider = engine.toolbar().slider();
    air_tap(&mut engine, slider);
    assert!((engine.palette().width() - 21.0).abs() < f32::EPSILON);
}

#[test]
fn test_clear_and_back_controls() {
    let mut engine = engine();
    step(&mut engine, Some(hand(0.5, 0.5, OPEN)));
    step(&mut engine, Some(hand(0.5, 0.5, PINCHED)));
    step(&mut engine, Some(hand(0.4, 0.5, PINCHED)));
    step(&mut engine, Some(hand(0.4, 0.5, OPEN)));
    assert!(engine.strokes().expect("layers").surface().has_ink());

    let clear = engine.toolbar().clear();
    air_tap(&mut engine, clear);
    assert!(!engine.strokes().expect("layers").surface().has_ink());

    let back = engine.toolbar().back();
    let report = air_tap(&mut engine, back);
    assert!(report.exit_requested);
}

#[test]
fn test_estimator_error_holds_state() {
    let mut engine = engine();
    step(&mut engine, Some(hand(0.5, 0.5, OPEN)));
    step(&mut engine, Some(hand(0.5, 0.5, PINCHED)));

    let failed = engine
        .process_frame(640, 480, Err(EstimatorError::Failed("model lost".into())))
        .expect("frame");
    assert!(failed.error.is_some());
    assert!(failed.dropout.is_none());
    assert!(matches!(engine.status(), EngineStatus::Crashed(_)));
    assert!(engine.strokes().expect("layers").is_drawing());

    let resumed = step(&mut engine, Some(hand(0.4, 0.5, PINCHED)));
    assert_eq!(resumed.stroke, StrokeEvent::Extended);
    assert_eq!(engine.status(), &EngineStatus::Running);
}

#[test]
fn test_diagnostics_published_every_fifth_frame() {
    let mut engine = engine();
    let published: Vec<_> = (0..10)
        .map(|_| step(&mut engine, Some(hand(0.5, 0.5, OPEN))))
        .map(|report| report.diagnostics.is_some())
        .collect();
    let fifth: Vec<_> = (1..=10).map(|frame| frame % 5 == 0).collect();
    assert_eq!(published, fifth);

    let latest = engine.latest_diagnostics().expect("snapshot");
    assert!(latest.hand_detected);
    assert_eq!(latest.status, EngineStatus::Running);
    assert!((latest.pinch_threshold - 0.08).abs() < f32::EPSILON);
}

#[test]
fn test_camera_error_sets_status() {
    let mut engine = engine();
    engine.report_camera_error(&CameraError::PermissionDenied);
    assert!(matches!(
        engine.status(),
        EngineStatus::CameraUnavailable(_)
    ));
}

#[test]
fn test_set_bounds_moves_controls() {
    let mut engine = engine();
    let moved = ScreenRect::new(100.0, 50.0, 640.0, 480.0);
    engine.handle(EngineCommand::SetBounds(moved));
    let back = engine.toolbar().back();
    let (x, _) = raw_at(&engine, back);
    assert!((x - 0.95).abs() < 1e-4);
    let report = air_tap(&mut engine, back);
    assert!(report.exit_requested);
}

#[test]
fn test_restart_clears_gesture_state() {
    let mut engine = engine();
    let back = engine.toolbar().back();
    let (x, y) = raw_at(&engine, back);
    step(&mut engine, Some(hand(x, y, OPEN)));
    step(&mut engine, Some(hand(0.5, 0.5, PINCHED)));

    engine.handle(EngineCommand::Restart);
    assert!(!engine.strokes().expect("layers").is_drawing());
    assert!(!engine.pinch_state().is_pinching);
    assert!(!engine.scene().get_element(back).expect("back").hovered);
}

#[test]
fn test_unmirrored_controls_follow_the_ink() {
    let config = GestureConfig {
        mirror: false,
        ..GestureConfig::default()
    };
    let mut engine = GestureEngine::new(config).expect("engine");

    step(&mut engine, Some(hand(0.1, 0.5, OPEN)));
    let cursor = *engine.cursor().expect("layers");
    assert!((cursor.x_fraction - 0.1).abs() < 1e-4);
    assert!((cursor.y_fraction - 0.5).abs() < 1e-4);
    let overlay = engine.overlay().expect("layers").surface();
    assert!(overlay.alpha_at(64, 240) > 0);
    assert_eq!(overlay.alpha_at(576, 240), 0);

    // Without mirroring, the raw x of a control is its screen fraction.
    let clear = engine.toolbar().clear();
    let (mirrored_x, y) = raw_at(&engine, clear);
    let x = 1.0 - mirrored_x;
    step(&mut engine, Some(hand(x, y, OPEN)));
    let report = step(&mut engine, Some(hand(x, y, PINCHED)));
    assert_eq!(report.activation.as_ref().map(|a| a.element), Some(clear));
}

#[test]
fn test_diagnostics_name_what_lies_under_the_fingertip() {
    fn snapshot_at(engine: &mut GestureEngine, x: f32, y: f32) -> (Option<String>, bool) {
        let snapshot = (0..5)
            .filter_map(|_| step(engine, Some(hand(x, y, OPEN))).diagnostics)
            .last()
            .expect("one snapshot per five frames");
        (snapshot.hit_element, snapshot.hovering)
    }

    let mut engine = engine();
    let clear = engine.toolbar().clear();
    let (x, y) = raw_at(&engine, clear);
    assert_eq!(
        snapshot_at(&mut engine, x, y),
        (Some("Clear".to_string()), true)
    );
    // Bottom of the right-hand sidebar, below the swatches.
    assert_eq!(
        snapshot_at(&mut engine, 0.05, 0.99),
        (Some("colors".to_string()), false)
    );
    assert_eq!(
        snapshot_at(&mut engine, 0.5, 0.5),
        (Some(CANVAS_LABEL.to_string()), false)
    );
}
