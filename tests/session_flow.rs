/// End-to-end tests for the action session: select, target, commit, execute
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;

use stride_core::config::MovementConfig;
use stride_core::ecs::components::{Footprint, ObstacleTraits};
use stride_core::ecs::physics::ObstacleField;
use stride_core::game_manager::GamePhase;
use stride_core::movement::{
    ActionEvent, ActionKind, ActionSession, EnvelopeDisplay, FrameInput, GroundPlane, PointerRay,
    PresentationSink,
};

/// Everything the session asked the presentation layer to do
#[derive(Debug, Clone, PartialEq)]
enum Shown {
    Envelope(EnvelopeDisplay),
    HideEnvelope,
    Path { points: usize, valid: bool },
    HidePath,
    Marker { point: Vec3, valid: bool },
    HideMarker,
    Phase(GamePhase),
}

#[derive(Clone, Default)]
struct RecordingSink {
    calls: Rc<RefCell<Vec<Shown>>>,
    moves: Rc<RefCell<Vec<Vec3>>>,
}

impl RecordingSink {
    fn calls(&self) -> Vec<Shown> {
        self.calls.borrow().clone()
    }

    fn last_envelope(&self) -> Option<EnvelopeDisplay> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            Shown::Envelope(display) => Some(*display),
            _ => None,
        })
    }

    fn last_path(&self) -> Option<(usize, bool)> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            Shown::Path { points, valid } => Some((*points, *valid)),
            _ => None,
        })
    }
}

impl PresentationSink for RecordingSink {
    fn show_envelope(&mut self, display: &EnvelopeDisplay) {
        self.calls.borrow_mut().push(Shown::Envelope(*display));
    }
    fn hide_envelope(&mut self) {
        self.calls.borrow_mut().push(Shown::HideEnvelope);
    }
    fn show_path(&mut self, points: &[Vec3], valid: bool) {
        self.calls.borrow_mut().push(Shown::Path {
            points: points.len(),
            valid,
        });
    }
    fn hide_path(&mut self) {
        self.calls.borrow_mut().push(Shown::HidePath);
    }
    fn show_marker(&mut self, point: Vec3, valid: bool) {
        self.calls.borrow_mut().push(Shown::Marker { point, valid });
    }
    fn hide_marker(&mut self) {
        self.calls.borrow_mut().push(Shown::HideMarker);
    }
    fn phase_changed(&mut self, phase: GamePhase) {
        self.calls.borrow_mut().push(Shown::Phase(phase));
    }
    fn actor_moved(&mut self, position: Vec3, _facing: Vec3) {
        self.moves.borrow_mut().push(position);
    }
}

const DT: f32 = 1.0 / 60.0;

fn close(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-3
}

fn ray_at(x: f32, z: f32) -> PointerRay {
    PointerRay::looking_down_at(Vec3::new(x, 0.0, z))
}

fn session_with(obstacles: ObstacleField) -> (ActionSession, RecordingSink) {
    let sink = RecordingSink::default();
    let session = ActionSession::builder(MovementConfig::default())
        .actor(Vec3::ZERO, Vec3::Z)
        .new_phase()
        .picker(GroundPlane::new(0.0))
        .obstacles(obstacles)
        .sink(sink.clone())
        .try_build()
        .unwrap();
    (session, sink)
}

fn crate_field(center_z: f32) -> ObstacleField {
    let mut field = ObstacleField::new();
    field.add_obstacle(
        Vec3::new(0.0, 0.5, center_z),
        Footprint::Cuboid {
            half_extents: Vec3::splat(0.5),
        },
        ObstacleTraits::jumpable(),
    );
    field
}

fn wall_field(center_z: f32) -> ObstacleField {
    let mut field = ObstacleField::new();
    field.add_obstacle(
        Vec3::new(0.0, 1.5, center_z),
        Footprint::Cuboid {
            half_extents: Vec3::new(4.0, 1.5, 0.2),
        },
        ObstacleTraits::solid(),
    );
    field
}

#[test]
fn run_straight_ahead_at_max_speed() {
    let (mut session, sink) = session_with(ObstacleField::new());

    session.tick(&FrameInput::speed(5.0), DT);
    session.tick(&FrameInput::select(ActionKind::Run), DT);
    assert_eq!(session.phase(), Some(GamePhase::Targeting));
    assert_eq!(session.action(), ActionKind::Run);

    let envelope = sink.last_envelope().unwrap();
    assert!((envelope.half_angle - 15.0).abs() < 1e-4);
    assert!((envelope.radius - 6.0).abs() < 1e-4);

    session.tick(&FrameInput::point_at(ray_at(0.0, 10.0)), DT);
    let assessment = session.assessment().unwrap();
    assert!(assessment.is_fully_valid());
    assert!(close(assessment.target.point, Vec3::new(0.0, 0.0, 6.0)));
    assert!(assessment.target.angle.abs() < 1e-4);
    assert_eq!(sink.last_path(), Some((21, true)));

    session.tick(&FrameInput::confirm_at(ray_at(0.0, 10.0)), DT);
    assert_eq!(session.phase(), Some(GamePhase::Executing));
    assert!(session.is_moving());
    assert!(!session.can_move());

    session.tick(&FrameInput::idle(), 0.6);
    assert!(session.is_moving());
    session.tick(&FrameInput::idle(), 0.6);

    assert_eq!(session.phase(), Some(GamePhase::Planning));
    assert!(!session.is_moving());
    assert!(session.can_move());
    assert_eq!(session.action(), ActionKind::None);
    assert!(close(session.actor().position(), Vec3::new(0.0, 0.0, 6.0)));
    assert!(close(session.actor().facing(), Vec3::Z));
    assert_eq!(session.phase_handle().unwrap().borrow().current_turn(), 2);

    let events = session.action_log().events();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], ActionEvent::ActionSelected { turn: 1, kind: ActionKind::Run }));
    assert!(matches!(events[1], ActionEvent::MoveCommitted { turn: 1, .. }));
    assert!(matches!(events[2], ActionEvent::MoveCompleted { turn: 1, .. }));
    assert!(!sink.moves.borrow().is_empty());
}

#[test]
fn pick_behind_actor_clamps_to_arc_edge() {
    let (mut session, _sink) = session_with(ObstacleField::new());

    session.tick(&FrameInput::speed(1.0), DT);
    session.tick(&FrameInput::select(ActionKind::Run), DT);
    session.tick(&FrameInput::point_at(ray_at(0.0, -5.0)), DT);

    // Slowest run: 120° arc, radius 1
    let target = session.assessment().unwrap().target;
    assert!((target.angle.abs() - 60.0).abs() < 1e-3);
    let expected_x = 60f32.to_radians().sin() * target.angle.signum();
    assert!(close(target.point, Vec3::new(expected_x, 0.0, 0.5)));
}

#[test]
fn pick_too_close_is_rejected() {
    let (mut session, sink) = session_with(ObstacleField::new());

    session.tick(&FrameInput::select(ActionKind::Run), DT);
    session.tick(&FrameInput::confirm_at(ray_at(0.1, 0.2)), DT);

    assert!(!session.assessment().unwrap().target.on_arc);
    assert_eq!(sink.last_path().map(|(_, valid)| valid), Some(false));
    assert_eq!(session.phase(), Some(GamePhase::Targeting));
    assert_eq!(session.action_log().committed_moves(), 0);
}

#[test]
fn second_confirm_during_execution_is_ignored() {
    let (mut session, _sink) = session_with(ObstacleField::new());

    session.tick(&FrameInput::select(ActionKind::Run), DT);
    session.tick(&FrameInput::confirm_at(ray_at(0.0, 4.0)), DT);
    assert_eq!(session.phase(), Some(GamePhase::Executing));

    session.tick(&FrameInput::confirm_at(ray_at(2.0, 4.0)), DT);
    session.tick(&FrameInput::select(ActionKind::Jump), DT);

    assert_eq!(session.action_log().committed_moves(), 1);
    assert_eq!(session.action(), ActionKind::Run);
    assert_eq!(session.phase(), Some(GamePhase::Executing));
}

#[test]
fn switching_action_kind_re_enters_targeting() {
    let (mut session, sink) = session_with(ObstacleField::new());

    session.tick(&FrameInput::speed(3.0), DT);
    session.tick(&FrameInput::select(ActionKind::Run), DT);
    session.tick(&FrameInput::select(ActionKind::Jump), DT);

    assert_eq!(session.phase(), Some(GamePhase::Targeting));
    assert_eq!(session.action(), ActionKind::Jump);

    let events = session.action_log().events();
    assert!(matches!(events[0], ActionEvent::ActionSelected { kind: ActionKind::Run, .. }));
    assert!(matches!(events[1], ActionEvent::TargetingCancelled { kind: ActionKind::Run, .. }));
    assert!(matches!(events[2], ActionEvent::ActionSelected { kind: ActionKind::Jump, .. }));

    // Mid speed jump: 60° arc, radius 5
    let envelope = sink.last_envelope().unwrap();
    assert!((envelope.half_angle - 30.0).abs() < 1e-4);
    assert!((envelope.radius - 5.0).abs() < 1e-4);

    // Selecting the same kind again changes nothing
    session.tick(&FrameInput::select(ActionKind::Jump), DT);
    assert_eq!(session.action_log().len(), 3);
}

#[test]
fn cancel_returns_to_planning_and_hides_displays() {
    let (mut session, sink) = session_with(ObstacleField::new());

    session.tick(&FrameInput::select(ActionKind::Jump), DT);
    session.tick(&FrameInput::point_at(ray_at(0.0, 5.0)), DT);
    session.tick(&FrameInput::cancel(), DT);

    assert_eq!(session.phase(), Some(GamePhase::Planning));
    assert_eq!(session.action(), ActionKind::None);
    assert!(session.assessment().is_none());

    let calls = sink.calls();
    let tail = &calls[calls.len() - 4..];
    assert_eq!(
        tail,
        &[
            Shown::HideEnvelope,
            Shown::HidePath,
            Shown::HideMarker,
            Shown::Phase(GamePhase::Planning)
        ]
    );
}

#[test]
fn speed_change_while_targeting_updates_arc() {
    let (mut session, sink) = session_with(ObstacleField::new());

    session.tick(&FrameInput::select(ActionKind::Run), DT);
    let before = sink.last_envelope().unwrap();

    session.tick(&FrameInput::speed(5.0), DT);
    let after = sink.last_envelope().unwrap();
    assert!(after.radius > before.radius);
    assert!(after.half_angle < before.half_angle);

    // Out of range speeds clamp
    assert_eq!(session.change_speed(99.0), 5.0);
    assert_eq!(session.change_speed(-3.0), 1.0);
}

#[test]
fn jump_clears_low_obstacle_that_blocks_run() {
    let (mut session, sink) = session_with(crate_field(3.0));

    session.tick(&FrameInput::speed(3.0), DT);
    session.tick(&FrameInput::select(ActionKind::Run), DT);
    session.tick(&FrameInput::point_at(ray_at(0.0, 10.0)), DT);
    let run = session.assessment().unwrap();
    assert!(run.point_blocked || run.path_blocked);
    assert_eq!(sink.last_path().map(|(_, valid)| valid), Some(false));

    session.tick(&FrameInput::select(ActionKind::Jump), DT);
    session.tick(&FrameInput::point_at(ray_at(0.0, 10.0)), DT);
    let jump = session.assessment().unwrap();
    assert!(close(jump.target.point, Vec3::new(0.0, 0.0, 5.0)));
    assert!(jump.is_fully_valid());

    session.tick(&FrameInput::confirm_at(ray_at(0.0, 10.0)), DT);
    assert_eq!(session.phase(), Some(GamePhase::Executing));

    // Peak height is above the ground partway through
    session.tick(&FrameInput::idle(), 0.4);
    let peak = session.follow().unwrap().position();
    assert!(peak.y > 0.5);

    session.tick(&FrameInput::idle(), 0.5);
    assert_eq!(session.phase(), Some(GamePhase::Planning));
    assert!(close(session.actor().position(), Vec3::new(0.0, 0.0, 5.0)));
}

#[test]
fn jump_cannot_clear_solid_wall() {
    let (mut session, _sink) = session_with(wall_field(3.0));

    session.tick(&FrameInput::speed(3.0), DT);
    session.tick(&FrameInput::select(ActionKind::Jump), DT);
    session.tick(&FrameInput::confirm_at(ray_at(0.0, 10.0)), DT);

    let jump = session.assessment().unwrap();
    assert!(!jump.point_blocked);
    assert!(jump.path_blocked);
    assert_eq!(session.phase(), Some(GamePhase::Targeting));
    assert_eq!(session.action_log().committed_moves(), 0);
}

#[test]
fn losing_the_pointer_clears_preview() {
    let (mut session, sink) = session_with(ObstacleField::new());

    session.tick(&FrameInput::select(ActionKind::Run), DT);
    session.tick(&FrameInput::point_at(ray_at(0.0, 4.0)), DT);
    assert!(session.assessment().is_some());

    session.tick(&FrameInput::idle(), DT);
    assert!(session.assessment().is_none());
    let calls = sink.calls();
    assert_eq!(&calls[calls.len() - 2..], &[Shown::HidePath, Shown::HideMarker]);
}

#[test]
fn pause_freezes_move_and_resume_lets_it_finish() {
    let (mut session, _sink) = session_with(ObstacleField::new());
    let phase = session.phase_handle().unwrap().clone();

    session.tick(&FrameInput::select(ActionKind::Run), DT);
    session.tick(&FrameInput::confirm_at(ray_at(0.0, 4.0)), DT);
    session.tick(&FrameInput::idle(), 0.3);
    let progress = session.follow().unwrap().progress();

    assert!(phase.borrow_mut().pause());
    session.tick(&FrameInput::idle(), 5.0);
    assert_eq!(session.follow().unwrap().progress(), progress);
    assert!(session.is_moving());

    phase.borrow_mut().resume();
    session.tick(&FrameInput::idle(), 1.0);
    assert!(!session.is_moving());
    assert!(session.can_move());
    assert_eq!(session.phase(), Some(GamePhase::Planning));
    // The turn did not end through execution
    assert_eq!(phase.borrow().current_turn(), 1);
}

#[test]
fn missing_obstacle_query_never_blocks() {
    let sink = RecordingSink::default();
    let mut session = ActionSession::builder(MovementConfig::default())
        .new_phase()
        .picker(GroundPlane::new(0.0))
        .sink(sink.clone())
        .build();
    assert!(session.wiring_report().is_err());

    session.tick(&FrameInput::select(ActionKind::Run), DT);
    session.tick(&FrameInput::point_at(ray_at(0.0, 4.0)), DT);
    assert!(session.assessment().unwrap().is_fully_valid());
}

#[test]
fn selection_waits_for_resumed_move_to_finish() {
    let (mut session, sink) = session_with(ObstacleField::new());
    let phase = session.phase_handle().unwrap().clone();

    session.tick(&FrameInput::select(ActionKind::Run), DT);
    session.tick(&FrameInput::confirm_at(ray_at(0.0, 4.0)), DT);
    session.tick(&FrameInput::idle(), 0.2);

    assert!(phase.borrow_mut().pause());
    phase.borrow_mut().resume();

    // Still carrying the run; a new action cannot start yet
    session.tick(&FrameInput::select(ActionKind::Jump), DT);
    assert_eq!(session.phase(), Some(GamePhase::Planning));
    assert_eq!(session.action(), ActionKind::Run);
    assert!(session.is_moving());
    let selections = session
        .action_log()
        .events()
        .iter()
        .filter(|e| matches!(e, ActionEvent::ActionSelected { .. }))
        .count();
    assert_eq!(selections, 1);

    session.tick(&FrameInput::idle(), 1.0);
    assert!(!session.is_moving());
    assert_eq!(session.action(), ActionKind::None);
    assert!(close(session.actor().position(), Vec3::new(0.0, 0.0, 3.5)));

    // Now the jump is selected from the finished pose
    session.tick(&FrameInput::select(ActionKind::Jump), DT);
    assert_eq!(session.phase(), Some(GamePhase::Targeting));
    assert_eq!(session.action(), ActionKind::Jump);
    assert!(close(sink.last_envelope().unwrap().origin, Vec3::new(0.0, 0.0, 3.5)));

    session.tick(&FrameInput::confirm_at(ray_at(0.0, 9.0)), DT);
    assert_eq!(session.phase(), Some(GamePhase::Executing));
    assert_eq!(session.action(), ActionKind::Jump);
    assert_eq!(session.action_log().committed_moves(), 2);
}

#[test]
fn resume_out_of_targeting_drops_selection() {
    let (mut session, sink) = session_with(ObstacleField::new());
    let phase = session.phase_handle().unwrap().clone();

    session.tick(&FrameInput::select(ActionKind::Run), DT);
    session.tick(&FrameInput::point_at(ray_at(0.0, 4.0)), DT);
    assert_eq!(session.action(), ActionKind::Run);

    assert!(phase.borrow_mut().pause());
    phase.borrow_mut().resume();
    session.tick(&FrameInput::idle(), DT);

    assert_eq!(session.phase(), Some(GamePhase::Planning));
    assert_eq!(session.action(), ActionKind::None);
    assert!(session.assessment().is_none());
    let calls = sink.calls();
    assert_eq!(calls.last(), Some(&Shown::Phase(GamePhase::Planning)));

    session.tick(&FrameInput::select(ActionKind::Jump), DT);
    assert_eq!(session.action(), ActionKind::Jump);
    assert_eq!(session.phase(), Some(GamePhase::Targeting));
}
