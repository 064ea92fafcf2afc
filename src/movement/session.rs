/// Action session: one actor's select -> target -> commit -> execute loop
///
/// The session is ticked once per frame. It reads the shared phase
/// controller to decide which input is live, re-validates the pointer target
/// every Targeting tick, and plays committed moves through a `PathFollow`.
/// Only one move can be in flight; the `can_move` latch stays false for the
/// whole execution.

use glam::Vec3;
use std::fmt;
use thiserror::Error;

use crate::config::MovementConfig;
use crate::ecs::physics::ObstacleQuery;
use crate::game_manager::{GamePhase, PhaseController, PhaseHandle};
use crate::movement::actor::{ActionKind, ActorState};
use crate::movement::envelope::{assess_target, compute_envelope, MoveEnvelope, TargetAssessment};
use crate::movement::events::{ActionEvent, ActionLog};
use crate::movement::follow::PathFollow;
use crate::movement::input::{FrameInput, GroundPicker};
use crate::movement::presentation::{EnvelopeDisplay, NullSink, PresentationSink};

/// External pieces a session depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaborator {
    PhaseController,
    GroundPicker,
    ObstacleQuery,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Collaborator::PhaseController => "phase controller",
            Collaborator::GroundPicker => "ground picker",
            Collaborator::ObstacleQuery => "obstacle query",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WiringError {
    #[error("action session is missing collaborators: {0:?}")]
    MissingCollaborators(Vec<Collaborator>),
}

/// Wires a session to its collaborators
pub struct SessionBuilder {
    config: MovementConfig,
    position: Vec3,
    facing: Vec3,
    phase: Option<PhaseHandle>,
    picker: Option<Box<dyn GroundPicker>>,
    obstacles: Option<Box<dyn ObstacleQuery>>,
    sink: Option<Box<dyn PresentationSink>>,
}

impl SessionBuilder {
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            position: Vec3::ZERO,
            facing: Vec3::Z,
            phase: None,
            picker: None,
            obstacles: None,
            sink: None,
        }
    }

    /// Starting pose of the actor
    pub fn actor(mut self, position: Vec3, facing: Vec3) -> Self {
        self.position = position;
        self.facing = facing;
        self
    }

    pub fn phase(mut self, phase: PhaseHandle) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Use a fresh phase controller configured from the movement config
    pub fn new_phase(self) -> Self {
        let phase = PhaseController::new(self.config.execution_time_scale).into_handle();
        self.phase(phase)
    }

    pub fn picker(mut self, picker: impl GroundPicker + 'static) -> Self {
        self.picker = Some(Box::new(picker));
        self
    }

    pub fn obstacles(mut self, obstacles: impl ObstacleQuery + 'static) -> Self {
        self.obstacles = Some(Box::new(obstacles));
        self
    }

    pub fn sink(mut self, sink: impl PresentationSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    fn missing(&self) -> Vec<Collaborator> {
        let mut missing = Vec::new();
        if self.phase.is_none() {
            missing.push(Collaborator::PhaseController);
        }
        if self.picker.is_none() {
            missing.push(Collaborator::GroundPicker);
        }
        if self.obstacles.is_none() {
            missing.push(Collaborator::ObstacleQuery);
        }
        missing
    }

    /// Build only if every collaborator is wired
    pub fn try_build(self) -> Result<ActionSession, WiringError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(WiringError::MissingCollaborators(missing));
        }
        Ok(self.build())
    }

    /// Build whatever is wired.
    ///
    /// Missing collaborators are logged once here; the operations that need
    /// them become no-ops (no phase controller: the session ignores input,
    /// no picker: nothing is ever targeted, no obstacle query: nothing is
    /// reported blocked).
    pub fn build(self) -> ActionSession {
        let missing = self.missing();
        for collaborator in &missing {
            log::warn!("ActionSession: no {collaborator} wired; dependent features are disabled");
        }

        if let Err(err) = self.config.validate() {
            log::warn!("ActionSession: movement config is inconsistent: {err}");
        }

        let actor = ActorState::new(self.position, self.facing, &self.config.speed);
        log::info!(
            "ActionSession: collision radius={}, tolerance={}",
            self.config.collision.radius,
            self.config.collision.tolerance
        );

        let mut session = ActionSession {
            config: self.config,
            actor,
            phase: self.phase,
            picker: self.picker,
            obstacles: self.obstacles,
            sink: self.sink.unwrap_or_else(|| Box::new(NullSink)),
            missing,
            action: ActionKind::None,
            can_move: true,
            is_moving: false,
            assessment: None,
            follow: None,
            events: ActionLog::new(),
        };
        session.dispatch_phase_notifications();
        session
    }
}

/// Planner and executor for one actor
pub struct ActionSession {
    config: MovementConfig,
    actor: ActorState,
    phase: Option<PhaseHandle>,
    picker: Option<Box<dyn GroundPicker>>,
    obstacles: Option<Box<dyn ObstacleQuery>>,
    sink: Box<dyn PresentationSink>,
    missing: Vec<Collaborator>,

    /// Selected action kind (None outside Targeting/Executing)
    action: ActionKind,
    /// Cleared while a move is in flight
    can_move: bool,
    is_moving: bool,

    /// Latest target check; dropped when Targeting ends
    assessment: Option<TargetAssessment>,
    follow: Option<PathFollow>,
    events: ActionLog,
}

impl ActionSession {
    pub fn builder(config: MovementConfig) -> SessionBuilder {
        SessionBuilder::new(config)
    }

    pub fn actor(&self) -> &ActorState {
        &self.actor
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }

    pub fn can_move(&self) -> bool {
        self.can_move
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Latest target assessment while targeting
    pub fn assessment(&self) -> Option<&TargetAssessment> {
        self.assessment.as_ref()
    }

    /// Move currently playing out
    pub fn follow(&self) -> Option<&PathFollow> {
        self.follow.as_ref()
    }

    pub fn action_log(&self) -> &ActionLog {
        &self.events
    }

    /// Current phase, if a phase controller is wired
    pub fn phase(&self) -> Option<GamePhase> {
        self.phase.as_ref().map(|phase| phase.borrow().current())
    }

    pub fn phase_handle(&self) -> Option<&PhaseHandle> {
        self.phase.as_ref()
    }

    /// Envelope of the selected action at the current speed
    pub fn envelope(&self) -> MoveEnvelope {
        compute_envelope(self.action, &self.actor, &self.config)
    }

    pub fn missing_collaborators(&self) -> &[Collaborator] {
        &self.missing
    }

    /// Construction-time wiring result
    pub fn wiring_report(&self) -> Result<(), WiringError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(WiringError::MissingCollaborators(self.missing.clone()))
        }
    }

    /// Run one frame
    pub fn tick(&mut self, input: &FrameInput, dt: f32) {
        let Some(phase) = self.phase.clone() else {
            return;
        };
        self.dispatch_phase_notifications();

        if let Some(speed) = input.speed {
            self.change_speed(speed);
        }

        self.advance_follow(dt);

        let current = phase.borrow().current();
        match current {
            GamePhase::Planning => {
                if let Some(kind) = input.select {
                    self.select_action(kind);
                }
            }
            GamePhase::Targeting => self.handle_targeting(input),
            GamePhase::Executing | GamePhase::Paused => {}
        }

        self.dispatch_phase_notifications();
    }

    /// Choose an action kind and enter Targeting.
    ///
    /// In Targeting, a different kind first cancels the current targeting
    /// and then re-enters with the new kind; the same kind is ignored.
    /// Nothing can be selected while a move is still in flight.
    pub fn select_action(&mut self, kind: ActionKind) {
        if kind == ActionKind::None || self.is_moving || !self.can_move {
            return;
        }
        match self.phase() {
            Some(GamePhase::Planning) => self.enter_targeting(kind),
            Some(GamePhase::Targeting) if kind != self.action => {
                self.cancel_targeting();
                self.enter_targeting(kind);
            }
            _ => {}
        }
    }

    /// Leave Targeting without moving
    pub fn cancel_targeting(&mut self) {
        let Some(phase) = self.phase.clone() else {
            return;
        };
        let cancelled = phase.borrow_mut().cancel_targeting();
        if cancelled {
            let turn = phase.borrow().current_turn();
            self.events.record(ActionEvent::TargetingCancelled {
                turn,
                kind: self.action,
            });
            self.action = ActionKind::None;
            self.assessment = None;
        }
        self.dispatch_phase_notifications();
    }

    /// Change speed (clamped). The arc display follows while targeting.
    pub fn change_speed(&mut self, speed: f32) -> f32 {
        let applied = self.actor.set_speed(speed);
        log::debug!("Speed set to {applied}");
        if self.phase() == Some(GamePhase::Targeting) {
            self.push_envelope();
        }
        applied
    }

    fn enter_targeting(&mut self, kind: ActionKind) {
        let Some(phase) = self.phase.clone() else {
            return;
        };
        self.action = kind;
        let entered = phase.borrow_mut().start_targeting();
        if entered {
            let turn = phase.borrow().current_turn();
            self.events.record(ActionEvent::ActionSelected { turn, kind });
            log::debug!("Selected {kind:?}");
        }
        self.dispatch_phase_notifications();
    }

    fn handle_targeting(&mut self, input: &FrameInput) {
        if input.cancel {
            self.cancel_targeting();
            return;
        }

        if let Some(kind) = input.select {
            self.select_action(kind);
            if self.phase() != Some(GamePhase::Targeting) {
                return;
            }
        }

        if self.is_moving || !self.can_move {
            return;
        }

        let picked = match (&self.picker, input.pointer) {
            (Some(picker), Some(ray)) => picker.pick(&ray),
            (None, _) => return,
            (Some(_), None) => None,
        };

        let Some(raw_point) = picked else {
            self.assessment = None;
            self.sink.hide_path();
            self.sink.hide_marker();
            return;
        };

        let assessment = assess_target(
            self.action,
            &self.actor,
            raw_point,
            &self.config,
            self.obstacles.as_deref(),
        );
        let valid = assessment.is_fully_valid();
        self.sink.show_path(&assessment.path, valid);
        self.sink.show_marker(assessment.target.point, valid);
        self.assessment = Some(assessment);

        if input.confirm && valid {
            self.commit();
        }
    }

    /// Start executing the current assessment
    fn commit(&mut self) {
        if self.is_moving || !self.can_move {
            return;
        }
        let Some(phase) = self.phase.clone() else {
            return;
        };
        let Some(assessment) = self.assessment.take() else {
            return;
        };
        let Some(profile) = self.config.profile(assessment.kind) else {
            return;
        };

        let from = self.actor.position();
        let to = assessment.target.point;
        let Some(follow) = PathFollow::start(
            assessment.kind,
            assessment.path,
            profile.move_time,
            self.actor.facing(),
            self.config.jump_height_ratio,
        ) else {
            return;
        };

        if !phase.borrow_mut().start_execution() {
            return;
        }

        self.can_move = false;
        self.is_moving = true;
        self.follow = Some(follow);

        let turn = phase.borrow().current_turn();
        log::info!("Turn {turn}: {:?} from {from} to {to}", assessment.kind);
        self.events.record(ActionEvent::MoveCommitted {
            turn,
            kind: assessment.kind,
            from,
            to,
        });

        self.dispatch_phase_notifications();
    }

    fn advance_follow(&mut self, dt: f32) {
        let Some(phase) = self.phase.clone() else {
            return;
        };
        let rate = {
            let phase = phase.borrow();
            match phase.current() {
                GamePhase::Executing => phase.time_scale(),
                GamePhase::Paused => 0.0,
                // Resumed mid-move: let the committed move drain
                GamePhase::Planning | GamePhase::Targeting => phase.execution_time_scale(),
            }
        };

        let Some(follow) = self.follow.as_mut() else {
            return;
        };
        let status = follow.advance(dt * rate);
        self.sink.actor_moved(status.position(), follow.facing());

        if status.is_complete() {
            self.finish_move();
        }
    }

    fn finish_move(&mut self) {
        let Some(phase) = self.phase.clone() else {
            return;
        };
        let Some(follow) = self.follow.take() else {
            return;
        };

        let kind = follow.kind();
        self.actor.finish_move(follow.destination(), follow.final_facing());
        self.is_moving = false;
        self.can_move = true;
        // A kind chosen in Targeting belongs to the next move
        if phase.borrow().current() != GamePhase::Targeting {
            self.action = ActionKind::None;
        }
        self.sink.hide_path();

        let turn = phase.borrow().current_turn();
        self.events.record(ActionEvent::MoveCompleted {
            turn,
            kind,
            position: self.actor.position(),
            facing: self.actor.facing(),
        });
        log::info!(
            "{kind:?} finished at {} facing {}",
            self.actor.position(),
            self.actor.facing()
        );

        phase.borrow_mut().end_execution();
        self.dispatch_phase_notifications();
    }

    /// Forward queued phase changes to the actor's affordances
    fn dispatch_phase_notifications(&mut self) {
        let Some(phase) = self.phase.clone() else {
            return;
        };
        let changes = phase.borrow_mut().drain_notifications();
        for change in changes {
            self.on_phase_changed(change);
        }
    }

    fn on_phase_changed(&mut self, phase: GamePhase) {
        match phase {
            GamePhase::Planning => {
                // Back to Planning abandons any selection not yet moving
                if self.follow.is_none() {
                    self.action = ActionKind::None;
                }
                self.hide_affordances();
            }
            GamePhase::Executing => self.hide_affordances(),
            GamePhase::Targeting => self.push_envelope(),
            GamePhase::Paused => {}
        }
        self.sink.phase_changed(phase);
    }

    fn hide_affordances(&mut self) {
        self.assessment = None;
        self.sink.hide_envelope();
        self.sink.hide_path();
        self.sink.hide_marker();
    }

    fn push_envelope(&mut self) {
        let display = EnvelopeDisplay::new(self.actor.position(), self.actor.facing(), self.envelope());
        self.sink.show_envelope(&display);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::physics::ObstacleField;
    use crate::movement::input::{GroundPlane, PointerRay};

    #[test]
    fn try_build_reports_every_missing_collaborator() {
        let result = ActionSession::builder(MovementConfig::default()).try_build();
        match result {
            Err(WiringError::MissingCollaborators(missing)) => assert_eq!(
                missing,
                vec![
                    Collaborator::PhaseController,
                    Collaborator::GroundPicker,
                    Collaborator::ObstacleQuery
                ]
            ),
            Ok(_) => panic!("expected a wiring error"),
        }
    }

    #[test]
    fn fully_wired_session_builds() {
        let session = ActionSession::builder(MovementConfig::default())
            .new_phase()
            .picker(GroundPlane::new(0.0))
            .obstacles(ObstacleField::new())
            .try_build()
            .unwrap();
        assert!(session.wiring_report().is_ok());
        assert_eq!(session.phase(), Some(GamePhase::Planning));
    }

    #[test]
    fn session_without_phase_ignores_input() {
        let mut session = ActionSession::builder(MovementConfig::default())
            .picker(GroundPlane::new(0.0))
            .build();
        assert!(session.wiring_report().is_err());

        session.tick(&FrameInput::select(ActionKind::Run), 0.016);
        assert_eq!(session.action(), ActionKind::None);
        assert_eq!(session.phase(), None);
    }

    #[test]
    fn session_without_picker_never_targets() {
        let mut session = ActionSession::builder(MovementConfig::default())
            .new_phase()
            .build();
        assert_eq!(session.missing_collaborators(), &[Collaborator::GroundPicker, Collaborator::ObstacleQuery]);

        session.tick(&FrameInput::select(ActionKind::Run), 0.016);
        assert_eq!(session.phase(), Some(GamePhase::Targeting));

        let ray = PointerRay::looking_down_at(Vec3::new(0.0, 0.0, 4.0));
        session.tick(&FrameInput::confirm_at(ray), 0.016);
        assert!(session.assessment().is_none());
        assert_eq!(session.phase(), Some(GamePhase::Targeting));
    }
}
