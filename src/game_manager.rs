/// Game Manager - Phase control for turn-based movement
///
/// Tracks which phase is active, the time-flow rate and the turn counter,
/// and queues a notification for every phase change

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Choose an action kind
    #[default]
    Planning,
    /// Pick a destination for the chosen action
    Targeting,
    /// The committed move plays out; time flows
    Executing,
    Paused,
}

/// Shared handle to the session's phase controller
pub type PhaseHandle = Rc<RefCell<PhaseController>>;

/// Phase controller - one per play session
#[derive(Debug, Clone)]
pub struct PhaseController {
    current: GamePhase,

    /// Time-flow rate while executing
    execution_time_scale: f32,

    /// Current time-flow rate (0 outside execution)
    time_scale: f32,

    /// Completed executions + 1
    current_turn: u32,

    /// Phase changes not yet picked up by the actor
    notifications: VecDeque<GamePhase>,
}

impl Default for PhaseController {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl PhaseController {
    /// Create a controller in `Planning`.
    ///
    /// The initial phase is queued as a notification so the actor starts
    /// with its planning affordances hidden.
    pub fn new(execution_time_scale: f32) -> Self {
        let mut controller = Self {
            current: GamePhase::Planning,
            execution_time_scale: sanitize_time_scale(execution_time_scale),
            time_scale: 0.0,
            current_turn: 1,
            notifications: VecDeque::new(),
        };
        controller.set_phase(GamePhase::Planning);
        controller
    }

    /// Wrap the controller in a shareable handle
    pub fn into_handle(self) -> PhaseHandle {
        Rc::new(RefCell::new(self))
    }

    pub fn current(&self) -> GamePhase {
        self.current
    }

    /// Current time-flow rate
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn execution_time_scale(&self) -> f32 {
        self.execution_time_scale
    }

    pub fn current_turn(&self) -> u32 {
        self.current_turn
    }

    pub fn is_paused(&self) -> bool {
        self.current == GamePhase::Paused
    }

    /// Switch phase, apply the time-flow rate and queue the notification
    fn set_phase(&mut self, phase: GamePhase) {
        let previous = self.current;
        self.current = phase;
        self.time_scale = match phase {
            GamePhase::Executing => self.execution_time_scale,
            GamePhase::Planning | GamePhase::Targeting | GamePhase::Paused => 0.0,
        };
        self.notifications.push_back(phase);
        log::debug!(
            "Phase {previous:?} -> {phase:?} (time scale {})",
            self.time_scale
        );
    }

    /// Planning -> Targeting
    pub fn start_targeting(&mut self) -> bool {
        self.transition(GamePhase::Planning, GamePhase::Targeting)
    }

    /// Targeting -> Planning
    pub fn cancel_targeting(&mut self) -> bool {
        self.transition(GamePhase::Targeting, GamePhase::Planning)
    }

    /// Targeting -> Executing
    pub fn start_execution(&mut self) -> bool {
        self.transition(GamePhase::Targeting, GamePhase::Executing)
    }

    /// Executing -> Planning; completes the turn
    pub fn end_execution(&mut self) -> bool {
        let ended = self.transition(GamePhase::Executing, GamePhase::Planning);
        if ended {
            self.current_turn += 1;
            log::info!("=== Turn {} begins ===", self.current_turn);
        }
        ended
    }

    /// Any phase -> Paused
    pub fn pause(&mut self) -> bool {
        if self.current == GamePhase::Paused {
            return false;
        }
        self.set_phase(GamePhase::Paused);
        true
    }

    /// Back to Planning, whatever the phase before the pause was
    pub fn resume(&mut self) {
        self.set_phase(GamePhase::Planning);
    }

    /// Take the queued phase notifications, oldest first
    pub fn drain_notifications(&mut self) -> Vec<GamePhase> {
        self.notifications.drain(..).collect()
    }

    fn transition(&mut self, from: GamePhase, to: GamePhase) -> bool {
        if self.current != from {
            log::trace!("Ignoring {from:?} -> {to:?} while {:?}", self.current);
            return false;
        }
        self.set_phase(to);
        true
    }
}

fn sanitize_time_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        log::warn!("Execution time scale {scale} is not positive; using 1.0");
        1.0
    }
}
