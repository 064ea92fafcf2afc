/// Action event log for turn-based movement
///
/// Records what the player selected, committed and finished each turn

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::movement::actor::ActionKind;

/// Movement events for one actor
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum ActionEvent {
    /// Player picked an action kind and entered targeting
    ActionSelected { turn: u32, kind: ActionKind },

    /// Player backed out of targeting
    TargetingCancelled { turn: u32, kind: ActionKind },

    /// Player confirmed a target; the move starts
    MoveCommitted {
        turn: u32,
        kind: ActionKind,
        from: Vec3,
        to: Vec3,
    },

    /// The move finished playing out
    MoveCompleted {
        turn: u32,
        kind: ActionKind,
        position: Vec3,
        facing: Vec3,
    },
}

impl ActionEvent {
    /// Get the turn number for this event
    pub fn turn(&self) -> u32 {
        match self {
            ActionEvent::ActionSelected { turn, .. } => *turn,
            ActionEvent::TargetingCancelled { turn, .. } => *turn,
            ActionEvent::MoveCommitted { turn, .. } => *turn,
            ActionEvent::MoveCompleted { turn, .. } => *turn,
        }
    }

    /// Get the action kind for this event
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionEvent::ActionSelected { kind, .. } => *kind,
            ActionEvent::TargetingCancelled { kind, .. } => *kind,
            ActionEvent::MoveCommitted { kind, .. } => *kind,
            ActionEvent::MoveCompleted { kind, .. } => *kind,
        }
    }
}

/// In-memory record of action events
#[derive(Debug, Default, Clone)]
pub struct ActionLog {
    events: Vec<ActionEvent>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: ActionEvent) {
        log::trace!("action event: {event:?}");
        self.events.push(event);
    }

    /// Get all events for one turn
    pub fn turn_events(&self, turn: u32) -> Vec<&ActionEvent> {
        self.events.iter().filter(|e| e.turn() == turn).collect()
    }

    /// Get all events
    pub fn events(&self) -> &[ActionEvent] {
        &self.events
    }

    pub fn last(&self) -> Option<&ActionEvent> {
        self.events.last()
    }

    /// Number of moves that were committed
    pub fn committed_moves(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, ActionEvent::MoveCommitted { .. }))
            .count()
    }

    /// Events as pretty JSON, for debugging dumps
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.events)
    }

    /// Get event count
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
