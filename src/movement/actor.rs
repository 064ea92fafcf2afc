/// Actor movement state

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::SpeedConfigData;
use crate::movement::geometry::flatten_direction;

/// Kind of move the actor is planning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActionKind {
    #[default]
    None,
    Run,
    Jump,
}

/// Position, facing and speed of the planning actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorState {
    position: Vec3,
    facing: Vec3,
    speed: f32,
    min_speed: f32,
    max_speed: f32,
}

impl ActorState {
    pub fn new(position: Vec3, facing: Vec3, speed: &SpeedConfigData) -> Self {
        let mut state = Self {
            position,
            facing: flatten_direction(facing),
            speed: speed.min,
            min_speed: speed.min,
            max_speed: speed.max.max(speed.min),
        };
        state.set_speed(speed.initial);
        state
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Horizontal unit facing
    pub fn facing(&self) -> Vec3 {
        self.facing
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn speed_range(&self) -> (f32, f32) {
        (self.min_speed, self.max_speed)
    }

    /// Set the speed, clamped to the configured range. Returns the applied value.
    pub fn set_speed(&mut self, speed: f32) -> f32 {
        self.speed = if speed.is_finite() {
            speed.clamp(self.min_speed, self.max_speed)
        } else {
            self.min_speed
        };
        self.speed
    }

    /// Apply the result of a finished move
    pub(crate) fn finish_move(&mut self, position: Vec3, facing: Vec3) {
        self.position = position;
        self.facing = flatten_direction(facing);
    }
}
