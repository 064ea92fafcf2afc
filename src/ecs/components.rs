/// Components for obstacle entities
///
/// Obstacles live on the ground plane; positions are world space, +Y up

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// World-space center of an obstacle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec3);

/// Rotation about +Y in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Yaw(pub f32);

/// Display name, used in collision logs
#[derive(Debug, Clone, PartialEq)]
pub struct Name(pub String);

/// Collision footprint of an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Footprint {
    /// Box given by its half extents
    Cuboid { half_extents: Vec3 },
    Ball { radius: f32 },
    /// Upright cylinder
    Cylinder { half_height: f32, radius: f32 },
}

/// Capability flags for an obstacle.
///
/// Obstacles are jumpable unless flagged otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObstacleTraits {
    /// Blocks jumps as well as runs (walls, tall props)
    pub cannot_jump_over: bool,
}

impl ObstacleTraits {
    pub fn jumpable() -> Self {
        Self {
            cannot_jump_over: false,
        }
    }

    pub fn solid() -> Self {
        Self {
            cannot_jump_over: true,
        }
    }
}

/// Identity of an obstacle inside an obstacle field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(pub u64);

impl fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obstacle #{}", self.0)
    }
}
