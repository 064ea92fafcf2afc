/// ECS world for obstacle scenes
///
/// This module provides:
/// - Component definitions for obstacles
/// - Spawn helpers for authoring a scene
/// - Rapier-backed obstacle queries built from the scene

pub mod components;
pub mod init;
pub mod physics;

use hecs::World;

/// The world containing all obstacle entities
pub struct EcsWorld {
    /// hecs World - stores all entities and components
    pub world: World,
}

impl EcsWorld {
    pub fn new() -> Self {
        Self {
            world: World::new(),
        }
    }

    /// Get the number of entities
    pub fn entity_count(&self) -> u32 {
        self.world.len() as u32
    }
}

impl Default for EcsWorld {
    fn default() -> Self {
        Self::new()
    }
}
