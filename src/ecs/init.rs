/// Spawn helpers for obstacle entities

use glam::Vec3;
use hecs::{Entity, World};

use crate::ecs::components::*;

/// Create an obstacle entity
pub fn create_obstacle_entity(
    world: &mut World,
    name: &str,
    position: Vec3,
    footprint: Footprint,
    traits: ObstacleTraits,
) -> Entity {
    world.spawn((Position(position), footprint, traits, Name(name.to_string())))
}

/// Create a wall segment between two ground points.
///
/// The wall stands on the ground (its base at `start.y`) and cannot be
/// jumped over.
pub fn create_wall_entity(
    world: &mut World,
    name: &str,
    start: Vec3,
    end: Vec3,
    height: f32,
    thickness: f32,
) -> Entity {
    let span = Vec3::new(end.x - start.x, 0.0, end.z - start.z);
    let length = span.length();
    let center = (start + end) * 0.5 + Vec3::Y * (height * 0.5);
    // Cuboid local +X runs along the wall
    let yaw = (-span.z).atan2(span.x).to_degrees();

    world.spawn((
        Position(center),
        Yaw(yaw),
        Footprint::Cuboid {
            half_extents: Vec3::new(length * 0.5, height * 0.5, thickness * 0.5),
        },
        ObstacleTraits::solid(),
        Name(name.to_string()),
    ))
}

/// Create a low crate that jumps can clear
pub fn create_crate_entity(world: &mut World, name: &str, position: Vec3, size: f32) -> Entity {
    let half = size * 0.5;
    create_obstacle_entity(
        world,
        name,
        position + Vec3::Y * half,
        Footprint::Cuboid {
            half_extents: Vec3::splat(half),
        },
        ObstacleTraits::jumpable(),
    )
}
