/// Obstacle queries backed by Rapier
///
/// Provides:
/// - Closest-surface overlap tests for landing spots
/// - Sampled route checks with the jump-over policy
/// - A collider field built from obstacle entities

use glam::Vec3;
use nalgebra as na;
use rapier3d::parry::query::PointQuery;
use rapier3d::prelude::*;
use std::collections::HashMap;

use crate::ecs::components::{Footprint, Name, ObstacleId, ObstacleTraits, Position, Yaw};
use crate::ecs::EcsWorld;
use crate::movement::actor::ActionKind;

/// Route checkpoints per path (coarse subdivision)
pub const PATH_CHECK_SEGMENTS: usize = 10;
/// Interpolation steps between two checkpoints; the checkpoint itself is step 0
pub const PATH_SUBSAMPLES: usize = 5;

/// An obstacle found near a query point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleContact {
    pub id: ObstacleId,
    /// Distance from the query point to the obstacle's closest surface point
    pub distance: f32,
    pub cannot_jump_over: bool,
}

/// Spatial collision questions asked by the planner
pub trait ObstacleQuery {
    /// Obstacles whose closest surface point is nearer than `reach`
    fn obstacles_within(&self, point: Vec3, reach: f32) -> Vec<ObstacleContact>;

    /// Label for an obstacle in collision logs
    fn describe(&self, id: ObstacleId) -> String {
        id.to_string()
    }

    /// True iff an obstacle's closest surface point is nearer than
    /// `radius - tolerance`
    fn is_point_blocked(&self, point: Vec3, radius: f32, tolerance: f32) -> bool {
        let reach = radius - tolerance;
        if !(reach > 0.0) {
            return false;
        }
        match self.obstacles_within(point, reach).first() {
            Some(contact) => {
                log::debug!("Landing point {point} overlaps {}", self.describe(contact.id));
                true
            }
            None => false,
        }
    }

    /// Sampled route check.
    ///
    /// Walks the path in up to [`PATH_CHECK_SEGMENTS`] strides, testing each
    /// checkpoint and [`PATH_SUBSAMPLES`]` - 1` interpolated points toward the
    /// next one, then the final point. Jumps are only blocked by obstacles
    /// flagged `cannot_jump_over`.
    fn is_path_blocked(&self, points: &[Vec3], radius: f32, tolerance: f32, kind: ActionKind) -> bool {
        let reach = radius - tolerance;
        if points.len() < 2 || !(reach > 0.0) {
            return false;
        }

        let last = points.len() - 1;
        let stride = (points.len() / PATH_CHECK_SEGMENTS).max(1);
        let mut index = 0;

        while index < last {
            let start = points[index];
            let end = points[(index + stride).min(last)];

            for step in 0..PATH_SUBSAMPLES {
                let sample = start.lerp(end, step as f32 / PATH_SUBSAMPLES as f32);
                if let Some(contact) = blocking_contact(self, sample, reach, kind) {
                    log::debug!(
                        "{kind:?} path sample ({index}-{step}) hits {} at {sample}",
                        self.describe(contact.id)
                    );
                    return true;
                }
            }

            index += stride;
        }

        match blocking_contact(self, points[last], reach, kind) {
            Some(contact) => {
                log::debug!("{kind:?} path end hits {}", self.describe(contact.id));
                true
            }
            None => false,
        }
    }
}

/// First obstacle near `point` that blocks `kind`
fn blocking_contact<Q: ObstacleQuery + ?Sized>(
    query: &Q,
    point: Vec3,
    reach: f32,
    kind: ActionKind,
) -> Option<ObstacleContact> {
    query
        .obstacles_within(point, reach)
        .into_iter()
        .find(|contact| kind != ActionKind::Jump || contact.cannot_jump_over)
}

/// Static obstacle colliders plus their capability flags
pub struct ObstacleField {
    /// Always empty; the query pipeline API wants a body set
    rigid_body_set: RigidBodySet,

    collider_set: ColliderSet,

    /// Broad phase for overlap queries
    query_pipeline: QueryPipeline,

    ids: HashMap<ColliderHandle, ObstacleId>,
    traits: HashMap<ObstacleId, ObstacleTraits>,
    names: HashMap<ObstacleId, String>,
    next_id: u64,
}

impl ObstacleField {
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            query_pipeline: QueryPipeline::new(),
            ids: HashMap::new(),
            traits: HashMap::new(),
            names: HashMap::new(),
            next_id: 1,
        }
    }

    /// Build a field from every obstacle entity in the world.
    ///
    /// Entities need `Position` and `Footprint`; `Yaw`, `ObstacleTraits` and
    /// `Name` are optional. Ids are the entities' bits.
    pub fn from_world(ecs: &EcsWorld) -> Self {
        let mut field = Self::new();
        let mut query = ecs
            .world
            .query::<(&Position, &Footprint, Option<&Yaw>, Option<&ObstacleTraits>, Option<&Name>)>();

        for (entity, (position, footprint, yaw, traits, name)) in query.iter() {
            let id = ObstacleId(entity.to_bits().get());
            field.insert_collider(
                id,
                position.0,
                yaw.copied().unwrap_or_default().0,
                *footprint,
                traits.copied().unwrap_or_default(),
            );
            if let Some(name) = name {
                field.names.insert(id, name.0.clone());
            }
        }

        field.query_pipeline.update(&field.collider_set);
        log::info!("Obstacle field built with {} obstacles", field.len());
        field
    }

    /// Add an obstacle and return its id
    pub fn add_obstacle(
        &mut self,
        position: Vec3,
        footprint: Footprint,
        traits: ObstacleTraits,
    ) -> ObstacleId {
        let id = ObstacleId(self.next_id);
        self.next_id += 1;
        self.insert_collider(id, position, 0.0, footprint, traits);
        self.query_pipeline.update(&self.collider_set);
        id
    }

    fn insert_collider(
        &mut self,
        id: ObstacleId,
        position: Vec3,
        yaw_deg: f32,
        footprint: Footprint,
        traits: ObstacleTraits,
    ) {
        let builder = match footprint {
            Footprint::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            Footprint::Ball { radius } => ColliderBuilder::ball(radius),
            Footprint::Cylinder { half_height, radius } => {
                ColliderBuilder::cylinder(half_height, radius)
            }
        };
        let collider = builder
            .position(ground_pose(position, yaw_deg))
            .build();

        let handle = self.collider_set.insert(collider);
        self.ids.insert(handle, id);
        self.traits.insert(id, traits);
    }

    /// Override the capability flags of an obstacle
    pub fn set_traits(&mut self, id: ObstacleId, traits: ObstacleTraits) {
        self.traits.insert(id, traits);
    }

    /// Capability lookup; unknown obstacles can be jumped over
    pub fn cannot_jump_over(&self, id: ObstacleId) -> bool {
        self.traits
            .get(&id)
            .map(|traits| traits.cannot_jump_over)
            .unwrap_or(false)
    }

    pub fn name(&self, id: ObstacleId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Number of obstacles
    pub fn len(&self) -> usize {
        self.collider_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collider_set.is_empty()
    }
}

impl Default for ObstacleField {
    fn default() -> Self {
        Self::new()
    }
}

impl ObstacleQuery for ObstacleField {
    fn describe(&self, id: ObstacleId) -> String {
        match self.name(id) {
            Some(name) => format!("{name} ({id})"),
            None => id.to_string(),
        }
    }

    fn obstacles_within(&self, point: Vec3, reach: f32) -> Vec<ObstacleContact> {
        if !(reach > 0.0) || !point.is_finite() {
            return Vec::new();
        }

        let probe = Ball::new(reach);
        let probe_pos = Isometry::translation(point.x, point.y, point.z);
        let query_point = vec3_to_point(point);
        let mut contacts = Vec::new();

        self.query_pipeline.intersections_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &probe_pos,
            &probe,
            QueryFilter::default(),
            |handle| {
                let (Some(collider), Some(&id)) = (self.collider_set.get(handle), self.ids.get(&handle))
                else {
                    return true;
                };
                let distance = collider
                    .shape()
                    .distance_to_point(collider.position(), &query_point, true);
                if distance < reach {
                    contacts.push(ObstacleContact {
                        id,
                        distance,
                        cannot_jump_over: self.cannot_jump_over(id),
                    });
                }
                true // keep searching
            },
        );

        contacts.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        contacts
    }
}

/// Convert Vec3 to Rapier Point
fn vec3_to_point(v: Vec3) -> Point<Real> {
    Point::new(v.x, v.y, v.z)
}

/// Pose at `position` turned `yaw_deg` about +Y
fn ground_pose(position: Vec3, yaw_deg: f32) -> Isometry<Real> {
    let rotation = na::UnitQuaternion::from_axis_angle(&na::Vector3::y_axis(), yaw_deg.to_radians());
    na::Isometry3::from_parts(na::Translation3::new(position.x, position.y, position.z), rotation)
}
