/// Move envelope calculation, target validation and path construction
///
/// The envelope is the (half-angle, radius) pair bounding where an actor can
/// go this turn. Faster actors get a narrower but longer envelope.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::MovementConfig;
use crate::ecs::physics::ObstacleQuery;
use crate::movement::actor::{ActionKind, ActorState};
use crate::movement::geometry::{
    clamped_direction, flatten_direction, horizontal_offset, remap_clamped, rotate_about_up,
    signed_angle_deg,
};

/// Picks closer than this to the actor are rejected outright
pub const MIN_TARGET_DISTANCE: f32 = 0.5;

/// Full turn angle used when no action is selected
const FALLBACK_TURN_ANGLE: f32 = 90.0;
/// Radius used when no action is selected
const FALLBACK_RADIUS: f32 = 3.0;

/// Reachable region for one action: targets lie on an arc of `radius`
/// within `half_angle` degrees either side of the facing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveEnvelope {
    pub half_angle: f32,
    pub radius: f32,
}

impl MoveEnvelope {
    /// Full opening angle of the arc in degrees
    pub fn full_angle(&self) -> f32 {
        self.half_angle * 2.0
    }
}

/// Envelope for a speed inside `speed_range`.
///
/// `angle_range` is `(min_angle, max_angle)` in full degrees: `max_angle`
/// applies at the slowest speed. `radius_range` is `(min_radius, max_radius)`
/// with `max_radius` at the fastest speed. A degenerate speed range behaves
/// like the slowest speed.
pub fn envelope_for(
    speed: f32,
    speed_range: (f32, f32),
    angle_range: (f32, f32),
    radius_range: (f32, f32),
) -> MoveEnvelope {
    let (min_speed, max_speed) = speed_range;
    let (min_angle, max_angle) = angle_range;
    let (min_radius, max_radius) = radius_range;

    let full_angle = remap_clamped(speed, min_speed, max_speed, max_angle, min_angle);
    MoveEnvelope {
        half_angle: full_angle * 0.5,
        radius: remap_clamped(speed, min_speed, max_speed, min_radius, max_radius),
    }
}

/// Envelope of `kind` at the actor's current speed
pub fn compute_envelope(kind: ActionKind, actor: &ActorState, config: &MovementConfig) -> MoveEnvelope {
    match config.profile(kind) {
        Some(profile) => envelope_for(
            actor.speed(),
            actor.speed_range(),
            (profile.min_angle, profile.max_angle),
            (profile.min_radius, profile.max_radius),
        ),
        None => MoveEnvelope {
            half_angle: FALLBACK_TURN_ANGLE * 0.5,
            radius: FALLBACK_RADIUS,
        },
    }
}

/// How a raw pick is turned into a target on the arc
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum TargetPolicy {
    /// Every pick maps onto the arc boundary; only obstacles can reject it
    ClampToArc,
    /// The pick itself must land within `threshold` of its arc point
    SnapWithinThreshold { threshold: f32 },
}

impl Default for TargetPolicy {
    fn default() -> Self {
        TargetPolicy::ClampToArc
    }
}

/// Raw pick reduced against an envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetValidation {
    /// Arc point to use, or the flattened pick when it was too close
    pub point: Vec3,
    /// Signed angle from the facing after clamping (degrees)
    pub angle: f32,
    pub on_arc: bool,
}

/// Reduce a raw world pick to a point on the envelope's arc.
///
/// The pick is moved to the origin's height first. Picks within
/// [`MIN_TARGET_DISTANCE`] are rejected whatever their angle. Picks outside
/// the turn limit (including straight behind) are clamped to the nearest
/// arc boundary.
pub fn validate_target(
    origin: Vec3,
    facing: Vec3,
    raw_point: Vec3,
    envelope: MoveEnvelope,
    policy: TargetPolicy,
) -> TargetValidation {
    let flat_pick = Vec3::new(raw_point.x, origin.y, raw_point.z);
    let to_target = horizontal_offset(origin, flat_pick);

    if !(to_target.length() >= MIN_TARGET_DISTANCE) {
        return TargetValidation {
            point: flat_pick,
            angle: 0.0,
            on_arc: false,
        };
    }

    let facing = flatten_direction(facing);
    let direction = clamped_direction(facing, signed_angle_deg(facing, to_target), envelope.half_angle);
    let angle = signed_angle_deg(facing, direction);
    let point = origin + direction * envelope.radius;

    let on_arc = match policy {
        TargetPolicy::ClampToArc => true,
        TargetPolicy::SnapWithinThreshold { threshold } => flat_pick.distance(point) <= threshold,
    };

    TargetValidation { point, angle, on_arc }
}

/// Sample the movement path from `origin` to `target`.
///
/// Heading and distance are both interpolated against the same parameter,
/// so the path spirals out from the actor rather than following a circle.
/// Returns `resolution + 1` points (resolution 0 is treated as 1); the first
/// is `origin` and the last is `target` at the origin's height.
pub fn compute_path(origin: Vec3, facing: Vec3, target: Vec3, resolution: usize) -> Vec<Vec3> {
    let segments = resolution.max(1);
    let facing = flatten_direction(facing);
    let to_target = horizontal_offset(origin, target);
    let distance = to_target.length();
    let angle = if distance > 0.0 {
        signed_angle_deg(facing, to_target)
    } else {
        0.0
    };

    let mut path: Vec<Vec3> = (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            origin + rotate_about_up(facing, angle * t) * (distance * t)
        })
        .collect();

    // Pin the endpoint so float drift never moves the landing spot
    if let Some(last) = path.last_mut() {
        *last = origin + to_target;
    }
    path
}

/// Straight-line path with `resolution + 1` evenly spaced points.
/// Jumps preview and travel along this instead of the spiral.
pub fn compute_straight_path(origin: Vec3, target: Vec3, resolution: usize) -> Vec<Vec3> {
    let segments = resolution.max(1);
    let end = origin + horizontal_offset(origin, target);
    (0..=segments)
        .map(|i| origin.lerp(end, i as f32 / segments as f32))
        .collect()
}

/// Path shape for an action kind
pub fn path_for(
    kind: ActionKind,
    origin: Vec3,
    facing: Vec3,
    target: Vec3,
    resolution: usize,
) -> Vec<Vec3> {
    match kind {
        ActionKind::Jump => compute_straight_path(origin, target, resolution),
        ActionKind::Run | ActionKind::None => compute_path(origin, facing, target, resolution),
    }
}

/// Everything the planner knows about the current pick
#[derive(Debug, Clone, PartialEq)]
pub struct TargetAssessment {
    pub kind: ActionKind,
    pub envelope: MoveEnvelope,
    pub target: TargetValidation,
    pub path: Vec<Vec3>,
    /// An obstacle overlaps the landing spot
    pub point_blocked: bool,
    /// An obstacle overlaps the route
    pub path_blocked: bool,
}

impl TargetAssessment {
    pub fn is_fully_valid(&self) -> bool {
        self.target.on_arc && !self.point_blocked && !self.path_blocked
    }
}

/// Validate a raw pick for `kind`, build its path and run the obstacle checks.
///
/// Without an obstacle query nothing is reported blocked.
pub fn assess_target(
    kind: ActionKind,
    actor: &ActorState,
    raw_point: Vec3,
    config: &MovementConfig,
    obstacles: Option<&dyn ObstacleQuery>,
) -> TargetAssessment {
    let envelope = compute_envelope(kind, actor, config);
    let origin = actor.position();
    let target = validate_target(origin, actor.facing(), raw_point, envelope, config.target_policy);
    let path = path_for(kind, origin, actor.facing(), target.point, config.path_resolution);

    let radius = config.collision.radius;
    let tolerance = config.collision.tolerance;
    let (point_blocked, path_blocked) = match obstacles {
        Some(query) => (
            query.is_point_blocked(target.point, radius, tolerance),
            query.is_path_blocked(&path, radius, tolerance, kind),
        ),
        None => (false, false),
    };

    TargetAssessment {
        kind,
        envelope,
        target,
        path,
        point_blocked,
        path_blocked,
    }
}
