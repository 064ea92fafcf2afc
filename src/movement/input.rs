/// Per-tick input signals and ground picking

use glam::Vec3;

use crate::movement::actor::ActionKind;

/// Pick range of the ground raycast
pub const DEFAULT_PICK_DISTANCE: f32 = 100.0;

/// World-space pointer ray (already unprojected by the camera layer)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRay {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl PointerRay {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// A ray straight down onto `point`, handy for scripted input
    pub fn looking_down_at(point: Vec3) -> Self {
        Self {
            origin: point + Vec3::Y * 10.0,
            direction: -Vec3::Y,
        }
    }
}

/// Discrete signals for one tick. Each press fires once.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Action key pressed this tick
    pub select: Option<ActionKind>,
    /// Where the pointer is, if anywhere
    pub pointer: Option<PointerRay>,
    pub confirm: bool,
    pub cancel: bool,
    /// Requested speed change
    pub speed: Option<f32>,
}

impl FrameInput {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn select(kind: ActionKind) -> Self {
        Self {
            select: Some(kind),
            ..Self::default()
        }
    }

    pub fn point_at(ray: PointerRay) -> Self {
        Self {
            pointer: Some(ray),
            ..Self::default()
        }
    }

    pub fn confirm_at(ray: PointerRay) -> Self {
        Self {
            pointer: Some(ray),
            confirm: true,
            ..Self::default()
        }
    }

    pub fn cancel() -> Self {
        Self {
            cancel: true,
            ..Self::default()
        }
    }

    pub fn speed(speed: f32) -> Self {
        Self {
            speed: Some(speed),
            ..Self::default()
        }
    }
}

/// Resolves a pointer ray to a point on the walkable ground
pub trait GroundPicker {
    fn pick(&self, ray: &PointerRay) -> Option<Vec3>;
}

impl<F> GroundPicker for F
where
    F: Fn(&PointerRay) -> Option<Vec3>,
{
    fn pick(&self, ray: &PointerRay) -> Option<Vec3> {
        self(ray)
    }
}

/// Flat ground at a fixed height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlane {
    pub height: f32,
    pub max_distance: f32,
}

impl GroundPlane {
    pub fn new(height: f32) -> Self {
        Self {
            height,
            max_distance: DEFAULT_PICK_DISTANCE,
        }
    }
}

impl GroundPicker for GroundPlane {
    /// Ray-plane intersection: t = (plane_point - ray_origin) · n / (ray_direction · n)
    fn pick(&self, ray: &PointerRay) -> Option<Vec3> {
        let direction = ray.direction.try_normalize()?;
        let denominator = direction.y;

        // Check if ray is parallel to plane
        if denominator.abs() < 0.0001 {
            return None;
        }

        let t = (self.height - ray.origin.y) / denominator;

        // Behind the ray origin or out of range
        if t < 0.0 || t > self.max_distance {
            return None;
        }

        Some(ray.origin + direction * t)
    }
}
