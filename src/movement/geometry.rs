/// Horizontal-plane geometry helpers for movement planning
///
/// Angles are in degrees. A positive angle turns +Z toward +X about +Y,
/// matching `Quat::from_rotation_y`.

use glam::{Quat, Vec3};

/// Project a direction onto the ground plane and normalise it.
/// Degenerate input (zero, vertical, non-finite) falls back to +Z.
pub fn flatten_direction(direction: Vec3) -> Vec3 {
    Vec3::new(direction.x, 0.0, direction.z)
        .try_normalize()
        .unwrap_or(Vec3::Z)
}

/// Horizontal offset from `origin` to `point`, ignoring height
pub fn horizontal_offset(origin: Vec3, point: Vec3) -> Vec3 {
    let offset = point - origin;
    Vec3::new(offset.x, 0.0, offset.z)
}

/// Signed angle in degrees from `from` to `to` about the up axis.
///
/// Both vectors are treated as horizontal. The result is in (-180, 180];
/// a vector pointing straight back yields +180.
pub fn signed_angle_deg(from: Vec3, to: Vec3) -> f32 {
    let a = Vec3::new(from.x, 0.0, from.z);
    let b = Vec3::new(to.x, 0.0, to.z);
    let cross_y = a.z * b.x - a.x * b.z;
    let dot = a.dot(b);
    if cross_y == 0.0 && dot == 0.0 {
        return 0.0;
    }
    cross_y.atan2(dot).to_degrees()
}

/// Rotate a direction about the up axis by `angle_deg`
pub fn rotate_about_up(direction: Vec3, angle_deg: f32) -> Vec3 {
    Quat::from_rotation_y(angle_deg.to_radians()) * direction
}

/// Direction at `angle_deg` from `facing`, with the angle clamped to
/// `[-half_angle_deg, half_angle_deg]`
pub fn clamped_direction(facing: Vec3, angle_deg: f32, half_angle_deg: f32) -> Vec3 {
    let limit = half_angle_deg.abs();
    rotate_about_up(flatten_direction(facing), angle_deg.clamp(-limit, limit))
}

/// Linear interpolation between `a` and `b` (unclamped)
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position of `value` inside `[min, max]`, clamped to [0, 1].
///
/// Returns 0 for an empty or inverted range instead of dividing by zero.
pub fn inverse_lerp_clamped(min: f32, max: f32, value: f32) -> f32 {
    let span = max - min;
    if !(span > f32::EPSILON) || !value.is_finite() {
        return 0.0;
    }
    ((value - min) / span).clamp(0.0, 1.0)
}

/// Map `value` from `[from_min, from_max]` onto `[to_a, to_b]`.
///
/// This is the speed -> angle and speed -> radius mapping: the source range
/// is clamped, so values outside it land on the nearest end of the target.
pub fn remap_clamped(value: f32, from_min: f32, from_max: f32, to_a: f32, to_b: f32) -> f32 {
    lerp(to_a, to_b, inverse_lerp_clamped(from_min, from_max, value))
}

/// Sample `segments + 1` points on a circular arc of `radius` around
/// `center`, sweeping from `-half_angle_deg` to `+half_angle_deg` off `facing`.
pub fn sample_arc(
    center: Vec3,
    facing: Vec3,
    radius: f32,
    half_angle_deg: f32,
    segments: usize,
) -> Vec<Vec3> {
    let segments = segments.max(1);
    let facing = flatten_direction(facing);
    let start = -half_angle_deg.abs();
    let end = half_angle_deg.abs();

    (0..=segments)
        .map(|i| {
            let t = i as f32 / segments as f32;
            let direction = rotate_about_up(facing, lerp(start, end, t));
            center + direction * radius
        })
        .collect()
}
