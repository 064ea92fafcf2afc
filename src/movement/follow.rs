/// Path-follow playback for committed moves
///
/// A follow is a plain state object stepped by the frame clock. It cannot be
/// cancelled; once started it runs until `advance` reports completion.

use glam::Vec3;

use crate::movement::actor::ActionKind;
use crate::movement::geometry::{flatten_direction, rotate_about_up, signed_angle_deg};

/// Share of a jump spent turning in place before leaving the ground
const JUMP_TURN_SHARE: f32 = 0.1;

/// Time curve applied to follow progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    InOutSine,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::InOutSine => -((std::f32::consts::PI * t).cos() - 1.0) * 0.5,
        }
    }
}

/// Result of one `advance` step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FollowStatus {
    Running(Vec3),
    /// Reported on the completing step and on every step after it
    Complete(Vec3),
}

impl FollowStatus {
    pub fn position(&self) -> Vec3 {
        match *self {
            FollowStatus::Running(position) | FollowStatus::Complete(position) => position,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, FollowStatus::Complete(_))
    }
}

/// Playback of one committed move along its path
pub struct PathFollow {
    kind: ActionKind,
    path: Vec<Vec3>,
    /// Arc length at each path point
    cumulative: Vec<f32>,
    duration: f32,
    elapsed: f32,
    easing: Easing,
    start_facing: Vec3,
    final_facing: Vec3,
    /// Apex height above the take-off point (jumps only)
    apex_height: f32,
    complete: bool,
    on_complete: Option<Box<dyn FnOnce(Vec3)>>,
}

impl PathFollow {
    /// Start following `path` over `duration` seconds of scaled time.
    ///
    /// Returns `None` for an empty path. The final facing is the horizontal
    /// direction from the first to the last point; a zero-length move keeps
    /// `start_facing`.
    pub fn start(
        kind: ActionKind,
        path: Vec<Vec3>,
        duration: f32,
        start_facing: Vec3,
        jump_height_ratio: f32,
    ) -> Option<Self> {
        let first = *path.first()?;
        let last = *path.last()?;

        let mut cumulative = Vec::with_capacity(path.len());
        let mut length = 0.0;
        let mut previous = first;
        for point in &path {
            length += point.distance(previous);
            cumulative.push(length);
            previous = *point;
        }

        let start_facing = flatten_direction(start_facing);
        let travel = Vec3::new(last.x - first.x, 0.0, last.z - first.z);
        let final_facing = travel.try_normalize().unwrap_or(start_facing);
        let apex_height = match kind {
            ActionKind::Jump => travel.length() * jump_height_ratio.max(0.0),
            ActionKind::Run | ActionKind::None => 0.0,
        };

        Some(Self {
            kind,
            path,
            cumulative,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing: Easing::default(),
            start_facing,
            final_facing,
            apex_height,
            complete: false,
            on_complete: None,
        })
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Callback fired once, with the final position, when the follow completes
    pub fn on_complete(mut self, callback: impl FnOnce(Vec3) + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn destination(&self) -> Vec3 {
        self.path.last().copied().unwrap_or_default()
    }

    /// Direction the actor faces once the move is done
    pub fn final_facing(&self) -> Vec3 {
        self.final_facing
    }

    /// Normalised elapsed time in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.complete || self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Step the follow by `dt` seconds of scaled time
    pub fn advance(&mut self, dt: f32) -> FollowStatus {
        if self.complete {
            return FollowStatus::Complete(self.destination());
        }

        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }

        if self.elapsed >= self.duration {
            self.complete = true;
            let destination = self.destination();
            if let Some(callback) = self.on_complete.take() {
                callback(destination);
            }
            return FollowStatus::Complete(destination);
        }

        FollowStatus::Running(self.position())
    }

    /// Current position along the move
    pub fn position(&self) -> Vec3 {
        if self.complete {
            return self.destination();
        }
        match self.kind {
            ActionKind::Jump => self.jump_position(),
            ActionKind::Run | ActionKind::None => self.point_at_fraction(self.easing.apply(self.progress())),
        }
    }

    /// Current facing along the move
    pub fn facing(&self) -> Vec3 {
        let turn = match self.kind {
            ActionKind::Jump => self.easing.apply(self.progress() / JUMP_TURN_SHARE),
            ActionKind::Run | ActionKind::None => self.easing.apply(self.progress()),
        };
        let angle = signed_angle_deg(self.start_facing, self.final_facing);
        rotate_about_up(self.start_facing, angle * turn)
    }

    fn jump_position(&self) -> Vec3 {
        let start = self.path.first().copied().unwrap_or_default();
        let end = self.destination();
        let airborne = (self.progress() - JUMP_TURN_SHARE) / (1.0 - JUMP_TURN_SHARE);
        if airborne <= 0.0 {
            return start;
        }
        let p = self.easing.apply(airborne);
        // Parabolic arc peaking at the midpoint
        let height = 4.0 * p * (1.0 - p) * self.apex_height;
        start.lerp(end, p) + Vec3::Y * height
    }

    /// Point at `fraction` of the path's arc length
    fn point_at_fraction(&self, fraction: f32) -> Vec3 {
        let total = self.cumulative.last().copied().unwrap_or(0.0);
        if total <= 0.0 {
            return self.destination();
        }
        let target = total * fraction.clamp(0.0, 1.0);

        // First point whose cumulative length reaches the target
        let index = self.cumulative.partition_point(|&length| length < target);
        if index == 0 {
            return self.path.first().copied().unwrap_or_default();
        }
        let (Some(&from), Some(&to)) = (self.path.get(index - 1), self.path.get(index)) else {
            return self.destination();
        };
        let from_length = self.cumulative[index - 1];
        let segment = self.cumulative[index] - from_length;
        if segment <= 0.0 {
            return to;
        }
        from.lerp(to, (target - from_length) / segment)
    }
}
