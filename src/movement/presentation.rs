/// Output side of the planner: what the visuals are told to show
///
/// The sink only receives data; the planner never reads anything back.

use glam::Vec3;

use crate::game_manager::GamePhase;
use crate::movement::envelope::MoveEnvelope;
use crate::movement::geometry::{flatten_direction, sample_arc};

/// Idle-range display: the reachable arc around the actor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeDisplay {
    pub origin: Vec3,
    pub facing: Vec3,
    pub half_angle: f32,
    pub radius: f32,
}

impl EnvelopeDisplay {
    pub fn new(origin: Vec3, facing: Vec3, envelope: MoveEnvelope) -> Self {
        Self {
            origin,
            facing: flatten_direction(facing),
            half_angle: envelope.half_angle,
            radius: envelope.radius,
        }
    }

    /// Outline as one polyline: center, arc from the left boundary to the
    /// right boundary, back to center, then out along the facing.
    pub fn outline(&self, segments: usize) -> Vec<Vec3> {
        let arc = sample_arc(self.origin, self.facing, self.radius, self.half_angle, segments);
        let mut points = Vec::with_capacity(arc.len() + 3);
        points.push(self.origin);
        points.extend(arc);
        points.push(self.origin);
        points.push(self.origin + self.facing * self.radius);
        points
    }
}

/// Receiver for planner output
pub trait PresentationSink {
    fn show_envelope(&mut self, display: &EnvelopeDisplay);
    fn hide_envelope(&mut self);

    /// Path preview; `valid` is false when any check failed
    fn show_path(&mut self, points: &[Vec3], valid: bool);
    fn hide_path(&mut self);

    /// Landing marker at the validated target
    fn show_marker(&mut self, point: Vec3, valid: bool);
    fn hide_marker(&mut self);

    fn phase_changed(&mut self, phase: GamePhase);

    /// Actor pose while a move plays out
    fn actor_moved(&mut self, _position: Vec3, _facing: Vec3) {}
}

/// Sink that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn show_envelope(&mut self, _display: &EnvelopeDisplay) {}
    fn hide_envelope(&mut self) {}
    fn show_path(&mut self, _points: &[Vec3], _valid: bool) {}
    fn hide_path(&mut self) {}
    fn show_marker(&mut self, _point: Vec3, _valid: bool) {}
    fn hide_marker(&mut self) {}
    fn phase_changed(&mut self, _phase: GamePhase) {}
}

/// Sink that writes everything to the log at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl PresentationSink for LogSink {
    fn show_envelope(&mut self, display: &EnvelopeDisplay) {
        log::debug!(
            "arc at {} facing {}: ±{:.1}° r={:.2}",
            display.origin,
            display.facing,
            display.half_angle,
            display.radius
        );
    }

    fn hide_envelope(&mut self) {
        log::debug!("arc hidden");
    }

    fn show_path(&mut self, points: &[Vec3], valid: bool) {
        log::debug!("path preview: {} points, valid={valid}", points.len());
    }

    fn hide_path(&mut self) {
        log::debug!("path hidden");
    }

    fn show_marker(&mut self, point: Vec3, valid: bool) {
        log::debug!("marker at {point}, valid={valid}");
    }

    fn hide_marker(&mut self) {
        log::debug!("marker hidden");
    }

    fn phase_changed(&mut self, phase: GamePhase) {
        log::debug!("phase now {phase:?}");
    }

    fn actor_moved(&mut self, position: Vec3, facing: Vec3) {
        log::trace!("actor at {position} facing {facing}");
    }
}
