/// Movement system for turn-based tactical gameplay
///
/// Handles action selection, reachable arcs, target validation and path
/// playback for a single actor

pub mod actor;
pub mod envelope;
pub mod events;
pub mod follow;
pub mod geometry;
pub mod input;
pub mod presentation;
pub mod session;

pub use actor::{ActionKind, ActorState};
pub use envelope::{assess_target, compute_envelope, compute_path, MoveEnvelope, TargetAssessment, TargetPolicy};
pub use events::{ActionEvent, ActionLog};
pub use follow::{Easing, FollowStatus, PathFollow};
pub use input::{FrameInput, GroundPicker, GroundPlane, PointerRay};
pub use presentation::{EnvelopeDisplay, LogSink, NullSink, PresentationSink};
pub use session::{ActionSession, Collaborator, SessionBuilder, WiringError};
