pub mod config;
pub mod ecs;
pub mod game_manager;
pub mod logging;
pub mod movement;

pub use config::{ConfigError, MovementConfig};
pub use game_manager::{GamePhase, PhaseController, PhaseHandle};
pub use logging::init as init_logging;
pub use movement::{ActionKind, ActionSession, FrameInput, SessionBuilder};
