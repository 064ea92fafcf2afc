use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::movement::actor::ActionKind;
use crate::movement::envelope::TargetPolicy;

/// Complete movement configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub speed: SpeedConfigData,
    pub collision: CollisionConfigData,
    pub run: ActionProfile,
    pub jump: ActionProfile,

    /// Fraction of the jump distance used as the apex height
    pub jump_height_ratio: f32,

    /// Number of path segments; paths carry `path_resolution + 1` points
    pub path_resolution: usize,

    /// Time-flow rate applied while executing
    pub execution_time_scale: f32,

    pub target_policy: TargetPolicy,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            speed: SpeedConfigData::default(),
            collision: CollisionConfigData::default(),
            run: ActionProfile::run(),
            jump: ActionProfile::jump(),
            jump_height_ratio: 0.3,
            path_resolution: 20,
            execution_time_scale: 1.0,
            target_policy: TargetPolicy::ClampToArc,
        }
    }
}

impl MovementConfig {
    /// Load configuration from JSON file
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: MovementConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file with pretty formatting
    pub fn save(&self, path: &str) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Using default movement config ({path}): {err:#}");
                let config = Self::default();
                if let Err(err) = config.save(path) {
                    log::warn!("Could not write default movement config to {path}: {err:#}");
                }
                config
            }
        }
    }

    /// Tuning profile for an action kind. `None` has no profile.
    pub fn profile(&self, kind: ActionKind) -> Option<&ActionProfile> {
        match kind {
            ActionKind::Run => Some(&self.run),
            ActionKind::Jump => Some(&self.jump),
            ActionKind::None => None,
        }
    }

    /// Check the ranges are usable.
    ///
    /// A degenerate speed range is allowed (it pins the envelope to the
    /// slow end); inverted or negative ranges are not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.speed.min >= 0.0 && self.speed.max >= self.speed.min) {
            return Err(ConfigError::SpeedRange {
                min: self.speed.min,
                max: self.speed.max,
            });
        }
        if self.collision.radius < 0.0 || self.collision.tolerance < 0.0 {
            return Err(ConfigError::Collision {
                radius: self.collision.radius,
                tolerance: self.collision.tolerance,
            });
        }
        for (kind, profile) in [(ActionKind::Run, &self.run), (ActionKind::Jump, &self.jump)] {
            if profile.min_angle < 0.0
                || profile.max_angle > 360.0
                || profile.min_angle > profile.max_angle
            {
                return Err(ConfigError::AngleRange {
                    kind,
                    min: profile.min_angle,
                    max: profile.max_angle,
                });
            }
            if profile.min_radius < 0.0 || profile.min_radius > profile.max_radius {
                return Err(ConfigError::RadiusRange {
                    kind,
                    min: profile.min_radius,
                    max: profile.max_radius,
                });
            }
            if profile.move_time <= 0.0 {
                return Err(ConfigError::MoveTime {
                    kind,
                    seconds: profile.move_time,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("speed range {min}..{max} is invalid")]
    SpeedRange { min: f32, max: f32 },

    #[error("collision radius {radius} / tolerance {tolerance} must not be negative")]
    Collision { radius: f32, tolerance: f32 },

    #[error("{kind:?} turn angles {min}..{max} are invalid")]
    AngleRange { kind: ActionKind, min: f32, max: f32 },

    #[error("{kind:?} radii {min}..{max} are invalid")]
    RadiusRange { kind: ActionKind, min: f32, max: f32 },

    #[error("{kind:?} move time must be positive, got {seconds}")]
    MoveTime { kind: ActionKind, seconds: f32 },
}

/// Speed limits (units per turn)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedConfigData {
    pub min: f32,
    pub max: f32,
    /// Speed the actor starts with
    pub initial: f32,
}

impl Default for SpeedConfigData {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 5.0,
            initial: 3.0,
        }
    }
}

/// Actor footprint used for obstacle checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionConfigData {
    pub radius: f32,
    /// Slack subtracted from the radius so grazing contacts don't count
    pub tolerance: f32,
}

impl Default for CollisionConfigData {
    fn default() -> Self {
        Self {
            radius: 0.5,
            tolerance: 0.1,
        }
    }
}

/// Per-action envelope tuning.
///
/// Angles are full turn angles in degrees; the envelope uses half of them.
/// `max_angle` applies at minimum speed, `min_angle` at maximum speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionProfile {
    pub min_angle: f32,
    pub max_angle: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    /// Seconds a committed move takes at time scale 1
    pub move_time: f32,
}

impl ActionProfile {
    pub fn run() -> Self {
        Self {
            min_angle: 30.0,
            max_angle: 120.0,
            min_radius: 1.0,
            max_radius: 6.0,
            move_time: 1.0,
        }
    }

    pub fn jump() -> Self {
        Self {
            min_angle: 30.0,
            max_angle: 90.0,
            min_radius: 2.0,
            max_radius: 8.0,
            move_time: 0.8,
        }
    }
}
