//! Engine configuration and its validation
//!
//! Fixed at construction. Defaults reproduce the standard game tuning from
//! `crate::consts`.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// How an obstacle hit is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HitModel {
    /// The player's bounding extent must sit fully inside the gap
    #[default]
    Extent,
    /// The player's circle is tested against the two pillar rectangles
    Circle,
}

/// Tunable engine parameters (lengths in playfield units, times in seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub width: f32,
    pub height: f32,
    /// Height of the ground band at the bottom of the playfield
    pub ground_height: f32,
    pub gravity: f32,
    /// Velocity set by a jump (negative = upward)
    pub jump_velocity: f32,
    /// Terminal downward velocity, if any
    pub max_fall_speed: Option<f32>,
    pub obstacle_speed: f32,
    pub obstacle_gap: f32,
    pub obstacle_width: f32,
    pub spawn_interval: f32,
    pub gap_margin_top: f32,
    pub gap_margin_bottom: f32,
    pub spawn_offset: f32,
    pub despawn_margin: f32,
    pub player_x: f32,
    pub player_radius: f32,
    /// Longest delta a single `step` integrates
    pub max_step_dt: f32,
    pub hit_model: HitModel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
            ground_height: GROUND_HEIGHT,
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            max_fall_speed: None,
            obstacle_speed: OBSTACLE_SPEED,
            obstacle_gap: OBSTACLE_GAP,
            obstacle_width: OBSTACLE_WIDTH,
            spawn_interval: SPAWN_INTERVAL,
            gap_margin_top: GAP_MARGIN,
            gap_margin_bottom: GAP_MARGIN,
            spawn_offset: SPAWN_OFFSET,
            despawn_margin: DESPAWN_MARGIN,
            player_x: PLAYER_X,
            player_radius: PLAYER_RADIUS,
            max_step_dt: MAX_STEP_DT,
            hit_model: HitModel::Extent,
        }
    }
}

/// Why a configuration was rejected
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A value that must be finite is NaN or infinite
    NotFinite { field: &'static str },
    /// A dimension, speed or interval that must be positive is not
    NonPositive { field: &'static str, value: f32 },
    /// A margin or offset that must not be negative is
    Negative { field: &'static str, value: f32 },
    /// Gravity must pull down and a jump must push up
    WrongDirection { field: &'static str, value: f32 },
    /// The ground band leaves no playable height
    GroundTooTall { ground_height: f32, height: f32 },
    /// Gap plus margins exceed the playable height
    GapDoesNotFit { needed: f32, available: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFinite { field } => write!(f, "{field} must be finite"),
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            Self::Negative { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            }
            Self::WrongDirection { field, value } => {
                write!(f, "{field} points the wrong way: {value}")
            }
            Self::GroundTooTall {
                ground_height,
                height,
            } => write!(
                f,
                "ground band {ground_height} leaves no room in playfield height {height}"
            ),
            Self::GapDoesNotFit { needed, available } => write!(
                f,
                "gap plus margins need {needed}, playable height is {available}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl EngineConfig {
    /// Height above the ground band
    pub fn playable_height(&self) -> f32 {
        self.height - self.ground_height
    }

    /// Inclusive range the top of a spawned gap is drawn from
    pub fn gap_y_range(&self) -> (f32, f32) {
        (
            self.gap_margin_top,
            self.playable_height() - self.gap_margin_bottom - self.obstacle_gap,
        )
    }

    /// Check every field, failing on the first violation
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("width", self.width),
            ("height", self.height),
            ("ground_height", self.ground_height),
            ("gravity", self.gravity),
            ("jump_velocity", self.jump_velocity),
            ("obstacle_speed", self.obstacle_speed),
            ("obstacle_gap", self.obstacle_gap),
            ("obstacle_width", self.obstacle_width),
            ("spawn_interval", self.spawn_interval),
            ("gap_margin_top", self.gap_margin_top),
            ("gap_margin_bottom", self.gap_margin_bottom),
            ("spawn_offset", self.spawn_offset),
            ("despawn_margin", self.despawn_margin),
            ("player_x", self.player_x),
            ("player_radius", self.player_radius),
            ("max_step_dt", self.max_step_dt),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field });
            }
        }

        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("obstacle_speed", self.obstacle_speed),
            ("obstacle_gap", self.obstacle_gap),
            ("obstacle_width", self.obstacle_width),
            ("spawn_interval", self.spawn_interval),
            ("player_radius", self.player_radius),
            ("max_step_dt", self.max_step_dt),
        ];
        for (field, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        let non_negative = [
            ("ground_height", self.ground_height),
            ("gap_margin_top", self.gap_margin_top),
            ("gap_margin_bottom", self.gap_margin_bottom),
            ("spawn_offset", self.spawn_offset),
            ("despawn_margin", self.despawn_margin),
        ];
        for (field, value) in non_negative {
            if value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if self.gravity <= 0.0 {
            return Err(ConfigError::WrongDirection {
                field: "gravity",
                value: self.gravity,
            });
        }
        if self.jump_velocity >= 0.0 {
            return Err(ConfigError::WrongDirection {
                field: "jump_velocity",
                value: self.jump_velocity,
            });
        }
        if let Some(max_fall) = self.max_fall_speed {
            if !max_fall.is_finite() {
                return Err(ConfigError::NotFinite {
                    field: "max_fall_speed",
                });
            }
            if max_fall <= 0.0 {
                return Err(ConfigError::NonPositive {
                    field: "max_fall_speed",
                    value: max_fall,
                });
            }
        }

        if self.ground_height >= self.height {
            return Err(ConfigError::GroundTooTall {
                ground_height: self.ground_height,
                height: self.height,
            });
        }

        let needed = self.gap_margin_top + self.obstacle_gap + self.gap_margin_bottom;
        let available = self.playable_height();
        if needed > available {
            return Err(ConfigError::GapDoesNotFit { needed, available });
        }

        Ok(())
    }
}
