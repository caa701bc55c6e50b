//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied time deltas only (clamped per step)
//! - Seeded RNG only
//! - Stable iteration order (obstacles in spawn order)
//! - No rendering, storage or platform dependencies

pub mod autopilot;
pub mod clock;
pub mod collision;
pub mod config;
pub mod engine;
pub mod state;

pub use clock::FixedStep;
pub use collision::{circle_hits_obstacle, extent_hits_obstacle, overlaps_horizontally};
pub use config::{ConfigError, EngineConfig, HitModel};
pub use engine::Engine;
pub use state::{CrashCause, GameEvent, GameMode, Obstacle, PlayerState, Snapshot};
