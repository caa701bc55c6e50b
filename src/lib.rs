//! Skyflap - a flappy arcade game core with a best-score leaderboard
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacles, scoring, game mode)
//! - `leaderboard`: Score reconciliation against a profile/run store
//! - `platform`: Browser/native platform abstraction and host bindings
//! - `settings`: Player-facing presets and persisted preferences

pub mod leaderboard;
pub mod platform;
pub mod settings;
pub mod sim;

pub use leaderboard::{
    LeaderboardEntry, Profile, ProfileSeed, Reconciler, ScoreError, ScoreStore, StoreError,
};
pub use settings::{Preset, Settings};
pub use sim::{Engine, EngineConfig, GameMode, Snapshot};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the host driver accepts (tab switches, stalls)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Longest delta a single engine step integrates (~33ms)
    pub const MAX_STEP_DT: f32 = 1.0 / 30.0;

    /// Playfield defaults (logical pixels)
    pub const PLAYFIELD_WIDTH: f32 = 480.0;
    pub const PLAYFIELD_HEIGHT: f32 = 640.0;
    pub const GROUND_HEIGHT: f32 = 70.0;

    /// Player defaults
    pub const PLAYER_X: f32 = 130.0;
    pub const PLAYER_RADIUS: f32 = 22.0;

    /// Downward acceleration (pixels/s²)
    pub const GRAVITY: f32 = 900.0;
    /// Velocity set by a jump (negative = upward, pixels/s)
    pub const JUMP_VELOCITY: f32 = -320.0;

    /// Obstacle defaults
    pub const OBSTACLE_SPEED: f32 = 180.0;
    pub const OBSTACLE_GAP: f32 = 170.0;
    pub const OBSTACLE_WIDTH: f32 = 86.0;
    /// Seconds between spawns
    pub const SPAWN_INTERVAL: f32 = 1.35;
    /// Keeps every gap clear of the ceiling and the ground band
    pub const GAP_MARGIN: f32 = 90.0;
    /// Obstacles enter this far right of the playfield
    pub const SPAWN_OFFSET: f32 = 40.0;
    /// Obstacles leave once this far left of the playfield
    pub const DESPAWN_MARGIN: f32 = 40.0;
}
