//! Game state and core simulation types
//!
//! Coordinates are playfield units with the origin top-left, x to the right
//! and y downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Waiting for the first jump
    Ready,
    /// Active gameplay
    Playing,
    /// Run ended; only `reset` leaves this mode
    Over,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Ready => "ready",
            GameMode::Playing => "playing",
            GameMode::Over => "over",
        }
    }
}

/// The player's circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    /// Vertical velocity (positive = falling)
    pub vy: f32,
    pub r: f32,
}

impl PlayerState {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn top(&self) -> f32 {
        self.y - self.r
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.r
    }

    pub fn left(&self) -> f32 {
        self.x - self.r
    }

    pub fn right(&self) -> f32 {
        self.x + self.r
    }
}

/// A scrolling pillar pair with a passable gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Obstacle {
    pub id: u32,
    /// Leading (left) edge
    pub x: f32,
    /// Top of the gap
    pub gap_y: f32,
    /// Set once the trailing edge clears the player
    pub passed: bool,
}

impl Obstacle {
    pub fn trailing_edge(&self, width: f32) -> f32 {
        self.x + width
    }
}

/// What ended a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrashCause {
    Ceiling,
    Ground,
    Obstacle { id: u32 },
}

/// Something that happened during a step, for sound and score hand-off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned { id: u32 },
    Passed { id: u32, score: u32 },
    Crashed { cause: CrashCause, score: u32 },
}

/// Read-only copy of everything a renderer needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub mode: GameMode,
    pub score: u32,
    pub player: PlayerState,
    pub obstacles: Vec<Obstacle>,
    pub obstacle_gap: f32,
    pub obstacle_width: f32,
    pub ground_height: f32,
}

impl Snapshot {
    /// First obstacle the player has not yet cleared
    pub fn next_obstacle(&self) -> Option<&Obstacle> {
        let left = self.player.left();
        self.obstacles
            .iter()
            .find(|o| o.trailing_edge(self.obstacle_width) >= left)
    }
}
