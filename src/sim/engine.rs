//! Simulation step
//!
//! Advances the run by a caller-supplied delta: gravity, bounds, spawning,
//! scrolling, then the collision/scoring pass in spawn order.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{circle_hits_obstacle, extent_hits_obstacle};
use super::config::{ConfigError, EngineConfig, HitModel};
use super::state::{CrashCause, GameEvent, GameMode, Obstacle, PlayerState, Snapshot};

/// The flappy simulation
///
/// Single-threaded and synchronous. Hosts drive it with `step` and `jump`
/// and read it back through `snapshot`.
#[derive(Debug, Clone)]
pub struct Engine<R = Pcg32> {
    config: EngineConfig,
    mode: GameMode,
    score: u32,
    player: PlayerState,
    /// In spawn order
    obstacles: Vec<Obstacle>,
    spawn_timer: f32,
    next_id: u32,
    rng: R,
}

impl Engine<Pcg32> {
    /// Create an engine whose obstacle placement is seeded by `seed`
    pub fn new(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> Engine<R> {
    /// Create an engine drawing gap positions from `rng`
    pub fn with_rng(config: EngineConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let player = initial_player(&config);
        Ok(Self {
            config,
            mode: GameMode::Ready,
            score: 0,
            player,
            obstacles: Vec::new(),
            spawn_timer: 0.0,
            next_id: 1,
            rng,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Leave `Ready` without flapping
    pub fn start(&mut self) {
        if self.mode == GameMode::Ready {
            self.mode = GameMode::Playing;
            log::info!("Run started");
        }
    }

    /// Flap. The first jump of a run also starts it.
    pub fn jump(&mut self) {
        self.start();
        if self.mode != GameMode::Playing {
            return;
        }
        self.player.vy = self.config.jump_velocity;
    }

    /// Advance the run by `dt` seconds (clamped to `max_step_dt`)
    pub fn step(&mut self, dt: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.mode != GameMode::Playing || dt.is_nan() || dt <= 0.0 {
            return events;
        }
        let dt = dt.min(self.config.max_step_dt);

        self.player.vy += self.config.gravity * dt;
        if let Some(max_fall) = self.config.max_fall_speed {
            self.player.vy = self.player.vy.min(max_fall);
        }
        self.player.y += self.player.vy * dt;

        if self.player.top() <= 0.0 {
            self.crash(CrashCause::Ceiling, &mut events);
            return events;
        }
        if self.player.bottom() >= self.config.playable_height() {
            self.crash(CrashCause::Ground, &mut events);
            return events;
        }

        self.spawn_timer += dt;
        if self.spawn_timer >= self.config.spawn_interval {
            self.spawn_timer = 0.0;
            let id = self.spawn_obstacle();
            events.push(GameEvent::Spawned { id });
        }

        let shift = self.config.obstacle_speed * dt;
        let width = self.config.obstacle_width;
        let despawn = -self.config.despawn_margin;
        for obstacle in &mut self.obstacles {
            obstacle.x -= shift;
        }
        self.obstacles.retain(|o| o.trailing_edge(width) > despawn);

        let config = &self.config;
        let player = self.player;
        let mut crashed_into = None;
        for obstacle in &mut self.obstacles {
            if hits(config, &player, obstacle) {
                crashed_into = Some(obstacle.id);
                break;
            }
            if !obstacle.passed && obstacle.trailing_edge(width) < player.left() {
                obstacle.passed = true;
                self.score += 1;
                events.push(GameEvent::Passed {
                    id: obstacle.id,
                    score: self.score,
                });
            }
        }
        if let Some(id) = crashed_into {
            self.crash(CrashCause::Obstacle { id }, &mut events);
        }

        events
    }

    /// Back to a fresh `Ready` run; configuration and RNG stream are kept
    pub fn reset(&mut self) {
        self.mode = GameMode::Ready;
        self.score = 0;
        self.player = initial_player(&self.config);
        self.obstacles.clear();
        self.spawn_timer = 0.0;
        self.next_id = 1;
    }

    /// Owned copy of the render-facing state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.mode,
            score: self.score,
            player: self.player,
            obstacles: self.obstacles.clone(),
            obstacle_gap: self.config.obstacle_gap,
            obstacle_width: self.config.obstacle_width,
            ground_height: self.config.ground_height,
        }
    }

    fn spawn_obstacle(&mut self) -> u32 {
        let (lo, hi) = self.config.gap_y_range();
        let gap_y = self.rng.random_range(lo..=hi).clamp(lo, hi);
        let id = self.next_id;
        self.next_id += 1;
        self.obstacles.push(Obstacle {
            id,
            x: self.config.width + self.config.spawn_offset,
            gap_y,
            passed: false,
        });
        log::debug!("Spawned obstacle {} with gap at {:.1}", id, gap_y);
        id
    }

    fn crash(&mut self, cause: CrashCause, events: &mut Vec<GameEvent>) {
        self.mode = GameMode::Over;
        log::info!("Run over ({:?}) with score {}", cause, self.score);
        events.push(GameEvent::Crashed {
            cause,
            score: self.score,
        });
    }
}

fn initial_player(config: &EngineConfig) -> PlayerState {
    PlayerState {
        x: config.player_x,
        y: config.height * 0.5,
        vy: 0.0,
        r: config.player_radius,
    }
}

fn hits(config: &EngineConfig, player: &PlayerState, obstacle: &Obstacle) -> bool {
    match config.hit_model {
        HitModel::Extent => {
            extent_hits_obstacle(player, obstacle, config.obstacle_width, config.obstacle_gap)
        }
        HitModel::Circle => circle_hits_obstacle(
            player,
            obstacle,
            config.obstacle_width,
            config.obstacle_gap,
            config.playable_height(),
        ),
    }
}
