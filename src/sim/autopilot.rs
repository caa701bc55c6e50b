//! Idle/demo controller
//!
//! Steers the player toward the middle of the next gap by flapping whenever
//! it sinks too far below it. Good enough for attract mode and smoke runs.

use rand::Rng;

use super::clock::FixedStep;
use super::config::EngineConfig;
use super::engine::Engine;
use super::state::{GameEvent, GameMode, Snapshot};

/// How far below the target the player may sink before flapping
const FLAP_SLACK: f32 = 25.0;

/// Host frame length used by `play_run`
const FRAME_DT: f32 = 1.0 / 60.0;

/// Height the autopilot aims for
pub fn target_y(snapshot: &Snapshot, config: &EngineConfig) -> f32 {
    match snapshot.next_obstacle() {
        Some(obstacle) => obstacle.gap_y + snapshot.obstacle_gap * 0.5,
        None => config.playable_height() * 0.5,
    }
}

/// Whether to flap this frame
pub fn should_jump(snapshot: &Snapshot, config: &EngineConfig) -> bool {
    match snapshot.mode {
        GameMode::Ready => true,
        GameMode::Over => false,
        GameMode::Playing => {
            let player = &snapshot.player;
            player.vy >= 0.0 && player.y > target_y(snapshot, config) + FLAP_SLACK
        }
    }
}

/// Play one run at 60 fps until it ends or `max_seconds` elapse
///
/// Returns the final snapshot and every event the run produced.
pub fn play_run<R: Rng>(engine: &mut Engine<R>, max_seconds: f32) -> (Snapshot, Vec<GameEvent>) {
    let mut clock = FixedStep::default();
    let mut events = Vec::new();
    let frames = (max_seconds / FRAME_DT).ceil() as u32;

    for _ in 0..frames {
        if should_jump(&engine.snapshot(), engine.config()) {
            engine.jump();
        }
        events.extend(clock.advance(engine, FRAME_DT));
        if engine.mode() == GameMode::Over {
            break;
        }
    }

    (engine.snapshot(), events)
}
