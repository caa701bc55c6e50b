//! Fixed-timestep driver
//!
//! Turns variable frame deltas from the host into `SIM_DT` engine steps.

use rand::Rng;

use super::engine::Engine;
use super::state::GameEvent;
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Frame-time accumulator owned by the host loop
#[derive(Debug, Clone)]
pub struct FixedStep {
    accumulator: f32,
    step: f32,
    max_substeps: u32,
    max_frame: f32,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(SIM_DT)
    }
}

impl FixedStep {
    pub fn new(step: f32) -> Self {
        Self {
            accumulator: 0.0,
            step,
            max_substeps: MAX_SUBSTEPS,
            max_frame: MAX_FRAME_DT,
        }
    }

    pub fn step_size(&self) -> f32 {
        self.step
    }

    /// Time carried over to the next frame
    pub fn pending(&self) -> f32 {
        self.accumulator
    }

    pub fn clear(&mut self) {
        self.accumulator = 0.0;
    }

    /// Feed one frame's elapsed time, running as many fixed steps as fit
    pub fn advance<R: Rng>(&mut self, engine: &mut Engine<R>, frame_dt: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if frame_dt.is_nan() || frame_dt <= 0.0 {
            return events;
        }
        self.accumulator += frame_dt.min(self.max_frame);

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < self.max_substeps {
            events.extend(engine.step(self.step));
            self.accumulator -= self.step;
            substeps += 1;
        }

        // Drop what the substep cap could not consume
        if substeps == self.max_substeps && self.accumulator >= self.step {
            log::debug!("Dropping {:.3}s of simulation backlog", self.accumulator);
            self.accumulator = 0.0;
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{EngineConfig, GameMode};

    #[test]
    fn test_accumulates_partial_frames() {
        let mut engine = Engine::new(EngineConfig::default(), 5).unwrap();
        engine.jump();
        let mut clock = FixedStep::new(0.01);

        clock.advance(&mut engine, 0.004);
        // Not enough for a step yet
        assert_eq!(engine.snapshot().player.vy, -320.0);
        clock.advance(&mut engine, 0.007);
        assert!(engine.snapshot().player.vy > -320.0);
        assert!((clock.pending() - 0.001).abs() < 1e-5);
    }

    #[test]
    fn test_matches_direct_stepping() {
        let mut direct = Engine::new(EngineConfig::default(), 5).unwrap();
        let mut driven = Engine::new(EngineConfig::default(), 5).unwrap();
        direct.jump();
        driven.jump();

        // Binary fractions keep the accumulator exact
        let step = 1.0 / 128.0;
        let mut clock = FixedStep::new(step);
        for _ in 0..10 {
            direct.step(step);
        }
        clock.advance(&mut driven, 5.0 * step);
        clock.advance(&mut driven, 5.0 * step);
        assert_eq!(clock.pending(), 0.0);

        let a = direct.snapshot().player;
        let b = driven.snapshot().player;
        assert!((a.y - b.y).abs() < 1e-3);
    }

    #[test]
    fn test_substep_cap_drops_backlog() {
        let mut engine = Engine::new(EngineConfig::default(), 5).unwrap();
        engine.jump();
        let mut clock = FixedStep::default();
        // 0.1s clamp at 120 Hz would be 12 steps; only 8 run
        clock.advance(&mut engine, 5.0);
        assert_eq!(clock.pending(), 0.0);
        let expected_vy = -320.0 + 900.0 * SIM_DT * 8.0;
        assert!((engine.snapshot().player.vy - expected_vy).abs() < 1e-2);
        assert_eq!(engine.mode(), GameMode::Playing);
    }

    #[test]
    fn test_bad_frame_deltas_are_ignored() {
        let mut engine = Engine::new(EngineConfig::default(), 5).unwrap();
        engine.jump();
        let before = engine.snapshot();
        let mut clock = FixedStep::default();

        for dt in [0.0, -0.25, f32::NAN, -f32::INFINITY] {
            assert!(clock.advance(&mut engine, dt).is_empty());
        }
        assert_eq!(clock.pending(), 0.0);
        assert_eq!(engine.snapshot(), before);
    }
}
