//! JavaScript host bindings
//!
//! The page owns the canvas, input and `requestAnimationFrame` loop; it feeds
//! frame times and taps into `WebGame` and draws from `snapshot_json`. When a
//! run ends `advance` returns the final score once, which the page hands to
//! `WebLeaderboard`.

use wasm_bindgen::prelude::*;

use crate::leaderboard::{LocalStore, Profile, ProfileSeed, Reconciler};
use crate::settings::Settings;
use crate::sim::{Engine, FixedStep, GameEvent};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::warn!("Logger already initialized");
    }
    log::info!("Skyflap starting...");
}

/// Saved settings as JSON (defaults when nothing is saved)
#[wasm_bindgen]
pub fn load_settings() -> Result<String, JsError> {
    Ok(Settings::load().to_json()?)
}

/// Validate and persist settings; new games pick them up
#[wasm_bindgen]
pub fn save_settings(json: &str) -> Result<(), JsError> {
    let settings = Settings::from_json(json)?;
    settings.engine_config().validate()?;
    settings.save()?;
    Ok(())
}

#[wasm_bindgen]
pub fn reset_settings() -> Result<(), JsError> {
    Ok(Settings::clear()?)
}

/// Engine plus fixed-step driver for one canvas
#[wasm_bindgen]
pub struct WebGame {
    engine: Engine,
    clock: FixedStep,
}

#[wasm_bindgen]
impl WebGame {
    /// Build a game for a `width` x `height` playfield using saved settings
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, seed: Option<u64>) -> Result<WebGame, JsError> {
        let settings = Settings::load();
        let mut config = settings.engine_config();
        config.width = width;
        config.height = height;

        let seed = seed
            .or(settings.practice_seed)
            .unwrap_or_else(|| js_sys::Date::now() as u64);
        let engine = Engine::new(config, seed)?;
        log::info!(
            "Game initialized with seed {} ({})",
            seed,
            settings.preset.as_str()
        );

        Ok(Self {
            engine,
            clock: FixedStep::default(),
        })
    }

    pub fn jump(&mut self) {
        self.engine.jump();
    }

    pub fn reset(&mut self) {
        self.engine.reset();
        self.clock.clear();
    }

    /// Feed one frame's elapsed seconds; returns the final score when the run ends
    pub fn advance(&mut self, frame_dt: f32) -> Option<u32> {
        self.clock
            .advance(&mut self.engine, frame_dt)
            .into_iter()
            .find_map(|event| match event {
                GameEvent::Crashed { score, .. } => Some(score),
                _ => None,
            })
    }

    pub fn mode(&self) -> String {
        self.engine.mode().as_str().to_string()
    }

    pub fn score(&self) -> u32 {
        self.engine.score()
    }

    pub fn snapshot_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.engine.snapshot())?)
    }
}

/// Device-local leaderboard backed by LocalStorage
#[wasm_bindgen]
pub struct WebLeaderboard {
    reconciler: Reconciler<LocalStore>,
}

#[wasm_bindgen]
impl WebLeaderboard {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebLeaderboard, JsError> {
        let store = LocalStore::open(LocalStore::DEFAULT_KEY)?;
        Ok(Self {
            reconciler: Reconciler::new(store),
        })
    }

    /// Profile for a signed-in user as JSON, created with best score 0 if missing
    pub fn ensure_profile(
        &self,
        user_id: &str,
        username: Option<String>,
    ) -> Result<String, JsError> {
        let profile = self
            .reconciler
            .ensure_profile(user_id, username.as_deref())?;
        Ok(serde_json::to_string(&profile)?)
    }

    /// Update name and avatar; the stored best score is kept
    pub fn save_profile(
        &self,
        user_id: &str,
        username: String,
        avatar_url: Option<String>,
    ) -> Result<String, JsError> {
        let profile = self.reconciler.save_profile(&Profile {
            id: user_id.to_string(),
            username,
            best_score: 0,
            avatar_url,
        })?;
        Ok(serde_json::to_string(&profile)?)
    }

    /// Record a finished run; `username` creates the profile if it is missing
    pub fn record_score(
        &self,
        user_id: &str,
        score: u32,
        username: Option<String>,
        avatar_url: Option<String>,
    ) -> Result<u32, JsError> {
        let seed = username.map(|username| ProfileSeed {
            username,
            avatar_url,
            best_score: 0,
        });
        Ok(self.reconciler.record_score(user_id, score, seed.as_ref())?)
    }

    pub fn rank(&self, user_id: &str) -> Result<Option<u32>, JsError> {
        Ok(self.reconciler.fetch_rank(user_id)?)
    }

    pub fn leaderboard_json(&self, limit: usize) -> Result<String, JsError> {
        let entries = self.reconciler.fetch_leaderboard(limit)?;
        Ok(serde_json::to_string(&entries)?)
    }

    pub fn profile_json(&self, user_id: &str) -> Result<Option<String>, JsError> {
        match self.reconciler.fetch_profile(user_id)? {
            Some(profile) => Ok(Some(serde_json::to_string(&profile)?)),
            None => Ok(None),
        }
    }
}
