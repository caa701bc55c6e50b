//! Game settings and preferences
//!
//! Persisted separately from scores: LocalStorage on web, a JSON file named
//! by `SKYFLAP_SETTINGS` on native.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::leaderboard::{DEFAULT_LEADERBOARD_LIMIT, MAX_LEADERBOARD_LIMIT};
use crate::platform::storage;
use crate::sim::{EngineConfig, HitModel};

/// Tuning presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    /// Wider gaps, slower scrolling
    Relaxed,
    #[default]
    Standard,
    /// Narrow pillars, capped fall speed, no ground band, circle hits
    Classic,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Relaxed => "Relaxed",
            Preset::Standard => "Standard",
            Preset::Classic => "Classic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "easy" => Some(Preset::Relaxed),
            "standard" | "normal" => Some(Preset::Standard),
            "classic" => Some(Preset::Classic),
            _ => None,
        }
    }

    /// Engine tuning for this preset
    pub fn engine_config(&self) -> EngineConfig {
        match self {
            Preset::Relaxed => EngineConfig {
                gravity: 800.0,
                jump_velocity: -300.0,
                obstacle_speed: 150.0,
                obstacle_gap: 200.0,
                spawn_interval: 1.6,
                ..Default::default()
            },
            Preset::Standard => EngineConfig::default(),
            Preset::Classic => EngineConfig {
                ground_height: 0.0,
                jump_velocity: -300.0,
                max_fall_speed: Some(500.0),
                obstacle_speed: 190.0,
                obstacle_width: 48.0,
                spawn_interval: 1.5,
                gap_margin_top: 35.0,
                gap_margin_bottom: 35.0,
                spawn_offset: 30.0,
                despawn_margin: 0.0,
                player_x: 120.0,
                player_radius: 16.0,
                hit_model: HitModel::Circle,
                ..Default::default()
            },
        }
    }
}

/// Settings that failed to load or save
#[derive(Debug)]
pub enum SettingsError {
    Parse(serde_json::Error),
    Storage(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "settings are not valid JSON: {e}"),
            Self::Storage(e) => write!(f, "settings storage failed: {e}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Storage(_) => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub preset: Preset,
    /// Overrides the preset's hit model
    pub hit_model: Option<HitModel>,
    /// Rows shown on the leaderboard screen
    pub leaderboard_limit: usize,
    /// Fixed obstacle seed for practice; random per run when unset
    pub practice_seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: Preset::Standard,
            hit_model: None,
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
            practice_seed: None,
        }
    }
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "skyflap_settings";

    /// Environment variable naming the native settings file
    pub const PATH_VAR: &'static str = "SKYFLAP_SETTINGS";

    /// Create settings from a preset
    pub fn from_preset(preset: Preset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    /// Engine configuration with overrides applied
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = self.preset.engine_config();
        if let Some(hit_model) = self.hit_model {
            config.hit_model = hit_model;
        }
        config
    }

    /// Leaderboard page size, clamped to what the store serves
    pub fn leaderboard_limit(&self) -> usize {
        self.leaderboard_limit.clamp(1, MAX_LEADERBOARD_LIMIT)
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(SettingsError::Parse)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        serde_json::to_string_pretty(self).map_err(SettingsError::Parse)
    }

    /// Load from `location`, falling back to defaults on any problem
    pub fn load_from(location: &str) -> Self {
        match storage::read(location) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", location);
                    return settings;
                }
                Err(e) => log::warn!("Ignoring settings at {}: {}", location, e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Could not read settings: {}", e),
        }
        log::info!("Using default settings");
        Self::default()
    }

    pub fn save_to(&self, location: &str) -> Result<(), SettingsError> {
        let json = self.to_json()?;
        storage::write(location, &json).map_err(SettingsError::Storage)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Load from the platform's default location
    pub fn load() -> Self {
        match Self::location() {
            Some(location) => Self::load_from(&location),
            None => Self::default(),
        }
    }

    /// Drop saved settings at `location`; the next load uses defaults
    pub fn clear_at(location: &str) -> Result<(), SettingsError> {
        storage::remove(location).map_err(SettingsError::Storage)?;
        log::info!("Settings cleared");
        Ok(())
    }

    /// Save to the platform's default location (no-op natively without `SKYFLAP_SETTINGS`)
    pub fn save(&self) -> Result<(), SettingsError> {
        match Self::location() {
            Some(location) => self.save_to(&location),
            None => {
                log::debug!("{} not set, settings not saved", Self::PATH_VAR);
                Ok(())
            }
        }
    }

    /// Drop settings saved at the platform's default location
    pub fn clear() -> Result<(), SettingsError> {
        match Self::location() {
            Some(location) => Self::clear_at(&location),
            None => Ok(()),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn location() -> Option<String> {
        Some(Self::STORAGE_KEY.to_string())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn location() -> Option<String> {
        std::env::var(Self::PATH_VAR).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_is_valid() {
        for preset in [Preset::Relaxed, Preset::Standard, Preset::Classic] {
            assert_eq!(preset.engine_config().validate(), Ok(()), "{}", preset.as_str());
        }
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(Preset::from_str("EASY"), Some(Preset::Relaxed));
        assert_eq!(Preset::from_str("classic"), Some(Preset::Classic));
        assert_eq!(Preset::from_str("nightmare"), None);
        assert_eq!(Preset::from_str(Preset::Standard.as_str()), Some(Preset::Standard));
    }

    #[test]
    fn test_hit_model_override() {
        let mut settings = Settings::from_preset(Preset::Classic);
        assert_eq!(settings.engine_config().hit_model, HitModel::Circle);
        settings.hit_model = Some(HitModel::Extent);
        assert_eq!(settings.engine_config().hit_model, HitModel::Extent);
        assert_eq!(settings.engine_config().max_fall_speed, Some(500.0));
    }

    #[test]
    fn test_partial_json() {
        let settings = Settings::from_json(r#"{"preset": "Relaxed"}"#).unwrap();
        assert_eq!(settings.preset, Preset::Relaxed);
        assert_eq!(settings.leaderboard_limit, DEFAULT_LEADERBOARD_LIMIT);
        assert!(Settings::from_json("{").is_err());
    }

    #[test]
    fn test_leaderboard_limit_clamp() {
        let settings = Settings {
            leaderboard_limit: 500,
            ..Default::default()
        };
        assert_eq!(settings.leaderboard_limit(), MAX_LEADERBOARD_LIMIT);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let location = path.to_str().unwrap();

        assert_eq!(Settings::load_from(location), Settings::default());

        let settings = Settings {
            preset: Preset::Classic,
            practice_seed: Some(42),
            ..Default::default()
        };
        settings.save_to(location).unwrap();
        assert_eq!(Settings::load_from(location), settings);

        std::fs::write(&path, "garbage").unwrap();
        assert_eq!(Settings::load_from(location), Settings::default());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_clear_restores_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let location = path.to_str().unwrap();

        Settings::from_preset(Preset::Relaxed).save_to(location).unwrap();
        assert_eq!(Settings::load_from(location).preset, Preset::Relaxed);

        Settings::clear_at(location).unwrap();
        assert!(!path.exists());
        assert_eq!(Settings::load_from(location), Settings::default());
        // Clearing twice is fine
        Settings::clear_at(location).unwrap();
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_save_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("settings.json");
        let err = Settings::default()
            .save_to(path.to_str().unwrap())
            .unwrap_err();
        assert!(matches!(err, SettingsError::Storage(_)));
    }
}
