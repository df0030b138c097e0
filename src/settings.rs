//! Game settings and preferences
//!
//! Persisted as JSON files in one data directory. `GameConfig` is the frozen
//! record a process runs with, assembled once at startup.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_TRACK_LENGTH;
use crate::difficulty::{DifficultyLevel, load_difficulty};
use crate::error::RacerError;
use crate::persistence;
use crate::track::{GeneratorConfig, Theme};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "RETRO_RACER_DATA_DIR";

pub const HIGH_SCORES_FILE: &str = "high_scores.json";
pub const DIFFICULTY_FILE: &str = "difficulty_settings.json";
pub const SETTINGS_FILE: &str = "game_settings.json";

/// Where the persisted files live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub dir: PathBuf,
    pub high_scores: PathBuf,
    pub difficulty: PathBuf,
    pub settings: PathBuf,
}

impl StoragePaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            high_scores: dir.join(HIGH_SCORES_FILE),
            difficulty: dir.join(DIFFICULTY_FILE),
            settings: dir.join(SETTINGS_FILE),
            dir,
        }
    }

    /// Paths under `$RETRO_RACER_DATA_DIR`, see [`StoragePaths::resolve`]
    pub fn from_env() -> Self {
        Self::resolve(env::var_os(DATA_DIR_ENV))
    }

    /// A non-empty `dir_override` wins, then the platform's local data
    /// directory, then the working directory when the home cannot be found.
    pub fn resolve(dir_override: Option<OsString>) -> Self {
        if let Some(dir) = dir_override.filter(|d| !d.is_empty()) {
            return Self::new(dir);
        }
        match ProjectDirs::from("", "", "retro-racer") {
            Some(proj) => Self::new(proj.data_local_dir()),
            None => {
                log::warn!("Could not resolve a data directory, using the working directory");
                Self::new(".")
            }
        }
    }

    pub fn ensure_dir(&self) -> Result<(), RacerError> {
        fs::create_dir_all(&self.dir).map_err(|e| RacerError::io(&self.dir, e))
    }
}

/// User preferences (`game_settings.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub sound_enabled: bool,
    pub music_enabled: bool,
    /// Effects volume (0.0 - 1.0)
    pub sound_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,

    // === Track ===
    /// Theme name, unknown names fall back to the default sprite set
    pub theme: String,
    pub creativity: f32,
    pub complexity: f32,
    /// Skill estimate fed to the track generator
    pub player_skill: f32,
    /// Let play metrics nudge the difficulty level
    pub adaptive: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            music_enabled: true,
            sound_volume: 0.7,
            music_volume: 0.5,

            theme: Theme::Default.as_str().to_string(),
            creativity: 0.5,
            complexity: 0.5,
            player_skill: 0.5,
            adaptive: false,
        }
    }
}

impl GameSettings {
    /// Load from `path`; missing or malformed files give defaults
    pub fn load(path: &Path) -> Self {
        let mut settings: Self = persistence::load_or_default(path, "game settings");
        settings.sanitize();
        settings
    }

    pub fn save(&self, path: &Path) -> Result<(), RacerError> {
        persistence::write_json_atomic(path, self)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Clamp every unit-range field into [0, 1]
    pub fn sanitize(&mut self) {
        for v in [
            &mut self.sound_volume,
            &mut self.music_volume,
            &mut self.creativity,
            &mut self.complexity,
            &mut self.player_skill,
        ] {
            *v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        }
    }
}

/// Frozen configuration for one process
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    pub difficulty: DifficultyLevel,
    pub theme: Theme,
    pub creativity: f32,
    pub complexity: f32,
    pub player_skill: f32,
    pub sound_on: bool,
    pub music_on: bool,
    pub sound_volume: f32,
    pub music_volume: f32,
    pub seed: u64,
    pub track_length: usize,
    pub adaptive: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_parts(DifficultyLevel::default(), &GameSettings::default(), 0)
    }
}

impl GameConfig {
    /// Read the difficulty and settings files under `paths`
    pub fn load(paths: &StoragePaths, seed: u64) -> Self {
        let difficulty = load_difficulty(&paths.difficulty);
        let settings = GameSettings::load(&paths.settings);
        let config = Self::from_parts(difficulty, &settings, seed);
        log::info!(
            "Config: difficulty={} theme={} creativity={:.2} complexity={:.2} seed={}",
            config.difficulty,
            config.theme.as_str(),
            config.creativity,
            config.complexity,
            config.seed
        );
        config
    }

    pub fn from_parts(difficulty: DifficultyLevel, settings: &GameSettings, seed: u64) -> Self {
        let mut settings = settings.clone();
        settings.sanitize();
        Self {
            difficulty,
            theme: Theme::from_name(&settings.theme),
            creativity: settings.creativity,
            complexity: settings.complexity,
            player_skill: settings.player_skill,
            sound_on: settings.sound_enabled,
            music_on: settings.music_enabled,
            sound_volume: settings.sound_volume,
            music_volume: settings.music_volume,
            seed,
            track_length: DEFAULT_TRACK_LENGTH,
            adaptive: settings.adaptive,
        }
    }

    pub fn with_difficulty(mut self, difficulty: DifficultyLevel) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            complexity: self.complexity,
            creativity: self.creativity,
            theme: self.theme,
        }
    }
}
