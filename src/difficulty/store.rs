//! Persisted difficulty choice (`difficulty_settings.json`)
//!
//! The file holds a single key: `{"difficulty": "easy" | "medium" | "hard"}`.
//! Anything unreadable degrades to medium with a warning.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::profile::DifficultyLevel;
use crate::error::RacerError;
use crate::persistence;

#[derive(Debug, Default, Serialize, Deserialize)]
struct DifficultyFile {
    #[serde(default)]
    difficulty: Option<String>,
}

/// Load the saved level, falling back to medium
pub fn load_difficulty(path: &Path) -> DifficultyLevel {
    let file: DifficultyFile = persistence::load_or_default(path, "difficulty settings");
    match file.difficulty.as_deref() {
        Some(name) => DifficultyLevel::from_name(name).unwrap_or_else(|| {
            log::warn!("Unknown difficulty '{}', falling back to medium", name);
            DifficultyLevel::Medium
        }),
        None => {
            log::warn!("Difficulty key missing in {}, using medium", path.display());
            DifficultyLevel::Medium
        }
    }
}

/// Persist the chosen level
pub fn save_difficulty(path: &Path, level: DifficultyLevel) -> Result<(), RacerError> {
    let file = DifficultyFile {
        difficulty: Some(level.as_str().to_string()),
    };
    persistence::write_json_atomic(path, &file)?;
    log::info!("Difficulty saved: {}", level);
    Ok(())
}
