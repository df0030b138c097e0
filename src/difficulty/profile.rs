//! Difficulty presets
//!
//! A profile is the immutable set of starting values, caps and growth rates
//! for one difficulty level. Profiles are ordered: harder presets start
//! faster, grow faster and cap higher. Orb spawn runs the other way, so
//! harder levels hand out fewer collectibles.

use serde::{Deserialize, Serialize};

/// Difficulty levels, ordered easiest first
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Hard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Medium => "medium",
            DifficultyLevel::Hard => "hard",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(DifficultyLevel::Easy),
            "medium" | "med" => Some(DifficultyLevel::Medium),
            "hard" => Some(DifficultyLevel::Hard),
            _ => None,
        }
    }

    /// One level harder, if any
    pub fn harder(&self) -> Option<Self> {
        match self {
            DifficultyLevel::Easy => Some(DifficultyLevel::Medium),
            DifficultyLevel::Medium => Some(DifficultyLevel::Hard),
            DifficultyLevel::Hard => None,
        }
    }

    /// One level easier, if any
    pub fn easier(&self) -> Option<Self> {
        match self {
            DifficultyLevel::Easy => None,
            DifficultyLevel::Medium => Some(DifficultyLevel::Easy),
            DifficultyLevel::Hard => Some(DifficultyLevel::Medium),
        }
    }

    /// Points awarded per orb
    pub fn orb_points(&self) -> u64 {
        match self {
            DifficultyLevel::Easy => 1,
            DifficultyLevel::Medium => 2,
            DifficultyLevel::Hard => 3,
        }
    }

    /// Per-step enemy speed jitter bounds (inclusive)
    pub fn jitter_range(&self) -> (f32, f32) {
        match self {
            DifficultyLevel::Easy => (1.0, 1.0),
            DifficultyLevel::Medium => (0.9, 1.1),
            DifficultyLevel::Hard => (0.8, 1.2),
        }
    }

    /// Skill value this level is tuned for, on the adaptive metrics' [0, 1] scale
    pub fn skill_center(&self) -> f32 {
        match self {
            DifficultyLevel::Easy => 0.3,
            DifficultyLevel::Medium => 0.6,
            DifficultyLevel::Hard => 0.9,
        }
    }

    /// Level whose skill band contains `skill`
    pub fn for_skill(skill: f32) -> Self {
        if skill < 0.45 {
            DifficultyLevel::Easy
        } else if skill < 0.75 {
            DifficultyLevel::Medium
        } else {
            DifficultyLevel::Hard
        }
    }
}

impl std::fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Starting values, caps and growth rates for one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub level: DifficultyLevel,
    pub init_enemy_speed: f32,
    pub init_scroll_speed: f32,
    pub init_enemy_spawn: f32,
    pub init_orb_spawn: f32,
    /// Speed growth per second, before time scaling
    pub speed_growth: f32,
    /// Spawn-rate growth per second, before time scaling
    pub spawn_growth: f32,
    pub max_enemy_speed: f32,
    pub max_scroll_speed: f32,
    pub max_enemy_spawn: f32,
    pub max_orb_spawn: f32,
}

impl DifficultyProfile {
    pub fn preset(level: DifficultyLevel) -> Self {
        match level {
            DifficultyLevel::Easy => Self {
                level,
                init_enemy_speed: 1.5,
                init_scroll_speed: 2.5,
                init_enemy_spawn: 0.015,
                init_orb_spawn: 0.035,
                speed_growth: 0.00003,
                spawn_growth: 0.00001,
                max_enemy_speed: 6.0,
                max_scroll_speed: 8.0,
                max_enemy_spawn: 0.04,
                max_orb_spawn: 0.05,
            },
            DifficultyLevel::Medium => Self {
                level,
                init_enemy_speed: 3.0,
                init_scroll_speed: 5.0,
                init_enemy_spawn: 0.030,
                init_orb_spawn: 0.020,
                speed_growth: 0.00005,
                spawn_growth: 0.00002,
                max_enemy_speed: 10.0,
                max_scroll_speed: 12.0,
                max_enemy_spawn: 0.07,
                max_orb_spawn: 0.035,
            },
            DifficultyLevel::Hard => Self {
                level,
                init_enemy_speed: 7.0,
                init_scroll_speed: 9.0,
                init_enemy_spawn: 0.050,
                init_orb_spawn: 0.010,
                speed_growth: 0.0003,
                spawn_growth: 0.00005,
                max_enemy_speed: 15.0,
                max_scroll_speed: 18.0,
                max_enemy_spawn: 0.12,
                max_orb_spawn: 0.02,
            },
        }
    }

    pub fn easy() -> Self {
        Self::preset(DifficultyLevel::Easy)
    }

    pub fn medium() -> Self {
        Self::preset(DifficultyLevel::Medium)
    }

    pub fn hard() -> Self {
        Self::preset(DifficultyLevel::Hard)
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::medium()
    }
}
