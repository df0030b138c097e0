//! High score leaderboard system
//!
//! Persisted to `high_scores.json` as `{"scores": [...]}`, tracks top 10 scores.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RacerError;
use crate::persistence;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// High score leaderboard, sorted descending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    #[serde(default)]
    scores: Vec<u64>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self { scores: Vec::new() }
    }

    /// Build from an arbitrary list, sorting and trimming it
    pub fn from_scores(mut scores: Vec<u64>) -> Self {
        scores.sort_unstable_by(|a, b| b.cmp(a));
        scores.truncate(MAX_HIGH_SCORES);
        Self { scores }
    }

    pub fn scores(&self) -> &[u64] {
        &self.scores
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if self.scores.len() < MAX_HIGH_SCORES {
            return true;
        }
        // Check if score beats the lowest entry
        self.scores.last().map(|&s| score > s).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.scores.iter().position(|&s| score > s);
        Some(rank.unwrap_or(self.scores.len()) + 1)
    }

    /// Add a new score to the leaderboard (if it qualifies)
    /// Returns the rank achieved (1-indexed) or None if didn't qualify
    pub fn add_score(&mut self, score: u64) -> Option<usize> {
        let rank = self.potential_rank(score)?;
        self.scores.insert(rank - 1, score);
        self.scores.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.scores.first().copied()
    }

    /// Load the leaderboard; a missing or malformed file starts fresh
    pub fn load(path: &Path) -> Self {
        let raw: HighScores = persistence::load_or_default(path, "high scores");
        // Hand-edited files may be unsorted or too long
        let scores = Self::from_scores(raw.scores);
        log::info!("Loaded {} high scores", scores.len());
        scores
    }

    /// Rewrite the whole file atomically
    pub fn save(&self, path: &Path) -> Result<(), RacerError> {
        persistence::write_json_atomic(path, self)?;
        log::info!("High scores saved ({} entries)", self.scores.len());
        Ok(())
    }
}
