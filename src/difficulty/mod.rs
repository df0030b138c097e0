//! Difficulty module
//!
//! - `profile`: the three discrete presets
//! - `controller`: live speeds and spawn rates as a function of elapsed time
//! - `store`: the persisted difficulty choice

pub mod controller;
pub mod profile;
pub mod store;

pub use controller::{DifficultyController, DifficultySnapshot};
pub use profile::{DifficultyLevel, DifficultyProfile};
pub use store::{load_difficulty, save_difficulty};
