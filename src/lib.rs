//! Retro Racer - a pseudo-3D arcade racer
//!
//! Core modules:
//! - `track`: Procedural track model and generator
//! - `difficulty`: Difficulty presets, the live controller and its settings file
//! - `metrics`: Optional player-skill telemetry feeding the controller
//! - `sim`: Deterministic per-frame simulation (entities, spawning, collisions)
//! - `app`: Menu / run / pause / game-over state machine over the simulation
//! - `audio`, `input`, `persistence`, `highscores`, `settings`: thin collaborators

pub mod app;
pub mod audio;
pub mod autopilot;
pub mod difficulty;
pub mod error;
pub mod highscores;
pub mod input;
pub mod metrics;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod track;

pub use error::RacerError;
pub use highscores::HighScores;
pub use settings::{GameConfig, GameSettings, StoragePaths};

/// Game configuration constants
pub mod consts {
    /// Nominal frame rate; speeds are expressed in pixels per frame at this rate
    pub const TARGET_FPS: f32 = 60.0;
    /// Largest frame delta the simulation will integrate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.25;

    /// Play area
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Road region in screen space
    pub const ROAD_LEFT: f32 = 200.0;
    pub const ROAD_RIGHT: f32 = 600.0;
    pub const LANE_COUNT: usize = 4;
    /// Gap kept between the player and the road edge
    pub const ROAD_MARGIN: f32 = 10.0;

    /// Player car
    pub const PLAYER_WIDTH: f32 = 50.0;
    pub const PLAYER_HEIGHT: f32 = 90.0;
    /// Horizontal speed in pixels per normalised frame
    pub const PLAYER_SPEED: f32 = 5.0;
    /// Distance between the player's bottom edge and the screen bottom
    pub const PLAYER_BOTTOM_OFFSET: f32 = 20.0;

    /// Hostile cars
    pub const ENEMY_WIDTH: f32 = 60.0;
    pub const ENEMY_HEIGHT: f32 = 90.0;

    /// Collectible orbs
    pub const ORB_RADIUS: f32 = 12.0;

    /// Entities further than this below the screen are culled
    pub const CULL_MARGIN: f32 = 50.0;

    /// Background scrolling
    pub const ROAD_TILE_HEIGHT: f32 = 100.0;
    pub const ROAD_TILE_VARIANTS: u8 = 4;
    pub const STRIPE_SPACING: f32 = 80.0;
    pub const STRIPE_LENGTH: f32 = 40.0;

    /// Track generation
    pub const DEFAULT_TRACK_LENGTH: usize = 5000;
    /// Distance (pixels) covered by one track segment
    pub const SEGMENT_LENGTH: f32 = 200.0;

    /// Horizontal gap under which a passing enemy counts as a near miss
    pub const NEAR_MISS_GAP: f32 = 25.0;
}

/// Width of a single lane
#[inline]
pub fn lane_width() -> f32 {
    (consts::ROAD_RIGHT - consts::ROAD_LEFT) / consts::LANE_COUNT as f32
}

/// Horizontal centre of a lane, or `None` for an out-of-range lane
#[inline]
pub fn lane_center(lane: usize) -> Option<f32> {
    (lane < consts::LANE_COUNT).then(|| consts::ROAD_LEFT + lane_width() * (lane as f32 + 0.5))
}

/// Smoothstep easing over t in [0, 1]
#[inline]
pub fn ease(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
