//! Simulation state and entity types
//!
//! Everything a run needs lives in `Simulation`; the world RNG is owned by
//! `World` and is the only source of randomness during a run.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;
use crate::difficulty::{DifficultyController, DifficultyLevel, DifficultyProfile};
use crate::lane_center;
use crate::metrics::AdaptiveMetrics;
use crate::track::Track;

/// Something that happened during a step, for audio/UI to react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player hit an enemy; the run is over
    Crash,
    /// An orb was picked up
    OrbCollected { points: u64 },
    /// An enemy passed the player with only a small gap
    NearMiss,
    /// Adaptive metrics moved the difficulty to a new level
    DifficultyShift(DifficultyLevel),
}

/// The player's car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Horizontal speed in pixels per normalised frame
    pub speed: f32,
}

impl Default for Player {
    fn default() -> Self {
        let size = Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT);
        Self {
            pos: Vec2::new(
                (ROAD_LEFT + ROAD_RIGHT) / 2.0 - size.x / 2.0,
                SCREEN_HEIGHT - size.y - PLAYER_BOTTOM_OFFSET,
            ),
            size,
            speed: PLAYER_SPEED,
        }
    }
}

impl Player {
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    pub fn min_x(&self) -> f32 {
        ROAD_LEFT + ROAD_MARGIN
    }

    pub fn max_x(&self) -> f32 {
        ROAD_RIGHT - self.size.x - ROAD_MARGIN
    }

    /// Move horizontally by `intent` (-1 left .. +1 right), clamped to the road
    pub fn steer(&mut self, intent: f32, dt_norm: f32) {
        let intent = if intent.is_nan() {
            0.0
        } else {
            intent.clamp(-1.0, 1.0)
        };
        let x = self.pos.x + intent * self.speed * dt_norm;
        self.pos.x = x.clamp(self.min_x(), self.max_x());
    }

    /// Pressed against either road edge
    pub fn on_shoulder(&self) -> bool {
        self.pos.x <= self.min_x() || self.pos.x >= self.max_x()
    }
}

/// A hostile car
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub lane: Option<usize>,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Speed multiplier drawn for the most recent step
    pub speed_mul: f32,
    /// Already past the player (near-miss bookkeeping)
    pub passed: bool,
}

impl Enemy {
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }
}

/// A collectible orb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orb {
    pub id: u32,
    pub center: Vec2,
    pub radius: f32,
    pub collected: bool,
}

impl Orb {
    pub fn rect(&self) -> Rect {
        Rect::around_circle(self.center, self.radius)
    }
}

/// A scrolling road background tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadTile {
    pub y: f32,
    /// Which road sprite variant to draw, advanced on every recycle
    pub variant: u8,
}

/// Dashes of one lane divider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripeColumn {
    /// Divider index, 0 is between lane 0 and lane 1
    pub divider: usize,
    pub x: f32,
    pub dashes: Vec<f32>,
}

/// Scrolling road tiles and lane stripes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Road {
    pub tiles: Vec<RoadTile>,
    pub stripes: Vec<StripeColumn>,
}

impl Default for Road {
    fn default() -> Self {
        let tile_count = (SCREEN_HEIGHT / ROAD_TILE_HEIGHT).ceil() as usize + 1;
        let tiles = (0..tile_count)
            .map(|i| RoadTile {
                y: SCREEN_HEIGHT - (i as f32 + 1.0) * ROAD_TILE_HEIGHT,
                variant: (i % ROAD_TILE_VARIANTS as usize) as u8,
            })
            .collect();

        let dash_count = (SCREEN_HEIGHT / STRIPE_SPACING).ceil() as usize + 1;
        let lane_w = crate::lane_width();
        let stripes = (1..LANE_COUNT)
            .map(|d| StripeColumn {
                divider: d - 1,
                x: ROAD_LEFT + lane_w * d as f32,
                dashes: (0..dash_count)
                    .map(|i| SCREEN_HEIGHT - (i as f32 + 1.0) * STRIPE_SPACING)
                    .collect(),
            })
            .collect();

        Self { tiles, stripes }
    }
}

impl Road {
    /// Scroll everything down by `dy`, recycling what left the screen
    pub fn scroll(&mut self, dy: f32) {
        for tile in &mut self.tiles {
            tile.y += dy;
        }
        let mut top = self.tiles.iter().map(|t| t.y).fold(f32::INFINITY, f32::min);
        loop {
            let Some(tile) = self
                .tiles
                .iter_mut()
                .filter(|t| t.y >= SCREEN_HEIGHT)
                .max_by(|a, b| a.y.total_cmp(&b.y))
            else {
                break;
            };
            tile.y = top - ROAD_TILE_HEIGHT;
            tile.variant = (tile.variant + 1) % ROAD_TILE_VARIANTS;
            top = tile.y;
        }

        for column in &mut self.stripes {
            for y in &mut column.dashes {
                *y += dy;
            }
            let mut top = column.dashes.iter().copied().fold(f32::INFINITY, f32::min);
            loop {
                let Some(y) = column
                    .dashes
                    .iter_mut()
                    .filter(|y| **y >= SCREEN_HEIGHT)
                    .max_by(|a, b| a.total_cmp(b))
                else {
                    break;
                };
                *y = top - STRIPE_SPACING;
                top = *y;
            }
        }
    }
}

/// Run-level bookkeeping
#[derive(Debug, Clone)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub score: u64,
    pub high_score: u64,
    /// Set once when the player crashes; terminal for the run
    pub game_over: bool,
    pub paused: bool,
    pub elapsed_time_s: f32,
    /// Distance scrolled so far (pixels)
    pub distance: f32,
    pub orbs_collected: u32,
    /// Lane of the most recent enemy spawn
    pub last_enemy_lane: Option<usize>,
    next_id: u32,
}

impl World {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            score: 0,
            high_score: 0,
            game_over: false,
            paused: false,
            elapsed_time_s: 0.0,
            distance: 0.0,
            orbs_collected: 0,
            last_enemy_lane: None,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct Simulation {
    pub world: World,
    pub player: Player,
    /// Active enemies in spawn order
    pub enemies: Vec<Enemy>,
    /// Active orbs in spawn order
    pub orbs: Vec<Orb>,
    pub road: Road,
    pub controller: DifficultyController,
    track: Track,
    /// Present only when adaptive difficulty is enabled
    pub(crate) metrics: Option<AdaptiveMetrics>,
    /// Time spent on the current track segment
    pub(crate) segment_clock: f32,
    pub(crate) current_segment: usize,
}

impl Simulation {
    /// Create a run on `track` with the given profile and seed.
    ///
    /// With `adaptive` off no metrics are gathered and the controller
    /// follows the profile alone.
    pub fn new(track: Track, profile: DifficultyProfile, seed: u64, adaptive: bool) -> Self {
        Self {
            world: World::new(seed),
            player: Player::default(),
            enemies: Vec::new(),
            orbs: Vec::new(),
            road: Road::default(),
            controller: DifficultyController::new(profile),
            track,
            metrics: adaptive.then(AdaptiveMetrics::new),
            segment_clock: 0.0,
            current_segment: 0,
        }
    }

    /// Carry the best score of earlier runs into this one
    pub fn with_high_score(mut self, high_score: u64) -> Self {
        self.world.high_score = high_score;
        self
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn metrics(&self) -> Option<&AdaptiveMetrics> {
        self.metrics.as_ref()
    }

    /// Spawn an enemy centred in `lane` with its top edge at `y`.
    ///
    /// Invalid lanes are skipped silently.
    pub fn spawn_enemy_in_lane(&mut self, lane: usize, y: f32) -> Option<u32> {
        let center = lane_center(lane)?;
        let id = self.spawn_enemy_at(center - ENEMY_WIDTH / 2.0, y);
        if let Some(enemy) = self.enemies.last_mut() {
            enemy.lane = Some(lane);
        }
        Some(id)
    }

    /// Spawn an enemy with its top-left corner at (x, y)
    pub fn spawn_enemy_at(&mut self, x: f32, y: f32) -> u32 {
        let id = self.world.next_entity_id();
        self.enemies.push(Enemy {
            id,
            lane: None,
            pos: Vec2::new(x, y),
            size: Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT),
            speed_mul: 1.0,
            passed: false,
        });
        id
    }

    /// Spawn an orb centred at (x, y)
    pub fn spawn_orb_at(&mut self, x: f32, y: f32) -> u32 {
        let id = self.world.next_entity_id();
        self.orbs.push(Orb {
            id,
            center: Vec2::new(x, y),
            radius: ORB_RADIUS,
            collected: false,
        });
        id
    }
}
