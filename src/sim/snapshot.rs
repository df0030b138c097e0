//! Read-only view of a run for the draw layer

use serde::{Deserialize, Serialize};

use super::state::{RoadTile, Simulation, StripeColumn};
use crate::consts::*;
use crate::difficulty::DifficultyLevel;
use crate::track::{RoadsideSprite, SpriteKind};

/// How many segments ahead of the player roadside sprites are reported for
const SPRITE_LOOKAHEAD: usize = 6;
/// Screen-space width of a roadside sprite box
const ROADSIDE_SPRITE_SIZE: f32 = 60.0;

/// Entity variants the renderer dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy,
    Orb,
    Sprite(SpriteKind),
}

/// Suggested draw colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColourHint {
    Cyan,
    Magenta,
    Yellow,
    Green,
    Grey,
}

impl EntityKind {
    pub fn colour(&self) -> ColourHint {
        match self {
            EntityKind::Player => ColourHint::Cyan,
            EntityKind::Enemy => ColourHint::Magenta,
            EntityKind::Orb => ColourHint::Yellow,
            EntityKind::Sprite(SpriteKind::Tree) => ColourHint::Green,
            EntityKind::Sprite(_) => ColourHint::Grey,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub kind: EntityKind,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub colour: ColourHint,
}

impl EntityView {
    fn new(kind: EntityKind, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            kind,
            x,
            y,
            w,
            h,
            colour: kind.colour(),
        }
    }
}

/// Track attributes under the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackView {
    pub segment: usize,
    pub curvature: f32,
    pub hill: f32,
    pub width_mul: f32,
}

/// Everything the draw layer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSnapshot {
    pub road_tiles: Vec<RoadTile>,
    pub stripes: Vec<StripeColumn>,
    pub entities: Vec<EntityView>,
    pub track: TrackView,
    pub score: u64,
    pub high_score: u64,
    pub speed_percentage: f32,
    pub difficulty: DifficultyLevel,
    pub paused: bool,
    pub game_over: bool,
}

impl RenderSnapshot {
    pub fn player(&self) -> Option<&EntityView> {
        self.entities.iter().find(|e| e.kind == EntityKind::Player)
    }

    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &EntityView> {
        self.entities.iter().filter(move |e| e.kind == kind)
    }
}

impl Simulation {
    pub fn snapshot(&self) -> RenderSnapshot {
        let track = self.track();
        let segment = track.segment_at(self.world.distance);
        let seg_len = track.segment_length();

        let mut entities = Vec::with_capacity(1 + self.enemies.len() + self.orbs.len());
        let p = self.player.rect();
        entities.push(EntityView::new(
            EntityKind::Player,
            p.left(),
            p.top(),
            p.size.x,
            p.size.y,
        ));
        for enemy in &self.enemies {
            let r = enemy.rect();
            entities.push(EntityView::new(
                EntityKind::Enemy,
                r.left(),
                r.top(),
                r.size.x,
                r.size.y,
            ));
        }
        for orb in &self.orbs {
            let r = orb.rect();
            entities.push(EntityView::new(
                EntityKind::Orb,
                r.left(),
                r.top(),
                r.size.x,
                r.size.y,
            ));
        }

        // Roadside sprites on upcoming segments, placed by distance ahead of the player
        let into_segment = if seg_len > 0.0 {
            self.world.distance.max(0.0) % seg_len
        } else {
            0.0
        };
        for k in 0..SPRITE_LOOKAHEAD {
            let Some(RoadsideSprite { kind, side }) = track.sprite(segment + k) else {
                continue;
            };
            let ahead = k as f32 * seg_len - into_segment;
            let y = p.top() - ahead;
            if y + ROADSIDE_SPRITE_SIZE < 0.0 || y > SCREEN_HEIGHT {
                continue;
            }
            let x = if side.sign() < 0 {
                ROAD_LEFT - ROADSIDE_SPRITE_SIZE * 1.5
            } else {
                ROAD_RIGHT + ROADSIDE_SPRITE_SIZE * 0.5
            };
            entities.push(EntityView::new(
                EntityKind::Sprite(kind),
                x,
                y,
                ROADSIDE_SPRITE_SIZE,
                ROADSIDE_SPRITE_SIZE,
            ));
        }

        RenderSnapshot {
            road_tiles: self.road.tiles.clone(),
            stripes: self.road.stripes.clone(),
            entities,
            track: TrackView {
                segment,
                curvature: track.curvature(segment),
                hill: track.hill(segment),
                width_mul: track.width_mul(segment),
            },
            score: self.world.score,
            high_score: self.world.high_score,
            speed_percentage: self.controller.speed_percentage(),
            difficulty: self.controller.level(),
            paused: self.world.paused,
            game_over: self.world.game_over,
        }
    }
}
