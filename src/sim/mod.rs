//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Clamped frame deltas only
//! - Seeded RNG owned by the world
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod snapshot;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::Rect;
pub use snapshot::{ColourHint, EntityKind, EntityView, RenderSnapshot, TrackView};
pub use state::{
    Enemy, GameEvent, Orb, Player, Road, RoadTile, Simulation, StripeColumn, World,
};
pub use tick::{TickInput, frame_dt, tick};
