//! Procedural track module
//!
//! A track is generated once per run and never mutated afterwards. The
//! generator is deterministic for a fixed seed and parameter set.

pub mod generator;
pub mod model;

pub use generator::{GenerationParams, GeneratorConfig, Theme, TrackGenerator};
pub use model::{RoadsideSprite, Section, SectionKind, Side, SpriteKind, Track};
