//! Immutable track description
//!
//! Four parallel per-segment arrays (curvature, hills, width multiplier,
//! roadside sprite) plus the list of sections that produced them.

use serde::{Deserialize, Serialize};

/// Decorative roadside sprite types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteKind {
    Tree,
    Billboard,
    Rock,
    Building,
}

impl SpriteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpriteKind::Tree => "tree",
            SpriteKind::Billboard => "billboard",
            SpriteKind::Rock => "rock",
            SpriteKind::Building => "building",
        }
    }
}

/// Which side of the road a sprite stands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// -1 for left, +1 for right
    pub fn sign(&self) -> i8 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }
}

/// A sprite placed next to one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoadsideSprite {
    pub kind: SpriteKind,
    pub side: Side,
}

/// Section templates the generator composes a track from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    Straight,
    Curves,
    Hills,
    Narrow,
    Wide,
    Mixed,
    ExtremeCurves,
    ExtremeHills,
    Alternating,
}

impl SectionKind {
    /// Sections only available when extreme sections are enabled
    pub fn is_extreme(&self) -> bool {
        matches!(
            self,
            SectionKind::ExtremeCurves | SectionKind::ExtremeHills | SectionKind::Alternating
        )
    }
}

/// A contiguous run of segments emitted by one template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub kind: SectionKind,
    pub start: usize,
    pub len: usize,
}

/// Generated track (immutable once built)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    curvature: Vec<f32>,
    hills: Vec<f32>,
    width_mul: Vec<f32>,
    sprites: Vec<Option<RoadsideSprite>>,
    sections: Vec<Section>,
    segment_length: f32,
}

impl Track {
    /// Assemble a track from its parallel arrays.
    ///
    /// Panics if the arrays differ in length or are empty; the generator is
    /// the only producer and always emits matching arrays.
    pub(crate) fn from_parts(
        curvature: Vec<f32>,
        hills: Vec<f32>,
        width_mul: Vec<f32>,
        sprites: Vec<Option<RoadsideSprite>>,
        sections: Vec<Section>,
        segment_length: f32,
    ) -> Self {
        let n = curvature.len();
        assert!(n > 0, "track must have at least one segment");
        assert!(
            hills.len() == n && width_mul.len() == n && sprites.len() == n,
            "track arrays must be equal length"
        );
        Self {
            curvature,
            hills,
            width_mul,
            sprites,
            sections,
            segment_length,
        }
    }

    /// A flat, featureless track of `len` segments
    pub fn flat(len: usize, segment_length: f32) -> Self {
        let len = len.max(1);
        Self::from_parts(
            vec![0.0; len],
            vec![0.0; len],
            vec![1.0; len],
            vec![None; len],
            vec![Section {
                kind: SectionKind::Straight,
                start: 0,
                len,
            }],
            segment_length,
        )
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.curvature.len()
    }

    /// Tracks always hold at least one segment
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    fn wrap(&self, i: usize) -> usize {
        i % self.len()
    }

    pub fn curvature(&self, i: usize) -> f32 {
        self.curvature[self.wrap(i)]
    }

    pub fn hill(&self, i: usize) -> f32 {
        self.hills[self.wrap(i)]
    }

    pub fn width_mul(&self, i: usize) -> f32 {
        self.width_mul[self.wrap(i)]
    }

    pub fn sprite(&self, i: usize) -> Option<RoadsideSprite> {
        self.sprites[self.wrap(i)]
    }

    pub fn curvatures(&self) -> &[f32] {
        &self.curvature
    }

    pub fn hills(&self) -> &[f32] {
        &self.hills
    }

    pub fn width_muls(&self) -> &[f32] {
        &self.width_mul
    }

    pub fn sprites(&self) -> &[Option<RoadsideSprite>] {
        &self.sprites
    }

    /// Sections in emission order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Distance covered by one segment
    pub fn segment_length(&self) -> f32 {
        self.segment_length
    }

    /// Segment index under a travelled distance (wraps past the end)
    pub fn segment_at(&self, distance: f32) -> usize {
        if distance <= 0.0 || self.segment_length <= 0.0 {
            return 0;
        }
        self.wrap((distance / self.segment_length) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_track() {
        let track = Track::flat(10, 100.0);
        assert_eq!(track.len(), 10);
        assert!(track.curvatures().iter().all(|&c| c == 0.0));
        assert!(track.width_muls().iter().all(|&w| w == 1.0));
        assert_eq!(track.sections().len(), 1);
    }

    #[test]
    fn test_index_wraps() {
        let mut curvature = vec![0.0; 4];
        curvature[1] = 0.5;
        let track = Track::from_parts(
            curvature,
            vec![0.0; 4],
            vec![1.0; 4],
            vec![None; 4],
            Vec::new(),
            10.0,
        );
        assert_eq!(track.curvature(5), 0.5);
        assert_eq!(track.curvature(1), track.curvature(9));
    }

    #[test]
    fn test_segment_at_distance() {
        let track = Track::flat(4, 100.0);
        assert_eq!(track.segment_at(-5.0), 0);
        assert_eq!(track.segment_at(99.0), 0);
        assert_eq!(track.segment_at(100.0), 1);
        assert_eq!(track.segment_at(450.0), 0);
    }

    #[test]
    #[should_panic]
    fn test_mismatched_arrays_rejected() {
        Track::from_parts(
            vec![0.0; 3],
            vec![0.0; 2],
            vec![1.0; 3],
            vec![None; 3],
            Vec::new(),
            1.0,
        );
    }

    #[test]
    fn test_side_sign() {
        assert_eq!(Side::Left.sign(), -1);
        assert_eq!(Side::Right.sign(), 1);
    }
}
