//! Axis-aligned rectangle collision
//!
//! Sprites may be drawn tilted, but collision always uses the unrotated box.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, `pos` is the top-left corner (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Square box around a circle
    pub fn around_circle(center: Vec2, radius: f32) -> Self {
        Self {
            pos: center - Vec2::splat(radius),
            size: Vec2::splat(radius * 2.0),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Overlap test; touching edges do not count
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Smallest box covering both `self` and `other`
    pub fn union(&self, other: &Rect) -> Rect {
        let min = self.pos.min(other.pos);
        let max = (self.pos + self.size).max(other.pos + other.size);
        Rect {
            pos: min,
            size: max - min,
        }
    }

    /// Horizontal distance between the boxes (0 when they overlap on x)
    pub fn horizontal_gap(&self, other: &Rect) -> f32 {
        (other.left() - self.right())
            .max(self.left() - other.right())
            .max(0.0)
    }
}
