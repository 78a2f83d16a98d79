//! Axis-aligned rectangle collision
//!
//! Every body on the playfield is an axis-aligned box, so a single strict
//! overlap test covers player/bomb and player/token contact.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// True when the rectangles overlap on both axes. Touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Indices of the rects in `others` overlapping `target`, ascending
pub fn overlapping_indices<I>(target: &Rect, others: I) -> Vec<usize>
where
    I: IntoIterator<Item = Rect>,
{
    others
        .into_iter()
        .enumerate()
        .filter(|(_, r)| target.intersects(r))
        .map(|(i, _)| i)
        .collect()
}
