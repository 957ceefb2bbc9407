//! Axis-aligned pixel rectangles
//!
//! Positions and velocities are `glam::DVec2` throughout the simulation;
//! bounding boxes and regions are `PixelRect`. Grid addressing always goes
//! through the floored integer view (`crate::grid_point`), never rounding.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// An axis-aligned rectangle in pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl PixelRect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// The fixed playable area of one screen
    pub fn playable_area() -> Self {
        Self::new(0.0, 0.0, SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    /// Strict-overlap AABB test; touching edges do not intersect
    #[inline]
    pub fn intersects(&self, other: &PixelRect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// Whether `other` lies entirely inside this rectangle
    pub fn contains(&self, other: &PixelRect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    pub fn contains_point(&self, p: DVec2) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }
}
