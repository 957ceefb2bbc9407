//! Caverun - a screen-based tile platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (avatar physics, tiles, sprites, goodies)
//! - `worlddef`: World definition data and construction-time validation
//! - `view`: Read-only render snapshot for an external renderer
//! - `tuning`: Data-driven movement and animation constants

pub mod sim;
pub mod tuning;
pub mod view;
pub mod worlddef;

pub use tuning::Tuning;

use glam::{DVec2, IVec2};

/// Structural constants of the world grid
pub mod consts {
    /// Edge length of one square tile cell, in pixels
    pub const TILE_SIZE: f64 = 20.0;

    /// Tile columns per screen
    pub const SCREEN_COLS: i32 = 32;
    /// Tile rows per screen
    pub const SCREEN_ROWS: i32 = 20;

    /// Playable area width in pixels (32 columns of 20px)
    pub const SCREEN_WIDTH: f64 = SCREEN_COLS as f64 * TILE_SIZE;
    /// Playable area height in pixels (20 rows of 20px)
    pub const SCREEN_HEIGHT: f64 = SCREEN_ROWS as f64 * TILE_SIZE;

    /// Screen-id stride for one screen of horizontal travel
    pub const SCREEN_STRIDE_X: i32 = 1;
    /// Screen-id stride for one screen of vertical travel
    pub const SCREEN_STRIDE_Y: i32 = 100;

    /// Avatar bounding box, in pixels
    pub const AVATAR_WIDTH: f64 = 16.0;
    pub const AVATAR_HEIGHT: f64 = 32.0;

    /// Sprite-sheet key the avatar's frames are registered under
    pub const AVATAR_SHEET: &str = "avatar";
}

/// Truncate one pixel coordinate to its grid cell index (floor, never round)
#[inline]
pub fn pixel_to_grid(v: f64) -> i32 {
    (v / consts::TILE_SIZE).floor() as i32
}

/// Pixel coordinate of a grid cell's top-left corner
#[inline]
pub fn grid_to_pixel(cell: i32) -> f64 {
    cell as f64 * consts::TILE_SIZE
}

/// Integer grid view of a sub-pixel position
#[inline]
pub fn grid_point(pos: DVec2) -> IVec2 {
    IVec2::new(pixel_to_grid(pos.x), pixel_to_grid(pos.y))
}
