//! One screen: a fixed 32x20 tile grid plus its residents
//!
//! Out-of-range tile queries are defined to be harmless and return `Empty`;
//! boundary probes routinely sample one unit past the grid edge.

use glam::DVec2;

use super::sprite::Sprite;
use super::tile::TileKind;
use crate::consts::{SCREEN_COLS, SCREEN_ROWS};
use crate::pixel_to_grid;

/// One room of the world
#[derive(Debug, Clone)]
pub struct Screen {
    pub id: i32,
    /// Row-major grid; every cell always holds a value
    tiles: Vec<TileKind>,
    pub sprites: Vec<Sprite>,
    /// Background artwork reference, opaque to the simulation
    pub background: u32,
    /// Canonical avatar start, immutable for the screen's lifetime
    spawn: DVec2,
    /// Where the avatar respawns after dying here; moves to the entry
    /// position each time the avatar walks in from a neighbor
    entry: DVec2,
}

impl Screen {
    pub fn new(id: i32, background: u32, spawn: DVec2) -> Self {
        Self {
            id,
            tiles: vec![TileKind::Empty; (SCREEN_COLS * SCREEN_ROWS) as usize],
            sprites: Vec::new(),
            background,
            spawn,
            entry: spawn,
        }
    }

    #[inline]
    fn index(col: i32, row: i32) -> usize {
        (row * SCREEN_COLS + col) as usize
    }

    #[inline]
    pub fn in_range(col: i32, row: i32) -> bool {
        (0..SCREEN_COLS).contains(&col) && (0..SCREEN_ROWS).contains(&row)
    }

    /// Place a tile. In-range is a construction invariant; violating it is a
    /// bug in the caller, not a runtime condition.
    pub fn set_tile(&mut self, col: i32, row: i32, tile: TileKind) {
        assert!(
            Self::in_range(col, row),
            "tile ({col},{row}) outside the {SCREEN_COLS}x{SCREEN_ROWS} grid"
        );
        self.tiles[Self::index(col, row)] = tile;
    }

    /// Tile at a grid cell; `Empty` for any out-of-range coordinate
    pub fn tile_at_grid(&self, col: i32, row: i32) -> TileKind {
        if Self::in_range(col, row) {
            self.tiles[Self::index(col, row)]
        } else {
            TileKind::Empty
        }
    }

    /// Tile under a pixel coordinate; `Empty` outside the playable area
    pub fn tile_at(&self, x: f64, y: f64) -> TileKind {
        self.tile_at_grid(pixel_to_grid(x), pixel_to_grid(y))
    }

    pub fn tile_at_grid_mut(&mut self, col: i32, row: i32) -> Option<&mut TileKind> {
        if Self::in_range(col, row) {
            Some(&mut self.tiles[Self::index(col, row)])
        } else {
            None
        }
    }

    #[inline]
    pub fn spawn(&self) -> DVec2 {
        self.spawn
    }

    #[inline]
    pub fn entry(&self) -> DVec2 {
        self.entry
    }

    pub fn set_entry(&mut self, point: DVec2) {
        self.entry = point;
    }

    /// Full reset on leaving the screen: sprites back to their spawn state,
    /// hazards revive, collapsible tiles knit together, the re-entry point
    /// returns to the canonical spawn.
    pub fn reset_residents(&mut self) {
        for sprite in &mut self.sprites {
            sprite.reset();
        }
        for tile in &mut self.tiles {
            tile.reset();
        }
        self.entry = self.spawn;
    }

    /// Sprite-only reset, used when the avatar dies on this screen.
    /// Dead hazards stay dead until the screen is actually re-entered.
    pub fn reset_sprites(&mut self) {
        for sprite in &mut self.sprites {
            sprite.reset();
        }
    }

    /// Advance per-tile state machines by one tick (explosion countdowns)
    pub fn advance_tiles(&mut self) {
        for tile in &mut self.tiles {
            if let TileKind::Hazard(h) = tile {
                h.advance();
            }
        }
    }

    /// Advance resident sprite motion and animation by one tick
    pub fn step_sprites(&mut self) {
        for sprite in &mut self.sprites {
            sprite.step();
        }
    }

    /// Iterate cells in row-major order with their coordinates
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, &TileKind)> {
        self.tiles.iter().enumerate().map(|(i, t)| {
            let i = i as i32;
            (i % SCREEN_COLS, i / SCREEN_COLS, t)
        })
    }
}
