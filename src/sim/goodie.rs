//! Collectibles ("goodies")
//!
//! A goodie sits on one grid cell and runs a one-way lifecycle:
//! `Idle -> Taken -> Dead`. Unlike hazards and sprites, a dead goodie stays
//! dead for the rest of the session; screen re-entry does not revive it.

use serde::{Deserialize, Serialize};

use super::geom::PixelRect;
use crate::grid_to_pixel;

/// Lifecycle of a collectible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoodieState {
    /// Two-frame alternating idle animation; collectable
    Idle,
    /// Fixed-length consumed animation
    Taken { ticks_left: u32 },
    /// Ceases rendering and collection permanently
    Dead,
}

/// A per-position collectible item
#[derive(Debug, Clone, PartialEq)]
pub struct Goodie {
    pub id: u32,
    /// Artwork selector, opaque to the simulation
    pub kind: u32,
    /// Screen the goodie sits on
    pub screen: i32,
    pub col: i32,
    pub row: i32,
    pub state: GoodieState,
}

impl Goodie {
    pub fn new(id: u32, kind: u32, screen: i32, col: i32, row: i32) -> Self {
        Self {
            id,
            kind,
            screen,
            col,
            row,
            state: GoodieState::Idle,
        }
    }

    /// Pixel box of the occupied grid cell
    pub fn cell_box(&self) -> PixelRect {
        PixelRect::new(
            grid_to_pixel(self.col),
            grid_to_pixel(self.row),
            crate::consts::TILE_SIZE,
            crate::consts::TILE_SIZE,
        )
    }

    #[inline]
    pub fn collectable(&self) -> bool {
        self.state == GoodieState::Idle
    }

    /// Avatar picked this goodie up; starts the consumed animation
    pub fn take(&mut self, taken_ticks: u32) {
        if self.state == GoodieState::Idle {
            self.state = GoodieState::Taken {
                ticks_left: taken_ticks.max(1),
            };
        }
    }

    /// Advance the consumed animation by one tick
    pub fn step(&mut self) {
        if let GoodieState::Taken { ticks_left } = self.state {
            if ticks_left <= 1 {
                self.state = GoodieState::Dead;
            } else {
                self.state = GoodieState::Taken {
                    ticks_left: ticks_left - 1,
                };
            }
        }
    }
}
