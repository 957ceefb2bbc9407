//! Tile variants and their state machines
//!
//! A screen's grid is a flat array of `TileKind` values; every cell always
//! holds exactly one variant (`Empty` for vacant cells, never an absent
//! slot). Collision code dispatches on the variant with pattern matching.

use serde::{Deserialize, Serialize};

/// Rotation sense of a conveyor belt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    Clockwise,
    AntiClockwise,
}

impl Rotation {
    /// Sign of the horizontal push applied to anything resting on the belt
    #[inline]
    pub fn push_sign(self) -> f64 {
        match self {
            Rotation::Clockwise => 1.0,
            Rotation::AntiClockwise => -1.0,
        }
    }

    /// Which of the 5 belt frames shows at a given simulation tick.
    /// The cycle runs backwards for an anti-clockwise belt.
    pub fn belt_frame(self, time_ticks: u64) -> u32 {
        let step = (time_ticks % 5) as u32;
        match self {
            Rotation::Clockwise => step,
            Rotation::AntiClockwise => (5 - step) % 5,
        }
    }
}

/// Lifecycle of a hazard tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardState {
    /// Alternating two-frame idle animation; lethal
    Idle,
    /// Fixed-length explosion animation; still lethal
    Exploding { ticks_left: u32 },
    /// No longer collides or renders, until the screen is re-entered
    Dead,
}

/// A hazard tile: kills the avatar on contact, may blow itself up doing so
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardTile {
    /// Index into the world's hazard catalog (selects the artwork)
    pub spec: u16,
    /// Whether contact destroys the hazard
    pub explodes: bool,
    /// Which death animation the avatar plays when killed by this hazard
    pub death_anim: u8,
    pub state: HazardState,
}

impl HazardTile {
    /// Avatar contact. An exploding hazard starts its explosion animation;
    /// a non-exploding one just stays put.
    pub fn strike(&mut self, explode_ticks: u32) {
        if self.explodes && self.state == HazardState::Idle {
            self.state = HazardState::Exploding {
                ticks_left: explode_ticks,
            };
        }
    }

    /// Advance the explosion countdown by one tick
    pub fn advance(&mut self) {
        if let HazardState::Exploding { ticks_left } = self.state {
            if ticks_left <= 1 {
                self.state = HazardState::Dead;
            } else {
                self.state = HazardState::Exploding {
                    ticks_left: ticks_left - 1,
                };
            }
        }
    }
}

/// A conveyor tile: passable, but drags anything resting on it sideways
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConveyorTile {
    /// Index into the world's conveyor catalog (belt identity)
    pub belt: u16,
    pub rotation: Rotation,
}

/// A collapsible tile: degrades under the avatar's feet
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollapsibleTile {
    /// Ticks of sustained contact endured so far
    pub damage: u32,
    pub collapsed: bool,
}

impl CollapsibleTile {
    /// One tick of avatar contact
    pub fn wear(&mut self, threshold: u32) {
        if !self.collapsed {
            self.damage += 1;
            if self.damage >= threshold {
                self.collapsed = true;
            }
        }
    }

    /// Which of the 10 decay frames shows for the current damage
    pub fn decay_frame(&self, threshold: u32) -> u32 {
        if self.collapsed {
            9
        } else {
            (self.damage * 10 / threshold.max(1)).min(9)
        }
    }
}

/// How a tile holds the avatar up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    /// Never supports
    None,
    /// Supports from above only; passable from below and the side
    Platform,
    /// Supports and blocks from every side
    Block,
}

/// One cell of a screen's tile grid
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TileKind {
    /// No collision, no rendering
    #[default]
    Empty,
    /// Blocks motion from all sides
    Solid,
    /// Platform: blocks only from above
    Thru,
    /// Renders but never collides
    Scenery,
    Hazard(HazardTile),
    Conveyor(ConveyorTile),
    Collapsible(CollapsibleTile),
}

impl TileKind {
    /// Ground-support behavior of this tile
    pub fn support(&self) -> Support {
        match self {
            TileKind::Solid => Support::Block,
            TileKind::Thru | TileKind::Conveyor(_) => Support::Platform,
            TileKind::Collapsible(c) if !c.collapsed => Support::Platform,
            _ => Support::None,
        }
    }

    /// Whether this tile rejects horizontal movement into it
    #[inline]
    pub fn blocks_side(&self) -> bool {
        matches!(self, TileKind::Solid)
    }

    /// Whether touching this tile kills the avatar
    pub fn is_lethal(&self) -> bool {
        matches!(
            self,
            TileKind::Hazard(h) if h.state != HazardState::Dead
        )
    }

    /// Screen re-entry: hazards revive, collapsible tiles knit back together
    pub fn reset(&mut self) {
        match self {
            TileKind::Hazard(h) => h.state = HazardState::Idle,
            TileKind::Collapsible(c) => *c = CollapsibleTile::default(),
            _ => {}
        }
    }
}
