//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed tick only; every timed behavior is tick-counted state
//! - Stable iteration order (by entity id / grid order)
//! - No rendering or platform dependencies

pub mod avatar;
pub mod geom;
pub mod goodie;
pub mod pixels;
pub mod screen;
pub mod sprite;
pub mod tick;
pub mod tile;
pub mod world;

pub use avatar::{Avatar, AvatarState, Facing};
pub use geom::PixelRect;
pub use goodie::{Goodie, GoodieState};
pub use pixels::{FrameMask, GraphicsCatalog, SheetInfo};
pub use screen::Screen;
pub use sprite::{AnimMode, Animation, Sprite};
pub use tick::{Game, TickInput};
pub use tile::{HazardState, Rotation, TileKind};
pub use world::{ExitDirection, World};
