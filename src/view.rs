//! Read-only render snapshot
//!
//! The driver alternates `Game::tick` with `snapshot`; rendering never
//! touches simulation state. Everything here is plain serializable data so a
//! headless driver can also dump it for inspection.

use serde::Serialize;

use crate::sim::avatar::{AvatarState, Facing};
use crate::sim::goodie::GoodieState;
use crate::sim::tick::Game;
use crate::sim::tile::{HazardState, TileKind};

/// First sheet frame of a hazard's explosion sequence (after the two idle
/// frames)
const EXPLOSION_BASE_FRAME: u32 = 2;
/// First sheet frame of a goodie's consumed sequence
const CONSUMED_BASE_FRAME: u32 = 2;

#[derive(Debug, Clone, Serialize)]
pub struct AvatarView {
    pub x: f64,
    pub y: f64,
    pub facing: Facing,
    pub state: AvatarState,
    pub frame: u32,
    /// Death animation selector; meaningful while `state` is `Dying`
    pub death_anim: u8,
}

/// Which artwork family a visible tile renders with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileGlyph {
    Solid,
    Thru,
    Scenery,
    Hazard { spec: u16 },
    Conveyor { belt: u16 },
    Collapsible,
}

#[derive(Debug, Clone, Serialize)]
pub struct TileView {
    pub col: i32,
    pub row: i32,
    pub glyph: TileGlyph,
    pub frame: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpriteView {
    pub id: u32,
    pub sheet: String,
    pub x: f64,
    pub y: f64,
    /// Source clip rectangle within the sheet: (x, y, w, h) in pixels
    pub clip: (u32, u32, u32, u32),
}

#[derive(Debug, Clone, Serialize)]
pub struct GoodieView {
    pub id: u32,
    pub kind: u32,
    pub col: i32,
    pub row: i32,
    pub frame: u32,
}

/// Render-relevant state of the active screen at one instant
#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub screen_id: i32,
    pub background: u32,
    pub avatar: AvatarView,
    /// Visible tiles only; empty cells and dead hazards are omitted
    pub tiles: Vec<TileView>,
    pub sprites: Vec<SpriteView>,
    /// Goodies still on screen; dead ones are omitted
    pub goodies: Vec<GoodieView>,
}

/// Assemble the render state of the active screen
pub fn snapshot(game: &Game) -> RenderSnapshot {
    let screen = game.world.current_screen();
    let time = game.time_ticks();
    let tuning = &game.tuning;
    let idle_frame = ((time / tuning.idle_anim_period.max(1) as u64) % 2) as u32;

    let mut tiles = Vec::new();
    for (col, row, tile) in screen.cells() {
        let (glyph, frame) = match tile {
            TileKind::Empty => continue,
            TileKind::Solid => (TileGlyph::Solid, 0),
            TileKind::Thru => (TileGlyph::Thru, 0),
            TileKind::Scenery => (TileGlyph::Scenery, 0),
            TileKind::Hazard(h) => {
                let frame = match h.state {
                    HazardState::Idle => idle_frame,
                    HazardState::Exploding { ticks_left } => {
                        let total = tuning.hazard_explode_ticks.max(1);
                        let elapsed = total.saturating_sub(ticks_left);
                        EXPLOSION_BASE_FRAME + elapsed / tuning.walk_anim_period.max(1)
                    }
                    HazardState::Dead => continue,
                };
                (TileGlyph::Hazard { spec: h.spec }, frame)
            }
            TileKind::Conveyor(c) => (
                TileGlyph::Conveyor { belt: c.belt },
                c.rotation.belt_frame(time),
            ),
            TileKind::Collapsible(c) => (
                TileGlyph::Collapsible,
                c.decay_frame(tuning.collapse_threshold),
            ),
        };
        tiles.push(TileView {
            col,
            row,
            glyph,
            frame,
        });
    }

    let sprites = screen
        .sprites
        .iter()
        .map(|s| {
            let (w, h) = s.size();
            let (w, h) = (w as u32, h as u32);
            SpriteView {
                id: s.id,
                sheet: s.sheet.clone(),
                x: s.pos.x,
                y: s.pos.y,
                clip: (s.frame() * w, s.row() * h, w, h),
            }
        })
        .collect();

    let goodies = game
        .world
        .goodies_on(screen.id)
        .into_iter()
        .filter_map(|g| {
            let frame = match g.state {
                GoodieState::Idle => idle_frame,
                GoodieState::Taken { ticks_left } => {
                    let total = tuning.goodie_taken_ticks.max(1);
                    let elapsed = total.saturating_sub(ticks_left);
                    CONSUMED_BASE_FRAME + elapsed / tuning.walk_anim_period.max(1)
                }
                GoodieState::Dead => return None,
            };
            Some(GoodieView {
                id: g.id,
                kind: g.kind,
                col: g.col,
                row: g.row,
                frame,
            })
        })
        .collect();

    RenderSnapshot {
        screen_id: screen.id,
        background: screen.background,
        avatar: AvatarView {
            x: game.avatar.pos.x,
            y: game.avatar.pos.y,
            facing: game.avatar.facing,
            state: game.avatar.state(),
            frame: game.avatar.anim_frame(),
            death_anim: game.avatar.death_anim(),
        },
        tiles,
        sprites,
        goodies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::goodie::Goodie;
    use crate::sim::screen::Screen;
    use crate::sim::tick::TickInput;
    use crate::sim::tile::{HazardState, HazardTile};
    use crate::sim::world::World;
    use crate::tuning::Tuning;
    use glam::DVec2;

    fn game() -> Game {
        let mut screen = Screen::new(1000, 7, DVec2::new(100.0, 268.0));
        for col in 0..32 {
            screen.set_tile(col, 15, TileKind::Solid);
        }
        screen.set_tile(
            0,
            3,
            TileKind::Hazard(HazardTile {
                spec: 2,
                explodes: false,
                death_anim: 0,
                state: HazardState::Dead,
            }),
        );
        let world = World::new(
            vec![screen],
            vec![Goodie::new(9, 1, 1000, 4, 3)],
            1000,
        );
        Game::new(world, Tuning::default(), None)
    }

    #[test]
    fn test_snapshot_omits_empty_and_dead() {
        let game = game();
        let snap = snapshot(&game);
        assert_eq!(snap.screen_id, 1000);
        assert_eq!(snap.background, 7);
        // 32 floor tiles; the dead hazard and all empty cells are invisible
        assert_eq!(snap.tiles.len(), 32);
        assert!(snap.tiles.iter().all(|t| t.glyph == TileGlyph::Solid));
        assert_eq!(snap.goodies.len(), 1);
    }

    #[test]
    fn test_snapshot_tracks_avatar_and_serializes() {
        let mut game = game();
        game.tick(&TickInput {
            right: true,
            ..Default::default()
        });
        let snap = snapshot(&game);
        assert_eq!(snap.avatar.x, game.avatar.pos.x);
        assert_eq!(snap.avatar.state, AvatarState::Grounded);

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"screen_id\":1000"));
    }

    #[test]
    fn test_goodie_idle_frame_alternates() {
        let mut game = game();
        let period = game.tuning.idle_anim_period as usize;
        let f0 = snapshot(&game).goodies[0].frame;
        for _ in 0..period {
            game.tick(&TickInput::default());
        }
        let f1 = snapshot(&game).goodies[0].frame;
        assert_ne!(f0, f1);
    }
}
