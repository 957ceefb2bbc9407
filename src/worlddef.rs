//! World definition data and construction-time validation
//!
//! A world arrives fully formed from an external loader as plain serde data:
//! screens with sparse tile placements, sprite and goodie definitions, and
//! the static hazard/conveyor catalogs tiles reference by index. `build`
//! validates referential integrity exactly once; after it succeeds the
//! simulation assumes a sound world and never re-checks during ticking.
//!
//! Unset cells are simply absent from a screen's placement list and come out
//! as `TileKind::Empty`.

use std::collections::{HashMap, HashSet};

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::geom::PixelRect;
use crate::sim::goodie::Goodie;
use crate::sim::pixels::GraphicsCatalog;
use crate::sim::screen::Screen;
use crate::sim::sprite::{AnimMode, Animation, Sprite};
use crate::sim::tile::{
    CollapsibleTile, ConveyorTile, HazardState, HazardTile, Rotation, TileKind,
};
use crate::sim::world::World;
use crate::tuning::Tuning;

/// Catalog entry describing one hazard type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardSpec {
    /// Whether contact destroys the hazard
    #[serde(default)]
    pub explodes: bool,
    /// Death animation the avatar plays when killed by this hazard
    #[serde(default)]
    pub death_anim: u8,
}

/// Catalog entry describing one conveyor belt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConveyorSpec {
    pub rotation: Rotation,
}

/// One tile as placed by the editor/loader
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileDef {
    Solid,
    Thru,
    Scenery,
    Hazard { spec: usize },
    Conveyor { belt: usize },
    Collapsible,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TilePlacement {
    pub col: i32,
    pub row: i32,
    pub tile: TileDef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenDef {
    pub id: i32,
    /// Background artwork reference, opaque to the simulation
    #[serde(default)]
    pub background: u32,
    /// Canonical avatar spawn, top-left of its box
    pub spawn: (f64, f64),
    #[serde(default)]
    pub tiles: Vec<TilePlacement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteDef {
    pub id: u32,
    pub screen: i32,
    /// Sprite-sheet key in the graphics catalog
    pub sheet: String,
    pub start: (f64, f64),
    pub width: f64,
    pub height: f64,
    /// Region the sprite must stay within: (x, y, w, h)
    pub bounds: (f64, f64, f64, f64),
    pub velocity: (f64, f64),
    #[serde(default)]
    pub anim: AnimMode,
    pub frames: u32,
    pub ticks_per_frame: u32,
    /// Facing flag used when no graphics catalog is supplied; with a
    /// catalog, the sheet's row count decides
    #[serde(default)]
    pub two_directional: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoodieDef {
    pub id: u32,
    #[serde(default)]
    pub kind: u32,
    pub screen: i32,
    pub col: i32,
    pub row: i32,
}

/// A complete world definition, ready to validate into a `World`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldDef {
    pub start_screen: i32,
    #[serde(default)]
    pub tuning: Tuning,
    #[serde(default)]
    pub hazards: Vec<HazardSpec>,
    #[serde(default)]
    pub conveyors: Vec<ConveyorSpec>,
    pub screens: Vec<ScreenDef>,
    #[serde(default)]
    pub sprites: Vec<SpriteDef>,
    #[serde(default)]
    pub goodies: Vec<GoodieDef>,
}

/// Referential failures surfaced while building a world
#[derive(Debug, Error)]
pub enum WorldBuildError {
    #[error("duplicate screen id {id}")]
    DuplicateScreen { id: i32 },
    #[error("screen {screen}: tile at ({col},{row}) is outside the grid")]
    TileOutOfRange { screen: i32, col: i32, row: i32 },
    #[error("screen {screen}: tile at ({col},{row}) references missing hazard spec {index}")]
    UnknownHazardSpec {
        screen: i32,
        col: i32,
        row: i32,
        index: usize,
    },
    #[error("screen {screen}: tile at ({col},{row}) references missing conveyor {index}")]
    UnknownConveyor {
        screen: i32,
        col: i32,
        row: i32,
        index: usize,
    },
    #[error("sprite {id} references missing screen {screen}")]
    SpriteScreenMissing { id: u32, screen: i32 },
    #[error("sprite {id}: bounding region cannot contain the sprite at its start position")]
    SpriteBoundsInvalid { id: u32 },
    #[error("sprite {id}: animation needs at least one frame and a non-zero cadence")]
    SpriteAnimationInvalid { id: u32 },
    #[error("sprite {id} references sheet {sheet:?} missing from the graphics catalog")]
    SpriteSheetMissing { id: u32, sheet: String },
    #[error("goodie {id} references missing screen {screen}")]
    GoodieScreenMissing { id: u32, screen: i32 },
    #[error("goodie {id}: cell ({col},{row}) is outside the grid")]
    GoodieOutOfRange { id: u32, col: i32, row: i32 },
    #[error("two goodies share screen {screen} cell ({col},{row})")]
    DuplicateGoodie { screen: i32, col: i32, row: i32 },
    #[error("start screen {id} does not exist")]
    StartScreenMissing { id: i32 },
}

impl WorldDef {
    /// Validate this definition into a live `World`.
    ///
    /// With a graphics catalog, each sprite's facing behavior comes from its
    /// sheet's row count and a missing sheet is an error; without one, the
    /// def's `two_directional` flag stands in.
    pub fn build(&self, graphics: Option<&GraphicsCatalog>) -> Result<World, WorldBuildError> {
        let mut screens: HashMap<i32, Screen> = HashMap::new();

        for def in &self.screens {
            if screens.contains_key(&def.id) {
                return Err(WorldBuildError::DuplicateScreen { id: def.id });
            }
            let mut screen = Screen::new(def.id, def.background, DVec2::from(def.spawn));
            for placement in &def.tiles {
                let (col, row) = (placement.col, placement.row);
                if !Screen::in_range(col, row) {
                    return Err(WorldBuildError::TileOutOfRange {
                        screen: def.id,
                        col,
                        row,
                    });
                }
                screen.set_tile(col, row, self.resolve_tile(def.id, placement)?);
            }
            screens.insert(def.id, screen);
        }

        if !screens.contains_key(&self.start_screen) {
            return Err(WorldBuildError::StartScreenMissing {
                id: self.start_screen,
            });
        }

        for def in &self.sprites {
            if def.frames == 0 || def.ticks_per_frame == 0 {
                return Err(WorldBuildError::SpriteAnimationInvalid { id: def.id });
            }
            let bounds = PixelRect::new(def.bounds.0, def.bounds.1, def.bounds.2, def.bounds.3);
            let start_box = PixelRect::new(def.start.0, def.start.1, def.width, def.height);
            if !bounds.contains(&start_box) {
                return Err(WorldBuildError::SpriteBoundsInvalid { id: def.id });
            }

            let two_directional = match graphics {
                Some(catalog) => catalog
                    .sheet(&def.sheet)
                    .ok_or_else(|| WorldBuildError::SpriteSheetMissing {
                        id: def.id,
                        sheet: def.sheet.clone(),
                    })?
                    .two_directional(),
                None => def.two_directional,
            };

            let screen =
                screens
                    .get_mut(&def.screen)
                    .ok_or(WorldBuildError::SpriteScreenMissing {
                        id: def.id,
                        screen: def.screen,
                    })?;
            screen.sprites.push(Sprite::new(
                def.id,
                def.sheet.clone(),
                DVec2::from(def.start),
                DVec2::from(def.velocity),
                def.width,
                def.height,
                bounds,
                Animation::new(def.anim, def.frames, def.ticks_per_frame),
                two_directional,
            ));
        }

        let mut goodies = Vec::with_capacity(self.goodies.len());
        let mut occupied: HashSet<(i32, i32, i32)> = HashSet::new();
        for def in &self.goodies {
            if !screens.contains_key(&def.screen) {
                return Err(WorldBuildError::GoodieScreenMissing {
                    id: def.id,
                    screen: def.screen,
                });
            }
            if !Screen::in_range(def.col, def.row) {
                return Err(WorldBuildError::GoodieOutOfRange {
                    id: def.id,
                    col: def.col,
                    row: def.row,
                });
            }
            if !occupied.insert((def.screen, def.col, def.row)) {
                return Err(WorldBuildError::DuplicateGoodie {
                    screen: def.screen,
                    col: def.col,
                    row: def.row,
                });
            }
            goodies.push(Goodie::new(def.id, def.kind, def.screen, def.col, def.row));
        }

        log::info!(
            "world built: {} screens, {} sprites, {} goodies, start {}",
            screens.len(),
            self.sprites.len(),
            goodies.len(),
            self.start_screen
        );
        Ok(World::new(
            screens.into_values().collect(),
            goodies,
            self.start_screen,
        ))
    }

    fn resolve_tile(
        &self,
        screen: i32,
        placement: &TilePlacement,
    ) -> Result<TileKind, WorldBuildError> {
        let (col, row) = (placement.col, placement.row);
        Ok(match placement.tile {
            TileDef::Solid => TileKind::Solid,
            TileDef::Thru => TileKind::Thru,
            TileDef::Scenery => TileKind::Scenery,
            TileDef::Collapsible => TileKind::Collapsible(CollapsibleTile::default()),
            TileDef::Hazard { spec } => {
                let entry = self.hazards.get(spec).ok_or(
                    WorldBuildError::UnknownHazardSpec {
                        screen,
                        col,
                        row,
                        index: spec,
                    },
                )?;
                TileKind::Hazard(HazardTile {
                    spec: spec as u16,
                    explodes: entry.explodes,
                    death_anim: entry.death_anim,
                    state: HazardState::Idle,
                })
            }
            TileDef::Conveyor { belt } => {
                let entry =
                    self.conveyors
                        .get(belt)
                        .ok_or(WorldBuildError::UnknownConveyor {
                            screen,
                            col,
                            row,
                            index: belt,
                        })?;
                TileKind::Conveyor(ConveyorTile {
                    belt: belt as u16,
                    rotation: entry.rotation,
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::pixels::{FrameMask, SheetInfo};

    fn minimal_def() -> WorldDef {
        WorldDef {
            start_screen: 1000,
            tuning: Tuning::default(),
            hazards: vec![HazardSpec {
                explodes: true,
                death_anim: 1,
            }],
            conveyors: vec![ConveyorSpec {
                rotation: Rotation::Clockwise,
            }],
            screens: vec![ScreenDef {
                id: 1000,
                background: 2,
                spawn: (100.0, 268.0),
                tiles: vec![
                    TilePlacement {
                        col: 0,
                        row: 15,
                        tile: TileDef::Solid,
                    },
                    TilePlacement {
                        col: 1,
                        row: 15,
                        tile: TileDef::Hazard { spec: 0 },
                    },
                    TilePlacement {
                        col: 2,
                        row: 15,
                        tile: TileDef::Conveyor { belt: 0 },
                    },
                ],
            }],
            sprites: vec![SpriteDef {
                id: 1,
                screen: 1000,
                sheet: "walker".into(),
                start: (200.0, 200.0),
                width: 16.0,
                height: 16.0,
                bounds: (180.0, 200.0, 100.0, 16.0),
                velocity: (1.0, 0.0),
                anim: AnimMode::Cycling,
                frames: 4,
                ticks_per_frame: 3,
                two_directional: true,
            }],
            goodies: vec![GoodieDef {
                id: 1,
                kind: 0,
                screen: 1000,
                col: 4,
                row: 3,
            }],
        }
    }

    #[test]
    fn test_build_resolves_catalog_references() {
        let world = minimal_def().build(None).unwrap();
        let screen = world.screen(1000).unwrap();
        assert!(matches!(
            screen.tile_at_grid(1, 15),
            TileKind::Hazard(h) if h.explodes && h.death_anim == 1
        ));
        assert!(matches!(
            screen.tile_at_grid(2, 15),
            TileKind::Conveyor(c) if c.rotation == Rotation::Clockwise
        ));
        assert_eq!(screen.sprites.len(), 1);
        assert!(world.goodie_at(1000, 4, 3).is_some());
    }

    #[test]
    fn test_unknown_hazard_spec_fails() {
        let mut def = minimal_def();
        def.screens[0].tiles.push(TilePlacement {
            col: 3,
            row: 15,
            tile: TileDef::Hazard { spec: 9 },
        });
        assert!(matches!(
            def.build(None),
            Err(WorldBuildError::UnknownHazardSpec { index: 9, .. })
        ));
    }

    #[test]
    fn test_unknown_conveyor_fails() {
        let mut def = minimal_def();
        def.screens[0].tiles.push(TilePlacement {
            col: 3,
            row: 15,
            tile: TileDef::Conveyor { belt: 2 },
        });
        assert!(matches!(
            def.build(None),
            Err(WorldBuildError::UnknownConveyor { index: 2, .. })
        ));
    }

    #[test]
    fn test_tile_out_of_range_fails() {
        let mut def = minimal_def();
        def.screens[0].tiles.push(TilePlacement {
            col: 32,
            row: 0,
            tile: TileDef::Solid,
        });
        assert!(matches!(
            def.build(None),
            Err(WorldBuildError::TileOutOfRange { col: 32, .. })
        ));
    }

    #[test]
    fn test_sprite_on_missing_screen_fails() {
        let mut def = minimal_def();
        def.sprites[0].screen = 1001;
        assert!(matches!(
            def.build(None),
            Err(WorldBuildError::SpriteScreenMissing { screen: 1001, .. })
        ));
    }

    #[test]
    fn test_sprite_without_containing_bounds_fails() {
        let mut def = minimal_def();
        def.sprites[0].bounds = (0.0, 0.0, 8.0, 8.0);
        assert!(matches!(
            def.build(None),
            Err(WorldBuildError::SpriteBoundsInvalid { id: 1 })
        ));
    }

    #[test]
    fn test_duplicate_goodie_cell_fails() {
        let mut def = minimal_def();
        def.goodies.push(GoodieDef {
            id: 2,
            kind: 1,
            screen: 1000,
            col: 4,
            row: 3,
        });
        assert!(matches!(
            def.build(None),
            Err(WorldBuildError::DuplicateGoodie { col: 4, row: 3, .. })
        ));
    }

    #[test]
    fn test_missing_start_screen_fails() {
        let mut def = minimal_def();
        def.start_screen = 42;
        assert!(matches!(
            def.build(None),
            Err(WorldBuildError::StartScreenMissing { id: 42 })
        ));
    }

    #[test]
    fn test_catalog_decides_facing_and_missing_sheet_fails() {
        let def = minimal_def();

        let mut catalog = GraphicsCatalog::new();
        catalog.insert(
            "walker",
            SheetInfo::new(16, 16, 4, 1, vec![FrameMask::filled(16, 16); 4]),
        );
        // One facing row in the sheet overrides the def's flag
        let world = def.build(Some(&catalog)).unwrap();
        assert_eq!(world.screen(1000).unwrap().sprites.len(), 1);

        let empty = GraphicsCatalog::new();
        assert!(matches!(
            def.build(Some(&empty)),
            Err(WorldBuildError::SpriteSheetMissing { id: 1, .. })
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let def = minimal_def();
        let json = serde_json::to_string_pretty(&def).unwrap();
        let back: WorldDef = serde_json::from_str(&json).unwrap();
        assert_eq!(back.screens[0].tiles[1].tile, TileDef::Hazard { spec: 0 });
        assert_eq!(back.start_screen, def.start_screen);
    }
}
