//! Fixed-tick session
//!
//! `Game` owns the world, the avatar and the tuning, and advances everything
//! by one discrete step per `tick` call. One tick runs in a fixed order:
//! input -> avatar velocity -> avatar integration -> contact and transition
//! checks -> tile and sprite animation. The driver alternates `tick` with
//! rendering a `view::RenderSnapshot`; the simulation never paints.

use super::avatar::{Avatar, AvatarState, Facing};
use super::geom::PixelRect;
use super::pixels::{GraphicsCatalog, masks_overlap};
use super::tile::{HazardState, TileKind};
use super::world::{ExitDirection, World};
use crate::consts::{AVATAR_HEIGHT, AVATAR_SHEET, AVATAR_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::pixel_to_grid;
use crate::tuning::Tuning;

/// Input intents for a single tick
///
/// Edge-triggered booleans, consumed once per tick; the simulation knows
/// nothing about physical input devices. The driver clears one-shot intents
/// after each processed tick.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Move one step left this tick
    pub left: bool,
    /// Move one step right this tick
    pub right: bool,
    /// Start a jump this tick (honored only with ground under the feet)
    pub jump: bool,
}

/// One game session: a loaded world plus the avatar traversing it
#[derive(Debug, Clone)]
pub struct Game {
    pub world: World,
    pub avatar: Avatar,
    pub tuning: Tuning,
    graphics: Option<GraphicsCatalog>,
    time_ticks: u64,
}

impl Game {
    /// Start a session on the world's start screen. The graphics catalog is
    /// the explicit context for mask-accurate sprite collision; without one,
    /// collision stays at bounding-box accuracy.
    pub fn new(world: World, tuning: Tuning, graphics: Option<GraphicsCatalog>) -> Self {
        let spawn = world.current_screen().spawn();
        Self {
            world,
            avatar: Avatar::new(spawn),
            tuning,
            graphics,
            time_ticks: 0,
        }
    }

    #[inline]
    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    #[inline]
    pub fn graphics(&self) -> Option<&GraphicsCatalog> {
        self.graphics.as_ref()
    }

    /// Advance the entire simulation by one discrete step
    pub fn tick(&mut self, input: &TickInput) {
        self.time_ticks += 1;

        if self.avatar.state() == AvatarState::Dying {
            if self.avatar.step_dying(&self.tuning) {
                // Death animation over: back to the re-entry point, with the
                // screen's sprites returned to their spawn positions. Dead
                // hazards stay dead until the screen is actually re-entered.
                let screen = self.world.current_screen_mut();
                screen.reset_sprites();
                let entry = screen.entry();
                self.avatar.place_at(entry);
                log::debug!("avatar respawned on screen {}", self.world.current_id());
            }
            self.advance_animations();
            return;
        }

        // --- Avatar movement ---
        {
            let screen = self.world.current_screen_mut();
            self.avatar.update(input, screen, &self.tuning);
        }

        // --- Contact checks ---
        self.check_hazard_contact();
        if self.avatar.state() != AvatarState::Dying {
            self.check_sprite_contact();
        }
        if self.avatar.state() != AvatarState::Dying {
            self.check_goodie_pickup();
            self.check_transition();
        }

        // --- Tile and sprite animation ---
        self.advance_animations();
    }

    fn advance_animations(&mut self) {
        let id = self.world.current_id();
        let screen = self.world.current_screen_mut();
        screen.advance_tiles();
        screen.step_sprites();
        self.world.step_goodies(id);
    }

    /// Grid cells currently overlapped by the avatar's bounding box
    fn overlapped_cells(&self) -> (i32, i32, i32, i32) {
        let b = self.avatar.bbox();
        (
            pixel_to_grid(b.left()),
            pixel_to_grid(b.right() - 1e-9),
            pixel_to_grid(b.top()),
            pixel_to_grid(b.bottom() - 1e-9),
        )
    }

    fn check_hazard_contact(&mut self) {
        let (c0, c1, r0, r1) = self.overlapped_cells();
        let screen = self.world.current_screen_mut();

        let mut hit: Option<u8> = None;
        for row in r0..=r1 {
            for col in c0..=c1 {
                if let Some(TileKind::Hazard(h)) = screen.tile_at_grid_mut(col, row) {
                    if h.state != HazardState::Dead {
                        hit.get_or_insert(h.death_anim);
                        h.strike(self.tuning.hazard_explode_ticks);
                    }
                }
            }
        }
        if let Some(death_anim) = hit {
            self.avatar.kill(death_anim, &self.tuning);
        }
    }

    fn check_sprite_contact(&mut self) {
        let screen = self.world.current_screen();
        let avatar_box = self.avatar.bbox();

        let mut hit = false;
        for sprite in &screen.sprites {
            // Coarse box test first; the pixel scan is O(overlap area)
            if !avatar_box.intersects(&sprite.bbox()) {
                continue;
            }
            if let Some(catalog) = &self.graphics {
                if let (Some(avatar_sheet), Some(sprite_sheet)) =
                    (catalog.sheet(AVATAR_SHEET), catalog.sheet(&sprite.sheet))
                {
                    let avatar_row = match self.avatar.facing {
                        Facing::Right => 0,
                        Facing::Left => u32::from(avatar_sheet.two_directional()),
                    };
                    let avatar_mask = avatar_sheet.mask(self.avatar.anim_frame(), avatar_row);
                    let sprite_mask = sprite_sheet.mask(sprite.frame(), sprite.row());
                    if !masks_overlap(avatar_mask, self.avatar.pos, sprite_mask, sprite.pos) {
                        continue;
                    }
                }
            }
            hit = true;
            break;
        }
        if hit {
            self.avatar.kill(0, &self.tuning);
        }
    }

    fn check_goodie_pickup(&mut self) {
        let (c0, c1, r0, r1) = self.overlapped_cells();
        let id = self.world.current_id();
        for row in r0..=r1 {
            for col in c0..=c1 {
                if let Some(goodie) = self.world.goodie_at_mut(id, col, row) {
                    if goodie.collectable() {
                        goodie.take(self.tuning.goodie_taken_ticks);
                        log::debug!("goodie {} taken on screen {id}", goodie.id);
                    }
                }
            }
        }
    }

    /// Which playable-area edge, if any, the avatar's box has crossed
    fn exit_direction(&self) -> Option<ExitDirection> {
        let area = PixelRect::playable_area();
        let b = self.avatar.bbox();
        if b.left() < area.left() {
            Some(ExitDirection::Left)
        } else if b.right() > area.right() {
            Some(ExitDirection::Right)
        } else if b.top() < area.top() {
            Some(ExitDirection::Up)
        } else if b.bottom() > area.bottom() {
            Some(ExitDirection::Down)
        } else {
            None
        }
    }

    fn check_transition(&mut self) {
        let Some(dir) = self.exit_direction() else {
            return;
        };

        if self.world.transition(dir) {
            // Enter at the opposite edge of the new screen, and remember the
            // entry point as this screen's respawn position
            match dir {
                ExitDirection::Right => self.avatar.pos.x = 0.0,
                ExitDirection::Left => self.avatar.pos.x = SCREEN_WIDTH - AVATAR_WIDTH,
                ExitDirection::Down => self.avatar.pos.y = 0.0,
                ExitDirection::Up => self.avatar.pos.y = SCREEN_HEIGHT - AVATAR_HEIGHT,
            }
            let entry = self.avatar.pos;
            self.world.current_screen_mut().set_entry(entry);
        } else {
            // World edge: no neighbor there, stay on this screen
            match dir {
                ExitDirection::Left => self.avatar.pos.x = 0.0,
                ExitDirection::Right => self.avatar.pos.x = SCREEN_WIDTH - AVATAR_WIDTH,
                ExitDirection::Up => self.avatar.pos.y = 0.0,
                ExitDirection::Down => {
                    self.avatar.pos.y = SCREEN_HEIGHT - AVATAR_HEIGHT;
                    self.avatar.vel.y = 0.0;
                }
            }
        }
    }
}
