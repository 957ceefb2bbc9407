//! The avatar (player) controller
//!
//! Created once per session and repositioned, never recreated, on screen
//! transitions and respawns. Collision queries borrow the active screen; the
//! avatar owns nothing but its own state.
//!
//! The ground probe is asymmetric: a platform tile supports the avatar only
//! while it is not rising (checked on the sign of the vertical velocity, not
//! on the state flag), so the avatar jumps up *through* platforms and still
//! lands on them. Solid tiles snap only within half a cell so a fast fall
//! cannot snap through thick terrain.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::screen::Screen;
use super::tick::TickInput;
use super::tile::{Support, TileKind};
use super::geom::PixelRect;
use crate::consts::{AVATAR_HEIGHT, AVATAR_WIDTH, TILE_SIZE};
use crate::tuning::Tuning;
use crate::{grid_to_pixel, pixel_to_grid};

/// Avatar state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvatarState {
    /// On (or walking off) the ground
    Grounded,
    /// Airborne from a jump; gravity accumulates at half rate
    Jumping,
    /// Playing the death animation
    Dying,
}

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

/// The player-controlled character
#[derive(Debug, Clone)]
pub struct Avatar {
    /// Sub-pixel position of the bounding box top-left
    pub pos: DVec2,
    /// Sub-pixel velocity, px/tick
    pub vel: DVec2,
    pub facing: Facing,
    state: AvatarState,
    /// Which death animation plays; selected by the killing hazard
    death_anim: u8,
    death_ticks_left: u32,
    anim_frame: u32,
    anim_counter: u32,
}

impl Avatar {
    pub fn new(pos: DVec2) -> Self {
        Self {
            pos,
            vel: DVec2::ZERO,
            facing: Facing::Right,
            state: AvatarState::Grounded,
            death_anim: 0,
            death_ticks_left: 0,
            anim_frame: 0,
            anim_counter: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> AvatarState {
        self.state
    }

    #[inline]
    pub fn anim_frame(&self) -> u32 {
        self.anim_frame
    }

    #[inline]
    pub fn death_anim(&self) -> u8 {
        self.death_anim
    }

    /// Current bounding box in screen pixels
    pub fn bbox(&self) -> PixelRect {
        PixelRect::new(self.pos.x, self.pos.y, AVATAR_WIDTH, AVATAR_HEIGHT)
    }

    /// Pixel y of the bottom edge
    #[inline]
    fn feet(&self) -> f64 {
        self.pos.y + AVATAR_HEIGHT
    }

    /// Three-point ground probe, one pixel below the feet.
    ///
    /// Returns the penetration depth of the feet below the supporting row's
    /// top (how far to snap up) when there is contact. Platform-family tiles
    /// never support a rising avatar; solid tiles support only within half a
    /// cell of their top.
    pub fn ground_probe(&self, screen: &Screen) -> Option<f64> {
        let feet = self.feet();
        let sample_y = feet + 1.0;
        let row_top = grid_to_pixel(pixel_to_grid(sample_y));
        let pen = feet - row_top;

        let samples = [
            self.pos.x + 1.0,
            self.pos.x + AVATAR_WIDTH * 0.5,
            self.pos.x + AVATAR_WIDTH - 1.0,
        ];
        for x in samples {
            let contact = match screen.tile_at(x, sample_y).support() {
                Support::Platform => self.vel.y >= 0.0,
                Support::Block => pen < TILE_SIZE * 0.5,
                Support::None => false,
            };
            if contact {
                return Some(pen);
            }
        }
        None
    }

    /// Three-point side probe on the leading edge at a prospective x.
    /// Any blocking tile rejects the whole horizontal move; there is no
    /// partial slide.
    fn side_blocked(&self, screen: &Screen, new_x: f64, dx: f64) -> bool {
        let edge = if dx > 0.0 { new_x + AVATAR_WIDTH } else { new_x };
        let samples = [
            self.pos.y + 1.0,
            self.pos.y + AVATAR_HEIGHT * 0.5,
            self.pos.y + AVATAR_HEIGHT - 1.0,
        ];
        samples
            .iter()
            .any(|&y| screen.tile_at(edge, y).blocks_side())
    }

    /// Tile under the center of the feet (what the avatar is standing on)
    fn supporting_tile(&self, screen: &Screen) -> TileKind {
        screen.tile_at(self.pos.x + AVATAR_WIDTH * 0.5, self.feet() + 1.0)
    }

    /// One tick of input, gravity, integration and tile collision for a
    /// live avatar. Hazard/sprite/goodie contact and screen transitions are
    /// the session's job, after this.
    pub fn update(&mut self, input: &TickInput, screen: &mut Screen, tuning: &Tuning) {
        debug_assert!(self.state != AvatarState::Dying);

        // --- Horizontal intent ---
        let mut dx = 0.0;
        if input.left {
            dx -= tuning.walk_speed;
            self.facing = Facing::Left;
        }
        if input.right {
            dx += tuning.walk_speed;
            self.facing = Facing::Right;
        }

        let standing = self.vel.y == 0.0 && self.ground_probe(screen).is_some();

        // Conveyors drag whatever rests on them
        if standing {
            if let TileKind::Conveyor(belt) = self.supporting_tile(screen) {
                dx += tuning.conveyor_push * belt.rotation.push_sign();
            }
        }

        // --- Jump ---
        if input.jump && self.vel.y == 0.0 && standing {
            self.vel.y = tuning.jump_velocity;
            self.state = AvatarState::Jumping;
            self.anim_frame = 0;
            self.anim_counter = 0;
        }

        // --- Gravity ---
        // Accumulates while airborne, capped at terminal velocity. Jump
        // arcs fall at half rate; free falls at full rate.
        if self.vel.y != 0.0 || !standing {
            let rate = if self.state == AvatarState::Jumping {
                tuning.gravity * tuning.jump_gravity_factor
            } else {
                tuning.gravity
            };
            self.vel.y = (self.vel.y + rate).min(tuning.terminal_velocity);
        }

        // --- Horizontal integration ---
        let mut moved = false;
        if dx != 0.0 {
            let new_x = self.pos.x + dx;
            if !self.side_blocked(screen, new_x, dx) {
                self.pos.x = new_x;
                moved = true;
            }
        }
        self.vel.x = if moved { dx } else { 0.0 };

        // --- Vertical integration and ground resolve ---
        self.pos.y += self.vel.y;
        if self.vel.y >= 0.0 {
            if let Some(pen) = self.ground_probe(screen) {
                self.pos.y -= pen;
                self.vel.y = 0.0;
                if self.state == AvatarState::Jumping {
                    self.state = AvatarState::Grounded;
                    self.anim_frame = 0;
                    self.anim_counter = 0;
                }
            }
        }

        // --- Collapsible wear ---
        if self.vel.y == 0.0 {
            self.wear_supporting_tiles(screen, tuning);
        }

        self.advance_animation(moved, tuning);
    }

    /// One tick of damage to every collapsible cell under the feet
    fn wear_supporting_tiles(&self, screen: &mut Screen, tuning: &Tuning) {
        let row = pixel_to_grid(self.feet() + 1.0);
        let cols = [
            pixel_to_grid(self.pos.x + 1.0),
            pixel_to_grid(self.pos.x + AVATAR_WIDTH * 0.5),
            pixel_to_grid(self.pos.x + AVATAR_WIDTH - 1.0),
        ];
        let mut last = None;
        for col in cols {
            if last == Some(col) {
                continue;
            }
            last = Some(col);
            if let Some(TileKind::Collapsible(c)) = screen.tile_at_grid_mut(col, row) {
                c.wear(tuning.collapse_threshold);
            }
        }
    }

    fn advance_animation(&mut self, moved: bool, tuning: &Tuning) {
        match self.state {
            AvatarState::Grounded => {
                if moved {
                    self.anim_counter += 1;
                    if self.anim_counter >= tuning.walk_anim_period {
                        self.anim_counter = 0;
                        self.anim_frame = (self.anim_frame + 1) % tuning.walk_frames.max(1);
                    }
                }
            }
            AvatarState::Jumping => {
                // Ascending frame sequence up to the cap, then hold
                self.anim_counter += 1;
                if self.anim_counter >= tuning.walk_anim_period {
                    self.anim_counter = 0;
                    self.anim_frame = (self.anim_frame + 1).min(tuning.jump_frame_cap);
                }
            }
            AvatarState::Dying => {}
        }
    }

    /// Hazard or sprite contact: zero the velocity and start the death
    /// animation. A second hit while already dying is ignored.
    pub fn kill(&mut self, death_anim: u8, tuning: &Tuning) {
        if self.state == AvatarState::Dying {
            return;
        }
        log::debug!("avatar killed at ({:.1},{:.1})", self.pos.x, self.pos.y);
        self.vel = DVec2::ZERO;
        self.state = AvatarState::Dying;
        self.death_anim = death_anim;
        self.death_ticks_left = tuning.death_ticks.max(1);
        self.anim_frame = 0;
        self.anim_counter = 0;
    }

    /// Advance the death animation; returns true when it has finished
    pub fn step_dying(&mut self, tuning: &Tuning) -> bool {
        debug_assert!(self.state == AvatarState::Dying);
        self.death_ticks_left -= 1;
        let elapsed = tuning.death_ticks.max(1) - self.death_ticks_left;
        self.anim_frame = elapsed / tuning.walk_anim_period.max(1);
        self.death_ticks_left == 0
    }

    /// Reposition without recreating: screen transitions and respawns
    pub fn place_at(&mut self, pos: DVec2) {
        self.pos = pos;
        self.vel = DVec2::ZERO;
        self.state = AvatarState::Grounded;
        self.anim_frame = 0;
        self.anim_counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tile::{ConveyorTile, Rotation};

    fn solid_floor_screen() -> Screen {
        let mut s = Screen::new(1000, 0, DVec2::new(100.0, 268.0));
        for col in 0..32 {
            s.set_tile(col, 15, TileKind::Solid);
        }
        s
    }

    fn standing_avatar() -> Avatar {
        // Feet at y=300, flush on the row-15 floor
        Avatar::new(DVec2::new(100.0, 268.0))
    }

    #[test]
    fn test_probe_contact_on_solid_floor() {
        let screen = solid_floor_screen();
        let avatar = standing_avatar();
        assert_eq!(avatar.ground_probe(&screen), Some(0.0));
    }

    #[test]
    fn test_probe_ignores_platform_while_rising() {
        let mut screen = Screen::new(1000, 0, DVec2::ZERO);
        for col in 0..32 {
            screen.set_tile(col, 15, TileKind::Thru);
        }
        let mut avatar = standing_avatar();

        avatar.vel.y = -1.0;
        assert_eq!(avatar.ground_probe(&screen), None);

        avatar.vel.y = 1.0;
        assert_eq!(avatar.ground_probe(&screen), Some(0.0));

        // Feet partway into the platform cell while falling: contact, with
        // the snap distance reported
        avatar.pos.y = 268.0 + 6.0;
        assert_eq!(avatar.ground_probe(&screen), Some(6.0));
    }

    #[test]
    fn test_solid_does_not_snap_past_half_cell() {
        let screen = solid_floor_screen();
        let mut avatar = standing_avatar();
        avatar.vel.y = 1.0;

        avatar.pos.y = 268.0 + 9.0;
        assert_eq!(avatar.ground_probe(&screen), Some(9.0));

        // Deep inside the cell: treated as airborne instead of teleporting up
        avatar.pos.y = 268.0 + 11.0;
        assert_eq!(avatar.ground_probe(&screen), None);
    }

    #[test]
    fn test_side_probe_rejects_whole_move() {
        let mut screen = solid_floor_screen();
        // Wall at column 10 (x 200..220), beside the avatar's head and chest
        screen.set_tile(10, 13, TileKind::Solid);
        screen.set_tile(10, 14, TileKind::Solid);
        let mut avatar = standing_avatar();
        avatar.pos.x = 182.0; // right edge at 198

        let input = TickInput {
            right: true,
            ..Default::default()
        };
        let tuning = Tuning::default();
        avatar.update(&input, &mut screen, &tuning);
        // 182 + 2 would put the leading edge at 200, inside the wall column
        assert_eq!(avatar.pos.x, 182.0);
        assert_eq!(avatar.vel.x, 0.0);
    }

    #[test]
    fn test_walk_moves_and_faces() {
        let mut screen = solid_floor_screen();
        let mut avatar = standing_avatar();
        let tuning = Tuning::default();

        let input = TickInput {
            left: true,
            ..Default::default()
        };
        avatar.update(&input, &mut screen, &tuning);
        assert_eq!(avatar.pos.x, 100.0 - tuning.walk_speed);
        assert_eq!(avatar.facing, Facing::Left);
        assert_eq!(avatar.state(), AvatarState::Grounded);
    }

    #[test]
    fn test_jump_requires_ground_and_zero_vertical_velocity() {
        let mut screen = solid_floor_screen();
        let mut avatar = standing_avatar();
        let tuning = Tuning::default();
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };

        avatar.update(&jump, &mut screen, &tuning);
        assert_eq!(avatar.state(), AvatarState::Jumping);
        assert!(avatar.vel.y < 0.0);

        // Mid-air jump intent does nothing
        let vy = avatar.vel.y;
        avatar.update(&jump, &mut screen, &tuning);
        assert_eq!(avatar.state(), AvatarState::Jumping);
        assert!(avatar.vel.y > vy, "gravity kept accumulating");
    }

    #[test]
    fn test_jump_arc_lands_back_deterministically() {
        let mut screen = solid_floor_screen();
        let mut avatar = standing_avatar();
        let tuning = Tuning::default();

        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        avatar.update(&jump, &mut screen, &tuning);
        assert_eq!(avatar.state(), AvatarState::Jumping);

        let idle = TickInput::default();
        let mut landed_after = None;
        for tick in 2..=120 {
            avatar.update(&idle, &mut screen, &tuning);
            if avatar.state() == AvatarState::Grounded {
                landed_after = Some(tick);
                break;
            }
        }
        // -6.0 start, +0.2/tick while jumping: back on the floor at tick 59
        assert_eq!(landed_after, Some(59));
        assert_eq!(avatar.vel.y, 0.0);
        assert_eq!(avatar.pos.x, 100.0);
        assert!((avatar.pos.y - 268.0).abs() < 1e-6);
    }

    #[test]
    fn test_free_fall_is_faster_than_jump_fall() {
        let tuning = Tuning::default();
        let mut screen = Screen::new(1000, 0, DVec2::ZERO);
        let idle = TickInput::default();

        // Free fall from rest: full gravity rate
        let mut faller = Avatar::new(DVec2::new(100.0, 50.0));
        faller.update(&idle, &mut screen, &tuning);
        assert_eq!(faller.vel.y, tuning.gravity);

        // Jump-fall: half rate
        let mut floor = solid_floor_screen();
        let mut jumper = standing_avatar();
        jumper.update(
            &TickInput {
                jump: true,
                ..Default::default()
            },
            &mut floor,
            &tuning,
        );
        assert_eq!(
            jumper.vel.y,
            tuning.jump_velocity + tuning.gravity * tuning.jump_gravity_factor
        );
    }

    #[test]
    fn test_terminal_velocity_caps_fall() {
        let tuning = Tuning::default();
        let mut screen = Screen::new(1000, 0, DVec2::ZERO);
        let mut avatar = Avatar::new(DVec2::new(100.0, -200.0));
        let idle = TickInput::default();
        for _ in 0..100 {
            avatar.update(&idle, &mut screen, &tuning);
        }
        assert_eq!(avatar.vel.y, tuning.terminal_velocity);
    }

    #[test]
    fn test_conveyor_drags_standing_avatar() {
        let mut screen = Screen::new(1000, 0, DVec2::ZERO);
        for col in 0..32 {
            screen.set_tile(
                col,
                15,
                TileKind::Conveyor(ConveyorTile {
                    belt: 0,
                    rotation: Rotation::AntiClockwise,
                }),
            );
        }
        let mut avatar = standing_avatar();
        let tuning = Tuning::default();
        avatar.update(&TickInput::default(), &mut screen, &tuning);
        assert_eq!(avatar.pos.x, 100.0 - tuning.conveyor_push);
    }

    #[test]
    fn test_collapsible_wears_only_under_feet() {
        let mut screen = Screen::new(1000, 0, DVec2::ZERO);
        for col in 0..32 {
            screen.set_tile(col, 15, TileKind::Collapsible(Default::default()));
        }
        let mut avatar = standing_avatar();
        let tuning = Tuning::default();
        avatar.update(&TickInput::default(), &mut screen, &tuning);

        // Feet span x 100..116: every sample lands in column 5
        match screen.tile_at_grid(5, 15) {
            TileKind::Collapsible(c) => assert_eq!(c.damage, 1),
            other => panic!("unexpected tile {other:?}"),
        }
        match screen.tile_at_grid(20, 15) {
            TileKind::Collapsible(c) => assert_eq!(c.damage, 0),
            other => panic!("unexpected tile {other:?}"),
        }
    }

    #[test]
    fn test_kill_and_respawn() {
        let tuning = Tuning::default();
        let mut avatar = standing_avatar();
        avatar.vel = DVec2::new(2.0, 3.0);
        avatar.kill(1, &tuning);
        assert_eq!(avatar.state(), AvatarState::Dying);
        assert_eq!(avatar.vel, DVec2::ZERO);
        assert_eq!(avatar.death_anim(), 1);

        let mut done = false;
        for _ in 0..tuning.death_ticks {
            assert!(!done);
            done = avatar.step_dying(&tuning);
        }
        assert!(done);

        avatar.place_at(DVec2::new(40.0, 268.0));
        assert_eq!(avatar.state(), AvatarState::Grounded);
        assert_eq!(avatar.pos, DVec2::new(40.0, 268.0));
    }
}
