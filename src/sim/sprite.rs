//! Bounded entities ("sprites")
//!
//! A sprite is an autonomously moving hazard confined to a rectangular
//! region. It translates by its velocity each tick and hard-bounces at the
//! region edges: the offending axis flips its velocity sign and does not
//! translate that tick, so a reflection can never apply twice within one
//! tick.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::geom::PixelRect;

/// How an animation's frame index advances when it reaches the end of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimMode {
    /// Monotonically increasing; wraps to frame 0
    #[default]
    Increasing,
    /// Ping-pong; reverses direction at both ends instead of wrapping
    Cycling,
}

/// A frame counter advancing on a ticks-per-frame cadence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    mode: AnimMode,
    frames: u32,
    ticks_per_frame: u32,
    frame: u32,
    counter: u32,
    forward: bool,
}

impl Animation {
    pub fn new(mode: AnimMode, frames: u32, ticks_per_frame: u32) -> Self {
        Self {
            mode,
            frames: frames.max(1),
            ticks_per_frame: ticks_per_frame.max(1),
            frame: 0,
            counter: 0,
            forward: true,
        }
    }

    #[inline]
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Advance one tick; the frame index moves every `ticks_per_frame` ticks
    pub fn step(&mut self) {
        self.counter += 1;
        if self.counter < self.ticks_per_frame {
            return;
        }
        self.counter = 0;

        if self.frames == 1 {
            return;
        }
        match self.mode {
            AnimMode::Increasing => {
                self.frame = (self.frame + 1) % self.frames;
            }
            AnimMode::Cycling => {
                if self.forward {
                    if self.frame + 1 >= self.frames {
                        self.forward = false;
                        self.frame -= 1;
                    } else {
                        self.frame += 1;
                    }
                } else if self.frame == 0 {
                    self.forward = true;
                    self.frame = 1;
                } else {
                    self.frame -= 1;
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.frame = 0;
        self.counter = 0;
        self.forward = true;
    }
}

/// A bounding-region-confined moving hazard entity
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub id: u32,
    /// Sprite-sheet key, resolved through the graphics catalog
    pub sheet: String,

    // Immutable definition
    start: DVec2,
    start_vel: DVec2,
    /// Region the sprite's box must stay within (not the frame size)
    bounds: PixelRect,
    width: f64,
    height: f64,
    two_directional: bool,

    // Run-time state
    pub pos: DVec2,
    pub vel: DVec2,
    anim: Animation,
    row: u32,
}

impl Sprite {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        sheet: String,
        start: DVec2,
        vel: DVec2,
        width: f64,
        height: f64,
        bounds: PixelRect,
        anim: Animation,
        two_directional: bool,
    ) -> Self {
        Self {
            id,
            sheet,
            start,
            start_vel: vel,
            bounds,
            width,
            height,
            two_directional,
            pos: start,
            vel,
            anim,
            row: 0,
        }
    }

    /// Current bounding box in screen pixels
    pub fn bbox(&self) -> PixelRect {
        PixelRect::new(self.pos.x, self.pos.y, self.width, self.height)
    }

    #[inline]
    pub fn frame(&self) -> u32 {
        self.anim.frame()
    }

    /// Sheet row currently sampled (flips with facing on two-directional sprites)
    #[inline]
    pub fn row(&self) -> u32 {
        self.row
    }

    #[inline]
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// One tick of motion and animation
    pub fn step(&mut self) {
        // X axis: move or reflect, never both
        let nx = self.pos.x + self.vel.x;
        if nx < self.bounds.left() || nx + self.width > self.bounds.right() {
            self.vel.x = -self.vel.x;
            if self.two_directional {
                self.row ^= 1;
            }
        } else {
            self.pos.x = nx;
        }

        // Y axis
        let ny = self.pos.y + self.vel.y;
        if ny < self.bounds.top() || ny + self.height > self.bounds.bottom() {
            self.vel.y = -self.vel.y;
        } else {
            self.pos.y = ny;
        }

        self.anim.step();
    }

    /// Return to the spawn state (screen re-entry, avatar death)
    pub fn reset(&mut self) {
        self.pos = self.start;
        self.vel = self.start_vel;
        self.row = 0;
        self.anim.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn walker(vel: DVec2) -> Sprite {
        Sprite::new(
            7,
            "walker".into(),
            DVec2::new(0.0, 0.0),
            vel,
            20.0,
            20.0,
            PixelRect::new(0.0, 0.0, 40.0, 40.0),
            Animation::new(AnimMode::Increasing, 4, 1),
            true,
        )
    }

    #[test]
    fn test_reflects_exactly_at_bound_never_earlier() {
        let mut s = walker(DVec2::new(1.0, 0.0));
        // Right edge starts at 20; it may advance until it sits flush at 40
        for expected_x in 1..=20 {
            s.step();
            assert_eq!(s.pos.x, expected_x as f64);
            assert_eq!(s.vel.x, 1.0);
        }
        // Next move would put the right edge past 40: reflect, hold position
        s.step();
        assert_eq!(s.pos.x, 20.0);
        assert_eq!(s.vel.x, -1.0);
    }

    #[test]
    fn test_two_directional_flips_row_on_horizontal_bounce() {
        let mut s = walker(DVec2::new(21.0, 0.0));
        assert_eq!(s.row(), 0);
        s.step(); // 21 + 20 > 40: bounce
        assert_eq!(s.row(), 1);
        assert_eq!(s.vel.x, -21.0);
    }

    #[test]
    fn test_vertical_bounce_keeps_row() {
        let mut s = walker(DVec2::new(0.0, 30.0));
        s.step();
        assert_eq!(s.vel.y, -30.0);
        assert_eq!(s.row(), 0);
    }

    #[test]
    fn test_reset_restores_spawn_state() {
        let mut s = walker(DVec2::new(1.0, 0.0));
        for _ in 0..25 {
            s.step();
        }
        s.reset();
        assert_eq!(s.pos, DVec2::new(0.0, 0.0));
        assert_eq!(s.vel, DVec2::new(1.0, 0.0));
        assert_eq!(s.frame(), 0);
        assert_eq!(s.row(), 0);
    }

    #[test]
    fn test_cycling_ping_pongs_instead_of_wrapping() {
        let mut a = Animation::new(AnimMode::Cycling, 8, 1);
        let mut seen = Vec::new();
        for _ in 0..15 {
            a.step();
            seen.push(a.frame());
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7, 6, 5, 4, 3, 2, 1, 0, 1]);
    }

    #[test]
    fn test_increasing_wraps_to_zero() {
        let mut a = Animation::new(AnimMode::Increasing, 4, 2);
        let mut seen = Vec::new();
        for _ in 0..10 {
            a.step();
            seen.push(a.frame());
        }
        // Two ticks per frame
        assert_eq!(seen, vec![0, 1, 1, 2, 2, 3, 3, 0, 0, 1]);
    }

    proptest! {
        #[test]
        fn prop_cycling_stays_in_range(frames in 1u32..12, steps in 0usize..200) {
            let mut a = Animation::new(AnimMode::Cycling, frames, 1);
            for _ in 0..steps {
                a.step();
                prop_assert!(a.frame() < frames);
            }
        }

        #[test]
        fn prop_sprite_never_leaves_bounds(vx in -30.0f64..30.0, vy in -30.0f64..30.0, steps in 0usize..300) {
            let mut s = walker(DVec2::new(vx, vy));
            let bounds = PixelRect::new(0.0, 0.0, 40.0, 40.0);
            for _ in 0..steps {
                s.step();
                prop_assert!(bounds.contains(&s.bbox()));
            }
        }
    }
}
