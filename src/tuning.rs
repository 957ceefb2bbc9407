//! Movement and animation tuning
//!
//! Every "feel" constant lives here as configuration data rather than being
//! scattered through the physics code. The defaults are the reference values;
//! a world definition may carry overrides.

use serde::{Deserialize, Serialize};

/// Movement and animation constants for one loaded world
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Vertical movement ===
    /// Downward acceleration per tick while in free fall (px/tick^2)
    pub gravity: f64,
    /// Gravity multiplier applied instead while in the jumping state, so a
    /// jump-fall arcs more slowly than a free-fall
    pub jump_gravity_factor: f64,
    /// Vertical velocity imparted by a jump (negative = upward, px/tick)
    pub jump_velocity: f64,
    /// Terminal fall speed (px/tick)
    pub terminal_velocity: f64,

    // === Horizontal movement ===
    /// Walk speed while a move intent is held (px/tick)
    pub walk_speed: f64,
    /// Horizontal push applied by a conveyor to anything resting on it (px/tick)
    pub conveyor_push: f64,

    // === Tile state machines ===
    /// Ticks of sustained contact before a collapsible tile gives way
    pub collapse_threshold: u32,
    /// Length of a hazard's explosion animation, in ticks
    pub hazard_explode_ticks: u32,
    /// Ticks per frame of the two-frame hazard/goodie idle alternation
    pub idle_anim_period: u32,

    // === Lifecycles ===
    /// Length of a goodie's consumed animation, in ticks
    pub goodie_taken_ticks: u32,
    /// Length of the avatar's death animation, in ticks
    pub death_ticks: u32,

    // === Avatar animation ===
    /// Frames in the walk cycle
    pub walk_frames: u32,
    /// Ticks per walk/jump animation frame
    pub walk_anim_period: u32,
    /// Highest frame of the ascending jump sequence; held once reached
    pub jump_frame_cap: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.4,
            jump_gravity_factor: 0.5,
            jump_velocity: -6.0,
            terminal_velocity: 8.0,

            walk_speed: 2.0,
            conveyor_push: 1.0,

            collapse_threshold: 40,
            hazard_explode_ticks: 12,
            idle_anim_period: 8,

            goodie_taken_ticks: 10,
            death_ticks: 24,

            walk_frames: 4,
            walk_anim_period: 4,
            jump_frame_cap: 3,
        }
    }
}
