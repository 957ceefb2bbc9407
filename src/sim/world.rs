//! The world: a directed graph of screens plus the goodie registry
//!
//! Screen ids are spatially meaningful: one screen right/left is id +-1, one
//! screen up/down is id -+100. That keeps adjacency a pure integer add and
//! screen lookup O(1); a pathologically wide world could collide ids, which
//! is accepted for the bounded worlds this engine hosts.

use std::collections::HashMap;

use super::goodie::Goodie;
use super::screen::Screen;
use crate::consts::{SCREEN_STRIDE_X, SCREEN_STRIDE_Y};

/// Which playable-area edge the avatar crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDirection {
    Left,
    Right,
    Up,
    Down,
}

impl ExitDirection {
    /// Screen-id offset of the neighbor in this direction
    #[inline]
    pub fn id_delta(self) -> i32 {
        match self {
            ExitDirection::Left => -SCREEN_STRIDE_X,
            ExitDirection::Right => SCREEN_STRIDE_X,
            ExitDirection::Up => -SCREEN_STRIDE_Y,
            ExitDirection::Down => SCREEN_STRIDE_Y,
        }
    }
}

/// All screens, all goodies, and the active-screen pointer
#[derive(Debug, Clone)]
pub struct World {
    screens: HashMap<i32, Screen>,
    /// Keyed by `(screen_id, col, row)` for O(1) presence checks
    goodies: HashMap<(i32, i32, i32), Goodie>,
    current: i32,
}

impl World {
    /// Assemble a world from validated parts; `worlddef::WorldDef::build` is
    /// the only intended caller.
    pub fn new(screens: Vec<Screen>, goodies: Vec<Goodie>, start: i32) -> Self {
        debug_assert!(screens.iter().any(|s| s.id == start));
        let screens = screens.into_iter().map(|s| (s.id, s)).collect();
        let goodies = goodies
            .into_iter()
            .map(|g| ((g.screen, g.col, g.row), g))
            .collect::<HashMap<_, _>>();
        Self {
            screens,
            goodies,
            current: start,
        }
    }

    #[inline]
    pub fn current_id(&self) -> i32 {
        self.current
    }

    pub fn current_screen(&self) -> &Screen {
        self.screens
            .get(&self.current)
            .expect("active screen must exist")
    }

    pub fn current_screen_mut(&mut self) -> &mut Screen {
        self.screens
            .get_mut(&self.current)
            .expect("active screen must exist")
    }

    pub fn screen(&self, id: i32) -> Option<&Screen> {
        self.screens.get(&id)
    }

    pub fn contains(&self, id: i32) -> bool {
        self.screens.contains_key(&id)
    }

    /// Id of the neighbor one screen over in `dir`
    #[inline]
    pub fn neighbor_id(&self, dir: ExitDirection) -> i32 {
        self.current + dir.id_delta()
    }

    /// Try to move the active screen one step in `dir`.
    ///
    /// A missing neighbor rejects the transition and leaves everything
    /// untouched; the world edge is a fence, not an error. On success the
    /// screen being left resets its residents so a later re-entry restarts
    /// clean, and the active pointer moves.
    pub fn transition(&mut self, dir: ExitDirection) -> bool {
        let target = self.neighbor_id(dir);
        if !self.screens.contains_key(&target) {
            return false;
        }
        if let Some(prev) = self.screens.get_mut(&self.current) {
            prev.reset_residents();
        }
        log::info!("screen transition {} -> {}", self.current, target);
        self.current = target;
        true
    }

    pub fn goodie_at(&self, screen: i32, col: i32, row: i32) -> Option<&Goodie> {
        self.goodies.get(&(screen, col, row))
    }

    pub fn goodie_at_mut(&mut self, screen: i32, col: i32, row: i32) -> Option<&mut Goodie> {
        self.goodies.get_mut(&(screen, col, row))
    }

    /// Goodies on one screen, in stable id order
    pub fn goodies_on(&self, screen: i32) -> Vec<&Goodie> {
        let mut found: Vec<&Goodie> = self
            .goodies
            .iter()
            .filter(|((sid, _, _), _)| *sid == screen)
            .map(|(_, g)| g)
            .collect();
        found.sort_by_key(|g| g.id);
        found
    }

    /// Advance consumed-animation countdowns for goodies on one screen
    pub fn step_goodies(&mut self, screen: i32) {
        for ((sid, _, _), goodie) in self.goodies.iter_mut() {
            if *sid == screen {
                goodie.step();
            }
        }
    }

    /// How many goodies are still collectable anywhere in the world
    pub fn collectable_remaining(&self) -> usize {
        self.goodies.values().filter(|g| g.collectable()).count()
    }
}
