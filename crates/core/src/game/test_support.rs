//! Shared fixtures for unit tests: scripted randomness, scripted combat input and small maps.

use std::collections::VecDeque;

use crate::game::{CombatAction, CombatCommander, EncounterView};
use crate::rng::RandomSource;
use crate::state::TileMap;
use crate::types::{Pos, TileKind};

/// Replays a fixed list of unit floats, cycling when it runs out.
pub struct ScriptedRng {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(values: &[f64]) -> Self {
        assert!(!values.is_empty(), "scripted rng needs at least one value");
        Self { values: values.to_vec(), cursor: 0 }
    }
}

impl RandomSource for ScriptedRng {
    fn unit_f64(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

/// Hands out actions in order, then `None`.
pub struct ScriptedCommander {
    actions: VecDeque<CombatAction>,
}

impl ScriptedCommander {
    pub fn new(actions: Vec<CombatAction>) -> Self {
        Self { actions: actions.into() }
    }
}

impl CombatCommander for ScriptedCommander {
    fn choose(&mut self, _view: &EncounterView<'_>) -> Option<CombatAction> {
        self.actions.pop_front()
    }
}

/// A `width` by `height` map that is floor everywhere.
pub fn open_map(width: i32, height: i32) -> TileMap {
    let mut map = TileMap::new(width, height, 1);
    for y in 0..height {
        for x in 0..width {
            map.set_tile(Pos { y, x }, TileKind::Floor);
        }
    }
    map
}

/// A one-tile-wide horizontal corridor on row 1, walled on every side.
pub fn corridor_map(len: i32) -> TileMap {
    let mut map = TileMap::new(len, 3, 1);
    for x in 1..=len - 2 {
        map.set_tile(Pos { y: 1, x }, TileKind::Floor);
    }
    map
}
