use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use xxhash_rust::xxh3::xxh3_64;

use crate::agent::Enemy;
use crate::mapgen::Room;
use crate::player::Player;
use crate::types::*;

/// One generated floor: terrain, fog of war, ground items and the spawn roster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileMap {
    pub width: i32,
    pub height: i32,
    pub floor: u32,
    tiles: Vec<TileKind>,
    revealed: Vec<bool>,
    visible: Vec<bool>,
    pub items: BTreeMap<Pos, Vec<String>>,
    pub enemy_spawns: Vec<(EnemyKind, Pos)>,
    pub rooms: Vec<Room>,
    pub safe_room: Option<Room>,
    pub treasure_room: Option<Room>,
    pub start: Pos,
    pub stairs: Pos,
}

impl TileMap {
    /// Solid rock of the given size.
    pub fn new(width: i32, height: i32, floor: u32) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            floor,
            tiles: vec![TileKind::Wall; len],
            revealed: vec![false; len],
            visible: vec![false; len],
            items: BTreeMap::new(),
            enemy_spawns: Vec::new(),
            rooms: Vec::new(),
            safe_room: None,
            treasure_room: None,
            start: Pos { y: 0, x: 0 },
            stairs: Pos { y: 0, x: 0 },
        }
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Out-of-bounds coordinates read as wall.
    pub fn tile_at(&self, pos: Pos) -> TileKind {
        match self.index(pos) {
            Some(idx) => self.tiles[idx],
            None => TileKind::Wall,
        }
    }

    pub fn set_tile(&mut self, pos: Pos, tile: TileKind) {
        if let Some(idx) = self.index(pos) {
            self.tiles[idx] = tile;
        }
    }

    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && self.tile_at(pos).is_walkable()
    }

    pub fn is_revealed(&self, pos: Pos) -> bool {
        self.index(pos).is_some_and(|idx| self.revealed[idx])
    }

    pub fn is_visible(&self, pos: Pos) -> bool {
        self.index(pos).is_some_and(|idx| self.visible[idx])
    }

    /// Marks a single tile as discovered without touching the visible set.
    pub fn reveal(&mut self, pos: Pos) {
        if let Some(idx) = self.index(pos) {
            self.revealed[idx] = true;
        }
    }

    /// Replaces the visible set with the Manhattan diamond of `radius` around `center`
    /// and folds it into the revealed set.
    pub fn reveal_around(&mut self, center: Pos, radius: i32) {
        self.visible.iter_mut().for_each(|v| *v = false);
        let radius = radius.max(0);
        for dy in -radius..=radius {
            let span = radius - dy.abs();
            for dx in -span..=span {
                let pos = Pos { y: center.y + dy, x: center.x + dx };
                if let Some(idx) = self.index(pos) {
                    self.visible[idx] = true;
                    self.revealed[idx] = true;
                }
            }
        }
    }

    pub fn visible_tiles(&self) -> BTreeSet<Pos> {
        self.positions().filter(|&pos| self.is_visible(pos)).collect()
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|&&r| r).count()
    }

    pub fn place_item(&mut self, pos: Pos, name: &str) {
        self.items.entry(pos).or_default().push(name.to_string());
    }

    pub fn take_items(&mut self, pos: Pos) -> Vec<String> {
        self.items.remove(&pos).unwrap_or_default()
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Pos { y, x }))
    }

    /// Stable byte encoding of terrain, start/stairs, items and spawns.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.tiles.len() + 64);
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.floor.to_le_bytes());
        out.extend(self.tiles.iter().map(|&tile| tile as u8));
        for pos in [self.start, self.stairs] {
            out.extend_from_slice(&pos.y.to_le_bytes());
            out.extend_from_slice(&pos.x.to_le_bytes());
        }
        for (pos, names) in &self.items {
            out.extend_from_slice(&pos.y.to_le_bytes());
            out.extend_from_slice(&pos.x.to_le_bytes());
            for name in names {
                out.extend_from_slice(name.as_bytes());
                out.push(0);
            }
        }
        for (kind, pos) in &self.enemy_spawns {
            out.push(*kind as u8);
            out.extend_from_slice(&pos.y.to_le_bytes());
            out.extend_from_slice(&pos.x.to_le_bytes());
        }
        out
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        self.in_bounds(pos).then(|| (pos.y * self.width + pos.x) as usize)
    }
}

/// Coordinates held by living enemies. The player is tracked separately as the pursuit target.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    cells: BTreeSet<Pos>,
}

impl Occupancy {
    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }

    pub fn insert(&mut self, pos: Pos) -> bool {
        self.cells.insert(pos)
    }

    pub fn remove(&mut self, pos: Pos) -> bool {
        self.cells.remove(&pos)
    }

    /// Moves a holder from `from` to `to` in one step. Refuses when `to` is already held,
    /// leaving the set untouched.
    pub fn relocate(&mut self, from: Pos, to: Pos) -> bool {
        if from == to {
            return true;
        }
        if self.cells.contains(&to) {
            return false;
        }
        self.cells.remove(&from);
        self.cells.insert(to);
        true
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Pos> + '_ {
        self.cells.iter().copied()
    }
}

impl FromIterator<Pos> for Occupancy {
    fn from_iter<I: IntoIterator<Item = Pos>>(iter: I) -> Self {
        Self { cells: iter.into_iter().collect() }
    }
}

/// Everything on the current floor that changes turn to turn.
#[derive(Clone, Debug)]
pub struct GameState {
    pub map: TileMap,
    pub player: Player,
    pub enemies: SlotMap<EnemyId, Enemy>,
    pub occupancy: Occupancy,
}

impl GameState {
    /// Places the player on the floor's start and spawns its roster in spawn order.
    pub fn install_floor(map: TileMap, mut player: Player) -> Self {
        player.pos = map.start;
        let mut enemies = SlotMap::with_key();
        let mut occupancy = Occupancy::default();
        for &(kind, pos) in &map.enemy_spawns {
            if occupancy.insert(pos) {
                enemies.insert(Enemy::spawn(kind, pos));
            }
        }
        Self { map, player, enemies, occupancy }
    }

    pub fn enemy_at(&self, pos: Pos) -> Option<EnemyId> {
        self.enemies.iter().find(|(_, enemy)| enemy.is_alive() && enemy.pos == pos).map(|(id, _)| id)
    }

    /// Stable roster order for one world turn.
    pub fn roster(&self) -> Vec<EnemyId> {
        self.enemies.keys().collect()
    }

    /// Drops dead enemies and releases their tiles.
    pub fn prune_dead(&mut self) -> usize {
        let dead: Vec<EnemyId> =
            self.enemies.iter().filter(|(_, enemy)| !enemy.is_alive()).map(|(id, _)| id).collect();
        for id in &dead {
            if let Some(enemy) = self.enemies.remove(*id) {
                self.occupancy.remove(enemy.pos);
            }
        }
        dead.len()
    }
}
