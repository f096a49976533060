//! Room placement and corridor carving for the base floor topology.

use serde::{Deserialize, Serialize};

use crate::config::MapgenConfig;
use crate::rng::RandomSource;
use crate::state::TileMap;
use crate::types::{Pos, TileKind};

/// Inclusive axis-aligned rectangle of floor tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Room {
    pub fn center(&self) -> Pos {
        Pos { y: (self.y1 + self.y2) / 2, x: (self.x1 + self.x2) / 2 }
    }

    /// Touching edges count as overlap; rooms never share a wall line.
    pub fn intersects(&self, other: &Room) -> bool {
        !(self.x2 < other.x1 || self.x1 > other.x2 || self.y2 < other.y1 || self.y1 > other.y2)
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x >= self.x1 && pos.x <= self.x2 && pos.y >= self.y1 && pos.y <= self.y2
    }

    pub fn tiles(&self) -> impl Iterator<Item = Pos> + '_ {
        (self.y1..=self.y2).flat_map(move |y| (self.x1..=self.x2).map(move |x| Pos { y, x }))
    }
}

/// Tries `2 * max_rooms` placements and carves each accepted room plus a corridor back to
/// its predecessor.
pub(super) fn place_rooms(
    map: &mut TileMap,
    config: &MapgenConfig,
    rng: &mut impl RandomSource,
) -> Vec<Room> {
    let mut rooms: Vec<Room> = Vec::new();
    for _ in 0..config.max_rooms * 2 {
        let w = rng.range_inclusive(config.room_min_size, config.room_max_size);
        let h = rng.range_inclusive(config.room_min_size, config.room_max_size);
        let (max_x, max_y) = (map.width - w - 2, map.height - h - 2);
        if max_x < 1 || max_y < 1 {
            continue;
        }
        let x = rng.range_inclusive(1, max_x);
        let y = rng.range_inclusive(1, max_y);
        let room = Room { x1: x, y1: y, x2: x + w, y2: y + h };
        if rooms.iter().any(|other| room.intersects(other)) {
            continue;
        }
        carve_room(map, &room, TileKind::Floor);
        if let Some(prev) = rooms.last() {
            carve_corridor(map, prev.center(), room.center(), rng);
        }
        rooms.push(room);
    }

    if rooms.is_empty() {
        let fallback = Room { x1: 1, y1: 1, x2: map.width / 2, y2: map.height / 2 };
        carve_room(map, &fallback, TileKind::Floor);
        rooms.push(fallback);
    }
    rooms
}

pub(super) fn carve_room(map: &mut TileMap, room: &Room, tile: TileKind) {
    for pos in room.tiles() {
        map.set_tile(pos, tile);
    }
}

/// L-shaped: horizontal-then-vertical or vertical-then-horizontal on a coin flip.
pub(super) fn carve_corridor(map: &mut TileMap, from: Pos, to: Pos, rng: &mut impl RandomSource) {
    if rng.chance(0.5) {
        carve_horizontal(map, from.x, to.x, from.y);
        carve_vertical(map, from.y, to.y, to.x);
    } else {
        carve_vertical(map, from.y, to.y, from.x);
        carve_horizontal(map, from.x, to.x, to.y);
    }
}

fn carve_horizontal(map: &mut TileMap, x1: i32, x2: i32, y: i32) {
    for x in x1.min(x2)..=x1.max(x2) {
        map.set_tile(Pos { y, x }, TileKind::Floor);
    }
}

fn carve_vertical(map: &mut TileMap, y1: i32, y2: i32, x: i32) {
    for y in y1.min(y2)..=y1.max(y2) {
        map.set_tile(Pos { y, x }, TileKind::Floor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_support::ScriptedRng;

    #[test]
    fn rooms_sharing_an_edge_intersect() {
        let a = Room { x1: 1, y1: 1, x2: 5, y2: 5 };
        let b = Room { x1: 5, y1: 3, x2: 9, y2: 7 };
        let c = Room { x1: 6, y1: 1, x2: 9, y2: 4 };
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert_eq!(a.center(), Pos { y: 3, x: 3 });
        assert_eq!(a.tiles().count(), 25);
    }

    #[test]
    fn corridor_links_both_centers() {
        for coin in [0.1, 0.9] {
            let mut map = TileMap::new(12, 12, 1);
            let mut rng = ScriptedRng::new(&[coin]);
            let (from, to) = (Pos { y: 2, x: 2 }, Pos { y: 8, x: 9 });
            carve_corridor(&mut map, from, to, &mut rng);
            assert!(map.is_walkable(from));
            assert!(map.is_walkable(to));
            let corner = if coin < 0.5 { Pos { y: 2, x: 9 } } else { Pos { y: 8, x: 2 } };
            assert!(map.is_walkable(corner));
        }
    }

    #[test]
    fn cramped_map_falls_back_to_single_room() {
        let mut map = TileMap::new(8, 8, 1);
        let config = MapgenConfig { room_min_size: 9, room_max_size: 9, ..MapgenConfig::default() };
        let mut rng = ScriptedRng::new(&[0.5]);
        let rooms = place_rooms(&mut map, &config, &mut rng);
        assert_eq!(rooms, vec![Room { x1: 1, y1: 1, x2: 4, y2: 4 }]);
        assert!(map.is_walkable(Pos { y: 4, x: 4 }));
    }
}
