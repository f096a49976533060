//! Generation orchestration: layout, special rooms, scatter, spawns and the opening reveal.

use tracing::debug;

use crate::config::MapgenConfig;
use crate::rng::RandomSource;
use crate::state::TileMap;
use crate::types::TileKind;

use super::layout::{carve_room, place_rooms};
use super::spawns::{roll_enemy_spawns, scatter_items};

pub struct LevelGenerator {
    config: MapgenConfig,
}

impl LevelGenerator {
    pub fn new(config: MapgenConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapgenConfig {
        &self.config
    }

    /// Never fails: a map with no room for placements still gets one fallback room.
    pub fn generate(&self, floor: u32, rng: &mut impl RandomSource) -> TileMap {
        let mut map = TileMap::new(self.config.width, self.config.height, floor);
        let rooms = place_rooms(&mut map, &self.config, rng);

        if rooms.len() >= 2 {
            let safe = rooms[rooms.len() / 2];
            carve_room(&mut map, &safe, TileKind::Safe);
            map.safe_room = Some(safe);
        }
        if rooms.len() >= 3 {
            let treasure = rooms[rooms.len() - 2];
            carve_room(&mut map, &treasure, TileKind::Treasure);
            map.treasure_room = Some(treasure);
        }

        // Stairs go down after the room overwrites so a special last room cannot erase them.
        if let (Some(first), Some(last)) = (rooms.first(), rooms.last()) {
            map.start = first.center();
            map.stairs = last.center();
        }
        map.set_tile(map.stairs, TileKind::Stairs);
        map.rooms = rooms;

        let rooms = map.rooms.clone();
        scatter_items(&mut map, &rooms, &self.config, rng);
        map.enemy_spawns = roll_enemy_spawns(&map, &rooms, &self.config, rng);
        map.reveal_around(map.start, self.config.start_reveal_radius);

        debug!(
            floor,
            rooms = map.rooms.len(),
            spawns = map.enemy_spawns.len(),
            fingerprint = map.fingerprint(),
            "generated level"
        );
        map
    }
}
