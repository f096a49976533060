//! Procedural level generation split into layout, spawn and orchestration submodules.

mod generator;
mod layout;
mod spawns;

pub use generator::LevelGenerator;
pub use layout::Room;

use crate::config::MapgenConfig;
use crate::rng::GameRng;
use crate::state::TileMap;

/// First floor of a fresh run under the default rules.
pub fn generate_level(seed: u64) -> TileMap {
    let mut rng = GameRng::seed_from_u64(seed);
    LevelGenerator::new(MapgenConfig::default()).generate(1, &mut rng)
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, VecDeque};

    use proptest::prelude::*;

    use super::*;
    use crate::types::{Direction, Pos, TileKind};

    fn reachable_from(map: &TileMap, start: Pos) -> BTreeSet<Pos> {
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(pos) = queue.pop_front() {
            for dir in Direction::ALL {
                let next = pos.offset(dir);
                if map.is_walkable(next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    #[test]
    fn generate_level_matches_generator_output() {
        let from_helper = generate_level(123);
        let mut rng = GameRng::seed_from_u64(123);
        let from_generator = LevelGenerator::new(MapgenConfig::default()).generate(1, &mut rng);
        assert_eq!(from_helper, from_generator);
        assert_eq!(from_helper.fingerprint(), from_generator.fingerprint());
    }

    #[test]
    fn stairs_tile_survives_special_room_marking() {
        for seed in 0..32 {
            let map = generate_level(seed);
            assert_eq!(map.tile_at(map.stairs), TileKind::Stairs, "seed {seed}");
            if map.rooms.len() >= 2 {
                let safe = map.safe_room.expect("two rooms designate a safe room");
                assert!(safe.tiles().any(|pos| map.tile_at(pos) == TileKind::Safe));
            }
        }
    }

    #[test]
    fn cramped_boss_floors_never_seat_an_enemy_on_the_start() {
        let cramped = MapgenConfig { width: 8, height: 8, boss_interval: 1, ..MapgenConfig::default() };
        let generator = LevelGenerator::new(cramped);
        for seed in 0..32 {
            let map = generator.generate(1, &mut GameRng::seed_from_u64(seed));
            let occupied: BTreeSet<Pos> = map.enemy_spawns.iter().map(|&(_, pos)| pos).collect();
            assert_eq!(occupied.len(), map.enemy_spawns.len(), "seed {seed}");
            assert!(!occupied.contains(&map.start), "seed {seed}");
        }
    }

    #[test]
    fn start_area_is_revealed() {
        let map = generate_level(5);
        assert!(map.is_revealed(map.start));
        assert!(map.is_visible(map.start));
    }

    proptest! {
        #[test]
        fn every_room_center_is_reachable_from_start(seed in any::<u64>()) {
            let map = generate_level(seed);
            let reachable = reachable_from(&map, map.start);
            for room in &map.rooms {
                prop_assert!(reachable.contains(&room.center()));
            }
        }

        #[test]
        fn start_and_stairs_are_in_bounds_and_walkable(seed in any::<u64>()) {
            let map = generate_level(seed);
            prop_assert!(map.in_bounds(map.start) && map.is_walkable(map.start));
            prop_assert!(map.in_bounds(map.stairs) && map.is_walkable(map.stairs));
            for (_, pos) in &map.enemy_spawns {
                prop_assert!(map.is_walkable(*pos));
                prop_assert_ne!(*pos, map.start);
            }
        }
    }
}
