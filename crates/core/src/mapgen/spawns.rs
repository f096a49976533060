//! Item scatter and enemy spawn-table rolls for generated floors.

use std::collections::BTreeSet;

use crate::config::MapgenConfig;
use crate::content::{enemy_template, keys, scatter_candidates};
use crate::rng::RandomSource;
use crate::state::TileMap;
use crate::types::{EnemyKind, Pos};

use super::layout::Room;

/// One roll per room at its center, then the guaranteed light and food at the start.
pub(super) fn scatter_items(
    map: &mut TileMap,
    rooms: &[Room],
    config: &MapgenConfig,
    rng: &mut impl RandomSource,
) {
    let candidates: Vec<&'static str> = scatter_candidates().map(|def| def.name).collect();
    for room in rooms {
        if rng.chance(config.item_chance)
            && let Some(&name) = rng.choose(&candidates)
        {
            map.place_item(room.center(), name);
        }
    }
    let start = map.start;
    map.place_item(start, keys::TORCH);
    map.place_item(start, keys::BREAD);
}

/// Every room but the first may hold one or two enemies drawn from the weighted table.
/// Boss floors seat the boss first. Coordinates are never shared, and never the start.
pub(super) fn roll_enemy_spawns(
    map: &TileMap,
    rooms: &[Room],
    config: &MapgenConfig,
    rng: &mut impl RandomSource,
) -> Vec<(EnemyKind, Pos)> {
    let mut spawns = Vec::new();
    let mut taken = BTreeSet::new();
    if is_boss_floor(map.floor, config)
        && let Some(seat) = boss_seat(map, rooms)
    {
        spawns.push((EnemyKind::EtherWarden, seat));
        taken.insert(seat);
    }

    let weights: Vec<u32> =
        EnemyKind::SPAWNABLE.iter().map(|&kind| enemy_template(kind).spawn_weight).collect();
    for room in rooms.iter().skip(1) {
        if !rng.chance(config.spawn_chance) {
            continue;
        }
        let count = rng.range_inclusive(1, 2);
        for _ in 0..count {
            let x = rng.range_inclusive(room.x1, room.x2);
            let y = rng.range_inclusive(room.y1, room.y2);
            let Some(kind_idx) = rng.weighted_index(&weights) else {
                continue;
            };
            let pos = Pos { y, x };
            if pos == map.start || !map.is_walkable(pos) || !taken.insert(pos) {
                continue;
            }
            spawns.push((EnemyKind::SPAWNABLE[kind_idx], pos));
        }
    }
    spawns
}

/// The stairs, unless they double as the start (single-room floors). Then the first other
/// walkable tile of the last room, if there is one.
fn boss_seat(map: &TileMap, rooms: &[Room]) -> Option<Pos> {
    if map.stairs != map.start {
        return Some(map.stairs);
    }
    rooms.last()?.tiles().find(|&pos| pos != map.start && map.is_walkable(pos))
}

pub(super) fn is_boss_floor(floor: u32, config: &MapgenConfig) -> bool {
    config.boss_interval > 0 && floor > 0 && floor % config.boss_interval == 0
}
