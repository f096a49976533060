//! Deterministic single-step pursuit search over the 4-neighborhood.
//! This module exists so enemy movement shares one occupancy-aware BFS.
//! It does not own movement itself; callers apply the step and update occupancy.

use std::collections::{BTreeMap, VecDeque};

use crate::state::{Occupancy, TileMap};
use crate::types::{Direction, Pos};

/// Expansion order: +x, -x, +y, -y.
pub fn neighbors(pos: Pos) -> impl Iterator<Item = Pos> {
    Direction::ALL.into_iter().map(move |dir| pos.offset(dir))
}

/// First step from `start` toward `target`, or `None` when no admissible route exists.
///
/// A tile is admitted when it is in bounds, passable (any in-bounds tile when `allow_phase`),
/// not yet visited, and either unoccupied or the target itself.
pub fn next_step(
    map: &TileMap,
    start: Pos,
    target: Pos,
    occupied: &Occupancy,
    allow_phase: bool,
) -> Option<Pos> {
    if start == target {
        return Some(start);
    }
    let mut came_from: BTreeMap<Pos, Pos> = BTreeMap::new();
    let mut queue = VecDeque::from([start]);
    let mut reached = false;
    while let Some(current) = queue.pop_front() {
        if current == target {
            reached = true;
            break;
        }
        for next in neighbors(current) {
            if next == start || came_from.contains_key(&next) {
                continue;
            }
            if !map.in_bounds(next) || !(allow_phase || map.is_walkable(next)) {
                continue;
            }
            if occupied.contains(next) && next != target {
                continue;
            }
            came_from.insert(next, current);
            queue.push_back(next);
        }
    }
    if !reached {
        return None;
    }

    let mut step = target;
    while let Some(&prev) = came_from.get(&step) {
        if prev == start {
            return Some(step);
        }
        step = prev;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::test_support::{corridor_map, open_map};
    use crate::types::TileKind;

    #[test]
    fn open_floor_steps_straight_toward_target() {
        let map = open_map(10, 10);
        let step = next_step(&map, Pos { y: 2, x: 2 }, Pos { y: 2, x: 5 }, &Occupancy::default(), false);
        assert_eq!(step, Some(Pos { y: 2, x: 3 }));
    }

    #[test]
    fn start_equal_to_target_returns_start() {
        let map = open_map(5, 5);
        let here = Pos { y: 1, x: 1 };
        assert_eq!(next_step(&map, here, here, &Occupancy::default(), false), Some(here));
    }

    #[test]
    fn tie_breaks_follow_neighbor_order() {
        let map = open_map(10, 10);
        // Diagonal target: +x is expanded before +y.
        let step = next_step(&map, Pos { y: 2, x: 2 }, Pos { y: 4, x: 4 }, &Occupancy::default(), false);
        assert_eq!(step, Some(Pos { y: 2, x: 3 }));
    }

    #[test]
    fn occupied_corridor_blocks_but_occupied_target_does_not() {
        let map = corridor_map(8);
        let start = Pos { y: 1, x: 1 };
        let blocker = Pos { y: 1, x: 3 };
        let occupied: Occupancy = [blocker].into_iter().collect();
        assert_eq!(next_step(&map, start, Pos { y: 1, x: 6 }, &occupied, false), None);
        assert_eq!(next_step(&map, start, blocker, &occupied, false), Some(Pos { y: 1, x: 2 }));
    }

    #[test]
    fn phasing_crosses_walls_but_not_the_map_edge() {
        let mut map = open_map(7, 3);
        for y in 0..3 {
            map.set_tile(Pos { y, x: 3 }, TileKind::Wall);
        }
        let (start, target) = (Pos { y: 1, x: 1 }, Pos { y: 1, x: 5 });
        assert_eq!(next_step(&map, start, target, &Occupancy::default(), false), None);
        assert_eq!(next_step(&map, start, target, &Occupancy::default(), true), Some(Pos { y: 1, x: 2 }));
        assert_eq!(
            next_step(&map, Pos { y: 0, x: 0 }, Pos { y: 0, x: 6 }, &Occupancy::default(), true),
            Some(Pos { y: 0, x: 1 })
        );
    }

    #[test]
    fn boxed_in_agent_has_no_step() {
        let map = open_map(5, 5);
        let start = Pos { y: 2, x: 2 };
        let occupied: Occupancy = neighbors(start).collect();
        assert_eq!(next_step(&map, start, Pos { y: 0, x: 0 }, &occupied, false), None);
    }
}
