//! Per-enemy turn policy: awareness, status, personality, flanking and pursuit.
//! This module exists so one enemy's decision is a pure function of map, target and occupancy.
//! It does not own combat; a contact is reported back to the turn orchestrator.

use tracing::trace;

use crate::agent::{Enemy, manhattan};
use crate::rng::RandomSource;
use crate::state::{Occupancy, TileMap};
use crate::status::tick_statuses;
use crate::types::{LogEvent, Personality, Pos};

use super::pathfinding::{neighbors, next_step};

pub const CAUTIOUS_RETREAT_CHANCE: f64 = 0.5;
pub const AMBUSH_RANGE: i32 = 3;
pub const FLANK_RANGE: i32 = 2;
pub const FLANK_CHANCE: f64 = 0.3;

const DIAGONALS: [(i32, i32); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AiTurn {
    pub events: Vec<LogEvent>,
    /// The enemy stepped onto the target's tile.
    pub contact: bool,
    /// Tile held just before the final pursuit step.
    pub came_from: Option<Pos>,
}

impl Enemy {
    /// One decision for this enemy. Occupancy changes are applied immediately so
    /// enemies processed later in the same world turn see the new position.
    pub fn take_turn(
        &mut self,
        map: &TileMap,
        target: Pos,
        occupancy: &mut Occupancy,
        rng: &mut impl RandomSource,
    ) -> AiTurn {
        let mut turn = AiTurn::default();
        if !self.awakened {
            if self.distance(target) <= 1 {
                self.awakened = true;
                turn.events.push(LogEvent::EnemyRevealed { kind: self.kind });
            }
            return turn;
        }

        let tick = tick_statuses(self);
        turn.events.extend(tick.events);
        if tick.frozen || tick.fatal.is_some() {
            return turn;
        }

        if self.personality == Personality::Cautious
            && self.hp * 2 < self.max_hp
            && rng.chance(CAUTIOUS_RETREAT_CHANCE)
            && let Some(away) = self.retreat_tile(map, target, occupancy)
            && occupancy.relocate(self.pos, away)
        {
            trace!(kind = ?self.kind, from = ?self.pos, to = ?away, "enemy retreats");
            self.pos = away;
            turn.events.push(LogEvent::EnemyRetreated { kind: self.kind });
            return turn;
        }

        if self.personality == Personality::Ambusher && self.distance(target) > AMBUSH_RANGE {
            return turn;
        }

        if self.flanks && self.distance(target) <= FLANK_RANGE && rng.chance(FLANK_CHANCE) {
            self.flank(map, target, occupancy, rng);
        }

        if self.distance(target) > self.aggression_radius {
            return turn;
        }

        if let Some(step) = next_step(map, self.pos, target, occupancy, self.can_phase)
            && step != self.pos
            && occupancy.relocate(self.pos, step)
        {
            turn.came_from = Some(self.pos);
            self.pos = step;
            if step == target {
                turn.contact = true;
                turn.events.push(LogEvent::EnemyLunged { kind: self.kind });
            }
        }
        turn
    }

    /// Free neighbor strictly farther from `target` than the current tile, farthest first.
    fn retreat_tile(&self, map: &TileMap, target: Pos, occupancy: &Occupancy) -> Option<Pos> {
        let here = self.distance(target);
        let mut best: Option<(i32, Pos)> = None;
        for next in neighbors(self.pos) {
            if !map.is_walkable(next) || occupancy.contains(next) || next == target {
                continue;
            }
            let dist = manhattan(next, target);
            if dist > here && best.is_none_or(|(best_dist, _)| dist > best_dist) {
                best = Some((dist, next));
            }
        }
        best.map(|(_, pos)| pos)
    }

    /// Sidesteps onto a random free diagonal. Never onto the target itself.
    fn flank(&mut self, map: &TileMap, target: Pos, occupancy: &mut Occupancy, rng: &mut impl RandomSource) {
        let mut options: Vec<Pos> =
            DIAGONALS.iter().map(|&(dx, dy)| Pos { y: self.pos.y + dy, x: self.pos.x + dx }).collect();
        rng.shuffle(&mut options);
        for option in options {
            if option == target || !map.is_walkable(option) || occupancy.contains(option) {
                continue;
            }
            if occupancy.relocate(self.pos, option) {
                trace!(kind = ?self.kind, from = ?self.pos, to = ?option, "enemy flanks");
                self.pos = option;
                return;
            }
        }
    }
}
