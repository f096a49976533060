//! Stable snapshot hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from simulation control code.
//! It does not own replay execution or journal persistence policies.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::*;
use crate::status::StatusEffects;

impl Game {
    /// Digest of everything a replay must reproduce: turn counter, floor layout,
    /// player vitals and pack, the roster and world timers.
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.turn);
        hasher.write_u64(self.state.map.fingerprint());
        hasher.write_usize(self.state.map.revealed_count());

        let player = &self.state.player;
        write_pos(&mut hasher, player.pos);
        for stat in [
            player.hp,
            player.max_hp,
            player.stamina,
            player.sanity,
            player.hunger,
            player.fatigue,
            player.base_attack,
            player.base_defense,
            player.light_bonus,
            player.karma,
        ] {
            hasher.write_i32(stat);
        }
        hasher.write_u32(player.level);
        hasher.write_u32(player.xp);
        hasher.write_u32(player.skill_points);
        hasher.write_u32(player.light_timer);
        for slot in [&player.melee, &player.ranged, &player.armor] {
            match slot {
                Some(equipped) => {
                    hasher.write(equipped.item.as_bytes());
                    hasher.write_u32(equipped.durability);
                }
                None => hasher.write_u8(0),
            }
        }
        for (name, count) in player.inventory.stacks() {
            hasher.write(name.as_bytes());
            hasher.write_u32(count);
        }
        for (name, left) in &player.spare_wear {
            hasher.write(name.as_bytes());
            hasher.write_u32(*left);
        }
        write_statuses(&mut hasher, &player.statuses);

        for (_, enemy) in &self.state.enemies {
            hasher.write_u8(enemy.kind as u8);
            write_pos(&mut hasher, enemy.pos);
            hasher.write_i32(enemy.hp);
            hasher.write_i32(enemy.aggression_radius);
            hasher.write_u8(u8::from(enemy.awakened));
            write_statuses(&mut hasher, &enemy.statuses);
        }
        hasher.write_u32(self.world.storm_timer);
        hasher.write_u8(match self.outcome {
            None => 0,
            Some(RunOutcome::Defeat(DeathCause::Wounds)) => 1,
            Some(RunOutcome::Defeat(DeathCause::Madness)) => 2,
        });
        hasher.finish()
    }
}

fn write_pos(hasher: &mut Xxh3, pos: Pos) {
    hasher.write_i32(pos.x);
    hasher.write_i32(pos.y);
}

fn write_statuses(hasher: &mut Xxh3, statuses: &StatusEffects) {
    for kind in StatusKind::ALL {
        hasher.write_u8(statuses.remaining(kind));
    }
}
