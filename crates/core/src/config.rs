//! Tunable generation and combat constants.
//! Defaults reproduce the classic rules; callers may load overrides from any serde format.

use std::hash::Hasher;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map: MapgenConfig,
    pub combat: CombatConfig,
}

impl GameConfig {
    /// Digest of every tunable. Journals record it so a replay can refuse foreign rules.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        let map = &self.map;
        for value in [map.width, map.height, map.room_min_size, map.room_max_size, map.start_reveal_radius] {
            hasher.write_i32(value);
        }
        hasher.write_u32(map.max_rooms);
        hasher.write_u32(map.boss_interval);
        hasher.write_u64(map.item_chance.to_bits());
        hasher.write_u64(map.spawn_chance.to_bits());

        let combat = &self.combat;
        for chance in [combat.flee_chance, combat.inflict_chance, combat.base_crit_chance, combat.event_chance] {
            hasher.write_u64(chance.to_bits());
        }
        for value in [combat.crit_bonus_percent, combat.defend_bonus, combat.block_mitigation] {
            hasher.write_i32(value);
        }
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapgenConfig {
    pub width: i32,
    pub height: i32,
    pub max_rooms: u32,
    pub room_min_size: i32,
    pub room_max_size: i32,
    pub item_chance: f64,
    pub spawn_chance: f64,
    pub start_reveal_radius: i32,
    /// Every n-th floor hosts a boss on its stairs. Zero disables bosses.
    pub boss_interval: u32,
}

impl Default for MapgenConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 40,
            max_rooms: 12,
            room_min_size: 5,
            room_max_size: 9,
            item_chance: 0.35,
            spawn_chance: 0.6,
            start_reveal_radius: 6,
            boss_interval: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub flee_chance: f64,
    pub inflict_chance: f64,
    pub base_crit_chance: f64,
    /// Extra damage on a critical hit, in percent.
    pub crit_bonus_percent: i32,
    pub defend_bonus: i32,
    pub block_mitigation: i32,
    pub event_chance: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            flee_chance: 0.45,
            inflict_chance: 0.25,
            base_crit_chance: 0.05,
            crit_bonus_percent: 50,
            defend_bonus: 2,
            block_mitigation: 3,
            event_chance: 0.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let cfg: GameConfig =
            serde_json::from_str(r#"{ "map": { "max_rooms": 3 }, "combat": { "flee_chance": 1.0 } }"#)
                .expect("config should parse");
        assert_eq!(cfg.map.max_rooms, 3);
        assert_eq!(cfg.map.width, 40);
        assert_eq!(cfg.combat.flee_chance, 1.0);
        assert_eq!(cfg.combat.defend_bonus, 2);
    }

    #[test]
    fn fingerprint_tracks_every_section() {
        let base = GameConfig::default();
        assert_eq!(base.fingerprint(), GameConfig::default().fingerprint());

        let mut denser = base.clone();
        denser.map.spawn_chance = 0.9;
        let mut gentler = base.clone();
        gentler.combat.defend_bonus = 5;
        assert_ne!(denser.fingerprint(), base.fingerprint());
        assert_ne!(gentler.fingerprint(), base.fingerprint());
        assert_ne!(denser.fingerprint(), gentler.fingerprint());
    }
}
