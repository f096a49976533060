//! Single player-versus-enemy encounter: action rounds, ripostes and settlement.
//! This module exists so combat math and its round loop are testable without a full game.
//! It does not own turn sequencing or the roster; the orchestrator decides what an outcome
//! means for positions and occupancy.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agent::Enemy;
use crate::config::CombatConfig;
use crate::content::WeaponClass;
use crate::error::GameError;
use crate::player::Player;
use crate::rng::RandomSource;
use crate::state::TileMap;
use crate::types::{LogEvent, Subject};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatAction {
    Melee,
    Ranged,
    Defend,
    UseItem(String),
    Flee,
}

/// Read-only view handed to whoever picks the next action.
pub struct EncounterView<'a> {
    pub player: &'a Player,
    pub enemy: &'a Enemy,
    pub round: u32,
}

/// The input boundary for combat rounds. Returning `None` aborts the step with
/// `GameError::MissingCombatInput`.
pub trait CombatCommander {
    fn choose(&mut self, view: &EncounterView<'_>) -> Option<CombatAction>;
}

/// Never retreats: melee while a blade is held or no bow is, otherwise the bow.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysAttack;

impl CombatCommander for AlwaysAttack {
    fn choose(&mut self, view: &EncounterView<'_>) -> Option<CombatAction> {
        Some(if view.player.melee.is_some() || view.player.ranged.is_none() {
            CombatAction::Melee
        } else {
            CombatAction::Ranged
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EncounterOutcome {
    Victory,
    Defeat,
    Escaped,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncounterResult {
    pub outcome: EncounterOutcome,
    pub rounds: u32,
    pub events: Vec<LogEvent>,
}

pub struct Encounter<'a> {
    pub player: &'a mut Player,
    pub enemy: &'a mut Enemy,
    pub map: &'a mut TileMap,
    pub config: &'a CombatConfig,
}

impl Encounter<'_> {
    /// Runs rounds until one side falls or the player gets away.
    pub fn resolve(
        mut self,
        rng: &mut impl RandomSource,
        commander: &mut impl CombatCommander,
    ) -> Result<EncounterResult, GameError> {
        let mut events = vec![LogEvent::Engaged { kind: self.enemy.kind }];
        let mut defending = false;
        let mut round = 0;

        while self.enemy.is_alive() && self.player.is_alive() {
            round += 1;
            let view = EncounterView { player: &*self.player, enemy: &*self.enemy, round };
            let action = commander.choose(&view).ok_or(GameError::MissingCombatInput)?;
            match action {
                CombatAction::Melee => self.player_strike(WeaponClass::Melee, rng, &mut events)?,
                CombatAction::Ranged if self.player.ranged.is_none() => {
                    events.push(LogEvent::NoRangedWeapon);
                }
                CombatAction::Ranged => self.player_strike(WeaponClass::Ranged, rng, &mut events)?,
                CombatAction::Defend => {
                    defending = true;
                    events.push(LogEvent::Braced);
                }
                CombatAction::UseItem(name) => events.extend(self.player.use_item(&name)?),
                CombatAction::Flee => {
                    if rng.chance(self.flee_chance()) {
                        events.push(LogEvent::FleeSucceeded);
                        debug!(kind = ?self.enemy.kind, round, "encounter escaped");
                        let outcome = EncounterOutcome::Escaped;
                        return Ok(EncounterResult { outcome, rounds: round, events });
                    }
                    events.push(LogEvent::FleeFailed);
                    continue;
                }
            }

            if !self.enemy.is_alive() {
                break;
            }
            self.riposte(defending, rng, &mut events)?;
            defending = false;
        }

        let outcome = if self.player.is_alive() {
            self.settle_victory(rng, &mut events)?;
            EncounterOutcome::Victory
        } else {
            events.push(LogEvent::PlayerCollapsed);
            EncounterOutcome::Defeat
        };
        debug!(kind = ?self.enemy.kind, rounds = round, ?outcome, "encounter resolved");
        Ok(EncounterResult { outcome, rounds: round, events })
    }

    fn flee_chance(&self) -> f64 {
        if self.enemy.boss { self.config.flee_chance / 2.0 } else { self.config.flee_chance }
    }

    fn player_strike(
        &mut self,
        class: WeaponClass,
        rng: &mut impl RandomSource,
        events: &mut Vec<LogEvent>,
    ) -> Result<(), GameError> {
        let base = match class {
            WeaponClass::Melee => self.player.attack()?,
            WeaponClass::Ranged => self.player.ranged_attack()?,
        };
        let mut amount = (base + rng.range_inclusive(0, 3)).max(1);
        let critical = rng.chance(self.config.base_crit_chance + self.player.crit_bonus(class)?);
        if critical {
            amount = amount * (100 + self.config.crit_bonus_percent) / 100;
        }
        if self.enemy.armor_block > 0 && rng.chance(f64::from(self.enemy.armor_block) / 100.0) {
            amount -= self.config.block_mitigation;
        }
        let damage = self.enemy.take_damage(amount);
        events.push(LogEvent::PlayerStruck {
            kind: self.enemy.kind,
            damage,
            critical,
            ranged: class == WeaponClass::Ranged,
        });

        if self.enemy.is_alive()
            && let Some((status, turns)) = self.player.weapon_inflicts(class)?
            && rng.chance(self.config.inflict_chance)
        {
            self.enemy.statuses.apply(status, turns);
            events.push(LogEvent::StatusInflicted { subject: Subject::Enemy(self.enemy.kind), status, turns });
        }
        if let Some(broke) = self.player.degrade_weapon(class) {
            events.push(broke);
        }
        Ok(())
    }

    fn riposte(
        &mut self,
        defending: bool,
        rng: &mut impl RandomSource,
        events: &mut Vec<LogEvent>,
    ) -> Result<(), GameError> {
        let strike = self.enemy.resolve_damage(rng);
        let mut mitigation = self.player.defense()?;
        if defending {
            mitigation += self.config.defend_bonus;
        }
        let blocked = rng.chance(f64::from(self.player.armor_block_chance()?) / 100.0);
        if blocked {
            mitigation += self.config.block_mitigation;
        }
        let damage = (strike.amount - mitigation).max(1);
        self.player.take_damage(damage);
        events.push(LogEvent::EnemyStruck {
            kind: self.enemy.kind,
            damage,
            critical: strike.critical,
            blocked,
        });
        if blocked && let Some(broke) = self.player.degrade_armor() {
            events.push(broke);
        }

        let drain = self.enemy.template().sanity_drain;
        if drain > 0 {
            self.player.drain_sanity(drain);
            events.push(LogEvent::SanityDrained { amount: drain });
        }
        if let Some((status, turns)) = strike.inflicted {
            self.player.apply_status(status, turns);
            events.push(LogEvent::StatusInflicted { subject: Subject::Player, status, turns });
        }
        Ok(())
    }

    /// XP first, then each loot item into the pack or onto the floor.
    fn settle_victory(&mut self, rng: &mut impl RandomSource, events: &mut Vec<LogEvent>) -> Result<(), GameError> {
        let loot = self.enemy.roll_loot(rng);
        events.extend(self.player.gain_xp(self.enemy.xp_reward));
        for item in loot {
            if self.player.inventory.add(&item, 1)? {
                events.push(LogEvent::Looted { item });
            } else {
                self.map.place_item(self.player.pos, &item);
                events.push(LogEvent::LootDropped { item });
            }
        }
        events.push(LogEvent::EnemyDefeated { kind: self.enemy.kind });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::rng::GameRng;
    use crate::game::test_support::{ScriptedCommander, ScriptedRng, open_map};
    use crate::types::{EnemyKind, Pos, StatusKind};

    fn fighters(kind: EnemyKind) -> (Player, Enemy, TileMap) {
        let pos = Pos { y: 2, x: 2 };
        let player = Player::new(pos).expect("starter kit");
        (player, Enemy::spawn(kind, Pos { y: 2, x: 3 }), open_map(6, 6))
    }

    #[test]
    fn flee_roll_under_threshold_escapes_without_loot() {
        let (mut player, mut enemy, mut map) = fighters(EnemyKind::Skeleton);
        let config = CombatConfig::default();
        let mut rng = ScriptedRng::new(&[0.2]);
        let mut commander = ScriptedCommander::new(vec![CombatAction::Flee]);
        let result = Encounter { player: &mut player, enemy: &mut enemy, map: &mut map, config: &config }
            .resolve(&mut rng, &mut commander)
            .unwrap();
        assert_eq!(result.outcome, EncounterOutcome::Escaped);
        assert_eq!(result.events.last(), Some(&LogEvent::FleeSucceeded));
        assert!(!result.events.iter().any(|e| matches!(e, LogEvent::Looted { .. } | LogEvent::GainedXp { .. })));
        assert_eq!(player.xp, 0);
        assert_eq!(enemy.hp, enemy.max_hp);
    }

    #[test]
    fn failed_flee_costs_the_round_but_no_blood() {
        let (mut player, mut enemy, mut map) = fighters(EnemyKind::Skeleton);
        let config = CombatConfig::default();
        let mut rng = ScriptedRng::new(&[0.9, 0.1]);
        let mut commander = ScriptedCommander::new(vec![CombatAction::Flee, CombatAction::Flee]);
        let result = Encounter { player: &mut player, enemy: &mut enemy, map: &mut map, config: &config }
            .resolve(&mut rng, &mut commander)
            .unwrap();
        assert_eq!(result.outcome, EncounterOutcome::Escaped);
        assert_eq!(result.rounds, 2);
        assert_eq!(player.hp, player.max_hp);
    }

    #[test]
    fn boss_halves_the_flee_chance() {
        let (mut player, mut enemy, mut map) = fighters(EnemyKind::EtherWarden);
        let config = CombatConfig::default();
        // 0.3 escapes a regular foe but not the warden; second flee at 0.1 succeeds.
        let mut rng = ScriptedRng::new(&[0.3, 0.1]);
        let mut commander = ScriptedCommander::new(vec![CombatAction::Flee, CombatAction::Flee]);
        let result = Encounter { player: &mut player, enemy: &mut enemy, map: &mut map, config: &config }
            .resolve(&mut rng, &mut commander)
            .unwrap();
        assert_eq!(result.events[1], LogEvent::FleeFailed);
        assert_eq!(result.outcome, EncounterOutcome::Escaped);
    }

    #[test]
    fn defend_adds_mitigation_to_the_next_riposte_only() {
        let (mut player, mut enemy, mut map) = fighters(EnemyKind::Skeleton);
        enemy.hp = 1_000;
        let config = CombatConfig::default();
        // Riposte: spread 0.25 -> +0, no crit, no block, no inflict table.
        let mut rng = ScriptedRng::new(&[0.25, 0.99, 0.99]);
        let mut commander = ScriptedCommander::new(vec![CombatAction::Defend]);
        Encounter { player: &mut player, enemy: &mut enemy, map: &mut map, config: &config }
            .resolve(&mut rng, &mut commander)
            .unwrap_err();
        // attack 6 - (defense 1 + defend 2) = 3.
        assert_eq!(player.hp, player.max_hp - 3);
    }

    #[test]
    fn missing_commander_input_is_an_error() {
        let (mut player, mut enemy, mut map) = fighters(EnemyKind::Rat);
        let config = CombatConfig::default();
        let mut rng = ScriptedRng::new(&[0.5]);
        let mut commander = ScriptedCommander::new(vec![]);
        let err = Encounter { player: &mut player, enemy: &mut enemy, map: &mut map, config: &config }
            .resolve(&mut rng, &mut commander)
            .unwrap_err();
        assert_eq!(err, GameError::MissingCombatInput);
    }

    #[test]
    fn victory_grants_xp_and_drops_overflow_loot() {
        let (mut player, mut enemy, mut map) = fighters(EnemyKind::Rat);
        player.inventory.capacity = player.inventory.stacks().count();
        enemy.hp = 1;
        let config = CombatConfig::default();
        // Spread 0, no crit, meat drop hits.
        let mut rng = ScriptedRng::new(&[0.0, 0.99, 0.0]);
        let mut commander = ScriptedCommander::new(vec![CombatAction::Melee]);
        let result = Encounter { player: &mut player, enemy: &mut enemy, map: &mut map, config: &config }
            .resolve(&mut rng, &mut commander)
            .unwrap();
        assert_eq!(result.outcome, EncounterOutcome::Victory);
        assert_eq!(player.xp, 6);
        assert!(result.events.contains(&LogEvent::LootDropped { item: "Meat".into() }));
        assert_eq!(map.items.get(&player.pos), Some(&vec!["Meat".to_string()]));
        assert_eq!(result.events.last(), Some(&LogEvent::EnemyDefeated { kind: EnemyKind::Rat }));
    }

    #[test]
    fn ghost_hits_drain_sanity_and_may_frighten() {
        let (mut player, mut enemy, mut map) = fighters(EnemyKind::Ghost);
        enemy.hp = 1_000;
        let config = CombatConfig::default();
        // Riposte: spread, no crit, inflict roll hits, choose fear, no block.
        let mut rng = ScriptedRng::new(&[0.5, 0.99, 0.0, 0.0, 0.99]);
        let mut commander = ScriptedCommander::new(vec![CombatAction::Defend]);
        let _ = Encounter { player: &mut player, enemy: &mut enemy, map: &mut map, config: &config }
            .resolve(&mut rng, &mut commander);
        assert_eq!(player.sanity, player.max_sanity - 2);
        assert!(player.statuses.contains(StatusKind::Fear));
    }

    proptest! {
        #[test]
        fn strikes_always_land_for_at_least_one(seed in any::<u64>()) {
            let (mut player, mut enemy, mut map) = fighters(EnemyKind::EtherWarden);
            player.base_attack = -20;
            enemy.hp = 10_000;
            let config = CombatConfig::default();
            let mut rng = GameRng::seed_from_u64(seed);
            let mut encounter = Encounter { player: &mut player, enemy: &mut enemy, map: &mut map, config: &config };
            let mut events = Vec::new();
            encounter.player_strike(WeaponClass::Melee, &mut rng, &mut events).unwrap();
            encounter.riposte(true, &mut rng, &mut events).unwrap();
            for event in &events {
                match event {
                    LogEvent::PlayerStruck { damage, .. } | LogEvent::EnemyStruck { damage, .. } => {
                        prop_assert!(*damage >= 1)
                    }
                    _ => {}
                }
            }
        }
    }
}
