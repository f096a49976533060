//! One world turn: player action, upkeep, the enemy phase, pruning and world timers.
//! This module exists so the ordering of a turn is written down in exactly one place.
//! It does not own enemy policy or combat math; it sequences them and repairs occupancy
//! around encounters.

use serde::{Deserialize, Serialize};

use super::*;
use crate::agent::Enemy;
use crate::error::ContentError;
use crate::state::{Occupancy, TileMap};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Move(Direction),
    Rest,
    UseItem(String),
    /// Recipe name, as listed by `content::all_recipes`.
    Craft(String),
    Descend,
    Wait,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnReport {
    pub turn: u64,
    pub events: Vec<LogEvent>,
    pub outcome: Option<RunOutcome>,
}

impl Game {
    /// Advances the world by one player command. Combat rounds started this turn draw
    /// their actions from `commander`.
    pub fn step(
        &mut self,
        command: Command,
        commander: &mut impl CombatCommander,
    ) -> Result<TurnReport, GameError> {
        if self.outcome.is_some() {
            return Err(GameError::RunFinished);
        }
        let mut events = Vec::new();

        // A frozen player loses the action; the upkeep tick reports it.
        let mut descended = false;
        if !self.state.player.statuses.contains(StatusKind::Freeze) {
            match command {
                Command::Move(direction) => self.player_move(direction, commander, &mut events)?,
                Command::Rest => {
                    events.push(self.state.player.rest());
                    self.roll_world_event(&mut events);
                }
                Command::UseItem(name) => events.extend(self.state.player.use_item(&name)?),
                Command::Craft(recipe) => events.push(self.state.player.craft(&recipe)?),
                Command::Descend => descended = self.descend(&mut events),
                Command::Wait => events.push(LogEvent::Waited),
            }
        }
        self.turn += 1;

        if self.state.player.is_alive() {
            let tick = self.state.player.upkeep()?;
            events.extend(tick.events);
        }
        if !descended && self.state.player.is_alive() {
            self.enemy_phase(commander, &mut events)?;
        }
        self.state.prune_dead();
        self.world.tick();
        let radius = self.state.player.vision_radius(self.world.is_darkened());
        self.state.map.reveal_around(self.state.player.pos, radius);

        Ok(self.finish_turn(events))
    }

    fn player_move(
        &mut self,
        direction: Direction,
        commander: &mut impl CombatCommander,
        events: &mut Vec<LogEvent>,
    ) -> Result<(), GameError> {
        let target = self.state.player.pos.offset(direction);
        if let Some(id) = self.state.enemy_at(target) {
            return self.engage(id, None, commander, events);
        }
        if !self.state.map.is_walkable(target) {
            events.push(LogEvent::BumpedWall);
            return Ok(());
        }
        self.state.player.pos = target;
        events.push(LogEvent::Moved);
        let radius = self.state.player.vision_radius(self.world.is_darkened());
        self.state.map.reveal_around(target, radius);
        gather_items(&mut self.state.map, &mut self.state.player, events)?;
        self.roll_world_event(events);
        Ok(())
    }

    fn roll_world_event(&mut self, events: &mut Vec<LogEvent>) {
        let chance = self.config.combat.event_chance;
        events.extend(self.world.maybe_trigger(&mut self.state.player, chance, &mut self.rng));
    }

    fn descend(&mut self, events: &mut Vec<LogEvent>) -> bool {
        if self.state.map.tile_at(self.state.player.pos) != TileKind::Stairs {
            events.push(LogEvent::NoStairs);
            return false;
        }
        let floor = self.state.map.floor + 1;
        let map = self.generator.generate(floor, &mut self.rng);
        self.state = GameState::install_floor(map, self.state.player.clone());
        debug!(floor, enemies = self.state.enemies.len(), "floor installed");
        events.push(LogEvent::Descended { floor });
        true
    }

    /// Every living enemy acts once, in roster order. Each move is visible to the
    /// enemies after it.
    fn enemy_phase(
        &mut self,
        commander: &mut impl CombatCommander,
        events: &mut Vec<LogEvent>,
    ) -> Result<(), GameError> {
        for id in self.state.roster() {
            if !self.state.player.is_alive() {
                break;
            }
            let target = self.state.player.pos;
            let Some(enemy) = self.state.enemies.get_mut(id) else {
                continue;
            };
            if !enemy.is_alive() {
                continue;
            }
            let turn = enemy.take_turn(&self.state.map, target, &mut self.state.occupancy, &mut self.rng);
            events.extend(turn.events);
            if turn.contact {
                self.engage(id, turn.came_from, commander, events)?;
            }
        }
        Ok(())
    }

    /// Runs an encounter against `id`. `came_from` is set when the enemy walked onto the
    /// player's tile; an escape sends it back there.
    fn engage(
        &mut self,
        id: EnemyId,
        came_from: Option<Pos>,
        commander: &mut impl CombatCommander,
        events: &mut Vec<LogEvent>,
    ) -> Result<(), GameError> {
        let Some(enemy) = self.state.enemies.get_mut(id) else {
            return Ok(());
        };
        enemy.awakened = true;
        let result = Encounter {
            player: &mut self.state.player,
            enemy,
            map: &mut self.state.map,
            config: &self.config.combat,
        }
        .resolve(&mut self.rng, commander)?;
        events.extend(result.events);

        match result.outcome {
            EncounterOutcome::Victory => {
                if let Some(fallen) = self.state.enemies.remove(id) {
                    self.state.occupancy.remove(fallen.pos);
                }
            }
            EncounterOutcome::Escaped => {
                if let Some(back) = came_from
                    && let Some(enemy) = self.state.enemies.get_mut(id)
                {
                    recoil(enemy, back, &mut self.state.occupancy);
                }
            }
            EncounterOutcome::Defeat => {}
        }
        Ok(())
    }

    fn finish_turn(&mut self, mut events: Vec<LogEvent>) -> TurnReport {
        if self.outcome.is_none()
            && let Some(cause) = self.state.player.death_cause()
        {
            events.push(match cause {
                DeathCause::Wounds => LogEvent::BodyFailed,
                DeathCause::Madness => LogEvent::MindShattered,
            });
            self.outcome = Some(RunOutcome::Defeat(cause));
            debug!(turn = self.turn, floor = self.state.map.floor, ?cause, "run ended");
        }
        self.push_log(&events);
        TurnReport { turn: self.turn, events, outcome: self.outcome }
    }
}

fn recoil(enemy: &mut Enemy, back: Pos, occupancy: &mut Occupancy) {
    if occupancy.relocate(enemy.pos, back) {
        enemy.pos = back;
    }
}

/// Picks up everything on the player's tile that fits; the rest stays on the ground.
fn gather_items(map: &mut TileMap, player: &mut Player, events: &mut Vec<LogEvent>) -> Result<(), ContentError> {
    let pos = player.pos;
    for item in map.take_items(pos) {
        if player.inventory.add(&item, 1)? {
            events.push(LogEvent::PickedUp { item });
        } else {
            map.place_item(pos, &item);
            events.push(LogEvent::NoRoomFor { item });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CombatConfig;
    use crate::game::test_support::{ScriptedCommander, corridor_map, open_map};

    fn staged(mut map: TileMap, start: Pos, spawns: &[(EnemyKind, Pos)]) -> Game {
        let config = GameConfig {
            combat: CombatConfig { event_chance: 0.0, ..CombatConfig::default() },
            ..GameConfig::default()
        };
        let mut game = Game::with_config(9, config).unwrap();
        map.start = start;
        map.enemy_spawns = spawns.to_vec();
        game.state = GameState::install_floor(map, Player::new(start).unwrap());
        game
    }

    #[test]
    fn walking_into_a_wall_keeps_position() {
        let mut game = staged(corridor_map(6), Pos { y: 1, x: 1 }, &[]);
        let report = game.step(Command::Move(Direction::North), &mut AlwaysAttack).unwrap();
        assert_eq!(report.events[0], LogEvent::BumpedWall);
        assert_eq!(game.state.player.pos, Pos { y: 1, x: 1 });
        assert_eq!(report.turn, 1);
    }

    #[test]
    fn stepping_onto_items_picks_them_up() {
        let mut map = corridor_map(6);
        map.place_item(Pos { y: 1, x: 2 }, "Bread");
        let mut game = staged(map, Pos { y: 1, x: 1 }, &[]);
        let report = game.step(Command::Move(Direction::East), &mut AlwaysAttack).unwrap();
        assert_eq!(report.events[..2], [LogEvent::Moved, LogEvent::PickedUp { item: "Bread".into() }]);
        assert_eq!(game.state.player.inventory.count("Bread"), 3);
        assert!(game.state.map.items.get(&Pos { y: 1, x: 2 }).is_none_or(Vec::is_empty));
    }

    #[test]
    fn items_that_do_not_fit_stay_on_the_ground() {
        let mut map = corridor_map(6);
        map.place_item(Pos { y: 1, x: 2 }, "Stone");
        let mut game = staged(map, Pos { y: 1, x: 1 }, &[]);
        game.state.player.inventory.capacity = game.state.player.inventory.stacks().count();
        let report = game.step(Command::Move(Direction::East), &mut AlwaysAttack).unwrap();
        assert!(report.events.contains(&LogEvent::NoRoomFor { item: "Stone".into() }));
        assert_eq!(game.state.map.items[&Pos { y: 1, x: 2 }], vec!["Stone".to_string()]);
    }

    #[test]
    fn bumping_an_enemy_fights_instead_of_moving() {
        let mut game = staged(open_map(8, 8), Pos { y: 3, x: 3 }, &[(EnemyKind::Rat, Pos { y: 3, x: 4 })]);
        game.state.enemies.values_mut().for_each(|enemy| enemy.hp = 1);
        let report = game.step(Command::Move(Direction::East), &mut AlwaysAttack).unwrap();
        assert!(report.events.contains(&LogEvent::EnemyDefeated { kind: EnemyKind::Rat }));
        assert_eq!(game.state.player.pos, Pos { y: 3, x: 3 });
        assert!(game.state.enemies.is_empty());
        assert!(game.state.occupancy.is_empty());
    }

    #[test]
    fn escaping_an_enemy_lunge_sends_it_back() {
        let mut game = staged(corridor_map(8), Pos { y: 1, x: 2 }, &[(EnemyKind::Skeleton, Pos { y: 1, x: 3 })]);
        let mut commander = ScriptedCommander::new(vec![CombatAction::Flee; 200]);
        let report = game.step(Command::Wait, &mut commander).unwrap();
        assert!(report.events.contains(&LogEvent::EnemyLunged { kind: EnemyKind::Skeleton }));
        assert!(report.events.contains(&LogEvent::FleeSucceeded));
        let (_, skeleton) = game.state.enemies.iter().next().unwrap();
        assert_eq!(skeleton.pos, Pos { y: 1, x: 3 });
        assert_eq!(game.state.occupancy.iter().collect::<Vec<_>>(), vec![Pos { y: 1, x: 3 }]);
        assert_eq!(game.state.player.hp, game.state.player.max_hp);
    }

    #[test]
    fn crafting_takes_a_turn() {
        let mut game = staged(corridor_map(6), Pos { y: 1, x: 1 }, &[]);
        game.state.player.inventory.add("Meat", 1).unwrap();
        game.state.player.inventory.add("Fire", 1).unwrap();
        let report = game.step(Command::Craft("Cooked Meat".into()), &mut AlwaysAttack).unwrap();
        assert_eq!(report.events[0], LogEvent::Crafted { item: "Cooked Meat".into(), quantity: 1 });
        assert_eq!(report.turn, 1);
        assert_eq!(game.state.player.inventory.count("Cooked Meat"), 1);
    }

    #[test]
    fn rejected_command_leaves_the_turn_counter_alone() {
        let mut game = staged(corridor_map(6), Pos { y: 1, x: 1 }, &[]);
        let hash = game.snapshot_hash();
        assert_eq!(
            game.step(Command::UseItem("Glass Key".into()), &mut AlwaysAttack),
            Err(GameError::Content(ContentError::UnknownItem("Glass Key".into())))
        );
        assert!(game.step(Command::Craft("Soup".into()), &mut AlwaysAttack).is_err());
        assert_eq!(game.current_turn(), 0);
        assert_eq!(game.snapshot_hash(), hash);
        assert_eq!(game.step(Command::Wait, &mut AlwaysAttack).map(|report| report.turn), Ok(1));
    }

    #[test]
    fn frozen_player_loses_the_action() {
        let mut game = staged(corridor_map(6), Pos { y: 1, x: 1 }, &[]);
        game.state.player.apply_status(StatusKind::Freeze, 1);
        let report = game.step(Command::Move(Direction::East), &mut AlwaysAttack).unwrap();
        assert_eq!(game.state.player.pos, Pos { y: 1, x: 1 });
        assert!(report.events.contains(&LogEvent::FrozenSolid { subject: Subject::Player }));
        game.step(Command::Move(Direction::East), &mut AlwaysAttack).unwrap();
        assert_eq!(game.state.player.pos, Pos { y: 1, x: 2 });
    }

    #[test]
    fn descending_needs_the_stairs() {
        let mut game = staged(corridor_map(6), Pos { y: 1, x: 1 }, &[]);
        let report = game.step(Command::Descend, &mut AlwaysAttack).unwrap();
        assert_eq!(report.events[0], LogEvent::NoStairs);
        assert_eq!(game.floor(), 1);
    }

    #[test]
    fn descending_installs_the_next_floor() {
        let mut game = Game::new(31).unwrap();
        game.state.player.pos = game.state.map.stairs;
        let kit = game.state.player.inventory.clone();
        let report = game.step(Command::Descend, &mut AlwaysAttack).unwrap();
        assert_eq!(report.events[0], LogEvent::Descended { floor: 2 });
        assert_eq!(game.floor(), 2);
        assert_eq!(game.state.player.pos, game.state.map.start);
        assert_eq!(game.state.player.inventory, kit);
        assert_eq!(game.state.occupancy.len(), game.state.enemies.len());
    }

    #[test]
    fn starving_to_death_ends_the_run() {
        let mut game = staged(corridor_map(6), Pos { y: 1, x: 1 }, &[]);
        game.state.player.hp = 1;
        game.state.player.hunger = 0;
        let report = game.step(Command::Wait, &mut AlwaysAttack).unwrap();
        assert_eq!(report.outcome, Some(RunOutcome::Defeat(DeathCause::Wounds)));
        assert_eq!(report.events.last(), Some(&LogEvent::BodyFailed));
        assert_eq!(game.step(Command::Wait, &mut AlwaysAttack), Err(GameError::RunFinished));
    }

    #[test]
    fn exhaustion_without_sanity_is_madness() {
        let mut game = staged(corridor_map(6), Pos { y: 1, x: 1 }, &[]);
        game.state.player.sanity = 1;
        game.state.player.stamina = 1;
        let report = game.step(Command::Wait, &mut AlwaysAttack).unwrap();
        assert_eq!(report.outcome, Some(RunOutcome::Defeat(DeathCause::Madness)));
        assert_eq!(report.events.last(), Some(&LogEvent::MindShattered));
    }
}
