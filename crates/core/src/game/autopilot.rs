//! Stairs-seeking command policy for headless runs.
//! This module exists to keep navigation policy separate from pathfinding primitives.
//! It does not own combat choices; those still come from a `CombatCommander`.

use super::*;
use crate::content::keys;
use crate::state::{Occupancy, TileMap};

const HEALING: [&str; 2] = [keys::BANDAGE, keys::COOKED_MEAT];
const CALMING: [&str; 2] = [keys::ETHER_POTION, keys::MUSHROOM];
const FOOD: [&str; 3] = [keys::BREAD, keys::COOKED_MEAT, keys::MUSHROOM];
const HUNGER_THRESHOLD: i32 = 25;

/// Next command for a player that tends its wounds, then heads for the stairs.
///
/// Enemies are not treated as obstacles: walking into one starts a fight.
pub fn autopilot_command(game: &Game) -> Command {
    let player = &game.state().player;
    let held = |names: &[&str]| {
        names.iter().find(|name| player.inventory.has(name, 1)).map(|name| name.to_string())
    };

    if player.hp * 3 < player.max_hp
        && let Some(item) = held(&HEALING)
    {
        return Command::UseItem(item);
    }
    if player.sanity * 3 < player.max_sanity
        && let Some(item) = held(&CALMING)
    {
        return Command::UseItem(item);
    }
    if player.hunger < HUNGER_THRESHOLD
        && let Some(item) = held(&FOOD)
    {
        return Command::UseItem(item);
    }
    if player.stamina * 4 < player.max_stamina {
        return Command::Rest;
    }

    let map = &game.state().map;
    if player.pos == map.stairs {
        return Command::Descend;
    }
    match step_toward(map, player.pos, map.stairs) {
        Some(direction) => Command::Move(direction),
        None => Command::Wait,
    }
}

fn step_toward(map: &TileMap, from: Pos, to: Pos) -> Option<Direction> {
    let step = next_step(map, from, to, &Occupancy::default(), false)?;
    Direction::ALL.into_iter().find(|&direction| from.offset(direction) == step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_player_heads_for_the_stairs() {
        let game = Game::new(8).unwrap();
        let state = game.state();
        let command = autopilot_command(&game);
        if state.map.start == state.map.stairs {
            assert_eq!(command, Command::Descend);
        } else {
            let Command::Move(direction) = command else {
                panic!("expected a move, got {command:?}");
            };
            let step = state.player.pos.offset(direction);
            assert!(state.map.is_walkable(step));
        }
    }

    #[test]
    fn autopilot_reaches_the_second_floor() {
        let mut game = Game::new(21).unwrap();
        for _ in 0..400 {
            if game.is_over() || game.floor() > 1 {
                break;
            }
            game.step(autopilot_command(&game), &mut AlwaysAttack).unwrap();
        }
        assert!(game.floor() > 1 || game.is_over());
    }

    #[test]
    fn hungry_player_eats() {
        let mut game = Game::new(3).unwrap();
        game.state.player.hunger = 10;
        assert_eq!(autopilot_command(&game), Command::UseItem(keys::BREAD.to_string()));
    }

    #[test]
    fn badly_hurt_player_bandages() {
        let mut game = Game::new(3).unwrap();
        game.state.player.hp = 2;
        assert_eq!(autopilot_command(&game), Command::UseItem(keys::BANDAGE.to_string()));
    }
}
