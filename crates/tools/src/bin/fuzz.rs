use std::collections::BTreeSet;

use anyhow::{Result, bail};
use clap::Parser;
use game_core::game::EncounterView;
use game_core::{CombatAction, CombatCommander, Command, Direction, Game, Pos};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 1000)]
    turns: u32,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

struct RandomCommander {
    rng: ChaCha8Rng,
}

impl CombatCommander for RandomCommander {
    fn choose(&mut self, _view: &EncounterView<'_>) -> Option<CombatAction> {
        // Bias to fight
        Some(choose(
            &mut self.rng,
            &[
                CombatAction::Melee,
                CombatAction::Melee,
                CombatAction::Ranged,
                CombatAction::Defend,
                CombatAction::Flee,
            ],
        ))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("Starting fuzz harness on seed {} for max {} turns...", args.seed, args.turns);
    let mut game = Game::new(args.seed)?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut commander = RandomCommander { rng: ChaCha8Rng::seed_from_u64(args.seed.rotate_left(17)) };

    for _ in 0..args.turns {
        if let Some(outcome) = game.outcome() {
            println!("Finished with outcome {outcome:?} after {} turns", game.current_turn());
            break;
        }
        let command = choose(
            &mut rng,
            &[
                Command::Move(Direction::North),
                Command::Move(Direction::South),
                Command::Move(Direction::East),
                Command::Move(Direction::West),
                Command::Rest,
                Command::Descend,
                Command::UseItem("Bread".into()),
                Command::Craft("Club".into()),
            ],
        );
        game.step(command, &mut commander)?;

        let state = game.state();
        let mut held = BTreeSet::<Pos>::new();
        for (_, enemy) in &state.enemies {
            if enemy.hp > enemy.max_hp {
                bail!("Invariant failed: enemy HP > max HP at turn {}", game.current_turn());
            }
            if !held.insert(enemy.pos) {
                bail!("Invariant failed: two enemies on {:?} at turn {}", enemy.pos, game.current_turn());
            }
        }
        let occupied: BTreeSet<Pos> = state.occupancy.iter().collect();
        if held != occupied {
            bail!("Invariant failed: occupancy out of sync at turn {}", game.current_turn());
        }
        if !state.map.is_walkable(state.player.pos) {
            bail!("Invariant failed: player inside wall at turn {}", game.current_turn());
        }
    }

    println!("Fuzzing completed successfully.");
    Ok(())
}
