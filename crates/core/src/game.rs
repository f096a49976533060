//! Run-level simulation: one `Game` owns the seeded stream, the current floor and the log.
//! Turn sequencing lives in `turn`, enemy policy in `ai`, encounters in `combat`.

use std::collections::VecDeque;

use tracing::debug;

use crate::config::GameConfig;
use crate::error::GameError;
use crate::mapgen::LevelGenerator;
use crate::player::Player;
use crate::rng::GameRng;
use crate::state::GameState;
use crate::types::*;

mod ai;
mod autopilot;
mod combat;
mod events;
mod hash;
mod pathfinding;
#[cfg(test)]
pub(crate) mod test_support;
mod turn;

pub use ai::AiTurn;
pub use autopilot::autopilot_command;
pub use combat::{
    AlwaysAttack, CombatAction, CombatCommander, Encounter, EncounterOutcome, EncounterResult,
    EncounterView,
};
pub use events::{EventSystem, WorldEvent};
pub use pathfinding::{neighbors, next_step};
pub use turn::{Command, TurnReport};

/// Most recent messages kept in the rolling log.
pub const LOG_CAPACITY: usize = 100;

pub struct Game {
    seed: u64,
    turn: u64,
    rng: GameRng,
    config: GameConfig,
    generator: LevelGenerator,
    state: GameState,
    world: EventSystem,
    log: VecDeque<LogEvent>,
    outcome: Option<RunOutcome>,
}

impl Game {
    pub fn new(seed: u64) -> Result<Self, GameError> {
        Self::with_config(seed, GameConfig::default())
    }

    /// Generates floor 1 from `seed` and places a fresh player on its start tile.
    pub fn with_config(seed: u64, config: GameConfig) -> Result<Self, GameError> {
        let mut rng = GameRng::seed_from_u64(seed);
        let generator = LevelGenerator::new(config.map.clone());
        let map = generator.generate(1, &mut rng);
        let player = Player::new(map.start)?;
        let state = GameState::install_floor(map, player);
        debug!(seed, enemies = state.enemies.len(), "run started");
        Ok(Self {
            seed,
            turn: 0,
            rng,
            config,
            generator,
            state,
            world: EventSystem::default(),
            log: VecDeque::with_capacity(LOG_CAPACITY),
            outcome: None,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn current_turn(&self) -> u64 {
        self.turn
    }

    pub fn floor(&self) -> u32 {
        self.state.map.floor
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn world(&self) -> &EventSystem {
        &self.world
    }

    pub fn log(&self) -> impl Iterator<Item = &LogEvent> {
        self.log.iter()
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    fn push_log(&mut self, events: &[LogEvent]) {
        for event in events {
            if self.log.len() == LOG_CAPACITY {
                self.log.pop_front();
            }
            self.log.push_back(event.clone());
        }
    }
}
