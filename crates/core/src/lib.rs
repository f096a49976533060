pub mod agent;
pub mod config;
pub mod content;
pub mod error;
pub mod game;
pub mod inventory;
pub mod journal;
pub mod journal_file;
pub mod mapgen;
pub mod player;
pub mod replay;
pub mod rng;
pub mod state;
pub mod status;
pub mod types;

pub use agent::Enemy;
pub use config::{CombatConfig, GameConfig, MapgenConfig};
pub use error::{ContentError, GameError, ReplayError};
pub use game::{AlwaysAttack, CombatAction, CombatCommander, Command, Game, TurnReport, autopilot_command};
pub use journal::{InputJournal, InputPayload, InputRecord};
pub use journal_file::{JournalLoadError, JournalWriter, load_journal_from_file, save_journal_to_file};
pub use mapgen::{LevelGenerator, generate_level};
pub use player::Player;
pub use replay::{RecordingCommander, ReplayResult, replay_journal, replay_journal_inputs, step_recorded};
pub use rng::{GameRng, RandomSource};
pub use state::{GameState, Occupancy, TileMap};
pub use types::*;
