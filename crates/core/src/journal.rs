use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::game::{CombatAction, Command};

pub const JOURNAL_FORMAT_VERSION: u16 = 1;

/// Everything needed to reproduce a run: the seed, the rules it was played under and
/// every input in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputJournal {
    pub format_version: u16,
    pub seed: u64,
    /// `GameConfig::fingerprint` of the recorded run.
    pub config_fingerprint: u64,
    pub inputs: Vec<InputRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub seq: u64,
    pub payload: InputPayload,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputPayload {
    Command(Command),
    CombatAction(CombatAction),
}

impl InputJournal {
    pub fn new(seed: u64, config: &GameConfig) -> Self {
        Self {
            format_version: JOURNAL_FORMAT_VERSION,
            seed,
            config_fingerprint: config.fingerprint(),
            inputs: Vec::new(),
        }
    }

    pub fn append_command(&mut self, command: Command) {
        self.push(InputPayload::Command(command));
    }

    pub fn append_combat_action(&mut self, action: CombatAction) {
        self.push(InputPayload::CombatAction(action));
    }

    pub fn push(&mut self, payload: InputPayload) {
        let seq = self.inputs.len() as u64;
        self.inputs.push(InputRecord { seq, payload });
    }
}
