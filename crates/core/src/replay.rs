//! Recording and re-running journals. A run is fully determined by its seed, its config
//! and the ordered list of commands and combat actions it received.

use std::slice;

use crate::config::GameConfig;
use crate::error::{GameError, ReplayError};
use crate::game::{CombatAction, CombatCommander, Command, EncounterView, Game, TurnReport};
use crate::journal::{InputJournal, InputPayload, InputRecord};
use crate::types::RunOutcome;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayResult {
    pub final_outcome: Option<RunOutcome>,
    pub final_snapshot_hash: u64,
    pub final_turn: u64,
}

/// Forwards to another commander and journals every action it hands out.
pub struct RecordingCommander<'a, C> {
    inner: &'a mut C,
    journal: &'a mut InputJournal,
}

impl<'a, C: CombatCommander> RecordingCommander<'a, C> {
    pub fn new(inner: &'a mut C, journal: &'a mut InputJournal) -> Self {
        Self { inner, journal }
    }
}

impl<C: CombatCommander> CombatCommander for RecordingCommander<'_, C> {
    fn choose(&mut self, view: &EncounterView<'_>) -> Option<CombatAction> {
        let action = self.inner.choose(view)?;
        self.journal.append_combat_action(action.clone());
        Some(action)
    }
}

/// Journals `command`, then steps the game with combat input recorded behind it.
pub fn step_recorded(
    game: &mut Game,
    journal: &mut InputJournal,
    command: Command,
    commander: &mut impl CombatCommander,
) -> Result<TurnReport, GameError> {
    journal.append_command(command.clone());
    game.step(command, &mut RecordingCommander::new(commander, journal))
}

/// Walks the journal; also answers combat prompts from it.
struct JournalCursor<'a> {
    records: slice::Iter<'a, InputRecord>,
    consumed: u64,
    mismatch: Option<u64>,
}

impl<'a> JournalCursor<'a> {
    fn next_record(&mut self) -> Option<&'a InputRecord> {
        let record = self.records.next()?;
        self.consumed += 1;
        Some(record)
    }
}

impl CombatCommander for JournalCursor<'_> {
    fn choose(&mut self, _view: &EncounterView<'_>) -> Option<CombatAction> {
        match self.records.as_slice().first() {
            Some(InputRecord { payload: InputPayload::CombatAction(action), .. }) => {
                self.next_record();
                Some(action.clone())
            }
            Some(record) => {
                self.mismatch = Some(record.seq);
                None
            }
            None => None,
        }
    }
}

/// Rebuilds the game a journal describes, ready to keep playing. `config` must be the one
/// the journal was recorded under, and every record must be consumed by the step it
/// belongs to.
pub fn replay_journal_inputs(journal: &InputJournal, config: &GameConfig) -> Result<Game, ReplayError> {
    let supplied = config.fingerprint();
    if supplied != journal.config_fingerprint {
        return Err(ReplayError::ConfigMismatch { recorded: journal.config_fingerprint, supplied });
    }
    let mut game = Game::with_config(journal.seed, config.clone())?;
    let mut cursor = JournalCursor { records: journal.inputs.iter(), consumed: 0, mismatch: None };

    while let Some(record) = cursor.next_record() {
        let InputPayload::Command(command) = &record.payload else {
            return Err(ReplayError::UnexpectedInput { seq: record.seq });
        };
        match game.step(command.clone(), &mut cursor) {
            Ok(_) => {}
            Err(GameError::MissingCombatInput) => {
                return Err(match cursor.mismatch {
                    Some(seq) => ReplayError::UnexpectedInput { seq },
                    None => ReplayError::MissingInput { seq: cursor.consumed },
                });
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(game)
}

/// Re-runs `journal` from its seed and summarizes where it ends.
pub fn replay_journal(journal: &InputJournal, config: &GameConfig) -> Result<ReplayResult, ReplayError> {
    let game = replay_journal_inputs(journal, config)?;
    Ok(ReplayResult {
        final_outcome: game.outcome(),
        final_snapshot_hash: game.snapshot_hash(),
        final_turn: game.current_turn(),
    })
}
