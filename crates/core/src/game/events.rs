//! Ambient random events and the world-level darkness timer.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::player::Player;
use crate::rng::RandomSource;
use crate::types::LogEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldEvent {
    Hallucination,
    EtherStorm,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSystem {
    pub storm_timer: u32,
}

impl EventSystem {
    pub fn is_darkened(&self) -> bool {
        self.storm_timer > 0
    }

    pub fn tick(&mut self) {
        self.storm_timer = self.storm_timer.saturating_sub(1);
    }

    /// Rolls `chance`; on a hit picks one event uniformly and applies it to the player.
    pub fn maybe_trigger(
        &mut self,
        player: &mut Player,
        chance: f64,
        rng: &mut impl RandomSource,
    ) -> Vec<LogEvent> {
        if !rng.chance(chance) {
            return Vec::new();
        }
        match rng.choose(&[WorldEvent::Hallucination, WorldEvent::EtherStorm]) {
            Some(WorldEvent::Hallucination) => {
                let loss = rng.range_inclusive(2, 6);
                debug!(loss, "hallucination");
                player.drain_sanity(loss);
                vec![LogEvent::Hallucination { sanity_lost: loss }]
            }
            Some(WorldEvent::EtherStorm) => {
                let turns = rng.range_inclusive(4, 8) as u32;
                debug!(turns, "ether storm");
                self.storm_timer = turns;
                player.snuff_light();
                vec![LogEvent::EtherStorm { turns }]
            }
            None => Vec::new(),
        }
    }
}
