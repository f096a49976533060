//! Timed afflictions shared by the player and enemies.
//! This module exists so burn/poison/freeze/fear tick with one set of rules for both sides.
//! It does not own the hosts; kind-specific side effects go through `StatusHost`.

use serde::{Deserialize, Serialize};

use crate::types::{LogEvent, StatusKind, Subject};

/// Remaining turns per status kind; zero means absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusEffects {
    remaining: [u8; 4],
}

impl StatusEffects {
    /// Max-merge: re-applying never shortens an active status.
    pub fn apply(&mut self, kind: StatusKind, turns: u8) {
        let slot = &mut self.remaining[kind.index()];
        *slot = (*slot).max(turns);
    }

    pub fn remaining(&self, kind: StatusKind) -> u8 {
        self.remaining[kind.index()]
    }

    pub fn contains(&self, kind: StatusKind) -> bool {
        self.remaining(kind) > 0
    }

    pub fn remove(&mut self, kind: StatusKind) {
        self.remaining[kind.index()] = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.iter().all(|&t| t == 0)
    }

    pub fn active(&self) -> impl Iterator<Item = (StatusKind, u8)> + '_ {
        StatusKind::ALL.into_iter().filter_map(|kind| {
            let turns = self.remaining(kind);
            (turns > 0).then_some((kind, turns))
        })
    }

    /// Decrements every active status by one and returns the kinds that were active.
    fn decrement(&mut self) -> Vec<StatusKind> {
        let mut ticked = Vec::new();
        for kind in StatusKind::ALL {
            let slot = &mut self.remaining[kind.index()];
            if *slot > 0 {
                *slot -= 1;
                ticked.push(kind);
            }
        }
        ticked
    }
}

/// Agent-side hooks for the per-kind effects of a tick.
pub trait StatusHost {
    fn subject(&self) -> Subject;
    fn statuses_mut(&mut self) -> &mut StatusEffects;
    fn lose_hp(&mut self, amount: i32);
    fn is_alive(&self) -> bool;
    /// Poison's extra bite. Enemies have no morale to lose.
    fn lose_sanity(&mut self, _amount: i32) {}
    /// Freeze drains stamina on hosts that track it.
    fn lose_stamina(&mut self, _amount: i32) {}
    /// Fear: shrinks an enemy's aggression radius or erodes the player's karma.
    fn suffer_fear(&mut self);
}

pub const BURN_DAMAGE: i32 = 2;
pub const POISON_DAMAGE: i32 = 1;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusTick {
    /// The host loses its action this turn.
    pub frozen: bool,
    /// Status damage finished the host; set on the status that dealt the last point.
    pub fatal: Option<StatusKind>,
    pub events: Vec<LogEvent>,
}

/// Applies one turn of every active status, then expires finished ones.
pub fn tick_statuses<H: StatusHost>(host: &mut H) -> StatusTick {
    let mut tick = StatusTick::default();
    let subject = host.subject();
    let active = host.statuses_mut().decrement();
    for kind in active {
        match kind {
            StatusKind::Burn => host.lose_hp(BURN_DAMAGE),
            StatusKind::Poison => {
                host.lose_hp(POISON_DAMAGE);
                host.lose_sanity(1);
            }
            StatusKind::Freeze => {
                host.lose_stamina(1);
                tick.frozen = true;
            }
            StatusKind::Fear => host.suffer_fear(),
        }
        if tick.fatal.is_none() && !host.is_alive() {
            tick.fatal = Some(kind);
            tick.events.push(LogEvent::SuccumbedToStatus { subject, status: kind });
            return tick;
        }
    }
    if tick.frozen {
        tick.events.push(LogEvent::FrozenSolid { subject });
    }
    tick
}
