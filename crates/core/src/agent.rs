use serde::{Deserialize, Serialize};

use crate::content::{EnemyTemplate, enemy_template};
use crate::rng::RandomSource;
use crate::status::{StatusEffects, StatusHost};
use crate::types::*;

/// Aggression radius never shrinks below this, however frightened.
pub const MIN_AGGRESSION_RADIUS: i32 = 2;

/// One enemy on the live roster. Per-kind tables (drops, inflictions) are read from
/// the static template keyed by `kind`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Pos,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub xp_reward: u32,
    pub statuses: StatusEffects,
    pub awakened: bool,
    pub aggression_radius: i32,
    pub can_phase: bool,
    pub personality: Personality,
    pub flanks: bool,
    pub crit_chance: f64,
    pub armor_block: u32,
    pub boss: bool,
}

/// Raw outgoing damage before the defender's mitigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Strike {
    pub amount: i32,
    pub critical: bool,
    pub inflicted: Option<(StatusKind, u8)>,
}

impl Enemy {
    pub fn spawn(kind: EnemyKind, pos: Pos) -> Self {
        let t = enemy_template(kind);
        Self {
            kind,
            pos,
            hp: t.hp,
            max_hp: t.hp,
            attack: t.attack,
            defense: t.defense,
            xp_reward: t.xp_reward,
            statuses: StatusEffects::default(),
            awakened: !t.starts_dormant,
            aggression_radius: t.aggression_radius,
            can_phase: t.can_phase,
            personality: t.personality,
            flanks: t.flanks,
            crit_chance: t.crit_chance,
            armor_block: t.armor_block,
            boss: t.boss,
        }
    }

    pub fn template(&self) -> &'static EnemyTemplate {
        enemy_template(self.kind)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn distance(&self, other: Pos) -> i32 {
        manhattan(self.pos, other)
    }

    /// `attack + [-1, 2]`, floored at 1; a critical adds half again.
    pub fn resolve_damage(&self, rng: &mut impl RandomSource) -> Strike {
        let mut amount = (self.attack + rng.range_inclusive(-1, 2)).max(1);
        let critical = rng.chance(self.crit_chance);
        if critical {
            amount += amount / 2;
        }
        let template = self.template();
        let inflicted = if !template.inflicts.is_empty() && rng.chance(template.inflict_chance) {
            rng.choose(template.inflicts).copied()
        } else {
            None
        };
        Strike { amount, critical, inflicted }
    }

    /// Applies mitigation by this enemy's defense and returns the damage actually dealt.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let dealt = (amount - self.defense).max(1);
        self.hp = (self.hp - dealt).max(0);
        dealt
    }

    /// Each drop entry rolls independently and yields `quantity` copies on success.
    pub fn roll_loot(&self, rng: &mut impl RandomSource) -> Vec<String> {
        let mut loot = Vec::new();
        for drop in self.template().drops {
            if rng.unit_f64() <= drop.chance {
                loot.extend((0..drop.quantity).map(|_| drop.item.to_string()));
            }
        }
        loot
    }
}

impl StatusHost for Enemy {
    fn subject(&self) -> Subject {
        Subject::Enemy(self.kind)
    }

    fn statuses_mut(&mut self) -> &mut StatusEffects {
        &mut self.statuses
    }

    fn lose_hp(&mut self, amount: i32) {
        self.hp = (self.hp - amount).max(0);
    }

    fn is_alive(&self) -> bool {
        Enemy::is_alive(self)
    }

    fn suffer_fear(&mut self) {
        self.aggression_radius = (self.aggression_radius - 1).max(MIN_AGGRESSION_RADIUS);
    }
}

pub fn manhattan(a: Pos, b: Pos) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}
