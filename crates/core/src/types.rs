use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct EnemyId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub fn offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Pos { y: self.y + dy, x: self.x + dx }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Wall,
    Floor,
    Safe,
    Treasure,
    Stairs,
}

impl TileKind {
    pub fn is_walkable(self) -> bool {
        !matches!(self, TileKind::Wall)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::East, Direction::West, Direction::South, Direction::North];

    /// `(dx, dy)` with `y` growing downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    Burn,
    Poison,
    Freeze,
    Fear,
}

impl StatusKind {
    pub const ALL: [StatusKind; 4] =
        [StatusKind::Burn, StatusKind::Poison, StatusKind::Freeze, StatusKind::Fear];

    pub(crate) fn index(self) -> usize {
        match self {
            StatusKind::Burn => 0,
            StatusKind::Poison => 1,
            StatusKind::Freeze => 2,
            StatusKind::Fear => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StatusKind::Burn => "burn",
            StatusKind::Poison => "poison",
            StatusKind::Freeze => "freeze",
            StatusKind::Fear => "fear",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Rat,
    Skeleton,
    Ghost,
    Shadowling,
    Mimic,
    EtherWarden,
}

impl EnemyKind {
    /// Kinds eligible for the regular per-room spawn roll.
    pub const SPAWNABLE: [EnemyKind; 5] = [
        EnemyKind::Rat,
        EnemyKind::Skeleton,
        EnemyKind::Ghost,
        EnemyKind::Shadowling,
        EnemyKind::Mimic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Rat => "Rat",
            EnemyKind::Skeleton => "Skeleton",
            EnemyKind::Ghost => "Ghost",
            EnemyKind::Shadowling => "Shadowling",
            EnemyKind::Mimic => "Mimic",
            EnemyKind::EtherWarden => "Ether Warden",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    Aggressive,
    Cautious,
    Ambusher,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Player,
    Enemy(EnemyKind),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Player => write!(f, "You"),
            Subject::Enemy(kind) => write!(f, "The {}", kind.name()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Wounds,
    Madness,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Defeat(DeathCause),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquipSlot {
    Melee,
    Ranged,
    Armor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attribute {
    Hp,
    Stamina,
    Sanity,
    Attack,
    Defense,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogEvent {
    Descended { floor: u32 },
    Moved,
    BumpedWall,
    NoStairs,
    Rested,
    Waited,
    PickedUp { item: String },
    NoRoomFor { item: String },
    ItemMissing { item: String },
    ItemConsumed { item: String },
    PackFull { item: String },
    Crafted { item: String, quantity: u32 },
    MissingIngredients { recipe: String },
    Equipped { item: String, slot: EquipSlot },
    LightRaised,
    ItemDescribed { item: String, description: &'static str },
    SkillPointSpent { attribute: Attribute },
    NoSkillPoints,
    EnemyRevealed { kind: EnemyKind },
    EnemyLunged { kind: EnemyKind },
    EnemyRetreated { kind: EnemyKind },
    FrozenSolid { subject: Subject },
    SuccumbedToStatus { subject: Subject, status: StatusKind },
    Hallucination { sanity_lost: i32 },
    EtherStorm { turns: u32 },
    Engaged { kind: EnemyKind },
    PlayerStruck { kind: EnemyKind, damage: i32, critical: bool, ranged: bool },
    NoRangedWeapon,
    Braced,
    FleeSucceeded,
    FleeFailed,
    EnemyStruck { kind: EnemyKind, damage: i32, critical: bool, blocked: bool },
    SanityDrained { amount: i32 },
    StatusInflicted { subject: Subject, status: StatusKind, turns: u8 },
    WeaponBroke { item: String },
    ArmorBroke { item: String },
    Looted { item: String },
    LootDropped { item: String },
    GainedXp { amount: u32 },
    LevelUp { level: u32 },
    EnemyDefeated { kind: EnemyKind },
    PlayerCollapsed,
    BodyFailed,
    MindShattered,
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogEvent::Descended { floor } => write!(f, "You descend to floor {floor}."),
            LogEvent::Moved => write!(f, "You move silently through the corridor."),
            LogEvent::BumpedWall => write!(f, "You bump into a wall."),
            LogEvent::NoStairs => write!(f, "There is no stairway here."),
            LogEvent::Rested => write!(f, "You rest and gather strength."),
            LogEvent::Waited => write!(f, "You hold your breath and wait."),
            LogEvent::PickedUp { item } => write!(f, "Picked up {item}."),
            LogEvent::NoRoomFor { item } => {
                write!(f, "No room for {item}. It remains on the ground.")
            }
            LogEvent::ItemMissing { item } => write!(f, "You don't have any {item}."),
            LogEvent::ItemConsumed { item } => write!(f, "You use the {item}."),
            LogEvent::PackFull { item } => write!(f, "No room to carry the {item}."),
            LogEvent::Crafted { item, quantity } => write!(f, "Crafted {quantity}x {item}!"),
            LogEvent::MissingIngredients { recipe } => {
                write!(f, "You lack the ingredients for {recipe}.")
            }
            LogEvent::Equipped { item, slot } => match slot {
                EquipSlot::Melee => write!(f, "You grip the {item} tightly."),
                EquipSlot::Ranged => write!(f, "You prepare the {item} for ranged combat."),
                EquipSlot::Armor => write!(f, "You don the {item}."),
            },
            LogEvent::LightRaised => write!(f, "The darkness recoils from the light."),
            LogEvent::ItemDescribed { item, description } => write!(f, "{item}: {description}"),
            LogEvent::SkillPointSpent { attribute } => write!(f, "You invest in {attribute:?}."),
            LogEvent::NoSkillPoints => write!(f, "You have no skill points to spend."),
            LogEvent::EnemyRevealed { kind } => write!(f, "The {} reveals itself!", kind.name()),
            LogEvent::EnemyLunged { kind } => write!(f, "The {} lunges from the dark!", kind.name()),
            LogEvent::EnemyRetreated { kind } => {
                write!(f, "The wounded {} backs away.", kind.name())
            }
            LogEvent::FrozenSolid { subject } => write!(f, "{subject} cannot move, frozen solid."),
            LogEvent::SuccumbedToStatus { subject: Subject::Player, status } => {
                write!(f, "You succumb to {}.", status.name())
            }
            LogEvent::SuccumbedToStatus { subject, status } => {
                write!(f, "{subject} succumbs to {}.", status.name())
            }
            LogEvent::Hallucination { sanity_lost } => write!(
                f,
                "The world bends out of shape. You lose {sanity_lost} sanity points."
            ),
            LogEvent::EtherStorm { turns } => write!(
                f,
                "An ether storm howls. All lights sputter out for {turns} turns!"
            ),
            LogEvent::Engaged { kind } => write!(f, "A {} engages you!", kind.name()),
            LogEvent::PlayerStruck { kind, damage, critical, ranged } => {
                let verb = if *ranged { "shoot" } else { "strike" };
                let crit = if *critical { " Critical hit!" } else { "" };
                write!(f, "You {verb} the {} for {damage} damage.{crit}", kind.name())
            }
            LogEvent::NoRangedWeapon => write!(f, "You have no ranged weapon ready."),
            LogEvent::Braced => write!(f, "You brace for the next attack."),
            LogEvent::FleeSucceeded => write!(f, "You slip away from combat."),
            LogEvent::FleeFailed => write!(f, "The enemy blocks your escape!"),
            LogEvent::EnemyStruck { kind, damage, critical, blocked } => {
                write!(f, "The {} hits you for {damage} damage!", kind.name())?;
                if *critical {
                    write!(f, " A vicious blow!")?;
                }
                if *blocked {
                    write!(f, " Your armor absorbs part of it.")?;
                }
                Ok(())
            }
            LogEvent::SanityDrained { amount } => {
                write!(f, "A chilling touch erodes your sanity (-{amount} SAN).")
            }
            LogEvent::StatusInflicted { subject: Subject::Player, status, turns } => {
                write!(f, "You suffer {} for {turns} turns.", status.name())
            }
            LogEvent::StatusInflicted { subject, status, turns } => {
                write!(f, "{subject} suffers {} for {turns} turns.", status.name())
            }
            LogEvent::WeaponBroke { item } => write!(f, "Your {item} breaks!"),
            LogEvent::ArmorBroke { item } => write!(f, "Your {item} falls apart!"),
            LogEvent::Looted { item } => write!(f, "Looted {item}."),
            LogEvent::LootDropped { item } => write!(f, "No room for {item}; it drops to the ground."),
            LogEvent::GainedXp { amount } => write!(f, "Gained {amount} XP."),
            LogEvent::LevelUp { level } => {
                write!(f, "Level up! You are now level {level} and gained a skill point.")
            }
            LogEvent::EnemyDefeated { kind } => write!(f, "The {} is defeated.", kind.name()),
            LogEvent::PlayerCollapsed => write!(f, "You collapse as the darkness closes in..."),
            LogEvent::BodyFailed => write!(f, "Your body fails. The depths claim another soul."),
            LogEvent::MindShattered => write!(f, "Your mind shatters under the ether's whispers."),
        }
    }
}
