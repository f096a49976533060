//! Static item and enemy tables.
//! This module exists so enemy kinds and items are tagged data looked up by key.
//! It does not own any mutable state; records spawned from these tables live in `agent`
//! and `player`.

use serde::{Deserialize, Serialize};

use crate::error::ContentError;
use crate::types::{EnemyKind, Personality, StatusKind};

pub mod keys {
    pub const TORCH: &str = "Torch";
    pub const DAGGER: &str = "Dagger";
    pub const CLUB: &str = "Club";
    pub const BONE_BOW: &str = "Bone Bow";
    pub const ETHER_BLADE: &str = "Ether Blade";
    pub const LEATHER_ARMOR: &str = "Leather Armor";
    pub const BREAD: &str = "Bread";
    pub const MUSHROOM: &str = "Mushroom";
    pub const COOKED_MEAT: &str = "Cooked Meat";
    pub const MEAT: &str = "Meat";
    pub const FIRE: &str = "Fire";
    pub const STONE: &str = "Stone";
    pub const WOOD: &str = "Wood";
    pub const ESSENCE: &str = "Essence";
    pub const BONE: &str = "Bone";
    pub const ETHER_POTION: &str = "Ether Potion";
    pub const BANDAGE: &str = "Bandage";
    pub const ANTIDOTE: &str = "Antidote";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    Weapon,
    Armor,
    Food,
    Consumable,
    Utility,
    Ingredient,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponClass {
    Melee,
    Ranged,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemDef {
    pub name: &'static str,
    pub item_type: ItemType,
    pub description: &'static str,
    pub weight: f64,
    pub attack_bonus: i32,
    pub defense_bonus: i32,
    pub weapon_class: Option<WeaponClass>,
    pub durability: u32,
    pub crit_bonus: f64,
    /// Percent chance per incoming hit; only meaningful on armor.
    pub block_chance: Option<u32>,
    pub inflicts: Option<(StatusKind, u8)>,
    pub light_bonus: i32,
    pub light_duration: u32,
    pub heal: i32,
    pub sanity: i32,
    pub stamina: i32,
    pub hunger: i32,
    pub cures: Option<StatusKind>,
}

const BLANK: ItemDef = ItemDef {
    name: "",
    item_type: ItemType::Ingredient,
    description: "",
    weight: 0.5,
    attack_bonus: 0,
    defense_bonus: 0,
    weapon_class: None,
    durability: 0,
    crit_bonus: 0.0,
    block_chance: None,
    inflicts: None,
    light_bonus: 0,
    light_duration: 0,
    heal: 0,
    sanity: 0,
    stamina: 0,
    hunger: 0,
    cures: None,
};

static ITEMS: &[ItemDef] = &[
    ItemDef {
        name: keys::TORCH,
        item_type: ItemType::Utility,
        description: "A dim torch that increases your vision radius for a while.",
        weight: 1.0,
        light_bonus: 3,
        light_duration: 30,
        ..BLANK
    },
    ItemDef {
        name: keys::DAGGER,
        item_type: ItemType::Weapon,
        description: "A rusty dagger. Better than bare hands.",
        weight: 1.5,
        attack_bonus: 2,
        weapon_class: Some(WeaponClass::Melee),
        durability: 40,
        crit_bonus: 0.05,
        ..BLANK
    },
    ItemDef {
        name: keys::CLUB,
        item_type: ItemType::Weapon,
        description: "A crude club fashioned from stone and wood.",
        weight: 3.0,
        attack_bonus: 3,
        weapon_class: Some(WeaponClass::Melee),
        durability: 30,
        ..BLANK
    },
    ItemDef {
        name: keys::BONE_BOW,
        item_type: ItemType::Weapon,
        description: "A short bow strung with sinew over carved bone.",
        weight: 2.0,
        attack_bonus: 3,
        weapon_class: Some(WeaponClass::Ranged),
        durability: 30,
        crit_bonus: 0.10,
        ..BLANK
    },
    ItemDef {
        name: keys::ETHER_BLADE,
        item_type: ItemType::Weapon,
        description: "A blade forged from essence. It hums with power.",
        weight: 2.5,
        attack_bonus: 6,
        weapon_class: Some(WeaponClass::Melee),
        durability: 60,
        crit_bonus: 0.10,
        inflicts: Some((StatusKind::Fear, 2)),
        ..BLANK
    },
    ItemDef {
        name: keys::LEATHER_ARMOR,
        item_type: ItemType::Armor,
        description: "Stiff boiled leather. It turns the odd claw.",
        weight: 5.0,
        defense_bonus: 1,
        durability: 25,
        block_chance: Some(10),
        ..BLANK
    },
    ItemDef {
        name: keys::BREAD,
        item_type: ItemType::Food,
        description: "Stale bread that restores a bit of hunger and health.",
        heal: 5,
        hunger: 20,
        ..BLANK
    },
    ItemDef {
        name: keys::MUSHROOM,
        item_type: ItemType::Food,
        description: "A glowing mushroom that restores sanity.",
        weight: 0.2,
        sanity: 10,
        hunger: 5,
        ..BLANK
    },
    ItemDef {
        name: keys::COOKED_MEAT,
        item_type: ItemType::Food,
        description: "Freshly cooked meat, hearty and filling.",
        weight: 1.0,
        heal: 10,
        hunger: 35,
        ..BLANK
    },
    ItemDef {
        name: keys::MEAT,
        description: "Raw meat harvested from a beast.",
        weight: 1.0,
        ..BLANK
    },
    ItemDef { name: keys::FIRE, description: "A flicker of captured flame.", weight: 0.1, ..BLANK },
    ItemDef { name: keys::STONE, description: "A sturdy piece of stone.", weight: 2.0, ..BLANK },
    ItemDef { name: keys::WOOD, description: "Damp but usable wood.", weight: 1.5, ..BLANK },
    ItemDef {
        name: keys::ESSENCE,
        description: "Crystallised monster essence.",
        weight: 0.2,
        ..BLANK
    },
    ItemDef {
        name: keys::BONE,
        description: "Jagged bone, still pulsing faintly with ether.",
        ..BLANK
    },
    ItemDef {
        name: keys::ETHER_POTION,
        item_type: ItemType::Consumable,
        description: "A bottle of shimmering ether that restores sanity and stamina.",
        sanity: 20,
        stamina: 15,
        ..BLANK
    },
    ItemDef {
        name: keys::BANDAGE,
        item_type: ItemType::Consumable,
        description: "Clean bandages to stop the bleeding.",
        weight: 0.2,
        heal: 8,
        cures: Some(StatusKind::Burn),
        ..BLANK
    },
    ItemDef {
        name: keys::ANTIDOTE,
        item_type: ItemType::Consumable,
        description: "A bitter draught that purges venom.",
        weight: 0.3,
        heal: 2,
        cures: Some(StatusKind::Poison),
        ..BLANK
    },
];

pub fn item_def(name: &str) -> Result<&'static ItemDef, ContentError> {
    ITEMS
        .iter()
        .find(|def| def.name == name)
        .ok_or_else(|| ContentError::UnknownItem(name.to_string()))
}

pub fn all_items() -> &'static [ItemDef] {
    ITEMS
}

/// Items eligible for floor scatter: everything except weapons.
pub fn scatter_candidates() -> impl Iterator<Item = &'static ItemDef> {
    ITEMS.iter().filter(|def| def.item_type != ItemType::Weapon)
}

/// Ingredients are consumed whole; the result lands in the pack.
#[derive(Clone, Debug, PartialEq)]
pub struct Recipe {
    pub name: &'static str,
    pub ingredients: &'static [(&'static str, u32)],
    pub result: (&'static str, u32),
    pub description: &'static str,
}

static RECIPES: &[Recipe] = &[
    Recipe {
        name: keys::CLUB,
        ingredients: &[(keys::STONE, 1), (keys::WOOD, 1)],
        result: (keys::CLUB, 1),
        description: "Combine stone and wood into a crude weapon.",
    },
    Recipe {
        name: keys::COOKED_MEAT,
        ingredients: &[(keys::MEAT, 1), (keys::FIRE, 1)],
        result: (keys::COOKED_MEAT, 1),
        description: "Cook raw meat to restore more hunger.",
    },
    Recipe {
        name: keys::ETHER_BLADE,
        ingredients: &[(keys::ESSENCE, 1), (keys::BONE, 1)],
        result: (keys::ETHER_BLADE, 1),
        description: "Fuse essence and bone into a potent blade.",
    },
];

pub fn recipe(name: &str) -> Result<&'static Recipe, ContentError> {
    RECIPES
        .iter()
        .find(|recipe| recipe.name == name)
        .ok_or_else(|| ContentError::UnknownRecipe(name.to_string()))
}

pub fn all_recipes() -> &'static [Recipe] {
    RECIPES
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drop {
    pub item: &'static str,
    pub chance: f64,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnemyTemplate {
    pub kind: EnemyKind,
    pub hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub xp_reward: u32,
    pub drops: &'static [Drop],
    pub can_phase: bool,
    pub aggression_radius: i32,
    pub starts_dormant: bool,
    pub personality: Personality,
    pub flanks: bool,
    pub crit_chance: f64,
    /// Percent chance to shrug off part of an incoming strike.
    pub armor_block: u32,
    pub inflicts: &'static [(StatusKind, u8)],
    pub inflict_chance: f64,
    pub sanity_drain: i32,
    pub spawn_weight: u32,
    pub boss: bool,
}

static RAT: EnemyTemplate = EnemyTemplate {
    kind: EnemyKind::Rat,
    hp: 8,
    attack: 4,
    defense: 0,
    xp_reward: 6,
    drops: &[Drop { item: keys::MEAT, chance: 0.4, quantity: 1 }],
    can_phase: false,
    aggression_radius: 5,
    starts_dormant: false,
    personality: Personality::Cautious,
    flanks: false,
    crit_chance: 0.05,
    armor_block: 0,
    inflicts: &[(StatusKind::Poison, 2)],
    inflict_chance: 0.2,
    sanity_drain: 0,
    spawn_weight: 1,
    boss: false,
};

static SKELETON: EnemyTemplate = EnemyTemplate {
    kind: EnemyKind::Skeleton,
    hp: 20,
    attack: 6,
    defense: 2,
    xp_reward: 12,
    drops: &[
        Drop { item: keys::BONE, chance: 0.5, quantity: 1 },
        Drop { item: keys::BANDAGE, chance: 0.2, quantity: 1 },
    ],
    can_phase: false,
    aggression_radius: 6,
    starts_dormant: false,
    personality: Personality::Aggressive,
    flanks: false,
    crit_chance: 0.05,
    armor_block: 10,
    inflicts: &[],
    inflict_chance: 0.0,
    sanity_drain: 0,
    spawn_weight: 1,
    boss: false,
};

static GHOST: EnemyTemplate = EnemyTemplate {
    kind: EnemyKind::Ghost,
    hp: 18,
    attack: 7,
    defense: 1,
    xp_reward: 14,
    drops: &[Drop { item: keys::ESSENCE, chance: 0.6, quantity: 1 }],
    can_phase: true,
    aggression_radius: 8,
    starts_dormant: false,
    personality: Personality::Aggressive,
    flanks: false,
    crit_chance: 0.10,
    armor_block: 0,
    inflicts: &[(StatusKind::Fear, 2), (StatusKind::Freeze, 1)],
    inflict_chance: 0.25,
    sanity_drain: 2,
    spawn_weight: 1,
    boss: false,
};

static SHADOWLING: EnemyTemplate = EnemyTemplate {
    kind: EnemyKind::Shadowling,
    hp: 16,
    attack: 5,
    defense: 1,
    xp_reward: 11,
    drops: &[
        Drop { item: keys::ESSENCE, chance: 0.3, quantity: 1 },
        Drop { item: keys::TORCH, chance: 0.2, quantity: 1 },
    ],
    can_phase: false,
    aggression_radius: 7,
    starts_dormant: false,
    personality: Personality::Aggressive,
    flanks: true,
    crit_chance: 0.15,
    armor_block: 0,
    inflicts: &[(StatusKind::Fear, 3)],
    inflict_chance: 0.25,
    sanity_drain: 0,
    spawn_weight: 1,
    boss: false,
};

static MIMIC: EnemyTemplate = EnemyTemplate {
    kind: EnemyKind::Mimic,
    hp: 24,
    attack: 7,
    defense: 3,
    xp_reward: 18,
    drops: &[
        Drop { item: keys::ETHER_POTION, chance: 0.5, quantity: 1 },
        Drop { item: keys::ESSENCE, chance: 0.4, quantity: 1 },
    ],
    can_phase: false,
    aggression_radius: 4,
    starts_dormant: true,
    personality: Personality::Ambusher,
    flanks: false,
    crit_chance: 0.10,
    armor_block: 5,
    inflicts: &[],
    inflict_chance: 0.0,
    sanity_drain: 0,
    spawn_weight: 1,
    boss: false,
};

static ETHER_WARDEN: EnemyTemplate = EnemyTemplate {
    kind: EnemyKind::EtherWarden,
    hp: 60,
    attack: 9,
    defense: 3,
    xp_reward: 60,
    drops: &[
        Drop { item: keys::ETHER_BLADE, chance: 1.0, quantity: 1 },
        Drop { item: keys::ETHER_POTION, chance: 0.5, quantity: 2 },
    ],
    can_phase: false,
    aggression_radius: 10,
    starts_dormant: false,
    personality: Personality::Aggressive,
    flanks: false,
    crit_chance: 0.15,
    armor_block: 15,
    inflicts: &[(StatusKind::Burn, 3), (StatusKind::Freeze, 2)],
    inflict_chance: 0.3,
    sanity_drain: 3,
    spawn_weight: 0,
    boss: true,
};

pub fn enemy_template(kind: EnemyKind) -> &'static EnemyTemplate {
    match kind {
        EnemyKind::Rat => &RAT,
        EnemyKind::Skeleton => &SKELETON,
        EnemyKind::Ghost => &GHOST,
        EnemyKind::Shadowling => &SHADOWLING,
        EnemyKind::Mimic => &MIMIC,
        EnemyKind::EtherWarden => &ETHER_WARDEN,
    }
}
