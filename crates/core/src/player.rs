//! The delver: vitals, progression, equipment and item effects.
//! This module exists so the player's bookkeeping stays independent of turn sequencing.
//! It does not own combat rounds or the map; it reacts to them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::content::{ItemType, WeaponClass, item_def, keys, recipe};
use crate::error::ContentError;
use crate::inventory::Inventory;
use crate::status::{StatusEffects, StatusHost, StatusTick, tick_statuses};
use crate::types::*;

pub const DARKNESS_VISION: i32 = 2;
const DEFAULT_BLOCK_CHANCE: u32 = 5;
const XP_GROWTH_PER_LEVEL: u32 = 15;
const KARMA_FLOOR: i32 = -50;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipped {
    pub item: String,
    pub durability: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Pos,
    pub hp: i32,
    pub max_hp: i32,
    pub stamina: i32,
    pub max_stamina: i32,
    pub sanity: i32,
    pub max_sanity: i32,
    pub hunger: i32,
    pub max_hunger: i32,
    pub fatigue: i32,
    pub max_fatigue: i32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub base_attack: i32,
    pub base_defense: i32,
    pub light_radius: i32,
    pub light_bonus: i32,
    pub light_timer: u32,
    pub karma: i32,
    pub skill_points: u32,
    pub melee: Option<Equipped>,
    pub ranged: Option<Equipped>,
    pub armor: Option<Equipped>,
    pub inventory: Inventory,
    /// Durability left on unequipped gear sitting in the pack, lowest per name.
    pub spare_wear: BTreeMap<String, u32>,
    pub statuses: StatusEffects,
}

impl Player {
    /// A fresh delver with the starter kit, dagger and bow in hand.
    pub fn new(pos: Pos) -> Result<Self, ContentError> {
        let mut player = Self {
            pos,
            hp: 36,
            max_hp: 36,
            stamina: 24,
            max_stamina: 24,
            sanity: 36,
            max_sanity: 36,
            hunger: 100,
            max_hunger: 100,
            fatigue: 0,
            max_fatigue: 100,
            level: 1,
            xp: 0,
            xp_to_next: 25,
            base_attack: 4,
            base_defense: 1,
            light_radius: 5,
            light_bonus: 0,
            light_timer: 0,
            karma: 0,
            skill_points: 0,
            melee: None,
            ranged: None,
            armor: None,
            inventory: Inventory::default(),
            spare_wear: BTreeMap::new(),
            statuses: StatusEffects::default(),
        };
        for (name, quantity) in [
            (keys::TORCH, 1),
            (keys::BREAD, 2),
            (keys::DAGGER, 1),
            (keys::BONE_BOW, 1),
            (keys::BANDAGE, 1),
        ] {
            player.inventory.add(name, quantity)?;
        }
        player.equip(keys::DAGGER)?;
        player.equip(keys::BONE_BOW)?;
        Ok(player)
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0 && self.sanity > 0
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        if self.hp <= 0 {
            Some(DeathCause::Wounds)
        } else if self.sanity <= 0 {
            Some(DeathCause::Madness)
        } else {
            None
        }
    }

    pub fn attack(&self) -> Result<i32, ContentError> {
        Ok(self.base_attack + weapon_bonus(self.melee.as_ref())? + self.status_attack_penalty())
    }

    pub fn ranged_attack(&self) -> Result<i32, ContentError> {
        Ok(self.base_attack + weapon_bonus(self.ranged.as_ref())? + self.status_attack_penalty())
    }

    pub fn defense(&self) -> Result<i32, ContentError> {
        let mut bonus = match &self.armor {
            Some(worn) => item_def(&worn.item)?.defense_bonus,
            None => 0,
        };
        if self.statuses.contains(StatusKind::Fear) {
            bonus = (bonus - 1).max(0);
        }
        Ok(self.base_defense + bonus)
    }

    /// Percent chance that armor turns part of a hit.
    pub fn armor_block_chance(&self) -> Result<u32, ContentError> {
        match &self.armor {
            Some(worn) => Ok(item_def(&worn.item)?.block_chance.unwrap_or(DEFAULT_BLOCK_CHANCE)),
            None => Ok(DEFAULT_BLOCK_CHANCE),
        }
    }

    pub fn crit_bonus(&self, class: WeaponClass) -> Result<f64, ContentError> {
        match self.slot(class) {
            Some(held) => Ok(item_def(&held.item)?.crit_bonus),
            None => Ok(0.0),
        }
    }

    pub fn weapon_inflicts(&self, class: WeaponClass) -> Result<Option<(StatusKind, u8)>, ContentError> {
        match self.slot(class) {
            Some(held) => Ok(item_def(&held.item)?.inflicts),
            None => Ok(None),
        }
    }

    pub fn slot(&self, class: WeaponClass) -> Option<&Equipped> {
        match class {
            WeaponClass::Melee => self.melee.as_ref(),
            WeaponClass::Ranged => self.ranged.as_ref(),
        }
    }

    pub fn vision_radius(&self, darkened: bool) -> i32 {
        let radius = self.light_radius + self.light_bonus;
        if darkened { radius.min(DARKNESS_VISION) } else { radius }
    }

    pub fn overburdened(&self) -> Result<bool, ContentError> {
        self.inventory.is_over_limit()
    }

    fn status_attack_penalty(&self) -> i32 {
        let mut penalty = 0;
        if self.statuses.contains(StatusKind::Fear) {
            penalty -= 2;
        }
        if self.statuses.contains(StatusKind::Freeze) {
            penalty -= 1;
        }
        penalty
    }

    /// Per-action costs: hunger, stamina, fatigue, light burn-down and status ticks.
    pub fn upkeep(&mut self) -> Result<StatusTick, ContentError> {
        let burden = if self.overburdened()? { 2 } else { 1 };
        self.hunger = (self.hunger - 1).max(0);
        self.stamina = (self.stamina - burden).max(0);
        self.fatigue = (self.fatigue + 3).min(self.max_fatigue);
        if self.hunger == 0 {
            self.hp = (self.hp - 1).max(0);
        }
        if self.stamina == 0 {
            self.sanity = (self.sanity - 1).max(0);
        }
        if self.fatigue >= self.max_fatigue {
            self.sanity = (self.sanity - 1).max(0);
        }
        if self.light_timer > 0 {
            self.light_timer -= 1;
            if self.light_timer == 0 {
                self.light_bonus = 0;
            }
        }
        Ok(tick_statuses(self))
    }

    pub fn rest(&mut self) -> LogEvent {
        self.stamina = (self.stamina + 4).min(self.max_stamina);
        self.heal(2);
        self.restore_sanity(1);
        self.fatigue = (self.fatigue - 8).max(0);
        LogEvent::Rested
    }

    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    pub fn restore_sanity(&mut self, amount: i32) {
        self.sanity = (self.sanity + amount).min(self.max_sanity);
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).max(0);
    }

    pub fn drain_sanity(&mut self, amount: i32) {
        self.sanity = (self.sanity - amount).max(0);
    }

    pub fn apply_status(&mut self, kind: StatusKind, turns: u8) {
        self.statuses.apply(kind, turns);
    }

    /// Moves a weapon or armor out of the pack into its slot. Whatever the slot held goes
    /// back into the pack with its wear remembered; if it cannot, nothing changes.
    pub fn equip(&mut self, name: &str) -> Result<LogEvent, ContentError> {
        let def = item_def(name)?;
        let slot = match (def.item_type, def.weapon_class) {
            (ItemType::Weapon, Some(WeaponClass::Ranged)) => EquipSlot::Ranged,
            (ItemType::Weapon, _) => EquipSlot::Melee,
            (ItemType::Armor, _) => EquipSlot::Armor,
            _ => {
                return Ok(LogEvent::ItemDescribed {
                    item: name.to_string(),
                    description: def.description,
                });
            }
        };
        if !self.inventory.remove(name, 1) {
            return Ok(LogEvent::ItemMissing { item: name.to_string() });
        }
        if let Some(previous) = self.gear(slot).clone() {
            if !self.inventory.add(&previous.item, 1)? {
                self.inventory.add(name, 1)?;
                return Ok(LogEvent::PackFull { item: previous.item });
            }
            if previous.durability < item_def(&previous.item)?.durability {
                self.spare_wear
                    .entry(previous.item)
                    .and_modify(|left| *left = (*left).min(previous.durability))
                    .or_insert(previous.durability);
            }
        }
        let durability = self.spare_wear.remove(name).unwrap_or(def.durability);
        *self.gear(slot) = Some(Equipped { item: name.to_string(), durability });
        Ok(LogEvent::Equipped { item: name.to_string(), slot })
    }

    fn gear(&mut self, slot: EquipSlot) -> &mut Option<Equipped> {
        match slot {
            EquipSlot::Melee => &mut self.melee,
            EquipSlot::Ranged => &mut self.ranged,
            EquipSlot::Armor => &mut self.armor,
        }
    }

    /// Consumes food/consumables/light sources, equips gear, or describes anything else.
    pub fn use_item(&mut self, name: &str) -> Result<Vec<LogEvent>, ContentError> {
        let def = item_def(name)?;
        if !self.inventory.has(name, 1) {
            return Ok(vec![LogEvent::ItemMissing { item: name.to_string() }]);
        }
        let events = match def.item_type {
            ItemType::Food | ItemType::Consumable => {
                self.heal(def.heal);
                self.stamina = (self.stamina + def.stamina).min(self.max_stamina);
                self.restore_sanity(def.sanity);
                self.hunger = (self.hunger + def.hunger).min(self.max_hunger);
                if let Some(cured) = def.cures {
                    self.statuses.remove(cured);
                }
                self.inventory.remove(name, 1);
                vec![LogEvent::ItemConsumed { item: name.to_string() }]
            }
            ItemType::Weapon | ItemType::Armor => vec![self.equip(name)?],
            ItemType::Utility if def.light_bonus > 0 => {
                self.light_bonus = self.light_bonus.max(def.light_bonus);
                self.light_timer = self.light_timer.max(def.light_duration);
                self.inventory.remove(name, 1);
                vec![LogEvent::LightRaised]
            }
            ItemType::Utility | ItemType::Ingredient => {
                vec![LogEvent::ItemDescribed { item: name.to_string(), description: def.description }]
            }
        };
        Ok(events)
    }

    /// Turns a recipe's ingredients into its result. Ingredients are only spent when the
    /// result fits in the pack.
    pub fn craft(&mut self, name: &str) -> Result<LogEvent, ContentError> {
        let recipe = recipe(name)?;
        if !recipe.ingredients.iter().all(|&(item, quantity)| self.inventory.has(item, quantity)) {
            return Ok(LogEvent::MissingIngredients { recipe: name.to_string() });
        }
        for &(item, quantity) in recipe.ingredients {
            self.inventory.remove(item, quantity);
        }
        let (item, quantity) = recipe.result;
        if !self.inventory.add(item, quantity)? {
            for &(ingredient, count) in recipe.ingredients {
                self.inventory.add(ingredient, count)?;
            }
            return Ok(LogEvent::PackFull { item: item.to_string() });
        }
        Ok(LogEvent::Crafted { item: item.to_string(), quantity })
    }

    /// Adds XP and applies every level-up it pays for.
    pub fn gain_xp(&mut self, amount: u32) -> Vec<LogEvent> {
        self.xp += amount;
        let mut events = vec![LogEvent::GainedXp { amount }];
        while self.xp >= self.xp_to_next {
            self.level += 1;
            self.xp -= self.xp_to_next;
            self.xp_to_next += XP_GROWTH_PER_LEVEL;
            self.max_hp += 4;
            self.max_stamina += 3;
            self.max_sanity += 2;
            self.base_attack += 1;
            self.base_defense += 1;
            self.skill_points += 1;
            self.hp = self.max_hp;
            self.stamina = self.max_stamina;
            self.sanity = self.max_sanity;
            debug!(level = self.level, "level up");
            events.push(LogEvent::LevelUp { level: self.level });
        }
        events
    }

    pub fn spend_skill_point(&mut self, attribute: Attribute) -> LogEvent {
        if self.skill_points == 0 {
            return LogEvent::NoSkillPoints;
        }
        match attribute {
            Attribute::Hp => self.max_hp += 5,
            Attribute::Stamina => self.max_stamina += 4,
            Attribute::Sanity => self.max_sanity += 3,
            Attribute::Attack => self.base_attack += 1,
            Attribute::Defense => self.base_defense += 1,
        }
        self.skill_points -= 1;
        LogEvent::SkillPointSpent { attribute }
    }

    /// One hit's wear on the weapon in `class`; a broken weapon leaves its slot.
    pub fn degrade_weapon(&mut self, class: WeaponClass) -> Option<LogEvent> {
        let slot = match class {
            WeaponClass::Melee => &mut self.melee,
            WeaponClass::Ranged => &mut self.ranged,
        };
        wear(slot).map(|item| LogEvent::WeaponBroke { item })
    }

    pub fn degrade_armor(&mut self) -> Option<LogEvent> {
        wear(&mut self.armor).map(|item| LogEvent::ArmorBroke { item })
    }

    /// Darkness snuffs any active light source.
    pub fn snuff_light(&mut self) {
        self.light_bonus = 0;
        self.light_timer = 0;
    }
}

fn weapon_bonus(held: Option<&Equipped>) -> Result<i32, ContentError> {
    match held {
        Some(held) => Ok(item_def(&held.item)?.attack_bonus),
        None => Ok(0),
    }
}

/// Returns the item name when this wear broke it.
fn wear(slot: &mut Option<Equipped>) -> Option<String> {
    let held = slot.as_mut()?;
    held.durability = held.durability.saturating_sub(1);
    if held.durability > 0 {
        return None;
    }
    slot.take().map(|broken| broken.item)
}

impl StatusHost for Player {
    fn subject(&self) -> Subject {
        Subject::Player
    }

    fn statuses_mut(&mut self) -> &mut StatusEffects {
        &mut self.statuses
    }

    fn lose_hp(&mut self, amount: i32) {
        self.take_damage(amount);
    }

    fn is_alive(&self) -> bool {
        Player::is_alive(self)
    }

    fn lose_sanity(&mut self, amount: i32) {
        self.drain_sanity(amount);
    }

    fn lose_stamina(&mut self, amount: i32) {
        self.stamina = (self.stamina - amount).max(0);
    }

    fn suffer_fear(&mut self) {
        self.karma = (self.karma - 1).max(KARMA_FLOOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Player {
        Player::new(Pos { y: 1, x: 1 }).expect("starter kit is catalogued")
    }

    #[test]
    fn starter_kit_is_equipped() {
        let player = fresh();
        assert_eq!(player.melee.as_ref().map(|m| m.item.as_str()), Some(keys::DAGGER));
        assert_eq!(player.ranged.as_ref().map(|r| r.item.as_str()), Some(keys::BONE_BOW));
        assert_eq!(player.inventory.count(keys::BREAD), 2);
        assert_eq!(player.attack(), Ok(6));
        assert_eq!(player.ranged_attack(), Ok(7));
        assert_eq!(player.armor_block_chance(), Ok(5));
    }

    #[test]
    fn fear_and_freeze_sap_attack_and_defense() {
        let mut player = fresh();
        player.apply_status(StatusKind::Fear, 2);
        player.apply_status(StatusKind::Freeze, 2);
        assert_eq!(player.attack(), Ok(3));
        // No armor bonus to lose, base defense untouched.
        assert_eq!(player.defense(), Ok(1));
    }

    #[test]
    fn xp_cascades_through_several_levels() {
        let mut player = fresh();
        player.hp = 3;
        let events = player.gain_xp(25 + 40 + 5);
        assert_eq!(player.level, 3);
        assert_eq!(player.xp, 5);
        assert_eq!(player.xp_to_next, 55);
        assert_eq!(player.skill_points, 2);
        assert_eq!(player.hp, player.max_hp);
        assert_eq!(player.max_hp, 44);
        let levels: Vec<_> =
            events.iter().filter(|e| matches!(e, LogEvent::LevelUp { .. })).collect();
        assert_eq!(levels.len(), 2);
    }

    #[test]
    fn upkeep_starves_and_burns_down_light() {
        let mut player = fresh();
        player.hunger = 1;
        player.light_bonus = 3;
        player.light_timer = 1;
        let hp = player.hp;
        player.upkeep().unwrap();
        assert_eq!(player.hunger, 0);
        assert_eq!(player.hp, hp - 1);
        assert_eq!(player.light_bonus, 0);
        assert_eq!(player.fatigue, 3);
    }

    #[test]
    fn an_overloaded_pack_doubles_the_stamina_cost() {
        let mut player = fresh();
        player.upkeep().unwrap();
        assert_eq!(player.stamina, 23);

        assert_eq!(player.inventory.add(keys::STONE, 30), Ok(true));
        assert_eq!(player.overburdened(), Ok(true));
        player.upkeep().unwrap();
        assert_eq!(player.stamina, 21);

        player.inventory.remove(keys::STONE, 30);
        player.upkeep().unwrap();
        assert_eq!(player.stamina, 20);
    }

    #[test]
    fn using_food_consumes_one_and_caps_restores() {
        let mut player = fresh();
        player.hp = 34;
        let events = player.use_item(keys::BREAD).unwrap();
        assert_eq!(events, vec![LogEvent::ItemConsumed { item: keys::BREAD.into() }]);
        assert_eq!(player.hp, 36);
        assert_eq!(player.inventory.count(keys::BREAD), 1);
    }

    #[test]
    fn use_item_distinguishes_missing_from_unknown() {
        let mut player = fresh();
        assert_eq!(
            player.use_item(keys::MUSHROOM),
            Ok(vec![LogEvent::ItemMissing { item: keys::MUSHROOM.into() }])
        );
        assert!(player.use_item("Glass Key").is_err());
    }

    #[test]
    fn torch_raises_light_and_is_spent() {
        let mut player = fresh();
        player.use_item(keys::TORCH).unwrap();
        assert_eq!(player.vision_radius(false), 8);
        assert_eq!(player.vision_radius(true), DARKNESS_VISION);
        assert!(!player.inventory.has(keys::TORCH, 1));
    }

    #[test]
    fn weapon_unequips_when_durability_runs_out() {
        let mut player = fresh();
        if let Some(melee) = player.melee.as_mut() {
            melee.durability = 1;
        }
        assert_eq!(
            player.degrade_weapon(WeaponClass::Melee),
            Some(LogEvent::WeaponBroke { item: keys::DAGGER.into() })
        );
        assert!(player.melee.is_none());
        assert_eq!(player.degrade_weapon(WeaponClass::Melee), None);
    }

    #[test]
    fn broken_weapon_is_gone_for_good() {
        let mut player = fresh();
        assert!(!player.inventory.has(keys::DAGGER, 1));
        if let Some(melee) = player.melee.as_mut() {
            melee.durability = 1;
        }
        player.degrade_weapon(WeaponClass::Melee);
        assert_eq!(
            player.use_item(keys::DAGGER),
            Ok(vec![LogEvent::ItemMissing { item: keys::DAGGER.into() }])
        );
        assert!(player.melee.is_none());
    }

    #[test]
    fn swapped_out_gear_keeps_its_wear() {
        let mut player = fresh();
        if let Some(melee) = player.melee.as_mut() {
            melee.durability = 3;
        }
        player.inventory.add(keys::CLUB, 1).unwrap();
        assert_eq!(
            player.equip(keys::CLUB),
            Ok(LogEvent::Equipped { item: keys::CLUB.into(), slot: EquipSlot::Melee })
        );
        assert_eq!(player.inventory.count(keys::DAGGER), 1);
        assert!(!player.inventory.has(keys::CLUB, 1));

        player.equip(keys::DAGGER).unwrap();
        assert_eq!(player.melee, Some(Equipped { item: keys::DAGGER.into(), durability: 3 }));
        assert!(player.spare_wear.is_empty());
    }

    #[test]
    fn swap_is_refused_when_the_old_piece_has_nowhere_to_go() {
        let mut player = fresh();
        player.inventory.add(keys::CLUB, 2).unwrap();
        player.inventory.capacity = player.inventory.stacks().count();
        assert_eq!(player.equip(keys::CLUB), Ok(LogEvent::PackFull { item: keys::DAGGER.into() }));
        assert_eq!(player.inventory.count(keys::CLUB), 2);
        assert_eq!(player.melee.as_ref().map(|m| m.item.as_str()), Some(keys::DAGGER));
    }

    #[test]
    fn crafting_spends_ingredients_on_the_result() {
        let mut player = fresh();
        player.inventory.add(keys::STONE, 2).unwrap();
        player.inventory.add(keys::WOOD, 1).unwrap();
        assert_eq!(player.craft(keys::CLUB), Ok(LogEvent::Crafted { item: keys::CLUB.into(), quantity: 1 }));
        assert_eq!(player.inventory.count(keys::CLUB), 1);
        assert_eq!(player.inventory.count(keys::STONE), 1);
        assert!(!player.inventory.has(keys::WOOD, 1));
    }

    #[test]
    fn crafting_without_every_ingredient_changes_nothing() {
        let mut player = fresh();
        player.inventory.add(keys::MEAT, 1).unwrap();
        let before = player.inventory.clone();
        assert_eq!(
            player.craft(keys::COOKED_MEAT),
            Ok(LogEvent::MissingIngredients { recipe: keys::COOKED_MEAT.into() })
        );
        assert_eq!(player.inventory, before);
        assert!(player.craft("Soup").is_err());
    }

    #[test]
    fn crafted_item_that_does_not_fit_refunds_the_ingredients() {
        let mut player = fresh();
        player.inventory.add(keys::ESSENCE, 2).unwrap();
        player.inventory.add(keys::BONE, 2).unwrap();
        player.inventory.capacity = player.inventory.stacks().count();
        let before = player.inventory.clone();
        assert_eq!(player.craft(keys::ETHER_BLADE), Ok(LogEvent::PackFull { item: keys::ETHER_BLADE.into() }));
        assert_eq!(player.inventory, before);
    }

    #[test]
    fn alive_needs_both_body_and_mind() {
        let mut player = fresh();
        player.sanity = 0;
        assert!(!player.is_alive());
        assert_eq!(player.death_cause(), Some(DeathCause::Madness));
    }
}
