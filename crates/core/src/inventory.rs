use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::content::item_def;
use crate::error::ContentError;

pub const DEFAULT_STACK_CAPACITY: usize = 16;
pub const DEFAULT_WEIGHT_LIMIT: f64 = 45.0;

/// Name-keyed item stacks. Only the stack count is a hard bound; weight past
/// `weight_limit` is carried but leaves the owner overburdened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    stacks: BTreeMap<String, u32>,
    pub capacity: usize,
    pub weight_limit: f64,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(DEFAULT_STACK_CAPACITY, DEFAULT_WEIGHT_LIMIT)
    }
}

impl Inventory {
    pub fn new(capacity: usize, weight_limit: f64) -> Self {
        Self { stacks: BTreeMap::new(), capacity, weight_limit }
    }

    /// Returns `Ok(false)` when `name` would need a new stack and every slot is taken.
    pub fn add(&mut self, name: &str, quantity: u32) -> Result<bool, ContentError> {
        item_def(name)?;
        if quantity == 0 {
            return Ok(true);
        }
        if !self.stacks.contains_key(name) && self.stacks.len() >= self.capacity {
            return Ok(false);
        }
        *self.stacks.entry(name.to_string()).or_insert(0) += quantity;
        Ok(true)
    }

    /// Returns false and leaves the stack alone when fewer than `quantity` are held.
    pub fn remove(&mut self, name: &str, quantity: u32) -> bool {
        let Some(count) = self.stacks.get_mut(name) else {
            return false;
        };
        if *count < quantity {
            return false;
        }
        *count -= quantity;
        if *count == 0 {
            self.stacks.remove(name);
        }
        true
    }

    pub fn has(&self, name: &str, quantity: u32) -> bool {
        self.count(name) >= quantity.max(1)
    }

    pub fn count(&self, name: &str) -> u32 {
        self.stacks.get(name).copied().unwrap_or(0)
    }

    pub fn total_weight(&self) -> Result<f64, ContentError> {
        self.stacks
            .iter()
            .map(|(name, &count)| -> Result<f64, ContentError> {
                Ok(item_def(name)?.weight * f64::from(count))
            })
            .sum()
    }

    pub fn is_over_limit(&self) -> Result<bool, ContentError> {
        Ok(self.total_weight()? > self.weight_limit)
    }

    pub fn is_full(&self) -> bool {
        self.stacks.len() >= self.capacity
    }

    pub fn stacks(&self) -> impl Iterator<Item = (&str, u32)> {
        self.stacks.iter().map(|(name, &count)| (name.as_str(), count))
    }
}
