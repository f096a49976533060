//! Seeded randomness for the simulation.
//! This module exists so every probabilistic call takes an explicit source and runs are
//! reproducible from `(seed, inputs)`. It does not own any gameplay odds.

use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

/// Uniform float source with the derived helpers the simulation needs.
pub trait RandomSource {
    /// Uniform float in `[0, 1)`.
    fn unit_f64(&mut self) -> f64;

    fn chance(&mut self, p: f64) -> bool {
        self.unit_f64() < p
    }

    /// Uniform integer in `lo..=hi`. Returns `lo` when the range is empty.
    fn range_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let span = i64::from(hi) - i64::from(lo) + 1;
        let offset = ((self.unit_f64() * span as f64) as i64).min(span - 1);
        (i64::from(lo) + offset) as i32
    }

    fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        ((self.unit_f64() * len as f64) as usize).min(len - 1)
    }

    fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = self.index(items.len());
        items.get(idx)
    }

    /// Index drawn proportionally to `weights`; `None` when every weight is zero.
    fn weighted_index(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u64 = weights.iter().map(|&w| u64::from(w)).sum();
        if total == 0 {
            return None;
        }
        let mut roll = ((self.unit_f64() * total as f64) as u64).min(total - 1);
        for (idx, &weight) in weights.iter().enumerate() {
            let weight = u64::from(weight);
            if roll < weight {
                return Some(idx);
            }
            roll -= weight;
        }
        None
    }

    /// Fisher-Yates.
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}

/// The single entropy stream a run draws from.
pub struct GameRng {
    inner: ChaCha8Rng,
}

impl GameRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self { inner: ChaCha8Rng::seed_from_u64(seed) }
    }
}

impl RandomSource for GameRng {
    fn unit_f64(&mut self) -> f64 {
        // 53 high bits map exactly onto the f64 mantissa.
        (self.inner.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}
