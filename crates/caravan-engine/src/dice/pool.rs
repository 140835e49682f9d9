//! Dice pools.

use rand::Rng;
use rand::rngs::StdRng;

use super::Die;
use super::roll::{DieResult, RollResult};

/// Dice rolled together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DicePool {
    /// The dice in the pool.
    pub dice: Vec<Die>,
}

impl DicePool {
    /// An empty pool.
    pub fn new() -> Self {
        Self { dice: Vec::new() }
    }

    /// Add `count` dice of one type.
    pub fn add(mut self, die: Die, count: u32) -> Self {
        self.dice.extend(std::iter::repeat_n(die, count as usize));
        self
    }

    /// Number of dice.
    pub fn count(&self) -> usize {
        self.dice.len()
    }

    /// Returns true if the pool has no dice.
    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }

    /// Roll every die, adding `modifier` to the result.
    pub fn roll(&self, rng: &mut StdRng, modifier: i64) -> RollResult {
        let dice = self
            .dice
            .iter()
            .map(|&die| DieResult {
                die,
                value: rng.random_range(1..=die.sides()),
            })
            .collect();
        RollResult { dice, modifier }
    }
}
