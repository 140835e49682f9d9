//! Roll results.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Die;

/// One rolled die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieResult {
    /// The die rolled.
    pub die: Die,
    /// The face rolled (1 to `die.sides()`).
    pub value: u32,
}

/// The result of rolling a pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    /// Individual dice.
    pub dice: Vec<DieResult>,
    /// Flat modifier.
    pub modifier: i64,
}

impl RollResult {
    /// Sum of the dice, without the modifier.
    pub fn natural(&self) -> i64 {
        self.dice.iter().map(|d| i64::from(d.value)).sum()
    }

    /// Dice plus modifier.
    pub fn total(&self) -> i64 {
        self.natural().saturating_add(self.modifier)
    }

    /// Returns true for a single die showing its highest face.
    pub fn is_natural_max(&self) -> bool {
        matches!(self.dice.as_slice(), [d] if d.value == d.die.sides())
    }

    /// Returns true for a single die showing 1.
    pub fn is_natural_one(&self) -> bool {
        matches!(self.dice.as_slice(), [d] if d.value == 1)
    }
}

impl fmt::Display for RollResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.dice.iter().map(|d| d.value.to_string()).collect();
        write!(f, "[{}]", values.join(", "))?;
        match self.modifier {
            0 => {}
            m if m > 0 => write!(f, " + {m}")?,
            m => write!(f, " - {}", -m)?,
        }
        write!(f, " = {}", self.total())
    }
}
