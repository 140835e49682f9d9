//! Dice for caravan tests, attacks, and rest damage.
//!
//! Rolls are written as `NdS` with an optional flat modifier, e.g. `1d20+3`
//! or `1d6`. All rolling takes an explicit seeded RNG.

pub mod pool;
pub mod roll;

pub use pool::DicePool;
pub use roll::{DieResult, RollResult};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Most dice a single expression may roll.
pub const MAX_DICE: u32 = 1000;

/// Most sides a parsed die may have.
pub const MAX_SIDES: u32 = 1000;

/// A polyhedral die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Die {
    /// Four-sided die.
    D4,
    /// Six-sided die; rest damage and attack damage.
    D6,
    /// Eight-sided die.
    D8,
    /// Ten-sided die.
    D10,
    /// Twelve-sided die.
    D12,
    /// Twenty-sided die; tests and attacks.
    D20,
    /// Percentile die.
    D100,
    /// Any other number of sides.
    Custom(u32),
}

impl Die {
    /// Number of sides.
    pub fn sides(self) -> u32 {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D20 => 20,
            Self::D100 => 100,
            Self::Custom(n) => n,
        }
    }

    /// The die with the given number of sides, if it has at least two.
    pub fn with_sides(sides: u32) -> Option<Self> {
        Some(match sides {
            0 | 1 => return None,
            4 => Self::D4,
            6 => Self::D6,
            8 => Self::D8,
            10 => Self::D10,
            12 => Self::D12,
            20 => Self::D20,
            100 => Self::D100,
            n => Self::Custom(n),
        })
    }
}

impl fmt::Display for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// A dice expression: `count` dice plus a flat modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceExpr {
    /// Number of dice.
    pub count: u32,
    /// Die type.
    pub die: Die,
    /// Flat modifier added to the sum.
    pub modifier: i64,
}

impl DiceExpr {
    /// `count` dice with no modifier.
    pub fn new(count: u32, die: Die) -> Self {
        Self {
            count,
            die,
            modifier: 0,
        }
    }

    /// Add a flat modifier.
    pub fn plus(mut self, modifier: i64) -> Self {
        self.modifier = self.modifier.saturating_add(modifier);
        self
    }

    /// Parse `NdS`, `dS`, `NdS+M`, or `NdS-M`.
    ///
    /// At most [`MAX_DICE`] dice of at most [`MAX_SIDES`] sides.
    pub fn parse(text: &str) -> EngineResult<Self> {
        let invalid = || EngineError::Formula {
            formula: text.to_string(),
            message: "expected a dice expression like 1d20+2".to_string(),
        };
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let lower = compact.to_lowercase();
        let (count, rest) = lower.split_once('d').ok_or_else(invalid)?;
        let count = if count.is_empty() {
            1
        } else {
            count.parse::<u32>().map_err(|_| invalid())?
        };

        let split = rest.find(['+', '-']).unwrap_or(rest.len());
        let (sides, modifier) = rest.split_at(split);
        let sides = sides.parse::<u32>().map_err(|_| invalid())?;
        let die = Die::with_sides(sides).ok_or_else(invalid)?;
        let modifier = if modifier.is_empty() {
            0
        } else {
            modifier
                .trim_start_matches('+')
                .parse::<i64>()
                .map_err(|_| invalid())?
        };
        if count == 0 {
            return Err(invalid());
        }
        if count > MAX_DICE || sides > MAX_SIDES {
            return Err(EngineError::Formula {
                formula: text.to_string(),
                message: format!("at most {MAX_DICE} dice of up to {MAX_SIDES} sides"),
            });
        }
        Ok(Self {
            count,
            die,
            modifier,
        })
    }

    /// The pool of dice to roll.
    pub fn pool(&self) -> DicePool {
        DicePool::new().add(self.die, self.count)
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.die)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn die_sides() {
        assert_eq!(Die::D6.sides(), 6);
        assert_eq!(Die::D20.sides(), 20);
        assert_eq!(Die::Custom(3).sides(), 3);
        assert_eq!(Die::with_sides(20), Some(Die::D20));
        assert_eq!(Die::with_sides(7), Some(Die::Custom(7)));
        assert_eq!(Die::with_sides(1), None);
    }

    #[test]
    fn parse_expressions() {
        assert_eq!(DiceExpr::parse("1d6").unwrap(), DiceExpr::new(1, Die::D6));
        assert_eq!(DiceExpr::parse("d20").unwrap(), DiceExpr::new(1, Die::D20));
        assert_eq!(
            DiceExpr::parse("2D8 + 3").unwrap(),
            DiceExpr::new(2, Die::D8).plus(3)
        );
        assert_eq!(DiceExpr::parse("1d20-2").unwrap().modifier, -2);
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "d", "6", "0d6", "1d1", "1dx", "1d6+x"] {
            assert!(DiceExpr::parse(bad).is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn parse_caps_count_and_sides() {
        for bad in ["4000000000d6", "1001d6", "1d5000", "99999999999d99999999999"] {
            assert!(DiceExpr::parse(bad).is_err(), "{bad} should fail");
        }
        let err = DiceExpr::parse("4000000000d6").unwrap_err().to_string();
        assert!(err.contains("at most 1000 dice"), "{err}");
        assert_eq!(DiceExpr::parse("1000d1000").unwrap().count, MAX_DICE);
    }

    #[test]
    fn display() {
        assert_eq!(DiceExpr::new(1, Die::D20).plus(4).to_string(), "1d20+4");
        assert_eq!(DiceExpr::new(2, Die::D6).plus(-1).to_string(), "2d6-1");
        assert_eq!(DiceExpr::new(1, Die::D6).to_string(), "1d6");
    }
}
