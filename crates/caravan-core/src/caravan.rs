use std::fmt;

use serde::{Deserialize, Serialize};

/// The persisted state of a caravan: everything a player edits directly.
///
/// Derived values (totals, maxima, consumption) are never stored here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Caravan {
    /// Hit points, unrest, and provisions.
    pub attributes: Attributes,
    /// Level, travel condition, and free-form notes.
    pub details: Details,
    /// The four base statistics.
    pub statistics: Statistics,
    /// Base capacities before wagons and feats raise them.
    pub capacity: Capacity,
    /// Coin purse.
    pub currency: Currency,
}

/// Attribute block of a caravan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    /// Current hit points.
    pub hp: CurrentValue,
    /// Current unrest.
    pub unrest: CurrentValue,
    /// Provisions on hand, in daily rations.
    pub provisions: i64,
}

/// A stored current value (`{ "value": n }`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrentValue {
    /// The current value.
    pub value: i64,
}

/// Descriptive details of a caravan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Details {
    /// Caravan level (at least 1 once derived).
    pub level: i64,
    /// Free-form notes.
    pub notes: String,
    /// Travel condition.
    pub condition: Condition,
}

impl Default for Details {
    fn default() -> Self {
        Self {
            level: 1,
            notes: String::new(),
            condition: Condition::Normal,
        }
    }
}

/// The travel condition of a caravan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    /// No penalties.
    #[default]
    Normal,
    /// Penalties to attack, security, and resolve; half speed.
    Fatigued,
    /// Heavy penalties and no movement.
    Exhausted,
}

impl Condition {
    /// Parse a condition from its lowercase name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "fatigued" => Some(Self::Fatigued),
            "exhausted" => Some(Self::Exhausted),
            _ => None,
        }
    }

    /// Capitalized display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Fatigued => "Fatigued",
            Self::Exhausted => "Exhausted",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Fatigued => write!(f, "fatigued"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// One of the four base statistics a player assigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatisticKey {
    /// Fighting strength; feeds attack.
    Offense,
    /// Protection; feeds armor class.
    Defense,
    /// Speed and awareness; feeds security.
    Mobility,
    /// Spirit; feeds resolve and the unrest limit.
    Morale,
}

impl StatisticKey {
    /// All base statistics in sheet order.
    pub const ALL: [StatisticKey; 4] = [Self::Offense, Self::Defense, Self::Mobility, Self::Morale];

    /// The key used in field paths (`statistics.<key>.total`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Offense => "offense",
            Self::Defense => "defense",
            Self::Mobility => "mobility",
            Self::Morale => "morale",
        }
    }

    /// Parse a statistic from its path key.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for StatisticKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four base statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Statistics {
    /// Offense base.
    pub offense: StatisticBase,
    /// Defense base.
    pub defense: StatisticBase,
    /// Mobility base.
    pub mobility: StatisticBase,
    /// Morale base.
    pub morale: StatisticBase,
}

impl Statistics {
    /// Build a statistics block from four base values.
    pub fn new(offense: i64, defense: i64, mobility: i64, morale: i64) -> Self {
        Self {
            offense: StatisticBase { base: offense },
            defense: StatisticBase { base: defense },
            mobility: StatisticBase { base: mobility },
            morale: StatisticBase { base: morale },
        }
    }

    /// Base value of a statistic.
    pub fn base(&self, key: StatisticKey) -> i64 {
        match key {
            StatisticKey::Offense => self.offense.base,
            StatisticKey::Defense => self.defense.base,
            StatisticKey::Mobility => self.mobility.base,
            StatisticKey::Morale => self.morale.base,
        }
    }
}

/// A stored base value that defaults to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticBase {
    /// The assigned base value.
    pub base: i64,
}

impl Default for StatisticBase {
    fn default() -> Self {
        Self { base: 1 }
    }
}

/// Base capacities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capacity {
    /// Cargo units carried without wagons.
    pub cargo: CapacityBase,
    /// Travelers carried without wagons.
    pub travelers: CapacityBase,
    /// Wagons the caravan can field.
    pub wagons: CapacityBase,
}

impl Default for Capacity {
    fn default() -> Self {
        Self {
            cargo: CapacityBase { base: 0 },
            travelers: CapacityBase { base: 0 },
            wagons: CapacityBase { base: 5 },
        }
    }
}

/// A stored capacity base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityBase {
    /// The base capacity.
    pub base: i64,
}

/// A purse of platinum, gold, silver, and copper pieces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Currency {
    /// Platinum pieces (10 gp each).
    pub pp: i64,
    /// Gold pieces.
    pub gp: i64,
    /// Silver pieces (1/10 gp).
    pub sp: i64,
    /// Copper pieces (1/100 gp).
    pub cp: i64,
}

impl Currency {
    /// Total worth in copper pieces.
    pub fn total_cp(&self) -> i64 {
        self.pp * 1000 + self.gp * 100 + self.sp * 10 + self.cp
    }

    /// Split a copper amount into coins, largest denomination first.
    ///
    /// Platinum is only used when `use_platinum` is set; otherwise gold
    /// absorbs everything above silver.
    pub fn split(cp: i64, use_platinum: bool) -> Self {
        let mut rest = cp.max(0);
        let pp = if use_platinum { rest / 1000 } else { 0 };
        rest -= pp * 1000;
        let gp = rest / 100;
        rest -= gp * 100;
        let sp = rest / 10;
        rest -= sp * 10;
        Self { pp, gp, sp, cp: rest }
    }
}

impl std::ops::Add for Currency {
    type Output = Currency;

    fn add(self, rhs: Currency) -> Currency {
        Currency {
            pp: self.pp + rhs.pp,
            gp: self.gp + rhs.gp,
            sp: self.sp + rhs.sp,
            cp: self.cp + rhs.cp,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}pp {}gp {}sp {}cp", self.pp, self.gp, self.sp, self.cp)
    }
}
