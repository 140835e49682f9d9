//! Derived caravan values.
//!
//! Derivation runs in two phases. [`derive_baseline`] clamps the stored
//! values and resets every derived field to a neutral starting point;
//! the modifier pipeline in [`crate::changes`] then accumulates bonuses
//! and penalties on top. Nothing derived is ever stored back.

use std::collections::BTreeMap;

use caravan_core::caravan::{Caravan, Condition, Currency, StatisticKey, Statistics};
use caravan_core::change::ChangeOperator;
use caravan_core::document::CaravanDocument;
use caravan_core::CoreError;
use serde::Serialize;
use serde_json::Value;

use crate::aggregate::{aggregate, Aggregates, CargoTally, FeatTally, Headcount};
use crate::changes;
use crate::error::EngineResult;
use crate::formula::RollData;
use crate::merge::Roster;
use crate::registry::Registries;

/// Highest value a base statistic can have.
pub const STATISTIC_CAP: i64 = 10;

/// Armor class before any modifier.
pub const BASE_ARMOR_CLASS: i64 = 10;

/// Caravan speed before any modifier, in miles per day.
pub const BASE_SPEED: i64 = 32;

/// A base statistic after clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatisticTotal {
    /// Clamped base value.
    pub base: i64,
    /// Base plus modifiers.
    pub total: i64,
}

/// Base and derived statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStatistics {
    /// Offense.
    pub offense: StatisticTotal,
    /// Defense.
    pub defense: StatisticTotal,
    /// Mobility.
    pub mobility: StatisticTotal,
    /// Morale.
    pub morale: StatisticTotal,
    /// Attack bonus.
    pub attack: i64,
    /// Armor class.
    pub armor_class: i64,
    /// Security bonus.
    pub security: i64,
    /// Resolve bonus.
    pub resolve: i64,
}

impl DerivedStatistics {
    /// A base statistic by key.
    pub fn get(&self, key: StatisticKey) -> StatisticTotal {
        match key {
            StatisticKey::Offense => self.offense,
            StatisticKey::Defense => self.defense,
            StatisticKey::Mobility => self.mobility,
            StatisticKey::Morale => self.morale,
        }
    }
}

/// Hit points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HitPoints {
    /// Current hit points, never negative.
    pub value: i64,
    /// Maximum hit points.
    pub max: i64,
}

/// Unrest and the point where it turns into mutiny.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Unrest {
    /// Current unrest, never negative.
    pub value: i64,
    /// Unrest tolerated before penalties apply.
    pub limit: i64,
}

/// Derived attribute block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DerivedAttributes {
    /// Hit points.
    pub hp: HitPoints,
    /// Unrest.
    pub unrest: Unrest,
    /// Provisions on hand.
    pub provisions: i64,
    /// Provisions consumed per day.
    pub consumption: i64,
}

/// Speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Speed {
    /// Unmodified speed.
    pub base: i64,
    /// Speed after modifiers.
    pub total: i64,
}

/// Derived details block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DerivedDetails {
    /// Caravan level, at least 1.
    pub level: i64,
    /// Travel condition.
    pub condition: Condition,
    /// Speed.
    pub speed: Speed,
    /// Monthly wages owed.
    pub wages: i64,
}

/// One contribution to a derived field, kept for breakdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceEntry {
    /// Where the contribution came from.
    pub label: String,
    /// Evaluated value.
    pub value: i64,
    /// Bonus type.
    pub modifier: String,
    /// How the value was combined.
    pub operator: ChangeOperator,
    /// False when a higher bonus of the same type overrode this one.
    pub applied: bool,
}

/// A caravan with every derived value computed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedCaravan {
    /// Attributes.
    pub attributes: DerivedAttributes,
    /// Details.
    pub details: DerivedDetails,
    /// Statistics.
    pub statistics: DerivedStatistics,
    /// Travelers.
    pub travelers: Headcount,
    /// Wagons.
    pub wagons: Headcount,
    /// Cargo.
    pub cargo: CargoTally,
    /// Feats.
    pub feats: FeatTally,
    /// Coin purse.
    pub currency: Currency,
    /// Contributions per field path.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sources: BTreeMap<String, Vec<SourceEntry>>,
}

impl DerivedCaravan {
    /// The derived values as roll data for formulas.
    pub fn roll_data(&self) -> EngineResult<Value> {
        let mut value = serde_json::to_value(self).map_err(CoreError::from)?;
        if let Value::Object(map) = &mut value {
            map.remove("sources");
        }
        Ok(value)
    }

    /// Read a derived value by field path.
    pub fn lookup(&self, path: &str) -> Option<i64> {
        self.roll_data().ok()?.lookup(path).map(|v| v as i64)
    }

    /// Mutable access to a modifiable field by path.
    ///
    /// Limit paths of ids missing from the counts have no slot. A limit
    /// without a registry maximum starts from zero.
    pub fn slot_mut(&mut self, path: &str) -> Option<&mut i64> {
        if let Some(rest) = path.strip_prefix("travelers.counts.") {
            return count_max(&mut self.travelers, rest);
        }
        if let Some(rest) = path.strip_prefix("wagons.counts.") {
            return count_max(&mut self.wagons, rest);
        }
        let stats = &mut self.statistics;
        Some(match path {
            "attributes.hp.max" => &mut self.attributes.hp.max,
            "attributes.hp.value" => &mut self.attributes.hp.value,
            "attributes.unrest.limit" => &mut self.attributes.unrest.limit,
            "attributes.unrest.value" => &mut self.attributes.unrest.value,
            "attributes.consumption" => &mut self.attributes.consumption,
            "details.wages" => &mut self.details.wages,
            "details.speed.total" => &mut self.details.speed.total,
            "statistics.offense.total" => &mut stats.offense.total,
            "statistics.defense.total" => &mut stats.defense.total,
            "statistics.mobility.total" => &mut stats.mobility.total,
            "statistics.morale.total" => &mut stats.morale.total,
            "statistics.attack" => &mut stats.attack,
            "statistics.armorClass" => &mut stats.armor_class,
            "statistics.security" => &mut stats.security,
            "statistics.resolve" => &mut stats.resolve,
            "travelers.max" => &mut self.travelers.max,
            "wagons.max" => &mut self.wagons.max,
            "cargo.max" => &mut self.cargo.max,
            "feats.max" => &mut self.feats.max,
            _ => return None,
        })
    }

    /// Contributions recorded for a field path.
    pub fn sources_for(&self, path: &str) -> &[SourceEntry] {
        self.sources.get(path).map(Vec::as_slice).unwrap_or_default()
    }
}

fn count_max<'a>(headcount: &'a mut Headcount, rest: &str) -> Option<&'a mut i64> {
    let id = rest.strip_suffix(".max")?;
    headcount.counts.get_mut(id).map(|e| e.max.get_or_insert(0))
}

/// A stored level of zero reads as level 1; any other value is kept.
pub fn effective_level(level: i64) -> i64 {
    if level == 0 { 1 } else { level }
}

/// Clamp base statistics and reset the derived ones.
pub fn derive_statistics(statistics: &Statistics) -> DerivedStatistics {
    let clamp = |key| {
        let base = statistics.base(key).min(STATISTIC_CAP);
        StatisticTotal { base, total: base }
    };
    DerivedStatistics {
        offense: clamp(StatisticKey::Offense),
        defense: clamp(StatisticKey::Defense),
        mobility: clamp(StatisticKey::Mobility),
        morale: clamp(StatisticKey::Morale),
        attack: 0,
        armor_class: BASE_ARMOR_CLASS,
        security: 0,
        resolve: 0,
    }
}

/// Neutral derived values, before any modifier.
pub fn derive_baseline(caravan: &Caravan, aggregates: Aggregates) -> DerivedCaravan {
    let attributes = &caravan.attributes;
    DerivedCaravan {
        attributes: DerivedAttributes {
            hp: HitPoints {
                value: attributes.hp.value.max(0),
                max: 0,
            },
            unrest: Unrest {
                value: attributes.unrest.value.max(0),
                limit: 0,
            },
            provisions: attributes.provisions,
            consumption: 0,
        },
        details: DerivedDetails {
            level: effective_level(caravan.details.level),
            condition: caravan.details.condition,
            speed: Speed {
                base: BASE_SPEED,
                total: BASE_SPEED,
            },
            wages: 0,
        },
        statistics: derive_statistics(&caravan.statistics),
        travelers: aggregates.travelers,
        wagons: aggregates.wagons,
        cargo: aggregates.cargo,
        feats: aggregates.feats,
        currency: caravan.currency,
        sources: BTreeMap::new(),
    }
}

/// Derive a caravan from an already resolved roster.
pub fn derive_with_roster(
    doc: &CaravanDocument,
    roster: &Roster,
    registries: &Registries,
) -> EngineResult<DerivedCaravan> {
    let aggregates = aggregate(doc, registries)?;
    let mut derived = derive_baseline(&doc.system, aggregates);
    let collected = changes::collect(doc, roster);
    changes::apply(&mut derived, &collected)?;
    tracing::debug!(
        caravan = %doc.name,
        changes = collected.len(),
        "caravan derived"
    );
    Ok(derived)
}

/// Derive a caravan from its snapshot.
pub fn derive_caravan(doc: &CaravanDocument, registries: &Registries) -> EngineResult<DerivedCaravan> {
    let mut roster = Roster::from_document(doc);
    roster.resolve(registries)?;
    derive_with_roster(doc, &roster, registries)
}
