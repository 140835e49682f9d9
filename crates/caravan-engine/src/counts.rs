//! Count summaries for the caravan sheet: how many feats, travelers,
//! wagons, and cargo units the caravan has against what it can hold.

use std::collections::BTreeMap;

use caravan_core::document::CaravanDocument;
use caravan_core::item::{FeatKind, ItemKind};
use serde::Serialize;

use crate::aggregate::Headcount;
use crate::derive::DerivedCaravan;
use crate::merge::Roster;

/// Difference between an allowance and what is in use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Discrepancy {
    /// `max - actual`; positive means room left.
    pub discrepancy: i64,
    /// Slots still open.
    pub missing: i64,
    /// Slots over the allowance.
    pub excess: i64,
}

impl Discrepancy {
    /// Compare an allowance with the amount in use.
    pub fn of(max: i64, actual: i64) -> Self {
        let discrepancy = max.saturating_sub(actual);
        Self {
            discrepancy,
            missing: discrepancy.max(0),
            excess: discrepancy.saturating_neg().max(0),
        }
    }
}

/// Count of travelers or wagons sharing one registry id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IdCount {
    /// Items with this id.
    pub owned: i64,
    /// Limit for this id, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Zero when the id has no limit.
    #[serde(flatten)]
    pub balance: Discrepancy,
}

/// One count summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountSummary {
    /// Derived allowance.
    pub max: i64,
    /// Stored base allowance.
    pub base: i64,
    /// Allowance provided by wagons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wagons: Option<i64>,
    /// Caravan level, for the feat allowance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<i64>,
    /// Attached items.
    pub owned: i64,
    /// Attached and active items.
    pub active: i64,
    /// Attached but inactive items.
    pub disabled: i64,
    /// Per-id counts.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub counts: BTreeMap<String, IdCount>,
    /// `max` against `active`.
    #[serde(flatten)]
    pub balance: Discrepancy,
}

impl CountSummary {
    fn new(max: i64, base: i64, owned: i64, active: i64) -> Self {
        Self {
            max,
            base,
            wagons: None,
            levels: None,
            owned,
            active,
            disabled: owned - active,
            counts: BTreeMap::new(),
            balance: Discrepancy::of(max, active),
        }
    }
}

/// All four summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaravanCounts {
    /// Feats (features excluded).
    pub feats: CountSummary,
    /// Travelers.
    pub travelers: CountSummary,
    /// Wagons.
    pub wagons: CountSummary,
    /// Cargo units.
    pub cargo: CountSummary,
}

fn id_counts(headcount: &Headcount) -> BTreeMap<String, IdCount> {
    headcount
        .counts
        .iter()
        .map(|(id, entry)| {
            let balance = match entry.max {
                Some(max) => Discrepancy::of(max, entry.count),
                None => Discrepancy::default(),
            };
            let count = IdCount {
                owned: entry.count,
                max: entry.max,
                balance,
            };
            (id.clone(), count)
        })
        .collect()
}

fn active_of(doc: &CaravanDocument, kind: ItemKind) -> i64 {
    doc.items_of_kind(kind).filter(|i| i.active).count() as i64
}

/// Feats taken against the feat allowance.
pub fn feat_count(doc: &CaravanDocument, derived: &DerivedCaravan) -> CountSummary {
    let feats: Vec<_> = doc
        .items()
        .iter()
        .filter(|i| i.as_feat().is_some_and(|f| f.sub_type == FeatKind::Feat))
        .collect();
    let owned = feats.len() as i64;
    let active = feats.iter().filter(|i| i.active).count() as i64;
    CountSummary {
        levels: Some(derived.details.level),
        ..CountSummary::new(derived.feats.max, 0, owned, active)
    }
}

/// Travelers against traveler capacity.
pub fn traveler_count(doc: &CaravanDocument, derived: &DerivedCaravan, roster: &Roster) -> CountSummary {
    let by_wagons = roster
        .wagons()
        .iter()
        .map(|m| m.data().capacity.traveler.unwrap_or(0))
        .sum();
    CountSummary {
        wagons: Some(by_wagons),
        counts: id_counts(&derived.travelers),
        ..CountSummary::new(
            derived.travelers.max,
            doc.system.capacity.travelers.base,
            derived.travelers.owned,
            active_of(doc, ItemKind::Traveler),
        )
    }
}

/// Wagons against the wagon allowance.
pub fn wagon_count(doc: &CaravanDocument, derived: &DerivedCaravan) -> CountSummary {
    CountSummary {
        counts: id_counts(&derived.wagons),
        ..CountSummary::new(
            derived.wagons.max,
            doc.system.capacity.wagons.base,
            derived.wagons.owned,
            active_of(doc, ItemKind::Wagon),
        )
    }
}

/// Cargo units against cargo capacity. All cargo counts as active.
pub fn cargo_count(doc: &CaravanDocument, derived: &DerivedCaravan, roster: &Roster) -> CountSummary {
    let by_wagons = roster
        .wagons()
        .iter()
        .map(|m| m.data().capacity.cargo.unwrap_or(0))
        .sum();
    CountSummary {
        wagons: Some(by_wagons),
        ..CountSummary::new(
            derived.cargo.max,
            doc.system.capacity.cargo.base,
            derived.cargo.owned,
            derived.cargo.owned,
        )
    }
}

/// Every summary at once. The roster must already be resolved.
pub fn counts(doc: &CaravanDocument, derived: &DerivedCaravan, roster: &Roster) -> CaravanCounts {
    CaravanCounts {
        feats: feat_count(doc, derived),
        travelers: traveler_count(doc, derived, roster),
        wagons: wagon_count(doc, derived),
        cargo: cargo_count(doc, derived, roster),
    }
}
