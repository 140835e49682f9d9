//! Roll-up of attached items into counts and cargo.

use std::collections::BTreeMap;

use caravan_core::caravan::Caravan;
use caravan_core::document::CaravanDocument;
use caravan_core::item::{FeatKind, ItemData};
use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::registry::{Registries, Registry, RegistryEntry};

/// Provisions per cargo unit.
pub const PROVISIONS_PER_UNIT: i64 = 10;

/// Pounds of treasure per cargo unit.
pub const TREASURE_WEIGHT_PER_UNIT: f64 = 50.0;

/// Traveler capacity before any change.
pub const DEFAULT_TRAVELER_MAX: i64 = 0;

/// Wagon allowance before any change.
pub const DEFAULT_WAGON_MAX: i64 = 5;

/// Cargo capacity before any change.
pub const DEFAULT_CARGO_MAX: i64 = 0;

/// Count of items sharing one registry id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CountEntry {
    /// Items with this id.
    pub count: i64,
    /// Limit from the registry, raised or lowered by changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

/// Travelers or wagons: totals and per-id counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Headcount {
    /// How many the caravan can hold.
    pub max: i64,
    /// How many are attached.
    pub owned: i64,
    /// Counts per registry id; every registry id is present.
    pub counts: BTreeMap<String, CountEntry>,
}

impl Headcount {
    fn seeded<E: RegistryEntry>(registry: &Registry<E>, max: i64) -> Self {
        Self {
            max,
            owned: 0,
            counts: registry
                .values()
                .map(|e| {
                    (
                        e.id().to_string(),
                        CountEntry {
                            count: 0,
                            max: e.max(),
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Cargo capacity and load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CargoTally {
    /// Cargo units the caravan can carry.
    pub max: i64,
    /// Cargo units in use.
    pub owned: i64,
}

/// Feat allowance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeatTally {
    /// Feats the caravan may have.
    pub max: i64,
    /// Feats taken (features excluded).
    pub owned: i64,
}

/// Everything [`aggregate`] produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Aggregates {
    /// Traveler counts.
    pub travelers: Headcount,
    /// Wagon counts.
    pub wagons: Headcount,
    /// Cargo load.
    pub cargo: CargoTally,
    /// Feat allowance.
    pub feats: FeatTally,
}

/// Cargo units used: equipment units, then treasure weight and provisions,
/// each rounded up separately.
pub fn cargo_owned(caravan: &Caravan, doc: &CaravanDocument) -> i64 {
    let mut equipment = 0;
    let mut treasure_weight = 0.0;
    for item in doc.items() {
        match &item.data {
            ItemData::Equipment(e) => equipment += e.units_total(),
            ItemData::Treasure(t) => treasure_weight += t.weight_total(),
            _ => {}
        }
    }
    let provisions = (caravan.attributes.provisions as f64 / PROVISIONS_PER_UNIT as f64).ceil() as i64;
    equipment + (treasure_weight / TREASURE_WEIGHT_PER_UNIT).ceil() as i64 + provisions
}

/// Count travelers, wagons, cargo, and feats.
///
/// Every registry id starts at a count of zero. A traveler or wagon whose
/// `subType` is not in its registry is an error. Maxima start at the fixed
/// defaults; the caravan's capacity bases arrive later as default changes.
pub fn aggregate(doc: &CaravanDocument, registries: &Registries) -> EngineResult<Aggregates> {
    let caravan = &doc.system;
    let mut travelers = Headcount::seeded(&registries.roles, DEFAULT_TRAVELER_MAX);
    let mut wagons = Headcount::seeded(&registries.wagon_types, DEFAULT_WAGON_MAX);
    let mut feats = FeatTally::default();

    for item in doc.items() {
        match &item.data {
            ItemData::Traveler(t) => {
                let entry = travelers.counts.get_mut(&t.sub_type).ok_or_else(|| {
                    EngineError::UnknownTravelerRole {
                        role: t.sub_type.clone(),
                        traveler: item.name.clone(),
                    }
                })?;
                entry.count += 1;
                travelers.owned += 1;
            }
            ItemData::Wagon(w) => {
                let entry =
                    wagons
                        .counts
                        .get_mut(&w.sub_type)
                        .ok_or_else(|| EngineError::UnknownWagonType {
                            wagon_type: w.sub_type.clone(),
                            wagon: item.name.clone(),
                        })?;
                entry.count += 1;
                wagons.owned += 1;
            }
            ItemData::Feat(f) if f.sub_type == FeatKind::Feat => feats.owned += 1,
            _ => {}
        }
    }

    Ok(Aggregates {
        travelers,
        wagons,
        cargo: CargoTally {
            max: DEFAULT_CARGO_MAX,
            owned: cargo_owned(caravan, doc),
        },
        feats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use caravan_core::item::{Equipment, Feat, Traveler, Treasure, Wagon, Weight};

    fn doc() -> CaravanDocument {
        CaravanDocument::default()
    }

    #[test]
    fn empty_caravan_has_every_registry_id() {
        let agg = aggregate(&doc(), &Registries::default()).unwrap();
        assert_eq!(agg.travelers.counts.len(), 13);
        assert_eq!(agg.wagons.counts.len(), 8);
        assert_eq!(agg.travelers.counts["cook"], CountEntry { count: 0, max: Some(5) });
        assert_eq!(agg.travelers.counts["driver"].max, None);
        assert_eq!(agg.travelers.max, 0);
        assert_eq!(agg.wagons.max, 5);
        assert_eq!(agg.cargo.max, 0);
    }

    #[test]
    fn counts_by_sub_type() {
        let mut d = doc();
        d.attach("A", ItemData::Traveler(Traveler::with_role("guard")));
        d.attach("B", ItemData::Traveler(Traveler::with_role("guard")));
        d.attach("C", ItemData::Traveler(Traveler::default()));
        d.attach("Cart", ItemData::Wagon(Wagon::of_type("supplyWagon")));
        let agg = aggregate(&d, &Registries::default()).unwrap();
        assert_eq!(agg.travelers.counts["guard"].count, 2);
        assert_eq!(agg.travelers.counts["passenger"].count, 1);
        assert_eq!(agg.travelers.owned, 3);
        assert_eq!(agg.wagons.counts["supplyWagon"].count, 1);
        assert_eq!(agg.wagons.owned, 1);
    }

    #[test]
    fn inactive_items_still_count() {
        let mut d = doc();
        d.add_item(
            caravan_core::CaravanItem::new("Off duty", ItemData::Traveler(Traveler::with_role("cook")))
                .inactive(),
        )
        .unwrap();
        let agg = aggregate(&d, &Registries::default()).unwrap();
        assert_eq!(agg.travelers.counts["cook"].count, 1);
    }

    #[test]
    fn unknown_role_fails_fast() {
        let mut d = doc();
        d.attach("Jack", ItemData::Traveler(Traveler::with_role("pirate")));
        let err = aggregate(&d, &Registries::default()).unwrap_err();
        assert!(matches!(err, EngineError::UnknownTravelerRole { ref role, .. } if role == "pirate"));
        assert!(err.to_string().contains("Jack"));
    }

    #[test]
    fn unknown_wagon_type_fails_fast() {
        let mut d = doc();
        d.attach("Zeppelin", ItemData::Wagon(Wagon::of_type("airship")));
        assert!(matches!(
            aggregate(&d, &Registries::default()),
            Err(EngineError::UnknownWagonType { .. })
        ));
    }

    #[test]
    fn equipment_units_count_as_cargo() {
        let mut d = doc();
        d.attach("Crates", ItemData::Equipment(Equipment::new(3, 2)));
        let agg = aggregate(&d, &Registries::default()).unwrap();
        assert_eq!(agg.cargo.owned, 6);
    }

    #[test]
    fn provisions_round_up() {
        let mut d = doc();
        d.system.attributes.provisions = 25;
        let agg = aggregate(&d, &Registries::default()).unwrap();
        assert_eq!(agg.cargo.owned, 3);
    }

    #[test]
    fn each_term_rounds_separately() {
        let mut d = doc();
        d.system.attributes.provisions = 1;
        d.attach(
            "Idol",
            ItemData::Treasure(Treasure {
                weight: Weight { value: 1.0 },
                ..Treasure::default()
            }),
        );
        d.attach("Rope", ItemData::Equipment(Equipment::new(1, 1)));
        let agg = aggregate(&d, &Registries::default()).unwrap();
        assert_eq!(agg.cargo.owned, 3);
    }

    #[test]
    fn treasure_weight_sums_before_rounding() {
        let mut d = doc();
        for _ in 0..2 {
            d.attach(
                "Silver",
                ItemData::Treasure(Treasure {
                    quantity: 5,
                    weight: Weight { value: 5.0 },
                    ..Treasure::default()
                }),
            );
        }
        let agg = aggregate(&d, &Registries::default()).unwrap();
        assert_eq!(agg.cargo.owned, 1);
    }

    #[test]
    fn only_feats_count_against_allowance() {
        let mut d = doc();
        d.attach("Hardy", ItemData::Feat(Feat::default()));
        d.attach(
            "Born on the road",
            ItemData::Feat(Feat {
                sub_type: FeatKind::Feature,
                ..Feat::default()
            }),
        );
        let agg = aggregate(&d, &Registries::default()).unwrap();
        assert_eq!(agg.feats.owned, 1);
        assert_eq!(agg.feats.max, 0);
    }

    #[test]
    fn capacity_bases_do_not_seed_maxima() {
        let mut d = doc();
        d.system.capacity.wagons.base = 7;
        d.system.capacity.cargo.base = 2;
        let agg = aggregate(&d, &Registries::default()).unwrap();
        assert_eq!(agg.wagons.max, DEFAULT_WAGON_MAX);
        assert_eq!(agg.cargo.max, DEFAULT_CARGO_MAX);
        assert_eq!(agg.travelers.max, DEFAULT_TRAVELER_MAX);
    }
}
