//! The modifier pipeline.
//!
//! Changes come from two places: the default changes every caravan gets
//! (statistic totals feeding attack and defense, wagons adding hit points
//! and capacity, condition penalties, ...) and the changes on active
//! items. They are applied in descending priority. Within one priority
//! level all formulas are evaluated first, then `set` changes are
//! applied, then `add` changes.
//!
//! Bonus types listed in [`STACKING_TYPES`] always stack. For any other
//! type only the highest bonus per field applies; penalties always stack.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use caravan_core::caravan::{Caravan, Condition};
use caravan_core::change::{Change, ChangeOperator};
use caravan_core::document::CaravanDocument;
use caravan_core::item::{ItemData, ItemId};

use crate::aggregate::{DEFAULT_CARGO_MAX, DEFAULT_TRAVELER_MAX, DEFAULT_WAGON_MAX};
use crate::buff_target;
use crate::derive::{DerivedCaravan, SourceEntry, effective_level};
use crate::error::EngineResult;
use crate::formula;
use crate::merge::Roster;

/// Priority of the default changes.
pub const DEFAULT_PRIORITY: i64 = 1000;

/// Priority of changes that must see every other modifier first.
pub const LATE_PRIORITY: i64 = -1;

/// Most heroes that count towards the hero bonus.
pub const MAX_HEROES: usize = 4;

/// Role whose presence avoids the fortune-teller penalty.
pub const FORTUNE_TELLER_ROLE: &str = "fortuneTeller";

/// Bonus types that stack with themselves.
pub const STACKING_TYPES: &[&str] = &["untyped", "untypedPerm", "dodge", "racial", "circumstance"];

/// Returns true if bonuses of this type stack. A blank type is untyped.
pub fn is_stacking(modifier: &str) -> bool {
    modifier.is_empty() || STACKING_TYPES.contains(&modifier)
}

/// A change together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedChange {
    /// The change.
    pub change: Change,
    /// Label for breakdowns: the change's flavor, else the item name.
    pub label: String,
    /// Owning item, `None` for default changes.
    pub item: Option<ItemId>,
}

impl SourcedChange {
    fn builtin(change: Change) -> Self {
        Self {
            label: change.flavor.clone().unwrap_or_default(),
            change,
            item: None,
        }
    }

    fn from_item(change: &Change, item: ItemId, name: &str) -> Self {
        Self {
            label: change.flavor.clone().unwrap_or_else(|| name.to_string()),
            change: change.clone(),
            item: Some(item),
        }
    }
}

fn add(out: &mut Vec<SourcedChange>, formula: impl ToString, target: &str, flavor: &str) {
    out.push(SourcedChange::builtin(
        Change::new(formula.to_string(), target)
            .with_operator(ChangeOperator::Add)
            .with_priority(DEFAULT_PRIORITY)
            .with_flavor(flavor),
    ));
}

fn late(out: &mut Vec<SourcedChange>, change: Change, flavor: &str) {
    out.push(SourcedChange::builtin(
        change.with_priority(LATE_PRIORITY).with_flavor(flavor),
    ));
}

/// The changes every caravan gets from its own values and its roster.
pub fn default_changes(caravan: &Caravan, roster: &Roster) -> Vec<SourcedChange> {
    let mut out = Vec::new();
    let travelers: Vec<_> = roster.travelers().iter().map(|m| m.data()).collect();
    let wagons: Vec<_> = roster.wagons().iter().map(|m| m.data()).collect();

    for (derived, base, label) in [
        ("attack", "offense", "Offense"),
        ("armorClass", "defense", "Defense"),
        ("security", "mobility", "Mobility"),
        ("resolve", "morale", "Morale"),
    ] {
        add(
            &mut out,
            format!("@statistics.{base}.total"),
            &format!("caravan_{derived}"),
            label,
        );
    }
    add(&mut out, "@statistics.morale.total", "caravan_unrest", "Morale");

    let heroes = travelers.iter().filter(|t| t.is_hero).count().min(MAX_HEROES);
    for stat in ["attack", "security", "resolve"] {
        add(&mut out, heroes, &format!("caravan_{stat}"), "Heroes");
    }

    add(&mut out, travelers.len(), "caravan_consumption", "Travelers");
    let sum = |f: fn(&caravan_core::item::Wagon) -> Option<i64>| -> i64 {
        wagons.iter().fold(0i64, |acc, w| acc.saturating_add(f(w).unwrap_or(0)))
    };
    add(&mut out, sum(|w| w.consumption), "caravan_consumption", "Wagons");
    add(&mut out, sum(|w| w.hp), "caravan_hp", "Wagons");
    add(&mut out, sum(|w| w.capacity.traveler), "caravan_travelers", "Wagons");
    add(&mut out, sum(|w| w.capacity.cargo), "caravan_cargo", "Wagons");

    if !travelers.iter().any(|t| t.sub_type == FORTUNE_TELLER_ROLE) {
        for stat in ["attack", "security", "resolve"] {
            add(&mut out, -2, &format!("caravan_{stat}"), "No Fortune Teller");
        }
    }

    for stat in ["attack", "armorClass", "security", "resolve"] {
        late(
            &mut out,
            Change::new(
                "-max(0, @attributes.unrest.value - @attributes.unrest.limit)[Mutiny]",
                format!("caravan_{stat}"),
            ),
            "Mutiny",
        );
    }

    match caravan.details.condition {
        Condition::Normal => {}
        Condition::Fatigued => {
            for stat in ["attack", "security", "resolve"] {
                add(&mut out, -2, &format!("caravan_{stat}"), "Fatigued");
            }
            late(
                &mut out,
                Change::new("-(@details.speed.total / 2)", "caravan_speed"),
                "Fatigued",
            );
        }
        Condition::Exhausted => {
            for stat in ["attack", "security", "resolve"] {
                add(&mut out, -6, &format!("caravan_{stat}"), "Exhausted");
            }
            late(
                &mut out,
                Change::new("0", "caravan_speed").with_operator(ChangeOperator::Set),
                "Immobilized",
            );
        }
    }

    if caravan.attributes.hp.value <= 0 {
        late(
            &mut out,
            Change::new("0", "caravan_speed").with_operator(ChangeOperator::Set),
            "Immobilized",
        );
    }

    let wages = travelers
        .iter()
        .fold(0i64, |acc, t| acc.saturating_add(t.monthly_wage));
    add(&mut out, wages, "caravan_wages", "Travelers");
    add(&mut out, effective_level(caravan.details.level), "caravan_feats", "Level");

    let capacity = &caravan.capacity;
    for (base, default, target) in [
        (capacity.travelers.base, DEFAULT_TRAVELER_MAX, "caravan_travelers"),
        (capacity.wagons.base, DEFAULT_WAGON_MAX, "caravan_wagons"),
        (capacity.cargo.base, DEFAULT_CARGO_MAX, "caravan_cargo"),
    ] {
        let delta = base.saturating_sub(default);
        if delta != 0 {
            add(&mut out, delta, target, "Base Capacity");
        }
    }

    out
}

/// Changes of active caravan items, registry grants included.
pub fn item_changes(doc: &CaravanDocument, roster: &Roster) -> Vec<SourcedChange> {
    let mut out = Vec::new();
    for item in doc.active_module_items() {
        let common = match &item.data {
            ItemData::Traveler(t) => roster
                .traveler(item.id)
                .map(|m| &m.data().common)
                .unwrap_or(&t.common),
            ItemData::Wagon(w) => roster
                .wagon(item.id)
                .map(|m| &m.data().common)
                .unwrap_or(&w.common),
            ItemData::Equipment(e) => &e.common,
            ItemData::Feat(f) => &f.common,
            ItemData::Treasure(_) => continue,
        };
        out.extend(
            common
                .all_changes()
                .map(|c| SourcedChange::from_item(c, item.id, &item.name)),
        );
    }
    out
}

/// Default changes followed by item changes.
pub fn collect(doc: &CaravanDocument, roster: &Roster) -> Vec<SourcedChange> {
    let mut out = default_changes(&doc.system, roster);
    out.extend(item_changes(doc, roster));
    out
}

fn modifier_of(change: &Change) -> &str {
    if change.modifier_type.is_empty() {
        "untyped"
    } else {
        &change.modifier_type
    }
}

/// Running state of the pipeline across priority levels.
#[derive(Default)]
struct Stacking {
    /// Highest applied bonus per (path, type) for non-stacking types.
    best: HashMap<(String, String), i64>,
}

fn apply_one(
    derived: &mut DerivedCaravan,
    stacking: &mut Stacking,
    path: &str,
    source: &SourcedChange,
    value: i64,
) {
    let operator = source.change.operator();
    let modifier = modifier_of(&source.change);
    let Some(slot) = derived.slot_mut(path) else {
        tracing::trace!(path, "no field for path");
        return;
    };

    let mut superseded = false;
    let applied = match operator {
        ChangeOperator::Set => {
            *slot = value;
            true
        }
        ChangeOperator::Add if is_stacking(modifier) || value < 0 => {
            *slot = slot.saturating_add(value);
            true
        }
        ChangeOperator::Add => {
            let key = (path.to_string(), modifier.to_string());
            let previous = stacking.best.get(&key).copied().unwrap_or(0);
            if value > previous {
                *slot = slot.saturating_add(value.saturating_sub(previous));
                superseded = previous > 0;
                stacking.best.insert(key, value);
                true
            } else {
                false
            }
        }
    };

    if operator == ChangeOperator::Add && value == 0 {
        return;
    }
    let entries = derived.sources.entry(path.to_string()).or_default();
    if superseded {
        for entry in entries
            .iter_mut()
            .filter(|e| e.modifier == modifier && e.value >= 0 && e.operator == ChangeOperator::Add)
        {
            entry.applied = false;
        }
    }
    entries.push(SourceEntry {
        label: source.label.clone(),
        value,
        modifier: modifier.to_string(),
        operator,
        applied,
    });
}

/// Apply changes to a baseline in priority order.
///
/// A formula that fails to evaluate is logged and skipped.
pub fn apply(derived: &mut DerivedCaravan, changes: &[SourcedChange]) -> EngineResult<()> {
    let mut levels: BTreeMap<Reverse<i64>, Vec<&SourcedChange>> = BTreeMap::new();
    for change in changes {
        levels
            .entry(Reverse(change.change.priority()))
            .or_default()
            .push(change);
    }

    let mut stacking = Stacking::default();
    for (Reverse(priority), level) in levels {
        let data = derived.roll_data()?;
        let evaluated: Vec<(&SourcedChange, i64)> = level
            .into_iter()
            .filter_map(|source| match formula::evaluate(&source.change.formula, &data) {
                Ok(value) => Some((source, value)),
                Err(e) => {
                    tracing::warn!(label = %source.label, error = %e, "skipping change");
                    None
                }
            })
            .collect();

        for operator in [ChangeOperator::Set, ChangeOperator::Add] {
            for (source, value) in evaluated.iter().filter(|(s, _)| s.change.operator() == operator) {
                for path in buff_target::resolve(&source.change.target) {
                    apply_one(derived, &mut stacking, &path, source, *value);
                }
            }
        }
        tracing::trace!(priority, changes = evaluated.len(), "priority level applied");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{derive_caravan, derive_with_roster};
    use crate::registry::Registries;
    use caravan_core::caravan::Statistics;
    use caravan_core::item::{CaravanItem, Equipment, Feat, Traveler, Wagon};

    fn registries() -> Registries {
        Registries::default()
    }

    fn derive(doc: &CaravanDocument) -> DerivedCaravan {
        derive_caravan(doc, &registries()).unwrap()
    }

    fn feat_with(changes: Vec<Change>) -> ItemData {
        let mut feat = Feat::default();
        feat.common.changes = changes;
        ItemData::Feat(feat)
    }

    #[test]
    fn empty_caravan_defaults() {
        let derived = derive(&CaravanDocument::default());
        // statistics 1, no fortune teller -2
        assert_eq!(derived.statistics.attack, -1);
        assert_eq!(derived.statistics.armor_class, 11);
        assert_eq!(derived.statistics.security, -1);
        assert_eq!(derived.statistics.resolve, -1);
        assert_eq!(derived.attributes.unrest.limit, 1);
        assert_eq!(derived.feats.max, 1);
        assert_eq!(derived.wagons.max, 5);
        // hp 0 immobilizes
        assert_eq!(derived.details.speed.total, 0);
    }

    fn healthy() -> CaravanDocument {
        let mut doc = CaravanDocument::default();
        doc.system.attributes.hp.value = 30;
        doc
    }

    #[test]
    fn wagons_add_hp_capacity_and_consumption() {
        let mut doc = healthy();
        doc.attach("Bess", ItemData::Wagon(Wagon::of_type("coveredWagon")));
        doc.attach("Cart", ItemData::Wagon(Wagon::of_type("supplyWagon")));
        doc.attach("Ann", ItemData::Traveler(Traveler::with_role("driver")));
        let derived = derive(&doc);
        assert_eq!(derived.attributes.hp.max, 40);
        assert_eq!(derived.travelers.max, 8);
        assert_eq!(derived.cargo.max, 14);
        assert_eq!(derived.attributes.consumption, 1 + 3);
        assert_eq!(derived.details.wages, 10);
        assert_eq!(derived.details.speed.total, 32);
    }

    #[test]
    fn offense_bonus_reaches_attack_once() {
        let mut doc = healthy();
        doc.attach("Guard", ItemData::Traveler(Traveler::with_role("guard")));
        let derived = derive(&doc);
        assert_eq!(derived.statistics.offense.total, 2);
        // 1 (offense at priority 1000) + 1 (guard) - 2 (no fortune teller)
        assert_eq!(derived.statistics.attack, 0);
    }

    #[test]
    fn heroes_cap_at_four() {
        let mut doc = healthy();
        for _ in 0..6 {
            let mut hero = Traveler::with_role("driver");
            hero.is_hero = true;
            doc.attach("Hero", ItemData::Traveler(hero));
        }
        let derived = derive(&doc);
        assert_eq!(derived.statistics.security, 1 + 4 - 2);
    }

    #[test]
    fn npc_heroes_do_not_count() {
        let mut doc = healthy();
        let mut hero = Traveler::with_role("driver");
        hero.is_hero = true;
        hero.actor_id = Some("Actor.1".to_string());
        doc.attach("Linked", ItemData::Traveler(hero));
        let derived = derive(&doc);
        assert_eq!(derived.statistics.security, -1);
        assert_eq!(derived.details.wages, 0);
    }

    #[test]
    fn fortune_teller_removes_penalty() {
        let mut doc = healthy();
        doc.attach("Madame", ItemData::Traveler(Traveler::with_role("fortuneTeller")));
        let derived = derive(&doc);
        assert_eq!(derived.statistics.resolve, 1);
    }

    #[test]
    fn fortune_teller_wagon_raises_role_limit() {
        let mut doc = healthy();
        doc.attach("Vardo", ItemData::Wagon(Wagon::of_type("fortuneTellerWagon")));
        let derived = derive(&doc);
        assert_eq!(derived.travelers.counts["fortuneTeller"].max, Some(1));
    }

    #[test]
    fn mutiny_uses_final_limit() {
        let mut doc = healthy();
        doc.system.statistics = Statistics::new(1, 1, 1, 2);
        doc.system.attributes.unrest.value = 5;
        let derived = derive(&doc);
        // limit = morale 2; mutiny 3
        assert_eq!(derived.attributes.unrest.limit, 2);
        assert_eq!(derived.statistics.armor_class, 10 + 1 - 3);
        assert_eq!(derived.statistics.resolve, 2 - 2 - 3);
    }

    #[test]
    fn fatigue_halves_speed_after_bonuses() {
        let mut doc = healthy();
        doc.system.details.condition = Condition::Fatigued;
        doc.attach("Horses", ItemData::Wagon(Wagon::of_type("horseTrain")));
        let derived = derive(&doc);
        assert_eq!(derived.details.speed.total, 18);
        assert_eq!(derived.statistics.attack, 1 - 2 - 2);
    }

    #[test]
    fn exhaustion_stops_the_caravan() {
        let mut doc = healthy();
        doc.system.details.condition = Condition::Exhausted;
        doc.attach("Horses", ItemData::Wagon(Wagon::of_type("horseTrain")));
        let derived = derive(&doc);
        assert_eq!(derived.details.speed.total, 0);
        assert_eq!(derived.statistics.security, 1 - 2 - 6);
    }

    #[test]
    fn cook_saves_provisions_when_stocked() {
        let mut doc = healthy();
        doc.system.attributes.provisions = 20;
        doc.attach("Cook", ItemData::Traveler(Traveler::with_role("cook")));
        let derived = derive(&doc);
        assert_eq!(derived.attributes.consumption, 1 - 2);
    }

    #[test]
    fn royal_carriage_rewards_entertainers() {
        let mut doc = healthy();
        doc.attach("Carriage", ItemData::Wagon(Wagon::of_type("royalCarriage")));
        let without = derive(&doc).statistics.resolve;
        doc.attach("Bard", ItemData::Traveler(Traveler::with_role("entertainer")));
        let with = derive(&doc).statistics.resolve;
        // entertainer +1, carriage +4
        assert_eq!(with - without, 5);
    }

    #[test]
    fn typed_bonuses_do_not_stack() {
        let mut doc = healthy();
        doc.attach(
            "Banner",
            feat_with(vec![Change::new("2", "caravan_hp").typed("morale")]),
        );
        doc.attach(
            "Song",
            feat_with(vec![Change::new("3", "caravan_hp").typed("morale")]),
        );
        doc.attach(
            "Curse",
            feat_with(vec![Change::new("-1", "caravan_hp").typed("morale")]),
        );
        let derived = derive(&doc);
        assert_eq!(derived.attributes.hp.max, 3 - 1);
        let sources = derived.sources_for("attributes.hp.max");
        let banner = sources.iter().find(|s| s.label == "Banner").unwrap();
        let song = sources.iter().find(|s| s.label == "Song").unwrap();
        assert!(!banner.applied);
        assert!(song.applied);
    }

    #[test]
    fn circumstance_bonuses_stack() {
        let mut doc = healthy();
        doc.attach("Guide", ItemData::Traveler(Traveler::with_role("guide")));
        doc.attach("Guide 2", ItemData::Traveler(Traveler::with_role("guide")));
        let derived = derive(&doc);
        assert_eq!(derived.statistics.security, 1 + 2 - 2);
    }

    #[test]
    fn set_applies_before_add_in_a_level() {
        let mut doc = healthy();
        doc.attach(
            "Odd",
            feat_with(vec![
                Change::new("5", "caravan_wages"),
                Change::new("100", "caravan_wages").with_operator(ChangeOperator::Set),
            ]),
        );
        let derived = derive(&doc);
        assert_eq!(derived.details.wages, 105);
    }

    #[test]
    fn higher_priority_runs_first() {
        let mut doc = healthy();
        doc.attach(
            "Orders",
            feat_with(vec![
                Change::new("@details.wages * 2", "caravan_wages").with_priority(-5),
                Change::new("7", "caravan_wages").with_priority(5),
            ]),
        );
        let derived = derive(&doc);
        assert_eq!(derived.details.wages, 21);
    }

    #[test]
    fn inactive_items_contribute_nothing() {
        let mut doc = healthy();
        let mut gear = Equipment::default();
        gear.common.changes.push(Change::new("10", "caravan_hp"));
        doc.add_item(CaravanItem::new("Spare", ItemData::Equipment(gear)).inactive())
            .unwrap();
        assert_eq!(derive(&doc).attributes.hp.max, 0);
    }

    #[test]
    fn oversized_formula_results_are_skipped() {
        let mut doc = healthy();
        doc.attach(
            "Hoard",
            feat_with(vec![
                Change::new("99999999999999999999999", "caravan_wages"),
                Change::new("99999999999999999999999", "caravan_wages").typed("circumstance"),
            ]),
        );
        assert_eq!(derive(&doc).details.wages, 0);
    }

    #[test]
    fn large_bonuses_saturate() {
        let mut doc = healthy();
        doc.attach(
            "Hoard",
            feat_with(vec![
                Change::new("9000000000000000000", "caravan_wages"),
                Change::new("9000000000000000000", "caravan_wages").typed("circumstance"),
            ]),
        );
        assert_eq!(derive(&doc).details.wages, i64::MAX);
    }

    #[test]
    fn capacity_bases_apply_as_default_changes() {
        let mut doc = healthy();
        doc.system.capacity.wagons.base = 7;
        doc.system.capacity.cargo.base = 2;
        let derived = derive(&doc);
        assert_eq!(derived.wagons.max, 7);
        assert_eq!(derived.cargo.max, 2);
        assert_eq!(derived.travelers.max, 0);
        let cargo = derived.sources_for("cargo.max");
        assert_eq!(cargo.len(), 1);
        assert_eq!(cargo[0].label, "Base Capacity");
        assert_eq!(cargo[0].value, 2);
        assert!(derived.sources_for("travelers.max").is_empty());
    }

    #[test]
    fn negative_level_is_kept_for_feats() {
        let mut doc = healthy();
        doc.system.details.level = -2;
        assert_eq!(derive(&doc).feats.max, -2);
        doc.system.details.level = 0;
        assert_eq!(derive(&doc).feats.max, 1);
    }

    #[test]
    fn bad_formula_is_skipped() {
        let mut doc = healthy();
        doc.attach(
            "Typo",
            feat_with(vec![
                Change::new("2 +", "caravan_hp"),
                Change::new("4", "caravan_hp"),
            ]),
        );
        assert_eq!(derive(&doc).attributes.hp.max, 4);
    }

    #[test]
    fn sources_name_items_and_defaults() {
        let mut doc = healthy();
        doc.attach("Guard", ItemData::Traveler(Traveler::with_role("guard")));
        let derived = derive(&doc);
        let labels: Vec<&str> = derived
            .sources_for("statistics.attack")
            .iter()
            .map(|s| s.label.as_str())
            .collect();
        assert!(labels.contains(&"Offense"));
        assert!(labels.contains(&"Guard"));
        assert!(labels.contains(&"No Fortune Teller"));
        assert!(!labels.contains(&"Heroes"));
    }

    #[test]
    fn default_changes_follow_roster() {
        let mut doc = healthy();
        doc.attach("Scout", ItemData::Traveler(Traveler::with_role("scout")));
        let registries = registries();
        let mut roster = Roster::from_document(&doc);
        roster.resolve(&registries).unwrap();
        let defaults = default_changes(&doc.system, &roster);
        assert!(defaults.iter().all(|c| c.item.is_none()));
        let items = item_changes(&doc, &roster);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].label, "Scout");
        let derived = derive_with_roster(&doc, &roster, &registries).unwrap();
        // one traveler eats 1, scouting for food saves 3
        assert_eq!(derived.attributes.consumption, -2);
    }
}
