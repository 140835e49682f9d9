//! The traveler roles and wagon types that ship with the engine.
//!
//! These are the defaults [`Registries::default`](super::Registries) uses.
//! Custom registries loaded from JSON can replace or extend them.

use caravan_core::change::{Change, ContextNote};
use caravan_core::item::{TravelerTask, WagonCapacity};

use super::{Registry, RoleRegistry, TravelerRole, WagonType, WagonTypeRegistry};

const SURPRISE_NOTE: &str = "+1 to avoid being surprised";
const CARE_NOTE: &str = "Provides long-term care for up to 6 travelers";

fn circumstance(formula: &str, target: &str) -> Change {
    Change::new(formula, target).typed("circumstance")
}

fn untyped(formula: &str, target: &str) -> Change {
    Change::new(formula, target)
}

fn task(id: &str, name: &str, changes: Vec<Change>, notes: Vec<ContextNote>) -> TravelerTask {
    TravelerTask {
        id: id.to_string(),
        name: name.to_string(),
        changes,
        context_notes: notes,
    }
}

fn paid(id: &str, name: &str, wage: i64) -> TravelerRole {
    TravelerRole {
        monthly_wage: Some(wage),
        ..TravelerRole::new(id, name)
    }
}

/// The thirteen default traveler roles.
pub fn traveler_roles() -> RoleRegistry {
    let cook = TravelerRole {
        max: Some(5),
        changes: vec![circumstance(
            "if(gte(@attributes.provisions, 10), -2)",
            "caravan_consumption",
        )],
        ..paid("cook", "Cook", 10)
    };

    let entertainer = TravelerRole {
        changes: vec![circumstance("1", "caravan_resolve")],
        ..paid("entertainer", "Entertainer", 50)
    };

    let fortune_teller = TravelerRole {
        only_party: true,
        max: Some(0),
        ..TravelerRole::new("fortuneTeller", "Fortune Teller")
    };

    let guard = TravelerRole {
        changes: vec![circumstance("1", "caravan_offense")],
        context_notes: vec![ContextNote::new("caravan_security", SURPRISE_NOTE)],
        ..paid("guard", "Guard", 100)
    };

    let guide = TravelerRole {
        changes: vec![circumstance("1", "caravan_security")],
        ..paid("guide", "Guide", 50)
    };

    let healer = TravelerRole {
        context_notes: vec![ContextNote::new("caravan_rest", CARE_NOTE)],
        ..paid("healer", "Healer", 50)
    };

    let passenger = TravelerRole {
        tasks: vec![
            task("passenger", "Standard Passenger", vec![], vec![]),
            task("prisoner", "Prisoner", vec![], vec![]),
        ],
        ..TravelerRole::new("passenger", "Passenger")
    };

    let scout = TravelerRole {
        tasks: vec![
            task(
                "food",
                "Scout (Food)",
                vec![circumstance("-3", "caravan_consumption")],
                vec![],
            ),
            task(
                "security",
                "Scout (Security)",
                vec![
                    circumstance("1", "caravan_security"),
                    untyped("-1", "caravan_consumption"),
                ],
                vec![],
            ),
        ],
        ..paid("scout", "Scout", 100)
    };

    let spell_caster = TravelerRole {
        only_party: true,
        tasks: vec![
            task(
                "entertainer",
                "Entertainer",
                vec![circumstance("1", "caravan_resolve")],
                vec![],
            ),
            task(
                "guard",
                "Guard",
                vec![circumstance("1", "caravan_offense")],
                vec![ContextNote::new("caravan_security", SURPRISE_NOTE)],
            ),
            task(
                "guide",
                "Guide",
                vec![circumstance("1", "caravan_security")],
                vec![],
            ),
            task(
                "healer",
                "Healer",
                vec![],
                vec![ContextNote::new("caravan_rest", CARE_NOTE)],
            ),
            task(
                "scoutFood",
                "Scout (Food)",
                vec![circumstance("-3", "caravan_consumption")],
                vec![],
            ),
            task(
                "scoutSecurity",
                "Scout (Security)",
                vec![
                    circumstance("1", "caravan_security"),
                    untyped("-1", "caravan_consumption"),
                ],
                vec![],
            ),
        ],
        ..TravelerRole::new("spellCaster", "Spellcaster")
    };

    Registry {
        entries: vec![
            cook,
            paid("driver", "Driver", 10),
            entertainer,
            fortune_teller,
            guard,
            guide,
            healer,
            passenger,
            scout,
            spell_caster,
            paid("trader", "Trader", 10),
            paid("wainwright", "Wainwright", 10),
            TravelerRole::new("custom", "Custom"),
        ],
    }
}

fn wagon(
    id: &str,
    name: &str,
    cost: i64,
    hp: i64,
    (traveler, cargo): (i64, i64),
    consumption: i64,
) -> WagonType {
    WagonType {
        cost: Some(cost),
        hp: Some(hp),
        capacity: WagonCapacity {
            traveler: Some(traveler),
            cargo: Some(cargo),
        },
        consumption: Some(consumption),
        ..WagonType::new(id, name)
    }
}

/// The eight default wagon types.
pub fn wagon_types() -> WagonTypeRegistry {
    let armored = WagonType {
        max: Some(2),
        changes: vec![untyped("3", "caravan_armorClass")],
        ..wagon("armoredWagon", "Armored Wagon", 5000, 60, (6, 4), 2)
    };

    let fortune_teller = WagonType {
        max: Some(1),
        changes: vec![untyped("1", "caravan_travelerRoleLimit_fortuneTeller")],
        ..wagon(
            "fortuneTellerWagon",
            "Fortune-Teller's Wagon",
            500,
            30,
            (2, 4),
            1,
        )
    };

    let horse_train = WagonType {
        max: Some(3),
        changes: vec![untyped("4", "caravan_speed")],
        ..wagon("horseTrain", "Horse Train", 1200, 10, (6, 1), 6)
    };

    let prisoner = WagonType {
        max: Some(2),
        changes: vec![untyped("2", "caravan_security")],
        ..wagon("prisonerWagon", "Prisoner Wagon", 4000, 40, (6, 2), 2)
    };

    let royal = WagonType {
        max: Some(1),
        changes: vec![untyped(
            "if(gt(@travelers.counts.entertainer.count, 0), 4)",
            "caravan_resolve",
        )],
        ..wagon("royalCarriage", "Royal Carriage", 2500, 30, (4, 2), 2)
    };

    Registry {
        entries: vec![
            armored,
            wagon("coveredWagon", "Covered Wagon", 500, 20, (6, 4), 2),
            fortune_teller,
            horse_train,
            prisoner,
            royal,
            wagon("supplyWagon", "Supply Wagon", 300, 20, (2, 10), 1),
            WagonType::new("custom", "Custom"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryEntry;

    #[test]
    fn thirteen_roles() {
        let roles = traveler_roles();
        assert_eq!(roles.len(), 13);
        for id in [
            "cook",
            "driver",
            "entertainer",
            "fortuneTeller",
            "guard",
            "guide",
            "healer",
            "passenger",
            "scout",
            "spellCaster",
            "trader",
            "wainwright",
            "custom",
        ] {
            assert!(roles.contains(id), "missing role {id}");
        }
    }

    #[test]
    fn eight_wagon_types() {
        let wagons = wagon_types();
        assert_eq!(wagons.len(), 8);
        let armored = wagons.get("armoredWagon").unwrap();
        assert_eq!(armored.hp, Some(60));
        assert_eq!(armored.capacity.traveler, Some(6));
        assert_eq!(armored.max(), Some(2));
        assert_eq!(wagons.get("custom").unwrap().capacity, WagonCapacity::default());
    }

    #[test]
    fn party_only_roles() {
        let roles = traveler_roles();
        let party: Vec<&str> = roles
            .values()
            .filter(|r| r.only_party)
            .map(|r| r.id())
            .collect();
        assert_eq!(party, vec!["fortuneTeller", "spellCaster"]);
    }

    #[test]
    fn scout_tasks_grant_changes() {
        let roles = traveler_roles();
        let scout = roles.get("scout").unwrap();
        assert_eq!(scout.tasks[0].id, "food");
        assert_eq!(scout.task("security").unwrap().changes.len(), 2);
        assert!(scout.task("prisoner").is_none());
    }

    #[test]
    fn roles_serialize_with_underscore_fields() {
        let roles = traveler_roles();
        let json = serde_json::to_value(roles.get("guard").unwrap()).unwrap();
        assert_eq!(json["_id"], "guard");
        assert_eq!(json["monthlyWage"], 100);
        assert_eq!(json["_contextNotes"][0]["target"], "caravan_security");
    }
}
