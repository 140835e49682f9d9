//! Symbolic modifier targets and the field paths they resolve to.
//!
//! Changes name a target such as `caravan_defense`; [`resolve`] turns it
//! into the derived fields that receive the change's value. The catalog
//! lists every fixed target with its label, category, and sort order.

use std::fmt;

use serde::Serialize;

/// Prefix shared by every caravan target.
pub const TARGET_PREFIX: &str = "caravan_";

/// Prefix of per-role traveler limit targets.
pub const ROLE_LIMIT_PREFIX: &str = "caravan_travelerRoleLimit_";

/// Prefix of per-type wagon limit targets.
pub const WAGON_LIMIT_PREFIX: &str = "caravan_wagonLimit_";

/// Target of attack damage bonuses, applied only when attacking.
pub const DAMAGE_TARGET: &str = "caravan_damage";

/// Group a buff target is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetCategory {
    /// Hit points, wages, speed, consumption, damage, feats, cargo.
    Attributes,
    /// The four base statistics and the values derived from them.
    Statistics,
    /// Traveler limits.
    Travelers,
    /// Wagon limits.
    Wagons,
}

impl TargetCategory {
    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Attributes => "Attributes",
            Self::Statistics => "Statistics",
            Self::Travelers => "Travelers",
            Self::Wagons => "Wagons",
        }
    }

    /// Sort order among categories.
    pub fn sort(self) -> u32 {
        match self {
            Self::Attributes => 1000,
            Self::Statistics => 2000,
            Self::Travelers => 3000,
            Self::Wagons => 4000,
        }
    }
}

impl fmt::Display for TargetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A fixed buff target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuffTarget {
    /// Target id, as used in changes.
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Listing group.
    pub category: TargetCategory,
    /// Sort order within the listing.
    pub sort: u32,
    /// Deferred targets are not applied during derivation.
    pub deferred: bool,
}

const fn target(id: &'static str, label: &'static str, category: TargetCategory, sort: u32) -> BuffTarget {
    BuffTarget {
        id,
        label,
        category,
        sort,
        deferred: false,
    }
}

/// Every fixed buff target, in listing order.
pub const BUFF_TARGETS: &[BuffTarget] = &[
    target("caravan_hp", "Hit Points", TargetCategory::Attributes, 100),
    target("caravan_wages", "Wages", TargetCategory::Attributes, 200),
    target("caravan_speed", "Speed", TargetCategory::Attributes, 300),
    target("caravan_consumption", "Consumption", TargetCategory::Attributes, 400),
    BuffTarget {
        id: DAMAGE_TARGET,
        label: "Damage",
        category: TargetCategory::Attributes,
        sort: 500,
        deferred: true,
    },
    target("caravan_feats", "Feats", TargetCategory::Attributes, 600),
    target("caravan_cargo", "Cargo", TargetCategory::Attributes, 700),
    target("caravan_offense", "Offense", TargetCategory::Statistics, 1000),
    target("caravan_defense", "Defense", TargetCategory::Statistics, 1100),
    target("caravan_mobility", "Mobility", TargetCategory::Statistics, 1200),
    target("caravan_morale", "Morale", TargetCategory::Statistics, 1300),
    target("caravan_attack", "Attack", TargetCategory::Statistics, 1400),
    target("caravan_armorClass", "Armor Class", TargetCategory::Statistics, 1500),
    target("caravan_security", "Security", TargetCategory::Statistics, 1600),
    target("caravan_resolve", "Resolve", TargetCategory::Statistics, 1700),
    target("caravan_unrest", "Unrest", TargetCategory::Statistics, 1800),
    target("caravan_travelers", "Travelers", TargetCategory::Travelers, 3000),
    target("caravan_wagons", "Wagons", TargetCategory::Wagons, 4000),
];

/// A context-note target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoteTarget {
    /// Target id, as used in context notes.
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
}

/// Notes shown with the caravan attack.
pub const NOTE_ATTACK: &str = "caravan_attack";
/// Notes shown when resting.
pub const NOTE_REST: &str = "caravan_rest";
/// Notes shown with resolve tests.
pub const NOTE_RESOLVE: &str = "caravan_resolve";
/// Notes shown with security tests.
pub const NOTE_SECURITY: &str = "caravan_security";

/// Every context-note target.
pub const CONTEXT_NOTE_TARGETS: &[NoteTarget] = &[
    NoteTarget {
        id: NOTE_ATTACK,
        label: "Attack",
    },
    NoteTarget {
        id: NOTE_REST,
        label: "Rest",
    },
    NoteTarget {
        id: NOTE_RESOLVE,
        label: "Resolve",
    },
    NoteTarget {
        id: NOTE_SECURITY,
        label: "Security",
    },
];

/// Look up a fixed buff target.
pub fn buff_target(id: &str) -> Option<&'static BuffTarget> {
    BUFF_TARGETS.iter().find(|t| t.id == id)
}

/// Returns true if `target` is a fixed target or a well-formed limit target.
pub fn is_known_target(target: &str) -> bool {
    buff_target(target).is_some() || limit_id(target).is_some()
}

/// Returns true if `target` names a context-note target.
pub fn is_note_target(target: &str) -> bool {
    CONTEXT_NOTE_TARGETS.iter().any(|t| t.id == target)
}

fn limit_id(target: &str) -> Option<(&'static str, &str)> {
    if let Some(role) = target.strip_prefix(ROLE_LIMIT_PREFIX) {
        return (!role.is_empty()).then_some(("travelers", role));
    }
    if let Some(wagon_type) = target.strip_prefix(WAGON_LIMIT_PREFIX) {
        return (!wagon_type.is_empty()).then_some(("wagons", wagon_type));
    }
    None
}

/// Resolve a symbolic target to the field paths it modifies.
///
/// Targets outside the `caravan_` namespace, unknown targets, and the
/// deferred damage target resolve to no paths.
pub fn resolve(target: &str) -> Vec<String> {
    let Some(suffix) = target.strip_prefix(TARGET_PREFIX) else {
        tracing::trace!(buff_target = target, "not a caravan target");
        return Vec::new();
    };

    if let Some((group, id)) = limit_id(target) {
        return vec![format!("{group}.counts.{id}.max")];
    }

    let paths: &[&str] = match target {
        "caravan_hp" => &["attributes.hp.max"],
        "caravan_wages" => &["details.wages"],
        "caravan_speed" => &["details.speed.total"],
        "caravan_defense" => &["statistics.defense.total", "statistics.armorClass"],
        "caravan_morale" => &["statistics.morale.total", "statistics.resolve"],
        "caravan_unrest" => &["attributes.unrest.limit"],
        "caravan_mobility" => &["statistics.mobility.total", "statistics.security"],
        "caravan_offense" => &["statistics.offense.total", "statistics.attack"],
        "caravan_attack" | "caravan_armorClass" | "caravan_security" | "caravan_resolve" => {
            return vec![format!("statistics.{suffix}")];
        }
        "caravan_consumption" => &["attributes.consumption"],
        "caravan_feats" | "caravan_cargo" | "caravan_travelers" | "caravan_wagons" => {
            return vec![format!("{suffix}.max")];
        }
        _ => {
            tracing::trace!(buff_target = target, "unknown buff target");
            &[]
        }
    };
    paths.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defense_resolves_to_total_and_armor_class() {
        assert_eq!(
            resolve("caravan_defense"),
            vec!["statistics.defense.total", "statistics.armorClass"]
        );
    }

    #[test]
    fn role_limit_keeps_id_case() {
        assert_eq!(
            resolve("caravan_travelerRoleLimit_Scout"),
            vec!["travelers.counts.Scout.max"]
        );
    }

    #[test]
    fn limit_ids_take_the_whole_remainder() {
        assert_eq!(
            resolve("caravan_wagonLimit_royal_carriage"),
            vec!["wagons.counts.royal_carriage.max"]
        );
    }

    #[test]
    fn foreign_target_resolves_to_nothing() {
        assert!(resolve("not_a_caravan_target").is_empty());
    }

    #[test]
    fn unknown_caravan_target_resolves_to_nothing() {
        assert!(resolve("caravan_defence").is_empty());
        assert!(resolve("caravan_travelerRoleLimit_").is_empty());
    }

    #[test]
    fn damage_is_deferred() {
        assert!(resolve(DAMAGE_TARGET).is_empty());
        assert!(buff_target(DAMAGE_TARGET).unwrap().deferred);
    }

    #[test]
    fn suffix_families() {
        assert_eq!(resolve("caravan_armorClass"), vec!["statistics.armorClass"]);
        assert_eq!(resolve("caravan_resolve"), vec!["statistics.resolve"]);
        assert_eq!(resolve("caravan_cargo"), vec!["cargo.max"]);
        assert_eq!(resolve("caravan_wagons"), vec!["wagons.max"]);
    }

    #[test]
    fn single_path_targets() {
        assert_eq!(resolve("caravan_hp"), vec!["attributes.hp.max"]);
        assert_eq!(resolve("caravan_wages"), vec!["details.wages"]);
        assert_eq!(resolve("caravan_speed"), vec!["details.speed.total"]);
        assert_eq!(resolve("caravan_unrest"), vec!["attributes.unrest.limit"]);
        assert_eq!(resolve("caravan_consumption"), vec!["attributes.consumption"]);
    }

    #[test]
    fn every_applied_catalog_target_resolves() {
        for target in BUFF_TARGETS.iter().filter(|t| !t.deferred) {
            assert!(!resolve(target.id).is_empty(), "{} resolved to nothing", target.id);
        }
    }

    #[test]
    fn catalog_is_sorted() {
        assert!(BUFF_TARGETS.windows(2).all(|w| w[0].sort < w[1].sort));
    }

    #[test]
    fn known_targets() {
        assert!(is_known_target("caravan_morale"));
        assert!(is_known_target("caravan_wagonLimit_horseTrain"));
        assert!(!is_known_target("caravan_magic"));
        assert!(is_note_target(NOTE_REST));
        assert!(!is_note_target("caravan_hp"));
    }
}
