//! Caravan rolls: resolve and security tests, and the caravan attack.

use std::collections::BTreeMap;
use std::fmt;

use caravan_core::change::ChangeOperator;
use caravan_core::document::CaravanDocument;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::buff_target::{DAMAGE_TARGET, NOTE_ATTACK, NOTE_RESOLVE, NOTE_SECURITY};
use crate::changes::{self, is_stacking};
use crate::derive::DerivedCaravan;
use crate::dice::{DiceExpr, Die, RollResult};
use crate::error::{EngineError, EngineResult};
use crate::formula;
use crate::merge::Roster;
use crate::notes::{context_notes, note_texts};

/// Base damage of the caravan attack.
pub const ATTACK_DAMAGE: DiceExpr = DiceExpr {
    count: 1,
    die: Die::D6,
    modifier: 0,
};

/// A statistic the caravan can roll a test against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestAttribute {
    /// Holding together under pressure.
    Resolve,
    /// Spotting trouble before it arrives.
    Security,
}

impl TestAttribute {
    /// Parse an attribute name. Only resolve and security can be tested.
    pub fn parse(name: &str) -> EngineResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "resolve" => Ok(Self::Resolve),
            "security" => Ok(Self::Security),
            _ => Err(EngineError::InvalidAttribute(name.to_string())),
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Resolve => "Resolve",
            Self::Security => "Security",
        }
    }

    fn note_target(self) -> &'static str {
        match self {
            Self::Resolve => NOTE_RESOLVE,
            Self::Security => NOTE_SECURITY,
        }
    }

    fn bonus(self, derived: &DerivedCaravan) -> i64 {
        match self {
            Self::Resolve => derived.statistics.resolve,
            Self::Security => derived.statistics.security,
        }
    }
}

impl fmt::Display for TestAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A rolled test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestResult {
    /// The statistic tested.
    pub attribute: TestAttribute,
    /// d20 plus the statistic.
    pub roll: RollResult,
    /// Context notes for the test.
    pub notes: Vec<String>,
}

/// A bonus to attack damage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DamageBonus {
    /// Where the bonus comes from.
    pub label: String,
    /// Bonus type.
    pub modifier: String,
    /// Amount.
    pub value: i64,
}

/// A rolled caravan attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackResult {
    /// d20 plus attack.
    pub attack: RollResult,
    /// Base damage dice.
    pub damage: RollResult,
    /// Extra damage on top of the dice.
    pub damage_bonuses: Vec<DamageBonus>,
    /// Context notes for the attack.
    pub notes: Vec<String>,
}

impl AttackResult {
    /// Damage dice plus every bonus.
    pub fn total_damage(&self) -> i64 {
        self.damage_bonuses
            .iter()
            .fold(self.damage.total(), |acc, b| acc.saturating_add(b.value))
    }
}

fn d20(modifier: i64, rng: &mut StdRng) -> RollResult {
    DiceExpr::new(1, Die::D20).pool().roll(rng, modifier)
}

/// Roll a resolve or security test.
pub fn attribute_test(
    doc: &CaravanDocument,
    roster: &Roster,
    derived: &DerivedCaravan,
    attribute: TestAttribute,
    rng: &mut StdRng,
) -> TestResult {
    let notes = note_texts(&context_notes(doc, roster, attribute.note_target()));
    let roll = d20(attribute.bonus(derived), rng);
    tracing::debug!(%attribute, total = roll.total(), "attribute test rolled");
    TestResult {
        attribute,
        roll,
        notes,
    }
}

/// Damage bonuses from `caravan_damage` changes.
///
/// Set changes are ignored. Stacking types all count; for any other type
/// only the highest bonus counts.
pub fn damage_bonuses(
    doc: &CaravanDocument,
    roster: &Roster,
    derived: &DerivedCaravan,
) -> EngineResult<Vec<DamageBonus>> {
    let roll_data = derived.roll_data()?;
    let mut stacked = Vec::new();
    let mut highest: BTreeMap<String, DamageBonus> = BTreeMap::new();
    for sourced in changes::collect(doc, roster) {
        let change = &sourced.change;
        if change.target != DAMAGE_TARGET || change.operator() == ChangeOperator::Set {
            continue;
        }
        let value = match formula::evaluate(&change.formula, &roll_data) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(%error, "skipping damage bonus");
                continue;
            }
        };
        let modifier = if change.modifier_type.is_empty() {
            "untyped".to_string()
        } else {
            change.modifier_type.clone()
        };
        let bonus = DamageBonus {
            label: sourced.label.clone(),
            modifier: modifier.clone(),
            value,
        };
        if is_stacking(&modifier) {
            stacked.push(bonus);
        } else if highest.get(&modifier).is_none_or(|b| value > b.value) {
            highest.insert(modifier, bonus);
        }
    }
    stacked.extend(highest.into_values());
    Ok(stacked)
}

/// Roll the caravan attack: d20 plus attack, then [`ATTACK_DAMAGE`]
/// plus damage bonuses.
pub fn attack(
    doc: &CaravanDocument,
    roster: &Roster,
    derived: &DerivedCaravan,
    rng: &mut StdRng,
) -> EngineResult<AttackResult> {
    let notes = note_texts(&context_notes(doc, roster, NOTE_ATTACK));
    let attack = d20(derived.statistics.attack, rng);
    let damage = ATTACK_DAMAGE.pool().roll(rng, ATTACK_DAMAGE.modifier);
    let damage_bonuses = damage_bonuses(doc, roster, derived)?;
    let result = AttackResult {
        attack,
        damage,
        damage_bonuses,
        notes,
    };
    tracing::debug!(
        attack = result.attack.total(),
        damage = result.total_damage(),
        "caravan attack rolled"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive_with_roster;
    use crate::registry::Registries;
    use caravan_core::change::{Change, ContextNote};
    use caravan_core::item::{Feat, ItemCommon, ItemData, Traveler};
    use rand::SeedableRng;

    fn prepared(doc: &CaravanDocument) -> (Roster, DerivedCaravan) {
        let registries = Registries::default();
        let mut roster = Roster::from_document(doc);
        roster.resolve(&registries).unwrap();
        let derived = derive_with_roster(doc, &roster, &registries).unwrap();
        (roster, derived)
    }

    fn feat(changes: Vec<Change>, notes: Vec<ContextNote>) -> ItemData {
        ItemData::Feat(Feat {
            common: ItemCommon {
                changes,
                context_notes: notes,
                ..ItemCommon::default()
            },
            ..Feat::default()
        })
    }

    #[test]
    fn only_resolve_and_security_can_be_tested() {
        assert_eq!(TestAttribute::parse("Resolve").unwrap(), TestAttribute::Resolve);
        assert_eq!(TestAttribute::parse("security").unwrap(), TestAttribute::Security);
        assert!(matches!(
            TestAttribute::parse("attack"),
            Err(EngineError::InvalidAttribute(a)) if a == "attack"
        ));
    }

    #[test]
    fn security_test_adds_statistic_and_notes() {
        let mut doc = CaravanDocument::default();
        doc.attach("Ysolde", ItemData::Traveler(Traveler::with_role("guard")));
        let (roster, derived) = prepared(&doc);
        let mut rng = StdRng::seed_from_u64(11);
        let result = attribute_test(&doc, &roster, &derived, TestAttribute::Security, &mut rng);
        assert_eq!(result.roll.modifier, derived.statistics.security);
        assert_eq!(result.roll.dice.len(), 1);
        assert_eq!(result.roll.dice[0].die, Die::D20);
        assert_eq!(result.notes, vec!["+1 to avoid being surprised"]);
    }

    #[test]
    fn damage_bonuses_keep_highest_per_type() {
        let mut doc = CaravanDocument::default();
        doc.attach(
            "Spikes",
            feat(vec![Change::new("2", DAMAGE_TARGET).typed("enhancement")], vec![]),
        );
        doc.attach(
            "Bigger spikes",
            feat(vec![Change::new("3", DAMAGE_TARGET).typed("enhancement")], vec![]),
        );
        doc.attach("Rage", feat(vec![Change::new("1", DAMAGE_TARGET)], vec![]));
        doc.attach(
            "Fixed",
            feat(
                vec![Change::new("9", DAMAGE_TARGET).with_operator(ChangeOperator::Set)],
                vec![],
            ),
        );
        let (roster, derived) = prepared(&doc);
        let bonuses = damage_bonuses(&doc, &roster, &derived).unwrap();
        let values: Vec<_> = bonuses.iter().map(|b| (b.label.as_str(), b.value)).collect();
        assert_eq!(values, vec![("Rage", 1), ("Bigger spikes", 3)]);
    }

    #[test]
    fn attack_rolls_d20_and_damage() {
        let mut doc = CaravanDocument::default();
        doc.attach(
            "Ram",
            feat(
                vec![Change::new("2", DAMAGE_TARGET)],
                vec![ContextNote::new(NOTE_ATTACK, "Ramming only")],
            ),
        );
        let (roster, derived) = prepared(&doc);
        let result = attack(&doc, &roster, &derived, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(result.attack.modifier, derived.statistics.attack);
        assert_eq!(result.damage.dice[0].die, Die::D6);
        assert_eq!(result.total_damage(), result.damage.total() + 2);
        assert_eq!(result.notes, vec!["Ramming only"]);
    }
}
