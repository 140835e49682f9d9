//! Resting the caravan: eating provisions, recovering from fatigue, and
//! taking damage when the food runs out.

use caravan_core::caravan::Condition;
use caravan_core::document::CaravanDocument;
use caravan_core::item::{CaravanItem, ItemData};
use rand::rngs::StdRng;
use serde::Serialize;

use crate::config::RestOptions;
use crate::derive::DerivedCaravan;
use crate::dice::{DiceExpr, Die, RollResult};
use crate::error::EngineResult;
use crate::formula;

/// Damage dice rolled when provisions run short.
pub const STARVATION_DAMAGE: DiceExpr = DiceExpr {
    count: 1,
    die: Die::D6,
    modifier: 0,
};

/// What happened during a rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestReport {
    /// Hours rested.
    pub hours: u32,
    /// Whether there was enough food for everyone.
    pub had_provisions: bool,
    /// Provisions eaten.
    pub consumed_provisions: i64,
    /// Actor ids of linked travelers that rested along.
    pub rested_actors: Vec<String>,
    /// New condition, if the rest set one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_changed_to: Option<Condition>,
    /// Starvation damage, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_taken: Option<RollResult>,
    /// Whether daily uses were restored.
    pub restore_daily_uses: bool,
    /// Names of items whose daily uses were refilled.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub restored_uses: Vec<String>,
}

/// The rested document and the report of what changed.
#[derive(Debug, Clone, PartialEq)]
pub struct RestOutcome {
    /// The document after resting.
    pub document: CaravanDocument,
    /// What happened.
    pub report: RestReport,
}

fn refill_daily_uses(
    item: &mut CaravanItem,
    roll_data: &serde_json::Value,
) -> EngineResult<bool> {
    let common = match &mut item.data {
        ItemData::Traveler(t) => &mut t.common,
        ItemData::Wagon(w) => &mut w.common,
        ItemData::Equipment(e) => &mut e.common,
        ItemData::Feat(f) => &mut f.common,
        ItemData::Treasure(_) => return Ok(false),
    };
    if common.uses.per != "day" || common.uses.max_formula.trim().is_empty() {
        return Ok(false);
    }
    common.uses.value = formula::evaluate(&common.uses.max_formula, roll_data)?.max(0);
    Ok(true)
}

/// Rest the caravan for one night.
///
/// Consumption is the derived consumption less any magical provisions.
/// With enough provisions the caravan eats, an exhausted caravan becomes
/// fatigued and any other becomes normal. Without, all provisions are
/// eaten, a normal caravan becomes fatigued, and the caravan takes
/// [`STARVATION_DAMAGE`].
pub fn rest(
    doc: &CaravanDocument,
    derived: &DerivedCaravan,
    options: &RestOptions,
    rng: &mut StdRng,
) -> EngineResult<RestOutcome> {
    let mut document = doc.clone();
    let provisions = doc.system.attributes.provisions;
    let consumption = derived
        .attributes
        .consumption
        .saturating_sub(options.magical_provisions)
        .max(0);
    let mut report = RestReport {
        hours: options.hours,
        restore_daily_uses: options.restore_daily_uses,
        ..RestReport::default()
    };

    let caravan = &mut document.system;
    if provisions >= consumption {
        report.had_provisions = true;
        report.consumed_provisions = consumption;
        caravan.attributes.provisions = provisions - consumption;

        let condition = match caravan.details.condition {
            Condition::Exhausted => Condition::Fatigued,
            _ => Condition::Normal,
        };
        caravan.details.condition = condition;
        report.condition_changed_to = Some(condition);

        if options.rest_travelers {
            report.rested_actors = doc
                .items()
                .iter()
                .filter_map(|i| i.as_traveler())
                .filter_map(|t| t.actor_id.clone())
                .collect();
        }
    } else {
        report.had_provisions = false;
        report.consumed_provisions = provisions;
        caravan.attributes.provisions = 0;

        if caravan.details.condition == Condition::Normal {
            caravan.details.condition = Condition::Fatigued;
            report.condition_changed_to = Some(Condition::Fatigued);
        }

        let damage = STARVATION_DAMAGE.pool().roll(rng, STARVATION_DAMAGE.modifier);
        caravan.attributes.hp.value = derived
            .attributes
            .hp
            .value
            .saturating_sub(damage.total());
        report.damage_taken = Some(damage);
    }

    if options.restore_daily_uses {
        let roll_data = derived.roll_data()?;
        for item in document.items_mut() {
            if refill_daily_uses(item, &roll_data)? {
                report.restored_uses.push(item.name.clone());
            }
        }
    }

    tracing::debug!(
        caravan = %doc.name,
        had_provisions = report.had_provisions,
        consumed = report.consumed_provisions,
        "caravan rested"
    );
    Ok(RestOutcome { document, report })
}
