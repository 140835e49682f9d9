//! Plain-text messages for rest reports.

use crate::rest::RestReport;

/// Render a rest report as a short multi-line message.
pub fn rest_message(caravan_name: &str, report: &RestReport) -> String {
    let mut lines = Vec::new();
    let name = if caravan_name.is_empty() {
        "The caravan"
    } else {
        caravan_name
    };
    let rest = if report.restore_daily_uses {
        "full rest"
    } else {
        "rest"
    };
    lines.push(format!("{name} takes a {rest} of {} hours.", report.hours));

    if report.had_provisions {
        lines.push(format!(
            "Provisions consumed: {}.",
            report.consumed_provisions
        ));
    } else {
        lines.push(format!(
            "Not enough provisions: the last {} were eaten.",
            report.consumed_provisions
        ));
    }
    if let Some(damage) = &report.damage_taken {
        lines.push(format!(
            "The caravan takes {} damage from hunger ({damage}).",
            damage.total()
        ));
    }
    if let Some(condition) = report.condition_changed_to {
        lines.push(format!("Condition: {}.", condition.label()));
    }
    if !report.rested_actors.is_empty() {
        lines.push(format!("Rested travelers: {}.", report.rested_actors.join(", ")));
    }
    if !report.restored_uses.is_empty() {
        lines.push(format!("Daily uses restored: {}.", report.restored_uses.join(", ")));
    }
    lines.join("\n")
}
