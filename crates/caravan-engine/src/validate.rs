//! Consistency checks for caravan snapshots.

use caravan_core::document::CaravanDocument;
use caravan_core::item::ItemData;

use crate::buff_target::{self, ROLE_LIMIT_PREFIX, WAGON_LIMIT_PREFIX};
use crate::changes;
use crate::counts::{self, CountSummary};
use crate::derive::derive_with_roster;
use crate::formula::Formula;
use crate::merge::Roster;
use crate::registry::Registries;

/// A validation issue found in a caravan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// The caravan or item where the issue was found.
    pub entity: String,
    /// A human-readable description of the issue.
    pub message: String,
    /// Whether this is an error (true) or a warning (false).
    pub is_error: bool,
}

impl ValidationIssue {
    fn error(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            message: message.into(),
            is_error: true,
        }
    }

    fn warning(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            message: message.into(),
            is_error: false,
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = if self.is_error { "error" } else { "warning" };
        write!(f, "{level}: {}: {}", self.entity, self.message)
    }
}

fn registry_issues(doc: &CaravanDocument, registries: &Registries) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for item in doc.items() {
        match &item.data {
            ItemData::Traveler(t) if !registries.roles.contains(&t.sub_type) => {
                issues.push(ValidationIssue::error(
                    &item.name,
                    format!("unknown traveler role '{}'", t.sub_type),
                ));
            }
            ItemData::Wagon(w) if !registries.wagon_types.contains(&w.sub_type) => {
                issues.push(ValidationIssue::error(
                    &item.name,
                    format!("unknown wagon type '{}'", w.sub_type),
                ));
            }
            _ => {}
        }
    }
    issues
}

fn change_issues(doc: &CaravanDocument, roster: &Roster, registries: &Registries) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for sourced in changes::collect(doc, roster) {
        // Built-in changes carry no item and are always well-formed.
        if sourced.item.is_none() {
            continue;
        }
        let change = &sourced.change;
        if let Err(e) = Formula::parse(&change.formula) {
            issues.push(ValidationIssue::error(&sourced.label, e.to_string()));
        }
        if !buff_target::is_known_target(&change.target) {
            issues.push(ValidationIssue::warning(
                &sourced.label,
                format!("unknown change target '{}'", change.target),
            ));
        } else if let Some(role) = change.target.strip_prefix(ROLE_LIMIT_PREFIX) {
            if !registries.roles.contains(role) {
                issues.push(ValidationIssue::warning(
                    &sourced.label,
                    format!("limit for unknown traveler role '{role}'"),
                ));
            }
        } else if let Some(wagon_type) = change.target.strip_prefix(WAGON_LIMIT_PREFIX) {
            if !registries.wagon_types.contains(wagon_type) {
                issues.push(ValidationIssue::warning(
                    &sourced.label,
                    format!("limit for unknown wagon type '{wagon_type}'"),
                ));
            }
        }
    }

    for item in doc.items() {
        let Some(common) = item.common() else {
            continue;
        };
        for note in common.all_notes() {
            if !buff_target::is_note_target(&note.target) {
                issues.push(ValidationIssue::warning(
                    &item.name,
                    format!("unknown context note target '{}'", note.target),
                ));
            }
        }
    }
    issues
}

fn capacity_issues(entity: &str, what: &str, summary: &CountSummary) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if summary.balance.excess > 0 {
        issues.push(ValidationIssue::warning(
            entity,
            format!(
                "{} {what} over capacity ({} of {})",
                summary.balance.excess, summary.active, summary.max
            ),
        ));
    }
    for (id, count) in &summary.counts {
        if count.balance.excess > 0 {
            issues.push(ValidationIssue::warning(
                entity,
                format!(
                    "too many '{id}' {what}: {} of {}",
                    count.owned,
                    count.max.unwrap_or(0)
                ),
            ));
        }
    }
    issues
}

/// Validate a caravan snapshot against the registries.
///
/// Unknown roles and wagon types and unparsable formulas are errors.
/// Counts over capacity and unknown targets are warnings. Capacity is only
/// checked once every traveler and wagon resolves.
pub fn validate_caravan(doc: &CaravanDocument, registries: &Registries) -> Vec<ValidationIssue> {
    let mut issues = registry_issues(doc, registries);

    let mut roster = Roster::from_document(doc);
    if let Err(e) = roster.resolve(registries) {
        issues.push(ValidationIssue::error(&doc.name, e.to_string()));
        return issues;
    }
    issues.extend(change_issues(doc, &roster, registries));
    if issues.iter().any(|i| i.is_error) {
        return issues;
    }

    let derived = match derive_with_roster(doc, &roster, registries) {
        Ok(derived) => derived,
        Err(e) => {
            issues.push(ValidationIssue::error(&doc.name, e.to_string()));
            return issues;
        }
    };
    let counts = counts::counts(doc, &derived, &roster);
    issues.extend(capacity_issues(&doc.name, "feats", &counts.feats));
    issues.extend(capacity_issues(&doc.name, "travelers", &counts.travelers));
    issues.extend(capacity_issues(&doc.name, "wagons", &counts.wagons));
    issues.extend(capacity_issues(&doc.name, "cargo units", &counts.cargo));
    issues
}
