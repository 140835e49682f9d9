use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// How a change combines with the value already at its target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOperator {
    /// Add the formula result to the target.
    #[default]
    Add,
    /// Replace the target with the formula result.
    Set,
}

impl fmt::Display for ChangeOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Set => write!(f, "set"),
        }
    }
}

/// A modifier descriptor attached to an item or produced by the engine.
///
/// `target` is a symbolic buff target such as `caravan_defense`; the
/// engine resolves it to concrete field paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// Identifier unique within the owning item.
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Formula text; numeric literals in snapshots are accepted as well.
    #[serde(default, deserialize_with = "formula_text")]
    pub formula: String,
    /// Symbolic buff target.
    #[serde(default)]
    pub target: String,
    /// Bonus type (`untyped`, `circumstance`, ...).
    #[serde(rename = "type", default)]
    pub modifier_type: String,
    /// Combination operator; `add` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<ChangeOperator>,
    /// Evaluation priority; higher runs first, `0` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    /// Whether the change is continuously active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuous: Option<bool>,
    /// Label shown in source breakdowns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
}

impl Change {
    /// An untyped `add` change with default priority.
    pub fn new(formula: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            target: target.into(),
            modifier_type: "untyped".to_string(),
            ..Self::default()
        }
    }

    /// Set the bonus type.
    pub fn typed(mut self, modifier_type: impl Into<String>) -> Self {
        self.modifier_type = modifier_type.into();
        self
    }

    /// Set the operator.
    pub fn with_operator(mut self, operator: ChangeOperator) -> Self {
        self.operator = Some(operator);
        self
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the flavor label.
    pub fn with_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.flavor = Some(flavor.into());
        self
    }

    /// The effective operator.
    pub fn operator(&self) -> ChangeOperator {
        self.operator.unwrap_or_default()
    }

    /// The effective priority.
    pub fn priority(&self) -> i64 {
        self.priority.unwrap_or(0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFormula {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn formula_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawFormula::deserialize(deserializer)? {
        RawFormula::Text(s) => s,
        RawFormula::Integer(n) => n.to_string(),
        RawFormula::Float(f) => f.to_string(),
    })
}

/// A situational note shown alongside rolls against `target`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextNote {
    /// Context-note target such as `caravan_security`.
    pub target: String,
    /// Note text.
    pub text: String,
}

impl ContextNote {
    /// Create a note for a target.
    pub fn new(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            text: text.into(),
        }
    }
}

/// A publication reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceRef {
    /// Book title.
    pub title: String,
    /// Page range.
    pub pages: String,
    /// Publication identifier.
    pub id: String,
    /// Errata reference.
    pub errata: String,
    /// Publication date.
    pub date: String,
    /// Publisher.
    pub publisher: String,
}

/// Limited-use tracking for an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Uses {
    /// Recharge period (`day`, `week`, ...); empty for unlimited.
    pub per: String,
    /// Remaining uses.
    pub value: i64,
    /// Formula for the maximum number of uses.
    pub max_formula: String,
    /// Formula for charges spent per use.
    pub auto_deduct_charges_cost: String,
    /// Formula for charges restored on recharge.
    pub recharge_formula: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formula_accepts_numbers() {
        let change: Change =
            serde_json::from_str(r#"{"formula": -3, "target": "caravan_consumption", "type": "circumstance"}"#)
                .unwrap();
        assert_eq!(change.formula, "-3");
        assert_eq!(change.modifier_type, "circumstance");
        assert_eq!(change.operator(), ChangeOperator::Add);
        assert_eq!(change.priority(), 0);
    }

    #[test]
    fn builder_sets_fields() {
        let change = Change::new("0", "caravan_speed")
            .with_operator(ChangeOperator::Set)
            .with_priority(-1)
            .with_flavor("Immobilized");
        assert_eq!(change.operator(), ChangeOperator::Set);
        assert_eq!(change.priority(), -1);
        assert_eq!(change.flavor.as_deref(), Some("Immobilized"));
        assert_eq!(change.modifier_type, "untyped");
    }

    #[test]
    fn uses_reads_camel_case() {
        let uses: Uses = serde_json::from_str(r#"{"per": "day", "maxFormula": "3"}"#).unwrap();
        assert_eq!(uses.per, "day");
        assert_eq!(uses.max_formula, "3");
    }
}
