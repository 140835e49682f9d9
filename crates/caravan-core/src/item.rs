use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::MODULE_NAMESPACE;
use crate::change::{Change, ContextNote, SourceRef, Uses};

/// Unique identifier of an item attached to a caravan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Generate a new random item ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// The kind of an attached item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKind {
    /// A person travelling with the caravan.
    Traveler,
    /// A wagon, carriage, or train.
    Wagon,
    /// Cargo measured in units.
    Equipment,
    /// A caravan feat or feature.
    Feat,
    /// Anything from outside the caravan namespace.
    Treasure,
}

impl ItemKind {
    /// All kinds owned by the caravan module.
    pub const MODULE_KINDS: [ItemKind; 4] = [Self::Traveler, Self::Wagon, Self::Equipment, Self::Feat];

    /// Namespaced type name (`caravan.traveler`); treasure has no namespace.
    pub fn type_name(self) -> String {
        match self {
            Self::Treasure => "treasure".to_string(),
            other => format!("{MODULE_NAMESPACE}.{}", other.short_name()),
        }
    }

    /// Bare name (`traveler`).
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Traveler => "traveler",
            Self::Wagon => "wagon",
            Self::Equipment => "equipment",
            Self::Feat => "feat",
            Self::Treasure => "treasure",
        }
    }

    /// Returns true for kinds inside the caravan namespace.
    pub fn is_module(self) -> bool {
        self != Self::Treasure
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Free-form description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Description {
    /// Description text.
    pub value: String,
}

/// Fields shared by every caravan-namespace item.
///
/// The underscore-prefixed fields are never edited by players: they are
/// filled when registry defaults are merged into the item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemCommon {
    /// Limited-use tracking.
    pub uses: Uses,
    /// Opaque action descriptors.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Value>,
    /// Description text.
    pub description: Description,
    /// Player-authored changes.
    pub changes: Vec<Change>,
    /// Player-authored context notes.
    pub context_notes: Vec<ContextNote>,
    /// Publication references.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<SourceRef>,
    /// Changes contributed by the registry entry.
    #[serde(rename = "_changes", skip_serializing_if = "Vec::is_empty")]
    pub granted_changes: Vec<Change>,
    /// Context notes contributed by the registry entry.
    #[serde(rename = "_contextNotes", skip_serializing_if = "Vec::is_empty")]
    pub granted_notes: Vec<ContextNote>,
    /// Registry fields without a typed home on the item.
    #[serde(rename = "_extra", skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl ItemCommon {
    /// Player-authored and registry-granted changes, in that order.
    pub fn all_changes(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter().chain(self.granted_changes.iter())
    }

    /// Player-authored and registry-granted notes, in that order.
    pub fn all_notes(&self) -> impl Iterator<Item = &ContextNote> {
        self.context_notes.iter().chain(self.granted_notes.iter())
    }
}

/// A task a traveler can perform within its role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelerTask {
    /// Task identifier, unique within the role.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Changes granted while performing this task.
    #[serde(rename = "_changes", skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<Change>,
    /// Notes granted while performing this task.
    #[serde(rename = "_contextNotes", skip_serializing_if = "Vec::is_empty")]
    pub context_notes: Vec<ContextNote>,
}

/// A person travelling with the caravan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Traveler {
    /// Shared item fields.
    #[serde(flatten)]
    pub common: ItemCommon,
    /// Traveler role identifier.
    pub sub_type: String,
    /// Wage owed per month, in gold.
    pub monthly_wage: i64,
    /// Selected task within the role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    /// Linked character, if the traveler is a full actor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    /// Whether the traveler is a non-paid companion.
    #[serde(rename = "isNPC")]
    pub is_npc: bool,
    /// Whether the traveler counts as a hero.
    pub is_hero: bool,
    /// Role display name, filled by the merge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    /// Per-role limit, filled by the merge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Whether the role is reserved for party members, filled by the merge.
    pub only_party: bool,
    /// Tasks available to the role, filled by the merge.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<TravelerTask>,
    /// Display name of the selected task, filled by the merge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
}

impl Default for Traveler {
    fn default() -> Self {
        Self {
            common: ItemCommon::default(),
            sub_type: "passenger".to_string(),
            monthly_wage: 0,
            task: None,
            actor_id: None,
            is_npc: false,
            is_hero: false,
            role_name: None,
            max: None,
            only_party: false,
            tasks: Vec::new(),
            task_name: None,
        }
    }
}

impl Traveler {
    /// A traveler with the given role.
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            sub_type: role.into(),
            ..Self::default()
        }
    }
}

/// Capacities a wagon provides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WagonCapacity {
    /// Travelers carried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traveler: Option<i64>,
    /// Cargo units carried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cargo: Option<i64>,
}

/// A wagon attached to the caravan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Wagon {
    /// Shared item fields.
    #[serde(flatten)]
    pub common: ItemCommon,
    /// Wagon type identifier.
    pub sub_type: String,
    /// Purchase cost in gold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<i64>,
    /// Hit points the wagon adds to the caravan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<i64>,
    /// Traveler and cargo capacity.
    pub capacity: WagonCapacity,
    /// Per-type limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Daily provisions consumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumption: Option<i64>,
    /// Wagon type display name, filled by the merge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl Default for Wagon {
    fn default() -> Self {
        Self {
            common: ItemCommon::default(),
            sub_type: "coveredWagon".to_string(),
            cost: None,
            hp: None,
            capacity: WagonCapacity::default(),
            max: None,
            consumption: None,
            type_name: None,
        }
    }
}

impl Wagon {
    /// A wagon of the given type.
    pub fn of_type(wagon_type: impl Into<String>) -> Self {
        Self {
            sub_type: wagon_type.into(),
            ..Self::default()
        }
    }
}

/// Unit measure of a piece of equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Units {
    /// Cargo units per item.
    pub value: i64,
}

impl Default for Units {
    fn default() -> Self {
        Self { value: 1 }
    }
}

/// Cargo carried by the caravan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Equipment {
    /// Shared item fields.
    #[serde(flatten)]
    pub common: ItemCommon,
    /// Number of items.
    pub quantity: i64,
    /// Units per item.
    pub units: Units,
    /// Price per item, in gold.
    pub price: f64,
}

impl Default for Equipment {
    fn default() -> Self {
        Self {
            common: ItemCommon::default(),
            quantity: 1,
            units: Units::default(),
            price: 0.0,
        }
    }
}

impl Equipment {
    /// Equipment of `quantity` items worth `units` cargo units each.
    pub fn new(quantity: i64, units: i64) -> Self {
        Self {
            quantity,
            units: Units { value: units },
            ..Self::default()
        }
    }

    /// Total cargo units: `quantity * units.value`.
    pub fn units_total(&self) -> i64 {
        self.quantity * self.units.value
    }
}

/// Whether a feat counts against the feat allowance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatKind {
    /// A chosen feat; counted.
    #[default]
    Feat,
    /// A granted feature; not counted.
    Feature,
}

/// A caravan feat or feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Feat {
    /// Shared item fields.
    #[serde(flatten)]
    pub common: ItemCommon,
    /// Feat or feature.
    pub sub_type: FeatKind,
}

/// Item weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weight {
    /// Weight per item, in pounds.
    pub value: f64,
}

/// An item from outside the caravan namespace (loot, weapons, gear).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Treasure {
    /// The foreign item kind (`loot`, `weapon`, ...).
    pub kind: String,
    /// Number of items.
    pub quantity: i64,
    /// Price per item, in gold.
    pub price: f64,
    /// Weight per item.
    pub weight: Weight,
}

impl Default for Treasure {
    fn default() -> Self {
        Self {
            kind: "loot".to_string(),
            quantity: 1,
            price: 0.0,
            weight: Weight::default(),
        }
    }
}

impl Treasure {
    /// Total weight: `quantity * weight.value`.
    pub fn weight_total(&self) -> f64 {
        self.quantity as f64 * self.weight.value
    }
}

/// Variant payload of an attached item, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemData {
    /// A traveler.
    Traveler(Traveler),
    /// A wagon.
    Wagon(Wagon),
    /// Equipment.
    Equipment(Equipment),
    /// A feat.
    Feat(Feat),
    /// A foreign item.
    Treasure(Treasure),
}

fn default_true() -> bool {
    true
}

/// An item attached to a caravan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaravanItem {
    /// Item identifier; generated when missing from a snapshot.
    #[serde(default)]
    pub id: ItemId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Inactive items contribute neither changes nor notes.
    #[serde(default = "default_true")]
    pub active: bool,
    /// Variant payload.
    #[serde(flatten)]
    pub data: ItemData,
}

impl CaravanItem {
    /// Wrap a payload into an active item with a fresh ID.
    pub fn new(name: impl Into<String>, data: ItemData) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            active: true,
            data,
        }
    }

    /// Mark the item inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// The item's kind.
    pub fn kind(&self) -> ItemKind {
        match self.data {
            ItemData::Traveler(_) => ItemKind::Traveler,
            ItemData::Wagon(_) => ItemKind::Wagon,
            ItemData::Equipment(_) => ItemKind::Equipment,
            ItemData::Feat(_) => ItemKind::Feat,
            ItemData::Treasure(_) => ItemKind::Treasure,
        }
    }

    /// Shared fields, for caravan-namespace items only.
    pub fn common(&self) -> Option<&ItemCommon> {
        match &self.data {
            ItemData::Traveler(t) => Some(&t.common),
            ItemData::Wagon(w) => Some(&w.common),
            ItemData::Equipment(e) => Some(&e.common),
            ItemData::Feat(f) => Some(&f.common),
            ItemData::Treasure(_) => None,
        }
    }

    /// The traveler payload, if this is a traveler.
    pub fn as_traveler(&self) -> Option<&Traveler> {
        match &self.data {
            ItemData::Traveler(t) => Some(t),
            _ => None,
        }
    }

    /// The wagon payload, if this is a wagon.
    pub fn as_wagon(&self) -> Option<&Wagon> {
        match &self.data {
            ItemData::Wagon(w) => Some(w),
            _ => None,
        }
    }

    /// The equipment payload, if this is equipment.
    pub fn as_equipment(&self) -> Option<&Equipment> {
        match &self.data {
            ItemData::Equipment(e) => Some(e),
            _ => None,
        }
    }

    /// The feat payload, if this is a feat.
    pub fn as_feat(&self) -> Option<&Feat> {
        match &self.data {
            ItemData::Feat(f) => Some(f),
            _ => None,
        }
    }

    /// The treasure payload, if this is a foreign item.
    pub fn as_treasure(&self) -> Option<&Treasure> {
        match &self.data {
            ItemData::Treasure(t) => Some(t),
            _ => None,
        }
    }
}
