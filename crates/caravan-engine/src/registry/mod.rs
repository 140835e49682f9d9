//! Traveler-role and wagon-type registries.
//!
//! A [`Registry`] is a read-only, ordered lookup table keyed by entry id.
//! The engine never reaches for global state: registries are passed in
//! explicitly through [`Registries`]. The default contents ship in
//! [`preset`].

pub mod preset;

use caravan_core::change::{Change, ContextNote};
use caravan_core::item::{TravelerTask, WagonCapacity};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{EngineError, EngineResult};

/// Behaviour shared by registry entries.
pub trait RegistryEntry {
    /// The entry id items refer to through `subType`.
    fn id(&self) -> &str;
    /// Display name.
    fn name(&self) -> &str;
    /// Per-caravan limit, if the entry has one.
    fn max(&self) -> Option<i64>;
}

/// A traveler role definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TravelerRole {
    /// Role id.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Default monthly wage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_wage: Option<i64>,
    /// How many travelers of this role a caravan may have.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Role reserved for party members.
    pub only_party: bool,
    /// Changes every traveler of this role grants.
    #[serde(rename = "_changes", skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<Change>,
    /// Notes every traveler of this role grants.
    #[serde(rename = "_contextNotes", skip_serializing_if = "Vec::is_empty")]
    pub context_notes: Vec<ContextNote>,
    /// Tasks to choose from; the first is the default.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<TravelerTask>,
    /// Any further fields, merged into travelers verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TravelerRole {
    /// A bare role.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Find one of the role's tasks.
    pub fn task(&self, task_id: &str) -> Option<&TravelerTask> {
        self.tasks.iter().find(|t| t.id == task_id)
    }
}

impl RegistryEntry for TravelerRole {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn max(&self) -> Option<i64> {
        self.max
    }
}

/// A wagon type definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WagonType {
    /// Wagon type id.
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Purchase cost in gold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<i64>,
    /// Hit points added to the caravan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<i64>,
    /// Traveler and cargo capacity.
    pub capacity: WagonCapacity,
    /// How many wagons of this type a caravan may have.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Daily provisions consumed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumption: Option<i64>,
    /// Changes every wagon of this type grants.
    #[serde(rename = "_changes", skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<Change>,
    /// Notes every wagon of this type grants.
    #[serde(rename = "_contextNotes", skip_serializing_if = "Vec::is_empty")]
    pub context_notes: Vec<ContextNote>,
    /// Any further fields, merged into wagons verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WagonType {
    /// A bare wagon type.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

impl RegistryEntry for WagonType {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn max(&self) -> Option<i64> {
        self.max
    }
}

/// An ordered, id-keyed collection of registry entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry<E> {
    entries: Vec<E>,
}

impl<E> Default for Registry<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E: RegistryEntry> Registry<E> {
    /// Build a registry, rejecting empty or duplicate ids.
    pub fn new(entries: Vec<E>) -> EngineResult<Self> {
        let mut registry = Self::default();
        for entry in entries {
            if entry.id().is_empty() {
                return Err(EngineError::InvalidRegistry(format!(
                    "entry \"{}\" has no id",
                    entry.name()
                )));
            }
            if registry.contains(entry.id()) {
                return Err(EngineError::InvalidRegistry(format!(
                    "duplicate id '{}'",
                    entry.id()
                )));
            }
            registry.entries.push(entry);
        }
        Ok(registry)
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &str) -> Option<&E> {
        self.entries.iter().find(|e| e.id() == id)
    }

    /// Returns true if an entry with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All entries in registration order.
    pub fn values(&self) -> impl Iterator<Item = &E> {
        self.entries.iter()
    }

    /// All ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an entry, replacing any existing entry with the same id.
    pub fn register(&mut self, entry: E) {
        match self.entries.iter().position(|e| e.id() == entry.id()) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
    }
}

impl<E: RegistryEntry + DeserializeOwned> Registry<E> {
    /// Load a registry from a JSON array of entries.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let entries: Vec<E> = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidRegistry(e.to_string()))?;
        Self::new(entries)
    }
}

/// Registry of traveler roles.
pub type RoleRegistry = Registry<TravelerRole>;

/// Registry of wagon types.
pub type WagonTypeRegistry = Registry<WagonType>;

/// The registries a derivation runs against.
#[derive(Debug, Clone, PartialEq)]
pub struct Registries {
    /// Traveler roles.
    pub roles: RoleRegistry,
    /// Wagon types.
    pub wagon_types: WagonTypeRegistry,
}

impl Registries {
    /// Bundle two registries.
    pub fn new(roles: RoleRegistry, wagon_types: WagonTypeRegistry) -> Self {
        Self { roles, wagon_types }
    }
}

impl Default for Registries {
    /// The shipped roles and wagon types.
    fn default() -> Self {
        Self {
            roles: preset::traveler_roles(),
            wagon_types: preset::wagon_types(),
        }
    }
}
