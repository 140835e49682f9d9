//! Merging registry defaults into travelers and wagons.
//!
//! A traveler or wagon only stores its `subType` and whatever the player
//! edited. The rest (wage, tasks, capacity, granted changes and notes)
//! comes from its registry entry and is deep-merged in before the item
//! takes part in a derivation.
//!
//! [`Bound`] keeps the raw item next to the merged one. Resolving again is
//! free until the raw item is edited or its `subType` changes.

use caravan_core::CoreError;
use caravan_core::document::CaravanDocument;
use caravan_core::item::{ItemData, ItemId, Traveler, Wagon};
use serde_json::{Map, Value};

use crate::error::EngineResult;
use crate::registry::{Registries, TravelerRole, WagonType};

/// Deep-merge `patch` into `target`.
///
/// Arrays are concatenated, objects are merged key by key, and scalars in
/// the patch overwrite the target. Null patch values leave the target
/// untouched.
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match patch {
        Value::Null => {}
        Value::Array(items) => match target {
            Value::Array(existing) => existing.extend(items.iter().cloned()),
            other => *other = Value::Array(items.clone()),
        },
        Value::Object(fields) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            if let Value::Object(existing) = target {
                for (key, value) in fields {
                    if value.is_null() {
                        continue;
                    }
                    let slot = existing.entry(key.clone()).or_insert(Value::Null);
                    deep_merge(slot, value);
                }
            }
        }
        scalar => *target = scalar.clone(),
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> EngineResult<Value> {
    Ok(serde_json::to_value(value).map_err(CoreError::from)?)
}

fn insert_opt(patch: &mut Map<String, Value>, key: &str, value: Option<i64>) {
    if let Some(v) = value {
        patch.insert(key.to_string(), Value::from(v));
    }
}

/// Registry extras apply to the item's own fields; the named registry
/// fields inserted afterwards take precedence.
fn extra_patch(extra: &Map<String, Value>) -> Map<String, Value> {
    let mut patch = extra.clone();
    patch.remove("_extra");
    patch
}

fn role_patch(role: &TravelerRole) -> EngineResult<Value> {
    let mut patch = extra_patch(&role.extra);
    patch.insert("roleName".to_string(), Value::from(role.name.clone()));
    insert_opt(&mut patch, "monthlyWage", role.monthly_wage);
    insert_opt(&mut patch, "max", role.max);
    patch.insert("onlyParty".to_string(), Value::Bool(role.only_party));
    patch.insert("_changes".to_string(), to_value(&role.changes)?);
    patch.insert("_contextNotes".to_string(), to_value(&role.context_notes)?);
    patch.insert("tasks".to_string(), to_value(&role.tasks)?);
    patch.insert("_extra".to_string(), Value::Object(role.extra.clone()));
    Ok(Value::Object(patch))
}

fn wagon_patch(wagon_type: Option<&WagonType>) -> EngineResult<Value> {
    let Some(entry) = wagon_type else {
        let mut patch = Map::new();
        let mut capacity = Map::new();
        capacity.insert("traveler".to_string(), Value::from(0));
        capacity.insert("cargo".to_string(), Value::from(0));
        patch.insert("capacity".to_string(), Value::Object(capacity));
        return Ok(Value::Object(patch));
    };
    let mut patch = extra_patch(&entry.extra);
    patch.insert("typeName".to_string(), Value::from(entry.name.clone()));
    insert_opt(&mut patch, "cost", entry.cost);
    insert_opt(&mut patch, "hp", entry.hp);
    patch.insert("capacity".to_string(), to_value(&entry.capacity)?);
    insert_opt(&mut patch, "max", entry.max);
    insert_opt(&mut patch, "consumption", entry.consumption);
    patch.insert("_changes".to_string(), to_value(&entry.changes)?);
    patch.insert("_contextNotes".to_string(), to_value(&entry.context_notes)?);
    patch.insert("_extra".to_string(), Value::Object(entry.extra.clone()));
    Ok(Value::Object(patch))
}

/// Merge a role into a raw traveler.
///
/// Besides the deep merge this picks the traveler's task (the first task
/// of the role when none or an unknown one is selected), appends that
/// task's changes and notes, and applies the NPC rules: a traveler linked
/// to an actor or holding a party-only role is an NPC, and NPCs draw no
/// wage and are never heroes. A missing role merges nothing.
pub fn merge_traveler(raw: &Traveler, role: Option<&TravelerRole>) -> EngineResult<Traveler> {
    let mut merged = match role {
        Some(role) => {
            let mut value = to_value(raw)?;
            deep_merge(&mut value, &role_patch(role)?);
            serde_json::from_value::<Traveler>(value).map_err(CoreError::from)?
        }
        None => {
            tracing::debug!(role = %raw.sub_type, "no registry entry for traveler role");
            raw.clone()
        }
    };

    let tasks = role.map(|r| r.tasks.as_slice()).unwrap_or_default();
    if let Some(first) = tasks.first() {
        let task = merged
            .task
            .as_deref()
            .and_then(|id| tasks.iter().find(|t| t.id == id))
            .unwrap_or(first);
        merged.task = Some(task.id.clone());
        merged.task_name = Some(task.name.clone());
        merged.common.granted_changes.extend(task.changes.iter().cloned());
        merged.common.granted_notes.extend(task.context_notes.iter().cloned());
    }

    if merged.actor_id.is_some() || merged.only_party {
        merged.is_npc = true;
    }
    if merged.is_npc {
        merged.monthly_wage = 0;
        merged.is_hero = false;
    }
    Ok(merged)
}

/// Merge a wagon type into a raw wagon.
///
/// A missing wagon type merges zero capacity.
pub fn merge_wagon(raw: &Wagon, wagon_type: Option<&WagonType>) -> EngineResult<Wagon> {
    if wagon_type.is_none() {
        tracing::debug!(wagon_type = %raw.sub_type, "no registry entry for wagon type");
    }
    let mut value = to_value(raw)?;
    deep_merge(&mut value, &wagon_patch(wagon_type)?);
    Ok(serde_json::from_value(value).map_err(CoreError::from)?)
}

/// An item whose defaults come from a registry keyed by `subType`.
pub trait RegistryBound: Clone {
    /// The registry id the item refers to.
    fn sub_type(&self) -> &str;

    /// Produce the merged form of this raw item.
    fn merge_from(&self, registries: &Registries) -> EngineResult<Self>;
}

impl RegistryBound for Traveler {
    fn sub_type(&self) -> &str {
        &self.sub_type
    }

    fn merge_from(&self, registries: &Registries) -> EngineResult<Self> {
        merge_traveler(self, registries.roles.get(&self.sub_type))
    }
}

impl RegistryBound for Wagon {
    fn sub_type(&self) -> &str {
        &self.sub_type
    }

    fn merge_from(&self, registries: &Registries) -> EngineResult<Self> {
        merge_wagon(self, registries.wagon_types.get(&self.sub_type))
    }
}

/// Merge state of a single item.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound<T> {
    /// Registry defaults not merged yet.
    Unmerged(T),
    /// Registry defaults merged for the `subType` stored in `key`.
    Merged {
        /// The item as stored.
        raw: T,
        /// The item with registry defaults applied.
        merged: T,
        /// The `subType` the merge was performed for.
        key: String,
    },
}

impl<T: RegistryBound> Bound<T> {
    /// Wrap a raw item.
    pub fn new(raw: T) -> Self {
        Self::Unmerged(raw)
    }

    /// The item as stored.
    pub fn raw(&self) -> &T {
        match self {
            Self::Unmerged(raw) | Self::Merged { raw, .. } => raw,
        }
    }

    /// Mutable access to the stored item.
    ///
    /// Any earlier merge is dropped; the next [`Bound::resolve`] merges again.
    pub fn raw_mut(&mut self) -> &mut T {
        if let Self::Merged { raw, .. } = self {
            let raw = raw.clone();
            *self = Self::Unmerged(raw);
        }
        match self {
            Self::Unmerged(raw) | Self::Merged { raw, .. } => raw,
        }
    }

    /// The merged item, if a merge has happened.
    pub fn merged(&self) -> Option<&T> {
        match self {
            Self::Unmerged(_) => None,
            Self::Merged { merged, .. } => Some(merged),
        }
    }

    /// The merged item when available, the raw one otherwise.
    pub fn current(&self) -> &T {
        self.merged().unwrap_or_else(|| self.raw())
    }

    /// Returns true if the merge is current for the raw `subType`.
    pub fn is_merged(&self) -> bool {
        match self {
            Self::Unmerged(_) => false,
            Self::Merged { raw, key, .. } => raw.sub_type() == key,
        }
    }

    /// Merge registry defaults unless already merged for this `subType`.
    pub fn resolve(&mut self, registries: &Registries) -> EngineResult<&T> {
        if !self.is_merged() {
            let raw = self.raw().clone();
            let merged = raw.merge_from(registries)?;
            let key = raw.sub_type().to_string();
            *self = Self::Merged { raw, merged, key };
        }
        Ok(self.current())
    }
}

/// A bound item together with its identity on the caravan.
#[derive(Debug, Clone, PartialEq)]
pub struct Member<T> {
    /// Item ID.
    pub id: ItemId,
    /// Item name.
    pub name: String,
    /// Whether the item is active.
    pub active: bool,
    /// Merge state.
    pub bound: Bound<T>,
}

impl<T: RegistryBound> Member<T> {
    /// The merged payload, or the raw one before resolution.
    pub fn data(&self) -> &T {
        self.bound.current()
    }
}

/// The travelers and wagons of a caravan, each with its merge state.
///
/// A roster can be kept across derivations; resolving it again only
/// merges items whose `subType` changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    travelers: Vec<Member<Traveler>>,
    wagons: Vec<Member<Wagon>>,
}

impl Roster {
    /// Collect the unmerged travelers and wagons of a document.
    pub fn from_document(doc: &CaravanDocument) -> Self {
        let mut roster = Self::default();
        for item in doc.items() {
            match &item.data {
                ItemData::Traveler(t) => roster.travelers.push(Member {
                    id: item.id,
                    name: item.name.clone(),
                    active: item.active,
                    bound: Bound::new(t.clone()),
                }),
                ItemData::Wagon(w) => roster.wagons.push(Member {
                    id: item.id,
                    name: item.name.clone(),
                    active: item.active,
                    bound: Bound::new(w.clone()),
                }),
                _ => {}
            }
        }
        roster
    }

    /// Merge registry defaults into every member that needs it.
    pub fn resolve(&mut self, registries: &Registries) -> EngineResult<()> {
        for member in &mut self.travelers {
            member.bound.resolve(registries)?;
        }
        for member in &mut self.wagons {
            member.bound.resolve(registries)?;
        }
        tracing::debug!(
            travelers = self.travelers.len(),
            wagons = self.wagons.len(),
            "roster resolved"
        );
        Ok(())
    }

    /// All travelers in document order.
    pub fn travelers(&self) -> &[Member<Traveler>] {
        &self.travelers
    }

    /// All wagons in document order.
    pub fn wagons(&self) -> &[Member<Wagon>] {
        &self.wagons
    }

    /// A traveler by item ID.
    pub fn traveler(&self, id: ItemId) -> Option<&Member<Traveler>> {
        self.travelers.iter().find(|m| m.id == id)
    }

    /// A wagon by item ID.
    pub fn wagon(&self, id: ItemId) -> Option<&Member<Wagon>> {
        self.wagons.iter().find(|m| m.id == id)
    }

    /// Mutable access to a traveler.
    pub fn traveler_mut(&mut self, id: ItemId) -> Option<&mut Member<Traveler>> {
        self.travelers.iter_mut().find(|m| m.id == id)
    }

    /// Mutable access to a wagon.
    pub fn wagon_mut(&mut self, id: ItemId) -> Option<&mut Member<Wagon>> {
        self.wagons.iter_mut().find(|m| m.id == id)
    }
}
