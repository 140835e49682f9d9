use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::caravan::Caravan;
use crate::error::{CoreError, CoreResult};
use crate::item::{CaravanItem, ItemData, ItemId, ItemKind};

/// A caravan together with the items attached to it.
///
/// This is the snapshot the engine derives from. Items keep their
/// insertion order, which is also the order they are listed and their
/// changes are collected in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaravanDocument {
    /// Caravan display name.
    #[serde(default)]
    pub name: String,
    /// Persisted caravan values.
    #[serde(default)]
    pub system: Caravan,
    #[serde(default)]
    items: Vec<CaravanItem>,
}

impl CaravanDocument {
    /// Create an empty document around a caravan.
    pub fn new(name: impl Into<String>, system: Caravan) -> Self {
        Self {
            name: name.into(),
            system,
            items: Vec::new(),
        }
    }

    /// Parse a JSON snapshot, rejecting duplicate item IDs.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let doc: Self = serde_json::from_str(json)?;
        let mut seen = HashSet::new();
        for item in &doc.items {
            if !seen.insert(item.id) {
                return Err(CoreError::DuplicateItem(item.id));
            }
        }
        Ok(doc)
    }

    /// Serialize the document to pretty JSON.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // -----------------------------------------------------------------------
    // Item CRUD
    // -----------------------------------------------------------------------

    /// Attach an item. Returns its ID.
    pub fn add_item(&mut self, item: CaravanItem) -> CoreResult<ItemId> {
        if self.items.iter().any(|i| i.id == item.id) {
            return Err(CoreError::DuplicateItem(item.id));
        }
        let id = item.id;
        self.items.push(item);
        Ok(id)
    }

    /// Attach a new item built from a name and payload.
    pub fn attach(&mut self, name: impl Into<String>, data: ItemData) -> ItemId {
        let item = CaravanItem::new(name, data);
        let id = item.id;
        self.items.push(item);
        id
    }

    /// Get an item by ID.
    pub fn get_item(&self, id: ItemId) -> Option<&CaravanItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Get a mutable item by ID.
    pub fn get_item_mut(&mut self, id: ItemId) -> Option<&mut CaravanItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Detach an item.
    pub fn remove_item(&mut self, id: ItemId) -> CoreResult<CaravanItem> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or(CoreError::ItemNotFound(id))?;
        Ok(self.items.remove(index))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// All attached items in insertion order.
    pub fn items(&self) -> &[CaravanItem] {
        &self.items
    }

    /// Mutable access to all attached items.
    pub fn items_mut(&mut self) -> impl Iterator<Item = &mut CaravanItem> {
        self.items.iter_mut()
    }

    /// Items of one kind.
    pub fn items_of_kind(&self, kind: ItemKind) -> impl Iterator<Item = &CaravanItem> {
        self.items.iter().filter(move |i| i.kind() == kind)
    }

    /// Active items inside the caravan namespace.
    pub fn active_module_items(&self) -> impl Iterator<Item = &CaravanItem> {
        self.items
            .iter()
            .filter(|i| i.active && i.kind().is_module())
    }

    /// Number of attached items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}
