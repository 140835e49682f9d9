//! Core types for caravans: the caravan record, its attached items, and the
//! modifier descriptors those items carry.
//!
//! This crate holds plain data. It knows nothing about registries or
//! derivation; see `caravan-engine` for that. A [`CaravanDocument`] can be
//! built programmatically or deserialized from a JSON snapshot.

/// The caravan record and its persisted base values.
pub mod caravan;
/// Modifier descriptors (changes), context notes, sources, and uses.
pub mod change;
/// The document store owning a caravan and its items.
pub mod document;
/// Error types used throughout the crate.
pub mod error;
/// Attached item variants.
pub mod item;

/// Re-export caravan record types.
pub use caravan::{Caravan, Condition, Currency, StatisticKey};
/// Re-export modifier descriptor types.
pub use change::{Change, ChangeOperator, ContextNote};
/// Re-export the document store.
pub use document::CaravanDocument;
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export item types.
pub use item::{
    CaravanItem, Equipment, Feat, FeatKind, ItemCommon, ItemData, ItemId, ItemKind, Traveler,
    Treasure, Wagon,
};

/// Namespace prefix of item kinds owned by the caravan module.
///
/// Anything attached to a caravan whose kind lies outside this namespace is
/// treated as treasure.
pub const MODULE_NAMESPACE: &str = "caravan";
