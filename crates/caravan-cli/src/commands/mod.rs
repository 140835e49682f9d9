pub mod check;
pub mod convert;
pub mod counts;
pub mod derive;
pub mod notes;
pub mod registry;
pub mod rest;
pub mod roll;
pub mod targets;
pub mod validate;

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use caravan_core::CaravanDocument;
use caravan_engine::registry::{RoleRegistry, WagonTypeRegistry};
use caravan_engine::{DerivedCaravan, Registries, Roster};

/// Shipped registries, extended or overridden by the given files.
pub fn load_registries(roles: Option<&Path>, wagons: Option<&Path>) -> Result<Registries, String> {
    let mut registries = Registries::default();
    if let Some(path) = roles {
        let loaded = RoleRegistry::from_json(&read(path)?)
            .map_err(|e| format!("{}: {e}", path.display()))?;
        let mut count = 0;
        for role in loaded.values() {
            registries.roles.register(role.clone());
            count += 1;
        }
        tracing::info!(path = %path.display(), roles = count, "loaded role file");
    }
    if let Some(path) = wagons {
        let loaded = WagonTypeRegistry::from_json(&read(path)?)
            .map_err(|e| format!("{}: {e}", path.display()))?;
        let mut count = 0;
        for wagon_type in loaded.values() {
            registries.wagon_types.register(wagon_type.clone());
            count += 1;
        }
        tracing::info!(path = %path.display(), wagon_types = count, "loaded wagon type file");
    }
    Ok(registries)
}

fn read(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
}

/// Load a caravan snapshot.
fn load_document(path: &Path) -> Result<CaravanDocument, String> {
    let doc = CaravanDocument::from_json(&read(path)?)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        caravan = %doc.name,
        items = doc.items().len(),
        "snapshot loaded"
    );
    Ok(doc)
}

/// Write a caravan snapshot back to disk.
fn save_document(path: &Path, doc: &CaravanDocument) -> Result<(), String> {
    let json = doc.to_json().map_err(|e| e.to_string())?;
    std::fs::write(path, json).map_err(|e| format!("cannot write {}: {e}", path.display()))
}

/// Load a snapshot, resolve its roster, and derive it.
fn prepare(
    path: &Path,
    registries: &Registries,
) -> Result<(CaravanDocument, Roster, DerivedCaravan), String> {
    let doc = load_document(path)?;
    let mut roster = Roster::from_document(&doc);
    roster.resolve(registries).map_err(|e| e.to_string())?;
    let derived =
        caravan_engine::derive_with_roster(&doc, &roster, registries).map_err(|e| e.to_string())?;
    Ok((doc, roster, derived))
}

/// Seeded RNG, or one seeded from the OS.
fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

/// Display name for an unnamed caravan.
fn caravan_name(doc: &CaravanDocument) -> &str {
    if doc.name.is_empty() {
        "Unnamed caravan"
    } else {
        &doc.name
    }
}
