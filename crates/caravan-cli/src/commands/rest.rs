use std::path::Path;

use colored::Colorize;

use caravan_engine::message::rest_message;
use caravan_engine::{Registries, RestOptions};

pub fn run(
    file: &Path,
    registries: &Registries,
    options: &RestOptions,
    seed: Option<u64>,
    write: bool,
    json: bool,
) -> Result<(), String> {
    let (doc, _, derived) = super::prepare(file, registries)?;
    let mut rng = super::rng(seed);
    let outcome =
        caravan_engine::rest(&doc, &derived, options, &mut rng).map_err(|e| e.to_string())?;

    if write {
        super::save_document(file, &outcome.document)?;
    }

    if json {
        return super::print_json(&outcome.report);
    }

    for line in rest_message(&doc.name, &outcome.report).lines() {
        println!("  {line}");
    }
    if write {
        println!("  {}", format!("Saved to {}", file.display()).dimmed());
    }
    Ok(())
}
