use std::path::Path;

use colored::Colorize;

use caravan_engine::Registries;

pub fn run(file: &Path, registries: &Registries, target: &str) -> Result<(), String> {
    let (doc, roster, _) = super::prepare(file, registries)?;
    let groups = caravan_engine::context_notes(&doc, &roster, target);

    if groups.is_empty() {
        println!("  No notes for '{target}'.");
        return Ok(());
    }

    for group in &groups {
        println!("  {}", group.item_name.bold());
        for note in caravan_engine::notes::note_texts(std::slice::from_ref(group)) {
            println!("    - {note}");
        }
    }
    Ok(())
}
