use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use caravan_engine::Registries;
use caravan_engine::buff_target::{
    self, BUFF_TARGETS, CONTEXT_NOTE_TARGETS, ROLE_LIMIT_PREFIX, TargetCategory, WAGON_LIMIT_PREFIX,
};

pub fn run(registries: &Registries) -> Result<(), String> {
    let mut rows: Vec<(u32, String, String, TargetCategory, String)> = BUFF_TARGETS
        .iter()
        .map(|t| {
            let paths = if t.deferred {
                "(on attack)".to_string()
            } else {
                buff_target::resolve(t.id).join(", ")
            };
            (t.sort, t.id.to_string(), t.label.to_string(), t.category, paths)
        })
        .collect();

    for (offset, role) in registries.roles.values().enumerate() {
        let id = format!("{ROLE_LIMIT_PREFIX}{}", role.id);
        let paths = buff_target::resolve(&id).join(", ");
        rows.push((
            TargetCategory::Travelers.sort() + 1 + offset as u32,
            id,
            format!("{} Limit", role.name),
            TargetCategory::Travelers,
            paths,
        ));
    }
    for (offset, wagon_type) in registries.wagon_types.values().enumerate() {
        let id = format!("{WAGON_LIMIT_PREFIX}{}", wagon_type.id);
        let paths = buff_target::resolve(&id).join(", ");
        rows.push((
            TargetCategory::Wagons.sort() + 1 + offset as u32,
            id,
            format!("{} Limit", wagon_type.name),
            TargetCategory::Wagons,
            paths,
        ));
    }
    rows.sort_by_key(|row| (row.3.sort(), row.0));

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Target", "Label", "Category", "Fields"]);
    for (_, id, label, category, paths) in &rows {
        table.add_row(vec![id.clone(), label.clone(), category.to_string(), paths.clone()]);
    }
    println!("  {}", "Modifier Targets".bold().underline());
    println!("{table}");
    println!();

    let mut notes = Table::new();
    notes.set_content_arrangement(ContentArrangement::Dynamic);
    notes.set_header(vec!["Target", "Label"]);
    for target in CONTEXT_NOTE_TARGETS {
        notes.add_row(vec![target.id, target.label]);
    }
    println!("  {}", "Context Note Targets".bold().underline());
    println!("{notes}");

    Ok(())
}

pub fn resolve(target: &str) -> Result<(), String> {
    let paths = buff_target::resolve(target);
    if paths.is_empty() {
        println!("  No fields for '{target}'.");
        return Ok(());
    }
    for path in paths {
        println!("  {path}");
    }
    Ok(())
}
