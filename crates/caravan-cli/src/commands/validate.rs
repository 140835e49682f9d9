use std::path::Path;

use colored::Colorize;

use caravan_engine::Registries;

pub fn run(file: &Path, registries: &Registries) -> Result<(), String> {
    let doc = super::load_document(file)?;
    let issues = caravan_engine::validate_caravan(&doc, registries);

    if issues.is_empty() {
        println!("  All checks passed for '{}'.", super::caravan_name(&doc));
        return Ok(());
    }

    for issue in &issues {
        let line = issue.to_string();
        if issue.is_error {
            eprintln!("  {}", line.red());
        } else {
            eprintln!("  {}", line.yellow());
        }
    }

    let errors = issues.iter().filter(|i| i.is_error).count();
    let warnings = issues.len() - errors;
    eprintln!(
        "  {} error{}, {} warning{}",
        errors,
        if errors == 1 { "" } else { "s" },
        warnings,
        if warnings == 1 { "" } else { "s" },
    );
    if errors > 0 {
        Err("validation failed with errors".into())
    } else {
        Ok(())
    }
}
