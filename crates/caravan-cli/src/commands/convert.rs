use std::path::Path;

use colored::Colorize;

use caravan_engine::ConvertOptions;

pub fn run(file: &Path, options: &ConvertOptions, write: bool, json: bool) -> Result<(), String> {
    let doc = super::load_document(file)?;
    let outcome = caravan_engine::convert_treasure(&doc, options).map_err(|e| e.to_string())?;

    if write {
        super::save_document(file, &outcome.document)?;
    }

    if json {
        return super::print_json(&outcome.report);
    }

    let report = &outcome.report;
    if report.sold.is_empty() {
        println!("  No treasure to sell.");
        return Ok(());
    }
    println!(
        "  Sold {} for {} gp: {}",
        report.sold.join(", "),
        report.value_gp,
        report.gained.to_string().yellow()
    );
    println!("  Purse: {}", outcome.document.system.currency);
    if write {
        println!("  {}", format!("Saved to {}", file.display()).dimmed());
    }
    Ok(())
}
