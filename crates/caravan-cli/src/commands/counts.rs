use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use caravan_engine::Registries;
use caravan_engine::counts::{CountSummary, Discrepancy};

fn balance(balance: &Discrepancy) -> String {
    if balance.excess > 0 {
        format!("{} over", balance.excess).red().to_string()
    } else if balance.missing > 0 {
        format!("{} open", balance.missing).green().to_string()
    } else {
        "full".to_string()
    }
}

fn summary_row(name: &str, summary: &CountSummary) -> Vec<String> {
    vec![
        name.to_string(),
        summary.active.to_string(),
        summary.disabled.to_string(),
        summary.max.to_string(),
        summary.wagons.map_or_else(String::new, |w| w.to_string()),
        balance(&summary.balance),
    ]
}

fn print_ids(title: &str, summary: &CountSummary) {
    let limited: Vec<_> = summary
        .counts
        .iter()
        .filter(|(_, c)| c.owned > 0 || c.max.is_some())
        .collect();
    if limited.is_empty() {
        return;
    }
    println!();
    println!("  {}", title.bold().underline());
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Owned", "Max", "Balance"]);
    for (id, count) in limited {
        let (max, status) = match count.max {
            Some(max) => (max.to_string(), balance(&count.balance)),
            None => (String::new(), String::new()),
        };
        table.add_row(vec![id.clone(), count.owned.to_string(), max, status]);
    }
    println!("{table}");
}

pub fn run(file: &Path, registries: &Registries, json: bool) -> Result<(), String> {
    let (doc, roster, derived) = super::prepare(file, registries)?;
    let counts = caravan_engine::counts(&doc, &derived, &roster);

    if json {
        return super::print_json(&counts);
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["", "Active", "Disabled", "Max", "From wagons", "Balance"]);
    table.add_row(summary_row("Feats", &counts.feats));
    table.add_row(summary_row("Travelers", &counts.travelers));
    table.add_row(summary_row("Wagons", &counts.wagons));
    table.add_row(summary_row("Cargo", &counts.cargo));
    println!("{table}");

    print_ids("Travelers by Role", &counts.travelers);
    print_ids("Wagons by Type", &counts.wagons);
    Ok(())
}
