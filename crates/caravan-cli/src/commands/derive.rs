use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use caravan_core::caravan::Condition;
use caravan_core::change::ChangeOperator;
use caravan_engine::Registries;

pub fn run(file: &Path, registries: &Registries, sources: bool, json: bool) -> Result<(), String> {
    let (doc, _, derived) = super::prepare(file, registries)?;

    if json {
        return super::print_json(&derived);
    }

    let condition = match derived.details.condition {
        Condition::Normal => derived.details.condition.label().green(),
        Condition::Fatigued => derived.details.condition.label().yellow(),
        Condition::Exhausted => derived.details.condition.label().red(),
    };
    println!(
        "  {} {}",
        super::caravan_name(&doc).bold(),
        format!("(level {})", derived.details.level).dimmed()
    );
    println!("  Condition: {condition}");
    println!();

    let stats = &derived.statistics;
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Statistic", "Base", "Total", "", "Derived", "Value"]);
    let derived_rows = [
        ("Attack", stats.attack),
        ("Armor Class", stats.armor_class),
        ("Security", stats.security),
        ("Resolve", stats.resolve),
    ];
    let base_rows = [
        ("Offense", stats.offense),
        ("Defense", stats.defense),
        ("Mobility", stats.mobility),
        ("Morale", stats.morale),
    ];
    for ((name, stat), (derived_name, value)) in base_rows.iter().zip(derived_rows.iter()) {
        table.add_row(vec![
            name.to_string(),
            stat.base.to_string(),
            stat.total.to_string(),
            String::new(),
            derived_name.to_string(),
            format_signed(*value, *derived_name == "Armor Class"),
        ]);
    }
    println!("{table}");
    println!();

    let attrs = &derived.attributes;
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Attribute", "Value"]);
    table.add_row(vec![
        "Hit Points".to_string(),
        format!("{} / {}", attrs.hp.value, attrs.hp.max),
    ]);
    table.add_row(vec![
        "Unrest".to_string(),
        format!("{} / {}", attrs.unrest.value, attrs.unrest.limit),
    ]);
    table.add_row(vec!["Provisions".to_string(), attrs.provisions.to_string()]);
    table.add_row(vec!["Consumption".to_string(), attrs.consumption.to_string()]);
    table.add_row(vec![
        "Speed".to_string(),
        format!("{} miles/day", derived.details.speed.total),
    ]);
    table.add_row(vec![
        "Wages".to_string(),
        format!("{} gp/month", derived.details.wages),
    ]);
    table.add_row(vec![
        "Travelers".to_string(),
        format!("{} / {}", derived.travelers.owned, derived.travelers.max),
    ]);
    table.add_row(vec![
        "Wagons".to_string(),
        format!("{} / {}", derived.wagons.owned, derived.wagons.max),
    ]);
    table.add_row(vec![
        "Cargo".to_string(),
        format!("{} / {}", derived.cargo.owned, derived.cargo.max),
    ]);
    table.add_row(vec![
        "Feats".to_string(),
        format!("{} / {}", derived.feats.owned, derived.feats.max),
    ]);
    table.add_row(vec!["Currency".to_string(), derived.currency.to_string()]);
    println!("{table}");

    if sources {
        println!();
        println!("  {}", "Sources".bold().underline());
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Field", "Source", "Type", "Value"]);
        for (path, entries) in &derived.sources {
            for entry in entries {
                let value = match entry.operator {
                    ChangeOperator::Set => format!("= {}", entry.value),
                    ChangeOperator::Add => format_signed(entry.value, false),
                };
                let value = if entry.applied {
                    value
                } else {
                    format!("{value} (superseded)")
                };
                table.add_row(vec![path.clone(), entry.label.clone(), entry.modifier.clone(), value]);
            }
        }
        println!("{table}");
    }

    Ok(())
}

fn format_signed(value: i64, plain: bool) -> String {
    if plain || value < 0 {
        value.to_string()
    } else {
        format!("+{value}")
    }
}
