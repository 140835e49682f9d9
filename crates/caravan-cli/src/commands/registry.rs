use comfy_table::{ContentArrangement, Table};

use caravan_engine::Registries;

fn optional(value: Option<i64>) -> String {
    value.map_or_else(|| "—".to_string(), |v| v.to_string())
}

pub fn roles(registries: &Registries, json: bool) -> Result<(), String> {
    if json {
        let roles: Vec<_> = registries.roles.values().collect();
        return super::print_json(&roles);
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Wage (gp/month)", "Max", "Party only", "Tasks"]);
    for role in registries.roles.values() {
        let tasks: Vec<&str> = role.tasks.iter().map(|t| t.name.as_str()).collect();
        table.add_row(vec![
            role.id.clone(),
            role.name.clone(),
            optional(role.monthly_wage),
            optional(role.max),
            if role.only_party { "yes" } else { "" }.to_string(),
            tasks.join(", "),
        ]);
    }
    println!("{table}");
    println!();
    println!("  {} roles", registries.roles.len());
    Ok(())
}

pub fn wagon_types(registries: &Registries, json: bool) -> Result<(), String> {
    if json {
        let wagon_types: Vec<_> = registries.wagon_types.values().collect();
        return super::print_json(&wagon_types);
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Id",
        "Name",
        "Cost (gp)",
        "HP",
        "Travelers",
        "Cargo",
        "Consumption",
        "Max",
    ]);
    for wagon_type in registries.wagon_types.values() {
        table.add_row(vec![
            wagon_type.id.clone(),
            wagon_type.name.clone(),
            optional(wagon_type.cost),
            optional(wagon_type.hp),
            optional(wagon_type.capacity.traveler),
            optional(wagon_type.capacity.cargo),
            optional(wagon_type.consumption),
            optional(wagon_type.max),
        ]);
    }
    println!("{table}");
    println!();
    println!("  {} wagon types", registries.wagon_types.len());
    Ok(())
}
