use std::path::Path;

use colored::Colorize;

use caravan_engine::{Registries, RollResult, TestAttribute};

fn print_roll(label: &str, roll: &RollResult) {
    let total = roll.total().to_string().bold();
    let total = if roll.is_natural_max() {
        total.green()
    } else if roll.is_natural_one() {
        total.red()
    } else {
        total
    };
    println!("  {}: {total} {}", label.bold(), format!("{roll}").dimmed());
}

fn print_notes(notes: &[String]) {
    for note in notes {
        println!("    - {note}");
    }
}

pub fn run(
    file: &Path,
    registries: &Registries,
    roll: &str,
    seed: Option<u64>,
    json: bool,
) -> Result<(), String> {
    let (doc, roster, derived) = super::prepare(file, registries)?;
    let mut rng = super::rng(seed);

    if roll.eq_ignore_ascii_case("attack") {
        let result = caravan_engine::attack(&doc, &roster, &derived, &mut rng)
            .map_err(|e| e.to_string())?;
        if json {
            return super::print_json(&result);
        }
        print_roll("Attack", &result.attack);
        print_notes(&result.notes);
        print_roll("Damage", &result.damage);
        for bonus in &result.damage_bonuses {
            println!("    {:+} {} ({})", bonus.value, bonus.label, bonus.modifier);
        }
        println!("  Total damage: {}", result.total_damage().to_string().bold());
        return Ok(());
    }

    let attribute = TestAttribute::parse(roll).map_err(|e| e.to_string())?;
    let result = caravan_engine::attribute_test(&doc, &roster, &derived, attribute, &mut rng);
    if json {
        return super::print_json(&result);
    }
    print_roll(&format!("{attribute} test"), &result.roll);
    print_notes(&result.notes);
    Ok(())
}
