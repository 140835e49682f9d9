use colored::Colorize;

use caravan_engine::DiceExpr;

pub fn run(expr: &str, seed: Option<u64>) -> Result<(), String> {
    let dice = DiceExpr::parse(expr).map_err(|e| e.to_string())?;
    let mut rng = super::rng(seed);
    let result = dice.pool().roll(&mut rng, dice.modifier);
    println!("  {dice}: {} {}", result.total().to_string().bold(), format!("{result}").dimmed());
    Ok(())
}
