//! Integration tests for CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CARAVAN: &str = r#"{
    "name": "Dust Runners",
    "system": {
        "attributes": {"hp": {"value": 30}, "provisions": 20},
        "statistics": {
            "offense": {"base": 3},
            "defense": {"base": 2},
            "mobility": {"base": 2},
            "morale": {"base": 2}
        }
    },
    "items": [
        {"type": "wagon", "name": "Old Bess", "subType": "coveredWagon"},
        {"type": "traveler", "name": "Ysolde", "subType": "guard"},
        {"type": "traveler", "name": "Tess", "subType": "driver"},
        {"type": "equipment", "name": "Crates", "quantity": 2, "units": {"value": 1}},
        {"type": "treasure", "name": "Gold idol", "quantity": 2, "price": 50}
    ]
}"#;

/// Write a snapshot into a fresh temp directory.
fn snapshot(json: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("caravan.json");
    fs::write(&path, json).unwrap();
    (dir, path)
}

fn caravan() -> Command {
    Command::cargo_bin("caravan").unwrap()
}

// ---------------------------------------------------------------------------
// derive
// ---------------------------------------------------------------------------

#[test]
fn derive_prints_tables() {
    let (_dir, path) = snapshot(CARAVAN);
    caravan()
        .arg("derive")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dust Runners"))
        .stdout(predicate::str::contains("Armor Class"))
        .stdout(predicate::str::contains("Consumption"));
}

#[test]
fn derive_json() {
    let (_dir, path) = snapshot(CARAVAN);
    caravan()
        .args(["derive", "--json"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"armorClass\": 12"))
        .stdout(predicate::str::contains("\"consumption\": 4"));
}

#[test]
fn derive_with_sources() {
    let (_dir, path) = snapshot(CARAVAN);
    caravan()
        .args(["derive", "--sources"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Sources"))
        .stdout(predicate::str::contains("No Fortune Teller"));
}

#[test]
fn derive_unknown_role_fails() {
    let (_dir, path) = snapshot(
        r#"{"name": "Lost", "items": [{"type": "traveler", "name": "Jack", "subType": "pirate"}]}"#,
    );
    caravan()
        .arg("derive")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown traveler role 'pirate'"));
}

#[test]
fn derive_missing_file_fails() {
    caravan()
        .args(["derive", "/nonexistent/caravan.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn derive_malformed_snapshot_fails() {
    let (_dir, path) = snapshot("{ not json");
    caravan()
        .arg("derive")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid snapshot"));
}

// ---------------------------------------------------------------------------
// resolve / targets
// ---------------------------------------------------------------------------

#[test]
fn resolve_fixed_target() {
    caravan()
        .args(["resolve", "caravan_defense"])
        .assert()
        .success()
        .stdout(predicate::str::contains("statistics.defense.total"))
        .stdout(predicate::str::contains("statistics.armorClass"));
}

#[test]
fn resolve_limit_target() {
    caravan()
        .args(["resolve", "caravan_travelerRoleLimit_cook"])
        .assert()
        .success()
        .stdout(predicate::str::contains("travelers.counts.cook.max"));
}

#[test]
fn resolve_unknown_target() {
    caravan()
        .args(["resolve", "caravan_luck"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No fields for 'caravan_luck'"));
}

#[test]
fn targets_lists_limits_and_notes() {
    caravan()
        .arg("targets")
        .assert()
        .success()
        .stdout(predicate::str::contains("caravan_travelerRoleLimit_cook"))
        .stdout(predicate::str::contains("caravan_wagonLimit_supplyWagon"))
        .stdout(predicate::str::contains("Context Note Targets"));
}

// ---------------------------------------------------------------------------
// roles / wagons
// ---------------------------------------------------------------------------

#[test]
fn roles_table() {
    caravan()
        .arg("roles")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fortune Teller"))
        .stdout(predicate::str::contains("13 roles"));
}

#[test]
fn roles_json() {
    caravan()
        .args(["roles", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"_id\": \"cook\""));
}

#[test]
fn wagons_table() {
    caravan()
        .arg("wagons")
        .assert()
        .success()
        .stdout(predicate::str::contains("Covered Wagon"))
        .stdout(predicate::str::contains("8 wagon types"));
}

#[test]
fn custom_role_file_extends_registry() {
    let (dir, _) = snapshot(CARAVAN);
    let roles = dir.path().join("roles.json");
    fs::write(
        &roles,
        r#"[{"_id": "smuggler", "name": "Smuggler", "monthlyWage": 25}]"#,
    )
    .unwrap();
    caravan()
        .arg("--role-file")
        .arg(&roles)
        .arg("roles")
        .assert()
        .success()
        .stdout(predicate::str::contains("Smuggler"))
        .stdout(predicate::str::contains("14 roles"));
}

#[test]
fn verbose_logs_loaded_role_file() {
    let (dir, _) = snapshot(CARAVAN);
    let roles = dir.path().join("roles.json");
    fs::write(&roles, r#"[{"_id": "smuggler", "name": "Smuggler"}]"#).unwrap();
    caravan()
        .env_remove("RUST_LOG")
        .arg("-v")
        .arg("--role-file")
        .arg(&roles)
        .arg("roles")
        .assert()
        .success()
        .stderr(predicate::str::contains("loaded role file"));
}

#[test]
fn quiet_by_default() {
    caravan()
        .env_remove("RUST_LOG")
        .arg("roles")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn invalid_role_file_fails() {
    let (dir, _) = snapshot(CARAVAN);
    let roles = dir.path().join("roles.json");
    fs::write(&roles, r#"[{"name": "Nameless"}]"#).unwrap();
    caravan()
        .arg("--role-file")
        .arg(&roles)
        .arg("roles")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid registry entry"));
}

// ---------------------------------------------------------------------------
// counts / notes
// ---------------------------------------------------------------------------

#[test]
fn counts_table() {
    let (_dir, path) = snapshot(CARAVAN);
    caravan()
        .arg("counts")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Travelers"))
        .stdout(predicate::str::contains("Travelers by Role"));
}

#[test]
fn counts_json() {
    let (_dir, path) = snapshot(CARAVAN);
    caravan()
        .args(["counts", "--json"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"discrepancy\""))
        .stdout(predicate::str::contains("\"coveredWagon\""));
}

#[test]
fn notes_for_security() {
    let (_dir, path) = snapshot(CARAVAN);
    caravan()
        .arg("notes")
        .arg(&path)
        .arg("caravan_security")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ysolde"))
        .stdout(predicate::str::contains("+1 to avoid being surprised"));
}

#[test]
fn notes_none() {
    let (_dir, path) = snapshot(CARAVAN);
    caravan()
        .arg("notes")
        .arg(&path)
        .arg("caravan_attack")
        .assert()
        .success()
        .stdout(predicate::str::contains("No notes"));
}

// ---------------------------------------------------------------------------
// rest / convert
// ---------------------------------------------------------------------------

#[test]
fn rest_consumes_provisions() {
    let (_dir, path) = snapshot(CARAVAN);
    caravan()
        .arg("rest")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dust Runners takes a full rest of 12 hours."))
        .stdout(predicate::str::contains("Provisions consumed: 4."));
}

#[test]
fn rest_write_saves_snapshot() {
    let (_dir, path) = snapshot(CARAVAN);
    caravan()
        .args(["rest", "--write", "--no-restore"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("takes a rest of 12 hours"))
        .stdout(predicate::str::contains("Saved to"));
    let saved = fs::read_to_string(&path).unwrap();
    assert!(saved.contains("\"provisions\": 16"));
}

#[test]
fn rest_without_provisions_takes_damage() {
    let (_dir, path) = snapshot(&CARAVAN.replace("\"provisions\": 20", "\"provisions\": 1"));
    caravan()
        .args(["rest", "--seed", "1"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Not enough provisions"))
        .stdout(predicate::str::contains("damage from hunger"))
        .stdout(predicate::str::contains("Condition: Fatigued."));
}

#[test]
fn rest_json_report() {
    let (_dir, path) = snapshot(CARAVAN);
    caravan()
        .args(["rest", "--json", "--hours", "8"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"hadProvisions\": true"))
        .stdout(predicate::str::contains("\"hours\": 8"));
}

#[test]
fn convert_sells_treasure() {
    let (_dir, path) = snapshot(CARAVAN);
    caravan()
        .args(["convert", "--write"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Sold Gold idol for 100 gp"))
        .stdout(predicate::str::contains("100gp"));
    let saved = fs::read_to_string(&path).unwrap();
    assert!(saved.contains("\"gp\": 100"));
    assert!(saved.contains("Gold idol"));
}

#[test]
fn convert_delete_removes_treasure() {
    let (_dir, path) = snapshot(CARAVAN);
    caravan()
        .args(["convert", "--write", "--delete"])
        .arg(&path)
        .assert()
        .success();
    let saved = fs::read_to_string(&path).unwrap();
    assert!(!saved.contains("Gold idol"));
}

#[test]
fn convert_nothing() {
    let (_dir, path) = snapshot(r#"{"name": "Poor"}"#);
    caravan()
        .arg("convert")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("No treasure to sell."));
}

// ---------------------------------------------------------------------------
// check / roll
// ---------------------------------------------------------------------------

#[test]
fn check_security() {
    let (_dir, path) = snapshot(CARAVAN);
    caravan()
        .args(["check", "--seed", "7"])
        .arg(&path)
        .arg("security")
        .assert()
        .success()
        .stdout(predicate::str::contains("Security test"))
        .stdout(predicate::str::contains("+1 to avoid being surprised"));
}

#[test]
fn check_attack() {
    let (_dir, path) = snapshot(CARAVAN);
    caravan()
        .args(["check", "--seed", "7"])
        .arg(&path)
        .arg("attack")
        .assert()
        .success()
        .stdout(predicate::str::contains("Attack"))
        .stdout(predicate::str::contains("Total damage"));
}

#[test]
fn check_invalid_attribute() {
    let (_dir, path) = snapshot(CARAVAN);
    caravan()
        .arg("check")
        .arg(&path)
        .arg("morale")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid attribute"));
}

#[test]
fn roll_is_deterministic_with_seed() {
    let first = caravan()
        .args(["roll", "2d6+1", "--seed", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2d6+1:"))
        .get_output()
        .stdout
        .clone();
    let second = caravan()
        .args(["roll", "2d6+1", "--seed", "3"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(first, second);
}

#[test]
fn roll_rejects_garbage() {
    caravan()
        .args(["roll", "banana"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("dice expression"));
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_clean_caravan() {
    let (_dir, path) = snapshot(CARAVAN);
    caravan()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed for 'Dust Runners'"));
}

#[test]
fn validate_reports_errors() {
    let (_dir, path) = snapshot(
        r#"{"name": "Lost", "items": [{"type": "wagon", "name": "Raft", "subType": "raft"}]}"#,
    );
    caravan()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown wagon type 'raft'"))
        .stderr(predicate::str::contains("1 error, 0 warnings"));
}
