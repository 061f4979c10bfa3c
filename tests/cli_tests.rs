use assert_cmd::{cargo, prelude::*};
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn costbook(temp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("costbook"));
    cmd.arg("--no-color")
        .arg("--db")
        .arg(temp.path().join("test.db"));
    cmd
}

#[test]
fn help_lists_subcommands() {
    let mut cmd = Command::new(cargo::cargo_bin!("costbook"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("profile"))
        .stdout(predicate::str::contains("line"))
        .stdout(predicate::str::contains("totals"));
}

#[test]
fn profile_list_empty_db() {
    let temp = TempDir::new().unwrap();
    costbook(&temp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Database initialized"));

    costbook(&temp)
        .args(["profile", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No profiles found"))
        .stdout(predicate::str::contains("\u{001b}[").not());
}

#[test]
fn create_add_show_flow() {
    let temp = TempDir::new().unwrap();

    costbook(&temp)
        .args([
            "profile", "create", "--name", "Broker A", "--asset", "ACME", "--currency", "EUR",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created profile 1"));

    costbook(&temp)
        .args([
            "line", "add", "1", "--date", "2025-01-01", "--type", "buy", "--quantity", "1",
            "--amount", "100",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added line 1"));

    costbook(&temp)
        .args([
            "line", "add", "1", "--date", "2025-02-01", "--type", "buy", "--quantity", "1",
            "--amount", "200",
        ])
        .assert()
        .success();

    costbook(&temp)
        .args([
            "line", "add", "1", "--date", "2025-03-01", "--type", "sell", "--quantity", "1",
            "--amount", "180",
        ])
        .assert()
        .success();

    // Weighted average: avg 150, sell realizes 30
    costbook(&temp)
        .args(["profile", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("150.00"))
        .stdout(predicate::str::contains("30.00"));
}

#[test]
fn oversell_fails_and_preserves_profile() {
    let temp = TempDir::new().unwrap();

    costbook(&temp)
        .args([
            "profile", "create", "--name", "B", "--asset", "X", "--currency", "USD",
        ])
        .assert()
        .success();

    costbook(&temp)
        .args([
            "line", "add", "1", "--date", "2025-01-01", "--type", "buy", "--quantity", "2",
            "--amount", "200",
        ])
        .assert()
        .success();

    costbook(&temp)
        .args([
            "line", "add", "1", "--date", "2025-01-02", "--type", "sell", "--quantity", "5",
            "--amount", "700",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("selling 5 units but only 2 held"));

    // The rejected line was never persisted
    costbook(&temp)
        .args(["profile", "show", "1", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": 1"))
        .stdout(predicate::str::contains("Sell").not());
}

#[test]
fn method_switch_recomputes_lines() {
    let temp = TempDir::new().unwrap();

    costbook(&temp)
        .args([
            "profile", "create", "--name", "C", "--asset", "Y", "--currency", "EUR",
        ])
        .assert()
        .success();

    for args in [
        ["2025-01-01", "buy", "1", "100"],
        ["2025-02-01", "buy", "1", "200"],
        ["2025-03-01", "sell", "1", "180"],
    ] {
        costbook(&temp)
            .args([
                "line", "add", "1", "--date", args[0], "--type", args[1], "--quantity", args[2],
                "--amount", args[3],
            ])
            .assert()
            .success();
    }

    costbook(&temp)
        .args(["profile", "set-method", "1", "fifo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FIFO"));

    // FIFO: oldest lot (100) consumed, realized gain 80, remaining avg 200
    costbook(&temp)
        .args(["profile", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("80.00"))
        .stdout(predicate::str::contains("200.00"));
}

#[test]
fn totals_reports_monthly_and_yearly() {
    let temp = TempDir::new().unwrap();

    costbook(&temp)
        .args([
            "profile", "create", "--name", "D", "--asset", "Z", "--currency", "EUR",
        ])
        .assert()
        .success();

    for args in [
        ["2025-01-10", "buy", "2", "300"],
        ["2025-02-20", "sell", "1", "170"],
    ] {
        costbook(&temp)
            .args([
                "line", "add", "1", "--date", args[0], "--type", args[1], "--quantity", args[2],
                "--amount", args[3],
            ])
            .assert()
            .success();
    }

    costbook(&temp)
        .args(["totals"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-01"))
        .stdout(predicate::str::contains("2025-02"))
        .stdout(predicate::str::contains("300.00"))
        // realized result: 170 - 150 = 20
        .stdout(predicate::str::contains("20.00"));
}

#[test]
fn missing_profile_is_reported() {
    let temp = TempDir::new().unwrap();
    costbook(&temp)
        .args(["profile", "show", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("profile 9 not found"));
}
