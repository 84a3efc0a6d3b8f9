use assert_cmd::Command;
use chrono::{Duration, NaiveDateTime};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const FILES: [&str; 3] = [
    "forecast_baseline.csv",
    "forecast_scenario_shock.csv",
    "forecast_scenario_delta.csv",
];

fn enops(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("enops").unwrap();
    cmd.current_dir(cwd).env_remove("RUST_LOG");
    cmd
}

fn write_history(path: &Path) {
    let end = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    let mut csv = String::from("datetime,region,forecast_price,forecast_demand\n");
    for region in ["NSW1", "VIC1"] {
        for i in (0..6).rev() {
            let at = end - Duration::minutes(30 * i);
            csv.push_str(&format!(
                "{},{},55.0,6800.0\n",
                at.format("%Y-%m-%d %H:%M:%S"),
                region
            ));
        }
    }
    fs::write(path, csv).unwrap();
}

/// Run a seeded forecast into `<tmp>/data` and return that directory.
fn forecast_into(tmp: &Path) -> std::path::PathBuf {
    let input = tmp.join("history.csv");
    write_history(&input);
    let data = tmp.join("data");
    enops(tmp)
        .args([
            "forecast",
            "run",
            "-i",
            input.to_str().unwrap(),
            "-o",
            data.to_str().unwrap(),
            "--seed",
            "11",
        ])
        .assert()
        .success();
    data
}

#[test]
fn forecast_run_writes_three_tables() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("history.csv");
    write_history(&input);
    let data = tmp.path().join("data");

    enops(tmp.path())
        .args([
            "forecast",
            "run",
            "--input",
            input.to_str().unwrap(),
            "--output-dir",
            data.to_str().unwrap(),
            "--seed",
            "3",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Forecast generation completed successfully",
        ))
        .stdout(predicate::str::contains("672 rows per table"));

    for name in FILES {
        assert!(data.join(name).is_file(), "{name} missing");
    }
    let mut written: Vec<String> = fs::read_dir(&data)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    let mut expected = FILES.map(String::from).to_vec();
    expected.sort();
    assert_eq!(written, expected);
}

#[test]
fn forecast_run_missing_input_fails_without_outputs() {
    let tmp = tempdir().unwrap();
    let data = tmp.path().join("data");

    enops(tmp.path())
        .args([
            "forecast",
            "run",
            "-i",
            "absent.parquet",
            "-o",
            data.to_str().unwrap(),
        ])
        .assert()
        .failure();
    assert!(!data.exists());
}

#[test]
fn forecast_run_corrupt_input_fails_without_outputs() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("history.parquet");
    fs::write(&input, b"not a parquet file at all").unwrap();
    let data = tmp.path().join("data");

    enops(tmp.path())
        .args([
            "forecast",
            "run",
            "-i",
            input.to_str().unwrap(),
            "-o",
            data.to_str().unwrap(),
        ])
        .assert()
        .failure();
    assert!(!data.exists());
}

#[test]
fn forecast_dry_run_only_checks_input() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("history.csv");
    write_history(&input);
    let data = tmp.path().join("data");

    enops(tmp.path())
        .args([
            "forecast",
            "run",
            "--dry-run",
            "-i",
            input.to_str().unwrap(),
            "-o",
            data.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));
    assert!(!data.exists());

    enops(tmp.path())
        .args(["forecast", "run", "--dry-run", "-i", "absent.csv"])
        .assert()
        .failure();
}

#[test]
fn forecast_checks_report_on_inputs_and_outputs() {
    let tmp = tempdir().unwrap();
    let data = tmp.path().join("data");

    enops(tmp.path())
        .args(["forecast", "check-outputs", "-o", data.to_str().unwrap()])
        .assert()
        .failure();

    let data = forecast_into(tmp.path());
    enops(tmp.path())
        .args(["forecast", "check-outputs", "-o", data.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("forecast_scenario_delta.csv"));

    let input = tmp.path().join("history.csv");
    enops(tmp.path())
        .args([
            "forecast",
            "check-input",
            "-i",
            input.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("12 rows"));
}

#[test]
fn config_file_supplies_defaults() {
    let tmp = tempdir().unwrap();
    let input = tmp.path().join("history.csv");
    write_history(&input);
    fs::write(
        tmp.path().join("enops.toml"),
        "[forecast]\ninput = \"history.csv\"\noutput_dir = \"reports\"\nseed = 1\n",
    )
    .unwrap();

    enops(tmp.path())
        .args(["forecast", "run"])
        .assert()
        .success();
    assert!(tmp.path().join("reports").join(FILES[0]).is_file());
}

#[test]
fn scenarios_risk_and_metrics_as_json() {
    let tmp = tempdir().unwrap();
    let data = forecast_into(tmp.path());

    let output = enops(tmp.path())
        .args([
            "scenarios",
            "risk",
            "-d",
            data.to_str().unwrap(),
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let risk: Value = serde_json::from_slice(&output.stdout).unwrap();
    let regions: Vec<&str> = risk
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["region"].as_str().unwrap())
        .collect();
    assert_eq!(regions, vec!["NSW1", "VIC1"]);

    let output = enops(tmp.path())
        .args([
            "scenarios",
            "metrics",
            "-d",
            data.to_str().unwrap(),
            "--region",
            "VIC1",
            "--portfolio-mw",
            "50",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let metrics: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(metrics.as_array().unwrap().len(), 1);
    assert_eq!(metrics[0]["region"], "VIC1");
    assert_eq!(metrics[0]["portfolio_mw"], 50.0);

    enops(tmp.path())
        .args([
            "scenarios",
            "metrics",
            "-d",
            data.to_str().unwrap(),
            "--region",
            "QLD1",
        ])
        .assert()
        .failure();
}

#[test]
fn scenarios_what_if_writes_per_scenario_csv() {
    let tmp = tempdir().unwrap();
    let data = forecast_into(tmp.path());
    let spec = tmp.path().join("what_if.yaml");
    fs::write(
        &spec,
        "defaults:\n  region: NSW1\nscenarios:\n  - scenario_id: heatwave\n    price_multiplier: 1.5\n    demand_multiplier: 1.2\n",
    )
    .unwrap();
    let out = tmp.path().join("what_if");

    enops(tmp.path())
        .args([
            "scenarios",
            "what-if",
            "--spec",
            spec.to_str().unwrap(),
            "-d",
            data.to_str().unwrap(),
            "--out-dir",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("heatwave"));

    let written = fs::read_to_string(out.join("what_if_heatwave.csv")).unwrap();
    // Header plus one row per baseline NSW1 interval.
    assert_eq!(written.lines().count(), 337);
    assert!(written.starts_with("datetime,region,"));
}

#[test]
fn auth_status_demo_and_unconfigured_oauth() {
    let tmp = tempdir().unwrap();

    enops(tmp.path())
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Signed in as demo@energy-ops.com (demo mode)",
        ));

    enops(tmp.path())
        .env_remove("GOOGLE_CLIENT_ID")
        .env_remove("GOOGLE_CLIENT_SECRET")
        .env_remove("OAUTH_REDIRECT_URI")
        .args(["auth", "status", "--mode", "oauth"])
        .assert()
        .failure();
}

#[test]
fn auth_status_oauth_prints_login_url() {
    let tmp = tempdir().unwrap();

    enops(tmp.path())
        .env("GOOGLE_CLIENT_ID", "client-123")
        .env("GOOGLE_CLIENT_SECRET", "secret")
        .env("OAUTH_REDIRECT_URI", "http://localhost:8501/")
        .args(["auth", "status", "--mode", "oauth"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Login required: https://accounts.google.com/"))
        .stdout(predicate::str::contains("client_id=client-123"));
}

#[test]
fn completions_for_bash() {
    let tmp = tempdir().unwrap();
    enops(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("enops"));
}
