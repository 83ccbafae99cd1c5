//! End-to-end tests for the insights CLI commands.
//!
//! These tests run the binary against small datasets written to a
//! temporary directory.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin for tests

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

/// A temporary directory holding one dataset file.
struct TestDataset {
    temp_dir: TempDir,
    dataset_path: PathBuf,
}

impl TestDataset {
    fn new(filename: &str, contents: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dataset_path = temp_dir.path().join(filename);
        fs::write(&dataset_path, contents).expect("Failed to write dataset");

        Self { temp_dir, dataset_path }
    }

    fn path(&self) -> &str {
        self.dataset_path.to_str().unwrap()
    }

    fn output(&self, filename: &str) -> PathBuf {
        self.temp_dir.path().join(filename)
    }
}

fn sales_csv() -> String {
    "\
Order Date,Region,State,City,Category,Sub-Category,Segment,Sales,Profit,Quantity
01/05/2023,South,Kentucky,Henderson,Furniture,Bookcases,Consumer,261.96,41.91,2
02/03/2023,West,California,Los Angeles,Office Supplies,Labels,Corporate,14.62,6.87,2
02/20/2023,West,California,San Diego,Technology,Phones,Consumer,120.00,-3.50,1
03/11/2023,West,Washington,Seattle,Technology,Phones,Home Office,907.15,90.72,6
04/02/2023,East,New York,New York City,Furniture,Chairs,Consumer,300.00,25.00,3
"
    .to_string()
}

fn insights() -> Command {
    let mut cmd = Command::cargo_bin("insights").expect("Failed to find insights binary");
    cmd.env_remove("INSIGHTS_DATASET");
    cmd
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("Failed to read output")
}

// =============================================================================
// insights check Tests
// =============================================================================

#[test]
fn test_check_csv() {
    let data = TestDataset::new("sales.csv", &sales_csv());

    insights()
        .args(["check", "--dataset", data.path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("sales.csv: 5 rows, 10 columns"))
        .stdout(predicate::str::contains("2023-01-05 to 2023-04-02"))
        .stdout(predicate::str::contains("Region: 3 distinct"));
}

#[test]
fn test_check_unsupported_format() {
    let data = TestDataset::new("notes.txt", "just some notes");

    insights()
        .args(["check", "--dataset", data.path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported file format"))
        .stderr(predicate::str::contains("hint: supported formats are .csv, .xlsx and .xls"));
}

#[test]
fn test_check_missing_columns() {
    let data = TestDataset::new("partial.csv", "Order Date,Region,Sales\n2023-01-05,West,10\n");

    insights()
        .args(["check", "--dataset", data.path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load dataset"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
fn test_no_dataset_configured() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("insights.toml");
    fs::write(&config, "max_table_rows = 50\n").unwrap();

    insights()
        .args(["--config", config.to_str().unwrap(), "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no fallback dataset configured"))
        .stderr(predicate::str::contains("INSIGHTS_DATASET"));
}

#[test]
fn test_dataset_from_config_file() {
    let data = TestDataset::new("sales.csv", &sales_csv());
    let config = data.output("insights.toml");
    fs::write(&config, format!("dataset = {:?}\n", data.path())).unwrap();

    insights()
        .args(["--config", config.to_str().unwrap(), "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 rows"));
}

#[test]
fn test_dataset_from_environment() {
    let data = TestDataset::new("sales.csv", &sales_csv());

    Command::cargo_bin("insights")
        .unwrap()
        .env("INSIGHTS_DATASET", data.path())
        .args(["check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 rows"));
}

// =============================================================================
// insights export Tests
// =============================================================================

#[test]
fn test_export_region_filter() {
    let data = TestDataset::new("sales.csv", &sales_csv());
    let output = data.output("Filtered_Data.csv");

    insights()
        .args(["export", "--dataset", data.path(), "--region", "West"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 of 5 rows"));

    let csv = read(&output);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Order Date,Region,State,City"));
    assert!(lines[1..].iter().all(|line| line.contains(",West,")));
}

#[test]
fn test_export_cascaded_and_dated() {
    let data = TestDataset::new("sales.csv", &sales_csv());
    let output = data.output("out.csv");

    insights()
        .args([
            "export",
            "--dataset",
            data.path(),
            "--region",
            "West",
            "--state",
            "California",
            "--end",
            "2023-02-10",
        ])
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let csv = read(&output);
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("Los Angeles"));
    assert!(!csv.contains("San Diego"));
}

#[test]
fn test_export_bad_date_argument() {
    let data = TestDataset::new("sales.csv", &sales_csv());

    insights()
        .args(["export", "--dataset", data.path(), "--start", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--start"));
}

// =============================================================================
// insights summary Tests
// =============================================================================

#[test]
fn test_summary_output() {
    let data = TestDataset::new("sales.csv", &sales_csv());

    insights()
        .args(["summary", "--dataset", data.path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rows:        5 of 5"))
        .stdout(predicate::str::contains("Total sales: 1603.73"))
        .stdout(predicate::str::contains("Furniture"))
        .stdout(predicate::str::contains("561.96"))
        .stdout(predicate::str::contains("2023-02"));
}

#[test]
fn test_summary_no_matches() {
    let data = TestDataset::new("sales.csv", &sales_csv());

    insights()
        .args(["summary", "--dataset", data.path(), "--region", "Central"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No rows match"));
}

// =============================================================================
// insights report Tests
// =============================================================================

#[test]
fn test_report_writes_html() {
    let data = TestDataset::new("sales.csv", &sales_csv());
    let output = data.output("dashboard.html");

    insights()
        .args(["report", "--dataset", data.path(), "--city", "Seattle"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 5 rows"));

    let html = read(&output);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Market Insights Dashboard"));
    assert!(html.contains("Relationship between Sales and Profit"));
    assert!(html.contains("Seattle"));
    assert!(!html.contains("Henderson"));
}

// =============================================================================
// CLI surface
// =============================================================================

#[test]
fn test_help_lists_commands() {
    insights()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("report"));
}
