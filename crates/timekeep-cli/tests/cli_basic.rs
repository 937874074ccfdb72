//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against an isolated data directory and
//! verify its JSON output.

use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::TempDir;

/// Run a CLI command against `data_dir` and return (stdout, stderr, code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_timekeep"))
        .args(args)
        .env("TIMEKEEP_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "command {args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

fn add_timer(data_dir: &Path, args: &[&str]) -> String {
    let mut full = vec!["timer", "add"];
    full.extend_from_slice(args);
    let event = run_json(data_dir, &full);
    assert_eq!(event["type"], "TimerCreated");
    event["id"].as_str().unwrap().to_string()
}

#[test]
fn test_timer_add_and_show() {
    let dir = TempDir::new().unwrap();
    let id = add_timer(
        dir.path(),
        &[
            "Dentist",
            "--date",
            "2099-03-01T09:00:00Z",
            "--person",
            "Sam",
            "--priority",
            "high",
        ],
    );

    let shown = run_json(dir.path(), &["timer", "show", &id]);
    assert_eq!(shown["title"], "Dentist");
    assert_eq!(shown["personName"], "Sam");
    assert_eq!(shown["priority"], "high");
    assert_eq!(shown["isCountdown"], true);
    assert_eq!(shown["status"]["isDue"], false);
    assert_eq!(shown["status"]["progressPct"], 0.0);
}

#[test]
fn test_timer_list_orders_and_favourites() {
    let dir = TempDir::new().unwrap();
    let later = add_timer(dir.path(), &["Later", "--date", "2099-06-01T00:00:00Z"]);
    add_timer(dir.path(), &["Sooner", "--date", "2099-01-01T00:00:00Z"]);

    let by_date = run_json(dir.path(), &["timer", "list", "--order", "date"]);
    let titles: Vec<_> = by_date
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["Sooner", "Later"]);

    run_json(dir.path(), &["timer", "favourite", &later]);
    let favs = run_json(dir.path(), &["timer", "list", "--favourites"]);
    assert_eq!(favs.as_array().unwrap().len(), 1);
    assert_eq!(favs[0]["id"], later.as_str());
}

#[test]
fn test_timer_edit_and_delete() {
    let dir = TempDir::new().unwrap();
    let id = add_timer(
        dir.path(),
        &["Standup", "--date", "2020-01-01T09:00:00Z", "--every", "1 Days"],
    );

    let shown = run_json(dir.path(), &["timer", "show", &id]);
    assert_eq!(shown["recurrenceInterval"], "1 day");
    assert!(shown["nextDate"].is_string());

    run_json(dir.path(), &["timer", "edit", &id, "--once"]);
    let shown = run_json(dir.path(), &["timer", "show", &id]);
    assert_eq!(shown["isRecurring"], false);
    assert!(shown["recurrenceInterval"].is_null());

    let deleted = run_json(dir.path(), &["timer", "delete", &id]);
    assert_eq!(deleted["type"], "TimerDeleted");
    let (_, stderr, code) = run_cli(dir.path(), &["timer", "show", &id]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_timer_add_rejects_bad_interval() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["timer", "add", "x", "--date", "2024-01-01T00:00:00Z", "--every", "fortnightly"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("fortnightly"), "stderr: {stderr}");

    let list = run_json(dir.path(), &["timer", "list"]);
    assert!(list.as_array().unwrap().is_empty());
}

#[test]
fn test_export_import_between_data_dirs() {
    let source = TempDir::new().unwrap();
    add_timer(source.path(), &["One", "--date", "2099-01-01T00:00:00Z"]);
    add_timer(
        source.path(),
        &["Two", "--date", "2020-01-01T00:00:00Z", "--every", "2 weeks", "--count-up"],
    );

    let (exported, _, code) = run_cli(source.path(), &["timer", "export"]);
    assert_eq!(code, 0);
    let file = source.path().join("export.json");
    std::fs::write(&file, exported).unwrap();

    let target = TempDir::new().unwrap();
    let file_arg = file.to_str().unwrap();
    let event = run_json(target.path(), &["timer", "import", file_arg]);
    assert_eq!(event["type"], "TimersImported");
    assert_eq!(event["imported"], 2);

    let again = run_json(target.path(), &["timer", "import", file_arg]);
    assert_eq!(again["skipped"], 2);

    let replaced = run_json(target.path(), &["timer", "import", file_arg, "--overwrite"]);
    assert_eq!(replaced["imported"], 2);
}

#[test]
fn test_import_missing_file_reports_io_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.json");
    let (_, stderr, code) = run_cli(dir.path(), &["timer", "import", missing.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stderr.contains("IO error"), "stderr: {stderr}");
}

#[test]
fn test_privacy_mode_masks_titles() {
    let dir = TempDir::new().unwrap();
    add_timer(
        dir.path(),
        &["Secret", "--date", "2099-01-01T00:00:00Z", "--person", "Alex"],
    );

    let (stdout, _, code) = run_cli(dir.path(), &["config", "set", "display.privacy_mode", "true"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let list = run_json(dir.path(), &["timer", "list"]);
    assert_eq!(list[0]["title"], "••••");
    assert_eq!(list[0]["personName"], "••••");
}

#[test]
fn test_config_get_set_reset() {
    let dir = TempDir::new().unwrap();
    let lead = "notifications.reminder_lead_minutes";
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", lead]);
    assert_eq!(stdout.trim(), "15");

    run_cli(dir.path(), &["config", "set", lead, "30"]);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", lead]);
    assert_eq!(stdout.trim(), "30");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "notifications.enabled", "maybe"]);
    assert_eq!(code, 1);

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);

    run_cli(dir.path(), &["config", "reset"]);
    let config = run_json(dir.path(), &["config", "list"]);
    assert_eq!(config["notifications"]["reminder_lead_minutes"], 15);
}

#[test]
fn test_interval_parse_and_next() {
    let dir = TempDir::new().unwrap();
    let parsed = run_json(dir.path(), &["interval", "parse", "2 Weeks"]);
    assert_eq!(parsed["count"], 2);
    assert_eq!(parsed["unit"], "week");
    assert_eq!(parsed["canonical"], "2 weeks");

    let next = run_json(
        dir.path(),
        &[
            "interval",
            "next",
            "2024-01-01T00:00:00Z",
            "1 day",
            "--now",
            "2024-01-05T12:00:00Z",
        ],
    );
    assert_eq!(next["nextDate"], "2024-01-06T00:00:00Z");
    assert_eq!(next["cyclesElapsed"], 4);
    assert_eq!(next["capped"], false);

    let (_, _, code) = run_cli(dir.path(), &["interval", "parse", "abc"]);
    assert_eq!(code, 1);
}

#[test]
fn test_notify_plan_and_sync() {
    let dir = TempDir::new().unwrap();
    let id = add_timer(dir.path(), &["Launch", "--date", "2099-01-01T00:00:00Z"]);
    add_timer(dir.path(), &["Since", "--date", "2020-01-01T00:00:00Z", "--count-up"]);

    let plan = run_json(dir.path(), &["notify", "plan", &id]);
    assert_eq!(plan["due"]["fireAt"], "2099-01-01T00:00:00Z");
    assert_eq!(plan["reminder"]["fireAt"], "2098-12-31T23:45:00Z");

    let (stdout, _, code) = run_cli(dir.path(), &["notify", "sync"]);
    assert_eq!(code, 0);
    let lines: Vec<Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l["action"] == "schedule"));

    // Already in sync.
    let (stdout, _, _) = run_cli(dir.path(), &["notify", "sync"]);
    assert!(stdout.trim().is_empty());

    let shown = run_json(dir.path(), &["timer", "show", &id]);
    assert_eq!(shown["notificationScheduledFor"], "2099-01-01T00:00:00Z");
}
