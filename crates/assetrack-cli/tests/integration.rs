//! Integration tests for CLI commands.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn create_test_store() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("test.atj");
    (temp_dir, store_path)
}

fn assetrack(store: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_assetrack"))
        .arg("--store")
        .arg(store)
        .args(args)
        .env_remove("ASSETRACK_STORE")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run assetrack")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command failed: {}",
        stderr(output)
    );
}

fn json_lines(output: &Output) -> Vec<Value> {
    stdout(output)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_item_lifecycle() {
    let (_dir, store) = create_test_store();

    assert_success(&assetrack(&store, &["init"]));
    let created = assetrack(
        &store,
        &["create", "item", r#"{"name": "Box", "item_id": "I1", "tags": ["t1"]}"#],
    );
    assert_success(&created);
    let record: Value = serde_json::from_str(&stdout(&created)).unwrap();
    assert_eq!(record["_id"].as_str().unwrap().len(), 24);

    let fetched = assetrack(&store, &["get", "item", "I1"]);
    assert_success(&fetched);
    let fetched: Value = serde_json::from_str(&stdout(&fetched)).unwrap();
    assert_eq!(fetched, record);

    let listed = assetrack(&store, &["list", "item", "--json"]);
    assert_success(&listed);
    assert_eq!(json_lines(&listed).len(), 1);

    let found = assetrack(&store, &["search", "item", "Bo", "--json"]);
    assert_eq!(json_lines(&found).len(), 1);

    assert_success(&assetrack(&store, &["delete", "item", "I1"]));
    assert_success(&assetrack(&store, &["delete", "item", "I1"]));

    let listed = assetrack(&store, &["list", "item", "--json"]);
    assert!(json_lines(&listed).is_empty());
    let found = assetrack(&store, &["search", "item", "Box", "--json"]);
    assert!(json_lines(&found).is_empty());
    assert_eq!(stdout(&assetrack(&store, &["count", "item"])).trim(), "0");
}

#[test]
fn test_duplicate_and_missing_fields_exit_with_error() {
    let (_dir, store) = create_test_store();
    let body = r#"{"name": "Box", "item_id": "I1", "tags": ["t1"]}"#;
    assert_success(&assetrack(&store, &["create", "item", body]));

    let dup = assetrack(
        &store,
        &["create", "item", r#"{"name": "Bin", "item_id": "I2", "tags": ["t1"]}"#],
    );
    assert_eq!(dup.status.code(), Some(1));
    assert!(stderr(&dup).contains("Error: item with the same tags is already in the database"));

    let missing = assetrack(&store, &["create", "sensor", r#"{"name": "Gate"}"#]);
    assert_eq!(missing.status.code(), Some(1));
    assert!(stderr(&missing).contains("attribute sensor_id is required"));

    let not_found = assetrack(&store, &["get", "sensor", "s1"]);
    assert_eq!(not_found.status.code(), Some(1));
    assert!(stderr(&not_found).contains("not found"));
}

#[test]
fn test_update_ignores_undeclared_fields() {
    let (_dir, store) = create_test_store();
    assert_success(&assetrack(
        &store,
        &["create", "sensor", r#"{"name": "Gate", "sensor_id": "s1"}"#],
    ));

    let updated = assetrack(
        &store,
        &["update", "sensor", "s1", r#"{"description": "north", "root": true}"#],
    );
    assert_success(&updated);

    let fetched: Value =
        serde_json::from_str(&stdout(&assetrack(&store, &["get", "sensor", "s1"]))).unwrap();
    assert_eq!(fetched["description"], "north");
    assert!(fetched.get("root").is_none());
}

#[test]
fn test_numeric_looking_text_ids_are_addressable() {
    let (_dir, store) = create_test_store();
    assert_success(&assetrack(
        &store,
        &["create", "sensor", r#"{"name": "Gate", "sensor_id": "42"}"#],
    ));

    let fetched = assetrack(&store, &["get", "sensor", "42"]);
    assert_success(&fetched);
    let fetched: Value = serde_json::from_str(&stdout(&fetched)).unwrap();
    assert_eq!(fetched["sensor_id"], "42");

    assert_success(&assetrack(
        &store,
        &["update", "sensor", "42", r#"{"description": "dock"}"#],
    ));
    let deleted = assetrack(&store, &["delete", "sensor", "42"]);
    assert_success(&deleted);
    assert_eq!(stdout(&deleted).trim(), "Deleted sensor 42");
    assert_eq!(stdout(&assetrack(&store, &["count", "sensor"])).trim(), "0");

    // Event identifiers are timestamps and keep their numeric type.
    assert_success(&assetrack(
        &store,
        &["ingest", "--sensor", "42", "--tag", "t1", "--timestamp", "7"],
    ));
    let event: Value =
        serde_json::from_str(&stdout(&assetrack(&store, &["get", "event", "7"]))).unwrap();
    assert_eq!(event["event_timestamp"], 7);
}

#[test]
fn test_payload_from_file() {
    let (dir, store) = create_test_store();
    let payload_path = dir.path().join("sensor.json");
    std::fs::write(&payload_path, r#"{"name": "Gate", "sensor_id": "s1"}"#).unwrap();

    let arg = format!("@{}", payload_path.display());
    assert_success(&assetrack(&store, &["create", "sensor", &arg]));
    assert_eq!(stdout(&assetrack(&store, &["count", "sensor"])).trim(), "1");
}

#[test]
fn test_ingest_and_filter_events() {
    let (_dir, store) = create_test_store();
    assert_success(&assetrack(
        &store,
        &["create", "item", r#"{"name": "Box", "item_id": "I1", "tags": ["t1"]}"#],
    ));

    for (sensor, tag, ts) in [("s1", "t1", "100"), ("s2", "t1", "150"), ("s3", "t9", "200")] {
        assert_success(&assetrack(
            &store,
            &["ingest", "--sensor", sensor, "--tag", tag, "--timestamp", ts],
        ));
    }

    let dup = assetrack(
        &store,
        &["ingest", "--sensor", "s1", "--tag", "t1", "--timestamp", "100"],
    );
    assert_eq!(dup.status.code(), Some(1));
    assert!(stderr(&dup).contains("event_timestamp 100"));

    let by_sensor = assetrack(
        &store,
        &["events", "--sensor", "s1", "--sensor", "s3", "--json"],
    );
    assert_success(&by_sensor);
    let timestamps: Vec<_> = json_lines(&by_sensor)
        .iter()
        .map(|e| e["event_timestamp"].as_i64().unwrap())
        .collect();
    assert_eq!(timestamps, vec![100, 200]);

    let by_item = assetrack(
        &store,
        &["events", "--item", "I1", "--start", "120", "--end", "150", "--json"],
    );
    let events = json_lines(&by_item);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["sensor_id"], "s2");

    assert_eq!(stdout(&assetrack(&store, &["count", "event"])).trim(), "3");
}

#[test]
fn test_store_persists_across_invocations_in_table_output() {
    let (_dir, store) = create_test_store();
    assert_success(&assetrack(
        &store,
        &["create", "sensor", r#"{"name": "Gate", "sensor_id": "s1"}"#],
    ));

    let listed = assetrack(&store, &["list", "sensor"]);
    assert_success(&listed);
    let text = stdout(&listed);
    assert!(text.starts_with("ID"));
    assert!(text.contains("SENSOR_ID"));
    assert!(text.lines().nth(2).unwrap().contains(" s1 "));
}

#[test]
fn test_invalid_uniqueness_is_rejected() {
    let (_dir, store) = create_test_store();
    let output = assetrack(&store, &["--uniqueness", "sometimes", "count", "item"]);
    assert!(!output.status.success());
}
