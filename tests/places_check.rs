//! End-to-end runs of the `places-check` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const DATASET: &str = r#"{
    "places": [
        {"name": "Tasca do Ze", "position": {"lat": 40.6, "lng": -8.6},
         "categories": ["food"], "district": "A", "certified": true},
        {"name": "Loja Nova", "position": {"lat": 41.5, "lng": -8.4},
         "categories": ["shop"], "district": "B", "certified": false}
    ],
    "categories": [
        {"id": "food", "name": {"pt": "Comida", "en": "Food"}},
        {"id": "shop", "name": {"pt": "Loja"}}
    ],
    "districts": [{"id": "A", "name": "Aveiro"}, {"id": "B", "name": "Braga"}]
}"#;

fn run(dataset: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_places-check"))
        .arg(dataset)
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_lists_all_places_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = dir.path().join("data.json");
    fs::write(&dataset, DATASET).unwrap();

    let output = run(&dataset, &[]);
    assert!(output.status.success());
    let text = stdout(&output);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Loja Nova"));
    assert!(lines[1].starts_with("* Tasca do Ze"));
}

#[test]
fn test_district_and_certified_flags() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = dir.path().join("data.json");
    fs::write(&dataset, DATASET).unwrap();

    let output = run(&dataset, &["--district", "A", "--lang", "en"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "* Tasca do Ze | Aveiro | Food\n");

    let output = run(&dataset, &["--district", "B", "--certified"]);
    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_state_file_restores_selection() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = dir.path().join("data.json");
    let state = dir.path().join("filters.json");
    fs::write(&dataset, DATASET).unwrap();
    let state_arg = state.to_str().unwrap();

    let first = run(&dataset, &["--state", state_arg, "--category", "shop"]);
    assert!(first.status.success());
    let stored = fs::read_to_string(&state).unwrap();
    assert!(stored.contains("filters.category"));

    let second = run(&dataset, &["--state", state_arg, "--json"]);
    assert!(second.status.success());
    let places: serde_json::Value = serde_json::from_slice(&second.stdout).unwrap();
    let names: Vec<&str> = places
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Loja Nova"]);

    let cleared = run(&dataset, &["--state", state_arg, "--clear"]);
    assert_eq!(stdout(&cleared).lines().count(), 2);
}

#[test]
fn test_invalid_reference_fails() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = dir.path().join("data.json");
    fs::write(
        &dataset,
        r#"{"places": [{"name": "X", "position": {"lat": 0, "lng": 0}, "district": "Q"}]}"#,
    )
    .unwrap();

    let output = run(&dataset, &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown district 'Q'"));
}

#[test]
fn test_unknown_filter_value_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let dataset = dir.path().join("data.json");
    fs::write(&dataset, DATASET).unwrap();

    let output = run(&dataset, &["--category", "bar"]);
    assert_eq!(output.status.code(), Some(2));
}
