//! Integration tests for the `pt` command-line interface.

#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const WORLD: &str = r#"{
  "version": 1,
  "entities": [
    {"id": "area:1", "properties": {"name": "Hall", "exits": ["exit:3"], "items": ["item:4", "item:5"]}},
    {"id": "area:2", "properties": {"name": "Yard", "exits": ["exit:6"]}},
    {"id": "exit:3", "properties": {"name": "door", "destinationArea": "area:2", "oppositeExit": "exit:6"}},
    {"id": "item:4", "properties": {"name": "knife", "weight": 1}},
    {"id": "item:5", "properties": {"name": "lamp"}},
    {"id": "exit:6", "properties": {"name": "door", "destinationArea": "area:1", "oppositeExit": "exit:3"}}
  ]
}
"#;

/// Create a temp directory holding a small two-room world.
fn test_world() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("world.json");
    fs::write(&file, WORLD).unwrap();
    (dir, file)
}

fn pt() -> Command {
    Command::cargo_bin("pt").unwrap()
}

fn path(file: &Path) -> &str {
    file.to_str().unwrap()
}

// ---------------------------------------------------------------------------
// set
// ---------------------------------------------------------------------------

#[test]
fn set_reports_and_saves() {
    let (_dir, file) = test_world();
    pt().args(["set", path(&file), "knife", "plural", "knives"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Property plural modified.").and(predicate::str::contains(
                "New forms: one knife, two knives, a knife.",
            )),
        );

    let saved = fs::read_to_string(&file).unwrap();
    assert!(saved.contains("\"plural\": \"knives\""));
}

#[test]
fn set_quiet_forms() {
    let (_dir, file) = test_world();
    pt().args(["set", path(&file), "--quiet-forms", "knife", "name", "dagger"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New forms").not());
}

#[test]
fn set_ambiguous_selector_fails_and_leaves_file() {
    let (_dir, file) = test_world();
    pt().args(["set", path(&file), "door", "hidden", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Object is not unique."));

    assert_eq!(fs::read_to_string(&file).unwrap(), WORLD);
}

#[test]
fn set_unknown_selector() {
    let (_dir, file) = test_world();
    pt().args(["set", path(&file), "troll", "hp", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Object not found."));
}

#[test]
fn set_position_picks_among_matches() {
    let (_dir, file) = test_world();
    pt().args(["set", path(&file), "door", "#2", "hidden", "true"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Property hidden modified."));

    let saved = fs::read_to_string(&file).unwrap();
    assert_eq!(saved.matches("\"hidden\": true").count(), 1);
}

#[test]
fn set_within_an_area() {
    let (_dir, file) = test_world();
    pt().args(["set", path(&file), "--area", "area:1", "door", "hidden", "true"])
        .assert()
        .success();
}

#[test]
fn set_dry_run_leaves_file() {
    let (_dir, file) = test_world();
    pt().args(["set", path(&file), "--dry-run", "knife", "weight", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert_eq!(fs::read_to_string(&file).unwrap(), WORLD);
}

#[test]
fn set_integers_strict_and_lenient() {
    let (_dir, file) = test_world();
    pt().args(["set", path(&file), "knife", "weight", "heavy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read \"heavy\" as integer"));

    pt().args(["set", path(&file), "--lenient-integers", "knife", "weight", "heavy"])
        .assert()
        .success();
    let saved = fs::read_to_string(&file).unwrap();
    assert!(saved.contains("\"weight\": 0"));
}

#[test]
fn set_reference_to_missing_object_fails() {
    let (_dir, file) = test_world();
    pt().args([
        "set",
        path(&file),
        "--area",
        "area:1",
        "door",
        "destination-area",
        "area:99",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Reference not found: area:99"));
}

#[test]
fn set_unsupported_property() {
    let (_dir, file) = test_world();
    pt().args(["set", path(&file), "knife", "aliases", "blade"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Setting property aliases is not supported.",
        ));
}

#[test]
fn set_unset_property_is_told_apart() {
    let (_dir, file) = test_world();
    pt().args(["set", path(&file), "knife", "colour", "red"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("Property colour is not set.")
                .and(predicate::str::contains("not supported").not()),
        );

    assert_eq!(fs::read_to_string(&file).unwrap(), WORLD);
}

#[test]
fn set_missing_file() {
    pt().args(["set", "/nonexistent/world.json", "knife", "weight", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

#[test]
fn show_lists_properties() {
    let (_dir, file) = test_world();
    pt().args(["show", path(&file), "knife"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("item:4")
                .and(predicate::str::contains("weight"))
                .and(predicate::str::contains("flags ItemFlags"))
                .and(predicate::str::contains("one knife, two knifes, a knife")),
        );
}

// ---------------------------------------------------------------------------
// export
// ---------------------------------------------------------------------------

#[test]
fn export_text() {
    let (_dir, file) = test_world();
    pt().args(["export", path(&file)])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[item:4] knife")
                .and(predicate::str::contains("indefinite-article: a"))
                .and(predicate::str::contains("exits: exit:3")),
        );
}

#[test]
fn export_wire_to_file() {
    let (dir, file) = test_world();
    let out = dir.path().join("out.json");
    pt().args(["export", path(&file), "-f", "wire", "-o", path(&out)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported to"));

    let exported = fs::read_to_string(&out).unwrap();
    assert!(exported.contains("\"version\": 1"));
    assert!(exported.contains("\"oppositeExit\": \"exit:6\""));
}

#[test]
fn export_unknown_format() {
    let (_dir, file) = test_world();
    pt().args(["export", path(&file), "-f", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported format"));
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_passes_linked_world() {
    let (_dir, file) = test_world();
    pt().args(["check", path(&file)])
        .assert()
        .success()
        .stdout(predicate::str::contains("All references resolve."));
}

#[test]
fn check_reports_dangling_references() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("world.json");
    fs::write(
        &file,
        r#"{"version": 1, "entities": [
            {"id": "exit:1", "properties": {"name": "gate", "destinationArea": "area:77"}}
        ]}"#,
    )
    .unwrap();

    pt().args(["check", path(&file)])
        .assert()
        .failure()
        .stdout(predicate::str::contains("exit:1.destinationArea -> area:77"))
        .stderr(predicate::str::contains("1 dangling reference"));
}

#[test]
fn check_rejects_newer_versions() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("world.json");
    fs::write(&file, r#"{"version": 9, "entities": []}"#).unwrap();

    pt().args(["check", path(&file)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot load"));
}

// ---------------------------------------------------------------------------
// types
// ---------------------------------------------------------------------------

#[test]
fn types_lists_builtins() {
    pt().arg("types").assert().success().stdout(
        predicate::str::contains("Gender")
            .and(predicate::str::contains("ItemFlags"))
            .and(predicate::str::contains("CharacterStats"))
            .and(predicate::str::contains("3 registered types")),
    );
}
