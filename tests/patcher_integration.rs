//! Integration tests for the progress tracker migration
//!
//! Runs the built-in rule set against a fixture file on disk and checks the
//! exact output, the per-rule counts, and a second pass.

use progress_patcher::{builtin, load_from_str, PatchError, TextPatcher, WriteMode};
use std::fs;
use tempfile::TempDir;

fn load_fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{name}"))
        .unwrap_or_else(|err| panic!("failed to load fixture {name}: {err}"))
}

fn patcher() -> TextPatcher {
    TextPatcher::from_rule_set(&builtin().expect("builtin rules")).expect("compile rules")
}

/// Workspace with `src/progress.rs` holding the unpatched fixture.
fn setup_workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(
        dir.path().join("src/progress.rs"),
        load_fixture("progress.rs.input"),
    )
    .unwrap();
    dir
}

#[test]
fn rewrites_fixture_exactly() {
    let workspace = setup_workspace();
    let target = workspace.path().join("src/progress.rs");

    let result = patcher()
        .patch_file(&target, WriteMode::Overwrite)
        .expect("patch");

    let output = fs::read_to_string(&target).unwrap();
    assert_eq!(output, load_fixture("progress.rs.expected"));
    assert_eq!(result.patched, output);
    assert!(result.report.changed);

    let counts: Vec<(&str, usize)> = result
        .report
        .rules
        .iter()
        .map(|r| (r.id.as_str(), r.matches))
        .collect();
    assert_eq!(
        counts,
        [
            ("shared-self-receiver", 6),
            ("main-bar-borrow-mut", 1),
            ("content-bar-borrow-mut", 1),
            ("rename-bar-borrow-mut", 1),
            ("bar-borrow-as-ref", 3),
        ]
    );
}

#[test]
fn only_matching_lines_change() {
    let input = load_fixture("progress.rs.input");
    let (output, _) = patcher().patch_text(&input);

    assert_eq!(input.lines().count(), output.lines().count());

    let changed: Vec<usize> = input
        .lines()
        .zip(output.lines())
        .enumerate()
        .filter(|(_, (before, after))| before != after)
        .map(|(idx, _)| idx + 1)
        .collect();
    assert_eq!(changed, [22, 26, 29, 30, 33, 34, 37, 38, 44, 45, 50, 51]);
}

#[test]
fn second_pass_is_a_no_op() {
    let workspace = setup_workspace();
    let target = workspace.path().join("src/progress.rs");
    let p = patcher();

    p.patch_file(&target, WriteMode::Overwrite).unwrap();
    let once = fs::read_to_string(&target).unwrap();

    let second = p.patch_file(&target, WriteMode::Overwrite).unwrap();
    assert!(!second.report.changed);
    assert_eq!(second.report.total_matches(), 0);
    assert_eq!(fs::read_to_string(&target).unwrap(), once);
}

#[test]
fn missing_target_fails_without_creating_it() {
    let workspace = TempDir::new().unwrap();
    let target = workspace.path().join("src/progress.rs");

    let err = patcher()
        .patch_file(&target, WriteMode::Overwrite)
        .unwrap_err();

    assert!(matches!(err, PatchError::Read { .. }));
    assert!(!target.exists());
}

#[test]
fn non_utf8_target_is_read_error() {
    let workspace = TempDir::new().unwrap();
    let target = workspace.path().join("progress.rs");
    fs::write(&target, [0xff, 0xfe, 0x00, b'x']).unwrap();

    let err = patcher().patch_file(&target, WriteMode::DryRun).unwrap_err();
    assert!(matches!(err, PatchError::Read { .. }));
    assert_eq!(fs::read(&target).unwrap(), [0xff, 0xfe, 0x00, b'x']);
}

#[test]
fn custom_rule_set_drives_the_same_pipeline() {
    let rules = load_from_str(
        r#"
[meta]
name = "rename-tracker"
target = "src/tracker.rs"

[[rules]]
id = "rename-type"
description = "ProgressTracker -> Tracker"

[[rules.substitutions]]
pattern = '\bProgressTracker\b'
replacement = 'Tracker'
"#,
    )
    .unwrap();
    assert_eq!(rules.target(), "src/tracker.rs");

    let (output, report) = TextPatcher::from_rule_set(&rules)
        .unwrap()
        .patch_text(&load_fixture("progress.rs.input"));

    assert_eq!(report.rules[0].matches, 2);
    assert!(output.contains("pub struct Tracker {"));
    assert!(output.contains("impl Tracker {"));
    assert!(!output.contains("ProgressTracker"));
}
