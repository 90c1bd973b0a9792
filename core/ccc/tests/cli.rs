//! End-to-end tests for the ccc command surface against a temp Claude dir.

use ccc_cli::run_cli;
use fs_err as fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Run {
    code: i32,
    out: String,
    err: String,
}

fn ccc(root: &Path, args: &[&str], input: &str) -> Run {
    let mut argv = vec![
        "ccc".to_string(),
        "--claude-dir".to_string(),
        root.to_string_lossy().to_string(),
    ];
    argv.extend(args.iter().map(|a| a.to_string()));

    let mut stdin = Cursor::new(input.to_string());
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = run_cli(argv, &mut stdin, &mut out, &mut err);
    Run {
        code,
        out: String::from_utf8(out).unwrap(),
        err: String::from_utf8(err).unwrap(),
    }
}

fn setup() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join(".claude");
    fs::create_dir_all(root.join("projects")).unwrap();
    (temp, root)
}

fn add_session(root: &Path, encoded: &str, id: &str, cwd: &Path) {
    let dir = root.join("projects").join(encoded);
    fs::create_dir_all(&dir).unwrap();
    let line = serde_json::json!({
        "sessionId": id,
        "cwd": cwd.to_string_lossy(),
        "timestamp": "2025-02-10T09:30:00Z",
    });
    fs::write(dir.join(format!("{id}.jsonl")), format!("{line}\n")).unwrap();
}

#[test]
fn test_no_command_prints_help() {
    let (_temp, root) = setup();
    let run = ccc(&root, &[], "");
    assert_eq!(run.code, 0);
    assert!(run.out.contains("Usage"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    let (_temp, root) = setup();
    let run = ccc(&root, &["purge"], "");
    assert_ne!(run.code, 0);
    assert!(!run.err.is_empty());
}

#[test]
fn test_list_projects_marks_stale() {
    let (temp, root) = setup();
    let live = temp.path().join("live");
    fs::create_dir_all(&live).unwrap();
    add_session(&root, "-live", "s1", &live);
    add_session(&root, "-gone", "s2", &temp.path().join("gone"));

    let run = ccc(&root, &["list", "projects"], "");
    assert_eq!(run.code, 0);
    assert!(run.out.starts_with("Projects:\n"));
    assert!(run.out.contains(&format!("  [OK] {}", live.display())));
    assert!(run.out.contains("  [STALE] "));
    assert!(run.out.contains("last used: 2025-02-10"));
    assert!(run.out.ends_with("\nTotal: 2 projects (1 stale)\n"));

    let stale_only = ccc(&root, &["list", "--stale-only"], "");
    assert!(!stale_only.out.contains("[OK]"));
    assert!(stale_only.out.contains("[STALE]"));
}

#[test]
fn test_list_projects_empty() {
    let (_temp, root) = setup();
    let run = ccc(&root, &["list", "projects"], "");
    assert_eq!(run.code, 0);
    assert_eq!(run.out, "No projects found.\n");
}

#[test]
fn test_missing_projects_dir_blocks_orphan_cleanup() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join(".claude");
    fs::create_dir_all(root.join("todos")).unwrap();
    let todo = root.join("todos").join("live-session-agent-1.json");
    fs::write(&todo, "[]").unwrap();

    let listed = ccc(&root, &["list"], "");
    assert_eq!(listed.code, 0);
    assert_eq!(listed.out, "No projects found.\n");

    let run = ccc(&root, &["clean", "orphans", "-y"], "");
    assert_eq!(run.code, 1);
    assert!(run.err.contains("Error finding orphans: Projects directory not found"));
    assert!(todo.exists());
    assert!(!root.join("cccc-audit.log").exists());
}

#[test]
fn test_clean_projects_dry_run_then_confirm() {
    let (temp, root) = setup();
    add_session(&root, "-gone", "s1", &temp.path().join("gone"));
    let storage = root.join("projects").join("-gone");

    let dry = ccc(&root, &["clean", "projects", "--dry-run"], "");
    assert_eq!(dry.code, 0);
    assert!(dry.out.starts_with("[DRY RUN]\n=== Stale Project Cleanup ===\n"));
    assert!(storage.exists());
    assert!(!root.join("cccc-audit.log").exists());

    let run = ccc(&root, &["clean", "projects"], "y\n");
    assert_eq!(run.code, 0);
    assert!(run.out.contains("Proceed? [y/N]: "));
    assert!(run.out.contains("Cleaned 1 stale projects, freed "));
    assert!(!storage.exists());

    let log = fs::read_to_string(root.join("cccc-audit.log")).unwrap();
    assert_eq!(log.lines().count(), 1);
    assert!(log.contains(" DELETE "));
}

#[test]
fn test_clean_declined_exits_zero() {
    let (temp, root) = setup();
    add_session(&root, "-gone", "s1", &temp.path().join("gone"));

    let run = ccc(&root, &["clean", "projects"], "n\n");
    assert_eq!(run.code, 0);
    assert!(run.out.ends_with("Aborted. No changes made.\n"));
    assert!(root.join("projects").join("-gone").exists());
}

#[test]
fn test_clean_orphans_with_yes() {
    let (_temp, root) = setup();
    fs::create_dir_all(root.join("todos")).unwrap();
    let todo = root.join("todos").join("abc123-agent-xyz.json");
    fs::write(&todo, "[]").unwrap();

    let run = ccc(&root, &["clean", "orphans", "--yes"], "");
    assert_eq!(run.code, 0);
    assert!(!run.out.contains("Proceed?"));
    assert!(run.out.contains("Cleaned 1 orphaned items, freed 2 B"));
    assert!(!todo.exists());
}

#[test]
fn test_list_orphans_does_not_delete() {
    let (_temp, root) = setup();
    fs::create_dir_all(root.join("session-env").join("empty")).unwrap();

    let run = ccc(&root, &["list", "orphans"], "");
    assert_eq!(run.code, 0);
    assert!(run.out.contains("=== Orphan Cleanup ==="));
    assert!(run.out.contains("Empty session env"));
    assert!(root.join("session-env").join("empty").exists());
}

#[test]
fn test_clean_config_rewrites_local_settings() {
    let (temp, root) = setup();
    let project = temp.path().join("app");
    fs::create_dir_all(project.join(".claude")).unwrap();
    add_session(&root, "-app", "s1", &project);
    fs::write(
        root.join("settings.json"),
        r#"{"permissions":{"allow":["Bash(git:*)"]}}"#,
    )
    .unwrap();
    let local = project.join(".claude").join("settings.local.json");
    fs::write(
        &local,
        r#"{"permissions":{"allow":["Bash(git:*)","Bash(make:*)"]}}"#,
    )
    .unwrap();

    let listed = ccc(&root, &["list", "config", "-v"], "");
    assert!(listed.out.contains("allow: Bash(git:*)"));

    let run = ccc(&root, &["clean", "config", "-y"], "");
    assert_eq!(run.code, 0);
    assert!(run.out.contains("Deduplicated 1 config files"));

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&local).unwrap()).unwrap();
    assert_eq!(value["permissions"]["allow"], serde_json::json!(["Bash(make:*)"]));

    let log = fs::read_to_string(root.join("cccc-audit.log")).unwrap();
    assert!(log.contains(&format!("MODIFY {}: removed allow: Bash(git:*)", local.display())));
}

#[test]
fn test_malformed_global_settings_exits_one() {
    let (_temp, root) = setup();
    fs::write(root.join("settings.json"), "{broken").unwrap();

    let run = ccc(&root, &["clean", "config"], "");
    assert_eq!(run.code, 1);
    assert!(run.err.contains("Error loading settings"));
}

#[test]
fn test_clean_all_reports_each_step() {
    let (_temp, root) = setup();
    let run = ccc(&root, &["clean"], "");
    assert_eq!(run.code, 0);
    assert_eq!(
        run.out,
        "No stale projects found.\nNo orphaned data found.\nNo local configs found.\n"
    );
}
