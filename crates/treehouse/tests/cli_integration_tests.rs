//! CLI integration tests for treehouse commands

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

fn treehouse_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_treehouse"))
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Scan directory with `myrepo` and one linked worktree `myrepo-feature`,
/// plus a config file that disables GitHub lookups
fn setup_projects() -> (tempfile::TempDir, PathBuf, PathBuf) {
    let temp = tempfile::tempdir().expect("failed to create temp dir");
    let root = temp.path().canonicalize().unwrap();
    let projects = root.join("Projects");
    let main_repo = projects.join("myrepo");
    fs::create_dir_all(&main_repo).unwrap();

    git(&main_repo, &["init", "-b", "main"]);
    git(&main_repo, &["config", "user.email", "test@example.com"]);
    git(&main_repo, &["config", "user.name", "Test User"]);
    fs::write(main_repo.join("README.md"), "# myrepo\n").unwrap();
    git(&main_repo, &["add", "README.md"]);
    git(&main_repo, &["commit", "-m", "Initial commit"]);
    git(&main_repo, &["worktree", "add", "-b", "feature", "../myrepo-feature"]);

    let config = root.join("config.toml");
    fs::write(
        &config,
        format!(
            "[scan]\ndirectory = \"{}\"\n\n[github]\nenabled = false\n",
            projects.display()
        ),
    )
    .unwrap();

    (temp, projects, config)
}

fn run(config: &Path, args: &[&str]) -> Output {
    Command::new(treehouse_binary())
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run treehouse")
}

fn parse_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "invalid JSON ({}): {}",
            e,
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn test_list_json() {
    let (_temp, projects, config) = setup_projects();
    fs::write(projects.join("myrepo-feature").join("wip.txt"), "wip\n").unwrap();

    let output = run(&config, &["--json", "list"]);
    assert!(output.status.success());

    let json = parse_json(&output);
    assert_eq!(json["schema_version"], "1");
    assert_eq!(json["command"], "list");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["data"]["github"], false);

    let worktrees = json["data"]["worktrees"].as_array().unwrap();
    assert_eq!(worktrees.len(), 1);
    assert_eq!(worktrees[0]["id"], "myrepo-feature");
    assert_eq!(worktrees[0]["branchName"], "feature");
    assert_eq!(worktrees[0]["status"], "dirty");
    assert_eq!(worktrees[0]["originType"], "manual");
    assert_eq!(worktrees[0]["liveStatus"], "unknown");
}

#[test]
fn test_list_status_filter() {
    let (_temp, _projects, config) = setup_projects();

    let output = run(&config, &["--json", "list", "--status", "dirty"]);
    assert!(output.status.success());
    let json = parse_json(&output);
    assert!(json["data"]["worktrees"].as_array().unwrap().is_empty());
}

#[test]
fn test_list_text_output() {
    let (_temp, _projects, config) = setup_projects();

    let output = run(&config, &["list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("myrepo-feature"));
    assert!(stdout.contains("1 worktree(s)"));
}

#[test]
fn test_delete_with_branch() {
    let (_temp, projects, config) = setup_projects();

    let output = run(
        &config,
        &["--json", "delete", "myrepo-feature", "--delete-branch", "--yes"],
    );
    assert!(
        output.status.success(),
        "delete failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json = parse_json(&output);
    assert_eq!(json["status"], "ok");
    let steps = json["data"]["report"]["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 4);
    assert!(steps.iter().all(|s| s["outcome"]["kind"] == "done"));
    assert!(!projects.join("myrepo-feature").exists());

    let branches = Command::new("git")
        .args(["branch", "--list", "feature"])
        .current_dir(projects.join("myrepo"))
        .output()
        .unwrap();
    assert!(String::from_utf8_lossy(&branches.stdout).trim().is_empty());
}

#[test]
fn test_delete_refuses_escape() {
    let (_temp, projects, config) = setup_projects();

    let output = run(&config, &["--json", "delete", "..", "--yes"]);
    assert_eq!(output.status.code(), Some(3));

    let json = parse_json(&output);
    assert_eq!(json["status"], "error");
    assert_eq!(json["issues"][0]["code"], "T001");
    assert!(projects.join("myrepo").exists());
}

#[test]
fn test_missing_config_file() {
    let temp = tempfile::tempdir().unwrap();
    let output = run(&temp.path().join("missing.toml"), &["list"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}
