//! CLI integration tests for skillgraph
//!
//! Exercises the commands that work without a graph store using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const TAXONOMY: &str = r#"{
    "Backend Engineer": {
        "databases": { "SQL": { "count": 10 }, "Redis": { "count": 4 } },
        "Docker": { "count": 5 }
    }
}"#;

/// Command isolated from the user's config and database settings
#[allow(deprecated)]
fn skillgraph_cmd(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("skillgraph").unwrap();
    cmd.current_dir(config_dir.path());
    cmd.env("SKILLGRAPH_CONFIG_DIR", config_dir.path());
    cmd.env_remove("SKILLGRAPH_DATABASE_URL");
    cmd.env_remove("DATABASE_URL");
    cmd
}

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    skillgraph_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tree"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("import"));
}

#[test]
fn test_version_output() {
    let dir = TempDir::new().unwrap();
    skillgraph_cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("skillgraph"));
}

#[test]
fn test_config_path_uses_config_dir() {
    let dir = TempDir::new().unwrap();
    skillgraph_cmd(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_set_get_reset() {
    let dir = TempDir::new().unwrap();
    skillgraph_cmd(&dir)
        .args(["config", "set", "graph.query_timeout_secs", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set graph.query_timeout_secs = 7"));
    assert!(dir.path().join("config.toml").exists());

    skillgraph_cmd(&dir)
        .args(["config", "get", "graph.query_timeout_secs"])
        .assert()
        .success()
        .stdout("7\n");

    skillgraph_cmd(&dir).args(["config", "reset"]).assert().success();
    skillgraph_cmd(&dir)
        .args(["config", "get", "graph.query_timeout_secs"])
        .assert()
        .success()
        .stdout("30\n");
}

#[test]
fn test_config_list_redacts_database_url() {
    let dir = TempDir::new().unwrap();
    skillgraph_cmd(&dir)
        .env("SKILLGRAPH_DATABASE_URL", "postgres://app:hunter2@db:5432/skills")
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("graph.database_url = postgres://app:***@db:5432/skills"))
        .stdout(predicate::str::contains("hunter2").not())
        .stdout(predicate::str::contains("progress.unknown_status = drop"));
}

#[test]
fn test_config_rejects_database_url() {
    let dir = TempDir::new().unwrap();
    skillgraph_cmd(&dir)
        .args(["config", "set", "database_url", "postgres://x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("environment variable"));
}

#[test]
fn test_config_rejects_bad_graph_name() {
    let dir = TempDir::new().unwrap();
    skillgraph_cmd(&dir)
        .args(["config", "set", "graph.graph_name", "bad name"])
        .assert()
        .failure();
}

#[test]
fn test_import_dry_run_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("backend.json");
    fs::write(&file, TAXONOMY).unwrap();

    skillgraph_cmd(&dir)
        .args(["import", "--dry-run", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Backend Engineer: 5 node(s), 4 link(s)"))
        .stdout(predicate::str::contains("Dry run"));
}

#[test]
fn test_import_dry_run_json() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.json"), TAXONOMY).unwrap();

    let output = skillgraph_cmd(&dir)
        .args(["--format", "json", "import", "--dry-run", "--dir"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let plans: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let profession = &plans[0]["plan"]["professions"][0];
    assert_eq!(profession["name"], "Backend Engineer");
    assert!(
        profession["nodes"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!({ "label": "Skill", "name": "SQL", "count": 10 }))
    );
}

#[test]
fn test_import_rejects_bad_document() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bad.json");
    fs::write(&file, r#"{"P": {"SQL": {"count": "lots"}}}"#).unwrap();

    skillgraph_cmd(&dir)
        .args(["import", "--dry-run", "--file"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("E400"));
}

#[test]
fn test_import_requires_a_source() {
    let dir = TempDir::new().unwrap();
    skillgraph_cmd(&dir).args(["import"]).assert().failure();
}

#[test]
fn test_tree_without_database_url_fails() {
    let dir = TempDir::new().unwrap();
    skillgraph_cmd(&dir)
        .args(["tree", "--profession", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SKILLGRAPH_DATABASE_URL"));
}

#[test]
fn test_status_requires_user() {
    let dir = TempDir::new().unwrap();
    skillgraph_cmd(&dir)
        .args(["status", "--profession", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--user"));
}

#[test]
fn test_doctor_reports_missing_url() {
    let dir = TempDir::new().unwrap();
    skillgraph_cmd(&dir)
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] Configuration: Valid"))
        .stdout(predicate::str::contains("[!!] Database URL: Not configured"));
}
