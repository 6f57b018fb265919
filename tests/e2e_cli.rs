mod common;

use std::path::Path;

use assert_cmd::Command;
use assert_cmd::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

use common::weather_tool;

/// A command isolated from the user's config and database.
fn toolsmith(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("toolsmith");
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("TOOLSMITH_DB")
        .env_remove("RUST_LOG");
    cmd
}

fn write_schema(dir: &Path, name: &str, body: &serde_json::Value) -> String {
    let path = dir.join(name);
    std::fs::write(&path, body.to_string()).expect("write schema file");
    path.display().to_string()
}

#[test]
fn test_help_shows_usage() {
    cargo_bin_cmd!("toolsmith")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("OpenAI-style function tools"));
}

#[test]
fn test_version_shows_version() {
    cargo_bin_cmd!("toolsmith")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("toolsmith"));
}

#[test]
fn test_validate_accepts_valid_schema() {
    let tmp_dir = TempDir::new().expect("create temp dir");
    let file = write_schema(tmp_dir.path(), "tool.json", &weather_tool().to_schema());

    toolsmith(tmp_dir.path())
        .args(["validate", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn test_validate_rejects_short_name() {
    let tmp_dir = TempDir::new().expect("create temp dir");
    let mut schema = weather_tool().to_schema();
    schema["name"] = "ab".into();
    let file = write_schema(tmp_dir.path(), "tool.json", &schema);

    toolsmith(tmp_dir.path())
        .args(["validate", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 3 characters"));
}

#[test]
fn test_validate_reads_stdin() {
    let tmp_dir = TempDir::new().expect("create temp dir");

    toolsmith(tmp_dir.path())
        .args(["validate", "-"])
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON"));
}

#[test]
fn test_preview_applies_policy_flags() {
    let tmp_dir = TempDir::new().expect("create temp dir");
    let file = write_schema(tmp_dir.path(), "tool.json", &weather_tool().to_schema());

    let output = toolsmith(tmp_dir.path())
        .args(["preview", &file, "--max-retry-attempts", "7"])
        .output()
        .expect("run preview");
    assert!(output.status.success());

    let preview: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("preview prints JSON");
    let specs = &preview["parameters"]["properties"]["execution_specs"]["properties"];
    assert_eq!(specs["maxRetryAttempts"]["enum"], serde_json::json!([7]));
    assert_eq!(specs["waitTimeInMillis"]["enum"], serde_json::json!([60000]));
}

#[test]
fn test_list_with_empty_database() {
    let tmp_dir = TempDir::new().expect("create temp dir");
    let db = tmp_dir.path().join("tools.db");

    toolsmith(tmp_dir.path())
        .arg("--db")
        .arg(&db)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tools found."));
}

#[test]
fn test_import_list_show_delete() {
    let tmp_dir = TempDir::new().expect("create temp dir");
    let db = tmp_dir.path().join("tools.db");
    let file = write_schema(tmp_dir.path(), "tool.json", &weather_tool().to_schema());

    toolsmith(tmp_dir.path())
        .arg("--db")
        .arg(&db)
        .args(["import", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved tool: get_weather"));

    toolsmith(tmp_dir.path())
        .arg("--db")
        .arg(&db)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("get_weather"));

    toolsmith(tmp_dir.path())
        .arg("--db")
        .arg(&db)
        .args(["show", "get_weather", "--persisted"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"executionSpecs\""));

    toolsmith(tmp_dir.path())
        .arg("--db")
        .arg(&db)
        .args(["delete", "get_weather"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted tool: get_weather"));

    toolsmith(tmp_dir.path())
        .arg("--db")
        .arg(&db)
        .args(["show", "get_weather"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tool not found"));
}

#[test]
fn test_rename_rejects_invalid_name() {
    let tmp_dir = TempDir::new().expect("create temp dir");
    let db = tmp_dir.path().join("tools.db");

    toolsmith(tmp_dir.path())
        .arg("--db")
        .arg(&db)
        .args(["rename", "get_weather", "9lives"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid tool name"));
}

#[test]
fn test_database_from_env_and_config_file() {
    let tmp_dir = TempDir::new().expect("create temp dir");
    let file = write_schema(tmp_dir.path(), "tool.json", &weather_tool().to_schema());
    let env_db = tmp_dir.path().join("env.db");

    toolsmith(tmp_dir.path())
        .env("TOOLSMITH_DB", &env_db)
        .args(["import", &file])
        .assert()
        .success();
    assert!(env_db.exists());

    std::fs::write(
        tmp_dir.path().join("toolsmith.toml"),
        "database = \"config.db\"\n",
    )
    .expect("write config");

    toolsmith(tmp_dir.path())
        .args(["import", &file])
        .assert()
        .success();
    assert!(tmp_dir.path().join("config.db").exists());
}

#[test]
fn test_malformed_config_fails() {
    let tmp_dir = TempDir::new().expect("create temp dir");
    std::fs::write(tmp_dir.path().join("toolsmith.toml"), "database = [").expect("write config");

    toolsmith(tmp_dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

#[test]
fn test_export_then_import_collection() {
    let tmp_dir = TempDir::new().expect("create temp dir");
    let source_db = tmp_dir.path().join("source.db");
    let target_db = tmp_dir.path().join("target.db");
    let file = write_schema(tmp_dir.path(), "tool.json", &weather_tool().to_schema());
    let export = tmp_dir.path().join("tools.json");

    toolsmith(tmp_dir.path())
        .arg("--db")
        .arg(&source_db)
        .args(["import", &file])
        .assert()
        .success();

    toolsmith(tmp_dir.path())
        .arg("--db")
        .arg(&source_db)
        .arg("export")
        .arg("-o")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 tools"));

    toolsmith(tmp_dir.path())
        .arg("--db")
        .arg(&target_db)
        .arg("import-collection")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 tools"));

    toolsmith(tmp_dir.path())
        .arg("--db")
        .arg(&target_db)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("get_weather"));
}
