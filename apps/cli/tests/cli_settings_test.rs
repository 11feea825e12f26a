//! Integration tests for the `tuner settings` and `tuner guide` commands.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tuner(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tuner").unwrap();
    cmd.current_dir(temp.path())
        .env("HOME", temp.path())
        .env("NO_COLOR", "1")
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_ORG_ID")
        .env_remove("ORG_ID")
        .env_remove("TUNER_API_BASE");
    cmd
}

#[test]
fn test_set_writes_local_file_and_masks_key() {
    let temp = TempDir::new().unwrap();

    tuner(&temp)
        .args(["settings", "set", "--api-key", "sk-test-abcdefghijklmnop", "--org-id", "org-123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sk-...mnop"))
        .stdout(predicate::str::contains("abcdefghijkl").not());

    let saved = std::fs::read_to_string(temp.path().join(".tunerrc")).unwrap();
    assert!(saved.contains("sk-test-abcdefghijklmnop"));
    assert!(saved.contains("org-123"));
}

#[test]
fn test_set_global_writes_home_file() {
    let temp = TempDir::new().unwrap();

    tuner(&temp).args(["settings", "set", "--model", "gpt-4o-mini-2024-07-18", "--global"]).assert().success();

    assert!(temp.path().join(".tuner").join("settings.toml").exists());
    assert!(!temp.path().join(".tunerrc").exists());
}

#[test]
fn test_set_without_values_fails() {
    let temp = TempDir::new().unwrap();

    tuner(&temp)
        .args(["settings", "set"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to save"));
}

#[test]
fn test_show_merges_local_over_global() {
    let temp = TempDir::new().unwrap();

    tuner(&temp).args(["settings", "set", "--model", "global-model", "--global"]).assert().success();
    tuner(&temp).args(["settings", "set", "--model", "local-model"]).assert().success();

    let output = tuner(&temp).args(["settings", "show", "--json"]).output().unwrap();
    assert!(output.status.success());
    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["model"], "local-model");
    assert_eq!(shown["dataset"], "output.jsonl");
    assert!(shown["api_key"].is_null());
}

#[test]
fn test_show_falls_back_to_environment() {
    let temp = TempDir::new().unwrap();

    tuner(&temp)
        .env("OPENAI_API_KEY", "sk-env-1234567890wxyz")
        .env("ORG_ID", "org-env")
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sk-...wxyz"))
        .stdout(predicate::str::contains("org-env"));
}

#[test]
fn test_guide_mentions_playground() {
    let temp = TempDir::new().unwrap();

    tuner(&temp)
        .arg("guide")
        .assert()
        .success()
        .stdout(predicate::str::contains("tuner dataset validate"))
        .stdout(predicate::str::contains("https://platform.openai.com/playground"));
}
