use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn pressroom_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("pressroom"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("GITHUB_OWNER")
        .env_remove("GITHUB_REPO")
        .env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_BRANCH")
        .env_remove("PRESSROOM_API_BASE")
        .env_remove("RUST_LOG");
    cmd
}

fn drafts_json(home: &Path) -> Value {
    let output = pressroom_cmd(home)
        .args(["draft", "list", "--json"])
        .output()
        .expect("run draft list");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).expect("draft list JSON")
}

fn only_draft_id(home: &Path) -> String {
    let drafts = drafts_json(home);
    let list = drafts.as_array().expect("array");
    assert_eq!(list.len(), 1);
    list[0]["id"].as_str().expect("id").to_string()
}

#[test]
fn new_draft_is_listed() {
    let home = TempDir::new().unwrap();

    pressroom_cmd(home.path())
        .args(["draft", "new", "--title", "My Blog Post!", "--content", "Hello there"])
        .assert()
        .success()
        .stdout(contains("Created draft"));

    let drafts = drafts_json(home.path());
    assert_eq!(drafts[0]["title"], "My Blog Post!");
    assert_eq!(drafts[0]["content"], "Hello there");
    assert_eq!(drafts[0]["slug"], "my-blog-post");
    assert!(drafts[0]["id"].as_str().unwrap().starts_with("draft-"));
    assert!(home.path().join(".pressroom/drafts.json").exists());
}

#[test]
fn untitled_draft_uses_defaults() {
    let home = TempDir::new().unwrap();
    pressroom_cmd(home.path()).args(["draft", "new"]).assert().success();

    let drafts = drafts_json(home.path());
    assert_eq!(drafts[0]["title"], "Untitled Draft");
    assert_eq!(drafts[0]["content"], "");
}

#[test]
fn body_can_come_from_a_file() {
    let home = TempDir::new().unwrap();
    let body = home.path().join("post.md");
    std::fs::write(&body, "# Heading\n\nFrom disk.\n").unwrap();

    pressroom_cmd(home.path())
        .args(["draft", "new", "--title", "From File", "--file"])
        .arg(&body)
        .assert()
        .success();

    let id = only_draft_id(home.path());
    pressroom_cmd(home.path())
        .args(["draft", "show", &id])
        .assert()
        .success()
        .stdout(contains("From disk."));
}

#[test]
fn edit_dup_and_rm() {
    let home = TempDir::new().unwrap();
    pressroom_cmd(home.path())
        .args(["draft", "new", "--title", "Original", "--content", "x"])
        .assert()
        .success();
    let id = only_draft_id(home.path());

    pressroom_cmd(home.path())
        .args(["draft", "edit", &id, "--title", "Renamed Post"])
        .assert()
        .success();
    pressroom_cmd(home.path())
        .args(["draft", "dup", &id])
        .assert()
        .success()
        .stdout(contains("Renamed Post (Copy)"));

    let drafts = drafts_json(home.path());
    assert_eq!(drafts.as_array().unwrap().len(), 2);
    let renamed = drafts
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["id"] == id.as_str())
        .unwrap();
    assert_eq!(renamed["slug"], "renamed-post");

    pressroom_cmd(home.path())
        .args(["draft", "rm", &id])
        .assert()
        .success()
        .stdout(contains("Deleted 1 of 1"));
    assert_eq!(drafts_json(home.path()).as_array().unwrap().len(), 1);
}

#[test]
fn edit_without_changes_fails() {
    let home = TempDir::new().unwrap();
    pressroom_cmd(home.path()).args(["draft", "new"]).assert().success();
    let id = only_draft_id(home.path());

    pressroom_cmd(home.path())
        .args(["draft", "edit", &id])
        .assert()
        .failure()
        .stderr(contains("nothing to change"));
}

#[test]
fn export_then_import_into_another_home() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let export = first.path().join("drafts-export.json");

    pressroom_cmd(first.path())
        .args(["draft", "new", "--title", "Portable", "--content", "moves between homes"])
        .assert()
        .success();
    pressroom_cmd(first.path())
        .args(["draft", "export", "--out"])
        .arg(&export)
        .assert()
        .success();

    pressroom_cmd(second.path())
        .args(["draft", "import"])
        .arg(&export)
        .assert()
        .success()
        .stdout(contains("Imported 1"));
    assert_eq!(drafts_json(second.path())[0]["title"], "Portable");
}

#[test]
fn import_reports_bad_entries_and_keeps_good_ones() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("bad.json");
    std::fs::write(&file, r#"[{"title":"ok","content":"fine"},{"title":"no body"}]"#).unwrap();

    pressroom_cmd(home.path())
        .args(["draft", "import"])
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("Imported 1"))
        .stderr(contains("Draft 2: missing title or content"));
    assert_eq!(drafts_json(home.path())[0]["title"], "ok");
}

#[test]
fn import_of_non_array_fails() {
    let home = TempDir::new().unwrap();
    let file = home.path().join("object.json");
    std::fs::write(&file, r#"{"title":"x"}"#).unwrap();

    pressroom_cmd(home.path())
        .args(["draft", "import"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(contains("Invalid JSON format: expected array"));
}

#[test]
fn clear_removes_everything() {
    let home = TempDir::new().unwrap();
    pressroom_cmd(home.path()).args(["draft", "new"]).assert().success();
    pressroom_cmd(home.path()).args(["draft", "new"]).assert().success();

    pressroom_cmd(home.path())
        .args(["draft", "clear"])
        .assert()
        .success()
        .stdout(contains("Removed 2"));
    assert!(drafts_json(home.path()).as_array().unwrap().is_empty());
}

#[test]
fn publish_without_configuration_fails_with_configuration_error() {
    let home = TempDir::new().unwrap();
    pressroom_cmd(home.path())
        .args(["draft", "new", "--title", "Ready", "--content", "Body"])
        .assert()
        .success();
    let id = only_draft_id(home.path());

    pressroom_cmd(home.path())
        .args(["publish", &id])
        .assert()
        .failure()
        .stderr(contains("missing required settings: GITHUB_OWNER, GITHUB_REPO, GITHUB_TOKEN"))
        .stderr(contains("status 500"));
}

#[test]
fn files_json_prints_the_error_envelope() {
    let home = TempDir::new().unwrap();
    let output = pressroom_cmd(home.path())
        .args(["files", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("JSON on stdout");
    assert_eq!(json["kind"], "api_error");
    assert_eq!(json["class"], "configuration");
    assert_eq!(json["status"], 500);
}

#[test]
fn invalid_config_file_is_reported() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join(".pressroom");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.yaml"), "owner: octo\nunknown_key: 1\n").unwrap();

    pressroom_cmd(home.path())
        .args(["read", "README.md"])
        .assert()
        .failure()
        .stderr(contains("configuration error"));
}

#[test]
fn publishing_an_unknown_draft_fails_before_any_request() {
    let home = TempDir::new().unwrap();
    pressroom_cmd(home.path())
        .args(["publish", "draft-does-not-exist"])
        .env("GITHUB_OWNER", "octo")
        .env("GITHUB_REPO", "blog")
        .env("GITHUB_TOKEN", "t")
        .assert()
        .failure()
        .stderr(contains("draft not found: draft-does-not-exist"));
}

#[test]
fn content_and_file_conflict() {
    let home = TempDir::new().unwrap();
    pressroom_cmd(home.path())
        .args(["draft", "new", "--content", "a", "--file", "b.md"])
        .assert()
        .failure()
        .stderr(contains("cannot be used with").or(contains("conflict")));
}
