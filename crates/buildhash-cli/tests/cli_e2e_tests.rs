//! End-to-end tests for the compiled `buildhash` binary.

use assert_cmd::Command;
use buildhash_test_utils::TestTree;
use predicates::prelude::*;
use serde_json::Value;

fn buildhash(tree: &TestTree) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_buildhash"));
    cmd.current_dir(tree.root()).env("NO_COLOR", "1");
    cmd
}

fn sync_json(tree: &TestTree) -> Value {
    let out = buildhash(tree)
        .args(["sync", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    serde_json::from_slice(&out.stdout).unwrap()
}

// ============================================================================
// Help and usage
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let tree = TestTree::new();
    buildhash(&tree)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("files"))
        .stdout(predicate::str::contains("targets"));
}

#[test]
fn test_no_command_prints_hint() {
    let tree = TestTree::new();
    buildhash(&tree)
        .assert()
        .success()
        .stdout(predicate::str::contains("--help"));
}

#[test]
fn test_unknown_command_fails() {
    let tree = TestTree::new();
    buildhash(&tree).arg("frobnicate").assert().failure();
}

// ============================================================================
// sync
// ============================================================================

#[test]
fn test_sync_first_run_then_settles() {
    let tree = TestTree::new();
    tree.next_build("apps/web/.next", "abc123");

    let first = sync_json(&tree);
    assert_eq!(first["dry_run"], false);
    assert_eq!(first["outcomes"][0]["status"], "changed");
    assert_eq!(first["outcomes"][0]["target"], "packages/web-e2e");
    assert_eq!(first["outcomes"][0]["previous"], "");
    assert_eq!(first["outcomes"][1]["current"], "missing");

    let second = sync_json(&tree);
    assert_eq!(second["outcomes"][0]["status"], "unchanged");
    assert_eq!(second["outcomes"][1]["status"], "unchanged");

    let hash = tree.read("packages/web-e2e/build.hash");
    assert_eq!(first["outcomes"][0]["current"], hash.as_str());
}

#[test]
fn test_sync_ignores_new_build_id_with_same_content() {
    let tree = TestTree::new();
    tree.next_build("apps/web/.next", "abc123");
    sync_json(&tree);
    let before = tree.read("packages/web-e2e/build.hash");

    tree.remove("apps/web/.next");
    tree.next_build("apps/web/.next", "def456");
    let report = sync_json(&tree);

    assert_eq!(report["outcomes"][0]["status"], "unchanged");
    assert_eq!(tree.read("packages/web-e2e/build.hash"), before);
}

#[test]
fn test_sync_detects_server_change() {
    let tree = TestTree::new();
    tree.next_build("apps/web/.next", "abc123");
    sync_json(&tree);

    tree.write("apps/web/.next/server/index.html", "<html>B</html>");
    let report = sync_json(&tree);

    assert_eq!(report["outcomes"][0]["status"], "changed");
}

#[test]
fn test_sync_text_output() {
    let tree = TestTree::new();
    tree.next_build("apps/web/.next", "abc123");

    buildhash(&tree)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("UPDATED"))
        .stdout(predicate::str::contains("packages/web-e2e"))
        .stdout(predicate::str::contains("2 changed, 0 unchanged, 0 failed"));

    buildhash(&tree)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 changed, 2 unchanged, 0 failed"));
}

#[test]
fn test_sync_failure_exit_codes() {
    let tree = TestTree::new();
    tree.write("apps/web/.next", "not a directory");

    buildhash(&tree)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("FAILED"));

    buildhash(&tree)
        .args(["sync", "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 target(s) failed"));

    tree.assert_file_not_exists("packages/web-e2e/build.hash");
    assert_eq!(tree.read("packages/docs-e2e/build.hash"), "missing");
}

#[test]
fn test_sync_failure_json_kind() {
    let tree = TestTree::new();
    tree.write("apps/web/.next", "not a directory");

    let report = sync_json(&tree);
    assert_eq!(report["outcomes"][0]["status"], "failed");
    assert_eq!(report["outcomes"][0]["kind"], "read");
}

#[test]
fn test_sync_with_root_flag() {
    let tree = TestTree::new();
    let elsewhere = TestTree::new();
    tree.next_build("apps/web/.next", "abc123");

    buildhash(&elsewhere)
        .arg("-C")
        .arg(tree.root())
        .arg("sync")
        .assert()
        .success();

    tree.assert_file_exists("packages/web-e2e/build.hash");
    elsewhere.assert_file_not_exists("packages/web-e2e/build.hash");
}

#[test]
fn test_sync_with_config_file() {
    let tree = TestTree::new();
    tree.write(
        "buildhash.toml",
        r#"[exclude]
suffixes = [".map"]

[[targets]]
id = "site"
source_dir = "site/dist"
hash_file = "site-e2e/build.hash"
"#,
    );
    tree.write("site/dist/index.html", "A");
    sync_json(&tree);
    let before = tree.read("site-e2e/build.hash");

    tree.write("site/dist/index.js.map", "{}");
    let report = sync_json(&tree);

    assert_eq!(report["outcomes"].as_array().unwrap().len(), 1);
    assert_eq!(report["outcomes"][0]["status"], "unchanged");
    assert_eq!(tree.read("site-e2e/build.hash"), before);
    tree.assert_file_not_exists("packages/web-e2e/build.hash");
}

#[test]
fn test_sync_invalid_config_fails() {
    let tree = TestTree::new();
    tree.write("buildhash.toml", "[[targets]]\nid = \"x\"\n");

    buildhash(&tree)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_reports_without_writing() {
    let tree = TestTree::new();
    tree.next_build("apps/web/.next", "abc123");

    let out = buildhash(&tree)
        .args(["check", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let report: Value = serde_json::from_slice(&out.stdout).unwrap();

    assert_eq!(report["dry_run"], true);
    assert_eq!(report["outcomes"][0]["status"], "changed");
    tree.assert_file_not_exists("packages/web-e2e/build.hash");
    tree.assert_file_not_exists("packages/docs-e2e/build.hash");
}

#[test]
fn test_check_text_uses_stale_label() {
    let tree = TestTree::new();
    tree.next_build("apps/web/.next", "abc123");

    buildhash(&tree)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("STALE"));
}

// ============================================================================
// files and targets
// ============================================================================

#[test]
fn test_files_lists_hashed_paths_in_order() {
    let tree = TestTree::new();
    tree.next_build("apps/web/.next", "abc123");

    let out = buildhash(&tree)
        .args(["files", "packages/web-e2e", "--json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let listing: Value = serde_json::from_slice(&out.stdout).unwrap();

    assert_eq!(listing["marker"], "abc123");
    assert_eq!(
        listing["included"],
        serde_json::json!(["server/chunks/1.js", "server/index.html", "static/chunks/main.js"])
    );
}

#[test]
fn test_files_excluded_shows_rules() {
    let tree = TestTree::new();
    tree.next_build("apps/web/.next", "abc123");

    buildhash(&tree)
        .args(["files", "packages/web-e2e", "--excluded"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dir:cache"))
        .stdout(predicate::str::contains("prefix:server/app/"));
}

#[test]
fn test_files_unknown_target_fails() {
    let tree = TestTree::new();
    buildhash(&tree)
        .args(["files", "packages/nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("packages/nope"));
}

#[test]
fn test_targets_lists_builtin_mapping() {
    let tree = TestTree::new();
    buildhash(&tree)
        .arg("targets")
        .assert()
        .success()
        .stdout(predicate::str::contains("packages/web-e2e"))
        .stdout(predicate::str::contains("apps/web/.next"))
        .stdout(predicate::str::contains("packages/docs-e2e"));
}

#[test]
fn test_sync_hash_file_holds_bare_digest() {
    use assert_fs::prelude::*;

    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("apps/docs/.next/server/index.html")
        .write_str("<html>docs</html>")
        .unwrap();

    Command::new(env!("CARGO_BIN_EXE_buildhash"))
        .arg("-C")
        .arg(temp.path())
        .arg("sync")
        .assert()
        .success();

    temp.child("packages/docs-e2e/build.hash")
        .assert(predicate::str::is_match("^[0-9a-f]{64}$").unwrap());
    temp.child("packages/web-e2e/build.hash")
        .assert("missing");
}
