//! CLI integration tests using the real bundle-updater binary

mod common;

use assert_cmd::Command;
use common::{TestEnv, mount_update};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use wiremock::MockServer;

// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
fn updater_cmd(env: &TestEnv) -> Command {
    let mut cmd = Command::cargo_bin("bundle-updater").unwrap();
    cmd.current_dir(env.temp.path())
        .env_remove("BUNDLE_UPDATER_HOME")
        .env_remove("BUNDLE_UPDATER_LOG")
        .arg("--data-dir")
        .arg(&env.data_dir);
    cmd
}

fn write_config(env: &TestEnv, yaml: &str) -> PathBuf {
    let path = env.temp.path().join("updater.yaml");
    fs::write(&path, yaml).unwrap();
    path
}

fn config_for(server: &MockServer, data_dir: &Path) -> String {
    format!(
        "check_url: {}/api/hotupdate\nplatform: android\ndata_dir: {}\n",
        server.uri(),
        data_dir.display()
    )
}

#[test]
fn test_help_output() {
    let env = TestEnv::new();
    updater_cmd(&env)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Over-the-air bundle updater"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("reset"));
}

#[test]
fn test_version_output() {
    let env = TestEnv::new();
    updater_cmd(&env)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bundle-updater"))
        .stdout(predicate::str::contains("Build info"));
}

#[test]
fn test_completions_bash() {
    let env = TestEnv::new();
    updater_cmd(&env)
        .args(["completions", "--shell", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bundle-updater"));
}

#[test]
fn test_resolve_falls_back_to_shipped_asset() {
    let env = TestEnv::new();
    updater_cmd(&env)
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.0.1"))
        .stdout(predicate::str::contains("assets://index.bundle"));
}

#[test]
fn test_resolve_uses_installed_version() {
    let env = TestEnv::new();
    let record = env.install_active("1.2.0", "bundle");

    updater_cmd(&env)
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("1.2.0"))
        .stdout(predicate::str::contains(record.path.to_string()));
}

#[test]
fn test_resolve_sweeps_unless_asked_not_to() {
    let env = TestEnv::new();
    let staging = env.install_root().join("2.0.0_tmp");
    fs::create_dir_all(&staging).unwrap();

    updater_cmd(&env)
        .args(["resolve", "--no-sweep"])
        .assert()
        .success();
    assert!(staging.exists());

    updater_cmd(&env).arg("resolve").assert().success();
    assert!(!staging.exists());
}

#[test]
fn test_status_without_bundles() {
    let env = TestEnv::new();
    updater_cmd(&env)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("none (fallback chain in use)"))
        .stdout(predicate::str::contains("No bundles installed."));
}

#[test]
fn test_status_lists_installed_bundles() {
    let env = TestEnv::new();
    env.install_active("1.0.0", "old");
    env.install_active("1.1.0", "new");

    updater_cmd(&env)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Active: 1.1.0"))
        .stdout(predicate::str::contains("Installed bundles (2"))
        .stdout(predicate::str::contains("1.0.0"))
        .stdout(predicate::str::contains("(installed just now)"));
}

#[test]
fn test_status_flags_missing_bundle_file() {
    let env = TestEnv::new();
    let record = env.install_active("1.0.0", "bundle");
    fs::remove_file(record.path.as_path().unwrap()).unwrap();

    updater_cmd(&env)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("bundle file is missing"));
}

#[test]
fn test_reset_removes_record() {
    let env = TestEnv::new();
    env.install_active("1.0.0", "bundle");

    updater_cmd(&env)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed bundle record"));
    assert!(env.store().load().is_none());
    assert_eq!(env.install_root_entries(), vec!["1.0.0"]);

    updater_cmd(&env)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("No bundle record to remove."));
}

#[test]
fn test_reset_purge_removes_installs() {
    let env = TestEnv::new();
    env.install_active("1.0.0", "bundle");

    updater_cmd(&env)
        .args(["reset", "--purge"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed installed bundles"));
    assert!(!env.install_root().exists());
}

#[test]
fn test_run_disabled_reports_skipped_json() {
    let env = TestEnv::new();
    let config = write_config(&env, "enabled: false\n");

    updater_cmd(&env)
        .arg("--config")
        .arg(&config)
        .args(["run", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"skipped\""))
        .stdout(predicate::str::contains("assets://index.bundle"));
}

#[test]
fn test_run_with_unreachable_service_still_succeeds() {
    let env = TestEnv::new();
    let config = write_config(
        &env,
        "check_url: http://127.0.0.1:9/api/hotupdate\ncheck_timeout_secs: 2\n",
    );

    updater_cmd(&env)
        .arg("--config")
        .arg(&config)
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("update failed while checking"))
        .stdout(predicate::str::contains("assets://index.bundle"));
}

#[test]
fn test_check_with_unreachable_service_fails() {
    let env = TestEnv::new();
    let config = write_config(
        &env,
        "check_url: http://127.0.0.1:9/api/hotupdate\ncheck_timeout_secs: 2\n",
    );

    updater_cmd(&env)
        .arg("--config")
        .arg(&config)
        .arg("check")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_installs_update() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    mount_update(&server, "1.1.0", b"fresh").await;
    let config = write_config(&env, &config_for(&server, &env.data_dir));

    updater_cmd(&env)
        .arg("--config")
        .arg(&config)
        .args(["run", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"updated\""))
        .stdout(predicate::str::contains("\"to\": \"1.1.0\""));

    let installed = env.install_root().join("1.1.0/index.bundle");
    assert_eq!(fs::read(installed).unwrap(), b"fresh");
    assert_eq!(env.store().load().unwrap().version.as_str(), "1.1.0");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_check_reports_available_update() {
    let server = MockServer::start().await;
    let env = TestEnv::new();
    mount_update(&server, "1.1.0", b"fresh").await;
    let config = write_config(&env, &config_for(&server, &env.data_dir));

    updater_cmd(&env)
        .arg("--config")
        .arg(&config)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("1.1.0"));
}

#[test]
fn test_missing_config_file_is_error() {
    let env = TestEnv::new();
    updater_cmd(&env)
        .args(["--config", "does-not-exist.yaml", "status"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_invalid_config_is_error() {
    let env = TestEnv::new();
    let config = write_config(&env, "check_url: not a url\n");

    updater_cmd(&env)
        .arg("--config")
        .arg(&config)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("check_url"));
}

#[test]
fn test_unknown_command() {
    let env = TestEnv::new();
    updater_cmd(&env).arg("frobnicate").assert().failure();
}

#[test]
#[allow(deprecated)]
fn test_data_dir_from_environment() {
    let env = TestEnv::new();
    env.install_active("1.4.0", "bundle");

    Command::cargo_bin("bundle-updater")
        .unwrap()
        .current_dir(env.temp.path())
        .env("BUNDLE_UPDATER_HOME", &env.data_dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Active: 1.4.0"));
}
