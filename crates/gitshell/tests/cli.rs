//! End-to-end tests for the `gitshell` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary with an isolated config directory.
fn gitshell(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gitshell").unwrap();
    cmd.env("GITSHELL_CONFIG_DIR", config_dir.path())
        .env_remove("GITSHELL_GIT_PATH")
        .env_remove("GITSHELL_PROBE_TIMEOUT");
    cmd
}

#[test]
fn test_should_print_help() {
    let config = tempfile::tempdir().unwrap();
    gitshell(&config)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("remote-add"))
        .stdout(predicate::str::contains("tracking"));
}

#[test]
fn test_should_print_version() {
    let config = tempfile::tempdir().unwrap();
    gitshell(&config)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_should_exit_3_outside_a_repository() {
    let config = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    // The metadata check fails before this binary would be spawned.
    gitshell(&config)
        .env("GITSHELL_GIT_PATH", "/nonexistent/gitshell/git")
        .args(["status", "-C"])
        .arg(dir.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not a git repository"));
}

#[test]
fn test_should_list_default_config() {
    let config = tempfile::tempdir().unwrap();
    gitshell(&config)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("probe_timeout=2"))
        .stdout(predicate::str::contains("assume_ssh_reachable=false"));
}

#[test]
fn test_should_persist_config_set() {
    let config = tempfile::tempdir().unwrap();
    gitshell(&config)
        .args(["config", "set", "reachability_ttl", "60"])
        .assert()
        .success();
    assert!(config.path().join("config.yml").is_file());

    gitshell(&config)
        .args(["config", "get", "reachability_ttl"])
        .assert()
        .success()
        .stdout("60\n");
}

#[test]
fn test_should_reject_invalid_config_value() {
    let config = tempfile::tempdir().unwrap();
    gitshell(&config)
        .args(["config", "set", "probe_timeout", "soon"])
        .assert()
        .failure()
        .code(1);
    assert!(!config.path().join("config.yml").exists());
}

#[test]
fn test_should_reject_unknown_config_key() {
    let config = tempfile::tempdir().unwrap();
    gitshell(&config)
        .args(["config", "get", "editor"])
        .assert()
        .code(1);
}

#[test]
fn test_should_init_and_report_head_with_real_git() {
    if which::which("git").is_err() {
        return;
    }
    let config = tempfile::tempdir().unwrap();
    let dir = tempfile::tempdir().unwrap();
    fs_write(&dir, "README.md", "hello\n");

    gitshell(&config)
        .arg("-C")
        .arg(dir.path())
        .arg("init")
        .assert()
        .success();
    // An unborn HEAD is a negative answer.
    gitshell(&config).arg("-C").arg(dir.path()).arg("head").assert().code(2);

    gitshell(&config)
        .arg("-C")
        .arg(dir.path())
        .args(["commit", "-m", "First: commit!"])
        .args(["--author-name", "Ada", "--author-email", "ada@example.com"])
        .assert()
        .success();

    gitshell(&config)
        .arg("-C")
        .arg(dir.path())
        .args(["log", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"message\": \"First: commit\""));

    // No remotes: fetch-all has nothing to do.
    gitshell(&config).arg("-C").arg(dir.path()).arg("fetch").assert().code(2);
}

fn fs_write(dir: &TempDir, name: &str, contents: &str) {
    std::fs::write(dir.path().join(name), contents).unwrap();
}
