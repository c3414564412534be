//! Binary-level tests for la-remote.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn la_remote() -> Command {
    Command::cargo_bin("la-remote").unwrap()
}

#[test]
fn help_lists_subcommands() {
    la_remote()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("poll"))
        .stdout(predicate::str::contains("rotate-session"))
        .stdout(predicate::str::contains("hash-pin"));
}

#[test]
fn hash_pin_prints_sha256_hex() {
    la_remote()
        .args(["hash-pin", "1234"])
        .assert()
        .success()
        .stdout(
            "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4\n",
        );
}

#[test]
fn init_writes_device_state() {
    let dir = tempdir().unwrap();

    la_remote()
        .arg("--data-dir")
        .arg(dir.path())
        .args(["init", "--pin", "1234"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Device initialized"));

    assert!(dir.path().join("device.json").exists());

    la_remote()
        .arg("--data-dir")
        .arg(dir.path())
        .args(["init", "--pin", "1234"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn send_rejects_unknown_command() {
    la_remote()
        .args(["send", "SELF_DESTRUCT", "--device-id", "device-d1", "--pin", "1234"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid command"));
}

#[test]
fn status_without_init_succeeds() {
    let dir = tempdir().unwrap();

    la_remote()
        .arg("--data-dir")
        .arg(dir.path())
        .args(["--relay", "http://127.0.0.1:9", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("NOT INITIALIZED"));
}

#[test]
fn poll_once_without_init_fails() {
    let dir = tempdir().unwrap();

    la_remote()
        .arg("--data-dir")
        .arg(dir.path())
        .args(["poll", "--once"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}
