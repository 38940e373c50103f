// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI integration tests for argument handling and single-process runs

#![cfg(unix)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::TestStore;
use predicates::prelude::*;

#[test]
fn help_lists_commands() {
    let store = TestStore::new();

    store
        .latch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("release"));
}

#[test]
fn run_requires_a_command() {
    let store = TestStore::new();

    store
        .latch()
        .args(["run", "--name", "job"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn unparseable_timeout_is_a_usage_error() {
    let store = TestStore::new();

    store
        .latch()
        .args(["run", "--name", "job", "--timeout", "soon", "--", "true"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--timeout"));
}

#[test]
fn zero_timeout_is_rejected_before_locking() {
    let store = TestStore::new();

    store
        .latch()
        .args(["run", "--name", "job", "--timeout", "0s", "--", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("lock timeout must be positive"));

    assert!(!store.lease_path("job").exists());
}

#[test]
fn empty_message_is_rejected() {
    let store = TestStore::new();

    store
        .latch()
        .args(["run", "--name", "job", "--message", "", "--", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error message must not be empty"));
}

#[test]
fn run_executes_command_and_releases() {
    let store = TestStore::new();
    let marker = store.path().join("ran");

    store
        .latch()
        .args(["run", "--name", "job", "--key", "42", "--", "touch"])
        .arg(&marker)
        .assert()
        .success();

    assert!(marker.exists());
    assert!(!store.lease_path("job42").exists());
}

#[test]
fn run_exits_with_command_status() {
    let store = TestStore::new();

    store
        .latch()
        .args(["run", "--name", "job", "--", "sh", "-c", "exit 3"])
        .assert()
        .code(3);

    assert!(!store.lease_path("job").exists());
}

#[test]
fn command_flags_are_passed_through() {
    let store = TestStore::new();

    store
        .latch()
        .args(["run", "--name", "job", "--", "echo", "-n", "--name"])
        .assert()
        .success()
        .stdout("--name");
}

#[test]
fn missing_program_is_reported() {
    let store = TestStore::new();

    store
        .latch()
        .args(["run", "--name", "job", "--", "/nonexistent/program"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to run /nonexistent/program"));

    assert!(!store.lease_path("job").exists());
}

#[test]
fn unsupported_store_is_reported() {
    let store = TestStore::new();

    store
        .latch()
        .env("LATCH_STORE", "memcached://localhost")
        .args(["status", "--name", "job"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unsupported store url"));
}

#[test]
fn config_file_supplies_store_and_defaults() {
    let store = TestStore::new();
    let config = store.path().join("latch.toml");
    std::fs::write(
        &config,
        format!(
            "[store]\nurl = \"{}\"\n\n[defaults]\ntimeout = \"200ms\"\nerror_message = \"nightly build is running\"\n",
            store.url()
        ),
    )
    .unwrap();
    store.plant_lease("nightly", i64::MAX);

    store
        .latch()
        .env_remove("LATCH_STORE")
        .arg("--config")
        .arg(&config)
        .args(["run", "--name", "nightly", "--", "true"])
        .assert()
        .code(75)
        .stderr(predicate::str::contains("error: nightly build is running"));
}

#[test]
fn invalid_config_is_reported() {
    let store = TestStore::new();
    let config = store.path().join("latch.toml");
    std::fs::write(&config, "[store]\nurl = 7\n").unwrap();

    store
        .latch()
        .arg("--config")
        .arg(&config)
        .args(["status", "--name", "job"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid config"));
}
