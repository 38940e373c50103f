// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI integration tests for locks contended across processes

#![cfg(unix)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;

use common::{wait_for, TestStore};
use predicates::prelude::*;
use std::time::{Duration, Instant};

#[test]
fn second_process_is_refused_while_first_holds() {
    let store = TestStore::new();

    let mut holder = store
        .latch_process()
        .args(["run", "--name", "job", "--key", "42", "--", "sleep", "3"])
        .spawn()
        .unwrap();
    assert!(wait_for(Duration::from_secs(10), || store
        .lease_path("job42")
        .exists()));

    let start = Instant::now();
    store
        .latch()
        .args([
            "run",
            "--name",
            "job",
            "--key",
            "42",
            "--timeout",
            "300ms",
            "--message",
            "job 42 is already running",
            "--",
            "true",
        ])
        .assert()
        .code(75)
        .stderr(predicate::str::contains("error: job 42 is already running"));
    assert!(start.elapsed() < Duration::from_secs(3));

    store
        .latch()
        .args(["status", "--name", "job", "--key", "42"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("held until"));

    assert!(holder.wait().unwrap().success());
    assert!(!store.lease_path("job42").exists());
}

#[test]
fn waiting_process_runs_after_holder_finishes() {
    let store = TestStore::new();
    let marker = store.path().join("second");

    let mut holder = store
        .latch_process()
        .args(["run", "--name", "deploy", "--", "sleep", "1"])
        .spawn()
        .unwrap();
    assert!(wait_for(Duration::from_secs(10), || store
        .lease_path("deploy")
        .exists()));

    store
        .latch()
        .args(["run", "--name", "deploy", "--timeout", "10s", "--", "touch"])
        .arg(&marker)
        .assert()
        .success();

    assert!(holder.wait().unwrap().success());
    assert!(marker.exists());
}

#[test]
fn different_keys_do_not_contend() {
    let store = TestStore::new();
    store.plant_lease("job1", i64::MAX);

    store
        .latch()
        .args(["run", "--name", "job", "--key", "2", "--timeout", "200ms", "--", "true"])
        .assert()
        .success();
}

#[test]
fn stale_lease_is_reclaimed() {
    let store = TestStore::new();
    store.plant_lease("job", 1_000);

    store
        .latch()
        .args(["status", "--name", "job"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("stale"));

    store
        .latch()
        .args(["run", "--name", "job", "--timeout", "200ms", "--", "true"])
        .assert()
        .success();

    assert!(!store.lease_path("job").exists());
}

#[test]
fn release_clears_stuck_lease() {
    let store = TestStore::new();
    store.plant_lease("job42", i64::MAX);

    store
        .latch()
        .args(["status", "--name", "job", "--key", "42"])
        .assert()
        .success()
        .stdout("held without expiry\n");

    store
        .latch()
        .args(["release", "--name", "job", "--key", "42"])
        .assert()
        .success()
        .stdout("released\n");

    store
        .latch()
        .args(["release", "--name", "job", "--key", "42"])
        .assert()
        .success()
        .stdout("not held\n");

    store
        .latch()
        .args(["run", "--name", "job", "--key", "42", "--timeout", "200ms", "--", "true"])
        .assert()
        .success();
}

#[test]
fn release_clears_unreadable_lease() {
    let store = TestStore::new();
    std::fs::write(store.lease_path("job42"), "garbage").unwrap();

    store
        .latch()
        .args(["release", "--name", "job", "--key", "42"])
        .assert()
        .success()
        .stdout("released\n");

    assert!(!store.lease_path("job42").exists());
}

#[test]
fn status_json_reports_free_lock() {
    let store = TestStore::new();

    let output = store
        .latch()
        .args(["status", "--name", "job", "--key", "42", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["state"], "free");
    assert_eq!(json["lock"], "job[42]");
    assert_eq!(json["remote_key"], "job42");
    assert!(json["expires_at"].is_null());
}
