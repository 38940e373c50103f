// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]
#![allow(deprecated)]

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// A lease directory shared by every `latch` invocation of one test
pub struct TestStore {
    dir: TempDir,
}

impl TestStore {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn url(&self) -> String {
        format!("file://{}", self.dir.path().display())
    }

    pub fn lease_path(&self, remote_key: &str) -> PathBuf {
        self.dir.path().join(format!("{remote_key}.lease"))
    }

    /// Write a lease directly, as another process would have left it
    pub fn plant_lease(&self, remote_key: &str, expiry: i64) {
        std::fs::write(self.lease_path(remote_key), format!("{expiry} -\n"))
            .expect("Failed to write lease");
    }

    /// `latch` bound to this store
    pub fn latch(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("latch").expect("latch binary");
        cmd.env("LATCH_STORE", self.url())
            .env_remove("LATCH_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    /// `latch` bound to this store, as a std command for background runs
    pub fn latch_process(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(assert_cmd::cargo::cargo_bin("latch"));
        cmd.env("LATCH_STORE", self.url())
            .env_remove("LATCH_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }
}

/// Poll until `condition` holds or `timeout` passes
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    condition()
}
