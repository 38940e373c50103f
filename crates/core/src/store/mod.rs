// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote key-value store contract used to hold leases
//!
//! A lease is an entry `remote_key -> absolute expiry (epoch ms)`. The store
//! must make `add` atomic: of several concurrent callers adding an absent key,
//! exactly one succeeds.

mod memory;

pub use memory::MemoryStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeStore, StoreCall};

use std::time::Duration;
use thiserror::Error;

/// Errors from remote store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt value for {key}: {value:?}")]
    Corrupt { key: String, value: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Key-value store with per-key expiry, shared by every process contending
/// for the same locks
pub trait RemoteStore: Clone + Send + Sync + 'static {
    /// Store `value` under `key` only if `key` is absent.
    ///
    /// `ttl` of `None` stores the entry without expiry. Returns `false`
    /// without effect when the key is already present.
    fn add(&self, key: &str, value: i64, ttl: Option<Duration>) -> Result<bool, StoreError>;

    /// Read the current value, or `None` if absent
    fn get(&self, key: &str) -> Result<Option<i64>, StoreError>;

    /// Remove the key. Returns whether a key was actually removed.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;
}
