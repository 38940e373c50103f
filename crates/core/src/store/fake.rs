// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake store for testing: records calls and injects failures
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{MemoryStore, RemoteStore, StoreError};
use crate::clock::{Clock, SystemClock};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Add {
        key: String,
        value: i64,
        ttl: Option<Duration>,
    },
    Get {
        key: String,
    },
    Delete {
        key: String,
    },
}

#[derive(Debug, Default)]
struct Faults {
    unavailable: bool,
    failing_adds: u32,
    failing_deletes: bool,
}

/// Fake store backed by a [`MemoryStore`]
#[derive(Clone, Debug)]
pub struct FakeStore<C: Clock = SystemClock> {
    inner: MemoryStore<C>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    faults: Arc<Mutex<Faults>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for FakeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> FakeStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            inner: MemoryStore::with_clock(clock),
            calls: Arc::new(Mutex::new(Vec::new())),
            faults: Arc::new(Mutex::new(Faults::default())),
        }
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Count recorded deletes
    pub fn delete_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, StoreCall::Delete { .. }))
            .count()
    }

    /// Count recorded adds
    pub fn add_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, StoreCall::Add { .. }))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Make every call fail with [`StoreError::Unavailable`]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.faults.lock().unwrap_or_else(|e| e.into_inner()).unavailable = unavailable;
    }

    /// Fail the next `count` adds
    pub fn fail_next_adds(&self, count: u32) {
        self.faults.lock().unwrap_or_else(|e| e.into_inner()).failing_adds = count;
    }

    /// Make deletes fail
    pub fn set_failing_deletes(&self, failing: bool) {
        self.faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .failing_deletes = failing;
    }

    /// Write an entry directly, bypassing call recording
    pub fn put(&self, key: &str, value: i64, ttl: Option<Duration>) {
        self.inner.put(key, value, ttl);
    }

    /// Read an entry directly, bypassing call recording and faults
    pub fn peek(&self, key: &str) -> Option<i64> {
        self.inner.get(key).ok().flatten()
    }

    fn record(&self, call: StoreCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.faults.lock().unwrap_or_else(|e| e.into_inner()).unavailable {
            return Err(StoreError::Unavailable("injected outage".to_string()));
        }
        Ok(())
    }
}

impl<C: Clock> RemoteStore for FakeStore<C> {
    fn add(&self, key: &str, value: i64, ttl: Option<Duration>) -> Result<bool, StoreError> {
        self.record(StoreCall::Add {
            key: key.to_string(),
            value,
            ttl,
        });
        self.check_available()?;

        {
            let mut faults = self.faults.lock().unwrap_or_else(|e| e.into_inner());
            if faults.failing_adds > 0 {
                faults.failing_adds -= 1;
                return Err(StoreError::Unavailable("injected add failure".to_string()));
            }
        }

        self.inner.add(key, value, ttl)
    }

    fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        self.record(StoreCall::Get {
            key: key.to_string(),
        });
        self.check_available()?;
        self.inner.get(key)
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.record(StoreCall::Delete {
            key: key.to_string(),
        });
        self.check_available()?;

        if self
            .faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .failing_deletes
        {
            return Err(StoreError::Unavailable("injected delete failure".to_string()));
        }

        self.inner.delete(key)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
