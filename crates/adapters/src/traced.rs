// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrapper for consistent observability

use latch_core::store::{RemoteStore, StoreError};
use std::time::{Duration, Instant};

/// Wrapper that adds tracing to any RemoteStore
#[derive(Clone, Debug)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: RemoteStore> RemoteStore for TracedStore<S> {
    fn add(&self, key: &str, value: i64, ttl: Option<Duration>) -> Result<bool, StoreError> {
        let span = tracing::debug_span!("store.add", key, value);
        let _guard = span.enter();

        let start = Instant::now();
        let result = self.inner.add(key, value, ttl);
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(true) => tracing::debug!(
                elapsed_ms,
                ttl_s = ttl.map(|ttl| ttl.as_secs()),
                "added"
            ),
            Ok(false) => tracing::debug!(elapsed_ms, "key present"),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "add failed"),
        }

        result
    }

    fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let result = self.inner.get(key);
        match &result {
            Ok(value) => tracing::trace!(key, value = ?value, "read"),
            Err(e) => tracing::error!(key, error = %e, "get failed"),
        }
        result
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let span = tracing::debug_span!("store.delete", key);
        let _guard = span.enter();

        let result = self.inner.delete(key);
        // Deleting an absent key is normal after expiry
        match &result {
            Ok(removed) => tracing::debug!(removed, "deleted"),
            Err(e) => tracing::warn!(error = %e, "delete failed"),
        }

        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
