// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process store honoring TTLs against a [`Clock`]

use super::{RemoteStore, StoreError};
use crate::clock::{Clock, SystemClock};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Copy, Debug)]
struct Entry {
    value: i64,
    /// Epoch ms after which the store forgets the entry
    evict_at: Option<i64>,
}

/// Thread-safe in-memory store.
///
/// Clones share the same entries, so every lock in a process (or every
/// simulated process in a test) sees one store.
#[derive(Clone, Debug)]
pub struct MemoryStore<C: Clock = SystemClock> {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    clock: C,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// Write an entry unconditionally, bypassing `add` semantics
    pub fn put(&self, key: &str, value: i64, ttl: Option<Duration>) {
        let evict_at = self.evict_at(ttl);
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), Entry { value, evict_at });
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = self.clock.epoch_millis();
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|entry| !entry.is_evicted(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_at(&self, ttl: Option<Duration>) -> Option<i64> {
        ttl.map(|ttl| {
            self.clock
                .epoch_millis()
                .saturating_add(ttl.as_millis() as i64)
        })
    }
}

impl Entry {
    fn is_evicted(&self, now: i64) -> bool {
        self.evict_at.is_some_and(|at| at <= now)
    }
}

impl<C: Clock> RemoteStore for MemoryStore<C> {
    fn add(&self, key: &str, value: i64, ttl: Option<Duration>) -> Result<bool, StoreError> {
        let now = self.clock.epoch_millis();
        let evict_at = self.evict_at(ttl);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        if entries.get(key).is_some_and(|entry| !entry.is_evicted(now)) {
            return Ok(false);
        }

        entries.insert(key.to_string(), Entry { value, evict_at });
        Ok(true)
    }

    fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let now = self.clock.epoch_millis();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get(key) {
            Some(entry) if entry.is_evicted(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value)),
            None => Ok(None),
        }
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let now = self.clock.epoch_millis();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        Ok(entries
            .remove(key)
            .is_some_and(|entry| !entry.is_evicted(now)))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
