// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide registry handing out one shared lock per identity
//!
//! Every caller resolving the same `(name, key)` must get the same
//! [`DistributedLock`], otherwise local admission no longer serializes them.
//! The cache coalesces concurrent first-time resolutions of one identity into
//! a single construction.
//!
//! Entries are evicted when the registry is over capacity or an entry has not
//! been resolved for `idle_timeout`. Eviction does not check whether the lock
//! is held; a held lock that gets evicted and then resolved again yields a
//! second instance for the same identity. The eviction listener logs that case.

use super::descriptor::{LockDescriptor, LockIdentity};
use super::guard::LockError;
use super::lock::DistributedLock;
use super::maintenance::RegistryStats;
use crate::clock::{Clock, SystemClock};
use crate::store::RemoteStore;
use moka::notification::RemovalCause;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Registry sizing and idle eviction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum number of cached locks
    pub capacity: u64,
    /// Evict a lock not resolved for this long
    #[serde(with = "humantime_serde")]
    pub idle_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            idle_timeout: Duration::from_secs(180),
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }
}

/// Shared lock instances keyed by identity
pub struct LockRegistry<S: RemoteStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    config: RegistryConfig,
    locks: Cache<LockIdentity, Arc<DistributedLock<S, C>>>,
}

impl<S: RemoteStore> LockRegistry<S> {
    pub fn new(store: S, config: RegistryConfig) -> Self {
        Self::with_clock(store, SystemClock, config)
    }
}

impl<S: RemoteStore, C: Clock> LockRegistry<S, C> {
    pub fn with_clock(store: S, clock: C, config: RegistryConfig) -> Self {
        let locks = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_idle(config.idle_timeout)
            .eviction_listener(
                |identity: Arc<LockIdentity>,
                 lock: Arc<DistributedLock<S, C>>,
                 cause: RemovalCause| {
                    if lock.is_admitted() {
                        warn!(identity = %identity, ?cause, "evicted a lock that is still held");
                    } else {
                        debug!(identity = %identity, ?cause, "evicted lock");
                    }
                },
            )
            .build();

        Self {
            store,
            clock,
            config,
            locks,
        }
    }

    /// The lock bound to the descriptor's identity, created on first use.
    ///
    /// A newly created lock takes its timeout, expire and error message from
    /// `descriptor`; later descriptors with the same identity get that same
    /// instance unchanged.
    pub fn resolve(&self, descriptor: &LockDescriptor) -> Arc<DistributedLock<S, C>> {
        self.locks.get_with(descriptor.identity().clone(), || {
            debug!(identity = %descriptor.identity(), "creating lock");
            Arc::new(DistributedLock::with_clock(
                descriptor.clone(),
                self.store.clone(),
                self.clock.clone(),
            ))
        })
    }

    /// Resolve, lock, run `f`, release
    pub fn guarded<T>(
        &self,
        descriptor: &LockDescriptor,
        f: impl FnOnce() -> T,
    ) -> Result<T, LockError> {
        self.resolve(descriptor).run(f)
    }

    /// A cached lock, without creating or touching it
    pub fn get(&self, identity: &LockIdentity) -> Option<Arc<DistributedLock<S, C>>> {
        self.locks
            .iter()
            .find(|(cached, _)| cached.as_ref() == identity)
            .map(|(_, lock)| lock)
    }

    /// Approximate number of cached locks
    pub fn len(&self) -> u64 {
        self.locks.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached locks, in no particular order
    pub fn locks(&self) -> impl Iterator<Item = Arc<DistributedLock<S, C>>> + '_ {
        self.locks.iter().map(|(_, lock)| lock)
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats::collect(self)
    }

    /// Apply pending evictions now instead of on the next access
    pub fn run_pending_tasks(&self) {
        self.locks.run_pending_tasks();
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
