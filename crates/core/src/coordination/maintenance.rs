// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic maintenance for the lock registry
//!
//! The registry only applies idle eviction when it is accessed. A process
//! that stops resolving locks would keep them cached; the sweep keeps the
//! cache honest and reports what it holds.

use super::registry::LockRegistry;
use crate::clock::Clock;
use crate::store::RemoteStore;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for maintenance task
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// How often to run maintenance
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

impl MaintenanceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Statistics about cached locks
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    pub cached: u64,
    /// Locks with a local thread admitted
    pub admitted: usize,
    /// Locks holding their remote lease
    pub leased: usize,
}

impl RegistryStats {
    /// Collect statistics from a registry
    pub fn collect<S: RemoteStore, C: Clock>(registry: &LockRegistry<S, C>) -> Self {
        let mut stats = RegistryStats {
            cached: registry.len(),
            ..Default::default()
        };

        for lock in registry.locks() {
            if lock.is_admitted() {
                stats.admitted += 1;
            }
            if lock.is_acquired() {
                stats.leased += 1;
            }
        }

        stats
    }
}

/// Background maintenance task for the lock registry
#[derive(Clone, Debug)]
pub struct MaintenanceTask {
    config: MaintenanceConfig,
}

impl MaintenanceTask {
    pub fn new(config: MaintenanceConfig) -> Self {
        Self { config }
    }

    /// Run a single maintenance cycle
    pub fn tick<S: RemoteStore, C: Clock>(&self, registry: &LockRegistry<S, C>) -> RegistryStats {
        registry.run_pending_tasks();
        let stats = registry.stats();
        debug!(
            cached = stats.cached,
            admitted = stats.admitted,
            leased = stats.leased,
            "registry maintenance"
        );
        stats
    }

    /// Get the maintenance interval
    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    /// Run [`tick`](Self::tick) every interval on a background thread
    pub fn spawn<S: RemoteStore, C: Clock>(
        self,
        registry: Arc<LockRegistry<S, C>>,
    ) -> std::io::Result<MaintenanceHandle> {
        let (stop, stopped) = mpsc::channel::<()>();

        let thread = thread::Builder::new()
            .name("latch-maintenance".to_string())
            .spawn(move || loop {
                match stopped.recv_timeout(self.config.interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        self.tick(&registry);
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        Ok(MaintenanceHandle {
            stop: Some(stop),
            thread: Some(thread),
        })
    }
}

/// Running maintenance thread; stops when dropped
#[derive(Debug)]
pub struct MaintenanceHandle {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl MaintenanceHandle {
    /// Stop the thread and wait for it to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        drop(self.stop.take());
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("maintenance thread panicked");
            }
        }
    }
}

impl Drop for MaintenanceHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "maintenance_tests.rs"]
mod tests;
