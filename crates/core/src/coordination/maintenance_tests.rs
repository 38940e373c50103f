// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::coordination::descriptor::{LockDescriptor, LockIdentity};
use crate::coordination::registry::RegistryConfig;
use crate::store::MemoryStore;

fn descriptor(key: &str) -> LockDescriptor {
    LockDescriptor::new("job", key, 1_000, 10_000, "busy").unwrap()
}

#[test]
fn config_builder() {
    let config = MaintenanceConfig::new().with_interval(Duration::from_secs(5));
    assert_eq!(config.interval, Duration::from_secs(5));
    assert_eq!(MaintenanceConfig::default().interval, Duration::from_secs(30));
}

#[test]
fn stats_count_admitted_and_leased_locks() {
    let registry = LockRegistry::new(MemoryStore::new(), RegistryConfig::default());
    let held = registry.resolve(&descriptor("1"));
    registry.resolve(&descriptor("2"));
    registry.resolve(&descriptor("3"));
    assert!(held.acquire());

    let stats = MaintenanceTask::new(MaintenanceConfig::default()).tick(&registry);

    assert_eq!(
        stats,
        RegistryStats {
            cached: 3,
            admitted: 1,
            leased: 1,
        }
    );
    held.release();
}

#[test]
fn tick_applies_idle_eviction() {
    let config = RegistryConfig::new().with_idle_timeout(Duration::from_millis(50));
    let registry = LockRegistry::new(MemoryStore::new(), config);
    registry.resolve(&descriptor("1"));

    std::thread::sleep(Duration::from_millis(150));
    let stats = MaintenanceTask::new(MaintenanceConfig::default()).tick(&registry);

    assert_eq!(stats.cached, 0);
}

#[test]
fn background_sweep_evicts_and_stops() {
    let config = RegistryConfig::new().with_idle_timeout(Duration::from_millis(50));
    let registry = Arc::new(LockRegistry::new(MemoryStore::new(), config));
    registry.resolve(&descriptor("1"));

    let task = MaintenanceTask::new(MaintenanceConfig::new().with_interval(Duration::from_millis(20)));
    let handle = task.spawn(registry.clone()).unwrap();

    std::thread::sleep(Duration::from_millis(300));
    assert!(registry.get(&LockIdentity::new("job", "1")).is_none());
    assert_eq!(registry.len(), 0);

    handle.stop();
}

#[test]
fn dropping_handle_stops_thread() {
    let registry = Arc::new(LockRegistry::new(MemoryStore::new(), RegistryConfig::default()));
    let task = MaintenanceTask::new(MaintenanceConfig::new().with_interval(Duration::from_secs(3600)));

    let handle = task.spawn(registry.clone()).unwrap();
    drop(handle);

    assert_eq!(Arc::strong_count(&registry), 1);
}
