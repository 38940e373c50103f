// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::{Clock, SystemClock};
use crate::coordination::descriptor::LockDescriptor;
use crate::store::FakeStore;
use std::panic::{catch_unwind, AssertUnwindSafe};

fn lock(store: &FakeStore, timeout_ms: i64) -> DistributedLock<FakeStore> {
    let descriptor = LockDescriptor::new("job", "42", timeout_ms, 10_000, "busy").unwrap();
    DistributedLock::new(descriptor, store.clone())
}

#[test]
fn guard_releases_on_drop() {
    let store = FakeStore::new();
    let lock = lock(&store, 1_000);

    {
        let guard = lock.try_lock().unwrap();
        assert!(guard.lock().is_acquired());
        assert!(store.peek("job42").is_some());
    }

    assert!(!lock.is_admitted());
    assert_eq!(store.peek("job42"), None);
}

#[test]
fn failure_carries_error_message_and_frees_admission() {
    let store = FakeStore::new();
    store.put("job42", SystemClock.epoch_millis() + 60_000, None);
    let lock = lock(&store, 100);

    let err = lock.try_lock().unwrap_err();

    assert_eq!(err.to_string(), "busy");
    assert!(matches!(
        err,
        LockError::NotObtained { ref identity, .. } if identity.name == "job" && identity.key == "42"
    ));
    assert!(!lock.is_admitted());
    assert_eq!(store.delete_count(), 0);
}

#[test]
fn nested_try_lock_fails_but_keeps_outer_guard() {
    let store = FakeStore::new();
    let lock = lock(&store, 1_000);

    let outer = lock.try_lock().unwrap();
    assert!(lock.try_lock().is_err());
    assert!(lock.is_acquired());
    assert!(store.peek("job42").is_some());

    assert!(lock.is_admitted());

    drop(outer);
    assert_eq!(store.peek("job42"), None);
    assert!(!lock.is_admitted());
}

#[test]
fn run_returns_section_result() {
    let store = FakeStore::new();
    let lock = lock(&store, 1_000);

    let value = lock.run(|| 6 * 7).unwrap();

    assert_eq!(value, 42);
    assert!(!lock.is_admitted());
}

#[test]
fn panic_inside_section_still_releases() {
    let store = FakeStore::new();
    let lock = lock(&store, 1_000);

    let result = catch_unwind(AssertUnwindSafe(|| {
        let _ = lock.run(|| panic!("section failed"));
    }));

    assert!(result.is_err());
    assert!(!lock.is_admitted());
    assert_eq!(store.peek("job42"), None);
}
