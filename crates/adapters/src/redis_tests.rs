// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

/// Server for live tests, e.g. `LATCH_TEST_REDIS=redis://127.0.0.1:6379/15`
fn test_server() -> Option<String> {
    std::env::var("LATCH_TEST_REDIS").ok()
}

#[test]
fn invalid_url_is_rejected() {
    let err = RedisStore::open("not a url").unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
}

#[test]
fn unreachable_server_is_unavailable() {
    let store = RedisStore::open("redis://127.0.0.1:1/")
        .unwrap()
        .with_io_timeout(Duration::from_millis(200));

    let err = store.get("job42").unwrap_err();

    assert!(err.to_string().starts_with("store unavailable: redis"), "{err}");
}

#[test]
fn live_server_add_get_delete() {
    let Some(url) = test_server() else {
        eprintln!("Skipping: LATCH_TEST_REDIS not set");
        return;
    };
    let store = RedisStore::open(&url).unwrap();
    let key = format!("latch-test-{}", std::process::id());
    store.delete(&key).unwrap();

    assert!(store.add(&key, 1_000, Some(Duration::from_secs(30))).unwrap());
    assert!(!store.add(&key, 2_000, None).unwrap());
    assert_eq!(store.get(&key).unwrap(), Some(1_000));
    assert!(store.delete(&key).unwrap());
    assert!(!store.delete(&key).unwrap());
    assert_eq!(store.get(&key).unwrap(), None);
}
