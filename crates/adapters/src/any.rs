// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store selection from a URL

use crate::file::FileStore;
use crate::redis::RedisStore;
use latch_core::store::{MemoryStore, RemoteStore, StoreError};
use std::time::Duration;

/// Any of the supported stores, chosen at runtime
#[derive(Clone, Debug)]
pub enum AnyStore {
    Memory(MemoryStore),
    File(FileStore),
    Redis(RedisStore),
}

impl AnyStore {
    /// Open the store named by `url`:
    /// - `memory://` - private to this process
    /// - `file://<dir>` - shared through a directory
    /// - `redis://...`, `rediss://...`, `redis+unix://...` - shared through Redis
    pub fn open(url: &str) -> Result<Self, StoreError> {
        if url == "memory://" || url == "memory:" {
            return Ok(Self::Memory(MemoryStore::new()));
        }
        if let Some(dir) = url.strip_prefix("file://") {
            if dir.is_empty() {
                return Err(StoreError::Unavailable(
                    "file store url needs a directory, e.g. file:///var/lib/latch".to_string(),
                ));
            }
            return Ok(Self::File(FileStore::open(dir)?));
        }
        if ["redis://", "rediss://", "redis+unix://"]
            .iter()
            .any(|scheme| url.starts_with(scheme))
        {
            return Ok(Self::Redis(RedisStore::open(url)?));
        }
        Err(StoreError::Unavailable(format!("unsupported store url: {url}")))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::File(_) => "file",
            Self::Redis(_) => "redis",
        }
    }
}

impl RemoteStore for AnyStore {
    fn add(&self, key: &str, value: i64, ttl: Option<Duration>) -> Result<bool, StoreError> {
        match self {
            Self::Memory(store) => store.add(key, value, ttl),
            Self::File(store) => store.add(key, value, ttl),
            Self::Redis(store) => store.add(key, value, ttl),
        }
    }

    fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        match self {
            Self::Memory(store) => store.get(key),
            Self::File(store) => store.get(key),
            Self::Redis(store) => store.get(key),
        }
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        match self {
            Self::Memory(store) => store.delete(key),
            Self::File(store) => store.delete(key),
            Self::Redis(store) => store.delete(key),
        }
    }
}

#[cfg(test)]
#[path = "any_tests.rs"]
mod tests;
