// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-backed store for processes sharing a filesystem
//!
//! Each key is one file. `add` writes a temporary file and links it into
//! place without replacing an existing one, so of several processes adding
//! the same key exactly one succeeds. A file holds `"<value> <evict-at>"`
//! where `evict-at` is an epoch millisecond or `-` for no TTL.
//!
//! Expired and unreadable files are removed by whichever caller next reads
//! them. That read-then-remove is not atomic: a caller can remove a file
//! another process replaced in between, the same weak window as stale lease
//! reclamation.

use latch_core::clock::{Clock, SystemClock};
use latch_core::store::{RemoteStore, StoreError};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

const SUFFIX: &str = ".lease";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Record {
    value: i64,
    evict_at: Option<i64>,
}

impl Record {
    fn encode(&self) -> String {
        match self.evict_at {
            Some(at) => format!("{} {}\n", self.value, at),
            None => format!("{} -\n", self.value),
        }
    }

    fn decode(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let value = parts.next()?.parse().ok()?;
        let evict_at = match parts.next()? {
            "-" => None,
            at => Some(at.parse().ok()?),
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self { value, evict_at })
    }

    fn is_evicted(&self, now: i64) -> bool {
        self.evict_at.is_some_and(|at| at <= now)
    }
}

/// Store keeping one file per key under a directory
#[derive(Clone, Debug)]
pub struct FileStore<C: Clock = SystemClock> {
    dir: PathBuf,
    clock: C,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::with_clock(dir, SystemClock)
    }
}

impl<C: Clock> FileStore<C> {
    pub fn with_clock(dir: impl Into<PathBuf>, clock: C) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, clock })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(file_name(key))
    }

    /// The record under `key`, removing it if its TTL has passed or it
    /// cannot be decoded
    fn read_live(&self, key: &str) -> Result<Option<Record>, StoreError> {
        let path = self.path(key);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                warn!(key, "discarding non-utf8 lease file");
                remove_if_present(&path)?;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let Some(record) = Record::decode(&text) else {
            warn!(key, content = text.trim(), "discarding corrupt lease file");
            remove_if_present(&path)?;
            return Ok(None);
        };

        if record.is_evicted(self.clock.epoch_millis()) {
            remove_if_present(&path)?;
            return Ok(None);
        }
        Ok(Some(record))
    }
}

impl<C: Clock> RemoteStore for FileStore<C> {
    fn add(&self, key: &str, value: i64, ttl: Option<Duration>) -> Result<bool, StoreError> {
        let path = self.path(key);
        let record = Record {
            value,
            evict_at: ttl.map(|ttl| {
                self.clock
                    .epoch_millis()
                    .saturating_add(ttl.as_millis() as i64)
            }),
        };

        // Second round only after removing an expired file
        for _ in 0..2 {
            let mut staged = tempfile::Builder::new()
                .prefix(".tmp-")
                .tempfile_in(&self.dir)?;
            staged.write_all(record.encode().as_bytes())?;
            staged.as_file().sync_all()?;

            match staged.persist_noclobber(&path) {
                Ok(_) => return Ok(true),
                Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                    if self.read_live(key)?.is_some() {
                        return Ok(false);
                    }
                }
                Err(e) => return Err(e.error.into()),
            }
        }
        Ok(false)
    }

    fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.read_live(key)?.map(|record| record.value))
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        remove_if_present(&self.path(key))
    }
}

fn remove_if_present(path: &Path) -> Result<bool, StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// File name for a key: ASCII letters, digits, `-` and `_` kept, every other
/// byte written as `%XX`
fn file_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + SUFFIX.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            name.push(byte as char);
        } else {
            name.push_str(&format!("%{byte:02X}"));
        }
    }
    name.push_str(SUFFIX);
    name
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
