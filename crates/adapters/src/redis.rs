// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redis store
//!
//! `add` is `SET key value NX [EX ttl]`, which Redis applies atomically.
//!
//! ## Example
//!
//! ```ignore
//! use latch_adapters::RedisStore;
//!
//! let store = RedisStore::open("redis://127.0.0.1:6379/0")?;
//! ```

use latch_core::store::{RemoteStore, StoreError};
use redis::{Client, Commands, Connection, RedisError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Bound on connecting and on each command, so a hung server cannot stall
/// an acquisition past its deadline
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(2);

/// Store backed by a Redis server.
///
/// One connection is kept and reused; it is dropped and reopened after an
/// I/O failure.
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    io_timeout: Duration,
    connection: Arc<Mutex<Option<Connection>>>,
}

impl RedisStore {
    /// Create a store for a `redis://` or `rediss://` URL.
    ///
    /// No connection is made until the first command.
    pub fn open(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url).map_err(unavailable)?;
        Ok(Self {
            client,
            io_timeout: DEFAULT_IO_TIMEOUT,
            connection: Arc::new(Mutex::new(None)),
        })
    }

    pub fn with_io_timeout(mut self, io_timeout: Duration) -> Self {
        self.io_timeout = io_timeout;
        self
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let connection = self
            .client
            .get_connection_with_timeout(self.io_timeout)
            .map_err(unavailable)?;
        connection
            .set_read_timeout(Some(self.io_timeout))
            .map_err(unavailable)?;
        connection
            .set_write_timeout(Some(self.io_timeout))
            .map_err(unavailable)?;
        Ok(connection)
    }

    fn with_connection<T>(
        &self,
        command: impl FnOnce(&mut Connection) -> Result<T, RedisError>,
    ) -> Result<T, StoreError> {
        let mut slot = self.connection.lock().unwrap_or_else(|e| e.into_inner());
        let mut connection = match slot.take() {
            Some(connection) => connection,
            None => self.connect()?,
        };

        let result = command(&mut connection);
        match &result {
            Err(e) if e.is_io_error() || e.is_connection_dropped() || e.is_timeout() => {}
            _ => *slot = Some(connection),
        }
        result.map_err(unavailable)
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("addr", &self.client.get_connection_info().addr)
            .field("io_timeout", &self.io_timeout)
            .finish()
    }
}

impl RemoteStore for RedisStore {
    fn add(&self, key: &str, value: i64, ttl: Option<Duration>) -> Result<bool, StoreError> {
        let mut command = redis::cmd("SET");
        command.arg(key).arg(value).arg("NX");
        if let Some(ttl) = ttl {
            command.arg("EX").arg(ttl.as_secs().max(1));
        }

        let reply: Option<String> = self.with_connection(|c| command.query(c))?;
        Ok(reply.is_some())
    }

    fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let value: Option<String> = self.with_connection(|c| c.get(key))?;
        value
            .map(|value| {
                value.parse::<i64>().map_err(|_| StoreError::Corrupt {
                    key: key.to_string(),
                    value: value.clone(),
                })
            })
            .transpose()
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let removed: i64 = self.with_connection(|c| c.del(key))?;
        Ok(removed > 0)
    }
}

fn unavailable(e: RedisError) -> StoreError {
    StoreError::Unavailable(format!("redis: {e}"))
}

#[cfg(test)]
#[path = "redis_tests.rs"]
mod tests;
