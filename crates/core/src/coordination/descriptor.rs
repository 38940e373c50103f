// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock identity and parameters
//!
//! A [`LockDescriptor`] is produced by whatever layer decides that a section
//! must run under a lock. It is validated once, at construction, and never
//! changes afterwards.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Rejected descriptor construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDescriptor {
    #[error("lock name must not be empty")]
    EmptyName,
    #[error("lock error message must not be empty")]
    EmptyErrorMessage,
    #[error("lock timeout must be positive, got {0}ms")]
    NonPositiveTimeout(i64),
    #[error("lock expire must not be negative, got {0}ms")]
    NegativeExpire(i64),
}

/// The `(name, key)` pair denoting one logical lock
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LockIdentity {
    pub name: String,
    pub key: String,
}

impl LockIdentity {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }

    /// Key used against the remote store
    pub fn remote_key(&self) -> String {
        format!("{}{}", self.name, self.key)
    }
}

impl fmt::Display for LockIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}[{}]", self.name, self.key)
        }
    }
}

/// Validated lock parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockDescriptor {
    identity: LockIdentity,
    timeout_ms: i64,
    expire_ms: i64,
    error_message: String,
}

impl LockDescriptor {
    /// Build a descriptor, rejecting any value that breaks an invariant.
    ///
    /// `timeout_ms` bounds how long one `acquire()` may pursue the lock.
    /// `expire_ms` is the lease lifetime; `0` means the lease never expires
    /// and is only freed by an explicit release.
    pub fn new(
        name: impl Into<String>,
        key: impl Into<String>,
        timeout_ms: i64,
        expire_ms: i64,
        error_message: impl Into<String>,
    ) -> Result<Self, InvalidDescriptor> {
        let name = name.into();
        let error_message = error_message.into();

        if name.is_empty() {
            return Err(InvalidDescriptor::EmptyName);
        }
        if error_message.is_empty() {
            return Err(InvalidDescriptor::EmptyErrorMessage);
        }
        if timeout_ms <= 0 {
            return Err(InvalidDescriptor::NonPositiveTimeout(timeout_ms));
        }
        if expire_ms < 0 {
            return Err(InvalidDescriptor::NegativeExpire(expire_ms));
        }

        Ok(Self {
            identity: LockIdentity::new(name, key),
            timeout_ms,
            expire_ms,
            error_message,
        })
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn key(&self) -> &str {
        &self.identity.key
    }

    pub fn identity(&self) -> &LockIdentity {
        &self.identity
    }

    pub fn timeout_ms(&self) -> i64 {
        self.timeout_ms
    }

    pub fn expire_ms(&self) -> i64 {
        self.expire_ms
    }

    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms as u64)
    }

    /// Whether leases taken with this descriptor ever expire
    pub fn expires(&self) -> bool {
        self.expire_ms > 0
    }

    /// Store-side TTL: whole seconds, rounded up so short leases still expire
    pub fn lease_ttl(&self) -> Option<Duration> {
        if !self.expires() {
            return None;
        }
        let secs = (self.expire_ms as u64).div_ceil(1_000);
        Some(Duration::from_secs(secs))
    }

    /// Expiry timestamp recorded in the store for a lease taken at `now`
    pub fn lease_expiry(&self, now_epoch_ms: i64) -> i64 {
        if self.expires() {
            now_epoch_ms.saturating_add(self.expire_ms)
        } else {
            i64::MAX
        }
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
