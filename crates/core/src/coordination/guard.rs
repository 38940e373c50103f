// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped acquisition: release on every exit path

use super::descriptor::LockIdentity;
use super::lock::DistributedLock;
use crate::clock::Clock;
use crate::store::RemoteStore;
use std::marker::PhantomData;
use thiserror::Error;

/// Failure to enter a guarded section
#[derive(Debug, Error)]
pub enum LockError {
    /// The lock was not obtained; carries the descriptor's error message
    #[error("{message}")]
    NotObtained {
        identity: LockIdentity,
        message: String,
    },
}

/// Proof that the calling thread holds a [`DistributedLock`].
///
/// Dropping the guard releases the lease and the admission slot. The guard
/// cannot leave the thread that acquired it.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LockGuard<'a, S: RemoteStore, C: Clock> {
    lock: &'a DistributedLock<S, C>,
    _not_send: PhantomData<*const ()>,
}

impl<S: RemoteStore, C: Clock> LockGuard<'_, S, C> {
    pub fn lock(&self) -> &DistributedLock<S, C> {
        self.lock
    }
}

impl<S: RemoteStore, C: Clock> Drop for LockGuard<'_, S, C> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

impl<S: RemoteStore, C: Clock> std::fmt::Debug for LockGuard<'_, S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard")
            .field("identity", self.lock.identity())
            .finish()
    }
}

impl<S: RemoteStore, C: Clock> DistributedLock<S, C> {
    /// Acquire and return a guard, or the descriptor's error message.
    ///
    /// On failure the paired release happens before returning.
    pub fn try_lock(&self) -> Result<LockGuard<'_, S, C>, LockError> {
        if self.acquire() {
            Ok(LockGuard {
                lock: self,
                _not_send: PhantomData,
            })
        } else {
            self.release();
            Err(self.not_obtained())
        }
    }

    /// Run `f` while holding the lock
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> Result<T, LockError> {
        let _guard = self.try_lock()?;
        Ok(f())
    }

    fn not_obtained(&self) -> LockError {
        LockError::NotObtained {
            identity: self.identity().clone(),
            message: self.descriptor().error_message().to_string(),
        }
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
