// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distributed lock over a shared [`RemoteStore`]
//!
//! Two gates protect a section: a local admission slot, held by at most one
//! thread of this process per identity, and a remote lease, held by at most
//! one process. Both live under a single mutex + condition variable. The
//! admitted thread polls the store until it takes the lease, the deadline
//! passes or a cancel is requested.
//!
//! Stale lease reclamation (`get`, compare with now, `delete`, `add`) is not
//! atomic. Two contenders can both judge a lease stale and both delete it;
//! only one of them wins the following `add`. Hosts are assumed to have
//! loosely synchronized clocks.

use super::descriptor::{LockDescriptor, LockIdentity};
use crate::clock::{Clock, SystemClock};
use crate::store::RemoteStore;
use std::collections::HashMap;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Absolute ceiling on how long one `acquire()` may run, whatever its timeout
pub const MAX_PURSUIT: Duration = Duration::from_millis(600_000);

/// Delay between lease attempts for a given timeout.
///
/// Long timeouts poll every `floor(sqrt(timeout_s))` seconds to keep pressure
/// off the store; short ones poll twice per timeout.
pub fn poll_interval(timeout_ms: i64) -> Duration {
    let timeout_ms = timeout_ms.max(1) as u64;
    if timeout_ms >= 4_000 {
        let secs = ((timeout_ms / 1_000) as f64).sqrt().floor() as u64;
        Duration::from_millis(secs * 1_000)
    } else {
        let half = timeout_ms / 2;
        Duration::from_millis(if half == 0 { timeout_ms } else { half })
    }
}

/// How long one `acquire()` may run for a given timeout
pub fn pursuit_budget(timeout: Duration) -> Duration {
    timeout.min(MAX_PURSUIT)
}

#[derive(Debug, Default)]
struct LockState {
    /// Thread holding the admission slot
    admitted: Option<ThreadId>,
    /// Refused nested acquires by the admitted thread still awaiting release
    nested: u32,
    /// Threads whose admission timed out, with releases still to come
    refused: HashMap<ThreadId, u32>,
    /// The admitted thread holds the remote lease
    acquired: bool,
    cancel_requested: bool,
}

/// Lock bound to one [`LockIdentity`] for as long as it is cached
pub struct DistributedLock<S: RemoteStore, C: Clock = SystemClock> {
    descriptor: LockDescriptor,
    remote_key: String,
    store: S,
    clock: C,
    state: Mutex<LockState>,
    signal: Condvar,
}

impl<S: RemoteStore> DistributedLock<S> {
    pub fn new(descriptor: LockDescriptor, store: S) -> Self {
        Self::with_clock(descriptor, store, SystemClock)
    }
}

impl<S: RemoteStore, C: Clock> DistributedLock<S, C> {
    pub fn with_clock(descriptor: LockDescriptor, store: S, clock: C) -> Self {
        let remote_key = descriptor.identity().remote_key();
        Self {
            descriptor,
            remote_key,
            store,
            clock,
            state: Mutex::new(LockState::default()),
            signal: Condvar::new(),
        }
    }

    pub fn descriptor(&self) -> &LockDescriptor {
        &self.descriptor
    }

    pub fn identity(&self) -> &LockIdentity {
        self.descriptor.identity()
    }

    pub fn remote_key(&self) -> &str {
        &self.remote_key
    }

    /// Whether some local thread holds the admission slot
    pub fn is_admitted(&self) -> bool {
        self.state().admitted.is_some()
    }

    /// Whether the remote lease is held by this process
    pub fn is_acquired(&self) -> bool {
        self.state().acquired
    }

    /// Try to take the lock within the descriptor's timeout.
    ///
    /// Returns `false` when the lock was not obtained: admission timed out,
    /// the lease stayed taken until the deadline, or `cancel()` was called.
    /// Store failures count as failed attempts. The caller must call
    /// [`release`](Self::release) afterwards whatever the outcome.
    ///
    /// A nested call from the thread that already holds the lock returns
    /// `false` straight away; its paired `release()` leaves the outer hold
    /// in place.
    ///
    /// The deadline is checked between store calls, not during them, so a
    /// slow store can stretch a call by up to one store round trip.
    pub fn acquire(&self) -> bool {
        let started = Instant::now();
        let deadline = started + pursuit_budget(self.descriptor.timeout());
        let me = thread::current().id();

        let mut state = self.state();
        loop {
            match state.admitted {
                None => break,
                Some(owner) if owner == me => {
                    state.nested += 1;
                    warn!(
                        name = self.descriptor.name(),
                        key = self.descriptor.key(),
                        "acquire called again by the admitted thread"
                    );
                    return false;
                }
                Some(_) => {}
            }

            let now = Instant::now();
            if now >= deadline {
                debug!(
                    name = self.descriptor.name(),
                    key = self.descriptor.key(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "admission timed out"
                );
                *state.refused.entry(me).or_default() += 1;
                return false;
            }
            state = self.wait(state, deadline - now);
        }

        state.admitted = Some(me);
        state.nested = 0;
        state.acquired = false;
        trace!(name = self.descriptor.name(), key = self.descriptor.key(), "admitted");

        let taken = self.poll(state, started, deadline);
        self.signal.notify_all();
        taken
    }

    /// Give up the lease (if held) and the admission slot (if held by the
    /// calling thread).
    ///
    /// After a refused nested `acquire()` this only undoes that nested call.
    ///
    /// A failed remote delete is logged and otherwise ignored: the lease then
    /// lapses on its own and the local slot is freed regardless. Calling this
    /// from a thread that is not admitted does nothing.
    pub fn release(&self) {
        let me = thread::current().id();
        let mut state = self.state();

        if state.admitted != Some(me) {
            let paired = match state.refused.get(&me).copied() {
                Some(pending) if pending > 1 => {
                    state.refused.insert(me, pending - 1);
                    true
                }
                Some(_) => {
                    state.refused.remove(&me);
                    true
                }
                None => false,
            };
            if !paired && state.admitted.is_some() {
                // Admission belongs to another thread and stays taken
                warn!(
                    name = self.descriptor.name(),
                    key = self.descriptor.key(),
                    "release from a thread that is not admitted, ignored"
                );
            } else {
                trace!(
                    name = self.descriptor.name(),
                    key = self.descriptor.key(),
                    "release without admission"
                );
            }
            return;
        }

        if state.nested > 0 {
            state.nested -= 1;
            return;
        }

        if state.acquired {
            // Admission is still ours, so nobody else touches the lease here
            drop(state);
            match self.store.delete(&self.remote_key) {
                Ok(true) => debug!(remote_key = %self.remote_key, "lease released"),
                Ok(false) => warn!(remote_key = %self.remote_key, "lease was already gone"),
                Err(e) => warn!(
                    remote_key = %self.remote_key,
                    error = %e,
                    "failed to delete lease, leaving it to expire"
                ),
            }
            state = self.state();
            state.acquired = false;
        }

        state.cancel_requested = false;
        state.admitted = None;
        drop(state);
        self.signal.notify_all();
    }

    /// Ask the thread pursuing this lock to give up.
    ///
    /// A thread waiting between attempts wakes immediately. An attempt already
    /// in flight is not interrupted; if it takes the lease, `acquire()` still
    /// returns `true` and the caller releases as usual.
    pub fn cancel(&self) {
        self.state().cancel_requested = true;
        self.signal.notify_all();
        info!(
            name = self.descriptor.name(),
            key = self.descriptor.key(),
            "cancel requested"
        );
    }

    fn poll<'a>(
        &'a self,
        mut state: MutexGuard<'a, LockState>,
        started: Instant,
        deadline: Instant,
    ) -> bool {
        let interval = poll_interval(self.descriptor.timeout_ms());

        loop {
            if state.cancel_requested {
                info!(
                    name = self.descriptor.name(),
                    key = self.descriptor.key(),
                    "acquisition cancelled"
                );
                return false;
            }

            let now = Instant::now();
            if now >= deadline {
                info!(
                    name = self.descriptor.name(),
                    key = self.descriptor.key(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "gave up waiting for lease"
                );
                return false;
            }

            drop(state);
            let taken = self.attempt(deadline);
            state = self.state();

            if taken {
                state.acquired = true;
                debug!(
                    remote_key = %self.remote_key,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "lease acquired"
                );
                return true;
            }
            if state.cancel_requested {
                continue;
            }

            let wait = interval.min(deadline.saturating_duration_since(Instant::now()));
            state = self.wait(state, wait);
        }
    }

    /// One round against the store: reclaim a stale lease, then try to add ours
    fn attempt(&self, deadline: Instant) -> bool {
        let now = self.clock.epoch_millis();

        match self.store.get(&self.remote_key) {
            Ok(Some(expires_at)) if expires_at < now => {
                warn!(
                    remote_key = %self.remote_key,
                    expired_ms_ago = now - expires_at,
                    "reclaiming stale lease"
                );
                if let Err(e) = self.store.delete(&self.remote_key) {
                    warn!(remote_key = %self.remote_key, error = %e, "stale lease delete failed");
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(remote_key = %self.remote_key, error = %e, "lease lookup failed");
                return false;
            }
        }
        if Instant::now() >= deadline {
            return false;
        }

        let expires_at = self.descriptor.lease_expiry(self.clock.epoch_millis());
        match self
            .store
            .add(&self.remote_key, expires_at, self.descriptor.lease_ttl())
        {
            Ok(taken) => {
                if !taken {
                    trace!(remote_key = %self.remote_key, "lease held elsewhere");
                }
                taken
            }
            Err(e) => {
                warn!(remote_key = %self.remote_key, error = %e, "lease add failed");
                false
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wait<'a>(
        &self,
        state: MutexGuard<'a, LockState>,
        timeout: Duration,
    ) -> MutexGuard<'a, LockState> {
        match self.signal.wait_timeout(state, timeout) {
            Ok((state, _)) => state,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }
}

impl<S: RemoteStore, C: Clock> std::fmt::Debug for DistributedLock<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("DistributedLock")
            .field("identity", self.descriptor.identity())
            .field("remote_key", &self.remote_key)
            .field("admitted", &state.admitted.is_some())
            .field("acquired", &state.acquired)
            .field("cancel_requested", &state.cancel_requested)
            .finish()
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
