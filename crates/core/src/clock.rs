// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling
//!
//! Lease timestamps are wall-clock epoch milliseconds because they are
//! compared across hosts. Local deadlines use `std::time::Instant` directly.

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A clock that provides the current wall-clock time
pub trait Clock: Clone + Send + Sync + 'static {
    /// Milliseconds since the Unix epoch
    fn epoch_millis(&self) -> i64;
}

/// Real system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Fake clock for testing with controllable time
#[derive(Clone, Debug)]
pub struct FakeClock {
    current: Arc<Mutex<i64>>,
}

impl FakeClock {
    /// Start at the current system time
    pub fn new() -> Self {
        Self::at(SystemClock.epoch_millis())
    }

    /// Start at a specific epoch millisecond
    pub fn at(epoch_millis: i64) -> Self {
        Self {
            current: Arc::new(Mutex::new(epoch_millis)),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = current.saturating_add(duration.as_millis() as i64);
    }

    /// Move the clock back by the given duration
    pub fn rewind(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = current.saturating_sub(duration.as_millis() as i64);
    }

    /// Set the clock to a specific epoch millisecond
    pub fn set(&self, epoch_millis: i64) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = epoch_millis;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn epoch_millis(&self) -> i64 {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
