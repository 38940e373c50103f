// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! latch-core: distributed locks over a shared key-value store
//!
//! This crate provides:
//! - Lock descriptors and the lease acquisition protocol
//! - A registry that shares one lock object per identity within a process
//! - The remote store contract, with an in-memory implementation
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod coordination;
pub mod store;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{Config, ConfigError, LockDefaults, StoreConfig};
pub use coordination::{
    DistributedLock, InvalidDescriptor, LockDescriptor, LockError, LockGuard, LockIdentity,
    LockRegistry, MaintenanceConfig, MaintenanceHandle, MaintenanceTask, RegistryConfig,
    RegistryStats,
};
pub use store::{MemoryStore, RemoteStore, StoreError};

#[cfg(any(test, feature = "test-support"))]
pub use store::{FakeStore, StoreCall};
