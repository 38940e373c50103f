// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Distributed mutual exclusion
//!
//! This module provides:
//! - **LockDescriptor** - Validated identity and timing of one lock
//! - **DistributedLock** - Local admission plus a remote lease, with polling and stale reclaim
//! - **LockGuard** - Scoped acquisition released on drop
//! - **LockRegistry** - One shared lock per identity, with capacity and idle eviction
//! - **MaintenanceTask** - Periodic registry sweep

pub mod descriptor;
pub mod guard;
pub mod lock;
pub mod maintenance;
pub mod registry;

pub use descriptor::{InvalidDescriptor, LockDescriptor, LockIdentity};
pub use guard::{LockError, LockGuard};
pub use lock::{poll_interval, pursuit_budget, DistributedLock, MAX_PURSUIT};
pub use maintenance::{MaintenanceConfig, MaintenanceHandle, MaintenanceTask, RegistryStats};
pub use registry::{LockRegistry, RegistryConfig};
