// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Remote store backends for latch leases

pub mod any;
pub mod file;
pub mod redis;
pub mod traced;

pub use any::AnyStore;
pub use file::FileStore;
pub use crate::redis::RedisStore;
pub use traced::TracedStore;
