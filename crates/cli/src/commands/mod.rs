// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod release;
pub mod run;
pub mod status;

use clap::Args;
use latch_core::LockIdentity;

/// Which lock a command addresses
#[derive(Args, Clone, Debug)]
pub struct LockArgs {
    /// Lock name
    #[arg(long)]
    pub name: String,

    /// Lock key within the name
    #[arg(long, default_value = "")]
    pub key: String,
}

impl LockArgs {
    pub fn identity(&self) -> LockIdentity {
        LockIdentity::new(self.name.clone(), self.key.clone())
    }
}
