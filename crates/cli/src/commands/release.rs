// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `latch release --name <name>` - Delete a remote lease
//!
//! For recovering leases left behind by a process that died while holding a
//! lock that never expires. The holder is not notified.

use super::LockArgs;
use anyhow::Result;
use clap::Args;
use latch_core::RemoteStore;
use std::process::ExitCode;

#[derive(Args)]
pub struct ReleaseArgs {
    #[command(flatten)]
    pub lock: LockArgs,
}

pub fn release<S: RemoteStore>(args: ReleaseArgs, store: S) -> Result<ExitCode> {
    let identity = args.lock.identity();
    if store.delete(&identity.remote_key())? {
        tracing::warn!(lock = %identity, "lease force-released");
        println!("released");
    } else {
        println!("not held");
    }
    Ok(ExitCode::SUCCESS)
}
