// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `latch run --name <name> -- <command>` - Run a command under a lock

use super::LockArgs;
use anyhow::{Context, Result};
use clap::Args;
use latch_core::{Config, LockDefaults, LockDescriptor, LockRegistry, RemoteStore};
use std::process::{Command, ExitCode};
use std::time::Duration;

/// Exit status when the lock is not obtained (EX_TEMPFAIL)
pub const EXIT_NOT_OBTAINED: u8 = 75;

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub lock: LockArgs,

    /// How long to wait for the lock (e.g. "5s", "500ms")
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Lease lifetime; "0s" holds the lease until released
    #[arg(long, value_parser = humantime::parse_duration)]
    pub expire: Option<Duration>,

    /// Message printed when the lock is not obtained
    #[arg(long)]
    pub message: Option<String>,

    /// Command to run
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl RunArgs {
    /// Flags over the configured defaults
    fn defaults(&self, config: &Config) -> LockDefaults {
        let mut defaults = config.defaults.clone();
        if let Some(timeout) = self.timeout {
            defaults.timeout = timeout;
        }
        if let Some(expire) = self.expire {
            defaults.expire = expire;
        }
        if let Some(message) = &self.message {
            defaults.error_message = message.clone();
        }
        defaults
    }

    fn descriptor(&self, config: &Config) -> Result<LockDescriptor> {
        let descriptor = self
            .defaults(config)
            .descriptor(self.lock.name.clone(), self.lock.key.clone())?;
        Ok(descriptor)
    }
}

pub fn run<S: RemoteStore>(args: RunArgs, config: &Config, store: S) -> Result<ExitCode> {
    let descriptor = args.descriptor(config)?;
    let registry = LockRegistry::new(store, config.registry.clone());
    let lock = registry.resolve(&descriptor);

    let guard = match lock.try_lock() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(ExitCode::from(EXIT_NOT_OBTAINED));
        }
    };

    let (program, rest) = args
        .command
        .split_first()
        .context("no command given")?;
    tracing::info!(lock = %descriptor.identity(), program = %program, "running");

    let status = Command::new(program)
        .args(rest)
        .status()
        .with_context(|| format!("failed to run {program}"))?;
    drop(guard);

    let code = status.code().unwrap_or(1);
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
