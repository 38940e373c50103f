// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `latch status --name <name>` - Show the remote lease of a lock

use super::LockArgs;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use latch_core::{Clock, RemoteStore, SystemClock};
use serde::Serialize;
use std::fmt;
use std::process::ExitCode;

#[derive(Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub lock: LockArgs,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaseState {
    Free,
    Held,
    Stale,
}

#[derive(Debug, Serialize)]
pub struct LeaseStatus {
    pub lock: String,
    pub remote_key: String,
    pub state: LeaseState,
    /// Absent for free locks and leases that never expire
    pub expires_at: Option<DateTime<Utc>>,
}

impl LeaseStatus {
    fn read<S: RemoteStore>(lock: &LockArgs, store: &S, now: i64) -> Result<Self> {
        let identity = lock.identity();
        let remote_key = identity.remote_key();
        let expiry = store.get(&remote_key)?;

        let state = match expiry {
            None => LeaseState::Free,
            Some(expiry) if expiry < now => LeaseState::Stale,
            Some(_) => LeaseState::Held,
        };

        Ok(Self {
            lock: identity.to_string(),
            remote_key,
            state,
            expires_at: expiry
                .filter(|&expiry| expiry != i64::MAX)
                .and_then(DateTime::from_timestamp_millis),
        })
    }
}

impl fmt::Display for LeaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.state, self.expires_at) {
            (LeaseState::Free, _) => write!(f, "free"),
            (LeaseState::Held, Some(at)) => write!(f, "held until {}", at.to_rfc3339()),
            (LeaseState::Held, None) => write!(f, "held without expiry"),
            (LeaseState::Stale, Some(at)) => write!(f, "stale since {}", at.to_rfc3339()),
            (LeaseState::Stale, None) => write!(f, "stale"),
        }
    }
}

pub fn status<S: RemoteStore>(args: StatusArgs, store: S) -> Result<ExitCode> {
    let status = LeaseStatus::read(&args.lock, &store, SystemClock.epoch_millis())?;
    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    output::print(&status, format);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
