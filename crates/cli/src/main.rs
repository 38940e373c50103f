// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow unwrap in test code
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! latch - run commands under a distributed lock

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{release, run, status};
use latch_adapters::{AnyStore, TracedStore};
use latch_core::Config;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "latch",
    version,
    about = "Latch - distributed locks over a shared store"
)]
struct Cli {
    /// Store holding the leases (memory://, file://<dir>, redis://host:port/db)
    #[arg(long, global = true, env = "LATCH_STORE")]
    store: Option<String>,

    /// Configuration file
    #[arg(long, global = true, env = "LATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command while holding a lock
    Run(run::RunArgs),
    /// Show the remote lease of a lock
    Status(status::StatusArgs),
    /// Delete the remote lease of a lock
    Release(release::ReleaseArgs),
}

fn main() -> ExitCode {
    setup_logging();

    match execute(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let url = cli.store.as_deref().unwrap_or(&config.store.url);
    let store = TracedStore::new(
        AnyStore::open(url).with_context(|| format!("failed to open store {url}"))?,
    );

    match cli.command {
        Commands::Run(args) => run::run(args, &config, store),
        Commands::Status(args) => status::status(args, store),
        Commands::Release(args) => release::release(args, store),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`)
fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
