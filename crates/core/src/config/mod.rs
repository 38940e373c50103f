// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration file
//!
//! ```toml
//! [store]
//! url = "file:///var/lib/latch"
//!
//! [registry]
//! capacity = 1024
//! idle_timeout = "180s"
//!
//! [defaults]
//! timeout = "5s"
//! expire = "30s"
//! error_message = "lock is held by another process"
//! ```
//!
//! Every section and field is optional.

use crate::coordination::{InvalidDescriptor, LockDescriptor, RegistryConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub store: StoreConfig,
    pub registry: RegistryConfig,
    pub defaults: LockDefaults,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

/// Where leases are kept
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// `memory://`, `file://<dir>` or `redis://host:port/db`
    pub url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "memory://".to_string(),
        }
    }
}

/// Parameters for locks whose caller does not specify them
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockDefaults {
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// `0s` takes leases that never expire
    #[serde(with = "humantime_serde")]
    pub expire: Duration,
    pub error_message: String,
}

impl Default for LockDefaults {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            expire: Duration::from_secs(30),
            error_message: "lock is held by another process".to_string(),
        }
    }
}

impl LockDefaults {
    /// Descriptor for `(name, key)` using these defaults
    pub fn descriptor(
        &self,
        name: impl Into<String>,
        key: impl Into<String>,
    ) -> Result<LockDescriptor, InvalidDescriptor> {
        LockDescriptor::new(
            name,
            key,
            millis(self.timeout),
            millis(self.expire),
            self.error_message.clone(),
        )
    }
}

/// Duration as whole milliseconds, saturating
pub fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
