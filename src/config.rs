//! Application configuration management.
//!
//! Settings are merged from several layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config FILE`, or `config.toml` in the platform config directory)
//! 3. `TREEDUPE_*` environment variables (e.g. `TREEDUPE_IO_THREADS=8`)
//! 4. Command-line flags
//!
//! A missing file is not an error. A malformed one is logged and the
//! defaults are used instead.
//!
//! ```toml
//! dir_comparison = true
//! io_threads = 8
//! on_read_error = "best-effort"
//! full_fingerprints = false
//! progress = true
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, OnReadError};
use crate::duplicates::DEFAULT_IO_THREADS;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "TREEDUPE_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Compare directories as well as files
    pub dir_comparison: bool,
    /// Number of hashing threads
    pub io_threads: usize,
    /// Handling of unreadable files
    pub on_read_error: OnReadError,
    /// Print full fingerprints in the text report
    pub full_fingerprints: bool,
    /// Draw progress bars on stderr
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dir_comparison: false,
            io_threads: DEFAULT_IO_THREADS,
            on_read_error: OnReadError::Skip,
            full_fingerprints: false,
            progress: true,
        }
    }
}

impl Config {
    /// Load the configuration, falling back to defaults on any failure.
    ///
    /// Uses `explicit` when given, otherwise the platform default path.
    #[must_use]
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = explicit.map(Path::to_path_buf).or_else(Self::default_path);
        match Self::load_layers(path.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring configuration, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load the configuration from a specific file plus environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if an
    /// environment override has the wrong type.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_layers(Some(path.as_ref()))
    }

    fn load_layers(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            log::debug!("Reading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        let mut config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .context("invalid configuration")?;
        config.io_threads = config.io_threads.max(1);
        Ok(config)
    }

    /// Apply explicit command-line flags on top of the loaded values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.dir_comparison {
            self.dir_comparison = true;
        }
        if let Some(threads) = cli.io_threads {
            self.io_threads = threads.max(1);
        }
        if let Some(policy) = cli.on_read_error {
            self.on_read_error = policy;
        }
        if cli.full_fingerprints {
            self.full_fingerprints = true;
        }
        if cli.no_progress {
            self.progress = false;
        }
    }

    /// Platform-specific default configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "treedupe", "treedupe")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
