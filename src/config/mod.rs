//! Configuration management for the demo server
//!
//! Settings are layered (lowest to highest priority):
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables
//!
//! # Usage
//!
//! ```no_run
//! use c2pa_demo::config::Config;
//!
//! let config = Config::load(None).expect("Failed to load configuration");
//! println!("Signed images go to: {}", config.storage.signed_dir.display());
//! ```
//!
//! # Environment Variables
//!
//! Any key can be overridden with `C2PA_DEMO__<section>__<key>`:
//! - `C2PA_DEMO__SERVER__PUBLIC_URL=https://demo.example.com`
//! - `C2PA_DEMO__STORAGE__SCRATCH_TTL_SECS=120`
//! - `C2PA_DEMO__TOOL__PROGRAM=/usr/local/bin/c2patool`
//!
//! # Configuration File
//!
//! Loaded from `config/c2pa-demo.toml` unless `--config` or the
//! `C2PA_DEMO_CONFIG` environment variable points elsewhere.

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{Config, ServerConfig, StorageConfig, ToolConfig};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// `path` overrides the file location; otherwise `C2PA_DEMO_CONFIG`
    /// or `config/c2pa-demo.toml` is used.
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path without reading `.env`
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
