//! Configuration file support for depwalk.
//!
//! Provides YAML-based configuration through `depwalk.config.yml` files
//! and merges it with command-line flags into the effective settings.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::adapters::outbound::network::{DEFAULT_REGISTRY_URL, DEFAULT_TIMEOUT_SECS};
use crate::application::dto::{DEFAULT_CONCURRENCY_LIMIT, DEFAULT_MAX_DEPTH};
use crate::cli::WalkOptions;
use crate::shared::security::{read_regular_file, MAX_FILE_SIZE};
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "depwalk.config.yml";

const DEFAULT_OUTPUT: &str = "result";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub max_depth: Option<usize>,
    pub concurrency: Option<usize>,
    pub registry_url: Option<String>,
    pub output: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// Effective settings after merging flags, config file and defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub max_depth: usize,
    pub concurrency: usize,
    pub registry_url: String,
    pub output: String,
    pub timeout_secs: u64,
}

impl Settings {
    /// CLI flag > config file > built-in default
    pub fn resolve(options: &WalkOptions, config: Option<ConfigFile>) -> Result<Self> {
        let config = config.unwrap_or_default();

        let settings = Self {
            max_depth: options
                .depth
                .or(config.max_depth)
                .unwrap_or(DEFAULT_MAX_DEPTH),
            concurrency: options
                .concurrency
                .or(config.concurrency)
                .unwrap_or(DEFAULT_CONCURRENCY_LIMIT),
            registry_url: config
                .registry_url
                .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string()),
            output: options
                .output
                .clone()
                .or(config.output)
                .unwrap_or_else(|| DEFAULT_OUTPUT.to_string()),
            timeout_secs: config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };

        if settings.concurrency == 0 {
            bail!(
                "Invalid concurrency: 0\n\n💡 Hint: Use a concurrency of at least 1 (default: {}).",
                DEFAULT_CONCURRENCY_LIMIT
            );
        }

        Ok(settings)
    }
}

/// Loads the config named by `--config`, or discovers one in `dir`
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<Option<ConfigFile>> {
    match explicit {
        Some(path) => load_config_from_path(path).map(Some),
        None => discover_config(dir),
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = read_regular_file(path, "config file", MAX_FILE_SIZE).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    load_config_from_path(&config_path).map(Some)
}

fn validate_config(config: &ConfigFile) -> Result<()> {
    if config.concurrency == Some(0) {
        bail!(
            "Invalid config: concurrency must be at least 1.\n\n\
             💡 Hint: Remove the field to use the default of {}.",
            DEFAULT_CONCURRENCY_LIMIT
        );
    }

    if let Some(url) = &config.registry_url {
        if url.trim().is_empty() {
            bail!(
                "Invalid config: registry_url must not be empty.\n\n\
                 💡 Hint: Remove the field to use {}.",
                DEFAULT_REGISTRY_URL
            );
        }
    }

    if config.timeout_secs == Some(0) {
        bail!("Invalid config: timeout_secs must be at least 1.");
    }

    Ok(())
}

fn warn_unknown_fields(config: &ConfigFile) {
    let mut keys: Vec<&String> = config.unknown_fields.keys().collect();
    keys.sort();
    for key in keys {
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}
