// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, DendriteConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "dendrite.toml";

/// Find the Dendrite configuration file
///
/// Search order:
/// 1. `DENDRITE_CONFIG_PATH` environment variable
/// 2. Current working directory: `./dendrite.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("DENDRITE_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by DENDRITE_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();

    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));

        let mut current = cwd;
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent.to_path_buf();
                }
                None => break,
            }
        }
    }

    if let Some(path) = search_paths.iter().find(|path| path.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Dendrite configuration file '{}' not found in any of these locations:\n{}\n\nSet DENDRITE_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<DendriteConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: DendriteConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `DENDRITE_LABEL_SEPARATOR` -> `builder.label_separator`
/// - `DENDRITE_DEFAULT_CONDUCTANCE` -> `builder.default_conductance`
/// - `DENDRITE_MAX_COMPARTMENTS` -> `builder.max_compartments`
/// - `DENDRITE_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut DendriteConfig) {
    if let Ok(value) = env::var("DENDRITE_LABEL_SEPARATOR") {
        config.builder.label_separator = value;
    }
    if let Ok(value) = env::var("DENDRITE_DEFAULT_CONDUCTANCE") {
        if let Ok(conductance) = value.parse::<f64>() {
            config.builder.default_conductance = conductance;
        }
    }
    if let Ok(value) = env::var("DENDRITE_MAX_COMPARTMENTS") {
        if let Ok(max) = value.parse::<usize>() {
            config.builder.max_compartments = max;
        }
    }
    if let Ok(value) = env::var("DENDRITE_LOG_LEVEL") {
        config.logging.level = value;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"label_separator": "/", "log_level": "debug"}`)
pub fn apply_cli_overrides(config: &mut DendriteConfig, cli_args: &HashMap<String, String>) {
    if let Some(value) = cli_args.get("label_separator") {
        config.builder.label_separator = value.clone();
    }
    if let Some(value) = cli_args.get("default_conductance") {
        if let Ok(conductance) = value.parse::<f64>() {
            config.builder.default_conductance = conductance;
        }
    }
    if let Some(value) = cli_args.get("max_compartments") {
        if let Ok(max) = value.parse::<usize>() {
            config.builder.max_compartments = max;
        }
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
}
