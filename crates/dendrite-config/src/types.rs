// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `dendrite.toml`.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DendriteConfig {
    pub builder: BuilderConfig,
    pub logging: LoggingConfig,
}

/// Morphology builder configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Joins node labels into full hierarchical labels
    pub label_separator: String,
    /// First segment of synthetic connection parameter keys
    pub connection_prefix: String,
    /// Last segment of synthetic connection parameter keys
    pub connection_parameter: String,
    /// Conductance used for connections created without a strength
    pub default_conductance: f64,
    /// Upper bound on compartments in the forest (0 = unlimited)
    pub max_compartments: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            label_separator: ".".to_string(),
            connection_prefix: "connection".to_string(),
            connection_parameter: "conductance".to_string(),
            default_conductance: 0.0,
            max_compartments: 0,
        }
    }
}

impl BuilderConfig {
    /// Parameter key of the conductance between two labeled compartments
    pub fn connection_key(&self, source: &str, target: &str) -> String {
        let sep = &self.label_separator;
        format!(
            "{}{sep}{}{sep}{}{sep}{}",
            self.connection_prefix, source, target, self.connection_parameter
        )
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Print event targets in console output
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: false,
        }
    }
}
