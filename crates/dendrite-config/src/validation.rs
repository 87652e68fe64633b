// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures configuration values are usable by the morphology builder and the
//! logging layer before either is constructed.

use crate::{ConfigError, ConfigResult, DendriteConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Required (non-empty) label and key segments
/// - A label separator without whitespace
/// - Finite, non-negative default conductance
/// - A known log level
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &DendriteConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_required_fields(config, &mut errors);
    validate_value_ranges(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_required_fields(config: &DendriteConfig, errors: &mut Vec<ConfigValidationError>) {
    let builder = &config.builder;
    for (field, value) in [
        ("builder.label_separator", &builder.label_separator),
        ("builder.connection_prefix", &builder.connection_prefix),
        ("builder.connection_parameter", &builder.connection_parameter),
        ("logging.level", &config.logging.level),
    ] {
        if value.is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: field.to_string(),
            });
        }
    }
}

fn validate_value_ranges(config: &DendriteConfig, errors: &mut Vec<ConfigValidationError>) {
    if config
        .builder
        .label_separator
        .chars()
        .any(char::is_whitespace)
    {
        errors.push(ConfigValidationError::InvalidValue {
            field: "builder.label_separator".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    let conductance = config.builder.default_conductance;
    if !conductance.is_finite() || conductance < 0.0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "builder.default_conductance".to_string(),
            reason: "must be a finite, non-negative number".to_string(),
        });
    }

    let level = config.logging.level.to_lowercase();
    if !config.logging.level.is_empty() && !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&DendriteConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_separator() {
        let mut config = DendriteConfig::default();
        config.builder.label_separator = String::new();

        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("builder.label_separator"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_separator() {
        let mut config = DendriteConfig::default();
        config.builder.label_separator = " ".to_string();

        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => assert!(msg.contains("whitespace")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_conductance() {
        let mut config = DendriteConfig::default();
        config.builder.default_conductance = f64::NAN;
        assert!(validate_config(&config).is_err());

        config.builder.default_conductance = -1.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_unknown_log_level() {
        let mut config = DendriteConfig::default();
        config.logging.level = "WARNING".to_string();

        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => assert!(msg.contains("logging.level")),
            other => panic!("expected validation error, got {:?}", other),
        }

        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_all_errors_reported() {
        let mut config = DendriteConfig::default();
        config.builder.connection_prefix = String::new();
        config.builder.connection_parameter = String::new();

        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("builder.connection_prefix"));
                assert!(msg.contains("builder.connection_parameter"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
