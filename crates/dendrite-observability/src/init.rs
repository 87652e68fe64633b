// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Installs a console `tracing-subscriber` with an `EnvFilter` built from the
//! logging configuration and the per-crate debug flags.

use anyhow::{anyhow, Context, Result};
use dendrite_config::LoggingConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;

/// Build the filter used by [`init_logging`]
///
/// `RUST_LOG`, when set, takes precedence over configuration and flags.
pub fn build_filter(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(directives) = std::env::var("RUST_LOG") {
        return EnvFilter::try_new(&directives)
            .with_context(|| format!("Invalid RUST_LOG directives: {}", directives));
    }
    let filter = debug_flags.filter_directives(&config.level);
    EnvFilter::try_new(&filter).with_context(|| format!("Invalid log filter: {}", filter))
}

/// Initialize console logging
///
/// # Errors
///
/// Fails if the filter cannot be parsed or a global subscriber is already set.
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<()> {
    let env_filter = build_filter(debug_flags, config)?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(config.with_target)
        .with_file(false)
        .with_line_number(false)
        .with_filter(env_filter);

    Registry::default()
        .with(console_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    for unknown in debug_flags.unknown_crates() {
        tracing::warn!(
            target: "dendrite-observability",
            "Ignoring debug flag for unknown crate '{}' (known: {})",
            unknown,
            crate::KNOWN_CRATES.join(", ")
        );
    }
    Ok(())
}

/// Initialize logging with default settings
pub fn init_logging_default(debug_flags: &CrateDebugFlags) -> Result<()> {
    init_logging(debug_flags, &LoggingConfig::default())
}
