// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # dendrite-observability
//!
//! Logging setup shared by Dendrite applications and tests.
//!
//! Library crates only emit `tracing` events with their crate name as target
//! (`target: "dendrite-morphology"`); this crate decides where they go and
//! at which level, with per-crate debug flag support.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known Dendrite crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "dendrite-config",
    "dendrite-mechanisms",
    "dendrite-morphology",
];
