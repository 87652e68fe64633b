// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-crate debug flags
//!
//! `--debug-dendrite-morphology` on the command line, or
//! `DENDRITE_DEBUG=dendrite-morphology` in the environment, raises one crate
//! to debug level while everything else stays at the configured level.
//! `all` (or `--debug-all`) selects every crate in [`KNOWN_CRATES`].

use std::collections::BTreeSet;

use crate::KNOWN_CRATES;

const FLAG_PREFIX: &str = "--debug-";
const ENV_VAR: &str = "DENDRITE_DEBUG";

/// Crates selected for debug-level logging
///
/// # Example
/// ```rust
/// use dendrite_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(["--debug-dendrite-morphology"]);
/// assert!(flags.is_enabled("dendrite-morphology"));
/// assert_eq!(flags.filter_directives("info"), "dendrite-morphology=debug,info");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Collect `--debug-<crate>` arguments, ignoring everything else
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flags = Self::default();
        for arg in args {
            if let Some(crate_name) = arg.as_ref().strip_prefix(FLAG_PREFIX) {
                flags.enable(crate_name);
            }
        }
        flags
    }

    /// Flags from the process arguments plus `DENDRITE_DEBUG`
    pub fn from_env() -> Self {
        let mut flags = Self::from_args(std::env::args());
        if let Ok(list) = std::env::var(ENV_VAR) {
            flags.enable_list(&list);
        }
        flags
    }

    /// Select one crate, `all` selects every known crate
    pub fn enable(&mut self, crate_name: &str) {
        let crate_name = crate_name.trim();
        match crate_name {
            "" => {}
            "all" => self
                .crates
                .extend(KNOWN_CRATES.iter().map(|name| name.to_string())),
            name => {
                self.crates.insert(name.to_string());
            }
        }
    }

    /// Select a comma-separated list of crates
    pub fn enable_list(&mut self, list: &str) {
        for crate_name in list.split(',') {
            self.enable(crate_name);
        }
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.crates.contains(crate_name)
    }

    pub fn is_empty(&self) -> bool {
        self.crates.is_empty()
    }

    /// Selected crates in name order
    pub fn crates(&self) -> impl Iterator<Item = &str> {
        self.crates.iter().map(String::as_str)
    }

    /// Selected names that match no known crate (likely typos)
    pub fn unknown_crates(&self) -> Vec<&str> {
        self.crates()
            .filter(|name| !KNOWN_CRATES.contains(name))
            .collect()
    }

    /// `EnvFilter` directives: one `<crate>=debug` per selection, then the
    /// lowercased default level
    pub fn filter_directives(&self, default_level: &str) -> String {
        self.crates()
            .map(|name| format!("{}=debug", name))
            .chain(std::iter::once(default_level.to_lowercase()))
            .collect::<Vec<_>>()
            .join(",")
    }
}
