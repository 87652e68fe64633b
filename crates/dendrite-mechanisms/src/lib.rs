// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Dendrite Mechanisms
//!
//! Leaf payload model for multi-compartment morphologies:
//! - **Parameters**: scalar values or intervals with a representative parameterization
//! - **Mechanisms**: capacitance and synaptic inputs, each a keyed parameter set
//! - **Compartments**: keyed mechanism collections, deep-copied per instance
//! - **Templates**: compartment "classes" holding a shared default mechanism set
//!
//! The morphology builder only relies on three properties of this crate:
//! compartments deep-copy through `Clone`, mechanisms and parameters iterate
//! in stable key order, and keys are unique.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod compartment;
pub mod error;
pub mod mechanism;
pub mod parameter;

pub use compartment::{Compartment, CompartmentTemplate};
pub use error::{MechanismError, MechanismResult};
pub use mechanism::{Mechanism, MechanismKind};
pub use parameter::{ParameterInterval, ParameterValue};
