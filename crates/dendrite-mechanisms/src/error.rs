// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for mechanism and compartment operations

use crate::mechanism::MechanismKind;

/// Result type for mechanism operations
pub type MechanismResult<T> = Result<T, MechanismError>;

/// Errors that can occur while assembling mechanisms and compartments
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MechanismError {
    #[error("Parameter interval {field} must be finite, got {value}")]
    NonFiniteInterval { field: &'static str, value: f64 },

    #[error("Invalid parameter interval: lower {lower} > upper {upper}")]
    InvalidInterval { lower: f64, upper: f64 },

    #[error("Representative value {value} outside of interval [{lower}, {upper}]")]
    ValueOutsideInterval { value: f64, lower: f64, upper: f64 },

    #[error("Mechanism {kind} has no parameter '{parameter}'")]
    UnknownParameter {
        kind: MechanismKind,
        parameter: String,
    },

    #[error("Mechanism label '{0}' already used in this compartment")]
    DuplicateMechanism(String),

    #[error("Mechanism '{label}' ({kind}) conflicts with existing mechanism '{existing}'")]
    ConflictingMechanism {
        label: String,
        kind: MechanismKind,
        existing: String,
    },
}
