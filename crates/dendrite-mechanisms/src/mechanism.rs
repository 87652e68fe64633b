// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Mechanisms
//!
//! A mechanism is a parameterized sub-model attached to a compartment:
//!
//! | kind | parameters |
//! |---|---|
//! | `Capacitance` | `capacitance` |
//! | `SynapticInputCurrent` | `current`, `time_constant` |
//! | `SynapticInputConductance` | `conductance`, `potential`, `time_constant` |
//!
//! Parameters are kept in a `BTreeMap` so that iteration order is stable,
//! which keeps the parameter tables of a finalized neuron deterministic.

use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{MechanismError, MechanismResult};
use crate::parameter::ParameterValue;

/// Kind of a mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MechanismKind {
    /// Membrane capacitance of a compartment
    Capacitance,
    /// Current-based synaptic input
    SynapticInputCurrent,
    /// Conductance-based synaptic input
    SynapticInputConductance,
}

impl MechanismKind {
    /// Parameter names every mechanism of this kind carries
    pub fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            MechanismKind::Capacitance => &["capacitance"],
            MechanismKind::SynapticInputCurrent => &["current", "time_constant"],
            MechanismKind::SynapticInputConductance => {
                &["conductance", "potential", "time_constant"]
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MechanismKind::Capacitance => "capacitance",
            MechanismKind::SynapticInputCurrent => "synaptic_input_current",
            MechanismKind::SynapticInputConductance => "synaptic_input_conductance",
        }
    }
}

impl fmt::Display for MechanismKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A mechanism instance: a kind plus its named parameters
///
/// `Clone` is a deep copy; two clones never share parameter storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mechanism {
    kind: MechanismKind,
    parameters: BTreeMap<String, ParameterValue>,
}

impl Mechanism {
    /// Create a mechanism of `kind` with every parameter set to zero
    pub fn new(kind: MechanismKind) -> Self {
        let parameters = kind
            .parameter_names()
            .iter()
            .map(|name| (name.to_string(), ParameterValue::default()))
            .collect();
        Self { kind, parameters }
    }

    /// Membrane capacitance
    pub fn capacitance(capacitance: impl Into<ParameterValue>) -> Self {
        let mut mechanism = Self::new(MechanismKind::Capacitance);
        mechanism.insert("capacitance", capacitance.into());
        mechanism
    }

    /// Current-based synaptic input
    pub fn current_based_synapse(
        current: impl Into<ParameterValue>,
        time_constant: impl Into<ParameterValue>,
    ) -> Self {
        let mut mechanism = Self::new(MechanismKind::SynapticInputCurrent);
        mechanism.insert("current", current.into());
        mechanism.insert("time_constant", time_constant.into());
        mechanism
    }

    /// Conductance-based synaptic input
    pub fn conductance_based_synapse(
        conductance: impl Into<ParameterValue>,
        potential: impl Into<ParameterValue>,
        time_constant: impl Into<ParameterValue>,
    ) -> Self {
        let mut mechanism = Self::new(MechanismKind::SynapticInputConductance);
        mechanism.insert("conductance", conductance.into());
        mechanism.insert("potential", potential.into());
        mechanism.insert("time_constant", time_constant.into());
        mechanism
    }

    fn insert(&mut self, name: &str, value: ParameterValue) {
        self.parameters.insert(name.to_string(), value);
    }

    pub fn kind(&self) -> MechanismKind {
        self.kind
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterValue> {
        self.parameters.get(name)
    }

    /// Overwrite an existing parameter
    ///
    /// # Errors
    ///
    /// Returns `UnknownParameter` if this mechanism kind has no such parameter.
    pub fn set_parameter(
        &mut self,
        name: &str,
        value: impl Into<ParameterValue>,
    ) -> MechanismResult<()> {
        match self.parameters.get_mut(name) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(MechanismError::UnknownParameter {
                kind: self.kind,
                parameter: name.to_string(),
            }),
        }
    }

    /// Parameters in key order
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.parameters
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Two mechanisms of the same kind cannot share a compartment
    pub fn conflicts_with(&self, other: &Mechanism) -> bool {
        self.kind == other.kind
    }
}
