// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Compartments and compartment templates.

A `Compartment` is an identifier-less bundle of mechanisms keyed by label.
A `CompartmentTemplate` plays the role of a compartment class: it holds a
default mechanism set once, and every `instantiate()` deep-copies it so
per-instance edits never reach the template or sibling instances.
*/

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{MechanismError, MechanismResult};
use crate::mechanism::Mechanism;

/// Atomic leaf payload of a morphology
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Compartment {
    mechanisms: BTreeMap<String, Mechanism>,
}

impl Compartment {
    /// Create a compartment without mechanisms
    pub fn new() -> Self {
        Self {
            mechanisms: BTreeMap::new(),
        }
    }

    /// Builder-style variant of [`Compartment::add_mechanism`]
    pub fn with_mechanism(
        mut self,
        label: impl Into<String>,
        mechanism: Mechanism,
    ) -> MechanismResult<Self> {
        self.add_mechanism(label, mechanism)?;
        Ok(self)
    }

    /// Attach a mechanism under `label`
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `label` is already used in this compartment
    /// - a mechanism of the same kind is already attached
    pub fn add_mechanism(
        &mut self,
        label: impl Into<String>,
        mechanism: Mechanism,
    ) -> MechanismResult<()> {
        let label = label.into();
        if self.mechanisms.contains_key(&label) {
            return Err(MechanismError::DuplicateMechanism(label));
        }
        if let Some((existing, _)) = self
            .mechanisms
            .iter()
            .find(|(_, attached)| attached.conflicts_with(&mechanism))
        {
            return Err(MechanismError::ConflictingMechanism {
                label,
                kind: mechanism.kind(),
                existing: existing.clone(),
            });
        }
        self.mechanisms.insert(label, mechanism);
        Ok(())
    }

    pub fn remove_mechanism(&mut self, label: &str) -> Option<Mechanism> {
        self.mechanisms.remove(label)
    }

    pub fn mechanism(&self, label: &str) -> Option<&Mechanism> {
        self.mechanisms.get(label)
    }

    pub fn mechanism_mut(&mut self, label: &str) -> Option<&mut Mechanism> {
        self.mechanisms.get_mut(label)
    }

    /// Mechanisms in label order
    pub fn mechanisms(&self) -> impl Iterator<Item = (&str, &Mechanism)> {
        self.mechanisms
            .iter()
            .map(|(label, mechanism)| (label.as_str(), mechanism))
    }

    pub fn len(&self) -> usize {
        self.mechanisms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mechanisms.is_empty()
    }
}

/// Compartment class with a shared default mechanism set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompartmentTemplate {
    name: String,
    defaults: Compartment,
}

impl CompartmentTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: Compartment::new(),
        }
    }

    /// Add a default mechanism (same rules as [`Compartment::add_mechanism`])
    pub fn with_mechanism(
        mut self,
        label: impl Into<String>,
        mechanism: Mechanism,
    ) -> MechanismResult<Self> {
        self.defaults.add_mechanism(label, mechanism)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn defaults(&self) -> &Compartment {
        &self.defaults
    }

    /// Fresh compartment holding a deep copy of the default mechanisms
    pub fn instantiate(&self) -> Compartment {
        self.defaults.clone()
    }
}
