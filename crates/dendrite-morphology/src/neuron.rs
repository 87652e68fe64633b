// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Finalized neuron description.

A `Neuron` is the flattened result of `MorphologyBuilder::done`: compartments
keyed by full label, labeled connections, the default value of every
parameter and the translation table the placement engine uses to rename
parameters. All tables are sorted.
*/

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use dendrite_config::BuilderConfig;
use dendrite_mechanisms::{Compartment, ParameterValue};

use crate::tree::LabeledConnection;
use crate::types::{MorphologyError, MorphologyResult};

/// Dense compartment index, assigned in label order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompartmentId(pub usize);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranslationKind {
    /// Rename only, the value passes through unchanged
    #[default]
    Simple,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub translated_name: String,
    pub kind: TranslationKind,
}

impl Translation {
    pub fn simple(translated_name: impl Into<String>) -> Self {
        Self {
            translated_name: translated_name.into(),
            kind: TranslationKind::Simple,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConnection {
    pub source: CompartmentId,
    pub target: CompartmentId,
    pub conductance: f64,
}

/// Index-based view of a neuron, as consumed by a placement engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompartmentGraph {
    labels: Vec<String>,
    connections: Vec<GraphConnection>,
}

impl CompartmentGraph {
    pub fn id_of(&self, label: &str) -> Option<CompartmentId> {
        self.labels
            .binary_search_by(|candidate| candidate.as_str().cmp(label))
            .ok()
            .map(CompartmentId)
    }

    pub fn label(&self, id: CompartmentId) -> Option<&str> {
        self.labels.get(id.0).map(String::as_str)
    }

    pub fn connections(&self) -> &[GraphConnection] {
        &self.connections
    }

    pub fn compartment_count(&self) -> usize {
        self.labels.len()
    }
}

/// Flattened, label-addressed morphology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    name: String,
    compartments: BTreeMap<String, Compartment>,
    connections: Vec<LabeledConnection>,
    default_parameters: BTreeMap<String, ParameterValue>,
    translations: BTreeMap<String, Translation>,
    default_conductance: f64,
}

impl Neuron {
    /// Build the parameter and translation tables
    ///
    /// Keys are `{compartment}{sep}{mechanism}{sep}{parameter}` for mechanism
    /// parameters and [`BuilderConfig::connection_key`] for connections.
    pub(crate) fn assemble(
        name: &str,
        compartments: BTreeMap<String, Compartment>,
        connections: Vec<LabeledConnection>,
        config: &BuilderConfig,
    ) -> MorphologyResult<Self> {
        let sep = &config.label_separator;
        let mut default_parameters = BTreeMap::new();

        for (compartment_label, compartment) in &compartments {
            for (mechanism_label, mechanism) in compartment.mechanisms() {
                for (parameter, value) in mechanism.parameters() {
                    let key = format!(
                        "{}{sep}{}{sep}{}",
                        compartment_label, mechanism_label, parameter
                    );
                    insert_unique(&mut default_parameters, key, value.clone())?;
                }
            }
        }

        for connection in &connections {
            let key = config.connection_key(&connection.source, &connection.target);
            let value = ParameterValue::Scalar(connection.conductance_or(config.default_conductance));
            insert_unique(&mut default_parameters, key, value)?;
        }

        let translations = default_parameters
            .keys()
            .map(|key| (key.clone(), Translation::simple(key.clone())))
            .collect();

        Ok(Self {
            name: name.to_string(),
            compartments,
            connections,
            default_parameters,
            translations,
            default_conductance: config.default_conductance,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compartments(&self) -> &BTreeMap<String, Compartment> {
        &self.compartments
    }

    pub fn compartment(&self, label: &str) -> Option<&Compartment> {
        self.compartments.get(label)
    }

    pub fn compartment_count(&self) -> usize {
        self.compartments.len()
    }

    pub fn connections(&self) -> &[LabeledConnection] {
        &self.connections
    }

    pub fn default_parameters(&self) -> &BTreeMap<String, ParameterValue> {
        &self.default_parameters
    }

    pub fn default_value(&self, key: &str) -> Option<&ParameterValue> {
        self.default_parameters.get(key)
    }

    pub fn parameter_count(&self) -> usize {
        self.default_parameters.len()
    }

    pub fn translations(&self) -> &BTreeMap<String, Translation> {
        &self.translations
    }

    pub fn translation(&self, key: &str) -> Option<&Translation> {
        self.translations.get(key)
    }

    /// Rename parameter keys through the translation table
    ///
    /// Keys without a translation pass through unchanged.
    pub fn translate(
        &self,
        parameters: &BTreeMap<String, ParameterValue>,
    ) -> BTreeMap<String, ParameterValue> {
        parameters
            .iter()
            .map(|(key, value)| {
                let name = self
                    .translations
                    .get(key)
                    .map_or(key, |translation| &translation.translated_name);
                (name.clone(), value.clone())
            })
            .collect()
    }

    /// Inverse of [`Neuron::translate`]
    pub fn reverse_translate(
        &self,
        parameters: &BTreeMap<String, ParameterValue>,
    ) -> BTreeMap<String, ParameterValue> {
        let inverse: AHashMap<&str, &str> = self
            .translations
            .iter()
            .map(|(key, translation)| (translation.translated_name.as_str(), key.as_str()))
            .collect();
        parameters
            .iter()
            .map(|(name, value)| {
                let key = inverse.get(name.as_str()).copied().unwrap_or(name.as_str());
                (key.to_string(), value.clone())
            })
            .collect()
    }

    /// Index-based view with resolved conductances
    pub fn compartment_graph(&self) -> MorphologyResult<CompartmentGraph> {
        let labels: Vec<String> = self.compartments.keys().cloned().collect();
        let ids: AHashMap<&str, CompartmentId> = labels
            .iter()
            .enumerate()
            .map(|(index, label)| (label.as_str(), CompartmentId(index)))
            .collect();
        let resolve = |label: &str| {
            ids.get(label)
                .copied()
                .ok_or_else(|| MorphologyError::UnknownCompartment(label.to_string()))
        };

        let connections = self
            .connections
            .iter()
            .map(|connection| {
                Ok(GraphConnection {
                    source: resolve(&connection.source)?,
                    target: resolve(&connection.target)?,
                    conductance: connection.conductance_or(self.default_conductance),
                })
            })
            .collect::<MorphologyResult<Vec<_>>>()?;

        Ok(CompartmentGraph {
            labels,
            connections,
        })
    }

    /// Pretty-printed JSON for debugging and hand-off
    pub fn to_json(&self) -> MorphologyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn insert_unique(
    parameters: &mut BTreeMap<String, ParameterValue>,
    key: String,
    value: ParameterValue,
) -> MorphologyResult<()> {
    if parameters.contains_key(&key) {
        return Err(MorphologyError::DuplicateParameter(key));
    }
    parameters.insert(key, value);
    Ok(())
}
