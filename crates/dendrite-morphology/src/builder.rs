// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Morphology builder.

The builder keeps a forest: a list of root handles, each an independent
connected tree of compartments. `add_compartment` appends a singleton tree,
`connect` merges the trees containing the connection endpoints into one new
root, `clone_node` appends a deep copy of a subtree, and `done` collapses the
single remaining root into a [`Neuron`].

```text
Empty/Building --add_compartment/connect/clone_node--> Building
Building --done (one root)--> Neuron, builder reset to Empty
```
*/

use ahash::AHashMap;
use tracing::{debug, info, warn};

use dendrite_config::BuilderConfig;
use dendrite_mechanisms::{Compartment, ParameterValue};

use crate::neuron::Neuron;
use crate::tree::{Connection, Node, NodeArena};
use crate::types::{MorphologyError, MorphologyResult, NodeId};

/// Incremental composer of multi-compartment morphologies
#[derive(Debug, Clone)]
pub struct MorphologyBuilder {
    arena: NodeArena,
    roots: Vec<NodeId>,
    /// clone -> node it was copied from
    provenance: AHashMap<NodeId, NodeId>,
    config: BuilderConfig,
}

impl Default for MorphologyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MorphologyBuilder {
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            arena: NodeArena::with_separator(config.label_separator.clone()),
            roots: Vec::new(),
            provenance: AHashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Wrap `compartment` in a new leaf and append it as a new root
    ///
    /// # Errors
    ///
    /// `TooManyCompartments` when a configured `max_compartments` would be
    /// exceeded.
    pub fn add_compartment(
        &mut self,
        compartment: Compartment,
        label: Option<&str>,
    ) -> MorphologyResult<NodeId> {
        self.check_capacity(1)?;
        let node = self.arena.add_leaf(compartment, label.map(str::to_string));
        self.roots.push(node);
        debug!(
            target: "dendrite-morphology",
            "Added compartment {} ({:?}), {} roots",
            node,
            label,
            self.roots.len()
        );
        Ok(node)
    }

    /// Merge the trees containing the connection endpoints into one new root
    ///
    /// Accepts `Connection` values, `(NodeId, NodeId)` pairs or
    /// `(NodeId, NodeId, strength)` triples. Identical connections are
    /// collapsed. On error the forest is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - no connection is given (`NoConnections`)
    /// - an endpoint is not in the forest (`NodeNotFound`) or not a leaf
    /// - both endpoints lie in the same root (`SameRoot`)
    /// - the connections do not form a spanning tree over the merged roots
    pub fn connect<I, C>(&mut self, connections: I, label: Option<&str>) -> MorphologyResult<NodeId>
    where
        I: IntoIterator<Item = C>,
        C: Into<Connection>,
    {
        let mut children: Vec<NodeId> = Vec::new();
        let mut node_connections: Vec<Connection> = Vec::new();

        for connection in connections {
            let connection: Connection = connection.into();
            let source_root = self.locate(connection.source)?;
            let target_root = self.locate(connection.target)?;
            if source_root == target_root {
                return Err(MorphologyError::SameRoot {
                    source_node: connection.source,
                    target_node: connection.target,
                    root: source_root,
                });
            }
            for root in [source_root, target_root] {
                if !children.contains(&root) {
                    children.push(root);
                }
            }
            if !node_connections.contains(&connection) {
                node_connections.push(connection);
            }
        }

        if node_connections.is_empty() {
            return Err(MorphologyError::NoConnections);
        }

        let merged = children.len();
        let node = self.arena.add_internal(
            children.clone(),
            node_connections,
            label.map(str::to_string),
        )?;
        self.roots.retain(|root| !children.contains(root));
        self.roots.push(node);

        debug!(
            target: "dendrite-morphology",
            "Connected {} roots into {} ({:?}), {} roots remain",
            merged,
            node,
            label,
            self.roots.len()
        );
        Ok(node)
    }

    /// Append a deep copy of the subtree at `node` as a new root
    ///
    /// The copy's root takes `label`; everything below keeps its labels.
    /// Every copied node records the node it was copied from, which is what
    /// [`MorphologyBuilder::get_ref_in_node`] resolves against.
    ///
    /// # Errors
    ///
    /// `NodeNotFound` if `node` is not in the current forest,
    /// `TooManyCompartments` when the copy would exceed `max_compartments`.
    pub fn clone_node(&mut self, node: NodeId, label: Option<&str>) -> MorphologyResult<NodeId> {
        self.locate(node)?;
        self.check_capacity(self.arena.leaf_count(node))?;

        let (copy, mapping) = self.arena.deep_clone(node)?;
        self.arena.set_label(copy, label.map(str::to_string))?;
        for (original, duplicate) in mapping {
            self.provenance.insert(duplicate, original);
        }
        self.roots.push(copy);

        debug!(
            target: "dendrite-morphology",
            "Cloned {} into {} ({:?}), {} roots",
            node,
            copy,
            label,
            self.roots.len()
        );
        Ok(copy)
    }

    /// Find the node inside `target_tree` that corresponds to `subnode`
    ///
    /// Two nodes correspond when their clone provenance leads back to the
    /// same node. This resolves an original inside a clone, a clone inside
    /// the original, one clone inside a sibling clone, and clones of clones.
    /// Returns the first match in pre-order, or `None`.
    pub fn get_ref_in_node(&self, target_tree: NodeId, subnode: NodeId) -> Option<NodeId> {
        if !self.arena.contains(subnode) {
            return None;
        }
        let origin = self.origin(subnode);
        self.arena
            .subtree(target_tree)
            .into_iter()
            .find(|candidate| self.origin(*candidate) == origin)
    }

    /// Node that `node` was ultimately copied from (itself if not a clone)
    ///
    /// Terminates because a clone is always created after its source.
    fn origin(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(source) = self.provenance.get(&current) {
            current = *source;
        }
        current
    }

    /// Finalize the single remaining root into a [`Neuron`]
    ///
    /// On success the builder is reset and can compose a new morphology. On
    /// error the forest is kept as it was.
    ///
    /// # Errors
    ///
    /// `NotFullyConnected` unless exactly one root exists, plus any labeling
    /// error (`MissingLabel`, `DuplicateLabel`, `DuplicateParameter`).
    pub fn done(&mut self, name: &str) -> MorphologyResult<Neuron> {
        let root = match self.roots.as_slice() {
            [root] => *root,
            roots => {
                warn!(
                    target: "dendrite-morphology",
                    "Cannot finalize '{}': {} roots in forest",
                    name,
                    roots.len()
                );
                return Err(MorphologyError::NotFullyConnected { roots: roots.len() });
            }
        };

        let elements = self.arena.fully_labeled_leaf_elements(root)?;
        let connections = self
            .arena
            .fully_labeled_connections(root, elements.table())?
            .unwrap_or_default();
        let neuron = Neuron::assemble(
            name,
            elements.to_owned_compartments(),
            connections,
            &self.config,
        )?;

        info!(
            target: "dendrite-morphology",
            "Finalized neuron '{}': {} compartments, {} connections, {} parameters",
            neuron.name(),
            neuron.compartment_count(),
            neuron.connections().len(),
            neuron.parameter_count()
        );
        self.reset();
        Ok(neuron)
    }

    /// Overwrite one parameter of a compartment already in the forest
    pub fn set_parameter(
        &mut self,
        node: NodeId,
        mechanism: &str,
        parameter: &str,
        value: impl Into<ParameterValue>,
    ) -> MorphologyResult<()> {
        let compartment = self
            .compartment_mut(node)
            .ok_or(MorphologyError::NodeNotFound(node))?;
        let target = compartment
            .mechanism_mut(mechanism)
            .ok_or_else(|| MorphologyError::UnknownMechanism {
                node,
                label: mechanism.to_string(),
            })?;
        target.set_parameter(parameter, value)?;
        Ok(())
    }

    /// Root of the forest tree that contains `node`
    pub fn root_of(&self, node: NodeId) -> Option<NodeId> {
        self.roots
            .iter()
            .copied()
            .find(|root| self.arena.node_in_tree(*root, node))
    }

    fn locate(&self, node: NodeId) -> MorphologyResult<NodeId> {
        self.root_of(node).ok_or(MorphologyError::NodeNotFound(node))
    }

    fn check_capacity(&self, additional: usize) -> MorphologyResult<()> {
        let max = self.config.max_compartments;
        if max == 0 {
            return Ok(());
        }
        let count = self.compartment_count() + additional;
        if count > max {
            return Err(MorphologyError::TooManyCompartments { count, max });
        }
        Ok(())
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Node in the forest, `None` once it was discarded by `done`/`reset`
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id).ok()
    }

    pub fn compartment(&self, id: NodeId) -> Option<&Compartment> {
        self.node(id).and_then(Node::compartment)
    }

    /// Mutable access to a leaf's compartment for per-instance edits
    pub fn compartment_mut(&mut self, id: NodeId) -> Option<&mut Compartment> {
        self.root_of(id)?;
        self.arena.compartment_mut(id)
    }

    pub fn leaf_count(&self, root: NodeId) -> usize {
        self.arena.leaf_count(root)
    }

    /// Compartments reachable from any root
    pub fn compartment_count(&self) -> usize {
        self.roots.iter().map(|root| self.arena.leaf_count(*root)).sum()
    }

    /// Node `id` was directly copied from, if it is a clone
    pub fn provenance(&self, id: NodeId) -> Option<NodeId> {
        self.provenance.get(&id).copied()
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Discard the forest; all issued handles become invalid
    pub fn reset(&mut self) {
        self.arena.clear();
        self.roots.clear();
        self.provenance.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dendrite_mechanisms::Mechanism;

    fn soma() -> Compartment {
        Compartment::new()
            .with_mechanism("membrane", Mechanism::capacitance(1.0))
            .unwrap()
    }

    #[test]
    fn test_add_compartment_creates_roots() {
        let mut builder = MorphologyBuilder::new();
        assert!(builder.is_empty());
        let a = builder.add_compartment(soma(), Some("a")).unwrap();
        let b = builder.add_compartment(soma(), Some("b")).unwrap();
        assert_eq!(builder.roots(), &[a, b]);
        assert_eq!(builder.compartment_count(), 2);
    }

    #[test]
    fn test_connect_merges_roots() {
        let mut builder = MorphologyBuilder::new();
        let a = builder.add_compartment(soma(), Some("a")).unwrap();
        let b = builder.add_compartment(soma(), Some("b")).unwrap();
        let c = builder.add_compartment(soma(), Some("c")).unwrap();

        let ab = builder.connect([(a, b)], Some("ab")).unwrap();
        assert_eq!(builder.roots(), &[c, ab]);

        let root = builder.connect([(b, c)], None).unwrap();
        assert_eq!(builder.roots(), &[root]);
        assert_eq!(builder.root_of(a), Some(root));
        assert_eq!(builder.leaf_count(root), 3);
    }

    #[test]
    fn test_connect_collapses_duplicate_connections() {
        let mut builder = MorphologyBuilder::new();
        let a = builder.add_compartment(soma(), Some("a")).unwrap();
        let b = builder.add_compartment(soma(), Some("b")).unwrap();
        let ab = builder.connect([(a, b), (a, b)], None).unwrap();
        assert_eq!(builder.node(ab).unwrap().connections().len(), 1);
    }

    #[test]
    fn test_connect_errors_leave_forest_unchanged() {
        let mut builder = MorphologyBuilder::new();
        let a = builder.add_compartment(soma(), Some("a")).unwrap();
        let b = builder.add_compartment(soma(), Some("b")).unwrap();
        let ab = builder.connect([(a, b)], None).unwrap();

        assert_eq!(
            builder.connect([(a, b)], None).unwrap_err(),
            MorphologyError::SameRoot {
                source_node: a,
                target_node: b,
                root: ab
            }
        );
        assert_eq!(
            builder.connect([(a, NodeId(42))], None).unwrap_err(),
            MorphologyError::NodeNotFound(NodeId(42))
        );
        assert_eq!(
            builder.connect(Vec::<Connection>::new(), None).unwrap_err(),
            MorphologyError::NoConnections
        );
        assert_eq!(builder.roots(), &[ab]);
    }

    #[test]
    fn test_connect_rejects_internal_endpoint() {
        let mut builder = MorphologyBuilder::new();
        let a = builder.add_compartment(soma(), Some("a")).unwrap();
        let b = builder.add_compartment(soma(), Some("b")).unwrap();
        let ab = builder.connect([(a, b)], None).unwrap();
        let c = builder.add_compartment(soma(), Some("c")).unwrap();
        assert_eq!(
            builder.connect([(ab, c)], None).unwrap_err(),
            MorphologyError::EndpointNotLeaf(ab)
        );
        assert_eq!(builder.root_count(), 2);
    }

    #[test]
    fn test_max_compartments() {
        let config = BuilderConfig {
            max_compartments: 2,
            ..BuilderConfig::default()
        };
        let mut builder = MorphologyBuilder::with_config(config);
        let a = builder.add_compartment(soma(), Some("a")).unwrap();
        builder.add_compartment(soma(), Some("b")).unwrap();
        assert_eq!(
            builder.add_compartment(soma(), Some("c")).unwrap_err(),
            MorphologyError::TooManyCompartments { count: 3, max: 2 }
        );
        assert_eq!(
            builder.clone_node(a, None).unwrap_err(),
            MorphologyError::TooManyCompartments { count: 3, max: 2 }
        );
    }

    #[test]
    fn test_clone_records_provenance() {
        let mut builder = MorphologyBuilder::new();
        let a = builder.add_compartment(soma(), Some("a")).unwrap();
        let b = builder.add_compartment(soma(), Some("b")).unwrap();
        let ab = builder.connect([(a, b)], Some("ab")).unwrap();

        let copy = builder.clone_node(ab, Some("copy")).unwrap();
        assert_eq!(builder.provenance(copy), Some(ab));
        assert_eq!(builder.node(copy).unwrap().label(), Some("copy"));
        assert_eq!(builder.node(ab).unwrap().label(), Some("ab"));

        let copied_a = builder.get_ref_in_node(copy, a).unwrap();
        assert_ne!(copied_a, a);
        assert_eq!(builder.provenance(copied_a), Some(a));
        assert_eq!(builder.get_ref_in_node(ab, copied_a), Some(a));
        assert_eq!(builder.get_ref_in_node(ab, a), Some(a));
        assert_eq!(builder.root_count(), 2);
    }

    #[test]
    fn test_sibling_clones_resolve_each_other() {
        let mut builder = MorphologyBuilder::new();
        let a = builder.add_compartment(soma(), Some("a")).unwrap();
        let b = builder.add_compartment(soma(), Some("b")).unwrap();
        let ab = builder.connect([(a, b)], Some("ab")).unwrap();
        let first = builder.clone_node(ab, Some("first")).unwrap();
        let second = builder.clone_node(ab, Some("second")).unwrap();

        let a_first = builder.get_ref_in_node(first, a).unwrap();
        let a_second = builder.get_ref_in_node(second, a).unwrap();
        assert_ne!(a_first, a_second);
        assert_eq!(builder.get_ref_in_node(second, a_first), Some(a_second));
        assert_eq!(builder.get_ref_in_node(first, a_second), Some(a_first));
        assert_eq!(builder.get_ref_in_node(ab, a_first), Some(a));

        let b_first = builder.get_ref_in_node(first, b).unwrap();
        assert_eq!(builder.get_ref_in_node(ab, b_first), Some(b));
        assert_eq!(builder.get_ref_in_node(first, second), Some(first));
    }

    #[test]
    fn test_handles_from_finalized_morphology_are_rejected() {
        let mut builder = MorphologyBuilder::new();
        let old = builder.add_compartment(soma(), Some("old")).unwrap();
        builder.done("first").unwrap();

        let x = builder.add_compartment(soma(), Some("x")).unwrap();
        let y = builder.add_compartment(soma(), Some("y")).unwrap();
        assert_ne!(x, old);
        assert_ne!(y, old);

        assert_eq!(
            builder.connect([(old, y)], None).unwrap_err(),
            MorphologyError::NodeNotFound(old)
        );
        assert_eq!(
            builder.clone_node(old, None).unwrap_err(),
            MorphologyError::NodeNotFound(old)
        );
        assert!(builder.node(old).is_none());
        assert!(builder.compartment_mut(old).is_none());
        assert_eq!(builder.get_ref_in_node(x, old), None);
        assert_eq!(builder.roots(), &[x, y]);
    }

    #[test]
    fn test_clone_of_unknown_node() {
        let mut builder = MorphologyBuilder::new();
        assert_eq!(
            builder.clone_node(NodeId(0), None).unwrap_err(),
            MorphologyError::NodeNotFound(NodeId(0))
        );
    }

    #[test]
    fn test_set_parameter_edits_one_instance() {
        let mut builder = MorphologyBuilder::new();
        let a = builder.add_compartment(soma(), Some("a")).unwrap();
        let copy = builder.clone_node(a, Some("a2")).unwrap();
        builder.set_parameter(copy, "membrane", "capacitance", 5.0).unwrap();

        let value = |id| {
            builder
                .compartment(id)
                .and_then(|c| c.mechanism("membrane"))
                .and_then(|m| m.parameter("capacitance"))
                .cloned()
        };
        assert_eq!(value(a), Some(ParameterValue::Scalar(1.0)));
        assert_eq!(value(copy), Some(ParameterValue::Scalar(5.0)));

        assert_eq!(
            builder.set_parameter(a, "missing", "capacitance", 1.0).unwrap_err(),
            MorphologyError::UnknownMechanism {
                node: a,
                label: "missing".to_string()
            }
        );
        assert!(matches!(
            builder.set_parameter(a, "membrane", "voltage", 1.0).unwrap_err(),
            MorphologyError::Mechanism(_)
        ));
    }

    #[test]
    fn test_done_requires_single_root() {
        let mut builder = MorphologyBuilder::new();
        assert_eq!(
            builder.done("empty").unwrap_err(),
            MorphologyError::NotFullyConnected { roots: 0 }
        );
        builder.add_compartment(soma(), Some("a")).unwrap();
        builder.add_compartment(soma(), Some("b")).unwrap();
        assert_eq!(
            builder.done("split").unwrap_err(),
            MorphologyError::NotFullyConnected { roots: 2 }
        );
        assert_eq!(builder.root_count(), 2);
    }

    #[test]
    fn test_done_single_compartment() {
        let mut builder = MorphologyBuilder::new();
        builder.add_compartment(soma(), Some("soma")).unwrap();
        let neuron = builder.done("point").unwrap();
        assert_eq!(neuron.compartments().len(), 1);
        assert!(neuron.compartment("soma").is_some());
        assert!(neuron.connections().is_empty());
        assert!(builder.is_empty());
    }

    #[test]
    fn test_failed_done_keeps_forest() {
        let mut builder = MorphologyBuilder::new();
        let a = builder.add_compartment(soma(), None).unwrap();
        let b = builder.add_compartment(soma(), Some("b")).unwrap();
        builder.connect([(a, b)], None).unwrap();
        assert_eq!(
            builder.done("n").unwrap_err(),
            MorphologyError::MissingLabel(a)
        );
        assert_eq!(builder.root_count(), 1);
    }
}
