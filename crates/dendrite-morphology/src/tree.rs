// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Node arena: the forest data structure.

Nodes are stored in a `NodeArena` and addressed by `NodeId`. A node is either
a leaf wrapping exactly one `Compartment`, or an internal node holding child
handles plus the connections between the subtrees rooted at those children.

Hierarchical labels are computed on demand from the node labels, they are
never cached in the arena.
*/

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use dendrite_mechanisms::Compartment;

use crate::types::{MorphologyError, MorphologyResult, NodeId};

/// Separator used when none is configured
pub const DEFAULT_LABEL_SEPARATOR: &str = ".";

/// Directed link between two leaf compartments
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
    /// Conductance of the link, `None` falls back to the configured default
    pub strength: Option<f64>,
}

impl Connection {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            target,
            strength: None,
        }
    }

    pub fn with_strength(source: NodeId, target: NodeId, strength: f64) -> Self {
        Self {
            source,
            target,
            strength: Some(strength),
        }
    }

    fn endpoints(&self) -> [NodeId; 2] {
        [self.source, self.target]
    }
}

impl From<(NodeId, NodeId)> for Connection {
    fn from((source, target): (NodeId, NodeId)) -> Self {
        Connection::new(source, target)
    }
}

impl From<(NodeId, NodeId, f64)> for Connection {
    fn from((source, target, strength): (NodeId, NodeId, f64)) -> Self {
        Connection::with_strength(source, target, strength)
    }
}

/// Connection rewritten in terms of full labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledConnection {
    pub source: String,
    pub target: String,
    pub strength: Option<f64>,
}

impl LabeledConnection {
    pub fn conductance_or(&self, default: f64) -> f64 {
        self.strength.unwrap_or(default)
    }
}

/// Leaf payload or merged subtree
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Leaf(Compartment),
    Internal {
        children: Vec<NodeId>,
        connections: Vec<Connection>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    label: Option<String>,
    kind: NodeKind,
}

impl Node {
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    pub fn compartment(&self) -> Option<&Compartment> {
        match &self.kind {
            NodeKind::Leaf(compartment) => Some(compartment),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Direct children (empty for a leaf)
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Internal { children, .. } => children,
        }
    }

    /// Connections between the direct children (empty for a leaf)
    pub fn connections(&self) -> &[Connection] {
        match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Internal { connections, .. } => connections,
        }
    }
}

/// Leaf handle to full label mapping, plus the inverse
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelTable {
    order: Vec<NodeId>,
    labels: AHashMap<NodeId, String>,
    nodes: BTreeMap<String, NodeId>,
}

impl LabelTable {
    fn insert(&mut self, node: NodeId, label: String) -> MorphologyResult<()> {
        if self.nodes.contains_key(&label) {
            return Err(MorphologyError::DuplicateLabel(label));
        }
        self.order.push(node);
        self.nodes.insert(label.clone(), node);
        self.labels.insert(node, label);
        Ok(())
    }

    pub fn label(&self, node: NodeId) -> Option<&str> {
        self.labels.get(&node).map(String::as_str)
    }

    pub fn node(&self, label: &str) -> Option<NodeId> {
        self.nodes.get(label).copied()
    }

    /// Entries in traversal order (children in insertion order)
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &str)> + '_ {
        self.order
            .iter()
            .filter_map(|node| self.label(*node).map(|label| (*node, label)))
    }

    /// Full labels in sorted order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Full label to compartment mapping, borrowed from the arena
#[derive(Debug, Clone)]
pub struct LeafElements<'a> {
    table: LabelTable,
    compartments: BTreeMap<String, &'a Compartment>,
}

impl<'a> LeafElements<'a> {
    pub fn compartment(&self, label: &str) -> Option<&'a Compartment> {
        self.compartments.get(label).copied()
    }

    pub fn label(&self, node: NodeId) -> Option<&str> {
        self.table.label(node)
    }

    pub fn table(&self) -> &LabelTable {
        &self.table
    }

    /// Compartments in label order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &'a Compartment)> + '_ {
        self.compartments
            .iter()
            .map(|(label, compartment)| (label.as_str(), *compartment))
    }

    pub fn len(&self) -> usize {
        self.compartments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compartments.is_empty()
    }

    /// Deep copies of the compartments, keyed by full label
    pub fn to_owned_compartments(&self) -> BTreeMap<String, Compartment> {
        self.compartments
            .iter()
            .map(|(label, compartment)| (label.clone(), (*compartment).clone()))
            .collect()
    }
}

/// Disjoint sets over child indices
struct ChildGroups {
    parent: Vec<usize>,
}

impl ChildGroups {
    fn new(count: usize) -> Self {
        Self {
            parent: (0..count).collect(),
        }
    }

    fn find(&mut self, mut index: usize) -> usize {
        while self.parent[index] != index {
            self.parent[index] = self.parent[self.parent[index]];
            index = self.parent[index];
        }
        index
    }

    /// Returns false when both were already joined
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return false;
        }
        self.parent[root_a] = root_b;
        true
    }
}

/// Storage for every node of a forest
///
/// Handles are never reused: `clear` moves `base` past every handle issued so
/// far, so a handle from before the clear no longer resolves.
#[derive(Debug, Clone)]
pub struct NodeArena {
    nodes: Vec<Node>,
    /// Handle of `nodes[0]`
    base: usize,
    separator: String,
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeArena {
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_LABEL_SEPARATOR)
    }

    pub fn with_separator(separator: impl Into<String>) -> Self {
        Self {
            nodes: Vec::new(),
            base: 0,
            separator: separator.into(),
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node; previously issued handles become invalid
    pub fn clear(&mut self) {
        self.base += self.nodes.len();
        self.nodes.clear();
    }

    fn slot(&self, id: NodeId) -> Option<usize> {
        id.0
            .checked_sub(self.base)
            .filter(|index| *index < self.nodes.len())
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slot(id).and_then(|index| self.nodes.get(index))
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let index = self.slot(id)?;
        self.nodes.get_mut(index)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> MorphologyResult<&Node> {
        self.node(id).ok_or(MorphologyError::NodeNotFound(id))
    }

    pub fn compartment_mut(&mut self, id: NodeId) -> Option<&mut Compartment> {
        match self.node_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Leaf(compartment)) => Some(compartment),
            _ => None,
        }
    }

    pub fn set_label(&mut self, id: NodeId, label: Option<String>) -> MorphologyResult<()> {
        let node = self.node_mut(id).ok_or(MorphologyError::NodeNotFound(id))?;
        node.label = label;
        Ok(())
    }

    /// Wrap a compartment in a new leaf
    pub fn add_leaf(&mut self, compartment: Compartment, label: Option<String>) -> NodeId {
        self.push(Node {
            label,
            kind: NodeKind::Leaf(compartment),
        })
    }

    /// Create an internal node over `children`
    ///
    /// Duplicate child handles are collapsed, keeping first occurrence order.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - a child does not exist (`NodeNotFound`)
    /// - `children` is empty (`EmptyNode`)
    /// - more than one child and no connections (`MissingConnections`)
    /// - fewer than `children - 1` connections (`InsufficientConnections`)
    /// - a connection endpoint is not a leaf, is connected to itself, or lies
    ///   outside every child subtree
    /// - a connection joins two children that are already joined
    ///   (`CyclicConnections`)
    pub fn add_internal(
        &mut self,
        children: Vec<NodeId>,
        connections: Vec<Connection>,
        label: Option<String>,
    ) -> MorphologyResult<NodeId> {
        let mut unique: Vec<NodeId> = Vec::with_capacity(children.len());
        for child in children {
            if !self.contains(child) {
                return Err(MorphologyError::NodeNotFound(child));
            }
            if !unique.contains(&child) {
                unique.push(child);
            }
        }

        self.check_connections(&unique, &connections)?;

        Ok(self.push(Node {
            label,
            kind: NodeKind::Internal {
                children: unique,
                connections,
            },
        }))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.base + self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn check_connections(
        &self,
        children: &[NodeId],
        connections: &[Connection],
    ) -> MorphologyResult<()> {
        if children.is_empty() {
            return Err(MorphologyError::EmptyNode);
        }
        if children.len() > 1 && connections.is_empty() {
            return Err(MorphologyError::MissingConnections {
                children: children.len(),
            });
        }
        let required = children.len() - 1;
        if connections.len() < required {
            return Err(MorphologyError::InsufficientConnections {
                children: children.len(),
                required,
                provided: connections.len(),
            });
        }

        // At least children - 1 connections and none redundant: spanning tree.
        let mut groups = ChildGroups::new(children.len());
        for connection in connections {
            if connection.source == connection.target {
                return Err(MorphologyError::SelfConnection(connection.source));
            }
            let mut owners = [0usize; 2];
            for (slot, endpoint) in connection.endpoints().into_iter().enumerate() {
                if !self.contains(endpoint) {
                    return Err(MorphologyError::NodeNotFound(endpoint));
                }
                if !self.is_leaf(endpoint) {
                    return Err(MorphologyError::EndpointNotLeaf(endpoint));
                }
                owners[slot] = children
                    .iter()
                    .position(|child| self.node_in_tree(*child, endpoint))
                    .ok_or(MorphologyError::ForeignEndpoint(endpoint))?;
            }
            if !groups.union(owners[0], owners[1]) {
                return Err(MorphologyError::CyclicConnections {
                    source_node: connection.source,
                    target_node: connection.target,
                });
            }
        }
        Ok(())
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(Node::is_leaf)
    }

    /// True iff `target` is `root` or lies anywhere below it
    pub fn node_in_tree(&self, root: NodeId, target: NodeId) -> bool {
        if !self.contains(root) {
            return false;
        }
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if let Some(node) = self.node(current) {
                stack.extend_from_slice(node.children());
            }
        }
        false
    }

    /// Pre-order walk of the subtree below `root`, children in insertion order
    pub fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut visited = Vec::new();
        if !self.contains(root) {
            return visited;
        }
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            visited.push(current);
            if let Some(node) = self.node(current) {
                stack.extend(node.children().iter().rev().copied());
            }
        }
        visited
    }

    pub fn leaf_count(&self, root: NodeId) -> usize {
        self.subtree(root)
            .into_iter()
            .filter(|id| self.is_leaf(*id))
            .count()
    }

    /// Full label of every leaf below `id`, relative to `id`
    ///
    /// A leaf's full label is the separator-joined labels of its labeled
    /// ancestors (starting at `id`) followed by its own label. Unlabeled
    /// internal nodes contribute nothing.
    ///
    /// # Errors
    ///
    /// `MissingLabel` for an unlabeled leaf, `DuplicateLabel` when two leaves
    /// resolve to the same full label.
    pub fn fully_labeled_children(&self, id: NodeId) -> MorphologyResult<LabelTable> {
        self.get(id)?;
        let mut table = LabelTable::default();
        let mut stack: Vec<(NodeId, String)> = vec![(id, String::new())];
        while let Some((current, prefix)) = stack.pop() {
            let node = self.get(current)?;
            match &node.kind {
                NodeKind::Leaf(_) => {
                    let label = node
                        .label
                        .as_deref()
                        .ok_or(MorphologyError::MissingLabel(current))?;
                    table.insert(current, format!("{}{}", prefix, label))?;
                }
                NodeKind::Internal { children, .. } => {
                    let prefix = match &node.label {
                        Some(label) => format!("{}{}{}", prefix, label, self.separator),
                        None => prefix,
                    };
                    for child in children.iter().rev() {
                        stack.push((*child, prefix.clone()));
                    }
                }
            }
        }
        Ok(table)
    }

    /// Same as [`NodeArena::fully_labeled_children`], keyed by compartment
    pub fn fully_labeled_leaf_elements(&self, id: NodeId) -> MorphologyResult<LeafElements<'_>> {
        let table = self.fully_labeled_children(id)?;
        let mut compartments = BTreeMap::new();
        for (leaf, label) in table.iter() {
            if let Some(compartment) = self.get(leaf)?.compartment() {
                compartments.insert(label.to_string(), compartment);
            }
        }
        Ok(LeafElements {
            table,
            compartments,
        })
    }

    /// Every connection at `id` and below, rewritten with `full_labels`
    ///
    /// A node's own connections precede those of its descendants. Returns
    /// `None` when the subtree holds no connection.
    pub fn fully_labeled_connections(
        &self,
        id: NodeId,
        full_labels: &LabelTable,
    ) -> MorphologyResult<Option<Vec<LabeledConnection>>> {
        self.get(id)?;
        let mut labeled = Vec::new();
        for current in self.subtree(id) {
            for connection in self.get(current)?.connections() {
                let label_of = |endpoint: NodeId| {
                    full_labels
                        .label(endpoint)
                        .map(str::to_string)
                        .ok_or(MorphologyError::MissingLabel(endpoint))
                };
                labeled.push(LabeledConnection {
                    source: label_of(connection.source)?,
                    target: label_of(connection.target)?,
                    strength: connection.strength,
                });
            }
        }
        Ok(if labeled.is_empty() {
            None
        } else {
            Some(labeled)
        })
    }

    /// Deep-copy the subtree below `id`
    ///
    /// Returns the handle of the copy and the mapping original -> copy for
    /// every node of the subtree. Connections are remapped onto the copied
    /// leaves; labels are copied as they are.
    pub fn deep_clone(&mut self, id: NodeId) -> MorphologyResult<(NodeId, AHashMap<NodeId, NodeId>)> {
        self.get(id)?;
        let order = self.subtree(id);
        let mut copies: AHashMap<NodeId, NodeId> = AHashMap::with_capacity(order.len());

        // Reverse pre-order visits every descendant before its ancestors.
        for original in order.into_iter().rev() {
            let node = self.get(original)?;
            let kind = match &node.kind {
                NodeKind::Leaf(compartment) => NodeKind::Leaf(compartment.clone()),
                NodeKind::Internal {
                    children,
                    connections,
                } => NodeKind::Internal {
                    children: children
                        .iter()
                        .map(|child| remap(&copies, *child))
                        .collect::<MorphologyResult<Vec<_>>>()?,
                    connections: connections
                        .iter()
                        .map(|connection| {
                            Ok(Connection {
                                source: remap(&copies, connection.source)?,
                                target: remap(&copies, connection.target)?,
                                strength: connection.strength,
                            })
                        })
                        .collect::<MorphologyResult<Vec<_>>>()?,
                },
            };
            let copy = Node {
                label: node.label.clone(),
                kind,
            };
            let copy_id = self.push(copy);
            copies.insert(original, copy_id);
        }

        let root = remap(&copies, id)?;
        Ok((root, copies))
    }
}

fn remap(copies: &AHashMap<NodeId, NodeId>, id: NodeId) -> MorphologyResult<NodeId> {
    copies
        .get(&id)
        .copied()
        .ok_or(MorphologyError::NodeNotFound(id))
}
