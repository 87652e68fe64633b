// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core types for morphology operations.
*/

use core::fmt;
use serde::{Deserialize, Serialize};

use dendrite_mechanisms::MechanismError;

/// Handle of a node in the arena
///
/// Identity is by handle: two structurally identical subtrees built
/// independently, or a subtree and its clone, never share handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Result type for morphology operations
pub type MorphologyResult<T> = Result<T, MorphologyError>;

/// Errors that can occur while composing or finalizing a morphology
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MorphologyError {
    #[error("Node not found in morphology builder: {0}")]
    NodeNotFound(NodeId),

    #[error("Node has no children")]
    EmptyNode,

    #[error("A node with {children} children requires connections between them, none were provided")]
    MissingConnections { children: usize },

    #[error(
        "A node with {children} children requires {required} connections to be connected and acyclic. Instead {provided} connections were provided"
    )]
    InsufficientConnections {
        children: usize,
        required: usize,
        provided: usize,
    },

    #[error("Connection endpoint {0} is not a leaf compartment")]
    EndpointNotLeaf(NodeId),

    #[error("Connection endpoint {0} is connected to itself")]
    SelfConnection(NodeId),

    #[error("Connection endpoint {0} is not contained in any child of the new node")]
    ForeignEndpoint(NodeId),

    #[error("Connection {source_node} -> {target_node} closes a cycle")]
    CyclicConnections {
        source_node: NodeId,
        target_node: NodeId,
    },

    #[error("connect requires at least one connection")]
    NoConnections,

    #[error("Connection {source_node} -> {target_node} lies within the single subtree {root}")]
    SameRoot {
        source_node: NodeId,
        target_node: NodeId,
        root: NodeId,
    },

    #[error(
        "One root node needs to exist that contains all other nodes. Otherwise the neuron is not fully connected. Instead {roots} nodes exist"
    )]
    NotFullyConnected { roots: usize },

    #[error("Leaf {0} has no label")]
    MissingLabel(NodeId),

    #[error("Full label '{0}' is used by more than one leaf")]
    DuplicateLabel(String),

    #[error("Connection refers to unknown compartment '{0}'")]
    UnknownCompartment(String),

    #[error("Parameter key '{0}' is produced more than once")]
    DuplicateParameter(String),

    #[error("Too many compartments: {count} exceeds maximum {max}")]
    TooManyCompartments { count: usize, max: usize },

    #[error("Compartment at {node} has no mechanism '{label}'")]
    UnknownMechanism { node: NodeId, label: String },

    #[error("Mechanism error: {0}")]
    Mechanism(#[from] MechanismError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for MorphologyError {
    fn from(err: serde_json::Error) -> Self {
        MorphologyError::Serialization(err.to_string())
    }
}
