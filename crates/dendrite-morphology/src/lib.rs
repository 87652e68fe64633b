// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Dendrite Morphology
//!
//! Composition engine for multi-compartment neuron morphologies.
//!
//! ## Architecture
//!
//! - **Arena** (`tree`): nodes addressed by `NodeId`, either a leaf wrapping
//!   one `Compartment` or an internal node joining child subtrees through
//!   connections that form a spanning tree
//! - **Builder** (`builder`): a forest of independent roots, merged by
//!   `connect`, duplicated by `clone_node`, collapsed by `done`
//! - **Neuron** (`neuron`): the flattened, label-addressed output with
//!   default parameters and a translation table
//!
//! ## Example
//!
//! ```rust
//! use dendrite_mechanisms::{Compartment, Mechanism};
//! use dendrite_morphology::MorphologyBuilder;
//!
//! let compartment = Compartment::new()
//!     .with_mechanism("membrane", Mechanism::capacitance(1.0))
//!     .unwrap();
//!
//! let mut builder = MorphologyBuilder::new();
//! let a = builder.add_compartment(compartment.clone(), Some("node_10")).unwrap();
//! let b = builder.add_compartment(compartment, Some("node_20")).unwrap();
//! builder.connect([(a, b)], Some("node_a")).unwrap();
//!
//! let neuron = builder.done("N").unwrap();
//! assert!(neuron.compartment("node_a.node_10").is_some());
//! assert_eq!(neuron.connections()[0].target, "node_a.node_20");
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod builder;
pub mod neuron;
pub mod tree;
pub mod types;

pub use builder::MorphologyBuilder;
pub use neuron::{
    CompartmentGraph, CompartmentId, GraphConnection, Neuron, Translation, TranslationKind,
};
pub use tree::{
    Connection, LabelTable, LabeledConnection, LeafElements, Node, NodeArena, NodeKind,
    DEFAULT_LABEL_SEPARATOR,
};
pub use types::{MorphologyError, MorphologyResult, NodeId};
