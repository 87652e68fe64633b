// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Dendrite - multi-compartment neuron morphology builder
//!
//! Dendrite composes small modeling primitives ("compartments", each carrying
//! a set of biophysical mechanisms) into a connected, acyclic tree, and
//! flattens that tree into a label-addressed description that a placement
//! engine consumes.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! dendrite = "0.1"  # Default: config loader + observability
//! ```
//!
//! ## Feature Flags
//!
//! - **`config-loader`** (default): read `dendrite.toml` with environment and
//!   CLI overrides
//! - **`observability`** (default): `tracing-subscriber` setup with per-crate
//!   debug flags
//!
//! ## Usage
//!
//! ```rust
//! use dendrite::prelude::*;
//!
//! let passive = CompartmentTemplate::new("passive")
//!     .with_mechanism("membrane", Mechanism::capacitance(1.0))?;
//!
//! let mut builder = MorphologyBuilder::new();
//! let soma = builder.add_compartment(passive.instantiate(), Some("soma"))?;
//! let dendrite = builder.add_compartment(passive.instantiate(), Some("dendrite"))?;
//! builder.connect([(soma, dendrite, 0.5)], Some("cell"))?;
//!
//! let neuron = builder.done("pyramidal")?;
//! assert_eq!(
//!     neuron.default_value("connection.cell.soma.cell.dendrite.conductance"),
//!     Some(&ParameterValue::Scalar(0.5))
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: dendrite-mechanisms, dendrite-config       │
//! │  (Mechanism, Compartment, CompartmentTemplate, config)  │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: dendrite-morphology                        │
//! │  (NodeArena, MorphologyBuilder, Neuron)                 │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Infrastructure: dendrite-observability                 │
//! │  (tracing subscriber, debug flags)                      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use dendrite_config as config;
pub use dendrite_mechanisms as mechanisms;

// Re-export algorithms
pub use dendrite_morphology as morphology;

// Re-export infrastructure
#[cfg(feature = "observability")]
pub use dendrite_observability as observability;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{BuilderConfig, DendriteConfig};
    pub use crate::mechanisms::{
        Compartment, CompartmentTemplate, Mechanism, MechanismKind, ParameterInterval,
        ParameterValue,
    };
    pub use crate::morphology::{
        Connection, LabeledConnection, MorphologyBuilder, MorphologyError, Neuron, NodeId,
    };
}
