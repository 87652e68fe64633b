// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Compartment Template Tests
//!
//! Instances created from a template must never share mechanism state with
//! the template or with each other.

use dendrite_mechanisms::{
    Compartment, CompartmentTemplate, Mechanism, ParameterInterval, ParameterValue,
};

fn soma_template() -> CompartmentTemplate {
    CompartmentTemplate::new("soma")
        .with_mechanism("membrane", Mechanism::capacitance(2.0))
        .expect("membrane mechanism")
        .with_mechanism(
            "excitatory",
            Mechanism::conductance_based_synapse(1.0, 0.0, 5.0),
        )
        .expect("synapse mechanism")
}

#[test]
fn test_instances_start_from_defaults() {
    let template = soma_template();
    let instance = template.instantiate();

    assert_eq!(template.name(), "soma");
    assert_eq!(&instance, template.defaults());
    assert_eq!(instance.len(), 2);
}

#[test]
fn test_instance_edits_do_not_leak() {
    let template = soma_template();
    let mut first = template.instantiate();
    let second = template.instantiate();

    first
        .mechanism_mut("membrane")
        .expect("membrane present")
        .set_parameter("capacitance", 7.5)
        .expect("known parameter");

    assert_eq!(
        template
            .defaults()
            .mechanism("membrane")
            .and_then(|m| m.parameter("capacitance")),
        Some(&ParameterValue::Scalar(2.0))
    );
    assert_eq!(
        second
            .mechanism("membrane")
            .and_then(|m| m.parameter("capacitance")),
        Some(&ParameterValue::Scalar(2.0))
    );
}

#[test]
fn test_interval_parameters_survive_copy() {
    let interval = ParameterInterval::new(1.0, 3.0, 2.0).expect("valid interval");
    let template = CompartmentTemplate::new("dendrite")
        .with_mechanism("membrane", Mechanism::capacitance(interval))
        .expect("membrane mechanism");

    let instance: Compartment = template.instantiate();
    let value = instance
        .mechanism("membrane")
        .and_then(|m| m.parameter("capacitance"))
        .copied()
        .expect("capacitance parameter");

    assert_eq!(value, ParameterValue::Interval(interval));
    assert_eq!(value.representative(), 2.0);
}

#[test]
fn test_compartment_json_roundtrip() {
    let instance = soma_template().instantiate();
    let json = serde_json::to_string(&instance).expect("serialize");
    let back: Compartment = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, instance);
}
