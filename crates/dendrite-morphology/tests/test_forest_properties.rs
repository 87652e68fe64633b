// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Property tests for forest invariants

use dendrite_mechanisms::Compartment;
use dendrite_morphology::{Connection, MorphologyBuilder, MorphologyError, NodeArena, NodeId};
use proptest::prelude::*;
use proptest::sample::Index;

fn first_leaf(builder: &MorphologyBuilder, root: NodeId) -> NodeId {
    builder
        .arena()
        .subtree(root)
        .into_iter()
        .find(|id| builder.arena().is_leaf(*id))
        .unwrap()
}

/// Add `count` leaves and merge random root pairs until one root is left
fn build_random_tree(count: usize, picks: &[(Index, Index)]) -> MorphologyBuilder {
    let mut builder = MorphologyBuilder::new();
    for i in 0..count {
        builder
            .add_compartment(Compartment::new(), Some(&format!("c{}", i)))
            .unwrap();
    }
    let mut step = 0;
    while builder.root_count() > 1 {
        let roots = builder.roots().to_vec();
        let (first, second) = picks
            .get(step % picks.len().max(1))
            .map(|(a, b)| (a.index(roots.len()), b.index(roots.len() - 1)))
            .unwrap_or((0, 0));
        // Skip over `first` so the two picks are always distinct.
        let second = if second >= first { second + 1 } else { second };

        let source = first_leaf(&builder, roots[first]);
        let target = first_leaf(&builder, roots[second]);
        builder
            .connect([(source, target)], Some(&format!("m{}", step)))
            .unwrap();
        assert_eq!(builder.root_count(), roots.len() - 1);
        assert_eq!(builder.compartment_count(), count);
        step += 1;
    }
    builder
}

proptest! {
    #[test]
    fn prop_random_merges_keep_every_leaf(
        count in 1usize..24,
        picks in prop::collection::vec(any::<(Index, Index)>(), 0..32),
    ) {
        let mut builder = build_random_tree(count, &picks);
        let root = builder.roots()[0];
        prop_assert_eq!(builder.leaf_count(root), count);

        let neuron = builder.done("random").unwrap();
        prop_assert_eq!(neuron.compartment_count(), count);
        prop_assert_eq!(neuron.connections().len(), count - 1);
        prop_assert!(builder.is_empty());
    }

    #[test]
    fn prop_clones_add_distinct_leaves(
        count in 1usize..12,
        clones in 0usize..4,
    ) {
        let mut builder = build_random_tree(count, &[]);
        let root = builder.roots()[0];
        for i in 0..clones {
            let copy = builder.clone_node(root, Some(&format!("copy{}", i))).unwrap();
            prop_assert_ne!(copy, root);
            prop_assert_eq!(builder.leaf_count(copy), count);
        }
        prop_assert_eq!(builder.compartment_count(), count * (clones + 1));

        let result = builder.done("cloned");
        if clones == 0 {
            prop_assert!(result.is_ok());
        } else {
            prop_assert_eq!(
                result.unwrap_err(),
                MorphologyError::NotFullyConnected { roots: clones + 1 }
            );
        }
    }

    #[test]
    fn prop_too_few_connections_rejected(
        children in 2usize..10,
        provided in 0usize..9,
    ) {
        prop_assume!(provided < children - 1);
        let mut arena = NodeArena::new();
        let leaves: Vec<NodeId> = (0..children)
            .map(|i| arena.add_leaf(Compartment::new(), Some(format!("l{}", i))))
            .collect();
        let connections: Vec<Connection> = leaves
            .windows(2)
            .take(provided)
            .map(|pair| Connection::new(pair[0], pair[1]))
            .collect();

        let err = arena.add_internal(leaves, connections, None).unwrap_err();
        if provided == 0 {
            prop_assert_eq!(err, MorphologyError::MissingConnections { children });
        } else {
            prop_assert_eq!(
                err,
                MorphologyError::InsufficientConnections {
                    children,
                    required: children - 1,
                    provided,
                }
            );
        }
    }
}
