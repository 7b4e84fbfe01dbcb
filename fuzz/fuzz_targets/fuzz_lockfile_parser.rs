#![no_main]

use std::collections::HashMap;

use libfuzzer_sys::fuzz_target;
use freeze2nix_lockfile::{DependencyGraph, parse_lockfile};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(entries) = parse_lockfile(text) else {
        return;
    };
    let count = entries.len();
    let Ok(graph) = DependencyGraph::build(entries) else {
        return;
    };
    assert_eq!(graph.len(), count);

    if let Ok(order) = graph.emission_order() {
        assert_eq!(order.len(), count, "every package is emitted exactly once");

        let position: HashMap<_, _> = order
            .iter()
            .enumerate()
            .map(|(i, node)| (node.name().clone(), i))
            .collect();
        for (i, node) in order.iter().enumerate() {
            for dep in node.dependencies() {
                assert!(position[dep] < i, "{dep} emitted after {}", node.name());
            }
        }

        let again: Vec<_> = graph.emission_order().unwrap().iter().map(|n| n.name()).collect();
        let first: Vec<_> = order.iter().map(|n| n.name()).collect();
        assert_eq!(first, again, "ordering is deterministic");
    }
});
