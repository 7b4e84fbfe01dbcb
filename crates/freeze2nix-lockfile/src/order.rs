//! Deterministic emission order.
//!
//! Kahn elimination over the depends-on graph with a sorted frontier. Each
//! step removes the lexicographically greatest package nothing else still
//! depends on; the removal sequence is reversed at the end, so every package
//! follows all of its dependencies and ties come out in ascending name order.

use std::collections::{BTreeMap, HashMap};

use freeze2nix_core::PackageName;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::error::{LockfileError, Result};
use crate::graph::{DependencyGraph, RequirementNode};

/// Order the graph so dependencies precede their dependents.
///
/// The result depends only on the graph's names and edges, never on entry
/// order or hash iteration order.
pub fn emission_order(graph: &DependencyGraph) -> Result<Vec<&RequirementNode>> {
    let inner = graph.inner();

    let mut dependents: HashMap<NodeIndex, usize> = inner
        .node_indices()
        .map(|idx| {
            (
                idx,
                inner.neighbors_directed(idx, Direction::Incoming).count(),
            )
        })
        .collect();

    let mut frontier: BTreeMap<&PackageName, NodeIndex> = dependents
        .iter()
        .filter(|&(_, &count)| count == 0)
        .map(|(&idx, _)| (inner[idx].name(), idx))
        .collect();

    let mut removed = Vec::with_capacity(inner.node_count());
    while let Some((_, idx)) = frontier.pop_last() {
        removed.push(idx);
        for dependency in inner.neighbors_directed(idx, Direction::Outgoing) {
            if let Some(count) = dependents.get_mut(&dependency) {
                *count -= 1;
                if *count == 0 {
                    frontier.insert(inner[dependency].name(), dependency);
                }
            }
        }
    }

    if removed.len() != inner.node_count() {
        let mut stuck: Vec<String> = dependents
            .into_iter()
            .filter(|&(_, count)| count > 0)
            .map(|(idx, _)| inner[idx].name().to_string())
            .collect();
        stuck.sort();
        return Err(LockfileError::CyclicDependency(stuck));
    }

    removed.reverse();
    debug!(packages = removed.len(), "computed emission order");
    Ok(removed.into_iter().map(|idx| &inner[idx]).collect())
}

impl DependencyGraph {
    /// See [`emission_order`].
    pub fn emission_order(&self) -> Result<Vec<&RequirementNode>> {
        emission_order(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{LockEntry, parse_lockfile};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use test_case::test_case;

    fn order_of(text: &str) -> Result<Vec<String>> {
        let graph = DependencyGraph::build(parse_lockfile(text)?)?;
        Ok(graph
            .emission_order()?
            .iter()
            .map(|n| n.name().to_string())
            .collect())
    }

    #[test]
    fn dependencies_come_first() {
        let order = order_of(
            "\
a==1.0
    # via -r requirements.in
b==1.0
    # via a
c==1.0
    # via
    #   a
    #   b
",
        )
        .unwrap();
        assert_eq!(order, ["c", "b", "a"]);
    }

    #[test]
    fn independent_packages_ascend() {
        let order = order_of(
            "\
b==1.0
    # via -r requirements.in
a==1.0
    # via -r requirements.in
",
        )
        .unwrap();
        assert_eq!(order, ["a", "b"]);
    }

    #[test]
    fn diamond() {
        let order = order_of(
            "\
top==1.0
    # via -r requirements.in
left==1.0
    # via top
right==1.0
    # via top
base==1.0
    # via
    #   left
    #   right
",
        )
        .unwrap();
        assert_eq!(order, ["base", "left", "right", "top"]);
    }

    #[test_case("x==1.0\n    # via y\ny==1.0\n    # via x\n", &["x", "y"] ; "two cycle")]
    #[test_case("x==1.0\n    # via x\n", &["x"] ; "self loop")]
    #[test_case(
        "root==1.0\n    # via -r r.in\np==1.0\n    # via\n    #   q\n    #   root\nq==1.0\n    # via p\n",
        &["p", "q"] ; "cycle below a root"
    )]
    fn cycles_are_reported(text: &str, expected: &[&str]) {
        match order_of(text) {
            Err(LockfileError::CyclicDependency(names)) => assert_eq!(names, expected),
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn empty_graph_orders_to_nothing() {
        let graph = DependencyGraph::build(Vec::new()).unwrap();
        assert!(graph.emission_order().unwrap().is_empty());
    }

    /// Random DAG over `n` nodes: node `i` may depend only on nodes with a larger index.
    fn dag_entries(n: usize, edges: &[(usize, usize)], rotate: usize) -> Vec<LockEntry> {
        let name = |i: usize| format!("pkg{i:02}");
        let mut entries: Vec<LockEntry> = (0..n)
            .map(|i| {
                let depended_on_by: BTreeSet<PackageName> = edges
                    .iter()
                    .filter(|&&(from, to)| to == i && from < to)
                    .map(|&(from, _)| name(from).parse().unwrap())
                    .collect();
                LockEntry {
                    requirement: format!("{}==1.0", name(i)).parse().unwrap(),
                    is_direct: depended_on_by.is_empty(),
                    depended_on_by,
                    line: i + 1,
                }
            })
            .collect();
        entries.rotate_left(rotate % n.max(1));
        entries
    }

    proptest! {
        #[test]
        fn order_is_topological_and_input_independent(
            n in 1usize..20,
            edges in prop::collection::vec((0usize..20, 0usize..20), 0..60),
            rotate in 0usize..20,
        ) {
            let edges: Vec<_> = edges.into_iter().filter(|&(a, b)| a < n && b < n).collect();

            let graph = DependencyGraph::build(dag_entries(n, &edges, 0)).unwrap();
            let order: Vec<String> = graph.emission_order().unwrap().iter().map(|n| n.name().to_string()).collect();
            prop_assert_eq!(order.len(), n);

            let position: HashMap<&str, usize> = order.iter().enumerate().map(|(i, s)| (s.as_str(), i)).collect();
            for node in graph.nodes() {
                for dep in node.dependencies() {
                    prop_assert!(position[dep.as_str()] < position[node.name().as_str()]);
                }
            }

            let rotated = DependencyGraph::build(dag_entries(n, &edges, rotate)).unwrap();
            let rotated_order: Vec<String> = rotated.emission_order().unwrap().iter().map(|n| n.name().to_string()).collect();
            prop_assert_eq!(order, rotated_order);
        }
    }
}
