//! Forward dependency graph built from depended-on-by annotations.

use std::collections::{BTreeSet, HashMap};

use freeze2nix_core::{PackageName, Requirement};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::error::{LockfileError, Result};
use crate::parser::LockEntry;

/// A pinned package and the packages it depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementNode {
    requirement: Requirement,
    is_direct: bool,
    dependencies: BTreeSet<PackageName>,
}

impl RequirementNode {
    /// The pinned requirement from the package's own entry.
    #[must_use]
    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    /// Normalized package name.
    #[must_use]
    pub fn name(&self) -> &PackageName {
        self.requirement.package()
    }

    /// Whether the package was requested directly.
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.is_direct
    }

    /// Packages this one depends on, sorted.
    #[must_use]
    pub fn dependencies(&self) -> &BTreeSet<PackageName> {
        &self.dependencies
    }
}

/// Packages keyed by normalized name, with edges from dependent to dependency.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<RequirementNode, ()>,
    indices: HashMap<PackageName, NodeIndex>,
}

impl DependencyGraph {
    /// Invert the entries' depended-on-by sets into depends-on edges.
    ///
    /// Fails on two entries for one normalized name and on annotations naming
    /// a package that has no entry.
    pub fn build(entries: Vec<LockEntry>) -> Result<Self> {
        let mut graph = DiGraph::with_capacity(entries.len(), entries.len() * 2);
        let mut indices: HashMap<PackageName, NodeIndex> = HashMap::with_capacity(entries.len());
        let mut lines: HashMap<NodeIndex, usize> = HashMap::with_capacity(entries.len());
        let mut provenance = Vec::with_capacity(entries.len());

        for entry in entries {
            let name = entry.requirement.package().clone();
            if let Some(&existing) = indices.get(&name) {
                return Err(LockfileError::DuplicatePackage {
                    name: name.to_string(),
                    first_line: lines[&existing],
                    second_line: entry.line,
                });
            }
            let idx = graph.add_node(RequirementNode {
                requirement: entry.requirement,
                is_direct: entry.is_direct,
                dependencies: BTreeSet::new(),
            });
            indices.insert(name, idx);
            lines.insert(idx, entry.line);
            provenance.push((idx, entry.depended_on_by));
        }

        for (idx, depended_on_by) in provenance {
            for dependent in depended_on_by {
                let Some(&dependent_idx) = indices.get(&dependent) else {
                    return Err(LockfileError::DanglingDependent {
                        dependency: graph[idx].name().to_string(),
                        dependent: dependent.to_string(),
                    });
                };
                let dependency = graph[idx].name().clone();
                graph[dependent_idx].dependencies.insert(dependency);
                graph.update_edge(dependent_idx, idx, ());
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built dependency graph"
        );
        Ok(Self { graph, indices })
    }

    /// Look up a package by normalized name.
    #[must_use]
    pub fn get(&self, name: &PackageName) -> Option<&RequirementNode> {
        self.indices.get(name).map(|&idx| &self.graph[idx])
    }

    /// All nodes, in lockfile order.
    pub fn nodes(&self) -> impl Iterator<Item = &RequirementNode> {
        self.graph.node_weights()
    }

    /// Directly requested packages, sorted by name.
    #[must_use]
    pub fn direct(&self) -> Vec<&RequirementNode> {
        let mut direct: Vec<_> = self.nodes().filter(|n| n.is_direct()).collect();
        direct.sort_by(|a, b| a.name().cmp(b.name()));
        direct
    }

    /// Number of packages that depend on `name`.
    #[must_use]
    pub fn dependent_count(&self, name: &PackageName) -> usize {
        self.indices.get(name).map_or(0, |&idx| {
            self.graph
                .neighbors_directed(idx, Direction::Incoming)
                .count()
        })
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph has no packages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub(crate) fn inner(&self) -> &DiGraph<RequirementNode, ()> {
        &self.graph
    }
}
