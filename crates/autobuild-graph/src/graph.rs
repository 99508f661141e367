//! Adjacency-list dependency graph keyed by package position.

use crate::error::{GraphError, Result};
use crate::Position;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// Directed dependency graph whose nodes are package positions.
///
/// Edges point from a package to each of its build dependencies. Node
/// weights carry the original position, so a lifted subgraph keeps
/// the identities of the graph it was lifted from.
///
/// # Edge Direction Reminder
///
/// - `add_edge(p, d)` records that `p` depends on `d`
/// - [`DepGraph::dependencies`] follows outgoing edges
/// - [`DepGraph::dependents`] follows incoming edges
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
    inner: DiGraph<Position, ()>,
    lookup: HashMap<Position, NodeIndex>,
}

impl DepGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with one node for each position in `0..count`.
    #[must_use]
    pub fn with_positions(count: usize) -> Self {
        let mut graph = Self {
            inner: DiGraph::with_capacity(count, count),
            lookup: HashMap::with_capacity(count),
        };
        for position in 0..count {
            graph.add_node(position);
        }
        graph
    }

    /// Add a node for `position`. Returns `false` if it was already present.
    pub fn add_node(&mut self, position: Position) -> bool {
        if self.lookup.contains_key(&position) {
            return false;
        }
        let index = self.inner.add_node(position);
        self.lookup.insert(position, index);
        true
    }

    /// Record that `from` depends on `to`.
    ///
    /// Duplicate edges are collapsed and self-dependencies are ignored: a
    /// package never has to wait for itself. Returns whether a new edge was
    /// added.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownPosition`] if either end is not a node.
    pub fn add_edge(&mut self, from: Position, to: Position) -> Result<bool> {
        let source = self.node(from)?;
        let target = self.node(to)?;
        if source == target || self.inner.contains_edge(source, target) {
            return Ok(false);
        }
        self.inner.add_edge(source, target, ());
        Ok(true)
    }

    /// Whether `position` is a node of this graph.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.lookup.contains_key(&position)
    }

    /// Whether the graph records that `from` depends on `to`.
    #[must_use]
    pub fn has_edge(&self, from: Position, to: Position) -> bool {
        match (self.lookup.get(&from), self.lookup.get(&to)) {
            (Some(&source), Some(&target)) => self.inner.contains_edge(source, target),
            _ => false,
        }
    }

    /// Direct dependencies of `position`, sorted. Empty for unknown positions.
    #[must_use]
    pub fn dependencies(&self, position: Position) -> Vec<Position> {
        self.neighbors(position, Direction::Outgoing)
    }

    /// Direct dependents of `position`, sorted. Empty for unknown positions.
    #[must_use]
    pub fn dependents(&self, position: Position) -> Vec<Position> {
        self.neighbors(position, Direction::Incoming)
    }

    /// All node positions, in insertion order.
    #[must_use]
    pub fn positions(&self) -> Vec<Position> {
        self.inner.node_indices().map(|n| self.inner[n]).collect()
    }

    /// All edges as `(dependent, dependency)` pairs, sorted.
    #[must_use]
    pub fn edges(&self) -> Vec<(Position, Position)> {
        let mut edges: Vec<_> = self
            .inner
            .edge_references()
            .map(|edge| (self.inner[edge.source()], self.inner[edge.target()]))
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Extract the induced subgraph on the positions satisfying `keep`.
    ///
    /// The result contains exactly the kept nodes, in their original
    /// relative order, and an edge `(u, v)` iff this graph has it and both
    /// ends are kept. Everything touching a dropped node is discarded, so
    /// the rest of the graph can never add ordering constraints or cycles to
    /// the result. Lifting is idempotent.
    #[must_use]
    pub fn lift<F>(&self, keep: F) -> DepGraph
    where
        F: Fn(Position) -> bool,
    {
        let mut lifted = DepGraph::new();
        for position in self.positions() {
            if keep(position) {
                lifted.add_node(position);
            }
        }

        for edge in self.inner.edge_references() {
            let from = self.inner[edge.source()];
            let to = self.inner[edge.target()];
            if let (Some(&source), Some(&target)) = (lifted.lookup.get(&from), lifted.lookup.get(&to))
            {
                lifted.inner.add_edge(source, target, ());
            }
        }

        tracing::trace!(
            nodes = lifted.node_count(),
            edges = lifted.edge_count(),
            from_nodes = self.node_count(),
            "Lifted subgraph"
        );
        lifted
    }

    /// Extract the induced subgraph on an explicit set of positions.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownPosition`] if a position is not a node of
    /// this graph. An empty selection yields an empty graph.
    pub fn lift_positions<I>(&self, positions: I) -> Result<DepGraph>
    where
        I: IntoIterator<Item = Position>,
    {
        let selected: HashSet<Position> = positions.into_iter().collect();
        if let Some(&unknown) = selected.iter().filter(|p| !self.contains(**p)).min() {
            return Err(GraphError::UnknownPosition(unknown));
        }
        Ok(self.lift(|position| selected.contains(&position)))
    }

    pub(crate) fn inner(&self) -> &DiGraph<Position, ()> {
        &self.inner
    }

    fn node(&self, position: Position) -> Result<NodeIndex> {
        self.lookup
            .get(&position)
            .copied()
            .ok_or(GraphError::UnknownPosition(position))
    }

    fn neighbors(&self, position: Position, direction: Direction) -> Vec<Position> {
        let Some(&index) = self.lookup.get(&position) else {
            return Vec::new();
        };
        let mut neighbors: Vec<_> = self
            .inner
            .neighbors_directed(index, direction)
            .map(|n| self.inner[n])
            .collect();
        neighbors.sort_unstable();
        neighbors
    }
}
