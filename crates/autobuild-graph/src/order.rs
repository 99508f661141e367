//! Build ordering and cycle diagnosis.
//!
//! Ordering uses Kahn's algorithm over outgoing (dependency) degrees, level by
//! level, so every package lands in a later rank than all of its
//! dependencies. When some nodes can never be released, the graph is cyclic
//! and Tarjan's SCC algorithm names the offending components.

use crate::error::{GraphError, Result};
use crate::graph::DepGraph;
use crate::Position;
use petgraph::algo::tarjan_scc;
use petgraph::Direction;
use std::collections::HashMap;

/// Compute a dependencies-first build order.
///
/// For every edge `u -> v` (u depends on v), `v` precedes `u` in the result.
/// Every node appears exactly once. Packages with no ordering constraint
/// between them keep ascending position order within their rank.
///
/// # Errors
///
/// Returns [`GraphError::Cycle`] with the non-trivial strongly connected
/// components when the graph is cyclic. There is no partial order.
pub fn build_order(graph: &DepGraph) -> Result<Vec<Position>> {
    Ok(build_ranks(graph)?.concat())
}

/// Group the graph into build ranks.
///
/// Rank 0 holds packages with no dependencies inside the graph; rank `n`
/// holds packages whose dependencies all sit in ranks below `n`. Members of
/// a rank are independent of each other and sorted by position.
///
/// # Errors
///
/// Returns [`GraphError::Cycle`] when the graph is cyclic.
pub fn build_ranks(graph: &DepGraph) -> Result<Vec<Vec<Position>>> {
    let inner = graph.inner();

    // Remaining unbuilt dependencies per node
    let mut pending: HashMap<_, usize> = inner
        .node_indices()
        .map(|n| (n, inner.neighbors_directed(n, Direction::Outgoing).count()))
        .collect();

    let mut ready: Vec<_> = pending
        .iter()
        .filter(|(_, remaining)| **remaining == 0)
        .map(|(&n, _)| n)
        .collect();

    let mut ranks: Vec<Vec<Position>> = Vec::new();
    let mut placed = 0;

    while !ready.is_empty() {
        ready.sort_unstable_by_key(|&n| inner[n]);
        placed += ready.len();

        let mut next = Vec::new();
        for &node in &ready {
            for dependent in inner.neighbors_directed(node, Direction::Incoming) {
                if let Some(remaining) = pending.get_mut(&dependent) {
                    *remaining -= 1;
                    if *remaining == 0 {
                        next.push(dependent);
                    }
                }
            }
        }

        ranks.push(ready.iter().map(|&n| inner[n]).collect());
        ready = next;
    }

    if placed != graph.node_count() {
        let cycles = cycles(graph);
        tracing::debug!(
            unordered = graph.node_count() - placed,
            components = cycles.len(),
            "Build order blocked by dependency cycle"
        );
        return Err(GraphError::Cycle { cycles });
    }

    Ok(ranks)
}

/// All strongly connected components, including single nodes.
///
/// Members of each component are sorted by position, and components are
/// ordered by their smallest member.
#[must_use]
pub fn strongly_connected(graph: &DepGraph) -> Vec<Vec<Position>> {
    let inner = graph.inner();
    let mut components: Vec<Vec<Position>> = tarjan_scc(inner)
        .into_iter()
        .map(|component| {
            let mut members: Vec<_> = component.into_iter().map(|n| inner[n]).collect();
            members.sort_unstable();
            members
        })
        .collect();
    components.sort_unstable_by_key(|members| members.first().copied());
    components
}

/// Strongly connected components with at least two members.
///
/// Single-node components are never cycles here: the graph does not hold
/// self-dependencies.
#[must_use]
pub fn cycles(graph: &DepGraph) -> Vec<Vec<Position>> {
    strongly_connected(graph)
        .into_iter()
        .filter(|members| members.len() >= 2)
        .collect()
}
