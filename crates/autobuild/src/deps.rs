//! Dependency graph construction and build-dependency resolution.
//!
//! Build dependencies that name a package in the same snapshot become graph
//! edges. Names that do not resolve locally are left out of the graph and
//! are checked separately by [`find_unresolved`], which only looks at the
//! packages about to be rebuilt.

use crate::domain::Package;
use crate::snapshot::Snapshot;
use autobuild_graph::{DepGraph, Position};
use serde::Serialize;
use std::collections::HashMap;

/// Build the dependency graph for `packages`.
///
/// One node per position; an edge `P -> D` for every build dependency `D` of
/// `P` found in `index`.
///
/// # Errors
///
/// Returns a graph error if `index` points outside `packages`.
pub fn build_graph(
    packages: &[Package],
    index: &HashMap<String, Position>,
) -> autobuild_graph::Result<DepGraph> {
    let mut graph = DepGraph::with_positions(packages.len());

    for (position, pkg) in packages.iter().enumerate() {
        for dep in &pkg.build_deps {
            match index.get(dep) {
                Some(&target) => {
                    graph.add_edge(position, target)?;
                }
                None => {
                    tracing::trace!(package = %pkg.name, dependency = %dep, "Dependency not in snapshot");
                }
            }
        }
    }

    Ok(graph)
}

/// A rebuild candidate whose build dependencies do not all exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unresolved {
    /// Name of the candidate package
    pub package: String,
    /// Dependency names missing from the snapshot, in declaration order
    pub missing: Vec<String>,
}

/// Check that every build dependency of every candidate exists in `snapshot`.
///
/// A dependency only has to exist, not to be rebuilt. All failures are
/// collected, one entry per failing candidate in candidate order, so the
/// caller can report them together. Positions outside the snapshot are
/// skipped.
#[must_use]
pub fn find_unresolved(snapshot: &dyn Snapshot, candidates: &[Position]) -> Vec<Unresolved> {
    candidates
        .iter()
        .filter_map(|&position| snapshot.packages().get(position))
        .filter_map(|pkg| {
            let missing: Vec<String> = pkg
                .build_deps
                .iter()
                .filter(|dep| snapshot.position(dep).is_none())
                .cloned()
                .collect();

            if missing.is_empty() {
                None
            } else {
                Some(Unresolved {
                    package: pkg.name.clone(),
                    missing,
                })
            }
        })
        .collect()
}
