//! Dependency graphs over package positions.
//!
//! Nodes are identified by their [`Position`] in a package snapshot. An edge
//! `u -> v` means "u depends on v": `v` has to be built before `u`.
//!
//! The crate provides the operations a rebuild planner needs on top of a
//! single adjacency-list representation:
//!
//! - [`DepGraph::lift`]: induced subgraph on a subset of positions
//! - [`build_order`] / [`build_ranks`]: dependencies-first ordering
//! - [`cycles`]: strongly connected components that prevent ordering
//! - [`to_dot`]: Graphviz export for debugging
//!
//! # Example
//!
//! ```
//! use autobuild_graph::{build_order, DepGraph};
//!
//! let mut graph = DepGraph::with_positions(3);
//! graph.add_edge(0, 1).unwrap(); // 0 depends on 1
//! graph.add_edge(1, 2).unwrap(); // 1 depends on 2
//!
//! let lifted = graph.lift(|pos| pos != 2);
//! assert_eq!(build_order(&lifted).unwrap(), vec![1, 0]);
//! ```

#![forbid(unsafe_code)]

mod dot;
pub mod error;
mod graph;
mod order;

pub use dot::to_dot;
pub use error::{GraphError, Result};
pub use graph::DepGraph;
pub use order::{build_order, build_ranks, cycles, strongly_connected};

/// Stable identity of a package: its index in the snapshot's package sequence.
pub type Position = usize;
