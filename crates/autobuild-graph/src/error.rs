//! Error types for graph operations.

use crate::Position;
use thiserror::Error;

/// The error type for dependency graph operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A position was referenced that is not a node of the graph.
    #[error("position {0} is not a node of the dependency graph")]
    UnknownPosition(Position),

    /// The graph contains cycles, so no build order exists.
    ///
    /// `cycles` holds every strongly connected component with at least two
    /// members, each sorted by position.
    #[error("dependency cycle detected ({} cyclic component(s))", cycles.len())]
    Cycle {
        /// Non-trivial strongly connected components.
        cycles: Vec<Vec<Position>>,
    },
}

/// A specialized Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
