//! Graphviz export for inspecting a graph by hand.

use crate::graph::DepGraph;
use crate::Position;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};

/// Render `graph` in Graphviz DOT format.
///
/// `label` names each node, typically by looking the position up in the
/// snapshot it came from. Output is meant for humans and is not stable.
pub fn to_dot<F>(graph: &DepGraph, label: F) -> String
where
    F: Fn(Position) -> String,
{
    let edge_attrs = |_: &DiGraph<Position, ()>, _: EdgeReference<'_, ()>| String::new();
    let node_attrs = |_: &DiGraph<Position, ()>, (_, &position): (NodeIndex, &Position)| {
        format!("label = \"{}\"", escape(&label(position)))
    };
    let dot = Dot::with_attr_getters(
        graph.inner(),
        &[Config::NodeNoLabel, Config::EdgeNoLabel],
        &edge_attrs,
        &node_attrs,
    );
    format!("{dot:?}")
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
