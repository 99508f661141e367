//! Property tests for lifting and ordering.
//!
//! Random graphs are generated as position counts plus edge lists; acyclic
//! graphs only use edges from higher to lower positions.

use autobuild_graph::{build_order, build_ranks, cycles, DepGraph, GraphError, Position};
use proptest::prelude::*;
use rstest::rstest;
use std::collections::HashSet;

fn graph_from(count: usize, edges: &[(Position, Position)]) -> DepGraph {
    let mut graph = DepGraph::with_positions(count);
    for &(from, to) in edges {
        graph.add_edge(from, to).unwrap();
    }
    graph
}

fn arbitrary_graph() -> impl Strategy<Value = (usize, Vec<(Position, Position)>)> {
    (1usize..24).prop_flat_map(|count| {
        (
            Just(count),
            prop::collection::vec((0..count, 0..count), 0..count * 3),
        )
    })
}

fn acyclic_graph() -> impl Strategy<Value = (usize, Vec<(Position, Position)>)> {
    arbitrary_graph().prop_map(|(count, edges)| {
        let edges = edges
            .into_iter()
            .filter(|(a, b)| a != b)
            .map(|(a, b)| (a.max(b), a.min(b)))
            .collect();
        (count, edges)
    })
}

proptest! {
    #[test]
    fn lift_is_the_induced_subgraph(
        (count, edges) in arbitrary_graph(),
        mask in prop::collection::vec(any::<bool>(), 24),
    ) {
        let graph = graph_from(count, &edges);
        let keep = |p: Position| mask[p];
        let lifted = graph.lift(keep);

        let expected_nodes: Vec<_> = (0..count).filter(|&p| keep(p)).collect();
        prop_assert_eq!(lifted.positions(), expected_nodes.clone());

        for &u in &expected_nodes {
            for &v in &expected_nodes {
                prop_assert_eq!(lifted.has_edge(u, v), graph.has_edge(u, v));
            }
        }
        for (u, v) in lifted.edges() {
            prop_assert!(keep(u) && keep(v));
        }
    }

    #[test]
    fn lift_is_idempotent(
        (count, edges) in arbitrary_graph(),
        mask in prop::collection::vec(any::<bool>(), 24),
    ) {
        let graph = graph_from(count, &edges);
        let once = graph.lift(|p| mask[p]);
        let twice = once.lift(|p| mask[p]);
        prop_assert_eq!(once.positions(), twice.positions());
        prop_assert_eq!(once.edges(), twice.edges());
    }

    #[test]
    fn order_of_acyclic_graph_respects_every_edge((count, edges) in acyclic_graph()) {
        let graph = graph_from(count, &edges);
        let order = build_order(&graph).unwrap();

        prop_assert_eq!(order.len(), count);
        let unique: HashSet<_> = order.iter().copied().collect();
        prop_assert_eq!(unique.len(), count);

        let index_of = |p: Position| order.iter().position(|&x| x == p).unwrap();
        for (u, v) in graph.edges() {
            prop_assert!(index_of(v) < index_of(u), "{} must precede {}", v, u);
        }
    }

    #[test]
    fn ranks_place_dependencies_in_earlier_ranks((count, edges) in acyclic_graph()) {
        let graph = graph_from(count, &edges);
        let ranks = build_ranks(&graph).unwrap();
        let rank_of = |p: Position| ranks.iter().position(|rank| rank.contains(&p)).unwrap();
        for (u, v) in graph.edges() {
            prop_assert!(rank_of(v) < rank_of(u));
        }
    }

    #[test]
    fn cyclic_graphs_fail_with_nontrivial_components((count, edges) in arbitrary_graph()) {
        let graph = graph_from(count, &edges);
        let found = cycles(&graph);
        match build_order(&graph) {
            Ok(order) => {
                prop_assert!(found.is_empty());
                prop_assert_eq!(order.len(), count);
            }
            Err(GraphError::Cycle { cycles }) => {
                prop_assert!(!cycles.is_empty());
                prop_assert!(cycles.iter().all(|c| c.len() >= 2));
                prop_assert_eq!(cycles, found);
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}

#[rstest]
#[case::two_cycle(&[(0, 1), (1, 0)], vec![vec![0, 1]])]
#[case::triangle(&[(0, 1), (1, 2), (2, 0)], vec![vec![0, 1, 2]])]
#[case::cycle_with_tail(&[(3, 0), (0, 1), (1, 0), (1, 2)], vec![vec![0, 1]])]
fn cycle_members_are_exactly_the_participants(
    #[case] edges: &[(Position, Position)],
    #[case] expected: Vec<Vec<Position>>,
) {
    let graph = graph_from(4, edges);
    assert_eq!(
        build_order(&graph),
        Err(GraphError::Cycle { cycles: expected })
    );
}

#[test]
fn lifting_away_a_cycle_member_makes_the_graph_orderable() {
    // 0 <-> 1 cycle, 2 depends on 0
    let graph = graph_from(3, &[(0, 1), (1, 0), (2, 0)]);
    assert!(build_order(&graph).is_err());

    let lifted = graph.lift(|p| p != 1);
    assert_eq!(build_order(&lifted).unwrap(), vec![0, 2]);
}
