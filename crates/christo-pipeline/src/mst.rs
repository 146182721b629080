//! Minimum spanning tree via Prim's algorithm.
//!
//! Grows the tree from [`ROOT`] using a binary heap of candidate edges.
//! Stale candidates (whose destination is already in the tree) are
//! skipped on extraction rather than removed eagerly.
//!
//! Ties are broken explicitly on `(weight, destination, source)`, all
//! ascending, so the tree is fully determined by the distance matrix.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::types::{ChristofidesError, Edge, Graph, total_weight};

/// Vertex the tree is grown from.
pub const ROOT: usize = 0;

/// A candidate edge waiting in the frontier heap.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    weight: f64,
    to: usize,
    from: usize,
}

impl Candidate {
    fn sort_key(&self, other: &Self) -> Ordering {
        self.weight
            .total_cmp(&other.weight)
            .then(self.to.cmp(&other.to))
            .then(self.from.cmp(&other.from))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key(other)
    }
}

/// Push an edge from `from` to every vertex not yet in the tree.
///
/// Infinite distances are "no edge" and never become candidates.
fn push_frontier(
    graph: &Graph,
    from: usize,
    in_tree: &[bool],
    frontier: &mut BinaryHeap<Reverse<Candidate>>,
) {
    for (to, &weight) in graph.row(from).iter().enumerate() {
        if !in_tree[to] && weight.is_finite() {
            frontier.push(Reverse(Candidate { weight, to, from }));
        }
    }
}

/// Build a minimum spanning tree of `graph`.
///
/// Returns exactly `node_count - 1` edges. Each edge's `from` is the
/// vertex that was already in the tree and `to` is the vertex it
/// brought in, in the order they were added. Graphs with zero or one
/// node produce an empty tree.
///
/// # Errors
///
/// Returns [`ChristofidesError::DisconnectedGraph`] if infinite
/// distances leave some vertex unreachable from [`ROOT`].
pub fn minimum_spanning_tree(graph: &Graph) -> Result<Vec<Edge>, ChristofidesError> {
    let n = graph.node_count();
    if n <= 1 {
        return Ok(Vec::new());
    }

    let mut in_tree = vec![false; n];
    let mut tree = Vec::with_capacity(n - 1);
    let mut frontier = BinaryHeap::new();

    in_tree[ROOT] = true;
    push_frontier(graph, ROOT, &in_tree, &mut frontier);

    while tree.len() < n - 1 {
        let Some(Reverse(candidate)) = frontier.pop() else {
            break;
        };
        if in_tree[candidate.to] {
            continue;
        }
        in_tree[candidate.to] = true;
        tree.push(Edge::new(candidate.from, candidate.to, candidate.weight));
        push_frontier(graph, candidate.to, &in_tree, &mut frontier);
    }

    if tree.len() < n - 1 {
        return Err(ChristofidesError::DisconnectedGraph {
            reached: tree.len() + 1,
            node_count: n,
        });
    }

    log::debug!(
        "mst: {} edges over {n} nodes, weight {:.3}",
        tree.len(),
        total_weight(&tree)
    );
    Ok(tree)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::generate::{InstanceConfig, instance};
    use crate::types::Point;

    use petgraph::algo::min_spanning_tree;
    use petgraph::data::Element;
    use petgraph::graph::UnGraph;

    /// Reference MST weight computed by petgraph's Kruskal.
    fn reference_weight(graph: &Graph) -> f64 {
        let mut g = UnGraph::<(), f64>::new_undirected();
        let nodes: Vec<_> = graph.vertices().map(|_| g.add_node(())).collect();
        for i in graph.vertices() {
            for j in (i + 1)..graph.node_count() {
                g.add_edge(nodes[i], nodes[j], graph.distance(i, j));
            }
        }
        min_spanning_tree(&g)
            .filter_map(|element| match element {
                Element::Edge { weight, .. } => Some(weight),
                Element::Node { .. } => None,
            })
            .sum()
    }

    fn square() -> Graph {
        Graph::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn empty_and_single_node_give_empty_tree() {
        assert!(minimum_spanning_tree(&Graph::new(Vec::new()).unwrap())
            .unwrap()
            .is_empty());
        assert!(minimum_spanning_tree(&Graph::new(vec![vec![0.0]]).unwrap())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn two_nodes_give_single_edge() {
        let graph = Graph::new(vec![vec![0.0, 2.5], vec![2.5, 0.0]]).unwrap();
        let tree = minimum_spanning_tree(&graph).unwrap();
        assert_eq!(tree, vec![Edge::new(0, 1, 2.5)]);
    }

    #[test]
    fn square_tree_has_unit_edges_and_fixed_tie_break() {
        let tree = minimum_spanning_tree(&square()).unwrap();
        assert_eq!(tree.len(), 3);
        assert!((total_weight(&tree) - 3.0).abs() < 1e-12);
        // Equal weights resolve to the lowest destination, then the
        // lowest source.
        let keys: Vec<_> = tree.iter().map(|e| (e.from, e.to)).collect();
        assert_eq!(keys, vec![(0, 1), (1, 2), (0, 3)]);
    }

    #[test]
    fn matches_reference_weight_on_random_instances() {
        for seed in 0..20 {
            for node_count in [3, 5, 8, 13] {
                let graph = instance(&InstanceConfig {
                    node_count,
                    seed,
                    ..InstanceConfig::default()
                })
                .unwrap();
                let tree = minimum_spanning_tree(&graph).unwrap();
                assert_eq!(tree.len(), node_count - 1);
                let expected = reference_weight(&graph);
                assert!(
                    (total_weight(&tree) - expected).abs() < 1e-6,
                    "seed {seed}, n {node_count}: {} vs {expected}",
                    total_weight(&tree)
                );
            }
        }
    }

    #[test]
    fn tree_spans_every_vertex() {
        let graph = instance(&InstanceConfig {
            node_count: 10,
            seed: 7,
            ..InstanceConfig::default()
        })
        .unwrap();
        let tree = minimum_spanning_tree(&graph).unwrap();
        let mut reached = vec![false; graph.node_count()];
        reached[ROOT] = true;
        for edge in &tree {
            assert!(reached[edge.from], "edge {edge:?} leaves the tree");
            assert!(!reached[edge.to], "edge {edge:?} closes a cycle");
            reached[edge.to] = true;
        }
        assert!(reached.iter().all(|&r| r));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let graph = square();
        assert_eq!(
            minimum_spanning_tree(&graph).unwrap(),
            minimum_spanning_tree(&graph).unwrap()
        );
    }

    #[test]
    fn infinite_distances_report_disconnected_graph() {
        let inf = f64::INFINITY;
        let graph = Graph::new(vec![
            vec![0.0, 1.0, inf, inf],
            vec![1.0, 0.0, inf, inf],
            vec![inf, inf, 0.0, 1.0],
            vec![inf, inf, 1.0, 0.0],
        ])
        .unwrap();
        let err = minimum_spanning_tree(&graph).unwrap_err();
        assert_eq!(
            err,
            ChristofidesError::DisconnectedGraph {
                reached: 2,
                node_count: 4
            }
        );
    }
}
