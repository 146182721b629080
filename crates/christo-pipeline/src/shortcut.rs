//! Shortcutting an Eulerian circuit into a Hamiltonian tour.

use crate::types::{Graph, Tour};

/// Keep each vertex at its first appearance in `circuit`, then close the
/// cycle by returning to the start.
///
/// On a metric graph the result is never longer than the circuit, since
/// each skipped stretch is replaced by a direct edge.
///
/// A circuit over a single vertex stays `[v]` with no closing repeat,
/// and an empty circuit gives an empty tour.
#[must_use]
pub fn shortcut(circuit: &[usize]) -> Tour {
    let Some(&start) = circuit.first() else {
        return Tour::default();
    };

    let span = circuit.iter().max().map_or(0, |&v| v + 1);
    let mut seen = vec![false; span];
    let mut order = Vec::with_capacity(span + 1);
    for &vertex in circuit {
        if !seen[vertex] {
            seen[vertex] = true;
            order.push(vertex);
        }
    }
    if order.len() > 1 {
        order.push(start);
    }

    log::debug!(
        "shortcut: {} circuit vertices -> {} tour vertices",
        circuit.len(),
        order.len()
    );
    Tour::new(order)
}

/// Total weight of consecutive steps along `walk`.
///
/// # Panics
///
/// Panics if `walk` names a vertex outside the graph.
#[must_use]
pub fn walk_cost(graph: &Graph, walk: &[usize]) -> f64 {
    walk.windows(2).map(|w| graph.distance(w[0], w[1])).sum()
}

/// Total weight of a closed tour.
///
/// # Panics
///
/// Panics if the tour names a vertex outside the graph.
#[must_use]
pub fn tour_cost(graph: &Graph, tour: &Tour) -> f64 {
    walk_cost(graph, tour.vertices())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Point;

    #[test]
    fn empty_and_single_vertex_circuits() {
        assert!(shortcut(&[]).is_empty());
        assert_eq!(shortcut(&[0]).vertices(), &[0]);
    }

    #[test]
    fn repeats_are_skipped_and_cycle_closed() {
        let tour = shortcut(&[0, 1, 2, 1, 3, 0]);
        assert_eq!(tour.vertices(), &[0, 1, 2, 3, 0]);
        assert!(tour.is_closed());
        assert_eq!(tour.distinct_len(), 4);
    }

    #[test]
    fn two_node_back_and_forth() {
        assert_eq!(shortcut(&[0, 1, 0]).vertices(), &[0, 1, 0]);
    }

    #[test]
    fn shortcut_is_never_longer_on_metric_graph() {
        // A star walked out and back through the centre.
        let graph = Graph::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(-1.0, 0.0),
        ])
        .unwrap();
        let circuit = [0, 1, 0, 2, 0, 3, 0];
        let tour = shortcut(&circuit);
        assert_eq!(tour.vertices(), &[0, 1, 2, 3, 0]);
        assert!(tour_cost(&graph, &tour) <= walk_cost(&graph, &circuit) + 1e-12);
    }

    #[test]
    fn walk_cost_sums_steps() {
        let graph = Graph::new(vec![
            vec![0.0, 2.0, 3.0],
            vec![2.0, 0.0, 4.0],
            vec![3.0, 4.0, 0.0],
        ])
        .unwrap();
        assert!((walk_cost(&graph, &[0, 1, 2, 0]) - 9.0).abs() < f64::EPSILON);
        assert!(walk_cost(&graph, &[1]).abs() < f64::EPSILON);
    }
}
