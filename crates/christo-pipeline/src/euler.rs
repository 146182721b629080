//! Merged multigraph and Eulerian circuit extraction.
//!
//! The multigraph is an arena of edge records. Each vertex keeps a list
//! of `(edge, neighbour)` incidences, so an MST edge and a matching edge
//! between the same pair stay distinct. Traversal marks individual
//! records as used instead of splicing adjacency lists, which removes
//! exactly one occurrence in O(1).

use crate::types::{ChristofidesError, Edge};

/// One side of an edge record, as seen from a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Incidence {
    edge: usize,
    neighbor: usize,
}

/// An undirected multigraph over vertices `0..node_count`.
#[derive(Debug, Clone, Default)]
pub struct Multigraph {
    edges: Vec<Edge>,
    adjacency: Vec<Vec<Incidence>>,
}

impl Multigraph {
    /// Create a multigraph with `node_count` isolated vertices.
    #[must_use]
    pub fn new(node_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            adjacency: vec![Vec::new(); node_count],
        }
    }

    /// Union of the MST and matching edge lists, keeping duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`ChristofidesError::InvalidInput`] if any edge names a
    /// vertex outside `0..node_count`.
    pub fn merge(
        node_count: usize,
        mst: &[Edge],
        matching: &[Edge],
    ) -> Result<Self, ChristofidesError> {
        let mut graph = Self::new(node_count);
        for edge in mst.iter().chain(matching) {
            graph.add_edge(*edge)?;
        }
        Ok(graph)
    }

    /// Add one edge occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`ChristofidesError::InvalidInput`] if an endpoint is out
    /// of range.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), ChristofidesError> {
        let n = self.adjacency.len();
        if edge.from >= n || edge.to >= n {
            return Err(ChristofidesError::InvalidInput(format!(
                "edge ({}, {}) outside 0..{n}",
                edge.from, edge.to
            )));
        }
        let id = self.edges.len();
        self.edges.push(edge);
        self.adjacency[edge.from].push(Incidence {
            edge: id,
            neighbor: edge.to,
        });
        self.adjacency[edge.to].push(Incidence {
            edge: id,
            neighbor: edge.from,
        });
        Ok(())
    }

    /// Number of vertices.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of edge occurrences.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All edge occurrences in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Degree of `vertex`, counting parallel edges separately.
    #[must_use]
    pub fn degree(&self, vertex: usize) -> usize {
        self.adjacency.get(vertex).map_or(0, Vec::len)
    }

    /// Neighbours of `vertex`, one entry per incident edge occurrence.
    pub fn neighbors(&self, vertex: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency
            .get(vertex)
            .into_iter()
            .flatten()
            .map(|inc| inc.neighbor)
    }

    /// Vertices of odd degree, ascending.
    #[must_use]
    pub fn odd_vertices(&self) -> Vec<usize> {
        (0..self.node_count())
            .filter(|&v| self.degree(v) % 2 == 1)
            .collect()
    }

    /// Extract an Eulerian circuit starting and ending at `start` using
    /// Hierholzer's algorithm with an explicit stack.
    ///
    /// The walk has `edge_count + 1` vertices and uses every edge
    /// occurrence exactly once. At each vertex the earliest unused
    /// incidence (in insertion order) is taken, so the result is
    /// deterministic. An empty multigraph yields `[start]`, or an empty
    /// walk when there are no vertices at all.
    ///
    /// # Errors
    ///
    /// Returns [`ChristofidesError::ParityViolation`] if some vertex has
    /// odd degree, [`ChristofidesError::IncompleteCircuit`] if edges are
    /// unreachable from `start`, and [`ChristofidesError::InvalidInput`]
    /// if `start` is out of range.
    pub fn eulerian_circuit(&self, start: usize) -> Result<Vec<usize>, ChristofidesError> {
        let n = self.node_count();
        if n == 0 {
            return Ok(Vec::new());
        }
        if start >= n {
            return Err(ChristofidesError::InvalidInput(format!(
                "circuit start {start} outside 0..{n}"
            )));
        }
        if let Some(vertex) = (0..n).find(|&v| self.degree(v) % 2 == 1) {
            return Err(ChristofidesError::ParityViolation {
                vertex,
                degree: self.degree(vertex),
            });
        }

        let mut used = vec![false; self.edges.len()];
        let mut cursor = vec![0_usize; n];
        let mut stack = vec![start];
        let mut circuit = Vec::with_capacity(self.edges.len() + 1);

        while let Some(&current) = stack.last() {
            let incidences = &self.adjacency[current];
            let mut next = None;
            while let Some(inc) = incidences.get(cursor[current]) {
                cursor[current] += 1;
                if !used[inc.edge] {
                    used[inc.edge] = true;
                    next = Some(inc.neighbor);
                    break;
                }
            }
            match next {
                Some(neighbor) => stack.push(neighbor),
                None => {
                    stack.pop();
                    circuit.push(current);
                }
            }
        }
        circuit.reverse();

        let walked = circuit.len().saturating_sub(1);
        if walked != self.edges.len() {
            return Err(ChristofidesError::IncompleteCircuit {
                used: walked,
                total: self.edges.len(),
            });
        }

        log::debug!(
            "euler: circuit of {} vertices over {} edges",
            circuit.len(),
            self.edges.len()
        );
        Ok(circuit)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Count each undirected edge occurrence in a walk, keyed `(min, max)`.
    fn walk_edge_counts(walk: &[usize]) -> Vec<(usize, usize)> {
        let mut keys: Vec<_> = walk
            .windows(2)
            .map(|w| (w[0].min(w[1]), w[0].max(w[1])))
            .collect();
        keys.sort_unstable();
        keys
    }

    fn edge_counts(graph: &Multigraph) -> Vec<(usize, usize)> {
        let mut keys: Vec<_> = graph.edges().iter().map(Edge::key).collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn merge_keeps_parallel_edges() {
        let mst = [Edge::new(0, 1, 1.0)];
        let matching = [Edge::new(0, 1, 1.0)];
        let graph = Multigraph::merge(2, &mst, &matching).unwrap();
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.degree(0), 2);
        assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![1, 1]);
    }

    #[test]
    fn double_edge_circuit_walks_both_occurrences() {
        let graph =
            Multigraph::merge(2, &[Edge::new(0, 1, 1.0)], &[Edge::new(0, 1, 1.0)]).unwrap();
        assert_eq!(graph.eulerian_circuit(0).unwrap(), vec![0, 1, 0]);
    }

    #[test]
    fn square_cycle_circuit() {
        let mst = [Edge::new(0, 1, 1.0), Edge::new(1, 2, 1.0), Edge::new(0, 3, 1.0)];
        let matching = [Edge::new(2, 3, 1.0)];
        let graph = Multigraph::merge(4, &mst, &matching).unwrap();
        assert!(graph.odd_vertices().is_empty());
        assert_eq!(graph.eulerian_circuit(0).unwrap(), vec![0, 1, 2, 3, 0]);
    }

    #[test]
    fn figure_eight_uses_every_edge_once() {
        // Two triangles sharing vertex 0.
        let edges = [
            Edge::new(0, 1, 1.0),
            Edge::new(1, 2, 1.0),
            Edge::new(2, 0, 1.0),
            Edge::new(0, 3, 1.0),
            Edge::new(3, 4, 1.0),
            Edge::new(4, 0, 1.0),
        ];
        let graph = Multigraph::merge(5, &edges, &[]).unwrap();
        for start in 0..5 {
            let circuit = graph.eulerian_circuit(start).unwrap();
            assert_eq!(circuit.len(), edges.len() + 1);
            assert_eq!(circuit.first(), Some(&start));
            assert_eq!(circuit.last(), Some(&start));
            assert_eq!(walk_edge_counts(&circuit), edge_counts(&graph));
        }
    }

    #[test]
    fn odd_vertex_is_a_parity_violation() {
        let graph = Multigraph::merge(3, &[Edge::new(0, 1, 1.0), Edge::new(1, 2, 1.0)], &[])
            .unwrap();
        let err = graph.eulerian_circuit(0).unwrap_err();
        assert_eq!(err, ChristofidesError::ParityViolation { vertex: 0, degree: 1 });
    }

    #[test]
    fn disconnected_components_are_reported() {
        let edges = [
            Edge::new(0, 1, 1.0),
            Edge::new(0, 1, 1.0),
            Edge::new(2, 3, 1.0),
            Edge::new(2, 3, 1.0),
        ];
        let graph = Multigraph::merge(4, &edges, &[]).unwrap();
        let err = graph.eulerian_circuit(0).unwrap_err();
        assert_eq!(err, ChristofidesError::IncompleteCircuit { used: 2, total: 4 });
    }

    #[test]
    fn edgeless_graphs() {
        assert!(Multigraph::new(0).eulerian_circuit(0).unwrap().is_empty());
        assert_eq!(Multigraph::new(1).eulerian_circuit(0).unwrap(), vec![0]);
    }

    #[test]
    fn out_of_range_inputs_are_rejected() {
        assert!(Multigraph::merge(2, &[Edge::new(0, 2, 1.0)], &[]).is_err());
        assert!(matches!(
            Multigraph::new(2).eulerian_circuit(5),
            Err(ChristofidesError::InvalidInput(_))
        ));
    }

    #[test]
    fn long_cycle_does_not_recurse() {
        let n = 200_000;
        let edges: Vec<Edge> = (0..n).map(|i| Edge::new(i, (i + 1) % n, 1.0)).collect();
        let graph = Multigraph::merge(n, &edges, &[]).unwrap();
        let circuit = graph.eulerian_circuit(0).unwrap();
        assert_eq!(circuit.len(), n + 1);
    }
}
