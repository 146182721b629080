//! Shared types for the christo tour construction pipeline.

use serde::{Deserialize, Serialize};

use crate::matching::MatcherKind;

/// Largest absolute difference tolerated between `d[i][j]` and `d[j][i]`
/// before a distance matrix is rejected as asymmetric.
pub const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Slack allowed when checking the triangle inequality, so that
/// rounding in Euclidean distances does not reject metric inputs.
pub const METRIC_TOLERANCE: f64 = 1e-9;

/// A 2D point, used only as a coordinate side-table for renderers and
/// for deriving Euclidean distances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Complete, symmetric, weighted graph over vertices `0..node_count`.
///
/// Distances are stored row-major in a dense `node_count × node_count`
/// matrix. The graph is validated on construction and immutable
/// afterwards; every pipeline stage borrows it read-only.
///
/// `f64::INFINITY` is accepted as "no edge". Such a graph is not metric
/// and the MST builder reports [`ChristofidesError::DisconnectedGraph`]
/// when infinite entries cut it apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGraph", into = "RawGraph")]
pub struct Graph {
    node_count: usize,
    distances: Vec<f64>,
    coordinates: Option<Vec<Point>>,
}

impl Graph {
    /// Build a graph from a square distance matrix.
    ///
    /// # Errors
    ///
    /// Returns [`ChristofidesError::InvalidInput`] if the matrix is not
    /// square, has a non-zero diagonal, contains negative or NaN
    /// entries, or is not symmetric within [`SYMMETRY_TOLERANCE`].
    pub fn new(distances: Vec<Vec<f64>>) -> Result<Self, ChristofidesError> {
        Self::build(distances, None)
    }

    /// Build a graph from a distance matrix plus one coordinate per vertex.
    ///
    /// # Errors
    ///
    /// Same as [`Graph::new`], plus [`ChristofidesError::InvalidInput`]
    /// when the coordinate count differs from the matrix dimension.
    pub fn with_coordinates(
        distances: Vec<Vec<f64>>,
        coordinates: Vec<Point>,
    ) -> Result<Self, ChristofidesError> {
        Self::build(distances, Some(coordinates))
    }

    /// Build a Euclidean graph from points.
    ///
    /// Pairwise distances are computed in both directions and averaged,
    /// so the stored matrix is exactly symmetric even if the two
    /// directions round differently. The points are kept as the
    /// coordinate side-table.
    ///
    /// # Errors
    ///
    /// Returns [`ChristofidesError::InvalidInput`] if any coordinate is
    /// not finite.
    pub fn from_points(points: Vec<Point>) -> Result<Self, ChristofidesError> {
        if let Some(index) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(ChristofidesError::InvalidInput(format!(
                "coordinate {index} is not finite"
            )));
        }

        let n = points.len();
        let mut raw = vec![vec![0.0; n]; n];
        for (i, row) in raw.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                if i != j {
                    *cell = points[i].distance(points[j]);
                }
            }
        }
        for i in 0..n {
            for j in (i + 1)..n {
                let avg = f64::midpoint(raw[i][j], raw[j][i]);
                raw[i][j] = avg;
                raw[j][i] = avg;
            }
        }

        Self::build(raw, Some(points))
    }

    fn build(
        rows: Vec<Vec<f64>>,
        coordinates: Option<Vec<Point>>,
    ) -> Result<Self, ChristofidesError> {
        let n = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(ChristofidesError::InvalidInput(format!(
                "distance matrix is not square: row {i} has {} entries, expected {n}",
                row.len()
            )));
        }
        if let Some(coords) = &coordinates
            && coords.len() != n
        {
            return Err(ChristofidesError::InvalidInput(format!(
                "{} coordinates given for {n} nodes",
                coords.len()
            )));
        }

        for (i, row) in rows.iter().enumerate() {
            for (j, &d) in row.iter().enumerate() {
                if d.is_nan() || d < 0.0 {
                    return Err(ChristofidesError::InvalidInput(format!(
                        "distance[{i}][{j}] = {d} is not a non-negative number"
                    )));
                }
                if i == j && d != 0.0 {
                    return Err(ChristofidesError::InvalidInput(format!(
                        "distance[{i}][{i}] = {d}, diagonal must be zero"
                    )));
                }
                let mirror = rows[j][i];
                let symmetric = if d.is_infinite() || mirror.is_infinite() {
                    d == mirror
                } else {
                    (d - mirror).abs() <= SYMMETRY_TOLERANCE
                };
                if !symmetric {
                    return Err(ChristofidesError::InvalidInput(format!(
                        "distance matrix is not symmetric: [{i}][{j}] = {d}, [{j}][{i}] = {mirror}"
                    )));
                }
            }
        }

        Ok(Self {
            node_count: n,
            distances: rows.into_iter().flatten().collect(),
            coordinates,
        })
    }

    /// Number of vertices.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    /// Returns `true` if the graph has no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Iterator over all vertex indices.
    pub fn vertices(&self) -> std::ops::Range<usize> {
        0..self.node_count
    }

    /// Distance between `from` and `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[must_use]
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances[from * self.node_count + to]
    }

    /// All distances from `vertex`, indexed by destination.
    #[must_use]
    pub fn row(&self, vertex: usize) -> &[f64] {
        let start = vertex * self.node_count;
        &self.distances[start..start + self.node_count]
    }

    /// The coordinate side-table, if the graph was built with one.
    #[must_use]
    pub fn coordinates(&self) -> Option<&[Point]> {
        self.coordinates.as_deref()
    }

    /// Coordinate of a single vertex, if known.
    #[must_use]
    pub fn point(&self, vertex: usize) -> Option<Point> {
        self.coordinates.as_ref()?.get(vertex).copied()
    }

    /// Check the triangle inequality `d[i][k] <= d[i][j] + d[j][k]` for
    /// every triple, allowing `tolerance` of slack.
    ///
    /// This is `O(n³)`; the pipeline only calls it when
    /// [`SolverConfig::verify_metric`] is set.
    ///
    /// # Errors
    ///
    /// Returns [`ChristofidesError::InvalidInput`] naming the first
    /// violating triple.
    pub fn check_metric(&self, tolerance: f64) -> Result<(), ChristofidesError> {
        for i in self.vertices() {
            for j in self.vertices() {
                let ij = self.distance(i, j);
                for k in self.vertices() {
                    let direct = self.distance(i, k);
                    let detour = ij + self.distance(j, k);
                    if direct > detour + tolerance {
                        return Err(ChristofidesError::InvalidInput(format!(
                            "triangle inequality violated: d[{i}][{k}] = {direct} > d[{i}][{j}] + d[{j}][{k}] = {detour}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Serialized form of [`Graph`]: nested rows, with infinite ("no edge")
/// entries written as `null` since JSON has no infinity.
#[derive(Serialize, Deserialize)]
struct RawGraph {
    distances: Vec<Vec<Option<f64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    coordinates: Option<Vec<Point>>,
}

impl From<Graph> for RawGraph {
    fn from(graph: Graph) -> Self {
        let n = graph.node_count;
        let distances = (0..n)
            .map(|i| {
                graph
                    .row(i)
                    .iter()
                    .map(|&d| d.is_finite().then_some(d))
                    .collect()
            })
            .collect();
        Self {
            distances,
            coordinates: graph.coordinates,
        }
    }
}

impl TryFrom<RawGraph> for Graph {
    type Error = ChristofidesError;

    fn try_from(raw: RawGraph) -> Result<Self, Self::Error> {
        let rows = raw
            .distances
            .into_iter()
            .map(|row| row.into_iter().map(|d| d.unwrap_or(f64::INFINITY)).collect())
            .collect();
        Self::build(rows, raw.coordinates)
    }
}

/// An undirected weighted edge between two vertex indices.
///
/// Vertices are always indices into the [`Graph`]; coordinates never
/// appear in algorithmic edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// One endpoint (for MST edges, the vertex already in the tree).
    pub from: usize,
    /// The other endpoint.
    pub to: usize,
    /// Edge weight, copied from the distance matrix.
    pub weight: f64,
}

impl Edge {
    /// Create a new edge.
    #[must_use]
    pub const fn new(from: usize, to: usize, weight: f64) -> Self {
        Self { from, to, weight }
    }

    /// Endpoints ordered `(min, max)`, for comparing edges regardless
    /// of direction.
    #[must_use]
    pub fn key(&self) -> (usize, usize) {
        (self.from.min(self.to), self.from.max(self.to))
    }

    /// Returns `true` if `vertex` is one of the endpoints.
    #[must_use]
    pub const fn touches(&self, vertex: usize) -> bool {
        self.from == vertex || self.to == vertex
    }
}

/// Sum of edge weights.
#[must_use]
pub fn total_weight(edges: &[Edge]) -> f64 {
    edges.iter().map(|e| e.weight).sum()
}

/// A closed tour: first and last vertex are identical and every other
/// vertex appears exactly once.
///
/// Degenerate graphs give degenerate tours: empty for zero nodes and
/// `[0]` for a single node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tour(Vec<usize>);

impl Tour {
    /// Create a tour from a vertex sequence.
    #[must_use]
    pub const fn new(vertices: Vec<usize>) -> Self {
        Self(vertices)
    }

    /// The vertex sequence, including the closing repeat.
    #[must_use]
    pub fn vertices(&self) -> &[usize] {
        &self.0
    }

    /// Length of the vertex sequence, including the closing repeat.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the tour has no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the tour starts and ends at the same vertex.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.0.first() == self.0.last()
    }

    /// Number of distinct vertices visited.
    #[must_use]
    pub fn distinct_len(&self) -> usize {
        if self.0.len() > 1 && self.is_closed() {
            self.0.len() - 1
        } else {
            self.0.len()
        }
    }

    /// Consume the tour and return the vertex sequence.
    #[must_use]
    pub fn into_vertices(self) -> Vec<usize> {
        self.0
    }
}

/// Configuration for the Christofides pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Which exact matcher pairs up the odd-degree vertices.
    pub matcher: MatcherKind,

    /// Largest odd-vertex set the matcher is allowed to search.
    ///
    /// Both matchers are exponential; sets above this bound fail with
    /// [`ChristofidesError::MatchingTooLarge`] instead of running for
    /// an unbounded time.
    pub max_matching_vertices: usize,

    /// Reject graphs that violate the triangle inequality before
    /// building the MST.
    pub verify_metric: bool,
}

impl SolverConfig {
    /// Default matcher.
    pub const DEFAULT_MATCHER: MatcherKind = MatcherKind::Exhaustive;
    /// Default bound on the odd-vertex set size.
    pub const DEFAULT_MAX_MATCHING_VERTICES: usize = 12;
    /// Default for metric verification.
    pub const DEFAULT_VERIFY_METRIC: bool = false;
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            matcher: Self::DEFAULT_MATCHER,
            max_matching_vertices: Self::DEFAULT_MAX_MATCHING_VERTICES,
            verify_metric: Self::DEFAULT_VERIFY_METRIC,
        }
    }
}

/// Final output of the pipeline: a closed tour and its total weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// The Hamiltonian cycle.
    pub tour: Tour,
    /// Sum of consecutive-pair distances along the tour.
    pub cost: f64,
}

impl Solution {
    /// The zero-cost solution for a graph with fewer than two nodes.
    #[must_use]
    pub fn degenerate(node_count: usize) -> Self {
        let tour = if node_count == 0 {
            Tour::default()
        } else {
            Tour::new(vec![0])
        };
        Self { tour, cost: 0.0 }
    }
}

/// Result of running the pipeline with every intermediate preserved.
///
/// Each field is the output of one stage, for callers that inspect or
/// render the construction step by step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedResult {
    /// Stage 1: minimum spanning tree edges.
    pub mst: Vec<Edge>,
    /// Stage 2: vertices of odd degree in the MST, ascending.
    pub odd_vertices: Vec<usize>,
    /// Stage 3: minimum-weight perfect matching on the odd vertices.
    pub matching: Vec<Edge>,
    /// Stage 4: Eulerian circuit over MST ∪ matching.
    pub circuit: Vec<usize>,
    /// Stage 5: shortcut Hamiltonian tour.
    pub tour: Tour,
    /// Total weight of `tour`.
    pub cost: f64,
}

impl StagedResult {
    /// The final tour and cost, dropping the intermediates.
    #[must_use]
    pub fn solution(&self) -> Solution {
        Solution {
            tour: self.tour.clone(),
            cost: self.cost,
        }
    }
}

/// Errors that can occur while building a tour.
///
/// Every variant is detected close to where the bad data appears and
/// returned to the caller; nothing is converted into a partial result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ChristofidesError {
    /// The distance matrix or coordinates are malformed.
    #[error("invalid input graph: {0}")]
    InvalidInput(String),

    /// Prim's algorithm could not reach every vertex.
    #[error("graph is disconnected: spanning tree reached {reached} of {node_count} nodes")]
    DisconnectedGraph {
        /// Vertices reached from the root.
        reached: usize,
        /// Vertices in the graph.
        node_count: usize,
    },

    /// The matcher was handed an odd number of vertices.
    #[error("perfect matching needs an even vertex set, got {count} vertices")]
    OddMatchingSet {
        /// Size of the offending set.
        count: usize,
    },

    /// The odd-vertex set exceeds the configured search bound.
    #[error("matching over {count} vertices exceeds the limit of {limit}")]
    MatchingTooLarge {
        /// Size of the odd-vertex set.
        count: usize,
        /// Bound in effect.
        limit: usize,
    },

    /// Every perfect matching uses at least one infinite edge.
    #[error("no finite perfect matching exists over {count} vertices")]
    NoFiniteMatching {
        /// Size of the vertex set.
        count: usize,
    },

    /// The merged multigraph has a vertex of odd degree.
    #[error("vertex {vertex} has odd degree {degree} in the merged multigraph")]
    ParityViolation {
        /// The offending vertex.
        vertex: usize,
        /// Its degree.
        degree: usize,
    },

    /// Hierholzer finished with edges left over, so the multigraph is
    /// not connected.
    #[error("eulerian walk used {used} of {total} edges")]
    IncompleteCircuit {
        /// Edges traversed.
        used: usize,
        /// Edges in the multigraph.
        total: usize,
    },
}
