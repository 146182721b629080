//! Minimum-weight perfect matching on the odd-degree vertices.
//!
//! Both shipped matchers are exact and exponential in the size of the
//! vertex set, so every call is bounded by an explicit `max_vertices`.
//! The [`PerfectMatcher`] trait is the seam for swapping in a
//! polynomial algorithm (Edmonds' blossom) for larger sets; the
//! pipeline accepts any implementation via
//! [`OddVertices::match_odd_vertices_with`](crate::pipeline::OddVertices::match_odd_vertices_with).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{ChristofidesError, Edge, Graph, total_weight};

/// Hard cap for [`SubsetDp`]: its tables hold `2^k` entries.
pub const SUBSET_DP_MAX_VERTICES: usize = 20;

/// Set sizes above which the exhaustive search logs a warning.
const EXHAUSTIVE_WARN_VERTICES: usize = 10;

/// A perfect matching and how much work it took to find.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Matching {
    /// Matched pairs. Each edge's `from` precedes its `to` in the input
    /// vertex order.
    pub pairs: Vec<Edge>,
    /// Sum of pair weights.
    pub weight: f64,
    /// Complete pairings (exhaustive search) or subproblem transitions
    /// (subset DP) evaluated.
    pub explored: u64,
}

/// Strategy for pairing an even vertex set at minimum total weight.
pub trait PerfectMatcher {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Pair every vertex in `vertices` exactly once, minimizing the sum
    /// of `graph` distances, using only pairs from `vertices`.
    ///
    /// # Errors
    ///
    /// Returns [`ChristofidesError::OddMatchingSet`] for an odd-sized
    /// set, [`ChristofidesError::MatchingTooLarge`] when the set exceeds
    /// `max_vertices` (or the matcher's own hard cap), and
    /// [`ChristofidesError::NoFiniteMatching`] when every pairing needs
    /// an infinite edge.
    fn perfect_matching(
        &self,
        vertices: &[usize],
        graph: &Graph,
        max_vertices: usize,
    ) -> Result<Matching, ChristofidesError>;
}

/// Selects which exact matcher the pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    /// Recursive enumeration of all `(k-1)!!` pairings.
    #[default]
    Exhaustive,
    /// Dynamic programme over vertex subsets, `O(2^k · k)`.
    Bitmask,
}

impl fmt::Display for MatcherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exhaustive => ExhaustiveSearch.name(),
            Self::Bitmask => SubsetDp.name(),
        })
    }
}

impl PerfectMatcher for MatcherKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Exhaustive => ExhaustiveSearch.name(),
            Self::Bitmask => SubsetDp.name(),
        }
    }

    fn perfect_matching(
        &self,
        vertices: &[usize],
        graph: &Graph,
        max_vertices: usize,
    ) -> Result<Matching, ChristofidesError> {
        match self {
            Self::Exhaustive => ExhaustiveSearch.perfect_matching(vertices, graph, max_vertices),
            Self::Bitmask => SubsetDp.perfect_matching(vertices, graph, max_vertices),
        }
    }
}

/// Shared precondition checks.
fn check_vertex_set(
    vertices: &[usize],
    graph: &Graph,
    limit: usize,
) -> Result<(), ChristofidesError> {
    let count = vertices.len();
    if count % 2 != 0 {
        return Err(ChristofidesError::OddMatchingSet { count });
    }
    if count > limit {
        return Err(ChristofidesError::MatchingTooLarge { count, limit });
    }
    let mut seen = vec![false; graph.node_count()];
    for &v in vertices {
        if v >= graph.node_count() {
            return Err(ChristofidesError::InvalidInput(format!(
                "matching vertex {v} outside 0..{}",
                graph.node_count()
            )));
        }
        if std::mem::replace(&mut seen[v], true) {
            return Err(ChristofidesError::InvalidInput(format!(
                "matching vertex {v} listed twice"
            )));
        }
    }
    Ok(())
}

/// Turn `(position, position)` pairs into weighted edges.
fn pairs_to_matching(
    vertices: &[usize],
    graph: &Graph,
    positions: &[(usize, usize)],
    explored: u64,
) -> Matching {
    let pairs: Vec<Edge> = positions
        .iter()
        .map(|&(a, b)| {
            let (u, v) = (vertices[a], vertices[b]);
            Edge::new(u, v, graph.distance(u, v))
        })
        .collect();
    Matching {
        weight: total_weight(&pairs),
        pairs,
        explored,
    }
}

// ---------------------------------------------------------------------------
// Exhaustive search
// ---------------------------------------------------------------------------

/// Enumerates every perfect pairing: take the first unmatched vertex,
/// try it with each later unmatched vertex, recurse on the rest.
///
/// Explores exactly `(k-1)!! = (k-1)(k-3)…1` complete pairings. The
/// first minimum found wins, so ties resolve to the lexicographically
/// smallest pairing in input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustiveSearch;

struct Search<'a> {
    vertices: &'a [usize],
    graph: &'a Graph,
    matched: Vec<bool>,
    current: Vec<(usize, usize)>,
    best: Vec<(usize, usize)>,
    best_cost: f64,
    explored: u64,
}

impl Search<'_> {
    fn descend(&mut self, cost: f64) {
        let Some(first) = self.matched.iter().position(|&m| !m) else {
            self.explored += 1;
            if cost < self.best_cost {
                self.best_cost = cost;
                self.best.clone_from(&self.current);
            }
            return;
        };

        self.matched[first] = true;
        for partner in (first + 1)..self.vertices.len() {
            if self.matched[partner] {
                continue;
            }
            let weight = self
                .graph
                .distance(self.vertices[first], self.vertices[partner]);
            self.matched[partner] = true;
            self.current.push((first, partner));
            self.descend(cost + weight);
            self.current.pop();
            self.matched[partner] = false;
        }
        self.matched[first] = false;
    }
}

impl PerfectMatcher for ExhaustiveSearch {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn perfect_matching(
        &self,
        vertices: &[usize],
        graph: &Graph,
        max_vertices: usize,
    ) -> Result<Matching, ChristofidesError> {
        check_vertex_set(vertices, graph, max_vertices)?;
        if vertices.is_empty() {
            return Ok(Matching::default());
        }
        if vertices.len() > EXHAUSTIVE_WARN_VERTICES {
            log::warn!(
                "matching: exhaustive search over {} vertices, consider the bitmask matcher",
                vertices.len()
            );
        }

        let mut search = Search {
            vertices,
            graph,
            matched: vec![false; vertices.len()],
            current: Vec::with_capacity(vertices.len() / 2),
            best: Vec::new(),
            best_cost: f64::INFINITY,
            explored: 0,
        };
        search.descend(0.0);

        if search.best.is_empty() {
            return Err(ChristofidesError::NoFiniteMatching {
                count: vertices.len(),
            });
        }
        let matching = pairs_to_matching(vertices, graph, &search.best, search.explored);
        log::debug!(
            "matching: exhaustive paired {} vertices, weight {:.3}, {} pairings explored",
            vertices.len(),
            matching.weight,
            matching.explored
        );
        Ok(matching)
    }
}

// ---------------------------------------------------------------------------
// Subset dynamic programme
// ---------------------------------------------------------------------------

/// Exact matching by dynamic programming over subsets.
///
/// `best[mask]` is the cheapest perfect matching of the vertices whose
/// bits are set in `mask`. The lowest set bit is always paired first,
/// so each even mask is solved from at most `k - 1` smaller ones.
/// Memory is `2^k` entries, capped at [`SUBSET_DP_MAX_VERTICES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsetDp;

/// Marker for a mask with no finite matching.
const NO_PARTNER: u8 = u8::MAX;

impl PerfectMatcher for SubsetDp {
    fn name(&self) -> &'static str {
        "bitmask"
    }

    fn perfect_matching(
        &self,
        vertices: &[usize],
        graph: &Graph,
        max_vertices: usize,
    ) -> Result<Matching, ChristofidesError> {
        check_vertex_set(vertices, graph, max_vertices.min(SUBSET_DP_MAX_VERTICES))?;
        let k = vertices.len();
        if k == 0 {
            return Ok(Matching::default());
        }

        let full = (1_usize << k) - 1;
        let mut best = vec![f64::INFINITY; full + 1];
        let mut partner = vec![NO_PARTNER; full + 1];
        let mut explored = 0_u64;
        best[0] = 0.0;

        for mask in 1..=full {
            if mask.count_ones() % 2 != 0 {
                continue;
            }
            let first = mask.trailing_zeros() as usize;
            let rest = mask & !(1 << first);
            for second in (first + 1)..k {
                if rest & (1 << second) == 0 {
                    continue;
                }
                explored += 1;
                let sub = rest & !(1 << second);
                let cost = graph.distance(vertices[first], vertices[second]) + best[sub];
                if cost < best[mask] {
                    best[mask] = cost;
                    // `second < k <= SUBSET_DP_MAX_VERTICES`, so it fits.
                    partner[mask] = u8::try_from(second).unwrap_or(NO_PARTNER);
                }
            }
        }

        if !best[full].is_finite() {
            return Err(ChristofidesError::NoFiniteMatching { count: k });
        }

        let mut positions = Vec::with_capacity(k / 2);
        let mut mask = full;
        while mask != 0 {
            let first = mask.trailing_zeros() as usize;
            let second = usize::from(partner[mask]);
            positions.push((first, second));
            mask &= !((1 << first) | (1 << second));
        }

        let matching = pairs_to_matching(vertices, graph, &positions, explored);
        log::debug!(
            "matching: bitmask paired {k} vertices, weight {:.3}, {} transitions",
            matching.weight,
            matching.explored
        );
        Ok(matching)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::generate::{InstanceConfig, instance};

    /// Independent reference: try every permutation of the set and
    /// read consecutive entries as pairs.
    fn permutation_minimum(vertices: &[usize], graph: &Graph) -> f64 {
        fn permute(items: &mut Vec<usize>, k: usize, graph: &Graph, best: &mut f64) {
            if k == items.len() {
                let cost: f64 = items
                    .chunks(2)
                    .map(|pair| graph.distance(pair[0], pair[1]))
                    .sum();
                *best = best.min(cost);
                return;
            }
            for i in k..items.len() {
                items.swap(k, i);
                permute(items, k + 1, graph, best);
                items.swap(k, i);
            }
        }
        let mut items = vertices.to_vec();
        let mut best = f64::INFINITY;
        permute(&mut items, 0, graph, &mut best);
        best
    }

    fn random_graph(node_count: usize, seed: u64) -> Graph {
        instance(&InstanceConfig {
            node_count,
            seed,
            ..InstanceConfig::default()
        })
        .unwrap()
    }

    fn assert_perfect(vertices: &[usize], matching: &Matching) {
        let mut seen: Vec<usize> = matching
            .pairs
            .iter()
            .flat_map(|e| [e.from, e.to])
            .collect();
        seen.sort_unstable();
        let mut expected = vertices.to_vec();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    #[test]
    fn empty_set_matches_trivially() {
        let graph = random_graph(4, 1);
        for matcher in [MatcherKind::Exhaustive, MatcherKind::Bitmask] {
            let matching = matcher.perfect_matching(&[], &graph, 8).unwrap();
            assert!(matching.pairs.is_empty());
            assert!(matching.weight.abs() < f64::EPSILON);
        }
    }

    #[test]
    fn odd_set_fails_fast() {
        let graph = random_graph(4, 1);
        for matcher in [MatcherKind::Exhaustive, MatcherKind::Bitmask] {
            let err = matcher.perfect_matching(&[0, 1, 2], &graph, 8).unwrap_err();
            assert_eq!(err, ChristofidesError::OddMatchingSet { count: 3 });
        }
    }

    #[test]
    fn bound_is_enforced() {
        let graph = random_graph(12, 2);
        let vertices: Vec<usize> = (0..10).collect();
        let err = ExhaustiveSearch
            .perfect_matching(&vertices, &graph, 8)
            .unwrap_err();
        assert_eq!(err, ChristofidesError::MatchingTooLarge { count: 10, limit: 8 });
    }

    #[test]
    fn subset_dp_hard_cap_overrides_larger_bound() {
        let graph = random_graph(22, 3);
        let vertices: Vec<usize> = (0..22).collect();
        let err = SubsetDp.perfect_matching(&vertices, &graph, 100).unwrap_err();
        assert_eq!(
            err,
            ChristofidesError::MatchingTooLarge {
                count: 22,
                limit: SUBSET_DP_MAX_VERTICES
            }
        );
    }

    #[test]
    fn out_of_range_vertex_is_rejected() {
        let graph = random_graph(3, 1);
        let err = ExhaustiveSearch.perfect_matching(&[0, 7], &graph, 8).unwrap_err();
        assert!(matches!(err, ChristofidesError::InvalidInput(_)));
    }

    #[test]
    fn repeated_vertex_is_rejected() {
        let graph = random_graph(4, 1);
        for matcher in [MatcherKind::Exhaustive, MatcherKind::Bitmask] {
            let err = matcher
                .perfect_matching(&[0, 0, 1, 1], &graph, 8)
                .unwrap_err();
            assert!(
                matches!(&err, ChristofidesError::InvalidInput(msg) if msg.contains("twice")),
                "{matcher}: {err:?}"
            );
        }
    }

    #[test]
    fn exhaustive_explores_double_factorial_pairings() {
        let graph = random_graph(8, 4);
        let vertices: Vec<usize> = (0..8).collect();
        let matching = ExhaustiveSearch.perfect_matching(&vertices, &graph, 8).unwrap();
        assert_eq!(matching.explored, 7 * 5 * 3);
    }

    #[test]
    fn picks_the_short_pairs_on_two_clusters() {
        // Two tight pairs far apart: {0,1} near the origin, {2,3} far away.
        let graph = Graph::from_points(vec![
            crate::Point::new(0.0, 0.0),
            crate::Point::new(1.0, 0.0),
            crate::Point::new(100.0, 0.0),
            crate::Point::new(101.0, 0.0),
        ])
        .unwrap();
        for matcher in [MatcherKind::Exhaustive, MatcherKind::Bitmask] {
            let matching = matcher.perfect_matching(&[0, 1, 2, 3], &graph, 8).unwrap();
            let mut keys: Vec<_> = matching.pairs.iter().map(Edge::key).collect();
            keys.sort_unstable();
            assert_eq!(keys, vec![(0, 1), (2, 3)], "{matcher}");
            assert!((matching.weight - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn both_matchers_agree_with_permutation_reference() {
        for seed in 0..25 {
            let graph = random_graph(10, seed);
            for size in [2, 4, 6, 8] {
                let vertices: Vec<usize> = (0..10)
                    .filter(|v| (v * 7 + seed as usize) % 10 < size)
                    .collect();
                let expected = permutation_minimum(&vertices, &graph);
                for matcher in [MatcherKind::Exhaustive, MatcherKind::Bitmask] {
                    let matching = matcher.perfect_matching(&vertices, &graph, 8).unwrap();
                    assert_perfect(&vertices, &matching);
                    assert!(
                        (matching.weight - expected).abs() < 1e-9,
                        "{matcher} seed {seed} size {size}: {} vs {expected}",
                        matching.weight
                    );
                }
            }
        }
    }

    #[test]
    fn infinite_pairs_are_avoided() {
        let inf = f64::INFINITY;
        let graph = Graph::new(vec![
            vec![0.0, inf, 3.0, 1.0],
            vec![inf, 0.0, 1.0, 3.0],
            vec![3.0, 1.0, 0.0, inf],
            vec![1.0, 3.0, inf, 0.0],
        ])
        .unwrap();
        for matcher in [MatcherKind::Exhaustive, MatcherKind::Bitmask] {
            let matching = matcher.perfect_matching(&[0, 1, 2, 3], &graph, 8).unwrap();
            assert!((matching.weight - 2.0).abs() < 1e-12, "{matcher}");
        }
    }

    #[test]
    fn all_infinite_reports_no_finite_matching() {
        let inf = f64::INFINITY;
        let graph = Graph::new(vec![vec![0.0, inf], vec![inf, 0.0]]).unwrap();
        for matcher in [MatcherKind::Exhaustive, MatcherKind::Bitmask] {
            let err = matcher.perfect_matching(&[0, 1], &graph, 8).unwrap_err();
            assert_eq!(err, ChristofidesError::NoFiniteMatching { count: 2 });
        }
    }

    #[test]
    fn kind_display_and_serde() {
        assert_eq!(MatcherKind::Exhaustive.to_string(), "exhaustive");
        assert_eq!(
            serde_json::to_string(&MatcherKind::Bitmask).unwrap(),
            "\"bitmask\""
        );
    }
}
