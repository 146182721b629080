//! christo-pipeline: Christofides TSP approximation (sans-IO).
//!
//! Turns a complete, symmetric, metric [`Graph`] into a closed tour no
//! worse than 1.5× optimal through:
//! minimum spanning tree -> odd-degree vertices -> minimum perfect
//! matching -> Eulerian circuit -> shortcutting.
//!
//! This crate has **no I/O dependencies**. It logs through the `log`
//! facade and never installs a logger; time is measured through the
//! [`diagnostics::Clock`] trait supplied by the caller.

pub mod diagnostics;
pub mod euler;
pub mod generate;
pub mod matching;
pub mod mst;
pub mod parity;
pub mod pipeline;
pub mod shortcut;
pub mod types;

pub use matching::{MatcherKind, PerfectMatcher};
pub use pipeline::Pipeline;
pub use types::{
    ChristofidesError, Edge, Graph, Point, Solution, SolverConfig, StagedResult, Tour,
};

/// Solve `graph`, returning only the final tour and its cost.
///
/// Graphs with fewer than two nodes short-circuit to an empty tour (0
/// nodes) or `[0]` (1 node), both with cost 0.
///
/// # Errors
///
/// Returns the first [`ChristofidesError`] raised by any stage. See
/// [`solve_staged`].
pub fn solve(graph: &Graph, config: &SolverConfig) -> Result<Solution, ChristofidesError> {
    if graph.node_count() < 2 {
        return Ok(Solution::degenerate(graph.node_count()));
    }
    Ok(solve_staged(graph, config)?.solution())
}

/// Run the full pipeline, keeping every intermediate.
///
/// # Pipeline steps
///
/// 1. Prim's minimum spanning tree from vertex 0
/// 2. Vertices of odd tree degree
/// 3. Minimum-weight perfect matching on those vertices
/// 4. Eulerian circuit over tree ∪ matching
/// 5. Shortcut to a Hamiltonian tour
///
/// # Errors
///
/// Returns [`ChristofidesError::InvalidInput`] if metric verification is
/// enabled and fails, [`ChristofidesError::DisconnectedGraph`] if the
/// tree cannot reach every vertex, and
/// [`ChristofidesError::MatchingTooLarge`] if the odd-vertex set exceeds
/// `config.max_matching_vertices`.
pub fn solve_staged(graph: &Graph, config: &SolverConfig) -> Result<StagedResult, ChristofidesError> {
    Ok(Pipeline::new(graph, config.clone())
        .build_mst()?
        .find_odd_vertices()?
        .match_odd_vertices()?
        .extract_circuit()?
        .shortcut()
        .into_result())
}
