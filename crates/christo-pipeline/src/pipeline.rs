//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::solve_staged`] which runs the entire construction in
//! one call, [`Pipeline`] lets the caller drive execution one step at a
//! time:
//!
//! ```rust
//! # use christo_pipeline::{ChristofidesError, Graph, Pipeline, SolverConfig};
//! # fn run(graph: &Graph) -> Result<(), ChristofidesError> {
//! let staged = Pipeline::new(graph, SolverConfig::default())
//!     .build_mst()?
//!     .find_odd_vertices()?
//!     .match_odd_vertices()?
//!     .extract_circuit()?
//!     .shortcut()
//!     .into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for fallible stages), carrying all previously computed
//! intermediates. The graph itself is only borrowed, so every stage is
//! tied to its lifetime.

use crate::diagnostics::StageMetrics;
use crate::euler::Multigraph;
use crate::matching::{Matching, PerfectMatcher};
use crate::mst::ROOT;
use crate::types::{
    ChristofidesError, Edge, Graph, METRIC_TOLERANCE, SolverConfig, StagedResult, Tour,
    total_weight,
};

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any work has been done.
///
/// Call [`build_mst`](Self::build_mst) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .build_mst() to continue"]
pub struct Pending<'g> {
    graph: &'g Graph,
    config: SolverConfig,
}

impl<'g> Pending<'g> {
    /// The input graph.
    #[must_use]
    pub const fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// The solver configuration.
    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Build the minimum spanning tree and advance to [`SpanningTree`].
    ///
    /// When `config.verify_metric` is set, the triangle inequality is
    /// checked first.
    ///
    /// # Errors
    ///
    /// Returns [`ChristofidesError::InvalidInput`] if metric
    /// verification fails and [`ChristofidesError::DisconnectedGraph`]
    /// if infinite distances cut the graph apart.
    pub fn build_mst(self) -> Result<SpanningTree<'g>, ChristofidesError> {
        if self.config.verify_metric {
            self.graph.check_metric(METRIC_TOLERANCE)?;
        }
        let mst = crate::mst::minimum_spanning_tree(self.graph)?;
        Ok(SpanningTree {
            graph: self.graph,
            config: self.config,
            mst,
        })
    }
}

// ───────────────────────── Stage 1: SpanningTree ─────────────────────

/// Pipeline state after the minimum spanning tree is built.
///
/// Call [`find_odd_vertices`](Self::find_odd_vertices) to advance.
#[must_use = "pipeline stages are consumed by advancing; call .find_odd_vertices() to continue"]
pub struct SpanningTree<'g> {
    graph: &'g Graph,
    config: SolverConfig,
    mst: Vec<Edge>,
}

impl<'g> SpanningTree<'g> {
    /// The input graph.
    #[must_use]
    pub const fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Tree edges in the order Prim added them.
    #[must_use]
    pub fn mst(&self) -> &[Edge] {
        &self.mst
    }

    /// Collect the odd-degree tree vertices and advance to
    /// [`OddVertices`].
    ///
    /// # Errors
    ///
    /// Returns [`ChristofidesError::InvalidInput`] if a tree edge lies
    /// outside the graph, which only happens when the tree was not
    /// built from this graph.
    pub fn find_odd_vertices(self) -> Result<OddVertices<'g>, ChristofidesError> {
        let n = self.graph.node_count();
        let max_degree = crate::parity::degrees(n, &self.mst)?
            .into_iter()
            .max()
            .unwrap_or(0);
        let odd = crate::parity::odd_degree_vertices(n, &self.mst)?;
        Ok(OddVertices {
            graph: self.graph,
            config: self.config,
            mst: self.mst,
            odd,
            max_degree,
        })
    }

    pub(crate) fn stage_metrics(&self) -> StageMetrics {
        StageMetrics::SpanningTree {
            node_count: self.graph.node_count(),
            edge_count: self.mst.len(),
            total_weight: total_weight(&self.mst),
        }
    }
}

// ───────────────────────── Stage 2: OddVertices ──────────────────────

/// Pipeline state after odd-degree detection.
///
/// Call [`match_odd_vertices`](Self::match_odd_vertices) to advance
/// with the configured matcher, or
/// [`match_odd_vertices_with`](Self::match_odd_vertices_with) to supply
/// a custom one.
#[must_use = "pipeline stages are consumed by advancing; call .match_odd_vertices() to continue"]
pub struct OddVertices<'g> {
    graph: &'g Graph,
    config: SolverConfig,
    mst: Vec<Edge>,
    odd: Vec<usize>,
    max_degree: usize,
}

impl<'g> OddVertices<'g> {
    /// The input graph.
    #[must_use]
    pub const fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Tree edges.
    #[must_use]
    pub fn mst(&self) -> &[Edge] {
        &self.mst
    }

    /// Vertices with odd tree degree, ascending.
    #[must_use]
    pub fn odd_vertices(&self) -> &[usize] {
        &self.odd
    }

    /// Pair the odd vertices with `config.matcher` and advance to
    /// [`Matched`].
    ///
    /// # Errors
    ///
    /// See [`PerfectMatcher::perfect_matching`].
    pub fn match_odd_vertices(self) -> Result<Matched<'g>, ChristofidesError> {
        let matcher = self.config.matcher;
        self.match_odd_vertices_with(&matcher)
    }

    /// Pair the odd vertices with `matcher` and advance to [`Matched`].
    ///
    /// `config.max_matching_vertices` is passed through as the bound.
    ///
    /// # Errors
    ///
    /// See [`PerfectMatcher::perfect_matching`].
    pub fn match_odd_vertices_with<M: PerfectMatcher + ?Sized>(
        self,
        matcher: &M,
    ) -> Result<Matched<'g>, ChristofidesError> {
        let matching =
            matcher.perfect_matching(&self.odd, self.graph, self.config.max_matching_vertices)?;
        Ok(Matched {
            graph: self.graph,
            config: self.config,
            mst: self.mst,
            odd: self.odd,
            matching,
            strategy: matcher.name(),
        })
    }

    pub(crate) fn stage_metrics(&self) -> StageMetrics {
        StageMetrics::OddVertices {
            odd_count: self.odd.len(),
            max_degree: self.max_degree,
        }
    }
}

// ───────────────────────── Stage 3: Matched ──────────────────────────

/// Pipeline state after minimum-weight perfect matching.
///
/// Call [`extract_circuit`](Self::extract_circuit) to advance.
#[must_use = "pipeline stages are consumed by advancing; call .extract_circuit() to continue"]
pub struct Matched<'g> {
    graph: &'g Graph,
    config: SolverConfig,
    mst: Vec<Edge>,
    odd: Vec<usize>,
    matching: Matching,
    strategy: &'static str,
}

impl<'g> Matched<'g> {
    /// The input graph.
    #[must_use]
    pub const fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Tree edges.
    #[must_use]
    pub fn mst(&self) -> &[Edge] {
        &self.mst
    }

    /// Vertices with odd tree degree.
    #[must_use]
    pub fn odd_vertices(&self) -> &[usize] {
        &self.odd
    }

    /// Matched pairs.
    #[must_use]
    pub fn matching(&self) -> &[Edge] {
        &self.matching.pairs
    }

    /// Merge tree and matching into a multigraph, walk its Eulerian
    /// circuit from vertex 0, and advance to [`CircuitExtracted`].
    ///
    /// # Errors
    ///
    /// Returns [`ChristofidesError::ParityViolation`] if the merged
    /// multigraph has an odd vertex (the matching did not cover the odd
    /// set) and [`ChristofidesError::IncompleteCircuit`] if it is not
    /// connected.
    pub fn extract_circuit(self) -> Result<CircuitExtracted<'g>, ChristofidesError> {
        let multigraph =
            Multigraph::merge(self.graph.node_count(), &self.mst, &self.matching.pairs)?;
        let circuit = multigraph.eulerian_circuit(ROOT)?;
        let circuit_weight = crate::shortcut::walk_cost(self.graph, &circuit);
        Ok(CircuitExtracted {
            graph: self.graph,
            config: self.config,
            mst: self.mst,
            odd: self.odd,
            matching: self.matching.pairs,
            multigraph_edges: multigraph.edge_count(),
            circuit,
            circuit_weight,
        })
    }

    pub(crate) fn stage_metrics(&self) -> StageMetrics {
        StageMetrics::Matching {
            strategy: self.strategy.to_owned(),
            vertex_count: self.odd.len(),
            pair_count: self.matching.pairs.len(),
            total_weight: self.matching.weight,
            explored: self.matching.explored,
        }
    }
}

// ───────────────────────── Stage 4: CircuitExtracted ─────────────────

/// Pipeline state after the Eulerian circuit is extracted.
///
/// Call [`shortcut`](Self::shortcut) to advance to the final stage.
#[must_use = "pipeline stages are consumed by advancing; call .shortcut() to continue"]
pub struct CircuitExtracted<'g> {
    graph: &'g Graph,
    config: SolverConfig,
    mst: Vec<Edge>,
    odd: Vec<usize>,
    matching: Vec<Edge>,
    multigraph_edges: usize,
    circuit: Vec<usize>,
    circuit_weight: f64,
}

impl<'g> CircuitExtracted<'g> {
    /// The input graph.
    #[must_use]
    pub const fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Tree edges.
    #[must_use]
    pub fn mst(&self) -> &[Edge] {
        &self.mst
    }

    /// Matched pairs.
    #[must_use]
    pub fn matching(&self) -> &[Edge] {
        &self.matching
    }

    /// The closed Eulerian walk.
    #[must_use]
    pub fn circuit(&self) -> &[usize] {
        &self.circuit
    }

    /// Shortcut repeated vertices and advance to [`Toured`].
    pub fn shortcut(self) -> Toured<'g> {
        let tour = crate::shortcut::shortcut(&self.circuit);
        let cost = crate::shortcut::tour_cost(self.graph, &tour);
        Toured {
            graph: self.graph,
            config: self.config,
            mst: self.mst,
            odd: self.odd,
            matching: self.matching,
            circuit: self.circuit,
            circuit_weight: self.circuit_weight,
            tour,
            cost,
        }
    }

    pub(crate) fn stage_metrics(&self) -> StageMetrics {
        StageMetrics::Circuit {
            edge_count: self.multigraph_edges,
            walk_length: self.circuit.len(),
            total_weight: self.circuit_weight,
        }
    }
}

// ───────────────────────── Stage 5: Toured ───────────────────────────

/// Pipeline state after shortcutting, the final stage.
///
/// Call [`into_result`](Self::into_result) to extract the
/// [`StagedResult`] containing all intermediates.
#[must_use = "call .into_result() to extract the StagedResult"]
pub struct Toured<'g> {
    graph: &'g Graph,
    config: SolverConfig,
    mst: Vec<Edge>,
    odd: Vec<usize>,
    matching: Vec<Edge>,
    circuit: Vec<usize>,
    circuit_weight: f64,
    tour: Tour,
    cost: f64,
}

impl<'g> Toured<'g> {
    /// The input graph.
    #[must_use]
    pub const fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// The solver configuration the run used.
    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Tree edges.
    #[must_use]
    pub fn mst(&self) -> &[Edge] {
        &self.mst
    }

    /// Matched pairs.
    #[must_use]
    pub fn matching(&self) -> &[Edge] {
        &self.matching
    }

    /// The closed Hamiltonian tour.
    #[must_use]
    pub const fn tour(&self) -> &Tour {
        &self.tour
    }

    /// Total weight of the tour.
    #[must_use]
    pub const fn cost(&self) -> f64 {
        self.cost
    }

    /// Consume the pipeline and return the full [`StagedResult`].
    #[must_use]
    pub fn into_result(self) -> StagedResult {
        log::info!(
            "solved {} nodes: tour cost {:.3} ({} odd vertices matched with {})",
            self.graph.node_count(),
            self.cost,
            self.odd.len(),
            self.config.matcher,
        );
        StagedResult {
            mst: self.mst,
            odd_vertices: self.odd,
            matching: self.matching,
            circuit: self.circuit,
            tour: self.tour,
            cost: self.cost,
        }
    }

    pub(crate) fn stage_metrics(&self) -> StageMetrics {
        let savings_ratio = if self.circuit_weight > 0.0 {
            1.0 - self.cost / self.circuit_weight
        } else {
            0.0
        };
        StageMetrics::Shortcut {
            tour_length: self.tour.len(),
            total_weight: self.cost,
            circuit_weight: self.circuit_weight,
            savings_ratio,
        }
    }
}

// ──────────────────── PipelineStage trait + Stage enum ────────────────

/// Total number of stages in the pipeline.
pub const STAGE_COUNT: usize = 6;

/// The output produced by a single pipeline stage.
///
/// Each variant borrows the data that the corresponding stage computed.
#[must_use]
pub enum StageOutput<'a> {
    /// The input graph (nothing computed yet).
    Graph {
        /// The graph being solved.
        graph: &'a Graph,
    },
    /// Minimum spanning tree.
    SpanningTree {
        /// Tree edges.
        edges: &'a [Edge],
    },
    /// Odd-degree vertices of the tree.
    OddVertices {
        /// Ascending vertex indices.
        vertices: &'a [usize],
    },
    /// Perfect matching on the odd vertices.
    Matching {
        /// Matched pairs.
        pairs: &'a [Edge],
    },
    /// Eulerian circuit over tree and matching.
    Circuit {
        /// The closed walk.
        walk: &'a [usize],
    },
    /// Final tour.
    Tour {
        /// The closed Hamiltonian cycle.
        tour: &'a Tour,
        /// Its total weight.
        cost: f64,
    },
}

/// Trait implemented by every pipeline stage, enabling uniform iteration.
///
/// Each stage struct implements it, and [`Stage`] delegates to whichever
/// variant it holds.
///
/// # Loop pattern
///
/// ```rust
/// # use christo_pipeline::{ChristofidesError, Graph, Pipeline, SolverConfig};
/// # use christo_pipeline::pipeline::{Advance, Stage};
/// # fn run(graph: &Graph) -> Result<(), ChristofidesError> {
/// let mut stage: Stage<'_> = Pipeline::new(graph, SolverConfig::default()).into();
/// loop {
///     match stage.advance()? {
///         Advance::Next(next) => stage = next,
///         Advance::Complete(done) => { stage = done; break; }
///     }
/// }
/// let result = stage.complete()?;
/// # Ok(())
/// # }
/// ```
pub trait PipelineStage<'g>: Sized {
    /// Short name of this stage (e.g. `"graph"`, `"mst"`).
    const NAME: &'static str;

    /// Zero-based index of this stage (`0` for Pending through `5` for
    /// Toured).
    const INDEX: usize;

    /// The output this stage produced.
    fn output(&self) -> StageOutput<'_>;

    /// Stage-specific metrics for diagnostics.
    ///
    /// Returns `None` for the initial [`Pending`] stage which has not
    /// yet done any work.
    fn metrics(&self) -> Option<StageMetrics>;

    /// Advance to the next stage.
    ///
    /// Returns `Ok(Some(stage))` on success, `Ok(None)` if already at
    /// the final stage, or `Err` if the stage transition fails.
    ///
    /// # Errors
    ///
    /// Returns the [`ChristofidesError`] raised by the transition.
    fn next(self) -> Result<Option<Stage<'g>>, ChristofidesError>;

    /// Run all remaining stages and return the final [`StagedResult`].
    ///
    /// # Errors
    ///
    /// Returns the first [`ChristofidesError`] raised by a remaining
    /// stage.
    fn complete(self) -> Result<StagedResult, ChristofidesError>;

    /// [`Self::NAME`] through a value, for dynamic dispatch.
    fn name(&self) -> &'static str {
        Self::NAME
    }

    /// [`Self::INDEX`] through a value, for dynamic dispatch.
    fn index(&self) -> usize {
        Self::INDEX
    }
}

impl<'g> PipelineStage<'g> for Pending<'g> {
    const NAME: &'static str = "graph";
    const INDEX: usize = 0;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Graph { graph: self.graph }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        None
    }

    fn next(self) -> Result<Option<Stage<'g>>, ChristofidesError> {
        Ok(Some(Stage::SpanningTree(self.build_mst()?)))
    }

    fn complete(self) -> Result<StagedResult, ChristofidesError> {
        self.build_mst()?.complete()
    }
}

impl<'g> PipelineStage<'g> for SpanningTree<'g> {
    const NAME: &'static str = "mst";
    const INDEX: usize = 1;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::SpanningTree { edges: &self.mst }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(self.stage_metrics())
    }

    fn next(self) -> Result<Option<Stage<'g>>, ChristofidesError> {
        Ok(Some(Stage::OddVertices(self.find_odd_vertices()?)))
    }

    fn complete(self) -> Result<StagedResult, ChristofidesError> {
        self.find_odd_vertices()?.complete()
    }
}

impl<'g> PipelineStage<'g> for OddVertices<'g> {
    const NAME: &'static str = "odd";
    const INDEX: usize = 2;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::OddVertices {
            vertices: &self.odd,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(self.stage_metrics())
    }

    fn next(self) -> Result<Option<Stage<'g>>, ChristofidesError> {
        Ok(Some(Stage::Matched(self.match_odd_vertices()?)))
    }

    fn complete(self) -> Result<StagedResult, ChristofidesError> {
        self.match_odd_vertices()?.complete()
    }
}

impl<'g> PipelineStage<'g> for Matched<'g> {
    const NAME: &'static str = "matching";
    const INDEX: usize = 3;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Matching {
            pairs: &self.matching.pairs,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(self.stage_metrics())
    }

    fn next(self) -> Result<Option<Stage<'g>>, ChristofidesError> {
        Ok(Some(Stage::CircuitExtracted(self.extract_circuit()?)))
    }

    fn complete(self) -> Result<StagedResult, ChristofidesError> {
        self.extract_circuit()?.complete()
    }
}

impl<'g> PipelineStage<'g> for CircuitExtracted<'g> {
    const NAME: &'static str = "circuit";
    const INDEX: usize = 4;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Circuit {
            walk: &self.circuit,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(self.stage_metrics())
    }

    fn next(self) -> Result<Option<Stage<'g>>, ChristofidesError> {
        Ok(Some(Stage::Toured(self.shortcut())))
    }

    fn complete(self) -> Result<StagedResult, ChristofidesError> {
        Ok(self.shortcut().into_result())
    }
}

impl<'g> PipelineStage<'g> for Toured<'g> {
    const NAME: &'static str = "tour";
    const INDEX: usize = 5;

    fn output(&self) -> StageOutput<'_> {
        StageOutput::Tour {
            tour: &self.tour,
            cost: self.cost,
        }
    }

    fn metrics(&self) -> Option<StageMetrics> {
        Some(self.stage_metrics())
    }

    fn next(self) -> Result<Option<Stage<'g>>, ChristofidesError> {
        Ok(None)
    }

    fn complete(self) -> Result<StagedResult, ChristofidesError> {
        Ok(self.into_result())
    }
}

/// Enum wrapping all pipeline stages for uniform, loopable access.
///
/// Use [`From`] conversions to enter the dynamic API from any typed
/// stage, then call [`advance`](Self::advance) in a loop.
#[must_use]
pub enum Stage<'g> {
    /// See [`Pending`].
    Pending(Pending<'g>),
    /// See [`SpanningTree`].
    SpanningTree(SpanningTree<'g>),
    /// See [`OddVertices`].
    OddVertices(OddVertices<'g>),
    /// See [`Matched`].
    Matched(Matched<'g>),
    /// See [`CircuitExtracted`].
    CircuitExtracted(CircuitExtracted<'g>),
    /// See [`Toured`].
    Toured(Toured<'g>),
}

/// Compile-time guard: adding a [`Stage`] variant makes this match
/// non-exhaustive until [`STAGE_COUNT`] is revisited.
#[allow(dead_code, clippy::match_same_arms)]
const fn _stage_count_guard(s: &Stage<'_>) {
    match s {
        Stage::Pending(_)
        | Stage::SpanningTree(_)
        | Stage::OddVertices(_)
        | Stage::Matched(_)
        | Stage::CircuitExtracted(_)
        | Stage::Toured(_) => {}
    }
}

/// Result of [`Stage::advance`]: either the next stage or the
/// completed final stage returned unchanged.
#[must_use]
pub enum Advance<'g> {
    /// The pipeline advanced to this next stage.
    Next(Stage<'g>),
    /// The pipeline was already at the final stage.
    Complete(Stage<'g>),
}

/// Delegate a method call to whichever `Stage` variant is active.
macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        match $self {
            Self::Pending(s) => s.$method($($arg),*),
            Self::SpanningTree(s) => s.$method($($arg),*),
            Self::OddVertices(s) => s.$method($($arg),*),
            Self::Matched(s) => s.$method($($arg),*),
            Self::CircuitExtracted(s) => s.$method($($arg),*),
            Self::Toured(s) => s.$method($($arg),*),
        }
    };
}

impl<'g> Stage<'g> {
    /// Short name of the current stage.
    #[must_use]
    pub fn name(&self) -> &'static str {
        delegate!(self, name)
    }

    /// Zero-based index of the current stage.
    #[must_use]
    pub fn index(&self) -> usize {
        delegate!(self, index)
    }

    /// The output this stage produced.
    pub fn output(&self) -> StageOutput<'_> {
        delegate!(self, output)
    }

    /// Stage-specific metrics; `None` for `Pending`.
    #[must_use]
    pub fn metrics(&self) -> Option<StageMetrics> {
        delegate!(self, metrics)
    }

    /// The input graph.
    #[must_use]
    pub const fn graph(&self) -> &'g Graph {
        match self {
            Self::Pending(s) => s.graph,
            Self::SpanningTree(s) => s.graph,
            Self::OddVertices(s) => s.graph,
            Self::Matched(s) => s.graph,
            Self::CircuitExtracted(s) => s.graph,
            Self::Toured(s) => s.graph,
        }
    }

    /// Whether the pipeline is at the final stage.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Toured(_))
    }

    /// Advance to the next stage.
    ///
    /// Returns `Ok(None)` if already complete (the `Toured` value is
    /// consumed).
    ///
    /// # Errors
    ///
    /// Returns the [`ChristofidesError`] raised by the transition.
    pub fn next(self) -> Result<Option<Self>, ChristofidesError> {
        delegate!(self, next)
    }

    /// Advance to the next stage, returning `self` unchanged if
    /// already complete.
    ///
    /// # Errors
    ///
    /// Returns the [`ChristofidesError`] raised by the transition. The
    /// stage that failed is consumed, so a loop driving `advance` halts
    /// at the first error.
    pub fn advance(self) -> Result<Advance<'g>, ChristofidesError> {
        if self.is_complete() {
            return Ok(Advance::Complete(self));
        }
        // Non-complete stages always return Ok(Some(_)) from next().
        #[allow(clippy::unreachable)]
        let next = self
            .next()?
            .unwrap_or_else(|| unreachable!("non-complete stage returned None from next()"));
        Ok(Advance::Next(next))
    }

    /// Run all remaining stages to completion.
    ///
    /// # Errors
    ///
    /// Returns the first [`ChristofidesError`] raised by a remaining
    /// stage.
    pub fn complete(self) -> Result<StagedResult, ChristofidesError> {
        delegate!(self, complete)
    }
}

impl<'g> From<Pending<'g>> for Stage<'g> {
    fn from(s: Pending<'g>) -> Self {
        Self::Pending(s)
    }
}

impl<'g> From<SpanningTree<'g>> for Stage<'g> {
    fn from(s: SpanningTree<'g>) -> Self {
        Self::SpanningTree(s)
    }
}

impl<'g> From<OddVertices<'g>> for Stage<'g> {
    fn from(s: OddVertices<'g>) -> Self {
        Self::OddVertices(s)
    }
}

impl<'g> From<Matched<'g>> for Stage<'g> {
    fn from(s: Matched<'g>) -> Self {
        Self::Matched(s)
    }
}

impl<'g> From<CircuitExtracted<'g>> for Stage<'g> {
    fn from(s: CircuitExtracted<'g>) -> Self {
        Self::CircuitExtracted(s)
    }
}

impl<'g> From<Toured<'g>> for Stage<'g> {
    fn from(s: Toured<'g>) -> Self {
        Self::Toured(s)
    }
}

// ───────────────────── Pipeline entry point ──────────────────────────

/// Incremental Christofides pipeline.
///
/// Created via [`Pipeline::new`], which borrows the graph and stores the
/// config without doing any work. Each stage method consumes the current
/// state and returns the next, making it a compile-time error to skip
/// stages or call them out of order.
pub struct Pipeline;

impl Pipeline {
    /// Start a pipeline over `graph`.
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(graph: &Graph, config: SolverConfig) -> Pending<'_> {
        Pending { graph, config }
    }
}
