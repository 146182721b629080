//! Pipeline diagnostics: timing, counts, and weights for each stage.
//!
//! [`solve_with_diagnostics`] drives the typed pipeline stage by stage,
//! timing each transition through a caller-supplied [`Clock`] so this
//! crate never touches a platform time source.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::Pipeline;
use crate::types::{ChristofidesError, Graph, SolverConfig, StagedResult};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: minimum spanning tree.
    pub spanning_tree: StageDiagnostics,
    /// Stage 2: odd-degree detection.
    pub odd_vertices: StageDiagnostics,
    /// Stage 3: perfect matching.
    pub matching: StageDiagnostics,
    /// Stage 4: multigraph merge and Eulerian circuit.
    pub circuit: StageDiagnostics,
    /// Stage 5: shortcutting.
    pub shortcut: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Minimum spanning tree metrics.
    SpanningTree {
        /// Vertices in the graph.
        node_count: usize,
        /// Tree edges (`node_count - 1` unless degenerate).
        edge_count: usize,
        /// Sum of tree edge weights.
        total_weight: f64,
    },
    /// Odd-degree detection metrics.
    OddVertices {
        /// Vertices with odd tree degree.
        odd_count: usize,
        /// Largest tree degree of any vertex.
        max_degree: usize,
    },
    /// Perfect matching metrics.
    Matching {
        /// Which matcher ran.
        strategy: String,
        /// Size of the matched vertex set.
        vertex_count: usize,
        /// Number of pairs.
        pair_count: usize,
        /// Sum of pair weights.
        total_weight: f64,
        /// Pairings or subproblem transitions evaluated.
        explored: u64,
    },
    /// Eulerian circuit metrics.
    Circuit {
        /// Edge occurrences in the merged multigraph.
        edge_count: usize,
        /// Vertices in the circuit (`edge_count + 1`).
        walk_length: usize,
        /// Weight of the circuit.
        total_weight: f64,
    },
    /// Shortcutting metrics.
    Shortcut {
        /// Vertices in the tour, including the closing repeat.
        tour_length: usize,
        /// Weight of the tour.
        total_weight: f64,
        /// Weight of the circuit it was cut from.
        circuit_weight: f64,
        /// `1.0 - tour / circuit`.
        savings_ratio: f64,
    },
}

/// High-level summary for the entire run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Vertices in the graph.
    pub node_count: usize,
    /// Weight of the minimum spanning tree, a lower bound on the
    /// optimal tour.
    pub mst_weight: f64,
    /// Weight of the final tour.
    pub tour_cost: f64,
    /// `tour_cost / mst_weight`, an upper bound on the tour's ratio to
    /// the optimum (0 for degenerate graphs).
    pub cost_to_mst_ratio: f64,
}

/// Run the full pipeline, timing every stage.
///
/// # Errors
///
/// Returns the first [`ChristofidesError`] raised by any stage.
pub fn solve_with_diagnostics<C: Clock>(
    graph: &Graph,
    config: &SolverConfig,
    clock: &C,
) -> Result<(StagedResult, PipelineDiagnostics), ChristofidesError> {
    let run_start = clock.now();

    let t = clock.now();
    let tree = Pipeline::new(graph, config.clone()).build_mst()?;
    let spanning_tree = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: tree.stage_metrics(),
    };

    let t = clock.now();
    let odd = tree.find_odd_vertices()?;
    let odd_vertices = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: odd.stage_metrics(),
    };

    let t = clock.now();
    let matched = odd.match_odd_vertices()?;
    let matching = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: matched.stage_metrics(),
    };

    let t = clock.now();
    let extracted = matched.extract_circuit()?;
    let circuit = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: extracted.stage_metrics(),
    };

    let t = clock.now();
    let toured = extracted.shortcut();
    let shortcut = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: toured.stage_metrics(),
    };

    let total_duration = clock.elapsed(&run_start);
    let staged = toured.into_result();

    let mst_weight = crate::types::total_weight(&staged.mst);
    let cost_to_mst_ratio = if mst_weight > 0.0 {
        staged.cost / mst_weight
    } else {
        0.0
    };
    let summary = PipelineSummary {
        node_count: graph.node_count(),
        mst_weight,
        tour_cost: staged.cost,
        cost_to_mst_ratio,
    };

    Ok((
        staged,
        PipelineDiagnostics {
            spanning_tree,
            odd_vertices,
            matching,
            circuit,
            shortcut,
            total_duration,
            summary,
        },
    ))
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!("Nodes: {}", self.summary.node_count));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Spanning Tree", &self.spanning_tree),
            ("Odd Vertices", &self.odd_vertices),
            ("Matching", &self.matching),
            ("Eulerian Circuit", &self.circuit),
            ("Shortcut", &self.shortcut),
        ];

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "MST weight: {:.3}  |  Tour cost: {:.3}  |  Tour/MST: {:.3}",
            self.summary.mst_weight, self.summary.tour_cost, self.summary.cost_to_mst_ratio,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::SpanningTree {
            node_count,
            edge_count,
            total_weight,
        } => format!("{node_count} nodes, {edge_count} edges, w={total_weight:.3}"),
        StageMetrics::OddVertices {
            odd_count,
            max_degree,
        } => format!("{odd_count} odd, max degree {max_degree}"),
        StageMetrics::Matching {
            strategy,
            vertex_count,
            pair_count,
            total_weight,
            explored,
        } => format!(
            "{strategy} {vertex_count} vertices -> {pair_count} pairs, w={total_weight:.3} ({explored} explored)",
        ),
        StageMetrics::Circuit {
            edge_count,
            walk_length,
            total_weight,
        } => format!("{edge_count} edges, walk {walk_length}, w={total_weight:.3}"),
        StageMetrics::Shortcut {
            tour_length,
            total_weight,
            circuit_weight,
            savings_ratio,
        } => format!(
            "tour {tour_length}, w={circuit_weight:.3}->{total_weight:.3} ({:.1}% saved)",
            savings_ratio * 100.0,
        ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::generate::{InstanceConfig, instance};

    /// Clock that advances one millisecond per reading.
    struct TickClock {
        ticks: Cell<u64>,
    }

    impl Clock for TickClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.ticks.get();
            self.ticks.set(t + 1);
            t
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis(self.now() - since)
        }
    }

    fn clock() -> TickClock {
        TickClock {
            ticks: Cell::new(0),
        }
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let ms = duration_ms(Duration::from_millis(1234));
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn diagnostics_match_staged_result() {
        let graph = instance(&InstanceConfig {
            node_count: 9,
            seed: 5,
            ..InstanceConfig::default()
        })
        .unwrap();
        let config = SolverConfig::default();
        let (staged, diag) = solve_with_diagnostics(&graph, &config, &clock()).unwrap();

        assert_eq!(staged, crate::solve_staged(&graph, &config).unwrap());
        assert_eq!(diag.summary.node_count, 9);
        assert!((diag.summary.tour_cost - staged.cost).abs() < f64::EPSILON);
        assert!(diag.summary.cost_to_mst_ratio >= 1.0);
        assert!(diag.total_duration >= diag.spanning_tree.duration);

        match &diag.matching.metrics {
            StageMetrics::Matching {
                strategy,
                vertex_count,
                pair_count,
                ..
            } => {
                assert_eq!(strategy, "exhaustive");
                assert_eq!(*vertex_count, staged.odd_vertices.len());
                assert_eq!(*pair_count, staged.matching.len());
            }
            other => panic!("unexpected metrics {other:?}"),
        }
    }

    /// Collects `info!` records emitted on the current test thread.
    struct ThreadLog;

    thread_local! {
        static RECORDS: std::cell::RefCell<Vec<String>> = const { std::cell::RefCell::new(Vec::new()) };
    }

    impl log::Log for ThreadLog {
        fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
            metadata.level() <= log::Level::Info
        }

        fn log(&self, record: &log::Record<'_>) {
            if self.enabled(record.metadata()) {
                RECORDS.with(|r| r.borrow_mut().push(record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static THREAD_LOG: ThreadLog = ThreadLog;

    #[test]
    fn diagnostics_run_logs_completion() {
        // Another test may have installed it already.
        let _ = log::set_logger(&THREAD_LOG);
        log::set_max_level(log::LevelFilter::Info);

        let graph = instance(&InstanceConfig::default()).unwrap();
        solve_with_diagnostics(&graph, &SolverConfig::default(), &clock()).unwrap();

        let solved: Vec<String> = RECORDS.with(|r| {
            r.borrow()
                .iter()
                .filter(|line| line.starts_with("solved "))
                .cloned()
                .collect()
        });
        assert_eq!(solved.len(), 1, "{solved:?}");
        assert!(solved[0].contains("6 nodes"), "{}", solved[0]);
    }

    #[test]
    fn diagnostics_surface_stage_errors() {
        let config = SolverConfig {
            max_matching_vertices: 0,
            ..SolverConfig::default()
        };
        let graph = instance(&InstanceConfig::default()).unwrap();
        let err = solve_with_diagnostics(&graph, &config, &clock()).unwrap_err();
        assert!(matches!(err, ChristofidesError::MatchingTooLarge { limit: 0, .. }));
    }

    #[test]
    fn diagnostics_serialize_durations_as_seconds() {
        let graph = instance(&InstanceConfig::default()).unwrap();
        let (_, diag) = solve_with_diagnostics(&graph, &SolverConfig::default(), &clock()).unwrap();
        let json = serde_json::to_value(&diag).unwrap();
        assert!(json["total_duration"].as_f64().unwrap() > 0.0);
        let back: PipelineDiagnostics = serde_json::from_value(json).unwrap();
        assert_eq!(back.total_duration, diag.total_duration);
    }

    #[test]
    fn report_names_every_stage() {
        let graph = instance(&InstanceConfig::default()).unwrap();
        let (_, diag) = solve_with_diagnostics(&graph, &SolverConfig::default(), &clock()).unwrap();
        let report = diag.report();
        assert!(report.contains("Pipeline Diagnostics Report"));
        for name in ["Spanning Tree", "Odd Vertices", "Matching", "Eulerian Circuit", "Shortcut"] {
            assert!(report.contains(name), "missing {name}");
        }
        assert!(report.contains("exhaustive"));
    }
}
