//! christo-bench: CLI tool for running the Christofides pipeline on
//! generated or saved instances and collecting diagnostics.
//!
//! Generates a random Euclidean instance (or loads one from JSON), solves
//! it with configurable parameters, and prints detailed per-stage
//! diagnostics. Useful for:
//!
//! - Comparing matcher strategies (`exhaustive` vs `bitmask`)
//! - Measuring per-stage durations as the odd-vertex set grows
//! - Inspecting each construction stage as DOT or SVG
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin christo-bench -- [OPTIONS]
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use christo_export::{StageLayers, SvgMetadata};
use christo_pipeline::diagnostics::{Clock, PipelineDiagnostics};
use christo_pipeline::generate::InstanceConfig;
use christo_pipeline::pipeline::{Advance, Stage};
use christo_pipeline::{Graph, MatcherKind, Pipeline, SolverConfig, StagedResult};
use clap::{Parser, ValueEnum};
use env_logger::{Builder, Target};
use log::LevelFilter;

/// Christofides tour construction with per-stage diagnostics.
///
/// Builds a tour on a random (or saved) metric instance and prints
/// per-stage timing, counts, and weights.
#[derive(Parser)]
#[command(name = "christo-bench", version)]
struct Cli {
    /// Load the graph from a JSON file instead of generating one.
    #[arg(long)]
    instance: Option<PathBuf>,

    /// Number of generated points.
    #[arg(long, default_value_t = InstanceConfig::DEFAULT_NODE_COUNT)]
    nodes: usize,

    /// Canvas width for generated points.
    #[arg(long, default_value_t = InstanceConfig::DEFAULT_WIDTH)]
    width: f64,

    /// Canvas height for generated points.
    #[arg(long, default_value_t = InstanceConfig::DEFAULT_HEIGHT)]
    height: f64,

    /// Inset from each canvas edge for generated points.
    #[arg(long, default_value_t = InstanceConfig::DEFAULT_MARGIN)]
    margin: f64,

    /// RNG seed for generated points.
    #[arg(long, default_value_t = InstanceConfig::DEFAULT_SEED)]
    seed: u64,

    /// Perfect matching strategy.
    #[arg(long, value_enum, default_value_t = CLI_DEFAULT_MATCHER)]
    matcher: Matcher,

    /// Largest odd-vertex set the matcher may search.
    #[arg(long, default_value_t = SolverConfig::DEFAULT_MAX_MATCHING_VERTICES)]
    max_matching_vertices: usize,

    /// Reject graphs that violate the triangle inequality.
    #[arg(long)]
    verify_metric: bool,

    /// Full solver config as a JSON string.
    ///
    /// When provided, the matcher, bound, and metric flags are ignored.
    /// The JSON must be a valid `SolverConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Write the complete graph as Graphviz DOT.
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Write the final construction as SVG.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Write one SVG per pipeline stage (plus MST and matching DOT files)
    /// into this directory.
    #[arg(long)]
    stages_dir: Option<PathBuf>,

    /// Write the graph as JSON, for reloading with `--instance`.
    #[arg(long)]
    save_instance: Option<PathBuf>,

    /// Log verbosity on stderr.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

/// Perfect matching strategy selection.
#[derive(Clone, Copy, ValueEnum)]
enum Matcher {
    /// Enumerate every pairing.
    Exhaustive,
    /// Dynamic programme over vertex subsets.
    Bitmask,
}

/// Maps a [`MatcherKind`] to the local CLI [`Matcher`] enum.
const fn matcher_from_pipeline(kind: MatcherKind) -> Matcher {
    match kind {
        MatcherKind::Exhaustive => Matcher::Exhaustive,
        MatcherKind::Bitmask => Matcher::Bitmask,
    }
}

/// The CLI default matcher, derived from [`SolverConfig::DEFAULT_MATCHER`]
/// so the two cannot silently diverge.
const CLI_DEFAULT_MATCHER: Matcher = matcher_from_pipeline(SolverConfig::DEFAULT_MATCHER);

/// Log verbosity selection.
#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    /// No logging.
    Off,
    /// Errors only.
    Error,
    /// Warnings, such as a matcher near its bound.
    Warn,
    /// One line per solve.
    Info,
    /// Per-stage counts and weights.
    Debug,
    /// Everything.
    Trace,
}

impl LogLevel {
    const fn to_filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

/// Install a compact stderr logger at `level`.
fn init_logger(level: LogLevel) -> io::Result<()> {
    Builder::new()
        .filter_level(level.to_filter())
        .write_style(env_logger::WriteStyle::Never)
        .target(Target::Stderr)
        .format(|buf, record| writeln!(buf, "{:<5} {}", record.level(), record.args()))
        .try_init()
        .map_err(io::Error::other)
}

/// Build a [`SolverConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual solver flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<SolverConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(SolverConfig {
        matcher: match cli.matcher {
            Matcher::Exhaustive => MatcherKind::Exhaustive,
            Matcher::Bitmask => MatcherKind::Bitmask,
        },
        max_matching_vertices: cli.max_matching_vertices,
        verify_metric: cli.verify_metric,
    })
}

/// Load the graph named by `--instance`, or generate one from the
/// instance flags.
fn graph_from_cli(cli: &Cli) -> Result<Graph, String> {
    if let Some(ref path) = cli.instance {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
        return serde_json::from_str(&json)
            .map_err(|e| format!("Error parsing {}: {e}", path.display()));
    }

    let instance = InstanceConfig {
        node_count: cli.nodes,
        width: cli.width,
        height: cli.height,
        margin: cli.margin,
        seed: cli.seed,
    };
    christo_pipeline::generate::instance(&instance)
        .map_err(|e| format!("Error generating instance: {e}"))
}

/// Write `contents` to `path`, reporting the outcome on stderr.
fn write_output(path: &Path, what: &str, contents: &str) {
    match std::fs::write(path, contents) {
        Ok(()) => eprintln!(
            "{what} written to {} ({} bytes)",
            path.display(),
            contents.len()
        ),
        Err(e) => eprintln!("Error writing {what} to {}: {e}", path.display()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logger(cli.log_level) {
        eprintln!("Error installing logger: {e}");
        return ExitCode::FAILURE;
    }

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let graph = match graph_from_cli(&cli) {
        Ok(g) => g,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let source = cli
        .instance
        .as_ref()
        .map_or_else(|| format!("generated (seed {})", cli.seed), |p| p.display().to_string());
    eprintln!("Instance: {source}, {} nodes", graph.node_count());
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    if let Some(ref path) = cli.save_instance {
        match serde_json::to_string_pretty(&graph) {
            Ok(json) => write_output(path, "Instance", &json),
            Err(e) => eprintln!("Error serializing instance: {e}"),
        }
    }

    if let Some(ref path) = cli.dot {
        write_output(path, "DOT", &christo_export::to_dot(&graph));
    }

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match christo_pipeline::diagnostics::solve_with_diagnostics(&graph, &config, &StdClock) {
            Ok((staged, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }

                // Write renderings on the first run only.
                if run == 0 {
                    let desc = format!("{config:?}");
                    if let Some(ref svg_path) = cli.svg {
                        write_final_svg(&graph, &staged, &desc, svg_path);
                    }
                    if let Some(ref dir) = cli.stages_dir {
                        write_stages(&graph, &config, &staged, dir);
                    }
                }

                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    // Print summary when multiple runs.
    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// Render every layer of the finished run to `path`.
fn write_final_svg(graph: &Graph, staged: &StagedResult, description: &str, path: &Path) {
    let title = format!("christofides tour, cost {:.3}", staged.cost);
    let metadata = SvgMetadata {
        title: Some(&title),
        description: Some(description),
    };
    match christo_export::to_svg(graph, &StageLayers::from_result(staged), &metadata) {
        Ok(svg) => write_output(path, "SVG", &svg),
        Err(e) => eprintln!("Error rendering SVG: {e}"),
    }
}

/// Step through the pipeline again, writing one SVG per stage, plus the
/// MST and matching as DOT.
fn write_stages(graph: &Graph, config: &SolverConfig, staged: &StagedResult, dir: &Path) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("Error creating {}: {e}", dir.display());
        return;
    }

    for (name, edges) in [("mst", &staged.mst), ("matching", &staged.matching)] {
        match christo_export::edges_to_dot(graph, edges) {
            Ok(dot) => write_output(&dir.join(format!("{name}.dot")), "DOT", &dot),
            Err(e) => eprintln!("Error exporting {name}: {e}"),
        }
    }

    let mut stage: Stage<'_> = Pipeline::new(graph, config.clone()).into();
    loop {
        let title = format!("stage {}: {}", stage.index(), stage.name());
        let metadata = SvgMetadata {
            title: Some(&title),
            description: None,
        };
        match christo_export::to_svg(graph, &StageLayers::for_stage(&stage), &metadata) {
            Ok(svg) => {
                let file = dir.join(format!("{:02}-{}.svg", stage.index(), stage.name()));
                write_output(&file, "Stage SVG", &svg);
            }
            Err(e) => {
                eprintln!("Error rendering stage {}: {e}", stage.name());
                return;
            }
        }
        match stage.advance() {
            Ok(Advance::Next(next)) => stage = next,
            Ok(Advance::Complete(_)) => break,
            Err(e) => {
                eprintln!("Pipeline error while rendering stages: {e}");
                return;
            }
        }
    }
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&PipelineDiagnostics) -> Duration;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[PipelineDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    // Per-stage means.
    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Spanning Tree", |d| d.spanning_tree.duration),
        ("Odd Vertices", |d| d.odd_vertices.duration),
        ("Matching", |d| d.matching.duration),
        ("Eulerian Circuit", |d| d.circuit.duration),
        ("Shortcut", |d| d.shortcut.duration),
    ];

    for (name, extractor) in stage_extractors {
        let stage_mean = all_diagnostics
            .iter()
            .map(|d| extractor(d).as_secs_f64() * 1000.0)
            .sum::<f64>()
            / all_diagnostics.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}
