//! Seeded random Euclidean instances.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::types::{ChristofidesError, Graph, Point};

/// Parameters for a random planar instance.
///
/// Points are drawn uniformly from the canvas inset by `margin` on
/// every side. The same config always produces the same graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceConfig {
    /// Number of points.
    pub node_count: usize,
    /// Canvas width.
    pub width: f64,
    /// Canvas height.
    pub height: f64,
    /// Inset from each canvas edge.
    pub margin: f64,
    /// RNG seed.
    pub seed: u64,
}

impl InstanceConfig {
    /// Default point count.
    pub const DEFAULT_NODE_COUNT: usize = 6;
    /// Default canvas width.
    pub const DEFAULT_WIDTH: f64 = 800.0;
    /// Default canvas height.
    pub const DEFAULT_HEIGHT: f64 = 600.0;
    /// Default inset.
    pub const DEFAULT_MARGIN: f64 = 50.0;
    /// Default seed.
    pub const DEFAULT_SEED: u64 = 42;
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            node_count: Self::DEFAULT_NODE_COUNT,
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            margin: Self::DEFAULT_MARGIN,
            seed: Self::DEFAULT_SEED,
        }
    }
}

/// Draw `count` points uniformly from `[min_x, max_x) × [min_y, max_y)`.
///
/// # Errors
///
/// Returns [`ChristofidesError::InvalidInput`] if either range is empty,
/// inverted or not finite.
pub fn random_points<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    (min_x, max_x): (f64, f64),
    (min_y, max_y): (f64, f64),
) -> Result<Vec<Point>, ChristofidesError> {
    for (axis, min, max) in [("x", min_x, max_x), ("y", min_y, max_y)] {
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(ChristofidesError::InvalidInput(format!(
                "{axis} range {min}..{max} is empty"
            )));
        }
    }
    Ok((0..count)
        .map(|_| Point::new(rng.random_range(min_x..max_x), rng.random_range(min_y..max_y)))
        .collect())
}

/// Build the Euclidean graph described by `config`.
///
/// # Errors
///
/// Returns [`ChristofidesError::InvalidInput`] if the canvas is not
/// finite or the margins leave no room for points.
pub fn instance(config: &InstanceConfig) -> Result<Graph, ChristofidesError> {
    let InstanceConfig {
        node_count,
        width,
        height,
        margin,
        seed,
    } = *config;

    if ![width, height, margin].iter().all(|v| v.is_finite()) || margin < 0.0 {
        return Err(ChristofidesError::InvalidInput(format!(
            "canvas {width}x{height} with margin {margin} is not a valid region"
        )));
    }
    let x_range = (margin, width - margin);
    let y_range = (margin, height - margin);

    let mut rng = SmallRng::seed_from_u64(seed);
    let points = random_points(&mut rng, node_count, x_range, y_range)?;
    log::debug!("generate: {node_count} points on {width}x{height}, seed {seed}");
    Graph::from_points(points)
}
