//! Vertex degrees and odd-degree detection.

use crate::types::{ChristofidesError, Edge};

/// Count how many edge endpoints land on each vertex.
///
/// # Errors
///
/// Returns [`ChristofidesError::InvalidInput`] if an edge names a
/// vertex outside `0..node_count`.
pub fn degrees(node_count: usize, edges: &[Edge]) -> Result<Vec<usize>, ChristofidesError> {
    let mut degree = vec![0_usize; node_count];
    for edge in edges {
        for vertex in [edge.from, edge.to] {
            let slot = degree.get_mut(vertex).ok_or_else(|| {
                ChristofidesError::InvalidInput(format!(
                    "edge ({}, {}) references vertex {vertex} outside 0..{node_count}",
                    edge.from, edge.to
                ))
            })?;
            *slot += 1;
        }
    }
    Ok(degree)
}

/// Vertices with odd degree in `edges`, in ascending order.
///
/// For a tree (or any graph) the result always has even length, since
/// the degree sum is twice the edge count.
///
/// # Errors
///
/// Same as [`degrees`].
pub fn odd_degree_vertices(
    node_count: usize,
    edges: &[Edge],
) -> Result<Vec<usize>, ChristofidesError> {
    let odd: Vec<usize> = degrees(node_count, edges)?
        .into_iter()
        .enumerate()
        .filter(|&(_, d)| d % 2 == 1)
        .map(|(v, _)| v)
        .collect();
    log::debug!("parity: {} odd-degree vertices", odd.len());
    Ok(odd)
}
