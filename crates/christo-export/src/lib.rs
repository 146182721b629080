//! christo-export: Pure format serializers (sans-IO)
//!
//! Converts graphs, edge lists, and tours into output formats.
//! Currently supports Graphviz DOT and SVG.

pub mod dot;
pub mod svg;

pub use dot::{edges_to_dot, to_dot};
pub use svg::{StageLayers, SvgMetadata, to_svg};

/// Errors raised while serializing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    /// The format needs vertex positions but the graph was built from
    /// a bare distance matrix.
    #[error("graph has no coordinates to draw")]
    MissingCoordinates,

    /// An edge list or walk names a vertex the graph does not have.
    #[error("vertex {vertex} is outside a graph of {node_count} nodes")]
    VertexOutOfRange {
        /// The offending vertex.
        vertex: usize,
        /// Vertices in the graph.
        node_count: usize,
    },
}
