//! Graphviz DOT export serializer.
//!
//! Builds a [`petgraph`] undirected graph mirroring the input and writes
//! it with petgraph's [`Dot`] formatter. Vertex `i` is labelled `i`;
//! edges carry their weight to one decimal place. When the graph has
//! coordinates, each vertex gets a pinned `pos` attribute so `neato -n`
//! reproduces the layout.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use petgraph::dot::{Config, Dot};
use petgraph::graph::{NodeIndex, UnGraph};

use christo_pipeline::{Edge, Graph};

use crate::ExportError;

/// Whether an edge weight is worth drawing.
///
/// Zero weights (coincident points) and infinite weights ("no edge")
/// are left out.
fn drawable(weight: f64) -> bool {
    weight.is_finite() && weight != 0.0
}

/// Serialize every drawable edge of the complete graph.
#[must_use]
pub fn to_dot(graph: &Graph) -> String {
    let edges = graph.vertices().flat_map(|i| {
        ((i + 1)..graph.node_count()).map(move |j| Edge::new(i, j, graph.distance(i, j)))
    });
    render(graph, edges)
}

/// Serialize an edge list (MST, matching, ...) over the graph's vertices.
///
/// Every vertex is written even if no edge touches it, so layouts of
/// different edge lists over the same graph line up.
///
/// # Errors
///
/// Returns [`ExportError::VertexOutOfRange`] if an edge names a vertex
/// the graph does not have.
pub fn edges_to_dot(graph: &Graph, edges: &[Edge]) -> Result<String, ExportError> {
    let node_count = graph.node_count();
    if let Some(vertex) = edges
        .iter()
        .flat_map(|e| [e.from, e.to])
        .find(|&v| v >= node_count)
    {
        return Err(ExportError::VertexOutOfRange { vertex, node_count });
    }
    Ok(render(graph, edges.iter().copied()))
}

fn render(graph: &Graph, edges: impl IntoIterator<Item = Edge>) -> String {
    let mut dot_graph = UnGraph::<usize, f64>::with_capacity(graph.node_count(), 0);
    let nodes: Vec<NodeIndex> = graph.vertices().map(|v| dot_graph.add_node(v)).collect();
    for edge in edges {
        if drawable(edge.weight) {
            dot_graph.add_edge(nodes[edge.from], nodes[edge.to], edge.weight);
        }
    }

    Dot::with_attr_getters(
        &dot_graph,
        &[Config::EdgeNoLabel],
        &|_, edge| format!("label = \"{:.1}\"", edge.weight()),
        &|_, (index, _)| {
            graph.point(index.index()).map_or_else(String::new, |p| {
                format!("pos = \"{:.1},{:.1}!\"", p.x, p.y)
            })
        },
    )
    .to_string()
}
