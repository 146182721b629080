//! SVG export serializer.
//!
//! Draws a graph with coordinates and whichever construction layers are
//! supplied, using the [`svg`] crate for document construction, XML
//! escaping, and path data formatting.
//!
//! Layers are painted back to front: the complete graph (faint), the
//! Eulerian circuit, MST edges, matching edges (dashed), the tour, and
//! finally the vertices with odd-degree vertices highlighted.
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Element, Group, Path, Title};
use svg::node::{Node, Text};

use christo_pipeline::pipeline::Stage;
use christo_pipeline::{Edge, Graph, Point, StagedResult, Tour};

use crate::ExportError;

/// Padding on every side is the larger extent divided by this.
const PADDING_DIVISOR: f64 = 20.0;

/// The drawing unit is the larger extent divided by this. Stroke widths,
/// vertex radii, and font sizes are multiples of it.
const UNIT_DIVISOR: f64 = 250.0;

/// Extent used when every point coincides.
const MIN_EXTENT: f64 = 1.0;

/// Metadata to embed in the SVG document.
///
/// Both fields are optional. Text values are XML-escaped automatically
/// by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,
}

/// Which parts of a construction to draw.
///
/// Every layer is optional; an empty set draws only the vertices.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageLayers<'a> {
    /// Draw every pair of the complete graph faintly underneath.
    pub complete_graph: bool,
    /// Minimum spanning tree edges.
    pub mst: Option<&'a [Edge]>,
    /// Vertices to highlight as odd-degree.
    pub odd_vertices: Option<&'a [usize]>,
    /// Matching edges, drawn dashed.
    pub matching: Option<&'a [Edge]>,
    /// Eulerian circuit.
    pub circuit: Option<&'a [usize]>,
    /// Final tour.
    pub tour: Option<&'a Tour>,
}

impl<'a> StageLayers<'a> {
    /// The layers a viewer stepping through the pipeline would show at
    /// `stage`: everything computed so far that is still relevant.
    #[must_use]
    pub fn for_stage(stage: &'a Stage<'_>) -> Self {
        match stage {
            Stage::Pending(_) => Self {
                complete_graph: true,
                ..Self::default()
            },
            Stage::SpanningTree(s) => Self {
                mst: Some(s.mst()),
                ..Self::default()
            },
            Stage::OddVertices(s) => Self {
                mst: Some(s.mst()),
                odd_vertices: Some(s.odd_vertices()),
                ..Self::default()
            },
            Stage::Matched(s) => Self {
                mst: Some(s.mst()),
                odd_vertices: Some(s.odd_vertices()),
                matching: Some(s.matching()),
                ..Self::default()
            },
            Stage::CircuitExtracted(s) => Self {
                mst: Some(s.mst()),
                matching: Some(s.matching()),
                circuit: Some(s.circuit()),
                ..Self::default()
            },
            Stage::Toured(s) => Self {
                tour: Some(s.tour()),
                ..Self::default()
            },
        }
    }

    /// Every layer of a finished run.
    #[must_use]
    pub fn from_result(result: &'a StagedResult) -> Self {
        Self {
            complete_graph: false,
            mst: Some(&result.mst),
            odd_vertices: Some(&result.odd_vertices),
            matching: Some(&result.matching),
            circuit: Some(&result.circuit),
            tour: Some(&result.tour),
        }
    }

    /// Largest vertex index any layer refers to.
    fn max_vertex(&self) -> Option<usize> {
        let edges = self
            .mst
            .into_iter()
            .chain(self.matching)
            .flatten()
            .flat_map(|e| [e.from, e.to]);
        let walks = self
            .odd_vertices
            .into_iter()
            .chain(self.circuit)
            .chain(self.tour.map(Tour::vertices))
            .flatten()
            .copied();
        edges.chain(walks).max()
    }
}

/// Maps graph coordinates into the padded document space.
struct Frame {
    min_x: f64,
    min_y: f64,
    padding: f64,
    width: f64,
    height: f64,
    unit: f64,
}

impl Frame {
    fn fit(points: &[Point]) -> Self {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if points.is_empty() {
            (min_x, min_y, max_x, max_y) = (0.0, 0.0, 0.0, 0.0);
        }
        let extent = (max_x - min_x).max(max_y - min_y).max(MIN_EXTENT);
        let padding = extent / PADDING_DIVISOR;
        Self {
            min_x,
            min_y,
            padding,
            width: 2.0f64.mul_add(padding, (max_x - min_x).max(MIN_EXTENT)),
            height: 2.0f64.mul_add(padding, (max_y - min_y).max(MIN_EXTENT)),
            unit: extent / UNIT_DIVISOR,
        }
    }

    fn map(&self, p: Point) -> (f64, f64) {
        (
            p.x - self.min_x + self.padding,
            p.y - self.min_y + self.padding,
        )
    }
}

/// One `M`/`L` segment per edge.
fn edges_data(
    points: &[Point],
    frame: &Frame,
    edges: impl IntoIterator<Item = (usize, usize)>,
) -> Data {
    edges.into_iter().fold(Data::new(), |data, (a, b)| {
        data.move_to(frame.map(points[a])).line_to(frame.map(points[b]))
    })
}

/// A single polyline through `walk`.
fn walk_data(points: &[Point], frame: &Frame, walk: &[usize]) -> Option<Data> {
    let (&first, rest) = walk.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let start = Data::new().move_to(frame.map(points[first]));
    Some(
        rest.iter()
            .fold(start, |data, &v| data.line_to(frame.map(points[v]))),
    )
}

fn stroke(data: Data, colour: &str, width: f64) -> Path {
    Path::new()
        .set("d", data)
        .set("fill", "none")
        .set("stroke", colour)
        .set("stroke-width", width)
        .set("stroke-linecap", "round")
        .set("stroke-linejoin", "round")
}

/// Render `graph` and the requested `layers` as an SVG document.
///
/// # Errors
///
/// Returns [`ExportError::MissingCoordinates`] if the graph has no
/// coordinate side-table and [`ExportError::VertexOutOfRange`] if a
/// layer names a vertex the graph does not have.
pub fn to_svg(
    graph: &Graph,
    layers: &StageLayers<'_>,
    metadata: &SvgMetadata<'_>,
) -> Result<String, ExportError> {
    let points = graph.coordinates().ok_or(ExportError::MissingCoordinates)?;
    let node_count = graph.node_count();
    if let Some(vertex) = layers.max_vertex().filter(|&v| v >= node_count) {
        return Err(ExportError::VertexOutOfRange { vertex, node_count });
    }

    let frame = Frame::fit(points);
    let unit = frame.unit;
    let mut doc = Document::new()
        .set("width", frame.width)
        .set("height", frame.height)
        .set("viewBox", (0.0, 0.0, frame.width, frame.height));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }
    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if layers.complete_graph {
        let pairs = graph
            .vertices()
            .flat_map(|i| ((i + 1)..node_count).map(move |j| (i, j)))
            .filter(|&(i, j)| graph.distance(i, j).is_finite());
        doc = doc.add(
            stroke(edges_data(points, &frame, pairs), "#cccccc", unit * 0.5)
                .set("class", "graph"),
        );
    }

    if let Some(data) = layers.circuit.and_then(|walk| walk_data(points, &frame, walk)) {
        doc = doc.add(
            stroke(data, "#f0a030", unit * 4.0)
                .set("stroke-opacity", 0.35)
                .set("class", "circuit"),
        );
    }

    if let Some(mst) = layers.mst {
        let data = edges_data(points, &frame, mst.iter().map(|e| (e.from, e.to)));
        doc = doc.add(stroke(data, "#202020", unit * 1.5).set("class", "mst"));
    }

    if let Some(matching) = layers.matching {
        let data = edges_data(points, &frame, matching.iter().map(|e| (e.from, e.to)));
        doc = doc.add(
            stroke(data, "#d03030", unit * 1.5)
                .set("stroke-dasharray", (unit * 4.0, unit * 3.0))
                .set("class", "matching"),
        );
    }

    if let Some(data) = layers
        .tour
        .and_then(|tour| walk_data(points, &frame, tour.vertices()))
    {
        doc = doc.add(stroke(data, "#2060d0", unit * 2.0).set("class", "tour"));
    }

    let odd = layers.odd_vertices.unwrap_or_default();
    let mut vertices = Group::new().set("class", "vertices");
    for (v, &p) in points.iter().enumerate() {
        let (cx, cy) = frame.map(p);
        let fill = if odd.contains(&v) { "#d03030" } else { "#202020" };
        vertices = vertices.add(
            Circle::new()
                .set("cx", cx)
                .set("cy", cy)
                .set("r", unit * 3.0)
                .set("fill", fill),
        );
        let mut label = Element::new("text");
        label.assign("x", unit.mul_add(4.0, cx));
        label.assign("y", unit.mul_add(-4.0, cy));
        label.assign("font-size", unit * 10.0);
        label.assign("font-family", "sans-serif");
        label.append(Text::new(v.to_string()));
        vertices = vertices.add(label);
    }
    doc = doc.add(vertices);

    // The svg crate omits the XML declaration, so we prepend it.
    Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use christo_pipeline::pipeline::Advance;
    use christo_pipeline::{Pipeline, SolverConfig};

    use super::*;

    fn square() -> Graph {
        Graph::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
            Point::new(100.0, 0.0),
        ])
        .unwrap()
    }

    fn no_meta() -> SvgMetadata<'static> {
        SvgMetadata::default()
    }

    #[test]
    fn vertices_only_without_layers() {
        let svg = to_svg(&square(), &StageLayers::default(), &no_meta()).unwrap();
        assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert_eq!(svg.matches("<circle").count(), 4);
        assert!(!svg.contains("<path"));
        assert!(svg.contains(">3</text>"));
    }

    #[test]
    fn document_is_padded_around_points() {
        let svg = to_svg(&square(), &StageLayers::default(), &no_meta()).unwrap();
        // 100 wide plus 5% padding on each side.
        assert!(svg.contains(r#"width="110""#), "{svg}");
        assert!(svg.contains(r#"viewBox="0 0 110 110""#), "{svg}");
    }

    #[test]
    fn full_result_draws_every_layer() {
        let graph = square();
        let staged = christo_pipeline::solve_staged(&graph, &SolverConfig::default()).unwrap();
        let svg = to_svg(&graph, &StageLayers::from_result(&staged), &no_meta()).unwrap();
        for class in ["circuit", "mst", "matching", "tour", "vertices"] {
            assert!(svg.contains(&format!(r#"class="{class}""#)), "missing {class}");
        }
        assert!(svg.contains("stroke-dasharray"));
        // Odd vertices 2 and 3 are highlighted.
        assert_eq!(svg.matches(r##"fill="#d03030""##).count(), 2);
    }

    #[test]
    fn metadata_is_embedded_and_escaped() {
        let meta = SvgMetadata {
            title: Some("tour <6>"),
            description: Some("seed & size"),
        };
        let svg = to_svg(&square(), &StageLayers::default(), &meta).unwrap();
        assert!(svg.contains("<title>tour &lt;6&gt;</title>"));
        assert!(svg.contains("seed &amp; size"));
    }

    #[test]
    fn matrix_graph_cannot_be_drawn() {
        let graph = Graph::new(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let err = to_svg(&graph, &StageLayers::default(), &no_meta()).unwrap_err();
        assert_eq!(err, ExportError::MissingCoordinates);
    }

    #[test]
    fn out_of_range_layer_is_rejected() {
        let mst = [Edge::new(0, 9, 1.0)];
        let layers = StageLayers {
            mst: Some(&mst),
            ..StageLayers::default()
        };
        let err = to_svg(&square(), &layers, &no_meta()).unwrap_err();
        assert_eq!(
            err,
            ExportError::VertexOutOfRange {
                vertex: 9,
                node_count: 4
            }
        );
    }

    #[test]
    fn every_stage_renders() {
        let graph = square();
        let mut stage: Stage<'_> = Pipeline::new(&graph, SolverConfig::default()).into();
        let render = |stage: &Stage<'_>| {
            to_svg(&graph, &StageLayers::for_stage(stage), &no_meta()).unwrap()
        };
        let mut rendered = vec![render(&stage)];
        while let Advance::Next(next) = stage.advance().unwrap() {
            stage = next;
            rendered.push(render(&stage));
        }
        assert_eq!(rendered.len(), christo_pipeline::pipeline::STAGE_COUNT);
        assert!(rendered[0].contains(r#"class="graph""#));
        assert!(rendered[1].contains(r#"class="mst""#));
        assert!(rendered[3].contains(r#"class="matching""#));
        assert!(rendered[4].contains(r#"class="circuit""#));
        assert!(rendered[5].contains(r#"class="tour""#));
        assert!(!rendered[5].contains(r#"class="mst""#));
    }

    #[test]
    fn single_point_graph_renders() {
        let graph = Graph::from_points(vec![Point::new(5.0, 5.0)]).unwrap();
        let svg = to_svg(&graph, &StageLayers::default(), &no_meta()).unwrap();
        assert_eq!(svg.matches("<circle").count(), 1);
    }
}
