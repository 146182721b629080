//! Integration test: solve a generated instance and export every stage.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use christo_export::{StageLayers, SvgMetadata, edges_to_dot, to_dot, to_svg};
use christo_pipeline::generate::{InstanceConfig, instance};
use christo_pipeline::pipeline::{Advance, Stage, STAGE_COUNT};
use christo_pipeline::{Graph, Pipeline, Point, SolverConfig, solve_staged};

#[test]
fn square_perimeter_exports() {
    let graph = Graph::from_points(vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 1.0),
        Point::new(1.0, 1.0),
        Point::new(1.0, 0.0),
    ])
    .unwrap();
    let staged = solve_staged(&graph, &SolverConfig::default()).expect("square should solve");
    assert_eq!(staged.tour.vertices(), &[0, 1, 2, 3, 0]);

    let mst_dot = edges_to_dot(&graph, &staged.mst).unwrap();
    assert_eq!(mst_dot.matches(" -- ").count(), 3);
    assert_eq!(mst_dot.matches("label = \"1.0\"").count(), 3);

    let matching_dot = edges_to_dot(&graph, &staged.matching).unwrap();
    assert!(matching_dot.contains("2 -- 3"));

    // All six pairs of the complete graph.
    assert_eq!(to_dot(&graph).matches(" -- ").count(), 6);

    let svg = to_svg(
        &graph,
        &StageLayers::from_result(&staged),
        &SvgMetadata {
            title: Some("square"),
            description: Some("cost 4"),
        },
    )
    .unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("<title>square</title>"));
    assert!(svg.contains("</svg>"));
}

#[test]
fn generated_instance_renders_each_stage() {
    let graph = instance(&InstanceConfig {
        node_count: 10,
        seed: 17,
        ..InstanceConfig::default()
    })
    .unwrap();

    let mut stage: Stage<'_> = Pipeline::new(&graph, SolverConfig::default()).into();
    let mut names = Vec::new();
    loop {
        let svg = to_svg(&graph, &StageLayers::for_stage(&stage), &SvgMetadata::default())
            .expect("generated graphs have coordinates");
        assert!(svg.contains("<circle"), "stage {} drew no vertices", stage.name());
        names.push(stage.name());
        match stage.advance().unwrap() {
            Advance::Next(next) => stage = next,
            Advance::Complete(_) => break,
        }
    }
    assert_eq!(names.len(), STAGE_COUNT);
    assert_eq!(names.first(), Some(&"graph"));
    assert_eq!(names.last(), Some(&"tour"));
}
