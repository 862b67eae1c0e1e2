//! Shared fixtures for unit tests.

#![allow(clippy::unwrap_used)]

use crate::graph::{GraphBuilder, VisibilityGraph};
use crate::math::Point2;
use crate::sweep::SweepOptions;
use crate::vertices::VisVertices;

fn poly(points: &[(f32, f32)]) -> Vec<Point2> {
    points.iter().map(|&(x, y)| Point2::new(x, y)).collect()
}

/// Six obstacles inside a 100 x 100 boundary. Vertex id 2 is (60, 50).
pub(crate) fn fixture_polygons() -> Vec<Vec<Point2>> {
    vec![
        poly(&[(50.0, 50.0), (60.0, 50.0), (60.0, 60.0), (50.0, 60.0)]),
        poly(&[(50.0, 40.0), (60.0, 30.0), (55.0, 40.0)]),
        poly(&[
            (55.0, 65.0),
            (60.0, 70.0),
            (65.0, 65.0),
            (65.0, 75.0),
            (55.0, 75.0),
        ]),
        poly(&[(60.0, 10.0), (70.0, 10.0), (70.0, 20.0)]),
        poly(&[(55.0, 25.0), (60.0, 20.0), (60.0, 25.0)]),
        poly(&[(60.0, 16.0), (64.0, 16.0), (64.0, 18.0)]),
        poly(&[(0.0, 0.0), (0.0, 100.0), (100.0, 100.0), (100.0, 0.0)]),
    ]
}

pub(crate) fn fixture_vertices() -> VisVertices {
    VisVertices::from_polygons(&fixture_polygons()).unwrap()
}

pub(crate) fn fixture_graph(options: SweepOptions) -> VisibilityGraph {
    GraphBuilder::new(options)
        .build(&fixture_polygons())
        .unwrap()
}

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
