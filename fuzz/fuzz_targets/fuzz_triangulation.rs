#![no_main]

use cdt::{Edge, IntersectingConstraintEdges, Triangulation, VertexInsertionOrder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (
    VertexInsertionOrder,
    IntersectingConstraintEdges,
    Vec<[f64; 2]>,
    Vec<(u8, u8)>,
)| {
    let (order, intersecting_edges, vertices, edges) = data;

    // keep the coordinates in a range where the super-triangle is well conditioned
    if vertices
        .iter()
        .flatten()
        .any(|c| !c.is_finite() || c.abs() > 1.0e6)
    {
        return;
    }

    let mut triangulation = Triangulation::new(order, intersecting_edges, 0.0);
    if triangulation.insert_vertices(&vertices).is_err() {
        return;
    }
    assert!(triangulation.is_topology_valid());

    let edges: Vec<Edge> = edges
        .into_iter()
        .map(|(a, b)| Edge::new(a as usize, b as usize))
        .collect();
    if triangulation.insert_edges(&edges).is_ok()
        && intersecting_edges == IntersectingConstraintEdges::Resolve
    {
        assert!(triangulation.is_topology_valid());
    }

    if triangulation.erase_outer_triangles_and_holes().is_ok()
        && intersecting_edges == IntersectingConstraintEdges::Resolve
    {
        assert!(triangulation.is_topology_valid());
    }
});
