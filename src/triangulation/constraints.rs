use std::collections::VecDeque;

use anyhow::{Ok as HowOk, Result as HowResult, bail};

use super::{IntersectingConstraintEdges, Location, Stage, Triangulation, vertex_key};
use crate::{
    edge::Edge,
    predicates::{
        distance, distance_to_line, intersection_point, midpoint, orient_2d,
        projection_parameter, segments_cross,
    },
    utils::types::{HedgeIteratorIdx, TriIteratorIdx, Vertex2, VertexIdx},
};

/// Relative distance below which a constructed split point is merged into a nearby vertex.
const SNAP_TOLERANCE: f64 = 1e-10;

/// The first obstacle on the way from one vertex to another.
enum Trace {
    /// A vertex lying on the segment, or closer to it than the tolerance.
    Vertex(VertexIdx),
    /// The crossed half-edge of a fixed edge, only reported when intersections are resolved.
    FixedEdge(HedgeIteratorIdx),
    /// The edges crossed by the segment, in order.
    Crossings(Vec<Edge>),
}

impl Triangulation {
    /// Insert constraint edges by flipping the edges crossing them away.
    ///
    /// Vertices are given in user numbering. Vertices lying on an edge split it,
    /// crossings with already fixed edges are handled according to [`IntersectingConstraintEdges`].
    ///
    /// ## Errors
    /// Returns an error, before changing anything, if an edge references a vertex that does not exist
    /// or the triangulation was already finalized.
    pub fn insert_edges(&mut self, edges: &[Edge]) -> HowResult<()> {
        let edges = self.validate_edges(edges)?;

        #[cfg(feature = "logging")]
        log::debug!("Inserting {} constraint edges", edges.len());

        for original in edges {
            self.insert_edge(original)?;
        }

        HowOk(())
    }

    /// Insert constraint edges by splitting them at their midpoints until all pieces are part of the triangulation.
    ///
    /// The inserted points are regular vertices, so the triangulation stays Delaunay.
    /// Vertices lying on an edge and crossings with already fixed edges are handled as in [`Self::insert_edges`].
    pub fn conform_to_edges(&mut self, edges: &[Edge]) -> HowResult<()> {
        let edges = self.validate_edges(edges)?;

        #[cfg(feature = "logging")]
        log::debug!("Conforming to {} constraint edges", edges.len());

        for original in edges {
            self.conform_to_edge(original)?;
        }

        HowOk(())
    }

    /// Insert constraint edges given as flat vertex pairs, i.e. `[a0, b0, a1, b1, ...]`.
    pub fn insert_edges_flat(&mut self, idxs: &[VertexIdx]) -> HowResult<()> {
        let edges = edges_from_flat(idxs)?;
        self.insert_edges(&edges)
    }

    /// Conform to constraint edges given as flat vertex pairs, i.e. `[a0, b0, a1, b1, ...]`.
    pub fn conform_to_edges_flat(&mut self, idxs: &[VertexIdx]) -> HowResult<()> {
        let edges = edges_from_flat(idxs)?;
        self.conform_to_edges(&edges)
    }

    /// Check the edges and translate them to internal numbering, zero-length edges are dropped.
    fn validate_edges(&self, edges: &[Edge]) -> HowResult<Vec<Edge>> {
        if self.stage == Stage::Finalized {
            bail!("Cannot insert edges, the super-triangle was already erased");
        }

        let offset = self.vertex_offset();
        let num_vertices = self.vertices.len() - offset;
        if let Some(edge) = edges.iter().find(|edge| edge.v2() >= num_vertices) {
            bail!("{edge} references a vertex that does not exist, there are {num_vertices} vertices");
        }

        let edges = edges
            .iter()
            .filter(|edge| {
                if edge.is_degenerate() {
                    #[cfg(feature = "logging")]
                    log::warn!("Skipping zero-length {edge}");
                    return false;
                }
                true
            })
            .map(|edge| edge.shifted_up(offset))
            .collect();

        HowOk(edges)
    }

    fn insert_edge(&mut self, original: Edge) -> HowResult<()> {
        let mut to_insert = vec![(original.v1(), original.v2())];

        while let Some((a, b)) = to_insert.pop() {
            if a == b {
                continue;
            }
            if self.tds.find_hedge(a, b).is_some() {
                self.fix_edge(Edge::new(a, b), original);
                continue;
            }

            match self.trace(a, b)? {
                Trace::Vertex(c) => {
                    to_insert.push((c, b));
                    to_insert.push((a, c));
                }
                Trace::FixedEdge(hedge_idx) => {
                    let c = self.split_at_intersection(hedge_idx, a, b)?;
                    to_insert.push((c, b));
                    to_insert.push((a, c));
                }
                Trace::Crossings(crossings) => {
                    self.flip_crossings(a, b, crossings, original)?;
                }
            }
        }

        HowOk(())
    }

    fn conform_to_edge(&mut self, original: Edge) -> HowResult<()> {
        let mut to_insert = vec![(original.v1(), original.v2())];

        while let Some((a, b)) = to_insert.pop() {
            if a == b {
                continue;
            }
            if self.tds.find_hedge(a, b).is_some() {
                self.fix_edge(Edge::new(a, b), original);
                continue;
            }

            let c = match self.trace(a, b)? {
                Trace::Vertex(c) => c,
                Trace::FixedEdge(hedge_idx) => self.split_at_intersection(hedge_idx, a, b)?,
                // crossed fixed edges are not resolved, so they are flipped away like in `insert_edges`
                Trace::Crossings(crossings)
                    if crossings.iter().any(|edge| self.fixed_edges.contains(edge)) =>
                {
                    self.flip_crossings(a, b, crossings, original)?;
                    continue;
                }
                Trace::Crossings(_) => self.insert_midpoint(a, b)?,
            };

            to_insert.push((c, b));
            to_insert.push((a, c));
        }

        HowOk(())
    }

    /// Mark an edge as fixed, `original` is the constraint edge it is a piece of.
    pub(super) fn fix_edge(&mut self, edge: Edge, original: Edge) {
        if !self.fixed_edges.insert(edge) {
            *self.overlap_count.entry(edge).or_insert(0) += 1;
        }

        if edge != original {
            let originals = self.piece_to_originals.entry(edge).or_default();
            if !originals.contains(&original) {
                originals.push(original);
            }
        }
    }

    /// Replace the fixed `edge` by its two halves at `v_idx`, which inherit its overlaps and originals.
    pub(super) fn split_fixed_edge(&mut self, edge: Edge, v_idx: VertexIdx) {
        let halves = [Edge::new(edge.v1(), v_idx), Edge::new(v_idx, edge.v2())];

        self.fixed_edges.remove(&edge);
        let overlaps = self.overlap_count.remove(&edge);
        let originals = self
            .piece_to_originals
            .remove(&edge)
            .unwrap_or_else(|| vec![edge]);

        for half in halves {
            self.fixed_edges.insert(half);

            if let Some(overlaps) = overlaps {
                *self.overlap_count.entry(half).or_insert(0) += overlaps;
            }

            let half_originals = self.piece_to_originals.entry(half).or_default();
            for original in &originals {
                if !half_originals.contains(original) {
                    half_originals.push(*original);
                }
            }
        }
    }

    /// Whether `c` should split the segment `a -- b`, i.e. lies on it or closer than the tolerance.
    fn is_on_segment(&self, c: VertexIdx, a: VertexIdx, b: VertexIdx) -> bool {
        if c < self.vertex_offset() || c == a || c == b {
            return false;
        }

        let [pa, pb, pc] = [a, b, c].map(|i| &self.vertices[i]);

        let t = projection_parameter(pc, pa, pb);
        if t <= 0.0 || t >= 1.0 {
            return false;
        }

        orient_2d(pa, pb, pc) == 0.0
            || distance_to_line(pc, pa, pb) < self.min_dist_to_constraint_edge
    }

    /// Walk from `a` towards `b` through the triangles crossed by the segment.
    fn trace(&self, a: VertexIdx, b: VertexIdx) -> HowResult<Trace> {
        let resolve = self.intersecting_edges == IntersectingConstraintEdges::Resolve;
        let pa = &self.vertices[a];
        let pb = &self.vertices[b];

        // the triangle at `a` whose opposite edge is crossed first
        let mut first_crossed = None;
        for hedge_idx in self.tds.hedges_around(a) {
            let hedge = self.tds.get_hedge(hedge_idx)?;
            let x = hedge.end_node();
            let y = hedge.opposite_node();

            for c in [x, y] {
                if self.is_on_segment(c, a, b) {
                    return HowOk(Trace::Vertex(c));
                }
            }

            if orient_2d(pa, pb, &self.vertices[x]) < 0.0
                && orient_2d(pa, pb, &self.vertices[y]) > 0.0
            {
                first_crossed = Some(hedge.next().idx);
            }
        }

        let Some(mut hedge_idx) = first_crossed else {
            bail!("No triangle at vertex {a} faces vertex {b}");
        };

        // the crossed hedge always goes from the right to the left of `a -> b`
        let mut crossings = Vec::new();
        for _ in 0..=self.tds.num_tris() {
            let hedge = self.tds.get_hedge(hedge_idx)?;
            let edge = Edge::new(hedge.starting_node(), hedge.end_node());

            if resolve && self.fixed_edges.contains(&edge) {
                return HowOk(Trace::FixedEdge(hedge_idx));
            }
            crossings.push(edge);

            let Some(twin) = hedge.twin() else {
                bail!("Segment {a} -> {b} leaves the triangulation");
            };

            let z = twin.opposite_node();
            if z == b {
                return HowOk(Trace::Crossings(crossings));
            }
            if self.is_on_segment(z, a, b) {
                return HowOk(Trace::Vertex(z));
            }

            hedge_idx = if orient_2d(pa, pb, &self.vertices[z]) > 0.0 {
                twin.next().idx
            } else {
                twin.prev().idx
            };
        }

        bail!("Tracing segment {a} -> {b} did not terminate")
    }

    /// Points closer than this are the same when splitting `a -- b`.
    fn snap_tolerance(&self, a: VertexIdx, b: VertexIdx) -> f64 {
        SNAP_TOLERANCE * distance(&self.vertices[a], &self.vertices[b])
    }

    /// The vertex of `candidates` closest to `p`, if it is within `tolerance`.
    fn snap(&self, p: &Vertex2, candidates: &[VertexIdx], tolerance: f64) -> Option<VertexIdx> {
        candidates
            .iter()
            .map(|&v_idx| (v_idx, distance(p, &self.vertices[v_idx])))
            .filter(|&(_, dist)| dist <= tolerance)
            .min_by(|(_, d0), (_, d1)| d0.total_cmp(d1))
            .map(|(v_idx, _)| v_idx)
    }

    /// Split `a -- b` where it crosses the fixed edge of `hedge_idx`, and split that edge there too.
    ///
    /// The rounded intersection snaps to an endpoint of either segment if it is close to it. Otherwise a new vertex
    /// is inserted into one of the triangles at the fixed edge, or onto the edge itself.
    fn split_at_intersection(
        &mut self,
        hedge_idx: HedgeIteratorIdx,
        a: VertexIdx,
        b: VertexIdx,
    ) -> HowResult<VertexIdx> {
        let hedge = self.tds.get_hedge(hedge_idx)?;
        let c = hedge.starting_node();
        let d = hedge.end_node();
        let fixed = Edge::new(c, d);

        let [pa, pb, pc, pd] = [a, b, c, d].map(|i| &self.vertices[i]);
        let p = intersection_point(pa, pb, pc, pd);

        let tolerance = self.snap_tolerance(a, b).max(self.snap_tolerance(c, d));
        if let Some(v_idx) = self.snap(&p, &[c, d, a, b], tolerance) {
            #[cfg(feature = "logging")]
            log::debug!("Intersection of {a} -> {b} with fixed {c} -> {d} snaps to vertex {v_idx}");

            if v_idx == a || v_idx == b {
                self.reroute_fixed_edge(fixed, v_idx)?;
            }
            return HowOk(v_idx);
        }

        if let Some(&existing) = self.vertex_lookup.get(&vertex_key(&p)) {
            return HowOk(existing);
        }

        let location = self.locate(&p, hedge_idx / 3)?;
        let v_idx = match location {
            Location::OnVertex(existing) => return HowOk(existing),
            Location::OnEdge(on_idx) if self.hedge_edge(on_idx)? == fixed => {
                let v_idx = self.push_vertex(p);
                let tris = self.tds.flip_2_to_4(on_idx, v_idx)?;
                self.split_fixed_edge(fixed, v_idx);
                self.restore_delaunay_around(v_idx, &tris)?;
                v_idx
            }
            Location::Inside(tri_idx) if self.tri_has_edge(tri_idx, fixed)? => {
                let v_idx = self.push_vertex(p);
                let tris = self.tds.flip_1_to_3(tri_idx, v_idx)?.map(|tri| tri.idx);
                self.split_fixed_edge(fixed, v_idx);
                self.restore_delaunay_around(v_idx, &tris)?;
                v_idx
            }
            _ => bail!(
                "Intersection {p:?} of {a} -> {b} with fixed {c} -> {d} is not next to the fixed edge"
            ),
        };

        #[cfg(feature = "logging")]
        log::debug!("Resolved intersection of {a} -> {b} with fixed {c} -> {d} by vertex {v_idx}");

        self.register_vertex(v_idx);
        self.last_inserted = Some(v_idx);

        HowOk(v_idx)
    }

    /// Route the fixed `edge` over `v_idx`, a vertex of a triangle at the edge that lies on it up to rounding.
    ///
    /// The halves become fixed, the edge itself stays in the mesh as an ordinary edge.
    fn reroute_fixed_edge(&mut self, edge: Edge, v_idx: VertexIdx) -> HowResult<()> {
        for (x, y) in [(edge.v1(), v_idx), (v_idx, edge.v2())] {
            if self.tds.find_hedge(x, y).is_none() {
                bail!("Cannot route fixed {edge} over vertex {v_idx}, {x} -> {y} is not an edge");
            }
        }

        self.split_fixed_edge(edge, v_idx);
        HowOk(())
    }

    fn hedge_edge(&self, hedge_idx: HedgeIteratorIdx) -> HowResult<Edge> {
        let hedge = self.tds.get_hedge(hedge_idx)?;
        HowOk(Edge::new(hedge.starting_node(), hedge.end_node()))
    }

    fn tri_has_edge(&self, tri_idx: TriIteratorIdx, edge: Edge) -> HowResult<bool> {
        let nodes = self.tds.get_tri(tri_idx)?.nodes();
        HowOk(nodes.contains(&edge.v1()) && nodes.contains(&edge.v2()))
    }

    /// Insert the midpoint of `a -- b` as a regular vertex, or use a vertex already close to it.
    fn insert_midpoint(&mut self, a: VertexIdx, b: VertexIdx) -> HowResult<VertexIdx> {
        let p = midpoint(&self.vertices[a], &self.vertices[b]);

        let location = self.locate(&p, self.tds.vertex_tri(a))?;
        if matches!(location, Location::OnVertex(v_idx) if v_idx == a || v_idx == b) {
            bail!("Midpoint of {a} -> {b} is not representable");
        }
        let mut nearby = match location {
            Location::OnVertex(existing) => vec![existing],
            Location::OnEdge(hedge_idx) => {
                let hedge = self.tds.get_hedge(hedge_idx)?;
                let mut nearby = vec![hedge.starting_node(), hedge.end_node(), hedge.opposite_node()];
                if let Some(twin) = hedge.twin() {
                    nearby.push(twin.opposite_node());
                }
                nearby
            }
            Location::Inside(tri_idx) => self.tds.get_tri(tri_idx)?.nodes().to_vec(),
        };
        let offset = self.vertex_offset();
        nearby.retain(|&v_idx| v_idx >= offset && v_idx != a && v_idx != b);

        if let Some(existing) = self.snap(&p, &nearby, self.snap_tolerance(a, b)) {
            return HowOk(existing);
        }

        let v_idx = self.push_vertex(p);
        self.insert_vertex_helper(v_idx)?;

        HowOk(v_idx)
    }

    /// Flip the edges crossing `a -- b` until it is part of the triangulation (Sloan's algorithm),
    /// then restore the Delaunay property for the new edges.
    fn flip_crossings(
        &mut self,
        a: VertexIdx,
        b: VertexIdx,
        crossings: Vec<Edge>,
        original: Edge,
    ) -> HowResult<()> {
        let pa = self.vertices[a];
        let pb = self.vertices[b];

        let mut to_flip: VecDeque<Edge> = crossings.into();
        let mut new_edges = Vec::new();
        let mut num_skipped = 0;

        while let Some(edge) = to_flip.pop_front() {
            let Some(hedge) = self.tds.find_hedge(edge.v1(), edge.v2()) else {
                bail!("Crossing {edge} is not part of the triangulation");
            };
            let Some(twin) = hedge.twin() else {
                bail!("Crossing {edge} lies on the boundary");
            };

            let hedge_idx = hedge.idx;
            let p = hedge.starting_node();
            let q = hedge.end_node();
            let r = hedge.opposite_node();
            let s = twin.opposite_node();
            let [vp, vq, vr, vs] = [p, q, r, s].map(|i| self.vertices[i]);

            // the quad `r, p, s, q` has to be strictly convex to be flipped
            if !segments_cross(&vp, &vq, &vr, &vs) {
                num_skipped += 1;
                if num_skipped > to_flip.len() {
                    bail!("None of the edges crossing {a} -> {b} can be flipped");
                }
                to_flip.push_back(edge);
                continue;
            }
            num_skipped = 0;

            self.tds.flip_2_to_2(hedge_idx)?;

            let flipped = Edge::new(r, s);
            if !flipped.contains(a) && !flipped.contains(b) && segments_cross(&pa, &pb, &vr, &vs)
            {
                to_flip.push_back(flipped);
            } else {
                new_edges.push(flipped);
            }
        }

        if self.tds.find_hedge(a, b).is_none() {
            bail!("Edge {a} -> {b} is missing after flipping all crossings");
        }

        self.fix_edge(Edge::new(a, b), original);
        self.restore_delaunay_edges(new_edges)
    }
}

fn edges_from_flat(idxs: &[VertexIdx]) -> HowResult<Vec<Edge>> {
    if idxs.len() % 2 != 0 {
        bail!("Expected an even number of vertex indices, got {}", idxs.len());
    }

    HowOk(idxs.chunks_exact(2).map(|e| Edge::new(e[0], e[1])).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::triangulation::VertexInsertionOrder;
    use cdt_test_utils::{loop_edges, regular_polygon, sample_vertices_2d};

    fn triangulation(intersecting_edges: IntersectingConstraintEdges) -> Triangulation {
        Triangulation::new(VertexInsertionOrder::AsProvided, intersecting_edges, 0.0)
    }

    fn verify(triangulation: &Triangulation) {
        assert!(triangulation.tds().is_sound());
        assert_eq!(triangulation.verify_topology(), Ok(()));
        assert_eq!(triangulation.par_is_delaunay(), 1.0);
    }

    const RHOMBUS: [[f64; 2]; 4] = [[-1.0, 0.0], [0.0, 0.5], [1.0, 0.0], [0.0, -0.5]];

    /// Three horizontal lines, the middle one made of two collinear edges.
    const STRIPES: [[f64; 2]; 7] = [
        [0.0, 0.0],
        [4.0, 0.0],
        [5.0, 1.0],
        [2.0, 1.0],
        [-1.0, 1.0],
        [0.0, 2.0],
        [4.0, 2.0],
    ];

    fn stripes_edges() -> [Edge; 4] {
        [[0, 1], [2, 3], [3, 4], [5, 6]].map(Edge::from)
    }

    /// Points on the unit circle and the diameters between opposite ones, all crossing at the center.
    fn diameters(n: usize) -> (Vec<[f64; 2]>, Vec<Edge>) {
        let vertices = regular_polygon(n, [0.0, 0.0], 1.0);
        let edges = (0..n / 2).map(|i| Edge::new(i, i + n / 2)).collect();
        (vertices, edges)
    }

    #[test]
    fn test_insert_existing_edge() {
        let mut triangulation = triangulation(IntersectingConstraintEdges::Resolve);
        triangulation.insert_vertices(&RHOMBUS).unwrap();

        triangulation.insert_edges(&[Edge::new(0, 1)]).unwrap();
        assert!(triangulation.fixed_edges().contains(&Edge::new(3, 4)));
        assert!(triangulation.overlap_count().is_empty());

        // a second time counts as overlap
        triangulation.insert_edges(&[Edge::new(1, 0)]).unwrap();
        assert_eq!(triangulation.overlap_count()[&Edge::new(3, 4)], 1);
        verify(&triangulation);
    }

    #[test]
    fn test_insert_edge_by_flipping() {
        let mut triangulation = triangulation(IntersectingConstraintEdges::Resolve);
        triangulation.insert_vertices(&RHOMBUS).unwrap();
        // the Delaunay diagonal is the short one
        assert!(triangulation.tds().find_hedge(4, 6).is_some());

        triangulation.insert_edges(&[Edge::new(0, 2)]).unwrap();

        assert!(triangulation.tds().find_hedge(3, 5).is_some());
        assert!(triangulation.tds().find_hedge(4, 6).is_none());
        assert_eq!(triangulation.vertices_count(), 7);
        verify(&triangulation);
    }

    #[test]
    fn test_resolve_intersection() {
        let mut triangulation = triangulation(IntersectingConstraintEdges::Resolve);
        triangulation.insert_vertices(&RHOMBUS).unwrap();
        triangulation
            .insert_edges(&[Edge::new(0, 2), Edge::new(1, 3)])
            .unwrap();

        // a vertex at the intersection was added
        assert_eq!(triangulation.vertices_count(), 8);
        assert_eq!(triangulation.vertices()[7], [0.0, 0.0]);
        assert_eq!(triangulation.fixed_edges_count(), 4);

        let originals = triangulation.piece_to_originals();
        assert_eq!(originals[&Edge::new(3, 7)], vec![Edge::new(3, 5)]);
        assert_eq!(originals[&Edge::new(5, 7)], vec![Edge::new(3, 5)]);
        assert_eq!(originals[&Edge::new(4, 7)], vec![Edge::new(4, 6)]);
        assert_eq!(originals[&Edge::new(6, 7)], vec![Edge::new(4, 6)]);
        verify(&triangulation);
    }

    #[test]
    fn test_ignore_intersection() {
        let mut triangulation = triangulation(IntersectingConstraintEdges::Ignore);
        triangulation.insert_vertices(&RHOMBUS).unwrap();
        triangulation
            .insert_edges(&[Edge::new(0, 2), Edge::new(1, 3)])
            .unwrap();

        // no vertex is added, the second edge wins
        assert_eq!(triangulation.vertices_count(), 7);
        assert!(triangulation.tds().find_hedge(4, 6).is_some());
        assert!(triangulation.tds().find_hedge(3, 5).is_none());
        assert_eq!(triangulation.fixed_edges_count(), 2);
        assert!(triangulation.tds().is_sound());
    }

    #[test]
    fn test_vertex_on_edge() {
        let vertices = [[0.0, 0.0], [1.0, 0.0], [2.0, 0.0], [1.0, 1.0], [1.0, -1.0]];

        let mut triangulation = triangulation(IntersectingConstraintEdges::Resolve);
        triangulation.insert_vertices(&vertices).unwrap();
        triangulation.insert_edges(&[Edge::new(0, 2)]).unwrap();

        let fixed = triangulation.fixed_edges();
        assert_eq!(fixed.len(), 2);
        assert!(fixed.contains(&Edge::new(3, 4)));
        assert!(fixed.contains(&Edge::new(4, 5)));
        assert_eq!(
            triangulation.piece_to_originals()[&Edge::new(3, 4)],
            vec![Edge::new(3, 5)]
        );
        verify(&triangulation);
    }

    #[test]
    fn test_vertex_near_edge() {
        let vertices = [[0.0, 0.0], [1.0, 1e-3], [2.0, 0.0], [1.0, 1.0], [1.0, -1.0]];

        let mut triangulation = Triangulation::new(
            VertexInsertionOrder::AsProvided,
            IntersectingConstraintEdges::Resolve,
            1e-2,
        );
        triangulation.insert_vertices(&vertices).unwrap();
        triangulation.insert_edges(&[Edge::new(0, 2)]).unwrap();

        assert!(triangulation.fixed_edges().contains(&Edge::new(3, 4)));
        assert!(triangulation.fixed_edges().contains(&Edge::new(4, 5)));
        assert!(!triangulation.fixed_edges().contains(&Edge::new(3, 5)));
    }

    #[test]
    fn test_insert_many_edges() {
        let vertices = regular_polygon(7, [0.0, 0.0], 1.0);
        let edges = [[0, 2], [2, 4], [4, 6], [6, 0]].map(Edge::from);

        let mut triangulation = Triangulation::default();
        triangulation.insert_vertices(&vertices).unwrap();
        triangulation.insert_edges(&edges).unwrap();

        assert_eq!(triangulation.vertices_count(), 10);
        assert_eq!(triangulation.triangles_count(), 15);
        assert_eq!(triangulation.fixed_edges_count(), 4);
        verify(&triangulation);
    }

    #[test]
    fn test_insert_stripes() {
        let mut triangulation = triangulation(IntersectingConstraintEdges::Ignore);
        triangulation.insert_vertices(&STRIPES).unwrap();
        triangulation.insert_edges(&stripes_edges()).unwrap();

        assert_eq!(triangulation.vertices_count(), 10);
        assert_eq!(triangulation.triangles_count(), 15);
        assert_eq!(triangulation.fixed_edges_count(), 4);
        verify(&triangulation);
    }

    #[test]
    fn test_conform_to_stripes() {
        let mut triangulation = triangulation(IntersectingConstraintEdges::Ignore);
        triangulation.insert_vertices(&STRIPES).unwrap();
        triangulation.conform_to_edges(&stripes_edges()).unwrap();

        assert_eq!(triangulation.vertices_count(), 12);
        assert_eq!(triangulation.triangles_count(), 19);
        assert_eq!(triangulation.fixed_edges_count(), 6);
        verify(&triangulation);
    }

    #[test]
    fn test_concurrent_intersections() {
        for n in [8, 12] {
            let (vertices, edges) = diameters(n);

            let mut triangulation = triangulation(IntersectingConstraintEdges::Resolve);
            triangulation.insert_vertices(&vertices).unwrap();
            triangulation.insert_edges(&edges).unwrap();

            // all diameters meet in a single new vertex
            assert_eq!(triangulation.vertices_count(), n + 4);
            let center = triangulation.vertices()[n + 3];
            assert!(distance(&center, &[0.0, 0.0]) < 1e-12);
            assert_eq!(triangulation.fixed_edges_count(), n);
            for edge in triangulation.fixed_edges() {
                assert!(edge.contains(n + 3));
            }
            verify(&triangulation);

            triangulation.erase_super_triangle().unwrap();
            assert_eq!(triangulation.triangles_count(), n);
            assert_eq!(triangulation.verify_topology(), Ok(()));
        }
    }

    #[test]
    fn test_conform_to_concurrent_edges() {
        for n in [8, 12] {
            let (vertices, edges) = diameters(n);

            let mut triangulation = triangulation(IntersectingConstraintEdges::Resolve);
            triangulation.insert_vertices(&vertices).unwrap();
            triangulation.conform_to_edges(&edges).unwrap();

            verify(&triangulation);
            // no cluster of vertices around the center
            let vertices = triangulation.vertices();
            for (i, v) in vertices.iter().enumerate() {
                for w in &vertices[i + 1..] {
                    assert!(distance(v, w) > 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_intersection_next_to_endpoint() {
        // the fixed edge passes a hair below vertex 2, the rounded crossing lands on it
        let vertices = [[-1.0, 0.0], [1.0, 0.0], [0.0, 1e-17], [0.0, 1.0], [0.0, -1.0]];

        let mut triangulation = triangulation(IntersectingConstraintEdges::Resolve);
        triangulation.insert_vertices(&vertices).unwrap();
        triangulation
            .insert_edges(&[Edge::new(0, 1), Edge::new(2, 4)])
            .unwrap();

        // no vertex was added, the fixed edge now runs over vertex 2
        assert_eq!(triangulation.vertices_count(), 8);
        assert!(triangulation.fixed_edges().contains(&Edge::new(3, 5)));
        assert!(triangulation.fixed_edges().contains(&Edge::new(4, 5)));
        assert!(triangulation.fixed_edges().contains(&Edge::new(5, 7)));
        assert!(!triangulation.fixed_edges().contains(&Edge::new(3, 4)));
        assert_eq!(triangulation.verify_topology(), Ok(()));
    }

    #[test]
    fn test_insert_edges_random() {
        let vertices = sample_vertices_2d(200, None);
        // a closed polygon through the first vertices might cross itself, resolve the crossings
        let edges: Vec<Edge> = loop_edges(12, 0).into_iter().map(Edge::from).collect();

        let mut triangulation = triangulation(IntersectingConstraintEdges::Resolve);
        triangulation.insert_vertices(&vertices).unwrap();
        triangulation.insert_edges(&edges).unwrap();

        verify(&triangulation);
        for edge in triangulation.fixed_edges() {
            assert!(triangulation.tds().find_hedge(edge.v1(), edge.v2()).is_some());
        }
    }

    #[test]
    fn test_conform_to_edges() {
        let vertices = [[-1.0, 0.0], [0.0, 0.1], [1.0, 0.0], [0.0, -0.1]];

        let mut triangulation = triangulation(IntersectingConstraintEdges::Resolve);
        triangulation.insert_vertices(&vertices).unwrap();
        triangulation.conform_to_edges(&[Edge::new(0, 2)]).unwrap();

        // the midpoint was inserted
        assert_eq!(triangulation.vertices_count(), 8);
        assert_eq!(triangulation.vertices()[7], [0.0, 0.0]);
        assert_eq!(
            triangulation.piece_to_originals()[&Edge::new(3, 7)],
            vec![Edge::new(3, 5)]
        );
        assert_eq!(
            triangulation.piece_to_originals()[&Edge::new(5, 7)],
            vec![Edge::new(3, 5)]
        );
        verify(&triangulation);
    }

    #[test]
    fn test_conform_to_edges_random() {
        let vertices = sample_vertices_2d(100, None);
        let edges: Vec<Edge> = loop_edges(8, 0).into_iter().map(Edge::from).collect();

        let mut triangulation = triangulation(IntersectingConstraintEdges::Resolve);
        triangulation.insert_vertices(&vertices).unwrap();
        triangulation.conform_to_edges(&edges).unwrap();

        verify(&triangulation);
    }

    #[test]
    fn test_invalid_edges() {
        let mut triangulation = triangulation(IntersectingConstraintEdges::Resolve);
        assert!(triangulation.insert_edges(&[Edge::new(0, 1)]).is_err());
        assert!(triangulation.insert_edges(&[]).is_ok());

        triangulation.insert_vertices(&RHOMBUS).unwrap();
        assert!(
            triangulation
                .insert_edges(&[Edge::new(0, 1), Edge::new(2, 4)])
                .is_err()
        );
        assert!(triangulation.insert_edges_flat(&[0, 1, 2]).is_err());
        assert!(triangulation.conform_to_edges_flat(&[0]).is_err());
        // nothing was fixed
        assert!(triangulation.fixed_edges().is_empty());

        // zero-length edges are skipped
        triangulation.insert_edges(&[Edge::new(1, 1)]).unwrap();
        assert!(triangulation.fixed_edges().is_empty());

        triangulation.insert_edges_flat(&[0, 1, 1, 2]).unwrap();
        assert_eq!(triangulation.fixed_edges_count(), 2);
    }
}
