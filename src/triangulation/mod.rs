//! Incremental constrained Delaunay triangulation.
//!
//! Vertices are inserted into a bounding super-triangle, whose three vertices occupy the indices `0, 1, 2` until one of
//! the `erase_*` methods removes them. Constraint edges are given in user numbering, i.e. `0` is the first vertex the
//! caller inserted.

mod constraints;
mod erase;
mod locate;

pub use locate::Location;

use core::fmt;
use std::collections::{HashMap, HashSet};

use crate::{
    edge::Edge,
    predicates::{in_circle, locate_point_line, orient_2d},
    triangle::Triangle,
    trids::tri_data_structure::TriDataStructure,
    utils::types::{HedgeIteratorIdx, TriIteratorIdx, Vertex2, VertexIdx},
};
use anyhow::{Ok as HowOk, Result as HowResult, bail};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Number of vertices of the super-triangle, they always come first.
pub(crate) const SUPER_VERTICES: usize = 3;

const RANDOM_SEED: u64 = 0x5eed_cd70;

/// Order in which the vertices of a batch are inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum VertexInsertionOrder {
    /// A pseudo-random permutation, reproducible between runs.
    #[default]
    Randomized,
    /// The order of the input.
    AsProvided,
}

/// What to do when a constraint edge crosses an already fixed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum IntersectingConstraintEdges {
    /// The crossed edge is flipped away like any other edge, it stays registered as fixed.
    #[default]
    Ignore,
    /// A vertex is inserted at the intersection point and both edges are split there.
    Resolve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// No vertex was inserted yet.
    Empty,
    /// The super-triangle exists.
    Building,
    /// The super-triangle was erased, no further insertions are possible.
    Finalized,
}

/// A 2D constrained Delaunay triangulation.
///
/// ```
/// use cdt::{Edge, IntersectingConstraintEdges, Triangulation, VertexInsertionOrder};
///
/// let vertices = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
///
/// let mut triangulation = Triangulation::new(
///     VertexInsertionOrder::AsProvided,
///     IntersectingConstraintEdges::Resolve,
///     0.0,
/// );
/// triangulation.insert_vertices(&vertices).unwrap();
/// triangulation.insert_edges(&[Edge::new(0, 2)]).unwrap();
/// triangulation.erase_super_triangle().unwrap();
///
/// assert_eq!(triangulation.triangles_count(), 2);
/// assert!(triangulation.fixed_edges().contains(&Edge::new(0, 2)));
/// assert!(triangulation.is_topology_valid());
/// ```
#[derive(Debug, Clone)]
pub struct Triangulation {
    insertion_order: VertexInsertionOrder,
    intersecting_edges: IntersectingConstraintEdges,
    /// Vertices closer than this to a constraint edge being inserted split the edge.
    min_dist_to_constraint_edge: f64,

    tds: TriDataStructure,
    vertices: Vec<Vertex2>,
    stage: Stage,
    /// The locate walk starts at this vertex
    last_inserted: Option<VertexIdx>,
    /// Bit patterns of the coordinates, to merge duplicates
    vertex_lookup: HashMap<[u64; 2], VertexIdx>,

    fixed_edges: HashSet<Edge>,
    overlap_count: HashMap<Edge, usize>,
    piece_to_originals: HashMap<Edge, Vec<Edge>>,

    #[cfg(feature = "timing")]
    time_walking: u128,
    #[cfg(feature = "timing")]
    time_inserting: u128,
    #[cfg(feature = "timing")]
    time_flipping: u128,
}

impl Default for Triangulation {
    fn default() -> Self {
        Self::new(
            VertexInsertionOrder::default(),
            IntersectingConstraintEdges::default(),
            0.0,
        )
    }
}

/// Create a new [`Triangulation`] with the default configuration from vertices and, optionally, constraint edges.
///
/// Errors are discarded: the result holds what was built before the first failing step, e.g. no vertices at all
/// for a non-finite coordinate. Use [`Triangulation::insert_vertices`] and [`Triangulation::insert_edges`] to
/// handle them.
///
/// ## Example
/// ```
/// # use cdt::{triangulation, Edge};
/// let vertices = [[0.0, 0.0], [2.0, 0.1], [1.0, 1.5], [0.9, -1.2]];
/// triangulation!(&vertices);
/// // with constraint edges
/// triangulation!(&vertices, edges = &[Edge::new(0, 1)]);
/// ```
#[macro_export]
macro_rules! triangulation {
    ($vertices:expr) => {{
        let mut triangulation = $crate::Triangulation::default();
        let _ = triangulation.insert_vertices($vertices);
        triangulation
    }};
    ($vertices:expr, edges = $edges:expr) => {{
        let mut triangulation = $crate::Triangulation::default();
        if triangulation.insert_vertices($vertices).is_ok() {
            let _ = triangulation.insert_edges($edges);
        }
        triangulation
    }};
}

/// Key for exact duplicate detection, `-0.0` and `0.0` are the same.
fn vertex_key(v: &Vertex2) -> [u64; 2] {
    [(v[0] + 0.0).to_bits(), (v[1] + 0.0).to_bits()]
}

/// Smallest super-triangle radius relative to the magnitude of its center, about a thousand ulps.
const MIN_RELATIVE_RADIUS: f64 = 1024.0 * f64::EPSILON;

/// The super-triangle enclosing `vertices`, counter-clockwise.
///
/// An equilateral triangle around the bounding box. Its extent never falls below a few ulps of the center's
/// magnitude, so its vertices stay distinct from the center after rounding.
fn super_triangle(vertices: &[Vertex2]) -> HowResult<[Vertex2; 3]> {
    let mut min = [f64::INFINITY; 2];
    let mut max = [f64::NEG_INFINITY; 2];
    for v in vertices {
        for i in 0..2 {
            min[i] = min[i].min(v[i]);
            max[i] = max[i].max(v[i]);
        }
    }

    let center = [min[0] / 2.0 + max[0] / 2.0, min[1] / 2.0 + max[1] / 2.0];
    let size = (max[0] - min[0]).max(max[1] - min[1]);
    let magnitude = center[0].abs().max(center[1].abs());
    // radius of the inscribed circle, it contains the bounding box
    let r = (2.0 * size).max(1.0).max(magnitude * MIN_RELATIVE_RADIUS);
    let big_r = 2.0 * r;
    let shift_x = big_r * 3f64.sqrt() / 2.0;

    let super_vertices = [
        [center[0] - shift_x, center[1] - r],
        [center[0] + shift_x, center[1] - r],
        [center[0], center[1] + big_r],
    ];

    if super_vertices.iter().flatten().any(|c| !c.is_finite()) {
        bail!("Vertices spanning {min:?} to {max:?} are too large to be enclosed by a super-triangle");
    }
    let [a, b, c] = super_vertices.each_ref();
    if orient_2d(a, b, c) <= 0.0 {
        bail!("Super-triangle {super_vertices:?} is degenerate");
    }
    if let Some(v) = vertices.iter().find(|v| !is_strictly_inside([a, b, c], v)) {
        bail!("Vertex {v:?} is not enclosed by the super-triangle {super_vertices:?}");
    }

    HowOk(super_vertices)
}

/// Whether `v` lies strictly inside of the counter-clockwise triangle `[a, b, c]`.
fn is_strictly_inside([a, b, c]: [&Vertex2; 3], v: &Vertex2) -> bool {
    orient_2d(a, b, v) > 0.0 && orient_2d(b, c, v) > 0.0 && orient_2d(c, a, v) > 0.0
}

impl Triangulation {
    pub fn new(
        insertion_order: VertexInsertionOrder,
        intersecting_edges: IntersectingConstraintEdges,
        min_dist_to_constraint_edge: f64,
    ) -> Self {
        Self {
            insertion_order,
            intersecting_edges,
            min_dist_to_constraint_edge,
            tds: TriDataStructure::new(),
            vertices: Vec::new(),
            stage: Stage::Empty,
            last_inserted: None,
            vertex_lookup: HashMap::new(),
            fixed_edges: HashSet::new(),
            overlap_count: HashMap::new(),
            piece_to_originals: HashMap::new(),
            #[cfg(feature = "timing")]
            time_walking: 0,
            #[cfg(feature = "timing")]
            time_inserting: 0,
            #[cfg(feature = "timing")]
            time_flipping: 0,
        }
    }

    /// Insert a batch of vertices.
    ///
    /// Returns for each input vertex, in input order, the index it received in user numbering.
    /// A vertex with the same coordinates as an existing one is merged into it and receives its index.
    ///
    /// ## Errors
    /// Returns an error, before changing anything, if a coordinate is not finite, a vertex lies outside of the
    /// super-triangle created by the first batch, or the triangulation was already finalized by an erase.
    pub fn insert_vertices(&mut self, vertices: &[Vertex2]) -> HowResult<Vec<VertexIdx>> {
        if self.stage == Stage::Finalized {
            bail!("Cannot insert vertices, the super-triangle was already erased");
        }
        if let Some(v) = vertices
            .iter()
            .find(|v| !v[0].is_finite() || !v[1].is_finite())
        {
            bail!("Vertex {v:?} has non-finite coordinates");
        }
        if vertices.is_empty() {
            return HowOk(Vec::new());
        }

        if self.stage == Stage::Empty {
            self.insert_super_triangle(vertices)?;
        } else if let Some(v) = vertices
            .iter()
            .find(|v| !self.is_inside_super_triangle(v))
        {
            bail!("Vertex {v:?} lies outside of the super-triangle");
        }

        let offset = self.vertex_offset();
        let mut idxs = Vec::with_capacity(vertices.len());
        let mut idxs_to_insert = Vec::with_capacity(vertices.len());
        // vertices of this batch enter `vertex_lookup` once they are part of the mesh
        let mut pending: HashMap<[u64; 2], VertexIdx> = HashMap::new();

        for v in vertices {
            let key = vertex_key(v);
            let known = self
                .vertex_lookup
                .get(&key)
                .or_else(|| pending.get(&key))
                .copied();

            let v_idx = match known {
                Some(v_idx) => v_idx,
                None => {
                    let v_idx = self.push_vertex(*v);
                    pending.insert(key, v_idx);
                    idxs_to_insert.push(v_idx);
                    v_idx
                }
            };
            idxs.push(v_idx - offset);
        }

        if self.insertion_order == VertexInsertionOrder::Randomized {
            let mut rng = StdRng::seed_from_u64(RANDOM_SEED ^ self.vertices.len() as u64);
            idxs_to_insert.shuffle(&mut rng);
        }

        #[cfg(feature = "logging")]
        log::debug!(
            "Inserting {} vertices ({} merged)",
            idxs_to_insert.len(),
            vertices.len() - idxs_to_insert.len()
        );

        for v_idx in idxs_to_insert {
            self.insert_vertex_helper(v_idx)?;
        }

        #[cfg(all(feature = "logging", feature = "timing"))]
        self.log_time();

        HowOk(idxs)
    }

    /// Insert a single vertex, returns its index in user numbering.
    pub fn insert_vertex(&mut self, v: Vertex2) -> HowResult<VertexIdx> {
        self.insert_vertices(&[v])?
            .pop()
            .ok_or_else(|| anyhow::Error::msg("No index for the inserted vertex"))
    }

    /// Insert vertices given as flat coordinates, i.e. `[x0, y0, x1, y1, ...]`.
    pub fn insert_vertices_flat(&mut self, coords: &[f64]) -> HowResult<Vec<VertexIdx>> {
        if coords.len() % 2 != 0 {
            bail!(
                "Expected an even number of coordinates, got {}",
                coords.len()
            );
        }

        let vertices: Vec<Vertex2> = coords.chunks_exact(2).map(|c| [c[0], c[1]]).collect();
        self.insert_vertices(&vertices)
    }

    fn insert_super_triangle(&mut self, vertices: &[Vertex2]) -> HowResult<()> {
        let super_vertices = super_triangle(vertices)?;

        let v_idxs = super_vertices.map(|v| {
            self.vertices.push(v);
            self.vertices.len() - 1
        });
        self.tds.add_vertices(SUPER_VERTICES);
        self.tds.add_super_tri(v_idxs)?;
        self.stage = Stage::Building;

        HowOk(())
    }

    fn is_inside_super_triangle(&self, v: &Vertex2) -> bool {
        is_strictly_inside([0, 1, 2].map(|i| &self.vertices[i]), v)
    }

    /// Append a vertex without inserting it into the mesh yet.
    fn push_vertex(&mut self, v: Vertex2) -> VertexIdx {
        let v_idx = self.vertices.len();
        self.vertices.push(v);
        self.tds.add_vertices(1);
        v_idx
    }

    /// Make a vertex that is part of the mesh known to the duplicate detection.
    fn register_vertex(&mut self, v_idx: VertexIdx) {
        self.vertex_lookup
            .insert(vertex_key(&self.vertices[v_idx]), v_idx);
    }

    /// Insert an already pushed vertex into the mesh and restore the Delaunay property around it.
    fn insert_vertex_helper(&mut self, v_idx: VertexIdx) -> HowResult<()> {
        #[cfg(feature = "timing")]
        let now = std::time::Instant::now();

        let start = self
            .last_inserted
            .map_or(0, |last| self.tds.vertex_tri(last));
        let location = self.locate(&self.vertices[v_idx], start)?;

        #[cfg(feature = "timing")]
        {
            self.time_walking += now.elapsed().as_micros();
        }
        #[cfg(feature = "timing")]
        let now = std::time::Instant::now();

        let tris = match location {
            Location::Inside(tri_idx) => {
                let [t0, t1, t2] = self.tds.flip_1_to_3(tri_idx, v_idx)?;
                vec![t0.idx, t1.idx, t2.idx]
            }
            Location::OnEdge(hedge_idx) => {
                let hedge = self.tds.get_hedge(hedge_idx)?;
                let edge = Edge::new(hedge.starting_node(), hedge.end_node());

                let tris = self.tds.flip_2_to_4(hedge_idx, v_idx)?;
                if self.fixed_edges.contains(&edge) {
                    self.split_fixed_edge(edge, v_idx);
                }
                tris
            }
            Location::OnVertex(existing) => {
                bail!("Vertex {v_idx} coincides with vertex {existing}")
            }
        };

        #[cfg(feature = "timing")]
        {
            self.time_inserting += now.elapsed().as_micros();
        }

        self.restore_delaunay_around(v_idx, &tris)?;
        self.register_vertex(v_idx);
        self.last_inserted = Some(v_idx);

        HowOk(())
    }

    /// The hedge of triangle `tri_idx` that lies opposite of `v_idx`.
    fn hedge_opposite(&self, tri_idx: TriIteratorIdx, v_idx: VertexIdx) -> Option<HedgeIteratorIdx> {
        let tri = self.tds.get_tri(tri_idx).ok()?;
        tri.hedges()
            .into_iter()
            .find(|hedge| hedge.opposite_node() == v_idx)
            .map(|hedge| hedge.idx)
    }

    /// Lawson flips around a freshly inserted vertex, `tris` are the triangles incident to it.
    fn restore_delaunay_around(&mut self, v_idx: VertexIdx, tris: &[TriIteratorIdx]) -> HowResult<()> {
        #[cfg(feature = "timing")]
        let now = std::time::Instant::now();

        let mut hedges_to_verify: Vec<HedgeIteratorIdx> = tris
            .iter()
            .filter_map(|&tri_idx| self.hedge_opposite(tri_idx, v_idx))
            .collect();

        while let Some(hedge_idx) = hedges_to_verify.pop() {
            let hedge = self.tds.get_hedge(hedge_idx)?;
            if hedge.opposite_node() != v_idx {
                continue;
            }
            let Some(twin) = hedge.twin() else {
                continue;
            };

            let p = hedge.starting_node();
            let q = hedge.end_node();
            let o = twin.opposite_node();

            if !self.is_flip_needed(v_idx, p, o, q) {
                continue;
            }

            // the flip turns `pqv` and `qpo` into `vpo` and `oqv`, the edges `po` and `oq` need checking now
            let flipped = self.tds.flip_2_to_2(hedge_idx)?.map(|tri| tri.idx);

            for tri_idx in flipped {
                if let Some(next) = self.hedge_opposite(tri_idx, v_idx) {
                    hedges_to_verify.push(next);
                }
            }
        }

        #[cfg(feature = "timing")]
        {
            self.time_flipping += now.elapsed().as_micros();
        }

        HowOk(())
    }

    /// Flip edges until none of `edges` (and the edges created by flips) violate the constrained Delaunay property.
    fn restore_delaunay_edges(&mut self, edges: Vec<Edge>) -> HowResult<()> {
        let mut edges_to_verify = edges;

        while let Some(edge) = edges_to_verify.pop() {
            if self.fixed_edges.contains(&edge) {
                continue;
            }
            let Some(hedge) = self.tds.find_hedge(edge.v1(), edge.v2()) else {
                continue;
            };
            let Some(twin) = hedge.twin() else {
                continue;
            };

            let hedge_idx = hedge.idx;
            let p = hedge.starting_node();
            let q = hedge.end_node();
            let r = hedge.opposite_node();
            let s = twin.opposite_node();

            if self.is_flip_needed(r, p, s, q) {
                self.tds.flip_2_to_2(hedge_idx)?;
                edges_to_verify.extend([
                    Edge::new(p, s),
                    Edge::new(s, q),
                    Edge::new(q, r),
                    Edge::new(r, p),
                ]);
            }
        }

        HowOk(())
    }

    /// Decide if the edge `v1 -- v3` of the counter-clockwise quad `v, v1, v2, v3` should be flipped to `v -- v2`.
    ///
    /// Fixed edges are never flipped. Super-triangle vertices are treated as infinitely far away,
    /// so the in-circle test is replaced by an orientation test against the line through the two real vertices.
    pub(crate) fn is_flip_needed(
        &self,
        v: VertexIdx,
        v1: VertexIdx,
        v2: VertexIdx,
        v3: VertexIdx,
    ) -> bool {
        if self.fixed_edges.contains(&Edge::new(v1, v3)) {
            return false;
        }

        let [p, p1, p2, p3] = [v, v1, v2, v3].map(|i| &self.vertices[i]);

        if self.stage == Stage::Building {
            let is_super = |i: VertexIdx| i < SUPER_VERTICES;

            // the flip candidate touches the super-triangle
            if is_super(v) {
                if is_super(v1) {
                    return locate_point_line(p1, p2, p3) == locate_point_line(p, p2, p3);
                }
                if is_super(v3) {
                    return locate_point_line(p3, p1, p2) == locate_point_line(p, p1, p2);
                }
                return false;
            }
            if is_super(v2) {
                if is_super(v1) {
                    return locate_point_line(p1, p, p3) == locate_point_line(p2, p, p3);
                }
                if is_super(v3) {
                    return locate_point_line(p3, p1, p) == locate_point_line(p2, p1, p);
                }
                return false;
            }

            // only the current edge touches the super-triangle
            if is_super(v1) {
                return locate_point_line(p1, p2, p3) == locate_point_line(p, p2, p3);
            }
            if is_super(v3) {
                return locate_point_line(p3, p1, p) == locate_point_line(p2, p1, p);
            }
        }

        in_circle(p1, p2, p3, p) > 0.0
    }

    /// `3` while the super-triangle exists, `0` otherwise.
    pub const fn vertex_offset(&self) -> usize {
        match self.stage {
            Stage::Building => SUPER_VERTICES,
            Stage::Empty | Stage::Finalized => 0,
        }
    }

    /// Check if one of the `erase_*` methods was called.
    pub fn is_finalized(&self) -> bool {
        self.stage == Stage::Finalized
    }

    /// Get the triangulation data structure, as reference.
    #[must_use]
    pub const fn tds(&self) -> &TriDataStructure {
        &self.tds
    }

    /// All vertices, including the super-triangle vertices `0, 1, 2` until it is erased.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex2] {
        &self.vertices
    }

    /// The triangle records, with vertex and neighbor indices.
    pub fn triangles(&self) -> Vec<Triangle> {
        self.tds
            .tris()
            .map(|tri| Triangle {
                vertices: tri.nodes(),
                neighbors: tri.neighbors(),
            })
            .collect()
    }

    /// Constraint edges present in the mesh.
    #[must_use]
    pub const fn fixed_edges(&self) -> &HashSet<Edge> {
        &self.fixed_edges
    }

    /// For each vertex one triangle it belongs to, or [`NO_NEIGHBOR`](crate::NO_NEIGHBOR).
    #[must_use]
    pub fn vertices_triangles(&self) -> &[TriIteratorIdx] {
        &self.tds.vertex_tris
    }

    /// For fixed edges that were inserted more than once, the number of extra insertions.
    #[must_use]
    pub const fn overlap_count(&self) -> &HashMap<Edge, usize> {
        &self.overlap_count
    }

    /// For fixed edges that are pieces of longer constraint edges, the original edges.
    #[must_use]
    pub const fn piece_to_originals(&self) -> &HashMap<Edge, Vec<Edge>> {
        &self.piece_to_originals
    }

    pub fn vertices_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangles_count(&self) -> usize {
        self.tds.num_tris()
    }

    pub fn fixed_edges_count(&self) -> usize {
        self.fixed_edges.len()
    }

    #[cfg(all(feature = "logging", feature = "timing"))]
    fn log_time(&self) {
        log::trace!("Walks computed in {} μs", self.time_walking);
        log::trace!("Insertions computed in {} μs", self.time_inserting);
        log::trace!("Flips computed in {} μs", self.time_flipping);
    }
}

impl fmt::Display for Triangulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Triangulation with {} vertices, {} triangles and {} fixed edges",
            self.vertices.len(),
            self.tds.num_tris(),
            self.fixed_edges.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdt_test_utils::{grid_2d, sample_clustered_vertices_2d, sample_vertices_2d};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn as_provided() -> Triangulation {
        Triangulation::new(
            VertexInsertionOrder::AsProvided,
            IntersectingConstraintEdges::Resolve,
            0.0,
        )
    }

    fn verify_triangulation(triangulation: &Triangulation) {
        let sound = triangulation.tds().is_sound();
        assert!(sound);
        assert_eq!(triangulation.verify_topology(), Ok(()));
        assert_eq!(triangulation.par_is_delaunay(), 1.0);
    }

    const NUM_VERTICES_LIST: [usize; 7] = [1, 3, 5, 10, 50, 100, 500];

    #[test]
    fn test_delaunay_2d() {
        init_logger();
        for n in NUM_VERTICES_LIST {
            for order in [VertexInsertionOrder::Randomized, VertexInsertionOrder::AsProvided] {
                let vertices = sample_vertices_2d(n, None);

                let mut triangulation =
                    Triangulation::new(order, IntersectingConstraintEdges::Ignore, 0.0);
                let idxs = triangulation.insert_vertices(&vertices).unwrap();

                assert_eq!(idxs, (0..n).collect::<Vec<_>>());
                assert_eq!(triangulation.vertices_count(), n + SUPER_VERTICES);
                // Euler for a triangulation whose convex hull is the super-triangle
                assert_eq!(triangulation.triangles_count(), 2 * n + 1);
                verify_triangulation(&triangulation);
            }
        }
    }

    #[test]
    fn test_delaunay_2d_clustered() {
        let vertices = sample_clustered_vertices_2d(300, [10.0, -4.0], Some(0.01));

        let mut triangulation = Triangulation::default();
        triangulation.insert_vertices(&vertices).unwrap();

        verify_triangulation(&triangulation);
    }

    #[test]
    fn test_delaunay_2d_grid() {
        // many co-circular and collinear configurations
        let vertices = grid_2d(12, 0.5);

        let mut triangulation = as_provided();
        triangulation.insert_vertices(&vertices).unwrap();

        assert_eq!(triangulation.triangles_count(), 2 * vertices.len() + 1);
        verify_triangulation(&triangulation);
    }

    #[test]
    fn test_reference_counts() {
        let vertices = [[-1.0, 0.0], [0.0, 0.5], [1.0, 0.0], [0.0, -0.5]];

        let mut triangulation = as_provided();
        triangulation.insert_vertices(&vertices).unwrap();

        assert_eq!(triangulation.vertices_count(), 7);
        assert_eq!(triangulation.triangles_count(), 9);
        verify_triangulation(&triangulation);
    }

    #[test]
    fn test_batches() {
        let vertices = sample_vertices_2d(60, None);

        let mut triangulation = as_provided();
        triangulation.insert_vertices(&vertices[..20]).unwrap();
        let idxs = triangulation.insert_vertices(&vertices[20..]).unwrap();

        assert_eq!(idxs, (20..60).collect::<Vec<_>>());
        verify_triangulation(&triangulation);

        let idx = triangulation.insert_vertex([0.0123, -0.0456]).unwrap();
        assert_eq!(idx, 60);
        verify_triangulation(&triangulation);
    }

    #[test]
    fn test_outside_of_super_triangle() {
        let mut triangulation = as_provided();
        triangulation
            .insert_vertices(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]])
            .unwrap();
        let num_tris = triangulation.triangles_count();

        assert!(
            triangulation
                .insert_vertices(&[[0.5, 0.5], [1.0e6, 1.0e6]])
                .is_err()
        );
        // nothing was inserted
        assert_eq!(triangulation.vertices_count(), 6);
        assert_eq!(triangulation.triangles_count(), num_tris);
    }

    #[test]
    fn test_invalid_input() {
        let mut triangulation = as_provided();

        assert!(triangulation.insert_vertices(&[[f64::NAN, 0.0]]).is_err());
        assert!(
            triangulation
                .insert_vertices(&[[0.0, 0.0], [f64::INFINITY, 1.0]])
                .is_err()
        );
        assert!(triangulation.insert_vertices_flat(&[0.0, 1.0, 2.0]).is_err());
        assert_eq!(triangulation.vertices_count(), 0);

        // empty input is a no-op
        assert!(triangulation.insert_vertices(&[]).unwrap().is_empty());
        assert_eq!(triangulation.vertices_count(), 0);
        assert_eq!(triangulation.triangles_count(), 0);
    }

    #[test]
    fn test_huge_coordinates() {
        let mut triangulation = as_provided();
        triangulation.insert_vertices(&[[1e20, 1e20]]).unwrap();
        verify_triangulation(&triangulation);

        // the super-triangle is wide enough for neighbors a few thousand ulps away
        let idxs = triangulation
            .insert_vertices(&[[1e20 + 1e6, 1e20], [1e20, 1e20 + 1e6]])
            .unwrap();
        assert_eq!(idxs, vec![1, 2]);
        verify_triangulation(&triangulation);

        triangulation.erase_super_triangle().unwrap();
        assert_eq!(triangulation.triangles_count(), 1);
        assert_eq!(triangulation.verify_topology(), Ok(()));
    }

    #[test]
    fn test_unenclosable_coordinates() {
        let mut triangulation = as_provided();

        assert!(
            triangulation
                .insert_vertices(&[[f64::MAX, 0.0], [-f64::MAX, 0.0]])
                .is_err()
        );
        assert!(
            triangulation
                .insert_vertices(&[[f64::MAX, f64::MAX]])
                .is_err()
        );

        // nothing was changed, a regular batch still works
        assert_eq!(triangulation.vertices_count(), 0);
        assert_eq!(triangulation.triangles_count(), 0);
        triangulation
            .insert_vertices(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]])
            .unwrap();
        verify_triangulation(&triangulation);
    }

    #[test]
    fn test_stray_vertex_is_not_merged() {
        let mut triangulation = as_provided();
        triangulation
            .insert_vertices(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]])
            .unwrap();

        // what an aborted batch leaves behind: a vertex that never made it into the mesh
        let stray = triangulation.push_vertex([0.25, 0.25]);
        assert_eq!(triangulation.vertices_triangles()[stray], crate::NO_NEIGHBOR);

        let idxs = triangulation
            .insert_vertices(&[[0.25, 0.25], [0.25, 0.25]])
            .unwrap();
        let inserted = stray + 1;
        assert_eq!(idxs, vec![inserted - SUPER_VERTICES; 2]);
        assert_ne!(triangulation.vertices_triangles()[inserted], crate::NO_NEIGHBOR);
        assert_eq!(triangulation.verify_topology(), Ok(()));

        // later duplicates merge into the vertex of the mesh
        assert_eq!(
            triangulation.insert_vertex([0.25, 0.25]).unwrap(),
            inserted - SUPER_VERTICES
        );
    }

    #[test]
    fn test_flat_input() {
        let mut triangulation = as_provided();
        let idxs = triangulation
            .insert_vertices_flat(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0])
            .unwrap();

        assert_eq!(idxs, vec![0, 1, 2]);
        assert_eq!(triangulation.vertices()[4], [1.0, 0.0]);
    }

    #[test]
    fn test_duplicates_are_merged() {
        let vertices = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [-0.0, 0.0]];

        let mut triangulation = as_provided();
        let idxs = triangulation.insert_vertices(&vertices).unwrap();

        assert_eq!(idxs, vec![0, 1, 2, 1, 0]);
        assert_eq!(triangulation.vertices_count(), 6);

        // across batches as well
        let idxs = triangulation.insert_vertices(&[[0.0, 1.0]]).unwrap();
        assert_eq!(idxs, vec![2]);
        assert_eq!(triangulation.vertices_count(), 6);
        verify_triangulation(&triangulation);
    }

    #[test]
    fn test_as_provided_is_deterministic() {
        let vertices = sample_vertices_2d(200, None);

        let mut first = as_provided();
        first.insert_vertices(&vertices).unwrap();
        let mut second = as_provided();
        second.insert_vertices(&vertices).unwrap();

        assert_eq!(first.triangles(), second.triangles());
    }

    #[test]
    fn test_randomized_is_deterministic() {
        let vertices = sample_vertices_2d(200, None);

        let mut first = Triangulation::default();
        first.insert_vertices(&vertices).unwrap();
        let mut second = Triangulation::default();
        second.insert_vertices(&vertices).unwrap();

        assert_eq!(first.triangles(), second.triangles());
    }

    #[test]
    fn test_macro() {
        let vertices = sample_vertices_2d(20, None);

        let triangulation = crate::triangulation!(&vertices);
        assert_eq!(triangulation.vertices_count(), 23);

        let triangulation = crate::triangulation!(&vertices, edges = &[Edge::new(0, 1)]);
        assert!(
            triangulation
                .fixed_edges()
                .contains(&Edge::new(3, 4))
        );

        // errors are discarded, the failing step leaves nothing behind
        let triangulation = crate::triangulation!(&[[f64::NAN, 0.0], [1.0, 0.0]]);
        assert_eq!(triangulation.vertices_count(), 0);

        let triangulation = crate::triangulation!(&vertices, edges = &[Edge::new(0, 20)]);
        assert_eq!(triangulation.vertices_count(), 23);
        assert!(triangulation.fixed_edges().is_empty());
    }

    #[test]
    fn test_display() {
        let mut triangulation = as_provided();
        triangulation
            .insert_vertices(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]])
            .unwrap();

        assert_eq!(
            triangulation.to_string(),
            "Triangulation with 6 vertices, 7 triangles and 0 fixed edges"
        );
    }
}
