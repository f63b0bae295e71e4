//! Consistency checks of a triangulation's public view.
//!
//! Everything here only reads the triangle records, the vertex seeds and the fixed edges, so it can be used on any
//! state of a [`Triangulation`], including in between insertions.

use core::fmt;
use std::collections::{HashMap, HashSet};

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    edge::Edge,
    predicates::{in_circle, orient_2d},
    triangle::Triangle,
    triangulation::Triangulation,
    utils::types::{NO_NEIGHBOR, TriIteratorIdx, VertexIdx},
};

/// The first violation found by [`verify_topology`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    VertexOutOfRange {
        tri: TriIteratorIdx,
        vertex: VertexIdx,
    },
    RepeatedVertex {
        tri: TriIteratorIdx,
    },
    NotCounterClockwise {
        tri: TriIteratorIdx,
    },
    NeighborOutOfRange {
        tri: TriIteratorIdx,
        neighbor: TriIteratorIdx,
    },
    /// `tri` names `neighbor` across an edge, but not the other way around.
    AsymmetricNeighbors {
        tri: TriIteratorIdx,
        neighbor: TriIteratorIdx,
    },
    /// An edge shared by two triangles that do not name each other as neighbors.
    UnlinkedEdge(Edge),
    /// An edge shared by more than two triangles.
    NonManifoldEdge(Edge),
    SeedCountMismatch {
        vertices: usize,
        seeds: usize,
    },
    SeedOutOfRange {
        vertex: VertexIdx,
        tri: TriIteratorIdx,
    },
    /// The seed triangle of `vertex` does not contain it, or the vertex is marked as isolated but is used.
    SeedMissesVertex {
        vertex: VertexIdx,
        tri: TriIteratorIdx,
    },
    MissingFixedEdge(Edge),
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VertexOutOfRange { tri, vertex } => {
                write!(f, "Triangle {tri} references vertex {vertex}, which does not exist")
            }
            Self::RepeatedVertex { tri } => write!(f, "Triangle {tri} repeats a vertex"),
            Self::NotCounterClockwise { tri } => {
                write!(f, "Triangle {tri} is not counter-clockwise")
            }
            Self::NeighborOutOfRange { tri, neighbor } => {
                write!(f, "Triangle {tri} references neighbor {neighbor}, which does not exist")
            }
            Self::AsymmetricNeighbors { tri, neighbor } => write!(
                f,
                "Triangle {tri} has neighbor {neighbor}, which does not have it as neighbor across the same edge"
            ),
            Self::UnlinkedEdge(edge) => write!(f, "{edge} is shared by two unlinked triangles"),
            Self::NonManifoldEdge(edge) => {
                write!(f, "{edge} is shared by more than two triangles")
            }
            Self::SeedCountMismatch { vertices, seeds } => {
                write!(f, "{vertices} vertices but {seeds} vertex seeds")
            }
            Self::SeedOutOfRange { vertex, tri } => {
                write!(f, "Seed {tri} of vertex {vertex} does not exist")
            }
            Self::SeedMissesVertex { vertex, tri } => {
                write!(f, "Seed {tri} of vertex {vertex} does not contain it")
            }
            Self::MissingFixedEdge(edge) => write!(f, "Fixed {edge} is not part of the mesh"),
        }
    }
}

impl std::error::Error for TopologyError {}

/// Check the mesh of a triangulation for consistency.
///
/// Verified are the index ranges, distinct and counter-clockwise vertices per triangle, symmetric adjacency,
/// the vertex seeds and that every fixed edge is an edge of the mesh.
pub fn verify_topology(triangulation: &Triangulation) -> Result<(), TopologyError> {
    let vertices = triangulation.vertices();
    let triangles = triangulation.triangles();

    for (tri_idx, tri) in triangles.iter().enumerate() {
        verify_triangle(tri_idx, tri, vertices.len(), triangles.len())?;

        let [a, b, c] = tri.vertices.map(|v_idx| &vertices[v_idx]);
        if orient_2d(a, b, c) <= 0.0 {
            return Err(TopologyError::NotCounterClockwise { tri: tri_idx });
        }
    }

    let mut edge_tris: HashMap<Edge, Vec<TriIteratorIdx>> = HashMap::new();
    for (tri_idx, tri) in triangles.iter().enumerate() {
        for (i, edge) in tri.edges().into_iter().enumerate() {
            edge_tris.entry(edge).or_default().push(tri_idx);

            let neighbor = tri.neighbors[i];
            if neighbor == NO_NEIGHBOR {
                continue;
            }

            let links_back = triangles[neighbor]
                .edges()
                .iter()
                .zip(triangles[neighbor].neighbors)
                .any(|(&other_edge, other)| other_edge == edge && other == tri_idx);
            if !links_back {
                return Err(TopologyError::AsymmetricNeighbors {
                    tri: tri_idx,
                    neighbor,
                });
            }
        }
    }

    for (&edge, tris) in &edge_tris {
        match tris.as_slice() {
            [_] => {}
            [t0, t1] => {
                let slot = triangles[*t0]
                    .edges()
                    .iter()
                    .position(|&other_edge| other_edge == edge);
                if slot.map(|i| triangles[*t0].neighbors[i]) != Some(*t1) {
                    return Err(TopologyError::UnlinkedEdge(edge));
                }
            }
            _ => return Err(TopologyError::NonManifoldEdge(edge)),
        }
    }

    verify_seeds(triangulation, &triangles)?;

    for &edge in triangulation.fixed_edges() {
        if !edge_tris.contains_key(&edge) {
            return Err(TopologyError::MissingFixedEdge(edge));
        }
    }

    Ok(())
}

fn verify_triangle(
    tri_idx: TriIteratorIdx,
    tri: &Triangle,
    num_vertices: usize,
    num_tris: usize,
) -> Result<(), TopologyError> {
    if let Some(&vertex) = tri.vertices.iter().find(|&&v_idx| v_idx >= num_vertices) {
        return Err(TopologyError::VertexOutOfRange {
            tri: tri_idx,
            vertex,
        });
    }

    let [a, b, c] = tri.vertices;
    if a == b || b == c || c == a {
        return Err(TopologyError::RepeatedVertex { tri: tri_idx });
    }

    if let Some(&neighbor) = tri
        .neighbors
        .iter()
        .find(|&&n| n != NO_NEIGHBOR && n >= num_tris)
    {
        return Err(TopologyError::NeighborOutOfRange {
            tri: tri_idx,
            neighbor,
        });
    }

    Ok(())
}

fn verify_seeds(triangulation: &Triangulation, triangles: &[Triangle]) -> Result<(), TopologyError> {
    let seeds = triangulation.vertices_triangles();
    let num_vertices = triangulation.vertices_count();

    if seeds.len() != num_vertices {
        return Err(TopologyError::SeedCountMismatch {
            vertices: num_vertices,
            seeds: seeds.len(),
        });
    }

    let used: HashSet<VertexIdx> = triangles.iter().flat_map(|tri| tri.vertices).collect();

    for (vertex, &tri) in seeds.iter().enumerate() {
        if tri == NO_NEIGHBOR {
            if used.contains(&vertex) {
                return Err(TopologyError::SeedMissesVertex { vertex, tri });
            }
            continue;
        }

        if tri >= triangles.len() {
            return Err(TopologyError::SeedOutOfRange { vertex, tri });
        }

        if !triangles[tri].contains(vertex) {
            return Err(TopologyError::SeedMissesVertex { vertex, tri });
        }
    }

    Ok(())
}

impl Triangulation {
    /// See [`verify_topology`].
    pub fn verify_topology(&self) -> Result<(), TopologyError> {
        verify_topology(self)
    }

    pub fn is_topology_valid(&self) -> bool {
        match verify_topology(self) {
            Ok(()) => true,
            Err(_err) => {
                #[cfg(feature = "logging")]
                log::error!("{_err}");
                false
            }
        }
    }

    /// Checks the empty circle property of every edge that is not fixed.
    ///
    /// Edges touching a super-triangle vertex and boundary edges are not checked.
    pub fn is_delaunay(&self) -> bool {
        let mut delaunay = true;

        for tri_idx in 0..self.tds().num_tris() {
            if !self.is_tri_delaunay(tri_idx) {
                #[cfg(feature = "logging")]
                if let Ok(tri) = self.tds().get_tri(tri_idx) {
                    log::error!("Not delaunay: {tri}");
                }
                delaunay = false;
            }
        }

        delaunay
    }

    /// Checks the empty circle property in a parallel manner using `rayon`s `par_iter()`.
    ///
    /// Returns the share of triangles without a violating edge, `1.0` for a Delaunay triangulation.
    #[must_use]
    pub fn par_is_delaunay(&self) -> f64 {
        let num_tris = self.tds().num_tris();
        if num_tris == 0 {
            return 1.0;
        }

        let num_violated_tris: f64 = (0..num_tris)
            .into_par_iter()
            .map(|tri_idx| if self.is_tri_delaunay(tri_idx) { 0.0 } else { 1.0 })
            .sum();

        1.0 - num_violated_tris / num_tris as f64
    }

    fn is_tri_delaunay(&self, tri_idx: TriIteratorIdx) -> bool {
        let Ok(tri) = self.tds().get_tri(tri_idx) else {
            return false;
        };
        let offset = self.vertex_offset();
        let vertices = self.vertices();

        tri.hedges().into_iter().all(|hedge| {
            let Some(twin) = hedge.twin() else {
                return true;
            };

            let [p, q, r, s] = [
                hedge.starting_node(),
                hedge.end_node(),
                hedge.opposite_node(),
                twin.opposite_node(),
            ];
            if [p, q, r, s].iter().any(|&v_idx| v_idx < offset)
                || self.fixed_edges().contains(&Edge::new(p, q))
            {
                return true;
            }

            in_circle(&vertices[p], &vertices[q], &vertices[r], &vertices[s]) <= 0.0
        })
    }
}
