//! # CDT
//!
//! An implementation of 2D constrained delaunay triangulation via incremental algorithms.
//!
//! Vertices are inserted one by one into a super-triangle and the delaunay property is restored by edge flips.
//! Constraint edges are then either enforced by flipping away the edges they cross ([`Triangulation::insert_edges`])
//! or by splitting them at inserted midpoints ([`Triangulation::conform_to_edges`]).
//! Finally, one of the `erase_*` methods removes the super-triangle and, optionally, the outside and the holes.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::missing_const_for_fn)]

pub use edge::Edge;
pub use topology::{TopologyError, verify_topology};
pub use triangle::Triangle;
pub use triangulation::{IntersectingConstraintEdges, Location, Triangulation, VertexInsertionOrder};
pub use utils::types::{HedgeIteratorIdx, NO_NEIGHBOR, NO_VERTEX, TriIteratorIdx, Vertex2, VertexIdx};

pub mod edge;
pub mod predicates;
pub mod topology;
pub mod triangle;
pub mod triangulation;
pub mod trids;
mod utils;
