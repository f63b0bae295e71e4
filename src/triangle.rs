use core::fmt;

use crate::{
    edge::Edge,
    utils::types::{NO_NEIGHBOR, TriIteratorIdx, VertexIdx},
};

/// A triangle record as exposed to callers.
///
/// `vertices` are in counter-clockwise order, `neighbors[i]` is the triangle across the edge opposite of `vertices[i]`,
/// i.e. the edge `vertices[i + 1] -- vertices[i + 2]`, or [`NO_NEIGHBOR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triangle {
    pub vertices: [VertexIdx; 3],
    pub neighbors: [TriIteratorIdx; 3],
}

impl Triangle {
    pub fn contains(&self, v_idx: VertexIdx) -> bool {
        self.vertices.contains(&v_idx)
    }

    /// The edge opposite of `vertices[i]`.
    pub const fn edge_opposite(&self, i: usize) -> Edge {
        Edge::new(self.vertices[(i + 1) % 3], self.vertices[(i + 2) % 3])
    }

    /// The three edges, `edges()[i]` lies opposite of `vertices[i]`.
    pub const fn edges(&self) -> [Edge; 3] {
        [
            self.edge_opposite(0),
            self.edge_opposite(1),
            self.edge_opposite(2),
        ]
    }

    /// Index `i` such that `vertices[i] == v_idx`.
    pub fn vertex_slot(&self, v_idx: VertexIdx) -> Option<usize> {
        self.vertices.iter().position(|&v| v == v_idx)
    }

    /// Whether the edge opposite of `vertices[i]` lies on the mesh boundary.
    pub const fn is_boundary(&self, i: usize) -> bool {
        self.neighbors[i] == NO_NEIGHBOR
    }
}

impl fmt::Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.vertices;
        write!(f, "Triangle({a}, {b}, {c})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_edges() {
        let tri = Triangle {
            vertices: [4, 7, 5],
            neighbors: [1, NO_NEIGHBOR, 2],
        };

        assert_eq!(tri.edge_opposite(0), Edge::new(5, 7));
        assert_eq!(tri.edges()[1], Edge::new(4, 5));
        assert_eq!(tri.vertex_slot(5), Some(2));
        assert!(tri.is_boundary(1));
        assert!(!tri.is_boundary(0));
        assert_eq!(tri.to_string(), "Triangle(4, 7, 5)");
    }
}
