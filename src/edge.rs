use core::fmt;

use crate::utils::types::VertexIdx;

/// An undirected edge between two vertices.
///
/// The vertex indices are stored ordered, i.e. `v1() <= v2()`, so that `Edge::new(a, b) == Edge::new(b, a)`.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Debug)]
pub struct Edge([VertexIdx; 2]);

impl Edge {
    pub const fn new(a: VertexIdx, b: VertexIdx) -> Self {
        if a <= b { Self([a, b]) } else { Self([b, a]) }
    }

    /// The smaller vertex index.
    pub const fn v1(&self) -> VertexIdx {
        self.0[0]
    }

    /// The larger vertex index.
    pub const fn v2(&self) -> VertexIdx {
        self.0[1]
    }

    pub const fn vertices(&self) -> [VertexIdx; 2] {
        self.0
    }

    /// Check if the edge has `v_idx` as one of its end points.
    pub const fn contains(&self, v_idx: VertexIdx) -> bool {
        self.0[0] == v_idx || self.0[1] == v_idx
    }

    /// Returns a zero-length edge as `true`, e.g. `Edge::new(3, 3)`.
    pub const fn is_degenerate(&self) -> bool {
        self.0[0] == self.0[1]
    }

    /// Shift both vertex indices down by `offset`.
    pub(crate) const fn shifted_down(&self, offset: usize) -> Self {
        Self([self.0[0] - offset, self.0[1] - offset])
    }

    /// Shift both vertex indices up by `offset`.
    pub(crate) const fn shifted_up(&self, offset: usize) -> Self {
        Self([self.0[0] + offset, self.0[1] + offset])
    }
}

impl From<[VertexIdx; 2]> for Edge {
    fn from(value: [VertexIdx; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<(VertexIdx, VertexIdx)> for Edge {
    fn from(value: (VertexIdx, VertexIdx)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({}, {})", self.0[0], self.0[1])
    }
}
