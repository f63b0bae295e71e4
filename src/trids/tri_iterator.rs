use core::fmt;

use crate::utils::types::{NO_NEIGHBOR, TriIteratorIdx, VertexIdx};

use super::{hedge_iterator::HedgeIterator, tri_data_structure::TriDataStructure};

#[derive(Clone, Copy)]
pub struct TriIterator<'a> {
    pub tds: &'a TriDataStructure,
    pub idx: TriIteratorIdx,
}

impl<'a> TriIterator<'a> {
    pub const fn new(tds: &'a TriDataStructure, idx: TriIteratorIdx) -> Self {
        Self { tds, idx }
    }

    /// Returns the index of this.
    pub const fn idx(&self) -> TriIteratorIdx {
        self.idx
    }

    /// Get the hedges of this triangle.
    // s. self.nodes() for a small explanation of the index calculation
    pub const fn hedges(&self) -> [HedgeIterator<'a>; 3] {
        [
            HedgeIterator::new(self.tds, self.idx * 3),
            HedgeIterator::new(self.tds, self.idx * 3 + 1),
            HedgeIterator::new(self.tds, self.idx * 3 + 2),
        ]
    }

    /// Get the nodes of this triangle.
    // Since the hedges and nodes are stored index-wise like this in the tds:
    //
    //  tri0                  tri1
    //    |                     |
    //    v                     v
    // [node0, node1, node2, node3, node4, node5, ... ]
    // [hedge0, hedge1, hedge2, hedge3, hedge4, hedge5, ... ]
    //
    // the indices of the nodes can be retrieved by multiplying the triangle index by 3
    pub fn nodes(&self) -> [VertexIdx; 3] {
        [
            self.tds.hedge_starting_nodes[self.idx * 3],
            self.tds.hedge_starting_nodes[self.idx * 3 + 1],
            self.tds.hedge_starting_nodes[self.idx * 3 + 2],
        ]
    }

    /// The neighboring triangles, `neighbors()[i]` lies opposite of `nodes()[i]`.
    ///
    /// [`NO_NEIGHBOR`] marks a boundary edge.
    pub fn neighbors(&self) -> [TriIteratorIdx; 3] {
        // the edge opposite of node i is the hedge starting at node i + 1
        let [h0, h1, h2] = self.hedges();
        [h1, h2, h0].map(|hedge| hedge.twin().map_or(NO_NEIGHBOR, |twin| twin.tri().idx))
    }

    /// Check if `v_idx` is one of the nodes of this triangle.
    pub fn contains(&self, v_idx: VertexIdx) -> bool {
        self.nodes().contains(&v_idx)
    }

    /// Check if any of the nodes has an index below `bound`, e.g. is a bounding vertex.
    pub fn has_node_below(&self, bound: VertexIdx) -> bool {
        self.nodes().iter().any(|&v| v < bound)
    }
}

impl fmt::Display for TriIterator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [n0, n1, n2] = self.nodes();
        write!(f, "Triangle {}: {} -> {} -> {}", self.idx, n0, n1, n2)
    }
}
