use core::fmt;
#[cfg(feature = "logging")]
use log::error;

use super::{
    tri_data_structure::{INACTIVE, TriDataStructure},
    tri_iterator::TriIterator,
};
use crate::utils::types::{HedgeIteratorIdx, VertexIdx};

/// An iterator over the half-edges of a triangulation data structure.
#[derive(Clone, Copy)]
pub struct HedgeIterator<'a> {
    pub tds: &'a TriDataStructure,
    /// The hedge idx of this iterator
    pub idx: HedgeIteratorIdx,
}

impl<'a> HedgeIterator<'a> {
    pub const fn new(tds: &'a TriDataStructure, idx: HedgeIteratorIdx) -> Self {
        Self { tds, idx }
    }

    /// Retrieve the node this hedge originates from.
    pub fn starting_node(&self) -> VertexIdx {
        self.tds.hedge_starting_nodes[self.idx]
    }

    /// Retrieve the node this hedge ends at.
    pub fn end_node(&self) -> VertexIdx {
        self.next().starting_node()
    }

    /// The node of the triangle that is not on this hedge.
    pub fn opposite_node(&self) -> VertexIdx {
        self.prev().starting_node()
    }

    /// Check if the hedge is sound, i.e. `next`, `prev` and `twin` are pointing to correct nodes.
    pub fn is_sound(&self) -> bool {
        let mut sound = true;

        let starting_node = self.starting_node();
        let end_node = self.end_node();

        #[allow(unused)]
        let mut check = |condition: bool, error_msg: &str| {
            if !condition {
                #[cfg(feature = "logging")]
                error!("{self}: {error_msg}");
                sound = false;
            }
        };

        check(self.next().starting_node() == end_node, "Wrong next hedge");
        check(self.prev().end_node() == starting_node, "Wrong prev hedge");
        check(starting_node != end_node, "Degenerate hedge");

        let twin_idx = self.tds.hedge_twins[self.idx];
        if twin_idx != INACTIVE {
            let in_bounds = twin_idx < self.tds.hedge_twins.len();
            check(in_bounds, "Twin out of bounds");
            if in_bounds {
                let twin = Self::new(self.tds, twin_idx);
                check(
                    twin.starting_node() == end_node && twin.end_node() == starting_node,
                    "Wrong twin hedge",
                );
                check(
                    self.tds.hedge_twins[twin_idx] == self.idx,
                    "Twin is not symmetric",
                );
            }
        }

        sound
    }

    /// Retrieve the `next` half-edge belonging to the same triangle.
    pub const fn next(&self) -> HedgeIterator<'a> {
        if self.idx % 3 == 2 {
            Self::new(self.tds, self.idx - 2)
        } else {
            Self::new(self.tds, self.idx + 1)
        }
    }

    /// Retrieve the `previous` half-edge belonging to the same triangle.
    pub const fn prev(&self) -> HedgeIterator<'a> {
        if self.idx % 3 == 0 {
            Self::new(self.tds, self.idx + 2)
        } else {
            Self::new(self.tds, self.idx - 1)
        }
    }

    /// Retrieve the `twin` (aka opposite) half-edge, belonging to the neighboring triangle.
    ///
    /// This is the hedge that goes in the opposite direction,
    /// i.e. `self.starting_node() == self.twin().end_node()` and the other way around.
    ///
    /// `None` if this hedge is on the boundary.
    pub fn twin(&self) -> Option<HedgeIterator<'a>> {
        match self.tds.hedge_twins[self.idx] {
            INACTIVE => None,
            twin_idx => Some(Self::new(self.tds, twin_idx)),
        }
    }

    /// Retrieve the triangle this half-edge belongs to.
    pub const fn tri(&self) -> TriIterator<'a> {
        TriIterator::new(self.tds, self.idx / 3)
    }
}

impl fmt::Display for HedgeIterator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hedge {}: {} -> {}",
            self.idx,
            self.starting_node(),
            self.end_node()
        )
    }
}
