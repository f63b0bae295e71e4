use std::collections::{BTreeMap, HashSet};

use anyhow::{Ok as HowOk, Result as HowResult, bail};

use super::{SUPER_VERTICES, Stage, Triangulation};
use crate::{edge::Edge, utils::types::TriIteratorIdx};

/// Depth of triangles that are not reachable from the outside.
const UNREACHED: usize = usize::MAX;

impl Triangulation {
    /// Remove the super-triangle, i.e. all triangles touching one of its vertices and the vertices themselves.
    ///
    /// What remains is the triangulation of the convex hull of the input, vertex indices are shifted down by 3.
    pub fn erase_super_triangle(&mut self) -> HowResult<()> {
        if !self.begin_erase()? {
            return HowOk(());
        }

        let to_remove: Vec<bool> = self
            .tds
            .tris()
            .map(|tri| tri.has_node_below(SUPER_VERTICES))
            .collect();

        self.finalize(&to_remove)
    }

    /// Remove all triangles that can be reached from the super-triangle without crossing a fixed edge,
    /// and the super-triangle vertices.
    pub fn erase_outer_triangles(&mut self) -> HowResult<()> {
        if !self.begin_erase()? {
            return HowOk(());
        }

        let to_remove: Vec<bool> = self
            .triangle_depths()?
            .into_iter()
            .map(|depth| depth == 0)
            .collect();

        self.finalize(&to_remove)
    }

    /// Remove the outer triangles and the holes, i.e. all triangles with an even depth.
    ///
    /// The outside has depth `0`, crossing a fixed edge increases the depth by one, plus its overlap count.
    pub fn erase_outer_triangles_and_holes(&mut self) -> HowResult<()> {
        if !self.begin_erase()? {
            return HowOk(());
        }

        let to_remove: Vec<bool> = self
            .triangle_depths()?
            .into_iter()
            .map(|depth| depth % 2 == 0)
            .collect();

        self.finalize(&to_remove)
    }

    /// Returns `false` if there is nothing to erase.
    fn begin_erase(&mut self) -> HowResult<bool> {
        match self.stage {
            Stage::Finalized => bail!("The triangulation was already finalized"),
            Stage::Empty => {
                self.stage = Stage::Finalized;
                HowOk(false)
            }
            Stage::Building => HowOk(true),
        }
    }

    /// For each triangle the number of fixed edges (with overlaps) that separate it from the super-triangle.
    pub(crate) fn triangle_depths(&self) -> HowResult<Vec<usize>> {
        let mut depths = vec![UNREACHED; self.tds.num_tris()];

        let mut seeds: BTreeMap<usize, Vec<TriIteratorIdx>> = BTreeMap::new();
        seeds.insert(0, vec![self.tds.vertex_tri(0)]);

        // flood fill layer by layer, so each triangle is reached with its smallest depth first
        while let Some((depth, layer)) = seeds.pop_first() {
            let mut to_visit = layer;

            while let Some(tri_idx) = to_visit.pop() {
                if depths[tri_idx] != UNREACHED {
                    continue;
                }
                depths[tri_idx] = depth;

                for hedge in self.tds.get_tri(tri_idx)?.hedges() {
                    let Some(twin) = hedge.twin() else {
                        continue;
                    };
                    let neighbor = twin.tri().idx;
                    if depths[neighbor] != UNREACHED {
                        continue;
                    }

                    let edge = Edge::new(hedge.starting_node(), hedge.end_node());
                    if self.fixed_edges.contains(&edge) {
                        let overlaps = self.overlap_count.get(&edge).copied().unwrap_or(0);
                        seeds
                            .entry(depth + 1 + overlaps)
                            .or_default()
                            .push(neighbor);
                    } else {
                        to_visit.push(neighbor);
                    }
                }
            }
        }

        HowOk(depths)
    }

    /// Remove the flagged triangles and the super-triangle vertices, then shift all vertex indices down.
    ///
    /// Fixed edges that are no longer part of any triangle are dropped.
    fn finalize(&mut self, to_remove: &[bool]) -> HowResult<()> {
        let num_tris = self.tds.num_tris();

        self.tds.remove_tris(|tri| to_remove[tri.idx]);

        let mesh_edges: HashSet<Edge> = self
            .tds
            .tris()
            .flat_map(|tri| tri.hedges())
            .map(|hedge| Edge::new(hedge.starting_node(), hedge.end_node()))
            .collect();
        self.fixed_edges.retain(|edge| mesh_edges.contains(edge));
        self.overlap_count.retain(|edge, _| mesh_edges.contains(edge));
        self.piece_to_originals
            .retain(|edge, _| mesh_edges.contains(edge));

        self.tds.remove_leading_vertices(SUPER_VERTICES)?;
        self.vertices.drain(..SUPER_VERTICES);

        let shift = |edge: Edge| edge.shifted_down(SUPER_VERTICES);

        self.fixed_edges = self.fixed_edges.drain().map(shift).collect();
        self.overlap_count = self
            .overlap_count
            .drain()
            .map(|(edge, overlaps)| (shift(edge), overlaps))
            .collect();
        self.piece_to_originals = self
            .piece_to_originals
            .drain()
            .map(|(edge, originals)| (shift(edge), originals.into_iter().map(shift).collect()))
            .collect();
        self.vertex_lookup = self
            .vertex_lookup
            .drain()
            .filter(|&(_, v_idx)| v_idx >= SUPER_VERTICES)
            .map(|(key, v_idx)| (key, v_idx - SUPER_VERTICES))
            .collect();

        self.last_inserted = None;
        self.stage = Stage::Finalized;

        #[cfg(feature = "logging")]
        log::debug!(
            "Erased {} of {} triangles",
            num_tris - self.tds.num_tris(),
            num_tris
        );
        #[cfg(not(feature = "logging"))]
        let _ = num_tris;

        HowOk(())
    }
}
