use super::{hedge_iterator::HedgeIterator, tri_iterator::TriIterator};
use crate::utils::types::{HedgeIteratorIdx, NO_NEIGHBOR, TriIteratorIdx, VertexIdx};

use anyhow::{Ok as HowOk, Result as HowResult};

/// Twin of a half-edge on the mesh boundary.
pub(crate) const INACTIVE: usize = usize::MAX;

/// A 2D triangulation data structure.
///
/// The edges are stored in a doubly-connected edge list (DCEL) manner.
///
/// ```ignore
/// i   --> hedge0 \
/// |        |       \
/// v        v        |
/// i+1 --> hedge1 ---|-->  triangle
/// |        |        |
/// v        v       /
/// i+2 --> hedge2 /
/// ```
//
// where:
// `hedge1 = next(hedge0)`,
// `hedge2 = next(hedge1)`,
// `hedge0 = next(hedge2)`
//
// Triangle indices are dense: flips overwrite triangles in place and append new ones, only
// `remove_tris` compacts the arrays and thereby renumbers triangles.
#[derive(Debug, Clone, Default)]
pub struct TriDataStructure {
    /// The first node is stored, the last can be obtained via `% 3`
    pub(crate) hedge_starting_nodes: Vec<VertexIdx>,
    /// Opposite half-edge, or [`INACTIVE`] on the boundary.
    pub(crate) hedge_twins: Vec<HedgeIteratorIdx>,
    /// For each vertex one triangle it belongs to, or [`NO_NEIGHBOR`] if it belongs to none.
    pub(crate) vertex_tris: Vec<TriIteratorIdx>,
}

impl TriDataStructure {
    pub const fn new() -> Self {
        Self {
            hedge_starting_nodes: Vec::new(),
            hedge_twins: Vec::new(),
            vertex_tris: Vec::new(),
        }
    }

    /// Register `n` new vertices, which do not belong to any triangle yet.
    pub fn add_vertices(&mut self, n: usize) {
        self.vertex_tris
            .extend(core::iter::repeat_n(NO_NEIGHBOR, n));
    }

    /// Add a triangle to the triangulation and retrieve the hedge indices.
    ///
    /// The twins of the new hedges are [`INACTIVE`] until linked.
    pub fn add_tri(
        &mut self,
        vertex_nodes: [VertexIdx; 3],
    ) -> (HedgeIteratorIdx, HedgeIteratorIdx, HedgeIteratorIdx) {
        let hedge_idx0 = self.hedge_starting_nodes.len();
        let tri_idx = hedge_idx0 / 3;

        self.hedge_starting_nodes.extend_from_slice(&vertex_nodes);
        self.hedge_twins.extend_from_slice(&[INACTIVE; 3]);

        for v in vertex_nodes {
            self.vertex_tris[v] = tri_idx;
        }

        (hedge_idx0, hedge_idx0 + 1, hedge_idx0 + 2)
    }

    /// Replace a triangle in the triangulation and retrieve the hedge indices.
    ///
    /// The twins of the replaced hedges are reset to [`INACTIVE`].
    pub fn replace_tri(
        &mut self,
        idx_to_replace: TriIteratorIdx,
        v0: VertexIdx,
        v1: VertexIdx,
        v2: VertexIdx,
    ) -> (HedgeIteratorIdx, HedgeIteratorIdx, HedgeIteratorIdx) {
        let idx0 = idx_to_replace * 3;

        self.hedge_starting_nodes[idx0] = v0;
        self.hedge_starting_nodes[idx0 + 1] = v1;
        self.hedge_starting_nodes[idx0 + 2] = v2;

        self.hedge_twins[idx0] = INACTIVE;
        self.hedge_twins[idx0 + 1] = INACTIVE;
        self.hedge_twins[idx0 + 2] = INACTIVE;

        self.vertex_tris[v0] = idx_to_replace;
        self.vertex_tris[v1] = idx_to_replace;
        self.vertex_tris[v2] = idx_to_replace;

        (idx0, idx0 + 1, idx0 + 2)
    }

    /// Make `h0` and `h1` twins of each other, either may be [`INACTIVE`].
    fn link(&mut self, h0: HedgeIteratorIdx, h1: HedgeIteratorIdx) {
        if h0 != INACTIVE {
            self.hedge_twins[h0] = h1;
        }
        if h1 != INACTIVE {
            self.hedge_twins[h1] = h0;
        }
    }

    /// Insert the bounding triangle, all its edges are boundary edges.
    pub fn add_super_tri(&mut self, v_idxs: [VertexIdx; 3]) -> HowResult<TriIterator<'_>> {
        if self.num_tris() > 0 {
            return Err(anyhow::Error::msg(
                "Triangulation already contains triangles!",
            ));
        }
        if v_idxs.iter().any(|&v| v >= self.vertex_tris.len()) {
            return Err(anyhow::Error::msg("Vertex index out of bounds!"));
        }

        self.add_tri(v_idxs);

        HowOk(TriIterator::new(self, 0))
    }

    /// Insert a vertex `d` into an existing triangle `abc`; called the `1 -> 3 flip`, as it deletes the triangle and creates three new ones.
    pub fn flip_1_to_3(
        &mut self,
        idx_to_remove: TriIteratorIdx,
        v_idx: VertexIdx,
    ) -> HowResult<[TriIterator<'_>; 3]> {
        if idx_to_remove >= self.num_tris() {
            return Err(anyhow::Error::msg("Triangle index out of bounds!"));
        }
        if v_idx >= self.vertex_tris.len() {
            return Err(anyhow::Error::msg("Vertex index out of bounds!"));
        }

        let hedge_ab = idx_to_remove * 3;
        let hedge_bc = hedge_ab + 1;
        let hedge_ca = hedge_ab + 2;

        let a = self.hedge_starting_nodes[hedge_ab];
        let b = self.hedge_starting_nodes[hedge_bc];
        let c = self.hedge_starting_nodes[hedge_ca];

        let d = v_idx;

        let hedge_ba = self.hedge_twins[hedge_ab];
        let hedge_cb = self.hedge_twins[hedge_bc];
        let hedge_ac = self.hedge_twins[hedge_ca];

        let (hedge_ab, hedge_bd, hedge_da) = self.replace_tri(idx_to_remove, a, b, d);
        let (hedge_bc, hedge_cd, hedge_db) = self.add_tri([b, c, d]);
        let (hedge_ca, hedge_ad, hedge_dc) = self.add_tri([c, a, d]);

        self.link(hedge_ab, hedge_ba);
        self.link(hedge_bc, hedge_cb);
        self.link(hedge_ca, hedge_ac);
        self.link(hedge_bd, hedge_db);
        self.link(hedge_cd, hedge_dc);
        self.link(hedge_da, hedge_ad);

        HowOk([
            TriIterator::new(self, idx_to_remove),
            TriIterator::new(self, self.num_tris() - 2),
            TriIterator::new(self, self.num_tris() - 1),
        ])
    }

    /// Insert a vertex `v` lying on the edge `ab` of hedge `idx`; called the `2 -> 4 flip`.
    ///
    /// The triangles `abc` and `bad` become `avc`, `vbc`, `bvd` and `vad`.
    /// If `ab` is a boundary edge only `abc` exists and is split into two (`1 -> 2`).
    ///
    /// Returns the indices of the triangles incident to `v`.
    pub fn flip_2_to_4(
        &mut self,
        idx: HedgeIteratorIdx,
        v_idx: VertexIdx,
    ) -> HowResult<Vec<TriIteratorIdx>> {
        if idx >= self.hedge_starting_nodes.len() {
            return Err(anyhow::Error::msg("Hedge index out of bounds!"));
        }
        if v_idx >= self.vertex_tris.len() {
            return Err(anyhow::Error::msg("Vertex index out of bounds!"));
        }

        let v = v_idx;

        let (a, b, c, hedge_bc_old, hedge_ca_old) = {
            let hedge = self.get_hedge(idx)?;
            (
                hedge.starting_node(),
                hedge.end_node(),
                hedge.opposite_node(),
                hedge.next().idx,
                hedge.prev().idx,
            )
        };
        let ext_bc = self.hedge_twins[hedge_bc_old];
        let ext_ca = self.hedge_twins[hedge_ca_old];

        let hedge_twin_idx = self.hedge_twins[idx];
        let tri1_idx = idx / 3;

        // the triangle on the other side, if any
        let other = if hedge_twin_idx == INACTIVE {
            None
        } else {
            let twin = self.get_hedge(hedge_twin_idx)?;
            let d = twin.opposite_node();
            let ext_ad = self.hedge_twins[twin.next().idx];
            let ext_db = self.hedge_twins[twin.prev().idx];
            Some((hedge_twin_idx / 3, d, ext_ad, ext_db))
        };

        let (hedge_av, hedge_vc, hedge_ca) = self.replace_tri(tri1_idx, a, v, c);
        let (hedge_vb, hedge_bc, hedge_cv) = self.add_tri([v, b, c]);
        let tri3_idx = self.num_tris() - 1;

        self.link(hedge_vc, hedge_cv);
        self.link(hedge_ca, ext_ca);
        self.link(hedge_bc, ext_bc);

        let mut tris = vec![tri1_idx, tri3_idx];

        if let Some((tri2_idx, d, ext_ad, ext_db)) = other {
            let (hedge_bv, hedge_vd, hedge_db) = self.replace_tri(tri2_idx, b, v, d);
            let (hedge_va, hedge_ad, hedge_dv) = self.add_tri([v, a, d]);
            let tri4_idx = self.num_tris() - 1;

            self.link(hedge_av, hedge_va);
            self.link(hedge_vb, hedge_bv);
            self.link(hedge_vd, hedge_dv);
            self.link(hedge_db, ext_db);
            self.link(hedge_ad, ext_ad);

            tris.push(tri2_idx);
            tris.push(tri4_idx);
        }

        HowOk(tris)
    }

    /// Flips an edge that internally connects two triangles to an edge that connects the other two triangles.
    ///
    /// With the hedge `ca` of the triangle `abc` and its twin in `cda`, the result is `bcd` and `dab`.
    pub fn flip_2_to_2(&mut self, idx: HedgeIteratorIdx) -> HowResult<[TriIterator<'_>; 2]> {
        if idx >= self.hedge_starting_nodes.len() {
            return Err(anyhow::Error::msg("Hedge index out of bounds!"));
        }

        let hedge_twin_idx = self.hedge_twins[idx];
        if hedge_twin_idx == INACTIVE {
            return Err(anyhow::Error::msg("Cannot flip a boundary edge!"));
        }

        let tri1_idx = idx / 3;
        let tri2_idx = hedge_twin_idx / 3;

        let hedge01 = tri1_idx * 3;
        let hedge12 = hedge01 + 1;
        let hedge20 = hedge01 + 2;

        let hedge01_twin = tri2_idx * 3;
        let hedge12_twin = hedge01_twin + 1;
        let hedge20_twin = hedge01_twin + 2;

        // get the correct flip depending on the structure of the triangles
        let (hedge_ab, hedge_bc) = if hedge01 == idx {
            (hedge12, hedge20)
        } else if hedge12 == idx {
            (hedge20, hedge01)
        } else {
            (hedge01, hedge12)
        };

        let (hedge_cd, hedge_da) = if hedge01_twin == hedge_twin_idx {
            (hedge12_twin, hedge20_twin)
        } else if hedge12_twin == hedge_twin_idx {
            (hedge20_twin, hedge01_twin)
        } else {
            (hedge01_twin, hedge12_twin)
        };

        let na = self.hedge_starting_nodes[hedge_ab];
        let nb = self.hedge_starting_nodes[hedge_bc];
        let nc = self.hedge_starting_nodes[hedge_cd];
        let nd = self.hedge_starting_nodes[hedge_da];

        let hedge_ba = self.hedge_twins[hedge_ab];
        let hedge_cb = self.hedge_twins[hedge_bc];
        let hedge_dc = self.hedge_twins[hedge_cd];
        let hedge_ad = self.hedge_twins[hedge_da];

        let (hedge_bc, hedge_cd, hedge_db) = self.replace_tri(tri1_idx, nb, nc, nd);
        let (hedge_da, hedge_ab, hedge_bd) = self.replace_tri(tri2_idx, nd, na, nb);

        self.link(hedge_ab, hedge_ba);
        self.link(hedge_da, hedge_ad);
        self.link(hedge_bc, hedge_cb);
        self.link(hedge_cd, hedge_dc);
        self.link(hedge_bd, hedge_db);

        HowOk([
            TriIterator::new(self, tri1_idx),
            TriIterator::new(self, tri2_idx),
        ])
    }

    /// Remove all triangles for which `to_remove` returns `true`.
    ///
    /// Remaining triangles keep their relative order, twins pointing into removed triangles become boundary hedges,
    /// and the vertex to triangle map is rebuilt.
    pub fn remove_tris<F>(&mut self, to_remove: F)
    where
        F: Fn(TriIterator<'_>) -> bool,
    {
        let keep: Vec<bool> = self.tris().map(|tri| !to_remove(tri)).collect();

        let mut new_idxs = vec![NO_NEIGHBOR; keep.len()];
        let mut num_kept = 0;
        for (tri_idx, &k) in keep.iter().enumerate() {
            if k {
                new_idxs[tri_idx] = num_kept;
                num_kept += 1;
            }
        }

        let mut starting_nodes = Vec::with_capacity(num_kept * 3);
        let mut twins = Vec::with_capacity(num_kept * 3);

        for (tri_idx, &k) in keep.iter().enumerate() {
            if !k {
                continue;
            }
            for hedge_idx in tri_idx * 3..tri_idx * 3 + 3 {
                starting_nodes.push(self.hedge_starting_nodes[hedge_idx]);

                let twin = self.hedge_twins[hedge_idx];
                let new_twin = if twin == INACTIVE || new_idxs[twin / 3] == NO_NEIGHBOR {
                    INACTIVE
                } else {
                    new_idxs[twin / 3] * 3 + twin % 3
                };
                twins.push(new_twin);
            }
        }

        self.hedge_starting_nodes = starting_nodes;
        self.hedge_twins = twins;
        self.rebuild_vertex_tris();
    }

    /// Drop the first `offset` vertices, all other vertex indices are shifted down.
    ///
    /// Fails if a triangle still references one of the dropped vertices.
    pub fn remove_leading_vertices(&mut self, offset: usize) -> HowResult<()> {
        if self.hedge_starting_nodes.iter().any(|&v| v < offset) {
            return Err(anyhow::Error::msg(
                "Cannot remove vertices that are still part of a triangle!",
            ));
        }

        for v in &mut self.hedge_starting_nodes {
            *v -= offset;
        }
        self.vertex_tris.drain(..offset.min(self.vertex_tris.len()));

        HowOk(())
    }

    /// Recompute for each vertex one incident triangle.
    pub fn rebuild_vertex_tris(&mut self) {
        self.vertex_tris.fill(NO_NEIGHBOR);
        for (hedge_idx, &v) in self.hedge_starting_nodes.iter().enumerate() {
            if self.vertex_tris[v] == NO_NEIGHBOR {
                self.vertex_tris[v] = hedge_idx / 3;
            }
        }
    }

    /// Retrieve a half-edge iterator by index.
    pub fn get_hedge(&self, idx: HedgeIteratorIdx) -> HowResult<HedgeIterator<'_>> {
        if idx >= self.hedge_starting_nodes.len() {
            return Err(anyhow::Error::msg("Hedge index out of bounds"));
        }

        HowOk(HedgeIterator::new(self, idx))
    }

    /// Retrieve a tri iterator by index.
    pub fn get_tri(&self, idx: TriIteratorIdx) -> HowResult<TriIterator<'_>> {
        if idx >= self.num_tris() {
            return Err(anyhow::Error::msg("Tri index out of bounds!"));
        }

        HowOk(TriIterator::new(self, idx))
    }

    /// Iterate over all triangles.
    pub fn tris(&self) -> impl Iterator<Item = TriIterator<'_>> {
        (0..self.num_tris()).map(|idx| TriIterator::new(self, idx))
    }

    /// Get the number of triangles in the triangulation.
    pub fn num_tris(&self) -> usize {
        self.hedge_starting_nodes.len() / 3
    }

    /// Get the number of vertices known to the data structure.
    pub fn num_vertices(&self) -> usize {
        self.vertex_tris.len()
    }

    /// The triangle seed of a vertex, [`NO_NEIGHBOR`] if the vertex is not part of any triangle.
    pub fn vertex_tri(&self, v_idx: VertexIdx) -> TriIteratorIdx {
        self.vertex_tris.get(v_idx).copied().unwrap_or(NO_NEIGHBOR)
    }

    /// All half-edges starting at `v_idx`, in rotational order.
    pub fn hedges_around(&self, v_idx: VertexIdx) -> Vec<HedgeIteratorIdx> {
        let tri_idx = self.vertex_tri(v_idx);
        if tri_idx == NO_NEIGHBOR || tri_idx >= self.num_tris() {
            return Vec::new();
        }

        let Some(start) = (tri_idx * 3..tri_idx * 3 + 3)
            .find(|&hedge_idx| self.hedge_starting_nodes[hedge_idx] == v_idx)
        else {
            return Vec::new();
        };

        let max_steps = self.hedge_starting_nodes.len();
        let mut hedges = vec![start];

        // rotate one way, i.e. via `twin(prev(hedge))` until we are back or reach the boundary
        let mut hedge = HedgeIterator::new(self, start);
        let mut hit_boundary = false;
        for _ in 0..max_steps {
            match hedge.prev().twin() {
                Some(next) if next.idx == start => break,
                Some(next) => {
                    hedges.push(next.idx);
                    hedge = next;
                }
                None => {
                    hit_boundary = true;
                    break;
                }
            }
        }

        // on the boundary, also rotate the other way, i.e. via `next(twin(hedge))`
        if hit_boundary {
            let mut hedge = HedgeIterator::new(self, start);
            for _ in 0..max_steps {
                match hedge.twin() {
                    Some(twin) => {
                        hedge = twin.next();
                        hedges.push(hedge.idx);
                    }
                    None => break,
                }
            }
        }

        hedges
    }

    /// Find the half-edge going from `from` to `to`, if the edge exists.
    pub fn find_hedge(&self, from: VertexIdx, to: VertexIdx) -> Option<HedgeIterator<'_>> {
        self.hedges_around(from)
            .into_iter()
            .map(|hedge_idx| HedgeIterator::new(self, hedge_idx))
            .find(|hedge| hedge.end_node() == to)
    }

    /// Check if the data structure is sound, i.e. hedges point to correct next, previous and twin nodes.
    pub fn is_sound(&self) -> bool {
        let mut sound = true;

        for hedge_idx in 0..self.hedge_starting_nodes.len() {
            let hedge = HedgeIterator::new(self, hedge_idx);
            sound = sound && hedge.is_sound();
        }

        for (v_idx, &tri_idx) in self.vertex_tris.iter().enumerate() {
            if tri_idx != NO_NEIGHBOR {
                sound = sound
                    && tri_idx < self.num_tris()
                    && TriIterator::new(self, tri_idx).contains(v_idx);
            }
        }

        sound
    }
}
