use anyhow::{Ok as HowOk, Result as HowResult, bail};

use super::Triangulation;
use crate::{
    predicates::orient_2d,
    utils::types::{HedgeIteratorIdx, TriIteratorIdx, Vertex2, VertexIdx},
};

/// Where a point lies in the triangulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Strictly inside of a triangle.
    Inside(TriIteratorIdx),
    /// On the interior of the edge of this half-edge.
    OnEdge(HedgeIteratorIdx),
    /// On an existing vertex.
    OnVertex(VertexIdx),
}

impl Triangulation {
    /// Locate the triangle that contains a point by using the visibility walk.
    ///
    /// Which edge is tested first rotates with each step, so the walk cannot get trapped in a cycle of triangles.
    /// If it still does not arrive within a number of steps proportional to the triangle count, all triangles are scanned.
    pub fn locate(&self, v: &Vertex2, tri_idx_start: TriIteratorIdx) -> HowResult<Location> {
        let num_tris = self.tds.num_tris();
        if num_tris == 0 {
            bail!("Cannot locate a point in an empty triangulation");
        }

        let mut tri_idx = tri_idx_start.min(num_tris - 1);
        let max_steps = 2 * num_tris + 3;

        'walk: for step in 0..max_steps {
            let hedges = self.tds.get_tri(tri_idx)?.hedges();

            for k in 0..3 {
                let hedge = hedges[(step + k) % 3];
                let v0 = &self.vertices[hedge.starting_node()];
                let v1 = &self.vertices[hedge.end_node()];

                if orient_2d(v0, v1, v) < 0.0 {
                    match hedge.twin() {
                        Some(twin) => {
                            tri_idx = twin.tri().idx;
                            continue 'walk;
                        }
                        None => bail!("Point {v:?} lies outside of the triangulation"),
                    }
                }
            }

            return self
                .classify(tri_idx, v)?
                .ok_or_else(|| anyhow::Error::msg("Walk stopped outside of a triangle"));
        }

        #[cfg(feature = "logging")]
        log::warn!("Visibility walk for {v:?} did not arrive, scanning all triangles");

        for tri_idx in 0..num_tris {
            if let Some(location) = self.classify(tri_idx, v)? {
                return HowOk(location);
            }
        }

        bail!("Point {v:?} is not contained in any triangle")
    }

    /// The location of `v` relative to a triangle, `None` if it lies outside of it.
    fn classify(&self, tri_idx: TriIteratorIdx, v: &Vertex2) -> HowResult<Option<Location>> {
        let tri = self.tds.get_tri(tri_idx)?;
        let hedges = tri.hedges();
        let orientations = hedges.map(|hedge| {
            orient_2d(
                &self.vertices[hedge.starting_node()],
                &self.vertices[hedge.end_node()],
                v,
            )
        });

        if orientations.iter().any(|&o| o < 0.0) {
            return HowOk(None);
        }

        let on_line: Vec<usize> = (0..3).filter(|&i| orientations[i] == 0.0).collect();

        let location = match *on_line.as_slice() {
            [] => Location::Inside(tri_idx),
            [i] => Location::OnEdge(hedges[i].idx),
            // two consecutive hedges share the end of the first
            [i, j] if j == i + 1 => Location::OnVertex(hedges[j].starting_node()),
            [i, _] => Location::OnVertex(hedges[i].starting_node()),
            _ => bail!("Degenerate {tri}"),
        };

        HowOk(Some(location))
    }
}
