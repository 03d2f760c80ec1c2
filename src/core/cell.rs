//! Tetrahedral cells.
//!
//! A cell stores its four vertex keys (positively oriented) and up to four
//! neighbors, one per facet. `neighbors[i]` is the cell sharing the facet
//! opposite `vertices[i]`; `None` marks a convex-hull facet.

use crate::core::collections::FacetIndex;
use crate::core::triangulation_data_structure::{CellKey, VertexKey};
use serde::{Deserialize, Serialize};

/// A tetrahedron of the 3-D triangulation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    vertices: [VertexKey; 4],
    neighbors: [Option<CellKey>; 4],
}

impl Cell {
    /// Creates a cell from four vertex keys with no neighbors wired yet.
    #[must_use]
    pub const fn new(vertices: [VertexKey; 4]) -> Self {
        Self {
            vertices,
            neighbors: [None; 4],
        }
    }

    /// The four vertex keys.
    #[must_use]
    pub const fn vertices(&self) -> [VertexKey; 4] {
        self.vertices
    }

    /// The neighbor across the facet opposite `vertices[i]`.
    #[must_use]
    pub fn neighbor(&self, i: FacetIndex) -> Option<CellKey> {
        self.neighbors[usize::from(i)]
    }

    /// Sets the neighbor across facet `i`.
    pub fn set_neighbor(&mut self, i: FacetIndex, neighbor: Option<CellKey>) {
        self.neighbors[usize::from(i)] = neighbor;
    }

    /// Whether the cell contains the given vertex.
    #[must_use]
    pub fn contains_vertex(&self, v: VertexKey) -> bool {
        self.vertices.contains(&v)
    }

    /// Index of `v` within the cell, if present.
    #[must_use]
    pub fn index_of(&self, v: VertexKey) -> Option<FacetIndex> {
        self.vertices
            .iter()
            .position(|&u| u == v)
            .and_then(|i| FacetIndex::try_from(i).ok())
    }

    /// The three vertices of the facet opposite `vertices[i]`, in cell order.
    #[must_use]
    pub fn facet_vertices(&self, i: FacetIndex) -> [VertexKey; 3] {
        let mut out = [self.vertices[0]; 3];
        let mut j = 0;
        for (k, &v) in self.vertices.iter().enumerate() {
            if k != usize::from(i) {
                out[j] = v;
                j += 1;
            }
        }
        out
    }

    /// The vertex opposite facet `i`.
    #[must_use]
    pub fn opposite_vertex(&self, i: FacetIndex) -> VertexKey {
        self.vertices[usize::from(i)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn keys(n: usize) -> Vec<VertexKey> {
        let mut map: SlotMap<VertexKey, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn facet_vertices_skip_opposite() {
        let k = keys(4);
        let cell = Cell::new([k[0], k[1], k[2], k[3]]);
        assert_eq!(cell.facet_vertices(0), [k[1], k[2], k[3]]);
        assert_eq!(cell.facet_vertices(2), [k[0], k[1], k[3]]);
        assert_eq!(cell.opposite_vertex(2), k[2]);
        assert_eq!(cell.index_of(k[3]), Some(3));
        assert!(cell.contains_vertex(k[1]));
    }

    #[test]
    fn neighbor_wiring() {
        let k = keys(4);
        let mut cell = Cell::new([k[0], k[1], k[2], k[3]]);
        assert_eq!(cell.neighbor(0), None);
        let mut cells: SlotMap<CellKey, ()> = SlotMap::with_key();
        let other = cells.insert(());
        cell.set_neighbor(0, Some(other));
        assert_eq!(cell.neighbor(0), Some(other));
    }
}
