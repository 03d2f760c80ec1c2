//! Slotmap-backed storage for the 3-D triangulation.
//!
//! The [`Tds`] owns vertices and tetrahedral cells and answers the incidence
//! queries the reconstruction layer consumes: cells incident to a vertex,
//! cells containing an edge or a facet, deduplicated facet iteration, and
//! mirror-facet lookups. It performs no geometry itself; the Bowyer-Watson
//! algorithm in [`crate::core::algorithms::bowyer_watson`] drives all
//! structural mutation.
//!
//! # Key stability
//!
//! Vertex keys are stable for the lifetime of the vertex, across any number
//! of re-triangulations. Cell keys are recycled on every topology change and
//! must never be stored across mutations; persistent per-facet state belongs
//! in [`FacetKey`](crate::core::facet::FacetKey)-keyed side tables.

use crate::core::cell::Cell;
use crate::core::collections::FacetIndex;
use crate::core::vertex::Vertex;
use crate::geometry::point::{CoordinateValidationError, Point};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use thiserror::Error;

new_key_type! {
    /// Stable handle of a triangulation vertex.
    pub struct VertexKey;
}

new_key_type! {
    /// Handle of a tetrahedral cell. Recycled on re-triangulation.
    pub struct CellKey;
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised while constructing or mutating the triangulation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TriangulationConstructionError {
    /// Fewer than four input points.
    #[error("a 3-D triangulation needs at least 4 vertices, got {actual}")]
    InsufficientVertices {
        /// Number of points supplied.
        actual: usize,
    },
    /// All input points are coplanar (or worse) within tolerance.
    #[error("input points are degenerate: no non-coplanar quadruple found")]
    DegenerateInput,
    /// Two input points have bit-identical coordinates.
    #[error("duplicate coordinates at {point}")]
    DuplicateCoordinates {
        /// The duplicated position.
        point: Point,
    },
    /// An input point has NaN or infinite coordinates.
    #[error("invalid coordinate: {source}")]
    InvalidCoordinates {
        /// The underlying validation error.
        #[from]
        source: CoordinateValidationError,
    },
    /// A point could not be connected to the triangulation.
    #[error("insertion failed for {point}: no conflict region and no visible hull facet")]
    InsertionFailed {
        /// The point that could not be inserted.
        point: Point,
    },
    /// A vertex removal would leave fewer than four vertices.
    #[error("cannot remove vertex: only {remaining} vertices would remain")]
    TooFewVerticesForRemoval {
        /// Vertices that would remain.
        remaining: usize,
    },
}

// =============================================================================
// STORAGE
// =============================================================================

/// The triangulation data structure: vertex and cell storage plus incidence
/// queries.
#[derive(Clone, Debug, Default)]
pub struct Tds {
    vertices: SlotMap<VertexKey, Vertex>,
    cells: SlotMap<CellKey, Cell>,
}

impl Tds {
    /// An empty data structure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of cells.
    #[must_use]
    pub fn number_of_cells(&self) -> usize {
        self.cells.len()
    }

    /// Inserts a vertex into storage (no connectivity update).
    pub fn insert_vertex(&mut self, point: Point) -> VertexKey {
        self.vertices.insert(Vertex::new(point))
    }

    /// Removes a vertex from storage (no connectivity update).
    pub fn remove_vertex_storage(&mut self, v: VertexKey) -> Option<Vertex> {
        self.vertices.remove(v)
    }

    /// The position of vertex `v`.
    ///
    /// # Panics
    ///
    /// Panics if `v` is not a live vertex key.
    #[must_use]
    pub fn point(&self, v: VertexKey) -> &Point {
        self.vertices[v].point()
    }

    /// The vertex record for `v`, if live.
    #[must_use]
    pub fn vertex(&self, v: VertexKey) -> Option<&Vertex> {
        self.vertices.get(v)
    }

    /// Iterates over `(key, vertex)` pairs.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexKey, &Vertex)> {
        self.vertices.iter()
    }

    /// Iterates over `(key, cell)` pairs.
    pub fn cells(&self) -> impl Iterator<Item = (CellKey, &Cell)> {
        self.cells.iter()
    }

    /// The cell record for `c`, if live.
    #[must_use]
    pub fn cell(&self, c: CellKey) -> Option<&Cell> {
        self.cells.get(c)
    }

    /// Mutable cell access for the construction algorithm.
    pub(crate) fn cell_mut(&mut self, c: CellKey) -> Option<&mut Cell> {
        self.cells.get_mut(c)
    }

    /// Inserts a cell.
    pub(crate) fn insert_cell(&mut self, cell: Cell) -> CellKey {
        self.cells.insert(cell)
    }

    /// Removes a cell.
    pub(crate) fn remove_cell(&mut self, c: CellKey) -> Option<Cell> {
        self.cells.remove(c)
    }

    /// Drops all cells, keeping vertices (used before re-triangulation).
    pub(crate) fn clear_cells(&mut self) {
        self.cells.clear();
    }

    // =========================================================================
    // INCIDENCE QUERIES
    // =========================================================================

    /// All cells containing vertex `v`.
    #[must_use]
    pub fn cells_with_vertex(&self, v: VertexKey) -> Vec<CellKey> {
        self.cells
            .iter()
            .filter_map(|(ck, cell)| cell.contains_vertex(v).then_some(ck))
            .collect()
    }

    /// All cells containing the edge `{u, v}`.
    #[must_use]
    pub fn cells_with_edge(&self, u: VertexKey, v: VertexKey) -> Vec<CellKey> {
        self.cells
            .iter()
            .filter_map(|(ck, cell)| {
                (cell.contains_vertex(u) && cell.contains_vertex(v)).then_some(ck)
            })
            .collect()
    }

    /// The (at most two) cells containing the facet `{a, b, c}`.
    #[must_use]
    pub fn cells_with_facet(&self, a: VertexKey, b: VertexKey, c: VertexKey) -> SmallVec<[CellKey; 2]> {
        self.cells
            .iter()
            .filter_map(|(ck, cell)| {
                (cell.contains_vertex(a) && cell.contains_vertex(b) && cell.contains_vertex(c))
                    .then_some(ck)
            })
            .collect()
    }

    /// Opposite vertices of the facet `{a, b, c}`: the fourth vertex of each
    /// incident cell.
    #[must_use]
    pub fn facet_opposite_vertices(
        &self,
        a: VertexKey,
        b: VertexKey,
        c: VertexKey,
    ) -> SmallVec<[VertexKey; 2]> {
        self.cells_with_facet(a, b, c)
            .into_iter()
            .filter_map(|ck| {
                let cell = &self.cells[ck];
                cell.vertices()
                    .into_iter()
                    .find(|&w| w != a && w != b && w != c)
            })
            .collect()
    }

    /// Third vertices of all facets containing the edge `{u, v}` (the facet
    /// rotation around the edge, order unspecified).
    #[must_use]
    pub fn facet_apexes_around_edge(&self, u: VertexKey, v: VertexKey) -> SmallVec<[VertexKey; 8]> {
        let mut apexes: SmallVec<[VertexKey; 8]> = SmallVec::new();
        for ck in self.cells_with_edge(u, v) {
            for w in self.cells[ck].vertices() {
                if w != u && w != v && !apexes.contains(&w) {
                    apexes.push(w);
                }
            }
        }
        apexes
    }

    /// Whether `{a, b, c}` is a facet of the current triangulation.
    #[must_use]
    pub fn facet_exists(&self, a: VertexKey, b: VertexKey, c: VertexKey) -> bool {
        !self.cells_with_facet(a, b, c).is_empty()
    }

    /// Whether some cell contains all four vertices.
    #[must_use]
    pub fn cell_exists(&self, a: VertexKey, b: VertexKey, c: VertexKey, d: VertexKey) -> bool {
        self.cells.iter().any(|(_, cell)| {
            cell.contains_vertex(a)
                && cell.contains_vertex(b)
                && cell.contains_vertex(c)
                && cell.contains_vertex(d)
        })
    }

    /// Iterates over every facet exactly once as `(cell, index, vertices)`.
    ///
    /// Interior facets are reported from the incident cell with the smaller
    /// key; hull facets from their unique cell.
    pub fn facets(&self) -> impl Iterator<Item = (CellKey, FacetIndex, [VertexKey; 3])> + '_ {
        self.cells.iter().flat_map(move |(ck, cell)| {
            (0..4_u8).filter_map(move |i| match cell.neighbor(i) {
                Some(n) if n < ck => None,
                _ => Some((ck, i, cell.facet_vertices(i))),
            })
        })
    }

    /// The index in `neighbor` of the facet it shares with `cell`.
    #[must_use]
    pub fn mirror_index(&self, cell: CellKey, neighbor: CellKey) -> Option<FacetIndex> {
        let shared = self.cells.get(cell)?.vertices();
        let n = self.cells.get(neighbor)?;
        n.vertices()
            .into_iter()
            .position(|w| !shared.contains(&w))
            .and_then(|i| FacetIndex::try_from(i).ok())
    }
}
