//! Incremental Bowyer-Watson construction of the 3-D Delaunay triangulation.
//!
//! The triangulation is built by inserting one point at a time:
//!
//! 1. Collect the **conflict region**: every cell whose circumsphere strictly
//!    contains the new point.
//! 2. Determine the cavity boundary facets. For points outside the current
//!    convex hull this includes the hull facets in conflict with the point
//!    (strictly visible, or coplanar with the point inside their
//!    circumcircle), so hull extension, layered inputs, and interior
//!    insertion share one code path.
//! 3. Replace the conflict cells by the fan joining the point to each cavity
//!    boundary facet, and rewire neighbors across the cavity.
//!
//! Vertex **removal** re-triangulates the surviving vertices in place over
//! their stable keys. That is asymptotically more expensive than a local
//! cavity repair, but it cannot corrupt connectivity, and every consumer of
//! per-facet state in this crate is keyed by vertex triples, which survive
//! the rebuild unchanged.

use crate::core::cell::Cell;
use crate::core::collections::{FacetIndex, FastHashMap, FastHashSet};
use crate::core::facet::EdgeKey;
use crate::core::triangulation_data_structure::{
    CellKey, Tds, TriangulationConstructionError, VertexKey,
};
use crate::geometry::circumsphere::{triangle_circumcenter, triangle_squared_circumradius};
use crate::geometry::point::Point;
use crate::geometry::predicates::{in_sphere, orientation, squared_distance, Orientation};

/// An incremental 3-D Delaunay triangulation.
#[derive(Clone, Debug, Default)]
pub struct DelaunayTriangulation {
    tds: Tds,
}

impl DelaunayTriangulation {
    /// Triangulates the given points.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationConstructionError`] when the input has fewer
    /// than four points, contains duplicates or non-finite coordinates, or is
    /// entirely coplanar.
    pub fn new(points: &[Point]) -> Result<Self, TriangulationConstructionError> {
        let mut dt = Self::vertices_only(points)?;
        dt.retriangulate()?;
        Ok(dt)
    }

    /// Stores validated points as vertices without building any cells.
    ///
    /// The planar fallback triangulates coplanar clouds in their common
    /// plane and only needs vertex storage with stable keys.
    pub(crate) fn vertices_only(
        points: &[Point],
    ) -> Result<Self, TriangulationConstructionError> {
        if points.len() < 4 {
            return Err(TriangulationConstructionError::InsufficientVertices {
                actual: points.len(),
            });
        }
        let mut seen: FastHashSet<[u64; 3]> = FastHashSet::default();
        let mut tds = Tds::new();
        for p in points {
            p.validate()?;
            let bits = p.coords().map(f64::to_bits);
            if !seen.insert(bits) {
                return Err(TriangulationConstructionError::DuplicateCoordinates { point: *p });
            }
            tds.insert_vertex(*p);
        }
        Ok(Self { tds })
    }

    /// Read access to the underlying data structure.
    #[must_use]
    pub const fn tds(&self) -> &Tds {
        &self.tds
    }

    /// Number of vertices.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.tds.number_of_vertices()
    }

    /// Number of cells.
    #[must_use]
    pub fn number_of_cells(&self) -> usize {
        self.tds.number_of_cells()
    }

    /// Removes a vertex and re-triangulates the remaining points.
    ///
    /// The removed position is returned. All other vertex keys stay valid.
    ///
    /// # Errors
    ///
    /// Refuses to drop below four vertices; propagates re-triangulation
    /// failures (degenerate residual input).
    pub fn remove_vertex(
        &mut self,
        v: VertexKey,
    ) -> Result<Point, TriangulationConstructionError> {
        let remaining = self.tds.number_of_vertices().saturating_sub(1);
        if remaining < 4 {
            return Err(TriangulationConstructionError::TooFewVerticesForRemoval { remaining });
        }
        let vertex = self.tds.remove_vertex_storage(v).ok_or(
            TriangulationConstructionError::TooFewVerticesForRemoval { remaining },
        )?;
        self.retriangulate()?;
        Ok(*vertex.point())
    }

    // =========================================================================
    // CONSTRUCTION
    // =========================================================================

    /// Rebuilds all cells from the current vertex set.
    fn retriangulate(&mut self) -> Result<(), TriangulationConstructionError> {
        self.tds.clear_cells();
        let keys: Vec<VertexKey> = self.tds.vertices().map(|(k, _)| k).collect();
        let initial = self.initial_simplex(&keys)?;
        let mut verts = initial;
        let [a, b, c, d] = verts;
        if orientation(
            self.tds.point(a),
            self.tds.point(b),
            self.tds.point(c),
            self.tds.point(d),
        ) == Orientation::Negative
        {
            verts.swap(2, 3);
        }
        self.tds.insert_cell(Cell::new(verts));
        for &v in &keys {
            if initial.contains(&v) {
                continue;
            }
            self.insert_one(v)?;
        }
        Ok(())
    }

    /// Picks four affinely independent vertices to seed the triangulation.
    fn initial_simplex(
        &self,
        keys: &[VertexKey],
    ) -> Result<[VertexKey; 4], TriangulationConstructionError> {
        use crate::geometry::predicates::collinear;
        let a = keys[0];
        let pa = self.tds.point(a);
        let b = keys[1..]
            .iter()
            .copied()
            .find(|&k| !self.tds.point(k).same_coordinates(pa))
            .ok_or(TriangulationConstructionError::DegenerateInput)?;
        let c = keys[1..]
            .iter()
            .copied()
            .find(|&k| k != b && !collinear(pa, self.tds.point(b), self.tds.point(k)))
            .ok_or(TriangulationConstructionError::DegenerateInput)?;
        let d = keys[1..]
            .iter()
            .copied()
            .find(|&k| {
                k != b
                    && k != c
                    && orientation(
                        pa,
                        self.tds.point(b),
                        self.tds.point(c),
                        self.tds.point(k),
                    ) != Orientation::Degenerate
            })
            .ok_or(TriangulationConstructionError::DegenerateInput)?;
        Ok([a, b, c, d])
    }

    /// Inserts one vertex into the existing triangulation.
    fn insert_one(&mut self, v: VertexKey) -> Result<(), TriangulationConstructionError> {
        let p = *self.tds.point(v);

        let conflict: FastHashSet<CellKey> = self
            .tds
            .cells()
            .filter_map(|(ck, cell)| {
                let [a, b, c, d] = cell.vertices();
                in_sphere(
                    self.tds.point(a),
                    self.tds.point(b),
                    self.tds.point(c),
                    self.tds.point(d),
                    &p,
                )
                .then_some(ck)
            })
            .collect();

        // Cavity boundary: facet vertices plus the surviving cell behind the
        // facet (with its facet index toward the cavity), if any.
        let mut boundary: Vec<([VertexKey; 3], Option<(CellKey, FacetIndex)>)> = Vec::new();

        for (&ck, cell) in conflict
            .iter()
            .map(|ck| (ck, self.tds.cell(*ck).expect("conflict cell is live")))
        {
            for i in 0..4_u8 {
                let f = cell.facet_vertices(i);
                match cell.neighbor(i) {
                    Some(n) if conflict.contains(&n) => {}
                    Some(n) => {
                        let mi = self
                            .tds
                            .mirror_index(ck, n)
                            .expect("neighbor shares a facet");
                        boundary.push((f, Some((n, mi))));
                    }
                    None => {
                        // Hull facet of a conflict cell: stays on the cavity
                        // boundary unless it is itself in conflict with the
                        // new point.
                        if !self.hull_facet_in_conflict(ck, i, &p) {
                            boundary.push((f, None));
                        }
                    }
                }
            }
        }

        // Hull facets of surviving cells in conflict with p extend the
        // cavity outward (convex hull extension).
        let visible: Vec<(CellKey, FacetIndex)> = self
            .tds
            .cells()
            .filter(|(ck, _)| !conflict.contains(ck))
            .flat_map(|(ck, cell)| {
                (0..4_u8)
                    .filter(move |&i| cell.neighbor(i).is_none())
                    .map(move |i| (ck, i))
            })
            .collect();
        for (ck, i) in visible {
            if self.hull_facet_in_conflict(ck, i, &p) {
                let f = self.tds.cell(ck).expect("cell is live").facet_vertices(i);
                boundary.push((f, Some((ck, i))));
            }
        }

        if boundary.is_empty() {
            return Err(TriangulationConstructionError::InsertionFailed { point: p });
        }

        for ck in conflict {
            self.tds.remove_cell(ck);
        }

        // Fill the cavity with the fan from p and wire neighbors. Facets of
        // new cells containing p are matched pairwise through their base edge.
        let mut edge_map: FastHashMap<EdgeKey, (CellKey, FacetIndex)> = FastHashMap::default();
        for (f, outside) in boundary {
            let mut verts = [v, f[0], f[1], f[2]];
            let o = orientation(
                &p,
                self.tds.point(f[0]),
                self.tds.point(f[1]),
                self.tds.point(f[2]),
            );
            if o == Orientation::Degenerate {
                return Err(TriangulationConstructionError::InsertionFailed { point: p });
            }
            if o == Orientation::Negative {
                verts.swap(2, 3);
            }
            let new_ck = self.tds.insert_cell(Cell::new(verts));
            // Facet 0 (opposite p) is the cavity boundary facet.
            self.tds
                .cell_mut(new_ck)
                .expect("new cell is live")
                .set_neighbor(0, outside.map(|(c, _)| c));
            if let Some((c, mi)) = outside {
                self.tds
                    .cell_mut(c)
                    .expect("outside cell is live")
                    .set_neighbor(mi, Some(new_ck));
            }
            for i in 1..4_u8 {
                let facet = self
                    .tds
                    .cell(new_ck)
                    .expect("new cell is live")
                    .facet_vertices(i);
                let base: Vec<VertexKey> = facet.into_iter().filter(|&u| u != v).collect();
                let key = EdgeKey::new(base[0], base[1]);
                if let Some((other_ck, other_i)) = edge_map.remove(&key) {
                    self.tds
                        .cell_mut(new_ck)
                        .expect("new cell is live")
                        .set_neighbor(i, Some(other_ck));
                    self.tds
                        .cell_mut(other_ck)
                        .expect("paired cell is live")
                        .set_neighbor(other_i, Some(new_ck));
                } else {
                    edge_map.insert(key, (new_ck, i));
                }
            }
        }
        Ok(())
    }

    /// Whether the hull facet `i` of `cell` is in conflict with `p`: strictly
    /// visible (on the far side from the cell's opposite vertex), or coplanar
    /// with `p` while `p` falls strictly inside the facet's circumcircle.
    ///
    /// The coplanar case keeps layered inputs insertable: a point on the
    /// supporting plane of a hull facet extends the triangulation through
    /// that facet instead of failing with an empty cavity.
    fn hull_facet_in_conflict(&self, cell: CellKey, i: FacetIndex, p: &Point) -> bool {
        let c = self.tds.cell(cell).expect("cell is live");
        let [a, b, d] = c.facet_vertices(i);
        let (pa, pb, pd) = (self.tds.point(a), self.tds.point(b), self.tds.point(d));
        let o_p = orientation(pa, pb, pd, p);
        if o_p == Orientation::Degenerate {
            let r2 = triangle_squared_circumradius(pa, pb, pd);
            return triangle_circumcenter(pa, pb, pd)
                .map_or(false, |center| squared_distance(&center, p) < r2);
        }
        let opp = c.opposite_vertex(i);
        let o_in = orientation(pa, pb, pd, self.tds.point(opp));
        o_in != Orientation::Degenerate && o_p != o_in
    }

    // =========================================================================
    // VALIDATION (test support)
    // =========================================================================

    /// Exhaustively checks structural and Delaunay invariants.
    ///
    /// Quadratic; intended for tests and debugging only.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        // Positive orientation everywhere.
        for (_, cell) in self.tds.cells() {
            let [a, b, c, d] = cell.vertices();
            if orientation(
                self.tds.point(a),
                self.tds.point(b),
                self.tds.point(c),
                self.tds.point(d),
            ) != Orientation::Positive
            {
                return false;
            }
        }
        // Neighbor mutuality and facet sharing.
        let mut facet_count: FastHashMap<crate::core::facet::FacetKey, usize> =
            FastHashMap::default();
        for (ck, cell) in self.tds.cells() {
            for i in 0..4_u8 {
                let [a, b, c] = cell.facet_vertices(i);
                *facet_count
                    .entry(crate::core::facet::FacetKey::new(a, b, c))
                    .or_insert(0) += 1;
                if let Some(n) = cell.neighbor(i) {
                    let Some(ncell) = self.tds.cell(n) else {
                        return false;
                    };
                    if !(0..4_u8).any(|j| ncell.neighbor(j) == Some(ck)) {
                        return false;
                    }
                }
            }
        }
        if facet_count.values().any(|&n| n > 2) {
            return false;
        }
        // Empty circumsphere against every vertex.
        for (_, cell) in self.tds.cells() {
            let [a, b, c, d] = cell.vertices();
            for (vk, vertex) in self.tds.vertices() {
                if cell.contains_vertex(vk) {
                    continue;
                }
                if in_sphere(
                    self.tds.point(a),
                    self.tds.point(b),
                    self.tds.point(c),
                    self.tds.point(d),
                    vertex.point(),
                ) {
                    return false;
                }
            }
        }
        true
    }
}
