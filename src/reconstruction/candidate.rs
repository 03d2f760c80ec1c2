//! Candidate evaluation for border edges.
//!
//! `compute_value` is the scoring engine behind every queue entry: given a
//! border half-edge `v1 → v2` and the apex `prev` of its inside facet, it
//! enumerates the Delaunay facets rotating around the edge, filters out the
//! inadmissible ones, picks the apex minimizing the smallest-Delaunay-sphere
//! squared radius, and maps the winner onto the totally ordered quality scale
//! of [`criteria`](crate::reconstruction::criteria).

use crate::core::facet::FacetKey;
use crate::core::triangulation_data_structure::VertexKey;
use crate::geometry::circumsphere::{dihedral_proxy, smallest_delaunay_sphere_squared_radius};
use crate::geometry::point::Point;
use crate::geometry::predicates::{squared_distance, triangle_area, triangle_perimeter};
use crate::reconstruction::criteria::{NOT_VALID_CANDIDATE, SLIVER_ANGULUS, STANDBY_CANDIDATE};
use crate::reconstruction::front::AdvancingFrontSurfaceReconstruction;

/// Relative area/perimeter bounds only engage once the running averages are
/// meaningful.
const RELATIVE_BOUND_MIN_FACETS: usize = 1000;

impl AdvancingFrontSurfaceReconstruction {
    /// Smallest-Delaunay-sphere squared radius of the facet `{a, b, c}`,
    /// memoized per vertex triple until the next topology change.
    pub(crate) fn smallest_radius(&mut self, a: VertexKey, b: VertexKey, c: VertexKey) -> f64 {
        let key = FacetKey::new(a, b, c);
        if let Some(&r2) = self.radius_cache.get(&key) {
            return r2;
        }
        let opposite: Vec<Point> = self
            .dt
            .tds()
            .facet_opposite_vertices(a, b, c)
            .into_iter()
            .map(|d| *self.point(d))
            .collect();
        let r2 = smallest_delaunay_sphere_squared_radius(
            self.dt.tds().point(a),
            self.dt.tds().point(b),
            self.dt.tds().point(c),
            &opposite,
        );
        self.radius_cache.insert(key, r2);
        r2
    }

    /// Size admissibility of a candidate facet against the absolute bounds
    /// and, once enough facets are selected, the relative ones.
    fn candidate_size_admissible(&self, a: &Point, b: &Point, c: &Point) -> bool {
        let perimeter = triangle_perimeter(a, b, c);
        if self.options.abs_perimeter > 0.0 && perimeter > self.options.abs_perimeter {
            return false;
        }
        let area = triangle_area(a, b, c);
        if self.options.abs_area > 0.0 && area > self.options.abs_area {
            return false;
        }
        if self.selected.len() > RELATIVE_BOUND_MIN_FACETS {
            if self.options.perimeter > 0.0
                && perimeter > self.options.perimeter * self.average_perimeter()
            {
                return false;
            }
            if self.options.area > 0.0 && area > self.options.area * self.average_area() {
                return false;
            }
        }
        true
    }

    /// Scores the border half-edge `v1 → v2` whose inside facet has apex
    /// `prev`. Returns the quality value and the chosen candidate apex.
    ///
    /// The chosen apex is the admissible one whose facet `{v1, v2, w}` has
    /// the smallest Delaunay sphere; the quality value encodes, in order of
    /// precedence:
    ///
    /// - no admissible candidate, or the winner breaks the `delta` sampling
    ///   bound: [`NOT_VALID_CANDIDATE`] (no apex reported);
    /// - the winner folds well (normalized turn cosine above
    ///   [`SLIVER_ANGULUS`]): `-(1 + 1/r²)`;
    /// - the winner's sphere passes the uniformity test `r² ≤ K · r²_cur`:
    ///   `-cos θ`;
    /// - otherwise [`STANDBY_CANDIDATE`], recording `r²/r²_cur` into `min_K`
    ///   so the growth loop knows the smallest `K` that would unblock it.
    pub(crate) fn compute_value(
        &mut self,
        v1: VertexKey,
        v2: VertexKey,
        prev: VertexKey,
    ) -> (f64, Option<VertexKey>) {
        let p1 = *self.point(v1);
        let p2 = *self.point(v2);
        let pp = *self.point(prev);
        let squared_edge = squared_distance(&p1, &p2);
        let r2_cur = self.smallest_radius(v1, v2, prev);

        let apexes = self.dt.tds().facet_apexes_around_edge(v1, v2);
        let mut min_radius = f64::INFINITY;
        let mut min_cos = 0.0;
        let mut chosen: Option<VertexKey> = None;
        let mut delta_violation = false;

        for w in apexes {
            if w == prev {
                continue;
            }
            if self.state.get(w).map_or(true, |st| st.interior) {
                continue;
            }
            // A facet whose free edges are already strictly interior would
            // pinch the surface shut.
            if self.is_interior_edge(w, v1) || self.is_interior_edge(w, v2) {
                continue;
            }
            let pw = *self.point(w);
            if !self.candidate_size_admissible(&p1, &p2, &pw) {
                continue;
            }
            let (proxy, norm) = dihedral_proxy(&p1, &p2, &pp, &pw);
            if norm <= f64::MIN_POSITIVE {
                continue;
            }
            // Sliver rejection: a candidate folding back hard onto the inside
            // facet is only trusted when the fold is not forced by a sliver
            // cell joining all four vertices.
            if proxy < -SLIVER_ANGULUS * norm && self.dt.tds().cell_exists(v1, v2, w, prev) {
                continue;
            }
            let r2 = self.smallest_radius(v1, v2, w);
            if r2 < min_radius {
                min_radius = r2;
                min_cos = proxy / norm;
                chosen = Some(w);
                delta_violation = self.options.delta > 0.0
                    && r2 > squared_edge / (self.options.delta * self.options.delta);
            }
        }

        if !min_radius.is_finite() || delta_violation {
            return (NOT_VALID_CANDIDATE, None);
        }
        if min_cos > SLIVER_ANGULUS {
            return (-(1.0 + 1.0 / min_radius), chosen);
        }
        if min_radius <= self.k * r2_cur {
            (-min_cos, chosen)
        } else {
            self.min_k = self.min_k.min(min_radius / r2_cur);
            (STANDBY_CANDIDATE, chosen)
        }
    }
}
