//! Planar fallback: a coplanar cloud cannot be tetrahedralized, so its
//! surface is the Delaunay triangulation of the points within their common
//! plane, with the convex hull as the open border.
//!
//! The triangulation is built by the same conflict-region insertion as the
//! 3-D one, one dimension down: conflict triangles are those whose
//! circumcircle strictly contains the new point, and hull edges visible from
//! the point extend the cavity outward. Triangles are kept counter-clockwise
//! in the projected plane throughout.

use crate::core::algorithms::bowyer_watson::DelaunayTriangulation;
use crate::core::collections::FastHashSet;
use crate::core::triangulation_data_structure::{
    TriangulationConstructionError, VertexKey,
};
use crate::geometry::point::Point;
use crate::geometry::predicates::{
    collinear, cross, dot, in_circle_2d, orientation2d, squared_norm, sub, Orientation,
};
use crate::reconstruction::front::{AdvancingFrontSurfaceReconstruction, ReconstructionError};
use crate::reconstruction::options::AfsrOptions;

impl AdvancingFrontSurfaceReconstruction {
    /// Reconstructs a coplanar cloud as its planar Delaunay triangulation.
    pub(crate) fn new_planar(
        points: &[Point],
        options: AfsrOptions,
    ) -> Result<Self, ReconstructionError> {
        let dt = DelaunayTriangulation::vertices_only(points)?;
        let mut session = Self::empty(dt, options);
        session.run_planar()?;
        Ok(session)
    }

    /// Triangulates the cloud in its common plane and selects every triangle
    /// into the surface. The convex hull becomes the single border loop; its
    /// edges stay open (there is nothing to grow into).
    fn run_planar(&mut self) -> Result<(), ReconstructionError> {
        let keys: Vec<VertexKey> = self.dt.tds().vertices().map(|(k, _)| k).collect();
        let pts3: Vec<Point> = keys.iter().map(|&k| *self.point(k)).collect();
        let Some(proj) = project_to_plane(&pts3) else {
            return Err(TriangulationConstructionError::DegenerateInput.into());
        };
        let tris = planar_delaunay(&proj, &pts3)?;
        if !self.component_budget_left() {
            self.export_surface();
            return Ok(());
        }
        self.connected_components = 1;
        self.next_border_id = 1;
        for t in &tris {
            self.select_facet([keys[t[0]], keys[t[1]], keys[t[2]]]);
        }
        // Hull rim: directed edges whose reverse is not covered by a
        // selected triangle.
        let rim: Vec<(VertexKey, VertexKey)> = self
            .dir_edges
            .keys()
            .copied()
            .filter(|&(u, v)| !self.dir_edges.contains_key(&(v, u)))
            .collect();
        for (u, v) in rim {
            self.create_border_edge(u, v, 1);
        }
        for &k in &keys {
            let degree = self.surface_degree.get(k).copied().unwrap_or(0);
            if let Some(st) = self.state.get_mut(k) {
                if st.mark > 0 {
                    st.interior = false;
                    st.exterior = false;
                } else if degree > 0 {
                    st.interior = true;
                    st.exterior = false;
                }
            }
        }
        self.export_surface();
        Ok(())
    }
}

/// Projects the cloud onto an orthonormal basis of its common plane.
///
/// Returns `None` when every point is collinear (no plane to project onto).
fn project_to_plane(pts: &[Point]) -> Option<Vec<[f64; 2]>> {
    let a = pts.first()?;
    let b = pts.iter().find(|p| !p.same_coordinates(a))?;
    let c = pts.iter().find(|p| !collinear(a, b, p))?;
    let e1 = sub(b, a);
    let normal = cross(e1, sub(c, a));
    let inv_u = 1.0 / squared_norm(e1).sqrt();
    let u = e1.map(|x| x * inv_u);
    let inv_n = 1.0 / squared_norm(normal).sqrt();
    let n = normal.map(|x| x * inv_n);
    let v = cross(n, u);
    Some(
        pts.iter()
            .map(|p| {
                let d = sub(p, a);
                [dot(d, u), dot(d, v)]
            })
            .collect(),
    )
}

/// Incremental Delaunay triangulation of projected points, returned as
/// counter-clockwise index triples into `proj`.
fn planar_delaunay(
    proj: &[[f64; 2]],
    pts: &[Point],
) -> Result<Vec<[usize; 3]>, TriangulationConstructionError> {
    let a = 0;
    let b = 1;
    let Some(c) = (2..proj.len())
        .find(|&i| orientation2d(proj[a], proj[b], proj[i]) != Orientation::Degenerate)
    else {
        return Err(TriangulationConstructionError::DegenerateInput);
    };
    let mut tris = vec![match orientation2d(proj[a], proj[b], proj[c]) {
        Orientation::Negative => [a, c, b],
        _ => [a, b, c],
    }];
    for p in 1..proj.len() {
        if p == b || p == c {
            continue;
        }
        insert_planar(&mut tris, proj, p, &pts[p])?;
    }
    Ok(tris)
}

/// Inserts point `p` into the triangulation by carving its conflict region
/// and refilling the cavity, extending past visible hull edges.
fn insert_planar(
    tris: &mut Vec<[usize; 3]>,
    proj: &[[f64; 2]],
    p: usize,
    original: &Point,
) -> Result<(), TriangulationConstructionError> {
    let q = proj[p];
    let conflict: Vec<bool> = tris
        .iter()
        .map(|t| in_circle_2d(proj[t[0]], proj[t[1]], proj[t[2]], q))
        .collect();

    let mut all_edges: FastHashSet<(usize, usize)> = FastHashSet::default();
    for t in tris.iter() {
        for e in triangle_edges(t) {
            all_edges.insert(e);
        }
    }
    let mut cavity_edges: FastHashSet<(usize, usize)> = FastHashSet::default();
    for (t, &hot) in tris.iter().zip(&conflict) {
        if hot {
            for e in triangle_edges(t) {
                cavity_edges.insert(e);
            }
        }
    }

    let sees = |x: usize, y: usize| orientation2d(proj[x], proj[y], q) == Orientation::Negative;

    let mut boundary: Vec<(usize, usize)> = Vec::new();
    for (t, &hot) in tris.iter().zip(&conflict) {
        if hot {
            for (x, y) in triangle_edges(t) {
                if cavity_edges.contains(&(y, x)) {
                    continue;
                }
                // Hull edge of a conflict triangle: the point sees past it
                // only when it lies strictly outside, which opens the cavity
                // there instead of closing it.
                if !all_edges.contains(&(y, x)) && sees(x, y) {
                    continue;
                }
                boundary.push((x, y));
            }
        } else {
            // Visible hull edges of surviving triangles extend the cavity
            // outward, reversed so the new triangle turns counter-clockwise.
            for (x, y) in triangle_edges(t) {
                if !all_edges.contains(&(y, x)) && sees(x, y) {
                    boundary.push((y, x));
                }
            }
        }
    }
    if boundary.is_empty() {
        return Err(TriangulationConstructionError::InsertionFailed { point: *original });
    }

    let mut next: Vec<[usize; 3]> = tris
        .iter()
        .zip(&conflict)
        .filter(|&(_, &hot)| !hot)
        .map(|(t, _)| *t)
        .collect();
    for (x, y) in boundary {
        if orientation2d(proj[x], proj[y], q) != Orientation::Positive {
            return Err(TriangulationConstructionError::InsertionFailed { point: *original });
        }
        next.push([x, y, p]);
    }
    *tris = next;
    Ok(())
}

fn triangle_edges(t: &[usize; 3]) -> [(usize, usize); 3] {
    [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_with_center_triangulates() {
        let pts: Vec<Point> = [
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.0, 1.0],
            [0.5, 0.5],
        ]
        .iter()
        .map(|&[x, y]| Point::new([x, y, 0.0]))
        .collect();
        let proj = project_to_plane(&pts).unwrap();
        let tris = planar_delaunay(&proj, &pts).unwrap();
        assert_eq!(tris.len(), 4);
        // Every triangle fans around the center and turns counter-clockwise.
        for t in &tris {
            assert!(t.contains(&4));
            assert_eq!(
                orientation2d(proj[t[0]], proj[t[1]], proj[t[2]]),
                Orientation::Positive
            );
        }
    }

    #[test]
    fn collinear_cloud_is_rejected() {
        let pts: Vec<Point> = (0..6)
            .map(|i| Point::new([f64::from(i), 2.0 * f64::from(i), 0.0]))
            .collect();
        assert!(project_to_plane(&pts).is_none());
    }

    #[test]
    fn tilted_plane_projects_isometrically() {
        // Points on the plane x + y + z = 0; projection must preserve
        // pairwise distances.
        let pts = [
            Point::new([1.0, -1.0, 0.0]),
            Point::new([0.0, 1.0, -1.0]),
            Point::new([-1.0, 0.0, 1.0]),
            Point::new([2.0, -1.0, -1.0]),
        ];
        let proj = project_to_plane(&pts).unwrap();
        for i in 0..pts.len() {
            for j in (i + 1)..pts.len() {
                let d3 = crate::geometry::predicates::squared_distance(&pts[i], &pts[j]);
                let dx = proj[i][0] - proj[j][0];
                let dy = proj[i][1] - proj[j][1];
                approx::assert_relative_eq!(d3, dx * dx + dy * dy, epsilon = 1e-12);
            }
        }
    }
}
