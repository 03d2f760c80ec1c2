//! Circumscribed spheres for triangles and tetrahedra.
//!
//! The reconstruction algorithm ranks candidate facets by the radius of the
//! *smallest enclosing Delaunay sphere*: the smallest sphere through a facet's
//! three vertices that also respects the two tetrahedra adjacent to the facet.
//! All radii in this crate are **squared** radii; the algorithm only ever
//! compares them, so the square root is never taken.

use crate::geometry::point::Point;
use crate::geometry::predicates::{
    cross, dot, solve3, squared_distance, squared_norm, sub, EPS,
};

/// Circumcenter of the triangle `(a, b, c)` embedded in 3-D.
///
/// Returns `None` for (near-)collinear triangles.
#[must_use]
pub fn triangle_circumcenter(a: &Point, b: &Point, c: &Point) -> Option<Point> {
    let u = sub(b, a);
    let v = sub(c, a);
    let n = cross(u, v);
    let n2 = squared_norm(n);
    let scale = squared_norm(u).max(squared_norm(v)).max(1.0);
    if n2 <= EPS * EPS * scale * scale {
        return None;
    }
    // center = a + (|u|² (v × n) + |v|² (n × u)) / (2 |n|²)
    let vn = cross(v, n);
    let nu = cross(n, u);
    let lu = squared_norm(u);
    let lv = squared_norm(v);
    let inv = 1.0 / (2.0 * n2);
    let ac = a.coords();
    Some(Point::new([
        ac[0] + (lu * vn[0] + lv * nu[0]) * inv,
        ac[1] + (lu * vn[1] + lv * nu[1]) * inv,
        ac[2] + (lu * vn[2] + lv * nu[2]) * inv,
    ]))
}

/// Squared circumradius of the triangle `(a, b, c)`.
///
/// Returns `f64::INFINITY` for degenerate triangles, so degenerate candidates
/// sort behind every admissible one.
#[must_use]
pub fn triangle_squared_circumradius(a: &Point, b: &Point, c: &Point) -> f64 {
    triangle_circumcenter(a, b, c).map_or(f64::INFINITY, |center| squared_distance(&center, a))
}

/// Circumcenter of the tetrahedron `(a, b, c, d)`.
///
/// Solves the perpendicular-bisector system `2 (x_i - a) · c = |x_i|² - |a|²`;
/// returns `None` for coplanar configurations.
#[must_use]
pub fn tetrahedron_circumcenter(a: &Point, b: &Point, c: &Point, d: &Point) -> Option<Point> {
    let u = sub(b, a);
    let v = sub(c, a);
    let w = sub(d, a);
    let m = [
        [2.0 * u[0], 2.0 * u[1], 2.0 * u[2]],
        [2.0 * v[0], 2.0 * v[1], 2.0 * v[2]],
        [2.0 * w[0], 2.0 * w[1], 2.0 * w[2]],
    ];
    let rhs = [squared_norm(u), squared_norm(v), squared_norm(w)];
    let x = solve3(m, rhs)?;
    let ac = a.coords();
    Some(Point::new([ac[0] + x[0], ac[1] + x[1], ac[2] + x[2]]))
}

/// Squared circumradius of the tetrahedron `(a, b, c, d)`.
///
/// Returns `f64::INFINITY` for coplanar quadruples (numerical degeneracy is
/// treated as an infinite-radius candidate, never as an error).
#[must_use]
pub fn tetrahedron_squared_circumradius(a: &Point, b: &Point, c: &Point, d: &Point) -> f64 {
    tetrahedron_circumcenter(a, b, c, d)
        .map_or(f64::INFINITY, |center| squared_distance(&center, a))
}

/// Squared radius of the smallest sphere through `(a, b, c)` that is empty
/// with respect to the opposite vertices of the facet's incident cells.
///
/// Starts from the triangle's own circumsphere. Whenever an opposite vertex
/// lies strictly inside that minimal sphere, the sphere has to grow along the
/// facet's axis until the vertex is on it, which is the circumsphere of the
/// corresponding tetrahedron; the largest such growth wins.
#[must_use]
pub fn smallest_delaunay_sphere_squared_radius(
    a: &Point,
    b: &Point,
    c: &Point,
    opposite: &[Point],
) -> f64 {
    let Some(center) = triangle_circumcenter(a, b, c) else {
        return f64::INFINITY;
    };
    let r2 = squared_distance(&center, a);
    let mut best = r2;
    for d in opposite {
        if squared_distance(&center, d) < r2 * (1.0 - 1e-12) {
            let grown = tetrahedron_squared_circumradius(a, b, c, d);
            if grown.is_finite() {
                best = best.max(grown);
            } else {
                return f64::INFINITY;
            }
        }
    }
    best
}

/// Dihedral-angle proxy between the facet `(v1, v2, prev)` and the candidate
/// facet `(v1, v2, w)`, sharing the directed edge `v1 → v2`.
///
/// Returns `(proxy, norm)` where `proxy / norm` is the cosine of the turn
/// angle across the edge: `+1` for a flat continuation, `-1` for folding back
/// onto the previous facet. The quotient is only taken by callers that need
/// the normalized value; sign tests use the raw pair.
#[must_use]
pub fn dihedral_proxy(v1: &Point, v2: &Point, prev: &Point, w: &Point) -> (f64, f64) {
    let e = sub(v2, v1);
    let n_in = cross(e, sub(prev, v1));
    let n_c = cross(e, sub(w, v1));
    let proxy = -dot(n_in, n_c);
    let norm = (squared_norm(n_in) * squared_norm(n_c)).sqrt();
    (proxy, norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point {
        Point::new([x, y, z])
    }

    #[test]
    fn triangle_circumcenter_right_triangle() {
        let center =
            triangle_circumcenter(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), &p(0.0, 1.0, 0.0))
                .unwrap();
        assert_relative_eq!(center.x(), 0.5);
        assert_relative_eq!(center.y(), 0.5);
        assert_relative_eq!(center.z(), 0.0);
    }

    #[test]
    fn triangle_circumcenter_degenerate() {
        assert!(
            triangle_circumcenter(&p(0.0, 0.0, 0.0), &p(1.0, 1.0, 1.0), &p(2.0, 2.0, 2.0))
                .is_none()
        );
        assert!(triangle_squared_circumradius(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 1.0, 1.0),
            &p(2.0, 2.0, 2.0)
        )
        .is_infinite());
    }

    #[test]
    fn tetrahedron_circumcenter_unit() {
        let center = tetrahedron_circumcenter(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(0.0, 1.0, 0.0),
            &p(0.0, 0.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(center.x(), 0.5);
        assert_relative_eq!(center.y(), 0.5);
        assert_relative_eq!(center.z(), 0.5);
        let r2 = tetrahedron_squared_circumradius(
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(0.0, 1.0, 0.0),
            &p(0.0, 0.0, 1.0),
        );
        assert_relative_eq!(r2, 0.75);
    }

    #[test]
    fn smallest_sphere_far_opposite_keeps_triangle_radius() {
        let a = p(0.0, 0.0, 0.0);
        let b = p(1.0, 0.0, 0.0);
        let c = p(0.0, 1.0, 0.0);
        let far = p(0.5, 0.5, 10.0);
        let r2 = smallest_delaunay_sphere_squared_radius(&a, &b, &c, &[far]);
        assert_relative_eq!(r2, triangle_squared_circumradius(&a, &b, &c));
    }

    #[test]
    fn smallest_sphere_close_opposite_grows_to_tetrahedron() {
        let a = p(0.0, 0.0, 0.0);
        let b = p(1.0, 0.0, 0.0);
        let c = p(0.0, 1.0, 0.0);
        // Inside the triangle's minimal sphere (center (0.5, 0.5, 0), r² = 0.5).
        let near = p(0.5, 0.5, 0.1);
        let r2 = smallest_delaunay_sphere_squared_radius(&a, &b, &c, &[near]);
        let grown = tetrahedron_squared_circumradius(&a, &b, &c, &near);
        assert_relative_eq!(r2, grown);
        assert!(r2 > triangle_squared_circumradius(&a, &b, &c));
    }

    #[test]
    fn dihedral_proxy_signs() {
        let v1 = p(0.0, 0.0, 0.0);
        let v2 = p(1.0, 0.0, 0.0);
        let prev = p(0.5, 1.0, 0.0);
        // Flat continuation on the far side of the edge.
        let (proxy, norm) = dihedral_proxy(&v1, &v2, &prev, &p(0.5, -1.0, 0.0));
        assert!(proxy > 0.0);
        assert_relative_eq!(proxy / norm, 1.0, epsilon = 1e-12);
        // Folding back over the previous facet.
        let (proxy, norm) = dihedral_proxy(&v1, &v2, &prev, &p(0.5, 0.9, 0.01));
        assert!(proxy / norm < -0.9);
    }
}
