//! Geometric predicates and vector helpers for the 3-D kernel.
//!
//! The reconstruction algorithm is deliberately tolerant of numerical
//! degeneracy: coplanar or collinear configurations near the tolerance are
//! reported as [`Orientation::Degenerate`] and treated by callers as
//! "infinite radius" candidates rather than hard failures.
//!
//! Tolerances: an absolute epsilon of `1e-7` for length-scale comparisons
//! and `eps³` for (signed) volume tests, both scaled by the input extent.

use crate::geometry::point::Point;

/// Absolute tolerance for length-scale degeneracy tests.
pub const EPS: f64 = 1e-7;

/// Absolute tolerance for signed-volume (orientation) tests: `EPS³`.
pub const EPS_VOLUME: f64 = EPS * EPS * EPS;

// =============================================================================
// VECTOR HELPERS
// =============================================================================

/// Difference vector `b - a`.
#[inline]
#[must_use]
pub fn sub(b: &Point, a: &Point) -> [f64; 3] {
    let b = b.coords();
    let a = a.coords();
    [b[0] - a[0], b[1] - a[1], b[2] - a[2]]
}

/// Dot product.
#[inline]
#[must_use]
pub fn dot(u: [f64; 3], v: [f64; 3]) -> f64 {
    u[0] * v[0] + u[1] * v[1] + u[2] * v[2]
}

/// Cross product `u × v`.
#[inline]
#[must_use]
pub fn cross(u: [f64; 3], v: [f64; 3]) -> [f64; 3] {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

/// Squared Euclidean norm.
#[inline]
#[must_use]
pub fn squared_norm(u: [f64; 3]) -> f64 {
    dot(u, u)
}

/// Squared distance between two points.
#[inline]
#[must_use]
pub fn squared_distance(a: &Point, b: &Point) -> f64 {
    squared_norm(sub(b, a))
}

/// Triangle area via the cross-product magnitude.
#[must_use]
pub fn triangle_area(a: &Point, b: &Point, c: &Point) -> f64 {
    squared_norm(cross(sub(b, a), sub(c, a))).sqrt() / 2.0
}

/// Triangle perimeter.
#[must_use]
pub fn triangle_perimeter(a: &Point, b: &Point, c: &Point) -> f64 {
    squared_distance(a, b).sqrt() + squared_distance(b, c).sqrt() + squared_distance(c, a).sqrt()
}

// =============================================================================
// ORIENTATION
// =============================================================================

/// Result of an orientation test on four points.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Orientation {
    /// `d` lies on the positive side of the plane through `a`, `b`, `c`.
    Positive,
    /// `d` lies on the negative side.
    Negative,
    /// The four points are coplanar within tolerance.
    Degenerate,
}

/// Signed volume (×6) of the tetrahedron `(a, b, c, d)`.
#[must_use]
pub fn signed_volume(a: &Point, b: &Point, c: &Point, d: &Point) -> f64 {
    dot(cross(sub(b, a), sub(c, a)), sub(d, a))
}

/// Orientation of `d` with respect to the plane through `a`, `b`, `c`.
///
/// Uses a relative tolerance: the signed volume is compared against
/// [`EPS_VOLUME`] scaled by the cube of the configuration's extent, so the
/// test behaves consistently for both tiny and large inputs.
#[must_use]
pub fn orientation(a: &Point, b: &Point, c: &Point, d: &Point) -> Orientation {
    let vol = signed_volume(a, b, c, d);
    let scale = extent(&[a, b, c, d]);
    let tol = EPS_VOLUME * scale * scale * scale;
    if vol > tol {
        Orientation::Positive
    } else if vol < -tol {
        Orientation::Negative
    } else {
        Orientation::Degenerate
    }
}

/// Whether three points are collinear within tolerance.
#[must_use]
pub fn collinear(a: &Point, b: &Point, c: &Point) -> bool {
    let n = cross(sub(b, a), sub(c, a));
    let scale = extent(&[a, b, c]);
    squared_norm(n).sqrt() <= EPS * scale * scale
}

fn extent(points: &[&Point]) -> f64 {
    let mut scale: f64 = 1.0;
    for p in points {
        for c in p.coords() {
            scale = scale.max(c.abs());
        }
    }
    scale
}

// =============================================================================
// IN-SPHERE
// =============================================================================

/// Whether `p` lies strictly inside the circumsphere of the positively
/// oriented tetrahedron `(a, b, c, d)`.
///
/// Cospherical configurations near the tolerance are reported as *outside*,
/// which keeps Bowyer-Watson conflict regions minimal on tied inputs.
#[must_use]
pub fn in_sphere(a: &Point, b: &Point, c: &Point, d: &Point, p: &Point) -> bool {
    // 4x4 determinant with rows (x - p, |x - p|²) for x in {a, b, c, d}.
    let rows = [sub(a, p), sub(b, p), sub(c, p), sub(d, p)];
    let norms = [
        squared_norm(rows[0]),
        squared_norm(rows[1]),
        squared_norm(rows[2]),
        squared_norm(rows[3]),
    ];
    let det = det4(
        [rows[0][0], rows[0][1], rows[0][2], norms[0]],
        [rows[1][0], rows[1][1], rows[1][2], norms[1]],
        [rows[2][0], rows[2][1], rows[2][2], norms[2]],
        [rows[3][0], rows[3][1], rows[3][2], norms[3]],
    );
    let scale = extent(&[a, b, c, d, p]);
    let tol = EPS_VOLUME * scale.powi(5);
    // With rows (x - p, |x - p|²) a negative determinant means p is inside
    // for a positively oriented cell.
    det < -tol
}

// =============================================================================
// PLANAR PREDICATES
// =============================================================================

/// Orientation of `c` relative to the directed line `a → b` in the plane.
///
/// `Positive` means `c` lies strictly to the left (a counter-clockwise turn).
#[must_use]
pub fn orientation2d(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> Orientation {
    let det = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
    let scale = extent2(&[a, b, c]);
    let tol = EPS * scale * scale;
    if det > tol {
        Orientation::Positive
    } else if det < -tol {
        Orientation::Negative
    } else {
        Orientation::Degenerate
    }
}

/// Whether `p` lies strictly inside the circumcircle of the counter-clockwise
/// triangle `(a, b, c)`. Cocircular configurations count as outside.
#[must_use]
pub fn in_circle_2d(a: [f64; 2], b: [f64; 2], c: [f64; 2], p: [f64; 2]) -> bool {
    let row = |x: [f64; 2]| {
        let dx = x[0] - p[0];
        let dy = x[1] - p[1];
        [dx, dy, dx * dx + dy * dy]
    };
    let det = det3(row(a), row(b), row(c));
    let scale = extent2(&[a, b, c, p]);
    let tol = EPS_VOLUME * scale.powi(4);
    det > tol
}

fn extent2(points: &[[f64; 2]]) -> f64 {
    let mut scale: f64 = 1.0;
    for p in points {
        for &c in p {
            scale = scale.max(c.abs());
        }
    }
    scale
}

fn det3(r0: [f64; 3], r1: [f64; 3], r2: [f64; 3]) -> f64 {
    r0[0] * (r1[1] * r2[2] - r1[2] * r2[1]) - r0[1] * (r1[0] * r2[2] - r1[2] * r2[0])
        + r0[2] * (r1[0] * r2[1] - r1[1] * r2[0])
}

fn det4(r0: [f64; 4], r1: [f64; 4], r2: [f64; 4], r3: [f64; 4]) -> f64 {
    let minor = |r: [f64; 4], skip: usize| -> [f64; 3] {
        let mut out = [0.0; 3];
        let mut j = 0;
        for (i, v) in r.iter().enumerate() {
            if i != skip {
                out[j] = *v;
                j += 1;
            }
        }
        out
    };
    let mut det = 0.0;
    for (col, sign) in [(0_usize, 1.0), (1, -1.0), (2, 1.0), (3, -1.0)] {
        det += sign
            * r0[col]
            * det3(minor(r1, col), minor(r2, col), minor(r3, col));
    }
    det
}

/// Solves the 3x3 linear system `m · x = rhs` by Cramer's rule.
///
/// Returns `None` when the system is singular within tolerance.
#[must_use]
pub fn solve3(m: [[f64; 3]; 3], rhs: [f64; 3]) -> Option<[f64; 3]> {
    let det = det3(m[0], m[1], m[2]);
    let scale = m
        .iter()
        .flat_map(|r| r.iter())
        .fold(1.0_f64, |acc, v| acc.max(v.abs()));
    if det.abs() <= EPS_VOLUME * scale * scale * scale {
        return None;
    }
    let col = |k: usize| -> [[f64; 3]; 3] {
        let mut mm = m;
        for (row, r) in mm.iter_mut().enumerate() {
            r[k] = rhs[row];
        }
        mm
    };
    let mut x = [0.0; 3];
    for (k, xv) in x.iter_mut().enumerate() {
        let mm = col(k);
        *xv = det3(mm[0], mm[1], mm[2]) / det;
    }
    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point {
        Point::new([x, y, z])
    }

    #[test]
    fn vector_helpers() {
        let a = p(0.0, 0.0, 0.0);
        let b = p(1.0, 2.0, 2.0);
        assert_relative_eq!(squared_distance(&a, &b), 9.0);
        assert_eq!(cross([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
        assert_relative_eq!(dot([1.0, 2.0, 3.0], [4.0, 5.0, 6.0]), 32.0);
    }

    #[test]
    fn triangle_measures() {
        let a = p(0.0, 0.0, 0.0);
        let b = p(3.0, 0.0, 0.0);
        let c = p(0.0, 4.0, 0.0);
        assert_relative_eq!(triangle_area(&a, &b, &c), 6.0);
        assert_relative_eq!(triangle_perimeter(&a, &b, &c), 12.0);
    }

    #[test]
    fn orientation_signs() {
        let a = p(0.0, 0.0, 0.0);
        let b = p(1.0, 0.0, 0.0);
        let c = p(0.0, 1.0, 0.0);
        assert_eq!(orientation(&a, &b, &c, &p(0.0, 0.0, 1.0)), Orientation::Positive);
        assert_eq!(orientation(&a, &b, &c, &p(0.0, 0.0, -1.0)), Orientation::Negative);
        assert_eq!(orientation(&a, &b, &c, &p(0.5, 0.5, 0.0)), Orientation::Degenerate);
    }

    #[test]
    fn collinearity() {
        let a = p(0.0, 0.0, 0.0);
        assert!(collinear(&a, &p(1.0, 1.0, 1.0), &p(2.0, 2.0, 2.0)));
        assert!(!collinear(&a, &p(1.0, 0.0, 0.0), &p(0.0, 1.0, 0.0)));
    }

    #[test]
    fn in_sphere_unit_tetrahedron() {
        // Positively oriented unit tetrahedron.
        let a = p(0.0, 0.0, 0.0);
        let b = p(1.0, 0.0, 0.0);
        let c = p(0.0, 1.0, 0.0);
        let d = p(0.0, 0.0, 1.0);
        assert_eq!(orientation(&a, &b, &c, &d), Orientation::Positive);
        assert!(in_sphere(&a, &b, &c, &d, &p(0.25, 0.25, 0.25)));
        assert!(!in_sphere(&a, &b, &c, &d, &p(10.0, 10.0, 10.0)));
        // A vertex of the tetrahedron is on the sphere, not inside it.
        assert!(!in_sphere(&a, &b, &c, &d, &b));
    }

    #[test]
    fn planar_orientation_and_circle() {
        let a = [0.0, 0.0];
        let b = [1.0, 0.0];
        let c = [0.0, 1.0];
        assert_eq!(orientation2d(a, b, c), Orientation::Positive);
        assert_eq!(orientation2d(a, c, b), Orientation::Negative);
        assert_eq!(orientation2d(a, b, [2.0, 0.0]), Orientation::Degenerate);
        assert!(in_circle_2d(a, b, c, [0.4, 0.4]));
        assert!(!in_circle_2d(a, b, c, [2.0, 2.0]));
        // A triangle vertex is on the circle, not inside it.
        assert!(!in_circle_2d(a, b, c, b));
    }

    #[test]
    fn solve3_simple_system() {
        let m = [[2.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 8.0]];
        let x = solve3(m, [2.0, 4.0, 8.0]).unwrap();
        assert_relative_eq!(x[0], 1.0);
        assert_relative_eq!(x[1], 1.0);
        assert_relative_eq!(x[2], 1.0);
        assert!(solve3([[1.0, 0.0, 0.0]; 3], [1.0, 1.0, 1.0]).is_none());
    }
}
