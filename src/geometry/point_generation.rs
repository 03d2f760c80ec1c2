//! Deterministic and seeded point-cloud generators.
//!
//! These samplers back the integration tests and benches: closed surfaces
//! (Fibonacci sphere), open surfaces with a known border (jittered disc), and
//! volumetric noise (seeded random ball).

use crate::geometry::point::Point;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `n` points quasi-uniformly distributed on a sphere (Fibonacci lattice).
#[must_use]
pub fn fibonacci_sphere(n: usize, radius: f64, center: [f64; 3]) -> Vec<Point> {
    let golden = core::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    #[allow(clippy::cast_precision_loss)]
    (0..n)
        .map(|i| {
            let t = (i as f64 + 0.5) / n as f64;
            let z = 1.0 - 2.0 * t;
            let r = (1.0 - z * z).sqrt();
            let theta = golden * i as f64;
            Point::new([
                center[0] + radius * r * theta.cos(),
                center[1] + radius * r * theta.sin(),
                center[2] + radius * z,
            ])
        })
        .collect()
}

/// A near-flat disc of unit radius sampled on concentric rings.
///
/// Ring `i` (for `i` in `1..=rings`) carries `8 * i` points at radius
/// `i / rings`, plus one center point. A small deterministic height jitter
/// breaks the cosphericity of ring pairs without moving the silhouette, so
/// the convex-hull boundary of the sample is exactly the outermost ring
/// (`8 * rings` points).
#[must_use]
pub fn jittered_disc(rings: usize) -> Vec<Point> {
    let mut points = vec![Point::new([0.0, 0.0, 0.0])];
    #[allow(clippy::cast_precision_loss)]
    for i in 1..=rings {
        let r = i as f64 / rings as f64;
        let count = 8 * i;
        for j in 0..count {
            let theta = 2.0 * core::f64::consts::PI * j as f64 / count as f64;
            let z = 0.02 * (5.0 * theta + 1.7 * i as f64).sin();
            points.push(Point::new([r * theta.cos(), r * theta.sin(), z]));
        }
    }
    points
}

/// `n` seeded random points in the ball of the given radius.
#[must_use]
pub fn random_ball(n: usize, radius: f64, center: [f64; 3], seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::with_capacity(n);
    while points.len() < n {
        let x = rng.gen_range(-radius..=radius);
        let y = rng.gen_range(-radius..=radius);
        let z = rng.gen_range(-radius..=radius);
        if x * x + y * y + z * z <= radius * radius {
            points.push(Point::new([center[0] + x, center[1] + y, center[2] + z]));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::predicates::squared_distance;

    #[test]
    fn fibonacci_sphere_on_sphere() {
        let center = [1.0, 2.0, 3.0];
        let points = fibonacci_sphere(64, 2.0, center);
        assert_eq!(points.len(), 64);
        let c = Point::new(center);
        for p in &points {
            let d2 = squared_distance(&c, p);
            assert!((d2 - 4.0).abs() < 1e-9, "point off sphere: {p}");
        }
    }

    #[test]
    fn jittered_disc_counts() {
        let points = jittered_disc(4);
        // 1 center + 8 + 16 + 24 + 32
        assert_eq!(points.len(), 81);
        // Outermost ring at radius 1 in the xy-plane.
        let outer = points
            .iter()
            .filter(|p| (p.x() * p.x() + p.y() * p.y() - 1.0).abs() < 1e-9)
            .count();
        assert_eq!(outer, 32);
    }

    #[test]
    fn random_ball_deterministic_and_bounded() {
        let a = random_ball(50, 1.5, [0.0; 3], 7);
        let b = random_ball(50, 1.5, [0.0; 3], 7);
        assert_eq!(a.len(), 50);
        for (p, q) in a.iter().zip(&b) {
            assert!(p.same_coordinates(q));
        }
        let origin = Point::new([0.0; 3]);
        assert!(a.iter().all(|p| squared_distance(&origin, p) <= 1.5 * 1.5));
    }
}
