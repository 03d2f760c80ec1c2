//! End-to-end reconstruction scenarios: closed surfaces, open surfaces with
//! boundaries, outlier-contaminated clouds, and multi-component clouds.

use advancing_front::prelude::*;

// =============================================================================
// CLOSED SURFACES
// =============================================================================

#[test]
fn sphere_reconstructs_closed() {
    let points = fibonacci_sphere(100, 1.0, [0.0; 3]);
    let afs = AdvancingFrontSurfaceReconstruction::with_defaults(&points).unwrap();

    assert_eq!(afs.number_of_connected_components(), 1);
    assert_eq!(afs.number_of_border_edges(), 0);
    assert_eq!(afs.number_of_vertices(), 100);
    assert_eq!(afs.number_of_outliers(), 0);
    // Closed orientable genus-0 surface: F = 2V - 4.
    assert_eq!(afs.number_of_facets(), 2 * 100 - 4);
    assert!(afs.boundaries().next().is_none());
    afs.check_invariants().unwrap();
}

#[test]
fn every_sphere_vertex_is_on_surface() {
    let points = fibonacci_sphere(60, 2.0, [1.0, -3.0, 0.5]);
    let afs = AdvancingFrontSurfaceReconstruction::with_defaults(&points).unwrap();
    for (v, _) in afs.triangulation().tds().vertices() {
        assert!(afs.is_on_surface(v));
        assert!(afs.tds_2().vertex_index(v).is_some());
    }
}

// =============================================================================
// OPEN SURFACES
// =============================================================================

#[test]
fn disc_keeps_its_rim_as_boundary() {
    // 1 center + rings of 8i points; the outermost ring (40 points) is the
    // convex-hull silhouette and must survive as the one boundary loop.
    let points = jittered_disc(5);
    assert_eq!(points.len(), 121);
    let afs = AdvancingFrontSurfaceReconstruction::with_defaults(&points).unwrap();

    assert_eq!(afs.number_of_connected_components(), 1);
    assert_eq!(afs.number_of_outliers(), 0);
    assert_eq!(afs.number_of_vertices(), 121);
    assert_eq!(afs.number_of_border_edges(), 40);

    let loops: Vec<BoundaryLoop> = afs.boundaries().collect();
    assert_eq!(loops.len(), 1);
    let rim = &loops[0];
    assert_eq!(rim.len(), 40);
    // The entry vertex is visited twice: first and last.
    let verts = rim.vertices();
    assert_eq!(verts.first(), verts.last());
    assert_eq!(verts.len(), 41);
    // Every rim vertex sits on the unit circle.
    for &v in &verts[..40] {
        let p = afs.triangulation().tds().point(v);
        let r2 = p.x() * p.x() + p.y() * p.y();
        assert!((r2 - 1.0).abs() < 1e-9, "boundary vertex off the rim: {p}");
    }
    afs.check_invariants().unwrap();
}

#[test]
fn disc_euler_characteristic_matches_a_disc() {
    let points = jittered_disc(4);
    let afs = AdvancingFrontSurfaceReconstruction::with_defaults(&points).unwrap();
    let v = afs.number_of_vertices() as i64;
    let f = afs.number_of_facets() as i64;
    let b = afs.number_of_border_edges() as i64;
    // E = (3F + B) / 2; a disc has Euler characteristic 1.
    let e = (3 * f + b) / 2;
    assert_eq!(v - e + f, 1);
}

#[test]
fn flat_disc_reconstructs_as_planar_triangulation() {
    // An exactly coplanar cloud cannot be tetrahedralized; reconstruction
    // falls back to the Delaunay triangulation of the points within their
    // plane, with the convex hull (the 32-point outer ring) as the border.
    let points: Vec<Point> = jittered_disc(4)
        .into_iter()
        .map(|p| Point::new([p.x(), p.y(), 0.0]))
        .collect();
    let afs = AdvancingFrontSurfaceReconstruction::with_defaults(&points).unwrap();

    assert_eq!(afs.number_of_connected_components(), 1);
    assert_eq!(afs.number_of_vertices(), 81);
    assert_eq!(afs.number_of_border_edges(), 32);
    // Planar triangulation of 81 points with 32 on the hull: F = 2V - 2 - B.
    assert_eq!(afs.number_of_facets(), 128);
    let loops: Vec<BoundaryLoop> = afs.boundaries().collect();
    assert_eq!(loops.len(), 1);
    assert_eq!(loops[0].len(), 32);
    afs.check_invariants().unwrap();
}

#[test]
fn terrain_layer_keeps_lone_peak_off_the_surface() {
    // A flat irregular grid plus a single point far above it: the grid
    // reconstructs as an open sheet; the peak is unreachable (every facet
    // through it fails the sampling-uniformity test) and stays off the
    // surface without being eaten by repair.
    let mut points = Vec::new();
    for i in 0..5_i32 {
        for j in 0..5_i32 {
            let k = f64::from(i * 5 + j);
            points.push(Point::new([
                f64::from(i) + 0.13 * (k * 0.7).sin(),
                f64::from(j) + 0.11 * (k * 1.3).cos(),
                0.0,
            ]));
        }
    }
    points.push(Point::new([2.3, 2.2, 100.0]));
    let afs = AdvancingFrontSurfaceReconstruction::with_defaults(&points).unwrap();

    assert_eq!(afs.number_of_connected_components(), 1);
    assert_eq!(afs.number_of_vertices(), 25);
    assert!(afs.number_of_border_edges() > 0);
    assert_eq!(afs.number_of_outliers(), 0);
    afs.check_invariants().unwrap();
}

// =============================================================================
// MULTIPLE COMPONENTS
// =============================================================================

#[test]
fn two_distant_spheres_give_two_components() {
    let mut points = fibonacci_sphere(40, 1.0, [-10.0, 0.0, 0.0]);
    points.extend(fibonacci_sphere(40, 1.0, [10.0, 0.0, 0.0]));
    let afs = AdvancingFrontSurfaceReconstruction::with_defaults(&points).unwrap();

    assert_eq!(afs.number_of_connected_components(), 2);
    assert_eq!(afs.number_of_border_edges(), 0);
    assert_eq!(afs.number_of_vertices(), 80);
    assert_eq!(afs.number_of_outliers(), 0);
    // Two closed genus-0 components.
    assert_eq!(afs.number_of_facets(), 2 * (2 * 40 - 4));

    // No facet bridges the gap between the spheres.
    for tri in afs.tds_2().surface_triangles() {
        let signs: Vec<bool> = tri.iter().map(|p| p.x() > 0.0).collect();
        assert!(
            signs.iter().all(|&s| s) || signs.iter().all(|&s| !s),
            "facet spans both spheres"
        );
    }
    afs.check_invariants().unwrap();
}

#[test]
fn component_cap_stops_seeding() {
    let mut points = fibonacci_sphere(40, 1.0, [-10.0, 0.0, 0.0]);
    points.extend(fibonacci_sphere(40, 1.0, [10.0, 0.0, 0.0]));
    let options = AfsrOptions::default().with_max_connected_components(1);
    let afs = AdvancingFrontSurfaceReconstruction::new(&points, options).unwrap();

    assert_eq!(afs.number_of_connected_components(), 1);
    assert_eq!(afs.number_of_vertices(), 40);
    assert_eq!(afs.number_of_facets(), 2 * 40 - 4);
}

// =============================================================================
// OUTLIERS
// =============================================================================

#[test]
fn outliers_are_removed_and_reported() {
    let mut points = fibonacci_sphere(60, 1.0, [0.0; 3]);
    points.push(Point::new([30.0, 5.0, -2.0]));
    points.push(Point::new([-25.0, 0.0, 14.0]));
    let afs = AdvancingFrontSurfaceReconstruction::with_defaults(&points).unwrap();

    assert_eq!(afs.number_of_outliers(), 2);
    assert_eq!(afs.number_of_vertices(), 60);
    assert_eq!(afs.number_of_border_edges(), 0);
    let removed: Vec<&Point> = afs.outliers().collect();
    assert!(removed
        .iter()
        .any(|p| p.same_coordinates(&Point::new([30.0, 5.0, -2.0]))));
    assert!(removed
        .iter()
        .any(|p| p.same_coordinates(&Point::new([-25.0, 0.0, 14.0]))));
    // Removal is physical: the triangulation no longer holds the outliers.
    assert_eq!(afs.triangulation().number_of_vertices(), 60);
    afs.check_invariants().unwrap();
}

// =============================================================================
// ERROR PATHS
// =============================================================================

#[test]
fn too_few_points_is_an_error() {
    let points = vec![
        Point::new([0.0, 0.0, 0.0]),
        Point::new([1.0, 0.0, 0.0]),
        Point::new([0.0, 1.0, 0.0]),
    ];
    assert!(matches!(
        AdvancingFrontSurfaceReconstruction::with_defaults(&points),
        Err(ReconstructionError::Triangulation { .. })
    ));
}

#[test]
fn degenerate_cloud_is_an_error() {
    // Strictly collinear points cannot triangulate.
    let points: Vec<Point> = (0..10)
        .map(|i| Point::new([f64::from(i), 0.0, 0.0]))
        .collect();
    assert!(AdvancingFrontSurfaceReconstruction::with_defaults(&points).is_err());
}

// =============================================================================
// EXPORT CONSISTENCY
// =============================================================================

#[test]
fn export_is_watertight_with_hole_faces() {
    let points = jittered_disc(4);
    let afs = AdvancingFrontSurfaceReconstruction::with_defaults(&points).unwrap();
    let tds2 = afs.tds_2();

    assert_eq!(tds2.number_of_surface_faces(), afs.number_of_facets());
    assert_eq!(
        tds2.number_of_faces() - tds2.number_of_surface_faces(),
        afs.number_of_border_edges()
    );
    // Hole faces close the face graph: every edge has a neighbor.
    for face in tds2.faces() {
        for i in 0..3 {
            assert!(face.neighbor(i).is_some(), "unwired edge in export");
        }
        if !face.is_surface() {
            assert!(face.vertices().contains(&tds2.sentinel()));
        }
    }
}
