//! Property-based tests for the documented reconstruction invariants:
//! - internal session invariants hold after every run
//! - vertex conservation (input = surviving triangulation + outliers)
//! - orientation coherence of the exported face graph
//! - boundary loops are closed and account for every border edge

use advancing_front::prelude::*;
use proptest::prelude::*;

fn run_on_ball(n: usize, seed: u64) -> AdvancingFrontSurfaceReconstruction {
    let points = random_ball(n, 1.0, [0.0; 3], seed);
    AdvancingFrontSurfaceReconstruction::with_defaults(&points)
        .expect("seeded ball clouds triangulate")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_session_invariants_hold(seed in 0_u64..1_000, n in 20_usize..50) {
        let afs = run_on_ball(n, seed);
        prop_assert!(afs.check_invariants().is_ok());
    }

    #[test]
    fn prop_vertices_are_conserved(seed in 0_u64..1_000, n in 20_usize..50) {
        let afs = run_on_ball(n, seed);
        prop_assert_eq!(
            afs.triangulation().number_of_vertices() + afs.number_of_outliers(),
            n
        );
    }

    #[test]
    fn prop_export_orientation_is_coherent(seed in 0_u64..1_000, n in 20_usize..50) {
        let afs = run_on_ball(n, seed);
        let tds2 = afs.tds_2();
        // Each directed edge appears at most once over the surface faces, so
        // shared edges are traversed in opposite directions by their two
        // facets.
        let mut seen = FastHashSet::default();
        let mut all = FastHashSet::default();
        for face in tds2.faces() {
            let [x, y, z] = face.vertices();
            for (a, b) in [(x, y), (y, z), (z, x)] {
                if face.is_surface() {
                    prop_assert!(seen.insert((a, b)), "directed edge repeated: {a} -> {b}");
                }
                all.insert((a, b));
            }
        }
        // Watertight: hole faces supply the reverse of every unmatched
        // surface edge.
        for &(a, b) in &seen {
            prop_assert!(all.contains(&(b, a)), "unmatched directed edge: {a} -> {b}");
        }
    }

    #[test]
    fn prop_boundary_loops_cover_border_edges(seed in 0_u64..1_000, n in 20_usize..50) {
        let afs = run_on_ball(n, seed);
        let mut covered = 0_usize;
        for lp in afs.boundaries() {
            let verts = lp.vertices();
            prop_assert!(verts.len() >= 3, "a border loop has at least 2 edges");
            prop_assert_eq!(verts.first(), verts.last());
            covered += lp.len();
        }
        // Loops through a pinch vertex are reported once, so the walk covers
        // at most every border edge.
        prop_assert!(covered <= afs.number_of_border_edges());
    }

    #[test]
    fn prop_surface_faces_are_delaunay_facets(seed in 0_u64..1_000, n in 20_usize..45) {
        let afs = run_on_ball(n, seed);
        let tds = afs.triangulation().tds();
        let tds2 = afs.tds_2();
        for face in tds2.faces().filter(|f| f.is_surface()) {
            let keys: Vec<VertexKey> = face
                .vertices()
                .iter()
                .map(|&i| tds2.vertex(i).unwrap().key().unwrap())
                .collect();
            prop_assert!(tds.facet_exists(keys[0], keys[1], keys[2]));
        }
    }
}
