//! Post-processing: small-hole repair and outlier removal.
//!
//! When growth stalls with open borders left, short border cycles and
//! never-touched exterior vertices are treated as sampling artifacts. The
//! offending vertices are removed from the triangulation entirely (the
//! surviving keys stay valid across the rebuild), the surface around them is
//! retracted, and growth resumes so the front can close over the repaired
//! region. Budgets keep a badly undersampled cloud from being eaten whole.

use crate::core::collections::{FastHashMap, FastHashSet};
use crate::core::facet::FacetKey;
use crate::core::triangulation_data_structure::VertexKey;
use crate::reconstruction::border::{BorderKey, VertexState};
use crate::reconstruction::criteria::STANDBY_CANDIDATE;
use crate::reconstruction::front::AdvancingFrontSurfaceReconstruction;

/// Hard cap on repair rounds per run.
const POSTPROCESSING_ROUND_CAP: usize = 20;

impl AdvancingFrontSurfaceReconstruction {
    /// One repair round. Returns whether anything was removed and growth
    /// should resume.
    ///
    /// A round schedules every border cycle not longer than
    /// [`nb_border_max`](crate::reconstruction::options::AfsrOptions::nb_border_max)
    /// plus every isolated exterior vertex, then removes the scheduled
    /// vertices in passes (a refused removal is retried after its neighbors
    /// are gone). The round reports failure, ending repair, when nothing is
    /// scheduled, nothing could be removed, or the removal budget (a tenth
    /// of the vertex count at first repair) is exhausted.
    pub(crate) fn postprocessing(&mut self) -> bool {
        if self.options.nb_border_max == 0 {
            return false;
        }
        self.post_rounds += 1;
        if self.post_rounds > POSTPROCESSING_ROUND_CAP {
            return false;
        }
        let baseline = *self
            .baseline_vertex_count
            .get_or_insert(self.dt.number_of_vertices());

        self.post_epoch += 1;
        let epoch = self.post_epoch;
        let verts: Vec<VertexKey> = self.dt.tds().vertices().map(|(k, _)| k).collect();
        let mut scheduled: FastHashSet<VertexKey> = FastHashSet::default();

        // Stamp-walk every border cycle once; collect the short ones.
        for &v in &verts {
            let start = match self.state.get(v) {
                Some(st) if st.post_mark != epoch && st.is_on_border() => v,
                _ => continue,
            };
            self.state[start].post_mark = epoch;
            let mut cycle = vec![start];
            let mut current = start;
            let mut closed = false;
            let cap = self.borders.len() + 1;
            for _ in 0..cap {
                let Some(next) = self
                    .state
                    .get(current)
                    .and_then(VertexState::first_border_successor)
                else {
                    break;
                };
                if next == start {
                    closed = true;
                    break;
                }
                if self.state[next].post_mark == epoch {
                    break;
                }
                self.state[next].post_mark = epoch;
                cycle.push(next);
                current = next;
            }
            if closed && cycle.len() <= self.options.nb_border_max {
                scheduled.extend(cycle);
            }
        }

        // Exterior vertices the front never reached are outliers.
        for &v in &verts {
            if self.state.get(v).map_or(false, |st| st.exterior)
                && self.surface_degree.get(v).copied().unwrap_or(0) == 0
            {
                scheduled.insert(v);
            }
        }

        if scheduled.is_empty() || scheduled.len() * 10 >= baseline {
            return false;
        }

        let mut removed_this_round = 0_usize;
        let mut pending: Vec<VertexKey> = scheduled.into_iter().collect();
        loop {
            let mut progress = false;
            let mut retry: Vec<VertexKey> = Vec::new();
            for v in pending {
                if self.try_remove_vertex(v) {
                    progress = true;
                    removed_this_round += 1;
                } else if self.state.contains_key(v) {
                    retry.push(v);
                }
            }
            pending = retry;
            if !progress || pending.is_empty() {
                break;
            }
        }

        if removed_this_round == 0 || self.removed_total * 10 > baseline {
            return false;
        }
        self.min_k = f64::INFINITY;
        self.re_compute_values();
        true
    }

    // =========================================================================
    // VERTEX REMOVAL
    // =========================================================================

    /// Removes one vertex: retracts the surface around it, drops it from the
    /// triangulation, and records its position as an outlier.
    ///
    /// Refuses (returning `false`) when the retraction would pinch the border
    /// into a singular vertex, or when the remaining points cannot be
    /// re-triangulated. Both checks run before any surface state is mutated,
    /// so a refused removal leaves the session untouched.
    pub(crate) fn try_remove_vertex(&mut self, v: VertexKey) -> bool {
        if self.dt.number_of_vertices() <= 4 {
            return false;
        }
        if !self.state.contains_key(v) {
            return false;
        }

        // Star of selected facets around v and the border edges that die with
        // them.
        let star: Vec<(FacetKey, [VertexKey; 3])> = self
            .selected
            .iter()
            .filter(|(_, s)| s.oriented.contains(&v))
            .map(|(k, s)| (*k, s.oriented))
            .collect();
        let mut removal: FastHashSet<BorderKey> = self
            .borders
            .iter()
            .filter_map(|(k, elt)| (elt.source == v || elt.target == v).then_some(k))
            .collect();
        let mut new_edges: Vec<(VertexKey, VertexKey)> = Vec::new();
        for (_, t) in &star {
            for (p, q) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                if p == v || q == v {
                    continue;
                }
                // The star triangle was the inside facet of a border edge
                // p → q: that edge retracts away with it.
                if let Some(bk) = self.border_edge_between(p, q) {
                    removal.insert(bk);
                }
                // A surviving triangle on the other side turns the edge into
                // fresh border q → p.
                match self.dir_edges.get(&(q, p)) {
                    Some(&r) if r != v => new_edges.push((q, p)),
                    _ => {}
                }
            }
        }

        if self.retraction_would_pinch(&removal, &new_edges) {
            return false;
        }

        // Re-triangulating without v must succeed before any surface state
        // is touched; the shrunk triangulation is adopted at the end.
        let mut shrunk = self.dt.clone();
        let point = match shrunk.remove_vertex(v) {
            Ok(point) => point,
            Err(e) => {
                eprintln!("advancing front: vertex removal failed: {e}");
                return false;
            }
        };

        for &(fk, _) in &star {
            self.deselect_facet(fk);
        }
        let removal: Vec<BorderKey> = removal.into_iter().collect();
        let mut touched: FastHashSet<VertexKey> = FastHashSet::default();
        for bk in removal {
            if let Some(elt) = self.borders.get(bk) {
                touched.insert(elt.source);
                touched.insert(elt.target);
            }
            self.remove_border_record(bk, false);
        }
        for (_, t) in &star {
            touched.extend(t.iter().copied());
        }
        touched.remove(&v);

        self.next_border_id += 1;
        let id = self.next_border_id;
        for &(q, p) in &new_edges {
            // Parked in standby; the re-score after the repair round gives
            // them their real values.
            self.create_border_edge_with(q, p, id, STANDBY_CANDIDATE, None);
        }

        for u in touched {
            let degree = self.surface_degree.get(u).copied().unwrap_or(0);
            if let Some(st) = self.state.get_mut(u) {
                if st.mark > 0 {
                    st.interior = false;
                    st.exterior = false;
                } else if degree == 0 {
                    st.exterior = true;
                    st.interior = false;
                } else {
                    st.interior = true;
                    st.exterior = false;
                }
            }
        }

        self.radius_cache.clear();
        self.dt = shrunk;
        self.outliers.push(point);
        self.state.remove(v);
        self.surface_degree.remove(v);
        self.removed_total += 1;
        true
    }

    /// Whether retracting (dropping `removal`, opening `new_edges`) would
    /// leave some vertex with border out- or in-degree above one.
    fn retraction_would_pinch(
        &self,
        removal: &FastHashSet<BorderKey>,
        new_edges: &[(VertexKey, VertexKey)],
    ) -> bool {
        let mut out: FastHashMap<VertexKey, usize> = FastHashMap::default();
        let mut inn: FastHashMap<VertexKey, usize> = FastHashMap::default();
        for &(q, p) in new_edges {
            *out.entry(q).or_insert(0) += 1;
            *inn.entry(p).or_insert(0) += 1;
        }
        if out.values().any(|&n| n > 1) || inn.values().any(|&n| n > 1) {
            return true;
        }
        for (bk, elt) in &self.borders {
            if removal.contains(&bk) {
                continue;
            }
            if out.contains_key(&elt.source) || inn.contains_key(&elt.target) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::Point;
    use crate::geometry::point_generation::{fibonacci_sphere, jittered_disc};
    use crate::reconstruction::options::AfsrOptions;

    #[test]
    fn lone_far_point_becomes_outlier() {
        let mut points = fibonacci_sphere(50, 1.0, [0.0; 3]);
        points.push(Point::new([40.0, 0.0, 0.0]));
        let afs =
            AdvancingFrontSurfaceReconstruction::new(&points, AfsrOptions::default()).unwrap();
        assert_eq!(afs.number_of_outliers(), 1);
        let outlier = afs.outliers().next().unwrap();
        assert!(outlier.same_coordinates(&Point::new([40.0, 0.0, 0.0])));
        assert_eq!(afs.number_of_border_edges(), 0);
        afs.check_invariants().unwrap();
    }

    #[test]
    fn refused_removal_leaves_triangulation_intact() {
        // Flat layer plus one far-off apex: the apex ends up scheduled for
        // removal as an isolated exterior vertex, but dropping it would leave
        // a coplanar residue that cannot be re-triangulated. The refusal must
        // leave the session fully intact.
        let mut points: Vec<Point> = jittered_disc(4)
            .into_iter()
            .map(|p| Point::new([p.x(), p.y(), 0.0]))
            .collect();
        points.push(Point::new([0.1, 0.2, 30.0]));
        let afs =
            AdvancingFrontSurfaceReconstruction::new(&points, AfsrOptions::default()).unwrap();
        assert_eq!(afs.number_of_outliers(), 0);
        assert_eq!(afs.triangulation().number_of_vertices(), 82);
        assert!(afs.triangulation().number_of_cells() > 0);
        assert!(afs.number_of_facets() > 0);
        afs.check_invariants().unwrap();
    }

    #[test]
    fn disabling_postprocessing_keeps_every_point() {
        let mut points = fibonacci_sphere(50, 1.0, [0.0; 3]);
        points.push(Point::new([40.0, 0.0, 0.0]));
        let options = AfsrOptions::default().with_nb_border_max(0);
        let afs = AdvancingFrontSurfaceReconstruction::new(&points, options).unwrap();
        assert_eq!(afs.number_of_outliers(), 0);
        assert_eq!(afs.triangulation().number_of_vertices(), 51);
    }
}
