//! The front-growth state machine: seeding, the `K`-scheduled extension
//! loop, and the per-edge validation cases.
//!
//! Growth only ever *adds* facets. Every selected triangle is oriented
//! `(v2, v1, w)` for a border edge `v1 → v2` and apex `w`, so the consumed
//! border half-edges appear reversed in the triple and the surface keeps a
//! coherent orientation. Retraction is the business of
//! [`postprocess`](crate::reconstruction::postprocess).

use crate::core::triangulation_data_structure::VertexKey;
use crate::reconstruction::border::BorderKey;
use crate::reconstruction::criteria::{
    is_actionable, NOT_VALID_CANDIDATE, STANDBY_CANDIDATE, STANDBY_CANDIDATE_BIS,
};
use crate::reconstruction::front::AdvancingFrontSurfaceReconstruction;

/// Margin added to `min_K` when growing `K`, so the edge that produced the
/// bound strictly passes the uniformity test on the next round.
const K_EPS: f64 = 1e-6;

/// Outcome of validating one border edge against its stored candidate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationCase {
    /// The candidate became stale or structurally inadmissible.
    NotValid,
    /// A connecting attempt was rejected (same border, or no mergeable ear).
    NotValidConnectingCase,
    /// Both adjacent border edges existed; a three-edge hole was closed.
    FinalCase,
    /// One adjacent border edge existed and was merged as an ear.
    EarCase,
    /// The apex was a fresh exterior vertex; the front advanced over it.
    ExteriorCase,
    /// The apex lay on another border; the two fronts were connected.
    ConnectingCase,
}

impl ValidationCase {
    /// Whether the case selected a facet.
    #[must_use]
    pub const fn advanced(self) -> bool {
        matches!(
            self,
            Self::FinalCase | Self::EarCase | Self::ExteriorCase | Self::ConnectingCase
        )
    }
}

impl AdvancingFrontSurfaceReconstruction {
    // =========================================================================
    // SEEDING
    // =========================================================================

    /// Selects the facet with the globally smallest Delaunay sphere as the
    /// seed of a new component and opens its three border edges.
    ///
    /// On a re-seed only facets whose three vertices are still exterior are
    /// considered, filtered by the absolute perimeter bound; returns `false`
    /// when no admissible seed remains.
    pub(crate) fn init(&mut self, re_init: bool) -> bool {
        let facets: Vec<[VertexKey; 3]> = self.dt.tds().facets().map(|(_, _, f)| f).collect();
        let mut best: Option<([VertexKey; 3], f64)> = None;
        for f in facets {
            let [a, b, c] = f;
            if re_init {
                let all_exterior = [a, b, c]
                    .iter()
                    .all(|&v| self.state.get(v).map_or(false, |st| st.exterior));
                if !all_exterior {
                    continue;
                }
                if self.options.abs_perimeter > 0.0 {
                    let perimeter = crate::geometry::predicates::triangle_perimeter(
                        self.point(a),
                        self.point(b),
                        self.point(c),
                    );
                    if perimeter > self.options.abs_perimeter {
                        continue;
                    }
                }
            }
            let r2 = self.smallest_radius(a, b, c);
            if r2.is_finite() && best.map_or(true, |(_, b2)| r2 < b2) {
                best = Some((f, r2));
            }
        }
        let Some(([a, b, c], _)) = best else {
            return false;
        };
        self.connected_components += 1;
        self.next_border_id += 1;
        let id = self.next_border_id;
        self.select_facet([a, b, c]);
        self.create_border_edge(a, b, id);
        self.create_border_edge(b, c, id);
        self.create_border_edge(c, a, id);
        true
    }

    // =========================================================================
    // EXTENSION LOOP
    // =========================================================================

    /// Grows the current component under the `K` schedule.
    ///
    /// Inner loop: act on the queue minimum while it is actionable; a standby
    /// minimum triggers a full re-score instead. Outer loop: when only
    /// standby work is left, grow `K` just past the recorded `min_K` (at
    /// least by `k_step`), re-score, and go again; stop when the queue is
    /// empty, no standby progress was recorded, or `K` passes `k_max`.
    pub(crate) fn extend(&mut self, k_init: f64, k_step: f64, k_max: f64) {
        self.k = k_init;
        self.min_k = f64::INFINITY;
        loop {
            loop {
                let Some((criteria, key)) = self.queue.peek_min() else {
                    break;
                };
                if criteria >= STANDBY_CANDIDATE_BIS {
                    break;
                }
                if criteria >= STANDBY_CANDIDATE {
                    self.re_compute_values();
                    continue;
                }
                self.queue.pop_min();
                let case = self.validate(key);
                if matches!(
                    case,
                    ValidationCase::NotValid | ValidationCase::NotValidConnectingCase
                ) {
                    self.requeue_after_failure(key, criteria, case);
                }
            }
            if self.queue.is_empty() || !self.min_k.is_finite() {
                break;
            }
            self.k += (self.min_k - self.k + K_EPS).max(k_step);
            // min_k restarts here; the re-score below records the bound for
            // whatever is still blocked at the new K.
            self.min_k = f64::INFINITY;
            if self.k > k_max {
                break;
            }
            self.re_compute_values();
        }
    }

    /// Re-scores an edge whose validation failed, and either re-queues it or
    /// parks it as an incidence request on its (stale) candidate apex.
    fn requeue_after_failure(&mut self, key: BorderKey, old_criteria: f64, case: ValidationCase) {
        let Some(elt) = self.borders.get(key) else {
            return;
        };
        let (src, tgt, old_candidate) = (elt.source, elt.target, elt.candidate);
        let (criteria, candidate) = match self.inside_apex(src, tgt) {
            Some(prev) => self.compute_value(src, tgt, prev),
            None => (NOT_VALID_CANDIDATE, None),
        };
        let changed = criteria.to_bits() != old_criteria.to_bits();
        if let Some(elt) = self.borders.get_mut(key) {
            elt.criteria = criteria;
            elt.candidate = candidate;
        }
        let mut parked = false;
        if let Some(apex) = old_candidate {
            // A rejected connecting case (or an unchanged score) can only be
            // unblocked by the apex's border topology changing.
            if case == ValidationCase::NotValidConnectingCase || !changed {
                self.register_incidence_request(apex, key);
                parked = true;
            }
        }
        if !parked {
            self.queue.insert(criteria, key);
        }
    }

    /// Drains the queue and re-scores every live entry against the current
    /// `K`. A fresh standby score on an edge that was already standing by is
    /// stored as [`STANDBY_CANDIDATE_BIS`], which keeps the entry asleep
    /// until `K` grows.
    pub(crate) fn re_compute_values(&mut self) {
        let drained = self.queue.drain();
        for (old, key) in drained {
            let Some(elt) = self.borders.get(key) else {
                continue;
            };
            let (src, tgt) = (elt.source, elt.target);
            let (mut criteria, candidate) = match self.inside_apex(src, tgt) {
                Some(prev) => self.compute_value(src, tgt, prev),
                None => (NOT_VALID_CANDIDATE, None),
            };
            if criteria == STANDBY_CANDIDATE
                && old >= STANDBY_CANDIDATE
                && old < NOT_VALID_CANDIDATE
            {
                criteria = STANDBY_CANDIDATE_BIS;
            }
            if let Some(elt) = self.borders.get_mut(key) {
                elt.criteria = criteria;
                elt.candidate = candidate;
            }
            self.queue.insert(criteria, key);
        }
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Re-checks a popped border edge's stored candidate against the current
    /// front and, if still admissible, applies the matching topological case.
    pub(crate) fn validate(&mut self, key: BorderKey) -> ValidationCase {
        let Some(elt) = self.borders.get(key) else {
            return ValidationCase::NotValid;
        };
        let (v1, v2) = (elt.source, elt.target);
        let Some(w) = elt.candidate else {
            return ValidationCase::NotValid;
        };
        if self.state.get(w).map_or(true, |st| st.interior) {
            return ValidationCase::NotValid;
        }
        if self.is_interior_edge(w, v1) || self.is_interior_edge(w, v2) {
            return ValidationCase::NotValid;
        }
        // The new facet's free edges run v1 → w and w → v2; the reversed
        // half-edges existing as borders would break orientation coherence.
        if self.border_edge_between(v1, w).is_some() || self.border_edge_between(w, v2).is_some() {
            return ValidationCase::NotValid;
        }

        let before = self.border_edge_between(w, v1);
        let after = self.border_edge_between(v2, w);
        match (before, after) {
            (Some(b), Some(a)) => {
                self.final_case(key, b, a, w);
                ValidationCase::FinalCase
            }
            (Some(b), None) => {
                self.merge_ear_before(key, b, w);
                ValidationCase::EarCase
            }
            (None, Some(a)) => {
                self.merge_ear_after(key, a, w);
                ValidationCase::EarCase
            }
            (None, None) => {
                let (w_exterior, w_on_border) = {
                    let st = &self.state[w];
                    (st.exterior, st.is_on_border())
                };
                if w_exterior {
                    self.border_extend(key, w);
                    ValidationCase::ExteriorCase
                } else if w_on_border {
                    self.connecting_case(key, w)
                } else {
                    ValidationCase::NotValid
                }
            }
        }
    }

    // =========================================================================
    // TOPOLOGICAL CASES
    // =========================================================================

    /// Plain extension over a fresh apex: consume `v1 → v2`, select
    /// `(v2, v1, w)`, open `v1 → w` and `w → v2`.
    fn border_extend(&mut self, key: BorderKey, w: VertexKey) -> (BorderKey, BorderKey) {
        let elt = &self.borders[key];
        let (v1, v2, id) = (elt.source, elt.target, elt.border_id);
        self.remove_border_record(key, true);
        self.select_facet([v2, v1, w]);
        let k1 = self.create_border_edge(v1, w, id);
        let k2 = self.create_border_edge(w, v2, id);
        self.flush_incidence_requests(v1);
        self.flush_incidence_requests(v2);
        self.flush_incidence_requests(w);
        (k1, k2)
    }

    /// Ear on the target side: `v2 → w` already borders; consume both edges,
    /// select `(v2, v1, w)`, open `v1 → w`.
    fn merge_ear_after(&mut self, key: BorderKey, ear: BorderKey, w: VertexKey) {
        let elt = &self.borders[key];
        let (v1, v2, id) = (elt.source, elt.target, elt.border_id);
        self.remove_border_record(key, true);
        self.remove_border_record(ear, true);
        self.select_facet([v2, v1, w]);
        self.create_border_edge(v1, w, id);
        self.flush_incidence_requests(v1);
        self.flush_incidence_requests(v2);
        self.flush_incidence_requests(w);
    }

    /// Ear on the source side: `w → v1` already borders; consume both edges,
    /// select `(v2, v1, w)`, open `w → v2`.
    fn merge_ear_before(&mut self, key: BorderKey, ear: BorderKey, w: VertexKey) {
        let elt = &self.borders[key];
        let (v1, v2, id) = (elt.source, elt.target, elt.border_id);
        self.remove_border_record(key, true);
        self.remove_border_record(ear, true);
        self.select_facet([v2, v1, w]);
        self.create_border_edge(w, v2, id);
        self.flush_incidence_requests(v1);
        self.flush_incidence_requests(v2);
        self.flush_incidence_requests(w);
    }

    /// Both adjacent edges border already: the facet closes a three-edge
    /// hole; all three records are consumed and no new edge opens.
    fn final_case(&mut self, key: BorderKey, before: BorderKey, after: BorderKey, w: VertexKey) {
        let elt = &self.borders[key];
        let (v1, v2) = (elt.source, elt.target);
        self.remove_border_record(key, true);
        self.remove_border_record(before, true);
        self.remove_border_record(after, true);
        self.select_facet([v2, v1, w]);
        self.flush_incidence_requests(v1);
        self.flush_incidence_requests(v2);
        self.flush_incidence_requests(w);
    }

    /// The apex lies on a border with no adjacent edge to merge. Connecting
    /// two distinct borders pinches the front at `w` (its mark goes to 2),
    /// which is only sound when at least one of the two new edges can
    /// immediately resolve as an ear against `w`'s existing border edges;
    /// otherwise the attempt is rejected. Connecting a border to itself is
    /// rejected unless explicitly allowed by
    /// [`allow_same_border_split`](crate::reconstruction::options::AfsrOptions::allow_same_border_split).
    fn connecting_case(&mut self, key: BorderKey, w: VertexKey) -> ValidationCase {
        let elt = &self.borders[key];
        let (v1, v2) = (elt.source, elt.target);

        if self.is_on_same_border(v1, w) {
            if self.options.allow_same_border_split {
                self.border_extend(key, w);
                return ValidationCase::ConnectingCase;
            }
            return ValidationCase::NotValidConnectingCase;
        }

        // Score the two prospective edges before touching any state.
        let (c1, cand1) = self.compute_value(v1, w, v2);
        let (c2, cand2) = self.compute_value(w, v2, v1);
        if !is_actionable(c1) && !is_actionable(c2) {
            return ValidationCase::NotValidConnectingCase;
        }
        // Mergeability: the prospective edge's candidate must close an ear
        // against one of w's live border edges.
        let before_ok = cand1
            .map_or(false, |x| is_actionable(c1) && self.border_edge_between(w, x).is_some());
        let after_ok = cand2
            .map_or(false, |y| is_actionable(c2) && self.border_edge_between(y, w).is_some());
        if !before_ok && !after_ok {
            return ValidationCase::NotValidConnectingCase;
        }

        let (k1, k2) = self.border_extend(key, w);
        // Resolve the promised ears now. When both target the same apex only
        // one can win; try the better-scored side first.
        if before_ok && after_ok && cand1 == cand2 {
            if c1 <= c2 {
                self.revalidate_border_edge(k1, w);
                self.revalidate_border_edge(k2, w);
            } else {
                self.revalidate_border_edge(k2, w);
                self.revalidate_border_edge(k1, w);
            }
        } else {
            if before_ok {
                self.revalidate_border_edge(k1, w);
            }
            if after_ok {
                self.revalidate_border_edge(k2, w);
            }
        }
        ValidationCase::ConnectingCase
    }

    /// Validates a freshly created edge in place. A promised ear can still
    /// fail here (its candidate may change inside `create_border_edge` once
    /// the topology has moved); the unresolved edge is then parked on the
    /// pinch vertex so it is retried as soon as the border topology there
    /// changes, instead of sitting in the queue while `w` stays pinched.
    fn revalidate_border_edge(&mut self, key: BorderKey, pinch: VertexKey) {
        if !self.borders.contains_key(key) {
            return;
        }
        let case = self.validate(key);
        if !case.advanced() {
            if let Some(elt) = self.borders.get(key) {
                let criteria = elt.criteria;
                self.queue.erase(criteria, key);
                self.register_incidence_request(pinch, key);
            }
        }
    }

    /// Bounded successor walk: whether `target` is reachable from `start`
    /// along outgoing border edges without closing the loop first.
    pub(crate) fn is_on_same_border(&self, start: VertexKey, target: VertexKey) -> bool {
        let cap = self.borders.len() + 1;
        let mut current = start;
        for _ in 0..cap {
            let Some(next) = self
                .state
                .get(current)
                .and_then(super::border::VertexState::first_border_successor)
            else {
                return false;
            };
            if next == target {
                return true;
            }
            if next == start {
                return false;
            }
            current = next;
        }
        false
    }
}
