//! The reconstruction session.
//!
//! [`AdvancingFrontSurfaceReconstruction`] owns every piece of mutable run
//! state: the Delaunay triangulation, the per-vertex augmentation, the
//! border-record arena, the ordered queue, the selected-facet tables, the
//! radius memoization, and the growth parameters `K` / `min_K`. There are no
//! module-level statics; a run is one long-lived call executed to completion
//! by [`AdvancingFrontSurfaceReconstruction::new`].
//!
//! The algorithm itself is spread over sibling modules, all as inherent
//! impls on the session type: candidate scoring in
//! [`candidate`](crate::reconstruction::candidate), the growth state machine
//! in [`growth`](crate::reconstruction::growth), repair in
//! [`postprocess`](crate::reconstruction::postprocess) and export in
//! [`surface`](crate::reconstruction::surface).

use crate::core::algorithms::bowyer_watson::DelaunayTriangulation;
use crate::core::collections::FastHashMap;
use crate::core::facet::FacetKey;
use crate::core::triangulation_data_structure::{
    TriangulationConstructionError, VertexKey,
};
use crate::geometry::point::Point;
use crate::geometry::predicates::{triangle_area, triangle_perimeter};
use crate::reconstruction::border::{BorderElt, BorderKey, VertexState};
use crate::reconstruction::options::AfsrOptions;
use crate::reconstruction::queue::BorderQueue;
use crate::reconstruction::surface::Tds2;
use slotmap::{SecondaryMap, SlotMap};
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors surfaced by a reconstruction run.
///
/// Inability to grow a surface is *not* an error (the result is an empty
/// surface); only a failure to triangulate the input at all is reported.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ReconstructionError {
    /// The input point cloud could not be triangulated.
    #[error("triangulation construction failed: {source}")]
    Triangulation {
        /// The underlying construction error.
        #[from]
        source: TriangulationConstructionError,
    },
}

/// A violated internal invariant, as reported by
/// [`AdvancingFrontSurfaceReconstruction::check_invariants`].
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InvariantViolation {
    /// A vertex mark disagrees with its live outgoing border edges.
    #[error("vertex mark {mark} != {edges} outgoing border edges")]
    MarkMismatch {
        /// Stored mark counter.
        mark: i32,
        /// Actual outgoing edge count.
        edges: usize,
    },
    /// A border record is neither queued nor parked, or queued twice.
    #[error("border record has {queued} queue entries and {parked} park entries")]
    QueueCompleteness {
        /// Queue entries found for the record.
        queued: usize,
        /// Incidence-request entries found for the record.
        parked: usize,
    },
    /// A queue entry references a dead record or a stale criteria value.
    #[error("stale queue entry")]
    StaleQueueEntry,
    /// The directed-edge index disagrees with the selected-facet table.
    #[error("directed-edge index has {directed} entries for {selected} selected facets")]
    DirectedEdgeMismatch {
        /// Directed edge count.
        directed: usize,
        /// Selected facet count.
        selected: usize,
    },
}

// =============================================================================
// SELECTED FACETS
// =============================================================================

/// A facet selected into the reconstructed surface.
#[derive(Clone, Copy, Debug)]
pub struct SelectedFacet {
    /// Oriented vertex triple; directed edges run counter-clockwise with the
    /// surface on the left.
    pub oriented: [VertexKey; 3],
    /// Selection sequence number.
    pub seq: u32,
}

// =============================================================================
// SESSION
// =============================================================================

/// Advancing-front surface reconstruction of a 3-D point cloud.
///
/// Construction runs the whole algorithm: seed (`init`), grow (`extend`),
/// repair (`postprocessing`) per connected component, then export.
///
/// # Examples
///
/// ```rust
/// use advancing_front::prelude::*;
///
/// let points = fibonacci_sphere(60, 1.0, [0.0; 3]);
/// let afs = AdvancingFrontSurfaceReconstruction::with_defaults(&points).unwrap();
/// assert_eq!(afs.number_of_connected_components(), 1);
/// assert!(afs.number_of_facets() > 0);
/// ```
#[derive(Debug)]
pub struct AdvancingFrontSurfaceReconstruction {
    pub(crate) dt: DelaunayTriangulation,
    pub(crate) options: AfsrOptions,
    pub(crate) state: SecondaryMap<VertexKey, VertexState>,
    pub(crate) surface_degree: SecondaryMap<VertexKey, u32>,
    pub(crate) borders: SlotMap<BorderKey, BorderElt>,
    pub(crate) queue: BorderQueue,
    pub(crate) selected: FastHashMap<FacetKey, SelectedFacet>,
    /// Directed edge of a selected triangle -> its third vertex.
    pub(crate) dir_edges: FastHashMap<(VertexKey, VertexKey), VertexKey>,
    /// Memoized smallest-Delaunay-sphere squared radii, invalidated on every
    /// topology change of the triangulation.
    pub(crate) radius_cache: FastHashMap<FacetKey, f64>,
    pub(crate) k: f64,
    pub(crate) min_k: f64,
    pub(crate) connected_components: usize,
    pub(crate) outliers: Vec<Point>,
    pub(crate) post_epoch: u32,
    pub(crate) post_rounds: usize,
    pub(crate) removed_total: usize,
    pub(crate) baseline_vertex_count: Option<usize>,
    pub(crate) next_seq: u32,
    pub(crate) next_border_id: u32,
    pub(crate) sum_area: f64,
    pub(crate) sum_perimeter: f64,
    pub(crate) tds2: Tds2,
}

impl AdvancingFrontSurfaceReconstruction {
    /// Reconstructs a surface from `points` with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`ReconstructionError::Triangulation`] when the input cannot
    /// be triangulated (fewer than four points, duplicates, non-finite
    /// coordinates, or collinear geometry). Exactly coplanar clouds are not
    /// an error: they fall back to the planar Delaunay triangulation of the
    /// points within their common plane.
    pub fn new(points: &[Point], options: AfsrOptions) -> Result<Self, ReconstructionError> {
        let dt = match DelaunayTriangulation::new(points) {
            Ok(dt) => dt,
            // A coplanar cloud cannot be tetrahedralized; its surface is its
            // planar Delaunay triangulation.
            Err(TriangulationConstructionError::DegenerateInput) => {
                return Self::new_planar(points, options);
            }
            Err(e) => return Err(e.into()),
        };
        let mut session = Self::empty(dt, options);
        session.run();
        Ok(session)
    }

    /// A session over `dt` with no surface grown yet.
    pub(crate) fn empty(dt: DelaunayTriangulation, options: AfsrOptions) -> Self {
        let mut state = SecondaryMap::new();
        let mut surface_degree = SecondaryMap::new();
        for (v, _) in dt.tds().vertices() {
            state.insert(v, VertexState::fresh());
            surface_degree.insert(v, 0);
        }
        Self {
            dt,
            options,
            state,
            surface_degree,
            borders: SlotMap::with_key(),
            queue: BorderQueue::new(),
            selected: FastHashMap::default(),
            dir_edges: FastHashMap::default(),
            radius_cache: FastHashMap::default(),
            k: 0.0,
            min_k: f64::INFINITY,
            connected_components: 0,
            outliers: Vec::new(),
            post_epoch: 0,
            post_rounds: 0,
            removed_total: 0,
            baseline_vertex_count: None,
            next_seq: 0,
            next_border_id: 0,
            sum_area: 0.0,
            sum_perimeter: 0.0,
            tds2: Tds2::default(),
        }
    }

    /// Reconstructs with default options.
    ///
    /// # Errors
    ///
    /// See [`AdvancingFrontSurfaceReconstruction::new`].
    pub fn with_defaults(points: &[Point]) -> Result<Self, ReconstructionError> {
        Self::new(points, AfsrOptions::default())
    }

    /// The driver: seed, grow and repair components until no seed is left or
    /// the component cap is reached, then export.
    fn run(&mut self) {
        let (k_init, k_step, k_max) =
            (self.options.k_init, self.options.k_step, self.options.k_max);
        let mut re_init = false;
        while self.component_budget_left() && self.init(re_init) {
            re_init = true;
            loop {
                self.extend(k_init, k_step, k_max);
                if self.options.nb_border_max > 0
                    && self.selected.len() > self.dt.number_of_vertices()
                {
                    if !self.postprocessing() {
                        break;
                    }
                } else {
                    break;
                }
            }
        }
        self.export_surface();
    }

    pub(crate) fn component_budget_left(&self) -> bool {
        let max = self.options.max_connected_comp;
        max < 0 || self.connected_components < usize::try_from(max).unwrap_or(usize::MAX)
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// The configuration this run used.
    #[must_use]
    pub const fn options(&self) -> &AfsrOptions {
        &self.options
    }

    /// The underlying Delaunay triangulation.
    #[must_use]
    pub const fn triangulation(&self) -> &DelaunayTriangulation {
        &self.dt
    }

    /// Number of facets selected into the surface.
    #[must_use]
    pub fn number_of_facets(&self) -> usize {
        self.selected.len()
    }

    /// Number of vertices incident to at least one surface facet.
    #[must_use]
    pub fn number_of_vertices(&self) -> usize {
        self.surface_degree.iter().filter(|&(_, &d)| d > 0).count()
    }

    /// Number of open border half-edges left after growth.
    #[must_use]
    pub fn number_of_border_edges(&self) -> usize {
        self.borders.len()
    }

    /// Number of connected components grown.
    #[must_use]
    pub fn number_of_connected_components(&self) -> usize {
        self.connected_components
    }

    /// Number of outlier points removed during repair.
    #[must_use]
    pub fn number_of_outliers(&self) -> usize {
        self.outliers.len()
    }

    /// The outlier points, in removal order.
    pub fn outliers(&self) -> impl Iterator<Item = &Point> {
        self.outliers.iter()
    }

    /// The exported 2-D triangulation data structure of the surface.
    #[must_use]
    pub const fn tds_2(&self) -> &Tds2 {
        &self.tds2
    }

    /// Whether a triangulation vertex carries at least one surface facet.
    #[must_use]
    pub fn is_on_surface(&self, v: VertexKey) -> bool {
        self.surface_degree.get(v).copied().unwrap_or(0) > 0
    }

    // =========================================================================
    // SHARED STATE HELPERS
    // =========================================================================

    pub(crate) fn point(&self, v: VertexKey) -> &Point {
        self.dt.tds().point(v)
    }

    /// The record of border half-edge `u → v`, if live.
    pub(crate) fn border_edge_between(&self, u: VertexKey, v: VertexKey) -> Option<BorderKey> {
        self.state.get(u).and_then(|st| st.border_edge_to(v))
    }

    /// An edge is strictly interior when both orientations appear in
    /// selected triangles.
    pub(crate) fn is_interior_edge(&self, u: VertexKey, v: VertexKey) -> bool {
        self.dir_edges.contains_key(&(u, v)) && self.dir_edges.contains_key(&(v, u))
    }

    /// Third vertex of the selected triangle containing directed edge
    /// `u → v`, i.e. the inside facet of border edge `u → v`.
    pub(crate) fn inside_apex(&self, u: VertexKey, v: VertexKey) -> Option<VertexKey> {
        self.dir_edges.get(&(u, v)).copied()
    }

    /// Selects the oriented triangle `t` into the surface.
    pub(crate) fn select_facet(&mut self, t: [VertexKey; 3]) {
        let fk = FacetKey::new(t[0], t[1], t[2]);
        if self.selected.contains_key(&fk) {
            eprintln!("advancing front: facet selected twice, ignoring re-selection");
            return;
        }
        self.selected.insert(
            fk,
            SelectedFacet {
                oriented: t,
                seq: self.next_seq,
            },
        );
        self.next_seq += 1;
        self.dir_edges.insert((t[0], t[1]), t[2]);
        self.dir_edges.insert((t[1], t[2]), t[0]);
        self.dir_edges.insert((t[2], t[0]), t[1]);
        for &v in &t {
            if let Some(d) = self.surface_degree.get_mut(v) {
                *d += 1;
            }
        }
        let [a, b, c] = t.map(|v| *self.point(v));
        self.sum_area += triangle_area(&a, &b, &c);
        self.sum_perimeter += triangle_perimeter(&a, &b, &c);
    }

    /// Removes a facet from the surface (post-processing retraction only).
    pub(crate) fn deselect_facet(&mut self, fk: FacetKey) {
        let Some(sel) = self.selected.remove(&fk) else {
            eprintln!("advancing front: deselecting a facet that is not selected");
            return;
        };
        let t = sel.oriented;
        self.dir_edges.remove(&(t[0], t[1]));
        self.dir_edges.remove(&(t[1], t[2]));
        self.dir_edges.remove(&(t[2], t[0]));
        for &v in &t {
            if let Some(d) = self.surface_degree.get_mut(v) {
                *d = d.saturating_sub(1);
            }
        }
        let [a, b, c] = t.map(|v| *self.point(v));
        self.sum_area -= triangle_area(&a, &b, &c);
        self.sum_perimeter -= triangle_perimeter(&a, &b, &c);
    }

    /// Creates the border half-edge `u → v`, scoring it with the candidate
    /// engine, and queues it.
    pub(crate) fn create_border_edge(
        &mut self,
        u: VertexKey,
        v: VertexKey,
        border_id: u32,
    ) -> BorderKey {
        let (criteria, candidate) = match self.inside_apex(u, v) {
            Some(prev) => self.compute_value(u, v, prev),
            None => {
                eprintln!("advancing front: border edge without inside facet");
                (crate::reconstruction::criteria::NOT_VALID_CANDIDATE, None)
            }
        };
        self.create_border_edge_with(u, v, border_id, criteria, candidate)
    }

    /// Creates the border half-edge `u → v` with a fixed criteria value
    /// (post-processing retraction parks fresh edges in standby).
    pub(crate) fn create_border_edge_with(
        &mut self,
        u: VertexKey,
        v: VertexKey,
        border_id: u32,
        criteria: f64,
        candidate: Option<VertexKey>,
    ) -> BorderKey {
        let key = self.borders.insert(BorderElt {
            source: u,
            target: v,
            criteria,
            candidate,
            border_id,
        });
        if let Some(st) = self.state.get_mut(u) {
            st.add_border_edge(v, key);
        }
        if let Some(st) = self.state.get_mut(v) {
            st.exterior = false;
            st.interior = false;
        }
        self.queue.insert(criteria, key);
        key
    }

    /// Removes a border record, its queue entry, and its source registration.
    ///
    /// With `settle`, a source whose mark drops to zero is classified
    /// interior (its border was consumed by facet selection).
    pub(crate) fn remove_border_record(&mut self, key: BorderKey, settle: bool) {
        let Some(elt) = self.borders.remove(key) else {
            eprintln!("advancing front: removing a border edge that is not live");
            return;
        };
        self.queue.erase(elt.criteria, key);
        if let Some(st) = self.state.get_mut(elt.source) {
            if !st.remove_border_edge(key) {
                eprintln!("advancing front: border edge not found on its source vertex");
            }
            if settle && st.mark == 0 {
                st.interior = true;
                st.exterior = false;
            }
        }
    }

    /// Parks a deferred re-candidacy request for `edge` on `v`.
    pub(crate) fn register_incidence_request(&mut self, v: VertexKey, edge: BorderKey) {
        if let Some(st) = self.state.get_mut(v) {
            if !st.incidence_requests.contains(&edge) {
                st.incidence_requests.push(edge);
            }
        }
    }

    /// Replays the deferred requests parked on `v`: each still-live edge is
    /// re-scored and re-queued.
    pub(crate) fn flush_incidence_requests(&mut self, v: VertexKey) {
        let Some(st) = self.state.get_mut(v) else {
            return;
        };
        let requests = std::mem::take(&mut st.incidence_requests);
        for key in requests {
            let Some(elt) = self.borders.get(key) else {
                continue;
            };
            let (src, tgt, old) = (elt.source, elt.target, elt.criteria);
            self.queue.erase(old, key);
            let (criteria, candidate) = match self.inside_apex(src, tgt) {
                Some(prev) => self.compute_value(src, tgt, prev),
                None => (crate::reconstruction::criteria::NOT_VALID_CANDIDATE, None),
            };
            if let Some(elt) = self.borders.get_mut(key) {
                elt.criteria = criteria;
                elt.candidate = candidate;
            }
            self.queue.insert(criteria, key);
        }
    }

    /// Mean selected-facet area (running average).
    pub(crate) fn average_area(&self) -> f64 {
        if self.selected.is_empty() {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let n = self.selected.len() as f64;
            self.sum_area / n
        }
    }

    /// Mean selected-facet perimeter (running average).
    pub(crate) fn average_perimeter(&self) -> f64 {
        if self.selected.is_empty() {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let n = self.selected.len() as f64;
            self.sum_perimeter / n
        }
    }

    // =========================================================================
    // INVARIANT CHECKS (test support)
    // =========================================================================

    /// Checks the session's documented invariants: mark consistency, queue
    /// completeness (every live record queued exactly once XOR parked), queue
    /// entry freshness, and directed-edge/selection agreement.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        for (_, st) in &self.state {
            let edges = st.border_out.len();
            if st.mark != i32::try_from(edges).unwrap_or(i32::MAX) {
                return Err(InvariantViolation::MarkMismatch {
                    mark: st.mark,
                    edges,
                });
            }
        }
        for (key, elt) in &self.borders {
            let queued = self
                .queue
                .iter()
                .filter(|&(c, k)| k == key && c == elt.criteria)
                .count();
            let parked = self
                .state
                .iter()
                .filter(|(_, st)| st.incidence_requests.contains(&key))
                .count();
            if queued + parked != 1 {
                return Err(InvariantViolation::QueueCompleteness { queued, parked });
            }
        }
        for (criteria, key) in self.queue.iter() {
            let Some(elt) = self.borders.get(key) else {
                return Err(InvariantViolation::StaleQueueEntry);
            };
            if elt.criteria.to_bits() != criteria.to_bits() {
                return Err(InvariantViolation::StaleQueueEntry);
            }
        }
        if self.dir_edges.len() != 3 * self.selected.len() {
            return Err(InvariantViolation::DirectedEdgeMismatch {
                directed: self.dir_edges.len(),
                selected: self.selected.len(),
            });
        }
        Ok(())
    }
}

/// Convenience wrapper: reconstruct with default options.
///
/// # Errors
///
/// See [`AdvancingFrontSurfaceReconstruction::new`].
pub fn reconstruct_surface(
    points: &[Point],
) -> Result<AdvancingFrontSurfaceReconstruction, ReconstructionError> {
    AdvancingFrontSurfaceReconstruction::with_defaults(points)
}
