//! Border-edge records and per-vertex augmentation.
//!
//! The advancing front is a set of *directed* border half-edges. An edge
//! `u → v` means `v` is `u`'s successor along an open boundary loop, with the
//! reconstructed surface on the left. Each live half-edge owns exactly one
//! [`BorderElt`] in an arena keyed by [`BorderKey`]; vertices reference
//! records through these stable handles, never through pointers, so the
//! cyclic vertex/record structure stays safe to mutate.

use crate::core::triangulation_data_structure::VertexKey;
use slotmap::new_key_type;
use smallvec::SmallVec;

new_key_type! {
    /// Stable handle of a border-edge record in the session arena.
    pub struct BorderKey;
}

/// One live border half-edge: endpoints, current quality, the chosen
/// extension candidate, and the loop tag it was created under.
#[derive(Clone, Debug)]
pub struct BorderElt {
    /// Source vertex (the half-edge is `source → target`).
    pub source: VertexKey,
    /// Target vertex.
    pub target: VertexKey,
    /// Current quality value keyed into the ordered queue.
    pub criteria: f64,
    /// Apex of the best extension facet, if any admissible candidate exists.
    pub candidate: Option<VertexKey>,
    /// Tag of the border loop this edge was created on.
    pub border_id: u32,
}

/// Per-vertex reconstruction state, stored in a `SecondaryMap` next to the
/// triangulation's vertices.
#[derive(Clone, Debug, Default)]
pub struct VertexState {
    /// Number of live border half-edges with this vertex as source.
    /// 0 = interior or exterior, 1 = normal border vertex, 2 = transient
    /// pinch during a connecting-case resolution.
    pub mark: i32,
    /// Outgoing border half-edges: `(target, record)`.
    pub border_out: SmallVec<[(VertexKey, BorderKey); 2]>,
    /// Deferred re-candidacy requests, replayed when this vertex's border
    /// topology changes.
    pub incidence_requests: SmallVec<[BorderKey; 2]>,
    /// Epoch stamp for boundary sweeps (post-processing, loop walks).
    pub post_mark: u32,
    /// Never been part of the surface (available for re-seeding).
    pub exterior: bool,
    /// Settled interior vertex: all incident border edges were consumed.
    pub interior: bool,
}

impl VertexState {
    /// Fresh state for a vertex that has not touched the surface yet.
    #[must_use]
    pub fn fresh() -> Self {
        Self {
            exterior: true,
            ..Self::default()
        }
    }

    /// Whether the vertex currently lies on an open border.
    #[must_use]
    pub fn is_on_border(&self) -> bool {
        self.mark > 0
    }

    /// Availability test: the vertex may still receive facets.
    #[must_use]
    pub fn not_interior(&self) -> bool {
        !self.interior
    }

    /// The record of the outgoing half-edge toward `target`, if any.
    #[must_use]
    pub fn border_edge_to(&self, target: VertexKey) -> Option<BorderKey> {
        self.border_out
            .iter()
            .find_map(|&(t, k)| (t == target).then_some(k))
    }

    /// First outgoing border successor, if any.
    #[must_use]
    pub fn first_border_successor(&self) -> Option<VertexKey> {
        self.border_out.first().map(|&(t, _)| t)
    }

    /// Registers an outgoing half-edge.
    pub fn add_border_edge(&mut self, target: VertexKey, key: BorderKey) {
        self.border_out.push((target, key));
        self.mark += 1;
        self.exterior = false;
        self.interior = false;
    }

    /// Unregisters an outgoing half-edge. Returns whether it was present.
    pub fn remove_border_edge(&mut self, key: BorderKey) -> bool {
        let before = self.border_out.len();
        self.border_out.retain(|&mut (_, k)| k != key);
        let removed = self.border_out.len() < before;
        if removed {
            self.mark -= 1;
        }
        removed
    }
}
