//! Canonical facet and edge identities.
//!
//! A [`FacetKey`] is the canonical identity of a facet: its three vertex
//! keys in sorted order. Reconstruction state (selection tables, memoized
//! radii) is keyed by `FacetKey` so that it survives re-triangulation after
//! point removal, when cell handles are recycled but vertex keys are stable.
//! [`EdgeKey`] is the analogous sorted pair for undirected edges.

use crate::core::triangulation_data_structure::VertexKey;
use serde::{Deserialize, Serialize};

/// Canonical facet identity: three vertex keys, sorted.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FacetKey([VertexKey; 3]);

impl FacetKey {
    /// Builds the canonical key of the facet `{a, b, c}`.
    #[must_use]
    pub fn new(a: VertexKey, b: VertexKey, c: VertexKey) -> Self {
        let mut verts = [a, b, c];
        verts.sort_unstable();
        Self(verts)
    }

    /// The sorted vertex keys.
    #[must_use]
    pub const fn vertices(&self) -> [VertexKey; 3] {
        self.0
    }

    /// Whether the facet is incident to `v`.
    #[must_use]
    pub fn contains(&self, v: VertexKey) -> bool {
        self.0.contains(&v)
    }
}

/// Canonical identity of an undirected edge: both vertex keys, sorted.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey(VertexKey, VertexKey);

impl EdgeKey {
    /// Builds the canonical key of the edge `{a, b}`.
    #[must_use]
    pub fn new(a: VertexKey, b: VertexKey) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// The two endpoints in canonical order.
    #[must_use]
    pub const fn endpoints(&self) -> (VertexKey, VertexKey) {
        (self.0, self.1)
    }

    /// Whether the edge is incident to `v`.
    #[must_use]
    pub fn contains(&self, v: VertexKey) -> bool {
        self.0 == v || self.1 == v
    }
}
