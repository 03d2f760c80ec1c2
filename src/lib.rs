//! # advancing-front
//!
//! Advancing-front surface reconstruction of 3-D point clouds, inspired by
//! [CGAL](https://www.cgal.org)'s `Advancing_front_surface_reconstruction`
//! package.
//!
//! The algorithm builds the Delaunay triangulation of the input cloud and
//! grows a triangulated surface through it facet by facet: an ordered queue
//! of open border edges always extends the best-scored edge next, where a
//! candidate facet's score combines the radius of its *smallest Delaunay
//! sphere* with the dihedral turn it takes from the facet it extends. Growth
//! is monotone (facets are only ever added); when it stalls, a bounded
//! plausibility parameter `K` is relaxed step by step, and an optional
//! post-processing stage removes outlier vertices and reopens small holes so
//! the front can close over them.
//!
//! # Basic usage
//!
//! ```rust
//! use advancing_front::prelude::*;
//!
//! // A well-sampled sphere reconstructs to a closed surface.
//! let points = fibonacci_sphere(80, 1.0, [0.0; 3]);
//! let afs = AdvancingFrontSurfaceReconstruction::with_defaults(&points).unwrap();
//!
//! assert_eq!(afs.number_of_connected_components(), 1);
//! assert_eq!(afs.number_of_border_edges(), 0);
//! assert_eq!(afs.number_of_vertices(), 80);
//!
//! // The exported surface is a watertight face graph.
//! let surface = afs.tds_2();
//! assert_eq!(surface.number_of_surface_faces(), afs.number_of_facets());
//! ```
//!
//! # Tuning
//!
//! [`AfsrOptions`](reconstruction::options::AfsrOptions) controls the run:
//! the `K` schedule, the border-sampling bound `delta`, absolute and
//! relative facet size bounds, the post-processing hole-size cap, and the
//! connected-component budget.
//!
//! ```rust
//! use advancing_front::prelude::*;
//!
//! let points = fibonacci_sphere(50, 1.0, [0.0; 3]);
//! let options = AfsrOptions::new()
//!     .with_k_schedule(1.2, 0.2, 6.0)
//!     .with_nb_border_max(0); // keep every input point
//! let afs = AdvancingFrontSurfaceReconstruction::new(&points, options).unwrap();
//! assert_eq!(afs.number_of_outliers(), 0);
//! ```
//!
//! # Boundaries and outliers
//!
//! Open surfaces keep their boundary loops iterable through
//! [`boundaries`](reconstruction::front::AdvancingFrontSurfaceReconstruction::boundaries);
//! points removed by post-processing are reported through
//! [`outliers`](reconstruction::front::AdvancingFrontSurfaceReconstruction::outliers).
//!
//! # Guarantees
//!
//! - The reconstructed surface is a subcomplex of the Delaunay triangulation
//!   with coherent orientation: every shared edge is traversed in opposite
//!   directions by its two facets.
//! - Border loops are simple cycles; every border vertex has exactly one
//!   outgoing and one incoming border half-edge in the final state.
//! - Construction either succeeds with these invariants intact or fails with
//!   an explicit [`ReconstructionError`](reconstruction::front::ReconstructionError);
//!   inputs that triangulate but resist reconstruction yield an empty or
//!   partial surface, never a panic.

#![forbid(unsafe_code)]

/// Core data structures: the 3-D triangulation storage and its construction
/// algorithm.
pub mod core {
    /// Structural mutation algorithms.
    pub mod algorithms {
        pub mod bowyer_watson;
    }
    pub mod cell;
    pub mod collections;
    pub mod facet;
    pub mod triangulation_data_structure;
    pub mod vertex;

    pub use cell::*;
    pub use facet::*;
    pub use triangulation_data_structure::*;
    pub use vertex::*;
}

/// Geometric primitives and predicates.
pub mod geometry {
    pub mod circumsphere;
    pub mod point;
    pub mod point_generation;
    pub mod predicates;

    pub use circumsphere::*;
    pub use point::*;
    pub use predicates::*;
}

/// The advancing-front reconstruction itself.
pub mod reconstruction {
    pub mod border;
    pub mod candidate;
    pub mod criteria;
    pub mod front;
    pub mod growth;
    pub mod options;
    pub mod planar;
    pub mod postprocess;
    pub mod queue;
    pub mod surface;

    pub use border::*;
    pub use front::*;
    pub use growth::ValidationCase;
    pub use options::*;
    pub use queue::*;
    pub use surface::*;
}

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::core::algorithms::bowyer_watson::DelaunayTriangulation;
    pub use crate::core::collections::{FastHashMap, FastHashSet};
    pub use crate::core::facet::{EdgeKey, FacetKey};
    pub use crate::core::triangulation_data_structure::{
        Tds, TriangulationConstructionError, VertexKey,
    };
    pub use crate::geometry::circumsphere::*;
    pub use crate::geometry::point::Point;
    pub use crate::geometry::point_generation::{fibonacci_sphere, jittered_disc, random_ball};
    pub use crate::geometry::predicates::*;
    pub use crate::reconstruction::criteria::{
        NOT_VALID_CANDIDATE, SLIVER_ANGULUS, STANDBY_CANDIDATE, STANDBY_CANDIDATE_BIS,
    };
    pub use crate::reconstruction::front::{
        reconstruct_surface, AdvancingFrontSurfaceReconstruction, ReconstructionError,
    };
    pub use crate::reconstruction::options::AfsrOptions;
    pub use crate::reconstruction::surface::{Boundaries, BoundaryLoop, SurfaceFace, Tds2};
}
