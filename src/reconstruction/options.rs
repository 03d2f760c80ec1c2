//! Configuration of a reconstruction run.

use serde::{Deserialize, Serialize};

/// Tuning knobs for [`AdvancingFrontSurfaceReconstruction`].
///
/// The defaults reconstruct well-sampled clouds without any tuning. Every
/// threshold set to `0.0` (or `0` for [`nb_border_max`]) disables the
/// corresponding check.
///
/// [`AdvancingFrontSurfaceReconstruction`]: crate::reconstruction::front::AdvancingFrontSurfaceReconstruction
/// [`nb_border_max`]: AfsrOptions::nb_border_max
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AfsrOptions {
    /// Border-sampling quality bound. A candidate whose smallest Delaunay
    /// sphere squared radius exceeds `squared_edge_length / delta²` marks the
    /// whole edge as having no valid candidate.
    pub delta: f64,
    /// Initial value of the uniformity parameter `K` for each component.
    pub k_init: f64,
    /// Minimal growth of `K` per stalled round.
    pub k_step: f64,
    /// Ceiling for `K`; reaching it ends a component's growth.
    pub k_max: f64,
    /// Relative area bound: candidates larger than `area x` the running
    /// average are rejected (active once more than 1000 facets are selected).
    pub area: f64,
    /// Relative perimeter bound, like [`area`](AfsrOptions::area).
    pub perimeter: f64,
    /// Absolute candidate area bound.
    pub abs_area: f64,
    /// Absolute candidate perimeter bound; also filters re-seed facets.
    pub abs_perimeter: f64,
    /// Post-processing border-cycle length cap. `0` disables post-processing.
    pub nb_border_max: usize,
    /// Cap on the number of connected components grown; negative = unlimited.
    pub max_connected_comp: i64,
    /// Policy switch: allow the plain extension case to split a border onto
    /// itself when the apex lies on the same border loop. The original
    /// algorithm documents both behaviors without resolving them; off by
    /// default.
    pub allow_same_border_split: bool,
}

impl Default for AfsrOptions {
    fn default() -> Self {
        Self {
            delta: 0.86,
            k_init: 1.1,
            k_step: 0.1,
            k_max: 5.0,
            area: 0.0,
            perimeter: 0.0,
            abs_area: 0.0,
            abs_perimeter: 0.0,
            nb_border_max: 15,
            max_connected_comp: -1,
            allow_same_border_split: false,
        }
    }
}

impl AfsrOptions {
    /// Default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `K` schedule.
    #[must_use]
    pub const fn with_k_schedule(mut self, k_init: f64, k_step: f64, k_max: f64) -> Self {
        self.k_init = k_init;
        self.k_step = k_step;
        self.k_max = k_max;
        self
    }

    /// Sets the border-sampling bound `delta`.
    #[must_use]
    pub const fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    /// Sets the post-processing border-cycle cap (`0` disables).
    #[must_use]
    pub const fn with_nb_border_max(mut self, nb_border_max: usize) -> Self {
        self.nb_border_max = nb_border_max;
        self
    }

    /// Caps the number of connected components (negative = unlimited).
    #[must_use]
    pub const fn with_max_connected_components(mut self, max: i64) -> Self {
        self.max_connected_comp = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_permissive() {
        let o = AfsrOptions::default();
        assert_eq!(o.abs_area, 0.0);
        assert_eq!(o.abs_perimeter, 0.0);
        assert!(o.max_connected_comp < 0);
        assert!(!o.allow_same_border_split);
    }

    #[test]
    fn builder_style_setters() {
        let o = AfsrOptions::new()
            .with_k_schedule(1.0, 0.2, 8.0)
            .with_delta(0.5)
            .with_nb_border_max(0)
            .with_max_connected_components(2);
        assert_eq!(o.k_max, 8.0);
        assert_eq!(o.delta, 0.5);
        assert_eq!(o.nb_border_max, 0);
        assert_eq!(o.max_connected_comp, 2);
    }
}
