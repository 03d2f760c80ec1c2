//! Candidate quality values.
//!
//! The quality of a border edge's best extension candidate is a totally
//! ordered `f64`; lower is better and the queue always acts on the minimum.
//! The value encodes three regimes plus two sentinels:
//!
//! - `-(1 + 1/r²)` in `(-inf, -1)`: "good fold" candidates with a dihedral
//!   turn cosine above [`SLIVER_ANGULUS`]; smaller Delaunay spheres win.
//! - `-cos θ` in `[-1, 1]`: candidates ranked by dihedral angle, used when
//!   the candidate's sphere is within `K` times the current facet's.
//! - [`STANDBY_CANDIDATE`] / [`STANDBY_CANDIDATE_BIS`]: the best candidate
//!   fails the uniformity test at the current `K`; the edge waits for `K` to
//!   grow. `BIS` marks edges already retried once at this `K`.
//! - [`NOT_VALID_CANDIDATE`]: no admissible candidate at all.
//!
//! The first regime is strictly below the second, so well-folded extensions
//! always outrank dihedral-ranked ones regardless of radius.

/// Dihedral turn-cosine threshold separating "good fold" candidates from
/// sliver-suspect ones. A fixed sampling-quality constant.
pub const SLIVER_ANGULUS: f64 = 0.86;

/// Quality of an edge whose best candidate fails the uniformity test.
pub const STANDBY_CANDIDATE: f64 = 2.0;

/// Quality of a standby edge already retried once at the current `K`.
pub const STANDBY_CANDIDATE_BIS: f64 = 3.0;

/// Quality of an edge with no admissible candidate.
pub const NOT_VALID_CANDIDATE: f64 = 5.0;

/// Whether a quality value can be acted on immediately.
#[inline]
#[must_use]
pub fn is_actionable(criteria: f64) -> bool {
    criteria < STANDBY_CANDIDATE
}

/// Whether a quality value is one of the standby sentinels.
#[inline]
#[must_use]
pub fn is_standby(criteria: f64) -> bool {
    (STANDBY_CANDIDATE..NOT_VALID_CANDIDATE).contains(&criteria)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regimes_are_totally_ordered() {
        let good_fold = -(1.0 + 1.0 / 0.5); // r² = 0.5
        let dihedral = -0.3;
        assert!(good_fold < -1.0);
        assert!(good_fold < dihedral);
        assert!(dihedral < STANDBY_CANDIDATE);
        assert!(STANDBY_CANDIDATE < STANDBY_CANDIDATE_BIS);
        assert!(STANDBY_CANDIDATE_BIS < NOT_VALID_CANDIDATE);
    }

    #[test]
    fn classification_helpers() {
        assert!(is_actionable(-2.5));
        assert!(is_actionable(1.0));
        assert!(!is_actionable(STANDBY_CANDIDATE));
        assert!(is_standby(STANDBY_CANDIDATE));
        assert!(is_standby(STANDBY_CANDIDATE_BIS));
        assert!(!is_standby(NOT_VALID_CANDIDATE));
        assert!(!is_standby(-1.0));
    }
}
