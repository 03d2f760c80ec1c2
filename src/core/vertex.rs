//! Triangulation vertices.
//!
//! A vertex owns its [`Point`] and a UUID for stable external identity. The
//! reconstruction algorithm's per-vertex bookkeeping (border maps, marks,
//! classification flags) lives in the reconstruction layer, keyed by
//! [`VertexKey`](crate::core::triangulation_data_structure::VertexKey), so the
//! triangulation element stays small.

use crate::geometry::point::{CoordinateValidationError, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during vertex validation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum VertexValidationError {
    /// The vertex has an invalid point.
    #[error("invalid point: {source}")]
    InvalidPoint {
        /// The underlying coordinate validation error.
        #[from]
        source: CoordinateValidationError,
    },
    /// The vertex UUID is nil.
    #[error("vertex UUID is nil")]
    NilUuid,
}

/// A triangulation vertex: a 3-D point plus a v4 UUID.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    point: Point,
    uuid: Uuid,
}

impl Vertex {
    /// Creates a vertex with a fresh v4 UUID.
    #[must_use]
    pub fn new(point: Point) -> Self {
        Self {
            point,
            uuid: Uuid::new_v4(),
        }
    }

    /// The vertex position.
    #[must_use]
    pub const fn point(&self) -> &Point {
        &self.point
    }

    /// The vertex UUID.
    #[must_use]
    pub const fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// Validates coordinates and UUID.
    ///
    /// # Errors
    ///
    /// Returns [`VertexValidationError`] if the point has non-finite
    /// coordinates or the UUID is nil.
    pub fn is_valid(&self) -> Result<(), VertexValidationError> {
        self.point.validate()?;
        if self.uuid.is_nil() {
            return Err(VertexValidationError::NilUuid);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_has_unique_uuid() {
        let a = Vertex::new(Point::new([0.0, 0.0, 0.0]));
        let b = Vertex::new(Point::new([0.0, 0.0, 0.0]));
        assert_ne!(a.uuid(), b.uuid());
        assert!(a.is_valid().is_ok());
    }

    #[test]
    fn vertex_invalid_point_detected() {
        let v = Vertex::new(Point::new([f64::NAN, 0.0, 0.0]));
        assert!(matches!(
            v.is_valid(),
            Err(VertexValidationError::InvalidPoint { .. })
        ));
    }
}
