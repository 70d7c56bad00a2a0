//! Vertices of a 3D triangulation.
//!
//! A [`Vertex`] couples a fixed embedding [`Point`] with an optional `Copy`
//! payload. The payload is assigned when the vertex is created and is never
//! rewritten by the engine; the foliation layer stores the vertex time label
//! there.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::traits::data_type::DataType;
use crate::core::triangulation_data_structure::CellKey;
use crate::geometry::point::{Point, PointValidationError};

/// Errors that can occur during vertex validation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum VertexValidationError {
    /// The vertex has an invalid point.
    #[error("Invalid point: {source}")]
    InvalidPoint {
        /// The underlying point validation error.
        #[from]
        source: PointValidationError,
    },
}

/// Convenience macro for creating vertices with less boilerplate.
///
/// # Usage
///
/// ```rust
/// use causal_dynamical_triangulations::core::vertex::Vertex;
/// use causal_dynamical_triangulations::vertex;
///
/// // Without data
/// let v: Vertex<()> = vertex!([1.0, 2.0, 3.0]);
/// assert!(v.data.is_none());
///
/// // With a time label
/// let v: Vertex<u32> = vertex!([1.0, 0.0, 0.0], 1_u32);
/// assert_eq!(v.data, Some(1));
/// ```
#[macro_export]
macro_rules! vertex {
    ($coords:expr) => {
        $crate::core::vertex::VertexBuilder::<()>::default()
            .point($crate::geometry::point::Point::new($coords))
            .build()
            .expect("Failed to build vertex: invalid builder configuration")
    };

    ($coords:expr, $data:expr) => {
        $crate::core::vertex::VertexBuilder::default()
            .point($crate::geometry::point::Point::new($coords))
            .data($data)
            .build()
            .expect("Failed to build vertex with data: invalid builder configuration")
    };
}

pub use crate::vertex;

/// A vertex: an embedding point, an optional payload, and a back-pointer to
/// one incident cell maintained by the triangulation data structure.
#[derive(Builder, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Vertex<U>
where
    U: DataType,
{
    /// Embedding of the vertex in ℝ³.
    point: Point,
    /// Some cell containing this vertex, or `None` while the vertex is
    /// detached. Runtime-only; rebuilt by the triangulation.
    #[builder(setter(skip), default = "None")]
    #[serde(skip)]
    pub incident_cell: Option<CellKey>,
    /// Optional data associated with the vertex.
    #[builder(setter(into, strip_option), default)]
    #[serde(bound(deserialize = "U: DataType"))]
    pub data: Option<U>,
}

impl<U> Vertex<U>
where
    U: DataType,
{
    /// Creates a vertex at `point` carrying `data`.
    #[must_use]
    pub const fn new(point: Point, data: Option<U>) -> Self {
        Self {
            point,
            incident_cell: None,
            data,
        }
    }

    /// Creates payload-free vertices from a slice of points.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Vec<Self> {
        points.iter().map(|&p| Self::new(p, None)).collect()
    }

    /// The embedding point of this vertex.
    #[inline]
    #[must_use]
    pub const fn point(&self) -> &Point {
        &self.point
    }

    /// Validates the vertex coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`VertexValidationError::InvalidPoint`] if any coordinate is not finite.
    pub fn is_valid(&self) -> Result<(), VertexValidationError> {
        self.point.validate()?;
        Ok(())
    }
}

impl<U> PartialEq for Vertex<U>
where
    U: DataType,
{
    /// Vertices compare by position and payload; the incident cell is bookkeeping.
    fn eq(&self, other: &Self) -> bool {
        self.point == other.point && self.data == other.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_macro_with_and_without_data() {
        let plain: Vertex<()> = vertex!([0.0, 1.0, 2.0]);
        assert_eq!(plain.point().coords(), &[0.0, 1.0, 2.0]);
        assert!(plain.data.is_none());
        assert!(plain.incident_cell.is_none());

        let labelled: Vertex<u32> = vertex!([1.0, 1.0, 1.0], 7_u32);
        assert_eq!(labelled.data, Some(7));
    }

    #[test]
    fn vertex_equality_ignores_incident_cell() {
        let mut a: Vertex<u32> = vertex!([1.0, 2.0, 3.0], 1_u32);
        let b: Vertex<u32> = vertex!([1.0, 2.0, 3.0], 1_u32);
        a.incident_cell = Some(CellKey::default());
        assert_eq!(a, b);

        let c: Vertex<u32> = vertex!([1.0, 2.0, 3.0], 2_u32);
        assert_ne!(a, c);
    }

    #[test]
    fn vertex_validation_rejects_nan() {
        let v: Vertex<()> = Vertex::new(Point::new([f64::NAN, 0.0, 0.0]), None);
        assert!(matches!(
            v.is_valid(),
            Err(VertexValidationError::InvalidPoint { .. })
        ));
    }

    #[test]
    fn vertex_serialization_skips_incident_cell() {
        let mut v: Vertex<u32> = vertex!([0.5, 0.25, 0.0], 3_u32);
        v.incident_cell = Some(CellKey::default());
        let json = serde_json::to_string(&v).unwrap();
        assert!(!json.contains("incident_cell"));
        let back: Vertex<u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
        assert!(back.incident_cell.is_none());
    }

    #[test]
    fn from_points_creates_payload_free_vertices() {
        let points = [Point::new([0.0, 0.0, 0.0]), Point::new([1.0, 0.0, 0.0])];
        let vertices: Vec<Vertex<u32>> = Vertex::from_points(&points);
        assert_eq!(vertices.len(), 2);
        assert!(vertices.iter().all(|v| v.data.is_none()));
    }
}
