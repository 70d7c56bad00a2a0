//! Points in three-dimensional Euclidean space.
//!
//! Every vertex of a foliated triangulation is embedded in ℝ³; the time label
//! lives on the vertex, not on the point. Points are immutable once created.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised when building a [`Point`] from raw coordinates.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum PointValidationError {
    /// A coordinate was `NaN` or infinite.
    #[error("Invalid coordinate at index {coordinate_index}: {coordinate_value} is not finite")]
    NonFiniteCoordinate {
        /// Index of the offending coordinate.
        coordinate_index: usize,
        /// The offending value, rendered for the error message.
        coordinate_value: String,
    },
}

/// A point in ℝ³ with `f64` coordinates.
///
/// # Examples
///
/// ```rust
/// use causal_dynamical_triangulations::geometry::point::Point;
///
/// let p = Point::new([1.0, 2.0, 3.0]);
/// assert_eq!(p.coords(), &[1.0, 2.0, 3.0]);
/// assert!((p.norm() - 14.0_f64.sqrt()).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    coords: [f64; 3],
}

impl Point {
    /// Creates a point from its coordinates.
    #[inline]
    #[must_use]
    pub const fn new(coords: [f64; 3]) -> Self {
        Self { coords }
    }

    /// Returns the point's coordinates.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> &[f64; 3] {
        &self.coords
    }

    /// Euclidean distance from the origin.
    #[must_use]
    pub fn norm(&self) -> f64 {
        let [x, y, z] = self.coords;
        z.hypot(x.hypot(y))
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// Checks that every coordinate is finite.
    ///
    /// # Errors
    ///
    /// Returns [`PointValidationError::NonFiniteCoordinate`] for the first
    /// coordinate that is `NaN` or infinite.
    pub fn validate(&self) -> Result<(), PointValidationError> {
        for (coordinate_index, value) in self.coords.iter().enumerate() {
            if !value.is_finite() {
                return Err(PointValidationError::NonFiniteCoordinate {
                    coordinate_index,
                    coordinate_value: format!("{value:?}"),
                });
            }
        }
        Ok(())
    }

    pub(crate) const fn to_robust(self) -> robust::Coord3D<f64> {
        let [x, y, z] = self.coords;
        robust::Coord3D { x, y, z }
    }
}

impl From<[f64; 3]> for Point {
    fn from(coords: [f64; 3]) -> Self {
        Self::new(coords)
    }
}

impl From<Point> for [f64; 3] {
    fn from(point: Point) -> Self {
        point.coords
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x, y, z] = self.coords;
        write!(f, "{x} {y} {z}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn point_norm_and_distance() {
        let p = Point::new([3.0, 4.0, 12.0]);
        assert_relative_eq!(p.norm(), 13.0);
        assert_relative_eq!(p.distance_squared(&Point::default()), 169.0);
    }

    #[test]
    fn point_rejects_non_finite_coordinates() {
        let p = Point::new([0.0, f64::NAN, 1.0]);
        let err = p.validate().unwrap_err();
        assert!(matches!(
            err,
            PointValidationError::NonFiniteCoordinate {
                coordinate_index: 1,
                ..
            }
        ));
        assert!(Point::new([1.0, 2.0, 3.0]).validate().is_ok());
    }

    #[test]
    fn point_display_is_space_separated() {
        assert_eq!(Point::new([1.0, -2.5, 0.0]).to_string(), "1 -2.5 0");
    }

    #[test]
    fn point_serde_roundtrip() {
        let p = Point::new([0.25, 0.5, 0.75]);
        let json = serde_json::to_string(&p).unwrap();
        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
