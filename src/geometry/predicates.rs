//! Exact orientation and in-sphere predicates for tetrahedra.
//!
//! Both predicates delegate to Shewchuk's adaptive-precision arithmetic (via the
//! `robust` crate), so the returned signs are exact for any finite `f64` input.
//! Degenerate configurations are reported as such rather than being resolved by
//! a tolerance.

use crate::geometry::point::Point;

/// Represents the position of a point relative to a circumsphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InSphere {
    /// The point is outside the circumsphere
    OUTSIDE,
    /// The point is exactly on the circumsphere
    BOUNDARY,
    /// The point is inside the circumsphere
    INSIDE,
}

impl std::fmt::Display for InSphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OUTSIDE => write!(f, "OUTSIDE"),
            Self::BOUNDARY => write!(f, "BOUNDARY"),
            Self::INSIDE => write!(f, "INSIDE"),
        }
    }
}

/// Represents the orientation of a tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// The tetrahedron has negative orientation
    NEGATIVE,
    /// The four points are coplanar
    DEGENERATE,
    /// The tetrahedron has positive orientation
    POSITIVE,
}

impl Orientation {
    /// The opposite orientation (`DEGENERATE` maps to itself).
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::NEGATIVE => Self::POSITIVE,
            Self::DEGENERATE => Self::DEGENERATE,
            Self::POSITIVE => Self::NEGATIVE,
        }
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

/// Orientation of the tetrahedron `(a, b, c, d)`.
///
/// `POSITIVE` means `d` lies below the plane through `a`, `b`, `c` when those
/// three appear counterclockwise seen from above. Cells of the triangulation are
/// always stored with `POSITIVE` orientation.
///
/// # Examples
///
/// ```rust
/// use causal_dynamical_triangulations::geometry::point::Point;
/// use causal_dynamical_triangulations::geometry::predicates::{Orientation, orientation};
///
/// let a = Point::new([0.0, 0.0, 0.0]);
/// let b = Point::new([1.0, 0.0, 0.0]);
/// let c = Point::new([0.0, 1.0, 0.0]);
/// let below = Point::new([0.0, 0.0, -1.0]);
/// assert_eq!(orientation(&a, &b, &c, &below), Orientation::POSITIVE);
/// assert_eq!(orientation(&a, &b, &below, &c), Orientation::NEGATIVE);
/// ```
#[must_use]
pub fn orientation(a: &Point, b: &Point, c: &Point, d: &Point) -> Orientation {
    let det = robust::orient3d(a.to_robust(), b.to_robust(), c.to_robust(), d.to_robust());
    if det > 0.0 {
        Orientation::POSITIVE
    } else if det < 0.0 {
        Orientation::NEGATIVE
    } else {
        Orientation::DEGENERATE
    }
}

/// Orientation of a tetrahedron given as an array of its four corners.
#[inline]
#[must_use]
pub fn simplex_orientation(points: &[Point; 4]) -> Orientation {
    orientation(&points[0], &points[1], &points[2], &points[3])
}

/// Position of `test` relative to the circumsphere of the tetrahedron `simplex`.
///
/// The tetrahedron may have either orientation; the sign is corrected
/// internally. A degenerate (flat) tetrahedron has no circumsphere and always
/// reports `OUTSIDE`.
///
/// # Examples
///
/// ```rust
/// use causal_dynamical_triangulations::geometry::point::Point;
/// use causal_dynamical_triangulations::geometry::predicates::{InSphere, insphere};
///
/// let tet = [
///     Point::new([1.0, 0.0, 0.0]),
///     Point::new([-1.0, 0.0, 0.0]),
///     Point::new([0.0, 1.0, 0.0]),
///     Point::new([0.0, 0.0, 1.0]),
/// ];
/// assert_eq!(insphere(&tet, &Point::new([0.0, 0.0, 0.0])), InSphere::INSIDE);
/// assert_eq!(insphere(&tet, &Point::new([0.0, -1.0, 0.0])), InSphere::BOUNDARY);
/// assert_eq!(insphere(&tet, &Point::new([3.0, 3.0, 3.0])), InSphere::OUTSIDE);
/// ```
#[must_use]
pub fn insphere(simplex: &[Point; 4], test: &Point) -> InSphere {
    let sign = match simplex_orientation(simplex) {
        Orientation::POSITIVE => 1.0,
        Orientation::NEGATIVE => -1.0,
        Orientation::DEGENERATE => return InSphere::OUTSIDE,
    };
    let det = sign
        * robust::insphere(
            simplex[0].to_robust(),
            simplex[1].to_robust(),
            simplex[2].to_robust(),
            simplex[3].to_robust(),
            test.to_robust(),
        );
    if det > 0.0 {
        InSphere::INSIDE
    } else if det < 0.0 {
        InSphere::OUTSIDE
    } else {
        InSphere::BOUNDARY
    }
}

/// In-sphere test for a tetrahedron already known to be positively oriented.
///
/// Skips the orientation evaluation of [`insphere`]; used on the hot insertion
/// path where every stored cell is positive by construction.
#[inline]
#[must_use]
pub(crate) fn insphere_positive(simplex: &[Point; 4], test: &Point) -> InSphere {
    let det = robust::insphere(
        simplex[0].to_robust(),
        simplex[1].to_robust(),
        simplex[2].to_robust(),
        simplex[3].to_robust(),
        test.to_robust(),
    );
    if det > 0.0 {
        InSphere::INSIDE
    } else if det < 0.0 {
        InSphere::OUTSIDE
    } else {
        InSphere::BOUNDARY
    }
}
