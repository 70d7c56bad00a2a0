//! Bounding volumes and affine dimension of point sets.

use crate::geometry::point::Point;
use crate::geometry::predicates::{Orientation, orientation};

/// A ball enclosing a point set: the bounding-box center and the largest
/// distance from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBall {
    /// Center of the ball.
    pub center: Point,
    /// Radius of the ball; `0.0` for a single point.
    pub radius: f64,
}

impl BoundingBall {
    /// Smallest axis-aligned-box-centered ball containing every finite point.
    ///
    /// Returns `None` if there are no finite points.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use causal_dynamical_triangulations::geometry::point::Point;
    /// use causal_dynamical_triangulations::geometry::util::BoundingBall;
    ///
    /// let ball = BoundingBall::from_points(&[
    ///     Point::new([-1.0, 0.0, 0.0]),
    ///     Point::new([1.0, 0.0, 0.0]),
    /// ])
    /// .unwrap();
    /// assert_eq!(ball.center, Point::new([0.0, 0.0, 0.0]));
    /// assert!((ball.radius - 1.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
        I::IntoIter: Clone,
    {
        let points = points.into_iter().filter(|p| p.validate().is_ok());
        let mut lo = [f64::INFINITY; 3];
        let mut hi = [f64::NEG_INFINITY; 3];
        let mut any = false;
        for p in points.clone() {
            any = true;
            for axis in 0..3 {
                lo[axis] = lo[axis].min(p.coords()[axis]);
                hi[axis] = hi[axis].max(p.coords()[axis]);
            }
        }
        if !any {
            return None;
        }
        let center = Point::new([
            0.5 * (lo[0] + hi[0]),
            0.5 * (lo[1] + hi[1]),
            0.5 * (lo[2] + hi[2]),
        ]);
        let radius = points
            .map(|p| p.distance_squared(&center))
            .fold(0.0_f64, f64::max)
            .sqrt();
        Some(Self { center, radius })
    }

    /// Whether `point` lies in the closed ball.
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        point.distance_squared(&self.center) <= self.radius * self.radius
    }

    /// Whether `other` lies entirely inside this ball.
    #[must_use]
    pub fn encloses(&self, other: &Self) -> bool {
        other.center.distance_squared(&self.center).sqrt() + other.radius <= self.radius
    }

    /// The ball around the same center that also contains `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let reach = other.center.distance_squared(&self.center).sqrt() + other.radius;
        Self {
            center: self.center,
            radius: self.radius.max(reach),
        }
    }
}

/// Vertices of a regular tetrahedron centered at `center` whose inscribed
/// sphere has radius `inradius`.
///
/// # Examples
///
/// ```rust
/// use causal_dynamical_triangulations::geometry::point::Point;
/// use causal_dynamical_triangulations::geometry::util::bounding_tetrahedron;
///
/// let tet = bounding_tetrahedron(&Point::default(), 1.0);
/// let edge = tet[0].distance_squared(&tet[1]).sqrt();
/// // A regular tetrahedron with inradius 1 has edge length 2√6
/// assert!((edge - 2.0 * 6.0_f64.sqrt()).abs() < 1e-12);
/// ```
#[must_use]
pub fn bounding_tetrahedron(center: &Point, inradius: f64) -> [Point; 4] {
    let s = inradius * 3.0_f64.sqrt();
    let [cx, cy, cz] = *center.coords();
    [
        Point::new([cx + s, cy + s, cz + s]),
        Point::new([cx + s, cy - s, cz - s]),
        Point::new([cx - s, cy + s, cz - s]),
        Point::new([cx - s, cy - s, cz + s]),
    ]
}

/// Dimension of the affine hull of `points`: `-1` when empty, otherwise `0..=3`.
///
/// Exact: collinearity and coplanarity are decided with exact predicates.
#[must_use]
pub fn affine_dimension(points: &[Point]) -> i32 {
    let Some(first) = points.first() else {
        return -1;
    };
    let Some(second) = points.iter().find(|p| *p != first) else {
        return 0;
    };
    let Some(third) = points.iter().find(|p| !collinear(first, second, p)) else {
        return 1;
    };
    if points
        .iter()
        .any(|p| orientation(first, second, third, p) != Orientation::DEGENERATE)
    {
        3
    } else {
        2
    }
}

fn collinear(a: &Point, b: &Point, c: &Point) -> bool {
    // Collinear iff every axis-aligned projection is degenerate
    let project = |p: &Point, drop: usize| -> robust::Coord<f64> {
        let c = p.coords();
        let (x, y) = match drop {
            0 => (c[1], c[2]),
            1 => (c[0], c[2]),
            _ => (c[0], c[1]),
        };
        robust::Coord { x, y }
    };
    (0..3).all(|drop| robust::orient2d(project(a, drop), project(b, drop), project(c, drop)) == 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::predicates::InSphere;
    use crate::geometry::predicates::insphere;

    #[test]
    fn affine_dimension_grows_with_independent_points() {
        let o = Point::new([0.0, 0.0, 0.0]);
        let x = Point::new([1.0, 0.0, 0.0]);
        let x2 = Point::new([2.0, 0.0, 0.0]);
        let y = Point::new([0.0, 1.0, 0.0]);
        let z = Point::new([0.0, 0.0, 1.0]);
        assert_eq!(affine_dimension(&[]), -1);
        assert_eq!(affine_dimension(&[o, o]), 0);
        assert_eq!(affine_dimension(&[o, x, x2]), 1);
        assert_eq!(affine_dimension(&[o, x, x2, y]), 2);
        assert_eq!(affine_dimension(&[o, x, x2, y, z]), 3);
    }

    #[test]
    fn bounding_tetrahedron_encloses_its_ball() {
        let center = Point::new([1.0, -2.0, 3.0]);
        let tet = bounding_tetrahedron(&center, 10.0);
        // The circumsphere of a regular tetrahedron is three times its insphere
        let inside = Point::new([1.0, -2.0, 3.0 + 9.9]);
        assert_eq!(insphere(&tet, &inside), InSphere::INSIDE);
        for p in &tet {
            assert!((p.distance_squared(&center).sqrt() - 30.0).abs() < 1e-9);
        }
    }

    #[test]
    fn bounding_ball_union_contains_both() {
        let a = BoundingBall {
            center: Point::default(),
            radius: 1.0,
        };
        let b = BoundingBall {
            center: Point::new([5.0, 0.0, 0.0]),
            radius: 2.0,
        };
        let u = a.union(&b);
        assert!(u.encloses(&a) && u.encloses(&b));
        assert!(!a.encloses(&b));
        assert!(u.contains(&Point::new([7.0, 0.0, 0.0])));
        assert!(u.contains(&Point::new([-1.0, 0.0, 0.0])));
        assert!(BoundingBall::from_points(std::iter::empty()).is_none());
    }
}
