//! Labelled spatial slices: random points on a 2-sphere tagged with the
//! slice's time label.

use num_traits::cast::ToPrimitive;
use rand::Rng;

use crate::cdt::traits::TimeLabel;
use crate::geometry::point::Point;
use crate::geometry::util::{RandomPointGenerationError, generate_points_on_sphere};

/// Generates `count` points uniformly on the sphere of the given `radius`
/// centred at the origin, each labelled `trunc(radius)`.
///
/// # Errors
///
/// Returns [`RandomPointGenerationError::InvalidRadius`] for a non-positive or
/// non-finite radius, and [`RandomPointGenerationError::UnrepresentableLabel`]
/// if `trunc(radius)` does not fit a [`TimeLabel`].
///
/// # Examples
///
/// ```rust
/// use causal_dynamical_triangulations::cdt::sphere::make_2_sphere;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let mut rng = StdRng::seed_from_u64(1);
/// let slice = make_2_sphere(16, 3.0, &mut rng).unwrap();
/// assert_eq!(slice.len(), 16);
/// assert!(slice.iter().all(|&(_, label)| label == 3));
/// ```
pub fn make_2_sphere<R: Rng + ?Sized>(
    count: usize,
    radius: f64,
    rng: &mut R,
) -> Result<Vec<(Point, TimeLabel)>, RandomPointGenerationError> {
    let points = generate_points_on_sphere(count, radius, rng)?;
    let label = radius
        .trunc()
        .to_u32()
        .ok_or_else(|| RandomPointGenerationError::UnrepresentableLabel {
            radius: format!("{radius:?}"),
        })?;
    Ok(points.into_iter().map(|p| (p, label)).collect())
}
