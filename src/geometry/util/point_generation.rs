//! Random point generation on spheres.
//!
//! Sampling draws `z` uniformly from `[-1, 1]` and the azimuth uniformly from
//! `[0, 2π)`; by Archimedes' hat-box theorem this is uniform on the sphere
//! surface. The random source is always supplied by the caller so that
//! generation is reproducible under a seeded RNG.

use rand::Rng;
use std::f64::consts::TAU;

use crate::geometry::point::Point;

use super::RandomPointGenerationError;

/// Generate `n_points` points uniformly distributed on the sphere of the given
/// `radius` centred at the origin.
///
/// # Errors
///
/// Returns [`RandomPointGenerationError::InvalidRadius`] if `radius` is not a
/// positive finite number.
///
/// # Examples
///
/// ```rust
/// use causal_dynamical_triangulations::geometry::util::generate_points_on_sphere;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let points = generate_points_on_sphere(100, 2.0, &mut rng).unwrap();
/// assert_eq!(points.len(), 100);
/// assert!(points.iter().all(|p| (p.norm() - 2.0).abs() < 1e-9));
///
/// // Zero points is not an error
/// assert!(generate_points_on_sphere(0, 1.0, &mut rng).unwrap().is_empty());
///
/// // A non-positive radius is
/// assert!(generate_points_on_sphere(10, -1.0, &mut rng).is_err());
/// ```
pub fn generate_points_on_sphere<R: Rng + ?Sized>(
    n_points: usize,
    radius: f64,
    rng: &mut R,
) -> Result<Vec<Point>, RandomPointGenerationError> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(RandomPointGenerationError::InvalidRadius {
            radius: format!("{radius:?}"),
        });
    }

    let mut points = Vec::with_capacity(n_points);
    for _ in 0..n_points {
        let z: f64 = rng.random_range(-1.0..=1.0);
        let theta: f64 = rng.random_range(0.0..TAU);
        let r = (1.0 - z * z).max(0.0).sqrt();
        points.push(Point::new([
            radius * r * theta.cos(),
            radius * r * theta.sin(),
            radius * z,
        ]));
    }

    Ok(points)
}
