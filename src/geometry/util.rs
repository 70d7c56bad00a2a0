//! Geometric utility functions.
//!
//! Point-set generators used to seed foliated triangulations, bounding
//! volumes for point sets, and the error type they share.

pub mod bounding;
pub mod point_generation;

pub use bounding::*;
pub use point_generation::*;

/// Errors that can occur during random point generation.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum RandomPointGenerationError {
    /// The sphere radius was not a positive finite number.
    #[error("Invalid sphere radius {radius}: must be positive and finite")]
    InvalidRadius {
        /// The rejected radius, rendered for the error message.
        radius: String,
    },
    /// The sphere radius cannot be represented as an integer time label.
    #[error("Sphere radius {radius} cannot be truncated to a time label")]
    UnrepresentableLabel {
        /// The rejected radius, rendered for the error message.
        radius: String,
    },
}
