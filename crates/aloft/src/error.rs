//! Errors raised when constructing geometry from invalid parameters.

use thiserror::Error;

use crate::vector::Vec3;

/// Invalid shape or obstacle parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A radius must be finite and strictly positive.
    #[error("radius must be finite and positive, got {0}")]
    InvalidRadius(f64),

    /// A direction (plane normal, cylinder axis) had zero length.
    #[error("direction vector {0} has zero length")]
    DegenerateDirection(Vec3),

    /// A point or direction contained NaN or infinity.
    #[error("non-finite vector {0}")]
    NonFinite(Vec3),
}

/// Reject NaN and infinite components.
pub(crate) fn require_finite(v: Vec3) -> Result<Vec3, GeometryError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(GeometryError::NonFinite(v))
    }
}

/// Reject non-positive or non-finite radii.
pub(crate) fn require_radius(radius: f64) -> Result<f64, GeometryError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(GeometryError::InvalidRadius(radius))
    }
}
