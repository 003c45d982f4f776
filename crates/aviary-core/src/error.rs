//! Error types for flock construction and configuration.
//!
//! Only construction can fail. Numeric trouble inside a running step is
//! handled in place (see [`crate::agent::FrameUpdate`]) and never surfaces
//! here.

use aloft::GeometryError;
use thiserror::Error;

use crate::boid::BoidId;

/// A tuning value outside its allowed range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Value must be finite and strictly positive.
    #[error("{field} must be finite and > 0, got {value}")]
    NotPositive {
        /// Offending field
        field: &'static str,
        /// Rejected value
        value: f64,
    },

    /// Value must be finite and not negative.
    #[error("{field} must be finite and >= 0, got {value}")]
    Negative {
        /// Offending field
        field: &'static str,
        /// Rejected value
        value: f64,
    },

    /// Value must lie in a closed interval.
    #[error("{field} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        /// Offending field
        field: &'static str,
        /// Rejected value
        value: f64,
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// At least one neighbor must be considered.
    #[error("neighbor_count must be at least 1")]
    ZeroNeighborCount,
}

/// Failure to build or extend a [`crate::Flock`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlockError {
    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Containment or obstacle geometry could not be built.
    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),

    /// A boid with this id is already in the flock.
    #[error("boid {0} is already in the flock")]
    DuplicateBoid(BoidId),
}

// ============================================================================
// Validation helpers
// ============================================================================

pub(crate) fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

pub(crate) fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
