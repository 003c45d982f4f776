//! Three-component vector algebra.
//!
//! [`Vec3`] is `glam::DVec3`; glam supplies construction, arithmetic, dot and
//! cross products, length and `normalize`. [`VectorExt`] adds the operations
//! steering code needs on top: projection onto a unit basis, length truncation
//! and the epsilon-tolerant predicates built on [`crate::scalar::EPSILON`].
//!
//! Every method here is pure and returns a fresh value.

use crate::scalar::{within_epsilon, EPSILON};

/// Double precision 3d vector.
pub type Vec3 = glam::DVec3;

/// Steering-oriented extensions to [`Vec3`].
///
/// Methods taking a `unit_basis` assume it has unit length; that precondition
/// is not checked.
pub trait VectorExt: Sized {
    /// Zero vector if `self` is (near) zero, otherwise `self / |self|`.
    #[must_use]
    fn normalize_or_0(self) -> Self;

    /// Unit vector and original length in one pass. Zero maps to `(0, 0)`.
    #[must_use]
    fn unit_and_length(self) -> (Self, f64);

    /// Unchanged if `|self| <= max_length`, otherwise rescaled to `max_length`.
    /// A vector with non-finite length truncates to zero.
    #[must_use]
    fn truncate_length(self, max_length: f64) -> Self;

    /// Component of `self` along `unit_basis`.
    #[must_use]
    fn parallel_component(self, unit_basis: Self) -> Self;

    /// Component of `self` orthogonal to `unit_basis`.
    #[must_use]
    fn perpendicular_component(self, unit_basis: Self) -> Self;

    /// `|self|^2` within [`EPSILON`] of 1.
    #[must_use]
    fn is_unit_length(self) -> bool;

    /// `|self|^2` within [`EPSILON`] of 0.
    #[must_use]
    fn is_zero_length(self) -> bool;

    /// Dot product with `other` within [`EPSILON`] of 0. Both should be unit.
    #[must_use]
    fn is_perpendicular(self, other: Self) -> bool;

    /// Dot product with `other` within [`EPSILON`] of 1. Both should be unit.
    #[must_use]
    fn is_parallel(self, other: Self) -> bool;

    /// Some unit vector perpendicular to `self`.
    #[must_use]
    fn find_perpendicular(self) -> Self;

    /// Componentwise equality within [`EPSILON`].
    #[must_use]
    fn is_equal_within_epsilon(self, other: Self) -> bool;

    /// Rotate `angle` radians about `axis` (right-hand rule).
    #[must_use]
    fn rotate_about_axis(self, axis: Self, angle: f64) -> Self;

    /// Rotate in the xy plane about the z axis.
    #[must_use]
    fn rotate_xy_about_z(self, angle: f64) -> Self;

    /// Rotate in the xz plane about the y axis.
    #[must_use]
    fn rotate_xz_about_y(self, angle: f64) -> Self;
}

impl VectorExt for Vec3 {
    fn normalize_or_0(self) -> Self {
        self.unit_and_length().0
    }

    fn unit_and_length(self) -> (Self, f64) {
        let length = self.length();
        if length > 0.0 && !within_epsilon(length * length, 0.0) {
            (self / length, length)
        } else {
            (Vec3::ZERO, 0.0)
        }
    }

    fn truncate_length(self, max_length: f64) -> Self {
        let length = self.length();
        if !length.is_finite() {
            Self::ZERO
        } else if length <= max_length {
            self
        } else {
            self * (max_length / length)
        }
    }

    fn parallel_component(self, unit_basis: Self) -> Self {
        unit_basis * self.dot(unit_basis)
    }

    fn perpendicular_component(self, unit_basis: Self) -> Self {
        self - self.parallel_component(unit_basis)
    }

    fn is_unit_length(self) -> bool {
        within_epsilon(self.length_squared(), 1.0)
    }

    fn is_zero_length(self) -> bool {
        within_epsilon(self.length_squared(), 0.0)
    }

    fn is_perpendicular(self, other: Self) -> bool {
        within_epsilon(self.dot(other), 0.0)
    }

    fn is_parallel(self, other: Self) -> bool {
        within_epsilon(self.dot(other), 1.0)
    }

    fn find_perpendicular(self) -> Self {
        let unit = self.normalize_or_0();
        let reference = if within_epsilon(unit.dot(Vec3::X).abs(), 1.0) {
            Vec3::Y
        } else {
            Vec3::X
        };
        unit.cross(reference).normalize_or_0()
    }

    fn is_equal_within_epsilon(self, other: Self) -> bool {
        let d = (self - other).abs();
        d.x <= EPSILON && d.y <= EPSILON && d.z <= EPSILON
    }

    fn rotate_about_axis(self, axis: Self, angle: f64) -> Self {
        let k = axis.normalize_or_0();
        let (sin, cos) = angle.sin_cos();
        self * cos + k.cross(self) * sin + k * (k.dot(self) * (1.0 - cos))
    }

    fn rotate_xy_about_z(self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Vec3::new(self.x * c + self.y * s, self.y * c - self.x * s, self.z)
    }

    fn rotate_xz_about_y(self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Vec3::new(self.x * c + self.z * s, self.y, self.z * c - self.x * s)
    }
}

/// Rotation vector: direction is the axis, length is the angle.
///
/// Zero angle or zero axis gives the zero vector.
#[must_use]
pub fn axis_angle(axis: Vec3, angle: f64) -> Vec3 {
    if angle != 0.0 && axis.length_squared() > 0.0 {
        axis.normalize() * angle
    } else {
        Vec3::ZERO
    }
}

/// Rotation vector that carries direction `from` onto direction `to`.
#[must_use]
pub fn rotate_vec_to_vec(from: Vec3, to: Vec3) -> Vec3 {
    axis_angle(from.cross(to), from.angle_between(to))
}

/// The longest of `vectors`; the first one wins ties. Empty input gives zero.
#[must_use]
pub fn longest(vectors: &[Vec3]) -> Vec3 {
    let mut best = Vec3::ZERO;
    let mut best_len = -1.0;
    for v in vectors {
        let len = v.length_squared();
        if len > best_len {
            best = *v;
            best_len = len;
        }
    }
    best
}
