//! Local coordinate spaces.
//!
//! A [`LocalSpace`] is a right-handed orthonormal basis (side, up, forward)
//! plus a position. Agents carry one as their pose. Orientation is never
//! rotated incrementally; each update rebuilds the basis from a new forward
//! and a reference up direction, which keeps it from drifting.
//!
//! # Example
//!
//! ```
//! use aloft::{LocalSpace, Vec3};
//!
//! let frame = LocalSpace::identity().with_position(Vec3::new(1.0, 2.0, 3.0));
//! let local = frame.localize(Vec3::new(1.0, 2.0, 13.0));
//! assert_eq!(local, Vec3::new(0.0, 0.0, 10.0));
//! assert_eq!(frame.globalize(local), Vec3::new(1.0, 2.0, 13.0));
//! ```

use rand::Rng;

use crate::random::random_unit_vector;
use crate::vector::{Vec3, VectorExt};

/// Orthonormal basis with an origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalSpace {
    side: Vec3,
    up: Vec3,
    forward: Vec3,
    position: Vec3,
}

impl Default for LocalSpace {
    fn default() -> Self {
        Self::identity()
    }
}

impl LocalSpace {
    /// Global axes at the origin: side = x, up = y, forward = z.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            side: Vec3::X,
            up: Vec3::Y,
            forward: Vec3::Z,
            position: Vec3::ZERO,
        }
    }

    /// Assemble a frame from explicit axes. No validation is done; check
    /// [`Self::is_orthonormal`] when the axes came from arithmetic.
    #[must_use]
    pub const fn from_basis(side: Vec3, up: Vec3, forward: Vec3, position: Vec3) -> Self {
        Self {
            side,
            up,
            forward,
            position,
        }
    }

    /// Build a frame whose forward is `forward` (normalized) and whose up is
    /// as close to `reference_up` as orthogonality allows.
    ///
    /// `side = normalize(reference_up × forward)`, `up = normalize(forward × side)`.
    /// The result is degenerate (not orthonormal) when the two inputs are
    /// parallel or either is zero.
    #[must_use]
    pub fn from_forward(forward: Vec3, reference_up: Vec3, position: Vec3) -> Self {
        let forward = forward.normalize_or_0();
        let side = reference_up.cross(forward).normalize_or_0();
        let up = forward.cross(side).normalize_or_0();
        Self {
            side,
            up,
            forward,
            position,
        }
    }

    /// Lateral axis.
    #[must_use]
    pub fn side(&self) -> Vec3 {
        self.side
    }

    /// Vertical axis.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Heading axis.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Origin in global coordinates.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Same orientation at a new position.
    #[must_use]
    pub fn with_position(&self, position: Vec3) -> Self {
        Self { position, ..*self }
    }

    /// Global point to local coordinates (side, up, forward).
    #[must_use]
    pub fn localize(&self, global: Vec3) -> Vec3 {
        self.localize_direction(global - self.position)
    }

    /// Local coordinates to a global point.
    #[must_use]
    pub fn globalize(&self, local: Vec3) -> Vec3 {
        self.position + self.globalize_direction(local)
    }

    /// Global direction to local components, ignoring position.
    #[must_use]
    pub fn localize_direction(&self, global: Vec3) -> Vec3 {
        Vec3::new(global.dot(self.side), global.dot(self.up), global.dot(self.forward))
    }

    /// Local components to a global direction, ignoring position.
    #[must_use]
    pub fn globalize_direction(&self, local: Vec3) -> Vec3 {
        self.side * local.x + self.up * local.y + self.forward * local.z
    }

    /// True when all three axes are unit length and mutually perpendicular.
    ///
    /// NaN components make this false.
    #[must_use]
    pub fn is_orthonormal(&self) -> bool {
        self.side.is_unit_length()
            && self.up.is_unit_length()
            && self.forward.is_unit_length()
            && self.side.is_perpendicular(self.up)
            && self.up.is_perpendicular(self.forward)
            && self.forward.is_perpendicular(self.side)
    }

    /// Rebuild the basis around `new_forward`, keeping the position.
    #[must_use]
    pub fn rotate_to_new_forward(&self, new_forward: Vec3, reference_up: Vec3) -> Self {
        Self::from_forward(new_forward, reference_up, self.position)
    }

    /// Uniformly random orientation at the same position.
    #[must_use]
    pub fn randomize_orientation<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let forward = random_unit_vector(rng);
        let side = loop {
            let side = random_unit_vector(rng).cross(forward);
            if !side.is_zero_length() {
                break side.normalize();
            }
        };
        let up = forward.cross(side).normalize();
        Self {
            side,
            up,
            forward,
            position: self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded_rng;
    use proptest::prelude::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-12
    }

    #[test]
    fn test_identity_is_orthonormal() {
        let frame = LocalSpace::identity();
        assert!(frame.is_orthonormal());
        assert_eq!(frame.side().cross(frame.up()), frame.forward());
    }

    #[test]
    fn test_from_forward_handedness() {
        let frame = LocalSpace::from_forward(Vec3::new(0.0, 0.0, 2.0), Vec3::Y, Vec3::ZERO);
        assert!(frame.is_orthonormal());
        assert!(close(frame.side(), Vec3::X));
        assert!(close(frame.up(), Vec3::Y));

        let tilted = LocalSpace::from_forward(Vec3::new(1.0, 1.0, 0.0), Vec3::Y, Vec3::ZERO);
        assert!(tilted.is_orthonormal());
        // Up stays as close to the reference as orthogonality allows.
        assert!(tilted.up().dot(Vec3::Y) > 0.0);
        assert!(close(tilted.side().cross(tilted.up()), tilted.forward()));
    }

    #[test]
    fn test_degenerate_frames_detected() {
        let parallel = LocalSpace::from_forward(Vec3::Y, Vec3::Y, Vec3::ZERO);
        assert!(!parallel.is_orthonormal());
        let nan = LocalSpace::from_basis(Vec3::NAN, Vec3::Y, Vec3::Z, Vec3::ZERO);
        assert!(!nan.is_orthonormal());
    }

    #[test]
    fn test_rotate_to_new_forward_keeps_position() {
        let start = LocalSpace::identity().with_position(Vec3::splat(5.0));
        let turned = start.rotate_to_new_forward(Vec3::X, Vec3::Y);
        assert_eq!(turned.position(), Vec3::splat(5.0));
        assert!(close(turned.forward(), Vec3::X));
        assert!(close(turned.side(), -Vec3::Z));
        assert!(turned.is_orthonormal());
    }

    proptest! {
        #[test]
        fn prop_localize_globalize_inverse(
            seed in any::<u64>(),
            ox in -100.0f64..100.0, oy in -100.0f64..100.0, oz in -100.0f64..100.0,
            px in -100.0f64..100.0, py in -100.0f64..100.0, pz in -100.0f64..100.0,
        ) {
            let mut rng = seeded_rng(seed);
            let frame = LocalSpace::identity()
                .with_position(Vec3::new(ox, oy, oz))
                .randomize_orientation(&mut rng);
            prop_assert!(frame.is_orthonormal());

            let p = Vec3::new(px, py, pz);
            let tolerance = 1e-12 * (1.0 + p.length() + frame.position().length());
            prop_assert!((frame.globalize(frame.localize(p)) - p).length() < tolerance);
            prop_assert!((frame.localize(frame.globalize(p)) - p).length() < tolerance);
        }
    }
}
