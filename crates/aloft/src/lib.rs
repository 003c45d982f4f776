//! # Aloft
//!
//! Geometry substrate for steering agents: vectors, rigid local frames, ray
//! intersection tests and the obstacle shapes agents fly around.
//!
//! Aloft knows nothing about flocks. It provides the numerically careful
//! building blocks that a per-step steering computation leans on:
//!
//! - **Vector algebra**: [`Vec3`] (double precision) plus [`VectorExt`] for
//!   projection, truncation and epsilon-tolerant predicates
//! - **Local space**: [`LocalSpace`], an orthonormal basis plus position that is
//!   rebuilt from scratch instead of being incrementally rotated
//! - **Intersections**: ray vs sphere, plane and cylinder; line to line distance
//! - **Obstacles**: everted sphere, plane and cylinder behind one closed enum
//! - **Randomness**: helpers over any seedable [`rand::Rng`]
//!
//! ## Quick Start
//!
//! ```
//! use aloft::{shape, Obstacle, Vec3};
//!
//! // Where does a ray from (-2, 0, 0) heading +x first touch a unit sphere?
//! let hit = shape::ray_sphere_intersection(Vec3::new(-2.0, 0.0, 0.0), Vec3::X, 1.0, Vec3::ZERO);
//! assert_eq!(hit, Some(Vec3::new(-1.0, 0.0, 0.0)));
//!
//! // Containment volume seen from the inside.
//! let wall = Obstacle::everted_sphere(50.0, Vec3::ZERO).unwrap();
//! let push = wall.fly_away(Vec3::new(45.0, 0.0, 0.0), Vec3::X, 10.0, 0.5);
//! assert!(push.x < 0.0);
//! assert!(push.length() <= 1.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod frame;
pub mod obstacle;
pub mod random;
pub mod scalar;
pub mod shape;
pub mod stats;
pub mod vector;

// Re-exports for convenience
pub use error::GeometryError;
pub use frame::LocalSpace;
pub use obstacle::{Cylinder, EvertedSphere, Obstacle, Plane};
pub use random::{seeded_rng, SimRng};
pub use scalar::{within_epsilon, EPSILON};
pub use stats::ScalarStats;
pub use vector::{Vec3, VectorExt};
