//! `FlockView`: the frozen pre-step state every boid plans against.
//!
//! A step has two passes. During planning each boid may only look at other
//! boids through a [`FlockView`], which is captured before any boid moves and
//! is never written to. Boids plan in parallel against the same view, so no
//! boid can see another boid's already-applied state for the same step.
//!
//! # Example
//!
//! ```
//! use aviary_core::{Boid, BoidId, FlockConfig};
//! use aviary_core::view::FlockView;
//! use aloft::{LocalSpace, Vec3};
//!
//! let config = FlockConfig::default();
//! let boids: Vec<Boid> = (0..3_u32)
//!     .map(|i| {
//!         let frame = LocalSpace::identity().with_position(Vec3::new(f64::from(i), 0.0, 0.0));
//!         Boid::new(BoidId::new(u64::from(i)), config.boid.clone()).with_frame(frame)
//!     })
//!     .collect();
//!
//! let view = FlockView::capture(&boids, &[], &config);
//! assert_eq!(view.len(), 3);
//! assert_eq!(view.nearest_neighbors(0, 7), vec![1, 2]);
//! ```

use aloft::{Obstacle, Vec3};

use crate::boid::{Boid, BoidId};
use crate::config::FlockConfig;

/// Read-only copy of the parts of a boid its neighbors may observe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoidSnapshot {
    /// Stable identity, used for tie-breaking.
    pub id: BoidId,
    /// Position at the start of the step.
    pub position: Vec3,
    /// Heading at the start of the step.
    pub forward: Vec3,
    /// Speed at the start of the step.
    pub speed: f64,
}

impl BoidSnapshot {
    /// Snapshot of one boid.
    #[must_use]
    pub fn of(boid: &Boid) -> Self {
        Self {
            id: boid.id(),
            position: boid.position(),
            forward: boid.forward(),
            speed: boid.speed(),
        }
    }
}

/// Frozen flock state plus the shared, immutable flock context.
#[derive(Debug, Clone)]
pub struct FlockView<'a> {
    boids: Vec<BoidSnapshot>,
    obstacles: &'a [Obstacle],
    config: &'a FlockConfig,
}

impl<'a> FlockView<'a> {
    /// Snapshot `boids`; indices in the view match indices in the slice.
    #[must_use]
    pub fn capture(boids: &[Boid], obstacles: &'a [Obstacle], config: &'a FlockConfig) -> Self {
        Self {
            boids: boids.iter().map(BoidSnapshot::of).collect(),
            obstacles,
            config,
        }
    }

    /// All snapshots in flock order.
    #[must_use]
    pub fn boids(&self) -> &[BoidSnapshot] {
        &self.boids
    }

    /// Snapshot at `index`.
    #[must_use]
    pub fn boid(&self, index: usize) -> Option<&BoidSnapshot> {
        self.boids.get(index)
    }

    /// Number of boids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boids.len()
    }

    /// True for an empty flock.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    /// Obstacles, including the containment sphere.
    #[must_use]
    pub fn obstacles(&self) -> &'a [Obstacle] {
        self.obstacles
    }

    /// Flock configuration.
    #[must_use]
    pub fn config(&self) -> &'a FlockConfig {
        self.config
    }

    /// Indices of the `count` boids nearest to the boid at `index`, nearest
    /// first, excluding itself.
    ///
    /// Ordered by squared distance; equal distances are ordered by
    /// [`BoidId`], so the result does not depend on flock order.
    #[must_use]
    pub fn nearest_neighbors(&self, index: usize, count: usize) -> Vec<usize> {
        let Some(me) = self.boids.get(index) else {
            return Vec::new();
        };
        let mut candidates: Vec<(f64, BoidId, usize)> = self
            .boids
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != index)
            .map(|(j, other)| (other.position.distance_squared(me.position), other.id, j))
            .collect();
        candidates.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        candidates.truncate(count);
        candidates.into_iter().map(|(_, _, j)| j).collect()
    }
}
