//! Factories and pose helpers shared by the flock tests.

use std::collections::BTreeMap;

use aloft::{LocalSpace, Vec3};

use crate::boid::{Boid, BoidId};
use crate::config::FlockConfig;
use crate::flock::Flock;

/// Simulation time step used throughout the tests.
pub const TIME_STEP: f64 = 1.0 / 60.0;

// =============================================================================
// Setup
// =============================================================================

/// Default configuration with a given seed and boid count.
pub fn test_config(seed: u64, boid_count: usize) -> FlockConfig {
    let mut config = FlockConfig::with_seed(seed);
    config.boid_count = boid_count;
    config
}

/// A boid at `position` heading along `forward` with the default parameters.
pub fn boid_at(id: u64, position: Vec3, forward: Vec3) -> Boid {
    Boid::new(BoidId::new(id), FlockConfig::default().boid)
        .with_frame(LocalSpace::from_forward(forward, Vec3::Y, position))
}

/// A flock containing exactly `boids`, in that order.
pub fn flock_of(config: FlockConfig, boids: Vec<Boid>) -> Flock {
    let mut flock = Flock::without_boids(config).expect("valid config");
    for boid in boids {
        flock.add_boid(boid).expect("unique ids");
    }
    flock
}

/// Three boids close enough to interact, not in id order.
pub fn setup_trio() -> Vec<Boid> {
    vec![
        boid_at(2, Vec3::new(0.0, 0.0, 2.0), Vec3::X),
        boid_at(0, Vec3::new(0.0, 0.0, 0.0), Vec3::Z),
        boid_at(1, Vec3::new(1.5, 0.5, 0.0), Vec3::new(1.0, 0.0, 1.0)),
    ]
}

/// Step `flock` `steps` times at [`TIME_STEP`].
pub fn run(flock: &mut Flock, steps: usize) {
    for _ in 0..steps {
        flock.step(TIME_STEP);
    }
}

// =============================================================================
// Probes
// =============================================================================

/// Kinematic state of one boid, for exact comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    pub speed: f64,
}

/// Every boid's pose keyed by id.
pub fn poses_by_id(flock: &Flock) -> BTreeMap<BoidId, Pose> {
    flock
        .boids()
        .iter()
        .map(|b| {
            let pose = Pose {
                position: b.position(),
                forward: b.forward(),
                up: b.frame().up(),
                speed: b.speed(),
            };
            (b.id(), pose)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boid_at_builds_orthonormal_frame() {
        let boid = boid_at(3, Vec3::ONE, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(boid.id(), BoidId::new(3));
        assert_eq!(boid.position(), Vec3::ONE);
        assert!(boid.frame().is_orthonormal());
    }

    #[test]
    fn flock_of_keeps_order() {
        let flock = flock_of(test_config(0, 0), setup_trio());
        let ids: Vec<u64> = flock.boids().iter().map(|b| b.id().as_u64()).collect();
        assert_eq!(ids, vec![2, 0, 1]);
    }

    #[test]
    fn poses_keyed_by_id() {
        let flock = flock_of(test_config(0, 0), setup_trio());
        let poses = poses_by_id(&flock);
        assert_eq!(poses.len(), 3);
        assert_eq!(poses[&BoidId::new(0)].position, Vec3::ZERO);
    }
}
