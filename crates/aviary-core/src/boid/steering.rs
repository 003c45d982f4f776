//! Reynolds steering behaviors: separation, alignment, cohesion, anti-stall,
//! roll control and wander.
//!
//! The three flocking behaviors share one weighting scheme. A neighbor at
//! distance `d` contributes with weight
//!
//! ```text
//! d^-exponent * (1 - unit_sigmoid(d / max_dist)) * angle_weight
//! ```
//!
//! where `angle_weight` is 1 inside the behavior's forward view cone and
//! `outside_angle_weight` outside it. Neighbors coincident with the boid are
//! skipped. Each behavior returns a unit vector or zero.

use aloft::random::random_unit_vector;
use aloft::scalar::{unit_sigmoid_on_01, EPSILON};
use aloft::{Vec3, VectorExt};
use rand::Rng;

use super::Boid;
use crate::view::{BoidSnapshot, FlockView};

/// Random walk step for [`Boid::steer_to_wander`].
const WANDER_RATE: f64 = 0.4;

/// Inverse-distance weight with a soft cutoff at `max_dist`.
#[must_use]
pub fn distance_weight(distance: f64, exponent: f64, max_dist: f64) -> f64 {
    distance.powf(-exponent) * (1.0 - unit_sigmoid_on_01(distance / max_dist))
}

impl Boid {
    /// 1 if `other` lies inside the cone of half-angle `acos(cos_threshold)`
    /// around forward, otherwise the residual outside weight.
    fn angle_weight(&self, other: &BoidSnapshot, cos_threshold: f64) -> f64 {
        let offset = other.position - self.position();
        if offset.normalize_or_0().dot(self.forward()) > cos_threshold {
            1.0
        } else {
            self.params.outside_angle_weight
        }
    }

    /// Move away from close neighbors.
    #[must_use]
    pub fn steer_to_separate(&self, view: &FlockView<'_>) -> Vec3 {
        let p = &self.params;
        let mut direction = Vec3::ZERO;
        for neighbor in self.neighbor_snapshots(view) {
            let offset = self.position() - neighbor.position;
            let distance = offset.length();
            if distance < EPSILON {
                continue;
            }
            let weight = distance_weight(distance, p.exponent_separate, p.max_dist_separate)
                * self.angle_weight(neighbor, p.angle_separate);
            direction += offset * weight;
        }
        direction.normalize_or_0()
    }

    /// Match neighbors' headings.
    #[must_use]
    pub fn steer_to_align(&self, view: &FlockView<'_>) -> Vec3 {
        let p = &self.params;
        let mut direction = Vec3::ZERO;
        for neighbor in self.neighbor_snapshots(view) {
            let distance = neighbor.position.distance(self.position());
            if distance < EPSILON {
                continue;
            }
            let heading_offset = neighbor.forward - self.forward();
            let weight = distance_weight(distance, p.exponent_align, p.max_dist_align)
                * self.angle_weight(neighbor, p.angle_align);
            direction += heading_offset.normalize_or_0() * weight;
        }
        direction.normalize_or_0()
    }

    /// Head for the weighted center of the neighbors. Zero when no neighbor
    /// carries weight.
    #[must_use]
    pub fn steer_to_cohere(&self, view: &FlockView<'_>) -> Vec3 {
        let p = &self.params;
        let mut center = Vec3::ZERO;
        let mut total_weight = 0.0;
        for neighbor in self.neighbor_snapshots(view) {
            let distance = neighbor.position.distance(self.position());
            if distance < EPSILON {
                continue;
            }
            let weight = distance_weight(distance, p.exponent_cohere, p.max_dist_cohere)
                * self.angle_weight(neighbor, p.angle_cohere);
            center += neighbor.position * weight;
            total_weight += weight;
        }
        if total_weight <= 0.0 {
            return Vec3::ZERO;
        }
        (center / total_weight - self.position()).normalize_or_0()
    }

    /// Keep a slow boid from slowing further: when below
    /// `min_speed * stall_margin` and braking, replace the braking part with
    /// forward thrust and keep the turning part.
    #[must_use]
    pub fn anti_stall_adjustment(&self, raw_steering: Vec3) -> Vec3 {
        let p = &self.params;
        let forward = self.forward();
        if self.speed() < p.min_speed() * p.stall_margin && raw_steering.dot(forward) < 0.0 {
            let ahead = forward * (p.max_force * p.stall_thrust_factor);
            ahead + raw_steering.perpendicular_component(forward)
        } else {
            raw_steering
        }
    }

    /// Roll control: bank toward the center of path curvature, biased
    /// slightly toward global up and heavily low-pass filtered.
    ///
    /// The filter starts from the boid's current up axis (see
    /// [`Boid::new`] and [`Boid::with_frame`]) rather than unset, so the
    /// first call blends like every later one instead of passing the raw,
    /// mostly forward acceleration straight through.
    pub(crate) fn up_reference(&mut self, acceleration: Vec3) -> Vec3 {
        let p = &self.params;
        let new_up = acceleration + Vec3::Y * p.up_bias;
        let blended = self.up_memory.blend(new_up, p.up_smoothness).normalize_or_0();
        let up = if blended.is_zero_length() { self.agent.up() } else { blended };
        self.up_memory.set(up);
        up
    }

    /// Slowly varying steering from a random walk on the unit sphere.
    ///
    /// The forward component of the result stays in `[1/3, 1]` times half
    /// of `max_force`. Not part of the flocking sum.
    pub fn steer_to_wander<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec3 {
        self.wander_state = (self.wander_state + random_unit_vector(rng) * WANDER_RATE).normalize_or_0();
        (self.wander_state + self.forward() * 2.0) * (1.0 / 3.0) * (self.params.max_force * 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boid::BoidId;
    use crate::config::FlockConfig;
    use aloft::{seeded_rng, LocalSpace};

    fn boid_at(id: u64, position: Vec3, forward: Vec3) -> Boid {
        let frame = LocalSpace::from_forward(forward, Vec3::Y, position);
        Boid::new(BoidId::new(id), FlockConfig::default().boid).with_frame(frame)
    }

    /// Boids with the first one's neighbor cache filled.
    fn with_neighbors(mut boids: Vec<Boid>, config: &FlockConfig) -> (Boid, Vec<Boid>) {
        let view = FlockView::capture(&boids, &[], config);
        boids[0].update_neighbors(0, 0.0, &view);
        (boids[0].clone(), boids)
    }

    mod weight_tests {
        use super::*;

        #[test]
        fn test_distance_weight_decreases() {
            let mut previous = f64::INFINITY;
            for i in 1..30_u32 {
                let d = f64::from(i) * 0.25;
                let w = distance_weight(d, 1.0, 7.5);
                assert!(w < previous, "weight not decreasing at {d}");
                previous = w;
            }
            assert_eq!(distance_weight(7.5, 1.0, 7.5), 0.0);
            assert_eq!(distance_weight(20.0, 1.0, 7.5), 0.0);
        }
    }

    mod behavior_tests {
        use super::*;

        #[test]
        fn test_separation_points_away() {
            let config = FlockConfig::default();
            let a = Vec3::new(1.0, 2.0, 3.0);
            let b = Vec3::new(2.0, 2.5, 3.0);
            let boids = vec![boid_at(0, a, Vec3::Z), boid_at(1, b, Vec3::Z)];
            let (me, boids) = with_neighbors(boids, &config);
            let view = FlockView::capture(&boids, &[], &config);
            let steer = me.steer_to_separate(&view);
            assert!((steer - (a - b).normalize()).length() < 1e-12);

            let mut other = boids[1].clone();
            other.update_neighbors(1, 0.0, &view);
            let steer = other.steer_to_separate(&view);
            assert!((steer - (b - a).normalize()).length() < 1e-12);
        }

        #[test]
        fn test_separation_zero_beyond_cutoff() {
            let config = FlockConfig::default();
            let boids = vec![boid_at(0, Vec3::ZERO, Vec3::Z), boid_at(1, Vec3::X * 30.0, Vec3::Z)];
            let (me, boids) = with_neighbors(boids, &config);
            let view = FlockView::capture(&boids, &[], &config);
            assert_eq!(me.steer_to_separate(&view), Vec3::ZERO);
        }

        #[test]
        fn test_coincident_neighbor_ignored() {
            let config = FlockConfig::default();
            let boids = vec![boid_at(0, Vec3::ONE, Vec3::Z), boid_at(1, Vec3::ONE, Vec3::X)];
            let (me, boids) = with_neighbors(boids, &config);
            let view = FlockView::capture(&boids, &[], &config);
            assert_eq!(me.steer_to_separate(&view), Vec3::ZERO);
            assert_eq!(me.steer_to_align(&view), Vec3::ZERO);
            assert_eq!(me.steer_to_cohere(&view), Vec3::ZERO);
        }

        #[test]
        fn test_alignment_turns_toward_neighbor_heading() {
            let config = FlockConfig::default();
            let boids = vec![
                boid_at(0, Vec3::ZERO, Vec3::Z),
                boid_at(1, Vec3::new(0.0, 0.0, 3.0), Vec3::X),
            ];
            let (me, boids) = with_neighbors(boids, &config);
            let view = FlockView::capture(&boids, &[], &config);
            let steer = me.steer_to_align(&view);
            assert!((steer - (Vec3::X - Vec3::Z).normalize()).length() < 1e-12);
        }

        #[test]
        fn test_cohesion_toward_center() {
            let config = FlockConfig::default();
            let boids = vec![
                boid_at(0, Vec3::ZERO, Vec3::Z),
                boid_at(1, Vec3::new(-4.0, 0.0, 10.0), Vec3::Z),
                boid_at(2, Vec3::new(4.0, 0.0, 10.0), Vec3::Z),
            ];
            let (me, boids) = with_neighbors(boids, &config);
            let view = FlockView::capture(&boids, &[], &config);
            let steer = me.steer_to_cohere(&view);
            assert!((steer - Vec3::Z).length() < 1e-12);
        }

        #[test]
        fn test_no_neighbors_no_flocking() {
            let config = FlockConfig::default();
            let (me, boids) = with_neighbors(vec![boid_at(0, Vec3::ZERO, Vec3::Z)], &config);
            let view = FlockView::capture(&boids, &[], &config);
            assert_eq!(me.steer_to_separate(&view), Vec3::ZERO);
            assert_eq!(me.steer_to_align(&view), Vec3::ZERO);
            assert_eq!(me.steer_to_cohere(&view), Vec3::ZERO);
        }
    }

    mod adjustment_tests {
        use super::*;

        #[test]
        fn test_anti_stall_replaces_braking() {
            let boid = boid_at(0, Vec3::ZERO, Vec3::Z);
            let raw = Vec3::new(3.0, 0.0, -5.0);
            let adjusted = boid.anti_stall_adjustment(raw);
            assert_eq!(adjusted, Vec3::new(3.0, 0.0, 90.0));
        }

        #[test]
        fn test_anti_stall_ignores_fast_or_accelerating() {
            let boid = boid_at(0, Vec3::ZERO, Vec3::Z);
            let raw = Vec3::new(3.0, 0.0, 5.0);
            assert_eq!(boid.anti_stall_adjustment(raw), raw);
            let fast = boid.with_speed(15.0);
            let braking = Vec3::new(3.0, 0.0, -5.0);
            assert_eq!(fast.anti_stall_adjustment(braking), braking);
        }

        #[test]
        fn test_up_reference_is_unit_and_slow() {
            let mut boid = boid_at(0, Vec3::ZERO, Vec3::Z);
            let up = boid.up_reference(Vec3::X * 50.0);
            assert!(up.is_unit_length());
            // Heavy filtering: barely moved from the initial up.
            assert!(up.dot(Vec3::Y) > 0.9);
        }

        #[test]
        fn test_up_reference_first_call_blends_from_frame_up() {
            let rolled = LocalSpace::from_forward(Vec3::Z, Vec3::X, Vec3::ZERO);
            assert!(rolled.up().is_equal_within_epsilon(Vec3::X));
            let mut boid = boid_at(0, Vec3::ZERO, Vec3::Z).with_frame(rolled);
            // Unfiltered, this would snap the roll to global up.
            let up = boid.up_reference(Vec3::Y * 50.0);
            assert!(up.dot(Vec3::X) > 0.99);
        }

        #[test]
        fn test_wander_stays_forward() {
            let mut rng = seeded_rng(5);
            let mut boid = boid_at(0, Vec3::ZERO, Vec3::Z);
            let half_force = boid.params().max_force * 0.5;
            for _ in 0..100 {
                let w = boid.steer_to_wander(&mut rng);
                let ahead = w.dot(Vec3::Z) / half_force;
                assert!(ahead >= 1.0 / 3.0 - 1e-9 && ahead <= 1.0 + 1e-9);
            }
        }
    }
}
