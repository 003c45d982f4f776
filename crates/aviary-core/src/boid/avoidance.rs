//! Obstacle avoidance.
//!
//! Two strategies run side by side:
//!
//! - **Predictive**: cast a ray along the current heading, find the soonest
//!   collision and steer along the lateral part of the surface normal there.
//!   Engages within `speed * min_time_to_collide` of the impact point, either
//!   as a hard switch or ramped between 80% and 120% of that distance.
//! - **Static**: sum every obstacle's fly-away repulsion within
//!   `fly_away_distance_factor` body radii.
//!
//! The two are combined per [`AvoidCombine`]. In wrap containment mode there
//! is no avoidance at all.

use aloft::scalar::{remap_interval, unit_sigmoid_on_01};
use aloft::vector::longest;
use aloft::{Vec3, VectorExt};

use super::Boid;
use crate::config::{AvoidBlend, AvoidCombine, ContainmentMode};
use crate::view::FlockView;

/// A predicted impact with one obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// Index into the flock's obstacle list.
    pub obstacle_index: usize,
    /// Seconds until impact at the current speed.
    pub time_to_collision: f64,
    /// Distance to the point of impact.
    pub dist_to_collision: f64,
    /// Where the heading ray meets the obstacle.
    pub point_of_impact: Vec3,
    /// Surface normal there.
    pub normal_at_poi: Vec3,
}

/// Avoidance steering plus the point it reacted to most strongly.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Avoidance {
    /// Unweighted avoidance steering.
    pub steering: Vec3,
    /// Point of impact or nearest surface point of the strongest reaction.
    pub poi: Vec3,
    /// Strength of the strongest reaction, in `[0, 1]`.
    pub weight: f64,
}

impl Avoidance {
    fn keep_stronger(&mut self, poi: Vec3, weight: f64) {
        if weight > self.weight {
            self.poi = poi;
            self.weight = weight;
        }
    }
}

impl Boid {
    /// Every obstacle hit by the heading ray, soonest first.
    #[must_use]
    pub fn predict_future_collisions(&self, view: &FlockView<'_>) -> Vec<Collision> {
        let position = self.position();
        let forward = self.forward();
        let speed = self.speed();
        let mut collisions: Vec<Collision> = view
            .obstacles()
            .iter()
            .enumerate()
            .filter_map(|(obstacle_index, obstacle)| {
                let poi = obstacle.ray_intersection(position, forward, self.params.body_radius)?;
                let dist_to_collision = poi.distance(position);
                let time_to_collision = if speed > 0.0 {
                    dist_to_collision / speed
                } else {
                    f64::INFINITY
                };
                Some(Collision {
                    obstacle_index,
                    time_to_collision,
                    dist_to_collision,
                    point_of_impact: poi,
                    normal_at_poi: obstacle.normal_at_poi(poi, Some(position)),
                })
            })
            .collect();
        collisions.sort_by(|a, b| a.time_to_collision.total_cmp(&b.time_to_collision));
        collisions
    }

    /// Steer sideways away from the soonest predicted collision.
    #[must_use]
    pub fn steer_for_predictive_avoidance(&self, view: &FlockView<'_>) -> Avoidance {
        let collisions = self.predict_future_collisions(view);
        let Some(first) = collisions.first() else {
            return Avoidance::default();
        };
        let forward = self.forward();
        let lateral = first.normal_at_poi.perpendicular_component(forward).normalize_or_0();
        // Head-on: any sideways direction will do.
        let direction = if lateral.is_zero_length() {
            forward.find_perpendicular()
        } else {
            lateral
        };

        let min_dist = self.speed() * view.config().min_time_to_collide;
        let weight = if min_dist <= 0.0 {
            0.0
        } else {
            match view.config().avoid_blend {
                AvoidBlend::Blend => unit_sigmoid_on_01(remap_interval(
                    first.dist_to_collision,
                    min_dist * 0.8,
                    min_dist * 1.2,
                    1.0,
                    0.0,
                )),
                AvoidBlend::HardSwitch => {
                    if min_dist > first.dist_to_collision {
                        1.0
                    } else {
                        0.0
                    }
                }
            }
        };
        Avoidance {
            steering: direction * weight,
            poi: first.point_of_impact,
            weight,
        }
    }

    /// Sum of the static repulsion of every obstacle.
    #[must_use]
    pub fn fly_away_from_obstacles(&self, view: &FlockView<'_>) -> Avoidance {
        let position = self.position();
        let forward = self.forward();
        let max_distance = self.params.fly_away_distance();
        let mut result = Avoidance::default();
        for obstacle in view.obstacles() {
            let push = obstacle.fly_away(position, forward, max_distance, self.params.body_radius);
            result.steering += push;
            result.keep_stronger(obstacle.nearest_point(position), push.length());
        }
        result
    }

    /// Combined predictive and static avoidance; zero in wrap mode.
    #[must_use]
    pub fn steer_to_avoid(&self, view: &FlockView<'_>) -> Avoidance {
        let config = view.config();
        if config.containment == ContainmentMode::Wrap {
            return Avoidance::default();
        }
        let predictive = self.steer_for_predictive_avoidance(view);
        let fixed = self.fly_away_from_obstacles(view);
        let steering = match config.avoid_combine {
            AvoidCombine::Max => longest(&[fixed.steering, predictive.steering]),
            AvoidCombine::Sum => fixed.steering + predictive.steering,
        };
        let mut result = Avoidance {
            steering,
            ..predictive
        };
        result.keep_stronger(fixed.poi, fixed.weight);
        result
    }
}
