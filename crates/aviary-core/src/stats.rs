//! Flock-wide statistics.
//!
//! Per-step summaries are computed in parallel, one partial [`ScalarStats`]
//! per boid, then merged. Failure counters accumulate across steps.

use aloft::{ScalarStats, Vec3};
use rayon::prelude::*;
use serde::Serialize;

use crate::boid::Boid;

/// Aggregate flock measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlockStats {
    /// Steps taken.
    pub steps: u64,
    /// Simulated seconds.
    pub simulated_time: f64,
    /// Mean boid speed after the last step.
    pub mean_speed: f64,
    /// Distance from each boid to its nearest flockmate after the last step.
    pub nearest_neighbor: ScalarStats,
    /// Pairs closer than two body radii, summed over steps.
    pub separation_failures: u64,
    /// Boids outside the containment radius, summed over steps.
    pub containment_failures: u64,
    /// Frame updates discarded by integration, over all boids and steps.
    pub discarded_frame_updates: u64,
}

/// Measurements of one flock state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Snapshot {
    pub mean_speed: f64,
    pub nearest_neighbor: ScalarStats,
    pub separation_failures: u64,
    pub discarded_frame_updates: u64,
}

impl Snapshot {
    /// Measure `boids`. Pair checks are O(n²), split across threads by boid.
    pub(crate) fn measure(boids: &[Boid]) -> Self {
        if boids.is_empty() {
            return Self::default();
        }
        let positions: Vec<Vec3> = boids.iter().map(Boid::position).collect();
        let min_separation = boids
            .iter()
            .map(|b| b.params().body_radius * 2.0)
            .fold(f64::INFINITY, f64::min);

        let per_boid: Vec<(ScalarStats, u64)> = positions
            .par_iter()
            .enumerate()
            .map(|(i, p)| {
                let mut nearest = f64::INFINITY;
                let mut too_close = 0;
                for (j, q) in positions.iter().enumerate() {
                    if i == j {
                        continue;
                    }
                    let d = p.distance(*q);
                    nearest = nearest.min(d);
                    if j > i && d < min_separation {
                        too_close += 1;
                    }
                }
                let stats = if nearest.is_finite() {
                    ScalarStats::from_value(nearest)
                } else {
                    ScalarStats::empty()
                };
                (stats, too_close)
            })
            .collect();

        let nearest: Vec<ScalarStats> = per_boid.iter().map(|(s, _)| *s).collect();
        #[allow(clippy::cast_precision_loss)]
        let mean_speed = boids.iter().map(Boid::speed).sum::<f64>() / boids.len() as f64;
        Self {
            mean_speed,
            nearest_neighbor: ScalarStats::merge_many(&nearest),
            separation_failures: per_boid.iter().map(|(_, n)| n).sum(),
            discarded_frame_updates: boids.iter().map(|b| b.agent().discarded_frame_updates()).sum(),
        }
    }
}

impl FlockStats {
    /// Fold one step into the totals.
    pub(crate) fn record_step(&mut self, time_step: f64, snapshot: &Snapshot, containment_failures: u64) {
        self.steps += 1;
        self.simulated_time += time_step;
        self.mean_speed = snapshot.mean_speed;
        self.nearest_neighbor = snapshot.nearest_neighbor;
        self.separation_failures += snapshot.separation_failures;
        self.containment_failures += containment_failures;
        self.discarded_frame_updates = snapshot.discarded_frame_updates;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boid::BoidId;
    use crate::config::BoidParams;
    use aloft::LocalSpace;

    fn boids_at(points: &[Vec3]) -> Vec<Boid> {
        points
            .iter()
            .zip(0_u64..)
            .map(|(p, id)| {
                Boid::new(BoidId::new(id), BoidParams::default())
                    .with_frame(LocalSpace::identity().with_position(*p))
            })
            .collect()
    }

    #[test]
    fn empty_flock_measures_nothing() {
        let snapshot = Snapshot::measure(&[]);
        assert_eq!(snapshot, Snapshot::default());
    }

    #[test]
    fn nearest_neighbor_distances() {
        let boids = boids_at(&[Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), Vec3::new(3.0, 4.0, 0.0)]);
        let snapshot = Snapshot::measure(&boids);
        assert_eq!(snapshot.nearest_neighbor.sample_count, 3);
        assert_eq!(snapshot.nearest_neighbor.min, 3.0);
        assert_eq!(snapshot.nearest_neighbor.max, 4.0);
        assert!((snapshot.nearest_neighbor.mean - 10.0 / 3.0).abs() < 1e-12);
        assert_eq!(snapshot.mean_speed, 6.0);
        assert_eq!(snapshot.separation_failures, 0);
    }

    #[test]
    fn close_pairs_counted_once() {
        // Body radius 0.5: pairs closer than 1.0 fail.
        let boids = boids_at(&[Vec3::ZERO, Vec3::new(0.5, 0.0, 0.0), Vec3::new(0.0, 0.9, 0.0)]);
        let snapshot = Snapshot::measure(&boids);
        assert_eq!(snapshot.separation_failures, 2);
    }

    #[test]
    fn single_boid_has_no_neighbor() {
        let boids = boids_at(&[Vec3::ONE]);
        let snapshot = Snapshot::measure(&boids);
        assert!(snapshot.nearest_neighbor.is_empty());
    }

    #[test]
    fn record_step_accumulates() {
        let mut stats = FlockStats::default();
        let snapshot = Snapshot {
            mean_speed: 5.0,
            separation_failures: 2,
            ..Snapshot::default()
        };
        stats.record_step(0.5, &snapshot, 1);
        stats.record_step(0.5, &snapshot, 0);
        assert_eq!(stats.steps, 2);
        assert_eq!(stats.simulated_time, 1.0);
        assert_eq!(stats.separation_failures, 4);
        assert_eq!(stats.containment_failures, 1);
        assert_eq!(stats.mean_speed, 5.0);
    }
}
