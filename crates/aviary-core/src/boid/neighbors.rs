//! Nearest-neighbor cache.
//!
//! Each boid remembers its `neighbor_count` nearest flockmates and only
//! recomputes the set every `neighbor_refresh_rate` seconds. The cache holds
//! indices into the pre-step [`FlockView`] plus the neighbor's [`BoidId`],
//! never references to the other boids.

use super::{Boid, BoidId};
use crate::view::{BoidSnapshot, FlockView};

/// Cached reference to a flockmate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    /// Index in the flock (and in the view).
    pub index: usize,
    /// Identity of the neighbor.
    pub id: BoidId,
}

impl Boid {
    /// Cached neighbors, nearest first as of the last refresh.
    #[must_use]
    pub fn neighbors(&self) -> &[Neighbor] {
        &self.neighbors
    }

    /// True if `id` is in this boid's neighbor cache.
    #[must_use]
    pub fn is_neighbor(&self, id: BoidId) -> bool {
        self.neighbors.iter().any(|n| n.id == id)
    }

    /// Force a refresh on the next plan.
    pub fn mark_neighbors_stale(&mut self) {
        self.neighbors_stale = true;
    }

    /// Refresh the cache if it is stale or older than the refresh rate.
    ///
    /// Returns true if the cache was recomputed.
    pub(crate) fn update_neighbors(&mut self, index: usize, time_step: f64, view: &FlockView<'_>) -> bool {
        self.time_since_neighbor_refresh += time_step;
        let expired = self.time_since_neighbor_refresh > self.params.neighbor_refresh_rate;
        if !(self.neighbors_stale || expired) {
            return false;
        }
        self.neighbors = view
            .nearest_neighbors(index, self.params.neighbor_count)
            .into_iter()
            .filter_map(|j| view.boid(j).map(|b| Neighbor { index: j, id: b.id }))
            .collect();
        self.time_since_neighbor_refresh = 0.0;
        self.neighbors_stale = false;
        true
    }

    /// Snapshots of the cached neighbors.
    pub(crate) fn neighbor_snapshots<'v>(
        &'v self,
        view: &'v FlockView<'_>,
    ) -> impl Iterator<Item = &'v BoidSnapshot> + 'v {
        self.neighbors.iter().filter_map(|n| view.boid(n.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlockConfig;
    use aloft::{LocalSpace, Vec3};

    fn line_of_boids(count: u64) -> Vec<Boid> {
        (0..count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let x = i as f64;
                Boid::new(BoidId::new(i), FlockConfig::default().boid)
                    .with_frame(LocalSpace::identity().with_position(Vec3::new(x, 0.0, 0.0)))
            })
            .collect()
    }

    #[test]
    fn test_first_update_always_refreshes() {
        let boids = line_of_boids(10);
        let config = FlockConfig::default();
        let view = FlockView::capture(&boids, &[], &config);
        let mut boid = boids[0].clone();
        assert!(boid.neighbors().is_empty());
        assert!(boid.update_neighbors(0, 0.0, &view));
        assert_eq!(boid.neighbors().len(), 7);
        assert_eq!(boid.neighbors()[0].id, BoidId::new(1));
        assert!(boid.is_neighbor(BoidId::new(7)));
        assert!(!boid.is_neighbor(BoidId::new(8)));
    }

    #[test]
    fn test_refresh_rate() {
        let boids = line_of_boids(4);
        let config = FlockConfig::default();
        let view = FlockView::capture(&boids, &[], &config);
        let mut boid = boids[0].clone();
        assert!(boid.update_neighbors(0, 0.1, &view));
        assert!(!boid.update_neighbors(0, 0.3, &view));
        assert!(!boid.update_neighbors(0, 0.15, &view));
        assert!(boid.update_neighbors(0, 0.1, &view));
        boid.mark_neighbors_stale();
        assert!(boid.update_neighbors(0, 0.0, &view));
    }

    #[test]
    fn test_lone_boid_has_no_neighbors() {
        let boids = line_of_boids(1);
        let config = FlockConfig::default();
        let view = FlockView::capture(&boids, &[], &config);
        let mut boid = boids[0].clone();
        boid.update_neighbors(0, 0.0, &view);
        assert!(boid.neighbors().is_empty());
    }
}
