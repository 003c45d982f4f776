//! The flock: boids, obstacles and the per-step driver.
//!
//! Each call to [`Flock::step`] runs four phases:
//!
//! 1. **SNAPSHOT**: capture a [`FlockView`] of every boid's pre-step state
//! 2. **PLAN**: every boid picks its steering force against the snapshot
//! 3. **APPLY**: every boid integrates its own steering force
//! 4. **CONTAIN**: boids that left the containment sphere are handled, then
//!    statistics are updated
//!
//! Plan and apply each run in parallel over boids. No boid applies before
//! every boid has planned, and planning never sees a moved boid, so results
//! do not depend on boid order or thread count.
//!
//! # Example
//!
//! ```
//! use aviary_core::{Flock, FlockConfig};
//!
//! let mut config = FlockConfig::with_seed(7);
//! config.boid_count = 20;
//! let mut flock = Flock::new(config).unwrap();
//!
//! for _ in 0..10 {
//!     flock.step(1.0 / 60.0);
//! }
//!
//! assert_eq!(flock.stats().steps, 10);
//! assert_eq!(flock.boids().len(), 20);
//! ```

use aloft::random::{random_in_range, random_point_in_unit_sphere, random_unit_vector};
use aloft::{seeded_rng, LocalSpace, Obstacle, SimRng, Vec3, VectorExt};
use rayon::prelude::*;
use tracing::{info, trace, warn};

use crate::boid::{Boid, BoidId};
use crate::config::{AvoidBlend, ContainmentMode, FlockConfig, InitialHeading, RunFlags, TimeStepMode};
use crate::error::FlockError;
use crate::render::{line_segment, Color, Renderer};
use crate::stats::{FlockStats, Snapshot};
use crate::view::FlockView;

/// Color of drawn cylinder obstacles.
const OBSTACLE_COLOR: f32 = 0.8;

/// Facets of drawn cylinder obstacles.
const OBSTACLE_SIDES: u32 = 50;

/// Where a point outside the sphere `(center, radius)` wraps to: the
/// opposite side, `inset * radius` from the center. `None` when the point is
/// inside.
#[must_use]
pub fn sphere_wrap_around(position: Vec3, center: Vec3, radius: f64, inset: f64) -> Option<Vec3> {
    let (inward, distance) = (center - position).unit_and_length();
    (distance > radius).then(|| center + inward * (radius * inset))
}

// ============================================================================
// Flock
// ============================================================================

/// A population of boids sharing obstacles and configuration.
#[derive(Debug, Clone)]
pub struct Flock {
    config: FlockConfig,
    boids: Vec<Boid>,
    obstacles: Vec<Obstacle>,
    rng: SimRng,
    stats: FlockStats,
    selected: usize,
    next_id: u64,
}

impl Flock {
    /// Build a flock of `config.boid_count` boids inside the containment
    /// sphere.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: FlockConfig) -> Result<Self, FlockError> {
        let mut flock = Self::without_boids(config)?;
        let config = &flock.config;
        let (count, center) = (config.boid_count, config.sphere_center);
        let radius = config.sphere_radius * config.spawn_fraction;
        flock.make_boids(count, radius, center);
        info!(
            boids = flock.boids.len(),
            seed = flock.config.seed,
            containment = ?flock.config.containment,
            "flock created"
        );
        Ok(flock)
    }

    /// A flock with its containment sphere but no boids.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn without_boids(config: FlockConfig) -> Result<Self, FlockError> {
        config.validate()?;
        let containment = Obstacle::everted_sphere(config.sphere_radius, config.sphere_center)?;
        Ok(Self {
            rng: seeded_rng(config.seed),
            config,
            boids: Vec::new(),
            obstacles: vec![containment],
            stats: FlockStats::default(),
            selected: 0,
            next_id: 0,
        })
    }

    /// Add `count` boids at random positions within `radius` of `center`.
    ///
    /// Orientation follows [`FlockConfig::initial_heading`]; each boid gets a
    /// random midrange color and starts at `min_speed`.
    pub fn make_boids(&mut self, count: usize, radius: f64, center: Vec3) {
        self.boids.reserve(count);
        for _ in 0..count {
            let position = center + random_point_in_unit_sphere(&mut self.rng) * radius;
            let frame = self.initial_frame(position);
            let color = self.random_color();
            let id = BoidId::new(self.next_id);
            self.next_id += 1;
            self.boids
                .push(Boid::new(id, self.config.boid.clone()).with_frame(frame).with_color(color));
        }
        self.mark_neighbors_stale();
    }

    fn initial_frame(&mut self, position: Vec3) -> LocalSpace {
        match self.config.initial_heading {
            InitialHeading::Uniform => LocalSpace::identity()
                .with_position(position)
                .randomize_orientation(&mut self.rng),
            InitialHeading::Aligned { mean, noise } => {
                let jitter = random_unit_vector(&mut self.rng) * noise;
                let forward = (mean.normalize_or_0() + jitter).normalize_or_0();
                let forward = if forward.is_zero_length() { Vec3::Z } else { forward };
                let frame = LocalSpace::from_forward(forward, Vec3::Y, position);
                if frame.is_orthonormal() {
                    frame
                } else {
                    LocalSpace::from_forward(forward, Vec3::Z, position)
                }
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn random_color(&mut self) -> Color {
        let mut channel = || random_in_range(&mut self.rng, 0.5, 0.8) as f32;
        Color::new(channel(), channel(), channel())
    }

    /// Insert a prebuilt boid.
    ///
    /// # Errors
    ///
    /// Returns [`FlockError::DuplicateBoid`] if a boid with the same id is
    /// already present.
    pub fn add_boid(&mut self, boid: Boid) -> Result<BoidId, FlockError> {
        let id = boid.id();
        if self.boids.iter().any(|b| b.id() == id) {
            return Err(FlockError::DuplicateBoid(id));
        }
        self.next_id = self.next_id.max(id.as_u64() + 1);
        self.boids.push(boid);
        self.mark_neighbors_stale();
        Ok(id)
    }

    /// Add an obstacle for every boid to avoid.
    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    fn mark_neighbors_stale(&mut self) {
        for boid in &mut self.boids {
            boid.mark_neighbors_stale();
        }
    }

    // ------------------------------------------------------------------------
    // Stepping
    // ------------------------------------------------------------------------

    /// Advance the simulation by `time_step` seconds. A negative or
    /// non-finite step is ignored.
    pub fn step(&mut self, time_step: f64) {
        if !(time_step.is_finite() && time_step >= 0.0) {
            warn!(time_step, "ignoring invalid time step");
            return;
        }

        // PHASE 1: SNAPSHOT
        let view = FlockView::capture(&self.boids, &self.obstacles, &self.config);

        // PHASE 2: PLAN - reads only the snapshot, writes only its own boid
        self.boids.par_iter_mut().enumerate().for_each(|(index, boid)| {
            boid.plan_next_steer(index, time_step, &view);
        });

        // PHASE 3: APPLY
        self.boids.par_iter_mut().for_each(|boid| {
            boid.apply_next_steer(time_step);
        });

        // PHASE 4: CONTAIN, then measure
        let escaped = self.contain();
        let snapshot = Snapshot::measure(&self.boids);
        self.stats.record_step(time_step, &snapshot, escaped);
        trace!(
            step = self.stats.steps,
            simulated_time = self.stats.simulated_time,
            mean_speed = self.stats.mean_speed,
            "flock step"
        );
    }

    /// Keep boids inside the sphere. Returns how many were outside it.
    ///
    /// Wrap mode teleports every escaped boid and does not count it. Avoid
    /// mode counts escapes and only wraps boids past the fallback margin.
    fn contain(&mut self) -> u64 {
        let center = self.config.sphere_center;
        let radius = self.config.sphere_radius;
        let inset = self.config.wrap_inset;
        match self.config.containment {
            ContainmentMode::Wrap => {
                for boid in &mut self.boids {
                    if let Some(wrapped) = sphere_wrap_around(boid.position(), center, radius, inset) {
                        boid.set_position(wrapped);
                    }
                }
                0
            }
            ContainmentMode::Avoid => {
                let fallback_radius = radius * self.config.avoid_wrap_margin;
                let mut escaped = 0;
                for boid in &mut self.boids {
                    let distance = boid.position().distance(center);
                    if distance > radius {
                        escaped += 1;
                    }
                    if distance > fallback_radius {
                        warn!(boid = %boid.id(), distance, "boid escaped containment, wrapping");
                        let inward = (center - boid.position()).normalize_or_0();
                        boid.set_position(center + inward * (radius * inset));
                    }
                }
                escaped
            }
        }
    }

    /// One frame of the run loop: step unless paused, honoring a pending
    /// single step. Returns true if a step was taken.
    ///
    /// `frame_time` is used as the time step in [`TimeStepMode::RealTime`];
    /// [`TimeStepMode::Fixed`] uses `1 / fixed_fps`. A real-time frame time
    /// that is negative or not finite is skipped and returns `false`.
    pub fn advance(&mut self, frame_time: f64) -> bool {
        if self.config.time_step == TimeStepMode::RealTime && !(frame_time.is_finite() && frame_time >= 0.0) {
            warn!(frame_time, "skipping step with invalid frame time");
            return false;
        }
        let flags = self.config.flags;
        if flags.contains(RunFlags::PAUSED) {
            if !flags.contains(RunFlags::SINGLE_STEP) {
                return false;
            }
            self.config.flags.remove(RunFlags::SINGLE_STEP);
        }
        let time_step = match self.config.time_step {
            TimeStepMode::Fixed => self.config.fixed_time_step(),
            TimeStepMode::RealTime => frame_time,
        };
        self.step(time_step);
        true
    }

    /// [`Self::advance`] using the renderer's frame time, then draw.
    pub fn run_frame<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> bool {
        let stepped = self.advance(renderer.frame_time());
        self.draw(renderer);
        stepped
    }

    // ------------------------------------------------------------------------
    // Run control
    // ------------------------------------------------------------------------

    /// Pause or resume.
    pub fn toggle_paused(&mut self) {
        self.config.flags.toggle(RunFlags::PAUSED);
    }

    /// Pause and take exactly one step on the next [`Self::advance`].
    pub fn request_single_step(&mut self) {
        self.config.flags.insert(RunFlags::PAUSED | RunFlags::SINGLE_STEP);
    }

    /// Show or hide steering annotations.
    pub fn toggle_annotation(&mut self) {
        self.config.flags.toggle(RunFlags::ANNOTATE);
    }

    /// Switch between wrap-around and avoidance containment.
    pub fn set_containment(&mut self, mode: ContainmentMode) {
        self.config.containment = mode;
    }

    /// Switch predictive avoidance weighting.
    pub fn set_avoid_blend(&mut self, blend: AvoidBlend) {
        self.config.avoid_blend = blend;
    }

    /// True while paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.config.flags.contains(RunFlags::PAUSED)
    }

    /// The boid annotations focus on.
    #[must_use]
    pub fn selected_boid(&self) -> Option<&Boid> {
        self.boids.get(self.selected)
    }

    /// Move the focus to the next boid, wrapping at the end.
    pub fn select_next_boid(&mut self) {
        if !self.boids.is_empty() {
            self.selected = (self.selected + 1) % self.boids.len();
        }
    }

    // ------------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------------

    /// Draw every boid, cylinder obstacles and, with
    /// [`RunFlags::ANNOTATE`], the steering of the selected boid and its
    /// neighbors.
    pub fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        for boid in &self.boids {
            boid.draw(renderer, None);
        }
        for obstacle in &self.obstacles {
            if let Obstacle::Cylinder(cylinder) = obstacle {
                line_segment(
                    renderer,
                    cylinder.endpoint(),
                    cylinder.far_endpoint(),
                    Color::splat(OBSTACLE_COLOR),
                    cylinder.radius(),
                    OBSTACLE_SIDES,
                );
            }
        }
        if self.config.flags.contains(RunFlags::ANNOTATE) {
            if let Some(selected) = self.selected_boid() {
                selected.draw_annotation(renderer);
                for neighbor in selected.neighbors() {
                    if let Some(boid) = self.boids.get(neighbor.index) {
                        boid.draw_annotation(renderer);
                    }
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// All boids in insertion order.
    #[must_use]
    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    /// Boid with the given id.
    #[must_use]
    pub fn boid(&self, id: BoidId) -> Option<&Boid> {
        self.boids.iter().find(|b| b.id() == id)
    }

    /// Mutable access to the boid with the given id.
    pub fn boid_mut(&mut self, id: BoidId) -> Option<&mut Boid> {
        self.boids.iter_mut().find(|b| b.id() == id)
    }

    /// Obstacles; the first is the containment sphere.
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Statistics so far.
    #[must_use]
    pub fn stats(&self) -> &FlockStats {
        &self.stats
    }

    /// Current configuration, including run flags.
    #[must_use]
    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    /// Number of boids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boids.len()
    }

    /// True if there are no boids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }
}
