//! Boids: steering agents that flock.
//!
//! A [`Boid`] wraps a kinematic [`Agent`] with the state flocking needs: a
//! cache of nearest neighbors, low-pass filters for steering and roll, and
//! the steering force planned for the current step.
//!
//! # Two-phase step
//!
//! - [`Boid::plan_next_steer`] reads the pre-step [`FlockView`] and writes
//!   only this boid's own planning state. Kinematic state is untouched.
//! - [`Boid::apply_next_steer`] integrates the planned force.
//!
//! The flock runs every plan before any apply, so a boid's decision never
//! depends on whether a neighbor has already moved this step.
//!
//! Steering behaviors live in [`steering`], obstacle avoidance in
//! [`avoidance`] and neighbor caching in [`neighbors`].

pub mod avoidance;
pub mod neighbors;
pub mod steering;

use std::fmt;

use aloft::{LocalSpace, Vec3};
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, FrameUpdate};
use crate::blender::Blender;
use crate::config::BoidParams;
use crate::render::{line_segment, Color, Renderer, LINE_RADIUS, LINE_SIDES};
use crate::view::FlockView;

pub use avoidance::Collision;
pub use neighbors::Neighbor;

/// Length scale for drawing steering annotations.
const ANNOTATION_SCALE: f64 = 0.05;

/// Avoidance rays fainter than this are not drawn.
const MIN_ANNOTATED_AVOID_WEIGHT: f64 = 0.01;

// ============================================================================
// BoidId
// ============================================================================

/// Unique identifier for a boid within a flock.
///
/// Ids order neighbor ties, so flock results do not depend on the order
/// boids were inserted.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BoidId(u64);

impl BoidId {
    /// Creates a new `BoidId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for BoidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoidId({})", self.0)
    }
}

impl fmt::Display for BoidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BoidId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<BoidId> for u64 {
    fn from(id: BoidId) -> Self {
        id.0
    }
}

// ============================================================================
// Annotation
// ============================================================================

/// Weighted steering components from the most recent plan, kept for drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SteerAnnotation {
    /// Weighted separation
    pub separation: Vec3,
    /// Weighted alignment
    pub alignment: Vec3,
    /// Weighted cohesion
    pub cohesion: Vec3,
    /// Weighted obstacle avoidance
    pub avoidance: Vec3,
    /// Final steering force after smoothing and anti-stall
    pub combined: Vec3,
    /// Point the strongest avoidance reacted to
    pub avoid_poi: Vec3,
    /// Weight of the strongest avoidance
    pub avoid_weight: f64,
}

// ============================================================================
// Boid
// ============================================================================

/// A flocking agent.
#[derive(Debug, Clone)]
pub struct Boid {
    id: BoidId,
    agent: Agent,
    params: BoidParams,
    color: Color,
    steer_memory: Blender,
    up_memory: Blender,
    neighbors: Vec<Neighbor>,
    time_since_neighbor_refresh: f64,
    neighbors_stale: bool,
    next_steer: Vec3,
    wander_state: Vec3,
    annotation: SteerAnnotation,
}

impl Boid {
    /// Boid at the origin with identity orientation, flying at `min_speed`.
    #[must_use]
    pub fn new(id: BoidId, params: BoidParams) -> Self {
        let agent = Agent::new()
            .with_limits(params.max_speed, params.max_force)
            .with_mass(params.mass)
            .with_speed(params.min_speed());
        Self {
            id,
            up_memory: Blender::with_value(agent.up()),
            agent,
            params,
            color: Color::splat(0.65),
            steer_memory: Blender::new(),
            neighbors: Vec::new(),
            time_since_neighbor_refresh: 0.0,
            neighbors_stale: true,
            next_steer: Vec3::ZERO,
            wander_state: Vec3::ZERO,
            annotation: SteerAnnotation::default(),
        }
    }

    /// Replace the pose; the roll filter restarts from the new up axis.
    #[must_use]
    pub fn with_frame(mut self, frame: LocalSpace) -> Self {
        self.agent.set_frame(frame);
        self.up_memory = Blender::with_value(frame.up());
        self
    }

    /// Replace the speed.
    #[must_use]
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.agent = self.agent.with_speed(speed);
        self
    }

    /// Replace the body color.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Identity within the flock.
    #[must_use]
    pub fn id(&self) -> BoidId {
        self.id
    }

    /// Underlying kinematic agent.
    #[must_use]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Tuning parameters.
    #[must_use]
    pub fn params(&self) -> &BoidParams {
        &self.params
    }

    /// Pose.
    #[must_use]
    pub fn frame(&self) -> &LocalSpace {
        self.agent.frame()
    }

    /// Position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.agent.position()
    }

    /// Heading.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.agent.forward()
    }

    /// Forward speed.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.agent.speed()
    }

    /// Velocity.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.agent.velocity()
    }

    /// Body color.
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Steering force planned for the current step.
    #[must_use]
    pub fn next_steer(&self) -> Vec3 {
        self.next_steer
    }

    /// Steering breakdown from the most recent plan.
    #[must_use]
    pub fn annotation(&self) -> &SteerAnnotation {
        &self.annotation
    }

    /// Move without changing orientation or speed.
    pub fn set_position(&mut self, position: Vec3) {
        self.agent.set_position(position);
    }

    // ------------------------------------------------------------------------
    // Two-phase step
    // ------------------------------------------------------------------------

    /// Decide this step's steering force from the pre-step `view`.
    ///
    /// `index` is this boid's position in the flock (and in `view`). Updates
    /// the neighbor cache, both low-pass filters' inputs for steering and the
    /// annotation; leaves speed and pose alone.
    pub fn plan_next_steer(&mut self, index: usize, time_step: f64, view: &FlockView<'_>) -> Vec3 {
        self.update_neighbors(index, time_step, view);

        let p = &self.params;
        let forward = self.forward() * p.weight_forward;
        let separation = self.steer_to_separate(view) * p.weight_separate;
        let alignment = self.steer_to_align(view) * p.weight_align;
        let cohesion = self.steer_to_cohere(view) * p.weight_cohere;
        let avoid = self.steer_to_avoid(view);
        let avoidance = avoid.steering * p.weight_avoid;

        let smoothness = p.steer_smoothness;
        let smoothed = self
            .steer_memory
            .blend(forward + separation + alignment + cohesion + avoidance, smoothness);
        let combined = self.anti_stall_adjustment(smoothed);

        self.annotation = SteerAnnotation {
            separation,
            alignment,
            cohesion,
            avoidance,
            combined,
            avoid_poi: avoid.poi,
            avoid_weight: avoid.weight,
        };
        self.next_steer = combined;
        combined
    }

    /// Integrate the planned steering force.
    pub fn apply_next_steer(&mut self, time_step: f64) -> FrameUpdate {
        let acceleration = self.agent.acceleration_for(self.next_steer);
        let up = self.up_reference(acceleration);
        self.agent.integrate(self.next_steer, time_step, up)
    }

    // ------------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------------

    /// Draw the body as an irregular tetrahedron: nose, apex and two
    /// wingtips. `color` overrides the boid's own color.
    pub fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R, color: Option<Color>) {
        let frame = self.frame();
        let r = self.params.body_radius;
        let diameter = r * 2.0;
        let nose = frame.position() + frame.forward() * r;
        let tail = frame.position() - frame.forward() * r;
        let apex = tail + frame.up() * (0.25 * diameter) + frame.forward() * (0.1 * diameter);
        let wingtip0 = tail + frame.side() * (0.3 * diameter);
        let wingtip1 = tail - frame.side() * (0.3 * diameter);
        let color = color.unwrap_or(self.color);
        renderer.draw_triangle(nose, apex, wingtip1, color * 1.00);
        renderer.draw_triangle(nose, wingtip0, apex, color * 0.95);
        renderer.draw_triangle(apex, wingtip0, wingtip1, color * 0.90);
        renderer.draw_triangle(nose, wingtip1, wingtip0, color * 0.70);
    }

    /// Draw the steering breakdown as lines from the body, plus a ray to the
    /// point avoidance reacted to (gray for gentle, magenta for strong).
    pub fn draw_annotation<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        let center = self.position();
        let a = &self.annotation;
        for (force, color) in [
            (a.separation, Color::new(1.0, 0.0, 0.0)),
            (a.alignment, Color::new(0.0, 1.0, 0.0)),
            (a.cohesion, Color::new(0.0, 0.0, 1.0)),
            (a.avoidance, Color::new(1.0, 0.0, 1.0)),
            (a.combined, Color::splat(0.5)),
        ] {
            line_segment(renderer, center, center + force * ANNOTATION_SCALE, color, LINE_RADIUS, LINE_SIDES);
        }
        if a.avoid_weight > MIN_ANNOTATED_AVOID_WEIGHT {
            #[allow(clippy::cast_possible_truncation)]
            let t = a.avoid_weight.min(1.0) as f32;
            let color = Color::splat(0.85).lerp(Color::new(1.0, 0.0, 1.0), t);
            line_segment(renderer, center, a.avoid_poi, color, LINE_RADIUS, LINE_SIDES);
        }
    }
}
