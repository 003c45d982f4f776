//! Kinematic agent: a local space plus speed, moved by steering forces.
//!
//! # Integration
//!
//! One call to [`Agent::integrate`] is one simulation step:
//!
//! 1. Truncate the steering force to `max_force`
//! 2. Divide by mass to get acceleration
//! 3. `new_velocity = forward * speed + acceleration * dt`
//! 4. Clamp its length to `[0, max_speed]` as the new speed
//! 5. If the new speed is positive, rebuild the frame around the new heading
//!    and move the position along it
//!
//! The orientation is rebuilt from scratch every step instead of being rotated
//! incrementally, so it cannot drift away from orthonormal. A rebuilt frame
//! that still fails the orthonormality check (for instance because the up
//! reference was parallel to the new heading) is discarded: the agent keeps
//! its previous frame and position but takes the new speed. A non-finite
//! velocity (from a non-finite force or time step) is discarded whole: speed,
//! frame and position all stay as they were.
//!
//! # Example
//!
//! ```
//! use aviary_core::agent::Agent;
//! use aloft::Vec3;
//!
//! let mut agent = Agent::new();
//! agent.steer(Vec3::new(0.0, 0.0, 1.0), 1.0);
//! assert_eq!(agent.speed(), 1.0);
//! assert_eq!(agent.position(), Vec3::new(0.0, 0.0, 1.0));
//! assert_eq!(agent.velocity(), agent.forward() * agent.speed());
//! ```

use aloft::{scalar::clip, LocalSpace, Vec3, VectorExt};
use tracing::debug;

/// What [`Agent::integrate`] did to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUpdate {
    /// New frame and position committed.
    Committed,
    /// Update failed validation; previous frame and position kept.
    Discarded,
    /// Speed reached zero; frame left as it was.
    Stationary,
}

/// A steerable body with a pose and a forward speed.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    frame: LocalSpace,
    mass: f64,
    speed: f64,
    max_speed: f64,
    max_force: f64,
    discarded_frame_updates: u64,
}

impl Default for Agent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent {
    /// At rest at the origin with identity orientation, mass 1,
    /// `max_speed` 10 and `max_force` 3.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frame: LocalSpace::identity(),
            mass: 1.0,
            speed: 0.0,
            max_speed: 10.0,
            max_force: 3.0,
            discarded_frame_updates: 0,
        }
    }

    /// Replace the speed and force limits.
    #[must_use]
    pub fn with_limits(mut self, max_speed: f64, max_force: f64) -> Self {
        self.max_speed = max_speed;
        self.max_force = max_force;
        self
    }

    /// Replace the mass. Must be positive.
    #[must_use]
    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Replace the pose.
    #[must_use]
    pub fn with_frame(mut self, frame: LocalSpace) -> Self {
        self.frame = frame;
        self
    }

    /// Replace the speed.
    #[must_use]
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Current pose.
    #[must_use]
    pub fn frame(&self) -> &LocalSpace {
        &self.frame
    }

    /// Lateral axis.
    #[must_use]
    pub fn side(&self) -> Vec3 {
        self.frame.side()
    }

    /// Vertical axis.
    #[must_use]
    pub fn up(&self) -> Vec3 {
        self.frame.up()
    }

    /// Heading.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.frame.forward()
    }

    /// Position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.frame.position()
    }

    /// Velocity, always `forward * speed`.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.forward() * self.speed
    }

    /// Forward speed.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Mass.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Speed upper limit.
    #[must_use]
    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// Steering force upper limit.
    #[must_use]
    pub fn max_force(&self) -> f64 {
        self.max_force
    }

    /// How many frame updates failed validation and were dropped.
    #[must_use]
    pub fn discarded_frame_updates(&self) -> u64 {
        self.discarded_frame_updates
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Replace the whole pose at once.
    pub fn set_frame(&mut self, frame: LocalSpace) {
        self.frame = frame;
    }

    /// Move without changing orientation.
    pub fn set_position(&mut self, position: Vec3) {
        self.frame = self.frame.with_position(position);
    }

    /// Acceleration a steering force would produce, after the force limit.
    #[must_use]
    pub fn acceleration_for(&self, steering_force: Vec3) -> Vec3 {
        steering_force.truncate_length(self.max_force) / self.mass
    }

    /// Advance one step under `steering_force`, banking toward `up_reference`.
    pub fn integrate(&mut self, steering_force: Vec3, time_step: f64, up_reference: Vec3) -> FrameUpdate {
        let acceleration = self.acceleration_for(steering_force);
        let new_velocity = self.velocity() + acceleration * time_step;
        if !steering_force.is_finite() || !new_velocity.is_finite() {
            self.discarded_frame_updates += 1;
            debug!(
                steering_force = %steering_force,
                time_step,
                discarded = self.discarded_frame_updates,
                "discarding non-finite velocity update"
            );
            return FrameUpdate::Discarded;
        }
        let new_speed = clip(new_velocity.length(), 0.0, self.max_speed);
        self.speed = new_speed;

        if new_speed <= 0.0 {
            return FrameUpdate::Stationary;
        }

        let new_forward = new_velocity.normalize_or_0();
        let new_position = self.position() + new_forward * new_speed * time_step;
        let candidate = self
            .frame
            .rotate_to_new_forward(new_forward, up_reference)
            .with_position(new_position);

        if candidate.is_orthonormal() {
            self.frame = candidate;
            FrameUpdate::Committed
        } else {
            self.discarded_frame_updates += 1;
            debug!(
                forward = %new_forward,
                up_reference = %up_reference,
                discarded = self.discarded_frame_updates,
                "discarding non-orthonormal frame update"
            );
            FrameUpdate::Discarded
        }
    }

    /// [`Self::integrate`] using the current up axis as the up reference.
    pub fn steer(&mut self, steering_force: Vec3, time_step: f64) -> FrameUpdate {
        let up = self.up();
        self.integrate(steering_force, time_step, up)
    }
}
