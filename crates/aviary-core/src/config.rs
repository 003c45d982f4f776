//! Tuning parameters for boids and flocks.
//!
//! Every field has a documented default and every struct deserializes with
//! `#[serde(default)]`, so a JSON file only needs the values it changes.
//! Run-mode switches that older designs kept as global toggles live here as
//! plain fields owned by the [`crate::Flock`].
//!
//! # Example
//!
//! ```
//! use aviary_core::config::{ContainmentMode, FlockConfig};
//!
//! let config: FlockConfig =
//!     serde_json::from_str(r#"{ "boid_count": 50, "containment": "wrap" }"#).unwrap();
//! assert_eq!(config.boid_count, 50);
//! assert_eq!(config.containment, ContainmentMode::Wrap);
//! assert_eq!(config.boid.max_speed, 20.0);
//! assert!(config.validate().is_ok());
//! ```

use aloft::Vec3;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::{in_range, non_negative, positive, ConfigError};

// ============================================================================
// Mode switches
// ============================================================================

/// How boids are kept inside the containment sphere.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContainmentMode {
    /// Teleport boids that leave to the far side; no obstacle avoidance.
    Wrap,
    /// Steer away from obstacles; wrap only as a fallback.
    #[default]
    Avoid,
}

/// Weighting of predictive avoidance near the activation distance.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AvoidBlend {
    /// Sigmoid ramp between 80% and 120% of the activation distance.
    #[default]
    Blend,
    /// All or nothing at the activation distance.
    HardSwitch,
}

/// How predictive and static avoidance are combined.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AvoidCombine {
    /// Keep whichever is longer.
    #[default]
    Max,
    /// Add them.
    Sum,
}

/// Source of the per-frame time step used by [`crate::Flock::advance`].
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimeStepMode {
    /// `1 / fixed_fps` every frame.
    #[default]
    Fixed,
    /// Measured frame time.
    RealTime,
}

/// Initial orientation policy for generated boids.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum InitialHeading {
    /// Uniformly random orientation.
    #[default]
    Uniform,
    /// Forward near `mean`, perturbed by a random vector of length `noise`.
    Aligned {
        /// Mean heading (normalized on use)
        mean: Vec3,
        /// Perturbation length relative to a unit heading
        noise: f64,
    },
}

bitflags! {
    /// Run-loop flags consulted by [`crate::Flock::advance`] and
    /// [`crate::Flock::draw`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct RunFlags: u8 {
        /// Skip steps until resumed.
        const PAUSED = 1 << 0;
        /// Take exactly one step while paused.
        const SINGLE_STEP = 1 << 1;
        /// Draw steering annotations for the selected boid.
        const ANNOTATE = 1 << 2;
    }
}

// ============================================================================
// BoidParams
// ============================================================================

/// Per-boid kinematic limits and steering weights.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoidParams {
    /// Speed upper limit (m/s).
    pub max_speed: f64,
    /// Steering force upper limit.
    pub max_force: f64,
    /// `min_speed = min_speed_factor * max_speed`; also the starting speed.
    pub min_speed_factor: f64,
    /// Mass; acceleration is force / mass.
    pub mass: f64,
    /// Radius of the (spherical) body.
    pub body_radius: f64,

    /// Weight of the constant forward push.
    pub weight_forward: f64,
    /// Weight of separation.
    pub weight_separate: f64,
    /// Weight of alignment.
    pub weight_align: f64,
    /// Weight of cohesion.
    pub weight_cohere: f64,
    /// Weight of obstacle avoidance.
    pub weight_avoid: f64,

    /// Separation falls to zero at this distance.
    pub max_dist_separate: f64,
    /// Alignment falls to zero at this distance.
    pub max_dist_align: f64,
    /// Cohesion falls to zero at this distance.
    pub max_dist_cohere: f64,

    /// Inverse distance exponent for separation.
    pub exponent_separate: f64,
    /// Inverse distance exponent for alignment.
    pub exponent_align: f64,
    /// Inverse distance exponent for cohesion.
    pub exponent_cohere: f64,

    /// Cosine of the separation view cone half-angle (135°).
    pub angle_separate: f64,
    /// Cosine of the alignment view cone half-angle (20°).
    pub angle_align: f64,
    /// Cosine of the cohesion view cone half-angle (90°).
    pub angle_cohere: f64,
    /// Residual weight for neighbors outside a view cone.
    pub outside_angle_weight: f64,

    /// How many nearest neighbors to steer by.
    pub neighbor_count: usize,
    /// Seconds between neighbor cache refreshes.
    pub neighbor_refresh_rate: f64,

    /// Low-pass smoothness for the steering force.
    pub steer_smoothness: f64,
    /// Low-pass smoothness for the roll (up) reference.
    pub up_smoothness: f64,
    /// Global-up bias added to acceleration for roll control.
    pub up_bias: f64,

    /// Anti-stall engages below `min_speed * stall_margin`.
    pub stall_margin: f64,
    /// Anti-stall forward thrust as a fraction of `max_force`.
    pub stall_thrust_factor: f64,

    /// Static avoidance range in body radii.
    pub fly_away_distance_factor: f64,
}

impl Default for BoidParams {
    fn default() -> Self {
        let body_radius = 0.5;
        Self {
            max_speed: 20.0,
            max_force: 100.0,
            min_speed_factor: 0.3,
            mass: 1.0,
            body_radius,
            weight_forward: 4.0,
            weight_separate: 23.0,
            weight_align: 12.0,
            weight_cohere: 18.0,
            weight_avoid: 40.0,
            max_dist_separate: 15.0 * body_radius,
            max_dist_align: 100.0,
            max_dist_cohere: 100.0,
            exponent_separate: 1.0,
            exponent_align: 1.0,
            exponent_cohere: 1.0,
            angle_separate: -0.707,
            angle_align: 0.940,
            angle_cohere: 0.0,
            outside_angle_weight: 0.1,
            neighbor_count: 7,
            neighbor_refresh_rate: 0.5,
            steer_smoothness: 0.8,
            up_smoothness: 0.999,
            up_bias: 0.01,
            stall_margin: 1.5,
            stall_thrust_factor: 0.9,
            fly_away_distance_factor: 20.0,
        }
    }
}

impl BoidParams {
    /// Lowest speed anti-stall tries to hold; also the starting speed.
    #[must_use]
    pub fn min_speed(&self) -> f64 {
        self.max_speed * self.min_speed_factor
    }

    /// Range of static obstacle repulsion.
    #[must_use]
    pub fn fly_away_distance(&self) -> f64 {
        self.body_radius * self.fly_away_distance_factor
    }

    /// Check every field against its allowed range.
    ///
    /// # Errors
    ///
    /// The first field found out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("max_speed", self.max_speed)?;
        non_negative("max_force", self.max_force)?;
        in_range("min_speed_factor", self.min_speed_factor, 0.0, 1.0)?;
        positive("mass", self.mass)?;
        positive("body_radius", self.body_radius)?;
        for (field, value) in [
            ("weight_forward", self.weight_forward),
            ("weight_separate", self.weight_separate),
            ("weight_align", self.weight_align),
            ("weight_cohere", self.weight_cohere),
            ("weight_avoid", self.weight_avoid),
            ("exponent_separate", self.exponent_separate),
            ("exponent_align", self.exponent_align),
            ("exponent_cohere", self.exponent_cohere),
            ("neighbor_refresh_rate", self.neighbor_refresh_rate),
            ("up_bias", self.up_bias),
            ("stall_margin", self.stall_margin),
        ] {
            non_negative(field, value)?;
        }
        positive("max_dist_separate", self.max_dist_separate)?;
        positive("max_dist_align", self.max_dist_align)?;
        positive("max_dist_cohere", self.max_dist_cohere)?;
        positive("fly_away_distance_factor", self.fly_away_distance_factor)?;
        for (field, value) in [
            ("angle_separate", self.angle_separate),
            ("angle_align", self.angle_align),
            ("angle_cohere", self.angle_cohere),
        ] {
            in_range(field, value, -1.0, 1.0)?;
        }
        for (field, value) in [
            ("outside_angle_weight", self.outside_angle_weight),
            ("steer_smoothness", self.steer_smoothness),
            ("up_smoothness", self.up_smoothness),
            ("stall_thrust_factor", self.stall_thrust_factor),
        ] {
            in_range(field, value, 0.0, 1.0)?;
        }
        if self.neighbor_count == 0 {
            return Err(ConfigError::ZeroNeighborCount);
        }
        Ok(())
    }
}

// ============================================================================
// FlockConfig
// ============================================================================

/// Everything a [`crate::Flock`] needs to build and run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlockConfig {
    /// Boids generated by [`crate::Flock::new`].
    pub boid_count: usize,
    /// Seed for placement, orientation and color.
    pub seed: u64,
    /// Containment sphere radius.
    pub sphere_radius: f64,
    /// Containment sphere center.
    pub sphere_center: Vec3,
    /// Wrap-around or avoidance.
    pub containment: ContainmentMode,
    /// Predictive avoidance weighting.
    pub avoid_blend: AvoidBlend,
    /// Predictive and static avoidance combination.
    pub avoid_combine: AvoidCombine,
    /// Predictive avoidance engages this many seconds before impact.
    pub min_time_to_collide: f64,
    /// Fixed or measured frame time.
    pub time_step: TimeStepMode,
    /// Frame rate for [`TimeStepMode::Fixed`].
    pub fixed_fps: f64,
    /// In avoid mode, fallback wrap engages beyond `sphere_radius` times this.
    pub avoid_wrap_margin: f64,
    /// Wrapped boids land at this fraction of `sphere_radius`.
    pub wrap_inset: f64,
    /// Orientation policy for generated boids.
    pub initial_heading: InitialHeading,
    /// Generated boids are placed within this fraction of `sphere_radius`.
    pub spawn_fraction: f64,
    /// Run-loop flags.
    pub flags: RunFlags,
    /// Parameters shared by every boid.
    pub boid: BoidParams,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            boid_count: 200,
            seed: 0,
            sphere_radius: 50.0,
            sphere_center: Vec3::ZERO,
            containment: ContainmentMode::default(),
            avoid_blend: AvoidBlend::default(),
            avoid_combine: AvoidCombine::default(),
            min_time_to_collide: 0.8,
            time_step: TimeStepMode::default(),
            fixed_fps: 60.0,
            avoid_wrap_margin: 1.1,
            wrap_inset: 0.95,
            initial_heading: InitialHeading::default(),
            spawn_fraction: 1.0,
            flags: RunFlags::empty(),
            boid: BoidParams::default(),
        }
    }
}

impl FlockConfig {
    /// Defaults with a given seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Time step used in [`TimeStepMode::Fixed`].
    #[must_use]
    pub fn fixed_time_step(&self) -> f64 {
        1.0 / self.fixed_fps
    }

    /// Check every field against its allowed range.
    ///
    /// # Errors
    ///
    /// The first field found out of range, including those of [`BoidParams`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("sphere_radius", self.sphere_radius)?;
        non_negative("min_time_to_collide", self.min_time_to_collide)?;
        positive("fixed_fps", self.fixed_fps)?;
        if self.avoid_wrap_margin.is_nan() || self.avoid_wrap_margin < 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "avoid_wrap_margin",
                value: self.avoid_wrap_margin,
                min: 1.0,
                max: f64::INFINITY,
            });
        }
        in_range("wrap_inset", self.wrap_inset, 0.0, 1.0)?;
        in_range("spawn_fraction", self.spawn_fraction, 0.0, 1.0)?;
        if let InitialHeading::Aligned { noise, .. } = self.initial_heading {
            non_negative("initial_heading.noise", noise)?;
        }
        self.boid.validate()
    }
}
