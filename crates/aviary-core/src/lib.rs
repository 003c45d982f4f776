//! # Aviary Core
//!
//! Boids flocking simulation for Aviary.
//!
//! A [`Flock`] owns boids, obstacles and a [`FlockConfig`]. Every boid is a
//! kinematic [`Agent`](agent::Agent) steered by Reynolds' three flocking
//! behaviors plus obstacle avoidance, with the geometry provided by
//! [`aloft`].
//!
//! ## Architecture
//!
//! - **Agent**: pose, speed and limits; integrates one steering force per step
//! - **Boid**: plans a steering force from its neighbors and obstacles
//! - **Flock**: snapshot, plan, apply and containment for all boids
//! - **Renderer**: where bodies and annotations are drawn
//!
//! ## Usage
//!
//! ```
//! use aviary_core::{Flock, FlockConfig, RecordingRenderer};
//!
//! let mut config = FlockConfig::with_seed(1);
//! config.boid_count = 10;
//! let mut flock = Flock::new(config).unwrap();
//!
//! let mut renderer = RecordingRenderer::new(1.0 / 60.0);
//! assert!(flock.run_frame(&mut renderer));
//! assert_eq!(renderer.triangle_count(), 40);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod blender;
pub mod boid;
pub mod config;
pub mod error;
pub mod flock;
pub mod render;
pub mod stats;
pub mod view;

#[cfg(test)]
mod tests;

pub use boid::{Boid, BoidId, Collision};
pub use config::{BoidParams, ContainmentMode, FlockConfig, RunFlags};
pub use error::{ConfigError, FlockError};
pub use flock::Flock;
pub use render::{Color, DrawCommand, RecordingRenderer, Renderer};
pub use stats::FlockStats;
