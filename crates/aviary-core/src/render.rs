//! Renderer boundary.
//!
//! The simulation never owns a window or a mesh. It hands triangles and
//! colored line segments to a [`Renderer`] and asks it how long the last
//! frame took. [`RecordingRenderer`] keeps the primitives in memory, which is
//! what tests and the headless runner use.

use aloft::{Vec3, VectorExt};
use serde::Serialize;

/// RGB color, components in `[0, 1]`.
pub type Color = glam::Vec3;

/// Default tube radius for thin annotation lines.
pub const LINE_RADIUS: f64 = 0.01;

/// Default tube facet count for thin annotation lines.
pub const LINE_SIDES: u32 = 3;

/// Sink for draw primitives.
pub trait Renderer {
    /// One flat-shaded triangle.
    fn draw_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, color: Color);

    /// A segment drawn as a tube with `sides` facets.
    fn draw_line_segment(&mut self, a: Vec3, b: Vec3, color: Color, radius: f64, sides: u32);

    /// Seconds elapsed during the last rendered frame.
    fn frame_time(&self) -> f64;
}

/// Draw a segment unless its endpoints coincide.
pub fn line_segment<R: Renderer + ?Sized>(
    renderer: &mut R,
    a: Vec3,
    b: Vec3,
    color: Color,
    radius: f64,
    sides: u32,
) {
    if !(b - a).is_zero_length() {
        renderer.draw_line_segment(a, b, color, radius, sides);
    }
}

/// A recorded draw call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum DrawCommand {
    /// See [`Renderer::draw_triangle`].
    Triangle {
        /// First vertex
        a: Vec3,
        /// Second vertex
        b: Vec3,
        /// Third vertex
        c: Vec3,
        /// Fill color
        color: Color,
    },
    /// See [`Renderer::draw_line_segment`].
    LineSegment {
        /// Start
        a: Vec3,
        /// End
        b: Vec3,
        /// Line color
        color: Color,
        /// Tube radius
        radius: f64,
        /// Tube facets
        sides: u32,
    },
}

/// Renderer that stores every primitive it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    commands: Vec<DrawCommand>,
    frame_time: f64,
}

impl RecordingRenderer {
    /// Empty recorder reporting `frame_time` seconds per frame.
    #[must_use]
    pub fn new(frame_time: f64) -> Self {
        Self {
            commands: Vec::new(),
            frame_time,
        }
    }

    /// Everything drawn since the last [`Self::clear`].
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of triangles recorded.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Triangle { .. }))
            .count()
    }

    /// Number of line segments recorded.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.commands.len() - self.triangle_count()
    }

    /// Forget recorded commands.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Change the reported frame time.
    pub fn set_frame_time(&mut self, frame_time: f64) {
        self.frame_time = frame_time;
    }
}

impl Renderer for RecordingRenderer {
    fn draw_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, color: Color) {
        self.commands.push(DrawCommand::Triangle { a, b, c, color });
    }

    fn draw_line_segment(&mut self, a: Vec3, b: Vec3, color: Color, radius: f64, sides: u32) {
        self.commands.push(DrawCommand::LineSegment {
            a,
            b,
            color,
            radius,
            sides,
        });
    }

    fn frame_time(&self) -> f64 {
        self.frame_time
    }
}
