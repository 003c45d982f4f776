//! Scalar helpers shared by the geometry and steering code.
//!
//! All "is it zero / is it equal" questions about derived floating values go
//! through [`within_epsilon`]; exact comparison is reserved for values that
//! were assigned, not computed.

use std::f64::consts::PI;

/// Tolerance for zero, unit-length, perpendicular and parallel tests.
pub const EPSILON: f64 = 1e-13;

/// True when `a` and `b` differ by no more than `epsilon`.
///
/// Returns `false` if either value is NaN.
#[must_use]
pub fn within_epsilon_of(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

/// True when `a` and `b` differ by no more than [`EPSILON`].
#[must_use]
pub fn within_epsilon(a: f64, b: f64) -> bool {
    within_epsilon_of(a, b, EPSILON)
}

/// Constrain `x` to lie between two bounds given in either order.
#[must_use]
pub fn clip(x: f64, bound0: f64, bound1: f64) -> f64 {
    let lo = bound0.min(bound1);
    let hi = bound0.max(bound1);
    if x < lo {
        lo
    } else if x > hi {
        hi
    } else {
        x
    }
}

/// Same as `clip(x, 0, 1)`.
#[must_use]
pub fn clip01(x: f64) -> f64 {
    clip(x, 0.0, 1.0)
}

/// True when `x` lies between `a` and `b` (inclusive, either order).
#[must_use]
pub fn between(x: f64, a: f64, b: f64) -> bool {
    a.min(b) <= x && x <= a.max(b)
}

/// Linear interpolation: `alpha = 0` gives `p`, `alpha = 1` gives `q`.
#[must_use]
pub fn interpolate(alpha: f64, p: f64, q: f64) -> f64 {
    p * (1.0 - alpha) + q * alpha
}

/// Map `x` from the interval `[in0, in1]` onto `[out0, out1]`, unclamped.
///
/// A degenerate input interval maps everything to `out0`.
#[must_use]
pub fn remap_interval(x: f64, in0: f64, in1: f64, out0: f64, out1: f64) -> f64 {
    let span = in1 - in0;
    if span == 0.0 {
        return out0;
    }
    interpolate((x - in0) / span, out0, out1)
}

/// Cosine ease on `[0, 1]`: 0 at 0, 1/2 at 1/2, 1 at 1, flat at both ends.
#[must_use]
pub fn sinusoid(x: f64) -> f64 {
    (1.0 - (x * PI).cos()) / 2.0
}

/// S-shaped ramp from 0 to 1 over the unit interval; clamps outside it.
#[must_use]
pub fn unit_sigmoid_on_01(x: f64) -> f64 {
    sinusoid(clip01(x))
}
