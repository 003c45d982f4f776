//! One-pole low-pass filter for per-step signals.

use aloft::Vec3;

/// Exponential moving average of a vector signal.
///
/// Starts unset; the first [`Blender::blend`] passes its input straight
/// through. After that each call returns
/// `new * (1 - smoothness) + previous * smoothness`, so `smoothness = 0`
/// disables filtering and values near 1 filter heavily.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Blender {
    value: Option<Vec3>,
}

impl Blender {
    /// Unset filter.
    #[must_use]
    pub const fn new() -> Self {
        Self { value: None }
    }

    /// Filter whose history starts at `value`.
    #[must_use]
    pub const fn with_value(value: Vec3) -> Self {
        Self { value: Some(value) }
    }

    /// Fold `new_value` into the history and return the filtered value.
    pub fn blend(&mut self, new_value: Vec3, smoothness: f64) -> Vec3 {
        let blended = match self.value {
            None => new_value,
            Some(previous) => new_value.lerp(previous, smoothness),
        };
        self.value = Some(blended);
        blended
    }

    /// Current filtered value, if any input has been seen.
    #[must_use]
    pub fn value(&self) -> Option<Vec3> {
        self.value
    }

    /// Overwrite the history.
    pub fn set(&mut self, value: Vec3) {
        self.value = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_value_passes_through() {
        let mut blender = Blender::new();
        assert_eq!(blender.value(), None);
        assert_eq!(blender.blend(Vec3::new(1.0, 2.0, 3.0), 0.9), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_smoothing() {
        let mut blender = Blender::with_value(Vec3::ZERO);
        let out = blender.blend(Vec3::splat(10.0), 0.8);
        assert!((out - Vec3::splat(2.0)).length() < 1e-12);
        let out = blender.blend(Vec3::splat(10.0), 0.8);
        assert!((out - Vec3::splat(3.6)).length() < 1e-12);
        assert_eq!(Blender::with_value(Vec3::X).blend(Vec3::Y, 0.0), Vec3::Y);
        assert_eq!(Blender::with_value(Vec3::X).blend(Vec3::Y, 1.0), Vec3::X);
    }
}
