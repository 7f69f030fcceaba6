/// Exponential approach toward a target. Critically damped feel: each step
/// closes a fixed fraction of the remaining distance, never overshoots.
///
/// # Example
/// ```
/// use am_core::ease::approach;
/// let v = approach(0.0, 1.0, 0.05);
/// assert!((v - 0.05).abs() < 1e-6);
/// ```
#[inline(always)]
#[must_use]
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// A value smoothed toward a moving target by a per-frame approach factor.
///
/// Used for mesh rotation (factor 0.05) and overlay hue (factor 0.075):
/// the event handler moves the target, the render loop steps once per frame.
///
/// # Example
/// ```
/// use am_core::ease::Damped;
/// let mut d = Damped::new(0.0, 0.05);
/// d.step(1.0);
/// assert!(d.value() > 0.0 && d.value() < 1.0);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Damped {
    value: f32,
    factor: f32,
}

impl Damped {
    /// Create with an initial value and per-frame approach factor.
    #[must_use]
    pub fn new(initial: f32, factor: f32) -> Self {
        Self {
            value: initial,
            factor,
        }
    }

    /// Advance one frame toward `target`.
    #[inline]
    pub fn step(&mut self, target: f32) -> f32 {
        self.value = approach(self.value, target, self.factor);
        self.value
    }

    /// Current smoothed value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Snap directly to a value (used on re-initialization).
    pub fn reset(&mut self, value: f32) {
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_monotonically_without_overshoot() {
        let mut d = Damped::new(0.0, 0.05);
        let target = 0.5;
        let mut prev = d.value();
        for _ in 0..500 {
            let v = d.step(target);
            assert!(v >= prev, "non-monotonic");
            assert!(v <= target + f32::EPSILON, "overshoot: {v}");
            prev = v;
        }
        assert!((d.value() - target).abs() < 1e-4, "did not converge");
    }

    #[test]
    fn converges_from_above() {
        let mut d = Damped::new(1.0, 0.075);
        for _ in 0..500 {
            d.step(-1.0);
        }
        assert!((d.value() + 1.0).abs() < 1e-3);
    }

    #[test]
    fn constant_target_is_fixed_point() {
        let mut d = Damped::new(0.25, 0.05);
        d.step(0.25);
        assert!((d.value() - 0.25).abs() < f32::EPSILON);
    }
}
