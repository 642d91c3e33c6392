//! # One-Pole Parameter Smoother
//!
//! A knob in the host can jump from 0 ms to 1500 ms between two samples.
//! Fed straight into a delay line, that jump moves the read position by
//! tens of thousands of samples at once and produces a loud click. We run
//! every control value through a one-pole lowpass before the DSP sees it:
//!
//! ```text
//! smoothed[n] = (1 - c) * target + c * smoothed[n-1]
//! ```
//!
//! - `c = 0.0` → no smoothing, the target passes straight through
//! - `c = 0.8` → a few dozen samples to settle (feedback, dry/wet)
//! - `c = 0.99` → a few hundred samples to settle (delay times)
//!
//! The coefficient is a fixed number per sample, not a time constant, so
//! the smoothing time in milliseconds scales inversely with sample rate.
//! Delay times get the slow coefficient because the delay read position
//! is the parameter the ear is most sensitive to; a slow glide turns a
//! click into a short, tape-like pitch bend.

/// Coefficient for delay-time parameters.
pub const SLOW_COEFFICIENT: f32 = 0.99;

/// Coefficient for feedback and dry/wet parameters.
pub const FAST_COEFFICIENT: f32 = 0.8;

/// `(1 - c) * raw + c * previous`: one step of the smoothing recursion.
#[inline]
pub fn smooth(raw_target: f32, previous: f32, coefficient: f32) -> f32 {
    (1.0 - coefficient) * raw_target + coefficient * previous
}

/// A control value with a raw target and its smoothed counterpart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSmoother {
    /// Latest value handed in by the host. May change at any time.
    target: f32,

    /// Output of the recursion after the most recent [`next()`](Self::next).
    smoothed: f32,

    /// Weight of the previous smoothed value, in `[0, 1)`.
    coefficient: f32,
}

impl ParameterSmoother {
    /// Create a smoother resting at `initial`.
    pub fn new(initial: f32, coefficient: f32) -> Self {
        debug_assert!((0.0..1.0).contains(&coefficient));
        Self {
            target: initial,
            smoothed: initial,
            coefficient,
        }
    }

    pub fn slow(initial: f32) -> Self {
        Self::new(initial, SLOW_COEFFICIENT)
    }

    pub fn fast(initial: f32) -> Self {
        Self::new(initial, FAST_COEFFICIENT)
    }

    /// Set the value the smoother glides towards. Never fails; range
    /// limiting is the caller's business.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Advance the recursion by one sample and return the new value.
    ///
    /// Call exactly once per processed sample.
    #[inline]
    pub fn next(&mut self) -> f32 {
        self.smoothed = smooth(self.target, self.smoothed, self.coefficient);
        self.smoothed
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// The value produced by the most recent [`next()`](Self::next).
    pub fn current(&self) -> f32 {
        self.smoothed
    }

    /// Jump straight to the target, skipping the glide.
    pub fn snap_to_target(&mut self) {
        self.smoothed = self.target;
    }

    /// Put both the target and the smoothed value at `value`.
    pub fn reset(&mut self, value: f32) {
        self.target = value;
        self.smoothed = value;
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
