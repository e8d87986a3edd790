#![forbid(unsafe_code)]

//! Fixed-duration eased progress.
//!
//! A [`Tween`] runs from 0 to 1 over its duration and reports the eased
//! progress. Owners interpolate whatever they animate (a zoom scale, a pan
//! position, an opacity) with [`Tween::progress`].
//!
//! # Invariants
//!
//! 1. `progress()` is in [0.0, 1.0] and non-decreasing under `tick`.
//! 2. `is_complete()` is true exactly when elapsed time reaches the duration.
//!
//! # Failure Modes
//!
//! - Zero duration: clamped to 1ns, so the first non-zero tick completes it.

use web_time::Duration;

use super::{Animation, EasingFn, linear};

#[derive(Debug, Clone)]
pub struct Tween {
    duration: Duration,
    elapsed: Duration,
    easing: EasingFn,
}

impl Tween {
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            duration: duration.max(Duration::from_nanos(1)),
            elapsed: Duration::ZERO,
            easing: linear,
        }
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Eased progress as f64, for interpolating scene values.
    #[must_use]
    pub fn progress(&self) -> f64 {
        f64::from(self.value())
    }

    /// Interpolate between `from` and `to` at the current progress.
    #[must_use]
    pub fn interpolate(&self, from: f64, to: f64) -> f64 {
        from + (to - from) * self.progress()
    }

    /// Jump to the end.
    pub fn finish(&mut self) {
        self.elapsed = self.duration;
    }
}

impl Animation for Tween {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (self.easing)(t as f32)
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}
