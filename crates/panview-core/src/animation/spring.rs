#![forbid(unsafe_code)]

//! Damped harmonic oscillator (spring).
//!
//! Drives overscroll bounce-back: when a drag or fling leaves the content
//! past its bounds, a spring pulls the overshoot back to zero.
//!
//!   F = -stiffness × (position - target) - damping × velocity
//!
//! # Integration
//!
//! Semi-implicit Euler, with large `dt` subdivided into steps of at most
//! 4ms so that stiff springs stay stable at low frame rates.
//!
//! # Invariants
//!
//! 1. `position()` is the raw position in whatever unit the owner uses
//!    (scene pixels for overscroll).
//! 2. A spring at rest stays at rest until `set_target()`, `impulse()` or
//!    `reset()`.
//! 3. Stiffness is at least 0.1 and damping at least 0.
//!
//! # Failure Modes
//!
//! - Zero damping: the spring oscillates forever and never reports rest.
//!   Owners that need termination must keep damping positive.

use web_time::Duration;

use super::Animation;

/// Maximum dt per integration step (4ms).
const MAX_STEP_SECS: f64 = 0.004;

/// Position delta below which the spring is considered at rest.
const DEFAULT_REST_THRESHOLD: f64 = 0.001;

/// Velocity below which (combined with position) the spring is at rest.
const DEFAULT_VELOCITY_THRESHOLD: f64 = 0.01;

const MIN_STIFFNESS: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct Spring {
    position: f64,
    velocity: f64,
    target: f64,
    initial: f64,
    stiffness: f64,
    damping: f64,
    rest_threshold: f64,
    velocity_threshold: f64,
    at_rest: bool,
}

impl Spring {
    /// Spring starting at `initial`, pulled toward `target`.
    ///
    /// Defaults: stiffness 170, damping 26 (slightly underdamped).
    #[must_use]
    pub fn new(initial: f64, target: f64) -> Self {
        Self {
            position: initial,
            velocity: 0.0,
            target,
            initial,
            stiffness: 170.0,
            damping: 26.0,
            rest_threshold: DEFAULT_REST_THRESHOLD,
            velocity_threshold: DEFAULT_VELOCITY_THRESHOLD,
            at_rest: false,
        }
    }

    #[must_use]
    pub fn with_stiffness(mut self, k: f64) -> Self {
        self.stiffness = k.max(MIN_STIFFNESS);
        self
    }

    #[must_use]
    pub fn with_damping(mut self, c: f64) -> Self {
        self.damping = c.max(0.0);
        self
    }

    /// Start with a non-zero velocity (e.g. the fling that hit the bound).
    #[must_use]
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }

    #[must_use]
    pub fn with_rest_threshold(mut self, threshold: f64) -> Self {
        self.rest_threshold = threshold.abs();
        self
    }

    #[must_use]
    pub fn with_velocity_threshold(mut self, threshold: f64) -> Self {
        self.velocity_threshold = threshold.abs();
        self
    }

    #[inline]
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Change the target. Wakes the spring if it moved beyond the rest
    /// threshold.
    pub fn set_target(&mut self, target: f64) {
        if (self.target - target).abs() > self.rest_threshold {
            self.target = target;
            self.at_rest = false;
        }
    }

    /// Add to the velocity. Wakes the spring.
    pub fn impulse(&mut self, velocity_delta: f64) {
        self.velocity += velocity_delta;
        self.at_rest = false;
    }

    #[inline]
    #[must_use]
    pub fn is_at_rest(&self) -> bool {
        self.at_rest
    }

    /// Critical damping coefficient for the current stiffness.
    #[must_use]
    pub fn critical_damping(&self) -> f64 {
        2.0 * self.stiffness.sqrt()
    }

    fn step(&mut self, dt: f64) {
        let displacement = self.position - self.target;
        let acceleration = -self.stiffness * displacement - self.damping * self.velocity;
        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;
    }

    /// Advance by `dt`, subdividing for stability.
    pub fn advance(&mut self, dt: Duration) {
        if self.at_rest {
            return;
        }
        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 {
            let step_dt = remaining.min(MAX_STEP_SECS);
            self.step(step_dt);
            remaining -= step_dt;
        }
        if (self.position - self.target).abs() < self.rest_threshold
            && self.velocity.abs() < self.velocity_threshold
        {
            self.position = self.target;
            self.velocity = 0.0;
            self.at_rest = true;
        }
    }
}

impl Animation for Spring {
    fn tick(&mut self, dt: Duration) {
        self.advance(dt);
    }

    fn is_complete(&self) -> bool {
        self.at_rest
    }

    /// Position clamped to [0.0, 1.0]; meaningful only for normalised springs.
    fn value(&self) -> f32 {
        (self.position as f32).clamp(0.0, 1.0)
    }

    fn reset(&mut self) {
        self.position = self.initial;
        self.velocity = 0.0;
        self.at_rest = false;
    }
}
