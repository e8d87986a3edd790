#![forbid(unsafe_code)]

//! Animation primitives driven by explicit time deltas.
//!
//! Animations never read a clock. Owners compute `dt` from the `now` they are
//! handed and call [`Animation::tick`]; this keeps every state machine in
//! panview deterministic under test.
//!
//! - [`Spring`]: damped harmonic oscillator, used for overscroll bounce-back.
//! - [`Tween`]: fixed-duration eased progress, used for zoom and scrollbar
//!   fades.

pub mod spring;
pub mod tween;

use web_time::Duration;

pub use spring::Spring;
pub use tween::Tween;

/// A time-driven animation producing a normalised value.
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has finished.
    fn is_complete(&self) -> bool;

    /// Current value, normalised to [0.0, 1.0].
    fn value(&self) -> f32;

    /// Return to the initial state.
    fn reset(&mut self);
}

/// Easing curve mapping linear progress in [0, 1] to eased progress.
pub type EasingFn = fn(f32) -> f32;

#[must_use]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

#[must_use]
pub fn ease_in(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t
}

#[must_use]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

#[must_use]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

#[must_use]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}
