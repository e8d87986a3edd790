#![forbid(unsafe_code)]

//! Cooperative one-shot timers.
//!
//! panview runs on a single thread and never spawns timer threads. A
//! [`OneShotTimer`] is a deadline owned by the state machine that armed it;
//! the owner polls it from its `tick(now)`/`poll(now)` method and reports
//! the deadline upward so the event loop knows when to wake.
//!
//! # Invariants
//!
//! 1. Arming or cancelling bumps the generation. A [`TimerToken`] handed out
//!    by an earlier `arm` is never current again.
//! 2. `fire(now)` yields at most one token per `arm`.
//! 3. Dropping the owner drops the timer: nothing can fire afterwards.
//!
//! # Failure Modes
//!
//! - Polling late is harmless: `fire` reports the overdue deadline once.
//! - Polling with a clock earlier than the arm time simply keeps waiting.

use web_time::{Duration, Instant};

/// Identifies one arming of a [`OneShotTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    generation: u64,
}

impl TimerToken {
    /// Generation the timer had when this token was issued.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// A cancellable, re-armable one-shot deadline.
#[derive(Debug, Clone, Default)]
pub struct OneShotTimer {
    deadline: Option<Instant>,
    generation: u64,
}

impl OneShotTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the timer to fire `delay` after `now`.
    pub fn arm(&mut self, now: Instant, delay: Duration) -> TimerToken {
        self.generation = self.generation.wrapping_add(1);
        self.deadline = Some(now + delay);
        TimerToken {
            generation: self.generation,
        }
    }

    /// Disarm the timer. Idempotent.
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            self.generation = self.generation.wrapping_add(1);
        }
    }

    /// Whether a deadline is pending.
    #[inline]
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The pending deadline, if any.
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left until the deadline, zero if overdue.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Whether `token` belongs to the current, still pending arming.
    #[must_use]
    pub fn is_current(&self, token: TimerToken) -> bool {
        self.deadline.is_some() && token.generation == self.generation
    }

    /// If the deadline has passed, disarm and return the token of the arming
    /// that expired.
    pub fn fire(&mut self, now: Instant) -> Option<TimerToken> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                Some(TimerToken {
                    generation: self.generation,
                })
            }
            _ => None,
        }
    }
}

/// Earliest of two optional deadlines.
#[must_use]
pub fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
