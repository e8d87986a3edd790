#![forbid(unsafe_code)]

//! Delayed link activation.
//!
//! A click that lands on a link is not delivered straight away. The link is
//! highlighted first, and the release goes to the engine only after
//! `confirm_delay`, which leaves room to notice that the tap was the start
//! of a pan or that a new page load made the link meaningless.
//!
//! # Invariants
//!
//! 1. At most one link is pending. Beginning a new one replaces the old.
//! 2. A pending link whose load generation no longer matches is dropped,
//!    never dispatched.
//! 3. After `cancel()` the timer can no longer deliver the old release.

use panview_core::{Duration, Instant, OneShotTimer, PointerEvent, RectF, TimerToken};

#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    /// Highlight time before the click is dispatched (default: 500ms).
    pub confirm_delay: Duration,
    /// Radius, in screen px, within which a near-miss tap snaps onto a link
    /// (default: 8).
    pub touch_slop: f64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            confirm_delay: Duration::from_millis(500),
            touch_slop: 8.0,
        }
    }
}

#[derive(Debug, Clone)]
struct PendingLink {
    release: PointerEvent,
    highlight: RectF,
    load_generation: u64,
    url: Option<String>,
    token: TimerToken,
}

/// What the confirmation timer decided.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkOutcome {
    /// Deliver this release to the engine.
    Dispatch {
        release: PointerEvent,
        url: Option<String>,
    },
    /// The page changed underneath; the click was dropped.
    Stale,
}

#[derive(Debug, Clone)]
pub struct LinkConfirmation {
    config: LinkConfig,
    pending: Option<PendingLink>,
    timer: OneShotTimer,
}

impl LinkConfirmation {
    #[must_use]
    pub fn new(config: LinkConfig) -> Self {
        Self {
            config,
            pending: None,
            timer: OneShotTimer::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Rectangle (document coordinates) of the highlighted link.
    #[must_use]
    pub fn highlight(&self) -> Option<RectF> {
        self.pending.as_ref().map(|p| p.highlight)
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Hold `release` back until the confirm delay passes.
    pub fn begin(
        &mut self,
        release: PointerEvent,
        highlight: RectF,
        url: Option<String>,
        load_generation: u64,
        now: Instant,
    ) {
        let token = self.timer.arm(now, self.config.confirm_delay);
        self.pending = Some(PendingLink {
            release,
            highlight,
            load_generation,
            url,
            token,
        });
    }

    /// Drop the pending link. Returns its highlight if there was one.
    pub fn cancel(&mut self) -> Option<RectF> {
        self.timer.cancel();
        self.pending.take().map(|p| p.highlight)
    }

    /// Resolve the pending link if its timer is due.
    pub fn poll(&mut self, now: Instant, load_generation: u64) -> Option<LinkOutcome> {
        let fired = self.timer.fire(now)?;
        let pending = self.pending.take()?;
        if pending.token != fired {
            return None;
        }
        if pending.load_generation != load_generation {
            return Some(LinkOutcome::Stale);
        }
        Some(LinkOutcome::Dispatch {
            release: pending.release,
            url: pending.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panview_core::PointF;

    fn release(t: Instant) -> PointerEvent {
        PointerEvent::release(PointF::new(10.0, 10.0), t)
    }

    #[test]
    fn dispatches_after_delay() {
        let t0 = Instant::now();
        let mut link = LinkConfirmation::new(LinkConfig::default());
        let rect = RectF::new(0.0, 0.0, 50.0, 20.0);
        link.begin(release(t0), rect, Some("about:a".into()), 1, t0);
        assert_eq!(link.highlight(), Some(rect));
        assert_eq!(link.poll(t0 + Duration::from_millis(499), 1), None);
        match link.poll(t0 + Duration::from_millis(500), 1) {
            Some(LinkOutcome::Dispatch { url, .. }) => assert_eq!(url.as_deref(), Some("about:a")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!link.is_pending());
    }

    #[test]
    fn new_load_makes_it_stale() {
        let t0 = Instant::now();
        let mut link = LinkConfirmation::new(LinkConfig::default());
        link.begin(release(t0), RectF::default(), None, 1, t0);
        assert_eq!(
            link.poll(t0 + Duration::from_secs(1), 2),
            Some(LinkOutcome::Stale)
        );
    }

    #[test]
    fn cancel_silences_timer() {
        let t0 = Instant::now();
        let mut link = LinkConfirmation::new(LinkConfig::default());
        let rect = RectF::new(1.0, 2.0, 3.0, 4.0);
        link.begin(release(t0), rect, None, 1, t0);
        assert_eq!(link.cancel(), Some(rect));
        assert_eq!(link.cancel(), None);
        assert_eq!(link.poll(t0 + Duration::from_secs(1), 1), None);
    }

    #[test]
    fn second_link_replaces_first() {
        let t0 = Instant::now();
        let mut link = LinkConfirmation::new(LinkConfig::default());
        link.begin(release(t0), RectF::default(), Some("a".into()), 1, t0);
        let t1 = t0 + Duration::from_millis(300);
        link.begin(release(t1), RectF::default(), Some("b".into()), 1, t1);
        assert_eq!(link.poll(t0 + Duration::from_millis(600), 1), None);
        match link.poll(t1 + Duration::from_millis(500), 1) {
            Some(LinkOutcome::Dispatch { url, .. }) => assert_eq!(url.as_deref(), Some("b")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
