#![forbid(unsafe_code)]

//! Kinetic scrolling physics.
//!
//! [`KineticScroller`] turns a press/move/release stream into scroll-position
//! commands on a [`ScrollTarget`]: it decides when a press becomes a pan,
//! locks the pan to one axis when the drag is clearly horizontal or
//! vertical, rubber-bands past the content bounds, and keeps the content
//! moving after release (fling) until friction stops it or a spring pulls
//! the overshoot back.
//!
//! Scroll positions are in scroll space: `(0, 0)` shows the top-left of the
//! content and [`ScrollTarget::maximum_scroll_position`] shows the
//! bottom-right. Overshoot is reported separately, negative past the
//! top/left bound and positive past the bottom/right bound.
//!
//! # State Machine
//!
//! ```text
//!  Inactive ──press──▶ MousePressed ──release, fast or overshooting──▶ Pushing
//!     ▲                    │                                              │
//!     └──── release ───────┘          ◀── velocity and bounce settle ─────┘
//!                                      press during Pushing catches the fling
//! ```
//!
//! # Invariants
//!
//! 1. [`PanFilter::ClaimStarted`] is returned at most once per press.
//! 2. Once claimed, every move and the release are [`PanFilter::Claimed`].
//! 3. The scroll position handed to the target is always within
//!    `[0, maximum]`; anything past that is overshoot, and
//!    `|overshoot| <= max_overshoot`.
//! 4. While dragging, the visible position (position + overshoot) moves
//!    monotonically with the pointer along each unlocked axis.
//! 5. `reset()` returns to Inactive without calling the target.
//!
//! # Failure Modes
//!
//! - A release with no press (e.g. after `reset()`) is passed through.
//! - A pointer that rests before release carries no fling velocity: samples
//!   older than `velocity_timeout` are discarded.
//! - Frame gaps longer than `max_frame_step` are clamped so a stalled event
//!   loop does not teleport the content.

use panview_core::animation::Spring;
use panview_core::{Duration, Instant, PointF, SizeF};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Scroller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollerState {
    /// Nothing going on.
    Inactive,
    /// Pointer is down (possibly dragging).
    MousePressed,
    /// Content moves on its own: fling or bounce-back.
    Pushing,
}

/// Result of offering an event to the pan filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanFilter {
    /// Not a pan (yet); the event continues down the filter chain.
    Passed,
    /// The drag just crossed the start distance. The owner must drop any
    /// buffered click.
    ClaimStarted,
    /// Part of a pan (or a fling catch); swallowed.
    Claimed,
}

impl PanFilter {
    /// Whether the event was swallowed by the pan filter.
    #[inline]
    #[must_use]
    pub fn is_consumed(self) -> bool {
        !matches!(self, Self::Passed)
    }
}

/// What the scroller drives.
pub trait ScrollTarget {
    /// Size of the visible area.
    fn viewport_size(&self) -> SizeF;

    /// Largest valid scroll position (zero on axes that do not scroll).
    fn maximum_scroll_position(&self) -> PointF;

    /// Current scroll position, within `[0, maximum]`.
    fn scroll_position(&self) -> PointF;

    /// Apply a new position and overshoot.
    fn set_scroll_position(&mut self, pos: PointF, overshoot: PointF);

    /// Called on every state transition.
    fn state_changed(&mut self, _old: ScrollerState, _new: ScrollerState, _now: Instant) {}
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for kinetic scrolling.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollerConfig {
    /// Pointer travel (px) before a press becomes a pan (default: 10).
    pub drag_start_distance: f64,
    /// Minor/major ratio below which the pan locks to the major axis
    /// (default: 0.4).
    pub axis_lock_threshold: f64,
    /// Fraction of drag distance applied past a bound (default: 0.5).
    pub overshoot_resistance: f64,
    /// Largest overshoot in px (default: 80).
    pub max_overshoot: f64,
    /// Weight of the newest sample in the velocity average (default: 0.3).
    pub velocity_smoothing: f64,
    /// Release speed (px/s) needed to start a fling (default: 120).
    pub min_fling_velocity: f64,
    /// Fling speed cap (px/s) (default: 6000).
    pub max_velocity: f64,
    /// Exponential decay rate of fling speed, per second (default: 4.0).
    pub deceleration: f64,
    /// Fling speed (px/s) below which motion stops (default: 20).
    pub stop_velocity: f64,
    /// Bounce spring stiffness (default: 170).
    pub bounce_stiffness: f64,
    /// Bounce spring damping (default: 26).
    pub bounce_damping: f64,
    /// Samples older than this at release carry no velocity (default: 100ms).
    pub velocity_timeout: Duration,
    /// Longest physics step per tick (default: 50ms).
    pub max_frame_step: Duration,
}

impl Default for ScrollerConfig {
    fn default() -> Self {
        Self {
            drag_start_distance: 10.0,
            axis_lock_threshold: 0.4,
            overshoot_resistance: 0.5,
            max_overshoot: 80.0,
            velocity_smoothing: 0.3,
            min_fling_velocity: 120.0,
            max_velocity: 6000.0,
            deceleration: 4.0,
            stop_velocity: 20.0,
            bounce_stiffness: 170.0,
            bounce_damping: 26.0,
            velocity_timeout: Duration::from_millis(100),
            max_frame_step: Duration::from_millis(50),
        }
    }
}

impl ScrollerConfig {
    #[must_use]
    pub fn with_drag_start_distance(mut self, px: f64) -> Self {
        self.drag_start_distance = px.max(0.0);
        self
    }

    #[must_use]
    pub fn with_axis_lock_threshold(mut self, ratio: f64) -> Self {
        self.axis_lock_threshold = ratio.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_max_overshoot(mut self, px: f64) -> Self {
        self.max_overshoot = px.max(0.0);
        self
    }

    #[must_use]
    pub fn with_deceleration(mut self, rate: f64) -> Self {
        self.deceleration = rate.max(0.0);
        self
    }
}

// ---------------------------------------------------------------------------
// KineticScroller
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisLock {
    Free,
    Horizontal,
    Vertical,
}

impl AxisLock {
    fn mask(self, p: PointF) -> PointF {
        match self {
            Self::Free => p,
            Self::Horizontal => PointF::new(p.x, 0.0),
            Self::Vertical => PointF::new(0.0, p.y),
        }
    }
}

/// Bounce-back rest thresholds, in px and px/s.
const BOUNCE_REST_PX: f64 = 0.5;
const BOUNCE_REST_VELOCITY: f64 = 5.0;

fn axis(p: PointF, i: usize) -> f64 {
    if i == 0 { p.x } else { p.y }
}

fn set_axis(p: &mut PointF, i: usize, v: f64) {
    if i == 0 {
        p.x = v;
    } else {
        p.y = v;
    }
}

/// Drag, fling and bounce physics for one pannable surface.
pub struct KineticScroller {
    config: ScrollerConfig,
    state: ScrollerState,
    press_pos: PointF,
    last_pos: PointF,
    last_sample: Option<Instant>,
    /// Unresisted scroll position the drag started from.
    drag_origin: PointF,
    claimed: bool,
    caught: bool,
    axis: AxisLock,
    velocity: PointF,
    overshoot: PointF,
    bounce: [Option<Spring>; 2],
    last_tick: Option<Instant>,
}

impl std::fmt::Debug for KineticScroller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KineticScroller")
            .field("state", &self.state)
            .field("claimed", &self.claimed)
            .field("velocity", &self.velocity)
            .field("overshoot", &self.overshoot)
            .finish()
    }
}

impl Default for KineticScroller {
    fn default() -> Self {
        Self::new(ScrollerConfig::default())
    }
}

impl KineticScroller {
    #[must_use]
    pub fn new(config: ScrollerConfig) -> Self {
        Self {
            config,
            state: ScrollerState::Inactive,
            press_pos: PointF::ZERO,
            last_pos: PointF::ZERO,
            last_sample: None,
            drag_origin: PointF::ZERO,
            claimed: false,
            caught: false,
            axis: AxisLock::Free,
            velocity: PointF::ZERO,
            overshoot: PointF::ZERO,
            bounce: [None, None],
            last_tick: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ScrollerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ScrollerConfig) {
        self.config = config;
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> ScrollerState {
        self.state
    }

    /// Whether the current press has become a pan.
    #[inline]
    #[must_use]
    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    /// Fling velocity in scroll space (px/s).
    #[inline]
    #[must_use]
    pub fn velocity(&self) -> PointF {
        self.velocity
    }

    #[inline]
    #[must_use]
    pub fn overshoot(&self) -> PointF {
        self.overshoot
    }

    /// Whether the owner needs frame ticks.
    #[inline]
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.state == ScrollerState::Pushing
    }

    /// Pointer went down at `pos` (scene coordinates).
    pub fn handle_press<T>(&mut self, pos: PointF, now: Instant, target: &mut T) -> PanFilter
    where
        T: ScrollTarget + ?Sized,
    {
        let caught = self.state == ScrollerState::Pushing;
        if caught {
            tracing::debug!(target: "panview.scroll", velocity = ?self.velocity, "fling caught");
            self.velocity = PointF::ZERO;
            self.bounce = [None, None];
            self.last_tick = None;
        }
        self.press_pos = pos;
        self.last_pos = pos;
        self.last_sample = Some(now);
        self.claimed = false;
        self.caught = caught;
        self.axis = AxisLock::Free;
        self.set_state(ScrollerState::MousePressed, now, target);
        if caught {
            PanFilter::Claimed
        } else {
            PanFilter::Passed
        }
    }

    /// Pointer moved to `pos` (scene coordinates).
    pub fn handle_move<T>(&mut self, pos: PointF, now: Instant, target: &mut T) -> PanFilter
    where
        T: ScrollTarget + ?Sized,
    {
        if self.state != ScrollerState::MousePressed {
            return PanFilter::Passed;
        }

        let result = if self.claimed {
            PanFilter::Claimed
        } else {
            let travel = pos - self.press_pos;
            if travel.length() < self.config.drag_start_distance {
                self.last_pos = pos;
                self.last_sample = Some(now);
                return if self.caught {
                    PanFilter::Claimed
                } else {
                    PanFilter::Passed
                };
            }
            self.claim(travel, target);
            PanFilter::ClaimStarted
        };

        self.sample_velocity(pos, now);
        self.drag_to(pos, target);
        result
    }

    /// Pointer went up at `pos` (scene coordinates).
    pub fn handle_release<T>(&mut self, pos: PointF, now: Instant, target: &mut T) -> PanFilter
    where
        T: ScrollTarget + ?Sized,
    {
        if self.state != ScrollerState::MousePressed {
            return PanFilter::Passed;
        }
        let claimed = std::mem::take(&mut self.claimed);
        let caught = std::mem::take(&mut self.caught);

        if claimed {
            let stale = self
                .last_sample
                .is_some_and(|t| now.saturating_duration_since(t) > self.config.velocity_timeout);
            self.sample_velocity(pos, now);
            self.drag_to(pos, target);
            if stale {
                self.velocity = PointF::ZERO;
            }
            let speed = self.velocity.length();
            if speed > self.config.max_velocity {
                self.velocity = self.velocity.scaled(self.config.max_velocity / speed);
            }
            if speed < self.config.min_fling_velocity {
                self.velocity = PointF::ZERO;
            }
        } else {
            self.velocity = PointF::ZERO;
        }

        if !self.velocity.is_zero() || !self.overshoot.is_zero() {
            tracing::debug!(
                target: "panview.scroll",
                vx = self.velocity.x,
                vy = self.velocity.y,
                "pushing"
            );
            self.start_bounces();
            self.last_tick = Some(now);
            self.set_state(ScrollerState::Pushing, now, target);
        } else {
            self.set_state(ScrollerState::Inactive, now, target);
        }

        if claimed || caught {
            PanFilter::Claimed
        } else {
            PanFilter::Passed
        }
    }

    /// Advance fling and bounce physics. Returns `true` while still moving.
    pub fn tick<T>(&mut self, now: Instant, target: &mut T) -> bool
    where
        T: ScrollTarget + ?Sized,
    {
        if self.state != ScrollerState::Pushing {
            return false;
        }
        let dt = self
            .last_tick
            .map_or(Duration::ZERO, |t| now.saturating_duration_since(t))
            .min(self.config.max_frame_step);
        self.last_tick = Some(now);
        if dt.is_zero() {
            return true;
        }

        let secs = dt.as_secs_f64();
        let decay = (-self.config.deceleration * secs).exp();
        let max = target.maximum_scroll_position();
        let mut pos = target.scroll_position();

        for i in 0..2 {
            if let Some(spring) = self.bounce[i].as_mut() {
                spring.advance(dt);
                let settled = spring.is_at_rest();
                let o = spring
                    .position()
                    .clamp(-self.config.max_overshoot, self.config.max_overshoot);
                set_axis(&mut self.overshoot, i, if settled { 0.0 } else { o });
                if settled {
                    self.bounce[i] = None;
                }
                continue;
            }

            let v = axis(self.velocity, i) * decay;
            if v.abs() < self.config.stop_velocity {
                set_axis(&mut self.velocity, i, 0.0);
                continue;
            }
            set_axis(&mut self.velocity, i, v);

            let next = axis(pos, i) + v * secs;
            let bound = next.clamp(0.0, axis(max, i));
            set_axis(&mut pos, i, bound);
            if next != bound {
                // Ran into an edge: the remaining momentum becomes a bounce.
                let excess = (next - bound) * self.config.overshoot_resistance;
                self.bounce[i] = Some(self.bounce_spring(excess, v));
                set_axis(&mut self.overshoot, i, excess);
                set_axis(&mut self.velocity, i, 0.0);
            }
        }

        target.set_scroll_position(pos, self.overshoot);

        if self.velocity.is_zero() && self.bounce.iter().all(Option::is_none) {
            self.overshoot = PointF::ZERO;
            self.last_tick = None;
            self.set_state(ScrollerState::Inactive, now, target);
            return false;
        }
        true
    }

    /// Halt any motion, snap overshoot back, and go Inactive.
    pub fn stop<T>(&mut self, now: Instant, target: &mut T)
    where
        T: ScrollTarget + ?Sized,
    {
        self.velocity = PointF::ZERO;
        self.bounce = [None, None];
        self.claimed = false;
        self.caught = false;
        self.last_tick = None;
        if !self.overshoot.is_zero() {
            self.overshoot = PointF::ZERO;
            let pos = target.scroll_position();
            target.set_scroll_position(pos, PointF::ZERO);
        }
        self.set_state(ScrollerState::Inactive, now, target);
    }

    /// Forget everything without touching the target.
    pub fn reset(&mut self) {
        let config = self.config.clone();
        *self = Self::new(config);
    }

    // -- internals ----------------------------------------------------------

    fn set_state<T>(&mut self, new: ScrollerState, now: Instant, target: &mut T)
    where
        T: ScrollTarget + ?Sized,
    {
        let old = self.state;
        if old == new {
            return;
        }
        self.state = new;
        tracing::trace!(target: "panview.scroll", ?old, ?new, "scroller state");
        target.state_changed(old, new, now);
    }

    fn claim<T>(&mut self, travel: PointF, target: &mut T)
    where
        T: ScrollTarget + ?Sized,
    {
        let (dx, dy) = (travel.x.abs(), travel.y.abs());
        let threshold = self.config.axis_lock_threshold;
        self.axis = if dy <= dx * threshold {
            AxisLock::Horizontal
        } else if dx <= dy * threshold {
            AxisLock::Vertical
        } else {
            AxisLock::Free
        };

        // Start from the unresisted position so an existing overshoot
        // continues smoothly under the finger.
        let resistance = self.config.overshoot_resistance.max(f64::EPSILON);
        self.drag_origin = target.scroll_position() + self.overshoot.scaled(1.0 / resistance);
        self.claimed = true;
        self.velocity = PointF::ZERO;
        tracing::debug!(target: "panview.scroll", axis = ?self.axis, "pan claimed");
    }

    fn sample_velocity(&mut self, pos: PointF, now: Instant) {
        if let Some(prev) = self.last_sample {
            let dt = now.saturating_duration_since(prev).as_secs_f64();
            if dt > 0.0 {
                // Finger moving right scrolls toward the left edge.
                let instant = self.axis.mask(self.last_pos - pos).scaled(1.0 / dt);
                let alpha = self.config.velocity_smoothing.clamp(0.0, 1.0);
                self.velocity = self.velocity.scaled(1.0 - alpha) + instant.scaled(alpha);
            }
        }
        self.last_pos = pos;
        self.last_sample = Some(now);
    }

    fn drag_to<T>(&mut self, pos: PointF, target: &mut T)
    where
        T: ScrollTarget + ?Sized,
    {
        let delta = self.axis.mask(pos - self.press_pos);
        let raw = self.drag_origin - delta;
        let max = target.maximum_scroll_position();
        let mut clipped = PointF::ZERO;
        let mut overshoot = PointF::ZERO;
        for i in 0..2 {
            let r = axis(raw, i);
            let c = r.clamp(0.0, axis(max, i));
            let excess = (r - c) * self.config.overshoot_resistance;
            set_axis(&mut clipped, i, c);
            set_axis(
                &mut overshoot,
                i,
                excess.clamp(-self.config.max_overshoot, self.config.max_overshoot),
            );
        }
        self.overshoot = overshoot;
        target.set_scroll_position(clipped, overshoot);
    }

    fn start_bounces(&mut self) {
        for i in 0..2 {
            let o = axis(self.overshoot, i);
            if o != 0.0 {
                let v = axis(self.velocity, i);
                self.bounce[i] = Some(self.bounce_spring(o, v));
                set_axis(&mut self.velocity, i, 0.0);
            }
        }
    }

    fn bounce_spring(&self, from: f64, velocity: f64) -> Spring {
        Spring::new(from, 0.0)
            .with_stiffness(self.config.bounce_stiffness)
            .with_damping(self.config.bounce_damping)
            .with_velocity(velocity)
            .with_rest_threshold(BOUNCE_REST_PX)
            .with_velocity_threshold(BOUNCE_REST_VELOCITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const MS_16: Duration = Duration::from_millis(16);

    struct Target {
        viewport: SizeF,
        content: SizeF,
        pos: PointF,
        overshoot: PointF,
        transitions: Vec<(ScrollerState, ScrollerState)>,
    }

    impl Target {
        fn new(content: SizeF) -> Self {
            Self {
                viewport: SizeF::new(800.0, 480.0),
                content,
                pos: PointF::ZERO,
                overshoot: PointF::ZERO,
                transitions: Vec::new(),
            }
        }
    }

    impl ScrollTarget for Target {
        fn viewport_size(&self) -> SizeF {
            self.viewport
        }

        fn maximum_scroll_position(&self) -> PointF {
            PointF::new(
                (self.content.width - self.viewport.width).max(0.0),
                (self.content.height - self.viewport.height).max(0.0),
            )
        }

        fn scroll_position(&self) -> PointF {
            self.pos
        }

        fn set_scroll_position(&mut self, pos: PointF, overshoot: PointF) {
            self.pos = pos;
            self.overshoot = overshoot;
        }

        fn state_changed(&mut self, old: ScrollerState, new: ScrollerState, _now: Instant) {
            self.transitions.push((old, new));
        }
    }

    fn pt(x: f64, y: f64) -> PointF {
        PointF::new(x, y)
    }

    fn big() -> Target {
        Target::new(SizeF::new(2000.0, 3000.0))
    }

    fn settle(s: &mut KineticScroller, t: &mut Target, mut now: Instant) -> Instant {
        for _ in 0..2000 {
            now += MS_16;
            if !s.tick(now, t) {
                break;
            }
        }
        now
    }

    #[test]
    fn small_moves_pass_through() {
        let t0 = Instant::now();
        let mut s = KineticScroller::default();
        let mut t = big();
        assert_eq!(s.handle_press(pt(100.0, 100.0), t0, &mut t), PanFilter::Passed);
        assert_eq!(
            s.handle_move(pt(105.0, 103.0), t0 + MS_16, &mut t),
            PanFilter::Passed
        );
        assert_eq!(
            s.handle_release(pt(105.0, 103.0), t0 + MS_16 * 2, &mut t),
            PanFilter::Passed
        );
        assert_eq!(t.pos, PointF::ZERO);
        assert_eq!(s.state(), ScrollerState::Inactive);
    }

    #[test]
    fn claim_started_exactly_once() {
        let t0 = Instant::now();
        let mut s = KineticScroller::default();
        let mut t = big();
        s.handle_press(pt(400.0, 400.0), t0, &mut t);
        let mut starts = 0;
        for i in 1..=10 {
            let r = s.handle_move(pt(400.0, 400.0 - 5.0 * f64::from(i)), t0 + MS_16 * i, &mut t);
            if r == PanFilter::ClaimStarted {
                starts += 1;
            }
            if i >= 2 {
                assert!(r.is_consumed());
            }
        }
        assert_eq!(starts, 1);
        assert!(s.is_claimed());
        assert!((t.pos.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn vertical_drag_locks_x() {
        let t0 = Instant::now();
        let mut s = KineticScroller::default();
        let mut t = big();
        t.pos = pt(500.0, 500.0);
        s.handle_press(pt(400.0, 400.0), t0, &mut t);
        s.handle_move(pt(402.0, 380.0), t0 + MS_16, &mut t);
        s.handle_move(pt(450.0, 300.0), t0 + MS_16 * 2, &mut t);
        assert_eq!(t.pos.x, 500.0);
        assert!((t.pos.y - 600.0).abs() < 1e-9);
    }

    #[test]
    fn diagonal_drag_moves_both_axes() {
        let t0 = Instant::now();
        let mut s = KineticScroller::default();
        let mut t = big();
        t.pos = pt(500.0, 500.0);
        s.handle_press(pt(400.0, 400.0), t0, &mut t);
        s.handle_move(pt(380.0, 380.0), t0 + MS_16, &mut t);
        assert_eq!(t.pos, pt(520.0, 520.0));
    }

    #[test]
    fn drag_past_edge_overshoots_with_resistance() {
        let t0 = Instant::now();
        let mut s = KineticScroller::default();
        let mut t = big();
        s.handle_press(pt(400.0, 100.0), t0, &mut t);
        s.handle_move(pt(400.0, 160.0), t0 + MS_16, &mut t);
        assert_eq!(t.pos.y, 0.0);
        assert!((t.overshoot.y + 30.0).abs() < 1e-9);
        s.handle_move(pt(400.0, 600.0), t0 + MS_16 * 2, &mut t);
        assert_eq!(t.overshoot.y, -80.0);
    }

    #[test]
    fn released_overshoot_bounces_back() {
        let t0 = Instant::now();
        let mut s = KineticScroller::default();
        let mut t = big();
        s.handle_press(pt(400.0, 100.0), t0, &mut t);
        s.handle_move(pt(400.0, 160.0), t0 + MS_16, &mut t);
        // Rest before release: no fling, only the bounce.
        let rel = t0 + Duration::from_millis(500);
        assert_eq!(s.handle_release(pt(400.0, 160.0), rel, &mut t), PanFilter::Claimed);
        assert_eq!(s.state(), ScrollerState::Pushing);
        settle(&mut s, &mut t, rel);
        assert_eq!(s.state(), ScrollerState::Inactive);
        assert_eq!(t.overshoot, PointF::ZERO);
        assert_eq!(t.pos.y, 0.0);
    }

    #[test]
    fn fast_release_flings_and_stops() {
        let t0 = Instant::now();
        let mut s = KineticScroller::default();
        let mut t = big();
        t.pos = pt(0.0, 1000.0);
        s.handle_press(pt(400.0, 400.0), t0, &mut t);
        let mut now = t0;
        for i in 1..=6 {
            now = t0 + MS_16 * i;
            s.handle_move(pt(400.0, 400.0 - 30.0 * f64::from(i)), now, &mut t);
        }
        let released_at = t.pos.y;
        s.handle_release(pt(400.0, 220.0), now, &mut t);
        assert_eq!(s.state(), ScrollerState::Pushing);
        assert!(s.velocity().y > 0.0);
        settle(&mut s, &mut t, now);
        assert_eq!(s.state(), ScrollerState::Inactive);
        assert!(t.pos.y > released_at, "fling should carry content further");
        assert!(t.pos.y <= 2520.0);
    }

    #[test]
    fn fling_into_edge_bounces() {
        let t0 = Instant::now();
        let mut s = KineticScroller::default();
        let mut t = big();
        t.pos = pt(0.0, 2450.0);
        s.handle_press(pt(400.0, 400.0), t0, &mut t);
        let mut now = t0;
        for i in 1..=5 {
            now = t0 + MS_16 * i;
            s.handle_move(pt(400.0, 400.0 - 12.0 * f64::from(i)), now, &mut t);
        }
        s.handle_release(pt(400.0, 340.0), now, &mut t);
        let mut saw_overshoot = false;
        for _ in 0..2000 {
            now += MS_16;
            let moving = s.tick(now, &mut t);
            saw_overshoot |= t.overshoot.y > 0.0;
            assert!(t.overshoot.y <= 80.0);
            if !moving {
                break;
            }
        }
        assert!(saw_overshoot);
        assert_eq!(t.pos.y, 2520.0);
        assert_eq!(t.overshoot, PointF::ZERO);
    }

    #[test]
    fn press_during_fling_catches() {
        let t0 = Instant::now();
        let mut s = KineticScroller::default();
        let mut t = big();
        t.pos = pt(0.0, 1000.0);
        s.handle_press(pt(400.0, 400.0), t0, &mut t);
        for i in 1..=4 {
            s.handle_move(pt(400.0, 400.0 - 40.0 * f64::from(i)), t0 + MS_16 * i, &mut t);
        }
        let now = t0 + MS_16 * 4;
        s.handle_release(pt(400.0, 240.0), now, &mut t);
        s.tick(now + MS_16, &mut t);
        assert_eq!(s.state(), ScrollerState::Pushing);

        let caught = now + MS_16 * 2;
        assert_eq!(s.handle_press(pt(10.0, 10.0), caught, &mut t), PanFilter::Claimed);
        assert_eq!(s.velocity(), PointF::ZERO);
        assert_eq!(
            s.handle_release(pt(10.0, 10.0), caught + MS_16, &mut t),
            PanFilter::Claimed
        );
        assert_eq!(s.state(), ScrollerState::Inactive);
    }

    #[test]
    fn transitions_reported() {
        let t0 = Instant::now();
        let mut s = KineticScroller::default();
        let mut t = big();
        s.handle_press(pt(0.0, 0.0), t0, &mut t);
        s.handle_release(pt(0.0, 0.0), t0 + MS_16, &mut t);
        assert_eq!(
            t.transitions,
            vec![
                (ScrollerState::Inactive, ScrollerState::MousePressed),
                (ScrollerState::MousePressed, ScrollerState::Inactive),
            ]
        );
    }

    #[test]
    fn stop_clears_overshoot() {
        let t0 = Instant::now();
        let mut s = KineticScroller::default();
        let mut t = big();
        s.handle_press(pt(400.0, 100.0), t0, &mut t);
        s.handle_move(pt(400.0, 160.0), t0 + MS_16, &mut t);
        s.stop(t0 + MS_16 * 2, &mut t);
        assert_eq!(t.overshoot, PointF::ZERO);
        assert_eq!(s.state(), ScrollerState::Inactive);
        assert!(!s.is_claimed());
    }

    #[test]
    fn reset_is_silent() {
        let t0 = Instant::now();
        let mut s = KineticScroller::default();
        let mut t = big();
        s.handle_press(pt(0.0, 0.0), t0, &mut t);
        let before = t.transitions.len();
        s.reset();
        assert_eq!(t.transitions.len(), before);
        assert_eq!(s.state(), ScrollerState::Inactive);
        assert_eq!(
            s.handle_release(pt(0.0, 0.0), t0 + MS_16, &mut t),
            PanFilter::Passed
        );
    }

    #[test]
    fn small_content_still_rubber_bands() {
        let t0 = Instant::now();
        let mut s = KineticScroller::default();
        let mut t = Target::new(SizeF::new(200.0, 200.0));
        s.handle_press(pt(100.0, 100.0), t0, &mut t);
        s.handle_move(pt(100.0, 60.0), t0 + MS_16, &mut t);
        assert_eq!(t.pos, PointF::ZERO);
        assert!((t.overshoot.y - 20.0).abs() < 1e-9);
    }
}
