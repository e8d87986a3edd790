#![forbid(unsafe_code)]

//! Gesture disambiguation: tap, double tap, or noise.
//!
//! [`GestureRecognizer`] sits in front of a [`GestureConsumer`] and decides
//! what a raw Press/Move/Release/DoubleClick stream means. Touch screens
//! report taps with jitter and deliver a double tap as two full press/release
//! pairs, so a single click cannot be confirmed until the double-tap window
//! has passed. The recognizer therefore buffers the first press/release pair
//! and replays it only when no second tap arrives.
//!
//! # State Machine
//!
//! ```text
//!  Idle ──press──▶ PressPending ──release (held ≥ min_hold)──▶ ReleasePending
//!   ▲                  │                                          │    │
//!   │                  └──release (held < min_hold)──▶ Idle       │    │
//!   │                                                             │    │
//!   ├──────── delay timer fires: press_seen(confirmed), ◀─────────┘    │
//!   │         release_seen                                             │
//!   └──────── second release: synthesised double click ◀──────────────┘
//! ```
//!
//! Pan detection lives elsewhere: the owning viewport calls
//! [`clear_delayed_press`](GestureRecognizer::clear_delayed_press) as soon as
//! it claims a drag.
//!
//! # Invariants
//!
//! 1. A confirmed click is reported as `press_seen(.., true)` immediately
//!    followed by `release_seen(..)`, both at the same adjusted position.
//! 2. A buffered interaction yields at most one of: a confirmed click, a
//!    double click, or nothing.
//! 3. Replayed events ([`EventOrigin::Replay`](crate::event::EventOrigin))
//!    are never filtered.
//! 4. Every event handed to the consumer is already in the consumer's
//!    local space, as declared by [`GestureConsumer::coordinate_map`].
//! 5. After `reset()` or `clear_delayed_press()` no delayed callback fires.
//!
//! # Failure Modes
//!
//! - Out-of-order input (a release with nothing pending, a second press
//!   while one is buffered) is consumed and otherwise ignored.
//! - If the owner stops calling [`poll`](GestureRecognizer::poll), the
//!   pending click is simply never confirmed; it is not lost on the next
//!   event, which still sees the buffered pair.

use web_time::{Duration, Instant};

use crate::event::{PointerEvent, PointerKind};
use crate::geometry::PointF;
use crate::replay::CoordinateMap;
use crate::timer::OneShotTimer;

// ---------------------------------------------------------------------------
// Consumer contract
// ---------------------------------------------------------------------------

/// Receiver of disambiguated pointer gestures.
///
/// Implemented by every surface that owns a [`GestureRecognizer`]: the web
/// viewport, the window-selection grid. Callbacks are invoked synchronously
/// from [`GestureRecognizer::filter`] or [`GestureRecognizer::poll`].
pub trait GestureConsumer {
    /// The consumer's local space. Events are remapped from scene
    /// coordinates with this map before any callback sees them.
    fn coordinate_map(&self) -> CoordinateMap {
        CoordinateMap::IDENTITY
    }

    /// A press happened.
    ///
    /// `confirmed == false` is an early, non-authoritative notification sent
    /// for every press the moment it arrives (use it to cancel pending
    /// work). `confirmed == true` is the replayed press of a confirmed click.
    fn press_seen(&mut self, event: &PointerEvent, confirmed: bool);

    /// The release of a confirmed click. Always follows a confirmed press.
    fn release_seen(&mut self, event: &PointerEvent);

    /// A double click (platform-reported or synthesised from two taps).
    fn double_click_seen(&mut self, event: &PointerEvent);

    /// Refine a click position before a confirmed click is replayed, for
    /// example to snap to a nearby clickable element. The default keeps it.
    fn adjust_click_position(&mut self, pos: PointF) -> PointF {
        pos
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing thresholds for gesture disambiguation.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    /// How long a released tap is held back waiting for a second tap
    /// (default: 300ms).
    pub press_delay: Duration,
    /// Taps held for less than this are treated as noise (default: 100ms).
    pub min_hold: Duration,
    /// Platform double clicks arriving closer than this to the previous one
    /// are degraded to presses (default: 300ms).
    pub double_click_guard: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            press_delay: Duration::from_millis(300),
            min_hold: Duration::from_millis(100),
            double_click_guard: Duration::from_millis(300),
        }
    }
}

impl GestureConfig {
    #[must_use]
    pub fn with_press_delay(mut self, delay: Duration) -> Self {
        self.press_delay = delay;
        self
    }

    #[must_use]
    pub fn with_min_hold(mut self, hold: Duration) -> Self {
        self.min_hold = hold;
        self
    }

    #[must_use]
    pub fn with_double_click_guard(mut self, guard: Duration) -> Self {
        self.double_click_guard = guard;
        self
    }
}

// ---------------------------------------------------------------------------
// GestureRecognizer
// ---------------------------------------------------------------------------

/// Per-surface tap/double-tap disambiguator.
///
/// Feed every pointer event through [`filter`](Self::filter) and call
/// [`poll`](Self::poll) whenever [`next_deadline`](Self::next_deadline)
/// passes.
pub struct GestureRecognizer {
    config: GestureConfig,
    /// Buffered replay copies, kept in scene space and remapped on delivery.
    pending_press: Option<PointerEvent>,
    pending_release: Option<PointerEvent>,
    press_time: Option<Instant>,
    last_double_click: Option<Instant>,
    delay: OneShotTimer,
}

impl std::fmt::Debug for GestureRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureRecognizer")
            .field("press_pending", &self.pending_press.is_some())
            .field("release_pending", &self.pending_release.is_some())
            .field("timer_armed", &self.delay.is_armed())
            .finish()
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl GestureRecognizer {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            pending_press: None,
            pending_release: None,
            press_time: None,
            last_double_click: None,
            delay: OneShotTimer::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Replace the thresholds. Pending state is kept.
    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }

    /// Whether a press (and possibly its release) is buffered.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending_press.is_some()
    }

    /// When [`poll`](Self::poll) must next be called.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.delay.deadline()
    }

    /// Filter one pointer event. Returns `true` if consumed.
    ///
    /// Replayed events are never processed and return `false`.
    pub fn filter<C>(&mut self, event: &PointerEvent, now: Instant, consumer: &mut C) -> bool
    where
        C: GestureConsumer + ?Sized,
    {
        if event.is_replay() {
            return false;
        }
        match event.kind {
            PointerKind::DoubleClick => self.on_double_click(event, now, consumer),
            PointerKind::Press => self.on_press(event, now, consumer),
            PointerKind::Release => self.on_release(event, now, consumer),
            PointerKind::Move => true,
        }
    }

    /// Fire the press-delay timer if it is due. Returns `true` if a
    /// confirmed click was delivered.
    pub fn poll<C>(&mut self, now: Instant, consumer: &mut C) -> bool
    where
        C: GestureConsumer + ?Sized,
    {
        if self.delay.fire(now).is_none() {
            return false;
        }
        let press = self.pending_press.take();
        let release = self.pending_release.take();
        self.press_time = None;
        let (Some(press), Some(release)) = (press, release) else {
            return false;
        };

        let map = consumer.coordinate_map();
        let release = release.remapped(&map);
        let adjusted = consumer.adjust_click_position(release.pos);
        let press = press.relocated(adjusted, &map);
        let release = release.relocated(adjusted, &map);

        let _span = tracing::debug_span!(
            target: "panview.gesture",
            "confirmed_click",
            x = adjusted.x,
            y = adjusted.y
        )
        .entered();
        consumer.press_seen(&press, true);
        consumer.release_seen(&release);
        true
    }

    /// Drop any buffered press/release and cancel the delay timer.
    /// Idempotent.
    pub fn clear_delayed_press(&mut self) {
        if self.pending_press.is_some() {
            tracing::trace!(target: "panview.gesture", "delayed press cleared");
        }
        self.pending_press = None;
        self.pending_release = None;
        self.press_time = None;
        self.delay.cancel();
    }

    /// Return to idle, forgetting the double-click history as well.
    pub fn reset(&mut self) {
        self.clear_delayed_press();
        self.last_double_click = None;
    }

    // -- Event handlers -----------------------------------------------------

    fn on_double_click<C>(&mut self, event: &PointerEvent, now: Instant, consumer: &mut C) -> bool
    where
        C: GestureConsumer + ?Sized,
    {
        let genuine = self
            .last_double_click
            .is_none_or(|prev| now.saturating_duration_since(prev) > self.config.double_click_guard);
        self.last_double_click = Some(now);

        if genuine {
            self.clear_delayed_press();
            let local = event.remapped(&consumer.coordinate_map());
            tracing::debug!(
                target: "panview.gesture",
                x = local.pos.x,
                y = local.pos.y,
                "double click"
            );
            consumer.double_click_seen(&local);
            true
        } else {
            tracing::debug!(target: "panview.gesture", "double click too soon, treated as press");
            self.on_press(&event.retyped(PointerKind::Press), now, consumer)
        }
    }

    fn on_press<C>(&mut self, event: &PointerEvent, now: Instant, consumer: &mut C) -> bool
    where
        C: GestureConsumer + ?Sized,
    {
        let local = event.remapped(&consumer.coordinate_map());
        consumer.press_seen(&local, false);
        if !event.is_primary() {
            return true;
        }
        if self.pending_press.is_none() {
            self.pending_press = Some(event.as_replay());
            self.press_time = Some(now);
        }
        true
    }

    fn on_release<C>(&mut self, event: &PointerEvent, now: Instant, consumer: &mut C) -> bool
    where
        C: GestureConsumer + ?Sized,
    {
        if !event.is_primary() {
            return true;
        }

        if self.pending_release.is_some() {
            let press = self.pending_press.take();
            self.clear_delayed_press();
            let double = press
                .unwrap_or_else(|| event.as_replay())
                .retyped(PointerKind::DoubleClick);
            return self.on_double_click(&double, now, consumer);
        }

        let Some(pressed_at) = self.press_time else {
            return true;
        };
        if now.saturating_duration_since(pressed_at) >= self.config.min_hold {
            self.pending_release = Some(event.as_replay());
            self.delay.arm(now, self.config.press_delay);
        } else {
            tracing::trace!(target: "panview.gesture", "tap shorter than min hold dropped");
            self.clear_delayed_press();
        }
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
