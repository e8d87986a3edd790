#![forbid(unsafe_code)]

//! A viewport that pans one piece of content.
//!
//! [`PannableViewport`] owns at most one [`PannedContent`], a
//! [`KineticScroller`], and a pair of [`FadeScrollbar`]s. It is also the
//! first filter in front of its content: every pointer event goes through
//! [`filter_event`](PannableViewport::filter_event) before anything else
//! sees it, so a drag can be claimed as a pan before it turns into a click.
//!
//! Pan positions are content offsets: `(0, 0)` shows the top-left corner and
//! panning toward the bottom-right makes both components negative. The
//! scroller works in scroll space, the negation.
//!
//! # Invariants
//!
//! 1. `pan_position()` always equals `clip_point_to_viewport(pan_position())`.
//! 2. Replacing the content drops the previous one.
//! 3. While the scroller is Pushing, content updates are disabled; they are
//!    re-enabled after the resume debounce elapses with no new push, or at
//!    once when the gesture is abandoned by `reset`, `set_content` or
//!    `take_content`.
//!
//! # Failure Modes
//!
//! - No content: every event passes through and positions stay at zero.
//! - Content that shrinks underneath the viewport is re-clipped on the next
//!   [`content_geometry_changed`](PannableViewport::content_geometry_changed).

use panview_core::{Duration, Instant, OneShotTimer, PointF, PointerEvent, PointerKind, SizeF};

use crate::kinetic::{KineticScroller, PanFilter, ScrollTarget, ScrollerConfig, ScrollerState};
use crate::scrollbar::{FadeScrollbar, Orientation, ScrollbarConfig};

/// Content that can live inside a [`PannableViewport`].
pub trait PannedContent {
    /// Full size of the content in viewport units.
    fn content_size(&self) -> SizeF;

    /// The content's visible offset changed (overshoot included).
    fn pan_position_changed(&mut self, _offset: PointF) {}

    /// Suspend or resume expensive updates (tile creation, repaints).
    fn set_updates_enabled(&mut self, _enabled: bool) {}
}

/// Configuration for a pannable viewport.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PannableConfig {
    pub scroller: ScrollerConfig,
    pub scrollbar: ScrollbarConfig,
    pub update_gate: UpdateGateConfig,
}

// ---------------------------------------------------------------------------
// Update gate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateGateConfig {
    /// Quiet period after a push before updates resume (default: 700ms).
    pub resume_delay: Duration,
}

impl Default for UpdateGateConfig {
    fn default() -> Self {
        Self {
            resume_delay: Duration::from_millis(700),
        }
    }
}

/// Debounced on/off switch for content updates.
#[derive(Debug, Clone)]
pub struct UpdateGate {
    enabled: bool,
    resume: OneShotTimer,
    delay: Duration,
}

impl UpdateGate {
    #[must_use]
    pub fn new(config: &UpdateGateConfig) -> Self {
        Self {
            enabled: true,
            resume: OneShotTimer::new(),
            delay: config.resume_delay,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.resume.deadline()
    }

    /// Disable updates now. Returns `true` if this changed the state.
    pub fn suspend(&mut self) -> bool {
        self.resume.cancel();
        std::mem::replace(&mut self.enabled, false)
    }

    /// Re-enable updates after the debounce, unless suspended again first.
    pub fn resume_after(&mut self, now: Instant) {
        if !self.enabled {
            self.resume.arm(now, self.delay);
        }
    }

    /// Re-enable updates immediately, dropping any pending debounce. Returns
    /// `true` if updates were off.
    pub fn release(&mut self) -> bool {
        self.resume.cancel();
        !std::mem::replace(&mut self.enabled, true)
    }

    /// Returns `true` when the debounce just elapsed and updates are back on.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.resume.fire(now).is_some() && !self.enabled {
            self.enabled = true;
            return true;
        }
        false
    }
}

// ---------------------------------------------------------------------------
// Scroll surface
// ---------------------------------------------------------------------------

/// Everything the scroller drives, split out so the scroller can borrow it
/// mutably while it lives next to it.
struct PanSurface<C> {
    viewport: SizeF,
    content: Option<C>,
    pan: PointF,
    overshoot: PointF,
    horizontal: FadeScrollbar,
    vertical: FadeScrollbar,
    updates: UpdateGate,
}

impl<C: PannedContent> PanSurface<C> {
    fn content_size(&self) -> SizeF {
        self.content
            .as_ref()
            .map_or(SizeF::ZERO, PannedContent::content_size)
    }

    fn clip(&self, p: PointF) -> PointF {
        let content = self.content_size();
        let min_x = -(content.width - self.viewport.width).max(0.0);
        let min_y = -(content.height - self.viewport.height).max(0.0);
        let x = if p.x.is_finite() { p.x.clamp(min_x, 0.0) } else { 0.0 };
        let y = if p.y.is_finite() { p.y.clamp(min_y, 0.0) } else { 0.0 };
        PointF::new(x, y)
    }

    fn visual_offset(&self) -> PointF {
        self.pan - self.overshoot
    }

    fn apply(&mut self, pan: PointF, overshoot: PointF) {
        self.pan = self.clip(pan);
        self.overshoot = overshoot;
        let offset = self.visual_offset();
        if let Some(content) = self.content.as_mut() {
            content.pan_position_changed(offset);
        }
        self.refresh_scrollbars();
    }

    fn refresh_scrollbars(&mut self) {
        let content = self.content_size();
        self.horizontal.update_geometry(
            self.viewport.width,
            content.width,
            -self.pan.x,
            self.overshoot.x,
        );
        self.vertical.update_geometry(
            self.viewport.height,
            content.height,
            -self.pan.y,
            self.overshoot.y,
        );
    }

    fn set_updates_enabled(&mut self, enabled: bool) {
        if let Some(content) = self.content.as_mut() {
            content.set_updates_enabled(enabled);
        }
    }
}

impl<C: PannedContent> ScrollTarget for PanSurface<C> {
    fn viewport_size(&self) -> SizeF {
        self.viewport
    }

    fn maximum_scroll_position(&self) -> PointF {
        let content = self.content_size();
        PointF::new(
            (content.width - self.viewport.width).max(0.0),
            (content.height - self.viewport.height).max(0.0),
        )
    }

    fn scroll_position(&self) -> PointF {
        -self.pan
    }

    fn set_scroll_position(&mut self, pos: PointF, overshoot: PointF) {
        self.apply(-pos, overshoot);
    }

    fn state_changed(&mut self, old: ScrollerState, new: ScrollerState, now: Instant) {
        if old == ScrollerState::Inactive {
            self.horizontal.show();
            self.vertical.show();
        }
        if new == ScrollerState::Inactive {
            self.horizontal.schedule_fade_out(now);
            self.vertical.schedule_fade_out(now);
        }
        if new == ScrollerState::Pushing {
            if self.updates.suspend() {
                tracing::debug!(target: "panview.scroll", "content updates suspended");
                self.set_updates_enabled(false);
            }
        } else if old == ScrollerState::Pushing {
            self.updates.resume_after(now);
        }
    }
}

// ---------------------------------------------------------------------------
// PannableViewport
// ---------------------------------------------------------------------------

/// Viewport with kinetic panning over a single content item.
pub struct PannableViewport<C> {
    scroller: KineticScroller,
    surface: PanSurface<C>,
}

impl<C> std::fmt::Debug for PannableViewport<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PannableViewport")
            .field("viewport", &self.surface.viewport)
            .field("pan", &self.surface.pan)
            .field("has_content", &self.surface.content.is_some())
            .field("scroller", &self.scroller)
            .finish()
    }
}

impl<C: PannedContent> PannableViewport<C> {
    #[must_use]
    pub fn new(viewport: SizeF, config: PannableConfig) -> Self {
        Self {
            scroller: KineticScroller::new(config.scroller),
            surface: PanSurface {
                viewport,
                content: None,
                pan: PointF::ZERO,
                overshoot: PointF::ZERO,
                horizontal: FadeScrollbar::new(Orientation::Horizontal, config.scrollbar.clone()),
                vertical: FadeScrollbar::new(Orientation::Vertical, config.scrollbar),
                updates: UpdateGate::new(&config.update_gate),
            },
        }
    }

    // -- content ------------------------------------------------------------

    /// Install `content`, dropping whatever was there before.
    pub fn set_content(&mut self, content: C) {
        self.abandon_gesture();
        self.surface.content = Some(content);
        let pan = self.surface.pan;
        self.surface.apply(pan, PointF::ZERO);
        let enabled = self.surface.updates.is_enabled();
        self.surface.set_updates_enabled(enabled);
    }

    /// Remove and return the content.
    pub fn take_content(&mut self) -> Option<C> {
        self.abandon_gesture();
        let content = self.surface.content.take();
        self.surface.apply(PointF::ZERO, PointF::ZERO);
        content
    }

    #[must_use]
    pub fn content(&self) -> Option<&C> {
        self.surface.content.as_ref()
    }

    pub fn content_mut(&mut self) -> Option<&mut C> {
        self.surface.content.as_mut()
    }

    /// Call after the content changed size; re-clips the pan position.
    pub fn content_geometry_changed(&mut self) {
        let (pan, overshoot) = (self.surface.pan, self.surface.overshoot);
        self.surface.apply(pan, overshoot);
    }

    // -- geometry -----------------------------------------------------------

    #[must_use]
    pub fn viewport_size(&self) -> SizeF {
        self.surface.viewport
    }

    pub fn set_viewport_size(&mut self, size: SizeF) {
        self.surface.viewport = size;
        self.content_geometry_changed();
    }

    /// Bound `p` so the content covers the viewport wherever it can: each
    /// axis lands in `[-(content - viewport), 0]`, or exactly 0 when the
    /// content is smaller than the viewport.
    #[must_use]
    pub fn clip_point_to_viewport(&self, p: PointF) -> PointF {
        self.surface.clip(p)
    }

    /// Move the content to `p` (clipped). Cancels overshoot.
    pub fn set_pan_position(&mut self, p: PointF) {
        self.surface.apply(p, PointF::ZERO);
    }

    #[must_use]
    pub fn pan_position(&self) -> PointF {
        self.surface.pan
    }

    /// Where the content is drawn, overshoot included.
    #[must_use]
    pub fn visual_offset(&self) -> PointF {
        self.surface.visual_offset()
    }

    #[must_use]
    pub fn overshoot(&self) -> PointF {
        self.surface.overshoot
    }

    // -- interaction --------------------------------------------------------

    /// Offer a pointer event to the pan filter. Uses scene positions, which
    /// do not move with the content.
    pub fn filter_event(&mut self, event: &PointerEvent, now: Instant) -> PanFilter {
        if event.is_replay() || !event.is_primary() || self.surface.content.is_none() {
            return PanFilter::Passed;
        }
        let pos = event.scene_pos;
        let surface = &mut self.surface;
        match event.kind {
            PointerKind::Press => self.scroller.handle_press(pos, now, surface),
            PointerKind::Move => self.scroller.handle_move(pos, now, surface),
            PointerKind::Release => self.scroller.handle_release(pos, now, surface),
            PointerKind::DoubleClick => {
                if self.scroller.state() == ScrollerState::Pushing {
                    self.scroller.handle_press(pos, now, surface)
                } else {
                    PanFilter::Passed
                }
            }
        }
    }

    /// Advance physics, scrollbar fades and the update debounce. Returns
    /// `true` while frames are still needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let moving = self.scroller.tick(now, &mut self.surface);
        let h = self.surface.horizontal.tick(now);
        let v = self.surface.vertical.tick(now);
        if self.surface.updates.poll(now) {
            tracing::debug!(target: "panview.scroll", "content updates resumed");
            self.surface.set_updates_enabled(true);
        }
        moving || h || v
    }

    /// Whether frame ticks are needed right now.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.scroller.is_animating()
            || self.surface.horizontal.is_fading()
            || self.surface.vertical.is_fading()
    }

    /// Earliest pending timer (scrollbar fade start, update resume).
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.surface.horizontal.next_deadline(),
            self.surface.vertical.next_deadline(),
            self.surface.updates.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Halt any fling or bounce.
    pub fn stop(&mut self, now: Instant) {
        self.scroller.stop(now, &mut self.surface);
    }

    /// Forget the current gesture without callbacks. Content updates held
    /// off by an abandoned fling come back on at once.
    pub fn reset(&mut self) {
        self.abandon_gesture();
        if !self.surface.overshoot.is_zero() {
            let pan = self.surface.pan;
            self.surface.apply(pan, PointF::ZERO);
        }
    }

    fn abandon_gesture(&mut self) {
        self.scroller.reset();
        if self.surface.updates.release() {
            tracing::debug!(target: "panview.scroll", "content updates released by reset");
            self.surface.set_updates_enabled(true);
        }
    }

    #[must_use]
    pub fn scroller_state(&self) -> ScrollerState {
        self.scroller.state()
    }

    #[must_use]
    pub fn scroller(&self) -> &KineticScroller {
        &self.scroller
    }

    pub fn set_scroller_config(&mut self, config: ScrollerConfig) {
        self.scroller.set_config(config);
    }

    #[must_use]
    pub fn horizontal_scrollbar(&self) -> &FadeScrollbar {
        &self.surface.horizontal
    }

    #[must_use]
    pub fn vertical_scrollbar(&self) -> &FadeScrollbar {
        &self.surface.vertical
    }

    #[must_use]
    pub fn updates_enabled(&self) -> bool {
        self.surface.updates.is_enabled()
    }
}
