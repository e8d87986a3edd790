#![forbid(unsafe_code)]

//! The web content viewport.
//!
//! [`WebViewport`] stacks three filters in front of a [`ContentEngine`]:
//!
//! ```text
//!  pointer event ──▶ pan filter ──Passed──▶ GestureRecognizer ──▶ WebSurface
//!                      │                                            │
//!                      └─ClaimStarted: clear delayed press          ├─ dispatch into engine
//!                                                                   ├─ link confirmation
//!                                                                   └─ double-tap zoom
//! ```
//!
//! Local space for the gesture callbacks is document space: scene positions
//! are shifted by the viewport origin and the visual pan offset, then divided
//! by the current scale.
//!
//! # Invariants
//!
//! 1. The content scale is always within `[min_zoom, max_zoom]`.
//! 2. Tile creation is enabled only when no [`TilePause`] reason is set.
//! 3. A link release dispatched from the confirmation timer belongs to the
//!    load generation it was recorded in; otherwise it is dropped.
//! 4. `reset()` returns every state machine to idle without dispatching
//!    anything into the engine.
//!
//! # Failure Modes
//!
//! - Without an engine, pointer events still go through the recognizer but
//!   nothing is dispatched, and zoom requests are ignored.
//! - A NaN zoom request is ignored; infinities clamp to the bounds.

use panview_core::timer::earliest;
use panview_core::{
    CoordinateMap, GestureConfig, GestureConsumer, GestureRecognizer, Instant, PointF,
    PointerEvent, PointerKind, RectF, SizeF,
};
use panview_scroll::{PanFilter, PannableConfig, PannableViewport, PannedContent, ScrollerState};

use crate::engine::{ContentEngine, EngineSignal};
use crate::link::{LinkConfig, LinkConfirmation, LinkOutcome};
use crate::tiles::{TileCoordinator, TilePause, TileStats};
use crate::zoom::{
    ZoomAnimator, ZoomConfig, ZoomFrame, anchored_pan, block_zoom_pan, block_zoom_target,
    clip_pan, fit_width_scale,
};

/// Relative margin above fit-width that counts as "zoomed in".
const ZOOMED_IN_MARGIN: f64 = 1.01;

/// Everything a web viewport can be tuned with.
#[derive(Debug, Clone, PartialEq)]
pub struct WebViewportConfig {
    pub pannable: PannableConfig,
    pub gesture: GestureConfig,
    pub zoom: ZoomConfig,
    pub link: LinkConfig,
    /// When false, tile creation stays disabled permanently.
    pub tile_cache: bool,
}

impl Default for WebViewportConfig {
    fn default() -> Self {
        Self {
            pannable: PannableConfig::default(),
            gesture: GestureConfig::default(),
            zoom: ZoomConfig::default(),
            link: LinkConfig::default(),
            tile_cache: true,
        }
    }
}

impl WebViewportConfig {
    #[must_use]
    pub fn with_gesture(mut self, gesture: GestureConfig) -> Self {
        self.gesture = gesture;
        self
    }

    #[must_use]
    pub fn with_zoom(mut self, zoom: ZoomConfig) -> Self {
        self.zoom = zoom;
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: LinkConfig) -> Self {
        self.link = link;
        self
    }

    #[must_use]
    pub fn with_tile_cache(mut self, enabled: bool) -> Self {
        self.tile_cache = enabled;
        self
    }
}

/// Things the viewport did that its owner may want to show or log.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "notice", rename_all = "snake_case"))]
pub enum ViewportNotice {
    /// A release reached the engine (document coordinates).
    ClickDispatched { pos: PointF, link: Option<String> },
    LinkHighlighted { rect: RectF },
    LinkHighlightCleared,
    /// A pending link click was dropped because a new page started loading.
    LinkDropped,
    ZoomStarted { from: f64, to: f64 },
    ZoomCommitted { scale: f64 },
    LoadProgress { percent: u8 },
    LoadFinished { success: bool },
}

// ---------------------------------------------------------------------------
// WebContent
// ---------------------------------------------------------------------------

/// The engine as panned content: its size is the document size times the
/// current scale.
#[derive(Debug)]
pub struct WebContent<E> {
    engine: E,
    scale: f64,
    tiles: TileCoordinator,
}

impl<E: ContentEngine> WebContent<E> {
    fn new(mut engine: E, scale: f64, tile_cache: bool) -> Self {
        engine.set_zoom_factor(scale);
        let mut content = Self {
            engine,
            scale,
            tiles: TileCoordinator::new(),
        };
        content.pause_tiles(TilePause::DISABLED, !tile_cache);
        content
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn tiles(&self) -> &TileCoordinator {
        &self.tiles
    }

    fn pause_tiles(&mut self, reason: TilePause, paused: bool) {
        if let Some(enabled) = self.tiles.set_paused(reason, paused) {
            tracing::debug!(
                target: "panview.engine",
                enabled,
                reasons = ?self.tiles.reasons(),
                "tile creation toggled"
            );
            self.engine.set_tile_creation_enabled(enabled);
        }
    }
}

impl<E: ContentEngine> PannedContent for WebContent<E> {
    fn content_size(&self) -> SizeF {
        self.engine.contents_size().scaled(self.scale)
    }

    fn pan_position_changed(&mut self, offset: PointF) {
        self.engine.set_scroll_offset((-offset).scaled(1.0 / self.scale));
    }

    fn set_updates_enabled(&mut self, enabled: bool) {
        self.pause_tiles(TilePause::KINETIC, !enabled);
    }
}

// ---------------------------------------------------------------------------
// WebSurface: the gesture consumer
// ---------------------------------------------------------------------------

struct WebSurface<E> {
    pannable: PannableViewport<WebContent<E>>,
    /// Scene position of the viewport's top-left corner.
    origin: PointF,
    zoom: ZoomAnimator,
    link: LinkConfirmation,
    tile_cache: bool,
    load_generation: u64,
    load_progress: u8,
    loading: bool,
    /// Time of the event or tick being processed; callbacks carry no clock.
    clock: Instant,
    notices: Vec<ViewportNotice>,
}

impl<E: ContentEngine> WebSurface<E> {
    fn scale(&self) -> f64 {
        self.pannable.content().map_or(1.0, WebContent::scale)
    }

    fn engine(&self) -> Option<&E> {
        self.pannable.content().map(WebContent::engine)
    }

    fn content_mut(&mut self) -> Option<&mut WebContent<E>> {
        self.pannable.content_mut()
    }

    fn dispatch(&mut self, event: &PointerEvent) {
        if let Some(content) = self.content_mut() {
            content.engine.dispatch_pointer(event);
        }
    }

    fn cancel_link(&mut self) {
        if self.link.cancel().is_some() {
            tracing::debug!(target: "panview.link", "pending link cancelled");
            self.notices.push(ViewportNotice::LinkHighlightCleared);
        }
    }

    // -- zoom ---------------------------------------------------------------

    fn pause_tiles(&mut self, reason: TilePause, paused: bool) {
        if let Some(content) = self.content_mut() {
            content.pause_tiles(reason, paused);
        }
    }

    /// Put `scale` and `pan` on screen without telling the engine.
    fn apply_frame(&mut self, scale: f64, pan: PointF) {
        let Some(content) = self.content_mut() else {
            return;
        };
        content.scale = scale;
        self.pannable.set_pan_position(pan);
    }

    fn commit_scale(&mut self, scale: f64) {
        if let Some(content) = self.content_mut() {
            content.engine.set_zoom_factor(scale);
        }
        tracing::debug!(target: "panview.zoom", scale, "zoom committed");
        self.notices.push(ViewportNotice::ZoomCommitted { scale });
    }

    fn start_zoom(&mut self, to_scale: f64, to_pan: PointF) {
        let Some(contents) = self.engine().map(ContentEngine::contents_size) else {
            return;
        };
        let now = self.clock;
        self.pannable.stop(now);
        let Some(to_scale) = self.zoom.config().clamp(to_scale) else {
            return;
        };
        let viewport = self.pannable.viewport_size();
        let to_pan = clip_pan(to_pan, contents, to_scale, viewport);
        let from = (self.scale(), self.pannable.pan_position());
        if from == (to_scale, to_pan) {
            return;
        }
        tracing::debug!(target: "panview.zoom", from = from.0, to = to_scale, "zoom animation started");
        self.zoom.start(now, from, (to_scale, to_pan));
        self.pause_tiles(TilePause::ZOOM_COMMIT, false);
        self.pause_tiles(TilePause::ZOOM_ANIMATION, true);
        self.notices.push(ViewportNotice::ZoomStarted {
            from: from.0,
            to: to_scale,
        });
    }

    fn apply_zoom_frame(&mut self, frame: ZoomFrame) {
        self.apply_frame(frame.scale, frame.pan);
        if frame.finished {
            self.commit_scale(frame.scale);
            self.pause_tiles(TilePause::ZOOM_ANIMATION, false);
            self.pause_tiles(TilePause::ZOOM_COMMIT, true);
        }
    }

    /// Returns `true` while the zoom animation still needs frames.
    fn tick_zoom(&mut self, now: Instant) -> bool {
        if let Some(frame) = self.zoom.tick(now) {
            self.apply_zoom_frame(frame);
        }
        if self.zoom.poll_commit(now) {
            tracing::trace!(target: "panview.zoom", "commit settled");
            self.pause_tiles(TilePause::ZOOM_COMMIT, false);
        }
        self.zoom.is_animating()
    }

    fn finish_zoom(&mut self) {
        if let Some(frame) = self.zoom.finish(self.clock) {
            self.apply_zoom_frame(frame);
        }
    }

    /// Zoom by `steps` increments around `anchor` (viewport coordinates).
    fn zoom_by(&mut self, steps: f64, anchor: PointF) {
        let step = self.zoom.config().step;
        let scale = self.scale();
        let base = self.zoom.target_scale().unwrap_or(scale);
        let Some(target) = self.zoom.config().clamp(base + steps * step) else {
            return;
        };
        let pan = anchored_pan(self.pannable.pan_position(), anchor, scale, target);
        self.start_zoom(target, pan);
    }

    /// Set the scale at once, keeping `anchor` (viewport coordinates) fixed.
    fn set_scale_now(&mut self, scale: f64, anchor: PointF) {
        let Some(scale) = self.zoom.config().clamp(scale) else {
            tracing::debug!(target: "panview.zoom", "ignoring NaN zoom scale");
            return;
        };
        if self.engine().is_none() {
            return;
        }
        self.zoom.cancel();
        self.pause_tiles(TilePause::ZOOM_ANIMATION, false);
        self.pause_tiles(TilePause::ZOOM_COMMIT, false);
        let pan = anchored_pan(self.pannable.pan_position(), anchor, self.scale(), scale);
        self.apply_frame(scale, pan);
        self.commit_scale(scale);
    }

    fn double_tap_zoom(&mut self, doc: PointF) {
        let Some(engine) = self.engine() else {
            return;
        };
        let viewport = self.pannable.viewport_size();
        let config = self.zoom.config();
        let scale = self.scale();
        let pan = self.pannable.pan_position();
        let fit = fit_width_scale(engine.contents_size(), viewport, config);

        if scale > fit * ZOOMED_IN_MARGIN {
            tracing::debug!(target: "panview.zoom", fit, "double tap: back to fit width");
            let screen_y = doc.y * scale + pan.y;
            self.start_zoom(fit, PointF::new(0.0, screen_y - doc.y * fit));
            return;
        }
        match block_zoom_target(engine, doc, viewport, config) {
            Some(target) => {
                tracing::debug!(
                    target: "panview.zoom",
                    element = target.element.0,
                    width = target.block.width,
                    scale = target.scale,
                    "double tap: zoom to block"
                );
                let to_pan = block_zoom_pan(doc, target.block, (scale, pan), target.scale, viewport);
                self.start_zoom(target.scale, to_pan);
            }
            None => tracing::debug!(target: "panview.zoom", "double tap: no block under point"),
        }
    }

    // -- links --------------------------------------------------------------

    fn poll_link(&mut self, now: Instant) {
        match self.link.poll(now, self.load_generation) {
            Some(LinkOutcome::Dispatch { release, url }) => {
                let _span = tracing::debug_span!(target: "panview.link", "link_dispatch").entered();
                tracing::info!(target: "panview.link", url = ?url, "link confirmed");
                self.dispatch(&release);
                self.notices.push(ViewportNotice::LinkHighlightCleared);
                self.notices.push(ViewportNotice::ClickDispatched {
                    pos: release.pos,
                    link: url,
                });
            }
            Some(LinkOutcome::Stale) => {
                tracing::debug!(target: "panview.link", "page changed, link click dropped");
                self.notices.push(ViewportNotice::LinkHighlightCleared);
                self.notices.push(ViewportNotice::LinkDropped);
            }
            None => {}
        }
    }
}

impl<E: ContentEngine> GestureConsumer for WebSurface<E> {
    fn coordinate_map(&self) -> CoordinateMap {
        CoordinateMap::new(self.origin + self.pannable.visual_offset(), self.scale())
    }

    fn press_seen(&mut self, event: &PointerEvent, confirmed: bool) {
        if confirmed {
            self.dispatch(event);
        } else {
            self.cancel_link();
        }
    }

    fn release_seen(&mut self, event: &PointerEvent) {
        let Some(hit) = self.engine().map(|engine| engine.hit_test(event.pos)) else {
            return;
        };
        if hit.is_link {
            tracing::debug!(target: "panview.link", url = ?hit.url, "link highlighted");
            self.link.begin(
                event.clone(),
                hit.bounding_rect,
                hit.url,
                self.load_generation,
                self.clock,
            );
            self.notices.push(ViewportNotice::LinkHighlighted {
                rect: hit.bounding_rect,
            });
        } else {
            self.dispatch(event);
            self.notices.push(ViewportNotice::ClickDispatched {
                pos: event.pos,
                link: None,
            });
        }
    }

    fn double_click_seen(&mut self, event: &PointerEvent) {
        self.double_tap_zoom(event.pos);
    }

    fn adjust_click_position(&mut self, pos: PointF) -> PointF {
        let Some(engine) = self.engine() else {
            return pos;
        };
        if engine.hit_test(pos).is_link {
            return pos;
        }
        // Slop is in screen pixels; probe in document space.
        let r = self.link.config().touch_slop / self.scale();
        let d = r / std::f64::consts::SQRT_2;
        let probes = [
            PointF::new(r, 0.0),
            PointF::new(-r, 0.0),
            PointF::new(0.0, r),
            PointF::new(0.0, -r),
            PointF::new(d, d),
            PointF::new(-d, d),
            PointF::new(d, -d),
            PointF::new(-d, -d),
        ];
        let nearest = probes
            .into_iter()
            .map(|offset| pos + offset)
            .filter_map(|probe| {
                let hit = engine.hit_test(probe);
                hit.is_link
                    .then(|| (probe, (hit.bounding_rect.clamp_point(pos) - pos).length()))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));
        match nearest {
            Some((probe, _)) => {
                tracing::trace!(target: "panview.link", x = probe.x, y = probe.y, "tap snapped to link");
                probe
            }
            None => pos,
        }
    }
}

// ---------------------------------------------------------------------------
// WebViewport
// ---------------------------------------------------------------------------

/// Pannable, zoomable viewport over one web engine.
pub struct WebViewport<E> {
    recognizer: GestureRecognizer,
    surface: WebSurface<E>,
}

impl<E> std::fmt::Debug for WebViewport<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebViewport")
            .field("origin", &self.surface.origin)
            .field("pannable", &self.surface.pannable)
            .field("recognizer", &self.recognizer)
            .field("zoom", &self.surface.zoom)
            .field("load_generation", &self.surface.load_generation)
            .finish()
    }
}

impl<E: ContentEngine> WebViewport<E> {
    /// An empty viewport at scene origin `(0, 0)`.
    #[must_use]
    pub fn new(size: SizeF, config: WebViewportConfig, now: Instant) -> Self {
        Self {
            recognizer: GestureRecognizer::new(config.gesture),
            surface: WebSurface {
                pannable: PannableViewport::new(size, config.pannable),
                origin: PointF::ZERO,
                zoom: ZoomAnimator::new(config.zoom),
                link: LinkConfirmation::new(config.link),
                tile_cache: config.tile_cache,
                load_generation: 0,
                load_progress: 0,
                loading: false,
                clock: now,
                notices: Vec::new(),
            },
        }
    }

    /// Install an engine, returning the previous one. Pending gestures,
    /// links and zoom animations belong to the old page and are dropped.
    pub fn set_engine(&mut self, engine: E) -> Option<E> {
        self.reset();
        let config = self.surface.zoom.config();
        let scale = config.clamp(engine.zoom_factor()).unwrap_or(1.0);
        let content = WebContent::new(engine, scale, self.surface.tile_cache);
        let old = self.surface.pannable.take_content();
        self.surface.pannable.set_content(content);
        old.map(|c| c.engine)
    }

    /// Remove the engine.
    pub fn take_engine(&mut self) -> Option<E> {
        self.reset();
        self.surface.pannable.take_content().map(|c| c.engine)
    }

    #[must_use]
    pub fn engine(&self) -> Option<&E> {
        self.surface.engine()
    }

    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.surface.content_mut().map(|c| &mut c.engine)
    }

    #[must_use]
    pub fn pannable(&self) -> &PannableViewport<WebContent<E>> {
        &self.surface.pannable
    }

    #[must_use]
    pub fn recognizer(&self) -> &GestureRecognizer {
        &self.recognizer
    }

    // -- geometry -----------------------------------------------------------

    /// Place the viewport at scene position `origin` with the given size.
    pub fn set_geometry(&mut self, origin: PointF, size: SizeF) {
        self.surface.origin = origin;
        self.surface.pannable.set_viewport_size(size);
    }

    #[must_use]
    pub fn origin(&self) -> PointF {
        self.surface.origin
    }

    #[must_use]
    pub fn viewport_size(&self) -> SizeF {
        self.surface.pannable.viewport_size()
    }

    #[must_use]
    pub fn pan_position(&self) -> PointF {
        self.surface.pannable.pan_position()
    }

    pub fn set_pan_position(&mut self, pan: PointF) {
        self.surface.pannable.set_pan_position(pan);
    }

    /// Scene-to-document mapping currently in effect.
    #[must_use]
    pub fn coordinate_map(&self) -> CoordinateMap {
        self.surface.coordinate_map()
    }

    // -- input --------------------------------------------------------------

    /// Run one pointer event through the filter chain. Returns `true` if it
    /// was consumed. Replayed events are never filtered.
    pub fn handle_pointer(&mut self, event: &PointerEvent, now: Instant) -> bool {
        if event.is_replay() {
            return false;
        }
        self.surface.clock = now;
        self.poll_timers(now);

        if matches!(event.kind, PointerKind::Press | PointerKind::DoubleClick) {
            if self.surface.zoom.is_animating() {
                self.surface.finish_zoom();
            }
            if event.is_primary() {
                self.surface.cancel_link();
            }
        }

        match self.surface.pannable.filter_event(event, now) {
            PanFilter::ClaimStarted => {
                tracing::debug!(target: "panview.gesture", "drag claimed as pan");
                self.recognizer.clear_delayed_press();
                self.surface.cancel_link();
                true
            }
            PanFilter::Claimed => true,
            PanFilter::Passed => self.recognizer.filter(event, now, &mut self.surface),
        }
    }

    /// Zoom by `steps` wheel notches, anchored at `scene_pos`.
    pub fn wheel_zoom(&mut self, steps: f64, scene_pos: PointF, now: Instant) {
        if steps == 0.0 || !steps.is_finite() {
            return;
        }
        self.surface.clock = now;
        let anchor = scene_pos - self.surface.origin;
        self.surface.zoom_by(steps, anchor);
    }

    /// One zoom step in, around the viewport centre.
    pub fn zoom_in(&mut self, now: Instant) {
        self.surface.clock = now;
        let centre = self.viewport_size().scaled(0.5).to_point();
        self.surface.zoom_by(1.0, centre);
    }

    /// One zoom step out, around the viewport centre.
    pub fn zoom_out(&mut self, now: Instant) {
        self.surface.clock = now;
        let centre = self.viewport_size().scaled(0.5).to_point();
        self.surface.zoom_by(-1.0, centre);
    }

    /// Apply `scale` (clamped) immediately, keeping the viewport centre on
    /// the same document point. Cancels a running zoom animation.
    pub fn set_zoom_scale(&mut self, scale: f64) {
        let centre = self.viewport_size().scaled(0.5).to_point();
        self.surface.set_scale_now(scale, centre);
    }

    #[must_use]
    pub fn zoom_scale(&self) -> f64 {
        self.surface.scale()
    }

    #[must_use]
    pub fn is_zooming(&self) -> bool {
        self.surface.zoom.is_animating()
    }

    // -- engine signals -----------------------------------------------------

    pub fn handle_engine_signal(&mut self, signal: &EngineSignal, now: Instant) {
        self.surface.clock = now;
        match *signal {
            EngineSignal::LoadStarted => {
                self.surface.load_generation += 1;
                self.surface.loading = true;
                self.surface.load_progress = 0;
                tracing::info!(
                    target: "panview.engine",
                    generation = self.surface.load_generation,
                    "load started"
                );
            }
            EngineSignal::LoadProgress { percent } => {
                let percent = percent.min(100);
                self.surface.load_progress = percent;
                self.surface
                    .notices
                    .push(ViewportNotice::LoadProgress { percent });
            }
            EngineSignal::LoadFinished { success } => {
                self.surface.loading = false;
                tracing::info!(target: "panview.engine", success, "load finished");
                self.surface
                    .notices
                    .push(ViewportNotice::LoadFinished { success });
                if success {
                    self.fit_to_width();
                }
            }
            EngineSignal::TileCreated { .. }
            | EngineSignal::TileRemoved { .. }
            | EngineSignal::TilePainted { .. } => {
                if let Some(content) = self.surface.content_mut() {
                    content.tiles.stats_mut().record(signal);
                }
            }
            EngineSignal::ViewportScaleChanged { scale } => self.set_zoom_scale(scale),
            EngineSignal::ContentsSizeChanged { .. } => {
                self.surface.pannable.content_geometry_changed();
            }
        }
    }

    /// Show the full document width, scrolled to the top-left.
    pub fn fit_to_width(&mut self) {
        let Some(contents) = self.engine().map(ContentEngine::contents_size) else {
            return;
        };
        let fit = fit_width_scale(contents, self.viewport_size(), self.surface.zoom.config());
        self.surface.set_scale_now(fit, PointF::ZERO);
        self.surface.pannable.set_pan_position(PointF::ZERO);
    }

    #[must_use]
    pub fn load_generation(&self) -> u64 {
        self.surface.load_generation
    }

    #[must_use]
    pub fn load_progress(&self) -> u8 {
        self.surface.load_progress
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.surface.loading
    }

    #[must_use]
    pub fn tile_stats(&self) -> TileStats {
        self.surface
            .pannable
            .content()
            .map_or_else(TileStats::default, |c| c.tiles.stats())
    }

    #[must_use]
    pub fn tile_pause(&self) -> TilePause {
        self.surface
            .pannable
            .content()
            .map_or_else(TilePause::empty, |c| c.tiles.reasons())
    }

    /// Rectangle of the link awaiting confirmation, in document coordinates.
    #[must_use]
    pub fn link_highlight(&self) -> Option<RectF> {
        self.surface.link.highlight()
    }

    // -- time ---------------------------------------------------------------

    fn poll_timers(&mut self, now: Instant) {
        self.recognizer.poll(now, &mut self.surface);
        self.surface.poll_link(now);
        if self.surface.zoom.poll_commit(now) {
            self.surface.pause_tiles(TilePause::ZOOM_COMMIT, false);
        }
    }

    /// Advance timers and animations. Returns `true` while frames are
    /// needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.surface.clock = now;
        self.recognizer.poll(now, &mut self.surface);
        let panning = self.surface.pannable.tick(now);
        let zooming = self.surface.tick_zoom(now);
        self.surface.poll_link(now);
        panning || zooming
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.surface.pannable.is_animating() || self.surface.zoom.is_animating()
    }

    /// Earliest timer deadline across all state machines.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.recognizer.next_deadline(),
            self.surface.pannable.next_deadline(),
            self.surface.zoom.next_deadline(),
            self.surface.link.next_deadline(),
        ]
        .into_iter()
        .fold(None, earliest)
    }

    #[must_use]
    pub fn scroller_state(&self) -> ScrollerState {
        self.surface.pannable.scroller_state()
    }

    /// Take the notices produced since the last call.
    pub fn drain_notices(&mut self) -> Vec<ViewportNotice> {
        std::mem::take(&mut self.surface.notices)
    }

    /// Abandon every interaction in flight without dispatching anything.
    /// A running zoom stops where it is and that scale is kept.
    pub fn reset(&mut self) {
        self.recognizer.reset();
        self.surface.pannable.reset();
        self.surface.link.cancel();
        if self.surface.zoom.is_animating() {
            let scale = self.surface.scale();
            if let Some(content) = self.surface.content_mut() {
                content.engine.set_zoom_factor(scale);
            }
        }
        self.surface.zoom.cancel();
        self.surface.pause_tiles(TilePause::ZOOM_ANIMATION, false);
        self.surface.pause_tiles(TilePause::ZOOM_COMMIT, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::static_page::{PageDescription, PageElement, StaticPage, rect};
    use panview_core::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn page() -> StaticPage {
        StaticPage::new(PageDescription {
            size: SizeF::new(800.0, 3000.0),
            elements: vec![
                PageElement::block(1, rect(0.0, 0.0, 800.0, 3000.0)),
                PageElement::block(2, rect(50.0, 100.0, 600.0, 400.0)).with_parent(1),
                PageElement::inline(3, rect(100.0, 600.0, 120.0, 30.0))
                    .with_parent(1)
                    .with_link("https://example.org/next"),
            ],
        })
    }

    fn viewport(t0: Instant) -> WebViewport<StaticPage> {
        let mut vp = WebViewport::new(SizeF::new(800.0, 480.0), WebViewportConfig::default(), t0);
        vp.set_engine(page());
        vp
    }

    fn tap(vp: &mut WebViewport<StaticPage>, at: PointF, t: Instant) {
        vp.handle_pointer(&PointerEvent::press(at, t), t);
        vp.handle_pointer(&PointerEvent::release(at, t + ms(150)), t + ms(150));
    }

    #[test]
    fn plain_tap_dispatches_after_delay() {
        let t0 = Instant::now();
        let mut vp = viewport(t0);
        tap(&mut vp, PointF::new(300.0, 200.0), t0);
        vp.tick(t0 + ms(449));
        assert!(vp.engine().unwrap().dispatched().is_empty());
        vp.tick(t0 + ms(450));
        let kinds: Vec<_> = vp.engine().unwrap().dispatched().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![PointerKind::Press, PointerKind::Release]);
        assert!(
            vp.drain_notices()
                .iter()
                .any(|n| matches!(n, ViewportNotice::ClickDispatched { link: None, .. }))
        );
    }

    #[test]
    fn tap_dispatch_uses_document_coordinates() {
        let t0 = Instant::now();
        let mut vp = viewport(t0);
        vp.set_pan_position(PointF::new(0.0, -200.0));
        tap(&mut vp, PointF::new(300.0, 100.0), t0);
        vp.tick(t0 + ms(450));
        let release = &vp.engine().unwrap().dispatched()[1];
        assert_eq!(release.pos, PointF::new(300.0, 300.0));
    }

    #[test]
    fn link_tap_highlights_then_navigates() {
        let t0 = Instant::now();
        let mut vp = viewport(t0);
        vp.set_pan_position(PointF::new(0.0, -500.0));
        tap(&mut vp, PointF::new(150.0, 110.0), t0);
        vp.tick(t0 + ms(450));
        assert_eq!(vp.link_highlight(), Some(rect(100.0, 600.0, 120.0, 30.0)));
        assert_eq!(vp.engine().unwrap().dispatched().len(), 1);

        vp.tick(t0 + ms(949));
        assert!(vp.engine().unwrap().navigations().is_empty());
        vp.tick(t0 + ms(950));
        assert_eq!(vp.link_highlight(), None);
        let nav = vp.engine().unwrap().navigations();
        assert_eq!(nav.len(), 1);
        assert_eq!(nav[0].url, "https://example.org/next");
    }

    #[test]
    fn near_miss_snaps_onto_link() {
        let t0 = Instant::now();
        let mut vp = viewport(t0);
        vp.set_pan_position(PointF::new(0.0, -500.0));
        // 5px above the link's top edge at y=100 in viewport space.
        tap(&mut vp, PointF::new(150.0, 95.0), t0);
        vp.tick(t0 + ms(450));
        assert!(vp.link_highlight().is_some());
    }

    #[test]
    fn new_press_cancels_pending_link() {
        let t0 = Instant::now();
        let mut vp = viewport(t0);
        vp.set_pan_position(PointF::new(0.0, -500.0));
        tap(&mut vp, PointF::new(150.0, 110.0), t0);
        vp.tick(t0 + ms(450));
        assert!(vp.link_highlight().is_some());
        vp.drain_notices();

        let t1 = t0 + ms(600);
        vp.handle_pointer(&PointerEvent::press(PointF::new(400.0, 400.0), t1), t1);
        assert_eq!(vp.link_highlight(), None);
        assert!(vp.drain_notices().contains(&ViewportNotice::LinkHighlightCleared));
        vp.tick(t0 + ms(2000));
        assert!(vp.engine().unwrap().navigations().is_empty());
    }

    #[test]
    fn load_between_release_and_confirm_drops_link() {
        let t0 = Instant::now();
        let mut vp = viewport(t0);
        vp.set_pan_position(PointF::new(0.0, -500.0));
        tap(&mut vp, PointF::new(150.0, 110.0), t0);
        vp.tick(t0 + ms(450));
        vp.handle_engine_signal(&EngineSignal::LoadStarted, t0 + ms(600));
        vp.tick(t0 + ms(950));
        assert!(vp.engine().unwrap().navigations().is_empty());
        assert!(vp.drain_notices().contains(&ViewportNotice::LinkDropped));
    }

    #[test]
    fn set_zoom_scale_keeps_centre() {
        let t0 = Instant::now();
        let mut vp = viewport(t0);
        vp.set_pan_position(PointF::new(0.0, -1000.0));
        let centre = PointF::new(400.0, 240.0);
        let before = vp.coordinate_map().to_local(centre);
        vp.set_zoom_scale(2.0);
        assert_eq!(vp.zoom_scale(), 2.0);
        assert_eq!(vp.engine().unwrap().zoom_factor(), 2.0);
        let after = vp.coordinate_map().to_local(centre);
        assert!((before - after).length() < 1e-9);
    }

    #[test]
    fn set_zoom_scale_nan_is_ignored() {
        let t0 = Instant::now();
        let mut vp = viewport(t0);
        vp.set_zoom_scale(1.5);
        vp.set_zoom_scale(f64::NAN);
        assert_eq!(vp.zoom_scale(), 1.5);
    }

    #[test]
    fn zoom_animation_pauses_then_resumes_tiles() {
        let t0 = Instant::now();
        let mut vp = viewport(t0);
        vp.zoom_in(t0);
        assert!(vp.is_zooming());
        assert!(!vp.engine().unwrap().tiles_enabled());
        assert_eq!(vp.tile_pause(), TilePause::ZOOM_ANIMATION);

        vp.tick(t0 + ms(150));
        let mid = vp.zoom_scale();
        assert!(mid > 1.0 && mid < 1.2, "mid scale {mid}");
        assert_eq!(vp.engine().unwrap().zoom_factor(), 1.0);

        vp.tick(t0 + ms(300));
        assert!(!vp.is_zooming());
        assert!((vp.zoom_scale() - 1.2).abs() < 1e-12);
        assert!((vp.engine().unwrap().zoom_factor() - 1.2).abs() < 1e-12);
        assert_eq!(vp.tile_pause(), TilePause::ZOOM_COMMIT);
        assert!(!vp.engine().unwrap().tiles_enabled());

        vp.tick(t0 + ms(800));
        assert!(vp.engine().unwrap().tiles_enabled());
    }

    #[test]
    fn double_tap_when_zoomed_returns_to_fit() {
        let t0 = Instant::now();
        let mut vp = viewport(t0);
        vp.set_zoom_scale(3.0);
        let at = PointF::new(200.0, 200.0);
        vp.handle_pointer(&PointerEvent::double_click(at, t0), t0);
        assert!(vp.is_zooming());
        vp.tick(t0 + ms(300));
        assert_eq!(vp.zoom_scale(), 1.0);
    }

    fn fling(vp: &mut WebViewport<StaticPage>, t0: Instant) -> Instant {
        let mut t = t0;
        let mut y = 400.0;
        vp.handle_pointer(&PointerEvent::press(PointF::new(400.0, y), t), t);
        for _ in 0..8 {
            t += ms(10);
            y -= 30.0;
            vp.handle_pointer(&PointerEvent::moved(PointF::new(400.0, y), t), t);
        }
        vp.handle_pointer(&PointerEvent::release(PointF::new(400.0, y), t), t);
        t
    }

    #[test]
    fn reset_mid_fling_resumes_tile_creation() {
        let t0 = Instant::now();
        let mut vp = viewport(t0);
        let t = fling(&mut vp, t0);
        assert!(vp.tile_pause().contains(TilePause::KINETIC));
        vp.reset();
        assert!(!vp.tile_pause().contains(TilePause::KINETIC));
        vp.tick(t + ms(8000));
        assert!(vp.tile_pause().is_empty());
        assert!(vp.engine().unwrap().tiles_enabled());
    }

    #[test]
    fn engine_swapped_mid_fling_gets_tiles() {
        let t0 = Instant::now();
        let mut vp = viewport(t0);
        let t = fling(&mut vp, t0);
        let old = vp.set_engine(page()).unwrap();
        // The outgoing page is not left paused either.
        assert!(old.tiles_enabled());
        assert!(!vp.tile_pause().contains(TilePause::KINETIC));
        vp.tick(t + ms(8000));
        assert!(vp.engine().unwrap().tiles_enabled());
    }

    #[test]
    fn fling_pauses_tile_creation() {
        let t0 = Instant::now();
        let mut vp = viewport(t0);
        fling(&mut vp, t0);
        assert_eq!(vp.scroller_state(), ScrollerState::Pushing);
        assert!(vp.tile_pause().contains(TilePause::KINETIC));
        assert!(vp.engine().unwrap().dispatched().is_empty());
    }

    #[test]
    fn tile_cache_off_keeps_tiles_disabled() {
        let t0 = Instant::now();
        let config = WebViewportConfig::default().with_tile_cache(false);
        let mut vp = WebViewport::new(SizeF::new(800.0, 480.0), config, t0);
        vp.set_engine(page());
        assert!(!vp.engine().unwrap().tiles_enabled());
        vp.zoom_in(t0);
        vp.tick(t0 + ms(2000));
        vp.tick(t0 + ms(4000));
        assert!(!vp.engine().unwrap().tiles_enabled());
        assert_eq!(vp.tile_pause(), TilePause::DISABLED);
    }

    #[test]
    fn load_finished_fits_width() {
        let t0 = Instant::now();
        let mut vp = WebViewport::new(SizeF::new(800.0, 480.0), WebViewportConfig::default(), t0);
        vp.set_engine(StaticPage::blank(SizeF::new(1600.0, 5000.0)));
        vp.handle_engine_signal(&EngineSignal::LoadStarted, t0);
        vp.handle_engine_signal(&EngineSignal::LoadProgress { percent: 140 }, t0);
        assert_eq!(vp.load_progress(), 100);
        assert!(vp.is_loading());
        vp.handle_engine_signal(&EngineSignal::LoadFinished { success: true }, t0);
        assert!(!vp.is_loading());
        assert_eq!(vp.zoom_scale(), 0.5);
        assert_eq!(vp.pan_position(), PointF::ZERO);
    }

    #[test]
    fn tile_signals_are_counted() {
        let t0 = Instant::now();
        let mut vp = viewport(t0);
        vp.handle_engine_signal(&EngineSignal::TileCreated { x: 0, y: 0 }, t0);
        vp.handle_engine_signal(&EngineSignal::TilePainted { x: 0, y: 0 }, t0);
        assert_eq!(vp.tile_stats().created, 1);
        assert_eq!(vp.tile_stats().painted, 1);
    }

    #[test]
    fn reset_drops_everything_silently() {
        let t0 = Instant::now();
        let mut vp = viewport(t0);
        tap(&mut vp, PointF::new(300.0, 200.0), t0);
        vp.zoom_in(t0 + ms(200));
        vp.reset();
        assert!(!vp.is_zooming());
        assert!(vp.engine().unwrap().tiles_enabled());
        vp.tick(t0 + ms(2000));
        assert!(vp.engine().unwrap().dispatched().is_empty());
        assert_eq!(vp.next_deadline(), None);
    }

    #[test]
    fn without_engine_nothing_happens() {
        let t0 = Instant::now();
        let mut vp: WebViewport<StaticPage> =
            WebViewport::new(SizeF::new(800.0, 480.0), WebViewportConfig::default(), t0);
        tap(&mut vp, PointF::new(10.0, 10.0), t0);
        vp.tick(t0 + ms(500));
        vp.set_zoom_scale(4.0);
        assert_eq!(vp.zoom_scale(), 1.0);
        assert!(vp.drain_notices().is_empty());
    }
}
