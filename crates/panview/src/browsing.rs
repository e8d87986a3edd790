#![forbid(unsafe_code)]

//! The browsing view: one web viewport laid out under the window chrome.
//!
//! The toolbar, when shown and not in fullscreen, takes a strip at the top
//! of the window; the web viewport gets the rest. Pointer input follows
//! press capture: a press inside the viewport captures the pointer and every
//! move and release up to the next release goes to the viewport, wherever
//! it lands. A press on the chrome is not the viewport's.

use panview_core::{Instant, PointF, PointerEvent, PointerKind, RectF, SizeF};
use panview_web::{ContentEngine, EngineSignal, ViewportNotice, WebViewport, WebViewportConfig};

/// Window chrome state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chrome {
    pub toolbar: bool,
    pub fullscreen: bool,
    pub toolbar_height: f64,
}

impl Default for Chrome {
    fn default() -> Self {
        Self {
            toolbar: true,
            fullscreen: false,
            toolbar_height: 56.0,
        }
    }
}

impl Chrome {
    /// Height actually taken by the toolbar.
    #[must_use]
    pub fn toolbar_extent(&self) -> f64 {
        if self.toolbar && !self.fullscreen {
            self.toolbar_height.max(0.0)
        } else {
            0.0
        }
    }

    /// Scene rectangle left for content in a window of `window` size.
    #[must_use]
    pub fn content_rect(&self, window: SizeF) -> RectF {
        let top = self.toolbar_extent().min(window.height);
        RectF::new(0.0, top, window.width, window.height - top)
    }
}

/// A web viewport plus the chrome around it.
#[derive(Debug)]
pub struct BrowsingView<E> {
    viewport: WebViewport<E>,
    window: SizeF,
    chrome: Chrome,
    captured: bool,
}

impl<E: ContentEngine> BrowsingView<E> {
    #[must_use]
    pub fn new(window: SizeF, chrome: Chrome, config: WebViewportConfig, now: Instant) -> Self {
        let rect = chrome.content_rect(window);
        let mut viewport = WebViewport::new(rect.size(), config, now);
        viewport.set_geometry(rect.origin(), rect.size());
        Self {
            viewport,
            window,
            chrome,
            captured: false,
        }
    }

    #[must_use]
    pub fn viewport(&self) -> &WebViewport<E> {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut WebViewport<E> {
        &mut self.viewport
    }

    #[must_use]
    pub fn chrome(&self) -> Chrome {
        self.chrome
    }

    #[must_use]
    pub fn content_rect(&self) -> RectF {
        self.chrome.content_rect(self.window)
    }

    pub fn set_window_size(&mut self, window: SizeF) {
        self.window = window;
        self.relayout();
    }

    pub fn set_chrome(&mut self, chrome: Chrome) {
        if chrome != self.chrome {
            self.chrome = chrome;
            self.relayout();
        }
    }

    fn relayout(&mut self) {
        let rect = self.content_rect();
        tracing::debug!(
            target: "panview.shell",
            top = rect.y,
            width = rect.width,
            height = rect.height,
            "browsing view laid out"
        );
        self.viewport.set_geometry(rect.origin(), rect.size());
    }

    /// Route a pointer event. Returns `true` if the viewport consumed it.
    pub fn handle_pointer(&mut self, event: &PointerEvent, now: Instant) -> bool {
        match event.kind {
            PointerKind::Press | PointerKind::DoubleClick => {
                if !self.content_rect().contains(event.scene_pos) {
                    return false;
                }
                self.captured = true;
                self.viewport.handle_pointer(event, now)
            }
            PointerKind::Move => self.captured && self.viewport.handle_pointer(event, now),
            PointerKind::Release => {
                if !std::mem::take(&mut self.captured) {
                    return false;
                }
                self.viewport.handle_pointer(event, now)
            }
        }
    }

    /// Wheel zoom over the content area.
    pub fn handle_wheel(&mut self, steps: f64, scene_pos: PointF, now: Instant) -> bool {
        if !self.content_rect().contains(scene_pos) {
            return false;
        }
        self.viewport.wheel_zoom(steps, scene_pos, now);
        true
    }

    pub fn handle_engine_signal(&mut self, signal: &EngineSignal, now: Instant) {
        self.viewport.handle_engine_signal(signal, now);
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.viewport.tick(now)
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.viewport.next_deadline()
    }

    pub fn drain_notices(&mut self) -> Vec<ViewportNotice> {
        self.viewport.drain_notices()
    }

    /// Drop the pointer capture and every gesture in flight.
    pub fn reset(&mut self) {
        self.captured = false;
        self.viewport.reset();
    }
}
