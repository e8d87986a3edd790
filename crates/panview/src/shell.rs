#![forbid(unsafe_code)]

//! The browser shell: windows, the home grid and the URL stores.
//!
//! [`Shell`] owns every open window (a [`BrowsingView`] each), the
//! [`HomeView`] used to pick between them, and the history and bookmark
//! stores. It is generic over the content engine so the same shell drives a
//! real engine and the replay tool's [`StaticPage`](panview_web::StaticPage).
//!
//! The shell is in exactly one [`Mode`] at a time. Input goes to the home
//! grid in [`Mode::Home`] and to the active window in [`Mode::Browsing`];
//! every window keeps ticking regardless, so a background page still gets
//! its link confirmation and zoom commit on time.
//!
//! # Invariants
//!
//! 1. In [`Mode::Browsing`] the active index names an existing window.
//! 2. Closing the last window returns the shell to [`Mode::Home`].
//! 3. A link click that reached the engine is recorded in history exactly
//!    once, with the window's URL updated to match.

use panview_core::timer::earliest;
use panview_core::{Instant, PointF, PointerEvent, SizeF};
use panview_web::{ContentEngine, EngineSignal, ViewportNotice, WebViewportConfig};
use serde::Serialize;

use crate::browsing::{BrowsingView, Chrome};
use crate::config::{FeatureFlags, ShellConfig};
use crate::error::{Result, ShellError};
use crate::home::{HomeAction, HomeView, WindowTile};
use crate::store::{BookmarkStore, HistoryStore};

/// Which surface receives input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Home,
    Browsing,
}

/// Everything observable the shell did, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ShellEvent {
    WindowOpened { window: usize },
    WindowClosed { window: usize },
    ModeChanged { mode: Mode, window: Option<usize> },
    /// The home grid was double tapped; the host decides what to load.
    NewWindowRequested,
    Viewport { window: usize, notice: ViewportNotice },
    Visited { window: usize, url: String },
}

/// One browsing window.
#[derive(Debug)]
pub struct Window<E> {
    view: BrowsingView<E>,
    url: Option<String>,
    title: Option<String>,
}

impl<E: ContentEngine> Window<E> {
    #[must_use]
    pub fn view(&self) -> &BrowsingView<E> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut BrowsingView<E> {
        &mut self.view
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

pub struct Shell<E> {
    config: ShellConfig,
    viewport_config: WebViewportConfig,
    chrome: Chrome,
    windows: Vec<Window<E>>,
    active: Option<usize>,
    mode: Mode,
    home: HomeView,
    history: HistoryStore,
    bookmarks: BookmarkStore,
    events: Vec<ShellEvent>,
}

impl<E> std::fmt::Debug for Shell<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("mode", &self.mode)
            .field("windows", &self.windows.len())
            .field("active", &self.active)
            .field("chrome", &self.chrome)
            .field("history", &self.history.len())
            .finish()
    }
}

impl<E: ContentEngine> Shell<E> {
    /// A shell with no windows, showing the home grid.
    #[must_use]
    pub fn new(config: ShellConfig, history: HistoryStore, bookmarks: BookmarkStore) -> Self {
        let chrome = config.to_chrome();
        let window = config.window_size();
        let area = chrome.content_rect(window);
        let mut home = HomeView::new(area.size(), config.to_home_config());
        home.set_geometry(area.origin(), area.size());
        tracing::info!(
            target: "panview.shell",
            width = window.width,
            height = window.height,
            toolbar = chrome.toolbar,
            fullscreen = chrome.fullscreen,
            gl = config.features.gl,
            tile_cache = config.features.tile_cache,
            "shell started"
        );
        Self {
            viewport_config: config.to_web_viewport_config(),
            config,
            chrome,
            windows: Vec::new(),
            active: None,
            mode: Mode::Home,
            home,
            history,
            bookmarks,
            events: Vec::new(),
        }
    }

    /// Build a shell whose stores are loaded from the configured paths.
    #[must_use]
    pub fn from_config(config: ShellConfig) -> Self {
        let capacity = config.stores.history_capacity;
        let history = config
            .stores
            .history_path
            .as_ref()
            .map_or_else(|| HistoryStore::new(capacity), |p| HistoryStore::load(p, capacity));
        let bookmarks = config
            .stores
            .bookmarks_path
            .as_ref()
            .map_or_else(BookmarkStore::default, BookmarkStore::load);
        Self::new(config, history, bookmarks)
    }

    // -- accessors ----------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    #[must_use]
    pub fn features(&self) -> &FeatureFlags {
        &self.config.features
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn chrome(&self) -> Chrome {
        self.chrome
    }

    #[must_use]
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }

    #[must_use]
    pub fn window(&self, index: usize) -> Option<&Window<E>> {
        self.windows.get(index)
    }

    pub fn window_mut(&mut self, index: usize) -> Option<&mut Window<E>> {
        self.windows.get_mut(index)
    }

    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    #[must_use]
    pub fn active_window(&self) -> Option<&Window<E>> {
        self.active.and_then(|i| self.windows.get(i))
    }

    pub fn active_window_mut(&mut self) -> Option<&mut Window<E>> {
        self.active.and_then(|i| self.windows.get_mut(i))
    }

    #[must_use]
    pub fn home(&self) -> &HomeView {
        &self.home
    }

    #[must_use]
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    #[must_use]
    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    pub fn bookmarks_mut(&mut self) -> &mut BookmarkStore {
        &mut self.bookmarks
    }

    // -- windows ------------------------------------------------------------

    /// Open a window over `engine` and switch to it.
    pub fn open_window(&mut self, engine: E, now: Instant) -> usize {
        let mut view = BrowsingView::new(
            self.config.window_size(),
            self.chrome,
            self.viewport_config.clone(),
            now,
        );
        view.viewport_mut().set_engine(engine);
        self.windows.push(Window {
            view,
            url: None,
            title: None,
        });
        let index = self.windows.len() - 1;
        tracing::info!(target: "panview.shell", window = index, "window opened");
        self.events.push(ShellEvent::WindowOpened { window: index });
        self.activate(index);
        index
    }

    /// Close a window and hand back its engine.
    pub fn close_window(&mut self, index: usize) -> Result<Option<E>> {
        if index >= self.windows.len() {
            return Err(ShellError::UnknownWindow { index });
        }
        let mut window = self.windows.remove(index);
        let engine = window.view.viewport_mut().take_engine();
        tracing::info!(target: "panview.shell", window = index, "window closed");
        self.events.push(ShellEvent::WindowClosed { window: index });

        match self.active {
            Some(active) if active == index => {
                self.active = None;
                if self.windows.is_empty() {
                    self.show_home();
                } else {
                    self.activate(index.min(self.windows.len() - 1));
                }
            }
            Some(active) if active > index => self.active = Some(active - 1),
            _ => {}
        }
        if self.mode == Mode::Home {
            self.refresh_home();
        }
        Ok(engine)
    }

    pub fn select_window(&mut self, index: usize) -> Result<()> {
        if index >= self.windows.len() {
            return Err(ShellError::UnknownWindow { index });
        }
        self.activate(index);
        Ok(())
    }

    fn activate(&mut self, index: usize) {
        if let Some(previous) = self.active_window_mut() {
            previous.view.reset();
        }
        self.home.reset();
        self.active = Some(index);
        self.set_mode(Mode::Browsing);
    }

    /// Switch to the window-selection grid.
    pub fn show_home(&mut self) {
        if let Some(window) = self.active_window_mut() {
            window.view.reset();
        }
        self.refresh_home();
        self.set_mode(Mode::Home);
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        let window = if mode == Mode::Browsing {
            self.active
        } else {
            None
        };
        tracing::debug!(target: "panview.shell", ?mode, ?window, "mode changed");
        self.events.push(ShellEvent::ModeChanged { mode, window });
    }

    fn refresh_home(&mut self) {
        let tiles = self
            .windows
            .iter()
            .map(|w| {
                let title = w
                    .title
                    .clone()
                    .or_else(|| {
                        w.url
                            .as_deref()
                            .and_then(|u| self.history.title_for(u))
                            .map(str::to_owned)
                    })
                    .or_else(|| w.url.clone())
                    .unwrap_or_else(|| "New window".to_owned());
                WindowTile {
                    title,
                    url: w.url.clone(),
                    loading: w.view.viewport().is_loading(),
                }
            })
            .collect();
        self.home.set_tiles(tiles);
    }

    /// Give a window a display title, also stored with its history entry.
    pub fn set_window_title(&mut self, index: usize, title: impl Into<String>) -> Result<()> {
        let window = self
            .windows
            .get_mut(index)
            .ok_or(ShellError::UnknownWindow { index })?;
        let title = title.into();
        if let Some(url) = &window.url {
            self.history.visit(url.clone(), title.clone());
        }
        window.title = Some(title);
        Ok(())
    }

    /// Bookmark the active window's URL. Returns `false` if there is none or
    /// it is already bookmarked.
    pub fn bookmark_active(&mut self) -> bool {
        let Some(window) = self.active.and_then(|i| self.windows.get(i)) else {
            return false;
        };
        let Some(url) = window.url.clone() else {
            return false;
        };
        let title = window.title.clone().unwrap_or_else(|| url.clone());
        self.bookmarks.add(url, title)
    }

    // -- chrome -------------------------------------------------------------

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.set_chrome(Chrome {
            fullscreen,
            ..self.chrome
        });
    }

    pub fn set_toolbar_visible(&mut self, toolbar: bool) {
        self.set_chrome(Chrome {
            toolbar,
            ..self.chrome
        });
    }

    fn set_chrome(&mut self, chrome: Chrome) {
        if chrome == self.chrome {
            return;
        }
        tracing::info!(
            target: "panview.shell",
            toolbar = chrome.toolbar,
            fullscreen = chrome.fullscreen,
            "chrome changed"
        );
        self.chrome = chrome;
        self.config.features.toolbar = chrome.toolbar;
        self.config.features.fullscreen = chrome.fullscreen;
        for window in &mut self.windows {
            window.view.set_chrome(chrome);
        }
        let area = chrome.content_rect(self.config.window_size());
        self.home.set_geometry(area.origin(), area.size());
    }

    // -- input --------------------------------------------------------------

    /// Route a pointer event to the surface of the current mode.
    pub fn handle_pointer(&mut self, event: &PointerEvent, now: Instant) -> bool {
        let consumed = match self.mode {
            Mode::Home => self.home.handle_pointer(event, now),
            Mode::Browsing => self
                .active_window_mut()
                .is_some_and(|w| w.view.handle_pointer(event, now)),
        };
        self.collect();
        consumed
    }

    /// Wheel zoom; ignored on the home grid.
    pub fn handle_wheel(&mut self, steps: f64, scene_pos: PointF, now: Instant) -> bool {
        let consumed = self.mode == Mode::Browsing
            && self
                .active_window_mut()
                .is_some_and(|w| w.view.handle_wheel(steps, scene_pos, now));
        self.collect();
        consumed
    }

    /// Deliver an engine signal to window `index`.
    pub fn handle_engine_signal(
        &mut self,
        index: usize,
        signal: &EngineSignal,
        now: Instant,
    ) -> Result<()> {
        let window = self
            .windows
            .get_mut(index)
            .ok_or(ShellError::UnknownWindow { index })?;
        window.view.handle_engine_signal(signal, now);
        self.collect();
        Ok(())
    }

    // -- time ---------------------------------------------------------------

    /// Advance every window and, in home mode, the grid. Returns `true`
    /// while frames are needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut animating = false;
        for window in &mut self.windows {
            animating |= window.view.tick(now);
        }
        if self.mode == Mode::Home {
            animating |= self.home.tick(now);
        }
        self.collect();
        animating
    }

    /// Earliest wake-up needed by any window or the grid.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        let windows = self
            .windows
            .iter()
            .map(|w| w.view.next_deadline())
            .fold(None, earliest);
        let home = (self.mode == Mode::Home)
            .then(|| self.home.next_deadline())
            .flatten();
        earliest(windows, home)
    }

    pub fn drain_events(&mut self) -> Vec<ShellEvent> {
        std::mem::take(&mut self.events)
    }

    fn collect(&mut self) {
        for index in 0..self.windows.len() {
            for notice in self.windows[index].view.drain_notices() {
                if let ViewportNotice::ClickDispatched {
                    link: Some(url), ..
                } = &notice
                {
                    self.record_visit(index, url.clone());
                }
                self.events.push(ShellEvent::Viewport {
                    window: index,
                    notice,
                });
            }
        }
        for action in self.home.drain_actions() {
            match action {
                HomeAction::SelectWindow { index } => {
                    if let Err(err) = self.select_window(index) {
                        tracing::warn!(target: "panview.shell", error = %err, "stale home tile");
                    }
                }
                HomeAction::OpenNewWindow => self.events.push(ShellEvent::NewWindowRequested),
            }
        }
    }

    fn record_visit(&mut self, index: usize, url: String) {
        let window = &mut self.windows[index];
        window.url = Some(url.clone());
        window.title = None;
        let title = self
            .history
            .title_for(&url)
            .map_or_else(|| url.clone(), str::to_owned);
        self.history.visit(url.clone(), title);
        tracing::info!(target: "panview.shell", window = index, %url, "visited");
        self.events.push(ShellEvent::Visited { window: index, url });
    }

    // -- persistence --------------------------------------------------------

    /// Write history and bookmarks to their configured paths.
    pub fn save_stores(&self) -> Result<()> {
        if let Some(path) = &self.config.stores.history_path {
            self.history.save(path)?;
        }
        if let Some(path) = &self.config.stores.bookmarks_path {
            self.bookmarks.save(path)?;
        }
        Ok(())
    }

    /// Window size the shell lays out for.
    #[must_use]
    pub fn window_size(&self) -> SizeF {
        self.config.window_size()
    }
}
