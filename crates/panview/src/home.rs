#![forbid(unsafe_code)]

//! The window-selection grid.
//!
//! [`HomeView`] shows one tile per open window in a pannable grid. It is the
//! second [`GestureConsumer`] in the shell: the same pan filter and
//! recognizer that front the web viewport decide whether a touch was a
//! scroll of the grid, a tap on a tile, or a double tap.
//!
//! - confirmed tap on a tile: [`HomeAction::SelectWindow`]
//! - double tap anywhere: [`HomeAction::OpenNewWindow`]
//!
//! # Invariants
//!
//! 1. Tile rectangles never overlap; `index_at` returns at most one tile.
//! 2. A tap that turned into a pan never selects a window.

use panview_core::timer::earliest;
use panview_core::{
    CoordinateMap, GestureConfig, GestureConsumer, GestureRecognizer, Instant, PointF,
    PointerEvent, RectF, SizeF,
};
use panview_scroll::{PanFilter, PannableConfig, PannableViewport, PannedContent};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Fixed-size tiles in row-major order with uniform spacing (also used as
/// the outer margin).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub tile: SizeF,
    pub spacing: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            columns: 3,
            tile: SizeF::new(240.0, 160.0),
            spacing: 16.0,
        }
    }
}

impl GridLayout {
    fn columns(&self) -> usize {
        self.columns.max(1)
    }

    #[must_use]
    pub fn tile_rect(&self, index: usize) -> RectF {
        let col = (index % self.columns()) as f64;
        let row = (index / self.columns()) as f64;
        RectF::new(
            self.spacing + col * (self.tile.width + self.spacing),
            self.spacing + row * (self.tile.height + self.spacing),
            self.tile.width,
            self.tile.height,
        )
    }

    /// Size of a grid holding `count` tiles.
    #[must_use]
    pub fn content_size(&self, count: usize) -> SizeF {
        let cols = count.min(self.columns()) as f64;
        let rows = count.div_ceil(self.columns()) as f64;
        SizeF::new(
            self.spacing + cols * (self.tile.width + self.spacing),
            self.spacing + rows * (self.tile.height + self.spacing),
        )
    }

    /// Tile under `p` (grid coordinates), if any. Points in the spacing
    /// belong to no tile.
    #[must_use]
    pub fn index_at(&self, p: PointF, count: usize) -> Option<usize> {
        let pitch_x = self.tile.width + self.spacing;
        let pitch_y = self.tile.height + self.spacing;
        if !p.is_finite() || pitch_x <= 0.0 || pitch_y <= 0.0 {
            return None;
        }
        let col = ((p.x - self.spacing) / pitch_x).floor();
        let row = ((p.y - self.spacing) / pitch_y).floor();
        if col < 0.0 || row < 0.0 || col >= self.columns() as f64 {
            return None;
        }
        let index = row as usize * self.columns() + col as usize;
        (index < count && self.tile_rect(index).contains(p)).then_some(index)
    }
}

// ---------------------------------------------------------------------------
// Tiles
// ---------------------------------------------------------------------------

/// What a tile shows for one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowTile {
    pub title: String,
    pub url: Option<String>,
    pub loading: bool,
}

impl WindowTile {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: None,
            loading: false,
        }
    }
}

/// The grid as panned content.
#[derive(Debug, Clone, Default)]
pub struct TileGrid {
    layout: GridLayout,
    tiles: Vec<WindowTile>,
    offset: PointF,
}

impl TileGrid {
    #[must_use]
    pub fn new(layout: GridLayout) -> Self {
        Self {
            layout,
            tiles: Vec::new(),
            offset: PointF::ZERO,
        }
    }

    #[must_use]
    pub fn tiles(&self) -> &[WindowTile] {
        &self.tiles
    }

    #[must_use]
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Visible offset last reported by the pannable viewport.
    #[must_use]
    pub fn offset(&self) -> PointF {
        self.offset
    }
}

impl PannedContent for TileGrid {
    fn content_size(&self) -> SizeF {
        self.layout.content_size(self.tiles.len())
    }

    fn pan_position_changed(&mut self, offset: PointF) {
        self.offset = offset;
    }
}

// ---------------------------------------------------------------------------
// HomeView
// ---------------------------------------------------------------------------

/// Requests the home grid makes of the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HomeAction {
    SelectWindow { index: usize },
    OpenNewWindow,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HomeConfig {
    pub layout: GridLayout,
    pub pannable: PannableConfig,
    pub gesture: GestureConfig,
}

#[derive(Debug)]
struct HomeSurface {
    pannable: PannableViewport<TileGrid>,
    origin: PointF,
    pressed: Option<usize>,
    actions: Vec<HomeAction>,
}

impl HomeSurface {
    fn tile_at(&self, p: PointF) -> Option<usize> {
        let grid = self.pannable.content()?;
        grid.layout.index_at(p, grid.tiles.len())
    }
}

impl GestureConsumer for HomeSurface {
    fn coordinate_map(&self) -> CoordinateMap {
        CoordinateMap::translation(self.origin + self.pannable.visual_offset())
    }

    fn press_seen(&mut self, event: &PointerEvent, _confirmed: bool) {
        self.pressed = self.tile_at(event.pos);
    }

    fn release_seen(&mut self, event: &PointerEvent) {
        self.pressed = None;
        if let Some(index) = self.tile_at(event.pos) {
            tracing::debug!(target: "panview.shell", index, "home tile selected");
            self.actions.push(HomeAction::SelectWindow { index });
        }
    }

    fn double_click_seen(&mut self, _event: &PointerEvent) {
        self.pressed = None;
        tracing::debug!(target: "panview.shell", "home double tap");
        self.actions.push(HomeAction::OpenNewWindow);
    }
}

/// Pannable grid of window tiles.
#[derive(Debug)]
pub struct HomeView {
    recognizer: GestureRecognizer,
    surface: HomeSurface,
}

impl HomeView {
    #[must_use]
    pub fn new(size: SizeF, config: HomeConfig) -> Self {
        let mut pannable = PannableViewport::new(size, config.pannable);
        pannable.set_content(TileGrid::new(config.layout));
        Self {
            recognizer: GestureRecognizer::new(config.gesture),
            surface: HomeSurface {
                pannable,
                origin: PointF::ZERO,
                pressed: None,
                actions: Vec::new(),
            },
        }
    }

    /// Replace the tiles. The pan position is re-clipped to the new grid.
    pub fn set_tiles(&mut self, tiles: Vec<WindowTile>) {
        self.reset();
        if let Some(grid) = self.surface.pannable.content_mut() {
            grid.tiles = tiles;
        }
        self.surface.pannable.content_geometry_changed();
    }

    #[must_use]
    pub fn tiles(&self) -> &[WindowTile] {
        self.surface
            .pannable
            .content()
            .map(TileGrid::tiles)
            .unwrap_or_default()
    }

    pub fn set_geometry(&mut self, origin: PointF, size: SizeF) {
        self.surface.origin = origin;
        self.surface.pannable.set_viewport_size(size);
    }

    #[must_use]
    pub fn origin(&self) -> PointF {
        self.surface.origin
    }

    #[must_use]
    pub fn pannable(&self) -> &PannableViewport<TileGrid> {
        &self.surface.pannable
    }

    /// Tile currently under a finger, for press highlighting.
    #[must_use]
    pub fn pressed_tile(&self) -> Option<usize> {
        self.surface.pressed
    }

    /// Scene rectangle of tile `index` at the current pan position.
    #[must_use]
    pub fn tile_scene_rect(&self, index: usize) -> Option<RectF> {
        let grid = self.surface.pannable.content()?;
        (index < grid.tiles.len()).then(|| {
            grid.layout
                .tile_rect(index)
                .translated(self.surface.coordinate_map().offset)
        })
    }

    /// Same filter order as the web viewport: pan capture first, then the
    /// recognizer.
    pub fn handle_pointer(&mut self, event: &PointerEvent, now: Instant) -> bool {
        if event.is_replay() {
            return false;
        }
        self.recognizer.poll(now, &mut self.surface);
        match self.surface.pannable.filter_event(event, now) {
            PanFilter::ClaimStarted => {
                self.recognizer.clear_delayed_press();
                self.surface.pressed = None;
                true
            }
            PanFilter::Claimed => true,
            PanFilter::Passed => self.recognizer.filter(event, now, &mut self.surface),
        }
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.recognizer.poll(now, &mut self.surface);
        self.surface.pannable.tick(now)
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.surface.pannable.is_animating()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        earliest(
            self.recognizer.next_deadline(),
            self.surface.pannable.next_deadline(),
        )
    }

    pub fn drain_actions(&mut self) -> Vec<HomeAction> {
        std::mem::take(&mut self.surface.actions)
    }

    pub fn reset(&mut self) {
        self.recognizer.reset();
        self.surface.pannable.reset();
        self.surface.pressed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panview_core::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn view(count: usize) -> HomeView {
        let mut view = HomeView::new(SizeF::new(800.0, 424.0), HomeConfig::default());
        view.set_geometry(PointF::new(0.0, 56.0), SizeF::new(800.0, 424.0));
        view.set_tiles((0..count).map(|i| WindowTile::new(format!("w{i}"))).collect());
        view
    }

    fn tap(view: &mut HomeView, p: PointF, t: Instant) {
        view.handle_pointer(&PointerEvent::press(p, t), t);
        view.handle_pointer(&PointerEvent::release(p, t + ms(150)), t + ms(150));
    }

    #[test]
    fn layout_geometry() {
        let layout = GridLayout::default();
        assert_eq!(layout.tile_rect(0), RectF::new(16.0, 16.0, 240.0, 160.0));
        assert_eq!(layout.tile_rect(4), RectF::new(272.0, 192.0, 240.0, 160.0));
        assert_eq!(layout.content_size(4), SizeF::new(784.0, 368.0));
        assert_eq!(layout.content_size(1), SizeF::new(272.0, 192.0));
        assert_eq!(layout.content_size(0), SizeF::new(16.0, 16.0));
    }

    #[test]
    fn index_at_ignores_spacing_and_missing_tiles() {
        let layout = GridLayout::default();
        assert_eq!(layout.index_at(PointF::new(20.0, 20.0), 4), Some(0));
        assert_eq!(layout.index_at(PointF::new(300.0, 200.0), 5), Some(4));
        assert_eq!(layout.index_at(PointF::new(300.0, 200.0), 4), None);
        assert_eq!(layout.index_at(PointF::new(260.0, 20.0), 4), None);
        assert_eq!(layout.index_at(PointF::new(600.0, 200.0), 4), None);
        assert_eq!(layout.index_at(PointF::new(-5.0, 20.0), 4), None);
        assert_eq!(layout.index_at(PointF::new(f64::NAN, 20.0), 4), None);
    }

    #[test]
    fn reset_mid_fling_releases_updates() {
        let mut view = view(30);
        let t0 = Instant::now();
        let mut t = t0;
        let mut y = 400.0;
        view.handle_pointer(&PointerEvent::press(PointF::new(400.0, y), t), t);
        for _ in 0..8 {
            t += ms(10);
            y -= 30.0;
            view.handle_pointer(&PointerEvent::moved(PointF::new(400.0, y), t), t);
        }
        view.handle_pointer(&PointerEvent::release(PointF::new(400.0, y), t), t);
        assert!(!view.pannable().updates_enabled());
        view.reset();
        assert!(view.pannable().updates_enabled());
        assert!(view.drain_actions().is_empty());
    }

    #[test]
    fn confirmed_tap_selects_window() {
        let mut view = view(4);
        let t0 = Instant::now();
        // Tile 1 spans x 272..512, y 16..176 in grid space; +56 in scene y.
        tap(&mut view, PointF::new(300.0, 100.0), t0);
        assert!(view.drain_actions().is_empty());
        view.tick(t0 + ms(500));
        assert_eq!(view.drain_actions(), vec![HomeAction::SelectWindow { index: 1 }]);
    }

    #[test]
    fn tap_on_spacing_selects_nothing() {
        let mut view = view(4);
        let t0 = Instant::now();
        tap(&mut view, PointF::new(264.0, 100.0), t0);
        view.tick(t0 + ms(500));
        assert!(view.drain_actions().is_empty());
    }

    #[test]
    fn double_tap_opens_window() {
        let mut view = view(2);
        let t0 = Instant::now();
        let p = PointF::new(100.0, 100.0);
        tap(&mut view, p, t0);
        tap(&mut view, p, t0 + ms(200));
        assert_eq!(view.drain_actions(), vec![HomeAction::OpenNewWindow]);
        view.tick(t0 + ms(1000));
        assert!(view.drain_actions().is_empty());
    }

    #[test]
    fn drag_scrolls_grid_without_selecting() {
        // Twelve tiles: four rows, 720 tall, in a 424 tall viewport.
        let mut view = view(12);
        let t0 = Instant::now();
        let mut p = PointF::new(100.0, 300.0);
        view.handle_pointer(&PointerEvent::press(p, t0), t0);
        for i in 1..=10 {
            p.y -= 10.0;
            let t = t0 + ms(16 * i);
            view.handle_pointer(&PointerEvent::moved(p, t), t);
        }
        let t_up = t0 + ms(400);
        view.handle_pointer(&PointerEvent::release(p, t_up), t_up);
        view.tick(t0 + ms(2000));
        assert!(view.drain_actions().is_empty());
        assert!(view.pannable().pan_position().y < 0.0);
    }

    #[test]
    fn scene_rect_follows_origin() {
        let view = view(3);
        assert_eq!(
            view.tile_scene_rect(0),
            Some(RectF::new(16.0, 72.0, 240.0, 160.0))
        );
        assert_eq!(view.tile_scene_rect(3), None);
    }
}
