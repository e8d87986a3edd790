#![forbid(unsafe_code)]

//! Shell configuration as data.
//!
//! [`ShellConfig`] gathers every tunable of the interaction core plus the
//! shell's own feature flags. It loads from TOML or JSON; every section and
//! field is optional and falls back to the component defaults, so an empty
//! file behaves exactly like no file.
//!
//! ```toml
//! [gesture]
//! press_delay_ms = 250
//!
//! [zoom]
//! max = 6.0
//!
//! [features]
//! toolbar = false
//! ```
//!
//! Command-line flags are applied on top with [`ShellConfig::apply_flags`].

use std::path::Path;

use panview_core::{Duration, GestureConfig, SizeF};
use panview_scroll::{PannableConfig, ScrollbarConfig, ScrollerConfig, UpdateGateConfig};
use panview_web::{LinkConfig, WebViewportConfig, ZoomConfig};
use serde::{Deserialize, Serialize};

use crate::browsing::Chrome;
use crate::error::{Result, ShellError};
use crate::home::{GridLayout, HomeConfig};

// ---------------------------------------------------------------------------
// Top-level ShellConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub gesture: GesturePolicy,
    pub scroll: ScrollPolicy,
    pub zoom: ZoomPolicy,
    pub link: LinkPolicy,
    pub window: WindowPolicy,
    pub home: HomePolicy,
    pub stores: StorePolicy,
    pub features: FeatureFlags,
}

impl ShellConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load by extension: `.json` is JSON, anything else TOML. The result
    /// is validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ShellError::MissingPath {
                path: path.to_path_buf(),
            });
        }
        let config = if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_file(path)?
        } else {
            Self::from_toml_file(path)?
        };
        config.validated()
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// `self` if valid, otherwise every problem as one error.
    pub fn validated(self) -> Result<Self> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ShellError::InvalidConfig { errors })
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.gesture.press_delay_ms == 0 {
            errors.push("gesture.press_delay_ms must be > 0".into());
        }

        if self.scroll.drag_start_distance < 0.0 {
            errors.push(format!(
                "scroll.drag_start_distance must be >= 0, got {}",
                self.scroll.drag_start_distance
            ));
        }
        if !(0.0..=1.0).contains(&self.scroll.axis_lock_threshold) {
            errors.push(format!(
                "scroll.axis_lock_threshold must be in [0, 1], got {}",
                self.scroll.axis_lock_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.scroll.overshoot_resistance) {
            errors.push(format!(
                "scroll.overshoot_resistance must be in [0, 1], got {}",
                self.scroll.overshoot_resistance
            ));
        }
        if self.scroll.deceleration <= 0.0 {
            errors.push(format!(
                "scroll.deceleration must be > 0, got {}",
                self.scroll.deceleration
            ));
        }
        if self.scroll.max_velocity < self.scroll.min_fling_velocity {
            errors.push(format!(
                "scroll.max_velocity ({}) must be >= scroll.min_fling_velocity ({})",
                self.scroll.max_velocity, self.scroll.min_fling_velocity
            ));
        }

        if self.zoom.min.is_nan() || self.zoom.min <= 0.0 {
            errors.push(format!("zoom.min must be > 0, got {}", self.zoom.min));
        }
        if self.zoom.max.is_nan() || self.zoom.max < self.zoom.min {
            errors.push(format!(
                "zoom.max ({}) must be >= zoom.min ({})",
                self.zoom.max, self.zoom.min
            ));
        }
        if self.zoom.step.is_nan() || self.zoom.step <= 0.0 {
            errors.push(format!("zoom.step must be > 0, got {}", self.zoom.step));
        }
        if self.zoom.min_target_width <= 0.0 {
            errors.push(format!(
                "zoom.min_target_width must be > 0, got {}",
                self.zoom.min_target_width
            ));
        }

        if self.link.touch_slop < 0.0 {
            errors.push(format!(
                "link.touch_slop must be >= 0, got {}",
                self.link.touch_slop
            ));
        }

        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            errors.push(format!(
                "window size must be positive, got {}x{}",
                self.window.width, self.window.height
            ));
        }
        if self.window.toolbar_height < 0.0 || self.window.toolbar_height >= self.window.height {
            errors.push(format!(
                "window.toolbar_height must be in [0, height), got {}",
                self.window.toolbar_height
            ));
        }

        if self.home.columns == 0 {
            errors.push("home.columns must be > 0".into());
        }
        if self.home.tile_width <= 0.0 || self.home.tile_height <= 0.0 || self.home.spacing < 0.0 {
            errors.push(format!(
                "home tiles must be positive with non-negative spacing, got {}x{} spaced {}",
                self.home.tile_width, self.home.tile_height, self.home.spacing
            ));
        }
        if self.stores.history_capacity == 0 {
            errors.push("stores.history_capacity must be > 0".into());
        }

        errors
    }

    /// Apply command-line feature flags on top of the file values.
    pub fn apply_flags(&mut self, flags: &FlagOverrides) {
        if flags.fullscreen {
            self.features.fullscreen = true;
        }
        if flags.no_toolbar {
            self.features.toolbar = false;
        }
        if flags.gl {
            self.features.gl = true;
        }
        if flags.no_tile_cache {
            self.features.tile_cache = false;
        }
        if flags.show_fps {
            self.features.show_fps = true;
        }
    }

    /// Build a [`GestureConfig`] from this config.
    #[must_use]
    pub fn to_gesture_config(&self) -> GestureConfig {
        GestureConfig::default()
            .with_press_delay(Duration::from_millis(self.gesture.press_delay_ms))
            .with_min_hold(Duration::from_millis(self.gesture.min_hold_ms))
            .with_double_click_guard(Duration::from_millis(self.gesture.double_click_guard_ms))
    }

    /// Build a [`ScrollerConfig`] from this config.
    #[must_use]
    pub fn to_scroller_config(&self) -> ScrollerConfig {
        ScrollerConfig {
            drag_start_distance: self.scroll.drag_start_distance,
            axis_lock_threshold: self.scroll.axis_lock_threshold,
            overshoot_resistance: self.scroll.overshoot_resistance,
            max_overshoot: self.scroll.max_overshoot,
            min_fling_velocity: self.scroll.min_fling_velocity,
            max_velocity: self.scroll.max_velocity,
            deceleration: self.scroll.deceleration,
            ..ScrollerConfig::default()
        }
    }

    /// Build a [`PannableConfig`] from this config.
    #[must_use]
    pub fn to_pannable_config(&self) -> PannableConfig {
        PannableConfig {
            scroller: self.to_scroller_config(),
            scrollbar: ScrollbarConfig {
                fade_delay: Duration::from_millis(self.scroll.scrollbar_fade_delay_ms),
                ..ScrollbarConfig::default()
            },
            update_gate: UpdateGateConfig {
                resume_delay: Duration::from_millis(self.scroll.update_resume_delay_ms),
            },
        }
    }

    /// Build a [`ZoomConfig`] from this config.
    #[must_use]
    pub fn to_zoom_config(&self) -> ZoomConfig {
        ZoomConfig {
            min_zoom: self.zoom.min,
            max_zoom: self.zoom.max,
            step: self.zoom.step,
            animation_duration: Duration::from_millis(self.zoom.animation_ms),
            commit_delay: Duration::from_millis(self.zoom.commit_delay_ms),
            min_block_width: self.zoom.min_block_width,
            block_padding: self.zoom.block_padding,
            min_target_width: self.zoom.min_target_width,
        }
    }

    /// Build a [`LinkConfig`] from this config.
    #[must_use]
    pub fn to_link_config(&self) -> LinkConfig {
        LinkConfig {
            confirm_delay: Duration::from_millis(self.link.confirm_delay_ms),
            touch_slop: self.link.touch_slop,
        }
    }

    /// Build the full [`WebViewportConfig`].
    #[must_use]
    pub fn to_web_viewport_config(&self) -> WebViewportConfig {
        WebViewportConfig {
            pannable: self.to_pannable_config(),
            gesture: self.to_gesture_config(),
            zoom: self.to_zoom_config(),
            link: self.to_link_config(),
            tile_cache: self.features.tile_cache,
        }
    }

    /// Build the home grid configuration. The grid pans with the same
    /// physics and gesture timing as web content.
    #[must_use]
    pub fn to_home_config(&self) -> HomeConfig {
        HomeConfig {
            layout: GridLayout {
                columns: self.home.columns,
                tile: SizeF::new(self.home.tile_width, self.home.tile_height),
                spacing: self.home.spacing,
            },
            pannable: self.to_pannable_config(),
            gesture: self.to_gesture_config(),
        }
    }

    /// Initial window chrome.
    #[must_use]
    pub fn to_chrome(&self) -> Chrome {
        Chrome {
            toolbar: self.features.toolbar,
            fullscreen: self.features.fullscreen,
            toolbar_height: self.window.toolbar_height,
        }
    }

    /// Window size.
    #[must_use]
    pub fn window_size(&self) -> SizeF {
        SizeF::new(self.window.width, self.window.height)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Tap disambiguation timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GesturePolicy {
    /// Wait for a second tap. Default: 300.
    pub press_delay_ms: u64,
    /// Shorter taps are noise. Default: 100.
    pub min_hold_ms: u64,
    /// Double-click anti-flicker window. Default: 300.
    pub double_click_guard_ms: u64,
}

impl Default for GesturePolicy {
    fn default() -> Self {
        Self {
            press_delay_ms: 300,
            min_hold_ms: 100,
            double_click_guard_ms: 300,
        }
    }
}

/// Kinetic panning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollPolicy {
    /// Default: 10.
    pub drag_start_distance: f64,
    /// Default: 0.4.
    pub axis_lock_threshold: f64,
    /// Default: 0.5.
    pub overshoot_resistance: f64,
    /// Default: 80.
    pub max_overshoot: f64,
    /// Default: 120.
    pub min_fling_velocity: f64,
    /// Default: 6000.
    pub max_velocity: f64,
    /// Default: 4.0.
    pub deceleration: f64,
    /// Default: 500.
    pub scrollbar_fade_delay_ms: u64,
    /// Default: 700.
    pub update_resume_delay_ms: u64,
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        let scroller = ScrollerConfig::default();
        Self {
            drag_start_distance: scroller.drag_start_distance,
            axis_lock_threshold: scroller.axis_lock_threshold,
            overshoot_resistance: scroller.overshoot_resistance,
            max_overshoot: scroller.max_overshoot,
            min_fling_velocity: scroller.min_fling_velocity,
            max_velocity: scroller.max_velocity,
            deceleration: scroller.deceleration,
            scrollbar_fade_delay_ms: 500,
            update_resume_delay_ms: 700,
        }
    }
}

/// Zoom limits and double-tap heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomPolicy {
    /// Default: 0.01.
    pub min: f64,
    /// Default: 10.
    pub max: f64,
    /// Default: 0.2.
    pub step: f64,
    /// Default: 300.
    pub animation_ms: u64,
    /// Default: 500.
    pub commit_delay_ms: u64,
    /// Default: 100.
    pub min_block_width: f64,
    /// Default: 10.
    pub block_padding: f64,
    /// Default: 300.
    pub min_target_width: f64,
}

impl Default for ZoomPolicy {
    fn default() -> Self {
        Self {
            min: 0.01,
            max: 10.0,
            step: 0.2,
            animation_ms: 300,
            commit_delay_ms: 500,
            min_block_width: 100.0,
            block_padding: 10.0,
            min_target_width: 300.0,
        }
    }
}

/// Link confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkPolicy {
    /// Default: 500.
    pub confirm_delay_ms: u64,
    /// Default: 8.
    pub touch_slop: f64,
}

impl Default for LinkPolicy {
    fn default() -> Self {
        Self {
            confirm_delay_ms: 500,
            touch_slop: 8.0,
        }
    }
}

/// Top-level window geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowPolicy {
    /// Default: 800.
    pub width: f64,
    /// Default: 480.
    pub height: f64,
    /// Height taken by the toolbar when shown. Default: 56.
    pub toolbar_height: f64,
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 480.0,
            toolbar_height: 56.0,
        }
    }
}

/// Window-selection grid layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomePolicy {
    /// Default: 3.
    pub columns: usize,
    /// Default: 240.
    pub tile_width: f64,
    /// Default: 160.
    pub tile_height: f64,
    /// Default: 16.
    pub spacing: f64,
}

impl Default for HomePolicy {
    fn default() -> Self {
        Self {
            columns: 3,
            tile_width: 240.0,
            tile_height: 160.0,
            spacing: 16.0,
        }
    }
}

/// Persistence locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorePolicy {
    /// History file; `None` keeps history in memory only.
    pub history_path: Option<String>,
    /// Bookmarks file; `None` keeps bookmarks in memory only.
    pub bookmarks_path: Option<String>,
    /// Default: 100.
    pub history_capacity: usize,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            history_path: None,
            bookmarks_path: None,
            history_capacity: 100,
        }
    }
}

/// Shell feature toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Hide window chrome. Default: false.
    pub fullscreen: bool,
    /// Show the toolbar. Default: true.
    pub toolbar: bool,
    /// Ask the host for GL compositing. Default: false.
    pub gl: bool,
    /// Let the engine cache tiles. Default: true.
    pub tile_cache: bool,
    /// Draw the frame-rate overlay. Default: false.
    pub show_fps: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            fullscreen: false,
            toolbar: true,
            gl: false,
            tile_cache: true,
            show_fps: false,
        }
    }
}

/// Feature switches given on the command line. Each one only ever moves a
/// flag away from its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagOverrides {
    pub fullscreen: bool,
    pub no_toolbar: bool,
    pub gl: bool,
    pub no_tile_cache: bool,
    pub show_fps: bool,
}
