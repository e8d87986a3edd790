#![forbid(unsafe_code)]

//! Overlay scrollbars that fade in while panning and out afterwards.
//!
//! A [`FadeScrollbar`] is pure state: opacity plus thumb geometry along one
//! axis. The pannable viewport shows both bars whenever the scroller leaves
//! Inactive and schedules the fade-out when it returns.
//!
//! # Invariants
//!
//! 1. `opacity()` is in [0.0, 1.0].
//! 2. The thumb always lies within the track.
//! 3. `show()` cancels any pending or running fade.

use panview_core::animation::{Animation, Tween, ease_out};
use panview_core::{Duration, Instant, OneShotTimer};

/// Which axis a scrollbar tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Scrollbar timing and sizing.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollbarConfig {
    /// Delay after panning stops before the fade starts (default: 500ms).
    pub fade_delay: Duration,
    /// Fade-out duration (default: 250ms).
    pub fade_duration: Duration,
    /// Smallest thumb length in px (default: 20).
    pub min_thumb_length: f64,
}

impl Default for ScrollbarConfig {
    fn default() -> Self {
        Self {
            fade_delay: Duration::from_millis(500),
            fade_duration: Duration::from_millis(250),
            min_thumb_length: 20.0,
        }
    }
}

/// Thumb placement along the track.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ThumbGeometry {
    pub track_length: f64,
    pub thumb_offset: f64,
    pub thumb_length: f64,
    /// False when the content fits and there is nothing to scroll.
    pub scrollable: bool,
}

#[derive(Debug, Clone)]
enum FadePhase {
    Hidden,
    Shown,
    Waiting,
    Fading { tween: Tween, last: Instant },
}

#[derive(Debug, Clone)]
pub struct FadeScrollbar {
    orientation: Orientation,
    config: ScrollbarConfig,
    geometry: ThumbGeometry,
    phase: FadePhase,
    delay: OneShotTimer,
}

impl FadeScrollbar {
    #[must_use]
    pub fn new(orientation: Orientation, config: ScrollbarConfig) -> Self {
        Self {
            orientation,
            config,
            geometry: ThumbGeometry::default(),
            phase: FadePhase::Hidden,
            delay: OneShotTimer::new(),
        }
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[must_use]
    pub fn geometry(&self) -> ThumbGeometry {
        self.geometry
    }

    #[must_use]
    pub fn opacity(&self) -> f64 {
        match &self.phase {
            FadePhase::Hidden => 0.0,
            FadePhase::Shown | FadePhase::Waiting => 1.0,
            FadePhase::Fading { tween, .. } => 1.0 - tween.progress(),
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.opacity() > 0.0
    }

    /// Whether a fade is running and needs frame ticks.
    #[must_use]
    pub fn is_fading(&self) -> bool {
        matches!(self.phase, FadePhase::Fading { .. })
    }

    /// When the pending fade starts, if one is scheduled.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.delay.deadline()
    }

    /// Fully show the bar.
    pub fn show(&mut self) {
        self.delay.cancel();
        self.phase = FadePhase::Shown;
    }

    /// Start the fade-out countdown. No-op unless currently shown.
    pub fn schedule_fade_out(&mut self, now: Instant) {
        if matches!(self.phase, FadePhase::Shown) {
            self.delay.arm(now, self.config.fade_delay);
            self.phase = FadePhase::Waiting;
        }
    }

    /// Hide immediately.
    pub fn hide(&mut self) {
        self.delay.cancel();
        self.phase = FadePhase::Hidden;
    }

    /// Advance the fade. Returns `true` while the fade is running.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.delay.fire(now).is_some() {
            self.phase = FadePhase::Fading {
                tween: Tween::new(self.config.fade_duration).easing(ease_out),
                last: now,
            };
        }
        let FadePhase::Fading { tween, last } = &mut self.phase else {
            return false;
        };
        tween.tick(now.saturating_duration_since(*last));
        *last = now;
        if tween.is_complete() {
            self.phase = FadePhase::Hidden;
            return false;
        }
        true
    }

    /// Recompute the thumb for a viewport of `viewport_len` over content of
    /// `content_len`, scrolled to `scroll` with `overshoot` past a bound.
    pub fn update_geometry(
        &mut self,
        viewport_len: f64,
        content_len: f64,
        scroll: f64,
        overshoot: f64,
    ) {
        let track = viewport_len.max(0.0);
        let range = content_len - viewport_len;
        if range <= 0.0 || track == 0.0 {
            self.geometry = ThumbGeometry {
                track_length: track,
                thumb_offset: 0.0,
                thumb_length: track,
                scrollable: false,
            };
            return;
        }
        let min_thumb = self.config.min_thumb_length.min(track);
        let proportional = track * viewport_len / content_len;
        // Overshoot squeezes the thumb against the end it ran into.
        let thumb = (proportional - overshoot.abs()).clamp(min_thumb, track);
        let ratio = (scroll / range).clamp(0.0, 1.0);
        let offset = if overshoot > 0.0 {
            track - thumb
        } else if overshoot < 0.0 {
            0.0
        } else {
            ratio * (track - thumb)
        };
        self.geometry = ThumbGeometry {
            track_length: track,
            thumb_offset: offset,
            thumb_length: thumb,
            scrollable: true,
        };
    }
}
