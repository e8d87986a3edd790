#![forbid(unsafe_code)]

//! Zoom animation and the double-tap block-zoom heuristic.
//!
//! [`ZoomAnimator`] interpolates scale and pan together from one resting
//! state to another. It never talks to the engine itself; the viewport
//! applies each [`ZoomFrame`] to the content and commits the final frame to
//! the engine in one step.
//!
//! # State Machine
//!
//! ```text
//!  Idle ──start──▶ Animating ──last frame──▶ Idle (commit timer armed)
//!                                                  │
//!                          commit delay elapsed ◀──┘  tiles re-enabled
//! ```
//!
//! # Invariants
//!
//! 1. Every scale produced is within `[min_zoom, max_zoom]`.
//! 2. Exactly one frame per animation has `finished == true`, and it carries
//!    the exact target scale and pan.
//! 3. Starting a new animation cancels a pending commit timer.

use panview_core::animation::{Animation, Tween, ease_in_out};
use panview_core::{Duration, Instant, OneShotTimer, PointF, RectF, SizeF};

use crate::engine::{ContentEngine, ElementId};

/// Zoom limits and heuristics.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomConfig {
    /// Smallest scale (default: 0.01).
    pub min_zoom: f64,
    /// Largest scale (default: 10).
    pub max_zoom: f64,
    /// Wheel/keyboard increment (default: 0.2).
    pub step: f64,
    /// Animation length (default: 300ms).
    pub animation_duration: Duration,
    /// Delay between commit and tile re-enable (default: 500ms).
    pub commit_delay: Duration,
    /// Blocks narrower than this (document px) are skipped when walking up
    /// from a double tap (default: 100).
    pub min_block_width: f64,
    /// Horizontal padding added around the chosen block (default: 10).
    pub block_padding: f64,
    /// Floor for the padded block width, limiting how far a double tap can
    /// zoom in (default: 300).
    pub min_target_width: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.01,
            max_zoom: 10.0,
            step: 0.2,
            animation_duration: Duration::from_millis(300),
            commit_delay: Duration::from_millis(500),
            min_block_width: 100.0,
            block_padding: 10.0,
            min_target_width: 300.0,
        }
    }
}

impl ZoomConfig {
    /// Clamp `scale` into `[min_zoom, max_zoom]`. `None` for NaN.
    #[must_use]
    pub fn clamp(&self, scale: f64) -> Option<f64> {
        (!scale.is_nan()).then(|| scale.clamp(self.min_zoom, self.max_zoom))
    }
}

/// One interpolated step of a zoom animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomFrame {
    pub scale: f64,
    pub pan: PointF,
    /// Last frame: commit it.
    pub finished: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoomState {
    Idle,
    Animating,
}

#[derive(Debug, Clone)]
struct ZoomAnimation {
    from_scale: f64,
    to_scale: f64,
    from_pan: PointF,
    to_pan: PointF,
    tween: Tween,
    last: Instant,
}

#[derive(Debug, Clone)]
pub struct ZoomAnimator {
    config: ZoomConfig,
    animation: Option<ZoomAnimation>,
    commit: OneShotTimer,
}

impl ZoomAnimator {
    #[must_use]
    pub fn new(config: ZoomConfig) -> Self {
        Self {
            config,
            animation: None,
            commit: OneShotTimer::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> ZoomState {
        if self.animation.is_some() {
            ZoomState::Animating
        } else {
            ZoomState::Idle
        }
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Scale the running animation is heading to.
    #[must_use]
    pub fn target_scale(&self) -> Option<f64> {
        self.animation.as_ref().map(|a| a.to_scale)
    }

    #[must_use]
    pub fn is_commit_pending(&self) -> bool {
        self.commit.is_armed()
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.commit.deadline()
    }

    /// Begin animating from the current resting state to the target.
    pub fn start(&mut self, now: Instant, from: (f64, PointF), to: (f64, PointF)) {
        let clamp = |s: f64| self.config.clamp(s).unwrap_or(self.config.min_zoom);
        self.commit.cancel();
        self.animation = Some(ZoomAnimation {
            from_scale: clamp(from.0),
            to_scale: clamp(to.0),
            from_pan: from.1,
            to_pan: to.1,
            tween: Tween::new(self.config.animation_duration).easing(ease_in_out),
            last: now,
        });
    }

    /// Advance the animation. `None` when idle.
    pub fn tick(&mut self, now: Instant) -> Option<ZoomFrame> {
        let anim = self.animation.as_mut()?;
        anim.tween.tick(now.saturating_duration_since(anim.last));
        anim.last = now;
        let finished = anim.tween.is_complete();
        let frame = if finished {
            ZoomFrame {
                scale: anim.to_scale,
                pan: anim.to_pan,
                finished: true,
            }
        } else {
            let t = anim.tween.progress();
            ZoomFrame {
                scale: anim.tween.interpolate(anim.from_scale, anim.to_scale),
                pan: anim.from_pan.lerp(anim.to_pan, t),
                finished: false,
            }
        };
        if finished {
            self.animation = None;
            self.commit.arm(now, self.config.commit_delay);
        }
        Some(frame)
    }

    /// Jump straight to the final frame.
    pub fn finish(&mut self, now: Instant) -> Option<ZoomFrame> {
        if let Some(anim) = self.animation.as_mut() {
            anim.tween.finish();
            anim.last = now;
        }
        self.tick(now)
    }

    /// Returns `true` once when the post-commit settle period ends.
    pub fn poll_commit(&mut self, now: Instant) -> bool {
        self.commit.fire(now).is_some()
    }

    /// Drop any animation and pending commit without producing frames.
    pub fn cancel(&mut self) {
        self.animation = None;
        self.commit.cancel();
    }
}

// ---------------------------------------------------------------------------
// Heuristics
// ---------------------------------------------------------------------------

/// Scale at which the document width fills the viewport.
#[must_use]
pub fn fit_width_scale(contents: SizeF, viewport: SizeF, config: &ZoomConfig) -> f64 {
    if contents.width <= 0.0 || viewport.width <= 0.0 {
        return 1.0_f64.clamp(config.min_zoom, config.max_zoom);
    }
    (viewport.width / contents.width).clamp(config.min_zoom, config.max_zoom)
}

/// Bound a pan position for a document of `contents` drawn at `scale`.
#[must_use]
pub fn clip_pan(pan: PointF, contents: SizeF, scale: f64, viewport: SizeF) -> PointF {
    let scaled = contents.scaled(scale);
    let min_x = -(scaled.width - viewport.width).max(0.0);
    let min_y = -(scaled.height - viewport.height).max(0.0);
    PointF::new(pan.x.clamp(min_x, 0.0), pan.y.clamp(min_y, 0.0))
}

/// Pan that keeps viewport point `anchor` over the same document point when
/// going from `old_scale` to `new_scale`.
#[must_use]
pub fn anchored_pan(pan: PointF, anchor: PointF, old_scale: f64, new_scale: f64) -> PointF {
    let ratio = new_scale / old_scale;
    anchor - (anchor - pan).scaled(ratio)
}

/// Where a double tap on a block should zoom to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockZoom {
    pub element: ElementId,
    pub block: RectF,
    pub scale: f64,
}

/// Find the block under `doc_point` and the scale that fits it to the
/// viewport width.
///
/// Walks from the hit element up the tree to the first block at least
/// `min_block_width` wide. Elements that vanished mid-walk end the search.
pub fn block_zoom_target<E>(
    engine: &E,
    doc_point: PointF,
    viewport: SizeF,
    config: &ZoomConfig,
) -> Option<BlockZoom>
where
    E: ContentEngine + ?Sized,
{
    let mut id = engine.hit_test(doc_point).element?;
    // Bounded walk: a malformed tree with a parent cycle must not hang.
    for _ in 0..256 {
        let geometry = engine.element_geometry(id)?;
        if geometry.is_block && geometry.rect.width >= config.min_block_width {
            let width = (geometry.rect.width + 2.0 * config.block_padding)
                .max(config.min_target_width);
            let scale = (viewport.width / width).clamp(config.min_zoom, config.max_zoom);
            return Some(BlockZoom {
                element: id,
                block: geometry.rect,
                scale,
            });
        }
        id = geometry.parent?;
    }
    None
}

/// Pan for a block zoom: the tap keeps its screen y, the block is centred
/// horizontally.
#[must_use]
pub fn block_zoom_pan(
    doc_point: PointF,
    block: RectF,
    current: (f64, PointF),
    new_scale: f64,
    viewport: SizeF,
) -> PointF {
    let (scale, pan) = current;
    let screen_y = doc_point.y * scale + pan.y;
    PointF::new(
        viewport.width / 2.0 - block.center().x * new_scale,
        screen_y - doc_point.y * new_scale,
    )
}
