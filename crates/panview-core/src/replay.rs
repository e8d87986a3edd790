#![forbid(unsafe_code)]

//! Event replay primitives.
//!
//! Pure value-level helpers for copying a [`PointerEvent`] into another
//! coordinate space, re-typing it, or tagging it as a replay. Nothing in here
//! holds state; the gesture recognizer and the viewports are the only
//! callers that decide *when* to replay.
//!
//! # Invariants
//!
//! 1. Remapping only ever rewrites `pos`. `scene_pos` is the anchor every
//!    local position is derived from.
//! 2. A replay copy is never `accepted` and always carries
//!    [`EventOrigin::Replay`], so the filter chain can recognise it.

use crate::event::{EventOrigin, PointerEvent, PointerKind};
use crate::geometry::PointF;

/// Affine scene-to-local mapping (translate, then uniform scale).
///
/// `local = (scene - offset) / scale`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMap {
    /// Scene position of the local origin.
    pub offset: PointF,
    /// Local units per scene unit are `1 / scale`.
    pub scale: f64,
}

impl Default for CoordinateMap {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl CoordinateMap {
    pub const IDENTITY: Self = Self {
        offset: PointF::ZERO,
        scale: 1.0,
    };

    /// A pure translation.
    #[must_use]
    pub const fn translation(offset: PointF) -> Self {
        Self { offset, scale: 1.0 }
    }

    /// Translation followed by scale. A non-positive or non-finite scale
    /// falls back to 1.
    #[must_use]
    pub fn new(offset: PointF, scale: f64) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        Self { offset, scale }
    }

    /// Map a scene point into local space.
    #[inline]
    #[must_use]
    pub fn to_local(&self, scene: PointF) -> PointF {
        (scene - self.offset).scaled(1.0 / self.scale)
    }

    /// Map a local point back into scene space.
    #[inline]
    #[must_use]
    pub fn to_scene(&self, local: PointF) -> PointF {
        local.scaled(self.scale) + self.offset
    }
}

impl PointerEvent {
    /// Copy of the event with `pos` expressed in `map`'s local space.
    #[must_use]
    pub fn remapped(&self, map: &CoordinateMap) -> Self {
        let mut ev = self.clone();
        ev.pos = map.to_local(self.scene_pos);
        ev
    }

    /// Copy of the event tagged as a replay, ready to be buffered and
    /// re-sent later.
    #[must_use]
    pub fn as_replay(&self) -> Self {
        let mut ev = self.clone();
        ev.origin = EventOrigin::Replay;
        ev.accepted = false;
        ev
    }

    /// Copy of the event with a different kind. Used to synthesise a double
    /// click from a buffered press, or to degrade one to a press.
    #[must_use]
    pub fn retyped(&self, kind: PointerKind) -> Self {
        let mut ev = self.clone();
        ev.kind = kind;
        ev.accepted = false;
        ev
    }

    /// Copy of the event moved to `local` in `map`'s space, with the scene
    /// position kept consistent.
    #[must_use]
    pub fn relocated(&self, local: PointF, map: &CoordinateMap) -> Self {
        let mut ev = self.clone();
        ev.pos = local;
        ev.scene_pos = map.to_scene(local);
        ev
    }
}
