#![forbid(unsafe_code)]

//! Canonical pointer event types.
//!
//! A [`PointerEvent`] is what every filter in panview sees: the pan filter,
//! the gesture recognizer, and finally the content engine. Touch input is
//! normalised into single-pointer mouse-like events before it reaches here.
//!
//! # Design Notes
//!
//! - `pos` is in the local space of whoever is handling the event;
//!   `scene_pos` is always in scene coordinates and never remapped.
//! - `origin` distinguishes device input from events the core re-sent itself
//!   (see [`crate::replay`]). Filters must pass replays through untouched.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;
use web_time::Instant;

use crate::geometry::PointF;

/// Pointer event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PointerKind {
    /// Button went down.
    Press,
    /// Pointer moved (with or without a button held).
    Move,
    /// Button went up.
    Release,
    /// Second press of a double click, as reported by the platform.
    DoubleClick,
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PointerButton {
    /// Left mouse button, or a touch contact.
    #[default]
    Primary,
    /// Right mouse button.
    Secondary,
    /// Middle mouse button.
    Middle,
}

bitflags! {
    /// Modifier keys held during a pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// Where an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventOrigin {
    /// Delivered by the platform.
    #[default]
    Device,
    /// Re-sent by panview after buffering or synthesis.
    Replay,
}

/// A single pointer event.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    /// What happened.
    pub kind: PointerKind,
    /// Position in the handler's local coordinate space.
    pub pos: PointF,
    /// Position in scene coordinates.
    pub scene_pos: PointF,
    /// Button that changed state (or is held, for moves).
    pub button: PointerButton,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
    /// Set by a handler that consumed the event.
    pub accepted: bool,
    /// When the platform delivered the event.
    pub timestamp: Instant,
    /// Device input or replay.
    pub origin: EventOrigin,
}

impl PointerEvent {
    /// Create a primary-button device event whose local and scene positions
    /// coincide.
    #[must_use]
    pub fn new(kind: PointerKind, pos: PointF, timestamp: Instant) -> Self {
        Self {
            kind,
            pos,
            scene_pos: pos,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
            accepted: false,
            timestamp,
            origin: EventOrigin::Device,
        }
    }

    /// Shorthand for a primary press.
    #[must_use]
    pub fn press(pos: PointF, timestamp: Instant) -> Self {
        Self::new(PointerKind::Press, pos, timestamp)
    }

    /// Shorthand for a primary move.
    #[must_use]
    pub fn moved(pos: PointF, timestamp: Instant) -> Self {
        Self::new(PointerKind::Move, pos, timestamp)
    }

    /// Shorthand for a primary release.
    #[must_use]
    pub fn release(pos: PointF, timestamp: Instant) -> Self {
        Self::new(PointerKind::Release, pos, timestamp)
    }

    /// Shorthand for a platform double click.
    #[must_use]
    pub fn double_click(pos: PointF, timestamp: Instant) -> Self {
        Self::new(PointerKind::DoubleClick, pos, timestamp)
    }

    /// Set the button.
    #[must_use]
    pub const fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    /// Set the modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the scene position, leaving the local position alone.
    #[must_use]
    pub const fn with_scene_pos(mut self, scene_pos: PointF) -> Self {
        self.scene_pos = scene_pos;
        self
    }

    /// True if the event was re-sent by panview rather than the platform.
    #[inline]
    #[must_use]
    pub fn is_replay(&self) -> bool {
        self.origin == EventOrigin::Replay
    }

    /// True if the primary button is involved.
    #[inline]
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.button == PointerButton::Primary
    }

    /// Mark the event consumed.
    pub fn accept(&mut self) {
        self.accepted = true;
    }
}
