#![forbid(unsafe_code)]

//! Kinetic panning for panview viewports.
//!
//! # Role in panview
//! `panview-scroll` owns the physics of moving content under a finger: the
//! pan-claim decision, axis locking, rubber-band overshoot, fling and
//! bounce-back, plus the overlay scrollbars and the update debounce that
//! keeps expensive repaints out of the way while content is moving.
//!
//! # Primary responsibilities
//! - **KineticScroller**: drag/fling/bounce state machine over a
//!   [`ScrollTarget`](kinetic::ScrollTarget).
//! - **PannableViewport**: the pan filter installed in front of one
//!   [`PannedContent`](pannable::PannedContent).
//! - **FadeScrollbar**: opacity and thumb geometry for each axis.

pub mod kinetic;
pub mod pannable;
pub mod scrollbar;

pub use kinetic::{KineticScroller, PanFilter, ScrollTarget, ScrollerConfig, ScrollerState};
pub use pannable::{PannableConfig, PannableViewport, PannedContent, UpdateGate, UpdateGateConfig};
pub use scrollbar::{FadeScrollbar, Orientation, ScrollbarConfig, ThumbGeometry};
