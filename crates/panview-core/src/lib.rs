#![forbid(unsafe_code)]

//! Core: pointer events, replay primitives, timers, animation, gestures.
//!
//! # Role in panview
//! `panview-core` is the leaf layer of the interaction stack. It knows
//! nothing about scrolling or web content; it defines the event values that
//! flow through every filter and the tap/double-tap disambiguation that sits
//! in front of every surface.
//!
//! # Primary responsibilities
//! - **PointerEvent**: canonical pointer input with local and scene positions
//!   and a replay tag.
//! - **Replay**: value-level copy/remap of events between coordinate spaces.
//! - **OneShotTimer**: cooperative, generation-guarded deadlines.
//! - **Animation**: springs and tweens driven by explicit time deltas.
//! - **GestureRecognizer**: the press-delay state machine and the
//!   [`GestureConsumer`](gesture::GestureConsumer) contract.
//!
//! # How it fits in the system
//! `panview-scroll` builds the kinetic pan filter on top of these types, and
//! `panview-web` composes both into the web viewport.

pub mod animation;
pub mod event;
pub mod geometry;
pub mod gesture;
pub mod replay;
pub mod timer;

pub use event::{EventOrigin, Modifiers, PointerButton, PointerEvent, PointerKind};
pub use geometry::{PointF, RectF, SizeF};
pub use gesture::{GestureConfig, GestureConsumer, GestureRecognizer};
pub use replay::CoordinateMap;
pub use timer::{OneShotTimer, TimerToken};

/// Re-exported so downstream crates share one clock type.
pub use web_time::{Duration, Instant};
