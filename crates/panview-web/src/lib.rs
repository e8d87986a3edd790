#![forbid(unsafe_code)]

//! Web content viewport for panview.
//!
//! # Role in panview
//! `panview-web` puts a content engine behind the pan filter and the gesture
//! recognizer. It decides what a tap means for a web page (dispatch, link
//! confirmation, or block zoom) and keeps the engine's tile cache quiet
//! while things move.
//!
//! # Primary responsibilities
//! - **ContentEngine**: the boundary trait the embedded engine implements.
//! - **WebViewport**: filter chain, zoom animation, link confirmation and
//!   engine-signal handling.
//! - **TileCoordinator**: per-reason tile-creation pauses.
//! - **StaticPage**: an element-list engine used for replay and tests.

pub mod engine;
pub mod link;
pub mod static_page;
pub mod tiles;
pub mod viewport;
pub mod zoom;

pub use engine::{
    ContentEngine, ElementGeometry, ElementId, EngineSignal, FrameId, HitTestResult,
};
pub use link::{LinkConfig, LinkConfirmation, LinkOutcome};
pub use static_page::{Navigation, PageDescription, PageElement, StaticPage};
pub use tiles::{TileCoordinator, TilePause, TileStats};
pub use viewport::{ViewportNotice, WebContent, WebViewport, WebViewportConfig};
pub use zoom::{ZoomAnimator, ZoomConfig, ZoomFrame, ZoomState};
