#![forbid(unsafe_code)]

//! The content-engine boundary.
//!
//! The web engine is a black box behind [`ContentEngine`]: panview asks it
//! for document geometry and hit tests, tells it the zoom factor and whether
//! it may create tiles, and hands it the pointer events it decided to
//! deliver. Everything the engine reports back arrives as an
//! [`EngineSignal`], already marshalled onto the UI thread.
//!
//! All points and rectangles crossing this boundary are in document
//! coordinates (unscaled CSS pixels).

use panview_core::{PointF, PointerEvent, RectF, SizeF};

/// Identifies an element in the engine's element tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementId(pub u32);

/// Identifies a (sub)frame that a link targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameId(pub u32);

/// Answer to a hit-test query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HitTestResult {
    /// The point is inside a link (or an element nested in one).
    pub is_link: bool,
    /// Bounds of the link when `is_link`, otherwise of the hit element.
    pub bounding_rect: RectF,
    /// Frame a link navigates, if not the main frame.
    pub target_frame: Option<FrameId>,
    /// Innermost element under the point.
    pub element: Option<ElementId>,
    /// Link destination, when known.
    pub url: Option<String>,
}

impl HitTestResult {
    /// Nothing under the point.
    #[must_use]
    pub fn miss() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_miss(&self) -> bool {
        self.element.is_none()
    }
}

/// Layout facts about one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementGeometry {
    pub rect: RectF,
    /// Block-level box (paragraph, div, ...) rather than inline content.
    pub is_block: bool,
    pub parent: Option<ElementId>,
}

/// The embedded rendering engine, as seen from the viewport.
pub trait ContentEngine {
    /// Document size at zoom factor 1.
    fn contents_size(&self) -> SizeF;

    /// What lies under `point`. A miss is a normal answer.
    fn hit_test(&self, point: PointF) -> HitTestResult;

    /// Geometry of `id`, or `None` if the element no longer exists.
    fn element_geometry(&self, id: ElementId) -> Option<ElementGeometry>;

    /// Commit a new zoom factor (re-layout and re-tile at that scale).
    fn set_zoom_factor(&mut self, factor: f64);

    fn zoom_factor(&self) -> f64;

    fn set_tile_creation_enabled(&mut self, enabled: bool);

    /// Top-left of the visible document rectangle changed.
    fn set_scroll_offset(&mut self, _offset: PointF) {}

    /// Deliver a pointer event into the document.
    fn dispatch_pointer(&mut self, event: &PointerEvent);
}

/// Notifications from the engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "signal", rename_all = "snake_case"))]
pub enum EngineSignal {
    LoadStarted,
    LoadProgress { percent: u8 },
    LoadFinished { success: bool },
    TileCreated { x: i32, y: i32 },
    TileRemoved { x: i32, y: i32 },
    TilePainted { x: i32, y: i32 },
    /// The document asked for a different scale (e.g. a viewport meta tag).
    ViewportScaleChanged { scale: f64 },
    ContentsSizeChanged { size: SizeF },
}
