#![forbid(unsafe_code)]

//! A [`ContentEngine`] over a fixed element list.
//!
//! `StaticPage` stands in for a real engine: the trace replayer loads one
//! from JSON, and the tests build them inline. Elements are listed in paint
//! order, so a later element that contains a point wins the hit test.

use panview_core::{PointF, PointerEvent, PointerKind, RectF, SizeF};

use crate::engine::{ContentEngine, ElementGeometry, ElementId, EngineSignal, FrameId, HitTestResult};

/// One element of a static page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageElement {
    pub id: ElementId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub parent: Option<ElementId>,
    pub rect: RectF,
    #[cfg_attr(feature = "serde", serde(default))]
    pub block: bool,
    /// Destination when this element is a link.
    #[cfg_attr(feature = "serde", serde(default))]
    pub link: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub frame: Option<FrameId>,
}

impl PageElement {
    #[must_use]
    pub fn block(id: u32, rect: RectF) -> Self {
        Self {
            id: ElementId(id),
            parent: None,
            rect,
            block: true,
            link: None,
            frame: None,
        }
    }

    #[must_use]
    pub fn inline(id: u32, rect: RectF) -> Self {
        Self {
            block: false,
            ..Self::block(id, rect)
        }
    }

    #[must_use]
    pub fn with_parent(mut self, parent: u32) -> Self {
        self.parent = Some(ElementId(parent));
        self
    }

    #[must_use]
    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        self.link = Some(url.into());
        self
    }
}

/// Serializable page layout.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageDescription {
    pub size: SizeF,
    #[cfg_attr(feature = "serde", serde(default))]
    pub elements: Vec<PageElement>,
}

/// A navigation the page performed after a link click reached it.
#[derive(Debug, Clone, PartialEq)]
pub struct Navigation {
    pub url: String,
    pub frame: Option<FrameId>,
}

#[derive(Debug, Clone)]
pub struct StaticPage {
    description: PageDescription,
    zoom: f64,
    tiles_enabled: bool,
    scroll_offset: PointF,
    dispatched: Vec<PointerEvent>,
    navigations: Vec<Navigation>,
}

impl StaticPage {
    #[must_use]
    pub fn new(description: PageDescription) -> Self {
        Self {
            description,
            zoom: 1.0,
            tiles_enabled: true,
            scroll_offset: PointF::ZERO,
            dispatched: Vec::new(),
            navigations: Vec::new(),
        }
    }

    /// A page with no elements.
    #[must_use]
    pub fn blank(size: SizeF) -> Self {
        Self::new(PageDescription {
            size,
            elements: Vec::new(),
        })
    }

    #[must_use]
    pub fn description(&self) -> &PageDescription {
        &self.description
    }

    /// Every pointer event delivered so far, in order.
    #[must_use]
    pub fn dispatched(&self) -> &[PointerEvent] {
        &self.dispatched
    }

    #[must_use]
    pub fn navigations(&self) -> &[Navigation] {
        &self.navigations
    }

    #[must_use]
    pub fn tiles_enabled(&self) -> bool {
        self.tiles_enabled
    }

    #[must_use]
    pub fn scroll_offset(&self) -> PointF {
        self.scroll_offset
    }

    /// Apply a signal that changes the page itself.
    pub fn apply_signal(&mut self, signal: &EngineSignal) {
        if let EngineSignal::ContentsSizeChanged { size } = signal {
            self.description.size = *size;
        }
    }

    fn find(&self, id: ElementId) -> Option<&PageElement> {
        self.description.elements.iter().find(|e| e.id == id)
    }

    fn link_ancestor<'a>(&'a self, mut element: &'a PageElement) -> Option<&'a PageElement> {
        for _ in 0..=self.description.elements.len() {
            if element.link.is_some() {
                return Some(element);
            }
            element = self.find(element.parent?)?;
        }
        None
    }
}

impl ContentEngine for StaticPage {
    fn contents_size(&self) -> SizeF {
        self.description.size
    }

    fn hit_test(&self, point: PointF) -> HitTestResult {
        let Some(hit) = self
            .description
            .elements
            .iter()
            .rev()
            .find(|e| e.rect.contains(point))
        else {
            return HitTestResult::miss();
        };
        match self.link_ancestor(hit) {
            Some(link) => HitTestResult {
                is_link: true,
                bounding_rect: link.rect,
                target_frame: link.frame,
                element: Some(hit.id),
                url: link.link.clone(),
            },
            None => HitTestResult {
                is_link: false,
                bounding_rect: hit.rect,
                target_frame: None,
                element: Some(hit.id),
                url: None,
            },
        }
    }

    fn element_geometry(&self, id: ElementId) -> Option<ElementGeometry> {
        self.find(id).map(|e| ElementGeometry {
            rect: e.rect,
            is_block: e.block,
            parent: e.parent,
        })
    }

    fn set_zoom_factor(&mut self, factor: f64) {
        self.zoom = factor;
    }

    fn zoom_factor(&self) -> f64 {
        self.zoom
    }

    fn set_tile_creation_enabled(&mut self, enabled: bool) {
        self.tiles_enabled = enabled;
    }

    fn set_scroll_offset(&mut self, offset: PointF) {
        self.scroll_offset = offset;
    }

    fn dispatch_pointer(&mut self, event: &PointerEvent) {
        if event.kind == PointerKind::Release {
            let hit = self.hit_test(event.pos);
            if let (true, Some(url)) = (hit.is_link, hit.url) {
                tracing::info!(target: "panview.engine", url = %url, "navigate");
                self.navigations.push(Navigation {
                    url,
                    frame: hit.target_frame,
                });
            }
        }
        self.dispatched.push(event.clone());
    }
}

/// Shorthand used by tests and demos: `RectF` from four numbers.
#[must_use]
pub fn rect(x: f64, y: f64, w: f64, h: f64) -> RectF {
    RectF::new(x, y, w, h)
}
