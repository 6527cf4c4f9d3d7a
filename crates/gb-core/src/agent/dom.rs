//! Page DOM seam used by the overlay agent

use std::fmt;

use glam::Vec2;

use crate::error::DomError;

/// Viewport-relative box of an element, as `getBoundingClientRect` reports it
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Top-left corner
    pub origin: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rect {
    /// Create a rect from its left, top, width and height
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(left, top),
            size: Vec2::new(width, height),
        }
    }
}

/// Position and shape written to the overlay element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlayGeometry {
    /// Left edge in document coordinates (px)
    pub left: f32,
    /// Top edge in document coordinates (px)
    pub top: f32,
    /// Width (px)
    pub width: f32,
    /// Height (px)
    pub height: f32,
    /// Computed `border-radius` of the tracked element
    pub border_radius: String,
}

impl OverlayGeometry {
    /// Geometry covering an element measured at the given scroll offset
    pub fn covering(rect: Rect, scroll: Vec2, border_radius: impl Into<String>) -> Self {
        let origin = rect.origin + scroll;
        Self {
            left: origin.x,
            top: origin.y,
            width: rect.size.x,
            height: rect.size.y,
            border_radius: border_radius.into(),
        }
    }

    /// Inline style declarations, `(property, value)`
    pub fn declarations(&self) -> [(&'static str, String); 5] {
        [
            ("left", format!("{}px", self.left)),
            ("top", format!("{}px", self.top)),
            ("width", format!("{}px", self.width)),
            ("height", format!("{}px", self.height)),
            ("border-radius", self.border_radius.clone()),
        ]
    }
}

/// Operations the agent needs from the page it runs in
///
/// All reads are fresh: implementations must not cache layout.
pub trait PageDom {
    /// Handle to an element in the page
    type Element: Clone + PartialEq + fmt::Debug;

    /// The attached overlay element, if any
    fn find_overlay(&self) -> Option<Self::Element>;

    /// Create a new overlay element and append it to the body
    fn create_overlay(&self) -> Result<Self::Element, DomError>;

    /// Detach an element from the document
    fn remove_element(&self, element: &Self::Element);

    /// Whether the element is the document body or the root `html` element
    fn is_document_root(&self, element: &Self::Element) -> bool;

    /// Current viewport-relative box of the element
    fn bounding_rect(&self, element: &Self::Element) -> Result<Rect, DomError>;

    /// Current window scroll offsets
    fn scroll_offset(&self) -> Vec2;

    /// Computed `border-radius` of the element
    fn border_radius(&self, element: &Self::Element) -> Result<String, DomError>;

    /// Write geometry to the overlay's inline style
    fn apply_geometry(
        &self,
        overlay: &Self::Element,
        geometry: &OverlayGeometry,
    ) -> Result<(), DomError>;

    /// Toggle the overlay's visible class
    fn set_visible(&self, overlay: &Self::Element, visible: bool) -> Result<(), DomError>;

    /// Short description for logs
    fn describe(&self, element: &Self::Element) -> String {
        format!("{element:?}")
    }
}
