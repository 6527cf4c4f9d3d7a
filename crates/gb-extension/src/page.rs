//! [`PageDom`] over the live document

use gb_core::constants::{OVERLAY_CLASS, VISIBLE_CLASS};
use gb_core::{DomError, OverlayGeometry, PageDom, Rect};
use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Window};

fn dom_error(err: JsValue) -> DomError {
    DomError::Operation(crate::chrome::error_message(&err))
}

/// The document the script is running in
#[derive(Debug, Clone)]
pub struct WebPage {
    window: Window,
    document: Document,
}

impl WebPage {
    /// The current window's document
    pub fn current() -> Result<Self, DomError> {
        let window = web_sys::window().ok_or_else(|| DomError::Operation("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| DomError::Operation("no document".into()))?;
        Ok(Self { window, document })
    }

    /// The window, for registering listeners
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// The document, for registering listeners
    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl PageDom for WebPage {
    type Element = Element;

    fn find_overlay(&self) -> Option<Element> {
        self.document
            .query_selector(&format!(".{OVERLAY_CLASS}"))
            .ok()
            .flatten()
    }

    fn create_overlay(&self) -> Result<Element, DomError> {
        let body = self
            .document
            .body()
            .ok_or_else(|| DomError::Operation("document has no body".into()))?;
        let overlay = self.document.create_element("div").map_err(dom_error)?;
        overlay.set_class_name(OVERLAY_CLASS);
        body.append_child(&overlay).map_err(dom_error)?;
        Ok(overlay)
    }

    fn remove_element(&self, element: &Element) {
        element.remove();
    }

    fn is_document_root(&self, element: &Element) -> bool {
        let is_body = self
            .document
            .body()
            .is_some_and(|body| AsRef::<Element>::as_ref(&body) == element);
        let is_root = self
            .document
            .document_element()
            .is_some_and(|root| &root == element);
        is_body || is_root
    }

    fn bounding_rect(&self, element: &Element) -> Result<Rect, DomError> {
        if !element.is_connected() {
            return Err(DomError::Detached);
        }
        let rect = element.get_bounding_client_rect();
        Ok(Rect::new(
            rect.left() as f32,
            rect.top() as f32,
            rect.width() as f32,
            rect.height() as f32,
        ))
    }

    fn scroll_offset(&self) -> Vec2 {
        Vec2::new(
            self.window.scroll_x().unwrap_or(0.0) as f32,
            self.window.scroll_y().unwrap_or(0.0) as f32,
        )
    }

    fn border_radius(&self, element: &Element) -> Result<String, DomError> {
        let style = self
            .window
            .get_computed_style(element)
            .map_err(dom_error)?
            .ok_or_else(|| DomError::Operation("no computed style".into()))?;
        style.get_property_value("border-radius").map_err(dom_error)
    }

    fn apply_geometry(&self, overlay: &Element, geometry: &OverlayGeometry) -> Result<(), DomError> {
        let overlay = overlay
            .dyn_ref::<HtmlElement>()
            .ok_or_else(|| DomError::Operation("overlay is not an HTML element".into()))?;
        let style = overlay.style();
        for (property, value) in geometry.declarations() {
            style.set_property(property, &value).map_err(dom_error)?;
        }
        Ok(())
    }

    fn set_visible(&self, overlay: &Element, visible: bool) -> Result<(), DomError> {
        overlay
            .class_list()
            .toggle_with_force(VISIBLE_CLASS, visible)
            .map_err(dom_error)?;
        Ok(())
    }

    fn describe(&self, element: &Element) -> String {
        let mut text = element.tag_name().to_lowercase();
        let id = element.id();
        if !id.is_empty() {
            text.push('#');
            text.push_str(&id);
        }
        let class = element.class_name();
        if !class.is_empty() {
            text.push('.');
            text.push_str(&class.split_whitespace().collect::<Vec<_>>().join("."));
        }
        text
    }
}
