//! In-page overlay agent
//!
//! The agent owns the single overlay element of a page and keeps it on top
//! of whatever element the pointer is over. Page events are fed in as
//! [`PageEvent`]s; hover tracking is an explicit [`HoverState`].
//!
//! ```text
//! Idle --install--> NotHovering --enter(element)--> Hovering
//!                        ^                             |
//!                        +---- leave / enter(body) ----+
//! ```
//!
//! Installing again from any state yields a fresh `NotHovering` agent and a
//! single overlay element.

mod dom;

pub use dom::{OverlayGeometry, PageDom, Rect};

use crate::error::DomError;

/// Lifecycle of the overlay in one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayPhase {
    /// No overlay installed
    Idle,
    /// Overlay installed and hidden
    NotHovering,
    /// Overlay shown around a hovered element
    Hovering,
}

/// Page events the agent reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent<E> {
    /// Pointer entered an element (bubbling `mouseover`)
    PointerEnter(E),
    /// Pointer left an element (`mouseout`)
    PointerLeave,
    /// Window scrolled
    Scroll,
    /// Window resized
    Resize,
}

impl<E> PageEvent<E> {
    /// Event name for logs
    pub fn name(&self) -> &'static str {
        match self {
            PageEvent::PointerEnter(_) => "mouseover",
            PageEvent::PointerLeave => "mouseout",
            PageEvent::Scroll => "scroll",
            PageEvent::Resize => "resize",
        }
    }
}

/// Transient hover tracking state
#[derive(Debug, Clone, PartialEq)]
pub struct HoverState<E> {
    current: Option<E>,
    hovering: bool,
}

impl<E> Default for HoverState<E> {
    fn default() -> Self {
        Self {
            current: None,
            hovering: false,
        }
    }
}

impl<E> HoverState<E> {
    /// Pointer entered `element`
    pub fn enter(&mut self, element: E) {
        self.hovering = true;
        self.current = Some(element);
    }

    /// Pointer left; the last element is kept but no longer tracked
    pub fn leave(&mut self) {
        self.hovering = false;
    }

    /// Whether the pointer is over some element
    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Last element entered, even after leaving
    pub fn current(&self) -> Option<&E> {
        self.current.as_ref()
    }

    /// Element to measure, only while hovering
    pub fn tracked(&self) -> Option<&E> {
        self.current.as_ref().filter(|_| self.hovering)
    }
}

/// The overlay agent running inside one page
#[derive(Debug)]
pub struct OverlayAgent<P: PageDom> {
    page: P,
    overlay: P::Element,
    hover: HoverState<P::Element>,
}

impl<P: PageDom> OverlayAgent<P> {
    /// Remove any existing overlay, then create a fresh one
    pub fn install(page: P) -> Result<Self, DomError> {
        if let Some(existing) = page.find_overlay() {
            tracing::debug!("Removing existing border box");
            page.remove_element(&existing);
        }

        let overlay = page.create_overlay()?;
        tracing::debug!("Created border box");

        Ok(Self {
            page,
            overlay,
            hover: HoverState::default(),
        })
    }

    /// The page this agent runs in
    pub fn page(&self) -> &P {
        &self.page
    }

    /// The overlay element owned by this agent
    pub fn overlay(&self) -> &P::Element {
        &self.overlay
    }

    /// Current hover state
    pub fn hover(&self) -> &HoverState<P::Element> {
        &self.hover
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> OverlayPhase {
        match self.hover.tracked() {
            Some(element) if !self.page.is_document_root(element) => OverlayPhase::Hovering,
            _ => OverlayPhase::NotHovering,
        }
    }

    /// Apply one page event
    pub fn handle(&mut self, event: PageEvent<P::Element>) {
        tracing::trace!(event = event.name(), "Page event");

        match event {
            PageEvent::PointerEnter(element) => {
                tracing::debug!(target_element = %self.page.describe(&element), "Mouseover");
                let is_root = self.page.is_document_root(&element);
                self.hover.enter(element);
                if is_root {
                    self.hide();
                    return;
                }
                self.refresh();
            }
            PageEvent::PointerLeave => {
                self.hover.leave();
                self.hide();
            }
            PageEvent::Scroll | PageEvent::Resize => self.refresh(),
        }
    }

    /// Re-measure the tracked element and move the overlay over it
    ///
    /// Does nothing when nothing qualifying is hovered. Failures are logged
    /// and leave the agent ready for the next event.
    pub fn refresh(&self) {
        let Some(element) = self.hover.tracked() else {
            tracing::debug!("Skipping update - invalid element or not hovering");
            return;
        };
        if self.page.is_document_root(element) {
            return;
        }

        match self.cover(element) {
            Ok(geometry) => tracing::debug!(
                left = geometry.left,
                top = geometry.top,
                width = geometry.width,
                height = geometry.height,
                "Border box updated"
            ),
            Err(e) => tracing::warn!("Error updating border box: {}", e),
        }
    }

    fn cover(&self, element: &P::Element) -> Result<OverlayGeometry, DomError> {
        let rect = self.page.bounding_rect(element)?;
        let radius = self.page.border_radius(element)?;
        let geometry = OverlayGeometry::covering(rect, self.page.scroll_offset(), radius);

        self.page.apply_geometry(&self.overlay, &geometry)?;
        self.page.set_visible(&self.overlay, true)?;
        Ok(geometry)
    }

    fn hide(&self) {
        if let Err(e) = self.page.set_visible(&self.overlay, false) {
            tracing::warn!("Error hiding border box: {}", e);
        }
    }

    /// Remove this agent's overlay and return the page to idle
    pub fn uninstall(self) -> P {
        self.page.remove_element(&self.overlay);
        self.page
    }
}

/// Remove the page's overlay element; returns whether one was found
pub fn remove_overlay<P: PageDom>(page: &P) -> bool {
    match page.find_overlay() {
        Some(overlay) => {
            page.remove_element(&overlay);
            tracing::debug!("Border box found and removed");
            true
        }
        None => {
            tracing::debug!("No border box found to remove");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePage;
    use glam::Vec2;

    fn setup() -> (FakePage, OverlayAgent<FakePage>) {
        let page = FakePage::new();
        let agent = OverlayAgent::install(page.clone()).unwrap();
        (page, agent)
    }

    #[test]
    fn test_install_twice_leaves_one_overlay() {
        let page = FakePage::new();
        let first = OverlayAgent::install(page.clone()).unwrap();
        let second = OverlayAgent::install(page.clone()).unwrap();

        assert_eq!(page.overlay_count(), 1);
        assert_ne!(first.overlay(), second.overlay());
        assert_eq!(page.find_overlay().as_ref(), Some(second.overlay()));
        assert_eq!(second.phase(), OverlayPhase::NotHovering);
    }

    #[test]
    fn test_enter_element_shows_overlay() {
        let (page, mut agent) = setup();
        let button = page.add_element("button", Rect::new(10.0, 20.0, 80.0, 30.0));
        page.set_border_radius(button, "6px");
        page.set_scroll(Vec2::new(0.0, 100.0));

        agent.handle(PageEvent::PointerEnter(button));

        let overlay = page.overlay_snapshot(*agent.overlay());
        assert!(overlay.visible);
        assert_eq!(
            overlay.geometry,
            Some(OverlayGeometry {
                left: 10.0,
                top: 120.0,
                width: 80.0,
                height: 30.0,
                border_radius: "6px".into(),
            })
        );
        assert_eq!(agent.phase(), OverlayPhase::Hovering);
    }

    #[test]
    fn test_enter_body_hides_regardless_of_prior_state() {
        let (page, mut agent) = setup();
        let div = page.add_element("div", Rect::new(0.0, 0.0, 10.0, 10.0));

        agent.handle(PageEvent::PointerEnter(div));
        assert!(page.overlay_snapshot(*agent.overlay()).visible);

        agent.handle(PageEvent::PointerEnter(page.body()));
        assert!(!page.overlay_snapshot(*agent.overlay()).visible);
        assert_eq!(agent.phase(), OverlayPhase::NotHovering);

        agent.handle(PageEvent::PointerEnter(page.root()));
        assert!(!page.overlay_snapshot(*agent.overlay()).visible);
    }

    #[test]
    fn test_scroll_remeasures_element() {
        let (page, mut agent) = setup();
        let card = page.add_element("section", Rect::new(50.0, 400.0, 200.0, 100.0));
        agent.handle(PageEvent::PointerEnter(card));

        page.set_rect(card, Rect::new(50.0, 150.0, 220.0, 100.0));
        page.set_scroll(Vec2::new(0.0, 250.0));
        agent.handle(PageEvent::Scroll);

        let geometry = page.overlay_snapshot(*agent.overlay()).geometry.unwrap();
        assert_eq!((geometry.left, geometry.top), (50.0, 400.0));
        assert_eq!(geometry.width, 220.0);
    }

    #[test]
    fn test_resize_after_leave_is_noop() {
        let (page, mut agent) = setup();
        let card = page.add_element("div", Rect::new(0.0, 0.0, 40.0, 40.0));
        agent.handle(PageEvent::PointerEnter(card));
        agent.handle(PageEvent::PointerLeave);
        let before = page.overlay_snapshot(*agent.overlay());

        page.set_rect(card, Rect::new(5.0, 5.0, 90.0, 90.0));
        agent.handle(PageEvent::Resize);

        let after = page.overlay_snapshot(*agent.overlay());
        assert_eq!(after, before);
        assert!(!after.visible);
        assert!(!agent.hover().is_hovering());
        assert_eq!(agent.hover().current(), Some(&card));
    }

    #[test]
    fn test_scroll_while_over_body_stays_hidden() {
        let (page, mut agent) = setup();
        agent.handle(PageEvent::PointerEnter(page.body()));
        agent.handle(PageEvent::Scroll);
        assert!(!page.overlay_snapshot(*agent.overlay()).visible);
    }

    #[test]
    fn test_measure_error_does_not_stop_tracking() {
        let (page, mut agent) = setup();
        let gone = page.add_element("img", Rect::new(0.0, 0.0, 10.0, 10.0));
        let stays = page.add_element("p", Rect::new(30.0, 30.0, 10.0, 10.0));

        page.detach(gone);
        agent.handle(PageEvent::PointerEnter(gone));
        agent.handle(PageEvent::Scroll);
        assert!(!page.overlay_snapshot(*agent.overlay()).visible);

        agent.handle(PageEvent::PointerEnter(stays));
        let overlay = page.overlay_snapshot(*agent.overlay());
        assert!(overlay.visible);
        assert_eq!(overlay.geometry.unwrap().left, 30.0);
    }

    #[test]
    fn test_stale_agent_writes_to_detached_overlay() {
        let page = FakePage::new();
        let mut stale = OverlayAgent::install(page.clone()).unwrap();
        let fresh = OverlayAgent::install(page.clone()).unwrap();
        let link = page.add_element("a", Rect::new(1.0, 2.0, 3.0, 4.0));

        stale.handle(PageEvent::PointerEnter(link));

        assert!(!page.is_attached(*stale.overlay()));
        assert!(!page.overlay_snapshot(*fresh.overlay()).visible);
        assert_eq!(page.overlay_count(), 1);
    }

    #[test]
    fn test_uninstall_and_remove_overlay() {
        let (page, agent) = setup();
        let page_back = agent.uninstall();
        assert_eq!(page_back.overlay_count(), 0);
        assert!(!remove_overlay(&page));

        let _agent = OverlayAgent::install(page.clone()).unwrap();
        assert!(remove_overlay(&page));
        assert_eq!(page.overlay_count(), 0);
    }
}
