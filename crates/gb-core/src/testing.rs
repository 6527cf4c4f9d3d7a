//! In-memory page and browser fakes
//!
//! [`FakePage`] is a tiny DOM arena with mutable layout; [`FakeBrowser`]
//! implements [`BrowserHost`] by running the real [`OverlayAgent`] against
//! fake pages, so controller tests can observe what a tab would show.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;
use parking_lot::Mutex;

use crate::agent::{OverlayAgent, OverlayGeometry, OverlayPhase, PageDom, PageEvent, Rect};
use crate::constants::OVERLAY_CLASS;
use crate::css::StyleSheet;
use crate::error::{DomError, HostError};
use crate::host::{BrowserHost, PageScript, TabId};

/// Handle to an element in a [`FakePage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct FakeNode {
    tag: String,
    class: Option<&'static str>,
    attached: bool,
    rect: Rect,
    border_radius: String,
    geometry: Option<OverlayGeometry>,
    visible: bool,
}

impl FakeNode {
    fn new(tag: &str, rect: Rect) -> Self {
        Self {
            tag: tag.to_string(),
            class: None,
            attached: true,
            rect,
            border_radius: "0px".into(),
            geometry: None,
            visible: false,
        }
    }
}

#[derive(Debug)]
struct FakeDocument {
    nodes: Vec<FakeNode>,
    scroll: Vec2,
}

/// What the overlay element currently carries
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySnapshot {
    /// Last geometry written, if any
    pub geometry: Option<OverlayGeometry>,
    /// Whether the visible class is set
    pub visible: bool,
    /// Whether the element is still in the document
    pub attached: bool,
}

/// Shared handle to a fake document
#[derive(Debug, Clone)]
pub struct FakePage {
    doc: Arc<Mutex<FakeDocument>>,
}

impl Default for FakePage {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePage {
    const ROOT: NodeId = NodeId(0);
    const BODY: NodeId = NodeId(1);

    /// A page with only `html` and `body`
    pub fn new() -> Self {
        let viewport = Rect::new(0.0, 0.0, 1280.0, 800.0);
        Self {
            doc: Arc::new(Mutex::new(FakeDocument {
                nodes: vec![
                    FakeNode::new("html", viewport),
                    FakeNode::new("body", viewport),
                ],
                scroll: Vec2::ZERO,
            })),
        }
    }

    /// The root `html` element
    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// The `body` element
    pub fn body(&self) -> NodeId {
        Self::BODY
    }

    /// Append an element with the given layout box
    pub fn add_element(&self, tag: &str, rect: Rect) -> NodeId {
        let mut doc = self.doc.lock();
        doc.nodes.push(FakeNode::new(tag, rect));
        NodeId(doc.nodes.len() - 1)
    }

    /// Change an element's layout box
    pub fn set_rect(&self, id: NodeId, rect: Rect) {
        self.doc.lock().nodes[id.0].rect = rect;
    }

    /// Change an element's computed border radius
    pub fn set_border_radius(&self, id: NodeId, radius: &str) {
        self.doc.lock().nodes[id.0].border_radius = radius.to_string();
    }

    /// Scroll the window
    pub fn set_scroll(&self, scroll: Vec2) {
        self.doc.lock().scroll = scroll;
    }

    /// Remove an element from the document
    pub fn detach(&self, id: NodeId) {
        self.doc.lock().nodes[id.0].attached = false;
    }

    /// Whether the element is still in the document
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.doc.lock().nodes[id.0].attached
    }

    /// Number of attached overlay elements
    pub fn overlay_count(&self) -> usize {
        self.doc
            .lock()
            .nodes
            .iter()
            .filter(|n| n.attached && n.class == Some(OVERLAY_CLASS))
            .count()
    }

    /// State of an overlay element
    pub fn overlay_snapshot(&self, id: NodeId) -> OverlaySnapshot {
        let doc = self.doc.lock();
        let node = &doc.nodes[id.0];
        OverlaySnapshot {
            geometry: node.geometry.clone(),
            visible: node.visible,
            attached: node.attached,
        }
    }
}

impl PageDom for FakePage {
    type Element = NodeId;

    fn find_overlay(&self) -> Option<NodeId> {
        self.doc
            .lock()
            .nodes
            .iter()
            .position(|n| n.attached && n.class == Some(OVERLAY_CLASS))
            .map(NodeId)
    }

    fn create_overlay(&self) -> Result<NodeId, DomError> {
        let mut doc = self.doc.lock();
        let mut node = FakeNode::new("div", Rect::default());
        node.class = Some(OVERLAY_CLASS);
        doc.nodes.push(node);
        Ok(NodeId(doc.nodes.len() - 1))
    }

    fn remove_element(&self, element: &NodeId) {
        self.detach(*element);
    }

    fn is_document_root(&self, element: &NodeId) -> bool {
        *element == Self::ROOT || *element == Self::BODY
    }

    fn bounding_rect(&self, element: &NodeId) -> Result<Rect, DomError> {
        let doc = self.doc.lock();
        let node = &doc.nodes[element.0];
        if !node.attached {
            return Err(DomError::Detached);
        }
        Ok(node.rect)
    }

    fn scroll_offset(&self) -> Vec2 {
        self.doc.lock().scroll
    }

    fn border_radius(&self, element: &NodeId) -> Result<String, DomError> {
        Ok(self.doc.lock().nodes[element.0].border_radius.clone())
    }

    fn apply_geometry(&self, overlay: &NodeId, geometry: &OverlayGeometry) -> Result<(), DomError> {
        self.doc.lock().nodes[overlay.0].geometry = Some(geometry.clone());
        Ok(())
    }

    fn set_visible(&self, overlay: &NodeId, visible: bool) -> Result<(), DomError> {
        self.doc.lock().nodes[overlay.0].visible = visible;
        Ok(())
    }

    fn describe(&self, element: &NodeId) -> String {
        self.doc.lock().nodes[element.0].tag.clone()
    }
}

/// A capability call recorded by [`FakeBrowser`]
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    /// `active_tab`
    ActiveTab,
    /// `install_css`
    InstallCss(TabId, StyleSheet),
    /// `remove_css`
    RemoveCss(TabId, StyleSheet),
    /// `run_in_page`
    RunInPage(TabId, PageScript),
}

#[derive(Debug)]
struct FakeTab {
    page: FakePage,
    css: Vec<StyleSheet>,
    agent: Option<OverlayAgent<FakePage>>,
}

#[derive(Debug, Default)]
struct BrowserInner {
    active: Option<TabId>,
    tabs: HashMap<TabId, FakeTab>,
    fail_css_install: bool,
    fail_css_remove: bool,
    fail_scripts: bool,
    calls: Vec<HostCall>,
}

/// In-memory [`BrowserHost`]; clones share the same browser
#[derive(Debug, Clone, Default)]
pub struct FakeBrowser {
    inner: Arc<Mutex<BrowserInner>>,
}

impl FakeBrowser {
    /// A browser with no tabs
    pub fn new() -> Self {
        Self::default()
    }

    /// A browser with one active tab
    pub fn with_active_tab(tab: TabId) -> Self {
        let browser = Self::new();
        browser.open_tab(tab);
        browser.set_active(Some(tab));
        browser
    }

    /// Open a tab with a blank page
    pub fn open_tab(&self, tab: TabId) -> FakePage {
        let page = FakePage::new();
        self.inner.lock().tabs.insert(
            tab,
            FakeTab {
                page: page.clone(),
                css: Vec::new(),
                agent: None,
            },
        );
        page
    }

    /// Change which tab is active
    pub fn set_active(&self, tab: Option<TabId>) {
        self.inner.lock().active = tab;
    }

    /// Page shown in a tab
    pub fn page(&self, tab: TabId) -> FakePage {
        self.inner.lock().tabs[&tab].page.clone()
    }

    /// Stylesheets currently installed in a tab
    pub fn installed_css(&self, tab: TabId) -> Vec<StyleSheet> {
        self.inner.lock().tabs[&tab].css.clone()
    }

    /// Phase of the overlay agent running in a tab
    pub fn phase(&self, tab: TabId) -> OverlayPhase {
        self.inner.lock().tabs[&tab]
            .agent
            .as_ref()
            .map_or(OverlayPhase::Idle, OverlayAgent::phase)
    }

    /// Deliver a page event to the tab's agent
    pub fn dispatch(&self, tab: TabId, event: PageEvent<NodeId>) {
        if let Some(agent) = self.inner.lock().tabs.get_mut(&tab).and_then(|t| t.agent.as_mut()) {
            agent.handle(event);
        }
    }

    /// Every capability call so far
    pub fn calls(&self) -> Vec<HostCall> {
        self.inner.lock().calls.clone()
    }

    /// Make `install_css` fail
    pub fn set_fail_css_install(&self, fail: bool) {
        self.inner.lock().fail_css_install = fail;
    }

    /// Make `remove_css` fail
    pub fn set_fail_css_remove(&self, fail: bool) {
        self.inner.lock().fail_css_remove = fail;
    }

    /// Make `run_in_page` fail
    pub fn set_fail_scripts(&self, fail: bool) {
        self.inner.lock().fail_scripts = fail;
    }
}

impl BrowserHost for FakeBrowser {
    async fn active_tab(&self) -> Result<Option<TabId>, HostError> {
        let mut inner = self.inner.lock();
        inner.calls.push(HostCall::ActiveTab);
        Ok(inner.active)
    }

    async fn install_css(&self, tab: TabId, css: &StyleSheet) -> Result<(), HostError> {
        let mut inner = self.inner.lock();
        inner.calls.push(HostCall::InstallCss(tab, css.clone()));
        if inner.fail_css_install {
            return Err(HostError::Rejected(
                "Cannot access a chrome:// URL".into(),
            ));
        }
        let entry = inner.tabs.get_mut(&tab).ok_or(HostError::TabClosed(tab))?;
        entry.css.push(css.clone());
        Ok(())
    }

    async fn remove_css(&self, tab: TabId, css: &StyleSheet) -> Result<(), HostError> {
        let mut inner = self.inner.lock();
        inner.calls.push(HostCall::RemoveCss(tab, css.clone()));
        if inner.fail_css_remove {
            return Err(HostError::Rejected("removal rejected".into()));
        }
        let entry = inner.tabs.get_mut(&tab).ok_or(HostError::TabClosed(tab))?;
        let index = entry
            .css
            .iter()
            .position(|installed| installed == css)
            .ok_or_else(|| HostError::Rejected("no matching stylesheet".into()))?;
        entry.css.remove(index);
        Ok(())
    }

    async fn run_in_page(&self, tab: TabId, script: PageScript) -> Result<(), HostError> {
        let mut inner = self.inner.lock();
        inner.calls.push(HostCall::RunInPage(tab, script));
        if inner.fail_scripts {
            return Err(HostError::Rejected("script injection blocked".into()));
        }
        let entry = inner.tabs.get_mut(&tab).ok_or(HostError::TabClosed(tab))?;
        match script {
            PageScript::InstallOverlay { .. } => {
                let agent = OverlayAgent::install(entry.page.clone())
                    .map_err(|e| HostError::Rejected(e.to_string()))?;
                entry.agent = Some(agent);
            }
            PageScript::RemoveOverlay => {
                crate::agent::remove_overlay(&entry.page);
                entry.agent = None;
            }
        }
        Ok(())
    }
}
