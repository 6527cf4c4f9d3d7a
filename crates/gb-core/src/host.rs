//! Privileged browser capabilities used by the controllers

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::css::StyleSheet;
use crate::error::HostError;

/// Identifier of a browser tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Routines that can be run inside a page's isolated context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageScript {
    /// Install the hover-tracking overlay agent, replacing any previous one
    InstallOverlay {
        /// Log every event at debug level
        verbose: bool,
    },
    /// Remove the overlay element if present
    RemoveOverlay,
}

impl PageScript {
    /// Name used in logs and as the JavaScript entry point
    pub fn name(&self) -> &'static str {
        match self {
            PageScript::InstallOverlay { .. } => "installOverlay",
            PageScript::RemoveOverlay => "removeOverlay",
        }
    }

    /// Inverse of [`PageScript::name`]
    pub fn from_name(name: &str, verbose: bool) -> Option<Self> {
        match name {
            "installOverlay" => Some(PageScript::InstallOverlay { verbose }),
            "removeOverlay" => Some(PageScript::RemoveOverlay),
            _ => None,
        }
    }

    /// Whether the script should log at debug level
    pub fn verbose(&self) -> bool {
        matches!(self, PageScript::InstallOverlay { verbose: true })
    }
}

/// Access to the active tab and content injection
///
/// Every call suspends until the browser responds; none are cancellable.
#[allow(async_fn_in_trait)]
pub trait BrowserHost {
    /// The active tab of the current window, if it has a usable id
    async fn active_tab(&self) -> Result<Option<TabId>, HostError>;

    /// Insert CSS text into the tab's document
    async fn install_css(&self, tab: TabId, css: &StyleSheet) -> Result<(), HostError>;

    /// Remove previously inserted CSS; the text must match exactly
    async fn remove_css(&self, tab: TabId, css: &StyleSheet) -> Result<(), HostError>;

    /// Run a routine inside the tab's isolated context
    async fn run_in_page(&self, tab: TabId, script: PageScript) -> Result<(), HostError>;
}
