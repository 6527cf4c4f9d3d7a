//! Error types for gradient border operations

use thiserror::Error;

use crate::catalog::StyleId;
use crate::host::TabId;

/// A browser capability rejected a request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("{0}")]
    Rejected(String),

    #[error("tab {0} is not available")]
    TabClosed(TabId),
}

impl HostError {
    /// Prefix of the browser's message for a tab that no longer exists
    const MISSING_TAB: &'static str = "No tab with id";

    /// Classify a rejection the browser reported for a request to `tab`
    pub fn from_rejection(tab: TabId, message: impl Into<String>) -> Self {
        let message = message.into();
        if message.starts_with(Self::MISSING_TAB) {
            HostError::TabClosed(tab)
        } else {
            HostError::Rejected(message)
        }
    }
}

/// Persistent storage failed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("storage read failed: {0}")]
    Read(String),

    #[error("storage write failed: {0}")]
    Write(String),

    #[error("stored value for '{key}' is malformed: {reason}")]
    Malformed { key: String, reason: String },
}

/// A DOM read or write inside the page failed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomError {
    #[error("element is no longer attached to the document")]
    Detached,

    #[error("DOM operation failed: {0}")]
    Operation(String),
}

/// Catalog lookups that found nothing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("no style with id {0}")]
    UnknownId(StyleId),

    #[error("no style named '{0}'")]
    UnknownName(String),
}

/// Errors from applying a style to the active tab
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InjectionError {
    #[error("No valid tab found for injection")]
    NoActiveTab,

    #[error("CSS injection failed in tab {tab}: {source}")]
    CssInstall { tab: TabId, source: HostError },

    #[error("Script injection failed in tab {tab}: {source}")]
    ScriptInstall { tab: TabId, source: HostError },

    #[error("Storage operation failed: {0}")]
    Persist(#[from] StorageError),

    #[error(transparent)]
    UnknownStyle(#[from] CatalogError),
}

/// Errors from removing the applied style from the active tab
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemovalError {
    #[error("No valid tab found for removal")]
    NoActiveTab,

    #[error("Failed to remove CSS from tab {tab}: {source}")]
    CssRemoval { tab: TabId, source: HostError },

    #[error("Failed to remove border box from tab {tab}: {source}")]
    OverlayRemoval { tab: TabId, source: HostError },

    #[error("Failed to clear storage: {0}")]
    Persist(#[from] StorageError),
}

/// Errors from the gradient preset library
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PresetError {
    #[error("preset name is empty")]
    EmptyName,

    #[error("preset needs at least one colour")]
    NoColors,

    #[error("preset has {0} colours, the maximum is {max}", max = crate::constants::MAX_PRESET_COLORS)]
    TooManyColors(usize),

    #[error("transparency spread {0}% is outside 0..=100")]
    InvalidSpread(u8),

    #[error("no preset ids left")]
    IdsExhausted,

    #[error("invalid preset JSON: {0}")]
    Json(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<serde_json::Error> for PresetError {
    fn from(err: serde_json::Error) -> Self {
        PresetError::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tab_rejection_is_tab_closed() {
        let tab = TabId(7);
        assert_eq!(
            HostError::from_rejection(tab, "No tab with id: 7."),
            HostError::TabClosed(tab)
        );
        assert_eq!(
            HostError::from_rejection(tab, "Cannot access a chrome:// URL"),
            HostError::Rejected("Cannot access a chrome:// URL".into())
        );
        assert_eq!(
            InjectionError::CssInstall {
                tab,
                source: HostError::TabClosed(tab)
            }
            .to_string(),
            "CSS injection failed in tab 7: tab 7 is not available"
        );
    }
}
