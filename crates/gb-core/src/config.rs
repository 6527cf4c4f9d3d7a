//! Extension configuration
//!
//! Build-time defaults that can be overridden from a JSON document, e.g. a
//! `config.json` bundled next to the manifest.

use serde::{Deserialize, Serialize};

use crate::constants::{FALLBACK_DEFAULT_STYLE, NOTICE_TIMEOUT_MS};

/// Which storage area holds the extension state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageAreaKind {
    /// Per-profile storage
    #[default]
    Local,
    /// Account-synced storage
    Sync,
}

/// Extension-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtensionConfig {
    /// Run the page agent with debug-level logging
    pub verbose_agent: bool,
    /// `tracing` filter directive for the popup
    pub log_filter: String,
    /// How long notices stay visible (ms)
    pub notice_timeout_ms: u32,
    /// Style used by the keyboard command when none was chosen
    pub fallback_default_style: String,
    /// Storage area for the applied selection and settings
    pub selection_area: StorageAreaKind,
    /// Storage area for saved gradient presets
    pub preset_area: StorageAreaKind,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::development()
        } else {
            Self::release()
        }
    }
}

impl ExtensionConfig {
    /// Verbose logging, for unpacked development builds
    pub fn development() -> Self {
        Self {
            verbose_agent: true,
            log_filter: "gb_core=debug,gb_extension=debug".into(),
            notice_timeout_ms: NOTICE_TIMEOUT_MS,
            fallback_default_style: FALLBACK_DEFAULT_STYLE.into(),
            selection_area: StorageAreaKind::Local,
            preset_area: StorageAreaKind::Sync,
        }
    }

    /// Quiet logging, for published builds
    pub fn release() -> Self {
        Self {
            verbose_agent: false,
            log_filter: "gb_core=info,gb_extension=info".into(),
            ..Self::development()
        }
    }

    /// Parse a JSON document; missing fields keep their defaults
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Filter directive for the page agent
    pub fn agent_log_filter(verbose: bool) -> &'static str {
        if verbose { "debug" } else { "info" }
    }
}
