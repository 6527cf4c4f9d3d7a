//! Transient user-facing notices

use std::time::Duration;

use crate::constants::{NOTICE_TIMEOUT_MS, TOGGLE_SHORTCUT};
use crate::error::{InjectionError, RemovalError};

/// Tone of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Operation completed
    Success,
    /// Operation failed
    Error,
}

/// Short message shown in the popup and dismissed automatically
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    /// Message text
    pub text: String,
    /// Tone
    pub kind: NoticeKind,
    /// How long the notice stays visible
    pub timeout: Duration,
}

impl Notice {
    fn new(text: impl Into<String>, kind: NoticeKind) -> Self {
        Self {
            text: text.into(),
            kind,
            timeout: Duration::from_millis(NOTICE_TIMEOUT_MS as u64),
        }
    }

    /// Override the display duration
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Outcome of applying a style
    pub fn injection<T>(result: &Result<T, InjectionError>) -> Self {
        match result {
            Ok(_) => Self::new("Style injected successfully!", NoticeKind::Success),
            Err(e) => Self::new(format!("Failed to inject style: {e}"), NoticeKind::Error),
        }
    }

    /// Outcome of removing the applied style
    pub fn removal(result: &Result<(), RemovalError>) -> Self {
        match result {
            Ok(()) => Self::new("Style removed successfully!", NoticeKind::Success),
            Err(e) => Self::new(format!("Failed to remove style: {e}"), NoticeKind::Error),
        }
    }

    /// Outcome of choosing the keyboard-shortcut style
    pub fn default_style<T>(result: &Result<T, InjectionError>) -> Self {
        match result {
            Ok(_) => Self::new(
                format!("Default style updated! Use {TOGGLE_SHORTCUT} to apply"),
                NoticeKind::Success,
            ),
            Err(_) => Self::new("Error saving default style", NoticeKind::Error),
        }
    }

    /// Whether this notice reports a failure
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::host::TabId;

    #[test]
    fn test_injection_messages() {
        let ok = Notice::injection(&Ok::<(), InjectionError>(()));
        assert_eq!(ok.text, "Style injected successfully!");
        assert_eq!(ok.timeout, Duration::from_millis(3000));

        let failed = Notice::injection(&Err::<(), _>(InjectionError::NoActiveTab));
        assert!(failed.is_error());
        assert_eq!(
            failed.text,
            "Failed to inject style: No valid tab found for injection"
        );
    }

    #[test]
    fn test_removal_message_names_tab() {
        let err = RemovalError::CssRemoval {
            tab: TabId(7),
            source: crate::error::HostError::Rejected("no matching stylesheet".into()),
        };
        let notice = Notice::removal(&Err(err));
        assert!(notice.text.contains("tab 7"));
        assert!(notice.text.ends_with("no matching stylesheet"));
    }

    #[test]
    fn test_default_style_messages() {
        let ok = Notice::default_style(&Ok::<(), InjectionError>(()));
        assert!(ok.text.contains("Alt+Shift+B"));

        let miss = Notice::default_style(&Err::<(), _>(InjectionError::UnknownStyle(
            CatalogError::UnknownName("plaid".into()),
        )));
        assert_eq!(miss.text, "Error saving default style");
    }
}
