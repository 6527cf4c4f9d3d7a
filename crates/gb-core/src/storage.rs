//! Persistent key-value storage seam
//!
//! The extension keeps everything in one namespaced store of JSON values.
//! [`StorageArea`] abstracts `chrome.storage.*`; [`MemoryStorage`] is the
//! in-process implementation used by tests and native builds.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::catalog::StyleId;
use crate::css::StyleSheet;
use crate::error::StorageError;

/// Storage keys shared with the JavaScript side of the extension
pub mod keys {
    /// Id of the style currently applied (integer)
    pub const SELECTED_STYLE: &str = "selectedStyle";
    /// Exact CSS text installed in the tab (string)
    pub const CURRENT_CSS: &str = "currentCSS";
    /// Lowercase name of the style applied by the keyboard command (string)
    pub const DEFAULT_STYLE: &str = "defaultStyle";
    /// Border ring width in px (integer)
    pub const BORDER_WIDTH: &str = "borderWidth";
    /// Rotation period in seconds (number)
    pub const ANIMATION_SPEED: &str = "animationSpeed";
    /// Glow blur radius in px (integer)
    pub const BLUR: &str = "blur";
    /// Glow opacity, 0..=1 (number)
    pub const GLOW_OPACITY: &str = "glowOpacity";
    /// Glow inset beyond the element in px (integer)
    pub const SPREAD: &str = "spread";
    /// Saved gradient presets (array)
    pub const SAVED_GRADIENTS: &str = "savedGradients";
}

/// A set of stored values keyed by name
pub type StorageRecord = serde_json::Map<String, Value>;

/// Asynchronous key-value store
#[allow(async_fn_in_trait)]
pub trait StorageArea {
    /// Read the given keys; absent keys are simply missing from the record
    async fn get(&self, keys: &[&str]) -> Result<StorageRecord, StorageError>;

    /// Write every entry of `items`
    async fn set(&self, items: StorageRecord) -> Result<(), StorageError>;

    /// Delete the given keys; deleting an absent key is not an error
    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError>;
}

/// Decode `key` from a record read with [`StorageArea::get`]
///
/// `null` is treated the same as a missing key.
pub fn read_value<T: DeserializeOwned>(
    record: &StorageRecord,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match record.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| StorageError::Malformed {
                key: key.to_string(),
                reason: e.to_string(),
            }),
    }
}

/// Encode a single entry for [`StorageArea::set`]
pub fn write_value<T: Serialize>(
    record: &mut StorageRecord,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let value = serde_json::to_value(value).map_err(|e| StorageError::Malformed {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    record.insert(key.to_string(), value);
    Ok(())
}

/// The durable record of what is currently applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedSelection {
    /// Style applied by the last successful injection
    pub selected_style: Option<StyleId>,
    /// Exact text installed, needed verbatim for removal
    pub current_css: Option<StyleSheet>,
}

impl PersistedSelection {
    /// Selection written after a successful injection
    pub fn new(style: StyleId, css: StyleSheet) -> Self {
        Self {
            selected_style: Some(style),
            current_css: Some(css),
        }
    }

    /// Read the selection from storage
    pub async fn load(storage: &impl StorageArea) -> Result<Self, StorageError> {
        let record = storage
            .get(&[keys::SELECTED_STYLE, keys::CURRENT_CSS])
            .await?;
        Ok(Self {
            selected_style: read_value(&record, keys::SELECTED_STYLE)?,
            current_css: read_value(&record, keys::CURRENT_CSS)?,
        })
    }

    /// Overwrite the stored selection; absent fields are left untouched
    pub async fn save(&self, storage: &impl StorageArea) -> Result<(), StorageError> {
        let mut record = StorageRecord::new();
        if let Some(id) = self.selected_style {
            write_value(&mut record, keys::SELECTED_STYLE, &id)?;
        }
        if let Some(css) = &self.current_css {
            write_value(&mut record, keys::CURRENT_CSS, css)?;
        }
        storage.set(record).await
    }

    /// Delete both keys
    pub async fn clear(storage: &impl StorageArea) -> Result<(), StorageError> {
        storage
            .remove(&[keys::SELECTED_STYLE, keys::CURRENT_CSS])
            .await
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: StorageRecord,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-memory [`StorageArea`]; clones share the same store
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `values`
    pub fn with_values(values: StorageRecord) -> Self {
        let storage = Self::new();
        storage.inner.lock().values = values;
        storage
    }

    /// Current value of a key
    pub fn value(&self, key: &str) -> Option<Value> {
        self.inner.lock().values.get(key).cloned()
    }

    /// Check whether a key is present
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().values.contains_key(key)
    }

    /// Make subsequent reads fail
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.lock().fail_reads = fail;
    }

    /// Make subsequent writes and removals fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }
}

impl StorageArea for MemoryStorage {
    async fn get(&self, keys: &[&str]) -> Result<StorageRecord, StorageError> {
        let inner = self.inner.lock();
        if inner.fail_reads {
            return Err(StorageError::Read("storage unavailable".into()));
        }
        Ok(keys
            .iter()
            .filter_map(|k| inner.values.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, items: StorageRecord) -> Result<(), StorageError> {
        let mut inner = self.inner.lock();
        if inner.fail_writes {
            return Err(StorageError::Write("quota exceeded".into()));
        }
        inner.values.extend(items);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut inner = self.inner.lock();
        if inner.fail_writes {
            return Err(StorageError::Write("storage unavailable".into()));
        }
        for key in keys {
            inner.values.remove(*key);
        }
        Ok(())
    }
}
