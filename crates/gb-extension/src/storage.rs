//! [`StorageArea`] over `chrome.storage`

use gb_core::config::StorageAreaKind;
use gb_core::storage::StorageRecord;
use gb_core::{StorageArea, StorageError};
use serde_json::Value;
use wasm_bindgen::JsValue;

use crate::chrome;

/// `chrome.storage.local` or `chrome.storage.sync`
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeStorage {
    area: StorageAreaKind,
}

impl ChromeStorage {
    /// Storage in the given area
    pub fn new(area: StorageAreaKind) -> Self {
        Self { area }
    }
}

fn key_list(keys: &[&str]) -> Result<JsValue, JsValue> {
    chrome::to_js(&Value::from(keys.to_vec()))
}

fn message(err: JsValue) -> String {
    chrome::error_message(&err)
}

impl StorageArea for ChromeStorage {
    async fn get(&self, keys: &[&str]) -> Result<StorageRecord, StorageError> {
        let keys = key_list(keys).map_err(|e| StorageError::Read(message(e)))?;
        let result = match self.area {
            StorageAreaKind::Local => chrome::local_get(&keys).await,
            StorageAreaKind::Sync => chrome::sync_get(&keys).await,
        }
        .map_err(|e| StorageError::Read(message(e)))?;

        match chrome::from_js(&result).map_err(|e| StorageError::Read(message(e)))? {
            Value::Object(record) => Ok(record),
            _ => Ok(StorageRecord::new()),
        }
    }

    async fn set(&self, items: StorageRecord) -> Result<(), StorageError> {
        let items =
            chrome::to_js(&Value::Object(items)).map_err(|e| StorageError::Write(message(e)))?;
        match self.area {
            StorageAreaKind::Local => chrome::local_set(&items).await,
            StorageAreaKind::Sync => chrome::sync_set(&items).await,
        }
        .map_err(|e| StorageError::Write(message(e)))?;
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let keys = key_list(keys).map_err(|e| StorageError::Write(message(e)))?;
        match self.area {
            StorageAreaKind::Local => chrome::local_remove(&keys).await,
            StorageAreaKind::Sync => chrome::sync_remove(&keys).await,
        }
        .map_err(|e| StorageError::Write(message(e)))?;
        Ok(())
    }
}
