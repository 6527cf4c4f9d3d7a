//! Service worker entry points: keyboard commands
//!
//! `background.js` registers the `chrome.commands` listener synchronously and
//! forwards each command to [`handle_command`] once the module is ready.

use gb_core::{ExtensionConfig, StyleController};
use parking_lot::Mutex;
use wasm_bindgen::prelude::*;

use crate::chrome;
use crate::host::ChromeHost;
use crate::logging;
use crate::storage::ChromeStorage;

static CONFIG: Mutex<Option<ExtensionConfig>> = Mutex::new(None);

/// Install logging and configuration for the service worker
#[wasm_bindgen(js_name = backgroundMount)]
pub fn background_mount(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json {
        Some(text) => ExtensionConfig::from_json(&text).map_err(chrome::js_error)?,
        None => ExtensionConfig::default(),
    };
    logging::init(&config.log_filter);
    *CONFIG.lock() = Some(config);
    tracing::debug!("Service worker ready");
    Ok(())
}

/// Apply the default style for the toggle command; resolves to whether it was applied
#[wasm_bindgen(js_name = handleCommand)]
pub async fn handle_command(command: String) -> bool {
    let config = CONFIG.lock().clone().unwrap_or_default();
    let storage = ChromeStorage::new(config.selection_area);
    let controller = StyleController::new(ChromeHost, storage, config);
    match controller.handle_command(&command).await {
        Some(Ok(style)) => {
            tracing::info!(style = style.name, "Applied default style");
            true
        }
        Some(Err(e)) => {
            tracing::error!("Failed to apply default style: {}", e);
            false
        }
        None => false,
    }
}
