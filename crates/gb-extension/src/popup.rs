//! Popup entry points
//!
//! The popup page calls `popupMount` once, then one export per button. Every
//! operation reports its outcome through a transient notice in `#notice`.

use gb_core::{ExtensionConfig, Notice, NoticeKind, Style, StyleController, StyleId};
use parking_lot::Mutex;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::chrome;
use crate::host::ChromeHost;
use crate::logging;
use crate::storage::ChromeStorage;

/// Element id of the notice banner in `popup.html`
const NOTICE_ELEMENT: &str = "notice";

/// State shared by the popup exports
#[derive(Debug)]
struct PopupState {
    config: Option<ExtensionConfig>,
    /// Bumped on every notice so an older timer does not clear a newer one
    notice_generation: u64,
}

static STATE: Mutex<PopupState> = Mutex::new(PopupState {
    config: None,
    notice_generation: 0,
});

fn config() -> ExtensionConfig {
    STATE.lock().config.clone().unwrap_or_default()
}

fn controller() -> StyleController<ChromeHost, ChromeStorage> {
    let config = config();
    let storage = ChromeStorage::new(config.selection_area);
    StyleController::new(ChromeHost, storage, config)
}

fn show_notice(notice: Notice) {
    let Some(element) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(NOTICE_ELEMENT))
    else {
        tracing::debug!(text = %notice.text, "No notice element");
        return;
    };

    let kind = match notice.kind {
        NoticeKind::Success => "success",
        NoticeKind::Error => "error",
    };
    element.set_text_content(Some(&notice.text));
    element.set_class_name(&format!("notice {kind}"));

    let generation = {
        let mut state = STATE.lock();
        state.notice_generation += 1;
        state.notice_generation
    };
    let clear = Closure::once_into_js(move || {
        if STATE.lock().notice_generation == generation {
            element.set_text_content(None);
            element.set_class_name("notice");
        }
    });
    let timeout = i32::try_from(notice.timeout.as_millis()).unwrap_or(i32::MAX);
    if let Some(window) = web_sys::window() {
        if let Err(e) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(clear.unchecked_ref(), timeout)
        {
            tracing::warn!("Could not schedule notice dismissal: {}", chrome::error_message(&e));
        }
    }
}

fn timed(notice: Notice) -> Notice {
    let timeout_ms = config().notice_timeout_ms;
    notice.with_timeout(std::time::Duration::from_millis(u64::from(timeout_ms)))
}

/// Install logging and configuration, then re-apply the persisted style
///
/// Resolves to the restored style id, or `null` when nothing was restored.
#[wasm_bindgen(js_name = popupMount)]
pub async fn popup_mount(config_json: Option<String>) -> Result<JsValue, JsValue> {
    let config = match config_json.as_deref().map(ExtensionConfig::from_json) {
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            logging::init(&ExtensionConfig::default().log_filter);
            tracing::warn!("Ignoring invalid configuration: {}", e);
            ExtensionConfig::default()
        }
        None => ExtensionConfig::default(),
    };
    logging::init(&config.log_filter);
    STATE.lock().config = Some(config);

    match controller().restore_on_load().await {
        Ok(Some(style)) => Ok(JsValue::from(style.id.0)),
        Ok(None) => Ok(JsValue::NULL),
        Err(e) => {
            show_notice(timed(Notice::injection::<()>(&Err(e))));
            Ok(JsValue::NULL)
        }
    }
}

/// Apply a catalog style by id; resolves to whether it succeeded
#[wasm_bindgen(js_name = applyStyle)]
pub async fn apply_style(id: u32) -> bool {
    let result = controller().apply_style(StyleId(id)).await;
    show_notice(timed(Notice::injection(&result)));
    result.is_ok()
}

/// Apply a catalog style by case-insensitive name
#[wasm_bindgen(js_name = applyStyleByName)]
pub async fn apply_style_by_name(name: String) -> bool {
    let result = controller().apply_style_by_name(&name).await;
    show_notice(timed(Notice::injection(&result)));
    result.is_ok()
}

/// Remove the applied style from the active tab
#[wasm_bindgen(js_name = resetStyle)]
pub async fn reset_style() -> bool {
    let result = controller().remove().await;
    show_notice(timed(Notice::removal(&result)));
    result.is_ok()
}

/// Choose the style applied by the keyboard shortcut
#[wasm_bindgen(js_name = setDefaultStyle)]
pub async fn set_default_style(name: String) -> bool {
    let result = controller().set_default_style(&name).await;
    show_notice(timed(Notice::default_style(&result)));
    result.is_ok()
}

/// Name of the style the keyboard shortcut applies
#[wasm_bindgen(js_name = defaultStyle)]
pub async fn default_style() -> Result<String, JsValue> {
    controller()
        .default_style()
        .await
        .map(|style| style.name.to_string())
        .map_err(chrome::js_error)
}

#[derive(serde::Serialize)]
struct StyleView {
    #[serde(flatten)]
    style: &'static Style,
    preview: String,
}

/// The built-in styles as a JSON array, for rendering the style buttons
#[wasm_bindgen(js_name = styleCatalog)]
pub fn style_catalog() -> Result<String, JsValue> {
    let controller = controller();
    let styles: Vec<StyleView> = controller
        .catalog()
        .iter()
        .map(|style| StyleView {
            style,
            preview: style.preview_gradient(),
        })
        .collect();
    serde_json::to_string(&styles).map_err(chrome::js_error)
}

/// Open the options page in a new tab
#[wasm_bindgen(js_name = openOptions)]
pub fn open_options() {
    chrome::open_options_page();
}
