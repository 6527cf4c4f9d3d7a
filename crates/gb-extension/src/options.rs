//! Options page entry points: injection settings and the preset library

use gb_core::constants::MAX_PRESET_ID;
use gb_core::{ExtensionConfig, GradientPreset, InjectionSettings, PresetLibrary};
use parking_lot::Mutex;
use wasm_bindgen::prelude::*;

use crate::chrome;
use crate::logging;
use crate::storage::ChromeStorage;

static CONFIG: Mutex<Option<ExtensionConfig>> = Mutex::new(None);

fn config() -> ExtensionConfig {
    CONFIG.lock().clone().unwrap_or_default()
}

fn settings_storage() -> ChromeStorage {
    ChromeStorage::new(config().selection_area)
}

fn preset_storage() -> ChromeStorage {
    ChromeStorage::new(config().preset_area)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(chrome::js_error)
}

/// Install logging and configuration; resolves to the stored settings as JSON
#[wasm_bindgen(js_name = optionsMount)]
pub async fn options_mount(config_json: Option<String>) -> Result<String, JsValue> {
    let config = match config_json {
        Some(text) => ExtensionConfig::from_json(&text).map_err(chrome::js_error)?,
        None => ExtensionConfig::default(),
    };
    logging::init(&config.log_filter);
    *CONFIG.lock() = Some(config);

    let settings = InjectionSettings::load(&settings_storage())
        .await
        .map_err(chrome::js_error)?;
    to_json(&settings)
}

/// Slider defaults as JSON
#[wasm_bindgen(js_name = settingsDefaults)]
pub fn settings_defaults() -> Result<String, JsValue> {
    to_json(&InjectionSettings::options_defaults())
}

/// Persist settings given as JSON; resolves to the clamped values actually stored
#[wasm_bindgen(js_name = saveSettings)]
pub async fn save_settings(settings_json: String) -> Result<String, JsValue> {
    let settings: InjectionSettings =
        serde_json::from_str(&settings_json).map_err(chrome::js_error)?;
    settings
        .save(&settings_storage())
        .await
        .map_err(chrome::js_error)?;
    tracing::info!(?settings, "Settings saved");
    to_json(&settings.clamped())
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct PresetView<'a> {
    #[serde(flatten)]
    preset: &'a GradientPreset,
    gradient: String,
}

/// Presets whose name matches `query`, each with its `conic-gradient()` preview
#[wasm_bindgen(js_name = listPresets)]
pub async fn list_presets(query: Option<String>) -> Result<String, JsValue> {
    let library = PresetLibrary::load(&preset_storage())
        .await
        .map_err(chrome::js_error)?;
    let views: Vec<PresetView<'_>> = library
        .search(query.as_deref().unwrap_or_default())
        .into_iter()
        .map(|preset| PresetView {
            preset,
            gradient: preset.conic_gradient(),
        })
        .collect();
    to_json(&views)
}

/// Save a new preset; `colors_json` is a JSON array of colour strings
#[wasm_bindgen(js_name = addPreset)]
pub async fn add_preset(
    name: String,
    colors_json: String,
    transparency_spread: Option<u8>,
) -> Result<f64, JsValue> {
    let colors: Vec<String> = serde_json::from_str(&colors_json).map_err(chrome::js_error)?;
    let storage = preset_storage();
    let mut library = PresetLibrary::load(&storage)
        .await
        .map_err(chrome::js_error)?;
    let id = library
        .add(&name, colors, transparency_spread)
        .map_err(chrome::js_error)?;
    library.save(&storage).await.map_err(chrome::js_error)?;
    tracing::info!(id, name = %name, "Preset saved");
    // Exact: ids are capped at MAX_PRESET_ID.
    Ok(id as f64)
}

/// Preset id from a JavaScript number; ids never exceed [`MAX_PRESET_ID`]
fn preset_id(id: f64) -> Option<u64> {
    (id.fract() == 0.0 && (1.0..=MAX_PRESET_ID as f64).contains(&id)).then_some(id as u64)
}

/// Delete a preset; resolves to whether it existed
#[wasm_bindgen(js_name = deletePreset)]
pub async fn delete_preset(id: f64) -> Result<bool, JsValue> {
    let Some(id) = preset_id(id) else {
        return Ok(false);
    };
    let storage = preset_storage();
    let mut library = PresetLibrary::load(&storage)
        .await
        .map_err(chrome::js_error)?;
    if library.delete(id).is_none() {
        return Ok(false);
    }
    library.save(&storage).await.map_err(chrome::js_error)?;
    Ok(true)
}

/// Every preset as a pretty-printed JSON document
#[wasm_bindgen(js_name = exportPresets)]
pub async fn export_presets() -> Result<String, JsValue> {
    PresetLibrary::load(&preset_storage())
        .await
        .and_then(|library| library.export_json())
        .map_err(chrome::js_error)
}

/// Append presets from an exported document; resolves to how many were added
#[wasm_bindgen(js_name = importPresets)]
pub async fn import_presets(text: String) -> Result<u32, JsValue> {
    let storage = preset_storage();
    let mut library = PresetLibrary::load(&storage)
        .await
        .map_err(chrome::js_error)?;
    let count = library.import_json(&text).map_err(chrome::js_error)?;
    library.save(&storage).await.map_err(chrome::js_error)?;
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}
