//! [`BrowserHost`] over `chrome.tabs` and `chrome.scripting`

use gb_core::{BrowserHost, HostError, PageScript, StyleSheet, TabId};
use js_sys::{Array, Function};
use serde_json::{Value, json};
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

use crate::chrome;

/// Extension-relative path of the script that loads the agent module in a page
const AGENT_LOADER: &str = "agent-loader.js";

#[wasm_bindgen(module = "/static/dispatch.js")]
extern "C" {
    /// Function run in the page after the loader; forwards to `runPageScript`
    #[wasm_bindgen(js_name = pageDispatch)]
    fn page_dispatch() -> Function;
}

fn rejected(err: JsValue) -> HostError {
    HostError::Rejected(chrome::error_message(&err))
}

fn rejected_in(tab: TabId) -> impl Fn(JsValue) -> HostError {
    move |err| HostError::from_rejection(tab, chrome::error_message(&err))
}

/// The real browser, as seen from the popup
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromeHost;

impl ChromeHost {
    async fn load_agent(&self, tab: TabId) -> Result<(), HostError> {
        let files = Array::of1(&JsValue::from_str(AGENT_LOADER));
        let injection = chrome::injection(tab.0, &[("files", files.into())]).map_err(rejected)?;
        chrome::execute_script(&injection)
            .await
            .map_err(rejected_in(tab))?;
        Ok(())
    }
}

impl BrowserHost for ChromeHost {
    async fn active_tab(&self) -> Result<Option<TabId>, HostError> {
        let query = chrome::to_js(&json!({ "active": true, "currentWindow": true }))
            .map_err(rejected)?;
        let tabs = chrome::tabs_query(&query).await.map_err(rejected)?;
        let tabs = chrome::from_js(&tabs).map_err(rejected)?;

        let id = tabs
            .get(0)
            .and_then(|tab| tab.get("id"))
            .and_then(Value::as_i64)
            .and_then(|id| i32::try_from(id).ok());
        tracing::debug!(?id, "Current tab");
        Ok(id.map(TabId))
    }

    async fn install_css(&self, tab: TabId, css: &StyleSheet) -> Result<(), HostError> {
        let injection = chrome::injection(tab.0, &[("css", css.as_str().into())]).map_err(rejected)?;
        chrome::insert_css(&injection).await.map_err(rejected_in(tab))?;
        Ok(())
    }

    async fn remove_css(&self, tab: TabId, css: &StyleSheet) -> Result<(), HostError> {
        let injection = chrome::injection(tab.0, &[("css", css.as_str().into())]).map_err(rejected)?;
        chrome::remove_css(&injection).await.map_err(rejected_in(tab))?;
        Ok(())
    }

    async fn run_in_page(&self, tab: TabId, script: PageScript) -> Result<(), HostError> {
        self.load_agent(tab).await?;

        let args = Array::of2(&script.name().into(), &script.verbose().into());
        let injection = chrome::injection(
            tab.0,
            &[("func", page_dispatch().into()), ("args", args.into())],
        )
        .map_err(rejected)?;

        tracing::debug!(%tab, script = script.name(), "Running page script");
        chrome::execute_script(&injection)
            .await
            .map_err(rejected_in(tab))?;
        Ok(())
    }
}
