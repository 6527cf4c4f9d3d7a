//! Gradient Border browser extension
//!
//! wasm bindings that connect gb-core to the real browser: `chrome.*`
//! capabilities, the page DOM, and the entry points called from the popup,
//! the options page, the service worker and the injected page script.
//!
//! Everything here targets `wasm32`; on other targets the crate is empty.

#[cfg(target_arch = "wasm32")]
mod agent;
#[cfg(target_arch = "wasm32")]
mod background;
#[cfg(target_arch = "wasm32")]
mod chrome;
#[cfg(target_arch = "wasm32")]
mod host;
#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod options;
#[cfg(target_arch = "wasm32")]
mod page;
#[cfg(target_arch = "wasm32")]
mod popup;
#[cfg(target_arch = "wasm32")]
mod storage;

#[cfg(target_arch = "wasm32")]
pub use host::ChromeHost;
#[cfg(target_arch = "wasm32")]
pub use page::WebPage;
#[cfg(target_arch = "wasm32")]
pub use storage::ChromeStorage;

#[cfg(test)]
mod tests {
    use serde_json::Value;

    const MANIFEST: &str = include_str!("../static/manifest.json");
    const BACKGROUND: &str = include_str!("../static/background.js");
    const DISPATCH: &str = include_str!("../static/dispatch.js");

    #[test]
    fn test_page_dispatch_is_a_module_function() {
        // Extension pages forbid building functions from strings.
        assert!(DISPATCH.contains("export function pageDispatch()"));
        assert!(DISPATCH.contains("agent.runPageScript(script, verbose)"));
        assert!(!DISPATCH.contains("new Function"));

        let manifest: Value = serde_json::from_str(MANIFEST).unwrap();
        let resources = manifest["web_accessible_resources"][0]["resources"]
            .as_array()
            .unwrap();
        assert!(resources.contains(&Value::from("pkg/snippets/*")));
    }

    #[test]
    fn test_command_listener_registered_in_first_turn() {
        let top_level: Vec<&str> = BACKGROUND
            .lines()
            .filter(|line| !line.starts_with(' ') && !line.starts_with("//"))
            .collect();
        assert!(top_level.iter().all(|line| !line.contains("await")));
        assert!(
            top_level
                .iter()
                .any(|line| line.starts_with("chrome.commands.onCommand.addListener("))
        );
        assert!(BACKGROUND.contains("handleCommand(command)"));

        let manifest: Value = serde_json::from_str(MANIFEST).unwrap();
        assert_eq!(manifest["background"]["service_worker"], "background.js");
        assert!(manifest["commands"]["toggle-border-animation"].is_object());
    }
}
