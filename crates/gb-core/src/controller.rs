//! Apply / remove / restore orchestration
//!
//! [`StyleController`] runs every multi-step operation against the active
//! tab. Steps run strictly in order and the first failure aborts the rest;
//! completed steps are not rolled back. Two overlapping calls are not
//! serialized: whichever installs its page script last owns the overlay.

use crate::catalog::{Style, StyleCatalog, StyleId};
use crate::config::ExtensionConfig;
use crate::constants::TOGGLE_COMMAND;
use crate::css::{OverlayCss, StyleSheet};
use crate::error::{InjectionError, RemovalError};
use crate::host::{BrowserHost, PageScript, TabId};
use crate::settings::InjectionSettings;
use crate::storage::{PersistedSelection, StorageArea, StorageRecord, keys, read_value, write_value};

/// Applies catalog styles to the active tab and tracks what is applied
pub struct StyleController<H, S> {
    host: H,
    storage: S,
    catalog: StyleCatalog,
    config: ExtensionConfig,
}

impl<H: BrowserHost, S: StorageArea> StyleController<H, S> {
    /// Create a controller over the built-in catalog
    pub fn new(host: H, storage: S, config: ExtensionConfig) -> Self {
        Self {
            host,
            storage,
            catalog: StyleCatalog::builtin(),
            config,
        }
    }

    /// The browser capabilities in use
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The storage area in use
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The style catalog
    pub fn catalog(&self) -> &StyleCatalog {
        &self.catalog
    }

    /// The active configuration
    pub fn config(&self) -> &ExtensionConfig {
        &self.config
    }

    async fn active_tab(&self) -> Option<TabId> {
        match self.host.active_tab().await {
            Ok(tab) => tab,
            Err(e) => {
                tracing::error!("Active tab query failed: {}", e);
                None
            }
        }
    }

    /// Install `style` in the active tab and remember it
    ///
    /// Returns the exact stylesheet that was installed.
    pub async fn inject(
        &self,
        style: &Style,
        settings: &InjectionSettings,
    ) -> Result<StyleSheet, InjectionError> {
        tracing::info!(
            style = style.name,
            width = settings.border_width_px,
            speed = settings.animation_speed_secs,
            "Injecting style"
        );

        let tab = self.active_tab().await.ok_or(InjectionError::NoActiveTab)?;
        let css = OverlayCss::build(style.colors, settings).render();

        self.host
            .install_css(tab, &css)
            .await
            .map_err(|source| InjectionError::CssInstall { tab, source })
            .inspect_err(|e| tracing::error!(%tab, style = style.name, "{}", e))?;
        tracing::debug!(%tab, "CSS injection successful");

        let script = PageScript::InstallOverlay {
            verbose: self.config.verbose_agent,
        };
        self.host
            .run_in_page(tab, script)
            .await
            .map_err(|source| InjectionError::ScriptInstall { tab, source })
            .inspect_err(|e| tracing::error!(%tab, style = style.name, "{}", e))?;
        tracing::debug!(%tab, "Script injection successful");

        PersistedSelection::new(style.id, css.clone())
            .save(&self.storage)
            .await
            .inspect_err(|e| tracing::error!(style = style.name, "Storage operation failed: {}", e))?;

        tracing::info!(%tab, style = style.name, "Style injection completed");
        Ok(css)
    }

    /// Settings stored by the options page, with defaults for missing keys
    pub async fn load_settings(&self) -> Result<InjectionSettings, InjectionError> {
        Ok(InjectionSettings::load(&self.storage).await?)
    }

    /// Apply a catalog style by id with the stored settings
    pub async fn apply_style(&self, id: StyleId) -> Result<&'static Style, InjectionError> {
        let style = self.catalog.lookup(id)?;
        let settings = self.load_settings().await?;
        self.inject(style, &settings).await?;
        Ok(style)
    }

    /// Apply a catalog style by name (case-insensitive) with the stored settings
    pub async fn apply_style_by_name(&self, name: &str) -> Result<&'static Style, InjectionError> {
        let style = self.catalog.lookup_name(name)?;
        let settings = self.load_settings().await?;
        self.inject(style, &settings).await?;
        Ok(style)
    }

    /// Remove the applied style from the active tab and forget it
    pub async fn remove(&self) -> Result<(), RemovalError> {
        tracing::info!("Starting style removal");

        let tab = self.active_tab().await.ok_or(RemovalError::NoActiveTab)?;

        let record = self.storage.get(&[keys::CURRENT_CSS]).await?;
        let installed: Option<StyleSheet> = read_value(&record, keys::CURRENT_CSS)?;
        match installed {
            Some(css) => {
                self.host
                    .remove_css(tab, &css)
                    .await
                    .map_err(|source| RemovalError::CssRemoval { tab, source })
                    .inspect_err(|e| tracing::error!(%tab, "{}", e))?;
                tracing::debug!(%tab, "CSS removed");
            }
            None => tracing::debug!("No CSS found in storage to remove"),
        }

        self.host
            .run_in_page(tab, PageScript::RemoveOverlay)
            .await
            .map_err(|source| RemovalError::OverlayRemoval { tab, source })
            .inspect_err(|e| tracing::error!(%tab, "{}", e))?;

        PersistedSelection::clear(&self.storage)
            .await
            .inspect_err(|e| tracing::error!("Failed to clear storage: {}", e))?;

        tracing::info!(%tab, "Style removal completed");
        Ok(())
    }

    /// Re-apply the persisted selection, e.g. when the popup opens
    ///
    /// A stale id is ignored and yields `Ok(None)`.
    pub async fn restore_on_load(&self) -> Result<Option<&'static Style>, InjectionError> {
        let selection = PersistedSelection::load(&self.storage).await?;
        let Some(id) = selection.selected_style else {
            return Ok(None);
        };
        let Some(style) = self.catalog.get(id) else {
            tracing::debug!(%id, "Persisted style is not in the catalog");
            return Ok(None);
        };

        tracing::info!(style = style.name, "Restoring style");
        let settings = self.load_settings().await?;
        self.inject(style, &settings).await?;
        Ok(Some(style))
    }

    /// Style applied by the keyboard command
    pub async fn default_style(&self) -> Result<&'static Style, InjectionError> {
        let record = self.storage.get(&[keys::DEFAULT_STYLE]).await?;
        let stored: Option<String> = read_value(&record, keys::DEFAULT_STYLE)?;
        let name = stored.unwrap_or_else(|| self.config.fallback_default_style.clone());
        Ok(self.catalog.lookup_name(&name)?)
    }

    /// Choose the style applied by the keyboard command
    pub async fn set_default_style(&self, name: &str) -> Result<&'static Style, InjectionError> {
        let style = self.catalog.lookup_name(name)?;
        let mut record = StorageRecord::new();
        write_value(&mut record, keys::DEFAULT_STYLE, &style.name.to_lowercase())?;
        self.storage
            .set(record)
            .await
            .inspect_err(|e| tracing::error!("Error saving default style: {}", e))?;
        tracing::info!(style = style.name, "Default style updated");
        Ok(style)
    }

    /// React to a keyboard command; unknown commands return `None`
    pub async fn handle_command(
        &self,
        command: &str,
    ) -> Option<Result<&'static Style, InjectionError>> {
        if command != TOGGLE_COMMAND {
            tracing::debug!(command, "Ignoring command");
            return None;
        }

        tracing::debug!(command, "Applying default style");
        let result = match self.default_style().await {
            Ok(style) => self.apply_style(style.id).await,
            Err(e) => Err(e),
        };
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{PageEvent, Rect};
    use crate::error::{CatalogError, HostError, StorageError};
    use crate::storage::MemoryStorage;
    use crate::testing::{FakeBrowser, HostCall};
    use crate::{OverlayPhase, PageDom};
    use futures::executor::block_on;
    use serde_json::json;

    const TAB: TabId = TabId(42);

    fn controller() -> StyleController<FakeBrowser, MemoryStorage> {
        StyleController::new(
            FakeBrowser::with_active_tab(TAB),
            MemoryStorage::new(),
            ExtensionConfig::development(),
        )
    }

    fn neon() -> &'static Style {
        StyleCatalog::builtin().get(StyleId(2)).unwrap()
    }

    fn width(px: u32) -> InjectionSettings {
        InjectionSettings {
            border_width_px: px,
            ..InjectionSettings::default()
        }
    }

    #[test]
    fn test_inject_neon_persists_exact_css() {
        let ctl = controller();
        let css = block_on(ctl.inject(neon(), &width(2))).unwrap();

        assert!(css.contains("#ff00ff, #9500ff, #00ffff, #ff00ff"));
        assert!(css.contains("2px"));
        assert_eq!(ctl.storage().value(keys::SELECTED_STYLE), Some(json!(2)));
        assert_eq!(
            ctl.storage().value(keys::CURRENT_CSS),
            Some(json!(css.as_str()))
        );
        assert_eq!(ctl.host().installed_css(TAB), vec![css.clone()]);
        assert_eq!(ctl.host().page(TAB).overlay_count(), 1);

        block_on(ctl.remove()).unwrap();
        assert!(ctl.host().calls().contains(&HostCall::RemoveCss(TAB, css)));
    }

    #[test]
    fn test_inject_then_remove_round_trip() {
        let ctl = controller();
        block_on(ctl.inject(neon(), &InjectionSettings::default())).unwrap();
        block_on(ctl.remove()).unwrap();

        assert!(!ctl.storage().contains(keys::SELECTED_STYLE));
        assert!(!ctl.storage().contains(keys::CURRENT_CSS));
        assert!(ctl.host().installed_css(TAB).is_empty());
        assert_eq!(ctl.host().page(TAB).overlay_count(), 0);
        assert_eq!(ctl.host().phase(TAB), OverlayPhase::Idle);
    }

    #[test]
    fn test_remove_without_injection_skips_css_removal() {
        let ctl = controller();
        block_on(ctl.remove()).unwrap();

        let calls = ctl.host().calls();
        assert!(!calls.iter().any(|c| matches!(c, HostCall::RemoveCss(..))));
        assert!(calls.contains(&HostCall::RunInPage(TAB, PageScript::RemoveOverlay)));
    }

    #[test]
    fn test_restore_with_stale_id_does_nothing() {
        let mut values = StorageRecord::new();
        values.insert(keys::SELECTED_STYLE.into(), json!(999));
        let ctl = StyleController::new(
            FakeBrowser::with_active_tab(TAB),
            MemoryStorage::with_values(values),
            ExtensionConfig::development(),
        );

        assert_eq!(block_on(ctl.restore_on_load()), Ok(None));
        assert!(ctl.host().calls().is_empty());
    }

    #[test]
    fn test_restore_reapplies_with_stored_settings() {
        let mut values = StorageRecord::new();
        values.insert(keys::SELECTED_STYLE.into(), json!(4));
        values.insert(keys::BORDER_WIDTH.into(), json!(5));
        let ctl = StyleController::new(
            FakeBrowser::with_active_tab(TAB),
            MemoryStorage::with_values(values),
            ExtensionConfig::development(),
        );

        let restored = block_on(ctl.restore_on_load()).unwrap();
        assert_eq!(restored.map(|s| s.name), Some("fire"));
        let installed = ctl.host().installed_css(TAB);
        assert_eq!(installed.len(), 1);
        assert!(installed[0].contains("padding: 5px;"));
        assert_eq!(ctl.host().page(TAB).overlay_count(), 1);
    }

    #[test]
    fn test_restore_without_selection() {
        let ctl = controller();
        assert_eq!(block_on(ctl.restore_on_load()), Ok(None));
    }

    #[test]
    fn test_no_active_tab() {
        let ctl = controller();
        ctl.host().set_active(None);

        assert_eq!(
            block_on(ctl.inject(neon(), &InjectionSettings::default())),
            Err(InjectionError::NoActiveTab)
        );
        assert_eq!(block_on(ctl.remove()), Err(RemovalError::NoActiveTab));
        assert!(!ctl.storage().contains(keys::CURRENT_CSS));
    }

    #[test]
    fn test_css_install_failure_stops_before_script() {
        let ctl = controller();
        ctl.host().set_fail_css_install(true);

        let err = block_on(ctl.inject(neon(), &InjectionSettings::default())).unwrap_err();
        assert!(matches!(err, InjectionError::CssInstall { tab: TAB, .. }));
        assert!(!ctl
            .host()
            .calls()
            .iter()
            .any(|c| matches!(c, HostCall::RunInPage(..))));
        assert!(!ctl.storage().contains(keys::SELECTED_STYLE));
    }

    #[test]
    fn test_script_failure_leaves_css_installed() {
        let ctl = controller();
        ctl.host().set_fail_scripts(true);

        let err = block_on(ctl.inject(neon(), &InjectionSettings::default())).unwrap_err();
        assert!(matches!(err, InjectionError::ScriptInstall { .. }));
        assert_eq!(ctl.host().installed_css(TAB).len(), 1);
        assert_eq!(ctl.host().page(TAB).overlay_count(), 0);
        assert!(!ctl.storage().contains(keys::CURRENT_CSS));
    }

    #[test]
    fn test_persist_failure_is_reported() {
        let ctl = controller();
        ctl.storage().set_fail_writes(true);

        let err = block_on(ctl.inject(neon(), &InjectionSettings::default())).unwrap_err();
        assert!(matches!(err, InjectionError::Persist(_)));
        assert_eq!(ctl.host().page(TAB).overlay_count(), 1);
    }

    #[test]
    fn test_remove_after_navigation_keeps_storage() {
        let ctl = controller();
        block_on(ctl.inject(neon(), &InjectionSettings::default())).unwrap();
        // A navigation drops injected CSS from the tab.
        ctl.host().open_tab(TAB);

        let err = block_on(ctl.remove()).unwrap_err();
        assert!(matches!(
            err,
            RemovalError::CssRemoval {
                source: HostError::Rejected(_),
                ..
            }
        ));
        assert!(ctl.storage().contains(keys::CURRENT_CSS));
    }

    #[test]
    fn test_css_removal_rejected_keeps_overlay_and_storage() {
        let ctl = controller();
        let css = block_on(ctl.inject(neon(), &InjectionSettings::default())).unwrap();
        ctl.host().set_fail_css_remove(true);

        let err = block_on(ctl.remove()).unwrap_err();
        assert_eq!(
            err,
            RemovalError::CssRemoval {
                tab: TAB,
                source: HostError::Rejected("removal rejected".into()),
            }
        );

        let calls = ctl.host().calls();
        assert!(!calls.contains(&HostCall::RunInPage(TAB, PageScript::RemoveOverlay)));
        assert_eq!(ctl.host().installed_css(TAB), vec![css.clone()]);
        assert_eq!(ctl.host().page(TAB).overlay_count(), 1);
        assert_eq!(ctl.storage().value(keys::SELECTED_STYLE), Some(json!(2)));
        assert_eq!(
            ctl.storage().value(keys::CURRENT_CSS),
            Some(json!(css.as_str()))
        );
    }

    #[test]
    fn test_remove_stops_when_storage_unreadable() {
        let ctl = controller();
        let css = block_on(ctl.inject(neon(), &InjectionSettings::default())).unwrap();
        let before = ctl.host().calls().len();
        ctl.storage().set_fail_reads(true);

        let err = block_on(ctl.remove()).unwrap_err();
        assert!(matches!(err, RemovalError::Persist(StorageError::Read(_))));

        // Only the tab query ran.
        assert_eq!(ctl.host().calls()[before..].to_vec(), vec![HostCall::ActiveTab]);
        assert_eq!(ctl.host().installed_css(TAB), vec![css]);
        assert_eq!(ctl.host().page(TAB).overlay_count(), 1);
        assert!(ctl.storage().contains(keys::CURRENT_CSS));
    }

    #[test]
    fn test_restore_reports_unreadable_storage() {
        let ctl = controller();
        ctl.storage().set_fail_reads(true);

        let err = block_on(ctl.restore_on_load()).unwrap_err();
        assert!(matches!(err, InjectionError::Persist(StorageError::Read(_))));
        assert!(ctl.host().calls().is_empty());
        assert_eq!(ctl.host().phase(TAB), OverlayPhase::Idle);
    }

    #[test]
    fn test_command_reports_unreadable_default_style() {
        let ctl = controller();
        ctl.storage().set_fail_reads(true);

        assert!(matches!(
            block_on(ctl.default_style()),
            Err(InjectionError::Persist(StorageError::Read(_)))
        ));
        assert!(matches!(
            block_on(ctl.handle_command(TOGGLE_COMMAND)),
            Some(Err(InjectionError::Persist(StorageError::Read(_))))
        ));
        assert!(ctl.host().calls().is_empty());
    }

    #[test]
    fn test_switching_styles_keeps_one_overlay() {
        let ctl = controller();
        block_on(ctl.apply_style(StyleId(1))).unwrap();
        let css = block_on(ctl.inject(neon(), &InjectionSettings::default())).unwrap();

        assert_eq!(ctl.host().page(TAB).overlay_count(), 1);
        assert_eq!(ctl.storage().value(keys::SELECTED_STYLE), Some(json!(2)));
        assert_eq!(
            ctl.storage().value(keys::CURRENT_CSS),
            Some(json!(css.as_str()))
        );
    }

    #[test]
    fn test_injected_overlay_tracks_hover() {
        let ctl = controller();
        block_on(ctl.apply_style(StyleId(6))).unwrap();

        let page = ctl.host().page(TAB);
        let button = page.add_element("button", Rect::new(5.0, 5.0, 50.0, 20.0));
        ctl.host().dispatch(TAB, PageEvent::PointerEnter(button));

        assert_eq!(ctl.host().phase(TAB), OverlayPhase::Hovering);
        let overlay = page.find_overlay().unwrap();
        assert!(page.overlay_snapshot(overlay).visible);
    }

    #[test]
    fn test_apply_unknown_style() {
        let ctl = controller();
        assert_eq!(
            block_on(ctl.apply_style(StyleId(77))),
            Err(InjectionError::UnknownStyle(CatalogError::UnknownId(StyleId(77))))
        );
        assert!(ctl.host().calls().is_empty());
    }

    #[test]
    fn test_command_uses_fallback_then_stored_default() {
        let ctl = controller();

        let applied = block_on(ctl.handle_command(TOGGLE_COMMAND)).unwrap().unwrap();
        assert_eq!(applied.name, "neon");

        block_on(ctl.set_default_style("Gold")).unwrap();
        assert_eq!(ctl.storage().value(keys::DEFAULT_STYLE), Some(json!("gold")));

        let applied = block_on(ctl.handle_command(TOGGLE_COMMAND)).unwrap().unwrap();
        assert_eq!(applied.name, "gold");
        assert_eq!(ctl.storage().value(keys::SELECTED_STYLE), Some(json!(5)));
    }

    #[test]
    fn test_unknown_command_is_ignored() {
        let ctl = controller();
        assert!(block_on(ctl.handle_command("open-options")).is_none());
        assert!(ctl.host().calls().is_empty());
    }

    #[test]
    fn test_set_default_style_rejects_unknown_name() {
        let ctl = controller();
        let err = block_on(ctl.set_default_style("plaid")).unwrap_err();
        assert!(matches!(err, InjectionError::UnknownStyle(_)));
        assert!(!ctl.storage().contains(keys::DEFAULT_STYLE));
    }
}
