//! Gradient Border Core
//!
//! Platform-independent logic for the gradient border extension: the style
//! catalog, overlay CSS generation, the in-page overlay agent, and the
//! controllers that install and remove a style in the active tab.
//!
//! Browser access goes through the [`BrowserHost`] and [`StorageArea`]
//! traits so the same controllers run against the real extension APIs in
//! wasm and against in-memory fakes in tests.

pub mod agent;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod controller;
pub mod css;
pub mod error;
pub mod host;
pub mod notice;
pub mod preset;
pub mod settings;
pub mod storage;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use agent::{
    HoverState, OverlayAgent, OverlayGeometry, OverlayPhase, PageDom, PageEvent, Rect,
    remove_overlay,
};
pub use catalog::{Style, StyleCatalog, StyleId};
pub use config::ExtensionConfig;
pub use controller::StyleController;
pub use css::{OverlayCss, StyleSheet, build_css};
pub use error::{
    CatalogError, DomError, HostError, InjectionError, PresetError, RemovalError, StorageError,
};
pub use host::{BrowserHost, PageScript, TabId};
pub use notice::{Notice, NoticeKind};
pub use preset::{GradientPreset, PresetLibrary};
pub use settings::InjectionSettings;
pub use storage::{MemoryStorage, PersistedSelection, StorageArea};
