//! Built-in gradient border styles

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Stable identifier of a catalog style, persisted as `selectedStyle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleId(pub u32);

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named animated border style
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Style {
    /// Stable identifier
    pub id: StyleId,
    /// Lookup name, lowercase
    pub name: &'static str,
    /// Ordered colour stops of the conic sweep
    pub colors: &'static [&'static str],
    /// Suggested rotation period in seconds
    pub animation_duration_secs: f32,
}

impl Style {
    /// Whether the sweep reads the same at 0deg and 360deg
    pub fn is_closed(&self) -> bool {
        self.colors.len() >= 2 && self.colors.first() == self.colors.last()
    }

    /// Static `conic-gradient()` swatch of the style, closing the loop if needed
    pub fn preview_gradient(&self) -> String {
        let mut stops = self.colors.to_vec();
        if !self.is_closed() {
            if let Some(&first) = self.colors.first() {
                stops.push(first);
            }
        }
        format!("conic-gradient(from 0deg, {})", stops.join(", "))
    }
}

const BUILTIN_STYLES: &[Style] = &[
    Style {
        id: StyleId(1),
        name: "rainbow",
        colors: &[
            "rgba(255,0,0,1)",
            "rgba(255,136,0,1)",
            "rgba(255,255,0,1)",
            "rgba(0,255,0,1)",
            "rgba(0,255,255,1)",
            "rgba(0,0,255,1)",
            "rgba(255,0,255,1)",
            "rgba(255,0,0,1)",
        ],
        animation_duration_secs: 3.0,
    },
    Style {
        id: StyleId(2),
        name: "neon",
        colors: &["#ff00ff", "#9500ff", "#00ffff", "#ff00ff"],
        animation_duration_secs: 2.0,
    },
    Style {
        id: StyleId(3),
        name: "cyber",
        colors: &["#00ff00", "#006600", "#00ff00", "#99ff99"],
        animation_duration_secs: 1.0,
    },
    Style {
        id: StyleId(4),
        name: "fire",
        colors: &["#ff0000", "#ff6600", "#ffcc00", "#ff0000"],
        animation_duration_secs: 2.5,
    },
    Style {
        id: StyleId(5),
        name: "gold",
        colors: &["#ffd700", "#ffa500", "#ffdb4d", "#ffd700"],
        animation_duration_secs: 3.5,
    },
    Style {
        id: StyleId(6),
        name: "ocean",
        colors: &["#00ffff", "#0099ff", "#0000ff", "#00ffff"],
        animation_duration_secs: 3.0,
    },
];

/// Read-only table of styles
#[derive(Debug, Clone, Copy)]
pub struct StyleCatalog {
    styles: &'static [Style],
}

impl Default for StyleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StyleCatalog {
    /// The styles shipped with the extension
    pub fn builtin() -> Self {
        Self {
            styles: BUILTIN_STYLES,
        }
    }

    /// All styles in display order
    pub fn iter(&self) -> impl Iterator<Item = &'static Style> {
        self.styles.iter()
    }

    /// Number of styles
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Find a style by id
    pub fn get(&self, id: StyleId) -> Option<&'static Style> {
        self.styles.iter().find(|s| s.id == id)
    }

    /// Find a style by name, ignoring case
    pub fn find_by_name(&self, name: &str) -> Option<&'static Style> {
        let name = name.trim();
        self.styles
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Like [`get`](Self::get) but reports a miss as an error
    pub fn lookup(&self, id: StyleId) -> Result<&'static Style, CatalogError> {
        self.get(id).ok_or(CatalogError::UnknownId(id))
    }

    /// Like [`find_by_name`](Self::find_by_name) but reports a miss as an error
    pub fn lookup_name(&self, name: &str) -> Result<&'static Style, CatalogError> {
        self.find_by_name(name)
            .ok_or_else(|| CatalogError::UnknownName(name.to_string()))
    }
}
