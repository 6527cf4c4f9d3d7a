//! Overlay stylesheet generation
//!
//! The generated text is installed into the page verbatim and must later be
//! removed with byte-identical text, so [`StyleSheet`] is persisted as-is and
//! never regenerated for removal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ANGLE_PROPERTY, DEFAULT_GLOW_BLUR_PX, DEFAULT_GLOW_OPACITY, GLOW_BRIGHTNESS, OVERLAY_CLASS,
    OVERLAY_TRANSITION_SECS, OVERLAY_Z_INDEX, ROTATE_KEYFRAMES, VISIBLE_CLASS,
};
use crate::settings::InjectionSettings;

/// CSS text exactly as it was (or will be) installed in a tab
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleSheet(String);

impl StyleSheet {
    /// The raw text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the raw text
    pub fn into_string(self) -> String {
        self.0
    }

    /// Check whether the text contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }
}

impl From<String> for StyleSheet {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl AsRef<str> for StyleSheet {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parameters of the overlay stylesheet
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayCss<'a, S: AsRef<str>> {
    /// Conic sweep colours, in order
    pub colors: &'a [S],
    /// Width of the crisp ring in px
    pub border_width_px: u32,
    /// Period of one full rotation in seconds
    pub animation_speed_secs: f32,
    /// Glow blur radius in px
    pub glow_blur_px: u32,
    /// Glow opacity
    pub glow_opacity: f32,
    /// How far the glow extends beyond the element in px
    pub glow_spread_px: u32,
}

impl<'a, S: AsRef<str>> OverlayCss<'a, S> {
    /// Stylesheet with the default glow
    pub fn new(colors: &'a [S], border_width_px: u32, animation_speed_secs: f32) -> Self {
        Self {
            colors,
            border_width_px,
            animation_speed_secs,
            glow_blur_px: DEFAULT_GLOW_BLUR_PX,
            glow_opacity: DEFAULT_GLOW_OPACITY,
            glow_spread_px: border_width_px,
        }
    }

    /// Stylesheet honouring every tunable in `settings`
    pub fn build(colors: &'a [S], settings: &InjectionSettings) -> Self {
        let base = Self::new(
            colors,
            settings.border_width_px,
            settings.animation_speed_secs,
        );
        Self {
            glow_blur_px: settings.blur_px.unwrap_or(base.glow_blur_px),
            glow_opacity: settings.glow_opacity.unwrap_or(base.glow_opacity),
            glow_spread_px: settings.spread_px.unwrap_or(base.glow_spread_px),
            ..base
        }
    }

    fn gradient(&self) -> String {
        let stops = self
            .colors
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ");
        format!("conic-gradient(from var({ANGLE_PROPERTY}), {stops})")
    }

    /// Render the stylesheet text
    pub fn render(&self) -> StyleSheet {
        let gradient = self.gradient();
        let width = self.border_width_px;
        let spread = self.glow_spread_px;
        let speed = self.animation_speed_secs;
        let blur = self.glow_blur_px;
        let opacity = self.glow_opacity;

        let text = format!(
            r#"
.{OVERLAY_CLASS} {{
  position: fixed;
  pointer-events: none;
  z-index: {OVERLAY_Z_INDEX};
  transition: all {OVERLAY_TRANSITION_SECS}s ease;
  visibility: hidden;
  top: 0;
  left: 0;
  transform: translate3d(0, 0, 0);
}}

.{OVERLAY_CLASS}.{VISIBLE_CLASS} {{
  visibility: visible;
}}

.{OVERLAY_CLASS}::after {{
  content: '';
  position: absolute;
  inset: calc(-1 * {width}px);
  border-radius: inherit;
  opacity: 1;
  background: {gradient};
  animation: {ROTATE_KEYFRAMES} {speed}s linear infinite;
  padding: {width}px;
  -webkit-mask: linear-gradient(#fff 0 0) content-box, linear-gradient(#fff 0 0);
  -webkit-mask-composite: exclude;
  mask: linear-gradient(#fff 0 0) content-box, linear-gradient(#fff 0 0);
  mask-composite: exclude;
  z-index: -1;
}}

.{OVERLAY_CLASS}::before {{
  content: '';
  position: absolute;
  inset: calc(-1 * {spread}px);
  border-radius: inherit;
  opacity: 1;
  background: {gradient};
  animation: {ROTATE_KEYFRAMES} {speed}s linear infinite;
  padding: {width}px;
  filter: blur({blur}px) brightness({GLOW_BRIGHTNESS}) opacity({opacity});
}}

@property {ANGLE_PROPERTY} {{
  syntax: "<angle>";
  initial-value: 0deg;
  inherits: false;
}}

@keyframes {ROTATE_KEYFRAMES} {{
  from {{ {ANGLE_PROPERTY}: 0deg }}
  to {{ {ANGLE_PROPERTY}: 360deg }}
}}
"#
        );
        StyleSheet(text)
    }
}

/// Build the overlay stylesheet for a colour list, ring width and rotation period
pub fn build_css<S: AsRef<str>>(
    colors: &[S],
    border_width_px: u32,
    animation_speed_secs: f32,
) -> StyleSheet {
    OverlayCss::new(colors, border_width_px, animation_speed_secs).render()
}
