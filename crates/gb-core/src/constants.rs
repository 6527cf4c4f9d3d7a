//! Global constants for gb-core

/// Class name of the overlay element injected into the page
pub const OVERLAY_CLASS: &str = "border-box";

/// Class toggled on the overlay element while it should be shown
pub const VISIBLE_CLASS: &str = "visible";

/// Registered custom property driving the conic sweep
pub const ANGLE_PROPERTY: &str = "--angle";

/// Keyframes name rotating [`ANGLE_PROPERTY`] through a full turn
pub const ROTATE_KEYFRAMES: &str = "borderRotate";

/// Stacking order of the overlay element
pub const OVERLAY_Z_INDEX: u32 = 99_999_999;

/// Duration of the overlay geometry transition in seconds
pub const OVERLAY_TRANSITION_SECS: f32 = 0.15;

/// Glow blur radius used when no blur override is configured (px)
pub const DEFAULT_GLOW_BLUR_PX: u32 = 20;

/// Glow opacity used when no opacity override is configured
pub const DEFAULT_GLOW_OPACITY: f32 = 0.2;

/// Glow brightness multiplier
pub const GLOW_BRIGHTNESS: f32 = 1.2;

/// Keyboard command that applies the default style
pub const TOGGLE_COMMAND: &str = "toggle-border-animation";

/// Human readable shortcut bound to [`TOGGLE_COMMAND`] in the manifest
pub const TOGGLE_SHORTCUT: &str = "Alt+Shift+B";

/// Style applied by the keyboard command when no default was chosen
pub const FALLBACK_DEFAULT_STYLE: &str = "neon";

/// How long a transient notice stays on screen (ms)
pub const NOTICE_TIMEOUT_MS: u32 = 3000;

/// Maximum number of colours in a saved gradient preset
pub const MAX_PRESET_COLORS: usize = 10;

/// Default transparent gap of a preset, as a percentage of the circle
pub const DEFAULT_TRANSPARENCY_SPREAD: u8 = 25;

/// Largest preset id; ids stay exact when they pass through a JavaScript number
pub const MAX_PRESET_ID: u64 = (1 << 53) - 1;
