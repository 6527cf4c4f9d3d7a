//! User-tunable border parameters

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage::{StorageArea, StorageRecord, keys, read_value, write_value};

/// Slider bounds for one tunable, as offered by the options page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRange {
    /// Smallest accepted value
    pub min: f32,
    /// Largest accepted value
    pub max: f32,
    /// Value offered when nothing is stored
    pub default: f32,
    /// Slider increment
    pub step: f32,
}

impl ControlRange {
    /// Clamp `value` into the range
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Check whether `value` lies inside the range
    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Ring width slider
pub const BORDER_WIDTH_RANGE: ControlRange = ControlRange {
    min: 1.0,
    max: 10.0,
    default: 3.0,
    step: 1.0,
};

/// Rotation period slider
pub const DURATION_RANGE: ControlRange = ControlRange {
    min: 0.5,
    max: 10.0,
    default: 3.0,
    step: 0.5,
};

/// Glow blur slider
pub const BLUR_RANGE: ControlRange = ControlRange {
    min: 0.0,
    max: 20.0,
    default: 10.0,
    step: 1.0,
};

/// Glow opacity slider
pub const OPACITY_RANGE: ControlRange = ControlRange {
    min: 0.0,
    max: 1.0,
    default: 0.2,
    step: 0.1,
};

/// Glow spread slider
pub const SPREAD_RANGE: ControlRange = ControlRange {
    min: 1.0,
    max: 20.0,
    default: 6.0,
    step: 1.0,
};

/// Parameters applied on top of a catalog style at injection time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionSettings {
    /// Crisp ring width in px
    pub border_width_px: u32,
    /// Period of one rotation in seconds
    pub animation_speed_secs: f32,
    /// Glow blur override in px
    pub blur_px: Option<u32>,
    /// Glow opacity override
    pub glow_opacity: Option<f32>,
    /// Glow spread override in px
    pub spread_px: Option<u32>,
}

impl Default for InjectionSettings {
    /// Popup defaults, used when nothing has been stored
    fn default() -> Self {
        Self {
            border_width_px: 1,
            animation_speed_secs: 2.0,
            blur_px: None,
            glow_opacity: None,
            spread_px: None,
        }
    }
}

impl InjectionSettings {
    /// Defaults offered by the options page sliders
    pub fn options_defaults() -> Self {
        Self {
            border_width_px: BORDER_WIDTH_RANGE.default as u32,
            animation_speed_secs: DURATION_RANGE.default,
            blur_px: Some(BLUR_RANGE.default as u32),
            glow_opacity: Some(OPACITY_RANGE.default),
            spread_px: Some(SPREAD_RANGE.default as u32),
        }
    }

    /// Clamp every value into its slider range
    pub fn clamped(&self) -> Self {
        let clamp_px = |range: &ControlRange, v: u32| range.clamp(v as f32).round() as u32;
        Self {
            border_width_px: clamp_px(&BORDER_WIDTH_RANGE, self.border_width_px),
            animation_speed_secs: DURATION_RANGE.clamp(self.animation_speed_secs),
            blur_px: self.blur_px.map(|v| clamp_px(&BLUR_RANGE, v)),
            glow_opacity: self.glow_opacity.map(|v| OPACITY_RANGE.clamp(v)),
            spread_px: self.spread_px.map(|v| clamp_px(&SPREAD_RANGE, v)),
        }
    }

    /// Build settings from a storage record, falling back to defaults per key
    ///
    /// Malformed entries are treated as absent.
    pub fn from_record(record: &StorageRecord) -> Self {
        fn or_absent<T>(result: Result<Option<T>, StorageError>) -> Option<T> {
            result.unwrap_or_else(|e| {
                tracing::warn!("Ignoring stored setting: {}", e);
                None
            })
        }

        let defaults = Self::default();
        Self {
            border_width_px: or_absent(read_value(record, keys::BORDER_WIDTH))
                .unwrap_or(defaults.border_width_px),
            animation_speed_secs: or_absent(read_value(record, keys::ANIMATION_SPEED))
                .unwrap_or(defaults.animation_speed_secs),
            blur_px: or_absent(read_value(record, keys::BLUR)),
            glow_opacity: or_absent(read_value(record, keys::GLOW_OPACITY)),
            spread_px: or_absent(read_value(record, keys::SPREAD)),
        }
        .clamped()
    }

    /// Read settings from storage
    pub async fn load(storage: &impl StorageArea) -> Result<Self, StorageError> {
        let record = storage
            .get(&[
                keys::BORDER_WIDTH,
                keys::ANIMATION_SPEED,
                keys::BLUR,
                keys::GLOW_OPACITY,
                keys::SPREAD,
            ])
            .await?;
        Ok(Self::from_record(&record))
    }

    /// Persist settings; unset glow overrides are removed from storage
    pub async fn save(&self, storage: &impl StorageArea) -> Result<(), StorageError> {
        let settings = self.clamped();
        let mut record = StorageRecord::new();
        write_value(&mut record, keys::BORDER_WIDTH, &settings.border_width_px)?;
        write_value(
            &mut record,
            keys::ANIMATION_SPEED,
            &settings.animation_speed_secs,
        )?;

        let mut cleared = Vec::new();
        match settings.blur_px {
            Some(blur) => write_value(&mut record, keys::BLUR, &blur)?,
            None => cleared.push(keys::BLUR),
        }
        match settings.glow_opacity {
            Some(opacity) => write_value(&mut record, keys::GLOW_OPACITY, &opacity)?,
            None => cleared.push(keys::GLOW_OPACITY),
        }
        match settings.spread_px {
            Some(spread) => write_value(&mut record, keys::SPREAD, &spread)?,
            None => cleared.push(keys::SPREAD),
        }

        storage.set(record).await?;
        if !cleared.is_empty() {
            storage.remove(&cleared).await?;
        }
        Ok(())
    }
}
