//! Saved gradient presets
//!
//! Presets are user-authored colour lists stored under `savedGradients` and
//! exchanged as a pretty-printed JSON array.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_TRANSPARENCY_SPREAD, MAX_PRESET_COLORS, MAX_PRESET_ID};
use crate::error::PresetError;
use crate::storage::{StorageArea, StorageRecord, keys, read_value, write_value};

/// A named gradient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientPreset {
    /// Library-unique id
    #[serde(default)]
    pub id: u64,
    /// Display name
    pub name: String,
    /// Colour stops, evenly spread around the circle
    pub colors: Vec<String>,
    /// Leave a transparent gap at 0deg
    #[serde(default)]
    pub is_transparent: bool,
    /// Width of the gap as a percentage of the circle
    #[serde(default = "default_spread")]
    pub transparency_spread: u8,
}

fn default_spread() -> u8 {
    DEFAULT_TRANSPARENCY_SPREAD
}

impl GradientPreset {
    /// Create a validated opaque preset
    pub fn new(
        id: u64,
        name: impl Into<String>,
        colors: Vec<String>,
    ) -> Result<Self, PresetError> {
        let preset = Self {
            id,
            name: name.into().trim().to_string(),
            colors,
            is_transparent: false,
            transparency_spread: DEFAULT_TRANSPARENCY_SPREAD,
        };
        preset.validate()?;
        Ok(preset)
    }

    /// Enable the transparent gap
    pub fn with_transparency(mut self, spread: u8) -> Result<Self, PresetError> {
        self.is_transparent = true;
        self.transparency_spread = spread;
        self.validate()?;
        Ok(self)
    }

    /// Check name, colour count and spread
    pub fn validate(&self) -> Result<(), PresetError> {
        if self.name.trim().is_empty() {
            return Err(PresetError::EmptyName);
        }
        if self.colors.is_empty() {
            return Err(PresetError::NoColors);
        }
        if self.colors.len() > MAX_PRESET_COLORS {
            return Err(PresetError::TooManyColors(self.colors.len()));
        }
        if self.transparency_spread > 100 {
            return Err(PresetError::InvalidSpread(self.transparency_spread));
        }
        Ok(())
    }

    /// Conic gradient stops
    ///
    /// Opaque presets close the loop by repeating the first colour.
    /// Transparent presets fade out around 0deg over `transparency_spread`
    /// percent of the circle. Non-hex colours fade through transparent black.
    pub fn conic_stops(&self) -> Vec<String> {
        let (Some(first), Some(last)) = (self.colors.first(), self.colors.last()) else {
            return Vec::new();
        };

        if !self.is_transparent {
            let mut stops = self.colors.clone();
            stops.push(first.clone());
            return stops;
        }

        let spread = 360.0 * f32::from(self.transparency_spread) / 100.0;
        let half = spread / 2.0;
        let fade = half / 3.0;
        let count = self.colors.len() as f32;

        // Fade edges use the neighbouring colour at zero alpha.
        let fade_in = rgba_from_hex(first, 0.0);
        let fade_out = rgba_from_hex(last, 0.0);
        let mut stops = vec![
            format!("{fade_in} 0deg"),
            format!("{fade_in} {}deg", half - fade),
            format!("{first} {half}deg"),
        ];
        stops.extend(self.colors.iter().enumerate().map(|(i, color)| {
            let position = i as f32 / count * (360.0 - spread) + half;
            format!("{color} {position}deg")
        }));
        stops.push(format!("{last} {}deg", 360.0 - half));
        stops.push(format!("{fade_out} {}deg", 360.0 - half + fade));
        stops.push(format!("{fade_out} 360deg"));
        stops
    }

    /// CSS background for a static preview swatch
    pub fn conic_gradient(&self) -> String {
        format!("conic-gradient(from 0deg, {})", self.conic_stops().join(", "))
    }
}

/// Parse `#rgb` or `#rrggbb`
pub fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    let digits = hex.trim().trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };

    let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// `rgba(r,g,b,a)` for a hex colour; unparsable input becomes black
pub fn rgba_from_hex(hex: &str, alpha: f32) -> String {
    let [r, g, b] = parse_hex(hex).unwrap_or([0, 0, 0]);
    format!("rgba({r},{g},{b},{alpha})")
}

fn usable_id(id: u64, taken: &HashSet<u64>) -> bool {
    (1..=MAX_PRESET_ID).contains(&id) && !taken.contains(&id)
}

/// One past the highest id in use, or the lowest free id once that runs out
fn fresh_id(taken: &HashSet<u64>) -> Result<u64, PresetError> {
    let after_max = taken
        .iter()
        .max()
        .map_or(Some(1), |max| max.checked_add(1))
        .filter(|id| *id <= MAX_PRESET_ID);
    after_max
        .or_else(|| (1..=MAX_PRESET_ID).find(|id| !taken.contains(id)))
        .ok_or(PresetError::IdsExhausted)
}

/// An ordered collection of presets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresetLibrary {
    presets: Vec<GradientPreset>,
}

impl PresetLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of presets
    pub fn len(&self) -> usize {
        self.presets.len()
    }

    /// Check if the library is empty
    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// All presets in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &GradientPreset> {
        self.presets.iter()
    }

    /// Find a preset by id
    pub fn get(&self, id: u64) -> Option<&GradientPreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    fn taken_ids(&self) -> HashSet<u64> {
        self.presets.iter().map(|p| p.id).collect()
    }

    /// Add a preset built from `name` and `colors`; returns its id
    pub fn add(
        &mut self,
        name: &str,
        colors: Vec<String>,
        transparency: Option<u8>,
    ) -> Result<u64, PresetError> {
        let id = fresh_id(&self.taken_ids())?;
        let mut preset = GradientPreset::new(id, name, colors)?;
        if let Some(spread) = transparency {
            preset = preset.with_transparency(spread)?;
        }
        let id = preset.id;
        self.presets.push(preset);
        Ok(id)
    }

    /// Delete a preset by id
    pub fn delete(&mut self, id: u64) -> Option<GradientPreset> {
        let index = self.presets.iter().position(|p| p.id == id)?;
        Some(self.presets.remove(index))
    }

    /// Presets whose name contains `query`, ignoring case
    pub fn search(&self, query: &str) -> Vec<&GradientPreset> {
        let query = query.trim().to_lowercase();
        self.presets
            .iter()
            .filter(|p| query.is_empty() || p.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Pretty-printed JSON array of every preset
    pub fn export_json(&self) -> Result<String, PresetError> {
        Ok(serde_json::to_string_pretty(&self.presets)?)
    }

    /// Append presets from a JSON array; returns how many were added
    ///
    /// Nothing is added if any entry is invalid. Entries whose id is missing,
    /// out of range or already taken get a fresh id.
    pub fn import_json(&mut self, text: &str) -> Result<usize, PresetError> {
        let imported: Vec<GradientPreset> = serde_json::from_str(text)?;
        for preset in &imported {
            preset.validate()?;
        }

        let mut taken = self.taken_ids();
        let mut accepted = Vec::with_capacity(imported.len());
        for mut preset in imported {
            if !usable_id(preset.id, &taken) {
                preset.id = fresh_id(&taken)?;
            }
            taken.insert(preset.id);
            accepted.push(preset);
        }

        let count = accepted.len();
        self.presets.extend(accepted);

        tracing::info!(count, "Imported gradient presets");
        Ok(count)
    }

    /// Read the library from storage
    pub async fn load(storage: &impl StorageArea) -> Result<Self, PresetError> {
        let record = storage.get(&[keys::SAVED_GRADIENTS]).await?;
        let stored: Vec<GradientPreset> =
            read_value(&record, keys::SAVED_GRADIENTS)?.unwrap_or_default();

        let mut library = Self::new();
        let mut taken = HashSet::new();
        for mut preset in stored {
            if !usable_id(preset.id, &taken) {
                let id = fresh_id(&taken)?;
                tracing::warn!(old = preset.id, new = id, "Renumbering stored preset");
                preset.id = id;
            }
            taken.insert(preset.id);
            library.presets.push(preset);
        }
        Ok(library)
    }

    /// Write the library to storage
    pub async fn save(&self, storage: &impl StorageArea) -> Result<(), PresetError> {
        let mut record = StorageRecord::new();
        write_value(&mut record, keys::SAVED_GRADIENTS, &self.presets)?;
        storage.set(record).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use futures::executor::block_on;

    fn colors(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_opaque_stops_close_the_loop() {
        let preset = GradientPreset::new(1, "Sunset", colors(&["#f00", "#0f0"])).unwrap();
        assert_eq!(preset.conic_stops(), colors(&["#f00", "#0f0", "#f00"]));
        assert_eq!(
            preset.conic_gradient(),
            "conic-gradient(from 0deg, #f00, #0f0, #f00)"
        );
    }

    #[test]
    fn test_transparent_stops() {
        let preset = GradientPreset::new(1, "Gap", colors(&["red", "blue"]))
            .unwrap()
            .with_transparency(25)
            .unwrap();
        let stops = preset.conic_stops();
        assert_eq!(
            stops,
            colors(&[
                "rgba(0,0,0,0) 0deg",
                "rgba(0,0,0,0) 30deg",
                "red 45deg",
                "red 45deg",
                "blue 180deg",
                "blue 315deg",
                "rgba(0,0,0,0) 330deg",
                "rgba(0,0,0,0) 360deg",
            ])
        );
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            GradientPreset::new(1, "  ", colors(&["red"])),
            Err(PresetError::EmptyName)
        );
        assert_eq!(
            GradientPreset::new(1, "x", Vec::new()),
            Err(PresetError::NoColors)
        );
        assert_eq!(
            GradientPreset::new(1, "x", vec!["red".to_string(); 11]),
            Err(PresetError::TooManyColors(11))
        );
        let preset = GradientPreset::new(1, "x", colors(&["red"])).unwrap();
        assert_eq!(
            preset.with_transparency(120),
            Err(PresetError::InvalidSpread(120))
        );
    }

    #[test]
    fn test_hex_helpers() {
        assert_eq!(parse_hex("#fff"), Some([255, 255, 255]));
        assert_eq!(parse_hex("0099ff"), Some([0, 153, 255]));
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
        assert_eq!(rgba_from_hex("#ff8800", 1.0), "rgba(255,136,0,1)");
        assert_eq!(rgba_from_hex("nope", 0.0), "rgba(0,0,0,0)");
    }

    #[test]
    fn test_transparent_hex_stops_fade_through_own_colour() {
        let preset = GradientPreset::new(1, "Dusk", colors(&["#ff8800", "#0099ff"]))
            .unwrap()
            .with_transparency(50)
            .unwrap();
        let stops = preset.conic_stops();
        assert_eq!(stops.first().unwrap(), "rgba(255,136,0,0) 0deg");
        assert_eq!(stops[2], "#ff8800 90deg");
        assert_eq!(stops.last().unwrap(), "rgba(0,153,255,0) 360deg");
    }

    #[test]
    fn test_add_delete_search() {
        let mut library = PresetLibrary::new();
        let a = library.add("Ocean Deep", colors(&["#00f", "#0ff"]), None).unwrap();
        let b = library.add("Lava", colors(&["#f00"]), Some(30)).unwrap();
        assert_eq!((a, b), (1, 2));

        assert_eq!(library.search("OCEAN").len(), 1);
        assert_eq!(library.search("").len(), 2);
        assert!(library.get(b).unwrap().is_transparent);

        assert_eq!(library.delete(a).map(|p| p.name), Some("Ocean Deep".to_string()));
        assert!(library.delete(a).is_none());
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_import_appends_and_renumbers() {
        let mut library = PresetLibrary::new();
        library.add("Mine", colors(&["#000"]), None).unwrap();

        let json = r##"[
            { "id": 1, "name": "Clash", "colors": ["#111"] },
            { "name": "NoId", "colors": ["#222", "#333"], "isTransparent": true, "transparencySpread": 40 }
        ]"##;
        assert_eq!(library.import_json(json).unwrap(), 2);

        let ids: Vec<u64> = library.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(library.get(3).unwrap().transparency_spread, 40);
        assert_eq!(library.get(2).unwrap().transparency_spread, 25);
    }

    #[test]
    fn test_import_renumbers_ids_out_of_js_range() {
        let mut library = PresetLibrary::new();
        let json = r##"[
            { "id": 18446744073709551615, "name": "Max", "colors": ["#111"] },
            { "id": 9007199254740991, "name": "Edge", "colors": ["#222"] },
            { "name": "After", "colors": ["#333"] }
        ]"##;
        assert_eq!(library.import_json(json).unwrap(), 3);

        let ids: Vec<u64> = library.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, MAX_PRESET_ID, 2]);
        assert!(ids.iter().all(|id| *id as f64 as u64 == *id));

        let added = library.add("Next", colors(&["#444"]), None).unwrap();
        assert_eq!(added, 3);
    }

    #[test]
    fn test_load_renumbers_duplicate_and_oversized_ids() {
        let mut values = StorageRecord::new();
        values.insert(
            keys::SAVED_GRADIENTS.into(),
            serde_json::json!([
                { "id": 4, "name": "A", "colors": ["#111"] },
                { "id": 4, "name": "B", "colors": ["#222"] },
                { "id": 18446744073709551615u64, "name": "C", "colors": ["#333"] }
            ]),
        );
        let storage = MemoryStorage::with_values(values);

        let library = block_on(PresetLibrary::load(&storage)).unwrap();
        let ids: Vec<u64> = library.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![4, 5, 6]);
    }

    #[test]
    fn test_import_rejects_invalid_entries() {
        let mut library = PresetLibrary::new();
        let err = library
            .import_json(r#"[{ "name": "ok", "colors": ["red"] }, { "name": "", "colors": ["red"] }]"#)
            .unwrap_err();
        assert_eq!(err, PresetError::EmptyName);
        assert!(library.is_empty());
        assert!(matches!(library.import_json("{"), Err(PresetError::Json(_))));
    }

    #[test]
    fn test_export_then_storage_round_trip() {
        let mut library = PresetLibrary::new();
        library.add("Neon", colors(&["#ff00ff", "#00ffff"]), None).unwrap();

        let exported = library.export_json().unwrap();
        assert!(exported.contains("\"isTransparent\": false"));
        assert!(exported.contains("\"transparencySpread\": 25"));

        let storage = MemoryStorage::new();
        block_on(library.save(&storage)).unwrap();
        assert_eq!(block_on(PresetLibrary::load(&storage)).unwrap(), library);
    }
}
