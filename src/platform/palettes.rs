//! Palette registry for loading and accessing color palettes
//!
//! Loads palettes from palettes.json (embedded at compile time) and provides
//! access by name. All palettes are categorical: discrete colors for distinct
//! series, repeating after the list is exhausted.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

/// Embedded palettes.json content
const PALETTES_JSON: &str = include_str!("../../palettes.json");

/// Global palette registry, initialized lazily on first access
pub static PALETTE_REGISTRY: Lazy<PaletteRegistry> = Lazy::new(|| {
    PaletteRegistry::from_json(PALETTES_JSON).unwrap_or_else(|e| {
        tracing::error!("Failed to load palettes.json: {}", e);
        PaletteRegistry::default()
    })
});

/// Default categorical palette name (15 hues, generated for maximum contrast)
pub const DEFAULT_CATEGORICAL_PALETTE: &str = "Isoviz";

/// Fill used when a palette has no usable colors
const FALLBACK_COLOR: &str = "#808080";

/// A single palette definition from palettes.json
#[derive(Debug, Clone, Deserialize)]
pub struct PaletteDefinition {
    pub name: String,
    pub colors: Vec<String>,
}

impl PaletteDefinition {
    /// Get a color by index as `#rrggbb` (wraps around)
    pub fn get_color(&self, index: usize) -> String {
        if self.colors.is_empty() {
            return FALLBACK_COLOR.to_string();
        }
        let idx = index % self.colors.len();
        parse_hex_color(&self.colors[idx])
            .map(|[r, g, b]| format!("#{:02x}{:02x}{:02x}", r, g, b))
            .unwrap_or_else(|| FALLBACK_COLOR.to_string())
    }

    /// Get the number of colors in this palette
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the palette is empty
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Registry of all available palettes
#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    /// All palettes by name (lowercase keys for case-insensitive lookup)
    palettes: HashMap<String, PaletteDefinition>,
    /// Palette names in file order (for listing)
    names: Vec<String>,
}

impl PaletteRegistry {
    /// Load palettes from JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        let definitions: Vec<PaletteDefinition> = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse palettes JSON: {}", e))?;

        let mut registry = Self::default();

        for def in definitions {
            registry.names.push(def.name.clone());
            registry.palettes.insert(def.name.to_lowercase(), def);
        }

        tracing::debug!(
            "PaletteRegistry: loaded {} palettes",
            registry.palettes.len()
        );

        Ok(registry)
    }

    /// Get a palette by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&PaletteDefinition> {
        self.palettes.get(&name.to_lowercase())
    }

    /// Get the default categorical palette
    pub fn default_categorical(&self) -> Option<&PaletteDefinition> {
        self.get(DEFAULT_CATEGORICAL_PALETTE)
    }

    /// Get a palette by name, falling back to the default for unknown or
    /// empty palettes
    pub fn categorical_or_default(&self, name: &str) -> Option<&PaletteDefinition> {
        match self.get(name) {
            Some(p) if !p.is_empty() => Some(p),
            _ => {
                tracing::warn!(
                    "'{}' is not a usable palette, using '{}'",
                    name,
                    DEFAULT_CATEGORICAL_PALETTE
                );
                self.default_categorical()
            }
        }
    }

    /// List all palette names
    pub fn categorical_palettes(&self) -> &[String] {
        &self.names
    }
}

/// Parse a hex color string to RGB array
///
/// Supports formats:
/// - `#RRGGBB` (6 hex digits)
/// - `#RRGGBBAA` (8 hex digits, alpha ignored)
/// - `RRGGBB` / `RRGGBBAA` (without #)
fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim_start_matches('#');

    if hex.len() != 6 && hex.len() != 8 {
        tracing::warn!("Invalid hex color length '{}': {}", hex, hex.len());
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some([r, g, b])
}
