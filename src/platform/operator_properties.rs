//! Processor option definitions with defaults from operator.json
//!
//! This module parses operator.json (embedded at compile time) to extract
//! option definitions and their default values. Defaults live in ONE place
//! (operator.json); nothing in the processors hardcodes a fallback.

use super::properties::ParameterSet;
use std::collections::HashMap;

/// Operator.json embedded at compile time
const OPERATOR_JSON: &str = include_str!("../../operator.json");

/// Property definition from operator.json
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    /// Processor type the option belongs to
    pub processor: String,
    pub default_value: String,
    pub description: String,
    /// For EnumeratedProperty, the valid values
    pub valid_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Enumerated,
    Boolean,
    Double,
}

/// Registry of all processor options with their defaults from operator.json
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
    /// Option names in declaration order
    order: Vec<String>,
}

impl PropertyRegistry {
    /// Parse operator.json and build the registry
    ///
    /// This is called once at startup. Panics if operator.json is malformed
    /// (which should never happen since it's compile-time embedded).
    pub fn from_operator_json() -> Self {
        Self::from_json(OPERATOR_JSON)
    }

    fn from_json(json: &str) -> Self {
        let json: serde_json::Value =
            serde_json::from_str(json).expect("operator.json is invalid JSON");

        let properties_array = json["properties"]
            .as_array()
            .expect("operator.json missing 'properties' array");

        let mut properties = HashMap::new();
        let mut order = Vec::new();

        for prop in properties_array {
            let name = prop["name"]
                .as_str()
                .expect("property missing 'name'")
                .to_string();

            let kind_str = prop["kind"].as_str().expect("property missing 'kind'");
            let kind = match kind_str {
                "StringProperty" => PropertyKind::String,
                "EnumeratedProperty" => PropertyKind::Enumerated,
                "BooleanProperty" => PropertyKind::Boolean,
                "DoubleProperty" => PropertyKind::Double,
                other => panic!("Unknown property kind: {}", other),
            };

            let processor = prop["processor"].as_str().unwrap_or("").to_string();
            let default_value = prop["defaultValue"].as_str().unwrap_or("").to_string();
            let description = prop["description"].as_str().unwrap_or("").to_string();

            let valid_values = if kind == PropertyKind::Enumerated {
                prop["values"].as_array().map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(|s| s.to_string()))
                        .collect()
                })
            } else {
                None
            };

            order.push(name.clone());
            properties.insert(
                name.clone(),
                PropertyDef {
                    name,
                    kind,
                    processor,
                    default_value,
                    description,
                    valid_values,
                },
            );
        }

        Self { properties, order }
    }

    /// Get the default value for a property
    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    /// Get the property definition
    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// All options of one processor, in declaration order
    pub fn properties_for(&self, processor: &str) -> Vec<&PropertyDef> {
        self.order
            .iter()
            .filter_map(|name| self.properties.get(name))
            .filter(|p| p.processor == processor)
            .collect()
    }

    /// Check if a value is valid for an enumerated property
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.valid_values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true) // Non-enumerated properties accept any value
    }
}

/// Global registry instance (initialized lazily)
static REGISTRY: std::sync::OnceLock<PropertyRegistry> = std::sync::OnceLock::new();

/// Get the global property registry
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(PropertyRegistry::from_operator_json)
}

/// Typed processor option reader
///
/// Reads user parameters, using defaults from operator.json for anything
/// unset or invalid.
pub struct OperatorPropertyReader<'a> {
    /// User-set values
    params: &'a ParameterSet,
}

impl<'a> OperatorPropertyReader<'a> {
    pub fn new(params: &'a ParameterSet) -> Self {
        Self { params }
    }

    /// Get string property (user value or default from operator.json)
    pub fn get_string(&self, name: &str) -> String {
        if let Some(value) = self.params.get_raw(name) {
            return value.to_string();
        }

        registry().get_default(name).unwrap_or("").to_string()
    }

    /// Get optional string property (None if empty)
    pub fn get_optional_string(&self, name: &str) -> Option<String> {
        let value = self.get_string(name);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Get a comma-separated list property
    pub fn get_list(&self, name: &str) -> Vec<String> {
        self.get_string(name)
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }

    /// Get enumerated property with validation
    ///
    /// Returns the user-set value if valid, otherwise returns the default.
    /// Logs a warning if the user value is invalid.
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = reg.get_default(name).unwrap_or("");

        if let Some(value) = self.params.get_raw(name) {
            if reg.is_valid_enum_value(name, value) {
                return value.to_lowercase();
            }
            let valid_values = reg
                .get_property(name)
                .and_then(|p| p.valid_values.as_ref())
                .map(|v| v.join(", "))
                .unwrap_or_default();
            tracing::warn!(
                "Invalid value '{}' for option '{}'. Valid values: [{}]. Using default: '{}'",
                value,
                name,
                valid_values,
                default
            );
        }

        default.to_string()
    }

    /// Get boolean property ("true"/"false", also 1/0 and yes/no)
    pub fn get_bool(&self, name: &str) -> bool {
        let default = parse_bool(registry().get_default(name).unwrap_or("false")).unwrap_or(false);

        match self.params.get_raw(name) {
            None => default,
            Some(raw) => parse_bool(raw).unwrap_or_else(|| {
                tracing::warn!(
                    "Invalid boolean value '{}' for option '{}'. Using default: {}",
                    raw,
                    name,
                    default
                );
                default
            }),
        }
    }

    /// Get f64 property, falling back to the default if unparseable
    pub fn get_f64(&self, name: &str) -> f64 {
        let default = registry()
            .get_default(name)
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);

        match self.params.get_raw(name) {
            None => default,
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    tracing::warn!(
                        "Invalid numeric value '{}' for option '{}'. Using default: {}",
                        raw,
                        name,
                        default
                    );
                    default
                }
            },
        }
    }

    /// Get f64 property with range validation
    pub fn get_f64_in_range(&self, name: &str, min: f64, max: f64) -> f64 {
        let value = self.get_f64(name);
        if (min..=max).contains(&value) {
            return value;
        }

        let default = registry()
            .get_default(name)
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(min);
        tracing::warn!(
            "Value {} for option '{}' out of range [{}, {}]. Using default: {}",
            value,
            name,
            min,
            max,
            default
        );
        default
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
