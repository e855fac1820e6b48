//! User-supplied processor parameters
//!
//! Parameters arrive as a flat JSON object (`{"smooth": false}`) and/or as
//! `key=value` pairs from the command line. Everything is kept as strings
//! here; typing and validation happen in `OperatorPropertyReader`.

use super::error::{ProcessorError, Result};
use std::collections::HashMap;
use std::path::Path;

/// User-set parameter values, keyed by property name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: HashMap<String, String>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat JSON object of parameters
    ///
    /// Strings, numbers and booleans are accepted; arrays are joined with
    /// commas (used for multi-choice options such as `columns`). Nested
    /// objects and nulls are ignored.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;

        let mut values = HashMap::new();
        for (key, value) in map {
            let value_str = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                serde_json::Value::Array(items) => items
                    .iter()
                    .filter_map(|v| match v {
                        serde_json::Value::String(s) => Some(s.clone()),
                        serde_json::Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join(","),
                _ => {
                    tracing::warn!("Ignoring parameter '{}': unsupported value type", key);
                    continue;
                }
            };
            values.insert(key, value_str);
        }

        Ok(Self { values })
    }

    /// Load parameters from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ProcessorError::Config(format!(
                "Failed to read parameter file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&json)
    }

    /// Parse `key=value` pairs
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self> {
        let mut values = HashMap::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                ProcessorError::Config(format!("Expected key=value, got '{}'", pair))
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ProcessorError::Config(format!(
                    "Empty parameter name in '{}'",
                    pair
                )));
            }
            values.insert(key.to_string(), value.trim().to_string());
        }
        Ok(Self { values })
    }

    /// Set a single parameter
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Overlay another set on top of this one (the other set wins)
    pub fn merge(mut self, other: ParameterSet) -> Self {
        self.values.extend(other.values);
        self
    }

    /// Get raw parameter value (None if not set or empty)
    pub fn get_raw(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty()) // Empty string = not set
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
