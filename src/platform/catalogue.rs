//! Processor catalogue
//!
//! Static metadata for each processor (type ID, category, title, result
//! extension, which parent dataset types it accepts), loaded from the
//! `processors` array of operator.json.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const OPERATOR_JSON: &str = include_str!("../../operator.json");

/// Processor metadata as declared in operator.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorInfo {
    #[serde(rename = "type")]
    pub processor_type: String,
    pub category: String,
    pub title: String,
    pub description: String,
    /// Extension of the result file
    pub extension: String,
    /// Parent dataset types (or type prefixes) this processor can run on
    #[serde(default)]
    pub accepts: Vec<String>,
    #[serde(default)]
    pub references: Vec<String>,
}

impl ProcessorInfo {
    /// Whether a dataset of type `dataset_type` is listed in `accepts`
    pub fn accepts_type(&self, dataset_type: &str) -> bool {
        self.accepts.iter().any(|t| t == dataset_type)
    }
}

#[derive(Deserialize)]
struct OperatorManifest {
    processors: Vec<ProcessorInfo>,
}

/// All processors, initialized lazily on first access
pub static CATALOGUE: Lazy<Vec<ProcessorInfo>> = Lazy::new(|| {
    serde_json::from_str::<OperatorManifest>(OPERATOR_JSON)
        .map(|m| m.processors)
        .unwrap_or_else(|e| {
            tracing::error!("Failed to load processor catalogue from operator.json: {}", e);
            Vec::new()
        })
});

/// The processors this crate implements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorKind {
    IsometricGraphs,
    AudioExtractor,
    NeologismPreset,
}

impl ProcessorKind {
    pub const ALL: [ProcessorKind; 3] = [
        ProcessorKind::IsometricGraphs,
        ProcessorKind::AudioExtractor,
        ProcessorKind::NeologismPreset,
    ];

    /// Job type ID
    pub fn type_id(&self) -> &'static str {
        match self {
            ProcessorKind::IsometricGraphs => "render-graphs-isometric",
            ProcessorKind::AudioExtractor => "audio-extractor",
            ProcessorKind::NeologismPreset => "preset-neologisms-fin",
        }
    }

    pub fn from_type_id(type_id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_id() == type_id)
    }

    /// Catalogue entry for this processor
    pub fn info(&self) -> Option<&'static ProcessorInfo> {
        CATALOGUE
            .iter()
            .find(|info| info.processor_type == self.type_id())
    }
}

/// Description of a parent dataset, used for compatibility checks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Type ID of the processor (or datasource) that produced the dataset
    #[serde(rename = "type")]
    pub dataset_type: String,
    /// Result file extension, e.g. "csv"
    #[serde(default)]
    pub extension: String,
    /// ISO 639-1 language code, if known
    #[serde(default)]
    pub language: Option<String>,
    /// Whether this is a top-level dataset (not produced by another processor)
    #[serde(default)]
    pub is_top_level: bool,
    /// Column names of the dataset, if tabular
    #[serde(default)]
    pub columns: Vec<String>,
}

impl DatasetInfo {
    pub fn from_json_file(path: &std::path::Path) -> crate::platform::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
