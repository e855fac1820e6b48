use crate::config::NeologismPresetConfig;
use crate::platform::catalogue::{DatasetInfo, ProcessorKind};
use crate::platform::operator_properties::{registry, PropertyKind};
use serde::Serialize;
use serde_json::json;

/// Columns used by default, first one present in the parent wins
pub const DEFAULT_TEXT_COLUMNS: &[&str] = &["body", "text", "subject"];

/// Word lists the tokeniser removes; what remains are candidate neologisms
pub const WORD_FILTERS: &[&str] = &["finnish_wordlist_big", "stopwords-iso-fi"];

/// Number of top-ranked tokens kept per timeframe
pub const TOP_TOKENS: u32 = 15;

/// One processor to queue, with its parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStep {
    #[serde(rename = "type")]
    pub processor_type: String,
    pub parameters: serde_json::Value,
}

impl PipelineStep {
    fn new(processor_type: &str, parameters: serde_json::Value) -> Self {
        PipelineStep {
            processor_type: processor_type.to_string(),
            parameters,
        }
    }
}

/// Input widget kind of a preset option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Choice,
    MultiChoice,
    Text,
    Toggle,
    Number,
}

/// A preset option as offered to the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub help: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

/// Top-level Finnish CSV or NDJSON datasets
pub fn is_compatible_with(dataset: &DatasetInfo) -> bool {
    dataset.is_top_level
        && matches!(dataset.extension.as_str(), "csv" | "ndjson")
        && dataset.language.as_deref() == Some("fi")
}

/// Options of the preset, adapted to the parent's columns when known
///
/// With parent columns, `columns` becomes a multiple choice over them,
/// defaulting to the first of `body`, `text`, `subject` present.
pub fn get_options(parent_columns: &[String]) -> Vec<PresetOption> {
    registry()
        .properties_for(ProcessorKind::NeologismPreset.type_id())
        .into_iter()
        .map(|prop| {
            let mut option = PresetOption {
                name: prop.name.clone(),
                kind: match prop.kind {
                    PropertyKind::Enumerated => OptionKind::Choice,
                    PropertyKind::Boolean => OptionKind::Toggle,
                    PropertyKind::Double => OptionKind::Number,
                    PropertyKind::String => OptionKind::Text,
                },
                help: prop.description.clone(),
                default: Some(prop.default_value.clone()).filter(|d| !d.is_empty()),
                choices: prop.valid_values.clone().unwrap_or_default(),
            };

            if prop.name == "columns" && !parent_columns.is_empty() {
                option.kind = OptionKind::MultiChoice;
                option.choices = parent_columns.to_vec();
                option.default = DEFAULT_TEXT_COLUMNS
                    .iter()
                    .find(|c| parent_columns.iter().any(|p| p == *c))
                    .map(|c| c.to_string());
            }

            option
        })
        .collect()
}

/// Processors to queue: tokenise without known words, vectorise, rank
pub fn get_processor_pipeline(config: &NeologismPresetConfig) -> Vec<PipelineStep> {
    vec![
        PipelineStep::new(
            "tokenise-posts",
            json!({
                "language": "finnish",
                "stem": false,
                "strip_symbols": true,
                "lemmatise": false,
                "docs_per": config.timeframe.as_str(),
                "columns": config.columns,
                "filter": WORD_FILTERS,
            }),
        ),
        PipelineStep::new("vectorise-tokens", json!({})),
        PipelineStep::new(
            "vector-ranker",
            json!({
                "amount": true,
                "top": TOP_TOKENS,
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timeframe;

    fn dataset(extension: &str, language: Option<&str>, is_top_level: bool) -> DatasetInfo {
        DatasetInfo {
            dataset_type: "reddit-search".to_string(),
            extension: extension.to_string(),
            language: language.map(str::to_string),
            is_top_level,
            columns: Vec::new(),
        }
    }

    #[test]
    fn test_compatibility() {
        assert!(is_compatible_with(&dataset("csv", Some("fi"), true)));
        assert!(is_compatible_with(&dataset("ndjson", Some("fi"), true)));
        assert!(!is_compatible_with(&dataset("csv", Some("en"), true)));
        assert!(!is_compatible_with(&dataset("csv", None, true)));
        assert!(!is_compatible_with(&dataset("csv", Some("fi"), false)));
        assert!(!is_compatible_with(&dataset("zip", Some("fi"), true)));
    }

    #[test]
    fn test_pipeline_steps() {
        let config = NeologismPresetConfig {
            timeframe: Timeframe::Week,
            columns: vec!["body".to_string()],
        };
        let pipeline = get_processor_pipeline(&config);

        let types: Vec<&str> = pipeline.iter().map(|s| s.processor_type.as_str()).collect();
        assert_eq!(types, vec!["tokenise-posts", "vectorise-tokens", "vector-ranker"]);

        let tokenise = &pipeline[0].parameters;
        assert_eq!(tokenise["language"], "finnish");
        assert_eq!(tokenise["stem"], false);
        assert_eq!(tokenise["strip_symbols"], true);
        assert_eq!(tokenise["docs_per"], "week");
        assert_eq!(tokenise["columns"], json!(["body"]));
        assert_eq!(
            tokenise["filter"],
            json!(["finnish_wordlist_big", "stopwords-iso-fi"])
        );

        assert_eq!(pipeline[1].parameters, json!({}));
        assert_eq!(pipeline[2].parameters, json!({"amount": true, "top": 15}));
    }

    #[test]
    fn test_pipeline_serialises_with_type_key() {
        let pipeline = get_processor_pipeline(&NeologismPresetConfig::default());
        let value = serde_json::to_value(&pipeline).unwrap();
        assert_eq!(value[2]["type"], "vector-ranker");
        assert_eq!(value[0]["parameters"]["docs_per"], "month");
    }

    #[test]
    fn test_options_without_parent_columns() {
        let options = get_options(&[]);
        let names: Vec<&str> = options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["timeframe", "columns"]);

        assert_eq!(options[0].kind, OptionKind::Choice);
        assert_eq!(options[0].default.as_deref(), Some("month"));
        assert_eq!(options[0].choices.len(), 5);

        assert_eq!(options[1].kind, OptionKind::Text);
        assert!(options[1].default.is_none());
    }

    #[test]
    fn test_options_with_parent_columns() {
        let columns: Vec<String> = ["id", "subject", "text", "author"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let options = get_options(&columns);

        let column_option = options.iter().find(|o| o.name == "columns").unwrap();
        assert_eq!(column_option.kind, OptionKind::MultiChoice);
        assert_eq!(column_option.choices, columns);
        // "text" comes before "subject" in the preference order
        assert_eq!(column_option.default.as_deref(), Some("text"));

        let no_text = get_options(&["id".to_string()]);
        assert!(no_text[1].default.is_none());
    }
}
