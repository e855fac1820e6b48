//! Processor configuration from user parameters
//!
//! Configuration is loaded from processor options (defined in operator.json).
//! All default values come from operator.json - no hardcoded fallbacks in this code.

use crate::platform::operator_properties::OperatorPropertyReader;
use crate::platform::properties::ParameterSet;
use std::path::PathBuf;

/// Time bucket the neologism preset tokenises per
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeframe {
    All,
    Year,
    #[default]
    Month,
    Week,
    Day,
}

impl Timeframe {
    /// Parse from string value
    ///
    /// Validation happens in OperatorPropertyReader.get_enum()
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "all" => Self::All,
            "year" => Self::Year,
            "week" => Self::Week,
            "day" => Self::Day,
            _ => Self::Month, // "month" or any other value
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Year => "year",
            Self::Month => "month",
            Self::Week => "week",
            Self::Day => "day",
        }
    }
}

/// Options of the isometric graph renderer
#[derive(Debug, Clone, PartialEq)]
pub struct IsovizConfig {
    /// Join data points with Bézier curves instead of straight lines
    pub smooth: bool,

    /// Scale each graph to its own peak (true) or all graphs to the global peak (false)
    pub normalise: bool,

    /// Angle between the interval axis and the item axis, in degrees
    /// Lower values make the plane look flatter
    pub plane_angle: f64,

    /// Categorical palette used for the graph fills
    pub palette: String,
}

impl IsovizConfig {
    pub fn from_properties(params: &ParameterSet) -> Self {
        let props = OperatorPropertyReader::new(params);

        Self {
            smooth: props.get_bool("smooth"),
            normalise: props.get_bool("normalise"),
            plane_angle: props.get_f64_in_range("plane.angle", 30.0, 170.0),
            palette: props.get_string("palette"),
        }
    }
}

impl Default for IsovizConfig {
    fn default() -> Self {
        Self::from_properties(&ParameterSet::new())
    }
}

/// Options of the audio extractor
#[derive(Debug, Clone, PartialEq)]
pub struct AudioExtractorConfig {
    /// ffmpeg executable (bare names are looked up on PATH)
    pub ffmpeg_path: PathBuf,

    /// Sample rate of the extracted WAV files in Hz
    pub sample_rate: u32,
}

impl AudioExtractorConfig {
    pub fn from_properties(params: &ParameterSet) -> Self {
        let props = OperatorPropertyReader::new(params);

        Self {
            ffmpeg_path: PathBuf::from(props.get_string("ffmpeg.path")),
            sample_rate: props.get_f64_in_range("audio.sample.rate", 8000.0, 192000.0) as u32,
        }
    }
}

impl Default for AudioExtractorConfig {
    fn default() -> Self {
        Self::from_properties(&ParameterSet::new())
    }
}

/// Options of the Finnish neologism preset
#[derive(Debug, Clone, PartialEq)]
pub struct NeologismPresetConfig {
    pub timeframe: Timeframe,

    /// Columns to tokenise; empty means "let the tokeniser decide"
    pub columns: Vec<String>,
}

impl NeologismPresetConfig {
    pub fn from_properties(params: &ParameterSet) -> Self {
        let props = OperatorPropertyReader::new(params);

        Self {
            timeframe: Timeframe::parse(&props.get_enum("timeframe")),
            columns: props.get_list("columns"),
        }
    }
}

impl Default for NeologismPresetConfig {
    fn default() -> Self {
        Self::from_properties(&ParameterSet::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isoviz_defaults() {
        let config = IsovizConfig::default();
        assert!(config.smooth);
        assert!(config.normalise);
        assert_eq!(config.plane_angle, 120.0);
        assert_eq!(config.palette, "Isoviz");
    }

    #[test]
    fn test_isoviz_user_values() {
        let params =
            ParameterSet::from_pairs(&["smooth=false", "normalise=false", "plane.angle=90"])
                .unwrap();
        let config = IsovizConfig::from_properties(&params);
        assert!(!config.smooth);
        assert!(!config.normalise);
        assert_eq!(config.plane_angle, 90.0);
    }

    #[test]
    fn test_audio_defaults() {
        let config = AudioExtractorConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.sample_rate, 16000);
    }

    #[test]
    fn test_preset_config() {
        let config = NeologismPresetConfig::default();
        assert_eq!(config.timeframe, Timeframe::Month);
        assert!(config.columns.is_empty());

        let params = ParameterSet::from_pairs(&["timeframe=day", "columns=body,subject"]).unwrap();
        let config = NeologismPresetConfig::from_properties(&params);
        assert_eq!(config.timeframe, Timeframe::Day);
        assert_eq!(config.columns, vec!["body", "subject"]);
    }

    #[test]
    fn test_timeframe_parse() {
        assert_eq!(Timeframe::parse("ALL"), Timeframe::All);
        assert_eq!(Timeframe::parse("week"), Timeframe::Week);
        assert_eq!(Timeframe::parse("whatever"), Timeframe::Month);
        assert_eq!(Timeframe::Year.as_str(), "year");
    }
}
