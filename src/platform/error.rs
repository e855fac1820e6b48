use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running a processor
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The host asked the processor to stop before it finished
    #[error("Processor interrupted: {0}")]
    Interrupted(String),

    /// A required input column is absent from the CSV header
    #[error("Input has no '{}' column (looked for: {})", .field, .aliases.join(", "))]
    MissingColumn {
        field: &'static str,
        aliases: &'static [&'static str],
    },

    /// Configuration error (unknown processor, invalid parameter file, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The processor cannot run on the given parent dataset
    #[error("Processor '{processor}' is not compatible with dataset type '{dataset_type}'")]
    Incompatible {
        processor: String,
        dataset_type: String,
    },

    /// The external media tool could not be started
    #[error("Media tool '{}' could not be started: {}", .path.display(), .reason)]
    MediaToolUnavailable { path: PathBuf, reason: String },

    /// CSV parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Archive read/write error
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessorError {
    /// Interruption raised at an iteration boundary
    pub fn interrupted(during: impl Into<String>) -> Self {
        ProcessorError::Interrupted(during.into())
    }

    /// Returns true if this error was caused by the interruption flag
    pub fn is_interrupted(&self) -> bool {
        matches!(self, ProcessorError::Interrupted(_))
    }
}

/// Type alias for Results using ProcessorError
pub type Result<T> = std::result::Result<T, ProcessorError>;
