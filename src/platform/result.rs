//! Result files
//!
//! A processor produces at most one result file. It is written to a sibling
//! temporary file first and only persisted in place once the processor has
//! finished, so an interrupted or failed run never leaves a partial file at
//! the result path.

use super::error::Result;
use std::path::{Path, PathBuf};

/// Outcome of a processor run
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorOutcome {
    /// Number of result items (graphs rendered, videos processed, ...)
    pub items: usize,
    /// Result file, absent when there was nothing to produce
    pub output: Option<PathBuf>,
}

impl ProcessorOutcome {
    /// Finished without producing anything
    pub fn empty() -> Self {
        ProcessorOutcome {
            items: 0,
            output: None,
        }
    }

    pub fn with_output(items: usize, output: impl Into<PathBuf>) -> Self {
        ProcessorOutcome {
            items,
            output: Some(output.into()),
        }
    }
}

/// Write a result file through a temporary path
///
/// `write` receives the path of a temporary file beside `target`. On success
/// the file is persisted as `target`; on error the temporary file is dropped
/// (and with it removed) and the error returned.
pub fn write_result<F>(target: &Path, write: F) -> Result<()>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "result".to_string());
    let temp = tempfile::Builder::new()
        .prefix(&format!(".{}.", file_name))
        .suffix(".tmp")
        .tempfile_in(dir)?;

    write(temp.path())?;
    temp.persist(target).map_err(|e| e.error)?;
    Ok(())
}
