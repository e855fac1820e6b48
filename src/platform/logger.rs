use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Logger for dataset log messages
///
/// Every message goes to `tracing`; when a log file is configured it is also
/// appended there as a timestamped line, next to the result file.
pub struct DatasetLogger {
    path: Option<PathBuf>,
    lock: Mutex<()>,
}

impl DatasetLogger {
    /// Logger that only forwards to `tracing`
    pub fn tracing_only() -> Self {
        DatasetLogger {
            path: None,
            lock: Mutex::new(()),
        }
    }

    /// Logger that also appends to the given file
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        DatasetLogger {
            path: Some(path.into()),
            lock: Mutex::new(()),
        }
    }

    /// Log file location, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write one message to the dataset log
    pub fn log(&self, message: &str) {
        tracing::info!(target: "dataset", "{}", message);

        let Some(path) = &self.path else {
            return;
        };

        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let line = format!("{} {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"), message);
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = written {
            tracing::warn!("Could not append to dataset log {}: {}", path.display(), e);
        }
    }
}
