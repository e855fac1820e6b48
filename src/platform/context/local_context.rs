use super::ProcessorContext;
use crate::platform::logger::DatasetLogger;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Context for local (CLI) runs
///
/// The interruption flag is shared so a signal handler can set it while the
/// processor runs on another thread. Progress never moves backwards.
pub struct LocalContext {
    interrupted: Arc<AtomicBool>,
    logger: DatasetLogger,
    progress: Mutex<f64>,
    status: Mutex<String>,
}

impl LocalContext {
    pub fn new(interrupted: Arc<AtomicBool>, logger: DatasetLogger) -> Self {
        LocalContext {
            interrupted,
            logger,
            progress: Mutex::new(0.0),
            status: Mutex::new(String::new()),
        }
    }

    /// Context with a fresh interruption flag and no log file
    pub fn detached() -> Self {
        Self::new(
            Arc::new(AtomicBool::new(false)),
            DatasetLogger::tracing_only(),
        )
    }

    /// Handle to the interruption flag
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    /// Last reported progress fraction
    pub fn progress(&self) -> f64 {
        *self.progress.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Last reported status line
    pub fn status(&self) -> String {
        self.status
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ProcessorContext for LocalContext {
    fn update_status(&self, message: &str, is_final: bool) {
        if is_final {
            tracing::info!("{} (final)", message);
        } else {
            tracing::info!("{}", message);
        }
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = message.to_string();
    }

    fn update_progress(&self, fraction: f64) {
        let mut progress = self.progress.lock().unwrap_or_else(|e| e.into_inner());
        let fraction = fraction.clamp(0.0, 1.0);
        if fraction > *progress {
            *progress = fraction;
            tracing::debug!("Progress: {:.1}%", fraction * 100.0);
        }
    }

    fn log(&self, message: &str) {
        self.logger.log(message);
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Relaxed)
    }
}
