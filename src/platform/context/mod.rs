//! ProcessorContext trait and implementations
//!
//! Processors never talk to the host directly. Everything they report back
//! (status lines, progress, dataset log messages) and the one thing they ask
//! for (has the job been interrupted?) goes through this trait.
//!
//! Implementations:
//! - `LocalContext`: CLI runs; status via `tracing`, interruption via a shared flag

use crate::platform::error::{ProcessorError, Result};

mod local_context;

pub use local_context::LocalContext;

/// Trait for reporting back to the host while a processor runs
pub trait ProcessorContext: Send + Sync {
    /// Replace the job's status line
    ///
    /// `is_final` marks the last status of a run that ends early.
    fn update_status(&self, message: &str, is_final: bool);

    /// Report progress as a fraction in [0, 1]
    fn update_progress(&self, fraction: f64);

    /// Append a message to the dataset log
    fn log(&self, message: &str);

    /// Whether the host asked the processor to stop
    fn is_interrupted(&self) -> bool;

    // Convenience methods with default implementations

    /// Return `Interrupted` if the interruption flag is set
    fn check_interrupted(&self, during: &str) -> Result<()> {
        if self.is_interrupted() {
            Err(ProcessorError::interrupted(during))
        } else {
            Ok(())
        }
    }
}
