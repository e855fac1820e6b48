//! Processor presets
//!
//! A preset does no processing of its own. It expands into a fixed chain
//! of other processors whose last result becomes the preset's result.

pub mod neologisms;

pub use neologisms::{get_options, get_processor_pipeline, PipelineStep, PresetOption};
