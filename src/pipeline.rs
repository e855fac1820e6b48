//! Shared processor dispatch
//!
//! This module contains the logic that is shared between the CLI (main.rs)
//! and the integration tests: checking a processor against its parent
//! dataset, building its configuration from the user's parameters and
//! running it against a `ProcessorContext`.

use crate::audio;
use crate::config::{AudioExtractorConfig, IsovizConfig, NeologismPresetConfig};
use crate::isoviz;
use crate::platform::catalogue::{DatasetInfo, ProcessorKind};
use crate::platform::context::ProcessorContext;
use crate::platform::error::{ProcessorError, Result};
use crate::platform::properties::ParameterSet;
use crate::platform::result::{write_result, ProcessorOutcome};
use crate::presets;
use std::path::{Path, PathBuf};

/// Everything a processor run needs besides the context
#[derive(Debug, Clone)]
pub struct ProcessorRequest {
    /// Parent dataset's result file (not used by presets)
    pub input: Option<PathBuf>,
    /// Where the result file goes
    pub output: PathBuf,
    /// User-supplied option values
    pub params: ParameterSet,
    /// Description of the parent dataset, checked for compatibility if given
    pub parent: Option<DatasetInfo>,
}

impl ProcessorRequest {
    pub fn new(input: Option<PathBuf>, output: impl Into<PathBuf>) -> Self {
        ProcessorRequest {
            input,
            output: output.into(),
            params: ParameterSet::new(),
            parent: None,
        }
    }

    fn require_input(&self, kind: ProcessorKind) -> Result<&Path> {
        self.input.as_deref().ok_or_else(|| {
            ProcessorError::Config(format!("{} needs an input file", kind.type_id()))
        })
    }
}

/// Whether `kind` can run on `parent`
pub fn is_compatible(kind: ProcessorKind, parent: &DatasetInfo, params: &ParameterSet) -> bool {
    match kind {
        ProcessorKind::IsometricGraphs => kind
            .info()
            .map(|info| info.accepts_type(&parent.dataset_type))
            .unwrap_or(false),
        ProcessorKind::AudioExtractor => {
            audio::is_compatible_with(parent, &AudioExtractorConfig::from_properties(params))
        }
        ProcessorKind::NeologismPreset => presets::neologisms::is_compatible_with(parent),
    }
}

/// Run one processor
///
/// The outcome reports how many items the result holds; no result file is
/// written when there is nothing to produce, or when the run fails or is
/// interrupted.
pub fn run_processor<C: ProcessorContext + ?Sized>(
    kind: ProcessorKind,
    ctx: &C,
    request: &ProcessorRequest,
) -> Result<ProcessorOutcome> {
    if let Some(parent) = &request.parent {
        if !is_compatible(kind, parent, &request.params) {
            return Err(ProcessorError::Incompatible {
                processor: kind.type_id().to_string(),
                dataset_type: parent.dataset_type.clone(),
            });
        }
    }

    tracing::info!(
        "Running {} -> {}",
        kind.type_id(),
        request.output.display()
    );

    let outcome = match kind {
        ProcessorKind::IsometricGraphs => {
            let config = IsovizConfig::from_properties(&request.params);
            tracing::debug!("{:?}", config);
            isoviz::render_isometric_graphs(
                ctx,
                request.require_input(kind)?,
                &request.output,
                &config,
            )?
        }
        ProcessorKind::AudioExtractor => {
            let config = AudioExtractorConfig::from_properties(&request.params);
            tracing::debug!("{:?}", config);
            audio::extract_audio(ctx, request.require_input(kind)?, &request.output, &config)?
        }
        ProcessorKind::NeologismPreset => {
            let config = NeologismPresetConfig::from_properties(&request.params);
            let pipeline = presets::get_processor_pipeline(&config);
            write_result(&request.output, |temp_path| {
                let file = std::fs::File::create(temp_path)?;
                serde_json::to_writer_pretty(file, &pipeline)?;
                Ok(())
            })?;
            ctx.update_status(
                &format!("Queued {} processors", pipeline.len()),
                false,
            );
            ProcessorOutcome::with_output(pipeline.len(), &request.output)
        }
    };

    ctx.update_progress(1.0);
    Ok(outcome)
}
