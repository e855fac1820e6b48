//! Isometric multi-series area chart renderer
//!
//! Reads a CSV of `(item, date, value)` rows and draws one filled area graph
//! per item, all sharing one interval axis, projected onto an isometric
//! plane and written out as a single SVG file.
//!
//! The work is split into stages that hand ownership forward:
//! - `ingest`: CSV records into per-series accumulators
//! - `intervals`: calendar completion into a `SeriesTable`
//! - `layout`: canvas geometry
//! - `draw`: the SVG document

pub mod draw;
pub mod ingest;
pub mod intervals;
pub mod layout;

use crate::config::IsovizConfig;
use crate::platform::context::ProcessorContext;
use crate::platform::error::{ProcessorError, Result};
use crate::platform::palettes::PALETTE_REGISTRY;
use crate::platform::result::{write_result, ProcessorOutcome};
use std::io::Read;
use std::path::Path;

pub use intervals::{Granularity, IntervalKey, Series, SeriesTable};
pub use layout::Layout;

/// Render the CSV file at `input` into an SVG at `output`
pub fn render_isometric_graphs<C: ProcessorContext + ?Sized>(
    ctx: &C,
    input: &Path,
    output: &Path,
    config: &IsovizConfig,
) -> Result<ProcessorOutcome> {
    let file = std::fs::File::open(input)?;
    render_from_reader(ctx, file, output, config)
}

/// Render CSV data from any reader into an SVG at `output`
///
/// Nothing is written when the input has no usable interval keys; the
/// outcome then reports zero items.
pub fn render_from_reader<C: ProcessorContext + ?Sized, R: Read>(
    ctx: &C,
    input: R,
    output: &Path,
    config: &IsovizConfig,
) -> Result<ProcessorOutcome> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    ctx.update_status("Reading graph data", false);
    let raw = ingest::read_series(&mut reader, ctx)?;
    if raw.dropped > 0 {
        ctx.log(&format!(
            "Skipped {} row(s) with an unrecognised date/time value",
            raw.dropped
        ));
    }

    let table = match intervals::complete(raw) {
        Some(table) => table,
        None => {
            ctx.update_status("No data to render", true);
            return Ok(ProcessorOutcome::empty());
        }
    };
    tracing::debug!(
        "Completed {} series over {} {:?} intervals",
        table.series().len(),
        table.axis().len(),
        table.granularity()
    );

    let longest_label = table
        .series()
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(0);
    let layout = Layout::compute(
        table.axis().len(),
        table.series().len(),
        longest_label,
        config.plane_angle,
    );

    let palette = PALETTE_REGISTRY
        .categorical_or_default(&config.palette)
        .ok_or_else(|| ProcessorError::Config("No categorical palette available".to_string()))?;

    let document = draw::draw_chart(
        ctx,
        &table,
        &layout,
        palette,
        config.smooth,
        config.normalise,
    )?;

    ctx.check_interrupted("before writing the chart")?;
    ctx.update_status("Saving result", false);
    write_result(output, |temp_path| Ok(svg::save(temp_path, &document)?))?;

    let rendered = table.series().len();
    ctx.update_status(&format!("Rendered {} graph(s)", rendered), false);
    Ok(ProcessorOutcome::with_output(rendered, output))
}
