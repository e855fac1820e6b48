//! SVG drawing of the projected graphs
//!
//! Geometry is computed into plain `AreaPath` values first and only then
//! converted into SVG elements, which keeps the curve maths testable
//! without parsing SVG.

use super::intervals::{IntervalKey, Series, SeriesTable};
use super::layout::{relative_magnitude, Layout, MARGIN};
use crate::platform::context::ProcessorContext;
use crate::platform::error::Result;
use crate::platform::palettes::PaletteDefinition;
use chrono::Month;
use svg::node::element::path::Data;
use svg::node::element::{Line, Path, Text, SVG};
use svg::Document;

/// One drawing command of an area path, in page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    /// Cubic Bézier: first control point, second control point, end point
    CurveTo((f64, f64), (f64, f64), (f64, f64)),
    Close,
}

/// Closed outline of one filled graph
#[derive(Debug, Clone, PartialEq)]
pub struct AreaPath {
    pub commands: Vec<PathCommand>,
    /// Baseline position just past the last interval's baseline point,
    /// used to place the series label
    pub end: (f64, f64),
}

impl AreaPath {
    fn to_data(&self) -> Data {
        let pt = |x: f64, y: f64| vec![x as f32, y as f32];
        self.commands
            .iter()
            .fold(Data::new(), |data, command| match *command {
                PathCommand::MoveTo(x, y) => data.move_to(pt(x, y)),
                PathCommand::LineTo(x, y) => data.line_to(pt(x, y)),
                PathCommand::CurveTo((x1, y1), (x2, y2), (x, y)) => data.cubic_curve_to(vec![
                    x1 as f32, y1 as f32, x2 as f32, y2 as f32, x as f32, y as f32,
                ]),
                PathCommand::Close => data.close(),
            })
    }
}

/// Heights of a series' values, scaled to the graph height
///
/// With `normalise` every series is scaled to its own peak, otherwise to the
/// global peak. Signs are kept, so negative values dip below the baseline.
pub fn scaled_heights(series: &Series, limit: f64, graph_height: f64) -> Vec<f64> {
    series
        .values
        .iter()
        .map(|&v| graph_height * relative_magnitude(v, limit))
        .collect()
}

/// Outline of one graph whose baseline starts at `start`
pub fn area_path(layout: &Layout, start: (f64, f64), heights: &[f64], smooth: bool) -> AreaPath {
    let (start_x, start_y) = start;
    let (step_x, step_y) = (layout.step_x_horizontal, layout.step_y_horizontal);

    let mut commands = vec![PathCommand::MoveTo(start_x, start_y)];
    let mut previous: Option<f64> = None;
    let (mut x, mut y) = start;

    for &height in heights {
        match previous {
            // Straight up from the baseline to the first value
            None => commands.push(PathCommand::LineTo(start_x, start_y - height)),
            Some(_) if !smooth => commands.push(PathCommand::LineTo(x, y - height)),
            Some(prev) => {
                let control_left = (x - step_x / 2.0, y + step_y - prev - step_y / 2.0);
                let control_right = (x - step_x / 2.0, y - height + step_y / 2.0);
                commands.push(PathCommand::CurveTo(
                    control_left,
                    control_right,
                    (x, y - height),
                ));
            }
        }

        previous = Some(height);
        x += step_x;
        y -= step_y;
    }

    // Back down to the baseline at the last interval, then close
    commands.push(PathCommand::LineTo(x - step_x, y + step_y));
    commands.push(PathCommand::Close);

    AreaPath {
        commands,
        end: (x, y),
    }
}

/// Label texts for the vertical gridline at `key`
///
/// The year is always shown; monthly and daily data add the month
/// abbreviation, daily data also the day number.
pub fn gridline_labels(key: &IntervalKey) -> (String, Option<String>) {
    let year = format!("{:04}", key.year_value());

    let detail = key.month_value().map(|m| {
        let month = u8::try_from(m)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name()[..3].to_string())
            .unwrap_or_default();
        match key.day_value() {
            Some(day) => format!("{} {}", month, day),
            None => month,
        }
    });

    (year, detail)
}

/// Draw the complete chart
///
/// Series are drawn in reverse order: the last series first, at the front
/// corner, so earlier series paint over later ones. Each series emits a
/// status line and a progress update; the interruption flag is checked
/// before every series.
pub fn draw_chart<C: ProcessorContext + ?Sized>(
    ctx: &C,
    table: &SeriesTable,
    layout: &Layout,
    palette: &PaletteDefinition,
    smooth: bool,
    normalise: bool,
) -> Result<Document> {
    let (doc_width, doc_height) = layout.document_size();
    let mut document = Document::new()
        .set("width", doc_width)
        .set("height", doc_height)
        .set("viewBox", format!("0 0 {} {}", doc_width, doc_height))
        .set("style", "font-family:monospace");

    document = draw_vertical_gridlines(document, table, layout);

    let global_limit = table.global_limit();
    let total = table.series().len();
    let obverse = layout.plane_obverse_degrees();

    // Colour index counts in render order
    for (depth, series) in table.series().iter().rev().enumerate() {
        ctx.check_interrupted("while rendering graphs")?;
        ctx.update_status(&format!("Rendering graph for '{}'", series.label), false);

        let limit = if normalise {
            series.magnitude_limit()
        } else {
            global_limit
        };
        let heights = scaled_heights(series, limit, layout.graph_height);
        let start = layout.point(0, depth);
        let area = area_path(layout, start, &heights, smooth);

        document = document.add(
            Path::new()
                .set("fill", palette.get_color(depth))
                .set("d", area.to_data()),
        );

        let insert = if layout.label_in_graph {
            (start.0 + 5.0, start.1 - 10.0)
        } else {
            (
                area.end.0 - layout.step_x_horizontal + 5.0,
                area.end.1 + layout.step_y_horizontal - 10.0,
            )
        };
        // Skewing moves the origin, compensate in the translation
        let offset_y = layout.plane_obverse.tan() * insert.0;
        document = document.add(
            Text::new(series.label.as_str())
                .set("x", 0)
                .set("y", 0)
                .set(
                    "transform",
                    format!(
                        "skewY({:.6}) translate({:.6} {:.6})",
                        -obverse,
                        insert.0,
                        insert.1 + offset_y
                    ),
                ),
        );

        ctx.update_progress((depth + 1) as f64 / total as f64);
    }

    document = draw_horizontal_gridlines(document, table, layout);

    // Interval axis
    let (axis_x, axis_y) = layout.origin();
    document = document.add(
        Line::new()
            .set("x1", axis_x)
            .set("y1", axis_y)
            .set("x2", layout.canvas_width)
            .set("y2", MARGIN + layout.canvas_height - layout.x_axis_height)
            .set("stroke", "black")
            .set("stroke-width", 2),
    );

    Ok(document)
}

fn draw_vertical_gridlines(mut document: Document, table: &SeriesTable, layout: &Layout) -> Document {
    let obverse = layout.plane_obverse_degrees();
    let label_transform = format!("rotate({:.6}) skewX({:.6})", -obverse, obverse);

    for index in layout.gridline_indices() {
        let (x, y) = layout.point(index, 0);
        document = document.add(
            Line::new()
                .set("x1", x)
                .set("y1", y)
                .set("x2", x - layout.y_axis_width)
                .set("y2", y - layout.y_axis_height)
                .set("stroke", "grey")
                .set("stroke-width", 0.25),
        );

        let (year, detail) = gridline_labels(&table.axis()[index]);

        // Rotated and skewed text needs a positioned container
        let mut container = SVG::new()
            .set("x", x - 25.0)
            .set("y", y)
            .set("width", "50")
            .set("height", "1.5em")
            .set("overflow", "visible")
            .add(
                Text::new(year)
                    .set("x", "25%")
                    .set("y", "100%")
                    .set("transform", label_transform.as_str())
                    .set("text-anchor", "middle")
                    .set("baseline-shift", "-0.75em")
                    .set("style", "font-weight:bold;"),
            );

        if let Some(detail) = detail {
            container = container.add(
                Text::new(detail)
                    .set("x", "25%")
                    .set("y", "100%")
                    .set("transform", label_transform.as_str())
                    .set("text-anchor", "middle")
                    .set("baseline-shift", "-1.75em"),
            );
        }

        document = document.add(container);
    }

    document
}

fn draw_horizontal_gridlines(mut document: Document, table: &SeriesTable, layout: &Layout) -> Document {
    let mut x = 0.0;
    let mut y = MARGIN + layout.canvas_height - layout.y_axis_height;

    for _ in table.series() {
        x += layout.step_x_vertical;
        y += layout.step_y_vertical;
        document = document.add(
            Line::new()
                .set("x1", x)
                .set("y1", y)
                .set("x2", x + layout.x_axis_width)
                .set("y2", y - layout.x_axis_height)
                .set("stroke", "black")
                .set("stroke-width", 1),
        );
    }

    document
}
