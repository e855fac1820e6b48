//! Canvas geometry for the isometric projection
//!
//! Two categorical axes are projected onto the page: the interval axis runs
//! up and to the right, the series axis up and to the left. Both use the
//! same angle split, so one unit along either axis moves
//! `(sin(angle/2), cos(angle/2))` times the unit size.

/// The graph area has at least this total width; wider if each interval
/// would otherwise be narrower than `MIN_ITEM_WIDTH`
const MIN_FULL_WIDTH: f64 = 600.0;
const MIN_ITEM_WIDTH: f64 = 1.0;

/// Same trade-off for the space given to each series
const MIN_FULL_HEIGHT: f64 = 300.0;
const MIN_ITEM_HEIGHT: f64 = 100.0;

/// Room around the projected axes for the text labels
pub const MARGIN: f64 = 100.0;

/// At most this many labelled vertical gridlines (one per month for a year of data)
pub const MAX_GRIDLINES: usize = 12;

/// Labels longer than this are drawn inside their graph so they stay on the canvas
pub const LONG_LABEL_CHARS: usize = 30;

/// Computed geometry for one render
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub intervals: usize,
    pub series: usize,

    /// Unit size along the interval axis
    pub item_width: f64,
    /// Unit size along the series axis
    pub item_height: f64,

    /// Angle between the two axes, radians
    pub plane_angle: f64,
    /// Angle of the series plane against the horizontal, radians
    pub plane_obverse: f64,

    // Bounding box of each projected axis
    pub x_axis_width: f64,
    pub x_axis_height: f64,
    pub y_axis_width: f64,
    pub y_axis_height: f64,

    pub canvas_width: f64,
    pub canvas_height: f64,

    // Page offsets of one interval step and one series step
    pub step_x_horizontal: f64,
    pub step_y_horizontal: f64,
    pub step_x_vertical: f64,
    pub step_y_vertical: f64,

    /// Every `gridline_stride`-th interval gets a labelled gridline
    pub gridline_stride: usize,

    /// Draw series labels inside their graph instead of at its end
    pub label_in_graph: bool,

    /// Height of a value at the scale limit
    pub graph_height: f64,
}

impl Layout {
    /// Compute the layout for `intervals` × `series` graphs
    ///
    /// `plane_angle_degrees` is the angle between the axes (120 by default).
    pub fn compute(
        intervals: usize,
        series: usize,
        longest_label: usize,
        plane_angle_degrees: f64,
    ) -> Self {
        let intervals_f = intervals.max(1) as f64;
        let series_f = series.max(1) as f64;

        let item_width = MIN_ITEM_WIDTH.max(MIN_FULL_WIDTH / intervals_f);
        let item_height = MIN_ITEM_HEIGHT.max(MIN_FULL_HEIGHT / series_f);

        let plane_obverse = ((180.0 - plane_angle_degrees) / 2.0).to_radians();
        let plane_angle = plane_angle_degrees.to_radians();
        let (half_sin, half_cos) = ((plane_angle / 2.0).sin(), (plane_angle / 2.0).cos());

        let x_axis_length = item_width * (intervals_f - 1.0);
        let y_axis_length = item_height * series_f;

        let x_axis_width = half_sin * x_axis_length;
        let y_axis_width = half_sin * y_axis_length;
        let x_axis_height = half_cos * x_axis_length;
        let y_axis_height = half_cos * y_axis_length;

        let step_y_vertical = half_cos * item_height;

        Layout {
            intervals,
            series,
            item_width,
            item_height,
            plane_angle,
            plane_obverse,
            x_axis_width,
            x_axis_height,
            y_axis_width,
            y_axis_height,
            canvas_width: x_axis_width + y_axis_width,
            canvas_height: x_axis_height + y_axis_height,
            step_x_horizontal: half_sin * item_width,
            step_y_horizontal: half_cos * item_width,
            step_x_vertical: half_sin * item_height,
            step_y_vertical,
            gridline_stride: gridline_stride(intervals),
            label_in_graph: longest_label > LONG_LABEL_CHARS,
            graph_height: step_y_vertical * 1.5,
        }
    }

    /// Size of the SVG document
    pub fn document_size(&self) -> (f64, f64) {
        (
            self.canvas_width + MARGIN,
            self.canvas_height + 2.0 * MARGIN,
        )
    }

    /// Page position where the interval axis starts (front corner)
    pub fn origin(&self) -> (f64, f64) {
        (self.y_axis_width, MARGIN + self.canvas_height)
    }

    /// Page position of interval `index` on the baseline of the graph drawn
    /// `depth` steps back along the series axis
    pub fn point(&self, index: usize, depth: usize) -> (f64, f64) {
        let (x0, y0) = self.origin();
        (
            x0 + index as f64 * self.step_x_horizontal - depth as f64 * self.step_x_vertical,
            y0 - index as f64 * self.step_y_horizontal - depth as f64 * self.step_y_vertical,
        )
    }

    /// Indices of the intervals that get a labelled vertical gridline
    pub fn gridline_indices(&self) -> impl Iterator<Item = usize> {
        (0..self.intervals).step_by(self.gridline_stride)
    }

    pub fn plane_obverse_degrees(&self) -> f64 {
        self.plane_obverse.to_degrees()
    }
}

/// Gridline stride: show at most `MAX_GRIDLINES` labels
pub fn gridline_stride(intervals: usize) -> usize {
    (intervals / MAX_GRIDLINES).max(1)
}

/// Signed magnitude of `value` relative to `limit`, within [-1, 1]
///
/// A zero limit (an all-zero series) yields 0 instead of dividing by zero.
pub fn relative_magnitude(value: f64, limit: f64) -> f64 {
    if limit == 0.0 {
        return 0.0;
    }
    (value.abs() / limit).copysign(value)
}
