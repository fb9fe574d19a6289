//! Plotly Export Module
//! Converts a chart description into a plotly figure.
//!
//! Every grid cell gets its own x/y axis pair, numbered row-major (`x`/`y`
//! for the first cell, `x2`/`y2` for the second, ...). Axis domains follow
//! `make_subplots` spacing. With shared x-axes every cell above the bottom
//! row matches the bottom-row x axis of its column and hides its tick labels.

use plotly::common::{Fill as PlotlyFill, Line, Marker, Mode};
use plotly::layout::{Axis, AxisType, Layout};
use plotly::{Plot, Scatter};

use super::model::{Cell, Chart, Fill, TraceMode};
use crate::error::{ChartError, Result};

/// Axis slots available on a plotly layout.
const MAX_CELLS: usize = 8;

const HORIZONTAL_SPACING: f64 = 0.2;
const VERTICAL_SPACING: f64 = 0.3;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Row-major, 1-based position of a cell.
fn cell_number(cell: Cell, cols: usize) -> usize {
    (cell.row - 1) * cols + cell.col
}

fn axis_ids(number: usize) -> (String, String) {
    if number == 1 {
        ("x".to_string(), "y".to_string())
    } else {
        (format!("x{number}"), format!("y{number}"))
    }
}

/// `[start, end]` of the `position`-th (1-based) of `count` slots.
fn domain(position: usize, count: usize, spacing: f64) -> [f64; 2] {
    let spacing = spacing / count as f64;
    let size = (1.0 - spacing * (count - 1) as f64) / count as f64;
    let start = (position - 1) as f64 * (size + spacing);
    [start, start + size]
}

fn set_axes(layout: Layout, number: usize, x: Axis, y: Axis) -> Layout {
    match number {
        1 => layout.x_axis(x).y_axis(y),
        2 => layout.x_axis2(x).y_axis2(y),
        3 => layout.x_axis3(x).y_axis3(y),
        4 => layout.x_axis4(x).y_axis4(y),
        5 => layout.x_axis5(x).y_axis5(y),
        6 => layout.x_axis6(x).y_axis6(y),
        7 => layout.x_axis7(x).y_axis7(y),
        _ => layout.x_axis8(x).y_axis8(y),
    }
}

impl Chart {
    /// Plotly figure with the same grid, traces and size.
    pub fn to_plotly(&self) -> Result<Plot> {
        let cells = self.rows() * self.cols();
        if cells > MAX_CELLS {
            return Err(ChartError::GridTooLarge(cells));
        }
        self.check_cells()?;

        let mut plot = Plot::new();

        for (i, trace) in self.traces().iter().enumerate() {
            let (x_id, y_id) = axis_ids(cell_number(trace.cell, self.cols()));
            let x: Vec<String> = trace
                .x
                .iter()
                .map(|d| d.format(DATE_FORMAT).to_string())
                .collect();
            let color = self.trace_color(i).to_string();

            let mut scatter = Scatter::new(x, trace.y.clone())
                .name(trace.name.as_str())
                .x_axis(x_id.as_str())
                .y_axis(y_id.as_str())
                .show_legend(trace.show_legend);

            scatter = match trace.mode {
                TraceMode::Lines => {
                    let mut line = Line::new().color(color);
                    if let Some(width) = trace.line_width {
                        line = line.width(width);
                    }
                    scatter.mode(Mode::Lines).line(line)
                }
                TraceMode::Markers => scatter
                    .mode(Mode::Markers)
                    .marker(Marker::new().color(color)),
            };
            if trace.fill == Fill::ToSelf {
                scatter = scatter.fill(PlotlyFill::ToSelf);
            }

            plot.add_trace(scatter);
        }

        let mut layout = Layout::new()
            .height(self.height() as usize)
            .width(self.width() as usize);

        for row in 1..=self.rows() {
            for col in 1..=self.cols() {
                let number = cell_number(Cell::new(row, col), self.cols());
                let (x_id, y_id) = axis_ids(number);

                let mut x_axis = Axis::new()
                    .type_(AxisType::Date)
                    .anchor(y_id.as_str())
                    .domain(&domain(col, self.cols(), HORIZONTAL_SPACING));
                if self.shared_x() && row < self.rows() {
                    let (bottom_x, _) =
                        axis_ids(cell_number(Cell::new(self.rows(), col), self.cols()));
                    x_axis = x_axis
                        .matches(bottom_x.as_str())
                        .show_tick_labels(false);
                }

                // Rows are numbered top-down, plotly domains bottom-up.
                let y_axis = Axis::new()
                    .anchor(x_id.as_str())
                    .domain(&domain(self.rows() - row + 1, self.rows(), VERTICAL_SPACING));

                layout = set_axes(layout, number, x_axis, y_axis);
            }
        }

        plot.set_layout(layout);
        Ok(plot)
    }

    /// The plotly figure as JSON (`{"data": [...], "layout": {...}}`).
    pub fn to_plotly_json(&self) -> Result<String> {
        Ok(self.to_plotly()?.to_json())
    }
}
