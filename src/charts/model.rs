//! Chart Model Module
//! Renderer-independent description of a subplot grid and its traces.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{ChartError, Result};

/// Default trace colors, assigned by trace position when a trace has no
/// explicit color (plotly's default colorway).
pub const DEFAULT_COLORWAY: [&str; 10] = [
    "#636EFA", "#EF553B", "#00CC96", "#AB63FA", "#FFA15A", "#19D3F3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

/// Grid position of a panel, 1-based like `make_subplots`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceMode {
    Lines,
    Markers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
    None,
    /// Close the trace path on itself and fill the enclosed area.
    ToSelf,
}

/// One series drawn in one panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub cell: Cell,
    pub mode: TraceMode,
    pub x: Vec<NaiveDate>,
    pub y: Vec<Option<f64>>,
    /// `None` takes the default colorway entry for the trace's position.
    pub color: Option<String>,
    pub line_width: Option<f64>,
    pub fill: Fill,
    pub show_legend: bool,
}

impl Trace {
    pub fn line(name: impl Into<String>, x: Vec<NaiveDate>, y: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            cell: Cell::new(1, 1),
            mode: TraceMode::Lines,
            x,
            y,
            color: None,
            line_width: None,
            fill: Fill::None,
            show_legend: true,
        }
    }

    pub fn markers(name: impl Into<String>, x: Vec<NaiveDate>, y: Vec<Option<f64>>) -> Self {
        Self {
            mode: TraceMode::Markers,
            ..Self::line(name, x, y)
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn at(mut self, cell: Cell) -> Self {
        self.cell = cell;
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// A rows x cols panel grid with its traces in drawing order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    rows: usize,
    cols: usize,
    shared_x: bool,
    height: u32,
    width: u32,
    traces: Vec<Trace>,
}

impl Chart {
    pub fn new(rows: usize, cols: usize, shared_x: bool, height: u32, width: u32) -> Self {
        Self {
            rows,
            cols,
            shared_x,
            height,
            width,
            traces: Vec::new(),
        }
    }

    pub fn add_trace(&mut self, trace: Trace) {
        self.traces.push(trace);
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shared_x(&self) -> bool {
        self.shared_x
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    /// Cells holding at least one trace.
    pub fn populated_cells(&self) -> BTreeSet<Cell> {
        self.traces.iter().map(|t| t.cell).collect()
    }

    pub fn traces_in(&self, cell: Cell) -> impl Iterator<Item = &Trace> {
        self.traces.iter().filter(move |t| t.cell == cell)
    }

    /// Names of traces shown in the legend, in trace order. Repeated names
    /// are kept.
    pub fn legend_entries(&self) -> Vec<&str> {
        self.traces
            .iter()
            .filter(|t| t.show_legend)
            .map(|t| t.name.as_str())
            .collect()
    }

    /// Effective color of the trace at `index`.
    pub fn trace_color(&self, index: usize) -> &str {
        self.traces
            .get(index)
            .and_then(|t| t.color.as_deref())
            .unwrap_or(DEFAULT_COLORWAY[index % DEFAULT_COLORWAY.len()])
    }

    /// Earliest and latest date over every trace in grid column `col`.
    pub fn x_extent(&self, col: usize) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self
            .traces
            .iter()
            .filter(|t| t.cell.col == col)
            .flat_map(|t| t.x.iter().copied());
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Every trace must sit inside the grid.
    pub fn check_cells(&self) -> Result<()> {
        for trace in &self.traces {
            let Cell { row, col } = trace.cell;
            if row == 0 || col == 0 || row > self.rows || col > self.cols {
                return Err(ChartError::CellOutOfGrid {
                    row,
                    col,
                    rows: self.rows,
                    cols: self.cols,
                });
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    fn sample() -> Chart {
        let mut chart = Chart::new(2, 2, true, 700, 1200);
        chart.add_trace(
            Trace::line("Rt", vec![day(3), day(4)], vec![Some(1.0), Some(0.9)]).color("#00CC96"),
        );
        chart.add_trace(
            Trace::markers("Reported cases", vec![day(1), day(2)], vec![Some(5.0), None])
                .at(Cell::new(2, 1)),
        );
        chart.add_trace(Trace::line("Vaccination", vec![day(9)], vec![Some(3.0)]).at(Cell::new(2, 2)));
        chart
    }

    #[test]
    fn cells_and_legend() {
        let chart = sample();
        let cells: Vec<Cell> = chart.populated_cells().into_iter().collect();
        assert_eq!(cells, vec![Cell::new(1, 1), Cell::new(2, 1), Cell::new(2, 2)]);
        assert_eq!(chart.traces_in(Cell::new(2, 1)).count(), 1);
        assert_eq!(chart.traces_in(Cell::new(1, 2)).count(), 0);
        assert_eq!(chart.legend_entries(), vec!["Rt", "Reported cases", "Vaccination"]);
    }

    #[test]
    fn default_colors_follow_trace_position() {
        let chart = sample();
        assert_eq!(chart.trace_color(0), "#00CC96");
        assert_eq!(chart.trace_color(1), DEFAULT_COLORWAY[1]);
        assert_eq!(chart.trace_color(2), DEFAULT_COLORWAY[2]);
    }

    #[test]
    fn x_extent_spans_the_column() {
        let chart = sample();
        assert_eq!(chart.x_extent(1), Some((day(1), day(4))));
        assert_eq!(chart.x_extent(2), Some((day(9), day(9))));
        assert_eq!(chart.x_extent(3), None);
    }

    #[test]
    fn json_uses_lowercase_modes_and_null_gaps() {
        let json = sample().to_json().unwrap();
        assert!(json.contains("\"mode\":\"markers\""));
        assert!(json.contains("[5.0,null]"));
        assert!(json.contains("\"2021-01-01\""));
    }
}
