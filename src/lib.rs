//! epichart - multi-panel epidemic charts
//!
//! Combines model estimates (median plus uncertainty band), reported cases,
//! mobility and vaccination series into subplot grids. Tables come in as
//! Polars frames; charts go out as a serializable description, a plotly
//! figure, or static SVG/PNG.

pub mod charts;
pub mod data;
pub mod error;

pub use charts::{
    build_basic_chart, build_extended_chart, uncertainty_band, Cell, Chart, ChartBuilder,
    ChartInputs, Layer, PanelLayout, StaticChartRenderer, Trace,
};
pub use data::{QuantileTable, TimeTable};
pub use error::{ChartError, Result};
