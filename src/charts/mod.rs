//! Charts module - chart description, builder and rendering

mod band;
mod builder;
mod export;
mod layout;
mod model;
mod renderer;

pub use band::uncertainty_band;
pub use builder::{build_basic_chart, build_extended_chart, ChartBuilder, ChartInputs};
pub use layout::{
    BandLevels, Layer, Panel, PanelLayout, CASES_COLOR, CASES_COLUMN, CASES_QUANTITY,
    MOBILITY_COLOR, MOBILITY_COLUMNS, OBSERVED_COLOR, RT_COLOR, RT_QUANTITY, VACCINATION_COLUMN,
};
pub use model::{Cell, Chart, Fill, Trace, TraceMode, DEFAULT_COLORWAY};
pub use renderer::{RenderOptions, StaticChartRenderer};
