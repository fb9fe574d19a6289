//! Crate error type.

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Table error: {0}")]
    Table(#[from] PolarsError),
    #[error("Layout needs the {0} table but none was supplied")]
    MissingInput(&'static str),
    #[error("Panel at row {row}, col {col} is outside the {rows}x{cols} grid")]
    CellOutOfGrid {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("Grid has {0} cells, plotly export supports at most 8")]
    GridTooLarge(usize),
    #[error("Invalid layout config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Failed to render chart: {0}")]
    Render(String),
    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, ChartError>;
