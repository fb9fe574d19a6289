//! Panel Layout Module
//! Declarative description of which series go in which grid cell.
//!
//! A layout is plain serde data, so callers can keep alternative layouts as
//! JSON. Every field has a default; a partial document fills the rest from
//! the basic layout.

use serde::{Deserialize, Serialize};

use super::model::Cell;
use crate::error::{ChartError, Result};

/// Modelled case notifications.
pub const CASES_COLOR: &str = "#636EFA";
/// Reproduction number estimate.
pub const RT_COLOR: &str = "#00CC96";
pub const OBSERVED_COLOR: &str = "black";
pub const MOBILITY_COLOR: &str = "black";

pub const CASES_QUANTITY: &str = "weekly_sum";
pub const RT_QUANTITY: &str = "R";
pub const CASES_COLUMN: &str = "cases";

pub const MOBILITY_COLUMNS: [&str; 3] = [
    "transit_stations_percent_change_from_baseline",
    "workplaces_percent_change_from_baseline",
    "residential_percent_change_from_baseline",
];
pub const VACCINATION_COLUMN: &str = "people_fully_vaccinated_per_hundred";

/// Quantile levels used for the median line and the band edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandLevels {
    pub median: f64,
    pub low: f64,
    pub high: f64,
}

impl Default for BandLevels {
    fn default() -> Self {
        Self {
            median: 0.50,
            low: 0.05,
            high: 0.95,
        }
    }
}

/// One series group drawn into a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    /// Median line plus uncertainty band of a model quantity.
    ModelQuantity {
        quantity: String,
        label: String,
        color: String,
    },
    /// Observed counts as markers.
    ReportedCases {
        #[serde(default = "default_cases_column")]
        column: String,
        label: String,
        color: String,
    },
    /// One line per column, all with the same label and color.
    Mobility {
        columns: Vec<String>,
        label: String,
        color: String,
    },
    Vaccination {
        column: String,
        label: String,
        #[serde(default)]
        color: Option<String>,
    },
}

fn default_cases_column() -> String {
    CASES_COLUMN.to_string()
}

impl Layer {
    pub fn model_quantity(quantity: &str, label: &str, color: &str) -> Self {
        Layer::ModelQuantity {
            quantity: quantity.to_string(),
            label: label.to_string(),
            color: color.to_string(),
        }
    }

    pub fn reported_cases() -> Self {
        Layer::ReportedCases {
            column: CASES_COLUMN.to_string(),
            label: "Reported cases".to_string(),
            color: OBSERVED_COLOR.to_string(),
        }
    }

    pub fn mobility() -> Self {
        Layer::Mobility {
            columns: MOBILITY_COLUMNS.iter().map(|c| c.to_string()).collect(),
            label: "Mobility".to_string(),
            color: MOBILITY_COLOR.to_string(),
        }
    }

    pub fn vaccination() -> Self {
        Layer::Vaccination {
            column: VACCINATION_COLUMN.to_string(),
            label: "Vaccination".to_string(),
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub cell: Cell,
    pub layers: Vec<Layer>,
}

impl Panel {
    pub fn new(row: usize, col: usize, layers: Vec<Layer>) -> Self {
        Self {
            cell: Cell::new(row, col),
            layers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelLayout {
    pub rows: usize,
    pub cols: usize,
    pub shared_x: bool,
    pub height: u32,
    pub width: u32,
    pub levels: BandLevels,
    /// Panels in drawing order; traces are emitted panel by panel.
    pub panels: Vec<Panel>,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self::basic()
    }
}

impl PanelLayout {
    /// Cases in row 1 and Rt in row 2 of the first column; the second
    /// column stays empty.
    pub fn basic() -> Self {
        Self {
            rows: 2,
            cols: 2,
            shared_x: true,
            height: 700,
            width: 1200,
            levels: BandLevels::default(),
            panels: vec![
                Panel::new(
                    1,
                    1,
                    vec![
                        Layer::model_quantity(CASES_QUANTITY, "Modelled cases", CASES_COLOR),
                        Layer::reported_cases(),
                    ],
                ),
                Panel::new(2, 1, vec![Layer::model_quantity(RT_QUANTITY, "Rt", RT_COLOR)]),
            ],
        }
    }

    /// Cases and Rt side by side in row 1; mobility and vaccination below.
    pub fn extended() -> Self {
        Self {
            height: 800,
            panels: vec![
                Panel::new(
                    1,
                    1,
                    vec![
                        Layer::model_quantity(CASES_QUANTITY, "Modelled cases", CASES_COLOR),
                        Layer::reported_cases(),
                    ],
                ),
                Panel::new(1, 2, vec![Layer::model_quantity(RT_QUANTITY, "Rt", RT_COLOR)]),
                Panel::new(2, 1, vec![Layer::mobility()]),
                Panel::new(2, 2, vec![Layer::vaccination()]),
            ],
            ..Self::basic()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let layout: Self = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Every panel must sit inside the grid.
    pub fn validate(&self) -> Result<()> {
        for panel in &self.panels {
            let Cell { row, col } = panel.cell;
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_differ_in_rt_position() {
        let basic = PanelLayout::basic();
        let extended = PanelLayout::extended();

        let rt_cell = |layout: &PanelLayout| {
            layout
                .panels
                .iter()
                .find(|p| {
                    p.layers
                        .iter()
                        .any(|l| matches!(l, Layer::ModelQuantity { quantity, .. } if quantity == RT_QUANTITY))
                })
                .map(|p| p.cell)
        };

        assert_eq!(rt_cell(&basic), Some(Cell::new(2, 1)));
        assert_eq!(rt_cell(&extended), Some(Cell::new(1, 2)));
        assert_eq!((basic.height, basic.width), (700, 1200));
        assert_eq!((extended.height, extended.width), (800, 1200));
    }

    #[test]
    fn partial_json_falls_back_to_basic() {
        let layout = PanelLayout::from_json(r#"{"height": 500}"#).unwrap();
        assert_eq!(layout.height, 500);
        assert_eq!(layout.width, 1200);
        assert_eq!(layout.panels, PanelLayout::basic().panels);
        assert_eq!(layout.levels, BandLevels::default());
    }

    #[test]
    fn parses_tagged_layers() {
        let json = r#"{
            "rows": 1,
            "cols": 1,
            "levels": {"low": 0.25, "high": 0.75},
            "panels": [
                {"cell": {"row": 1, "col": 1}, "layers": [
                    {"kind": "model_quantity", "quantity": "R", "label": "Rt", "color": "red"},
                    {"kind": "vaccination", "column": "coverage", "label": "Vaccination"}
                ]}
            ]
        }"#;
        let layout = PanelLayout::from_json(json).unwrap();

        assert_eq!(layout.levels.median, 0.50);
        assert_eq!(layout.levels.low, 0.25);
        assert_eq!(
            layout.panels[0].layers[1],
            Layer::Vaccination {
                column: "coverage".into(),
                label: "Vaccination".into(),
                color: None,
            }
        );
    }

    #[test]
    fn rejects_cells_outside_grid() {
        let json = r#"{"rows": 1, "cols": 1, "panels": [{"cell": {"row": 2, "col": 1}, "layers": []}]}"#;
        assert!(matches!(
            PanelLayout::from_json(json),
            Err(ChartError::CellOutOfGrid { row: 2, col: 1, .. })
        ));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            PanelLayout::from_json("{\"rows\": \"two\"}"),
            Err(ChartError::Config(_))
        ));
    }
}
