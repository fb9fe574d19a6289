//! Chart Builder Module
//! Turns a panel layout and the caller's tables into a chart description.

use chrono::NaiveDate;
use log::debug;

use super::band::uncertainty_band;
use super::layout::{Layer, PanelLayout};
use super::model::{Cell, Chart, Trace};
use crate::data::{QuantileTable, TimeTable};
use crate::error::{ChartError, Result};

/// Tables a layout may draw from. Only the model table is mandatory; a layer
/// needing a missing table fails with [`ChartError::MissingInput`].
#[derive(Debug, Clone, Copy)]
pub struct ChartInputs<'a> {
    pub model: &'a QuantileTable,
    pub cases: Option<&'a TimeTable>,
    pub mobility: Option<&'a TimeTable>,
    pub vaccination: Option<&'a TimeTable>,
}

impl<'a> ChartInputs<'a> {
    pub fn new(model: &'a QuantileTable) -> Self {
        Self {
            model,
            cases: None,
            mobility: None,
            vaccination: None,
        }
    }

    pub fn with_cases(mut self, cases: &'a TimeTable) -> Self {
        self.cases = Some(cases);
        self
    }

    pub fn with_mobility(mut self, mobility: &'a TimeTable) -> Self {
        self.mobility = Some(mobility);
        self
    }

    pub fn with_vaccination(mut self, vaccination: &'a TimeTable) -> Self {
        self.vaccination = Some(vaccination);
        self
    }
}

/// Builds charts for one panel layout.
#[derive(Debug, Clone, Default)]
pub struct ChartBuilder {
    layout: PanelLayout,
}

impl ChartBuilder {
    pub fn new(layout: PanelLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    /// Emit traces panel by panel, layer by layer, in layout order.
    pub fn build(&self, inputs: &ChartInputs<'_>) -> Result<Chart> {
        self.layout.validate()?;

        let layout = &self.layout;
        let mut chart = Chart::new(
            layout.rows,
            layout.cols,
            layout.shared_x,
            layout.height,
            layout.width,
        );
        let index = inputs.model.index()?;

        for panel in &layout.panels {
            let before = chart.traces().len();
            for layer in &panel.layers {
                for trace in self.layer_traces(layer, panel.cell, &index, inputs)? {
                    chart.add_trace(trace);
                }
            }
            debug!(
                "panel ({}, {}): {} traces",
                panel.cell.row,
                panel.cell.col,
                chart.traces().len() - before
            );
        }

        debug!(
            "built {}x{} chart with {} traces across {} panels",
            chart.rows(),
            chart.cols(),
            chart.traces().len(),
            chart.populated_cells().len()
        );
        Ok(chart)
    }

    fn layer_traces(
        &self,
        layer: &Layer,
        cell: Cell,
        index: &[NaiveDate],
        inputs: &ChartInputs<'_>,
    ) -> Result<Vec<Trace>> {
        let levels = self.layout.levels;

        let traces = match layer {
            Layer::ModelQuantity {
                quantity,
                label,
                color,
            } => {
                let median = inputs.model.quantile(quantity, levels.median)?;
                let low = inputs.model.quantile(quantity, levels.low)?;
                let high = inputs.model.quantile(quantity, levels.high)?;

                vec![
                    Trace::line(label.as_str(), index.to_vec(), median)
                        .color(color.as_str())
                        .at(cell),
                    uncertainty_band(index, &low, &high, color)
                        .named(label.as_str())
                        .at(cell),
                ]
            }
            Layer::ReportedCases {
                column,
                label,
                color,
            } => {
                let cases = inputs.cases.ok_or(ChartError::MissingInput("case"))?;
                vec![Trace::markers(label.as_str(), cases.dates()?, cases.values(column)?)
                    .color(color.as_str())
                    .at(cell)]
            }
            Layer::Mobility {
                columns,
                label,
                color,
            } => {
                let mobility = inputs
                    .mobility
                    .ok_or(ChartError::MissingInput("mobility"))?;
                let dates = mobility.dates()?;
                columns
                    .iter()
                    .map(|column| {
                        Ok(Trace::line(label.as_str(), dates.clone(), mobility.values(column)?)
                            .color(color.as_str())
                            .at(cell))
                    })
                    .collect::<Result<Vec<_>>>()?
            }
            Layer::Vaccination {
                column,
                label,
                color,
            } => {
                let vax = inputs
                    .vaccination
                    .ok_or(ChartError::MissingInput("vaccination"))?;
                let mut trace = Trace::line(label.as_str(), vax.dates()?, vax.values(column)?).at(cell);
                trace.color = color.clone();
                vec![trace]
            }
        };

        Ok(traces)
    }
}

/// Cases (row 1) and Rt (row 2) in the first column of a 2x2 grid,
/// 700 x 1200.
pub fn build_basic_chart(model_data: &QuantileTable, case_data: &TimeTable) -> Result<Chart> {
    ChartBuilder::new(PanelLayout::basic()).build(&ChartInputs::new(model_data).with_cases(case_data))
}

/// Cases and Rt across row 1, mobility and vaccination across row 2,
/// 800 x 1200.
pub fn build_extended_chart(
    model_data: &QuantileTable,
    case_data: &TimeTable,
    mobility_data: &TimeTable,
    vax_data: &TimeTable,
) -> Result<Chart> {
    let inputs = ChartInputs::new(model_data)
        .with_cases(case_data)
        .with_mobility(mobility_data)
        .with_vaccination(vax_data);
    ChartBuilder::new(PanelLayout::extended()).build(&inputs)
}
