//! Quantile Table Module
//! Model output with one column per (quantity, quantile level) pair.

use chrono::NaiveDate;
use polars::prelude::DataFrame;

use super::table::TimeTable;
use crate::error::Result;

/// Column name holding `level` of `quantity`, e.g. `weekly_sum_0.05`.
pub fn quantile_column(quantity: &str, level: f64) -> String {
    format!("{quantity}_{level:.2}")
}

/// Split a quantile column name back into quantity and level.
fn parse_quantile_column(name: &str) -> Option<(&str, f64)> {
    let (quantity, level) = name.rsplit_once('_')?;
    let level: f64 = level.parse().ok()?;
    ((0.0..=1.0).contains(&level) && !quantity.is_empty()).then_some((quantity, level))
}

/// Date-indexed model estimates decomposed into quantiles.
#[derive(Debug, Clone)]
pub struct QuantileTable {
    table: TimeTable,
}

impl QuantileTable {
    pub fn new(df: DataFrame, index_col: impl Into<String>) -> Self {
        Self {
            table: TimeTable::new(df, index_col),
        }
    }

    /// Build a table from `(quantity, [(level, values)])` groups.
    pub fn from_quantiles(
        dates: &[NaiveDate],
        quantities: &[(&str, Vec<(f64, Vec<f64>)>)],
    ) -> Result<Self> {
        let columns: Vec<(String, Vec<f64>)> = quantities
            .iter()
            .flat_map(|(quantity, levels)| {
                levels
                    .iter()
                    .map(move |(level, values)| (quantile_column(quantity, *level), values.clone()))
            })
            .collect();

        Ok(Self {
            table: TimeTable::from_columns(dates, &columns)?,
        })
    }

    pub fn table(&self) -> &TimeTable {
        &self.table
    }

    pub fn index(&self) -> Result<Vec<NaiveDate>> {
        self.table.dates()
    }

    /// One quantile level of a quantity, in index order.
    pub fn quantile(&self, quantity: &str, level: f64) -> Result<Vec<Option<f64>>> {
        self.table.values(&quantile_column(quantity, level))
    }

    /// Distinct quantity names, in column order.
    pub fn quantities(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for column in self.table.value_columns() {
            if let Some((quantity, _)) = parse_quantile_column(&column) {
                if !names.iter().any(|n| n == quantity) {
                    names.push(quantity.to_string());
                }
            }
        }
        names
    }

    /// Quantile levels available for `quantity`, ascending.
    pub fn levels(&self, quantity: &str) -> Vec<f64> {
        let mut levels: Vec<f64> = self
            .table
            .value_columns()
            .iter()
            .filter_map(|c| parse_quantile_column(c))
            .filter(|(q, _)| *q == quantity)
            .map(|(_, level)| level)
            .collect();
        levels.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        levels
    }
}

impl From<TimeTable> for QuantileTable {
    fn from(table: TimeTable) -> Self {
        Self { table }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> QuantileTable {
        let dates = [
            NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 6, 8).unwrap(),
        ];
        QuantileTable::from_quantiles(
            &dates,
            &[
                (
                    "weekly_sum",
                    vec![(0.05, vec![1.0, 2.0]), (0.5, vec![3.0, 4.0]), (0.95, vec![5.0, 6.0])],
                ),
                ("R", vec![(0.05, vec![0.8, 0.9]), (0.5, vec![1.0, 1.1]), (0.95, vec![1.2, 1.3])]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn column_naming() {
        assert_eq!(quantile_column("weekly_sum", 0.05), "weekly_sum_0.05");
        assert_eq!(quantile_column("R", 0.5), "R_0.50");
        assert_eq!(parse_quantile_column("weekly_sum_0.95"), Some(("weekly_sum", 0.95)));
        assert_eq!(parse_quantile_column("cases"), None);
        assert_eq!(parse_quantile_column("x_2.00"), None);
    }

    #[test]
    fn reads_quantile_levels() {
        let model = model();
        assert_eq!(model.quantile("weekly_sum", 0.95).unwrap(), vec![Some(5.0), Some(6.0)]);
        assert_eq!(model.quantile("R", 0.50).unwrap(), vec![Some(1.0), Some(1.1)]);
        assert_eq!(model.index().unwrap().len(), 2);
    }

    #[test]
    fn lists_quantities_and_levels() {
        let model = model();
        assert_eq!(model.quantities(), vec!["weekly_sum".to_string(), "R".to_string()]);
        assert_eq!(model.levels("R"), vec![0.05, 0.5, 0.95]);
        assert!(model.levels("deaths").is_empty());
    }

    #[test]
    fn missing_level_errors() {
        assert!(model().quantile("R", 0.25).is_err());
    }
}
