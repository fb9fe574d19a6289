//! Time-Indexed Table Module
//! Read-only access to date-indexed Polars frames.

use chrono::{Datelike, NaiveDate};
use log::warn;
use polars::prelude::*;

use crate::error::Result;

/// Index column used when a frame is built through [`TimeTable::from_columns`].
pub const DEFAULT_INDEX_COLUMN: &str = "date";

/// Day number of 1970-01-01 counted from 0001-01-01 (day 1).
const UNIX_EPOCH_CE_DAY: i32 = 719_163;

/// Convert a Polars date value (days since the Unix epoch) to a calendar date.
pub fn date_from_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_CE_DAY)?)
}

/// Days since the Unix epoch, the physical representation of a Polars date.
pub fn days_from_date(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_CE_DAY
}

/// A frame with one date index column and any number of value columns.
#[derive(Debug, Clone)]
pub struct TimeTable {
    df: DataFrame,
    index_col: String,
}

impl TimeTable {
    pub fn new(df: DataFrame, index_col: impl Into<String>) -> Self {
        Self {
            df,
            index_col: index_col.into(),
        }
    }

    /// Build a table from a date index and named float columns.
    pub fn from_columns<S: AsRef<str>>(
        dates: &[NaiveDate],
        columns: &[(S, Vec<f64>)],
    ) -> Result<Self> {
        let days: Vec<i32> = dates.iter().copied().map(days_from_date).collect();
        let mut cols = vec![Column::new(DEFAULT_INDEX_COLUMN.into(), days).cast(&DataType::Date)?];
        for (name, values) in columns {
            cols.push(Column::new(name.as_ref().into(), values.clone()));
        }

        Ok(Self::new(DataFrame::new(cols)?, DEFAULT_INDEX_COLUMN))
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn index_column(&self) -> &str {
        &self.index_col
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Names of all columns except the index.
    pub fn value_columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|name| name != &self.index_col)
            .collect()
    }

    /// The date index in row order.
    ///
    /// `Date` and `Datetime` index columns are both accepted. A null date is
    /// an error since the row cannot be placed on a time axis.
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        let days = self
            .df
            .column(&self.index_col)?
            .cast(&DataType::Date)?
            .cast(&DataType::Int32)?;

        let mut dates = Vec::with_capacity(days.len());
        for day in days.i32()?.into_iter() {
            let date = day.and_then(date_from_days).ok_or_else(|| {
                PolarsError::ComputeError(
                    format!("null or out-of-range date in index column '{}'", self.index_col)
                        .into(),
                )
            })?;
            dates.push(date);
        }

        if dates.windows(2).any(|w| w[1] < w[0]) {
            warn!(
                "index column '{}' is not monotonically ordered",
                self.index_col
            );
        }

        Ok(dates)
    }

    /// Values of a column as floats; nulls and NaNs become `None`.
    pub fn values(&self, column: &str) -> Result<Vec<Option<f64>>> {
        let values = self.df.column(column)?.cast(&DataType::Float64)?;
        let values = values
            .f64()?
            .into_iter()
            .map(|v| v.filter(|v| !v.is_nan()))
            .collect();
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, d).unwrap()
    }

    #[test]
    fn epoch_day_conversion() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(days_from_date(epoch), 0);
        assert_eq!(date_from_days(0), Some(epoch));
        assert_eq!(date_from_days(days_from_date(day(15))), Some(day(15)));
    }

    #[test]
    fn reads_dates_and_values() {
        let table =
            TimeTable::from_columns(&[day(1), day(2), day(3)], &[("cases", vec![4.0, f64::NAN, 6.0])])
                .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.dates().unwrap(), vec![day(1), day(2), day(3)]);
        assert_eq!(
            table.values("cases").unwrap(),
            vec![Some(4.0), None, Some(6.0)]
        );
        assert_eq!(table.value_columns(), vec!["cases".to_string()]);
    }

    #[test]
    fn integer_columns_are_cast_to_float() {
        let df = DataFrame::new(vec![
            Column::new("day".into(), vec![0i32, 1])
                .cast(&DataType::Date)
                .unwrap(),
            Column::new("count".into(), vec![Some(3i64), None]),
        ])
        .unwrap();
        let table = TimeTable::new(df, "day");

        assert_eq!(table.values("count").unwrap(), vec![Some(3.0), None]);
        assert_eq!(
            table.dates().unwrap()[1],
            NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()
        );
    }

    #[test]
    fn missing_column_is_a_table_error() {
        let table = TimeTable::from_columns(&[day(1)], &[("cases", vec![1.0])]).unwrap();
        assert!(matches!(
            table.values("deaths"),
            Err(crate::error::ChartError::Table(_))
        ));
    }

    #[test]
    fn empty_table_has_no_dates() {
        let table = TimeTable::from_columns::<&str>(&[], &[]).unwrap();
        assert!(table.is_empty());
        assert!(table.dates().unwrap().is_empty());
    }
}
