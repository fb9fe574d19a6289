//! Data module - date-indexed tables handed over by the caller

mod quantiles;
mod table;

pub use quantiles::{quantile_column, QuantileTable};
pub use table::{date_from_days, days_from_date, TimeTable, DEFAULT_INDEX_COLUMN};
