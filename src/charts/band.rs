//! Uncertainty band construction.

use chrono::NaiveDate;
use log::warn;

use super::model::{Fill, Trace, TraceMode};

/// `forward` followed by `backward` reversed: the outline of a closed ribbon.
fn outline<T: Clone>(forward: &[T], backward: &[T]) -> Vec<T> {
    forward
        .iter()
        .chain(backward.iter().rev())
        .cloned()
        .collect()
}

/// Filled ribbon between the `low` and `high` quantile series.
///
/// The x path walks the index forward then backward; the y path walks `low`
/// forward then `high` backward, so the shape closes on itself. The border
/// is invisible and the trace stays out of the legend. Name and cell are left
/// at their defaults for the caller to set.
pub fn uncertainty_band(
    index: &[NaiveDate],
    low: &[Option<f64>],
    high: &[Option<f64>],
    color: &str,
) -> Trace {
    if low.len() != index.len() || high.len() != index.len() {
        warn!(
            "band bounds have {} / {} points for an index of {}",
            low.len(),
            high.len(),
            index.len()
        );
    }

    Trace {
        mode: TraceMode::Lines,
        color: Some(color.to_string()),
        line_width: Some(0.0),
        fill: Fill::ToSelf,
        show_legend: false,
        ..Trace::line(String::new(), outline(index, index), outline(low, high))
    }
}
