//! Trailing simple moving averages over ordered time series.

use crate::aggregate::metric_values;
use crate::dispersion::check_finite;
use insights_core::{InsightsError, InsightsResult, MetricRecord};

/// Seven-day trailing window used by the trend charts.
pub const DEFAULT_WINDOW: usize = 7;

/// Trailing `window`-period mean, inclusive of the current point.
///
/// The first `window - 1` positions have no full window and yield `None`;
/// a short-window average is never computed.
pub fn rolling_average(values: &[f64], window: usize) -> InsightsResult<Vec<Option<f64>>> {
    if window == 0 {
        return Err(InsightsError::invalid("window must be at least 1"));
    }
    check_finite(values)?;

    let mut out = Vec::with_capacity(values.len());
    out.extend((0..values.len().min(window - 1)).map(|_| None));
    out.extend(
        values
            .windows(window)
            .map(|w| Some(w.iter().sum::<f64>() / window as f64)),
    );
    Ok(out)
}

/// [`rolling_average`] over the `field` metric of each record, in order.
pub fn rolling_average_of(
    records: &[MetricRecord],
    field: &str,
    window: usize,
) -> InsightsResult<Vec<Option<f64>>> {
    if records.is_empty() {
        return rolling_average(&[], window);
    }
    let values = metric_values(records, field)?;
    rolling_average(&values, window)
}
