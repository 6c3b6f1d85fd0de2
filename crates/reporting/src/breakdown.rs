//! Percentage-of-total breakdowns, as fed to progress bars and share charts.

use crate::aggregate::metric_values;
use insights_core::{InsightsResult, MetricRecord, Share};

/// `part / total * 100`, clamped to `[0, 100]`.
///
/// A non-positive total yields `0.0`, as does any non-finite intermediate.
pub fn percentage_of_total(part: f64, total: f64) -> f64 {
    if total <= 0.0 || total.is_nan() {
        return 0.0;
    }
    let pct = part / total * 100.0;
    if pct.is_finite() {
        pct.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Each record's share of the `metric` column total, in input order.
pub fn share_breakdown(records: &[MetricRecord], metric: &str) -> InsightsResult<Vec<Share>> {
    let values = metric_values(records, metric)?;
    let total: f64 = values.iter().sum();

    Ok(records
        .iter()
        .zip(values)
        .map(|(r, value)| Share {
            key: r.key.clone(),
            value,
            percent: percentage_of_total(value, total),
        })
        .collect())
}
