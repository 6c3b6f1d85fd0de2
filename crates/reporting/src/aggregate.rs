//! Best/worst selection and full per-metric aggregates over records.

use crate::breakdown::share_breakdown;
use crate::dispersion;
use insights_core::{
    DerivedAggregate, InsightsError, InsightsResult, MetricDirection, MetricRecord, MetricSummary,
};
use tracing::debug;

/// Pull `metric` out of every record, failing on the first record without it.
pub(crate) fn metric_values(records: &[MetricRecord], metric: &str) -> InsightsResult<Vec<f64>> {
    if records.is_empty() {
        return Err(InsightsError::invalid("records must not be empty"));
    }
    records
        .iter()
        .map(|r| {
            r.metric(metric).ok_or_else(|| {
                InsightsError::invalid(format!(
                    "record '{}' has no metric '{}'",
                    r.key, metric
                ))
            })
        })
        .collect()
}

/// Indices of the best and worst value. Left-to-right scan; the first
/// element encountered keeps its place on ties.
fn extreme_indices(values: &[f64], direction: MetricDirection) -> (usize, usize) {
    let mut best = 0;
    let mut worst = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if direction.beats(v, values[best]) {
            best = i;
        }
        if direction.beats(values[worst], v) {
            worst = i;
        }
    }
    (best, worst)
}

/// Mean of `metric` plus the best and worst records under `direction`.
pub fn mean_and_extremes(
    records: &[MetricRecord],
    metric: &str,
    direction: MetricDirection,
) -> InsightsResult<MetricSummary> {
    let values = metric_values(records, metric)?;
    let mean = dispersion::mean(&values)?;
    let (best, worst) = extreme_indices(&values, direction);

    Ok(MetricSummary {
        mean,
        best: records[best].clone(),
        worst: records[worst].clone(),
    })
}

/// Everything the dashboard shows for one metric column.
pub fn derive_aggregate(
    records: &[MetricRecord],
    metric: &str,
    direction: MetricDirection,
) -> InsightsResult<DerivedAggregate> {
    let values = metric_values(records, metric)?;
    let mean = dispersion::mean(&values)?;
    let std_dev = dispersion::standard_deviation(&values)?;
    let (best, worst) = extreme_indices(&values, direction);
    let shares = share_breakdown(records, metric)?;
    let total = values.iter().sum();

    debug!(
        metric,
        count = values.len(),
        mean,
        std_dev,
        best = %records[best].key,
        worst = %records[worst].key,
        "Derived aggregate computed"
    );

    Ok(DerivedAggregate {
        metric: metric.to_string(),
        direction,
        count: values.len(),
        total,
        mean,
        std_dev,
        best: records[best].clone(),
        worst: records[worst].clone(),
        shares,
    })
}
