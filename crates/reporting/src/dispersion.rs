//! Arithmetic mean and population standard deviation.

use insights_core::{InsightsError, InsightsResult};

fn check_values(values: &[f64]) -> InsightsResult<()> {
    if values.is_empty() {
        return Err(InsightsError::invalid("values must not be empty"));
    }
    check_finite(values)
}

/// Reject NaN and infinities, naming the first offending index.
pub(crate) fn check_finite(values: &[f64]) -> InsightsResult<()> {
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(InsightsError::invalid(format!(
            "value at index {} is not finite",
            pos
        )));
    }
    Ok(())
}

/// `sum / n`. Fails on empty or non-finite input.
pub fn mean(values: &[f64]) -> InsightsResult<f64> {
    check_values(values)?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation: `sqrt(mean((x - mean)^2))`.
pub fn standard_deviation(values: &[f64]) -> InsightsResult<f64> {
    let mu = mean(values)?;
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    Ok(variance.sqrt())
}
