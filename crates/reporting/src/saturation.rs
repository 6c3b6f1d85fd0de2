//! Diminishing-returns (saturation) curves and break-even spend selection.
//!
//! Curve parameters are derived from a hash of the channel id, so the same
//! channel always produces the same curve without any external randomness.

use insights_core::{InsightsError, InsightsResult, SaturationPoint, SpendRange};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound on generated points; protects against a tiny step over a
/// huge range.
pub const MAX_CURVE_POINTS: usize = 10_000;

/// Marginal return at which one more unit of spend just pays for itself.
pub const BREAK_EVEN_MARGINAL: f64 = 1.0;

/// Sum of the Unicode scalar values of `channel_id`.
pub fn channel_seed(channel_id: &str) -> u64 {
    channel_id.chars().map(|c| c as u64).sum()
}

/// Shape parameters of one channel's curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveParams {
    /// Return per unit of spend at the first step (2.0 to 4.9).
    pub initial_return: f64,
    /// Base decay exponent (0.15 to 0.34).
    pub decay_rate: f64,
}

impl CurveParams {
    pub fn for_channel(channel_id: &str) -> Self {
        let seed = channel_seed(channel_id);
        Self {
            initial_return: 2.0 + (seed % 30) as f64 / 10.0,
            decay_rate: 0.15 + (seed % 20) as f64 / 100.0,
        }
    }

    /// Average return per unit of spend at `spend`:
    /// `initial * (spend / step)^(-decay * spend / max_spend)`.
    ///
    /// The exponent grows with the relative position in the domain, so the
    /// decay accelerates at higher spend.
    pub fn returns_at(&self, spend: f64, step: f64, max_spend: f64) -> f64 {
        let exponent = -self.decay_rate * (spend / max_spend);
        self.initial_return * (spend / step).powf(exponent)
    }

    /// Total return at `spend`. Non-positive spend earns nothing.
    fn cumulative_at(&self, spend: f64, step: f64, max_spend: f64) -> f64 {
        if spend <= 0.0 {
            0.0
        } else {
            self.returns_at(spend, step, max_spend) * spend
        }
    }
}

fn validate(range: &SpendRange, step: f64) -> InsightsResult<usize> {
    if !step.is_finite() || step <= 0.0 {
        return Err(InsightsError::invalid(format!(
            "step must be a positive number, got {}",
            step
        )));
    }
    if !range.min.is_finite() || !range.max.is_finite() {
        return Err(InsightsError::invalid("spend range bounds must be finite"));
    }
    if range.min <= 0.0 {
        return Err(InsightsError::invalid(format!(
            "minimum spend must be positive, got {}",
            range.min
        )));
    }
    if range.max < range.min {
        return Err(InsightsError::invalid(format!(
            "maximum spend {} is below minimum spend {}",
            range.max, range.min
        )));
    }
    if let Some(current) = range.current {
        if !current.is_finite() {
            return Err(InsightsError::invalid("current spend must be finite"));
        }
    }

    // Half-step tolerance so that float noise in max never drops the last point.
    let intervals = ((range.max - range.min) / step + 0.5).floor();
    let intervals = if range.min + intervals * step > range.max + step * 1e-9 {
        intervals - 1.0
    } else {
        intervals
    };
    if !intervals.is_finite() || intervals > (MAX_CURVE_POINTS - 1) as f64 {
        return Err(InsightsError::invalid(format!(
            "curve would exceed {} points",
            MAX_CURVE_POINTS
        )));
    }
    let count = intervals as usize + 1;
    Ok(count)
}

/// Sample a channel's saturation curve at `range.min, range.min + step, ...`
/// up to and including `range.max`.
pub fn generate_saturation_curve(
    channel_id: &str,
    range: SpendRange,
    step: f64,
) -> InsightsResult<Vec<SaturationPoint>> {
    let count = validate(&range, step)?;
    let params = CurveParams::for_channel(channel_id);

    let mut curve: Vec<SaturationPoint> = (0..count)
        .map(|i| {
            let spend = range.min + i as f64 * step;
            let roas = params.returns_at(spend, step, range.max);
            let cumulative_return = roas * spend;
            let previous = params.cumulative_at(spend - step, step, range.max);
            SaturationPoint {
                spend,
                roas,
                cumulative_return,
                marginal_return: (cumulative_return - previous) / step,
                is_current: false,
                is_max_saturation: false,
            }
        })
        .collect();

    if let Some(current) = range.current {
        let mut nearest = 0;
        for (i, point) in curve.iter().enumerate().skip(1) {
            if (point.spend - current).abs() < (curve[nearest].spend - current).abs() {
                nearest = i;
            }
        }
        curve[nearest].is_current = true;
    }
    if let Some(last) = curve.last_mut() {
        last.is_max_saturation = true;
    }

    debug!(
        channel_id,
        points = curve.len(),
        initial_return = params.initial_return,
        decay_rate = params.decay_rate,
        "Saturation curve generated"
    );

    Ok(curve)
}

/// Midpoint of the first break-even crossing: the last point with marginal
/// return `>= 1.0` and the point right after it with marginal `< 1.0`.
/// Without a crossing, the spend of the final point.
pub fn find_optimal_spend(curve: &[SaturationPoint]) -> InsightsResult<f64> {
    let last = curve
        .last()
        .ok_or_else(|| InsightsError::invalid("curve must not be empty"))?;

    if let Some(pos) = curve.windows(2).position(|w| w[1].spend <= w[0].spend) {
        return Err(InsightsError::invalid(format!(
            "curve spend must be strictly increasing (index {})",
            pos + 1
        )));
    }

    let optimal = curve
        .windows(2)
        .find(|w| {
            w[0].marginal_return >= BREAK_EVEN_MARGINAL && w[1].marginal_return < BREAK_EVEN_MARGINAL
        })
        .map(|w| (w[0].spend + w[1].spend) / 2.0)
        .unwrap_or(last.spend);

    Ok(optimal)
}
