//! Budget reallocation: compare each channel's current spend with the
//! break-even optimum of its saturation curve.

use crate::breakdown::{percentage_of_total, share_breakdown};
use crate::curve_cache::CurveCache;
use crate::saturation::find_optimal_spend;
use insights_core::{InsightsResult, MetricRecord, SpendRange};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelAllocation {
    pub channel: String,
    pub current_spend: f64,
    /// Percentage of total current spend.
    pub current_share: f64,
    pub optimal_spend: f64,
    /// Percentage of the summed optimal spend across channels.
    pub recommended_share: f64,
    /// `optimal_spend - current_spend`.
    pub delta: f64,
    /// Marginal return at the curve point nearest the current spend.
    pub marginal_at_current: f64,
}

/// Build an allocation plan for every record, keyed by channel id, using
/// `spend_metric` as the current spend.
pub fn plan_allocation(
    records: &[MetricRecord],
    spend_metric: &str,
    range: SpendRange,
    step: f64,
    cache: &CurveCache,
) -> InsightsResult<Vec<ChannelAllocation>> {
    let shares = share_breakdown(records, spend_metric)?;

    let mut plan = Vec::with_capacity(shares.len());
    for share in shares {
        let curve =
            cache.get_or_generate(&share.key, range.with_current(share.value), step)?;
        let optimal_spend = find_optimal_spend(&curve)?;
        let marginal_at_current = curve
            .iter()
            .find(|p| p.is_current)
            .map(|p| p.marginal_return)
            .unwrap_or_default();

        plan.push(ChannelAllocation {
            channel: share.key,
            current_spend: share.value,
            current_share: share.percent,
            optimal_spend,
            recommended_share: 0.0,
            delta: optimal_spend - share.value,
            marginal_at_current,
        });
    }

    let optimal_total: f64 = plan.iter().map(|a| a.optimal_spend).sum();
    for allocation in &mut plan {
        allocation.recommended_share = percentage_of_total(allocation.optimal_spend, optimal_total);
    }

    debug!(
        channels = plan.len(),
        optimal_total, "Budget allocation planned"
    );

    Ok(plan)
}
