//! Efficiency ratios (ROAS, CPA, CTR, CVR, ROI).
//!
//! A zero denominator never divides: it yields [`Ratio::Undefined`].

use insights_core::Ratio;
use serde::{Deserialize, Serialize};

pub(crate) fn ratio(numerator: f64, denominator: f64) -> Ratio {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return Ratio::Undefined;
    }
    Ratio::Defined(numerator / denominator)
}

/// Return on ad spend: `revenue / cost`.
pub fn roas(revenue: f64, cost: f64) -> Ratio {
    ratio(revenue, cost)
}

/// Cost per acquisition: `cost / conversions`.
pub fn cpa(cost: f64, conversions: u64) -> Ratio {
    ratio(cost, conversions as f64)
}

/// Click-through rate in percent.
pub fn ctr(clicks: u64, impressions: u64) -> Ratio {
    match ratio(clicks as f64, impressions as f64) {
        Ratio::Defined(v) => Ratio::Defined(v * 100.0),
        Ratio::Undefined => Ratio::Undefined,
    }
}

/// Conversions per click in percent.
pub fn conversion_rate(conversions: u64, clicks: u64) -> Ratio {
    match ratio(conversions as f64, clicks as f64) {
        Ratio::Defined(v) => Ratio::Defined(v * 100.0),
        Ratio::Undefined => Ratio::Undefined,
    }
}

/// `(revenue - cost) / cost * 100`.
pub fn roi_percent(revenue: f64, cost: f64) -> Ratio {
    match ratio(revenue - cost, cost) {
        Ratio::Defined(v) => Ratio::Defined(v * 100.0),
        Ratio::Undefined => Ratio::Undefined,
    }
}

/// Raw funnel totals for one channel or campaign.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunnelTotals {
    pub revenue: f64,
    pub cost: f64,
    #[serde(default)]
    pub conversions: u64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub impressions: u64,
}

/// All efficiency ratios for one [`FunnelTotals`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioReport {
    pub roas: Ratio,
    pub roi_percent: Ratio,
    pub cpa: Ratio,
    pub ctr: Ratio,
    pub conversion_rate: Ratio,
}

impl FunnelTotals {
    pub fn ratios(&self) -> RatioReport {
        RatioReport {
            roas: roas(self.revenue, self.cost),
            roi_percent: roi_percent(self.revenue, self.cost),
            cpa: cpa(self.cost, self.conversions),
            ctr: ctr(self.clicks, self.impressions),
            conversion_rate: conversion_rate(self.conversions, self.clicks),
        }
    }
}
