//! A/B test comparison: conversion rates, lift over control and a
//! two-proportion z-test per treatment.

use crate::ratios;
use insights_core::{InsightsError, InsightsResult, Ratio};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default two-sided confidence required to call a winner.
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Raw totals for one experiment arm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantInput {
    pub name: String,
    #[serde(default)]
    pub is_control: bool,
    pub visitors: u64,
    pub conversions: u64,
    #[serde(default)]
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantResult {
    pub name: String,
    pub is_control: bool,
    pub visitors: u64,
    pub conversions: u64,
    /// Conversions per visitor, in percent.
    pub conversion_rate: Ratio,
    pub revenue_per_visitor: Ratio,
    /// Relative lift of the conversion rate over control, in percent.
    /// `None` for the control itself or when the control never converted.
    pub lift_vs_control: Option<f64>,
    pub z_score: Option<f64>,
    /// Two-sided confidence that the rate differs from control (0 to 1).
    pub confidence: Option<f64>,
    pub significant: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub variants: Vec<VariantResult>,
    /// Significant variant with the highest positive lift.
    pub winner: Option<String>,
    pub confidence_level: f64,
}

/// Abramowitz & Stegun 7.1.26; absolute error below 1.5e-7.
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}

/// Pooled two-proportion z statistic, `None` when the pooled variance is 0.
fn two_proportion_z(control: &VariantInput, variant: &VariantInput) -> Option<f64> {
    if control.visitors == 0 || variant.visitors == 0 {
        return None;
    }
    let n1 = control.visitors as f64;
    let n2 = variant.visitors as f64;
    let p1 = control.conversions as f64 / n1;
    let p2 = variant.conversions as f64 / n2;
    let pooled = (control.conversions + variant.conversions) as f64 / (n1 + n2);
    let se = (pooled * (1.0 - pooled) * (1.0 / n1 + 1.0 / n2)).sqrt();
    if se > 0.0 && se.is_finite() {
        Some((p2 - p1) / se)
    } else {
        None
    }
}

fn validate(variants: &[VariantInput], confidence_level: f64) -> InsightsResult<usize> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(InsightsError::invalid(format!(
            "confidence level must be in (0, 1), got {}",
            confidence_level
        )));
    }
    let mut controls = variants.iter().enumerate().filter(|(_, v)| v.is_control);
    let control = match (controls.next(), controls.next()) {
        (Some((idx, _)), None) => idx,
        (None, _) => return Err(InsightsError::invalid("experiment has no control variant")),
        (Some(_), Some(_)) => {
            return Err(InsightsError::invalid(
                "experiment has more than one control variant",
            ))
        }
    };
    if let Some(v) = variants.iter().find(|v| v.conversions > v.visitors) {
        return Err(InsightsError::invalid(format!(
            "variant '{}' has more conversions than visitors",
            v.name
        )));
    }
    Ok(control)
}

/// Compare every treatment against the single control arm.
pub fn compare_variants(
    variants: &[VariantInput],
    confidence_level: f64,
) -> InsightsResult<ExperimentResult> {
    let control_idx = validate(variants, confidence_level)?;
    let control = &variants[control_idx];
    let control_rate = ratios::conversion_rate(control.conversions, control.visitors);

    let results: Vec<VariantResult> = variants
        .iter()
        .map(|v| {
            let conversion_rate = ratios::conversion_rate(v.conversions, v.visitors);
            let (lift_vs_control, z_score) = if v.is_control {
                (None, None)
            } else {
                let lift = match (conversion_rate, control_rate) {
                    (Ratio::Defined(rate), Ratio::Defined(base)) if base > 0.0 => {
                        Some((rate - base) / base * 100.0)
                    }
                    _ => None,
                };
                (lift, two_proportion_z(control, v))
            };
            let confidence = z_score.map(|z| erf(z.abs() / std::f64::consts::SQRT_2));

            VariantResult {
                name: v.name.clone(),
                is_control: v.is_control,
                visitors: v.visitors,
                conversions: v.conversions,
                conversion_rate,
                revenue_per_visitor: ratios::ratio(v.revenue, v.visitors as f64),
                lift_vs_control,
                z_score,
                confidence,
                significant: confidence.is_some_and(|c| c >= confidence_level),
            }
        })
        .collect();

    let mut winner: Option<&VariantResult> = None;
    for r in results.iter().filter(|r| r.significant) {
        let lift = r.lift_vs_control.unwrap_or(0.0);
        if lift > winner.and_then(|w| w.lift_vs_control).unwrap_or(0.0) {
            winner = Some(r);
        }
    }
    let winner = winner.map(|w| w.name.clone());

    debug!(
        variants = results.len(),
        winner = ?winner,
        confidence_level,
        "Experiment compared"
    );

    Ok(ExperimentResult {
        variants: results,
        winner,
        confidence_level,
    })
}
