//! Shared data model for derived marketing metrics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ─── Input Records ──────────────────────────────────────────────────────────

/// A keyed bag of numeric metrics for one channel, date or reporting period.
///
/// Records are produced by an upstream data source and only ever read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Channel id, ISO date or period label.
    pub key: String,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

impl MetricRecord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            metrics: BTreeMap::new(),
        }
    }

    /// Builder-style helper used when assembling records in code.
    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }
}

/// Which direction of a metric counts as "better" when ranking records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDirection {
    /// Revenue, ROAS, conversions.
    #[default]
    HigherIsBetter,
    /// Cost, CPA, bounce rate.
    LowerIsBetter,
}

impl MetricDirection {
    /// True when `candidate` strictly beats `incumbent`. Equal values never
    /// win, so the earliest record keeps its place on ties.
    pub fn beats(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Self::HigherIsBetter => candidate > incumbent,
            Self::LowerIsBetter => candidate < incumbent,
        }
    }
}

// ─── Derived Outputs ────────────────────────────────────────────────────────

/// Mean plus the best and worst record for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub mean: f64,
    pub best: MetricRecord,
    pub worst: MetricRecord,
}

/// One record's contribution to a column total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share {
    pub key: String,
    pub value: f64,
    /// Percentage of the total, clamped to `[0, 100]`.
    pub percent: f64,
}

/// Full projection of one metric across a set of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedAggregate {
    pub metric: String,
    pub direction: MetricDirection,
    pub count: usize,
    pub total: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub best: MetricRecord,
    pub worst: MetricRecord,
    pub shares: Vec<Share>,
}

/// Result of a ratio whose denominator may be zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ratio {
    Defined(f64),
    /// Zero (or non-finite) denominator. Serializes as `null`.
    Undefined,
}

impl Ratio {
    pub fn value(self) -> Option<f64> {
        match self {
            Self::Defined(v) => Some(v),
            Self::Undefined => None,
        }
    }
}

// ─── Saturation ─────────────────────────────────────────────────────────────

/// Inclusive spend domain a saturation curve is generated over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpendRange {
    pub min: f64,
    pub max: f64,
    /// The channel's present spend level, if known.
    #[serde(default)]
    pub current: Option<f64>,
}

impl SpendRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            current: None,
        }
    }

    pub fn with_current(mut self, current: f64) -> Self {
        self.current = Some(current);
        self
    }
}

/// A single sample on a diminishing-returns curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaturationPoint {
    pub spend: f64,
    /// Average return per unit of spend at this level.
    pub roas: f64,
    /// `roas * spend`.
    pub cumulative_return: f64,
    /// Incremental return per incremental unit of spend.
    pub marginal_return: f64,
    pub is_current: bool,
    pub is_max_saturation: bool,
}
