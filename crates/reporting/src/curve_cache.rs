//! Memoization layer over [`generate_saturation_curve`].
//!
//! Curves are a pure function of their arguments, so a cached entry never
//! goes stale. Errors are not cached.

use crate::saturation::generate_saturation_curve;
use dashmap::DashMap;
use insights_core::{InsightsResult, SaturationPoint, SpendRange};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CurveKey {
    channel_id: String,
    min: u64,
    max: u64,
    current: Option<u64>,
    step: u64,
}

impl CurveKey {
    fn new(channel_id: &str, range: &SpendRange, step: f64) -> Self {
        Self {
            channel_id: channel_id.to_string(),
            min: range.min.to_bits(),
            max: range.max.to_bits(),
            current: range.current.map(f64::to_bits),
            step: step.to_bits(),
        }
    }
}

/// Concurrent curve cache backed by `DashMap`.
pub struct CurveCache {
    curves: DashMap<CurveKey, Arc<[SaturationPoint]>>,
    max_entries: usize,
}

impl CurveCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            curves: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Return the cached curve for these arguments, generating it on a miss.
    pub fn get_or_generate(
        &self,
        channel_id: &str,
        range: SpendRange,
        step: f64,
    ) -> InsightsResult<Arc<[SaturationPoint]>> {
        let key = CurveKey::new(channel_id, &range, step);

        if let Some(curve) = self.curves.get(&key) {
            metrics::counter!("insights.curve_cache.hit").increment(1);
            return Ok(Arc::clone(curve.value()));
        }
        metrics::counter!("insights.curve_cache.miss").increment(1);

        let curve: Arc<[SaturationPoint]> = generate_saturation_curve(channel_id, range, step)?.into();

        if self.curves.len() >= self.max_entries {
            debug!(entries = self.curves.len(), "Curve cache full, clearing");
            self.curves.clear();
        }
        self.curves.insert(key, Arc::clone(&curve));
        Ok(curve)
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn clear(&self) {
        self.curves.clear();
    }
}

impl Default for CurveCache {
    fn default() -> Self {
        Self::new(256)
    }
}
