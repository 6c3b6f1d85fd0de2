//! Derived marketing metrics: dispersion, best/worst selection, percentage
//! shares, ratios, saturation curves, rolling averages and A/B comparisons.
//!
//! Every function is a pure projection of the slices passed in.

pub mod aggregate;
pub mod breakdown;
pub mod budget;
pub mod curve_cache;
pub mod dispersion;
pub mod experiment;
pub mod ratios;
pub mod rolling;
pub mod saturation;

pub use aggregate::{derive_aggregate, mean_and_extremes};
pub use breakdown::{percentage_of_total, share_breakdown};
pub use budget::{plan_allocation, ChannelAllocation};
pub use curve_cache::CurveCache;
pub use dispersion::{mean, standard_deviation};
pub use experiment::{compare_variants, ExperimentResult, VariantInput};
pub use rolling::{rolling_average, rolling_average_of, DEFAULT_WINDOW};
pub use saturation::{find_optimal_spend, generate_saturation_curve, CurveParams};
