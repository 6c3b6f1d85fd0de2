pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{InsightsError, InsightsResult};
pub use types::{
    DerivedAggregate, MetricDirection, MetricRecord, MetricSummary, Ratio, SaturationPoint, Share,
    SpendRange,
};
