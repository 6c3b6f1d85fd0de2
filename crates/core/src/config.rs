use crate::error::InsightsResult;
use serde::Deserialize;
use std::path::Path;

/// Root application configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `CAMPAIGN_INSIGHTS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub saturation: SaturationConfig,
    #[serde(default)]
    pub rolling: RollingConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaturationConfig {
    #[serde(default = "default_min_spend")]
    pub min_spend: f64,
    #[serde(default = "default_max_spend")]
    pub max_spend: f64,
    #[serde(default = "default_step")]
    pub step: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RollingConfig {
    #[serde(default = "default_window")]
    pub window: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Curves kept in memory before the cache is cleared.
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

// Default functions
fn default_min_spend() -> f64 {
    5_000.0
}
fn default_max_spend() -> f64 {
    100_000.0
}
fn default_step() -> f64 {
    5_000.0
}
fn default_window() -> usize {
    7
}
fn default_cache_max_entries() -> usize {
    256
}

impl Default for SaturationConfig {
    fn default() -> Self {
        Self {
            min_spend: default_min_spend(),
            max_spend: default_max_spend(),
            step: default_step(),
        }
    }
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_cache_max_entries(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            saturation: SaturationConfig::default(),
            rolling: RollingConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables only.
    pub fn load() -> InsightsResult<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an optional TOML file overlaid with
    /// environment variables. Environment wins over the file.
    pub fn load_from(path: Option<&Path>) -> InsightsResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let builder = builder.add_source(
            config::Environment::with_prefix("CAMPAIGN_INSIGHTS")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        tracing::debug!(
            min_spend = config.saturation.min_spend,
            max_spend = config.saturation.max_spend,
            step = config.saturation.step,
            window = config.rolling.window,
            "Configuration resolved"
        );
        Ok(config)
    }
}
