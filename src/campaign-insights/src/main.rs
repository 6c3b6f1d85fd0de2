//! Campaign Insights — derived marketing metrics from the command line.
//!
//! Reads JSON metric records, runs them through `insights-reporting` and
//! writes JSON to stdout. Logs go to stderr.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use insights_core::{AppConfig, MetricDirection, MetricRecord, SaturationPoint, SpendRange};
use insights_reporting::experiment::{VariantInput, DEFAULT_CONFIDENCE_LEVEL};
use insights_reporting::ratios::FunnelTotals;
use insights_reporting::saturation::CurveParams;
use insights_reporting::{
    compare_variants, derive_aggregate, find_optimal_spend, plan_allocation, rolling_average_of,
    CurveCache,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "campaign-insights")]
#[command(about = "Derived marketing metrics over channel and period records")]
#[command(version)]
struct Cli {
    /// TOML config file (environment variables still override it)
    #[arg(long, global = true, env = "CAMPAIGN_INSIGHTS_CONFIG")]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true, default_value_t = false)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mean, std dev, best/worst and shares for one metric
    Summarize {
        /// JSON array of records, or `-` for stdin
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        metric: String,
        /// Rank lower values as better (cost, CPA)
        #[arg(long, default_value_t = false)]
        lower_is_better: bool,
    },
    /// Saturation curve and break-even spend for a channel
    Curve {
        #[arg(long)]
        channel: String,
        #[arg(long)]
        min: Option<f64>,
        #[arg(long)]
        max: Option<f64>,
        #[arg(long)]
        step: Option<f64>,
        /// The channel's present spend, flagged on the curve
        #[arg(long)]
        current: Option<f64>,
    },
    /// Per-channel optimal spend versus current spend
    Plan {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "cost")]
        spend_metric: String,
        #[arg(long)]
        step: Option<f64>,
    },
    /// Trailing rolling average of one field over ordered records
    Rolling {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        field: String,
        /// Window length (overrides config)
        #[arg(long)]
        window: Option<usize>,
    },
    /// ROAS, ROI, CPA, CTR and conversion rate from raw totals
    Ratios {
        #[arg(long)]
        revenue: f64,
        #[arg(long)]
        cost: f64,
        #[arg(long, default_value_t = 0)]
        conversions: u64,
        #[arg(long, default_value_t = 0)]
        clicks: u64,
        #[arg(long, default_value_t = 0)]
        impressions: u64,
    },
    /// Compare A/B variants against the control arm
    Experiment {
        /// JSON array of variants, or `-` for stdin
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = DEFAULT_CONFIDENCE_LEVEL)]
        confidence: f64,
    },
}

#[derive(Debug, Serialize)]
struct Report<T> {
    command: &'static str,
    generated_at: DateTime<Utc>,
    result: T,
}

#[derive(Debug, Serialize)]
struct CurveReport {
    channel: String,
    params: CurveParams,
    optimal_spend: f64,
    points: Vec<SaturationPoint>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn report<T: Serialize>(command: &'static str, result: T) -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::to_value(Report {
        command,
        generated_at: Utc::now(),
        result,
    })?)
}

fn spend_range(config: &AppConfig, min: Option<f64>, max: Option<f64>) -> SpendRange {
    SpendRange::new(
        min.unwrap_or(config.saturation.min_spend),
        max.unwrap_or(config.saturation.max_spend),
    )
}

fn run(command: Command, config: &AppConfig) -> anyhow::Result<serde_json::Value> {
    match command {
        Command::Summarize {
            input,
            metric,
            lower_is_better,
        } => {
            let records: Vec<MetricRecord> = read_json(&input)?;
            let direction = if lower_is_better {
                MetricDirection::LowerIsBetter
            } else {
                MetricDirection::HigherIsBetter
            };
            let aggregate = derive_aggregate(&records, &metric, direction)?;
            report("summarize", aggregate)
        }
        Command::Curve {
            channel,
            min,
            max,
            step,
            current,
        } => {
            let mut range = spend_range(config, min, max);
            range.current = current;
            let step = step.unwrap_or(config.saturation.step);
            let points = insights_reporting::generate_saturation_curve(&channel, range, step)?;
            let optimal_spend = find_optimal_spend(&points)?;
            info!(%channel, optimal_spend, points = points.len(), "Curve generated");
            report(
                "curve",
                CurveReport {
                    params: CurveParams::for_channel(&channel),
                    channel,
                    optimal_spend,
                    points,
                },
            )
        }
        Command::Plan {
            input,
            spend_metric,
            step,
        } => {
            let records: Vec<MetricRecord> = read_json(&input)?;
            let cache = CurveCache::new(config.cache.max_entries);
            let plan = plan_allocation(
                &records,
                &spend_metric,
                spend_range(config, None, None),
                step.unwrap_or(config.saturation.step),
                &cache,
            )?;
            report("plan", plan)
        }
        Command::Rolling {
            input,
            field,
            window,
        } => {
            let records: Vec<MetricRecord> = read_json(&input)?;
            let window = window.unwrap_or(config.rolling.window);
            let averages = rolling_average_of(&records, &field, window)?;
            report("rolling", averages)
        }
        Command::Ratios {
            revenue,
            cost,
            conversions,
            clicks,
            impressions,
        } => {
            let totals = FunnelTotals {
                revenue,
                cost,
                conversions,
                clicks,
                impressions,
            };
            report("ratios", totals.ratios())
        }
        Command::Experiment { input, confidence } => {
            let variants: Vec<VariantInput> = read_json(&input)?;
            let result = compare_variants(&variants, confidence)?;
            report("experiment", result)
        }
    }
}

/// An explicit config file must load; without one, environment errors fall
/// back to defaults.
fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(Some(path))
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(AppConfig::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            AppConfig::default()
        })),
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campaign_insights=info,insights_reporting=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = load_config(cli.config.as_deref())?;

    info!(
        min_spend = config.saturation.min_spend,
        max_spend = config.saturation.max_spend,
        step = config.saturation.step,
        window = config.rolling.window,
        "Configuration loaded"
    );

    let output = run(cli.command, &config)?;
    let rendered = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_json(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_cli_parses_summarize() {
        let cli = Cli::try_parse_from([
            "campaign-insights",
            "summarize",
            "--input",
            "records.json",
            "--metric",
            "cost",
            "--lower-is-better",
        ])
        .unwrap();
        match cli.command {
            Command::Summarize {
                metric,
                lower_is_better,
                ..
            } => {
                assert_eq!(metric, "cost");
                assert!(lower_is_better);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_summarize_command() {
        let file = write_json(
            r#"[{"key":"search","metrics":{"roas":1.0}},
                {"key":"social","metrics":{"roas":5.0}},
                {"key":"display","metrics":{"roas":3.0}}]"#,
        );
        let out = run(
            Command::Summarize {
                input: file.path().to_path_buf(),
                metric: "roas".to_string(),
                lower_is_better: false,
            },
            &AppConfig::default(),
        )
        .unwrap();

        assert_eq!(out["command"], "summarize");
        assert_eq!(out["result"]["best"]["key"], "social");
        assert_eq!(out["result"]["worst"]["key"], "search");
        assert_eq!(out["result"]["mean"], 3.0);
    }

    #[test]
    fn test_curve_command_uses_config_defaults() {
        let out = run(
            Command::Curve {
                channel: "search".to_string(),
                min: None,
                max: None,
                step: None,
                current: Some(30_000.0),
            },
            &AppConfig::default(),
        )
        .unwrap();

        assert_eq!(out["result"]["optimal_spend"], 47_500.0);
        assert_eq!(out["result"]["points"].as_array().unwrap().len(), 20);
    }

    #[test]
    fn test_rolling_command_emits_nulls() {
        let file = write_json(
            r#"[{"key":"d1","metrics":{"v":1.0}},
                {"key":"d2","metrics":{"v":3.0}},
                {"key":"d3","metrics":{"v":5.0}}]"#,
        );
        let out = run(
            Command::Rolling {
                input: file.path().to_path_buf(),
                field: "v".to_string(),
                window: Some(2),
            },
            &AppConfig::default(),
        )
        .unwrap();
        assert_eq!(out["result"], serde_json::json!([null, 2.0, 4.0]));
    }

    #[test]
    fn test_ratios_command_zero_cost() {
        let out = run(
            Command::Ratios {
                revenue: 500.0,
                cost: 0.0,
                conversions: 0,
                clicks: 0,
                impressions: 0,
            },
            &AppConfig::default(),
        )
        .unwrap();
        assert!(out["result"]["roas"].is_null());
    }

    #[test]
    fn test_empty_records_surface_invalid_argument() {
        let file = write_json("[]");
        let err = run(
            Command::Summarize {
                input: file.path().to_path_buf(),
                metric: "roas".to_string(),
                lower_is_better: false,
            },
            &AppConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid argument"));
    }

    #[test]
    fn test_missing_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(
            Command::Rolling {
                input: dir.path().join("absent.json"),
                field: "v".to_string(),
                window: None,
            },
            &AppConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_explicit_config_must_load() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let err = load_config(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));

        let malformed = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(malformed.path(), "[saturation]\nstep = \"wide\"\n").unwrap();
        assert!(load_config(Some(malformed.path())).is_err());
    }

    #[test]
    fn test_explicit_config_overrides_defaults() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::fs::write(file.path(), "[rolling]\nwindow = 3\n").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.rolling.window, 3);
    }
}
