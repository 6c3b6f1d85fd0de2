//! End-to-end checks of the derived metrics over dashboard-shaped data.

use insights_core::{InsightsError, MetricDirection, MetricRecord, SaturationPoint, SpendRange};
use insights_reporting::{
    derive_aggregate, find_optimal_spend, generate_saturation_curve, mean_and_extremes,
    percentage_of_total, rolling_average, rolling_average_of, standard_deviation, CurveCache,
    DEFAULT_WINDOW,
};

fn channel(key: &str, revenue: f64, cost: f64) -> MetricRecord {
    MetricRecord::new(key)
        .with_metric("revenue", revenue)
        .with_metric("cost", cost)
        .with_metric("roas", revenue / cost)
}

fn channels() -> Vec<MetricRecord> {
    vec![
        channel("search", 120_000.0, 40_000.0),
        channel("social", 45_000.0, 25_000.0),
        channel("display", 30_000.0, 20_000.0),
        channel("email", 36_000.0, 6_000.0),
    ]
}

#[test]
fn test_std_dev_properties() {
    let samples: Vec<Vec<f64>> = vec![
        vec![1.0],
        vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0],
        vec![-10.0, 10.0],
        vec![0.001, 1000.0, 55.5],
    ];
    for values in &samples {
        assert!(standard_deviation(values).unwrap() >= 0.0);
    }
    assert_eq!(standard_deviation(&[8.0; 5]).unwrap(), 0.0);
    assert!(matches!(
        standard_deviation(&[]),
        Err(InsightsError::InvalidArgument(_))
    ));
}

#[test]
fn test_percentage_bounds() {
    for part in [0.0, 1.0, 50.0, 1e12] {
        for total in [0.0, 0.5, 100.0] {
            let pct = percentage_of_total(part, total);
            assert!((0.0..=100.0).contains(&pct));
            if total <= 0.0 {
                assert_eq!(pct, 0.0);
            }
        }
    }
}

#[test]
fn test_best_worst_roas() {
    let records: Vec<MetricRecord> = [1.0, 5.0, 3.0]
        .iter()
        .enumerate()
        .map(|(i, v)| MetricRecord::new(i.to_string()).with_metric("roas", *v))
        .collect();
    let summary = mean_and_extremes(&records, "roas", MetricDirection::HigherIsBetter).unwrap();
    assert_eq!(summary.best.metric("roas"), Some(5.0));
    assert_eq!(summary.worst.metric("roas"), Some(1.0));
}

#[test]
fn test_lower_is_better_tie_returns_first() {
    let records = vec![
        MetricRecord::new("0").with_metric("cost", 10.0),
        MetricRecord::new("1").with_metric("cost", 10.0),
    ];
    let summary = mean_and_extremes(&records, "cost", MetricDirection::LowerIsBetter).unwrap();
    assert_eq!(summary.best.key, "0");
}

#[test]
fn test_channel_aggregates() {
    let records = channels();

    let roas = derive_aggregate(&records, "roas", MetricDirection::HigherIsBetter).unwrap();
    assert_eq!(roas.best.key, "email");
    assert_eq!(roas.worst.key, "display");

    let cost = derive_aggregate(&records, "cost", MetricDirection::LowerIsBetter).unwrap();
    assert_eq!(cost.best.key, "email");
    assert_eq!(cost.worst.key, "search");
    assert!((cost.total - 91_000.0).abs() < f64::EPSILON);
    let shares: f64 = cost.shares.iter().map(|s| s.percent).sum();
    assert!((shares - 100.0).abs() < 1e-9);
}

#[test]
fn test_search_curve_is_deterministic() {
    let range = SpendRange::new(5_000.0, 100_000.0);
    let first = generate_saturation_curve("search", range, 5_000.0).unwrap();
    let second = generate_saturation_curve("search", range, 5_000.0).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 20);

    let cache = CurveCache::new(4);
    let cached = cache.get_or_generate("search", range, 5_000.0).unwrap();
    assert_eq!(&cached[..], &first[..]);
}

#[test]
fn test_optimal_spend_on_crossing_curve() {
    let marginals = [
        (35_000.0, 1.8),
        (40_000.0, 1.5),
        (45_000.0, 1.2),
        (50_000.0, 0.8),
        (55_000.0, 0.6),
    ];
    let curve: Vec<SaturationPoint> = marginals
        .iter()
        .map(|&(spend, marginal_return)| SaturationPoint {
            spend,
            roas: 0.0,
            cumulative_return: 0.0,
            marginal_return,
            is_current: false,
            is_max_saturation: false,
        })
        .collect();
    assert_eq!(find_optimal_spend(&curve).unwrap(), 47_500.0);
}

#[test]
fn test_rolling_average_ten_points() {
    let points = [12.0, 15.0, 11.0, 20.0, 18.0, 25.0, 30.0, 22.0, 19.0, 28.0];
    let avg = rolling_average(&points, DEFAULT_WINDOW).unwrap();

    assert!(avg[0..=5].iter().all(Option::is_none));
    let mean_0_6: f64 = points[0..=6].iter().sum::<f64>() / 7.0;
    let mean_3_9: f64 = points[3..=9].iter().sum::<f64>() / 7.0;
    assert!((avg[6].unwrap() - mean_0_6).abs() < 1e-9);
    assert!((avg[9].unwrap() - mean_3_9).abs() < 1e-9);
}

#[test]
fn test_rolling_average_over_daily_records() {
    let days: Vec<MetricRecord> = (1..=10)
        .map(|d| MetricRecord::new(format!("2024-03-{:02}", d)).with_metric("conversions", d as f64))
        .collect();
    let avg = rolling_average_of(&days, "conversions", DEFAULT_WINDOW).unwrap();
    assert_eq!(avg[6], Some(4.0));
    assert_eq!(avg[9], Some(7.0));
}
