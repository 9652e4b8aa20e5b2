//! End-to-end pipeline runs against the synthetic provider.

use chrono::{Local, NaiveDate};
use tickerlab_core::data::{SyntheticMode, SyntheticProvider};
use tickerlab_core::features::{FeatureSpec, Target};
use tickerlab_core::model::{test_size, ModelKind, SplitPolicy};
use tickerlab_runner::{run_pipeline, ErrorKind, Pipeline, PipelineConfig, Stage};

fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 30).unwrap()
}

#[test]
fn one_year_linear_reaches_evaluated_with_finite_metrics() {
    let provider = SyntheticProvider::new(Local::now().date_naive());
    let mut config = PipelineConfig::for_ticker("AAPL");
    config.period = Some("1y".into());

    let report = run_pipeline(&config, &provider).unwrap();
    assert_eq!(report.ticker.as_str(), "AAPL");
    assert_eq!(report.feature_names, vec!["sma_20", "sma_50", "daily_return"]);
    assert!(report.metrics.mse.is_finite());
    assert!(report.metrics.mae.is_finite());
    assert!(report.metrics.r2.is_finite());

    let rows = report.split.train_rows + report.split.test_rows;
    assert_eq!(rows, report.bar_count - 50);
    assert_eq!(report.split.test_rows, test_size(rows, 0.2));
    assert_eq!(report.predictions.len(), report.split.test_rows);
    assert_eq!(report.forecast.map(|f| f.as_of), Some(report.last_date));
}

#[test]
fn chronological_split_tests_on_the_newest_rows() {
    let provider = SyntheticProvider::new(fixed_today());
    let config = PipelineConfig::for_ticker("MSFT").validate(fixed_today()).unwrap();
    let output = Pipeline::new(config, &provider).run().unwrap();

    let dates: Vec<_> = output.report.predictions.iter().map(|p| p.date).collect();
    assert!(dates.windows(2).all(|w| w[0] < w[1]));
    let dataset = output.table.to_dataset(Target::NextClose);
    let n_test = dates.len();
    assert_eq!(dates, dataset.dates[dataset.len() - n_test..].to_vec());
}

#[test]
fn random_forest_shuffled_with_extra_features() {
    let provider = SyntheticProvider::new(fixed_today());
    let mut config = PipelineConfig::for_ticker("NVDA");
    config.period = Some("2y".into());
    config.target = Target::ForwardReturn;
    config.standardize = true;
    config.split = SplitPolicy::Shuffled { seed: 9 };
    config.model = ModelKind::RandomForest {
        n_trees: 15,
        max_depth: Some(6),
        min_samples_split: 4,
        seed: 9,
    };
    config.features.push(FeatureSpec::Rsi { period: 14 });
    config.features.push(FeatureSpec::Volatility { window: 10 });
    config.features.push(FeatureSpec::Lag { k: 1 });

    let output = Pipeline::new(config.validate(fixed_today()).unwrap(), &provider)
        .run()
        .unwrap();
    assert_eq!(output.report.feature_names.len(), 6);
    assert!(output.report.metrics.rmse.is_finite());
    assert!(output.report.standardized);
}

#[test]
fn same_inputs_same_report() {
    let provider = SyntheticProvider::new(fixed_today());
    let config = PipelineConfig::for_ticker("IBM");
    let run = || {
        Pipeline::new(config.validate(fixed_today()).unwrap(), &provider)
            .run()
            .unwrap()
            .report
    };
    let (a, b) = (run(), run());
    assert_eq!(a.dataset_hash, b.dataset_hash);
    assert_eq!(a.predictions, b.predictions);
    assert_eq!(a.metrics, b.metrics);
}

#[test]
fn validation_happens_before_any_fetch() {
    // A failing provider would report FetchFailed if it were ever called.
    let provider = SyntheticProvider::new(fixed_today())
        .with_mode(SyntheticMode::Failing("should not be called".into()));

    let err = run_pipeline(&PipelineConfig::for_ticker("123"), &provider).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTicker);

    let mut config = PipelineConfig::for_ticker("AAPL");
    config.start = Some("2024-13-01".into());
    config.end = Some("2024-12-31".into());
    let err = run_pipeline(&config, &provider).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDateRange);
    assert_eq!(err.to_string(), "Invalid date format. Use YYYY-MM-DD.");
}

#[test]
fn provider_failures_keep_their_kind() {
    let config = PipelineConfig::for_ticker("AAPL").validate(fixed_today()).unwrap();

    let failing = SyntheticProvider::new(fixed_today())
        .with_mode(SyntheticMode::Failing("connection reset".into()));
    let mut pipeline = Pipeline::new(config.clone(), &failing);
    assert_eq!(pipeline.advance(), Stage::Failed);

    let err = Pipeline::new(config, &failing).run().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FetchFailed);
}
