//! Fetch → features → split → fit → evaluate, wired by hand over the synthetic provider.

use chrono::NaiveDate;
use tickerlab_core::data::{DataProvider, FetchRequest, SyntheticProvider};
use tickerlab_core::domain::{FetchWindow, Period, Ticker};
use tickerlab_core::features::{FeatureBuilder, Target};
use tickerlab_core::metrics::evaluate;
use tickerlab_core::model::{train_test_split, ModelKind, Predictor, SplitPolicy};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
}

fn one_year(symbol: &str) -> tickerlab_core::domain::PriceSeries {
    SyntheticProvider::new(today())
        .fetch_history(&FetchRequest::new(
            Ticker::parse(symbol).unwrap(),
            FetchWindow::Period(Period::OneYear),
        ))
        .unwrap()
        .into_result()
        .unwrap()
}

#[test]
fn one_year_linear_pipeline_has_finite_metrics() {
    let series = one_year("AAPL");
    let table = FeatureBuilder::default_set().build(&series);

    let n = series.len();
    let defined = |name: &str| table.column(name).unwrap().iter().filter(|v| v.is_finite()).count();
    assert_eq!(defined("sma_20"), n - 19);
    assert_eq!(defined("sma_50"), n - 49);

    let dataset = table.to_dataset(Target::NextClose);
    assert_eq!(dataset.len(), n - 50);

    let split = train_test_split(&dataset, 0.2, SplitPolicy::Chronological).unwrap();
    let mut predictor = Predictor::new(ModelKind::Linear);
    predictor.fit_dataset(&split.train).unwrap();

    let predictions = predictor.predict(&split.test.features).unwrap();
    assert_eq!(predictions.len(), split.test.len());

    let result = evaluate(&predictions, &split.test.target).unwrap();
    assert!(result.mse.is_finite() && result.mae.is_finite() && result.r2.is_finite());
    assert!(result.mse >= 0.0);

    let (date, forecast) = predictor.forecast_next(&table).unwrap().unwrap();
    assert_eq!(Some(date), series.last_date());
    assert!(forecast.is_finite());
}

#[test]
fn random_forest_with_standardization_on_forward_returns() {
    let series = one_year("MSFT");
    let dataset = FeatureBuilder::default_set()
        .build(&series)
        .to_dataset(Target::ForwardReturn);
    let split = train_test_split(&dataset, 0.25, SplitPolicy::Shuffled { seed: 3 }).unwrap();

    let mut predictor = Predictor::new(ModelKind::RandomForest {
        n_trees: 25,
        max_depth: Some(6),
        min_samples_split: 4,
        seed: 11,
    })
    .with_standardization(true);
    predictor.fit_dataset(&split.train).unwrap();

    let predictions = predictor.predict(&split.test.features).unwrap();
    let result = evaluate(&predictions, &split.test.target).unwrap();
    assert_eq!(result.n, split.test.len());
    assert!(result.rmse.is_finite());
}
