//! Property tests across validation, indicators and metrics.

use chrono::NaiveDate;
use proptest::prelude::*;
use tickerlab_core::domain::{validate_ticker, Bar, DateRange, PriceSeries, Ticker};
use tickerlab_core::features::{FeatureBuilder, Target};
use tickerlab_core::format::format_large_number;
use tickerlab_core::indicators::{Indicator, Sma};
use tickerlab_core::metrics::evaluate;

fn bars_from(closes: &[f64]) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: base + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        })
        .collect()
}

proptest! {
    #[test]
    fn uppercase_letters_then_digits_are_valid(
        letters in "[A-Z]{1,5}",
        digits in "[0-9]{0,3}",
    ) {
        let raw = format!("{letters}{digits}");
        prop_assert!(validate_ticker(&raw));
        prop_assert!(validate_ticker(&raw.to_lowercase()));
        let parsed = Ticker::parse(&raw).unwrap();
        prop_assert_eq!(parsed.as_str(), raw.as_str());
    }

    #[test]
    fn six_letters_are_invalid(letters in "[A-Z]{6,10}") {
        prop_assert!(!validate_ticker(&letters));
    }

    #[test]
    fn sma_defined_count(closes in prop::collection::vec(1.0f64..500.0, 0..200)) {
        let bars = bars_from(&closes);
        let n = closes.len();
        let count = |w: usize| Sma::new(w).compute(&bars).iter().filter(|v| !v.is_nan()).count();
        prop_assert_eq!(count(20), (n + 1).saturating_sub(20));
        prop_assert_eq!(count(50), (n + 1).saturating_sub(50));
    }

    #[test]
    fn dataset_rows_are_complete(closes in prop::collection::vec(1.0f64..500.0, 0..120)) {
        let series = PriceSeries::new(Ticker::parse("PROP").unwrap(), bars_from(&closes)).unwrap();
        let ds = FeatureBuilder::default_set().build(&series).to_dataset(Target::NextClose);
        prop_assert_eq!(ds.len(), closes.len().saturating_sub(50));
        prop_assert!(ds.features.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn evaluate_rejects_mismatched_lengths(a in 0usize..20, b in 0usize..20) {
        prop_assume!(a != b);
        prop_assert!(evaluate(&vec![0.0; a], &vec![0.0; b]).is_err());
    }

    #[test]
    fn millions_use_m_suffix(x in 1_000_000f64..999_000_000.0) {
        prop_assert!(format_large_number(x).ends_with('M'));
    }

    #[test]
    fn ranges_within_ten_years_validate(offset in 1i64..3650) {
        let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let start = today - chrono::Duration::days(offset);
        prop_assert!(DateRange::new(start, today, today).is_ok());
    }
}
